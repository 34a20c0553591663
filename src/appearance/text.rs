//! Text-fit model: pick a font size that keeps the label inside its circle
//!
//! Widths are estimated, not measured: a glyph is assumed to be about 0.6 em
//! wide and a line 1.2 em tall.

/// Line height used when stacking label lines (em)
pub const LINE_HEIGHT_EM: f32 = 1.2;
/// Estimated glyph width (em)
const GLYPH_WIDTH_EM: f32 = 0.6;
/// Base font size as a fraction of the radius
const BASE_SIZE_FACTOR: f32 = 0.35;
/// Usable width and height inside the circle, as a fraction of the radius
const AVAILABLE_FACTOR: f32 = 1.6;
/// Smallest font size ever returned
pub const MIN_FONT_SIZE: f32 = 2.0;

/// Split a label into display lines
pub fn split_lines(name: &str) -> Vec<&str> {
    name.split('\n').collect()
}

/// Font size in pixels for `name` inside a circle of `radius`
pub fn font_size(name: &str, radius: f32, text_scale: Option<f32>) -> f32 {
    let lines = split_lines(name);
    let line_count = lines.len() as f32;
    let longest_line = lines
        .iter()
        .map(|line| line.chars().count())
        .max()
        .unwrap_or(0)
        .max(1) as f32;

    let mut size = radius * BASE_SIZE_FACTOR;
    let available = radius * AVAILABLE_FACTOR;

    // Longest line must fit horizontally
    let text_width_em = longest_line * GLYPH_WIDTH_EM;
    if text_width_em * size > available {
        size = available / text_width_em;
    }

    // Stacked lines must fit vertically
    let text_height_em = line_count * LINE_HEIGHT_EM;
    if text_height_em * size > available {
        size = available / text_height_em;
    }

    let scaled = size * text_scale.unwrap_or(1.0);
    if scaled.is_nan() {
        return MIN_FONT_SIZE;
    }
    scaled.max(MIN_FONT_SIZE)
}

/// Vertical offset of the first line (em) so the stack is centered
pub fn first_line_offset_em(line_count: usize) -> f32 {
    -((line_count.max(1) - 1) as f32 * LINE_HEIGHT_EM) / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_short_label_uses_base_size() {
        assert!((font_size("Hi", 40.0, None) - 14.0).abs() < 0.001);
    }

    #[test]
    fn test_long_line_shrinks_to_width() {
        let name = "Clean the coffee grinder thoroughly";
        let size = font_size(name, 40.0, None);
        let width = name.chars().count() as f32 * GLYPH_WIDTH_EM * size;
        assert!(size < 14.0);
        assert!(width <= 40.0 * AVAILABLE_FACTOR + 0.001);
    }

    #[test]
    fn test_many_lines_shrink_to_height() {
        let name = "a\nb\nc\nd\ne\nf\ng\nh";
        let size = font_size(name, 40.0, None);
        assert!(8.0 * LINE_HEIGHT_EM * size <= 40.0 * AVAILABLE_FACTOR + 0.001);
    }

    #[test]
    fn test_text_scale_multiplies() {
        let auto = font_size("Water plants", 60.0, None);
        let doubled = font_size("Water plants", 60.0, Some(2.0));
        assert!((doubled - auto * 2.0).abs() < 0.001);
    }

    #[test]
    fn test_floor_at_min_size() {
        let name = "x".repeat(500);
        assert_eq!(font_size(&name, 20.0, Some(0.5)), MIN_FONT_SIZE);
    }

    #[test]
    fn test_first_line_offset() {
        assert_eq!(first_line_offset_em(1), 0.0);
        assert!((first_line_offset_em(3) + LINE_HEIGHT_EM).abs() < 0.001);
    }

    proptest! {
        #[test]
        fn font_size_never_below_floor(
            name in ".{0,80}",
            radius in 0.0f32..200.0,
            scale in 0.5f32..2.0,
        ) {
            prop_assert!(font_size(&name, radius, Some(scale)) >= MIN_FONT_SIZE);
        }
    }
}
