//! Color model: hue plus selection state to fill, stroke and text colors

use std::fmt;

/// Saturation shared by every item color (percent)
const SATURATION: f32 = 75.0;

/// An HSL color, formatted as a CSS `hsl()` string
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Hsl {
    pub hue: f32,
    pub saturation: f32,
    pub lightness: f32,
}

impl Hsl {
    pub fn new(hue: f32, saturation: f32, lightness: f32) -> Self {
        Self {
            hue,
            saturation,
            lightness,
        }
    }
}

impl fmt::Display for Hsl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "hsl({}, {}%, {}%)",
            self.hue, self.saturation, self.lightness
        )
    }
}

/// Paint for one item
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BallColors {
    pub fill: Hsl,
    pub stroke: Hsl,
    pub text: Hsl,
}

/// Colors for a hue; selected items are drawn lighter
pub fn ball_colors(hue: f32, selected: bool) -> BallColors {
    let hue = if hue.is_finite() {
        hue.rem_euclid(360.0)
    } else {
        crate::consts::DEFAULT_HUE
    };
    let (fill, stroke, text) = if selected {
        (65.0, 45.0, 45.0)
    } else {
        (50.0, 30.0, 35.0)
    };

    BallColors {
        fill: Hsl::new(hue, SATURATION, fill),
        stroke: Hsl::new(hue, SATURATION, stroke),
        text: Hsl::new(hue, SATURATION, text),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_css_format() {
        let colors = ball_colors(210.0, false);
        assert_eq!(colors.fill.to_string(), "hsl(210, 75%, 50%)");
        assert_eq!(colors.stroke.to_string(), "hsl(210, 75%, 30%)");
    }

    #[test]
    fn test_selected_is_distinct() {
        let normal = ball_colors(120.0, false);
        let selected = ball_colors(120.0, true);
        assert_ne!(normal, selected);
        assert!(selected.fill.lightness > normal.fill.lightness);
        assert_eq!(selected.fill.hue, normal.fill.hue);
    }

    #[test]
    fn test_hue_wraps() {
        assert_eq!(ball_colors(360.0, false).fill.hue, 0.0);
        assert_eq!(ball_colors(f32::NAN, false).fill.hue, crate::consts::DEFAULT_HUE);
    }
}
