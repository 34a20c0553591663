//! Task items and edit validation
//!
//! Only the authoritative fields live here. Position and velocity belong to
//! the simulation and are never persisted.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

use crate::Millis;
use crate::consts::*;

/// Stable item identifier, never reused
///
/// Stored as a decimal string (`"1712345678901"`); plain numbers are accepted
/// on load as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ItemId(pub u64);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Serialize for ItemId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Number(u64),
            Text(String),
        }

        match RawId::deserialize(deserializer)? {
            RawId::Number(id) => Ok(ItemId(id)),
            RawId::Text(text) => text
                .trim()
                .parse()
                .map(ItemId)
                .map_err(|_| serde::de::Error::custom(format!("invalid item id {text:?}"))),
        }
    }
}

/// A task rendered as a growing circle
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    pub id: ItemId,
    /// Free-form label, may span several lines
    pub name: String,
    /// Time of the last bump (Unix ms)
    pub last_bumped: Millis,
    /// Radius growth in pixels per day
    pub growth_rate: f32,
    /// Color angle 0-360, `None` means the default hue
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hue: Option<f32>,
    /// Multiplier on the auto-fitted font size, `None` means auto
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text_scale: Option<f32>,
}

impl Item {
    /// A fresh item with default name and growth rate
    pub fn new(id: ItemId, now: Millis) -> Self {
        Self {
            id,
            name: DEFAULT_NAME.to_string(),
            last_bumped: now,
            growth_rate: DEFAULT_GROWTH_RATE,
            hue: None,
            text_scale: None,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    pub fn with_growth_rate(mut self, growth_rate: f32) -> Self {
        self.growth_rate = growth_rate;
        self
    }

    pub fn with_hue(mut self, hue: f32) -> Self {
        self.hue = Some(hue);
        self
    }

    /// Reset the growth clock
    pub fn bump(&mut self, now: Millis) {
        self.last_bumped = now;
    }

    pub fn hue_or_default(&self) -> f32 {
        self.hue.unwrap_or(DEFAULT_HUE)
    }

    /// Merge a validated partial update into this item
    pub fn apply(&mut self, update: &ItemUpdate) {
        if let Some(name) = &update.name {
            self.name = name.clone();
        }
        if let Some(growth_rate) = update.growth_rate {
            self.growth_rate = growth_rate;
        }
        if let Some(hue) = update.hue {
            self.hue = Some(hue);
        }
        if let Some(text_scale) = update.text_scale {
            self.text_scale = Some(text_scale);
        }
    }
}

/// Rejected edits
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ItemError {
    #[error("name must not be empty")]
    EmptyName,
    #[error("growth rate must be a positive number, got {0}")]
    InvalidGrowthRate(f32),
    #[error("hue must be between 0 and 360, got {0}")]
    InvalidHue(f32),
    #[error("text scale must be between 0.5 and 2.0, got {0}")]
    InvalidTextScale(f32),
    #[error("no item with id {0}")]
    UnknownItem(ItemId),
    #[error("no item is selected")]
    NoSelection,
}

/// Partial edit produced by the property editor
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemUpdate {
    pub name: Option<String>,
    pub growth_rate: Option<f32>,
    pub hue: Option<f32>,
    pub text_scale: Option<f32>,
}

impl ItemUpdate {
    pub fn name(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn growth_rate(growth_rate: f32) -> Self {
        Self {
            growth_rate: Some(growth_rate),
            ..Default::default()
        }
    }

    pub fn hue(hue: f32) -> Self {
        Self {
            hue: Some(hue),
            ..Default::default()
        }
    }

    pub fn text_scale(text_scale: f32) -> Self {
        Self {
            text_scale: Some(text_scale),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.growth_rate.is_none()
            && self.hue.is_none()
            && self.text_scale.is_none()
    }

    /// Check every present field; the core never sees invalid state
    pub fn validate(&self) -> Result<(), ItemError> {
        if let Some(name) = &self.name {
            if name.trim().is_empty() {
                return Err(ItemError::EmptyName);
            }
        }
        if let Some(rate) = self.growth_rate {
            if !rate.is_finite() || rate <= 0.0 {
                return Err(ItemError::InvalidGrowthRate(rate));
            }
        }
        if let Some(hue) = self.hue {
            if !(0.0..=360.0).contains(&hue) {
                return Err(ItemError::InvalidHue(hue));
            }
        }
        if let Some(scale) = self.text_scale {
            if !(MIN_TEXT_SCALE..=MAX_TEXT_SCALE).contains(&scale) {
                return Err(ItemError::InvalidTextScale(scale));
            }
        }
        Ok(())
    }

    /// Parse a growth rate typed into a text field
    pub fn parse_growth_rate(input: &str) -> Result<Self, ItemError> {
        let rate = input
            .trim()
            .parse::<f32>()
            .map_err(|_| ItemError::InvalidGrowthRate(f32::NAN))?;
        let update = Self::growth_rate(rate);
        update.validate()?;
        Ok(update)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_item_defaults() {
        let item = Item::new(ItemId(7), 1_000.0);
        assert_eq!(item.name, DEFAULT_NAME);
        assert_eq!(item.last_bumped, 1_000.0);
        assert_eq!(item.growth_rate, DEFAULT_GROWTH_RATE);
        assert_eq!(item.hue_or_default(), DEFAULT_HUE);
        assert!(item.text_scale.is_none());
    }

    #[test]
    fn test_validate_rejects_bad_growth_rate() {
        assert_eq!(ItemUpdate::growth_rate(0.0).validate(), Err(ItemError::InvalidGrowthRate(0.0)));
        assert!(ItemUpdate::growth_rate(-1.0).validate().is_err());
        assert!(ItemUpdate::growth_rate(f32::INFINITY).validate().is_err());
        assert!(ItemUpdate::growth_rate(0.1).validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_blank_name() {
        assert_eq!(ItemUpdate::name("   \n").validate(), Err(ItemError::EmptyName));
        assert!(ItemUpdate::name("Water\nplants").validate().is_ok());
    }

    #[test]
    fn test_validate_ranges() {
        assert!(ItemUpdate::hue(361.0).validate().is_err());
        assert!(ItemUpdate::hue(0.0).validate().is_ok());
        assert!(ItemUpdate::text_scale(0.4).validate().is_err());
        assert!(ItemUpdate::text_scale(2.0).validate().is_ok());
    }

    #[test]
    fn test_parse_growth_rate() {
        assert_eq!(ItemUpdate::parse_growth_rate(" 3.5 ").unwrap().growth_rate, Some(3.5));
        assert!(ItemUpdate::parse_growth_rate("abc").is_err());
        assert!(ItemUpdate::parse_growth_rate("-2").is_err());
    }

    #[test]
    fn test_apply_merges_only_present_fields() {
        let mut item = Item::new(ItemId(1), 0.0).with_name("Old");
        item.apply(&ItemUpdate::hue(120.0));
        assert_eq!(item.name, "Old");
        assert_eq!(item.hue, Some(120.0));

        item.apply(&ItemUpdate {
            name: Some("New".into()),
            growth_rate: Some(4.0),
            ..Default::default()
        });
        assert_eq!(item.name, "New");
        assert_eq!(item.growth_rate, 4.0);
        assert_eq!(item.hue, Some(120.0));
    }

    #[test]
    fn test_serialized_fields_are_authoritative_only() {
        let item = Item::new(ItemId(3), 5.0).with_name("Plants");
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains("\"lastBumped\""));
        assert!(json.contains("\"growthRate\""));
        assert!(!json.contains("\"hue\""));
        assert!(!json.contains("\"x\""));
    }

    #[test]
    fn test_id_round_trips_as_string() {
        let json = serde_json::to_string(&ItemId(1712345678901)).unwrap();
        assert_eq!(json, "\"1712345678901\"");
        let from_text: ItemId = serde_json::from_str("\"42\"").unwrap();
        let from_number: ItemId = serde_json::from_str("42").unwrap();
        assert_eq!(from_text, ItemId(42));
        assert_eq!(from_number, ItemId(42));
        assert!(serde_json::from_str::<ItemId>("\"abc\"").is_err());
    }
}
