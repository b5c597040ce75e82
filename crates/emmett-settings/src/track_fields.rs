//! Linked track width, spacing and pitch fields.
//!
//! The three values are tied by `pitch = width + spacing`, so only two can
//! be set freely. The field edited most recently and the one edited
//! before it are kept; the third is derived.

use crate::error::{SettingsError, SettingsResult};
use emmett_core::{parse_length, LengthUnit};
use emmett_router::RouterConfig;
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackField {
    Width,
    Spacing,
    Pitch,
}

impl TrackField {
    pub const ALL: [TrackField; 3] = [TrackField::Width, TrackField::Spacing, TrackField::Pitch];

    pub fn name(self) -> &'static str {
        match self {
            Self::Width => "width",
            Self::Spacing => "spacing",
            Self::Pitch => "pitch",
        }
    }

    /// The field that is neither `self` nor `other`
    fn third(self, other: TrackField) -> TrackField {
        Self::ALL
            .into_iter()
            .find(|f| *f != self && *f != other)
            .unwrap_or(other)
    }
}

impl fmt::Display for TrackField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Width, spacing and pitch in microns, one of them derived.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrackFields {
    width: f64,
    spacing: f64,
    pitch: f64,
    last_edited: TrackField,
    derived: TrackField,
}

impl Default for TrackFields {
    fn default() -> Self {
        Self::from_config(&RouterConfig::default())
    }
}

impl TrackFields {
    /// Fields for `width` and `spacing` with the pitch derived
    pub fn new(width: f64, spacing: f64) -> Self {
        Self {
            width,
            spacing,
            pitch: width + spacing,
            last_edited: TrackField::Width,
            derived: TrackField::Pitch,
        }
    }

    pub fn from_config(config: &RouterConfig) -> Self {
        Self::new(config.width, config.spacing)
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn spacing(&self) -> f64 {
        self.spacing
    }

    pub fn pitch(&self) -> f64 {
        self.pitch
    }

    pub fn get(&self, field: TrackField) -> f64 {
        match field {
            TrackField::Width => self.width,
            TrackField::Spacing => self.spacing,
            TrackField::Pitch => self.pitch,
        }
    }

    pub fn last_edited(&self) -> TrackField {
        self.last_edited
    }

    pub fn derived(&self) -> TrackField {
        self.derived
    }

    /// Set `field` to `value` microns and recompute the derived field.
    ///
    /// Editing the derived field hands the derived role to the field that
    /// was not edited last. Nothing changes when the result would leave
    /// any field at or below zero.
    pub fn set(&mut self, field: TrackField, value: f64) -> SettingsResult<()> {
        if !(value.is_finite() && value > 0.0) {
            return Err(SettingsError::invalid(field.name(), "must be > 0"));
        }

        let mut next = *self;
        if field == next.derived {
            next.derived = field.third(next.last_edited);
        }
        next.last_edited = field;
        match field {
            TrackField::Width => next.width = value,
            TrackField::Spacing => next.spacing = value,
            TrackField::Pitch => next.pitch = value,
        }
        next.recompute();

        let derived = next.get(next.derived);
        if derived <= 0.0 {
            return Err(SettingsError::invalid(
                next.derived.name(),
                format!("would be {derived} µm"),
            ));
        }

        tracing::trace!(%field, value, derived = %next.derived, "track field edited");
        *self = next;
        Ok(())
    }

    /// Set `field` from user text such as `"0.8mm"`, bare numbers in `unit`
    pub fn set_text(&mut self, field: TrackField, text: &str, unit: LengthUnit) -> SettingsResult<()> {
        let value = parse_length(text, unit)?;
        self.set(field, value)
    }

    /// `base` with these track dimensions
    pub fn apply_to(&self, base: &RouterConfig) -> RouterConfig {
        base.with_tracks(self.width, self.spacing)
    }

    fn recompute(&mut self) {
        match self.derived {
            TrackField::Width => self.width = self.pitch - self.spacing,
            TrackField::Spacing => self.spacing = self.pitch - self.width,
            TrackField::Pitch => self.pitch = self.width + self.spacing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pitch_follows_width_and_spacing() {
        let mut fields = TrackFields::new(1000.0, 200.0);
        assert_eq!(fields.pitch(), 1200.0);
        fields.set(TrackField::Spacing, 300.0).unwrap();
        assert_eq!(fields.pitch(), 1300.0);
        assert_eq!(fields.derived(), TrackField::Pitch);
        assert_eq!(fields.last_edited(), TrackField::Spacing);
    }

    #[test]
    fn test_editing_derived_field_hands_over_role() {
        let mut fields = TrackFields::new(1000.0, 200.0);
        // width was edited last, so spacing becomes derived
        fields.set(TrackField::Pitch, 1500.0).unwrap();
        assert_eq!(fields.derived(), TrackField::Spacing);
        assert_eq!(fields.spacing(), 500.0);
        assert_eq!(fields.width(), 1000.0);

        // spacing is derived now, so editing it hands the role to width
        fields.set(TrackField::Spacing, 300.0).unwrap();
        assert_eq!(fields.derived(), TrackField::Width);
        assert_eq!(fields.width(), 1200.0);
        assert_eq!(fields.pitch(), 1500.0);
    }

    #[test]
    fn test_repeat_edit_keeps_roles() {
        let mut fields = TrackFields::new(1000.0, 200.0);
        fields.set(TrackField::Width, 800.0).unwrap();
        fields.set(TrackField::Width, 900.0).unwrap();
        assert_eq!(fields.derived(), TrackField::Pitch);
        assert_eq!(fields.pitch(), 1100.0);
    }

    #[test]
    fn test_rejected_edit_changes_nothing() {
        let mut fields = TrackFields::new(1000.0, 200.0);
        fields.set(TrackField::Pitch, 1500.0).unwrap();
        let before = fields;

        // spacing derived: a width wider than the pitch is refused
        assert!(fields.set(TrackField::Width, 1600.0).is_err());
        assert_eq!(fields, before);
        assert!(fields.set(TrackField::Width, -1.0).is_err());
        assert!(fields.set(TrackField::Width, f64::NAN).is_err());
        assert_eq!(fields, before);
    }

    #[test]
    fn test_text_entry_uses_units() {
        let mut fields = TrackFields::default();
        fields.set_text(TrackField::Width, "0.8mm", LengthUnit::Micron).unwrap();
        assert!((fields.width() - 800.0).abs() < 1e-9);
        fields.set_text(TrackField::Spacing, "0.3", LengthUnit::Millimetre).unwrap();
        assert!((fields.spacing() - 300.0).abs() < 1e-9);
        assert!(matches!(
            fields.set_text(TrackField::Width, "wide", LengthUnit::Millimetre),
            Err(SettingsError::Unit(_))
        ));
    }

    #[test]
    fn test_apply_to_config() {
        let mut fields = TrackFields::default();
        fields.set(TrackField::Width, 700.0).unwrap();
        let config = fields.apply_to(&RouterConfig::default());
        assert_eq!(config.width, 700.0);
        assert_eq!(config.spacing, 200.0);
        assert_eq!(config.pitch(), 900.0);
    }
}
