use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Zoom level applied by the first fix and by an explicit recenter.
pub const RECENTER_ZOOM: u8 = 15;

/// Zoom level used before any fix has arrived.
pub const FALLBACK_ZOOM: u8 = 13;

/// Map center used before any fix has arrived (village square of the tour area).
pub const FALLBACK_CENTER: GeoCoordinate = GeoCoordinate {
    latitude: 52.1400,
    longitude: 12.5930,
};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCoordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl GeoCoordinate {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    De,
}

impl Locale {
    pub fn code(self) -> &'static str {
        match self {
            Locale::En => "en",
            Locale::De => "de",
        }
    }

    /// Parse a language tag such as `de`, `DE` or `de-AT`.
    pub fn parse(tag: &str) -> Option<Locale> {
        let primary = tag.split(['-', '_']).next()?.to_ascii_lowercase();
        match primary.as_str() {
            "en" => Some(Locale::En),
            "de" => Some(Locale::De),
            _ => None,
        }
    }

    /// The other locale of the two-value switch.
    pub fn toggled(self) -> Locale {
        match self {
            Locale::En => Locale::De,
            Locale::De => Locale::En,
        }
    }
}

impl std::fmt::Display for Locale {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalizedText {
    pub en: String,
    pub de: String,
}

impl LocalizedText {
    pub fn new(en: impl Into<String>, de: impl Into<String>) -> Self {
        Self {
            en: en.into(),
            de: de.into(),
        }
    }

    fn empty() -> Self {
        Self::new("", "")
    }

    pub fn get(&self, locale: Locale) -> &str {
        match locale {
            Locale::En => &self.en,
            Locale::De => &self.de,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Poi {
    pub id: String,
    pub coordinates: GeoCoordinate,
    /// Unlock radius in meters.
    pub geofence_radius: f64,
    pub name: LocalizedText,
    #[serde(default = "LocalizedText::empty")]
    pub description: LocalizedText,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Position {
    pub coordinates: GeoCoordinate,
    /// Milliseconds since the Unix epoch, as reported by the position source.
    pub timestamp_ms: f64,
}

/// Per-POI "within range" flags, keyed by POI id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProximityState {
    entries: BTreeMap<String, bool>,
}

impl ProximityState {
    pub fn insert(&mut self, poi_id: impl Into<String>, in_range: bool) {
        self.entries.insert(poi_id.into(), in_range);
    }

    /// Unknown ids are reported as out of range.
    pub fn is_in_range(&self, poi_id: &str) -> bool {
        self.entries.get(poi_id).copied().unwrap_or(false)
    }

    pub fn get(&self, poi_id: &str) -> Option<bool> {
        self.entries.get(poi_id).copied()
    }

    pub fn in_range_ids(&self) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(|(_, in_range)| **in_range)
            .map(|(id, _)| id.as_str())
    }

    /// POIs in range now that were not in range in `previous`.
    pub fn entered_since<'a>(&'a self, previous: &ProximityState) -> Vec<&'a str> {
        self.in_range_ids()
            .filter(|id| !previous.is_in_range(id))
            .collect()
    }

    pub fn any_in_range(&self) -> bool {
        self.entries.values().any(|v| *v)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: GeoCoordinate,
    pub zoom: u8,
}

impl ViewState {
    pub fn fallback() -> Self {
        Self {
            center: FALLBACK_CENTER,
            zoom: FALLBACK_ZOOM,
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self::fallback()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, thiserror::Error)]
#[serde(rename_all = "camelCase")]
pub enum LocationError {
    #[error("geolocation is not supported on this device")]
    CapabilityUnavailable,
    #[error("permission to read the location was denied")]
    PermissionDenied,
    #[error("the current position is unavailable")]
    PositionUnavailable,
    #[error("timed out waiting for a position fix")]
    Timeout,
    #[error("unknown geolocation error")]
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Question {
    pub prompt: LocalizedText,
    pub options: [LocalizedText; 4],
    /// Zero-based index into `options`.
    pub correct_index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSet {
    pub poi_id: String,
    pub questions: Vec<Question>,
}
