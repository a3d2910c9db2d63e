use crate::error::{LocateError, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// A WGS84 point in the order the map expects it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }
}

/// A place the user can select.
///
/// `x` is the longitude and `y` the latitude. Both are optional because
/// provider records and quick links are normalized without failing; a
/// location only has to carry valid coordinates once it is selected, see
/// [`Location::coordinates`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub label: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounds: Option<[[f64; 2]; 2]>,
    /// Untouched provider record, kept for display.
    #[serde(default)]
    pub raw: Value,
}

impl Location {
    pub fn new(x: f64, y: f64, label: impl Into<String>) -> Self {
        Self {
            x: Some(x),
            y: Some(y),
            label: label.into(),
            bounds: None,
            raw: Value::Null,
        }
    }

    /// Validates the coordinates and returns them as a map point.
    pub fn coordinates(&self) -> Result<LatLng> {
        let (lng, lat) = match (self.x, self.y) {
            (Some(x), Some(y)) => (x, y),
            _ => return Err(self.invalid("missing longitude/latitude")),
        };
        if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
            return Err(self.invalid(&format!("longitude {} out of range", lng)));
        }
        if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
            return Err(self.invalid(&format!("latitude {} out of range", lat)));
        }
        Ok(LatLng::new(lat, lng))
    }

    /// Identifier shown next to the label, when the provider sent one.
    pub fn place_id(&self) -> Option<String> {
        self.raw.get("place_id").map(|id| match id {
            Value::String(s) => s.clone(),
            other => other.to_string(),
        })
    }

    fn invalid(&self, reason: &str) -> LocateError {
        LocateError::InvalidLocation {
            label: self.label.clone(),
            reason: reason.to_string(),
        }
    }
}

// Normalize one geocoder record (Nominatim `format=json`) into a Location.
// Nominatim sends coordinates as strings and the bounding box as
// [south, north, west, east].
impl From<Value> for Location {
    fn from(record: Value) -> Self {
        let bounds = record
            .get("boundingbox")
            .and_then(Value::as_array)
            .and_then(|bb| {
                let v: Vec<f64> = bb.iter().filter_map(coordinate_from_value).collect();
                (v.len() == 4).then(|| [[v[0], v[2]], [v[1], v[3]]])
            });

        Self {
            x: record.get("lon").and_then(coordinate_from_value),
            y: record.get("lat").and_then(coordinate_from_value),
            label: record
                .get("display_name")
                .or_else(|| record.get("label"))
                .and_then(Value::as_str)
                .unwrap_or("")
                .to_string(),
            bounds,
            raw: record,
        }
    }
}

/// One debounce cycle's worth of input.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct SearchQuery {
    pub input: String,
}

impl SearchQuery {
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// A pre-defined shortcut shown without searching.
///
/// Built from the loaded JSON record, which is kept as-is in `raw` and
/// handed to [`Location::raw`] on selection.
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
#[serde(from = "Value")]
pub struct QuickLink {
    pub display_name: Option<String>,
    pub lat: Option<f64>,
    pub lon: Option<f64>,
    pub kind: Option<String>,
    pub raw: Value,
}

// Never fails: numbers and numeric strings are read as coordinates, anything
// else leaves the field absent.
impl From<Value> for QuickLink {
    fn from(record: Value) -> Self {
        let text = |key: &str| record.get(key).and_then(Value::as_str).map(str::to_string);

        Self {
            display_name: text("display_name"),
            lat: record.get("lat").and_then(coordinate_from_value),
            lon: record.get("lon").and_then(coordinate_from_value),
            kind: text("type"),
            raw: record,
        }
    }
}

impl QuickLink {
    /// Maps `lon/lat/display_name` onto `x/y/label`. Never fails; missing
    /// fields stay absent and are rejected later, on selection.
    pub fn to_location(&self) -> Location {
        Location {
            x: self.lon,
            y: self.lat,
            label: self.display_name.clone().unwrap_or_default(),
            bounds: None,
            raw: self.raw.clone(),
        }
    }

    pub fn type_label(&self) -> String {
        self.kind.as_deref().unwrap_or("").to_uppercase()
    }
}

#[derive(Deserialize)]
pub struct QuickLinksResponse {
    #[serde(default)]
    pub data: Vec<QuickLink>,
}

/// A pan/zoom instruction for the map surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewportCommand {
    pub target: LatLng,
    pub zoom: f64,
    pub duration: Duration,
}

fn coordinate_from_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}
