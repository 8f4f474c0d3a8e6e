//! Indoor-map entities as they are drawn, persisted, and exported.
//!
//! Every field is optional on input: drawings are saved and exported while
//! still in progress, so absent values are filled with documented defaults
//! at export time rather than rejected here. A field whose value has the
//! wrong shape is read as absent, so one bad value never blocks a save or an
//! export. Field names follow the persisted project format (`levelId`,
//! `unitId`, `geometryType`, ...).

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::geometry::{Coordinates, Geometry, GeometryKind, LineCoords, PolygonCoords, Position};

/// Language-tagged alternative names, e.g. `{"en": "Lobby"}`.
pub type Labels = BTreeMap<String, String>;

/// Free-form address properties carried by anchors.
pub type AddressMap = serde_json::Map<String, serde_json::Value>;

/// Feature category. Known values get their own variant; anything else is
/// kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Category {
    Room,
    Office,
    Conference,
    Seating,
    Restroom,
    Elevator,
    Stairs,
    Wall,
    Door,
    Business,
    Unspecified,
    Other(String),
}

impl Category {
    pub fn as_str(&self) -> &str {
        match self {
            Self::Room => "room",
            Self::Office => "office",
            Self::Conference => "conference",
            Self::Seating => "seating",
            Self::Restroom => "restroom",
            Self::Elevator => "elevator",
            Self::Stairs => "stairs",
            Self::Wall => "wall",
            Self::Door => "door",
            Self::Business => "business",
            Self::Unspecified => "unspecified",
            Self::Other(s) => s,
        }
    }
}

impl From<String> for Category {
    fn from(value: String) -> Self {
        match value.as_str() {
            "room" => Self::Room,
            "office" => Self::Office,
            "conference" => Self::Conference,
            "seating" => Self::Seating,
            "restroom" => Self::Restroom,
            "elevator" => Self::Elevator,
            "stairs" => Self::Stairs,
            "wall" => Self::Wall,
            "door" => Self::Door,
            "business" => Self::Business,
            "unspecified" => Self::Unspecified,
            _ => Self::Other(value),
        }
    }
}

impl From<&str> for Category {
    fn from(value: &str) -> Self {
        Self::from(value.to_string())
    }
}

impl From<Category> for String {
    fn from(value: Category) -> Self {
        match value {
            Category::Other(s) => s,
            known => known.as_str().to_string(),
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Access restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Restriction {
    Open,
    #[default]
    Restricted,
}

/// Whether an opening is a door.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DoorFlag {
    Yes,
    #[default]
    No,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Venue {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub alt_name: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::position")]
    pub coordinates: Option<Position>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Building {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub alt_name: Option<Labels>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub coordinates: Option<PolygonCoords>,
}

/// A floor. `ordinal` orders levels vertically within the building.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Level {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::ordinal")]
    pub ordinal: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub short_name: Option<String>,
    #[serde(
        rename = "buildingId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub building_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub coordinates: Option<PolygonCoords>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Unit {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::restriction")]
    pub restriction: Option<Restriction>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::list")]
    pub accessibility: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub alt_name: Option<Labels>,
    #[serde(
        rename = "levelId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub level_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub coordinates: Option<PolygonCoords>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub display_point: Option<Geometry>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Amenity {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::list")]
    pub accessibility: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub alt_name: Option<Labels>,
    #[serde(
        rename = "unitId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub unit_id: Option<String>,
    #[serde(
        rename = "levelId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub level_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::position")]
    pub coordinates: Option<Position>,
}

/// A fixture. Its geometry type is declared by the caller.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Fixture {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub category: Option<Category>,
    #[serde(
        rename = "levelId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub level_id: Option<String>,
    #[serde(
        rename = "geometryType",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::geometry_kind"
    )]
    pub geometry_type: Option<GeometryKind>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Opening {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub category: Option<Category>,
    #[serde(skip_serializing_if = "Vec::is_empty", deserialize_with = "lenient::list")]
    pub accessibility: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::door")]
    pub door: Option<DoorFlag>,
    #[serde(
        rename = "levelId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub level_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub coordinates: Option<LineCoords>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Anchor {
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub id: Option<String>,
    #[serde(
        rename = "unitId",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub unit_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub address: Option<AddressMap>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::position")]
    pub coordinates: Option<Position>,
}

/// The entity payload of a project.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProjectData {
    #[serde(
        rename = "projectName",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub project_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub venue: Option<Venue>,
    #[serde(skip_serializing_if = "Option::is_none", deserialize_with = "lenient::value")]
    pub building: Option<Building>,
    pub levels: Vec<Level>,
    pub units: Vec<Unit>,
    pub amenities: Vec<Amenity>,
    pub fixtures: Vec<Fixture>,
    pub openings: Vec<Opening>,
    pub anchors: Vec<Anchor>,
    /// Stored location of the uploaded floor-plan image.
    #[serde(
        rename = "floorplanImage",
        skip_serializing_if = "Option::is_none",
        deserialize_with = "lenient::value"
    )]
    pub floorplan_image: Option<String>,
}

impl ProjectData {
    /// Parse a payload from loosely typed JSON.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Remove a level and every unit, amenity, fixture, and opening on it.
    /// Returns the number of dependent entities removed, or `None` if no
    /// level has that id.
    pub fn remove_level(&mut self, level_id: &str) -> Option<usize> {
        let before = self.levels.len();
        self.levels.retain(|l| l.id.as_deref() != Some(level_id));
        if self.levels.len() == before {
            return None;
        }

        let on_level = |id: &Option<String>| id.as_deref() == Some(level_id);
        let dependents = self.units.len()
            + self.amenities.len()
            + self.fixtures.len()
            + self.openings.len();
        self.units.retain(|u| !on_level(&u.level_id));
        self.amenities.retain(|a| !on_level(&a.level_id));
        self.fixtures.retain(|f| !on_level(&f.level_id));
        self.openings.retain(|o| !on_level(&o.level_id));
        let remaining = self.units.len()
            + self.amenities.len()
            + self.fixtures.len()
            + self.openings.len();

        Some(dependents - remaining)
    }
}

/// Field readers that map malformed values to "absent" instead of failing.
mod lenient {
    use serde::de::DeserializeOwned;
    use serde::{Deserialize, Deserializer};
    use serde_json::Value;

    use super::{DoorFlag, Restriction};
    use crate::geometry::{GeometryKind, Position};

    pub fn value<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(serde_json::from_value(raw).ok())
    }

    /// Elements of the wrong type are dropped.
    pub fn list<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
    where
        D: Deserializer<'de>,
        T: DeserializeOwned,
    {
        match Value::deserialize(deserializer)? {
            Value::Array(items) => Ok(items
                .into_iter()
                .filter_map(|item| serde_json::from_value(item).ok())
                .collect()),
            _ => Ok(Vec::new()),
        }
    }

    /// Integers, or floats with no fractional part, that fit in an `i32`.
    pub fn ordinal<'de, D>(deserializer: D) -> Result<Option<i32>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        if let Some(n) = raw.as_i64() {
            return Ok(i32::try_from(n).ok());
        }
        Ok(raw
            .as_f64()
            .filter(|f| f.fract() == 0.0 && *f >= f64::from(i32::MIN) && *f <= f64::from(i32::MAX))
            .map(|f| f as i32))
    }

    /// `[x, y]`; extra components such as altitude are ignored.
    pub fn position<'de, D>(deserializer: D) -> Result<Option<Position>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let Some(items) = raw.as_array() else {
            return Ok(None);
        };
        match (
            items.first().and_then(Value::as_f64),
            items.get(1).and_then(Value::as_f64),
        ) {
            (Some(x), Some(y)) => Ok(Some([x, y])),
            _ => Ok(None),
        }
    }

    pub fn restriction<'de, D>(deserializer: D) -> Result<Option<Restriction>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw.as_str().map(str::to_ascii_lowercase).as_deref() {
            Some("open") => Some(Restriction::Open),
            Some("restricted") => Some(Restriction::Restricted),
            _ => None,
        })
    }

    /// `"yes"`/`"no"`, and booleans.
    pub fn door<'de, D>(deserializer: D) -> Result<Option<DoorFlag>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let flag = match Value::deserialize(deserializer)? {
            Value::Bool(true) => Some(DoorFlag::Yes),
            Value::Bool(false) => Some(DoorFlag::No),
            Value::String(s) => match s.to_ascii_lowercase().as_str() {
                "yes" | "true" => Some(DoorFlag::Yes),
                "no" | "false" => Some(DoorFlag::No),
                _ => None,
            },
            _ => None,
        };
        Ok(flag)
    }

    pub fn geometry_kind<'de, D>(deserializer: D) -> Result<Option<GeometryKind>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        Ok(match raw.as_str().map(str::to_ascii_lowercase).as_deref() {
            Some("point") => Some(GeometryKind::Point),
            Some("linestring") => Some(GeometryKind::LineString),
            _ => None,
        })
    }
}
