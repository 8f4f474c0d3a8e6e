//! IMDF output documents: GeoJSON features, collections, and the manifest.

use std::fmt;

use serde::Serialize;

use imdf_project_model::entity::{AddressMap, Category, DoorFlag, Labels, Restriction};
use imdf_project_model::geometry::Geometry;

pub const VENUE_FILE: &str = "venue.geojson";
pub const BUILDING_FILE: &str = "building.geojson";
pub const LEVEL_FILE: &str = "level.geojson";
pub const UNIT_FILE: &str = "unit.geojson";
pub const AMENITY_FILE: &str = "amenity.geojson";
pub const FIXTURE_FILE: &str = "fixture.geojson";
pub const OPENING_FILE: &str = "opening.geojson";
pub const ANCHOR_FILE: &str = "anchor.geojson";
pub const MANIFEST_FILE: &str = "manifest.json";

/// Feature types the archive must carry even though nothing populates them.
pub const EMPTY_FEATURE_FILES: [&str; 8] = [
    "address.geojson",
    "detail.geojson",
    "footprint.geojson",
    "geojson-spec.geojson",
    "kiosk.geojson",
    "occupant.geojson",
    "relationship.geojson",
    "section.geojson",
];

/// Every entry of an IMDF archive, in archive order.
pub const IMDF_FILES: [&str; 17] = [
    VENUE_FILE,
    BUILDING_FILE,
    LEVEL_FILE,
    UNIT_FILE,
    AMENITY_FILE,
    FIXTURE_FILE,
    OPENING_FILE,
    ANCHOR_FILE,
    EMPTY_FEATURE_FILES[0],
    EMPTY_FEATURE_FILES[1],
    EMPTY_FEATURE_FILES[2],
    EMPTY_FEATURE_FILES[3],
    EMPTY_FEATURE_FILES[4],
    EMPTY_FEATURE_FILES[5],
    EMPTY_FEATURE_FILES[6],
    EMPTY_FEATURE_FILES[7],
    MANIFEST_FILE,
];

/// Serializes as the literal `"Feature"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum FeatureTag {
    #[default]
    Feature,
}

/// Serializes as the literal `"FeatureCollection"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum CollectionTag {
    #[default]
    FeatureCollection,
}

/// IMDF feature type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureType {
    Venue,
    Building,
    Level,
    Unit,
    Amenity,
    Fixture,
    Opening,
    Anchor,
}

impl FeatureType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Venue => "venue",
            Self::Building => "building",
            Self::Level => "level",
            Self::Unit => "unit",
            Self::Amenity => "amenity",
            Self::Fixture => "fixture",
            Self::Opening => "opening",
            Self::Anchor => "anchor",
        }
    }

    /// Archive entry holding features of this type.
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Venue => VENUE_FILE,
            Self::Building => BUILDING_FILE,
            Self::Level => LEVEL_FILE,
            Self::Unit => UNIT_FILE,
            Self::Amenity => AMENITY_FILE,
            Self::Fixture => FIXTURE_FILE,
            Self::Opening => OPENING_FILE,
            Self::Anchor => ANCHOR_FILE,
        }
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single IMDF feature.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Feature {
    #[serde(rename = "type")]
    pub tag: FeatureTag,
    pub id: String,
    pub feature_type: FeatureType,
    pub geometry: Geometry,
    pub properties: FeatureProperties,
}

impl Feature {
    pub fn new(
        id: String,
        feature_type: FeatureType,
        geometry: Geometry,
        properties: FeatureProperties,
    ) -> Self {
        Self {
            tag: FeatureTag::Feature,
            id,
            feature_type,
            geometry,
            properties,
        }
    }
}

/// Per-type property sets. Field order is the serialized order.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum FeatureProperties {
    Venue(VenueProperties),
    Building(BuildingProperties),
    Level(LevelProperties),
    Unit(UnitProperties),
    Amenity(AmenityProperties),
    Fixture(FixtureProperties),
    Opening(OpeningProperties),
    Anchor(AnchorProperties),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VenueProperties {
    pub category: Category,
    pub restriction: Restriction,
    pub name: String,
    pub alt_name: Labels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BuildingProperties {
    pub category: Category,
    pub restriction: Restriction,
    pub name: String,
    pub alt_name: Labels,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LevelProperties {
    pub ordinal: i32,
    pub category: Category,
    pub restriction: Restriction,
    pub name: String,
    pub short_name: String,
    pub building: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UnitProperties {
    pub category: Category,
    pub restriction: Restriction,
    pub accessibility: Vec<String>,
    pub name: String,
    pub alt_name: Labels,
    pub display_point: Geometry,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AmenityProperties {
    pub category: Category,
    pub accessibility: Vec<String>,
    pub name: String,
    pub alt_name: Labels,
    pub unit: Option<String>,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FixtureProperties {
    pub category: Category,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OpeningProperties {
    pub category: Category,
    pub accessibility: Vec<String>,
    pub door: DoorFlag,
    pub level: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnchorProperties {
    pub unit: Option<String>,
    pub address: AddressMap,
}

/// A GeoJSON FeatureCollection.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureCollection {
    #[serde(rename = "type")]
    pub tag: CollectionTag,
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self {
            tag: CollectionTag::FeatureCollection,
            features,
        }
    }

    pub fn empty() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }
}

/// Archive manifest.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Manifest {
    pub version: String,
    pub language: String,
    pub created: String,
    pub updated: String,
}

/// One archive entry's content.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ImdfDocument {
    Collection(FeatureCollection),
    Manifest(Manifest),
}

/// All documents of an IMDF archive, keyed by entry name in archive order.
#[derive(Debug, Clone, PartialEq)]
pub struct ImdfDataset {
    documents: Vec<(&'static str, ImdfDocument)>,
}

impl ImdfDataset {
    pub(crate) fn new(documents: Vec<(&'static str, ImdfDocument)>) -> Self {
        Self { documents }
    }

    pub fn get(&self, name: &str) -> Option<&ImdfDocument> {
        self.documents
            .iter()
            .find(|(entry, _)| *entry == name)
            .map(|(_, doc)| doc)
    }

    pub fn collection(&self, name: &str) -> Option<&FeatureCollection> {
        match self.get(name)? {
            ImdfDocument::Collection(c) => Some(c),
            ImdfDocument::Manifest(_) => None,
        }
    }

    pub fn manifest(&self) -> Option<&Manifest> {
        match self.get(MANIFEST_FILE)? {
            ImdfDocument::Manifest(m) => Some(m),
            ImdfDocument::Collection(_) => None,
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &ImdfDocument)> {
        self.documents.iter().map(|(name, doc)| (*name, doc))
    }

    pub fn names(&self) -> Vec<&'static str> {
        self.documents.iter().map(|(name, _)| *name).collect()
    }

    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }
}
