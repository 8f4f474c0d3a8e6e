//! Feature assembly: project payload to IMDF documents.
//!
//! Assembly never fails. Missing ids, names, categories, and geometry are
//! replaced by fixed defaults so an in-progress drawing can always be
//! exported. Missing ids are derived with UUIDv5 from the feature type and
//! list position, which keeps the output a function of the input alone.

use uuid::Uuid;

use imdf_common::clock::{Clock, SystemClock};
use imdf_project_model::entity::{
    Amenity, Anchor, Category, Fixture, Level, Opening, ProjectData, Restriction, Unit,
};
use imdf_project_model::geometry::{
    polygon_center, ring_is_closed, unit_square, Coordinates, Geometry, GeometryKind, LineCoords,
    PolygonCoords, Position,
};

use crate::feature::{
    AmenityProperties, AnchorProperties, BuildingProperties, Feature, FeatureCollection,
    FeatureProperties, FeatureType, FixtureProperties, ImdfDataset, ImdfDocument,
    LevelProperties, Manifest, OpeningProperties, UnitProperties, VenueProperties,
    EMPTY_FEATURE_FILES, MANIFEST_FILE,
};

/// IMDF version written to the manifest.
pub const IMDF_VERSION: &str = "1.0.0";

/// Language tag written to the manifest.
pub const IMDF_LANGUAGE: &str = "en";

/// Namespace for ids derived from feature type and position.
pub const FEATURE_ID_NAMESPACE: Uuid = Uuid::from_u128(0x3d4c_8a5e_91b2_4f07_a6e3_5c1d_9b80_f2a4);

/// Assemble with the wall clock for manifest timestamps.
pub fn assemble(data: &ProjectData) -> ImdfDataset {
    assemble_with(data, &SystemClock)
}

/// Assemble all archive documents. Only the manifest reads `clock`.
pub fn assemble_with(data: &ProjectData, clock: &dyn Clock) -> ImdfDataset {
    let venue = data.venue.clone().unwrap_or_default();
    let building = data.building.clone().unwrap_or_default();

    let venue_id = feature_id(venue.id.as_deref(), FeatureType::Venue, 0);
    let building_id = feature_id(building.id.as_deref(), FeatureType::Building, 0);

    let venue_feature = Feature::new(
        venue_id,
        FeatureType::Venue,
        Geometry::point(venue.coordinates.unwrap_or([0.0, 0.0])),
        FeatureProperties::Venue(VenueProperties {
            category: Category::Business,
            restriction: Restriction::Restricted,
            name: venue.name.unwrap_or_else(|| "Venue".to_string()),
            alt_name: venue.alt_name.unwrap_or_default(),
        }),
    );

    let building_feature = Feature::new(
        building_id.clone(),
        FeatureType::Building,
        Geometry::Polygon {
            coordinates: polygon_or_square(building.coordinates.as_ref()),
        },
        FeatureProperties::Building(BuildingProperties {
            category: Category::Unspecified,
            restriction: Restriction::Restricted,
            name: building.name.unwrap_or_else(|| "Building".to_string()),
            alt_name: building.alt_name.unwrap_or_default(),
        }),
    );

    let levels = data
        .levels
        .iter()
        .enumerate()
        .map(|(i, level)| level_feature(i, level, &building_id))
        .collect();
    let units = data.units.iter().enumerate().map(|(i, u)| unit_feature(i, u)).collect();
    let amenities = data
        .amenities
        .iter()
        .enumerate()
        .map(|(i, a)| amenity_feature(i, a))
        .collect();
    let fixtures = data
        .fixtures
        .iter()
        .enumerate()
        .map(|(i, f)| fixture_feature(i, f))
        .collect();
    let openings = data
        .openings
        .iter()
        .enumerate()
        .map(|(i, o)| opening_feature(i, o))
        .collect();
    let anchors = data
        .anchors
        .iter()
        .enumerate()
        .map(|(i, a)| anchor_feature(i, a))
        .collect();

    let now = clock.timestamp();
    let manifest = Manifest {
        version: IMDF_VERSION.to_string(),
        language: IMDF_LANGUAGE.to_string(),
        created: now.clone(),
        updated: now,
    };

    let collection = |features: Vec<Feature>| ImdfDocument::Collection(FeatureCollection::new(features));
    let mut documents = vec![
        (FeatureType::Venue.file_name(), collection(vec![venue_feature])),
        (FeatureType::Building.file_name(), collection(vec![building_feature])),
        (FeatureType::Level.file_name(), collection(levels)),
        (FeatureType::Unit.file_name(), collection(units)),
        (FeatureType::Amenity.file_name(), collection(amenities)),
        (FeatureType::Fixture.file_name(), collection(fixtures)),
        (FeatureType::Opening.file_name(), collection(openings)),
        (FeatureType::Anchor.file_name(), collection(anchors)),
    ];
    documents.extend(
        EMPTY_FEATURE_FILES
            .iter()
            .map(|name| (*name, ImdfDocument::Collection(FeatureCollection::empty()))),
    );
    documents.push((MANIFEST_FILE, ImdfDocument::Manifest(manifest)));

    tracing::debug!(
        levels = data.levels.len(),
        units = data.units.len(),
        amenities = data.amenities.len(),
        fixtures = data.fixtures.len(),
        openings = data.openings.len(),
        anchors = data.anchors.len(),
        "Assembled IMDF dataset"
    );

    ImdfDataset::new(documents)
}

/// The given id, or one derived from the feature's type and position.
pub fn feature_id(explicit: Option<&str>, feature_type: FeatureType, index: usize) -> String {
    match explicit {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => {
            let name = format!("{feature_type}/{index}");
            Uuid::new_v5(&FEATURE_ID_NAMESPACE, name.as_bytes()).to_string()
        }
    }
}

fn level_feature(index: usize, level: &Level, building_id: &str) -> Feature {
    let id = feature_id(level.id.as_deref(), FeatureType::Level, index);
    let ordinal = level.ordinal.unwrap_or(0);

    if let Some(declared) = level.building_id.as_deref() {
        if declared != building_id {
            tracing::debug!(level = %id, declared, building = building_id, "Level re-parented to exported building");
        }
    }

    Feature::new(
        id,
        FeatureType::Level,
        Geometry::Polygon {
            coordinates: polygon_or_square(level.coordinates.as_ref()),
        },
        FeatureProperties::Level(LevelProperties {
            ordinal,
            category: Category::Unspecified,
            restriction: Restriction::Restricted,
            name: level.name.clone().unwrap_or_else(|| format!("Level {ordinal}")),
            short_name: level.short_name.clone().unwrap_or_else(|| ordinal.to_string()),
            building: building_id.to_string(),
        }),
    )
}

fn unit_feature(index: usize, unit: &Unit) -> Feature {
    let polygon = polygon_or_square(unit.coordinates.as_ref());
    let display_point = unit
        .display_point
        .as_ref()
        .and_then(Geometry::as_point)
        .or_else(|| polygon_center(&polygon))
        .unwrap_or([0.0, 0.0]);

    Feature::new(
        feature_id(unit.id.as_deref(), FeatureType::Unit, index),
        FeatureType::Unit,
        Geometry::Polygon {
            coordinates: polygon,
        },
        FeatureProperties::Unit(UnitProperties {
            category: unit.category.clone().unwrap_or(Category::Unspecified),
            restriction: unit.restriction.unwrap_or_default(),
            accessibility: unit.accessibility.clone(),
            name: unit.name.clone().unwrap_or_else(|| "Unit".to_string()),
            alt_name: unit.alt_name.clone().unwrap_or_default(),
            display_point: Geometry::point(display_point),
            level: unit.level_id.clone(),
        }),
    )
}

fn amenity_feature(index: usize, amenity: &Amenity) -> Feature {
    Feature::new(
        feature_id(amenity.id.as_deref(), FeatureType::Amenity, index),
        FeatureType::Amenity,
        Geometry::point(amenity.coordinates.unwrap_or([0.0, 0.0])),
        FeatureProperties::Amenity(AmenityProperties {
            category: amenity.category.clone().unwrap_or(Category::Seating),
            accessibility: amenity.accessibility.clone(),
            name: amenity.name.clone().unwrap_or_else(|| "Amenity".to_string()),
            alt_name: amenity.alt_name.clone().unwrap_or_default(),
            unit: amenity.unit_id.clone(),
            level: amenity.level_id.clone(),
        }),
    )
}

fn fixture_feature(index: usize, fixture: &Fixture) -> Feature {
    let kind = fixture.geometry_type.unwrap_or_default();
    Feature::new(
        feature_id(fixture.id.as_deref(), FeatureType::Fixture, index),
        FeatureType::Fixture,
        fixture_geometry(kind, fixture.coordinates.as_ref()),
        FeatureProperties::Fixture(FixtureProperties {
            category: fixture.category.clone().unwrap_or(Category::Wall),
            level: fixture.level_id.clone(),
        }),
    )
}

/// Geometry of the declared type. Coordinates of the wrong shape are
/// coerced where unambiguous and replaced by the default otherwise.
fn fixture_geometry(kind: GeometryKind, coords: Option<&Coordinates>) -> Geometry {
    match kind {
        GeometryKind::Point => {
            let point = match coords {
                Some(Coordinates::Point(p)) => Some(*p),
                Some(Coordinates::Line(line)) => line.first().copied(),
                _ => None,
            };
            Geometry::point(point.unwrap_or([0.0, 0.0]))
        }
        GeometryKind::LineString => {
            let line = match coords {
                Some(Coordinates::Line(line)) => Some(line),
                _ => None,
            };
            Geometry::LineString {
                coordinates: line_or_default(line),
            }
        }
    }
}

fn opening_feature(index: usize, opening: &Opening) -> Feature {
    Feature::new(
        feature_id(opening.id.as_deref(), FeatureType::Opening, index),
        FeatureType::Opening,
        Geometry::LineString {
            coordinates: line_or_default(opening.coordinates.as_ref()),
        },
        FeatureProperties::Opening(OpeningProperties {
            category: opening.category.clone().unwrap_or(Category::Door),
            accessibility: opening.accessibility.clone(),
            door: opening.door.unwrap_or_default(),
            level: opening.level_id.clone(),
        }),
    )
}

fn anchor_feature(index: usize, anchor: &Anchor) -> Feature {
    Feature::new(
        feature_id(anchor.id.as_deref(), FeatureType::Anchor, index),
        FeatureType::Anchor,
        Geometry::point(anchor.coordinates.unwrap_or([0.0, 0.0])),
        FeatureProperties::Anchor(AnchorProperties {
            unit: anchor.unit_id.clone(),
            address: anchor.address.clone().unwrap_or_default(),
        }),
    )
}

/// The polygon when it has an outer ring and every ring is closed, the
/// unit square otherwise.
fn polygon_or_square(polygon: Option<&PolygonCoords>) -> PolygonCoords {
    match polygon {
        Some(rings) if !rings.is_empty() && rings.iter().all(|r| ring_is_closed(r)) => {
            rings.clone()
        }
        _ => unit_square(),
    }
}

/// The line when it has at least two positions, the default line otherwise.
fn line_or_default(line: Option<&LineCoords>) -> LineCoords {
    match line {
        Some(line) if line.len() >= 2 => line.clone(),
        _ => default_line(),
    }
}

fn default_line() -> LineCoords {
    const START: Position = [0.0, 0.0];
    const END: Position = [0.0, 1.0];
    vec![START, END]
}

#[cfg(test)]
mod tests {
    use super::*;
    use imdf_common::clock::FixedClock;
    use serde_json::json;

    fn clock() -> FixedClock {
        FixedClock::parse("2024-05-01T10:00:00Z").unwrap()
    }

    fn assemble_json(value: serde_json::Value) -> ImdfDataset {
        assemble_with(&ProjectData::from_value(value).unwrap(), &clock())
    }

    fn to_json(dataset: &ImdfDataset, name: &str) -> serde_json::Value {
        serde_json::to_value(dataset.get(name).unwrap()).unwrap()
    }

    #[test]
    fn test_reference_example_unit() {
        let dataset = assemble_json(json!({
            "venue": {"name": "HQ", "coordinates": [1, 2]},
            "building": {"name": "B1"},
            "levels": [{"id": "L1", "name": "Ground", "ordinal": 0}],
            "units": [{"id": "U1", "name": "Room A", "category": "room", "levelId": "L1",
                       "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0], [0, 0]]]}]
        }));

        let units = to_json(&dataset, "unit.geojson");
        assert_eq!(units["type"], "FeatureCollection");
        let features = units["features"].as_array().unwrap();
        assert_eq!(features.len(), 1);
        assert_eq!(features[0]["id"], "U1");
        assert_eq!(features[0]["feature_type"], "unit");
        assert_eq!(features[0]["geometry"]["type"], "Polygon");
        assert_eq!(features[0]["properties"]["level"], "L1");
        assert_eq!(features[0]["properties"]["category"], "room");
        assert_eq!(features[0]["properties"]["restriction"], "restricted");
        assert_eq!(features[0]["properties"]["accessibility"], json!([]));
        assert_eq!(features[0]["properties"]["alt_name"], json!({}));
        assert_eq!(
            features[0]["properties"]["display_point"],
            json!({"type": "Point", "coordinates": [0.5, 0.5]})
        );

        let venue = to_json(&dataset, "venue.geojson");
        assert_eq!(venue["features"][0]["geometry"]["coordinates"], json!([1.0, 2.0]));
        assert_eq!(venue["features"][0]["properties"]["name"], "HQ");
        assert_eq!(venue["features"][0]["properties"]["category"], "business");

        let building_id = dataset.collection("building.geojson").unwrap().features[0]
            .id
            .clone();
        let level = to_json(&dataset, "level.geojson");
        assert_eq!(level["features"][0]["properties"]["building"], building_id.as_str());
        assert_eq!(level["features"][0]["properties"]["short_name"], "0");
    }

    #[test]
    fn test_empty_input_emits_every_document() {
        let dataset = assemble_with(&ProjectData::default(), &clock());
        assert_eq!(dataset.names(), crate::feature::IMDF_FILES.to_vec());

        let venue = to_json(&dataset, "venue.geojson");
        assert_eq!(
            venue["features"][0]["properties"],
            json!({"category": "business", "restriction": "restricted", "name": "Venue", "alt_name": {}})
        );
        assert_eq!(venue["features"][0]["geometry"]["coordinates"], json!([0.0, 0.0]));

        let building = to_json(&dataset, "building.geojson");
        assert_eq!(building["features"][0]["properties"]["name"], "Building");
        assert_eq!(
            building["features"][0]["geometry"]["coordinates"],
            json!([[[0.0, 0.0], [0.0, 1.0], [1.0, 1.0], [1.0, 0.0], [0.0, 0.0]]])
        );

        for name in ["level.geojson", "unit.geojson", "section.geojson", "kiosk.geojson"] {
            assert!(dataset.collection(name).unwrap().is_empty(), "{name}");
        }
    }

    #[test]
    fn test_manifest() {
        let dataset = assemble_with(&ProjectData::default(), &clock());
        let manifest = dataset.manifest().unwrap();
        assert_eq!(manifest.version, "1.0.0");
        assert_eq!(manifest.language, "en");
        assert_eq!(manifest.created, "2024-05-01T10:00:00.000Z");
        assert_eq!(manifest.updated, manifest.created);
    }

    #[test]
    fn test_defaults_for_partial_entities() {
        let dataset = assemble_json(json!({
            "levels": [{"ordinal": 2}],
            "units": [{}],
            "amenities": [{"levelId": "L1"}],
            "fixtures": [{}],
            "openings": [{}],
            "anchors": [{}]
        }));

        let level = &to_json(&dataset, "level.geojson")["features"][0];
        assert_eq!(level["properties"]["name"], "Level 2");
        assert_eq!(level["properties"]["short_name"], "2");
        assert_eq!(level["properties"]["ordinal"], 2);

        let unit = &to_json(&dataset, "unit.geojson")["features"][0];
        assert_eq!(unit["properties"]["name"], "Unit");
        assert_eq!(unit["properties"]["category"], "unspecified");
        assert_eq!(unit["properties"]["level"], serde_json::Value::Null);

        let amenity = &to_json(&dataset, "amenity.geojson")["features"][0];
        assert_eq!(amenity["properties"]["category"], "seating");
        assert_eq!(amenity["properties"]["name"], "Amenity");
        assert_eq!(amenity["properties"]["unit"], serde_json::Value::Null);

        let fixture = &to_json(&dataset, "fixture.geojson")["features"][0];
        assert_eq!(
            fixture["geometry"],
            json!({"type": "Point", "coordinates": [0.0, 0.0]})
        );
        assert_eq!(fixture["properties"]["category"], "wall");

        let opening = &to_json(&dataset, "opening.geojson")["features"][0];
        assert_eq!(opening["geometry"]["coordinates"], json!([[0.0, 0.0], [0.0, 1.0]]));
        assert_eq!(opening["properties"]["door"], "no");
        assert_eq!(opening["properties"]["category"], "door");

        let anchor = &to_json(&dataset, "anchor.geojson")["features"][0];
        assert_eq!(anchor["properties"], json!({"unit": null, "address": {}}));
    }

    #[test]
    fn test_degenerate_geometry_falls_back() {
        let dataset = assemble_json(json!({
            "building": {"coordinates": [[[0, 0], [1, 0], [1, 1]]]},
            "levels": [{"id": "L1", "coordinates": []}],
            "units": [
                {"id": "U1", "coordinates": []},
                {"id": "U2", "coordinates": [[[0, 0], [0, 1], [1, 1], [1, 0]]]},
                {"id": "U3", "coordinates": [[[0, 0], [0, 1], [1, 1], [0, 0]], [[0.1, 0.1]]]}
            ],
            "openings": [
                {"id": "O1", "coordinates": [[0.1, 0.2]]},
                {"id": "O2", "coordinates": []},
                {"id": "O3", "coordinates": [[0, 0], [0, 0.5], [0.5, 0.5]]}
            ],
            "fixtures": [{"geometryType": "LineString", "coordinates": [[2, 2]]}]
        }));

        let square = serde_json::to_value(unit_square()).unwrap();
        let building = &to_json(&dataset, "building.geojson")["features"][0];
        assert_eq!(building["geometry"]["coordinates"], square);
        let level = &to_json(&dataset, "level.geojson")["features"][0];
        assert_eq!(level["geometry"]["coordinates"], square);

        let units = &to_json(&dataset, "unit.geojson")["features"];
        for unit in units.as_array().unwrap() {
            assert_eq!(unit["geometry"]["coordinates"], square, "{}", unit["id"]);
        }

        let openings = &to_json(&dataset, "opening.geojson")["features"];
        let default = json!([[0.0, 0.0], [0.0, 1.0]]);
        assert_eq!(openings[0]["geometry"]["coordinates"], default);
        assert_eq!(openings[1]["geometry"]["coordinates"], default);
        assert_eq!(
            openings[2]["geometry"]["coordinates"],
            json!([[0.0, 0.0], [0.0, 0.5], [0.5, 0.5]])
        );

        let fixture = &to_json(&dataset, "fixture.geojson")["features"][0];
        assert_eq!(fixture["geometry"]["coordinates"], default);
    }

    #[test]
    fn test_malformed_fields_export_with_defaults() {
        let dataset = assemble_json(json!({
            "venue": {"name": "HQ", "coordinates": [1, 2, 30]},
            "levels": [{"id": "L1", "ordinal": 1.0}],
            "units": [{"id": "U1", "restriction": "members-only", "levelId": "L1"}],
            "fixtures": [{"id": "F1", "geometryType": "Polygon", "coordinates": [4, 5]}],
            "openings": [{"id": "O1", "door": "maybe"}]
        }));

        let venue = &to_json(&dataset, "venue.geojson")["features"][0];
        assert_eq!(venue["geometry"]["coordinates"], json!([1.0, 2.0]));
        let level = &to_json(&dataset, "level.geojson")["features"][0];
        assert_eq!(level["properties"]["ordinal"], 1);
        let unit = &to_json(&dataset, "unit.geojson")["features"][0];
        assert_eq!(unit["properties"]["restriction"], "restricted");
        let fixture = &to_json(&dataset, "fixture.geojson")["features"][0];
        assert_eq!(
            fixture["geometry"],
            json!({"type": "Point", "coordinates": [4.0, 5.0]})
        );
        let opening = &to_json(&dataset, "opening.geojson")["features"][0];
        assert_eq!(opening["properties"]["door"], "no");
    }

    #[test]
    fn test_unknown_fields_are_dropped() {
        let dataset = assemble_json(json!({
            "fixtures": [{"id": "F1", "levelId": "L1", "color": "red", "fabricObject": {"x": 1}}]
        }));
        let fixture = &to_json(&dataset, "fixture.geojson")["features"][0];
        let props = fixture["properties"].as_object().unwrap();
        assert_eq!(props.keys().collect::<Vec<_>>(), vec!["category", "level"]);
    }

    #[test]
    fn test_fixture_declared_line_string() {
        let dataset = assemble_json(json!({
            "fixtures": [
                {"geometryType": "LineString", "coordinates": [[0, 0], [0.5, 0]]},
                {"geometryType": "LineString", "coordinates": [3, 4]},
                {"geometryType": "Point", "coordinates": [[7, 8], [9, 9]]}
            ]
        }));
        let fixtures = &to_json(&dataset, "fixture.geojson")["features"];
        assert_eq!(
            fixtures[0]["geometry"],
            json!({"type": "LineString", "coordinates": [[0.0, 0.0], [0.5, 0.0]]})
        );
        assert_eq!(
            fixtures[1]["geometry"]["coordinates"],
            json!([[0.0, 0.0], [0.0, 1.0]])
        );
        assert_eq!(
            fixtures[2]["geometry"],
            json!({"type": "Point", "coordinates": [7.0, 8.0]})
        );
    }

    #[test]
    fn test_generated_ids_are_stable_and_distinct() {
        let a = feature_id(None, FeatureType::Unit, 0);
        let b = feature_id(None, FeatureType::Unit, 1);
        let c = feature_id(Some(""), FeatureType::Unit, 0);
        let d = feature_id(None, FeatureType::Amenity, 0);
        assert_eq!(a, c);
        assert_ne!(a, b);
        assert_ne!(a, d);
        assert!(Uuid::parse_str(&a).is_ok());
        assert_eq!(feature_id(Some("U1"), FeatureType::Unit, 0), "U1");
    }

    #[test]
    fn test_explicit_display_point_wins() {
        let dataset = assemble_json(json!({
            "units": [{"coordinates": [[[0, 0], [0, 2], [2, 2], [2, 0], [0, 0]]],
                       "display_point": {"type": "Point", "coordinates": [0.25, 0.75]}},
                      {"coordinates": [[[0, 0], [0, 2], [2, 2], [2, 0], [0, 0]]]}]
        }));
        let units = &to_json(&dataset, "unit.geojson")["features"];
        assert_eq!(units[0]["properties"]["display_point"]["coordinates"], json!([0.25, 0.75]));
        assert_eq!(units[1]["properties"]["display_point"]["coordinates"], json!([1.0, 1.0]));
    }
}
