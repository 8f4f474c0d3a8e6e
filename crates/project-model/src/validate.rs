//! Consistency checks over a project payload.
//!
//! Export never fails on an inconsistent payload, so these checks only
//! report. Each issue is a human-readable line.

use std::collections::HashSet;

use crate::entity::ProjectData;
use crate::geometry::{ring_is_closed, PolygonCoords};

/// Report dangling references and malformed geometry.
pub fn validate_project_data(data: &ProjectData) -> Vec<String> {
    let mut issues = Vec::new();

    let building_id = data.building.as_ref().and_then(|b| b.id.as_deref());
    let level_ids: HashSet<&str> = data.levels.iter().filter_map(|l| l.id.as_deref()).collect();
    let unit_ids: HashSet<&str> = data.units.iter().filter_map(|u| u.id.as_deref()).collect();

    if let Some(coords) = data.building.as_ref().and_then(|b| b.coordinates.as_ref()) {
        check_rings("Building", coords, &mut issues);
    }

    for (i, level) in data.levels.iter().enumerate() {
        let label = describe("Level", level.id.as_deref(), i);
        if let Some(building) = level.building_id.as_deref() {
            if Some(building) != building_id {
                issues.push(format!("{label} references unknown building {building}"));
            }
        }
        if let Some(coords) = &level.coordinates {
            check_rings(&label, coords, &mut issues);
        }
    }

    let mut check_level = |label: &str, level_id: Option<&str>| match level_id {
        None => issues.push(format!("{label} has no level")),
        Some(id) if !level_ids.contains(id) => {
            issues.push(format!("{label} references unknown level {id}"))
        }
        Some(_) => {}
    };

    for (i, unit) in data.units.iter().enumerate() {
        check_level(&describe("Unit", unit.id.as_deref(), i), unit.level_id.as_deref());
    }
    for (i, amenity) in data.amenities.iter().enumerate() {
        check_level(
            &describe("Amenity", amenity.id.as_deref(), i),
            amenity.level_id.as_deref(),
        );
    }
    for (i, fixture) in data.fixtures.iter().enumerate() {
        check_level(
            &describe("Fixture", fixture.id.as_deref(), i),
            fixture.level_id.as_deref(),
        );
    }
    for (i, opening) in data.openings.iter().enumerate() {
        check_level(
            &describe("Opening", opening.id.as_deref(), i),
            opening.level_id.as_deref(),
        );
    }

    for (i, unit) in data.units.iter().enumerate() {
        if let Some(coords) = &unit.coordinates {
            check_rings(&describe("Unit", unit.id.as_deref(), i), coords, &mut issues);
        }
    }

    for (i, amenity) in data.amenities.iter().enumerate() {
        if let Some(unit) = amenity.unit_id.as_deref() {
            if !unit_ids.contains(unit) {
                let label = describe("Amenity", amenity.id.as_deref(), i);
                issues.push(format!("{label} references unknown unit {unit}"));
            }
        }
    }

    for (i, opening) in data.openings.iter().enumerate() {
        if let Some(coords) = &opening.coordinates {
            if coords.len() != 2 {
                let label = describe("Opening", opening.id.as_deref(), i);
                issues.push(format!(
                    "{label} line has {} points, expected 2",
                    coords.len()
                ));
            }
        }
    }

    for (i, anchor) in data.anchors.iter().enumerate() {
        if let Some(unit) = anchor.unit_id.as_deref() {
            if !unit_ids.contains(unit) {
                let label = describe("Anchor", anchor.id.as_deref(), i);
                issues.push(format!("{label} references unknown unit {unit}"));
            }
        }
    }

    issues
}

fn describe(kind: &str, id: Option<&str>, index: usize) -> String {
    match id {
        Some(id) => format!("{kind} {id}"),
        None => format!("{kind} #{index}"),
    }
}

fn check_rings(label: &str, polygon: &PolygonCoords, issues: &mut Vec<String>) {
    if polygon.is_empty() {
        issues.push(format!("{label} polygon has no rings"));
    }
    for (r, ring) in polygon.iter().enumerate() {
        if !ring_is_closed(ring) {
            issues.push(format!("{label} ring {r} is not closed"));
        }
    }
}
