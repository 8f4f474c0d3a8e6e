//! Show project information.

use imdf_common::config::AppConfig;
use imdf_project_model::geometry::CoordinateNormalizer;
use imdf_project_model::session::Session;

pub fn run(config: &AppConfig, id: String) -> anyhow::Result<()> {
    let store = super::open_store(config)?;
    let project = store
        .load(&id)
        .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let data = project
        .project_data()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("Project: {}", project.name);
    println!("  ID: {}", project.id);
    println!("  Created: {}", project.created_at);
    println!("  Updated: {}", project.updated_at);
    if let Some(image) = &data.floorplan_image {
        println!("  Floor plan: {image}");
    }
    println!();

    println!("Venue:");
    let venue = data.venue.clone().unwrap_or_default();
    println!("  Name: {}", venue.name.as_deref().unwrap_or("-"));
    let [x, y] = venue.coordinates.unwrap_or([0.0, 0.0]);
    println!("  Coordinates: {x}, {y}");
    let building = data.building.clone().unwrap_or_default();
    println!("  Building: {}", building.name.as_deref().unwrap_or("-"));
    println!();

    let session = Session::from_project(&project, CoordinateNormalizer::new(config.scale_factor))
        .map_err(|e| anyhow::anyhow!("{e}"))?;
    let counts = session.counts();

    println!("Entities (scale 1/{}):", config.scale_factor);
    println!("  Levels: {}", counts.levels);
    for level in session.levels() {
        println!(
            "    [{}] {} ({})",
            level.ordinal.unwrap_or(0),
            level.name.as_deref().unwrap_or("-"),
            level.id.as_deref().unwrap_or("no id")
        );
    }
    println!("  Units: {}", counts.units);
    println!("  Amenities: {}", counts.amenities);
    println!("  Fixtures: {}", counts.fixtures);
    println!("  Openings: {}", counts.openings);
    println!("  Anchors: {}", data.anchors.len());

    Ok(())
}
