//! Validate a stored project.

use imdf_common::config::AppConfig;
use imdf_project_model::validate::validate_project_data;

pub fn run(config: &AppConfig, id: String) -> anyhow::Result<()> {
    println!("Validating project: {id}");

    let store = super::open_store(config)?;
    let project = store
        .load(&id)
        .map_err(|e| anyhow::anyhow!("Failed to load project: {e}"))?;
    let data = project
        .project_data()
        .map_err(|e| anyhow::anyhow!("{e}"))?;

    println!("  Name: {}", project.name);
    println!("  Levels: {}", data.levels.len());
    println!("  Units: {}", data.units.len());

    let issues = validate_project_data(&data);
    if issues.is_empty() {
        println!("\nProject is valid.");
    } else {
        println!("\nValidation issues:");
        for issue in &issues {
            println!("  - {issue}");
        }
        println!(
            "\n{} issue(s) found. The export will substitute defaults where needed.",
            issues.len()
        );
    }

    Ok(())
}
