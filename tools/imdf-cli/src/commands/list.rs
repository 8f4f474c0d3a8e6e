//! List stored projects.

use imdf_common::config::AppConfig;

pub fn run(config: &AppConfig) -> anyhow::Result<()> {
    let store = super::open_store(config)?;
    let summaries = store
        .list()
        .map_err(|e| anyhow::anyhow!("Failed to list projects: {e}"))?;

    if summaries.is_empty() {
        println!("No projects in {}", store.root().display());
        return Ok(());
    }

    let id_width = summaries.iter().map(|s| s.id.len()).max().unwrap_or(2).max(2);
    println!("{:<id_width$}  {:<24}  {:<24}  NAME", "ID", "CREATED", "UPDATED");
    for s in &summaries {
        println!(
            "{:<id_width$}  {:<24}  {:<24}  {}",
            s.id, s.created_at, s.updated_at, s.name
        );
    }
    println!("\n{} project(s)", summaries.len());

    Ok(())
}
