use std::path::Path;

use sd_simulation::SimConfig;

pub fn run(level_path: &Path) -> Result<(), String> {
    let (name, level) = super::load_level(level_path, SimConfig::default())?;
    let geometry = level.geometry();
    let two_sided = geometry.lines().iter().filter(|l| l.is_two_sided()).count();
    let actors = level.actors().map_or(0, <[_]>::len);

    println!("  All checks passed for '{name}'.");
    println!(
        "  {} sectors, {} lines ({} two-sided), {} tags, {} actors",
        geometry.sector_count(),
        geometry.lines().len(),
        two_sided,
        geometry.tags().len(),
        actors
    );

    Ok(())
}
