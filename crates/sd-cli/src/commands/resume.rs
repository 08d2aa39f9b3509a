use std::path::Path;

use colored::Colorize;
use sd_simulation::SimConfig;

pub fn run(
    level_path: &Path,
    snapshot_path: &Path,
    tics: u64,
    save: Option<&Path>,
    verbose: bool,
) -> Result<(), String> {
    let (name, mut level) = super::load_level(level_path, SimConfig::default())?;
    let snapshot = super::load_snapshot(snapshot_path)?;
    let report = level
        .restore(snapshot)
        .map_err(|e| format!("cannot restore {}: {e}", snapshot_path.display()))?;
    let from = level.clock().tic();
    level.run(tics);

    println!(
        "  {} '{}' {}",
        "Resumed".bold(),
        name,
        format!("(tic {from} + {tics} tics)").dimmed()
    );
    println!(
        "  {} movers and {} scrollers restored",
        report.movers, report.scrollers
    );
    let dropped = report.dropped_movers + report.dropped_scrollers;
    if dropped > 0 {
        println!("  {} {dropped} invalid entries dropped", "WARN".yellow().bold());
    }
    println!();

    super::print_report(&level, verbose);

    if let Some(path) = save {
        super::save_snapshot(&level, path)?;
    }
    Ok(())
}
