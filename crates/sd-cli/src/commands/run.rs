use std::path::Path;

use colored::Colorize;
use log::info;
use sd_simulation::{Activation, SimConfig};

pub fn run(
    level_path: &Path,
    script: Option<&Path>,
    tics: u64,
    config: SimConfig,
    save: Option<&Path>,
    verbose: bool,
) -> Result<(), String> {
    let seed = config.seed;
    let crush_mode = config.crush_mode;
    let (name, mut level) = super::load_level(level_path, config)?;

    let activations = match script {
        Some(path) => Activation::list_from_json(&super::read(path)?)
            .map_err(|e| format!("{}: {e}", path.display()))?,
        None => Vec::new(),
    };

    let mut started = 0;
    for activation in &activations {
        if level.activate(activation) {
            info!("activated {activation}");
            started += 1;
        } else {
            println!("  {} {activation} had no effect", "SKIP".yellow().bold());
        }
    }
    level.run(tics);

    println!(
        "  {} '{}' {}",
        "Run".bold(),
        name,
        format!("({tics} tics, seed={seed}, crush={crush_mode:?})").dimmed()
    );
    println!(
        "  {} of {} activations took effect, {} movers still running, {} events logged",
        started,
        activations.len(),
        level.movers().len(),
        level.events().len()
    );
    println!("  Level time: {:.2}s", level.clock().seconds());
    println!();

    super::print_report(&level, verbose);

    if let Some(path) = save {
        super::save_snapshot(&level, path)?;
    }
    Ok(())
}
