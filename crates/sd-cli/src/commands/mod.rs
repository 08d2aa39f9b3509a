pub mod check;
pub mod resume;
pub mod run;

use std::fs;
use std::path::Path;

use colored::Colorize;
use comfy_table::{ContentArrangement, Table};
use sd_core::{LevelData, Plane, SectorId};
use sd_simulation::{Level, LevelSnapshot, Mover, SimConfig, SimEventKind};

/// Read a file, naming it in the error.
fn read(path: &Path) -> Result<String, String> {
    fs::read_to_string(path).map_err(|e| format!("cannot read {}: {e}", path.display()))
}

/// Parse a level file without building the simulation around it.
fn load_data(path: &Path) -> Result<LevelData, String> {
    LevelData::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

/// Load a level file into a runnable level. Returns the level name too.
fn load_level(path: &Path, config: SimConfig) -> Result<(String, Level), String> {
    let data = load_data(path)?;
    let name = if data.name.is_empty() {
        path.display().to_string()
    } else {
        data.name.clone()
    };
    let level = Level::from_data(data, config).map_err(|e| format!("{}: {e}", path.display()))?;
    Ok((name, level))
}

/// Write the level state as a snapshot file.
fn save_snapshot(level: &Level, path: &Path) -> Result<(), String> {
    let json = level
        .snapshot()
        .to_json()
        .map_err(|e| format!("snapshot failed: {e}"))?;
    fs::write(path, json).map_err(|e| format!("cannot write {}: {e}", path.display()))?;
    println!("  Snapshot written to {}", path.display());
    Ok(())
}

/// Read a snapshot file.
fn load_snapshot(path: &Path) -> Result<LevelSnapshot, String> {
    LevelSnapshot::from_json(&read(path)?).map_err(|e| format!("{}: {e}", path.display()))
}

/// Print the event log (all of it when verbose, crushes otherwise) and the
/// sector table.
fn print_report(level: &Level, verbose: bool) {
    let events = level.events().events();
    if verbose {
        println!("  {}", "Event Log".bold().underline());
        println!();
        for event in events {
            let tic_label = format!("[tic {:>4}]", event.tic).dimmed();
            println!("  {tic_label} {}", colorize_event(&event.kind));
        }
        if events.is_empty() {
            println!("  {}", "(no events)".dimmed());
        }
        println!();
    } else {
        let crushes: Vec<_> = events
            .iter()
            .filter(|e| matches!(e.kind, SimEventKind::ActorsCrushed { .. }))
            .collect();
        if !crushes.is_empty() {
            println!("  {}", "Notable Events".bold().underline());
            for event in crushes {
                println!("  {}  [tic {}] {}", "CRUSH".red().bold(), event.tic, event.kind);
            }
            println!();
        }
    }

    println!("  {}", "Sectors".bold().underline());
    println!();

    let mut table = Table::new();
    table.set_content_arrangement(ContentArrangement::Dynamic);
    table.set_header(vec!["Sector", "Tag", "Floor", "Ceiling", "Floor mover", "Ceiling mover"]);
    for (index, sector) in level.geometry().sectors().iter().enumerate() {
        let id = SectorId(index);
        table.add_row(vec![
            id.to_string(),
            sector.tag.to_string(),
            format_height(sector.floor_height),
            format_height(sector.ceiling_height),
            describe_owner(level.owner(id, Plane::Floor)),
            describe_owner(level.owner(id, Plane::Ceiling)),
        ]);
    }
    println!("{table}");
    println!();
}

fn describe_owner(mover: Option<&Mover>) -> String {
    match mover {
        Some(m) if m.in_stasis() => format!("{} ({}, stasis)", m.family(), m.id()),
        Some(m) => format!("{} ({})", m.family(), m.id()),
        None => "--".to_string(),
    }
}

fn format_height(height: f64) -> String {
    if height.fract() == 0.0 {
        format!("{height:.0}")
    } else {
        format!("{height:.2}")
    }
}

fn colorize_event(kind: &SimEventKind) -> colored::ColoredString {
    let description = kind.to_string();
    match kind {
        SimEventKind::ActorsCrushed { .. } => description.red().bold(),
        SimEventKind::MoverStarted { .. } => description.green(),
        SimEventKind::MoverFinished { .. } => description.cyan(),
        SimEventKind::MoverStopped { .. } | SimEventKind::MoverResumed { .. } => description.yellow(),
        SimEventKind::SoundStarted { .. } | SimEventKind::SoundStopped { .. } => description.dimmed(),
        SimEventKind::LightPartway { .. }
        | SimEventKind::TextureChanged { .. }
        | SimEventKind::SpecialChanged { .. }
        | SimEventKind::LineTextureChanged { .. }
        | SimEventKind::LineBlocking { .. } => description.blue(),
    }
}
