//! Debug utility for inspecting the recorded games and a captured view.
//!
//! ```text
//! tally-check                    # paths, config, stored games
//! tally-check view.json          # ...plus what the panel would show for that view
//! tally-check --export           # ...and write the CSV export
//! tally-check --watch view.json  # poll the view file and record wins until killed
//! ```

use std::env;
use std::path::PathBuf;
use std::thread;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use tally_core::poller::{lock_engine, shared};
use tally_core::{
    load_config, spawn_poller_with, DetectionEngine, FileBackend, FileExportSink, SessionStore,
    SnapshotFileSensor, StorageConfig, TallyConfig, TickOutcome, ViewSensor,
};

fn main() {
    init_logging();

    let storage = match StorageConfig::new() {
        Ok(storage) => storage,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };

    let config = load_config(&storage.config_file()).unwrap_or_else(|err| {
        warn!(error = %err, "Failed to load config; using defaults");
        TallyConfig::default()
    });

    let args: Vec<String> = env::args().skip(1).collect();
    let watch = args.iter().any(|a| a == "--watch");
    let export = args.iter().any(|a| a == "--export");
    let snapshot_path = args
        .iter()
        .find(|a| !a.starts_with("--"))
        .map(PathBuf::from)
        .unwrap_or_else(|| storage.view_snapshot_file());

    let store = match SessionStore::load(
        Box::new(FileBackend::new(&storage.storage_file())),
        &config.dataset_key,
    ) {
        Ok(store) => store,
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    };
    let engine = DetectionEngine::new(SnapshotFileSensor::new(&snapshot_path), store);
    let mut sink =
        FileExportSink::new(&config.export_dir_or(&storage), &config.export_file_name);

    println!("═══════════════════════════════════════════════════════════");
    println!("  Tile Tally Check");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    println!("Storage file: {}", storage.storage_file().display());
    println!("Config file:  {}", storage.config_file().display());
    println!("View file:    {}", snapshot_path.display());
    println!("Export file:  {}", sink.target().display());
    println!(
        "Poll:         {} ms, key {:?}",
        config.poll_interval().as_millis(),
        config.dataset_key
    );
    println!();

    println!(
        "── Recorded Games ({}) ─────────────────────────────────",
        engine.snapshot_count()
    );
    if engine.store().is_empty() {
        println!("  (no games recorded)");
    } else {
        for (identity, record) in engine.store().iter() {
            let counts: Vec<String> = record
                .measurements
                .counts()
                .iter()
                .map(u32::to_string)
                .collect();
            println!(
                "  {:<12} │ {} │ {}",
                record.category,
                counts.join(" "),
                identity
            );
        }
    }
    println!();

    println!("── Current View ──────────────────────────────────────────");
    let status = engine.status();
    let identity = engine
        .sensor()
        .current_identity()
        .map(|identity| identity.to_string())
        .unwrap_or_else(|| "-".to_string());
    println!("  Identity:   {}", identity);
    println!("  Logged:     {}", status.current_logged);
    println!("  Finished:   {}", status.finished);
    println!("  Difficulty: {}", status.difficulty);
    println!("  Tiles:      {}", status.tile_counts_text());
    println!();

    if export {
        match engine.export_all(&mut sink) {
            Ok(path) => println!(
                "Exported {} games to {}",
                engine.snapshot_count(),
                path.display()
            ),
            Err(err) => {
                eprintln!("{}", err);
                std::process::exit(1);
            }
        }
    }

    if !watch {
        return;
    }

    info!(path = %snapshot_path.display(), "Watching view file");
    let engine = shared(engine);
    let handle = spawn_poller_with(
        engine.clone(),
        config.poll_interval(),
        |outcome, status| {
            if let TickOutcome::Recorded { identity, record } = outcome {
                println!(
                    "  recorded {} ({}) │ total {}",
                    identity, record.category, status.total_logged
                );
            }
        },
    );

    match handle {
        Ok(_handle) => loop {
            thread::park();
            info!(total = lock_engine(&engine).snapshot_count(), "Still watching");
        },
        Err(err) => {
            eprintln!("{}", err);
            std::process::exit(1);
        }
    }
}

fn init_logging() {
    let debug_enabled = env::var("TILE_TALLY_DEBUG_LOG")
        .map(|value| matches!(value.as_str(), "1" | "true" | "TRUE" | "yes" | "YES"))
        .unwrap_or(false);
    let filter = if debug_enabled {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
