//! End-to-end detection against a view file and a file-backed store.

use tally_core::{
    format_csv, parse_csv, CompletionState, DetectionEngine, ExportSink, FileBackend,
    FileExportSink, LevelIndicator, MeasurementVector, SessionCategory, SessionStore,
    SnapshotFileSensor, StorageConfig, TickOutcome, ViewSnapshot,
};
use tempfile::tempdir;

const KEY: &str = "dataset";

fn write_view(path: &std::path::Path, game: u32, face: Option<&str>, tiles: &[&str]) {
    let view = ViewSnapshot {
        location: format!("https://minesweeper.online/game/{}?from=lobby", game),
        level_select: Some(LevelIndicator {
            id: "level_select_3".to_string(),
            label: Some("Expert".to_string()),
        }),
        face: Some(
            std::iter::once("top-area-face")
                .chain(face)
                .map(str::to_string)
                .collect(),
        ),
        tiles: tiles.iter().map(|t| t.to_string()).collect(),
    };
    fs_err::write(path, serde_json::to_string(&view).unwrap()).unwrap();
}

fn open_engine(storage: &StorageConfig) -> DetectionEngine<SnapshotFileSensor> {
    let store =
        SessionStore::load(Box::new(FileBackend::new(&storage.storage_file())), KEY).unwrap();
    DetectionEngine::new(SnapshotFileSensor::new(storage.view_snapshot_file()), store)
}

#[test]
fn test_game_is_recorded_when_view_flips_to_win() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();
    let mut engine = open_engine(&storage);

    write_view(&view, 1, None, &["hd_closed", "hd_closed"]);
    assert_eq!(
        engine.tick(),
        TickOutcome::NotWon(CompletionState::Unfinished)
    );

    write_view(
        &view,
        1,
        Some("hd_top-area-face-win"),
        &["hd_type0", "hd_type0", "hd_type1", "hd_type8"],
    );
    match engine.tick() {
        TickOutcome::Recorded { identity, record } => {
            assert_eq!(identity.as_str(), "https://minesweeper.online/game/1");
            assert_eq!(record.category, SessionCategory::Expert);
            assert_eq!(
                record.measurements,
                MeasurementVector::new([2, 1, 0, 0, 0, 0, 0, 0, 1])
            );
        }
        other => panic!("expected a recording, got {:?}", other),
    }

    assert_eq!(engine.tick(), TickOutcome::AlreadyLogged);
}

#[test]
fn test_recorded_games_survive_restart() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();

    {
        let mut engine = open_engine(&storage);
        write_view(&view, 7, Some("hd_top-area-face-win"), &["hd_type2"]);
        assert!(engine.tick().is_recorded());
    }

    let mut engine = open_engine(&storage);
    assert_eq!(engine.snapshot_count(), 1);
    assert!(engine.is_logged(&"https://minesweeper.online/game/7".into()));
    // Still on the same win screen after restart: not logged twice.
    assert_eq!(engine.tick(), TickOutcome::AlreadyLogged);
}

#[test]
fn test_lost_game_never_reaches_storage() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();
    let mut engine = open_engine(&storage);

    write_view(&view, 3, Some("hd_top-area-face-lose"), &["hd_type1"; 40]);
    for _ in 0..3 {
        assert_eq!(engine.tick(), TickOutcome::NotWon(CompletionState::Lost));
    }
    assert_eq!(engine.snapshot_count(), 0);
    assert!(!storage.storage_file().exists());
}

#[test]
fn test_corrupt_storage_starts_empty_and_recovers() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    fs_err::write(
        storage.storage_file(),
        r#"{"dataset":"{\"g1\": {\"type\": \"Expert\"}}"}"#,
    )
    .unwrap();

    let mut engine = open_engine(&storage);
    assert_eq!(engine.snapshot_count(), 0);

    write_view(
        &storage.view_snapshot_file(),
        2,
        Some("hd_top-area-face-win"),
        &[],
    );
    assert!(engine.tick().is_recorded());

    let reopened = open_engine(&storage);
    assert_eq!(reopened.snapshot_count(), 1);
}

#[test]
fn test_clear_then_export_writes_header_only_file() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();
    let mut engine = open_engine(&storage);

    for game in 1..=3 {
        write_view(&view, game, Some("hd_top-area-face-win"), &["hd_type0"]);
        assert!(engine.tick().is_recorded());
    }
    assert_eq!(engine.snapshot_count(), 3);

    write_view(&view, 4, None, &[]);
    engine.clear_all().unwrap();
    assert_eq!(engine.snapshot_count(), 0);

    let mut sink = FileExportSink::new(&temp.path().join("out"), "games.csv");
    let path = engine.export_all(&mut sink).unwrap();
    let text = fs_err::read_to_string(path).unwrap();
    assert_eq!(
        text,
        "url,game_difficulty,0_count,1_count,2_count,3_count,4_count,5_count,6_count,7_count,8_count"
    );
}

#[test]
fn test_export_round_trip_through_replace_all() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();
    let mut engine = open_engine(&storage);

    write_view(&view, 10, Some("hd_top-area-face-win"), &["hd_type0", "hd_type5"]);
    engine.tick();
    write_view(&view, 11, Some("hd_top-area-face-win"), &["hd_type3"]);
    engine.tick();

    let snapshot = engine.store().snapshot().clone();
    let reparsed = parse_csv(&format_csv(&snapshot).unwrap()).unwrap();

    write_view(&view, 12, None, &[]);
    engine.clear_all().unwrap();
    engine.replace_all(reparsed).unwrap();
    assert_eq!(engine.store().snapshot(), &snapshot);
}

struct CollectingSink {
    saved: Vec<String>,
}

impl ExportSink for CollectingSink {
    fn save(&mut self, content: &str) -> tally_core::Result<std::path::PathBuf> {
        self.saved.push(content.to_string());
        Ok(std::path::PathBuf::from("memory"))
    }
}

#[test]
fn test_export_all_hands_document_to_sink() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let mut engine = open_engine(&storage);
    write_view(
        &storage.view_snapshot_file(),
        5,
        Some("hd_top-area-face-win"),
        &["hd_type4"],
    );
    engine.tick();

    let mut sink = CollectingSink { saved: Vec::new() };
    engine.export_all(&mut sink).unwrap();
    assert_eq!(sink.saved.len(), 1);
    assert!(sink.saved[0]
        .ends_with("https://minesweeper.online/game/5,Expert,0,0,0,0,1,0,0,0,0"));
}

#[test]
fn test_unreadable_storage_fails_load_instead_of_starting_empty() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    fs_err::create_dir_all(storage.storage_file()).unwrap();

    let result = SessionStore::load(Box::new(FileBackend::new(&storage.storage_file())), KEY);
    assert!(result.is_err());
    assert!(storage.storage_file().is_dir());
}

#[test]
fn test_views_without_location_are_never_recorded() {
    let temp = tempdir().unwrap();
    let storage = StorageConfig::with_root(temp.path().to_path_buf());
    let view = storage.view_snapshot_file();
    let mut engine = open_engine(&storage);

    for level in ["level_select_3", "level_select_1"] {
        let snapshot = ViewSnapshot {
            location: String::new(),
            level_select: Some(LevelIndicator {
                id: level.to_string(),
                label: None,
            }),
            face: Some(vec!["hd_top-area-face-win".to_string()]),
            tiles: vec!["hd_type1".to_string()],
        };
        fs_err::write(&view, serde_json::to_string(&snapshot).unwrap()).unwrap();
        assert_eq!(engine.tick(), TickOutcome::NoIdentity);
    }
    assert_eq!(engine.snapshot_count(), 0);

    write_view(&view, 20, Some("hd_top-area-face-win"), &["hd_type1"]);
    assert!(engine.tick().is_recorded());
    write_view(&view, 21, Some("hd_top-area-face-win"), &["hd_type1"]);
    assert!(engine.tick().is_recorded());
    assert_eq!(engine.snapshot_count(), 2);
}
