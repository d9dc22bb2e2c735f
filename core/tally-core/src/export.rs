//! CSV export of recorded sessions.
//!
//! ```text
//! url,game_difficulty,0_count,1_count,2_count,3_count,4_count,5_count,6_count,7_count,8_count
//! https://minesweeper.online/game/123,Expert,5,3,0,0,0,0,0,0,1
//! ```
//!
//! Rows are joined with `\n` and the document has no trailing newline. Fields are
//! quoted only when they need it, so comma-free identities come out bare.

use std::path::{Path, PathBuf};

use csv::{QuoteStyle, ReaderBuilder, Terminator, WriterBuilder};

use crate::error::{Result, TallyError};
use crate::store::SessionMap;
use crate::types::{
    MeasurementVector, SessionCategory, SessionIdentity, SessionRecord, TILE_STATE_COUNT,
};

pub const DEFAULT_EXPORT_FILE_NAME: &str = "games.csv";

pub const CSV_HEADER: [&str; 2 + TILE_STATE_COUNT] = [
    "url",
    "game_difficulty",
    "0_count",
    "1_count",
    "2_count",
    "3_count",
    "4_count",
    "5_count",
    "6_count",
    "7_count",
    "8_count",
];

/// Formats every record, in the map's iteration order, under the header row.
pub fn format_csv(sessions: &SessionMap) -> Result<String> {
    let mut wtr = WriterBuilder::new()
        .quote_style(QuoteStyle::Necessary)
        .terminator(Terminator::Any(b'\n'))
        .from_writer(Vec::new());

    wtr.write_record(CSV_HEADER).map_err(|e| TallyError::Csv {
        context: "Failed to write header".to_string(),
        source: e,
    })?;

    for (identity, record) in sessions {
        let mut row = Vec::with_capacity(CSV_HEADER.len());
        row.push(identity.as_str().to_string());
        row.push(record.category.label().to_string());
        row.extend(record.measurements.counts().iter().map(u32::to_string));

        wtr.write_record(&row).map_err(|e| TallyError::Csv {
            context: format!("Failed to write row for {}", identity),
            source: e,
        })?;
    }

    let bytes = wtr
        .into_inner()
        .map_err(|e| TallyError::io("Failed to finish CSV", e.into_error()))?;
    let mut text = String::from_utf8_lossy(&bytes).into_owned();
    if text.ends_with('\n') {
        text.pop();
    }
    Ok(text)
}

/// Reads a document produced by [`format_csv`] back into a session map.
pub fn parse_csv(text: &str) -> Result<SessionMap> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .from_reader(text.as_bytes());

    let headers = rdr.headers().map_err(|e| TallyError::Csv {
        context: "Failed to read header".to_string(),
        source: e,
    })?;
    if !headers.iter().eq(CSV_HEADER.iter().copied()) {
        return Err(TallyError::MalformedExport {
            line: 1,
            details: "unexpected header".to_string(),
        });
    }

    let mut sessions = SessionMap::new();
    for (index, row) in rdr.records().enumerate() {
        let line = index + 2;
        let row = row.map_err(|e| TallyError::Csv {
            context: format!("Failed to read line {}", line),
            source: e,
        })?;
        if row.len() != CSV_HEADER.len() {
            return Err(TallyError::MalformedExport {
                line,
                details: format!("expected {} fields, found {}", CSV_HEADER.len(), row.len()),
            });
        }

        let identity = SessionIdentity::new(&row[0]);
        let category =
            SessionCategory::from_label(&row[1]).ok_or_else(|| TallyError::MalformedExport {
                line,
                details: format!("unknown difficulty {:?}", &row[1]),
            })?;

        let mut counts = [0u32; TILE_STATE_COUNT];
        for (slot, field) in counts.iter_mut().zip(row.iter().skip(2)) {
            *slot = field
                .trim()
                .parse()
                .map_err(|_| TallyError::MalformedExport {
                    line,
                    details: format!("invalid count {:?}", field),
                })?;
        }

        sessions.insert(
            identity,
            SessionRecord::new(category, MeasurementVector::new(counts)),
        );
    }

    Ok(sessions)
}

// ═══════════════════════════════════════════════════════════════════════════════
// Export Destination
// ═══════════════════════════════════════════════════════════════════════════════

/// Where a finished export document goes.
pub trait ExportSink {
    /// Saves the document and returns where it ended up.
    fn save(&mut self, content: &str) -> Result<PathBuf>;
}

/// Writes the export into a directory, replacing any previous export.
#[derive(Debug, Clone)]
pub struct FileExportSink {
    dir: PathBuf,
    file_name: String,
}

impl FileExportSink {
    pub fn new(dir: &Path, file_name: &str) -> Self {
        FileExportSink {
            dir: dir.to_path_buf(),
            file_name: file_name.to_string(),
        }
    }

    pub fn target(&self) -> PathBuf {
        self.dir.join(&self.file_name)
    }
}

impl ExportSink for FileExportSink {
    fn save(&mut self, content: &str) -> Result<PathBuf> {
        fs_err::create_dir_all(&self.dir)
            .map_err(|e| TallyError::io("Failed to create export directory", e))?;
        let target = self.target();
        fs_err::write(&target, content)
            .map_err(|e| TallyError::io("Failed to write export", e))?;
        Ok(target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn sample() -> SessionMap {
        let mut sessions = SessionMap::new();
        sessions.insert(
            "https://minesweeper.online/game/1".into(),
            SessionRecord::new(
                SessionCategory::Expert,
                MeasurementVector::new([5, 3, 0, 0, 0, 0, 0, 0, 1]),
            ),
        );
        sessions.insert(
            "https://minesweeper.online/game/2".into(),
            SessionRecord::new(
                SessionCategory::Easy,
                MeasurementVector::new([40, 12, 4, 1, 0, 0, 0, 0, 0]),
            ),
        );
        sessions
    }

    #[test]
    fn test_empty_store_exports_header_only() {
        let text = format_csv(&SessionMap::new()).unwrap();
        assert_eq!(
            text,
            "url,game_difficulty,0_count,1_count,2_count,3_count,4_count,5_count,6_count,7_count,8_count"
        );
    }

    #[test]
    fn test_rows_are_unquoted_for_plain_identities() {
        let text = format_csv(&sample()).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[1],
            "https://minesweeper.online/game/1,Expert,5,3,0,0,0,0,0,0,1"
        );
        assert_eq!(
            lines[2],
            "https://minesweeper.online/game/2,Easy,40,12,4,1,0,0,0,0,0"
        );
        assert!(!text.ends_with('\n'));
    }

    #[test]
    fn test_identity_with_comma_is_quoted_and_parses_back() {
        let mut sessions = SessionMap::new();
        sessions.insert(
            "https://x/game/a,b".into(),
            SessionRecord::new(SessionCategory::Hard, MeasurementVector::zeros()),
        );
        let text = format_csv(&sessions).unwrap();
        assert!(text.contains("\"https://x/game/a,b\",Hard"));
        assert_eq!(parse_csv(&text).unwrap(), sessions);
    }

    #[test]
    fn test_parse_inverts_format() {
        let sessions = sample();
        let text = format_csv(&sessions).unwrap();
        assert_eq!(parse_csv(&text).unwrap(), sessions);
    }

    #[test]
    fn test_parse_rejects_unknown_difficulty() {
        let text = "url,game_difficulty,0_count,1_count,2_count,3_count,4_count,5_count,6_count,7_count,8_count\n\
g1,Custom,0,0,0,0,0,0,0,0,0";
        let err = parse_csv(text).unwrap_err();
        assert!(matches!(err, TallyError::MalformedExport { line: 2, .. }));
    }

    #[test]
    fn test_parse_rejects_wrong_header() {
        let err = parse_csv("id,kind\ng1,Expert").unwrap_err();
        assert!(matches!(err, TallyError::MalformedExport { line: 1, .. }));
    }

    #[test]
    fn test_parse_rejects_negative_count() {
        let text = "url,game_difficulty,0_count,1_count,2_count,3_count,4_count,5_count,6_count,7_count,8_count\n\
g1,Expert,-1,0,0,0,0,0,0,0,0";
        assert!(parse_csv(text).is_err());
    }

    #[test]
    fn test_file_sink_writes_document() {
        let temp = tempdir().unwrap();
        let mut sink = FileExportSink::new(&temp.path().join("exports"), DEFAULT_EXPORT_FILE_NAME);
        let path = sink.save("url\n").unwrap();
        assert_eq!(path, temp.path().join("exports").join("games.csv"));
        assert_eq!(fs_err::read_to_string(&path).unwrap(), "url\n");
    }
}
