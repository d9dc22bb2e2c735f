//! Compiled regex patterns for reading the game view.
//!
//! Compiled once on first use. Update these when the site's markup changes.

use once_cell::sync::Lazy;
use regex::Regex;

// ═══════════════════════════════════════════════════════════════════════════════
// View Markup
// ═══════════════════════════════════════════════════════════════════════════════

/// Id of the active level selector, e.g. `level_select_3`. Trailing junk after the
/// number is tolerated.
pub static RE_LEVEL_SELECT_ID: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^level_select_(\d+)").unwrap());

/// Class token marking a tile's revealed state, `hd_type0` through `hd_type8`.
pub static RE_TILE_STATE_CLASS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^hd_type([0-8])$").unwrap());

/// Face indicator class shown once the board is cleared.
pub const FACE_WIN_CLASS: &str = "hd_top-area-face-win";

/// Face indicator class shown after a mine is hit.
pub const FACE_LOSE_CLASS: &str = "hd_top-area-face-lose";
