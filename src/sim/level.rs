/// Level loader.
///
/// ## Sources (priority order):
///   1. An explicit file path given on the command line
///   2. `<levels_dir>/level-N.properties`
///   3. Built-in embedded levels
///
/// ## Level format (`.properties`):
///   ```
///   # comment
///   <x>,<y>=<code>
///   ```
///   One assignment per line. Codes:
///   `0` Wall, `1` SpawnPoint, `2` Door, `3` Obstacle, `4` Enemy, `5` Key, `6` Platform.
///
/// Parsing is permissive: a bad line is logged and skipped, never fatal.
/// A file with no valid lines yields an empty (all floor) grid.

use std::path::{Path, PathBuf};

use tracing::{info, warn};

use crate::config::GameConfig;
use crate::domain::grid::TileGrid;
use crate::domain::tile::TileKind;
use crate::error::{MazeError, Result};

/// Output of `parse_level`: the grid plus how many lines were rejected.
#[derive(Debug)]
pub struct ParsedLevel {
    pub grid: TileGrid,
    pub skipped: usize,
}

/// A level ready to play.
#[derive(Debug)]
pub struct LevelDef {
    pub name: String,
    pub number: Option<u32>,
    pub grid: TileGrid,
}

// ══════════════════════════════════════════════════════════════
// Parsing
// ══════════════════════════════════════════════════════════════

pub fn parse_level(text: &str) -> ParsedLevel {
    let mut cells = Vec::new();
    let mut skipped = 0;

    for (n, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        match parse_line(line) {
            Ok(cell) => cells.push(cell),
            Err(reason) => {
                warn!("level line {}: {reason}: {line:?}", n + 1);
                skipped += 1;
            }
        }
    }

    ParsedLevel { grid: cells.into_iter().collect(), skipped }
}

fn parse_line(line: &str) -> std::result::Result<((i32, i32), TileKind), &'static str> {
    let (coord, value) = line.split_once('=').ok_or("missing '='")?;
    let (x, y) = coord.split_once(',').ok_or("coordinate is not x,y")?;
    let x: i32 = x.trim().parse().map_err(|_| "x is not an integer")?;
    let y: i32 = y.trim().parse().map_err(|_| "y is not an integer")?;
    let code: i32 = value.trim().parse().map_err(|_| "tile code is not an integer")?;
    let kind = TileKind::from_code(code).ok_or("unknown tile code")?;
    Ok(((x, y), kind))
}

pub fn load_level_file(path: &Path) -> Result<ParsedLevel> {
    let text = std::fs::read_to_string(path)
        .map_err(|source| MazeError::Io { path: path.to_path_buf(), source })?;
    let parsed = parse_level(&text);
    info!(
        "loaded {}: {} tiles, {} lines skipped",
        path.display(), parsed.grid.len(), parsed.skipped,
    );
    Ok(parsed)
}

// ══════════════════════════════════════════════════════════════
// Discovery
// ══════════════════════════════════════════════════════════════

/// Path of level `n` inside the configured levels directory.
pub fn numbered_path(config: &GameConfig, n: u32) -> PathBuf {
    config.levels_dir.join(format!("level-{n}.properties"))
}

/// Resolve a command-line level argument.
///
/// `None` → level 1. A number `N` → `level-N.properties` from the levels
/// directory, else embedded level N. Anything else must be a readable file.
pub fn resolve_level(arg: Option<&str>, config: &GameConfig) -> Result<LevelDef> {
    let arg = arg.unwrap_or("1");

    if let Ok(n) = arg.parse::<u32>() {
        return load_numbered(n, config);
    }

    let path = PathBuf::from(arg);
    if path.is_file() {
        let parsed = load_level_file(&path)?;
        let name = path.file_stem().unwrap_or_default().to_string_lossy().to_string();
        return Ok(LevelDef { name, number: None, grid: parsed.grid });
    }

    Err(MazeError::LevelNotFound { name: arg.to_string() })
}

/// Level `n` from disk if present, else the embedded copy.
pub fn load_numbered(n: u32, config: &GameConfig) -> Result<LevelDef> {
    let path = numbered_path(config, n);
    if path.is_file() {
        let parsed = load_level_file(&path)?;
        return Ok(LevelDef { name: format!("Level {n}"), number: Some(n), grid: parsed.grid });
    }
    let text = embedded_level(n).ok_or_else(|| MazeError::LevelNotFound { name: n.to_string() })?;
    let parsed = parse_level(&text);
    info!("using built-in level {n}: {} tiles", parsed.grid.len());
    Ok(LevelDef { name: format!("Level {n}"), number: Some(n), grid: parsed.grid })
}

// ══════════════════════════════════════════════════════════════
// Embedded fallback levels
// ══════════════════════════════════════════════════════════════

/// Drawn top row first. Legend:
///   '#' Wall   'S' Spawn   'D' Door   'T' Trap
///   'E' Enemy  'K' Key     '_' Platform   ' ' floor
const EMBEDDED: &[&[&str]] = &[
    &[
        "##########D###",
        "#S   #       #",
        "# ## # ##T## #",
        "#  #   #   E #",
        "## # ###_# ###",
        "#  #    K#   #",
        "# T  ##  # E #",
        "##############",
    ],
    &[
        "#####D#########",
        "#K  #    E    #",
        "# # # ### ### #",
        "# #   #T    # #",
        "# ##### ##_## #",
        "#   E     #   #",
        "### ### # # # #",
        "#S    T # E # D",
        "###############",
    ],
];

/// Embedded level `n` (1-based) rendered as level-file text.
pub fn embedded_level(n: u32) -> Option<String> {
    let rows = EMBEDDED.get((n as usize).checked_sub(1)?)?;
    Some(picture_to_text(rows))
}

/// Convert a drawn map into `x,y=code` lines. The bottom row is y = 0.
fn picture_to_text(rows: &[&str]) -> String {
    let mut out = String::new();
    let height = rows.len();
    for (r, row) in rows.iter().enumerate() {
        let y = (height - 1 - r) as i32;
        for (x, ch) in row.chars().enumerate() {
            let code = match ch {
                '#' => 0,
                'S' => 1,
                'D' => 2,
                'T' => 3,
                'E' => 4,
                'K' => 5,
                '_' => 6,
                _ => continue,
            };
            out.push_str(&format!("{x},{y}={code}\n"));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_lines() {
        let p = parse_level("0,0=0\n 3 , -2 = 2 \n1,1=5\n");
        assert_eq!(p.skipped, 0);
        assert_eq!(p.grid.len(), 3);
        assert_eq!(p.grid.lookup(3, -2), Some(TileKind::Door));
        assert_eq!(p.grid.lookup(1, 1), Some(TileKind::Key));
    }

    #[test]
    fn malformed_lines_are_skipped() {
        let text = "\
# header comment

0,0=0
garbage
1,2,3=0
a,1=0
1,1=x
2,2=9
4,4
5,5=1
";
        let p = parse_level(text);
        assert_eq!(p.skipped, 6);
        assert_eq!(p.grid.len(), 2);
        assert_eq!(p.grid.lookup(5, 5), Some(TileKind::SpawnPoint));
    }

    #[test]
    fn nothing_valid_gives_empty_grid() {
        let p = parse_level("hello\nworld\n");
        assert!(p.grid.is_empty());
        assert_eq!(p.skipped, 2);
    }

    #[test]
    fn embedded_levels_parse_cleanly() {
        for n in 1..=EMBEDDED.len() as u32 {
            let text = embedded_level(n).unwrap();
            let p = parse_level(&text);
            assert_eq!(p.skipped, 0, "level {n}");
            assert_eq!(p.grid.coords_of(TileKind::SpawnPoint).len(), 1, "level {n}");
            assert!(!p.grid.coords_of(TileKind::Key).is_empty(), "level {n}");
            assert!(!p.grid.coords_of(TileKind::Door).is_empty(), "level {n}");
        }
        assert!(embedded_level(0).is_none());
        assert!(embedded_level(EMBEDDED.len() as u32 + 1).is_none());
    }

    #[test]
    fn picture_bottom_row_is_y_zero() {
        let text = picture_to_text(&["S ", "#K"]);
        let p = parse_level(&text);
        assert_eq!(p.grid.lookup(0, 1), Some(TileKind::SpawnPoint));
        assert_eq!(p.grid.lookup(0, 0), Some(TileKind::Wall));
        assert_eq!(p.grid.lookup(1, 0), Some(TileKind::Key));
        assert_eq!(p.grid.lookup(1, 1), None);
    }

    #[test]
    fn unknown_level_name_is_an_error() {
        let cfg = GameConfig::from_toml_str("[general]\nlevels_dir = \"/nonexistent-mazerunner\"\n");
        let err = resolve_level(Some("no/such/level.properties"), &cfg).unwrap_err();
        assert!(matches!(err, MazeError::LevelNotFound { .. }));
        let err = resolve_level(Some("99"), &cfg).unwrap_err();
        assert!(matches!(err, MazeError::LevelNotFound { .. }));
    }

    #[test]
    fn numbered_level_falls_back_to_embedded() {
        let cfg = GameConfig::from_toml_str("[general]\nlevels_dir = \"/nonexistent-mazerunner\"\n");
        let def = resolve_level(None, &cfg).unwrap();
        assert_eq!(def.number, Some(1));
        assert!(!def.grid.is_empty());
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = load_level_file(Path::new("/nonexistent-mazerunner/level-1.properties")).unwrap_err();
        assert!(matches!(err, MazeError::Io { .. }));
    }
}
