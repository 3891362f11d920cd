/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD, or the
/// XDG data dir. Falls back to defaults if the file is missing or broken;
/// every key has its own default so partial files work.

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::domain::jump::JumpParams;
use crate::domain::movement::ProbeOffsets;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub speed: SpeedConfig,
    pub probe: ProbeConfig,
    pub rules: RulesConfig,
    pub jump: JumpParams,
    pub platform_thickness: f32,
    pub gamepad: GamepadConfig,
    pub levels_dir: PathBuf,
    pub log_file: PathBuf,
    pub seed: Option<u64>,
}

#[derive(Clone, Debug)]
pub struct SpeedConfig {
    pub tick_rate_ms: u64,
    pub hero_speed: f32,         // tiles per second
    pub sprint_multiplier: f32,
    pub enemy_speed: f32,
    pub chaser_speed: f32,
}

#[derive(Clone, Copy, Debug)]
pub struct ProbeConfig {
    pub offsets: ProbeOffsets,
    pub span: f32, // half-width of the two-corner probe
}

#[derive(Clone, Debug)]
pub struct RulesConfig {
    pub start_lives: u32,
    pub max_lives: u32,
    pub obstacle_cooldown: f32,
    pub enemy_cooldown: f32,
    pub chase_radius: f32,
    pub roam_step: f32,
    pub chaser_every: usize, // 0 = no chasers
    pub heart_count: usize,
    pub exit_gap: f32,
    pub band_thickness: f32,
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub jump: Vec<String>,
    pub sprint: Vec<String>,
    pub pause: Vec<String>,
    pub restart: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    probe: TomlProbe,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    jump: TomlJump,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_tick_rate")]
    tick_rate_ms: u64,
    #[serde(default = "default_hero_speed")]
    hero_speed: f32,
    #[serde(default = "default_sprint")]
    sprint_multiplier: f32,
    #[serde(default = "default_enemy_speed")]
    enemy_speed: f32,
    #[serde(default = "default_chaser_speed")]
    chaser_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlProbe {
    #[serde(default = "default_probe_near")]
    up: f32,
    #[serde(default = "default_probe_far")]
    down: f32,
    #[serde(default = "default_probe_far")]
    left: f32,
    #[serde(default = "default_probe_near")]
    right: f32,
    #[serde(default = "default_probe_span")]
    span: f32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_lives")]
    start_lives: u32,
    #[serde(default = "default_lives")]
    max_lives: u32,
    #[serde(default = "default_cooldown")]
    obstacle_cooldown: f32,
    #[serde(default = "default_cooldown")]
    enemy_cooldown: f32,
    #[serde(default = "default_chase_radius")]
    chase_radius: f32,
    #[serde(default = "default_roam_step")]
    roam_step: f32,
    #[serde(default = "default_chaser_every")]
    chaser_every: usize,
    #[serde(default = "default_heart_count")]
    heart_count: usize,
    #[serde(default = "default_exit_gap")]
    exit_gap: f32,
    #[serde(default = "default_band_thickness")]
    band_thickness: f32,
}

#[derive(Deserialize, Debug)]
struct TomlJump {
    #[serde(default = "default_jump_height")]
    height: f32,
    #[serde(default = "default_jump_margin")]
    margin: f32,
    #[serde(default = "default_jump_rate")]
    ascend_rate: f32,
    #[serde(default = "default_jump_rate")]
    descend_rate: f32,
    #[serde(default = "default_platform_thickness")]
    platform_thickness: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pad_jump")]
    jump: Vec<String>,
    #[serde(default = "default_pad_sprint")]
    sprint: Vec<String>,
    #[serde(default = "default_pad_pause")]
    pause: Vec<String>,
    #[serde(default = "default_pad_restart")]
    restart: Vec<String>,
    #[serde(default = "default_pad_quit")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_dir")]
    levels_dir: String,
    #[serde(default = "default_log_file")]
    log_file: String,
    #[serde(default)]
    seed: Option<u64>,
}

// ── Defaults ──

fn default_tick_rate() -> u64 { 16 }
fn default_hero_speed() -> f32 { 3.0 }
fn default_sprint() -> f32 { 2.0 }
fn default_enemy_speed() -> f32 { 2.0 }
fn default_chaser_speed() -> f32 { 1.5 }

fn default_probe_near() -> f32 { 0.2 }
fn default_probe_far() -> f32 { 0.3 }
fn default_probe_span() -> f32 { 0.3 }

fn default_lives() -> u32 { 3 }
fn default_cooldown() -> f32 { 3.0 }
fn default_chase_radius() -> f32 { 5.0 }
fn default_roam_step() -> f32 { 5.0 }    // 300 px at 60 px per tile
fn default_chaser_every() -> usize { 2 }
fn default_heart_count() -> usize { 2 }
fn default_exit_gap() -> f32 { 1.0 }
fn default_band_thickness() -> f32 { 19.0 }

fn default_jump_height() -> f32 { 2.0 }
fn default_jump_margin() -> f32 { 0.5 }
fn default_jump_rate() -> f32 { 6.0 }
fn default_platform_thickness() -> f32 { 0.17 } // 10 px in a 60 px tile

fn default_pad_jump() -> Vec<String> { vec!["A".into()] }
fn default_pad_sprint() -> Vec<String> { vec!["X".into(), "R1".into()] }
fn default_pad_pause() -> Vec<String> { vec!["Start".into()] }
fn default_pad_restart() -> Vec<String> { vec!["Y".into()] }
fn default_pad_quit() -> Vec<String> { vec!["Select".into()] }

fn default_levels_dir() -> String { "maps".into() }
fn default_log_file() -> String { "mazerunner.log".into() }

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            tick_rate_ms: default_tick_rate(),
            hero_speed: default_hero_speed(),
            sprint_multiplier: default_sprint(),
            enemy_speed: default_enemy_speed(),
            chaser_speed: default_chaser_speed(),
        }
    }
}

impl Default for TomlProbe {
    fn default() -> Self {
        TomlProbe {
            up: default_probe_near(),
            down: default_probe_far(),
            left: default_probe_far(),
            right: default_probe_near(),
            span: default_probe_span(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules {
            start_lives: default_lives(),
            max_lives: default_lives(),
            obstacle_cooldown: default_cooldown(),
            enemy_cooldown: default_cooldown(),
            chase_radius: default_chase_radius(),
            roam_step: default_roam_step(),
            chaser_every: default_chaser_every(),
            heart_count: default_heart_count(),
            exit_gap: default_exit_gap(),
            band_thickness: default_band_thickness(),
        }
    }
}

impl Default for TomlJump {
    fn default() -> Self {
        TomlJump {
            height: default_jump_height(),
            margin: default_jump_margin(),
            ascend_rate: default_jump_rate(),
            descend_rate: default_jump_rate(),
            platform_thickness: default_platform_thickness(),
        }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad {
            jump: default_pad_jump(),
            sprint: default_pad_sprint(),
            pause: default_pad_pause(),
            restart: default_pad_restart(),
            quit: default_pad_quit(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_dir: default_levels_dir(),
            log_file: default_log_file(),
            seed: None,
        }
    }
}

// ── Loading ──

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig::from_toml(TomlConfig::default(), &[])
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/mazerunner`.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        GameConfig::from_toml(toml_cfg, &search_dirs)
    }

    /// Parse a config document. Errors fall back to defaults like `load`.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> Self {
        GameConfig::from_toml(parse_or_default(text, Path::new("<string>")), &[])
    }

    fn from_toml(t: TomlConfig, search_dirs: &[PathBuf]) -> Self {
        // Resolve levels directory against the search path
        let levels_dir_str = &t.general.levels_dir;
        let levels_dir = if PathBuf::from(levels_dir_str).is_absolute() {
            PathBuf::from(levels_dir_str)
        } else {
            search_dirs.iter()
                .map(|d| d.join(levels_dir_str))
                .find(|p| p.is_dir())
                .unwrap_or_else(|| PathBuf::from(levels_dir_str))
        };

        GameConfig {
            speed: SpeedConfig {
                tick_rate_ms: t.speed.tick_rate_ms.max(1),
                hero_speed: t.speed.hero_speed,
                sprint_multiplier: t.speed.sprint_multiplier,
                enemy_speed: t.speed.enemy_speed,
                chaser_speed: t.speed.chaser_speed,
            },
            probe: ProbeConfig {
                offsets: ProbeOffsets {
                    up: t.probe.up,
                    down: t.probe.down,
                    left: t.probe.left,
                    right: t.probe.right,
                },
                span: t.probe.span,
            },
            rules: RulesConfig {
                start_lives: t.rules.start_lives,
                max_lives: t.rules.max_lives.max(1),
                obstacle_cooldown: t.rules.obstacle_cooldown,
                enemy_cooldown: t.rules.enemy_cooldown,
                chase_radius: t.rules.chase_radius,
                roam_step: t.rules.roam_step,
                chaser_every: t.rules.chaser_every,
                heart_count: t.rules.heart_count,
                exit_gap: t.rules.exit_gap,
                band_thickness: t.rules.band_thickness,
            },
            jump: JumpParams {
                height: t.jump.height,
                margin: t.jump.margin,
                ascend_rate: t.jump.ascend_rate,
                descend_rate: t.jump.descend_rate,
            },
            platform_thickness: t.jump.platform_thickness,
            gamepad: GamepadConfig {
                jump: t.gamepad.jump,
                sprint: t.gamepad.sprint,
                pause: t.gamepad.pause,
                restart: t.gamepad.restart,
                quit: t.gamepad.quit,
            },
            levels_dir,
            log_file: PathBuf::from(t.general.log_file),
            seed: t.general.seed,
        }
    }
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    // 1. Directory of the running executable
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    // 2. Current working directory
    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    // 3. XDG data home (~/.local/share/mazerunner)
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/mazerunner");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(text) => return parse_or_default(&text, &path),
                Err(e) => {
                    tracing::warn!("could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

fn parse_or_default(text: &str, origin: &Path) -> TomlConfig {
    match toml::from_str::<TomlConfig>(text) {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::warn!("{} parse error, using default settings: {e}", origin.display());
            TomlConfig::default()
        }
    }
}
