/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Falls back to sensible defaults if the file is missing or incomplete.

use serde::Deserialize;
use std::path::PathBuf;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub anim: AnimConfig,
    pub levels_file: PathBuf,
    /// The number of puzzles the level source must contain; any other
    /// count is fatal at startup.
    pub expected_levels: usize,
}

#[derive(Clone, Debug)]
pub struct AnimConfig {
    /// Seconds for one player step / crate slide.
    pub player_speed: f32,
    /// Seconds for the screen fade between levels and menus.
    pub transition_speed: f32,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    animation: TomlAnimation,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlAnimation {
    #[serde(default = "default_player_speed")]
    player_speed: f32,
    #[serde(default = "default_transition_speed")]
    transition_speed: f32,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default = "default_levels_file")]
    levels_file: String,
    #[serde(default = "default_expected_levels")]
    expected_levels: usize,
}

// ── Defaults ──

fn default_player_speed() -> f32 { 0.18 }
fn default_transition_speed() -> f32 { 0.6 }
fn default_levels_file() -> String { "assets/levels.txt".into() }
fn default_expected_levels() -> usize { 10 } // size of the embedded set

impl Default for TomlAnimation {
    fn default() -> Self {
        TomlAnimation {
            player_speed: default_player_speed(),
            transition_speed: default_transition_speed(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral {
            levels_file: default_levels_file(),
            expected_levels: default_expected_levels(),
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory.
    /// Missing file or missing keys gracefully fall back to defaults.
    pub fn load() -> Self {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);

        // Resolve the levels file against the same candidate dirs
        let levels_str = &toml_cfg.general.levels_file;
        let levels_file = if PathBuf::from(levels_str).is_absolute() {
            PathBuf::from(levels_str)
        } else {
            search_dirs
                .iter()
                .map(|d| d.join(levels_str))
                .find(|p| p.is_file())
                .unwrap_or_else(|| PathBuf::from(levels_str))
        };

        GameConfig {
            anim: AnimConfig {
                player_speed: toml_cfg.animation.player_speed,
                transition_speed: toml_cfg.animation.transition_speed,
            },
            levels_file,
            expected_levels: toml_cfg.general.expected_levels,
        }
    }
}

/// Candidate directories to search: exe dir + CWD (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        // Resolve symlinks so a linked binary still finds its data.
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
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
                Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                    Ok(cfg) => return cfg,
                    Err(e) => {
                        eprintln!("Warning: config.toml parse error: {e}");
                        eprintln!("Using default settings.");
                        return TomlConfig::default();
                    }
                },
                Err(e) => {
                    eprintln!("Warning: could not read {}: {e}", path.display());
                }
            }
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_fills_in_defaults() {
        let cfg: TomlConfig = toml::from_str("[animation]\nplayer_speed = 0.25\n").unwrap();
        assert_eq!(cfg.animation.player_speed, 0.25);
        assert_eq!(cfg.animation.transition_speed, default_transition_speed());
        assert_eq!(cfg.general.expected_levels, default_expected_levels());
    }

    #[test]
    fn empty_toml_is_all_defaults() {
        let cfg: TomlConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.animation.player_speed, default_player_speed());
        assert_eq!(cfg.general.levels_file, default_levels_file());
    }
}
