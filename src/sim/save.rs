/// Progress persistence: a raw fixed-size blob.
///
/// Layout: `[music u8][fullscreen u8][one solved byte per level]`.
/// Read once at startup, written on quit and on back-to-menu. A missing
/// or size-mismatched file silently resets to defaults: all levels
/// unsolved, music and fullscreen on. There is no versioning and no
/// recovery beyond that — the blob is cheap to rebuild by playing.

use std::path::PathBuf;

const SAVE_FILE: &str = "save.dat";

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SaveData {
    pub music: bool,
    pub fullscreen: bool,
    solved: Vec<bool>,
}

impl SaveData {
    pub fn defaults(num_levels: usize) -> Self {
        SaveData {
            music: true,
            fullscreen: true,
            solved: vec![false; num_levels],
        }
    }

    pub fn is_solved(&self, level: usize) -> bool {
        self.solved.get(level).copied().unwrap_or(false)
    }

    /// Idempotent; out-of-range indexes are ignored.
    pub fn mark_solved(&mut self, level: usize) {
        if let Some(flag) = self.solved.get_mut(level) {
            *flag = true;
        }
    }

    pub fn solved_count(&self) -> usize {
        self.solved.iter().filter(|&&s| s).count()
    }

    fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(2 + self.solved.len());
        bytes.push(self.music as u8);
        bytes.push(self.fullscreen as u8);
        bytes.extend(self.solved.iter().map(|&s| s as u8));
        bytes
    }

    fn from_bytes(bytes: &[u8], num_levels: usize) -> Option<Self> {
        if bytes.len() != 2 + num_levels {
            return None;
        }
        Some(SaveData {
            music: bytes[0] != 0,
            fullscreen: bytes[1] != 0,
            solved: bytes[2..].iter().map(|&b| b != 0).collect(),
        })
    }
}

/// Load saved progress, silently falling back to defaults.
pub fn load(num_levels: usize) -> SaveData {
    match std::fs::read(save_path()) {
        Ok(bytes) => {
            SaveData::from_bytes(&bytes, num_levels).unwrap_or_else(|| SaveData::defaults(num_levels))
        }
        Err(_) => SaveData::defaults(num_levels),
    }
}

pub fn store(data: &SaveData) -> std::io::Result<()> {
    std::fs::write(save_path(), data.to_bytes())
}

/// Where the save file lives: the exe directory when writable,
/// otherwise XDG data home, otherwise the CWD.
fn save_path() -> PathBuf {
    save_dir().join(SAVE_FILE)
}

fn save_dir() -> PathBuf {
    // 1. Exe directory (portable installs)
    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            let probe = parent.join(".write_test_cratebound");
            if std::fs::write(&probe, "").is_ok() {
                let _ = std::fs::remove_file(&probe);
                return parent.to_path_buf();
            }
        }
    }

    // 2. XDG data home (~/.local/share/cratebound) for system installs
    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/cratebound");
        if std::fs::create_dir_all(&xdg).is_ok() {
            return xdg;
        }
    }

    // 3. Fallback to CWD
    std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."))
}
