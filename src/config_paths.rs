//! Where chordmap reads its files from
//!
//! ```text
//! <config dir>/
//!   config.yaml     engine settings (chord timeout)
//!   keymap.yaml     USER scope bindings
//!   logs/           daily-rotated chordmap.log.YYYY-MM-DD
//! ```
//!
//! The config dir is `$XDG_CONFIG_HOME/chordmap` or `~/.config/chordmap` on
//! Unix and macOS, `%APPDATA%\chordmap` on Windows. Workspace keymaps live
//! next to the project instead, see [`crate::keymap::workspace_keymap_path`].

use std::{
    env, fs, io,
    path::{Path, PathBuf},
};

const APP_DIR: &str = "chordmap";

/// Prefix of the daily-rotated log files
pub const LOG_FILE_PREFIX: &str = "chordmap.log";

/// The files chordmap uses under one config root
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigPaths {
    root: PathBuf,
}

impl ConfigPaths {
    /// Paths under the platform config dir, if one can be determined
    pub fn discover() -> Option<Self> {
        platform_config_root().map(|base| Self::at(base.join(APP_DIR)))
    }

    /// Paths under an explicit root
    pub fn at(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn config_file(&self) -> PathBuf {
        self.root.join("config.yaml")
    }

    pub fn keymap_file(&self) -> PathBuf {
        self.root.join("keymap.yaml")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    /// Newest `chordmap.log.*` in the logs dir, or the bare prefix when none exist
    pub fn latest_log(&self) -> PathBuf {
        let logs_dir = self.logs_dir();
        let newest = fs::read_dir(&logs_dir).ok().and_then(|entries| {
            entries
                .filter_map(|entry| entry.ok())
                .map(|entry| entry.path())
                .filter(|path| {
                    path.file_name()
                        .and_then(|n| n.to_str())
                        .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX))
                })
                // Date suffixes sort lexically
                .max()
        });
        newest.unwrap_or_else(|| logs_dir.join(LOG_FILE_PREFIX))
    }

    /// Create the logs dir (and the root) if missing
    pub fn ensure_logs_dir(&self) -> io::Result<PathBuf> {
        let logs = self.logs_dir();
        fs::create_dir_all(&logs)?;
        Ok(logs)
    }
}

#[cfg(target_os = "windows")]
fn platform_config_root() -> Option<PathBuf> {
    env::var_os("APPDATA").map(PathBuf::from)
}

#[cfg(not(target_os = "windows"))]
fn platform_config_root() -> Option<PathBuf> {
    env::var_os("XDG_CONFIG_HOME")
        .map(PathBuf::from)
        .or_else(|| dirs::home_dir().map(|home| home.join(".config")))
}

pub fn config_dir() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.root)
}

/// Engine settings file
pub fn config_file() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.config_file())
}

/// USER scope keymap
pub fn keymap_file() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.keymap_file())
}

pub fn logs_dir() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.logs_dir())
}

/// Most recent log file, for pointing users at diagnostics
pub fn log_file() -> Option<PathBuf> {
    ConfigPaths::discover().map(|paths| paths.latest_log())
}

/// Ensure the platform logs dir exists, returning it
pub fn ensure_logs_dir() -> io::Result<PathBuf> {
    ConfigPaths::discover()
        .ok_or_else(|| io::Error::new(io::ErrorKind::NotFound, "no config directory available"))?
        .ensure_logs_dir()
}
