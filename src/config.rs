use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::{
    fs,
    io::ErrorKind,
    path::{Path, PathBuf},
};

pub const DEFAULT_CONFIG_PATH: &str = "emberforge.toml";

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct EmberforgeConfig {
    /// `tracing` filter used when `RUST_LOG` is unset.
    pub log_level: String,
    /// Extra JSON material pack registered after the built-ins.
    pub materials_pack: Option<PathBuf>,
    pub include_builtin_materials: bool,
    /// Where to write the workshop once the session ends.
    pub save_path: Option<PathBuf>,
    /// Seed for randomized strike accuracy.
    pub strike_seed: u64,
    /// Upper bound on simulated ticks per session.
    pub max_ticks: u64,
}

impl Default for EmberforgeConfig {
    fn default() -> Self {
        Self {
            log_level: "warn".to_string(),
            materials_pack: None,
            include_builtin_materials: true,
            save_path: None,
            strike_seed: 0,
            max_ticks: 100_000,
        }
    }
}

impl EmberforgeConfig {
    /// Read configuration from `path`.
    ///
    /// A missing file at the default location is not an error; anything else
    /// that prevents reading or parsing is.
    pub fn read(path: &Path) -> Result<Self> {
        match fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents)
                .with_context(|| format!("Failed to parse {}", path.display())),
            Err(err) if err.kind() == ErrorKind::NotFound && path == Path::new(DEFAULT_CONFIG_PATH) => {
                Ok(Self::default())
            }
            Err(err) => Err(err).with_context(|| format!("Failed to read {}", path.display())),
        }
    }

    /// Save configuration to an explicit path.
    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        let toml = toml::to_string_pretty(self)?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, toml)?;
        Ok(())
    }
}
