//! Engine configuration: edge-case policies, limits and the optional
//! `bf.toml` file.
//!
//! The file is looked up at `$BF_CONFIG`, falling back to `bf.toml` in the
//! XDG config home. Only the `[engine]` table is read:
//!
//! ```toml
//! [engine]
//! tape-size = 65536
//! pointer-policy = "wrap"
//! eof-policy = "unchanged"
//! strict-arithmetic = true
//! jump-mode = "scan"
//! max-steps = 1000000
//! ```

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use clap::ValueEnum;
use cross_xdg::BaseDirs;
use serde::Deserialize;

use crate::error::ConfigError;
use crate::tape::TapeSize;

/// What `<` on cell 0 and `>` on the last cell do.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum PointerPolicy {
    /// Abort with `TapeOverflow` / `TapeUnderflow`.
    #[default]
    Error,
    /// Wrap to the opposite end of the tape.
    Wrap,
}

/// What `,` stores once input is exhausted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum EofPolicy {
    /// Set the current cell to 0.
    #[default]
    Zero,
    /// Leave the current cell untouched.
    Unchanged,
}

/// How `[` and `]` find their partner.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum JumpMode {
    /// Look up the match table built during validation.
    #[default]
    Table,
    /// Rescan the program with a depth counter on every jump.
    Scan,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "kebab-case", deny_unknown_fields)]
pub struct EngineConfig {
    pub tape_size: TapeSize,
    pub pointer_policy: PointerPolicy,
    pub eof_policy: EofPolicy,
    /// Report every cell wraparound as a warning.
    pub strict_arithmetic: bool,
    pub jump_mode: JumpMode,
    pub max_steps: Option<u64>,
}

#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    #[serde(default)]
    engine: EngineConfig,
}

impl EngineConfig {
    /// Parse the `[engine]` table out of TOML text.
    pub fn from_toml(content: &str, path: &Path) -> Result<Self, ConfigError> {
        let file: ConfigFile = toml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(file.engine)
    }

    /// Load from an explicit path. The file must exist.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content, path)
    }

    /// Load `$BF_CONFIG` or `<config home>/bf.toml`, or defaults when neither exists.
    pub fn discover() -> Result<Self, ConfigError> {
        if let Some(path) = env::var_os("BF_CONFIG") {
            return Self::from_path(Path::new(&path));
        }

        let Some(path) = default_config_path() else {
            return Ok(Self::default());
        };
        if !path.is_file() {
            return Ok(Self::default());
        }
        tracing::debug!(path = %path.display(), "loading engine config");
        Self::from_path(&path)
    }

    /// Let `BF_MAX_STEPS` replace the file's `max-steps`. Apply before
    /// command-line flags, which win over both.
    pub fn with_env_overrides(self) -> Self {
        let max_steps = env::var("BF_MAX_STEPS").ok();
        self.with_max_steps_var(max_steps.as_deref())
    }

    fn with_max_steps_var(mut self, value: Option<&str>) -> Self {
        match value.map(|s| s.trim().parse::<u64>()) {
            Some(Ok(steps)) => self.max_steps = Some(steps),
            Some(Err(_)) => tracing::warn!("ignoring BF_MAX_STEPS: not a step count"),
            None => {}
        }
        self
    }
}

// On Linux: /home/<user>/.config/bf.toml
// On Windows: C:\Users\<user>\.config\bf.toml
// On macOS: /Users/<user>/.config/bf.toml
fn default_config_path() -> Option<PathBuf> {
    let base_dirs = BaseDirs::new().ok()?;
    let mut path = PathBuf::from(base_dirs.config_home());
    path.push("bf.toml");
    Some(path)
}
