//! Configuration loading and management.

use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use vt_core::{AllocationPolicy, LayoutConfig};

use crate::cli::LayoutArgs;

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Default allocation policy.
    pub policy: AllocationPolicy,

    /// Allocate owners in parallel.
    pub parallel: bool,

    /// Timeline origin in seconds; fillers are measured from here.
    pub origin: f64,
}

impl Default for Config {
    fn default() -> Self {
        let layout = LayoutConfig::default();
        Self {
            policy: layout.policy,
            parallel: layout.parallel,
            origin: layout.origin,
        }
    }
}

impl Config {
    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (VT_*)
        figment = figment.merge(Env::prefixed("VT_"));

        figment.extract()
    }

    /// Layout settings with command-line overrides applied.
    pub fn layout(&self, args: &LayoutArgs) -> LayoutConfig {
        LayoutConfig {
            policy: args.policy.unwrap_or(self.policy),
            parallel: self.parallel && !args.serial,
            origin: args.origin.unwrap_or(self.origin),
        }
    }
}

/// Returns the platform-specific config directory for vt.
///
/// On Linux: `~/.config/vt`
pub fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("vt"))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args() -> LayoutArgs {
        LayoutArgs {
            input: PathBuf::from("-"),
            json: false,
            policy: None,
            origin: None,
            serial: false,
        }
    }

    #[test]
    fn test_dirs_config_path_ends_with_vt() {
        let path = dirs_config_path().unwrap();
        assert_eq!(path.file_name().unwrap(), "vt");
    }

    #[test]
    fn test_default_config_matches_core_defaults() {
        let config = Config::default();
        assert_eq!(config.policy, AllocationPolicy::ContiguousBlock);
        assert!(config.parallel);
        assert!(config.origin.abs() < f64::EPSILON);
    }

    #[test]
    fn test_load_from_file_overrides_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vt.toml");
        std::fs::write(&path, "policy = \"earliest-finish\"\nparallel = false\n").unwrap();

        let config = Config::load_from(Some(&path)).unwrap();

        assert_eq!(config.policy, AllocationPolicy::EarliestFinish);
        assert!(!config.parallel);
    }

    #[test]
    fn test_load_from_rejects_unknown_policy() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vt.toml");
        std::fs::write(&path, "policy = \"fastest\"\n").unwrap();

        assert!(Config::load_from(Some(&path)).is_err());
    }

    #[test]
    fn test_layout_applies_cli_overrides() {
        let config = Config::default();
        let overridden = LayoutArgs {
            policy: Some(AllocationPolicy::EarliestFinish),
            origin: Some(3.0),
            serial: true,
            ..args()
        };

        let layout = config.layout(&overridden);

        assert_eq!(layout.policy, AllocationPolicy::EarliestFinish);
        assert!(!layout.parallel);
        assert!((layout.origin - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_layout_without_overrides_uses_config() {
        let config = Config {
            policy: AllocationPolicy::EarliestFinish,
            parallel: false,
            origin: 1.0,
        };
        let layout = config.layout(&args());
        assert_eq!(layout.policy, AllocationPolicy::EarliestFinish);
        assert!(!layout.parallel);
    }
}
