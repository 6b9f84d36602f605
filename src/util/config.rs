//! Build configuration.
//!
//! Every knob is driven by an environment variable (the primary interface,
//! kept compatible with the historical build scripts), with an optional
//! `xla-build.toml` at the bridge root supplying project defaults:
//!
//! ```toml
//! [build]
//! debug = false
//! compile-parallel = true
//! build-cpp-tests = true
//! versioned-build = false
//! package-name = "torch_xla"
//! ```
//!
//! Environment variables always win over the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

/// Default extension package name.
pub const DEFAULT_PACKAGE_NAME: &str = "torch_xla";

/// Default version when `TORCH_XLA_VERSION` is not set.
pub const DEFAULT_VERSION: &str = "1.11";

/// Parse a flag value the way the build has always done it: a fixed truthy
/// set, case-insensitive, everything else (including empty) false.
pub fn is_truthy(value: &str) -> bool {
    matches!(
        value.to_uppercase().as_str(),
        "ON" | "1" | "YES" | "TRUE" | "Y"
    )
}

/// Project defaults file (`xla-build.toml`).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfigFile {
    pub build: BuildSection,
}

/// `[build]` section of the defaults file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct BuildSection {
    pub debug: Option<bool>,
    pub compile_parallel: Option<bool>,
    pub build_cpp_tests: Option<bool>,
    pub versioned_build: Option<bool>,
    pub package_name: Option<String>,
    pub version: Option<String>,
    pub pytorch_source_path: Option<PathBuf>,
}

impl ConfigFile {
    /// Load the defaults file, falling back to defaults if it is missing or
    /// malformed. A broken file should not abort a build that never needed
    /// it; it is reported and ignored.
    pub fn load_or_default(path: &Path) -> Self {
        if !path.exists() {
            return Self::default();
        }
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).unwrap_or_else(|e| {
                tracing::warn!("ignoring malformed {}: {}", path.display(), e);
                Self::default()
            }),
            Err(e) => {
                tracing::warn!("failed to read {}: {}", path.display(), e);
                Self::default()
            }
        }
    }
}

/// Resolved build configuration.
///
/// Resolution order per knob: environment variable, then `xla-build.toml`,
/// then the built-in default.
#[derive(Debug, Clone)]
pub struct BuildConfig {
    /// Compile and link with `-O0 -g` (`DEBUG`).
    pub debug: bool,
    /// Dispatch translation units across a thread pool (`COMPILE_PARALLEL`).
    pub compile_parallel: bool,
    /// Build the C++ test suite after the extension (`BUILD_CPP_TESTS`).
    pub build_cpp_tests: bool,
    /// Append `+<short rev>` to the version (`VERSIONED_XLA_BUILD`).
    pub versioned_build: bool,
    /// Output package name (`TORCH_XLA_PACKAGE_NAME`).
    pub package_name: String,
    /// Version override (`TORCH_XLA_VERSION`), if any.
    pub version_override: Option<String>,
    /// Host tensor-library source root (`PYTORCH_SOURCE_PATH`), if any.
    pub pytorch_source_path: Option<PathBuf>,
}

impl BuildConfig {
    /// Resolve the configuration from the environment and the optional
    /// defaults file at the bridge root.
    pub fn resolve(base_dir: &Path) -> Self {
        let file = ConfigFile::load_or_default(&base_dir.join("xla-build.toml"));
        Self::from_parts(&file, |name| std::env::var(name).ok())
    }

    /// Resolution with an injectable environment, so tests do not have to
    /// mutate process globals.
    pub fn from_parts(file: &ConfigFile, env: impl Fn(&str) -> Option<String>) -> Self {
        let flag = |name: &str, file_value: Option<bool>, default: bool| -> bool {
            match env(name) {
                Some(value) => is_truthy(&value),
                None => file_value.unwrap_or(default),
            }
        };

        BuildConfig {
            debug: flag("DEBUG", file.build.debug, false),
            compile_parallel: flag("COMPILE_PARALLEL", file.build.compile_parallel, true),
            build_cpp_tests: flag("BUILD_CPP_TESTS", file.build.build_cpp_tests, true),
            versioned_build: flag("VERSIONED_XLA_BUILD", file.build.versioned_build, false),
            package_name: env("TORCH_XLA_PACKAGE_NAME")
                .or_else(|| file.build.package_name.clone())
                .unwrap_or_else(|| DEFAULT_PACKAGE_NAME.to_string()),
            version_override: env("TORCH_XLA_VERSION").or_else(|| file.build.version.clone()),
            pytorch_source_path: env("PYTORCH_SOURCE_PATH")
                .map(PathBuf::from)
                .or_else(|| file.build.pytorch_source_path.clone()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn resolve(env: &[(&str, &str)]) -> BuildConfig {
        let map: HashMap<String, String> = env
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        BuildConfig::from_parts(&ConfigFile::default(), |name| map.get(name).cloned())
    }

    #[test]
    fn test_truthy_values() {
        for value in ["ON", "1", "YES", "TRUE", "Y", "on", "yes", "true", "y", "On", "tRuE"] {
            assert!(is_truthy(value), "{value} should be truthy");
        }
    }

    #[test]
    fn test_falsy_values() {
        for value in ["", "0", "OFF", "NO", "FALSE", "N", "2", "yess", "enabled"] {
            assert!(!is_truthy(value), "{value} should be falsy");
        }
    }

    #[test]
    fn test_defaults() {
        let cfg = resolve(&[]);
        assert!(!cfg.debug);
        assert!(cfg.compile_parallel);
        assert!(cfg.build_cpp_tests);
        assert!(!cfg.versioned_build);
        assert_eq!(cfg.package_name, "torch_xla");
        assert!(cfg.version_override.is_none());
        assert!(cfg.pytorch_source_path.is_none());
    }

    #[test]
    fn test_env_overrides() {
        let cfg = resolve(&[
            ("DEBUG", "1"),
            ("COMPILE_PARALLEL", "0"),
            ("BUILD_CPP_TESTS", "off"),
            ("VERSIONED_XLA_BUILD", "yes"),
            ("TORCH_XLA_PACKAGE_NAME", "torch_xla_nightly"),
            ("TORCH_XLA_VERSION", "2.0"),
            ("PYTORCH_SOURCE_PATH", "/src/pytorch"),
        ]);
        assert!(cfg.debug);
        assert!(!cfg.compile_parallel);
        assert!(!cfg.build_cpp_tests);
        assert!(cfg.versioned_build);
        assert_eq!(cfg.package_name, "torch_xla_nightly");
        assert_eq!(cfg.version_override.as_deref(), Some("2.0"));
        assert_eq!(
            cfg.pytorch_source_path.as_deref(),
            Some(Path::new("/src/pytorch"))
        );
    }

    #[test]
    fn test_env_wins_over_file() {
        let file: ConfigFile = toml::from_str(
            r#"
            [build]
            debug = true
            package-name = "from_file"
            "#,
        )
        .unwrap();
        let cfg = BuildConfig::from_parts(&file, |name| match name {
            "DEBUG" => Some("0".to_string()),
            _ => None,
        });
        // Env DEBUG=0 beats file debug=true; file fills the rest.
        assert!(!cfg.debug);
        assert_eq!(cfg.package_name, "from_file");
    }

    #[test]
    fn test_malformed_file_ignored() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("xla-build.toml");
        std::fs::write(&path, "not [valid toml").unwrap();
        let file = ConfigFile::load_or_default(&path);
        assert!(file.build.debug.is_none());
    }
}
