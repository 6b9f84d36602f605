//! Version resolution and stamping.
//!
//! Every build resolves a version descriptor (version string plus the bridge
//! and host repository revisions) and overwrites two generated files with
//! it: `torch_xla/version.py` for the interpreted package and
//! `torch_xla/csrc/version.cpp` for the compiled extension. Both are
//! regenerated on every invocation and never read back.

use std::path::Path;

use anyhow::{Context, Result};
use git2::Repository;

use crate::util::config::{BuildConfig, DEFAULT_VERSION};
use crate::util::fs::write_string;

/// Resolved version descriptor for one build.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VersionInfo {
    /// Semantic version string, possibly with a `+<short rev>` suffix.
    pub version: String,
    /// Full revision hash of the bridge repository.
    pub xla_gitrev: String,
    /// Full revision hash of the host tensor-library repository, or empty
    /// when the host is not checked out alongside the bridge.
    pub torch_gitrev: String,
}

impl VersionInfo {
    /// Resolve the descriptor for the checkout at `base_dir`.
    pub fn resolve(base_dir: &Path, config: &BuildConfig) -> Result<Self> {
        let (xla_gitrev, torch_gitrev) = resolve_git_revs(base_dir)?;
        let version = build_version(config, &xla_gitrev);
        Ok(VersionInfo {
            version,
            xla_gitrev,
            torch_gitrev,
        })
    }
}

/// Look up the bridge and host repository HEAD revisions.
///
/// The bridge revision is required; a checkout without readable repository
/// metadata cannot be stamped and the build aborts. The host revision is
/// taken from a sibling checkout one level above the bridge root and is
/// empty when that checkout is absent (the normal case when the host
/// library is installed rather than built from source).
pub fn resolve_git_revs(base_dir: &Path) -> Result<(String, String)> {
    let xla_gitrev = head_rev(base_dir)
        .with_context(|| format!("failed to read bridge revision at {}", base_dir.display()))?;

    let torch_gitrev = match base_dir.parent() {
        Some(parent) if parent.join(".git").is_dir() => head_rev(parent).unwrap_or_default(),
        _ => String::new(),
    };

    Ok((xla_gitrev, torch_gitrev))
}

fn head_rev(dir: &Path) -> Result<String> {
    let repo = Repository::open(dir)?;
    let commit = repo.head()?.peel_to_commit()?;
    Ok(commit.id().to_string())
}

/// Compute the version string: the `TORCH_XLA_VERSION` override or the
/// built-in default, plus a `+<first 7 of the bridge revision>` suffix for
/// versioned builds. The suffix is cosmetic: a revision too short to
/// truncate simply leaves the version unsuffixed.
pub fn build_version(config: &BuildConfig, xla_gitrev: &str) -> String {
    let mut version = config
        .version_override
        .clone()
        .unwrap_or_else(|| DEFAULT_VERSION.to_string());

    if config.versioned_build {
        if let Some(short) = xla_gitrev.get(..7) {
            version.push('+');
            version.push_str(short);
        }
    }

    version
}

/// Overwrite the two generated version files.
///
/// Deterministic in its inputs: re-running with the same descriptor
/// produces byte-identical files. Must run before source discovery since
/// the C++ file is itself one of the sources to compile.
pub fn write_version_files(base_dir: &Path, info: &VersionInfo) -> Result<()> {
    let py_path = base_dir.join("torch_xla").join("version.py");
    let py = format!(
        "# Autogenerated file, do not edit!\n\
         __version__ = '{}'\n\
         __xla_gitrev__ = '{}'\n\
         __torch_gitrev__ = '{}'\n",
        info.version, info.xla_gitrev, info.torch_gitrev
    );
    write_string(&py_path, &py)?;

    let cpp_path = base_dir.join("torch_xla").join("csrc").join("version.cpp");
    let cpp = format!(
        "// Autogenerated file, do not edit!\n\
         #include \"torch_xla/csrc/version.h\"\n\
         \n\
         namespace torch_xla {{\n\
         \n\
         const char XLA_GITREV[] = {{\"{}\"}};\n\
         const char TORCH_GITREV[] = {{\"{}\"}};\n\
         \n\
         }}  // namespace torch_xla\n",
        info.xla_gitrev, info.torch_gitrev
    );
    write_string(&cpp_path, &cpp)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::util::config::ConfigFile;
    use git2::Signature;
    use tempfile::TempDir;

    fn config(versioned: bool, version: Option<&str>) -> BuildConfig {
        BuildConfig::from_parts(&ConfigFile::default(), |name| match name {
            "VERSIONED_XLA_BUILD" if versioned => Some("1".to_string()),
            "TORCH_XLA_VERSION" => version.map(str::to_string),
            _ => None,
        })
    }

    fn init_repo_with_commit(dir: &Path) -> String {
        let repo = Repository::init(dir).unwrap();
        std::fs::write(dir.join("README"), "xla bridge").unwrap();
        let mut index = repo.index().unwrap();
        index.add_path(Path::new("README")).unwrap();
        index.write().unwrap();
        let tree_id = index.write_tree().unwrap();
        let tree = repo.find_tree(tree_id).unwrap();
        let sig = Signature::now("tester", "tester@example.com").unwrap();
        repo.commit(Some("HEAD"), &sig, &sig, "initial", &tree, &[])
            .unwrap()
            .to_string()
    }

    #[test]
    fn test_build_version_default_no_suffix() {
        let version = build_version(&config(false, None), "abcdef1234567");
        assert_eq!(version, DEFAULT_VERSION);
    }

    #[test]
    fn test_build_version_override() {
        let version = build_version(&config(false, Some("1.12")), "abcdef1234567");
        assert_eq!(version, "1.12");
    }

    #[test]
    fn test_build_version_suffix() {
        let version = build_version(&config(true, None), "abcdef1234567");
        assert_eq!(version, format!("{}+abcdef1", DEFAULT_VERSION));
    }

    #[test]
    fn test_build_version_short_rev_leaves_version_alone() {
        let version = build_version(&config(true, Some("1.12")), "abc");
        assert_eq!(version, "1.12");
    }

    #[test]
    fn test_resolve_revs() {
        let tmp = TempDir::new().unwrap();
        let bridge = tmp.path().join("xla");
        std::fs::create_dir(&bridge).unwrap();
        let expected = init_repo_with_commit(&bridge);

        let (xla, torch) = resolve_git_revs(&bridge).unwrap();
        assert_eq!(xla, expected);
        assert_eq!(xla.len(), 40);
        // No sibling host checkout above the bridge root.
        assert_eq!(torch, "");
    }

    #[test]
    fn test_resolve_revs_with_host_checkout() {
        let tmp = TempDir::new().unwrap();
        let host = tmp.path().join("pytorch");
        let bridge = host.join("xla");
        std::fs::create_dir_all(&bridge).unwrap();
        let host_rev = init_repo_with_commit(&host);
        let bridge_rev = init_repo_with_commit(&bridge);

        let (xla, torch) = resolve_git_revs(&bridge).unwrap();
        assert_eq!(xla, bridge_rev);
        assert_eq!(torch, host_rev);
    }

    #[test]
    fn test_resolve_revs_without_repo_is_fatal() {
        let tmp = TempDir::new().unwrap();
        assert!(resolve_git_revs(tmp.path()).is_err());
    }

    #[test]
    fn test_stamping_is_idempotent() {
        let tmp = TempDir::new().unwrap();
        let info = VersionInfo {
            version: "1.11+abcdef1".to_string(),
            xla_gitrev: "abcdef1234567890abcdef1234567890abcdef12".to_string(),
            torch_gitrev: String::new(),
        };

        write_version_files(tmp.path(), &info).unwrap();
        let py_path = tmp.path().join("torch_xla/version.py");
        let cpp_path = tmp.path().join("torch_xla/csrc/version.cpp");
        let py_first = std::fs::read(&py_path).unwrap();
        let cpp_first = std::fs::read(&cpp_path).unwrap();

        write_version_files(tmp.path(), &info).unwrap();
        assert_eq!(std::fs::read(&py_path).unwrap(), py_first);
        assert_eq!(std::fs::read(&cpp_path).unwrap(), cpp_first);
    }

    #[test]
    fn test_stamped_contents() {
        let tmp = TempDir::new().unwrap();
        let info = VersionInfo {
            version: "1.11".to_string(),
            xla_gitrev: "deadbeef".to_string(),
            torch_gitrev: "cafef00d".to_string(),
        };
        write_version_files(tmp.path(), &info).unwrap();

        let py = std::fs::read_to_string(tmp.path().join("torch_xla/version.py")).unwrap();
        assert!(py.starts_with("# Autogenerated file, do not edit!\n"));
        assert!(py.contains("__version__ = '1.11'"));
        assert!(py.contains("__xla_gitrev__ = 'deadbeef'"));
        assert!(py.contains("__torch_gitrev__ = 'cafef00d'"));

        let cpp = std::fs::read_to_string(tmp.path().join("torch_xla/csrc/version.cpp")).unwrap();
        assert!(cpp.starts_with("// Autogenerated file, do not edit!\n"));
        assert!(cpp.contains("const char XLA_GITREV[] = {\"deadbeef\"};"));
        assert!(cpp.contains("const char TORCH_GITREV[] = {\"cafef00d\"};"));
    }
}
