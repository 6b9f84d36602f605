//! Proto binding generation.

use anyhow::{bail, Result};

use crate::util::fs::{ensure_dir, glob_files};
use crate::util::process::ProcessBuilder;
use crate::util::BuildContext;

/// Path of the protoc binary produced by the external library build,
/// relative to `third_party/`.
const PROTOC_REL_PATH: &str =
    "tensorflow/bazel-out/host/bin/external/com_google_protobuf/protoc";

/// Regenerate the C++ proto bindings under `torch_xla/pb/cpp`.
///
/// Skipped entirely when no proto sources exist; not all checkouts ship
/// them. Must run after the external library build, which produces the
/// protoc binary itself.
pub fn generate_protos(ctx: &BuildContext) -> Result<()> {
    let proto_files = glob_files(ctx.base_dir(), &["torch_xla/pb/src/*.proto"])?;
    if proto_files.is_empty() {
        tracing::debug!("no proto sources, skipping proto generation");
        return Ok(());
    }

    let out_dir = ctx.proto_out_dir();
    ensure_dir(&out_dir)?;

    let protoc = ctx.third_party_dir().join(PROTOC_REL_PATH);
    let cmd = ProcessBuilder::new(&protoc)
        .arg("-I")
        .arg(ctx.third_party_dir().join("tensorflow"))
        .arg("-I")
        .arg(ctx.proto_src_dir())
        .arg("--cpp_out")
        .arg(&out_dir)
        .args(&proto_files);

    tracing::info!("generating {} proto files", proto_files.len());
    if !cmd.status()?.success() {
        bail!("failed to generate protobuf files: {}", cmd.display_command());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_no_protos_is_a_noop() {
        let tmp = TempDir::new().unwrap();
        let ctx = BuildContext::new(tmp.path()).unwrap();

        // No pb/src directory at all: the stage must succeed without
        // invoking protoc (which does not exist here) or creating output.
        generate_protos(&ctx).unwrap();
        assert!(!ctx.proto_out_dir().exists());
    }

    #[test]
    fn test_protos_present_but_no_protoc_fails() {
        let tmp = TempDir::new().unwrap();
        let src = tmp.path().join("torch_xla/pb/src");
        std::fs::create_dir_all(&src).unwrap();
        std::fs::write(src.join("record.proto"), "syntax = \"proto3\";\n").unwrap();

        let ctx = BuildContext::new(tmp.path()).unwrap();
        assert!(generate_protos(&ctx).is_err());
    }
}
