//! External library build.
//!
//! Builds the accelerator-compiler client library into `torch_xla/lib`.
//! This is the heavyweight stage; its output also includes the protoc
//! binary the proto stage depends on.

use anyhow::{bail, Result};

use crate::util::process::{find_python, ProcessBuilder};
use crate::util::BuildContext;

/// Run the external library build script.
///
/// When the host runtime's C++ ABI setting can be probed, it is forwarded
/// so the native dependency links consistently with the runtime that will
/// load it. The current build-mode token is passed through as well.
pub fn build_extra_libraries(ctx: &BuildContext, build_mode: Option<&str>) -> Result<()> {
    let script = ctx.base_dir().join("build_torch_xla_libs.sh");
    let mut cmd = ProcessBuilder::new(&script).cwd(ctx.base_dir());

    if let Some(abi) = detect_cxx11_abi() {
        cmd = cmd
            .arg("-O")
            .arg(format!("-D_GLIBCXX_USE_CXX11_ABI={}", abi as u8));
    }
    if let Some(mode) = build_mode {
        cmd = cmd.arg(mode);
    }

    tracing::info!("building external libraries");
    if !cmd.status()?.success() {
        bail!(
            "failed to build external libraries: {}",
            cmd.display_command()
        );
    }
    Ok(())
}

/// Probe the host tensor library for its `_GLIBCXX_USE_CXX11_ABI` setting.
///
/// Best-effort: no interpreter, no torch, or unparseable output all yield
/// `None` and the flag is simply not forwarded.
pub fn detect_cxx11_abi() -> Option<bool> {
    let python = find_python()?;
    let output = ProcessBuilder::new(python)
        .arg("-c")
        .arg("import torch; print(int(torch._C._GLIBCXX_USE_CXX11_ABI))")
        .exec()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    match String::from_utf8_lossy(&output.stdout).trim() {
        "0" => Some(false),
        "1" => Some(true),
        _ => None,
    }
}
