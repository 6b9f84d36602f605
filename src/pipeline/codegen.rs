//! ATen binding generation.

use anyhow::{bail, Result};

use crate::util::process::ProcessBuilder;
use crate::util::BuildContext;

/// Run the code generator. Must complete before source discovery: the
/// generated bindings are part of the extension source set.
pub fn generate_aten_code(ctx: &BuildContext) -> Result<()> {
    let script = ctx.base_dir().join("scripts").join("generate_code.sh");
    let cmd = ProcessBuilder::new(&script).cwd(ctx.base_dir());

    tracing::info!("generating ATen bindings");
    if !cmd.status()?.success() {
        bail!("failed to generate ATen bindings: {}", cmd.display_command());
    }
    Ok(())
}
