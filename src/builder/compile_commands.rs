//! compile_commands.json emission for IDE integration.

use std::path::Path;

use anyhow::Result;
use serde::Serialize;

use crate::builder::compile::compile_command;
use crate::builder::driver::{object_path, ExtensionSpec};
use crate::util::fs::write_string;
use crate::util::BuildContext;

/// One entry in the compile database.
#[derive(Debug, Serialize)]
struct CompileCommand {
    directory: String,
    arguments: Vec<String>,
    file: String,
    output: String,
}

/// Emit `compile_commands.json` into the build directory.
pub fn emit_compile_commands(
    ctx: &BuildContext,
    spec: &ExtensionSpec,
    compiler: &Path,
) -> Result<()> {
    let commands: Vec<CompileCommand> = spec
        .sources
        .iter()
        .map(|source| {
            let object = object_path(ctx, source);
            let cmd = compile_command(spec, compiler, source, &object);

            let mut arguments = vec![cmd.get_program().display().to_string()];
            arguments.extend(cmd.get_args().iter().cloned());

            CompileCommand {
                directory: ctx.base_dir().display().to_string(),
                arguments,
                file: source.display().to_string(),
                output: object.display().to_string(),
            }
        })
        .collect();

    let path = ctx.build_dir().join("compile_commands.json");
    let json = serde_json::to_string_pretty(&commands)?;
    write_string(&path, &json)?;

    tracing::debug!("wrote {}", path.display());
    Ok(())
}
