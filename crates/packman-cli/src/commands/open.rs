//! `packman open`: Open a cached package in Unity.

use super::Context;
use packman::commands::open_package;

pub fn execute(mut ctx: Context, package: String) -> anyhow::Result<()> {
    let pid = open_package(&ctx.layout, &ctx.config, &package)?;
    ctx.out.success("Opened ");
    ctx.out.plain(&format!("{} (pid {})\n", package, pid));
    Ok(())
}
