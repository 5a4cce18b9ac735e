//! `packman copyback`: Copy staged edits back into the cache.

use super::Context;
use packman::commands::copy_back;

pub fn execute(mut ctx: Context, package: String) -> anyhow::Result<()> {
    let export = copy_back(&ctx.layout, &package)?;
    ctx.out.success("Copied back ");
    ctx.out.plain(&format!("{} -> {}\n", package, export.display()));
    Ok(())
}
