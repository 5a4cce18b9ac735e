//! `packman remove`: Remove packages.

use super::Context;
use packman::commands::remove_packages;

pub fn execute(mut ctx: Context, packages: Vec<String>) -> anyhow::Result<()> {
    let removed = remove_packages(&ctx.layout, &packages)?;
    for name in &removed {
        ctx.out.success("Removed ");
        ctx.out.plain(&format!("{}\n", name));
    }
    Ok(())
}
