//! `packman init`: Create packman.json.

use super::Context;
use packman::commands::init_project;

pub fn execute(mut ctx: Context) -> anyhow::Result<()> {
    let root = ctx.layout.root();
    if init_project(root)? {
        ctx.out.success("Created ");
        ctx.out.plain(&format!("{}\n", ctx.layout.manifest_path().display()));
    } else {
        ctx.out.plain("packman.json already exists, nothing to do.\n");
    }
    Ok(())
}
