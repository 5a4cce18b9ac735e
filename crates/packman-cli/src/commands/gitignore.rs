//! `packman gitignore`: Ignore packman's directories.

use super::Context;
use packman::commands::update_gitignore;

pub fn execute(mut ctx: Context) -> anyhow::Result<()> {
    let added = update_gitignore(ctx.layout.root())?;
    if added.is_empty() {
        ctx.out.plain(".gitignore is up to date.\n");
        return Ok(());
    }

    for pattern in &added {
        ctx.out.success("+ ");
        ctx.out.plain(&format!("{}\n", pattern));
    }
    Ok(())
}
