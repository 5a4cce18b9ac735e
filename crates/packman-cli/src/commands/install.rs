//! `packman install`: Install packages.

use super::Context;
use packman::commands::{install_packages, InstallOptions};
use packman::SystemGit;

pub fn execute(
    mut ctx: Context,
    packages: Vec<String>,
    dev: bool,
    production: bool,
) -> anyhow::Result<()> {
    let options = InstallOptions { dev, production };
    let result = install_packages(
        &ctx.layout,
        &ctx.config,
        SystemGit::new(),
        &packages,
        &options,
    )?;
    let report = &result.report;

    ctx.out.list_line("No packman.json:", &report.missing_manifest);
    ctx.out.list_line("Nothing exported:", &report.no_export);

    ctx.out.success("Done! ");
    ctx.out.plain(&format!(
        "{} resolved, {} fetched, {} up to date, {} staged.\n",
        report.resolved.len(),
        report.fetched.len(),
        report.up_to_date.len(),
        report.staged.len()
    ));
    Ok(())
}
