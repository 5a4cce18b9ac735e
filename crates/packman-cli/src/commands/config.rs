//! `packman config`: Show or change global settings.

use super::Context;
use crate::output::StyledOutput;
use packman::commands::{config_command, ConfigAction};

pub fn execute(mut ctx: Context, key: Option<String>, value: Option<String>) -> anyhow::Result<()> {
    match config_command(&ctx.config_path, key.as_deref(), value.as_deref())? {
        ConfigAction::List(entries) => {
            for (key, value) in entries {
                print_entry(&mut ctx.out, key, value.as_deref());
            }
        }
        ConfigAction::Get(key, value) => print_entry(&mut ctx.out, &key, value.as_deref()),
        ConfigAction::Set(key, value) => {
            ctx.out.success("Set ");
            ctx.out.plain(&format!("{} = {}\n", key, value));
        }
    }
    Ok(())
}

fn print_entry(out: &mut StyledOutput, key: &str, value: Option<&str>) {
    out.info(key);
    out.plain(": ");
    match value {
        Some(value) => out.plain(value),
        None => out.dim("Not set"),
    }
    out.newline();
}
