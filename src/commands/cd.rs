use tracing::debug;

use crate::command::{Command, CommandResult, ShellContext};
use crate::commands::stat_arg;
use crate::error::{CommandError, ShellError};

pub struct CdCommand;

impl Command for CdCommand {
    fn execute(&self, args: &[String], ctx: &ShellContext<'_>) -> CommandResult {
        change_directory(ctx, args)
    }
}

/// Move the session to another directory. No argument means home. Extra
/// arguments are ignored. Success prints nothing.
pub fn change_directory(ctx: &ShellContext<'_>, args: &[String]) -> CommandResult {
    // cd with no args goes home, classic unix behavior
    let target = args.first().map(String::as_str).unwrap_or("~");

    let (new_dir, info) = stat_arg(ctx, target)?;
    if !info.is_dir {
        return Err(CommandError::new(target, ShellError::NotDirectory));
    }

    debug!(session = %ctx.session_id, dir = %new_dir, "changing directory");
    ctx.sessions.set_current_dir(ctx.session_id, &new_dir);
    Ok(String::new())
}
