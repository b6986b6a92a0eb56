use crate::command::{Command, CommandResult, ShellContext};
use crate::commands::stat_arg;
use crate::error::{CommandError, ShellError};

pub struct CatCommand;

impl Command for CatCommand {
    fn execute(&self, args: &[String], ctx: &ShellContext<'_>) -> CommandResult {
        cat_file(ctx, args)
    }
}

/// Print a file. Only the first argument is read.
pub fn cat_file(ctx: &ShellContext<'_>, args: &[String]) -> CommandResult {
    let arg = args
        .first()
        .ok_or_else(|| CommandError::bare(ShellError::MissingArgument))?;

    let (target, info) = stat_arg(ctx, arg)?;
    if info.is_dir {
        return Err(CommandError::new(arg.as_str(), ShellError::IsDirectory));
    }

    let content = ctx
        .vfs
        .read_file(&target)
        .map_err(|err| CommandError::new(arg.as_str(), err))?;
    Ok(String::from_utf8_lossy(content).into_owned())
}
