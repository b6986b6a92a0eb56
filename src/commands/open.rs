use std::io::{BufRead, BufReader};

use crate::command::{Command, CommandResult, ShellContext};
use crate::commands::stat_arg;
use crate::error::{CommandError, ShellError};
use crate::scaffold::URL_MARKER;
use crate::vfs::VirtualFileSystem;

pub struct OpenCommand;

impl Command for OpenCommand {
    fn execute(&self, args: &[String], ctx: &ShellContext<'_>) -> CommandResult {
        open_file(ctx, args)
    }
}

/// First `**URL:**` line in the file at `path`, trimmed. `None` for
/// directories, missing files and files without a usable marker line.
pub fn find_url(vfs: &VirtualFileSystem, path: &str) -> Option<String> {
    let file = vfs.open(path).ok()?;
    if file.stat().is_dir {
        return None;
    }

    // split on raw bytes so a non-utf8 line doesn't end the scan
    BufReader::new(file)
        .split(b'\n')
        .map_while(Result::ok)
        .find_map(|line| {
            let rest = line.strip_prefix(URL_MARKER.as_bytes())?;
            let url = String::from_utf8_lossy(rest);
            let url = url.trim();
            (!url.is_empty()).then(|| url.to_string())
        })
}

/// Returns the URL a file points at. Opening it is up to the caller.
pub fn open_file(ctx: &ShellContext<'_>, args: &[String]) -> CommandResult {
    let arg = args
        .first()
        .ok_or_else(|| CommandError::bare(ShellError::MissingArgument))?;

    let (target, info) = stat_arg(ctx, arg)?;
    if info.is_dir {
        return Err(CommandError::new(arg.as_str(), ShellError::IsDirectory));
    }

    find_url(ctx.vfs, &target).ok_or_else(|| CommandError::new(arg.as_str(), ShellError::NotOpenable))
}
