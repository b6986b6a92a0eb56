use crate::command::{Command, CommandResult, ShellContext};
use crate::commands::open::find_url;
use crate::error::{CommandError, ShellError};
use crate::flag::FlagSet;
use crate::path;

const MAX_PATH_ARG: usize = 255;

pub struct LsCommand;

impl Command for LsCommand {
    fn execute(&self, args: &[String], ctx: &ShellContext<'_>) -> CommandResult {
        list_directory_contents(ctx, args)
    }
}

/// Flags `ls` understands. Also used to print help.
pub fn flags() -> FlagSet {
    let mut fs = FlagSet::new();
    fs.bool("all", Some('a'), false, "show hidden files");
    fs.bool("long", Some('l'), false, "long listing format");
    fs
}

fn is_hidden(name: &str) -> bool {
    name.starts_with('.')
}

fn is_valid_path_argument(arg: &str) -> bool {
    !arg.is_empty() && arg.chars().count() <= MAX_PATH_ARG && !arg.chars().any(char::is_control)
}

// d-- directory, -c- catable, -co catable and openable
fn type_indicator(ctx: &ShellContext<'_>, dir: &str, name: &str, is_dir: bool) -> &'static str {
    if is_dir {
        "d--"
    } else if find_url(ctx.vfs, &path::join(dir, name)).is_some() {
        "-co"
    } else {
        "-c-"
    }
}

pub fn list_directory_contents(ctx: &ShellContext<'_>, args: &[String]) -> CommandResult {
    let mut fs = flags();
    fs.parse(args).map_err(CommandError::bare)?;
    let show_all = fs.get_bool("all").unwrap_or(false);
    let long = fs.get_bool("long").unwrap_or(false);

    let remaining = fs.args().unwrap_or_default();
    if remaining.len() > 1 {
        return Err(CommandError::bare(ShellError::TooManyArguments));
    }

    let arg = match remaining.first() {
        Some(arg) if !is_valid_path_argument(arg) => {
            return Err(CommandError::bare(ShellError::InvalidFlag(
                "invalid path argument".to_string(),
            )));
        }
        Some(arg) => arg.as_str(),
        None => ".",
    };

    let target = path::resolve(&ctx.current_dir(), arg);
    let info = ctx.vfs.stat(&target).map_err(|err| CommandError::new(arg, err))?;
    if !info.is_dir {
        return Ok(info.name);
    }

    let entries = ctx.vfs.read_dir(&target, 0).map_err(CommandError::bare)?;

    let lines: Vec<String> = entries
        .iter()
        .filter(|entry| show_all || !is_hidden(&entry.name))
        .map(|entry| {
            let name = if entry.is_dir {
                format!("{}/", entry.name)
            } else {
                entry.name.clone()
            };
            if long {
                format!("{}  {}", type_indicator(ctx, &target, &entry.name, entry.is_dir), name)
            } else {
                name
            }
        })
        .collect();

    Ok(lines.join(if long { "\n" } else { "  " }))
}
