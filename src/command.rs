use std::collections::HashMap;

use thiserror::Error;
use tracing::debug;

use crate::context::SessionStore;
use crate::error::{CommandError, ShellError};
use crate::vfs::VirtualFileSystem;

pub type CommandResult = Result<String, CommandError>;

/// What a command gets to work with: the filesystem, the session store and
/// which session is asking. The current directory is never cached here;
/// commands read it from the store every time.
#[derive(Clone, Copy)]
pub struct ShellContext<'a> {
    pub vfs: &'a VirtualFileSystem,
    pub sessions: &'a dyn SessionStore,
    pub session_id: &'a str,
}

impl<'a> ShellContext<'a> {
    pub fn new(vfs: &'a VirtualFileSystem, sessions: &'a dyn SessionStore, session_id: &'a str) -> Self {
        Self {
            vfs,
            sessions,
            session_id,
        }
    }

    pub fn current_dir(&self) -> String {
        self.sessions.current_dir(self.session_id)
    }
}

pub trait Command {
    fn execute(&self, args: &[String], ctx: &ShellContext<'_>) -> CommandResult;
}

pub struct CommandRegistry {
    commands: HashMap<String, Box<dyn Command + Send + Sync>>,
}

impl Default for CommandRegistry {
    fn default() -> Self {
        Self::default_commands()
    }
}

impl CommandRegistry {
    pub fn new() -> Self {
        Self { commands: HashMap::new() }
    }
    pub fn register_command(&mut self, name: &str, cmd: Box<dyn Command + Send + Sync>) {
        self.commands.insert(name.to_string(), cmd);
    }
    pub fn get(&self, name: &str) -> Option<&(dyn Command + Send + Sync)> {
        self.commands.get(name).map(|cmd| cmd.as_ref())
    }
    pub fn get_command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }
    pub fn default_commands() -> Self {
        let mut reg = Self::new();
        reg.register_command("cd", Box::new(crate::commands::cd::CdCommand));
        reg.register_command("ls", Box::new(crate::commands::ls::LsCommand));
        reg.register_command("pwd", Box::new(crate::commands::pwd::PwdCommand));
        reg.register_command("cat", Box::new(crate::commands::cat::CatCommand));
        reg.register_command("open", Box::new(crate::commands::open::OpenCommand));
        reg
    }
}

/// Why a command line didn't produce output. Display gives the message a
/// terminal would print.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RunError {
    #[error("shell: {0}: command not found...")]
    NotFound(String),
    #[error("{}", describe_error(.verb, .error))]
    Failed { verb: String, error: CommandError },
}

/// Whitespace tokenizer. First token is the verb; `None` for a blank line.
pub fn split_command_line(input: &str) -> Option<(&str, Vec<String>)> {
    let mut parts = input.split_whitespace();
    let verb = parts.next()?;
    Some((verb, parts.map(|s| s.to_string()).collect()))
}

pub fn run_command(input: &str, ctx: &ShellContext<'_>, registry: &CommandRegistry) -> Result<String, RunError> {
    // empty input = no-op
    let Some((verb, args)) = split_command_line(input) else {
        return Ok(String::new());
    };

    let command = registry
        .get(verb)
        .ok_or_else(|| RunError::NotFound(verb.to_string()))?;

    debug!(session = %ctx.session_id, verb, ?args, "running command");
    command.execute(&args, ctx).map_err(|error| RunError::Failed {
        verb: verb.to_string(),
        error,
    })
}

/// Turn a failure into the line a user sees, e.g.
/// `cd: nonexistent: No such file or directory`.
pub fn describe_error(verb: &str, err: &CommandError) -> String {
    let with_context = |reason: &str| {
        if err.context.is_empty() {
            format!("{}: {}", verb, reason)
        } else {
            format!("{}: {}: {}", verb, err.context, reason)
        }
    };

    match &err.kind {
        ShellError::FileNotFound => with_context("No such file or directory"),
        ShellError::NotDirectory => with_context("Not a directory"),
        ShellError::IsDirectory => with_context("Is a directory"),
        ShellError::AccessDenied => with_context("Permission denied"),
        ShellError::MissingArgument => format!("{}: missing file argument", verb),
        ShellError::TooManyArguments => format!("{}: too many arguments", verb),
        ShellError::InvalidFlag(_) => format!("{}: invalid flag or option", verb),
        ShellError::NotOpenable => format!("{}: file is not openable", verb),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::SessionManager;
    use crate::scaffold;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_command_line() {
        assert_eq!(split_command_line("   "), None);
        assert_eq!(
            split_command_line("  ls   -la  projects "),
            Some(("ls", args(&["-la", "projects"])))
        );
    }

    #[test]
    fn test_default_commands() {
        let reg = CommandRegistry::default_commands();
        assert_eq!(reg.get_command_names(), vec!["cat", "cd", "ls", "open", "pwd"]);
        assert!(reg.get("rm").is_none());
    }

    #[test]
    fn test_run_command() {
        let vfs = scaffold::build(&[]);
        let sessions = SessionManager::default();
        let ctx = ShellContext::new(&vfs, &sessions, "s1");
        let reg = CommandRegistry::default_commands();

        assert_eq!(run_command("", &ctx, &reg), Ok(String::new()));
        assert_eq!(run_command("pwd", &ctx, &reg), Ok("/home/guest".to_string()));
        assert_eq!(run_command("cd ..", &ctx, &reg), Ok(String::new()));
        assert_eq!(run_command("pwd", &ctx, &reg), Ok("/home".to_string()));

        let err = run_command("frobnicate now", &ctx, &reg).unwrap_err();
        assert_eq!(err.to_string(), "shell: frobnicate: command not found...");

        let err = run_command("cd nowhere", &ctx, &reg).unwrap_err();
        assert_eq!(err.to_string(), "cd: nowhere: No such file or directory");
    }

    #[test]
    fn test_describe_error() {
        let cases = [
            ("cd", CommandError::new("x", ShellError::NotDirectory), "cd: x: Not a directory"),
            ("cat", CommandError::new("d", ShellError::IsDirectory), "cat: d: Is a directory"),
            ("cat", CommandError::bare(ShellError::MissingArgument), "cat: missing file argument"),
            ("ls", CommandError::bare(ShellError::TooManyArguments), "ls: too many arguments"),
            (
                "ls",
                CommandError::bare(ShellError::InvalidFlag("unknown flag: -z".into())),
                "ls: invalid flag or option",
            ),
            ("ls", CommandError::bare(ShellError::AccessDenied), "ls: Permission denied"),
            ("open", CommandError::new("f", ShellError::NotOpenable), "open: file is not openable"),
        ];
        for (verb, err, want) in cases {
            assert_eq!(describe_error(verb, &err), want);
        }
    }
}
