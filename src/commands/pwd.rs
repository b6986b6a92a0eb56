use crate::command::{Command, CommandResult, ShellContext};

/// pwd
/// Print the current working directory as an absolute path.
pub struct PwdCommand;

impl Command for PwdCommand {
    fn execute(&self, _args: &[String], ctx: &ShellContext<'_>) -> CommandResult {
        Ok(print_working_directory(ctx))
    }
}

/// Never fails; root comes out as a bare `/`.
pub fn print_working_directory(ctx: &ShellContext<'_>) -> String {
    format!("/{}", ctx.current_dir())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::testing::{at, setup, SESSION};

    #[test]
    fn test_pwd() {
        let (vfs, sessions) = setup();
        let ctx = ShellContext::new(&vfs, &sessions, SESSION);

        assert_eq!(print_working_directory(&ctx), "/home/guest");
        at(&sessions, "");
        assert_eq!(print_working_directory(&ctx), "/");
        at(&sessions, "home/zorcal/projects");
        assert_eq!(PwdCommand.execute(&[], &ctx).unwrap(), "/home/zorcal/projects");
    }
}
