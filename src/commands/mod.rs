//! The shell verbs. Each one resolves paths against the session's current
//! directory and reports failures with the exact token the user typed.

pub mod cat;
pub mod cd;
pub mod ls;
pub mod open;
pub mod pwd;

use crate::command::ShellContext;
use crate::error::CommandError;
use crate::path;
use crate::vfs::Metadata;

/// Resolve `arg` against the current directory and stat it. Lookup failures
/// carry `arg` as context.
pub(crate) fn stat_arg(ctx: &ShellContext<'_>, arg: &str) -> Result<(String, Metadata), CommandError> {
    let target = path::resolve(&ctx.current_dir(), arg);
    let info = ctx.vfs.stat(&target).map_err(|err| CommandError::new(arg, err))?;
    Ok((target, info))
}

#[cfg(test)]
pub(crate) mod testing {
    use crate::context::{SessionManager, SessionStore};
    use crate::scaffold::{self, Repository};
    use crate::vfs::VirtualFileSystem;

    pub const SESSION: &str = "session1";

    /// Scaffold with one repository plus a hand-written openable file.
    pub fn setup() -> (VirtualFileSystem, SessionManager) {
        let repos = vec![Repository {
            name: "test-repo".to_string(),
            description: "A test repository".to_string(),
            language: "Rust".to_string(),
            stars: 42,
            url: "https://github.com/test/test-repo".to_string(),
            updated_at: "2024-01-01T00:00:00Z".to_string(),
        }];
        let mut vfs = scaffold::build(&repos);
        vfs.add_file(
            "home/zorcal/projects/app.js",
            "console.log('hello world');\n\n**URL:** https://github.com/example/app-js",
        )
        .unwrap();
        (vfs, SessionManager::default())
    }

    pub fn at(sessions: &SessionManager, dir: &str) {
        sessions.set_current_dir(SESSION, dir);
    }

    pub fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }
}
