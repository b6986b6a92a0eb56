//! Builds the filesystem a fresh terminal starts with: the home directories,
//! one markdown file per repository, a welcome note and a hidden file.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::path::HOME_DIR;
use crate::vfs::VirtualFileSystem;

pub const OWNER_DIR: &str = "home/zorcal";
pub const PROJECTS_DIR: &str = "home/zorcal/projects";

/// Line prefix that marks a file as openable.
pub const URL_MARKER: &str = "**URL:**";

const WELCOME: &str = "Welcome!

This terminal runs on a pretend filesystem that only lives in memory.
Look around with 'ls', move with 'cd', read files with 'cat'.

The interesting stuff is in /home/zorcal/projects - try 'open' on any
file there to visit the repository.
";

const SECRET: &str = "🎉 Congratulations! You found the secret file! 🎉

Hidden files don't show up in a plain 'ls', so you must have used -a.
Nothing in here is real: this whole tree is rebuilt from scratch every
time the server starts, and forgotten when it stops.

Keep poking around.
";

/// A repository as handed over by the upstream content provider.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub language: String,
    #[serde(default)]
    pub stars: u64,
    pub url: String,
    #[serde(default)]
    pub updated_at: String,
}

impl Repository {
    /// Where this repository's file lives.
    pub fn file_path(&self) -> String {
        format!("{}/{}.md", PROJECTS_DIR, self.name)
    }

    /// The generated markdown. The URL line is what `open` looks for.
    pub fn render(&self) -> String {
        format!(
            "# {}\n\n{}\n\n**Language:** {}\n**Stars:** {}\n{} {}\n**Last Updated:** {}\n",
            self.name,
            self.description,
            self.language,
            self.stars,
            URL_MARKER,
            self.url,
            self.updated_at
        )
    }
}

/// Build the starting filesystem. Directories go in top-down so everything
/// below them is listed.
pub fn build(repos: &[Repository]) -> VirtualFileSystem {
    let mut vfs = VirtualFileSystem::new();

    vfs.add_dir(""); // root dir
    vfs.add_dir("home");
    vfs.add_dir(OWNER_DIR);
    vfs.add_dir(HOME_DIR);
    vfs.add_dir(PROJECTS_DIR);

    for repo in repos {
        if let Err(err) = vfs.add_file(&repo.file_path(), repo.render()) {
            warn!(repo = %repo.name, error = %err, "skipping repository file");
        }
    }

    let extras = [
        (format!("{}/welcome.txt", HOME_DIR), WELCOME),
        (format!("{}/.secret.txt", OWNER_DIR), SECRET),
    ];
    for (path, content) in extras {
        if let Err(err) = vfs.add_file(&path, content) {
            warn!(path = %path, error = %err, "skipping scaffold file");
        }
    }

    debug!(repos = repos.len(), nodes = vfs.node_count(), "filesystem built");
    vfs
}
