//! Native REPL over the same shell the browser build runs.
//!
//! Usage:
//!   webterm --repos repos.json
//!   RUST_LOG=webterm=debug webterm --session me

use std::fs;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tracing::{info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use webterm::scaffold::Repository;
use webterm::Shell;

#[derive(Parser, Debug)]
#[command(name = "webterm")]
#[command(about = "Pretend unix shell over an in-memory filesystem")]
struct Args {
    /// JSON array of repository descriptors to put under the projects dir
    #[arg(long)]
    repos: Option<PathBuf>,

    /// Session id to run as (a fresh one is minted if omitted)
    #[arg(long, default_value = "")]
    session: String,

    /// Log filter, overrides RUST_LOG
    #[arg(long)]
    log: Option<String>,
}

fn load_repos(path: Option<&PathBuf>) -> Result<Vec<Repository>> {
    let Some(path) = path else {
        return Ok(Vec::new());
    };
    let raw = match fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            warn!(path = %path.display(), error = %e, "can't read repos file, starting without repositories");
            return Ok(Vec::new());
        }
    };
    serde_json::from_str(&raw).with_context(|| format!("parse repositories from {}", path.display()))
}

fn main() -> Result<()> {
    let args = Args::parse();

    let filter = match &args.log {
        Some(directives) => EnvFilter::try_new(directives).context("bad --log filter")?,
        None => EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
    };
    fmt().with_env_filter(filter).with_writer(io::stderr).init();

    let repos = load_repos(args.repos.as_ref())?;
    let shell = Shell::new(&repos);
    let session = shell.sessions().ensure_session(&args.session);
    info!(session = %session, repos = repos.len(), "shell ready");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut prompt = shell.prompt(&session);
    loop {
        print!("{}", prompt);
        stdout.flush()?;

        let mut input = String::new();
        // EOF ends the session too
        if stdin.lock().read_line(&mut input)? == 0 {
            println!();
            break;
        }
        if input.trim() == "exit" {
            break;
        }

        let resp = shell.execute(&session, &input);
        if resp.special_action.as_deref() == Some("clear_screen") {
            // ansi clear + home
            print!("\x1b[2J\x1b[H");
        }
        if !resp.output.is_empty() {
            println!("{}", resp.output);
        }
        prompt = resp.next_prompt;
    }
    Ok(())
}
