// fake unix terminal over an in-memory filesystem
// natively via Shell, in the browser via the wasm Terminal
pub mod command;
pub mod commands;
pub mod context;
pub mod error;
pub mod flag;
pub mod path;
pub mod prompt;
pub mod scaffold;
pub mod vfs;

use chrono::Local;
use serde::{Deserialize, Serialize};
use tracing::debug;
use wasm_bindgen::prelude::*;

use command::{split_command_line, CommandRegistry, ShellContext};
use context::{HistoryEntry, SessionConfig, SessionManager, SessionStore};
use prompt::generate_prompt;
use scaffold::Repository;
use vfs::VirtualFileSystem;

pub use error::{CommandError, ShellError};

const HELP: &str = "Available commands:

  ls [options] [path]  - List directory contents
  cd [path]            - Change directory
  pwd                  - Print working directory
  cat [file]           - Display file contents
  open [file]          - Open files containing URLs in browser
  clear                - Clear terminal history
  help                 - Show this help message

ls options:
";

const LS_LEGEND: &str = "
Long format type indicators:
  d--  directory
  -c-  catable
  -co  catable and openable";

/// What the frontend gets back for one command line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandResponse {
    pub success: bool,
    pub output: String,
    /// Prompt the command was typed at.
    pub prompt: String,
    /// Prompt to show for the next line, after any `cd`.
    pub next_prompt: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub open_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub special_action: Option<String>,
}

/// The whole terminal: a read-only filesystem built once, per-session state,
/// and the verbs.
pub struct Shell {
    vfs: VirtualFileSystem,
    sessions: SessionManager,
    registry: CommandRegistry,
}

impl Shell {
    pub fn new(repos: &[Repository]) -> Self {
        Self::with_config(repos, SessionConfig::default())
    }

    pub fn with_config(repos: &[Repository], config: SessionConfig) -> Self {
        Self {
            vfs: scaffold::build(repos),
            sessions: SessionManager::new(config),
            registry: CommandRegistry::default_commands(),
        }
    }

    pub fn vfs(&self) -> &VirtualFileSystem {
        &self.vfs
    }

    pub fn sessions(&self) -> &SessionManager {
        &self.sessions
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn prompt(&self, session_id: &str) -> String {
        generate_prompt(&self.sessions.current_dir(session_id))
    }

    /// Run one line for a session and record it in that session's history.
    /// A blank line is kept as a prompt-only entry. `clear` wipes the
    /// history instead of adding to it.
    pub fn execute(&self, session_id: &str, line: &str) -> CommandResponse {
        let line = line.trim();
        let prompt = self.prompt(session_id);
        let mut response = CommandResponse {
            success: true,
            output: String::new(),
            prompt: prompt.clone(),
            next_prompt: prompt,
            open_url: None,
            special_action: None,
        };

        let Some((verb, args)) = split_command_line(line) else {
            self.record(session_id, line, &response);
            return response;
        };

        match verb {
            "clear" => {
                self.sessions.clear_history(session_id);
                response.special_action = Some("clear_screen".to_string());
                return response;
            }
            "help" => response.output = help_text(),
            _ => {
                let ctx = ShellContext::new(&self.vfs, &self.sessions, session_id);
                match command::run_command(line, &ctx, &self.registry) {
                    // open hands back the url; the frontend does the opening
                    Ok(url) if verb == "open" => {
                        response.output = format!("Opening {} in browser...", args.first().map_or("", String::as_str));
                        response.open_url = Some(url);
                    }
                    Ok(output) => response.output = output,
                    Err(err) => {
                        debug!(session = %session_id, error = %err, "command failed");
                        response.success = false;
                        response.output = err.to_string();
                    }
                }
            }
        }

        response.next_prompt = self.prompt(session_id);
        self.record(session_id, line, &response);
        response
    }

    fn record(&self, session_id: &str, line: &str, response: &CommandResponse) {
        self.sessions.add_entry(
            session_id,
            HistoryEntry {
                command: line.to_string(),
                output: response.output.clone(),
                success: response.success,
                prompt: response.prompt.clone(),
                timestamp: Local::now(),
            },
        );
    }
}

/// Help screen, with the `ls` flags rendered from its FlagSet.
pub fn help_text() -> String {
    format!("{}{}\n{}", HELP, commands::ls::flags().usage(), LS_LEGEND)
}

// browser side: one Terminal per page, sessions keyed by the frontend
#[wasm_bindgen]
pub struct Terminal {
    shell: Shell,
}

#[wasm_bindgen]
impl Terminal {
    /// `repos_json` is the upstream repository list; empty means no repos.
    #[wasm_bindgen(constructor)]
    pub fn new(repos_json: &str) -> Result<Terminal, JsValue> {
        let repos: Vec<Repository> = if repos_json.trim().is_empty() {
            Vec::new()
        } else {
            serde_json::from_str(repos_json).map_err(|e| JsValue::from_str(&format!("bad repository json: {}", e)))?
        };
        Ok(Terminal {
            shell: Shell::new(&repos),
        })
    }

    /// Returns the session id actually used, minting one for an empty id.
    #[wasm_bindgen]
    pub fn ensure_session(&self, session_id: &str) -> String {
        self.shell.sessions().ensure_session(session_id)
    }

    #[wasm_bindgen]
    pub fn execute_command(&self, session_id: &str, input: &str) -> JsValue {
        let response = self.shell.execute(session_id, input);
        serde_wasm_bindgen::to_value(&response).unwrap_or(JsValue::NULL)
    }

    #[wasm_bindgen]
    pub fn prompt(&self, session_id: &str) -> String {
        self.shell.prompt(session_id)
    }

    /// Full scrollback, blank prompts included.
    #[wasm_bindgen]
    pub fn history(&self, session_id: &str) -> JsValue {
        serde_wasm_bindgen::to_value(&self.shell.sessions().history(session_id)).unwrap_or(JsValue::NULL)
    }

    /// Commands typed so far, oldest first, for up-arrow recall.
    #[wasm_bindgen]
    pub fn command_history(&self, session_id: &str) -> JsValue {
        serde_wasm_bindgen::to_value(&self.shell.sessions().command_history(session_id)).unwrap_or(JsValue::NULL)
    }

    /// Drops idle sessions; returns how many.
    #[wasm_bindgen]
    pub fn cleanup_sessions(&self) -> usize {
        self.shell.sessions().cleanup_expired()
    }

    #[wasm_bindgen]
    pub fn get_command_list(&self) -> JsValue {
        serde_wasm_bindgen::to_value(&self.shell.registry().get_command_names()).unwrap_or(JsValue::NULL)
    }
}
