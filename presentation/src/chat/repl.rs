//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::ConsoleFormatter;
use crate::StreamProgress;
use colored::Colorize;
use parley_application::ChatController;
use parley_domain::{SessionId, StreamEvent};
use rustyline::error::ReadlineError;
use rustyline::{DefaultEditor, Result as RlResult};
use std::io::Write;

/// Interactive chat REPL
///
/// Owns the [`ChatController`] and drives it from user input: plain lines
/// are sent as messages, `/commands` manage sessions, retries, and edits.
pub struct ChatRepl {
    controller: ChatController,
    show_progress: bool,
}

impl ChatRepl {
    /// Create a new ChatRepl
    pub fn new(controller: ChatController) -> Self {
        Self {
            controller,
            show_progress: true,
        }
    }

    /// Set whether to show the first-token spinner
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    /// Send one message, stream the reply, and return (one-shot mode).
    pub async fn run_once(&mut self, message: &str) {
        self.send_and_stream(message).await;
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> RlResult<()> {
        let mut rl = DefaultEditor::new()?;

        // Try to load history
        let history_path = dirs::data_dir().map(|p| p.join("parley").join("history.txt"));

        if let Some(ref path) = history_path {
            if let Some(parent) = path.parent() {
                let _ = std::fs::create_dir_all(parent);
            }
            let _ = rl.load_history(path);
        }

        self.print_welcome();

        loop {
            let readline = rl.readline("you> ");

            match readline {
                Ok(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    // Handle commands
                    if line.starts_with('/') {
                        if self.handle_command(line, &mut rl).await {
                            break;
                        }
                        continue;
                    }

                    // Add to history
                    let _ = rl.add_history_entry(line);

                    self.send_and_stream(line).await;
                }
                Err(ReadlineError::Interrupted) => {
                    println!("^C");
                    continue;
                }
                Err(ReadlineError::Eof) => {
                    println!("Bye!");
                    break;
                }
                Err(err) => {
                    eprintln!("Error: {:?}", err);
                    break;
                }
            }
        }

        // Save history
        if let Some(ref path) = history_path {
            let _ = rl.save_history(path);
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("╭─────────────────────────────────────────────╮");
        println!("│              Parley - Chat Mode             │");
        println!("╰─────────────────────────────────────────────╯");
        println!();
        println!("Session: {}", self.controller.session_id());
        println!();
        println!("Commands:");
        println!("  /help       - Show all commands");
        println!("  /sessions   - List sessions");
        println!("  /quit       - Exit chat");
        println!();
    }

    /// Handle a slash command. Returns true if the REPL should exit.
    async fn handle_command(&mut self, cmd: &str, rl: &mut DefaultEditor) -> bool {
        let parts: Vec<&str> = cmd.splitn(2, ' ').collect();
        let command = parts.first().copied().unwrap_or("");
        let args = parts.get(1).copied().unwrap_or("").trim();

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                true
            }
            "/help" | "/h" | "/?" => {
                self.print_help();
                false
            }
            "/sessions" | "/ls" => {
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::format_sessions(
                        self.controller.registry(),
                        self.controller.session_id()
                    )
                );
                println!();
                false
            }
            "/open" => {
                match self.resolve_session_arg(args) {
                    Some(id) => match self.controller.load_session(&id).await {
                        Ok(()) => {
                            println!();
                            println!(
                                "{}",
                                ConsoleFormatter::format_transcript(self.controller.transcript())
                            );
                            println!();
                        }
                        Err(e) => eprintln!("{} {}", "error:".red().bold(), e),
                    },
                    None => eprintln!("Usage: /open <number|id> (see /sessions)"),
                }
                false
            }
            "/new" => {
                let id = self.controller.new_session().await;
                println!("Started session {}", id);
                false
            }
            "/delete" => {
                let target = if args.is_empty() {
                    Some(self.controller.session_id().clone())
                } else {
                    self.resolve_session_arg(args)
                };
                match target {
                    Some(id) => {
                        self.controller.delete_session(&id).await;
                        println!("Deleted session {}", id);
                        println!("Active session: {}", self.controller.session_id());
                    }
                    None => eprintln!("Usage: /delete [number|id]"),
                }
                false
            }
            "/retry" => {
                let index = if args.is_empty() {
                    self.controller.failed_indices().iter().next_back().copied()
                } else {
                    args.parse::<usize>().ok()
                };
                match index {
                    Some(index) => {
                        if self.controller.retry(index).await {
                            self.stream_reply().await;
                        } else {
                            eprintln!("Nothing to retry at index {}", index);
                        }
                    }
                    None => eprintln!("No failed message to retry"),
                }
                false
            }
            "/edit" => {
                match args.parse::<usize>() {
                    Ok(index) => self.edit_message(index, rl).await,
                    Err(_) => eprintln!("Usage: /edit <index> (see the transcript indices)"),
                }
                false
            }
            "/context" | "/ctx" => {
                println!();
                println!(
                    "{}",
                    ConsoleFormatter::format_context(self.controller.context())
                );
                println!();
                false
            }
            "/clear" => {
                self.controller.clear_active_session().await;
                println!("Cleared.");
                false
            }
            "/dismiss" => {
                self.controller.dismiss_error();
                false
            }
            _ => {
                println!("Unknown command: {}", command);
                println!("Type /help for available commands");
                false
            }
        }
    }

    fn print_help(&self) {
        println!();
        println!("Commands:");
        println!("  /help, /h, /?     - Show this help");
        println!("  /sessions, /ls    - List sessions (most recent first)");
        println!("  /open <n|id>      - Switch to a session");
        println!("  /new              - Start a fresh session");
        println!("  /delete [n|id]    - Delete a session (default: current)");
        println!("  /retry [index]    - Resend a failed message");
        println!("  /edit <index>     - Edit a sent message and resend");
        println!("  /context, /ctx    - Show the assistant's context");
        println!("  /clear            - Clear the current conversation");
        println!("  /dismiss          - Dismiss the current error");
        println!("  /quit, /exit, /q  - Exit chat");
        println!();
    }

    /// Resolve a `/sessions` list number (1-based) or a raw session id.
    fn resolve_session_arg(&self, arg: &str) -> Option<SessionId> {
        if arg.is_empty() {
            return None;
        }
        if let Ok(n) = arg.parse::<usize>() {
            return self
                .controller
                .registry()
                .entries()
                .get(n.checked_sub(1)?)
                .map(|e| e.id.clone());
        }
        let id = SessionId::new(arg);
        self.controller.registry().get(&id).map(|e| e.id.clone())
    }

    async fn edit_message(&mut self, index: usize, rl: &mut DefaultEditor) {
        let Some(original) = self.controller.start_edit(index) else {
            eprintln!("Cannot edit message {}", index);
            return;
        };

        match rl.readline_with_initial("edit> ", (original.as_str(), "")) {
            Ok(line) => {
                if self.controller.save_edit(index, &line).await {
                    self.stream_reply().await;
                } else {
                    self.controller.cancel_edit();
                    eprintln!("Edit discarded (empty content)");
                }
            }
            Err(_) => {
                self.controller.cancel_edit();
                println!("Edit cancelled");
            }
        }
    }

    async fn send_and_stream(&mut self, content: &str) {
        if !self.controller.send_message(content).await {
            eprintln!("Nothing to send");
            return;
        }
        self.stream_reply().await;
    }

    /// Pump the active stream to completion, printing tokens as they
    /// arrive.
    async fn stream_reply(&mut self) {
        let mut progress = if self.show_progress {
            Some(StreamProgress::start("thinking..."))
        } else {
            None
        };
        let mut started = false;

        while let Some(event) = self.controller.next_stream_event().await {
            match event {
                StreamEvent::Token { content } => {
                    if let Some(p) = progress.take() {
                        p.finish();
                    }
                    if !started {
                        print!("{} ", "agent>".green().bold());
                        started = true;
                    }
                    print!("{}", content);
                    let _ = std::io::stdout().flush();
                }
                StreamEvent::Done => {
                    println!();
                }
                StreamEvent::Error { .. } => {
                    if started {
                        println!();
                    }
                }
            }
        }
        if let Some(p) = progress.take() {
            p.finish();
        }

        if let Some(error) = self.controller.error() {
            eprintln!("{} {}", "error:".red().bold(), error);
            eprintln!("Use /retry to resend, or /dismiss to hide this error.");
        }
    }
}
