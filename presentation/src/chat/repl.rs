//! REPL (Read-Eval-Print Loop) for interactive chat

use crate::output::console::ConsoleFormatter;
use crate::progress::reporter::ProgressReporter;
use chatsynth_application::{ChatCompletionGateway, NoProgress, RoundInput, RunRoundUseCase};
use chatsynth_domain::core::string::{single_line, truncate};
use chatsynth_domain::{Message, ModelGroup, OutputFormat, Question, Role, SynthesisMode};
use colored::Colorize;
use reedline::{DefaultPrompt, DefaultPromptSegment, FileBackedHistory, Reedline, Signal};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;
use tracing::warn;

const HISTORY_CAPACITY: usize = 1000;
const PREVIEW_CHARS: usize = 160;

/// Result of a slash command
#[derive(Debug, PartialEq, Eq)]
enum CommandResult {
    Continue,
    Exit,
}

/// Interactive chat REPL
///
/// Keeps the conversation (questions and merged answers) in memory and
/// sends it as prior messages with every new question. Ctrl-C while a round
/// runs cancels that round only; the prompt comes back afterwards.
pub struct ChatRepl<G: ChatCompletionGateway + 'static> {
    use_case: RunRoundUseCase<G>,
    group: ModelGroup,
    conversation: Vec<Message>,
    show_progress: bool,
    output_format: OutputFormat,
    history_file: Option<PathBuf>,
}

impl<G: ChatCompletionGateway + 'static> ChatRepl<G> {
    /// Create a new ChatRepl
    pub fn new(use_case: RunRoundUseCase<G>, group: ModelGroup) -> Self {
        Self {
            use_case,
            group,
            conversation: Vec::new(),
            show_progress: true,
            output_format: OutputFormat::Synthesis,
            history_file: None,
        }
    }

    /// Set whether to show progress
    pub fn with_progress(mut self, show: bool) -> Self {
        self.show_progress = show;
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Persist line-editor history to this file
    pub fn with_history_file(mut self, path: Option<PathBuf>) -> Self {
        self.history_file = path;
        self
    }

    fn editor(&self) -> Reedline {
        let editor = Reedline::create();
        let Some(path) = &self.history_file else {
            return editor;
        };
        if let Some(parent) = path.parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        match FileBackedHistory::with_file(HISTORY_CAPACITY, path.clone()) {
            Ok(history) => editor.with_history(Box::new(history)),
            Err(e) => {
                warn!("Cannot open history file {}: {}", path.display(), e);
                editor
            }
        }
    }

    /// Run the interactive REPL
    pub async fn run(&mut self) -> std::io::Result<()> {
        let mut editor = self.editor();
        let prompt = DefaultPrompt::new(
            DefaultPromptSegment::Basic("chatsynth".to_string()),
            DefaultPromptSegment::Empty,
        );

        self.print_welcome();

        loop {
            match editor.read_line(&prompt)? {
                Signal::Success(line) => {
                    let line = line.trim();

                    // Skip empty lines
                    if line.is_empty() {
                        continue;
                    }

                    if line.starts_with('/') {
                        match self.handle_command(line) {
                            CommandResult::Exit => break,
                            CommandResult::Continue => continue,
                        }
                    }

                    self.process_question(line).await;
                }
                Signal::CtrlC => {
                    println!("^C");
                    continue;
                }
                Signal::CtrlD => {
                    println!("Bye!");
                    break;
                }
                #[allow(unreachable_patterns)]
                _ => continue,
            }
        }

        Ok(())
    }

    fn print_welcome(&self) {
        println!();
        println!("{}", "╭─────────────────────────────────────────────╮".cyan());
        println!("{}", "│            chatsynth - Chat Mode            │".cyan());
        println!("{}", "╰─────────────────────────────────────────────╯".cyan());
        println!();
        self.print_group();
        println!();
        Self::print_help();
    }

    fn print_group(&self) {
        println!("{} {}", "Group:".bold(), self.group.title);
        println!(
            "{} {}",
            "Models:".bold(),
            self.group
                .models
                .iter()
                .map(|m| m.display_name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );
        println!(
            "{} {} ({} mode)",
            "Synthesizer:".bold(),
            self.group.synthesizer.model,
            self.group.synthesizer.mode
        );
    }

    fn print_help() {
        println!("Commands:");
        println!("  {}          - Show this help", "/help".cyan());
        println!("  {}        - Show the current group", "/models".cyan());
        println!(
            "  {}   - Switch merge mode (union, intersection, selective)",
            "/mode <m>".cyan()
        );
        println!("  {}       - Show the conversation so far", "/history".cyan());
        println!("  {}         - Forget the conversation", "/clear".cyan());
        println!("  {}          - Exit chat", "/quit".cyan());
        println!();
    }

    /// Handle slash commands. Returns whether to continue or exit.
    fn handle_command(&mut self, cmd: &str) -> CommandResult {
        let (command, args) = cmd.split_once(' ').unwrap_or((cmd, ""));
        let args = args.trim();

        match command {
            "/quit" | "/exit" | "/q" => {
                println!("Bye!");
                CommandResult::Exit
            }
            "/help" | "/h" | "/?" => {
                println!();
                Self::print_help();
                CommandResult::Continue
            }
            "/models" => {
                println!();
                self.print_group();
                println!();
                CommandResult::Continue
            }
            "/mode" => {
                if args.is_empty() {
                    println!("Current mode: {}", self.group.synthesizer.mode);
                    return CommandResult::Continue;
                }
                match self.set_mode(args) {
                    Ok(mode) => println!("{} {}", "Mode set to".green(), mode),
                    Err(message) => println!("{} {}", "Error:".red().bold(), message),
                }
                CommandResult::Continue
            }
            "/history" => {
                self.print_conversation();
                CommandResult::Continue
            }
            "/clear" => {
                self.conversation.clear();
                println!("{}", "Conversation history cleared.".green());
                CommandResult::Continue
            }
            _ => {
                println!("Unknown command: {}", cmd);
                println!("Type /help for available commands");
                CommandResult::Continue
            }
        }
    }

    fn set_mode(&mut self, value: &str) -> Result<SynthesisMode, String> {
        let mode = value.parse::<SynthesisMode>().map_err(|e| e.to_string())?;
        self.group.synthesizer.mode = mode;
        Ok(mode)
    }

    fn print_conversation(&self) {
        if self.conversation.is_empty() {
            println!("{}", "No conversation yet.".dimmed());
            return;
        }
        println!();
        for message in &self.conversation {
            let speaker = match message.role {
                Role::User => "you".cyan().bold(),
                Role::Assistant => "chatsynth".green().bold(),
                Role::System => "system".dimmed(),
            };
            println!(
                "{}: {}",
                speaker,
                truncate(&single_line(&message.content), PREVIEW_CHARS)
            );
        }
        println!();
    }

    async fn process_question(&mut self, line: &str) {
        let cancel = CancellationToken::new();
        let interrupt = cancel.clone();
        let listener = tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, cancelling the current round");
                interrupt.cancel();
            }
        });

        self.run_round(line, &cancel).await;
        listener.abort();
    }

    async fn run_round(&mut self, line: &str, cancel: &CancellationToken) {
        let question = match Question::new(line) {
            Ok(question) => question,
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
                return;
            }
        };
        println!();

        let input = RoundInput::new(question, self.group.clone())
            .with_history(self.conversation.clone());

        let live = self.output_format == OutputFormat::Synthesis;
        let (result, streamed) = if self.show_progress {
            let progress = ProgressReporter::new().with_live_synthesis(live);
            let result = self
                .use_case
                .execute_cancellable(input, &progress, cancel)
                .await;
            (result, progress.streamed_synthesis())
        } else {
            (
                self.use_case
                    .execute_cancellable(input, &NoProgress, cancel)
                    .await,
                false,
            )
        };

        match result {
            Ok(result) => {
                if let Some(output) =
                    ConsoleFormatter::render_after_stream(&result, self.output_format, streamed)
                {
                    println!("{}", output);
                }
                if result.outcome.is_merged() || result.outcome.is_fallback() {
                    self.conversation.push(Message::user(line));
                    self.conversation
                        .push(Message::assistant(result.outcome.text()));
                }
            }
            Err(e) => {
                eprintln!("{} {}", "Error:".red().bold(), e);
            }
        }
        println!();
    }
}
