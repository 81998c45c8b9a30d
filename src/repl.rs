//! Interactive shell and script runner around a `Session`.
//!
//! Owns everything interactive: history, completion, confirmation of
//! destructive commands, timing and printing. Each submitted line is handed
//! to the session exactly once, in order.

use std::borrow::Cow;
use std::io::{self, BufRead, Write};
use std::time::Instant;

use anyhow::Result;
use rustyline::completion::{Completer, Pair};
use rustyline::error::ReadlineError;
use rustyline::highlight::Highlighter;
use rustyline::hint::{Hinter, HistoryHinter};
use rustyline::history::DefaultHistory;
use rustyline::validate::Validator;
use rustyline::{CompletionType, Config, EditMode, Editor, Helper};
use tracing::{debug, error};

use tabledb::{
    error::Error,
    sql::{
        engine::Session,
        executor::ResultSet,
        parser::{Parser, ast::Statement},
    },
    storage::engine::Storage,
};

use crate::cli::CliConfig;
use crate::formatter::format_result;

const PROMPT: &str = "tabledb> ";

/// Words offered by tab completion
const KEYWORDS: &[&str] = &[
    "CREATE", "TABLE", "DROP", "LIST", "TABLES", "INSERT", "INTO", "VALUES", "SELECT", "FROM",
    "WHERE", "UPDATE", "SET", "DELETE", "HELP", "EXIT", "TRUE", "FALSE", "INT", "STR", "FLOAT",
    "BOOL",
];

/// Rustyline helper: keyword completion and hints from history
struct ShellHelper {
    hinter: HistoryHinter,
}

impl ShellHelper {
    fn new() -> Self {
        Self {
            hinter: HistoryHinter::new(),
        }
    }
}

impl Completer for ShellHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &rustyline::Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        // Find the word being typed
        let start = line[..pos]
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = line[start..pos].to_uppercase();

        let matches = KEYWORDS
            .iter()
            .filter(|kw| !word.is_empty() && kw.starts_with(&word))
            .map(|kw| Pair {
                display: kw.to_string(),
                replacement: kw.to_string(),
            })
            .collect();
        Ok((start, matches))
    }
}

impl Hinter for ShellHelper {
    type Hint = String;

    fn hint(&self, line: &str, pos: usize, ctx: &rustyline::Context<'_>) -> Option<String> {
        self.hinter.hint(line, pos, ctx)
    }
}

impl Highlighter for ShellHelper {
    fn highlight_hint<'h>(&self, hint: &'h str) -> Cow<'h, str> {
        // Dim
        Cow::Owned(format!("\x1b[2m{}\x1b[0m", hint))
    }
}

impl Validator for ShellHelper {}

impl Helper for ShellHelper {}

/// What the caller should do after a line
#[derive(Debug, PartialEq)]
pub enum Flow {
    Continue,
    Exit,
}

/// Shell state: the session plus presentation settings
pub struct Shell<S: Storage> {
    session: Session<S>,
    config: CliConfig,
}

impl<S: Storage + 'static> Shell<S> {
    pub fn new(session: Session<S>, config: CliConfig) -> Self {
        Self { session, config }
    }

    /// Prints the welcome banner
    pub fn print_banner(&self) {
        println!("tabledb v{}", env!("CARGO_PKG_VERSION"));
        if self.config.in_memory {
            println!("In-memory session, nothing will be saved.");
        } else {
            println!("Data directory: {}", self.config.data_dir.display());
        }
        println!("Type 'EXIT' to quit, 'HELP' for commands\n");
    }

    /// Runs one line. `confirm` is asked before destructive commands unless
    /// confirmations are turned off.
    pub fn run_line(&mut self, line: &str, confirm: &mut dyn FnMut(&str) -> bool) -> Flow {
        let stmt = match Parser::new(line).parse() {
            Ok(stmt) => stmt,
            Err(err) => {
                eprintln!("Error: {}", err);
                return Flow::Continue;
            }
        };

        if stmt.is_destructive() && !self.config.assume_yes {
            let question = match &stmt {
                Statement::DropTable { name } => {
                    format!("drop table {} and all its data", name)
                }
                Statement::Delete { table_name, .. } => {
                    format!("delete every row of {}", table_name)
                }
                _ => "continue".to_string(),
            };
            if !confirm(&format!("Are you sure you want to {}? (y/N): ", question)) {
                println!("Action cancelled");
                return Flow::Continue;
            }
        }

        let start = Instant::now();
        let result = self.session.execute_statement(stmt);
        let elapsed = start.elapsed();

        let flow = match result {
            Ok(result) => self.print_result(&result),
            Err(Error::Unpersisted { result, reason }) => {
                let flow = self.print_result(&result);
                eprintln!("Warning: the change was applied but could not be saved: {}", reason);
                flow
            }
            Err(err) => {
                eprintln!("Error: {}", err);
                Flow::Continue
            }
        };
        if self.config.timing && flow == Flow::Continue {
            println!("Execution time: {:.4} seconds", elapsed.as_secs_f64());
        }
        flow
    }

    fn print_result(&self, result: &ResultSet) -> Flow {
        match format_result(result) {
            Some(text) => {
                println!("{}", text);
                Flow::Continue
            }
            None => Flow::Exit,
        }
    }

    /// Runs commands from a script, one per line; `--` starts a comment line
    pub fn run_script(&mut self, content: &str) {
        let mut confirm = confirm_stdin;
        for line in content.lines().map(str::trim) {
            if line.is_empty() || line.starts_with("--") {
                continue;
            }
            debug!(line, "script line");
            if self.run_line(line, &mut confirm) == Flow::Exit {
                break;
            }
        }
    }

    /// Runs the interactive loop until EXIT or end of input
    pub fn run_interactive(&mut self) -> Result<()> {
        let rl_config = Config::builder()
            .history_ignore_space(true)
            .completion_type(CompletionType::List)
            .edit_mode(EditMode::Emacs)
            .max_history_size(1000)?
            .build();

        let mut editor: Editor<ShellHelper, DefaultHistory> = Editor::with_config(rl_config)?;
        editor.set_helper(Some(ShellHelper::new()));
        let history_file = self.config.history_file.clone();
        if history_file.exists() {
            if let Err(err) = editor.load_history(&history_file) {
                debug!(error = %err, "could not load history");
            }
        }

        loop {
            match editor.readline(PROMPT) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    if let Err(err) = editor.add_history_entry(line) {
                        debug!(error = %err, "could not add history entry");
                    }

                    let mut confirm = |question: &str| match editor.readline(question) {
                        Ok(answer) => is_yes(&answer),
                        Err(_) => false,
                    };
                    if self.run_line(line, &mut confirm) == Flow::Exit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) => {
                    println!("Use 'EXIT' to quit");
                }
                Err(ReadlineError::Eof) => break,
                Err(e) => {
                    error!("Readline error: {}", e);
                    break;
                }
            }
        }

        if let Some(parent) = history_file.parent() {
            std::fs::create_dir_all(parent)?;
        }
        if let Err(err) = editor.save_history(&history_file) {
            debug!(error = %err, "could not save history");
        }
        println!("Goodbye!");
        Ok(())
    }
}

fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Asks on stdin; end of input counts as no
fn confirm_stdin(question: &str) -> bool {
    print!("{}", question);
    let _ = io::stdout().flush();
    let mut answer = String::new();
    match io::stdin().lock().read_line(&mut answer) {
        Ok(0) | Err(_) => false,
        Ok(_) => is_yes(&answer),
    }
}
