//! REPL (Read-Eval-Print Loop) implementation

use crate::error::{CliError, CliResult};
use crate::runtime::{format_plan, Session};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;

/// What the REPL does after a line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Print this text and read the next line
    Print(String),
    /// Read the next line
    Continue,
    /// Leave the REPL
    Exit,
}

/// Run the interactive REPL
///
/// # Arguments
/// * `session` - The session requests are simulated in
/// * `exports` - Export string applied to every simulated request
///
/// # Returns
/// `Ok(())` when REPL exits normally
pub fn run_repl(session: &mut Session, exports: Option<&str>) -> CliResult<()> {
    let mut editor = DefaultEditor::new()
        .map_err(|e| CliError::Repl(format!("Failed to initialize editor: {}", e)))?;

    println!("Corten Asset Loader v{}", env!("CARGO_PKG_VERSION"));
    println!("Type a request to simulate it, or .help for commands.");
    println!();

    loop {
        match editor.readline("> ") {
            Ok(line) => {
                if line.trim().is_empty() {
                    continue;
                }
                let _ = editor.add_history_entry(line.as_str());

                match execute_line(session, &line, exports) {
                    Ok(Action::Print(text)) => print!("{}", text),
                    Ok(Action::Continue) => {}
                    Ok(Action::Exit) => {
                        println!("Goodbye!");
                        break;
                    }
                    Err(e) => eprintln!("Error: {}", e),
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("Press Ctrl-D or type .exit to quit");
            }
            Err(ReadlineError::Eof) => {
                println!("\nGoodbye!");
                break;
            }
            Err(err) => {
                return Err(CliError::Repl(format!("Readline error: {}", err)));
            }
        }
    }

    Ok(())
}

/// Runs one REPL line against `session`.
///
/// Lines starting with `.` are commands; anything else is a request to
/// simulate.
pub fn execute_line(session: &mut Session, line: &str, exports: Option<&str>) -> CliResult<Action> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(Action::Continue);
    }
    if !line.starts_with('.') {
        let report = session.simulate(line, exports)?;
        return Ok(Action::Print(report.to_string()));
    }

    let (command, argument) = match line.split_once(char::is_whitespace) {
        Some((command, rest)) => (command, rest.trim()),
        None => (line, ""),
    };

    match command {
        ".exit" | ".quit" => Ok(Action::Exit),
        ".help" => Ok(Action::Print(help_text())),
        ".plan" => Ok(Action::Print(format_plan(&session.plan(argument)?))),
        ".alias" => {
            session.add_alias(argument)?;
            Ok(Action::Continue)
        }
        ".export-alias" => {
            session.add_export_alias(argument)?;
            Ok(Action::Continue)
        }
        ".fail" => {
            let url = session.fail(argument)?;
            Ok(Action::Print(format!("failing {}\n", url)))
        }
        ".reset" => {
            session.reset()?;
            Ok(Action::Print("loader reset\n".to_string()))
        }
        _ => Err(CliError::Usage(format!(
            "unknown command {}; type .help for available commands",
            command
        ))),
    }
}

fn help_text() -> String {
    [
        "REPL Commands:",
        "  <request>                  - Simulate a request",
        "  .plan <request>            - Show the tiers of a request",
        "  .alias NAME=TEXT           - Add a request alias",
        "  .export-alias NAME=TEXT    - Add an export alias",
        "  .fail <url or name>        - Make fetches of a resource fail",
        "  .reset                     - Start over with a fresh loader",
        "  .help                      - Show this help message",
        "  .exit                      - Exit the REPL",
        "",
    ]
    .join("\n")
}
