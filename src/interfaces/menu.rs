//! Interactive numbered menu, one line of stdin per prompt — the same
//! surface the original management scripts exposed.

use crate::domain::env_schema::EDITOR_KEYS;
use crate::interfaces::cli::Command;
use crate::interfaces::dispatch::Dispatcher;
use crate::interfaces::reporter;
use anyhow::Result;
use std::io::Write;

/// One line from stdin, `None` on EOF. Locks stdin only for the read so
/// nested prompts (uninstall confirmation) work.
fn read_line(prompt: &str) -> Result<Option<String>> {
    print!("{}", prompt);
    std::io::stdout().flush()?;

    let mut line = String::new();
    if std::io::stdin().read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim().to_string()))
}

pub fn run(dispatcher: &Dispatcher) -> Result<()> {
    loop {
        reporter::print_menu();

        let choice = match read_line("Select an option: ")? {
            Some(choice) => choice,
            // EOF behaves like exit so piped input terminates cleanly
            None => return Ok(()),
        };

        let command = match choice.as_str() {
            "0" | "q" | "exit" => return Ok(()),
            "1" => Some(Command::Install { force: false }),
            "2" => Some(Command::Start),
            "3" => Some(Command::Stop),
            "4" => Some(Command::Restart),
            "5" => Some(Command::Status { json: false }),
            "6" => Some(Command::Logs { lines: None }),
            "7" => {
                if let Err(e) = edit_config(dispatcher) {
                    println!("❌ {:#}", e);
                }
                None
            }
            "8" => Some(Command::Train { simple: false }),
            "9" => Some(Command::Backtest),
            "10" => Some(Command::Update),
            "11" => Some(Command::Uninstall {
                yes: false,
                keep_config: true,
            }),
            other => {
                println!("Invalid option: {:?}", other);
                None
            }
        };

        if let Some(command) = command {
            // Menu keeps running after a failed operation
            if let Err(e) = dispatcher.execute(command) {
                println!("❌ {:#}", e);
            }
        }
    }
}

/// Walks the common keys, showing the current value and taking a new one.
/// Empty input keeps the current value.
fn edit_config(dispatcher: &Dispatcher) -> Result<()> {
    let mut env = dispatcher.load_env()?;
    reporter::section("Edit configuration (empty input keeps the current value)");

    let mut changed = false;
    for key in EDITOR_KEYS {
        let current = env.get(key).unwrap_or("").to_string();

        let input = match read_line(&format!("  {} [{}]: ", key, current))? {
            Some(input) => input,
            None => break,
        };

        if !input.is_empty() && input != current {
            env.set(key, &input)?;
            changed = true;
        }
    }

    if changed {
        dispatcher.save_env(&env)?;
        println!("✅ Configuration saved. Restart the bot to apply changes.");
    } else {
        println!("No changes.");
    }
    Ok(())
}
