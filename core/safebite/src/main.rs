mod adapter;
mod cli;
mod domain;
mod ports;
mod usecase;
mod wiring;

#[cfg(test)]
mod tests;

use std::process;
use common::error::Error;
use common::ports::outbound::{LogLevel, LogRecord};
use cli::render::{
    render_categories, render_history_row, render_preferences, render_report, render_save_note,
};
use cli::{config_to_command, parse_args, print_completion, Config, ParseOutcome};
use domain::SafebiteCommand;
use ports::inbound::UseCaseRunner;
use usecase::AnalysisOutcome;
use wiring::{wire_safebite, App};

/// Command をディスパッチする Runner（match は main レイヤーに集約）
struct Runner {
    app: App,
}

impl Runner {
    fn print_analysis(&self, outcome: &AnalysisOutcome) {
        print!("{}", render_report(&outcome.record));
        if let Some(note) = render_save_note(outcome.stage) {
            eprintln!("safebite: {}", note);
        }
    }
}

impl UseCaseRunner for Runner {
    fn run(&self, config: Config) -> Result<i32, Error> {
        let cmd = config_to_command(config)?;
        let command_name = cmd.name();
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command started")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name),
        );

        let use_case = &self.app.use_case;
        let result = match cmd {
            SafebiteCommand::Help => {
                print_help();
                Ok(0)
            }
            SafebiteCommand::Scan {
                image,
                category,
                notes,
            } => use_case
                .scan(&image, category, notes.as_deref())
                .map(|outcome| {
                    self.print_analysis(&outcome);
                    0
                }),
            SafebiteCommand::Describe {
                description,
                category,
            } => use_case.describe(&description, category).map(|outcome| {
                self.print_analysis(&outcome);
                0
            }),
            SafebiteCommand::History { filter } => {
                let records = use_case.history(&filter);
                if records.is_empty() {
                    println!("No saved results.");
                }
                for r in &records {
                    println!("{}", render_history_row(r));
                }
                Ok(0)
            }
            SafebiteCommand::Show { id } => match use_case.show(&id) {
                Some(record) => {
                    print!("{}", render_report(&record));
                    Ok(0)
                }
                None => {
                    eprintln!("safebite: no saved result with id '{}'", id);
                    Ok(1)
                }
            },
            SafebiteCommand::Delete { id } => use_case.delete(&id).map(|outcome| {
                if outcome.removed {
                    println!("Deleted {}. {} result(s) remain.", id, outcome.remaining.len());
                    0
                } else {
                    eprintln!("safebite: no saved result with id '{}'", id);
                    1
                }
            }),
            SafebiteCommand::Settings { update } => {
                print!("{}", render_preferences(&use_case.settings(&update)));
                Ok(0)
            }
            SafebiteCommand::Categories => {
                print!("{}", render_categories());
                Ok(0)
            }
        };

        let code = match &result {
            Ok(code) => *code,
            Err(e) => e.exit_code(),
        };
        let _ = self.app.logger.log(
            &LogRecord::new(LogLevel::Info, "command finished")
                .layer("cli")
                .kind("lifecycle")
                .field("command", command_name)
                .field("exit_code", code),
        );
        if let Err(ref e) = result {
            let _ = self.app.logger.log(
                &LogRecord::new(LogLevel::Error, e.to_string())
                    .layer("cli")
                    .kind("error"),
            );
        }
        result
    }
}

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err(e) => {
            if e.is_usage() {
                print_usage();
            }
            eprintln!("safebite: {}", e);
            e.exit_code()
        }
    };
    process::exit(exit_code);
}

pub fn run() -> Result<i32, Error> {
    let config = match parse_args()? {
        ParseOutcome::Config(c) => c,
        ParseOutcome::GenerateCompletion(shell) => {
            print_completion(shell);
            return Ok(0);
        }
        ParseOutcome::Display(text) => {
            print!("{}", text);
            return Ok(0);
        }
    };
    // ヘルプはホームディレクトリが無くても表示する
    if config.help {
        print_help();
        return Ok(0);
    }
    let app = wire_safebite(config.verbose)?;
    let runner = Runner { app };
    runner.run(config)
}

fn print_usage() {
    eprintln!("Usage: safebite [options] <command> [args...]");
}

fn print_help() {
    println!("Usage: safebite [options] <command> [args...]");
    println!("Commands:");
    println!("  scan <image> [-c <category>] [-n <notes>]   Analyse a photo of a food item and save the result");
    println!("  describe <text...> [-c <category>]           Analyse a text description and save the result");
    println!("  history [-q <term>] [-s <status>]            List saved results, newest first");
    println!("  show <id>                                    Show a saved result");
    println!("  delete <id>                                  Delete a saved result");
    println!("  settings [--sensitivity <1-100>] [--artificial-colors on|off]");
    println!("           [--texture on|off] [--freshness on|off]");
    println!("                                               Show or change detection preferences");
    println!("  categories                                   List the food categories");
    println!("Options:");
    println!("  -h, --help                    Show this help message");
    println!("  -v, --verbose                 Also write structured logs to stderr");
    println!("  --generate <shell>            Generate shell completion script (bash, zsh, fish)");
    println!();
    println!("Environment:");
    println!("  GEMINI_API_KEY   API key for the model service (name configurable via api_key_env)");
    println!("  SAFEBITE_HOME    Home directory. Config: $SAFEBITE_HOME/config.json; results: $SAFEBITE_HOME/storage/");
    println!("                   If unset, $XDG_CONFIG_HOME/safebite (e.g. ~/.config/safebite) is used.");
    println!();
    println!("Categories: liquid (default), produce, pantry, packaged");
    println!();
    println!("Examples:");
    println!("  safebite scan milk.jpg -n \"left out for a week, still fresh\"");
    println!("  safebite describe -c pantry turmeric leaves a yellow stain that will not wash off");
    println!("  safebite history -s Adulterated");
}
