use crate::domain::{
    Category, HistoryFilter, PreferencesUpdate, SafebiteCommand, UserPreferences, Verdict,
};
use clap::builder::ArgAction;
use clap::error::ErrorKind;
use clap::value_parser;
use clap_complete::Shell;
use common::domain::RecordId;
use common::error::Error;
use std::path::PathBuf;

/// サブコマンドの生の引数（検証は config_to_command で行う）
#[derive(Debug, Clone, PartialEq)]
pub enum Subcommand {
    Scan {
        image: PathBuf,
        category: Option<String>,
        notes: Option<String>,
    },
    Describe {
        words: Vec<String>,
        category: Option<String>,
    },
    History {
        search: Option<String>,
        status: Option<String>,
    },
    Show {
        id: String,
    },
    Delete {
        id: String,
    },
    Settings {
        sensitivity: Option<u32>,
        artificial_colors: Option<bool>,
        texture: Option<bool>,
        freshness: Option<bool>,
    },
    Categories,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    pub help: bool,
    /// -v / --verbose: 構造化ログを stderr にも出す
    pub verbose: bool,
    pub subcommand: Option<Subcommand>,
}

/// 解析結果: 通常の Config / 補完スクリプト生成 / clap が用意したヘルプ文
#[derive(Debug, Clone)]
pub enum ParseOutcome {
    Config(Config),
    GenerateCompletion(Shell),
    /// サブコマンドの -h など、clap がそのまま表示する文面
    Display(String),
}

fn category_arg() -> clap::Arg {
    clap::Arg::new("category")
        .short('c')
        .long("category")
        .value_name("category")
        .help("liquid | produce | pantry | packaged (id or display name). Default: liquid")
        .num_args(1)
}

fn switch_arg(name: &'static str, help: &'static str) -> clap::Arg {
    clap::Arg::new(name)
        .long(name)
        .value_name("on|off")
        .help(help)
        .value_parser(["on", "off"])
        .num_args(1)
}

fn build_clap_command() -> clap::Command {
    clap::Command::new("safebite")
        .about("Detect food adulteration from a photo or a description")
        .disable_help_flag(true)
        .disable_help_subcommand(true)
        .arg(
            clap::Arg::new("help")
                .short('h')
                .long("help")
                .help("Show this help message")
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("verbose")
                .short('v')
                .long("verbose")
                .help("Also write structured logs to stderr")
                .global(true)
                .action(ArgAction::SetTrue),
        )
        .arg(
            clap::Arg::new("generate")
                .long("generate")
                .value_name("shell")
                .help("Generate shell completion script")
                .value_parser(value_parser!(Shell))
                .num_args(1),
        )
        .subcommand(
            clap::Command::new("scan")
                .about("Analyse a photo of a food item and save the result")
                .arg(
                    clap::Arg::new("image")
                        .index(1)
                        .required(true)
                        .value_name("image")
                        .help("Image file (png, jpg, webp, gif, heic)")
                        .value_parser(value_parser!(PathBuf)),
                )
                .arg(category_arg())
                .arg(
                    clap::Arg::new("notes")
                        .short('n')
                        .long("notes")
                        .value_name("notes")
                        .help("Additional notes for the analysis")
                        .num_args(1),
                ),
        )
        .subcommand(
            clap::Command::new("describe")
                .about("Analyse a text description of a food item and save the result")
                .arg(
                    clap::Arg::new("text")
                        .index(1)
                        .required(true)
                        .value_name("text")
                        .help("Description of the symptoms or characteristics")
                        .num_args(1..)
                        .trailing_var_arg(true),
                )
                .arg(category_arg()),
        )
        .subcommand(
            clap::Command::new("history")
                .about("List saved results, newest first")
                .arg(
                    clap::Arg::new("search")
                        .short('q')
                        .long("search")
                        .value_name("term")
                        .help("Match sample name (case-insensitive), id or date")
                        .num_args(1),
                )
                .arg(
                    clap::Arg::new("status")
                        .short('s')
                        .long("status")
                        .value_name("status")
                        .help("Safe | Adulterated | Inconclusive")
                        .num_args(1),
                ),
        )
        .subcommand(
            clap::Command::new("show")
                .about("Show a saved result")
                .arg(clap::Arg::new("id").index(1).required(true).value_name("id")),
        )
        .subcommand(
            clap::Command::new("delete")
                .about("Delete a saved result")
                .arg(clap::Arg::new("id").index(1).required(true).value_name("id")),
        )
        .subcommand(
            clap::Command::new("settings")
                .about("Show or change detection preferences")
                .arg(
                    clap::Arg::new("sensitivity")
                        .long("sensitivity")
                        .value_name("1-100")
                        .help("Detection sensitivity")
                        .value_parser(value_parser!(u32))
                        .num_args(1),
                )
                .arg(switch_arg("artificial-colors", "Detect artificial colors"))
                .arg(switch_arg("texture", "Analyze texture"))
                .arg(switch_arg("freshness", "Freshness index")),
        )
        .subcommand(clap::Command::new("categories").about("List the food categories"))
}

fn switch_value(matches: &clap::ArgMatches, name: &str) -> Option<bool> {
    matches.get_one::<String>(name).map(|v| v == "on")
}

fn matches_to_config(matches: &clap::ArgMatches) -> Config {
    let subcommand = match matches.subcommand() {
        Some(("scan", m)) => Some(Subcommand::Scan {
            image: m.get_one::<PathBuf>("image").cloned().unwrap_or_default(),
            category: m.get_one::<String>("category").cloned(),
            notes: m.get_one::<String>("notes").cloned(),
        }),
        Some(("describe", m)) => Some(Subcommand::Describe {
            words: m
                .get_many::<String>("text")
                .map(|i| i.cloned().collect())
                .unwrap_or_default(),
            category: m.get_one::<String>("category").cloned(),
        }),
        Some(("history", m)) => Some(Subcommand::History {
            search: m.get_one::<String>("search").cloned(),
            status: m.get_one::<String>("status").cloned(),
        }),
        Some(("show", m)) => Some(Subcommand::Show {
            id: m.get_one::<String>("id").cloned().unwrap_or_default(),
        }),
        Some(("delete", m)) => Some(Subcommand::Delete {
            id: m.get_one::<String>("id").cloned().unwrap_or_default(),
        }),
        Some(("settings", m)) => Some(Subcommand::Settings {
            sensitivity: m.get_one::<u32>("sensitivity").copied(),
            artificial_colors: switch_value(m, "artificial-colors"),
            texture: switch_value(m, "texture"),
            freshness: switch_value(m, "freshness"),
        }),
        Some(("categories", _)) => Some(Subcommand::Categories),
        _ => None,
    };

    Config {
        help: matches.get_flag("help"),
        verbose: matches.get_flag("verbose"),
        subcommand,
    }
}

fn clap_error(e: clap::Error) -> Result<ParseOutcome, Error> {
    match e.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => {
            Ok(ParseOutcome::Display(e.render().to_string()))
        }
        _ => Err(Error::invalid_argument(e.to_string())),
    }
}

/// コマンドラインを解析する。補完生成が要求された場合は ParseOutcome::GenerateCompletion を返す。
pub fn parse_args() -> Result<ParseOutcome, Error> {
    let cmd = build_clap_command();
    let matches = match cmd.try_get_matches() {
        Ok(m) => m,
        Err(e) => return clap_error(e),
    };

    if let Some(&shell) = matches.get_one::<Shell>("generate") {
        return Ok(ParseOutcome::GenerateCompletion(shell));
    }

    Ok(ParseOutcome::Config(matches_to_config(&matches)))
}

/// テスト用: 引数スライスから解析する
#[allow(dead_code)]
pub fn parse_args_from(args: &[&str]) -> Result<Config, Error> {
    let cmd = build_clap_command();
    let matches = cmd
        .try_get_matches_from(args)
        .map_err(|e| Error::invalid_argument(e.to_string()))?;
    Ok(matches_to_config(&matches))
}

/// 補完スクリプトを標準出力に出力する。
pub fn print_completion(shell: Shell) {
    let mut cmd = build_clap_command();
    clap_complete::generate(shell, &mut cmd, "safebite", &mut std::io::stdout());
}

fn parse_category(raw: Option<String>) -> Result<Category, Error> {
    raw.map(|s| s.parse::<Category>())
        .transpose()
        .map(Option::unwrap_or_default)
}

/// Config を SafebiteCommand に変換する（カテゴリ・状態・感度の検証を含む）
pub fn config_to_command(config: Config) -> Result<SafebiteCommand, Error> {
    if config.help {
        return Ok(SafebiteCommand::Help);
    }

    let subcommand = config.subcommand.ok_or_else(|| {
        Error::invalid_argument("No command given. Run 'safebite --help' for the command list.")
    })?;

    let cmd = match subcommand {
        Subcommand::Scan {
            image,
            category,
            notes,
        } => SafebiteCommand::Scan {
            image,
            category: parse_category(category)?,
            notes: notes.filter(|n| !n.trim().is_empty()),
        },
        Subcommand::Describe { words, category } => {
            let description = words.join(" ");
            if description.trim().is_empty() {
                return Err(Error::invalid_argument("Input missing: description is empty"));
            }
            SafebiteCommand::Describe {
                description,
                category: parse_category(category)?,
            }
        }
        Subcommand::History { search, status } => {
            let status = status
                .map(|s| {
                    Verdict::parse(&s).ok_or_else(|| {
                        Error::invalid_argument(format!(
                            "Unknown status '{}'. Expected Safe, Adulterated or Inconclusive",
                            s
                        ))
                    })
                })
                .transpose()?;
            SafebiteCommand::History {
                filter: HistoryFilter { search, status },
            }
        }
        Subcommand::Show { id } => SafebiteCommand::Show {
            id: RecordId::new(id),
        },
        Subcommand::Delete { id } => SafebiteCommand::Delete {
            id: RecordId::new(id),
        },
        Subcommand::Settings {
            sensitivity,
            artificial_colors,
            texture,
            freshness,
        } => SafebiteCommand::Settings {
            update: PreferencesUpdate {
                sensitivity: sensitivity
                    .map(UserPreferences::validate_sensitivity)
                    .transpose()?,
                detect_artificial_colors: artificial_colors,
                analyze_texture: texture,
                freshness_index: freshness,
            },
        },
        Subcommand::Categories => SafebiteCommand::Categories,
    };
    Ok(cmd)
}
