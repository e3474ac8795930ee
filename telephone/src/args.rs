//! Command line options.
//!
//! Every option pre-answers one of the setup questions; anything left
//! unset is asked interactively.

use std::path::PathBuf;
use telephone_core::DerangePolicy;

/// Where the finished game is saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveTarget {
    /// An explicit file.
    Path(PathBuf),
    /// A timestamped file in the default saves directory.
    Default,
}

/// Which generation backends automated players use.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BackendChoice {
    /// Online when an API key is available, offline otherwise.
    #[default]
    Auto,
    Online,
    Offline,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CliOptions {
    pub help: bool,
    pub human: Option<String>,
    pub ai: Option<usize>,
    pub rounds: Option<u32>,
    pub save: Option<SaveTarget>,
    pub sequential: bool,
    pub workers: Option<usize>,
    pub policy: DerangePolicy,
    pub backend: BackendChoice,
    /// Options that could not be understood, reported as warnings.
    pub ignored: Vec<String>,
}

/// Parse options from `std::env::args()`-style arguments.
pub fn parse_args(args: &[String]) -> CliOptions {
    let mut options = CliOptions::default();

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "-h" | "--help" => options.help = true,
            "--human" => {
                if let Some(name) = args.get(i + 1).filter(|n| !n.trim().is_empty()) {
                    options.human = Some(name.trim().to_string());
                    i += 1;
                }
            }
            "--ai" => {
                if let Some(n) = args.get(i + 1) {
                    match n.parse::<usize>() {
                        Ok(n) => options.ai = Some(n),
                        Err(_) => options.ignored.push(format!("--ai {n}")),
                    }
                    i += 1;
                }
            }
            "--rounds" => {
                if let Some(n) = args.get(i + 1) {
                    match n.parse::<u32>() {
                        Ok(n) if n > 0 => options.rounds = Some(n),
                        _ => options.ignored.push(format!("--rounds {n}")),
                    }
                    i += 1;
                }
            }
            "--workers" => {
                if let Some(n) = args.get(i + 1) {
                    match n.parse::<usize>() {
                        Ok(n) if n > 0 => options.workers = Some(n),
                        _ => options.ignored.push(format!("--workers {n}")),
                    }
                    i += 1;
                }
            }
            "--save" => match args.get(i + 1).filter(|path| !path.starts_with('-')) {
                Some(path) => {
                    options.save = Some(SaveTarget::Path(PathBuf::from(path)));
                    i += 1;
                }
                None => options.save = Some(SaveTarget::Default),
            },
            "--sequential" => options.sequential = true,
            "--rotate" => options.policy = DerangePolicy::Rotate,
            "--online" => options.backend = BackendChoice::Online,
            "--offline" => options.backend = BackendChoice::Offline,
            other => options.ignored.push(other.to_string()),
        }
        i += 1;
    }

    options
}
