//! Drawing telephone in the terminal.
//!
//! Players write a prompt, draw someone else's prompt, guess someone
//! else's drawing, and so on for a number of rounds. Automated players
//! fill the table up to three.
//!
//! ```bash
//! cargo run -p telephone -- --human Alice --ai 2 --rounds 3 --save game.json
//! ```

mod args;
mod console;
mod input;
mod sketch;

use args::{parse_args, BackendChoice, CliOptions, SaveTarget};
use std::io;
use std::path::Path;
use std::sync::Arc;
use telephone_core::backend::{
    CannedText, ClaudeText, DrawingGenerator, PollinationsDrawing, SketchDrawing, TextGenerator,
};
use telephone_core::persist::save_path;
use telephone_core::{
    AutomatedConfig, AutomatedParticipant, Game, GameConfig, HumanInput, InteractiveParticipant,
    Participant, RosterBuilder, Scheduling,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use input::ConsoleInput;

/// Where `--save` without a path writes.
const DEFAULT_SAVES_DIR: &str = "saves";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    let args: Vec<String> = std::env::args().collect();
    let options = parse_args(&args);

    if options.help {
        print_help();
        return Ok(());
    }

    init_logging();
    for ignored in &options.ignored {
        warn!(option = %ignored, "ignoring unrecognized option");
    }

    let config = game_config(&options);
    let automated = AutomatedConfig::from_env();
    let (text, drawing) = backends(options.backend, &automated, &config.drawings_dir);

    let (human, ai) = match ask_players(&options) {
        Ok(answers) => answers,
        Err(e) => exit_on_closed_input(e),
    };

    let make_bot = |name: String| {
        Arc::new(
            AutomatedParticipant::new(name, text.clone(), drawing.clone())
                .with_time_limit(automated.time_limit),
        ) as Arc<dyn Participant>
    };
    let mut builder = RosterBuilder::new(make_bot);
    if let Some(name) = human {
        let input: Arc<dyn HumanInput> = Arc::new(ConsoleInput::new(&config.drawings_dir));
        builder = builder.with_participant(Arc::new(InteractiveParticipant::new(name, input)));
    }
    builder = builder.with_bots(ai);

    let added = builder.fill_to_minimum();
    if !added.is_empty() {
        println!(
            "The game requires at least 3 players. Adding {} AI player(s): {}",
            added.len(),
            added.join(", ")
        );
    }
    let roster = builder.build()?;
    println!("\nPlayers:\n{roster}");

    let rounds = match options.rounds {
        Some(rounds) => rounds,
        None => console::ask_positive(
            &mut io::stdin().lock(),
            &mut io::stdout(),
            "Enter the number of rounds: ",
        )
        .unwrap_or_else(|e| exit_on_closed_input(e)),
    };

    info!(rounds, players = roster.len(), "starting game");
    let game = Game::new(roster, config).play(rounds).await?;

    println!("\n=== Game History ===\n");
    for record in game.history() {
        println!("{record}");
    }

    println!("=== Chains ===\n");
    for chain in game.chains()? {
        println!("{chain}");
    }

    if let Some(target) = &options.save {
        let path = match target {
            SaveTarget::Path(path) => path.clone(),
            SaveTarget::Default => save_path(DEFAULT_SAVES_DIR),
        };
        game.save(&path).await?;
        println!("Game saved to {}", path.display());
    }

    Ok(())
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("telephone=info,telephone_core=info"));

    // Prompts go to stdout, logs to stderr.
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn exit_on_closed_input(e: io::Error) -> ! {
    eprintln!("Error: no more input ({e}), exiting.");
    std::process::exit(1);
}

/// Ask who plays, skipping questions answered on the command line.
fn ask_players(options: &CliOptions) -> io::Result<(Option<String>, usize)> {
    let stdin = io::stdin();
    let mut input = stdin.lock();
    let mut output = io::stdout();

    let human = match &options.human {
        Some(name) => Some(name.clone()),
        None => {
            let question = "Do you want to add a human player? (yes/no): ";
            if console::ask_yes_no(&mut input, &mut output, question)? {
                let question = "Enter the human player's name: ";
                Some(console::ask_name(&mut input, &mut output, question)?)
            } else {
                None
            }
        }
    };

    let ai = match options.ai {
        Some(n) => n,
        None => console::ask_count(&mut input, &mut output, "Enter the number of AI players: ")?,
    };

    Ok((human, ai))
}

fn game_config(options: &CliOptions) -> GameConfig {
    let mut config = GameConfig::from_env().with_derange_policy(options.policy);
    if options.sequential {
        config = config.with_scheduling(Scheduling::Sequential);
    } else if let Some(max_workers) = options.workers {
        config = config.with_scheduling(Scheduling::Concurrent { max_workers });
    }
    config
}

/// Pick the generation backends for automated players.
///
/// Falls back to the offline backends when the online ones cannot be
/// set up.
fn backends(
    choice: BackendChoice,
    automated: &AutomatedConfig,
    dir: &Path,
) -> (Arc<dyn TextGenerator>, Arc<dyn DrawingGenerator>) {
    if choice != BackendChoice::Offline {
        let online = ClaudeText::from_env().and_then(|text| {
            let text = text
                .with_model(&automated.model)
                .with_max_tokens(automated.max_tokens);
            Ok((text, PollinationsDrawing::new(dir)?))
        });

        match online {
            Ok((text, drawing)) => {
                info!(model = %automated.model, "using online backends");
                return (Arc::new(text), Arc::new(drawing));
            }
            Err(e) if choice == BackendChoice::Online => {
                eprintln!("Online backends unavailable ({e}); AI players will play offline.");
            }
            Err(e) => info!(reason = %e, "online backends unavailable"),
        }
    }

    info!(dir = %dir.display(), "using offline backends");
    (Arc::new(CannedText), Arc::new(SketchDrawing::new(dir)))
}

fn print_help() {
    println!("Telephone - draw, guess, repeat");
    println!();
    println!("USAGE:");
    println!("  telephone [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("  -h, --help          Show this help message");
    println!("  --human <NAME>      Add a human player (skips the question)");
    println!("  --ai <N>            Number of AI players");
    println!("  --rounds <N>        Number of rounds");
    println!("  --save [PATH]       Save the game as JSON (default: a file in saves/)");
    println!("  --sequential        Draw one player at a time");
    println!("  --workers <N>       Drawings produced at once (default: 4)");
    println!("  --rotate            Hand work to the next player instead of shuffling");
    println!("  --online            Use Claude and Pollinations for AI players");
    println!("  --offline           Use built-in prompts and text sketches for AI players");
    println!();
    println!("ENVIRONMENT:");
    println!("  ANTHROPIC_API_KEY       API key for online AI players");
    println!("  TELEPHONE_MODEL         Claude model to use");
    println!("  TELEPHONE_DRAWINGS_DIR  Where drawings are written (default: assets/drawings)");
    println!("  RUST_LOG                Log filter (default: telephone=info,telephone_core=info)");
    println!();
    println!("DRAWING:");
    println!("  Drag with the mouse, or move with the arrow keys and paint with space.");
    println!("  Press c to clear, Enter or Esc to hand in the drawing.");
    println!();
    println!("EXAMPLES:");
    println!("  telephone                                  # Answer the setup questions");
    println!("  telephone --ai 4 --rounds 2 --offline      # Watch four AI players");
    println!("  telephone --human Alice --ai 2 --rounds 3 --save game.json");
}
