use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use scorebook_engine::vocabulary::Side;
use scorebook_runtime::config::SessionConfig;
use scorebook_runtime::error::RuntimeResult;
use scorebook_runtime::report;
use scorebook_runtime::session::Session;

#[derive(Parser, Debug)]
#[command(author, version, about = "Inspect persisted scorebook sessions", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    #[command(flatten)]
    session: SessionConfig,

    /// JSON file with session settings; replaces the flags above.
    #[arg(global = true, long)]
    config: Option<PathBuf>,

    #[arg(global = true, short, long, default_value_t = false)]
    verbose: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rebuild a session from its command log and print the game state.
    Replay { session_id: String },
    /// Print batting and pitching tables for a session.
    BoxScore {
        session_id: String,
        /// Also print both scoresheet grids.
        #[arg(long, default_value_t = false)]
        sheet: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> RuntimeResult<()> {
    let config = match &cli.config {
        Some(path) => {
            info!(path = %path.display(), "loading session config");
            SessionConfig::load_from_file(path)?
        }
        None => cli.session.clone(),
    };

    match cli.command {
        Commands::Replay { session_id } => {
            let mut session = Session::open(&config, &session_id)?;
            let hash = session.replay_full()?;
            let state = session.state();
            println!("session   {}", session.session_id());
            println!("game      {}", state.game_id);
            println!("commands  {}", session.current_sequence());
            println!(
                "inning    {} {}, {} out",
                state.current_half, state.current_inning, state.outs
            );
            println!("phase     {:?}", state.phase);
            println!("score     away {} - home {}", state.away_score, state.home_score);
            println!("hash      {hash}");
        }
        Commands::BoxScore { session_id, sheet } => {
            let session = Session::open(&config, &session_id)?;
            let engine = session.engine();
            print!("{}", report::render_box_score(engine.box_score()));
            if sheet {
                for side in [Side::Away, Side::Home] {
                    println!("\n{side} scoresheet");
                    println!("{}", report::score_sheet_table(&engine.score_sheet(side)));
                }
            }
        }
    }
    Ok(())
}
