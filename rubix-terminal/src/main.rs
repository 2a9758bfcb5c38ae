/// Rubix Terminal - Interactive 3x3x3 cube
///
/// Controls:
///   - U D L R F B (M E S): Turn a layer, Shift reverses
///   - Tab: Toggle the default turn direction
///   - Arrow Keys: Rotate the view
///   - Mouse: Drag across a face to turn
///   - Space: Scramble, Esc: Cancel queued turns, Q: Quit
use clap::Parser;
use log::{info, LevelFilter};
use rubix_core::{SimConfig, Simulation};
use rubix_terminal::TerminalApp;
use std::fs::{self, File};
use std::io;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "rubix-terminal", version, about = "Interactive 3x3x3 cube in the terminal")]
struct Args {
    /// TOML file with simulation settings
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Duration of one quarter turn in milliseconds
    #[arg(long, value_name = "MS")]
    turn_ms: Option<f64>,

    /// Start from a scramble of N random moves
    #[arg(long, value_name = "N")]
    scramble: Option<usize>,

    /// Seed for scramble generation
    #[arg(long)]
    seed: Option<u64>,

    /// Write log output to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn init_logging(log_file: Option<&PathBuf>) -> io::Result<()> {
    // The alternate screen owns the terminal, so logs only go to a file
    let Some(path) = log_file else {
        return Ok(());
    };
    let file = File::create(path)?;
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .parse_default_env()
        .target(env_logger::Target::Pipe(Box::new(file)))
        .init();
    Ok(())
}

fn load_config(args: &Args) -> io::Result<SimConfig> {
    let mut config = match &args.config {
        Some(path) => {
            let text = fs::read_to_string(path)?;
            toml::from_str(&text).map_err(|err| io::Error::new(io::ErrorKind::InvalidData, err))?
        }
        None => SimConfig::default(),
    };
    if let Some(turn_ms) = args.turn_ms {
        config.turn_duration_ms = turn_ms;
    }
    if let Some(length) = args.scramble {
        config.scramble_length = length;
    }
    Ok(config)
}

fn invalid_input(err: rubix_core::Error) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidInput, err)
}

fn main() -> io::Result<()> {
    let args = Args::parse();
    init_logging(args.log_file.as_ref())?;

    let config = load_config(&args)?;
    let seed = args.seed.unwrap_or_else(rand::random);
    info!("starting with seed {seed}");

    let mut simulation = Simulation::new(&config, seed, 80, 24).map_err(invalid_input)?;
    if args.scramble.is_some() {
        simulation.scramble().map_err(invalid_input)?;
    }

    let mut app = TerminalApp::new(simulation)?;
    app.run()?;

    println!("Thank you for using Rubix Terminal!");
    Ok(())
}
