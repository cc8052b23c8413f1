use number_guesser::cli::{CliInterface, parse_cli};
use number_guesser::logging::{LogTarget, init_logging};
use number_guesser::session::{RandomPicker, TargetPicker};
use number_guesser::store::{
    FileStore, KeyValueStore, MemoryStore, get_app_data_dir, get_default_store_path,
};
use number_guesser::tui::TuiInterface;
use number_guesser::{GameController, game_loop};
use std::io;
use std::process::ExitCode;

const LOG_FILE: &str = "game.log";

fn main() -> ExitCode {
    let cli = parse_cli();

    let log_path = get_app_data_dir().map(|dir| dir.join(LOG_FILE));
    let log_target = match (&log_path, cli.plain) {
        (Some(path), _) => LogTarget::File(path),
        (None, true) => LogTarget::Stderr,
        (None, false) => LogTarget::Off,
    };
    if let Err(e) = init_logging(log_target) {
        eprintln!("Failed to set up logging: {e}");
    }

    let store_path = cli.store_path.clone().or_else(get_default_store_path);
    let store: Box<dyn KeyValueStore> = match store_path {
        Some(path) => {
            log::info!("Using best-score store at {}", path.display());
            Box::new(FileStore::new(path))
        }
        None => {
            log::warn!("No data directory available; best score will not be saved");
            Box::new(MemoryStore::new())
        }
    };
    let picker: Box<dyn TargetPicker> = match cli.seed {
        Some(seed) => Box::new(RandomPicker::seeded(seed)),
        None => Box::new(RandomPicker::from_entropy()),
    };

    let mut controller = GameController::new(store, picker, cli.mode, cli.timed);

    if cli.plain {
        let stdin = io::stdin();
        let mut interface = CliInterface::new(stdin.lock());
        game_loop(&mut controller, &mut interface);
        return ExitCode::SUCCESS;
    }

    match TuiInterface::new() {
        Ok(mut interface) => {
            game_loop(&mut controller, &mut interface);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("Failed to start the terminal interface: {e}");
            eprintln!("Try --plain for the line-based interface.");
            ExitCode::FAILURE
        }
    }
}
