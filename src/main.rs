// VidSlice - Segment-looping media controller
// Pick a slice of a media item and let it ride. The engine here is the
// simulated one; a real player slots in behind the same trait.

use anyhow::Result;
use clap::Parser;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;
use vidslice::media::{LibrarySource, MediaSource};
use vidslice::ui::{self, Command};
use vidslice::{Config, ControlError, LoopController, SimEngine};

#[derive(Parser)]
#[command(name = "vidslice")]
#[command(about = "Loop a slice of a media item from the local library")]
struct Args {
    /// Extra media directories to scan, on top of the configured ones
    #[arg(long)]
    media_dir: Vec<PathBuf>,

    /// Override the position poll interval in milliseconds
    #[arg(long)]
    poll_ms: Option<u64>,

    /// Enable developer logging (stderr + debug output)
    #[arg(long)]
    dev: bool,
}

fn init_logging(dev: bool) -> Result<()> {
    // Create logs directory in project root
    let log_dir = PathBuf::from("logs");
    std::fs::create_dir_all(&log_dir)?;

    // Daily rotating file appender
    let file_appender = tracing_appender::rolling::daily(&log_dir, "vidslice.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Base filter: info level for general logs, debug for vidslice
    let base_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,vidslice=debug"));

    let subscriber = tracing_subscriber::fmt()
        .with_writer(file_writer)
        .with_target(true)
        .with_level(true)
        .with_ansi(false)
        .with_env_filter(base_filter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    if dev {
        eprintln!("dev mode: debug logging to logs/vidslice.log");
    }

    // Keep the appender alive for the life of the process
    std::mem::forget(guard);

    Ok(())
}

/// The sim engine has no decoder to ask, so guess a length from the file
/// size at a rough streaming bitrate.
fn simulated_duration(path: &Path) -> f64 {
    let bytes = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    (bytes as f64 / 250_000.0).max(10.0)
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.dev)?;
    info!("vidslice starting up");

    // Load config - falls back to defaults if missing
    let mut config = Config::load()?;
    config.media_directories.extend(args.media_dir);
    if let Some(poll_ms) = args.poll_ms {
        config.looper.poll_interval_ms = poll_ms;
    }

    let library = LibrarySource::scan(&config.media_directories)?;
    println!("vidslice - segment looper");
    println!(
        "{} media item(s) in the library, type 'help' for commands",
        library.len()
    );

    // Engine events come back over a channel, drained after each tick
    let (engine_tx, mut engine_rx) = mpsc::unbounded_channel();
    let mut engine = SimEngine::new();
    engine.set_event_sender(engine_tx);
    for (id, path) in library.entries() {
        engine.add_media(id.clone(), simulated_duration(path));
    }

    let mut controller = LoopController::new(engine);
    controller.set_restart_on_end(config.looper.restart_on_end);

    // Blocking stdin reader on its own thread, lines arrive over a channel
    let (line_tx, mut line_rx) = mpsc::unbounded_channel::<String>();
    std::thread::spawn(move || {
        let stdin = std::io::stdin();
        let mut buf = String::new();
        loop {
            buf.clear();
            if stdin.read_line(&mut buf).unwrap_or(0) == 0 {
                break;
            }
            if line_tx.send(buf.trim().to_string()).is_err() {
                break;
            }
        }
    });

    let poll = Duration::from_millis(config.looper.poll_interval_ms.max(10));
    let dt = poll.as_secs_f64();
    let mut ticker = tokio::time::interval(poll);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                controller.engine_mut().tick(dt);
                while let Ok(event) = engine_rx.try_recv() {
                    controller.on_engine_event(event);
                }
            }
            line = line_rx.recv() => {
                let Some(line) = line else { break };
                if line.is_empty() {
                    continue;
                }
                match ui::parse_command(&line) {
                    Ok(Command::Quit) => break,
                    Ok(command) => {
                        let ok = run_command(&mut controller, &library, command);
                        if ok && config.ui.show_timestamps {
                            println!("{}", status_line(&controller));
                        }
                    }
                    Err(message) => println!("{message}"),
                }
            }
        }
    }

    info!("vidslice shutting down");
    Ok(())
}

/// Run one parsed command against the controller, reporting the outcome on
/// stdout. Returns whether the command succeeded.
fn run_command(
    controller: &mut LoopController<SimEngine>,
    library: &LibrarySource,
    command: Command,
) -> bool {
    let result = match command {
        Command::Load(target) => load_media(controller, library, &target),
        Command::SetRegion { start, end } => controller.set_region(start, end),
        Command::ToggleLoop => controller.toggle_loop(),
        Command::TogglePlayPause => controller.toggle_play_pause(),
        Command::Seek(position) => controller.seek(position),
        Command::Status => {
            println!("{}", status_line(controller));
            return true;
        }
        Command::Help => {
            println!("{}", ui::HELP);
            return true;
        }
        // Quit is handled by the main loop
        Command::Quit => return true,
    };

    match result {
        Ok(()) => true,
        Err(error) => {
            println!("error: {error}");
            false
        }
    }
}

fn load_media(
    controller: &mut LoopController<SimEngine>,
    library: &LibrarySource,
    target: &str,
) -> Result<(), ControlError> {
    let handle = library.fetch(target).map_err(|e| match e {
        vidslice::media::FetchError::InvalidUrl(_) => ControlError::InvalidMediaId,
        other => ControlError::FetchFailed(other.to_string()),
    })?;

    controller.load(&handle.id)?;
    println!("loaded '{}'", handle.id);
    Ok(())
}

fn status_line(controller: &LoopController<SimEngine>) -> String {
    let state = controller.state();
    let marker = if state.is_playing { ">" } else { "#" };
    let region = match controller.region() {
        Some(r) => format!(
            "{}-{}",
            ui::format_time(r.start_seconds),
            ui::format_time(r.end_seconds)
        ),
        None => "unset".to_string(),
    };
    let loop_flag = if state.looping { "on" } else { "off" };

    format!(
        "[{marker}] {} / {}  region {region}  loop {loop_flag}",
        ui::format_time(state.position_seconds),
        ui::format_duration(controller.duration()),
    )
}
