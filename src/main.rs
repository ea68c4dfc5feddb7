use clap::Parser;
use encode::cli::{image_reference, Cli, Command};
use encode::config::Config;
use encode::report;
use encode::scan::HistoryEntry;
use encode::server;
use encode::session::ScanSession;
use encode::store::{sqlite, HistoryStore, MemoryStore, SqliteStore};
use tracing::{debug, warn};
use tracing_subscriber::EnvFilter;

type Session = ScanSession<Box<dyn HistoryStore>>;

fn init_logging(verbose: bool, serving: bool) {
    let level = if verbose {
        "debug"
    } else if serving {
        "info"
    } else {
        "warn"
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("encode={level},tower_http={level}")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

// storage problems never stop a scan, the session just runs without persistence
fn open_store(config: &Config) -> Box<dyn HistoryStore> {
    if config.ephemeral {
        return Box::new(MemoryStore::new());
    }

    let data_dir = match config.data_dir.clone() {
        Some(dir) => Ok(dir),
        None => sqlite::default_data_dir(),
    };

    match data_dir.and_then(|dir| SqliteStore::open_in(&dir)) {
        Ok(store) => Box::new(store),
        Err(e) => {
            warn!("History storage unavailable, not persisting: {e}");
            Box::new(MemoryStore::new())
        }
    }
}

fn open_session(config: &Config) -> Session {
    ScanSession::new(open_store(config), config.session)
}

async fn await_result(session: &Session) -> Result<HistoryEntry, Box<dyn std::error::Error>> {
    session
        .wait_for_result()
        .await
        .ok_or_else(|| "scan session ended without a result".into())
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(&cli.global)?;

    match cli.command {
        Command::Scan(args) => {
            let session = open_session(&config);
            session.start_camera_scan();

            eprintln!("Scanning...");
            let entry = await_result(&session).await?;
            report::print_result(&entry, args.json)?;
        }
        Command::Upload(args) => {
            let session = open_session(&config);
            let image = image_reference(&args.path);

            if !session.start_upload(image) {
                warn!("No image at {}, nothing to analyze", args.path.display());
                eprintln!("No image found at {}", args.path.display());
                return Ok(());
            }

            eprintln!("Uploading...");
            let entry = await_result(&session).await?;
            report::print_result(&entry, args.json)?;
        }
        Command::Demo(args) => {
            let session = open_session(&config);
            let mut entries = Vec::new();

            for n in 1..=args.cycles {
                debug!(cycle = n, "Starting demo scan");
                session.start_camera_scan();
                let entry = await_result(&session).await?;

                if !args.json {
                    print!("{}", report::table::render_result(&entry));
                }
                entries.push(entry);
                session.reset();
            }

            if args.json {
                println!("{}", report::json::render_history(&entries)?);
            }
        }
        Command::History(args) => {
            let session = open_session(&config);
            let entries: Vec<HistoryEntry> = session
                .history()
                .into_iter()
                .filter(|e| args.risk.map_or(true, |risk| e.result.risk_level == risk))
                .collect();

            report::print_history(&entries, args.json)?;
        }
        Command::Clear => {
            let session = open_session(&config);
            session.clear_history();
            println!("History cleared.");
        }
        Command::Serve(args) => {
            let bind = args.bind.unwrap_or(config.bind);
            server::run(bind).await?;
        }
    }

    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose, matches!(cli.command, Command::Serve(_)));

    if let Err(e) = run(cli).await {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
