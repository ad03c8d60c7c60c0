mod command;
mod render;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use command::{ReplCommand, HELP};
use labelcheck_session::session::{Event, InterpreterContext, Session};
use labelcheck_session::{Config, HttpStore, RecordingLogger, RemoteStore, SqliteRepository};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, Level};

/// Labelcheck: review and relabel annotated dialogue samples
#[derive(Parser, Debug)]
#[command(name = "labelcheck")]
#[command(about = "Review and relabel annotated dialogue samples", long_about = None)]
struct Cli {
    /// Base URL of the sample store
    #[arg(long, global = true, env = "LABELCHECK_STORE_URL")]
    store_url: Option<String>,

    /// Directory holding the local resumption database
    #[arg(long, global = true, env = "LABELCHECK_STATE_DIR")]
    state_dir: Option<PathBuf>,

    /// Log at debug level
    #[arg(long, short, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List dataset files the store can serve
    Files,
    /// Check whether a relabel dataset is available
    Status,
    /// Start an interactive review session
    Review(ReviewArgs),
}

#[derive(Parser, Debug)]
struct ReviewArgs {
    /// Dataset file to open on start
    #[arg(long, conflicts_with = "relabel")]
    file: Option<String>,

    /// Start in relabel mode
    #[arg(long)]
    relabel: bool,
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(url) = &cli.store_url {
        config = config.with_store_url(url)?;
    }
    if let Some(dir) = &cli.state_dir {
        config = config.with_state_dir(dir);
    }
    Ok(config)
}

async fn recording_logger(config: &Config) -> Result<Option<RecordingLogger>> {
    if !config.recording_enabled {
        return Ok(None);
    }
    let logger = RecordingLogger::open(&config.recording_log_path)
        .await
        .context("Failed to start recording logger")?;
    Ok(Some(logger))
}

async fn run_files(store: &HttpStore) -> Result<()> {
    let files = store
        .list_files()
        .await
        .context("Failed to list dataset files")?;
    for file in files {
        println!("{}", file);
    }
    Ok(())
}

async fn run_status(store: &HttpStore) -> Result<()> {
    let available = store
        .relabel_status()
        .await
        .context("Failed to check relabel status")?;
    if available {
        println!("relabel dataset available");
    } else {
        println!("no relabel dataset");
    }
    Ok(())
}

/// Dispatch `event` and print whatever the reviewer should see.
async fn step(session: &mut Session, event: Event) {
    session.dispatch(event).await;
    for notice in session.take_notices() {
        println!("{}", render::notice(&notice));
    }
}

fn print_page(session: &mut Session) {
    let colors = session.role_colors();
    print!("{}", render::page(session.state(), &colors));
}

async fn run_review(config: &Config, store: HttpStore, args: ReviewArgs) -> Result<()> {
    let db_path = config.state_db_path();
    let resume = SqliteRepository::new(&db_path)
        .with_context(|| format!("Failed to open state database {}", db_path.display()))?;
    info!("Using state database {}", db_path.display());

    let mut session = Session::new(InterpreterContext::new(Arc::new(store), Arc::new(resume)));

    step(&mut session, Event::FilesRequested).await;
    step(&mut session, Event::RelabelStatusRequested).await;
    if args.relabel {
        step(&mut session, Event::EnterRelabelRequested).await;
    } else if let Some(file) = args.file {
        step(&mut session, Event::LoadRequested { file }).await;
    } else {
        step(&mut session, Event::RefreshRequested).await;
    }
    print_page(&mut session);
    if session.state().relabel_available && !session.state().workflow.is_active() {
        println!("A relabel dataset is available; type `relabel` to start.");
    }
    println!("Type `help` for commands.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match ReplCommand::parse(&line) {
            Ok(command) => command,
            Err(e) => {
                println!("{}", e);
                continue;
            }
        };

        match &command {
            ReplCommand::Quit => break,
            ReplCommand::Help => println!("{}", HELP),
            ReplCommand::Show => print_page(&mut session),
            ReplCommand::Diff => println!("{}", render::diff(session.state())),
            ReplCommand::Files => {
                if let Some(event) = command.event() {
                    step(&mut session, event).await;
                }
                println!("{}", render::files(session.state()));
            }
            other => {
                let Some(event) = other.event() else {
                    continue;
                };
                let before = session.state().sample_id().map(str::to_string);
                step(&mut session, event).await;
                // Redraw whenever the sample changed; otherwise the status line is enough.
                if session.state().sample_id() != before.as_deref() {
                    print_page(&mut session);
                } else {
                    println!("{}", render::status_line(session.state()));
                }
            }
        }
    }

    Ok(())
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let config = load_config(&cli)?;
    let store = HttpStore::from_config(&config, recording_logger(&config).await?)?;
    info!(
        "labelcheck {} ({}) using store {}",
        labelcheck_core::get_library_version(),
        labelcheck_core::build_profile(),
        config.store_url
    );

    match cli.command {
        Commands::Files => run_files(&store).await,
        Commands::Status => run_status(&store).await,
        Commands::Review(args) => run_review(&config, store, args).await,
    }
}
