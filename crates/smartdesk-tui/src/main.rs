use anyhow::Result;
use clap::{Parser, Subcommand};
use smartdesk_core::{check_health, Config, DeskClient, Scenario};
use tracing::{info, warn};

mod app;
mod handler;
mod line;
mod logging;
mod tui;
mod ui;

use app::App;
use tui::EventHandler;

#[derive(Parser)]
#[command(name = "smartdesk")]
#[command(version, about = "Chat with the SmartDesk service desk assistant")]
struct Cli {
    /// Backend base URL (overrides SMARTDESK_API_URL and the config file)
    #[arg(long, global = true)]
    base_url: Option<String>,

    /// User id sent with every message
    #[arg(short, long, global = true)]
    user_id: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Full-screen chat with a live activity log (default)
    Tui,
    /// Line-by-line chat on stdin/stdout
    Chat {
        /// Send one of the demo prompts first
        #[arg(short, long, value_parser = parse_scenario)]
        scenario: Option<Scenario>,
    },
    /// Check backend health and exit
    Health,
}

fn parse_scenario(s: &str) -> Result<Scenario, String> {
    Scenario::from_str(s).ok_or_else(|| {
        let names: Vec<&str> = Scenario::all().iter().map(|s| s.as_str()).collect();
        format!("unknown scenario '{}' (expected one of: {})", s, names.join(", "))
    })
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let command = cli.command.unwrap_or(Commands::Tui);

    match &command {
        Commands::Tui => {
            // Logging is best effort; the TUI still runs without a log file
            if let Err(e) = logging::init_file_logging() {
                eprintln!("Warning: file logging disabled: {:#}", e);
            }
        }
        _ => logging::init_stderr_logging(),
    }

    let config = Config::load().unwrap_or_else(|e| {
        warn!(error = %e, "could not load config, using defaults");
        Config::default()
    });
    let base_url = config.resolve_base_url(cli.base_url.as_deref());
    let client = DeskClient::from_config(&base_url, &config)?;
    let user_id = cli.user_id.or_else(|| config.user_id.clone());

    match command {
        Commands::Tui => run_tui(client, user_id).await,
        Commands::Chat { scenario } => line::run(client, user_id, scenario).await,
        Commands::Health => {
            let status = check_health(&client).await;
            println!("{}: {}", client.base_url(), status.label());
            if !status.is_connected() {
                std::process::exit(1);
            }
            Ok(())
        }
    }
}

async fn run_tui(client: DeskClient, user_id: Option<String>) -> Result<()> {
    info!(base_url = client.base_url(), "starting smartdesk tui");

    tui::install_panic_hook();
    let mut terminal = tui::init()?;
    let mut events = EventHandler::new();
    let mut app = App::new(client, user_id);
    app.start_health_check();

    let result = async {
        loop {
            terminal.draw(|frame| ui::render(&mut app, frame))?;

            if app.should_quit {
                break;
            }

            match events.next().await {
                Some(event) => handler::handle_event(&mut app, event).await?,
                None => break,
            }
        }
        Ok::<(), anyhow::Error>(())
    }
    .await;

    tui::restore()?;
    result
}
