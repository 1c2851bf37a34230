use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, bail};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use futures::StreamExt;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use pitboard::stream::ThrottleExt;
use pitboard::view::render::{
    render_feed_state, render_leaderboard, render_schedule, render_summary,
};
use pitboard::{
    ClientConfig, FeedState, GapSource, LiveConnection, Pitboard, ScheduleView, SessionView,
    UpdateRate,
};

/// Upper bound on waiting for the last snapshot once the feed has closed
const DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Args {
    /// YAML client configuration
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Debug logging (RUST_LOG takes precedence)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch one session and print its standings
    Session {
        id: String,

        #[arg(long, value_enum, default_value_t = GapArg::BestLap)]
        gap: GapArg,
    },
    /// Follow a running session
    Live {
        id: String,

        /// Maximum redraws per second
        #[arg(long)]
        rate: Option<u32>,

        /// Poll every SECS seconds instead of subscribing
        #[arg(long, value_name = "SECS")]
        poll: Option<u64>,
    },
    /// Print a championship's race schedule
    Schedule {
        championship: String,

        /// Retry a failed request this many times
        #[arg(long, default_value_t = 0)]
        retries: u32,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum GapArg {
    BestLap,
    Interval,
}

impl From<GapArg> for GapSource {
    fn from(value: GapArg) -> Self {
        match value {
            GapArg::BestLap => GapSource::BestLapDelta,
            GapArg::Interval => GapSource::Interval,
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "pitboard=debug" } else { "pitboard=info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).init();
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<ClientConfig> {
    match path {
        Some(path) => ClientConfig::from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => ClientConfig::default()
            .with_env_overrides()
            .context("Invalid endpoint in environment"),
    }
}

async fn session(config: &ClientConfig, id: &str, gap: GapSource) -> anyhow::Result<()> {
    let view = Pitboard::session(config, id, gap)
        .await
        .with_context(|| format!("Error loading session {}", id))?;
    print_session(&view);
    Ok(())
}

fn print_session(view: &SessionView) {
    print!("{}", render_summary(&view.summary));
    println!();
    print!("{}", render_leaderboard(&view.leaderboard));
}

async fn live(
    config: &ClientConfig,
    id: &str,
    rate: UpdateRate,
    poll: Option<u64>,
) -> anyhow::Result<()> {
    let connection: LiveConnection = match poll {
        Some(secs) => Pitboard::poll(config, id, Duration::from_secs(secs.max(1)))?,
        None => Pitboard::subscribe(config, id),
    };

    let mut sessions = match rate.throttle_interval() {
        Some(interval) => connection.snapshots().throttle(interval).boxed(),
        None => connection.snapshots().boxed(),
    };
    let mut states = Box::pin(connection.state_updates());

    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, closing feed");
                break;
            }
            Some(state) = states.next() => {
                eprintln!("{}", render_feed_state(&state));
                if let FeedState::Failed(message) = &state {
                    connection.close().await;
                    bail!("Live feed failed: {}", message);
                }
                if state.is_terminal() {
                    // Snapshots can still be queued behind the state change
                    while let Ok(Some(snapshot)) =
                        tokio::time::timeout(DRAIN_TIMEOUT, sessions.next()).await
                    {
                        print_session(&SessionView::build(&snapshot, GapSource::Interval));
                        println!();
                    }
                    break;
                }
            }
            Some(snapshot) = sessions.next() => {
                print_session(&SessionView::build(&snapshot, GapSource::Interval));
                println!();
            }
            else => break,
        }
    }

    connection.close().await;
    Ok(())
}

async fn schedule(config: &ClientConfig, championship: &str, retries: u32) -> anyhow::Result<()> {
    let mut controller = Pitboard::schedule(config, championship)?;
    controller.load().await;

    let mut attempt = 0;
    while matches!(controller.view(Utc::now()), ScheduleView::Failed { .. }) && attempt < retries {
        attempt += 1;
        warn!(attempt, retries, "Schedule request failed, retrying");
        tokio::time::sleep(config.reconnect.delay_for(attempt).unwrap_or(Duration::from_secs(1)))
            .await;
        controller.retry().await;
    }

    let view = controller.view(Utc::now());
    print!("{}", render_schedule(&view));
    if let ScheduleView::Failed { message } = view {
        bail!("Error loading schedule: {}", message);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    init_tracing(args.verbose);
    let config = load_config(args.config.as_ref())?;

    match args.command {
        Commands::Session { id, gap } => session(&config, &id, gap.into()).await,
        Commands::Live { id, rate, poll } => {
            live(&config, &id, UpdateRate::from_hz(rate), poll).await
        }
        Commands::Schedule { championship, retries } => {
            schedule(&config, &championship, retries).await
        }
    }
}
