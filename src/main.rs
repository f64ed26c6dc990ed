use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Parser;
use serde_json::json;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use groupwatch::data::duration::parse_duration;
use groupwatch::{LiveData, LiveMonitorSession, MonitorError, SessionEvent, Settings, StartOptions, TcpConnector};

#[derive(Parser, Debug)]
#[command(name = "groupwatch")]
#[command(about = "Live consumer-group lag, fairness and stuck-partition monitor")]
struct Args {
    /// Snapshot feed endpoint (host:port)
    #[arg(short, long)]
    connect: String,

    /// Cluster identifier
    #[arg(long)]
    cluster: String,

    /// Consumer group identifier
    #[arg(short, long)]
    group: String,

    /// Backend emission interval in seconds
    #[arg(short, long, default_value = "10")]
    interval: u32,

    /// Settings file (TOML); GROUPWATCH_* environment variables override it
    #[arg(long)]
    config: Option<PathBuf>,

    /// Give up on the first lost connection instead of reconnecting
    #[arg(long)]
    no_reconnect: bool,

    /// Base reconnect delay (e.g., "500ms", "1s")
    #[arg(long)]
    base_delay: Option<String>,

    /// Maximum reconnect delay (e.g., "30s")
    #[arg(long)]
    max_delay: Option<String>,

    /// Reconnect attempts before giving up
    #[arg(long)]
    max_attempts: Option<u32>,

    /// Print each metrics update as a JSON line
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("groupwatch=info")))
        .with_writer(std::io::stderr)
        .init();

    let settings = load_settings(&args)?;
    let options = StartOptions::new(&args.cluster, &args.group)
        .poll_interval(args.interval)
        .auto_reconnect(!args.no_reconnect);

    let rt = tokio::runtime::Runtime::new()?;
    rt.block_on(run(&args, settings, options))
}

/// Settings file and environment, then command-line overrides
fn load_settings(args: &Args) -> Result<Settings> {
    let mut settings = Settings::load(args.config.as_deref())?;

    if let Some(ref delay) = args.base_delay {
        settings.connection.base_delay_ms = as_millis(delay).context("invalid --base-delay")?;
    }
    if let Some(ref delay) = args.max_delay {
        settings.connection.cap_delay_ms = as_millis(delay).context("invalid --max-delay")?;
    }
    if let Some(attempts) = args.max_attempts {
        settings.connection.max_attempts = attempts;
    }

    Ok(settings)
}

fn as_millis(s: &str) -> Result<u64> {
    Ok(u64::try_from(parse_duration(s)?.as_millis())?)
}

async fn run(args: &Args, settings: Settings, options: StartOptions) -> Result<()> {
    let connector = Arc::new(TcpConnector::new(&args.connect));
    let mut session = LiveMonitorSession::new(connector, settings);

    let (failed_tx, mut failed_rx) = mpsc::unbounded_channel::<MonitorError>();
    let json_output = args.json;
    session.subscribe(move |event| match event {
        SessionEvent::Snapshot(live) if json_output => println!("{}", json_line(live)),
        SessionEvent::Snapshot(live) => println!("{}", summary_line(live)),
        SessionEvent::Error(err) if err.is_terminal() => {
            let _ = failed_tx.send(err.clone());
        }
        _ => {}
    });

    let handle = session.start(options)?;
    println!("Watching {} via {}...", handle.target(), args.connect);

    let outcome = tokio::select! {
        result = tokio::signal::ctrl_c() => result.map_err(anyhow::Error::from),
        Some(err) = failed_rx.recv() => Err(err.into()),
    };

    session.stop().await;

    let events = handle.recent_events_newest_first();
    if !events.is_empty() {
        eprintln!("Recent events (newest first):");
        for event in events {
            eprintln!("  {}", event);
        }
    }

    if let Err(err) = outcome {
        bail!("{}", err);
    }
    Ok(())
}

fn summary_line(live: &LiveData) -> String {
    let m = &live.metrics;
    let mut line = format!(
        "[{}] {} {} lag total={} p50={} p95={} max={} fairness={:.3} stuck={}",
        live.snapshot.timestamp_ms,
        live.health.symbol(),
        live.snapshot.state,
        m.total_lag,
        m.p50_lag,
        m.p95_lag,
        m.max_lag,
        m.fairness_gini,
        m.stuck_count(),
    );
    if let Some(top) = m.topics.first() {
        line.push_str(&format!(" top={}({})", top.topic, top.total_lag));
    }
    if m.has_lag_spike {
        line.push_str(" SPIKE");
    }
    line
}

fn json_line(live: &LiveData) -> String {
    json!({
        "timestamp_ms": live.snapshot.timestamp_ms,
        "cluster_id": live.snapshot.cluster_id,
        "group_id": live.snapshot.group_id,
        "state": live.snapshot.state,
        "health": live.health.symbol(),
        "metrics": live.metrics,
    })
    .to_string()
}
