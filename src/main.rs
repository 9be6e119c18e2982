use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use dotenvy::dotenv;
use tracing::info;
use tracing_subscriber::EnvFilter;

use feed_recovery::client::FeedClient;
use feed_recovery::output::write_json_file;
use feed_recovery::store::RecordStore;
use feed_recovery::transport::TcpConnector;

#[derive(Debug, Parser)]
#[command(version, about = "Stream a market-data feed, recover missing sequences, write JSON")]
struct Args {
    /// Feed server host
    #[arg(long, env = "FEED_HOST", default_value = "127.0.0.1")]
    host: String,

    /// Feed server port
    #[arg(long, env = "FEED_PORT", default_value_t = 3000)]
    port: u16,

    /// Idle timeout in seconds for connect, send and every receive
    #[arg(long, env = "FEED_TIMEOUT_SECS", default_value_t = 5, value_parser = clap::value_parser!(u64).range(1..))]
    timeout_secs: u64,

    /// Output file path (.json)
    #[arg(long, env = "OUT_FILE", default_value = "output.json")]
    out: PathBuf,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("feed_recovery=info"));
    tracing_subscriber::fmt().with_env_filter(filter).with_target(false).init();
}

fn main() -> Result<()> {
    // Load environment variables from .env if present
    let _ = dotenv();
    let args = Args::parse();
    init_tracing();

    let timeout = Duration::from_secs(args.timeout_secs);
    let connector = TcpConnector::resolve(&args.host, args.port, timeout)
        .with_context(|| format!("resolve {}:{}", args.host, args.port))?;
    info!(host = %args.host, port = args.port, timeout_secs = args.timeout_secs, "starting feed recovery");

    let client = FeedClient::new(connector);
    let mut store = RecordStore::new();
    let report = client.run(&mut store).context("initial feed stream")?;

    write_json_file(&store, &args.out).with_context(|| format!("write output {:?}", args.out))?;
    info!(
        path = %args.out.display(),
        records = store.len(),
        recovered = report.recovery.recovered,
        still_missing = report.recovery.abandoned.len(),
        "output written"
    );
    Ok(())
}
