use auction_watch::config::Config;
use auction_watch::dashboard;
use auction_watch::engine::Scheduler;
use auction_watch::onchain::AlloyReader;
use std::ops::ControlFlow;
use std::path::Path;
use tracing::{error, info, warn};

const CONFIG_PATH: &str = "auction-watch.toml";

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Load config
    let from_file = Path::new(CONFIG_PATH).exists();
    let config = if from_file {
        Config::load(Path::new(CONFIG_PATH))?
    } else {
        Config::from_env()?
    };

    // Initialize logging (stderr, so the dashboard owns stdout)
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.logging.level));

    if config.logging.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .init();
    }

    info!("auction-watch v{} starting", env!("CARGO_PKG_VERSION"));
    if !from_file {
        info!("no {} found, using env-only config", CONFIG_PATH);
    }
    info!(
        strategy = %config.chain.strategy_address,
        token = %config.chain.token_address,
        interval_ms = config.poll.interval_ms,
        targets = ?config.poll.targets_eth,
        "configuration loaded"
    );
    if let Some(e) = config.preview_amount_error() {
        warn!(error = %e, "TOKEN_AMOUNT cannot be valued; the preview line will show the error");
    }

    let reader = AlloyReader::connect(
        &config.chain.rpc_url,
        config.chain.strategy_address,
        config.chain.token_address,
    )
    .await?;

    let mut scheduler = Scheduler::new(reader, config.cycle_settings(), config.interval());
    let symbol = config.display.token_symbol.clone();
    let json = config.display.json;

    scheduler
        .run(|outcome| {
            // Failures are already logged by the scheduler; keep the last
            // frame on screen and try again next tick.
            if let Ok(snapshot) = outcome {
                if json {
                    match dashboard::render_json(snapshot) {
                        Ok(line) => println!("{line}"),
                        Err(e) => error!(error = %e, "failed to serialize snapshot"),
                    }
                } else {
                    print!("{}{}", dashboard::CLEAR_SCREEN, dashboard::render(snapshot, &symbol));
                }
            }
            ControlFlow::Continue(())
        })
        .await;

    Ok(())
}
