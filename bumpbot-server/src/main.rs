use clap::Parser;
use tokio::sync::watch;
use tracing::{error, info};
use tracing_subscriber::{fmt, EnvFilter};

use bumpbot_core::config::BumpConfig;
use bumpbot_core::platforms::discord::DiscordPlatform;
use bumpbot_core::platforms::PlatformIntegration;
use bumpbot_core::tasks::bump::run_bump_loop;

#[derive(Parser, Debug, Clone)]
#[command(name = "bumpbot")]
#[command(author, version, about = "BumpBot - scheduled Discord bump sender")]
struct Args {
    /// Path to the JSON configuration file
    #[arg(long, default_value = "config.json")]
    config: String,
}

fn init_tracing() {
    let filter = EnvFilter::from_default_env()
        .add_directive("bumpbot_core=info".parse().unwrap_or_default())
        .add_directive("bumpbot_server=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(sub)
        .expect("Failed to set global subscriber");
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();
    let args = Args::parse();

    // Configuration problems are the only fatal error.
    let config = match BumpConfig::load(&args.config) {
        Ok(cfg) => cfg,
        Err(e) => {
            error!("Failed to load configuration from '{}': {e}", args.config);
            return Err(e.into());
        }
    };

    let targets = config.targets();
    let settings = config.settings();
    info!(
        "BumpBot starting. targets={}, command='{}', inter_target_delay={:?}, cycle_delay={:?}",
        targets.len(),
        settings.command,
        settings.inter_target_delay,
        settings.cycle_delay
    );

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tokio::spawn(async move {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to listen for Ctrl-C: {:?}", e);
        }
        info!("Ctrl-C detected; shutting down...");
        let _ = shutdown_tx.send(true);
    });

    run_bump_loop(targets, settings, shutdown_rx, |target| {
        Box::new(DiscordPlatform::new(target.token.clone())) as Box<dyn PlatformIntegration + Send>
    })
    .await?;

    info!("BumpBot stopped.");
    Ok(())
}
