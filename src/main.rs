use std::sync::Arc;
use std::time::Duration;

use kimpwatch::api::router::create_router;
use kimpwatch::config::AppConfig;
use kimpwatch::explorer::EtherscanClient;
use kimpwatch::services::notifier::Notifier;
use kimpwatch::services::premium_service::PremiumService;
use kimpwatch::services::scheduler;
use kimpwatch::services::whale_monitor::WhaleMonitor;
use kimpwatch::{db, metrics, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_tracing();

    let config = AppConfig::from_env()?;
    let addr = format!("{}:{}", config.host, config.port);

    tracing::info!("Connecting to database...");
    let db = db::init_pool(&config.database_url).await?;
    db::migrate(&db).await?;
    tracing::info!("Database connected, migrations applied");

    let metrics_handle = metrics::init_metrics()?;

    let http = reqwest::Client::builder()
        .timeout(Duration::from_secs(10))
        .build()?;

    // --- Notifications ---
    let notifier = match (&config.telegram_bot_token, &config.telegram_chat_id) {
        (Some(token), Some(chat_id)) => {
            tracing::info!("Telegram notifier enabled");
            Some(Arc::new(Notifier::new(token.clone(), chat_id.clone())))
        }
        _ => {
            tracing::warn!("TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID not set, alerts will not be sent");
            None
        }
    };

    let premium = PremiumService::new(http.clone(), &config);

    // --- Whale monitoring ---
    let whale_monitor = match &config.etherscan_api_key {
        Some(key) => Some(WhaleMonitor::new(
            EtherscanClient::new(http.clone(), key.clone()),
            premium.clone(),
            db.clone(),
            notifier.clone(),
            &config,
        )),
        None => {
            tracing::warn!("ETHERSCAN_API_KEY not set, whale monitoring disabled");
            None
        }
    };

    let state = AppState {
        db,
        config,
        metrics_handle,
        notifier,
        premium,
        whale_monitor,
    };

    // --- In-process scheduler (alternative to an external cron) ---
    if state.config.scheduler_enabled {
        let premium_state = state.clone();
        let secs = state.config.premium_poll_interval_secs;
        tokio::spawn(async move {
            scheduler::run_premium_scheduler(premium_state, secs).await;
        });

        if let Some(monitor) = state.whale_monitor.clone() {
            let secs = state.config.whale_poll_interval_secs;
            tokio::spawn(async move {
                scheduler::run_whale_scheduler(monitor, secs).await;
            });
        }
    } else {
        tracing::info!("Scheduler disabled (SCHEDULER_ENABLED=false), relying on cron routes");
    }

    tracing::info!(
        venue = %state.config.foreign_venue,
        cron_protected = state.config.cron_secret.is_some(),
        "kimpwatch starting"
    );

    let router = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Server listening on {addr}");
    axum::serve(listener, router).await?;

    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(fmt::layer())
        .init();
}
