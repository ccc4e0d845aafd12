use rust_decimal::Decimal;
use std::env;
use std::str::FromStr;

use crate::exchanges::ForeignVenue;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub database_url: String,
    pub host: String,
    pub port: u16,

    /// Bearer secret required on cron-triggered routes. `None` disables the check (dev mode).
    pub cron_secret: Option<String>,

    // Telegram
    pub telegram_bot_token: Option<String>,
    pub telegram_chat_id: Option<String>,

    // Premium computation
    pub foreign_venue: ForeignVenue,
    pub fx_fallback_rate: Decimal,
    pub upbit_fee_pct: Decimal,
    pub binance_fee_pct: Decimal,
    pub hyperliquid_fee_pct: Decimal,

    // Alert thresholds (percent)
    pub alert_high_pct: Decimal,
    pub alert_low_pct: Decimal,
    pub spike_delta_pct: Decimal,
    pub watch_symbols: Vec<String>,
    pub watch_threshold_pct: Decimal,
    pub alert_window_minutes: i64,

    // Whale monitoring
    pub etherscan_api_key: Option<String>,
    pub whale_min_usd: Decimal,
    pub whale_min_token_qty: Decimal,
    pub whale_request_delay_ms: u64,
    pub whale_tx_lookback: u32,

    // In-process scheduler
    pub scheduler_enabled: bool,
    pub premium_poll_interval_secs: u64,
    pub whale_poll_interval_secs: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_url: String::new(),
            host: "0.0.0.0".into(),
            port: 8080,
            cron_secret: None,
            telegram_bot_token: None,
            telegram_chat_id: None,
            foreign_venue: ForeignVenue::Binance,
            fx_fallback_rate: Decimal::from(1400),
            upbit_fee_pct: Decimal::new(5, 2),
            binance_fee_pct: Decimal::new(1, 1),
            hyperliquid_fee_pct: Decimal::new(45, 3),
            alert_high_pct: Decimal::from(5),
            alert_low_pct: Decimal::from(-1),
            spike_delta_pct: Decimal::from(2),
            watch_symbols: vec!["BTC".into(), "ETH".into(), "XRP".into(), "SOL".into()],
            watch_threshold_pct: Decimal::from(3),
            alert_window_minutes: 120,
            etherscan_api_key: None,
            whale_min_usd: Decimal::from(100_000),
            whale_min_token_qty: Decimal::from(1_000_000),
            whale_request_delay_ms: 250,
            whale_tx_lookback: 20,
            scheduler_enabled: false,
            premium_poll_interval_secs: 60,
            whale_poll_interval_secs: 300,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let d = Self::default();

        let foreign_venue = match env::var("FOREIGN_VENUE") {
            Ok(v) => v
                .parse::<ForeignVenue>()
                .map_err(|e| anyhow::anyhow!("FOREIGN_VENUE: {e}"))?,
            Err(_) => d.foreign_venue,
        };

        let watch_symbols = env::var("WATCH_SYMBOLS")
            .map(|raw| parse_symbol_list(&raw))
            .unwrap_or(d.watch_symbols);

        Ok(Self {
            database_url: env::var("DATABASE_URL")
                .map_err(|_| anyhow::anyhow!("DATABASE_URL must be set"))?,
            host: env::var("HOST").unwrap_or(d.host),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".into())
                .parse()?,
            cron_secret: non_empty_var("CRON_SECRET"),

            telegram_bot_token: non_empty_var("TELEGRAM_BOT_TOKEN"),
            telegram_chat_id: non_empty_var("TELEGRAM_CHAT_ID"),

            foreign_venue,
            fx_fallback_rate: var_or("FX_FALLBACK_RATE", d.fx_fallback_rate),
            upbit_fee_pct: var_or("UPBIT_FEE_PCT", d.upbit_fee_pct),
            binance_fee_pct: var_or("BINANCE_FEE_PCT", d.binance_fee_pct),
            hyperliquid_fee_pct: var_or("HYPERLIQUID_FEE_PCT", d.hyperliquid_fee_pct),

            alert_high_pct: var_or("ALERT_HIGH_PCT", d.alert_high_pct),
            alert_low_pct: var_or("ALERT_LOW_PCT", d.alert_low_pct),
            spike_delta_pct: var_or("SPIKE_DELTA_PCT", d.spike_delta_pct),
            watch_symbols,
            watch_threshold_pct: var_or("WATCH_THRESHOLD_PCT", d.watch_threshold_pct),
            alert_window_minutes: var_or("ALERT_WINDOW_MINUTES", d.alert_window_minutes),

            etherscan_api_key: non_empty_var("ETHERSCAN_API_KEY"),
            whale_min_usd: var_or("WHALE_MIN_USD", d.whale_min_usd),
            whale_min_token_qty: var_or("WHALE_MIN_TOKEN_QTY", d.whale_min_token_qty),
            whale_request_delay_ms: var_or("WHALE_REQUEST_DELAY_MS", d.whale_request_delay_ms),
            whale_tx_lookback: var_or("WHALE_TX_LOOKBACK", d.whale_tx_lookback),

            scheduler_enabled: var_or("SCHEDULER_ENABLED", d.scheduler_enabled),
            premium_poll_interval_secs: var_or(
                "PREMIUM_POLL_INTERVAL_SECS",
                d.premium_poll_interval_secs,
            ),
            whale_poll_interval_secs: var_or("WHALE_POLL_INTERVAL_SECS", d.whale_poll_interval_secs),
        })
    }

    /// Returns true if both Telegram credentials are configured.
    pub fn has_telegram(&self) -> bool {
        self.telegram_bot_token.is_some() && self.telegram_chat_id.is_some()
    }

    pub fn alert_window(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.alert_window_minutes)
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Parse an env var, keeping the default when it is unset or malformed.
fn var_or<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

/// `"btc, eth,,xrp"` -> `["BTC", "ETH", "XRP"]`
pub fn parse_symbol_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(|s| s.trim().to_uppercase())
        .filter(|s| !s.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_symbol_list() {
        assert_eq!(parse_symbol_list("btc, eth,,xrp "), vec!["BTC", "ETH", "XRP"]);
        assert!(parse_symbol_list("").is_empty());
    }

    #[test]
    fn test_default_alert_window_is_two_hours() {
        assert_eq!(AppConfig::default().alert_window(), chrono::Duration::hours(2));
    }
}
