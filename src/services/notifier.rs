use rust_decimal::Decimal;
use serde_json::json;

use crate::analysis::PremiumMetric;
use crate::models::{PremiumRecord, PremiumSnapshot, PremiumSpike, WhaleTransfer, WhaleWallet};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// Telegram has a hard 4096-character limit per message.
const MAX_LINES: usize = 20;

/// Telegram notification service. Failures are logged but never block the main flow.
#[derive(Debug, Clone)]
pub struct Notifier {
    http: reqwest::Client,
    api_base: String,
    bot_token: String,
    chat_id: String,
}

impl Notifier {
    pub fn new(bot_token: String, chat_id: String) -> Self {
        Self::with_api_base(reqwest::Client::new(), TELEGRAM_API_BASE, bot_token, chat_id)
    }

    pub fn with_api_base(
        http: reqwest::Client,
        api_base: impl Into<String>,
        bot_token: String,
        chat_id: String,
    ) -> Self {
        Self {
            http,
            api_base: api_base.into(),
            bot_token,
            chat_id,
        }
    }

    /// Send a Telegram message. Returns whether Telegram accepted it.
    pub async fn send(&self, message: &str) -> bool {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.bot_token);

        let body = json!({
            "chat_id": self.chat_id,
            "text": message,
            "parse_mode": "Markdown",
            "disable_web_page_preview": true,
        });

        match self.http.post(&url).json(&body).send().await {
            Ok(resp) => {
                if resp.status().is_success() {
                    true
                } else {
                    tracing::warn!(
                        status = %resp.status(),
                        "Telegram sendMessage returned non-2xx"
                    );
                    false
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to send Telegram notification");
                false
            }
        }
    }
}

fn signed(v: Decimal) -> String {
    let v = v.round_dp(2).normalize();
    if v > Decimal::ZERO {
        format!("+{v}%")
    } else {
        format!("{v}%")
    }
}

fn coin_label(r: &PremiumRecord) -> String {
    match &r.korean_name {
        Some(name) => format!("{} ({})", r.symbol, name),
        None => r.symbol.clone(),
    }
}

fn footer(snapshot: &PremiumSnapshot) -> String {
    let fx_note = if snapshot.fx_fallback { " (기본값)" } else { "" };
    format!(
        "환율: {}원{}\nUSDT 김프: {}\n거래소: Upbit / {}",
        snapshot.fx_rate.round_dp(2),
        fx_note,
        signed(snapshot.stable_premium),
        snapshot.venue,
    )
}

/// Threshold alert listing every matched coin.
pub fn format_threshold_alert(
    title: &str,
    matches: &[PremiumRecord],
    metric: PremiumMetric,
    high: Decimal,
    low: Decimal,
    snapshot: &PremiumSnapshot,
) -> String {
    let mut lines = vec![
        format!("🚨 *{title}*"),
        format!("기준: {} 이상 / {} 이하", signed(high), signed(low)),
        String::new(),
    ];

    for r in matches.iter().take(MAX_LINES) {
        let icon = if metric.value(r) >= Decimal::ZERO { "🔴" } else { "🔵" };
        lines.push(format!(
            "{icon} {} 김프 {} (순김프 {}, 순수 {})",
            coin_label(r),
            signed(r.premium),
            signed(r.net_premium),
            signed(r.pure_premium),
        ));
    }
    if matches.len() > MAX_LINES {
        lines.push(format!("…외 {}개", matches.len() - MAX_LINES));
    }

    lines.push(String::new());
    lines.push(footer(snapshot));
    lines.join("\n")
}

/// Spike alert for coins whose premium moved sharply.
pub fn format_spike_alert(spikes: &[PremiumSpike], snapshot: &PremiumSnapshot) -> String {
    let mut lines = vec!["⚡ *김프 급변 알림*".to_string(), String::new()];

    for s in spikes.iter().take(MAX_LINES) {
        let arrow = if s.delta >= Decimal::ZERO { "📈" } else { "📉" };
        lines.push(format!(
            "{arrow} {} {} → {} ({}p)",
            coin_label(&s.record),
            signed(s.previous_premium),
            signed(s.record.premium),
            signed(s.delta).trim_end_matches('%'),
        ));
    }
    if spikes.len() > MAX_LINES {
        lines.push(format!("…외 {}개", spikes.len() - MAX_LINES));
    }

    lines.push(String::new());
    lines.push(footer(snapshot));
    lines.join("\n")
}

/// Report for watch-list coins over the watch threshold.
pub fn format_watch_alert(matches: &[PremiumRecord], threshold: Decimal, snapshot: &PremiumSnapshot) -> String {
    let mut lines = vec![
        "👀 *관심 코인 김프 알림*".to_string(),
        format!("기준: 순수 김프 ±{}%", threshold.round_dp(2)),
        String::new(),
    ];

    for r in matches {
        lines.push(format!(
            "• {} 김프 {} / 순수 {}",
            coin_label(r),
            signed(r.premium),
            signed(r.pure_premium),
        ));
    }

    lines.push(String::new());
    lines.push(footer(snapshot));
    lines.join("\n")
}

/// Whale transfer notification.
pub fn format_whale_alert(wallet: &WhaleWallet, transfer: &WhaleTransfer) -> String {
    let label = wallet
        .label
        .clone()
        .unwrap_or_else(|| short_address(&wallet.address));
    let (icon, verb) = match transfer.direction {
        crate::models::Direction::In => ("🟢", "입금"),
        crate::models::Direction::Out => ("🔴", "출금"),
    };
    let usd = transfer
        .usd_value
        .map(|v| format!(" (${})", v.round_dp(0)))
        .unwrap_or_default();

    format!(
        "🐋 *고래 {verb} 감지*\n{icon} {label}\n수량: {} {}{usd}\n상대: `{}`\n[Etherscan](https://etherscan.io/tx/{})",
        transfer.amount.round_dp(4),
        transfer.token,
        short_address(&transfer.counterparty),
        transfer.tx_hash,
    )
}

fn short_address(address: &str) -> String {
    if address.len() > 10 {
        format!("{}...{}", &address[..6], &address[address.len() - 4..])
    } else {
        address.to_string()
    }
}
