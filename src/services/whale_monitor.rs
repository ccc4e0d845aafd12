use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use sqlx::PgPool;
use tokio::time::sleep;

use crate::analysis::{classify_transfers, WhaleThresholds};
use crate::config::AppConfig;
use crate::db::whale_repo;
use crate::exchanges::PriceMap;
use crate::explorer::EtherscanClient;
use crate::models::{WhaleCheckReport, WhaleWallet};
use crate::services::notifier::{format_whale_alert, Notifier};
use crate::services::premium_service::PremiumService;

/// Checks tracked wallets for new large transfers.
///
/// Flow per wallet:
/// 1. Fetch recent native and token transfers from the explorer
/// 2. Keep transfers above the USD / quantity thresholds
/// 3. Insert each into `whale_alerts`; a hash already recorded is skipped
/// 4. Notify only for rows actually inserted
#[derive(Debug, Clone)]
pub struct WhaleMonitor {
    explorer: EtherscanClient,
    premium: PremiumService,
    pool: PgPool,
    notifier: Option<Arc<Notifier>>,
    thresholds: WhaleThresholds,
    lookback: u32,
    request_delay: Duration,
}

impl WhaleMonitor {
    pub fn new(
        explorer: EtherscanClient,
        premium: PremiumService,
        pool: PgPool,
        notifier: Option<Arc<Notifier>>,
        config: &AppConfig,
    ) -> Self {
        Self {
            explorer,
            premium,
            pool,
            notifier,
            thresholds: WhaleThresholds {
                min_usd: config.whale_min_usd,
                min_token_qty: config.whale_min_token_qty,
            },
            lookback: config.whale_tx_lookback,
            request_delay: Duration::from_millis(config.whale_request_delay_ms),
        }
    }

    /// Run one pass over every active wallet. Per-wallet failures are counted, not fatal.
    pub async fn check_all(&self) -> anyhow::Result<WhaleCheckReport> {
        let wallets = whale_repo::get_active_wallets(&self.pool).await?;
        let mut report = WhaleCheckReport::default();

        if wallets.is_empty() {
            return Ok(report);
        }

        let prices = match self.premium.usd_prices().await {
            Ok(p) => p,
            Err(e) => {
                tracing::warn!(error = %e, "Whale check: USD prices unavailable, only quantity thresholds apply");
                PriceMap::new()
            }
        };

        for (i, wallet) in wallets.iter().enumerate() {
            if i > 0 {
                sleep(self.request_delay).await;
            }

            report.wallets_checked += 1;
            match self.check_wallet(wallet, &prices).await {
                Ok((new_alerts, notified)) => {
                    report.new_alerts += new_alerts;
                    report.notified += notified;
                }
                Err(e) => {
                    report.errors += 1;
                    tracing::warn!(
                        error = %e,
                        address = %wallet.address,
                        "Whale check failed for wallet"
                    );
                }
            }
        }

        tracing::info!(
            wallets = report.wallets_checked,
            new_alerts = report.new_alerts,
            notified = report.notified,
            errors = report.errors,
            "Whale check cycle complete"
        );

        Ok(report)
    }

    /// Returns `(new alerts recorded, notifications sent)` for one wallet.
    async fn check_wallet(&self, wallet: &WhaleWallet, prices: &PriceMap) -> anyhow::Result<(usize, usize)> {
        let native = self.explorer.native_transfers(&wallet.address, self.lookback).await?;
        sleep(self.request_delay).await;
        let tokens = self.explorer.token_transfers(&wallet.address, self.lookback).await?;

        let transfers = classify_transfers(&wallet.address, &native, &tokens, prices, self.thresholds);

        let mut new_alerts = 0;
        let mut notified = 0;
        for transfer in &transfers {
            let Some(alert) = whale_repo::insert_alert_if_new(&self.pool, wallet.id, transfer).await? else {
                continue;
            };
            new_alerts += 1;
            counter!("whale_alerts_total").increment(1);

            tracing::info!(
                address = %wallet.address,
                tx_hash = %alert.tx_hash,
                direction = %transfer.direction,
                token = %transfer.token,
                amount = %transfer.amount,
                "Whale transfer detected"
            );

            if let Some(n) = &self.notifier {
                if n.send(&format_whale_alert(wallet, transfer)).await {
                    notified += 1;
                }
            }
        }

        Ok((new_alerts, notified))
    }
}
