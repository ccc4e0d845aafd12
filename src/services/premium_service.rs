use std::time::Instant;

use metrics::{counter, gauge, histogram};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

use crate::analysis::{compute_premiums, FeeSchedule};
use crate::config::AppConfig;
use crate::exchanges::{
    BinanceClient, ExchangeError, ForeignVenue, FxClient, HyperliquidClient, PriceMap, UpbitClient,
};
use crate::models::PremiumSnapshot;

/// Fee and fallback settings the pipeline needs from `AppConfig`.
#[derive(Debug, Clone)]
pub struct PremiumSettings {
    pub fx_fallback_rate: Decimal,
    pub upbit_fee_pct: Decimal,
    pub binance_fee_pct: Decimal,
    pub hyperliquid_fee_pct: Decimal,
}

impl From<&AppConfig> for PremiumSettings {
    fn from(c: &AppConfig) -> Self {
        Self {
            fx_fallback_rate: c.fx_fallback_rate,
            upbit_fee_pct: c.upbit_fee_pct,
            binance_fee_pct: c.binance_fee_pct,
            hyperliquid_fee_pct: c.hyperliquid_fee_pct,
        }
    }
}

impl PremiumSettings {
    pub fn fees(&self, venue: ForeignVenue) -> FeeSchedule {
        let foreign_pct = match venue {
            ForeignVenue::Binance => self.binance_fee_pct,
            ForeignVenue::Hyperliquid => self.hyperliquid_fee_pct,
        };
        FeeSchedule {
            domestic_pct: self.upbit_fee_pct,
            foreign_pct,
        }
    }
}

/// Fetch -> normalize -> compute. The single entry point every alert flow and
/// the data endpoint go through.
#[derive(Debug, Clone)]
pub struct PremiumService {
    upbit: UpbitClient,
    binance: BinanceClient,
    hyperliquid: HyperliquidClient,
    fx: FxClient,
    settings: PremiumSettings,
}

impl PremiumService {
    pub fn new(http: reqwest::Client, config: &AppConfig) -> Self {
        Self::from_clients(
            UpbitClient::new(http.clone()),
            BinanceClient::new(http.clone()),
            HyperliquidClient::new(http.clone()),
            FxClient::new(http),
            PremiumSettings::from(config),
        )
    }

    pub fn from_clients(
        upbit: UpbitClient,
        binance: BinanceClient,
        hyperliquid: HyperliquidClient,
        fx: FxClient,
        settings: PremiumSettings,
    ) -> Self {
        Self {
            upbit,
            binance,
            hyperliquid,
            fx,
            settings,
        }
    }

    /// Compute a full premium snapshot against `venue`.
    ///
    /// Domestic or foreign price failures are errors; an FX failure falls back
    /// to the configured rate and is flagged on the snapshot.
    pub async fn snapshot(&self, venue: ForeignVenue) -> Result<PremiumSnapshot, ExchangeError> {
        let start = Instant::now();

        let (board, foreign, fx) = tokio::join!(
            self.upbit.fetch_krw_board(),
            self.foreign_prices(venue),
            self.fx.usd_krw_or(self.settings.fx_fallback_rate),
        );

        let board = board.inspect_err(|e| {
            counter!("upstream_errors_total", "source" => "upbit").increment(1);
            tracing::error!(error = %e, "Upbit fetch failed");
        })?;
        let foreign = foreign.inspect_err(|e| {
            counter!("upstream_errors_total", "source" => venue.as_str()).increment(1);
            tracing::error!(error = %e, venue = %venue, "Foreign price fetch failed");
        })?;

        let mut snapshot = compute_premiums(
            &board.prices,
            &foreign,
            fx,
            self.settings.fees(venue),
            venue,
        );

        for r in &mut snapshot.records {
            r.korean_name = board.names.get(&r.symbol).cloned();
            r.volume_krw_24h = board.volumes.get(&r.symbol).copied();
        }

        counter!("premium_snapshots_total").increment(1);
        gauge!("kimchi_premium_avg").set(snapshot.average_premium.to_f64().unwrap_or(0.0));
        gauge!("fx_rate_krw").set(snapshot.fx_rate.to_f64().unwrap_or(0.0));
        histogram!("premium_pipeline_seconds").record(start.elapsed().as_secs_f64());

        tracing::info!(
            venue = %venue,
            coins = snapshot.records.len(),
            fx_rate = %snapshot.fx_rate,
            fx_fallback = snapshot.fx_fallback,
            average = %snapshot.average_premium,
            stable = %snapshot.stable_premium,
            "Premium snapshot computed"
        );

        Ok(snapshot)
    }

    /// USD spot prices used to value whale transfers.
    pub async fn usd_prices(&self) -> Result<PriceMap, ExchangeError> {
        self.binance.fetch_usdt_prices().await
    }

    async fn foreign_prices(&self, venue: ForeignVenue) -> Result<PriceMap, ExchangeError> {
        match venue {
            ForeignVenue::Binance => self.binance.fetch_usdt_prices().await,
            ForeignVenue::Hyperliquid => self.hyperliquid.fetch_mids().await,
        }
    }
}
