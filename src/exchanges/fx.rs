use metrics::counter;
use reqwest::Client;
use rust_decimal::Decimal;

use super::types::{FxRate, FxResponse};
use super::ExchangeError;

const FX_API_BASE: &str = "https://open.er-api.com";

#[derive(Debug, Clone)]
pub struct FxClient {
    http: Client,
    base_url: String,
}

impl FxClient {
    pub fn new(http: Client) -> Self {
        Self::with_base_url(http, FX_API_BASE)
    }

    pub fn with_base_url(http: Client, base_url: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
        }
    }

    /// KRW per 1 USD.
    pub async fn fetch_usd_krw(&self) -> Result<Decimal, ExchangeError> {
        let url = format!("{}/v6/latest/USD", self.base_url);
        let resp = self
            .http
            .get(&url)
            .send()
            .await?
            .error_for_status()?;

        let body: FxResponse = resp.json().await?;
        if body.result.as_deref().is_some_and(|r| r != "success") {
            return Err(ExchangeError::Unexpected(format!(
                "FX API result: {}",
                body.result.unwrap_or_default()
            )));
        }

        match body.rates.get("KRW") {
            Some(rate) if *rate > Decimal::ZERO => Ok(*rate),
            _ => Err(ExchangeError::Unexpected("FX response has no KRW rate".into())),
        }
    }

    /// Live rate, or the configured fallback when the API is unavailable.
    pub async fn usd_krw_or(&self, fallback: Decimal) -> FxRate {
        resolve_fx(self.fetch_usd_krw().await, fallback)
    }
}

/// Use the fallback on failure, flagging it so callers can surface a stale rate.
pub fn resolve_fx(result: Result<Decimal, ExchangeError>, fallback: Decimal) -> FxRate {
    match result {
        Ok(rate) => FxRate {
            rate,
            fallback: false,
        },
        Err(e) => {
            tracing::warn!(
                error = %e,
                fallback = %fallback,
                "FX rate fetch failed, using fallback rate"
            );
            counter!("fx_fallback_total").increment(1);
            FxRate {
                rate: fallback,
                fallback: true,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_fx_live() {
        let fx = resolve_fx(Ok(Decimal::from(1385)), Decimal::from(1400));
        assert_eq!(fx.rate, Decimal::from(1385));
        assert!(!fx.fallback);
    }

    #[test]
    fn test_resolve_fx_fallback_is_flagged() {
        let err = ExchangeError::Unexpected("down".into());
        let fx = resolve_fx(Err(err), Decimal::from(1400));
        assert_eq!(fx.rate, Decimal::from(1400));
        assert!(fx.fallback);
    }
}
