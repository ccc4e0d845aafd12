use chrono::Utc;
use rust_decimal::Decimal;

use crate::exchanges::{ForeignVenue, FxRate, PriceMap};
use crate::models::{PremiumRecord, PremiumSnapshot};

/// Symbols pegged to USD. Never reported as premium records; `USDT` is the
/// baseline for the pure premium.
pub const STABLECOINS: &[&str] = &[
    "USDT", "USDC", "DAI", "TUSD", "BUSD", "FDUSD", "USDE", "USDS", "PYUSD", "USD1",
];

const BASELINE_STABLECOIN: &str = "USDT";

/// Decimal places kept on reported percentages.
const PCT_DP: u32 = 4;

pub fn is_stablecoin(symbol: &str) -> bool {
    STABLECOINS.contains(&symbol)
}

/// Trading fees (percent) deducted for the net premium.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FeeSchedule {
    pub domestic_pct: Decimal,
    pub foreign_pct: Decimal,
}

impl FeeSchedule {
    pub fn total(&self) -> Decimal {
        self.domestic_pct + self.foreign_pct
    }
}

/// `(domestic_krw / fx - foreign_usd) / foreign_usd * 100`.
///
/// A non-positive input yields 0 rather than an error.
pub fn spread_pct(domestic_krw: Decimal, fx: Decimal, foreign_usd: Decimal) -> Decimal {
    if !is_priced(domestic_krw, fx, foreign_usd) {
        return Decimal::ZERO;
    }
    let domestic_usd = domestic_krw / fx;
    (domestic_usd - foreign_usd) / foreign_usd * Decimal::ONE_HUNDRED
}

fn is_priced(domestic_krw: Decimal, fx: Decimal, foreign_usd: Decimal) -> bool {
    domestic_krw > Decimal::ZERO && fx > Decimal::ZERO && foreign_usd > Decimal::ZERO
}

/// Premium of the baseline stablecoin against its 1 USD peg (0 if not listed).
pub fn stable_premium(domestic: &PriceMap, fx: Decimal) -> Decimal {
    domestic
        .get(BASELINE_STABLECOIN)
        .map(|krw| spread_pct(*krw, fx, Decimal::ONE))
        .unwrap_or(Decimal::ZERO)
}

/// Compute premium records for every non-stablecoin symbol listed in both maps.
///
/// An unpriced record reports 0 for all three premiums and is left out of the average.
/// Records are sorted by symbol so identical inputs always produce identical output.
pub fn compute_premiums(
    domestic: &PriceMap,
    foreign: &PriceMap,
    fx: FxRate,
    fees: FeeSchedule,
    venue: ForeignVenue,
) -> PremiumSnapshot {
    let baseline = stable_premium(domestic, fx.rate);

    let mut records: Vec<PremiumRecord> = domestic
        .iter()
        .filter(|(symbol, _)| !is_stablecoin(symbol))
        .filter_map(|(symbol, krw)| {
            let foreign_usd = *foreign.get(symbol)?;
            let priced = is_priced(*krw, fx.rate, foreign_usd);
            let premium = spread_pct(*krw, fx.rate, foreign_usd);
            let (net, pure) = if priced {
                (premium - fees.total(), premium - baseline)
            } else {
                (Decimal::ZERO, Decimal::ZERO)
            };
            let domestic_usd = if fx.rate > Decimal::ZERO {
                *krw / fx.rate
            } else {
                Decimal::ZERO
            };

            Some(PremiumRecord {
                symbol: symbol.clone(),
                korean_name: None,
                domestic_krw: *krw,
                domestic_usd,
                foreign_usd,
                premium: premium.round_dp(PCT_DP),
                net_premium: net.round_dp(PCT_DP),
                pure_premium: pure.round_dp(PCT_DP),
                volume_krw_24h: None,
            })
        })
        .collect();

    records.sort_by(|a, b| a.symbol.cmp(&b.symbol));

    let priced: Vec<Decimal> = records
        .iter()
        .filter(|r| is_priced(r.domestic_krw, fx.rate, r.foreign_usd))
        .map(|r| r.premium)
        .collect();
    let average_premium = if priced.is_empty() {
        Decimal::ZERO
    } else {
        let sum: Decimal = priced.iter().sum();
        (sum / Decimal::from(priced.len() as i64)).round_dp(PCT_DP)
    };

    PremiumSnapshot {
        venue,
        fx_rate: fx.rate,
        fx_fallback: fx.fallback,
        stable_premium: baseline.round_dp(PCT_DP),
        average_premium,
        records,
        computed_at: Utc::now(),
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    fn prices(entries: &[(&str, i64)]) -> PriceMap {
        entries
            .iter()
            .map(|(s, p)| (s.to_string(), Decimal::from(*p)))
            .collect()
    }

    fn live(rate: i64) -> FxRate {
        FxRate {
            rate: Decimal::from(rate),
            fallback: false,
        }
    }

    fn no_fees() -> FeeSchedule {
        FeeSchedule {
            domestic_pct: Decimal::ZERO,
            foreign_pct: Decimal::ZERO,
        }
    }

    #[test]
    fn test_pinned_fixture() {
        // 100,000 KRW / 1000 = 100 USD vs 105 USD abroad
        let domestic = prices(&[("BTC", 100_000)]);
        let foreign = prices(&[("BTC", 105)]);
        let snap = compute_premiums(&domestic, &foreign, live(1000), no_fees(), ForeignVenue::Binance);

        assert_eq!(snap.records.len(), 1);
        assert_eq!(snap.records[0].premium, Decimal::new(-47619, 4));
        assert_eq!(snap.records[0].domestic_usd, Decimal::from(100));
    }

    #[test]
    fn test_positive_premium() {
        // 105,000 KRW / 1000 = 105 USD vs 100 USD -> +5%
        assert_eq!(
            spread_pct(Decimal::from(105_000), Decimal::from(1000), Decimal::from(100)),
            Decimal::from(5)
        );
    }

    #[test]
    fn test_zero_or_missing_price_yields_zero() {
        assert_eq!(spread_pct(Decimal::ZERO, Decimal::from(1000), Decimal::from(100)), Decimal::ZERO);
        assert_eq!(spread_pct(Decimal::from(1000), Decimal::ZERO, Decimal::from(100)), Decimal::ZERO);
        assert_eq!(spread_pct(Decimal::from(1000), Decimal::from(1000), Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_unpriced_coin_reports_zero_and_skips_average() {
        // USDT at 1,040 KRW gives a 4% baseline; BTC has no domestic price
        let domestic = prices(&[("USDT", 1_040), ("BTC", 0), ("ETH", 105_000)]);
        let foreign = prices(&[("BTC", 100), ("ETH", 100)]);
        let fees = FeeSchedule {
            domestic_pct: Decimal::new(5, 2),
            foreign_pct: Decimal::new(1, 1),
        };
        let snap = compute_premiums(&domestic, &foreign, live(1000), fees, ForeignVenue::Binance);

        let btc = snap.record("BTC").unwrap();
        assert_eq!(btc.premium, Decimal::ZERO);
        assert_eq!(btc.net_premium, Decimal::ZERO);
        assert_eq!(btc.pure_premium, Decimal::ZERO);
        assert_eq!(snap.average_premium, Decimal::from(5));

        let hits = crate::analysis::threshold::select_abs(
            &snap.records,
            crate::analysis::threshold::PremiumMetric::Pure,
            Decimal::from(3),
        );
        assert!(hits.iter().all(|r| r.symbol != "BTC"));
    }

    #[test]
    fn test_symbols_missing_on_one_side_are_excluded() {
        let domestic = prices(&[("BTC", 105_000), ("ONLYKR", 1_000)]);
        let foreign = prices(&[("BTC", 100), ("ONLYUS", 1)]);
        let snap = compute_premiums(&domestic, &foreign, live(1000), no_fees(), ForeignVenue::Binance);

        let symbols: Vec<&str> = snap.records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC"]);
    }

    #[test]
    fn test_stablecoins_always_excluded() {
        let domestic = prices(&[("USDT", 1_020), ("USDC", 1_010), ("ETH", 3_000_000)]);
        let foreign = prices(&[("USDT", 1), ("USDC", 1), ("ETH", 3_000)]);
        let snap = compute_premiums(&domestic, &foreign, live(1000), no_fees(), ForeignVenue::Binance);

        assert!(snap.records.iter().all(|r| !is_stablecoin(&r.symbol)));
        assert_eq!(snap.records.len(), 1);
    }

    #[test]
    fn test_pure_premium_subtracts_stablecoin_premium() {
        // USDT trades at 1,020 KRW with FX 1000 -> +2% baseline
        let domestic = prices(&[("USDT", 1_020), ("BTC", 105_000)]);
        let foreign = prices(&[("BTC", 100)]);
        let snap = compute_premiums(&domestic, &foreign, live(1000), no_fees(), ForeignVenue::Binance);

        assert_eq!(snap.stable_premium, Decimal::from(2));
        let btc = snap.record("BTC").unwrap();
        assert_eq!(btc.premium, Decimal::from(5));
        assert_eq!(btc.pure_premium, Decimal::from(3));
    }

    #[test]
    fn test_pure_equals_premium_without_baseline() {
        let domestic = prices(&[("BTC", 105_000)]);
        let foreign = prices(&[("BTC", 100)]);
        let snap = compute_premiums(&domestic, &foreign, live(1000), no_fees(), ForeignVenue::Binance);
        let btc = snap.record("BTC").unwrap();
        assert_eq!(btc.pure_premium, btc.premium);
    }

    #[test]
    fn test_net_premium_subtracts_both_fees() {
        let domestic = prices(&[("BTC", 105_000)]);
        let foreign = prices(&[("BTC", 100)]);
        let fees = FeeSchedule {
            domestic_pct: Decimal::new(5, 2),
            foreign_pct: Decimal::new(1, 1),
        };
        let snap = compute_premiums(&domestic, &foreign, live(1000), fees, ForeignVenue::Binance);
        // 5 - 0.05 - 0.1
        assert_eq!(snap.record("BTC").unwrap().net_premium, Decimal::new(485, 2));
    }

    #[test]
    fn test_deterministic_for_same_inputs() {
        let domestic = prices(&[("BTC", 95_000_000), ("ETH", 4_700_000), ("XRP", 3_100), ("USDT", 1_395)]);
        let foreign = prices(&[("BTC", 67_000), ("ETH", 3_350), ("XRP", 2)]);
        let fees = FeeSchedule {
            domestic_pct: Decimal::new(5, 2),
            foreign_pct: Decimal::new(1, 1),
        };

        let a = compute_premiums(&domestic, &foreign, live(1380), fees, ForeignVenue::Binance);
        let b = compute_premiums(&domestic, &foreign, live(1380), fees, ForeignVenue::Binance);

        assert_eq!(a.records, b.records);
        assert_eq!(a.average_premium, b.average_premium);
        let symbols: Vec<&str> = a.records.iter().map(|r| r.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["BTC", "ETH", "XRP"]);
    }

    #[test]
    fn test_fallback_flag_is_carried() {
        let fx = FxRate {
            rate: Decimal::from(1400),
            fallback: true,
        };
        let snap = compute_premiums(&PriceMap::new(), &PriceMap::new(), fx, no_fees(), ForeignVenue::Hyperliquid);
        assert!(snap.fx_fallback);
        assert!(snap.records.is_empty());
        assert_eq!(snap.average_premium, Decimal::ZERO);
    }
}
