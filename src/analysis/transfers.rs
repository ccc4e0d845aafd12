use std::collections::HashSet;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::analysis::premium::is_stablecoin;
use crate::exchanges::PriceMap;
use crate::explorer::{NativeTx, TokenTx};
use crate::models::{Direction, WhaleTransfer};

const ETH_DECIMALS: u32 = 18;

/// Largest mantissa a `Decimal` can hold (2^96 - 1).
const MAX_MANTISSA: u128 = (1u128 << 96) - 1;
const MAX_SCALE: u32 = 28;

/// Ethereum mainnet stablecoin contracts valued 1:1 with USD. Matched by
/// address, since any token can call itself "USDT".
const STABLE_CONTRACTS: &[(&str, &str)] = &[
    ("0xdac17f958d2ee523a2206206994597c13d831ec7", "USDT"),
    ("0xa0b86991c6218b36c1d19d4a2e9eb0ce3606eb48", "USDC"),
    ("0x6b175474e89094c44da98b954eedeac495271d0f", "DAI"),
];

fn is_stable_contract(contract: &str) -> bool {
    STABLE_CONTRACTS
        .iter()
        .any(|(addr, _)| addr.eq_ignore_ascii_case(contract.trim()))
}

#[derive(Debug, Clone, Copy)]
pub struct WhaleThresholds {
    pub min_usd: Decimal,
    /// Applied to tokens with no known USD price.
    pub min_token_qty: Decimal,
}

/// Convert a raw on-chain integer amount into units, e.g. wei -> ETH.
/// Digits beyond `Decimal` precision are truncated.
pub fn scale_units(raw: &str, decimals: u32) -> Option<Decimal> {
    let mut mantissa: u128 = raw.trim().parse().ok()?;
    let mut scale = decimals;

    while (mantissa > MAX_MANTISSA || scale > MAX_SCALE) && scale > 0 {
        mantissa /= 10;
        scale -= 1;
    }
    if mantissa > MAX_MANTISSA {
        return None;
    }

    Decimal::try_from_i128_with_scale(mantissa as i128, scale)
        .ok()
        .map(|d| d.normalize())
}

fn parse_unix(ts: &str) -> Option<DateTime<Utc>> {
    ts.trim()
        .parse::<i64>()
        .ok()
        .and_then(|secs| DateTime::from_timestamp(secs, 0))
}

fn direction_of(wallet: &str, from: &str, to: &str) -> (Direction, String) {
    if from.eq_ignore_ascii_case(wallet) {
        (Direction::Out, to.to_lowercase())
    } else {
        (Direction::In, from.to_lowercase())
    }
}

/// USD value of `amount` of `symbol` at the spot price, if known.
fn usd_value(symbol: &str, amount: Decimal, usd_prices: &PriceMap) -> Option<Decimal> {
    usd_prices.get(symbol).map(|p| (amount * *p).round_dp(2))
}

/// Known stablecoin contracts count 1:1. A token borrowing a stablecoin
/// symbol from any other contract gets no USD value.
fn token_usd_value(tx: &TokenTx, symbol: &str, amount: Decimal, usd_prices: &PriceMap) -> Option<Decimal> {
    if is_stable_contract(&tx.contract_address) {
        return Some(amount);
    }
    if is_stablecoin(symbol) {
        return None;
    }
    usd_value(symbol, amount, usd_prices)
}

/// Select transfers of `wallet` large enough to alert on.
///
/// Failed transactions and zero-value transfers are skipped. A transaction
/// hash appears at most once in the output (native transfers take precedence).
pub fn classify_transfers(
    wallet: &str,
    native: &[NativeTx],
    tokens: &[TokenTx],
    usd_prices: &PriceMap,
    thresholds: WhaleThresholds,
) -> Vec<WhaleTransfer> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut out = Vec::new();

    for tx in native {
        if tx.is_error.as_deref() == Some("1") {
            continue;
        }
        let Some(amount) = scale_units(&tx.value, ETH_DECIMALS) else {
            continue;
        };
        if amount.is_zero() {
            continue;
        }
        let Some(usd) = usd_value("ETH", amount, usd_prices) else {
            continue;
        };
        if usd < thresholds.min_usd {
            continue;
        }
        if !seen.insert(tx.hash.to_lowercase()) {
            continue;
        }

        let (direction, counterparty) = direction_of(wallet, &tx.from, &tx.to);
        out.push(WhaleTransfer {
            tx_hash: tx.hash.to_lowercase(),
            direction,
            token: "ETH".into(),
            amount,
            usd_value: Some(usd),
            counterparty,
            tx_time: parse_unix(&tx.time_stamp),
        });
    }

    for tx in tokens {
        let decimals: u32 = tx.token_decimal.trim().parse().unwrap_or(ETH_DECIMALS);
        let Some(amount) = scale_units(&tx.value, decimals) else {
            continue;
        };
        if amount.is_zero() {
            continue;
        }

        let symbol = tx.token_symbol.trim().to_uppercase();
        let usd = token_usd_value(tx, &symbol, amount, usd_prices);
        let qualifies = match usd {
            Some(v) => v >= thresholds.min_usd,
            None => amount >= thresholds.min_token_qty,
        };
        if !qualifies || !seen.insert(tx.hash.to_lowercase()) {
            continue;
        }

        let (direction, counterparty) = direction_of(wallet, &tx.from, &tx.to);
        out.push(WhaleTransfer {
            tx_hash: tx.hash.to_lowercase(),
            direction,
            token: symbol,
            amount,
            usd_value: usd,
            counterparty,
            tx_time: parse_unix(&tx.time_stamp),
        });
    }

    out
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
