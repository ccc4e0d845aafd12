use mockito::Matcher;
use rust_decimal::Decimal;
use serde_json::json;

use kimpwatch::config::AppConfig;
use kimpwatch::exchanges::{BinanceClient, ForeignVenue, FxClient, HyperliquidClient, UpbitClient};
use kimpwatch::explorer::{EtherscanClient, ExplorerError};
use kimpwatch::services::notifier::Notifier;
use kimpwatch::services::premium_service::{PremiumService, PremiumSettings};

async fn mock_upbit(server: &mut mockito::ServerGuard) -> Vec<mockito::Mock> {
    let mut mocks = Vec::new();
    let mock = server
        .mock("GET", "/v1/market/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "market": "KRW-BTC", "korean_name": "비트코인", "english_name": "Bitcoin" },
                { "market": "KRW-USDT", "korean_name": "테더", "english_name": "Tether" },
                { "market": "BTC-ETH", "korean_name": "이더리움", "english_name": "Ethereum" }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    mocks.push(mock);

    let mock = server
        .mock("GET", "/v1/ticker")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(
            json!([
                { "market": "KRW-BTC", "trade_price": 100000.0, "acc_trade_price_24h": 5000000000.0 },
                { "market": "KRW-USDT", "trade_price": 1000.0, "acc_trade_price_24h": 1000000.0 }
            ])
            .to_string(),
        )
        .create_async()
        .await;
    mocks.push(mock);

    mocks
}

#[tokio::test]
async fn test_upbit_board_keeps_krw_markets() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_upbit(&mut server).await;

    let client = UpbitClient::with_base_url(reqwest::Client::new(), server.url());
    let board = client.fetch_krw_board().await.unwrap();

    assert_eq!(board.prices.len(), 2);
    assert_eq!(board.prices["BTC"], Decimal::from(100_000));
    assert_eq!(board.names["BTC"], "비트코인");
    assert_eq!(board.volumes["BTC"], Decimal::from(5_000_000_000i64));
    assert!(!board.prices.contains_key("ETH"));
}

fn tickers(codes: &[String]) -> String {
    let rows: Vec<serde_json::Value> = codes
        .iter()
        .enumerate()
        .map(|(i, m)| json!({ "market": m, "trade_price": 1000 + i }))
        .collect();
    serde_json::Value::Array(rows).to_string()
}

#[tokio::test]
async fn test_upbit_tickers_fetched_in_chunks_of_100() {
    let mut server = mockito::Server::new_async().await;
    let codes: Vec<String> = (0..150).map(|i| format!("KRW-C{i:03}")).collect();
    let listing: Vec<serde_json::Value> = codes.iter().map(|m| json!({ "market": m })).collect();

    let _listing = server
        .mock("GET", "/v1/market/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body(serde_json::Value::Array(listing).to_string())
        .create_async()
        .await;
    let first = server
        .mock("GET", "/v1/ticker")
        .match_query(Matcher::Regex("KRW-C000".into()))
        .with_status(200)
        .with_body(tickers(&codes[..100]))
        .expect(1)
        .create_async()
        .await;
    let second = server
        .mock("GET", "/v1/ticker")
        .match_query(Matcher::Regex("KRW-C149".into()))
        .with_status(200)
        .with_body(tickers(&codes[100..]))
        .expect(1)
        .create_async()
        .await;

    let client = UpbitClient::with_base_url(reqwest::Client::new(), server.url());
    let board = client.fetch_krw_board().await.unwrap();

    assert_eq!(board.prices.len(), 150);
    assert_eq!(board.prices["C000"], Decimal::from(1000));
    assert_eq!(board.prices["C149"], Decimal::from(1049));
    first.assert_async().await;
    second.assert_async().await;
}

#[tokio::test]
async fn test_upbit_empty_market_list_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v1/market/all")
        .match_query(Matcher::Any)
        .with_status(200)
        .with_body("[]")
        .create_async()
        .await;

    let client = UpbitClient::with_base_url(reqwest::Client::new(), server.url());
    assert!(client.fetch_krw_board().await.is_err());
}

#[tokio::test]
async fn test_binance_prices_strip_quote() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/price")
        .with_status(200)
        .with_body(
            json!([
                { "symbol": "BTCUSDT", "price": "105.00000000" },
                { "symbol": "ETHBTC", "price": "0.05" },
                { "symbol": "JUPUSDT", "price": "0.81" }
            ])
            .to_string(),
        )
        .create_async()
        .await;

    let client = BinanceClient::with_base_url(reqwest::Client::new(), server.url());
    let prices = client.fetch_usdt_prices().await.unwrap();

    assert_eq!(prices.len(), 2);
    assert_eq!(prices["BTC"], Decimal::from(105));
    assert_eq!(prices["JUP"], Decimal::new(81, 2));
}

#[tokio::test]
async fn test_hyperliquid_mids_normalized() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("POST", "/info")
        .match_body(Matcher::Json(json!({ "type": "allMids" })))
        .with_status(200)
        .with_body(json!({ "BTC": "104.5", "@107": "12.0", "kPEPE": "0.012" }).to_string())
        .create_async()
        .await;

    let client = HyperliquidClient::with_base_url(reqwest::Client::new(), server.url());
    let mids = client.fetch_mids().await.unwrap();

    assert_eq!(mids.len(), 2);
    assert_eq!(mids["BTC"], Decimal::new(1045, 1));
    assert_eq!(mids["PEPE"], Decimal::new(12, 6));
    mock.assert_async().await;
}

#[tokio::test]
async fn test_fx_live_rate() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v6/latest/USD")
        .with_status(200)
        .with_body(json!({ "result": "success", "rates": { "KRW": 1385.5, "JPY": 150.1 } }).to_string())
        .create_async()
        .await;

    let client = FxClient::with_base_url(reqwest::Client::new(), server.url());
    let fx = client.usd_krw_or(Decimal::from(1400)).await;

    assert_eq!(fx.rate, Decimal::new(13855, 1));
    assert!(!fx.fallback);
}

#[tokio::test]
async fn test_fx_falls_back_on_server_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v6/latest/USD")
        .with_status(500)
        .create_async()
        .await;

    let client = FxClient::with_base_url(reqwest::Client::new(), server.url());
    let fx = client.usd_krw_or(Decimal::from(1400)).await;

    assert_eq!(fx.rate, Decimal::from(1400));
    assert!(fx.fallback);
}

#[tokio::test]
async fn test_notifier_reports_delivery() {
    let mut server = mockito::Server::new_async().await;
    let ok = server
        .mock("POST", "/bottest-token/sendMessage")
        .match_body(Matcher::PartialJson(json!({ "chat_id": "42", "parse_mode": "Markdown" })))
        .with_status(200)
        .with_body(r#"{"ok":true}"#)
        .create_async()
        .await;

    let notifier = Notifier::with_api_base(
        reqwest::Client::new(),
        server.url(),
        "test-token".into(),
        "42".into(),
    );
    assert!(notifier.send("hello").await);
    ok.assert_async().await;
}

#[tokio::test]
async fn test_notifier_failure_returns_false() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("POST", "/bottest-token/sendMessage")
        .with_status(500)
        .create_async()
        .await;

    let notifier = Notifier::with_api_base(
        reqwest::Client::new(),
        server.url(),
        "test-token".into(),
        "42".into(),
    );
    assert!(!notifier.send("hello").await);
}

#[tokio::test]
async fn test_premium_snapshot_end_to_end() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_upbit(&mut server).await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/price")
        .with_status(200)
        .with_body(json!([{ "symbol": "BTCUSDT", "price": "105" }]).to_string())
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/v6/latest/USD")
        .with_status(200)
        .with_body(json!({ "result": "success", "rates": { "KRW": 1000 } }).to_string())
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let service = PremiumService::from_clients(
        UpbitClient::with_base_url(http.clone(), server.url()),
        BinanceClient::with_base_url(http.clone(), server.url()),
        HyperliquidClient::with_base_url(http.clone(), server.url()),
        FxClient::with_base_url(http, server.url()),
        PremiumSettings::from(&AppConfig::default()),
    );

    let snapshot = service.snapshot(ForeignVenue::Binance).await.unwrap();

    assert!(!snapshot.fx_fallback);
    assert_eq!(snapshot.stable_premium, Decimal::ZERO);
    assert_eq!(snapshot.records.len(), 1);

    let btc = snapshot.record("BTC").unwrap();
    assert_eq!(btc.premium, Decimal::new(-47619, 4));
    assert_eq!(btc.net_premium, Decimal::new(-49119, 4));
    assert_eq!(btc.pure_premium, Decimal::new(-47619, 4));
    assert_eq!(btc.korean_name.as_deref(), Some("비트코인"));
}

#[tokio::test]
async fn test_premium_snapshot_foreign_failure_is_error() {
    let mut server = mockito::Server::new_async().await;
    let _mocks = mock_upbit(&mut server).await;
    let _mock = server
        .mock("GET", "/api/v3/ticker/price")
        .with_status(503)
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/v6/latest/USD")
        .with_status(500)
        .create_async()
        .await;

    let http = reqwest::Client::new();
    let service = PremiumService::from_clients(
        UpbitClient::with_base_url(http.clone(), server.url()),
        BinanceClient::with_base_url(http.clone(), server.url()),
        HyperliquidClient::with_base_url(http.clone(), server.url()),
        FxClient::with_base_url(http, server.url()),
        PremiumSettings::from(&AppConfig::default()),
    );

    assert!(service.snapshot(ForeignVenue::Binance).await.is_err());
}

#[tokio::test]
async fn test_etherscan_empty_history_and_api_error() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/v2/api")
        .match_query(Matcher::UrlEncoded("action".into(), "txlist".into()))
        .with_status(200)
        .with_body(json!({ "status": "0", "message": "No transactions found", "result": [] }).to_string())
        .create_async()
        .await;
    let _mock = server
        .mock("GET", "/v2/api")
        .match_query(Matcher::UrlEncoded("action".into(), "tokentx".into()))
        .with_status(200)
        .with_body(json!({ "status": "0", "message": "NOTOK", "result": "Invalid API Key" }).to_string())
        .create_async()
        .await;

    let client = EtherscanClient::with_base_url(
        reqwest::Client::new(),
        format!("{}/v2/api", server.url()),
        "bad-key".into(),
    );
    let wallet = "0x28c6c06298d514db089934071355e5743bf21d60";

    let native = client.native_transfers(wallet, 20).await.unwrap();
    assert!(native.is_empty());

    match client.token_transfers(wallet, 20).await {
        Err(ExplorerError::Api(msg)) => assert_eq!(msg, "Invalid API Key"),
        other => panic!("expected API error, got {other:?}"),
    }
}
