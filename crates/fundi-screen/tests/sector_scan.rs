//! End-to-end sector scans over an in-memory provider.

use approx::assert_relative_eq;
use fundi_criteria::CriteriaSet;
use fundi_screen::{ScreenerConfig, SectorScreener, UnresolvedReason};
use fundi_traits::{FundiError, InjectedFailure, MarketCapBucket, StaticProvider};
use serde_json::json;

fn healthcare() -> StaticProvider {
    StaticProvider::new()
        .with_sector("Healthcare", ["JNJ", "PFE", "ZZZZ"])
        .with_record(
            "JNJ",
            json!({
                "symbol": "JNJ",
                "sector": "Healthcare",
                "peRatio": 14.5,
                "returnOnEquity": 0.21,
                "marketCap": 3.9e11,
            }),
        )
        .with_record(
            "PFE",
            json!({
                "symbol": "PFE",
                "sector": "Healthcare",
                "peRatio": "18.2",
                "returnOnEquity": "8%",
                "marketCap": 1.6e11,
            }),
        )
        .with_failure("ZZZZ", InjectedFailure::NotFound)
}

#[tokio::test]
async fn screen_by_criteria_isolates_not_found() {
    let screener = SectorScreener::new(healthcare());
    let report = screener
        .screen_by_criteria("health care", [("max_pe_ratio", 15.0), ("min_roe", 0.10)])
        .await
        .unwrap();

    assert_eq!(report.sector, "Healthcare");
    assert_eq!(report.evaluated_count(), 2);
    assert_eq!(report.unresolved.len(), 1);
    assert_eq!(report.unresolved[0].ticker, "ZZZZ");
    assert_eq!(report.unresolved[0].reason, UnresolvedReason::NotFound);

    let ranked = report.ranked();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].ticker, "JNJ");
    assert_eq!(ranked[0].cap_bucket, Some(MarketCapBucket::Mega));

    let pfe = report.result("PFE").unwrap();
    assert!(!pfe.passed);
    assert_eq!(pfe.failed_rules, vec!["max_pe_ratio", "min_roe"]);
    // Failing tickers are still scored; no passing rule means 0.0
    assert_relative_eq!(pfe.score, 0.0);
}

#[tokio::test]
async fn include_failures_merges_by_score() {
    let config = ScreenerConfig {
        include_failures: true,
        ..ScreenerConfig::default()
    };
    let screener = SectorScreener::with_config(healthcare(), config);
    let report = screener
        .screen_by_criteria("Healthcare", [("max_pe_ratio", 15.0), ("min_roe", 0.10)])
        .await
        .unwrap();

    let tickers: Vec<&str> = report.ranked().iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["JNJ", "PFE"]);
}

#[tokio::test]
async fn missing_metric_fails_unless_skipped() {
    let provider = StaticProvider::new()
        .with_sector("Energy", ["XOM"])
        .with_record("XOM", json!({"pe_ratio": 12.0}));
    let screener = SectorScreener::new(provider);

    let strict = CriteriaSet::parse_all(["pe_ratio <= 15", "dividend_yield > 0"]).unwrap();
    let report = screener.screen("Energy", &strict).await.unwrap();
    assert!(report.candidates.is_empty());
    assert_eq!(report.failures[0].failed_rules, vec!["min_dividend_yield"]);

    let lenient = CriteriaSet::parse_all(["pe_ratio <= 15", "dividend_yield > 0 ~"]).unwrap();
    let report = screener.screen("Energy", &lenient).await.unwrap();
    assert_eq!(report.candidates.len(), 1);
    assert_eq!(report.candidates[0].skipped_rules, vec!["min_dividend_yield"]);
}

#[tokio::test]
async fn small_cap_preset() {
    let provider = StaticProvider::new()
        .with_sector("Industrials", ["TINY", "BIG", "LOSS"])
        .with_record(
            "TINY",
            json!({"pe_ratio": 9.0, "roe": 0.14, "market_cap": 8.0e8, "profit_margin": 0.07}),
        )
        .with_record(
            "BIG",
            json!({"pe_ratio": 11.0, "roe": 0.25, "market_cap": 4.0e10, "profit_margin": 0.12}),
        )
        .with_record(
            "LOSS",
            json!({"pe_ratio": -4.0, "roe": 0.12, "market_cap": 5.0e8, "revenue": 100.0, "net_income": -3.0}),
        );
    let screener = SectorScreener::new(provider);
    let report = screener.screen_small_caps("industrials").await.unwrap();

    let tickers: Vec<&str> = report.candidates.iter().map(|r| r.ticker.as_str()).collect();
    assert_eq!(tickers, vec!["TINY"]);
    assert_eq!(
        report.result("BIG").unwrap().failed_rules,
        vec!["max_market_cap"]
    );
    assert_eq!(
        report.result("LOSS").unwrap().failed_rules,
        vec!["positive_pe_ratio", "positive_profit_margin"]
    );
}

#[tokio::test]
async fn rejects_bad_thresholds_before_fetching() {
    let screener = SectorScreener::new(healthcare());
    let err = screener
        .screen_by_criteria("Healthcare", [("max_sector", 1.0)])
        .await
        .unwrap_err();
    assert!(matches!(err, FundiError::InvalidRule(_)));
    assert_eq!(screener.provider().call_count("JNJ"), 0);
}

#[tokio::test]
async fn report_exports_frame() {
    let config = ScreenerConfig {
        include_failures: true,
        ..ScreenerConfig::default()
    };
    let screener = SectorScreener::with_config(healthcare(), config);
    let report = screener
        .screen_by_criteria("Healthcare", [("max_pe_ratio", 15.0)])
        .await
        .unwrap();
    let df = report.to_frame().unwrap();
    assert_eq!(df.height(), 2);
    assert!(df.column("roe").is_ok());
}
