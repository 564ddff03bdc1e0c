// ═══════════════════════════════════════════════════════════════════
// Provider Tests: page parsers, model reply parsing, HTTP providers
// against a local mock server
// ═══════════════════════════════════════════════════════════════════

use httpmock::prelude::*;
use serde_json::json;
use std::time::Duration;

use bolsa_ia_core::errors::CoreError;
use bolsa_ia_core::models::sentiment::{SentimentColor, SentimentLabel};
use bolsa_ia_core::providers::aaii::{parse_survey, AaiiSurveyScraper};
use bolsa_ia_core::providers::cnn::CnnFearGreedProvider;
use bolsa_ia_core::providers::finviz::{parse_news_table, FinvizNewsScraper, MAX_HEADLINES};
use bolsa_ia_core::providers::gemini::{parse_verdict, GeminiScorer};
use bolsa_ia_core::providers::google_translate::GoogleTranslator;
use bolsa_ia_core::providers::lexicon::LexiconScorer;
use bolsa_ia_core::providers::traits::{
    FearGreedSource, MarketDataProvider, NewsSource, SentimentScorer, SurveySource, Translator,
};
use bolsa_ia_core::providers::yahoo_finance::YahooFinanceProvider;

const TIMEOUT: Duration = Duration::from_secs(5);

const NEWS_PAGE: &str = r#"
<html><body>
<table class="snapshot-table2"><tr><td>P/E</td><td>30.1</td></tr></table>
<table width="100%" class="fullview-news-outer" id="news-table">
<tr class="cursor-pointer">
  <td width="130" align="right">Oct-18-25 09:30AM</td>
  <td align="left"><div class="news-link-container"><div class="news-link-left">
    <a class="tab-link-news" href="https://example.com/a" target="_blank">Apple &amp; Google rally on AI deal</a>
  </div><div class="news-link-right"><span>(Reuters)</span></div></div></td>
</tr>
<tr>
  <td align="right">&nbsp;08:15AM&nbsp;</td>
  <td><a href="/news/123">Apple shares slip after &quot;weak&quot; guidance</a></td>
</tr>
</table>
</body></html>
"#;

fn headlines(titles: &[&str]) -> Vec<String> {
    titles.iter().map(|t| t.to_string()).collect()
}

// ═══════════════════════════════════════════════════════════════════
// Finviz: news table parsing
// ═══════════════════════════════════════════════════════════════════

mod finviz_parse {
    use super::*;

    #[test]
    fn parses_rows() {
        let items = parse_news_table(NEWS_PAGE, "https://finviz.com", MAX_HEADLINES);
        assert_eq!(items.len(), 2);

        assert_eq!(items[0].title, "Apple & Google rally on AI deal");
        assert_eq!(items[0].link, "https://example.com/a");
        assert_eq!(items[0].time, "Oct-18-25 09:30AM");
        assert_eq!(items[0].source, "Reuters");
    }

    #[test]
    fn time_only_rows_inherit_date() {
        let items = parse_news_table(NEWS_PAGE, "https://finviz.com", MAX_HEADLINES);
        assert_eq!(items[1].time, "Oct-18-25 08:15AM");
    }

    #[test]
    fn relative_links_are_absolute() {
        let items = parse_news_table(NEWS_PAGE, "https://finviz.com", MAX_HEADLINES);
        assert_eq!(items[1].link, "https://finviz.com/news/123");
        assert_eq!(items[1].title, "Apple shares slip after \"weak\" guidance");
    }

    #[test]
    fn missing_source_defaults_to_finviz() {
        let items = parse_news_table(NEWS_PAGE, "https://finviz.com", MAX_HEADLINES);
        assert_eq!(items[1].source, "Finviz");
    }

    #[test]
    fn respects_limit() {
        let rows: String = (0..15)
            .map(|i| format!(r#"<tr><td>Oct-18-25 09:{i:02}AM</td><td><a href="/n/{i}">Headline {i}</a></td></tr>"#))
            .collect();
        let html = format!(r#"<table id="news-table">{rows}</table>"#);
        let items = parse_news_table(&html, "https://finviz.com", MAX_HEADLINES);
        assert_eq!(items.len(), 10);
        assert_eq!(items[0].title, "Headline 0");
        assert_eq!(items[9].title, "Headline 9");
    }

    #[test]
    fn page_without_table_is_empty() {
        assert!(parse_news_table("<html>Access denied</html>", "https://finviz.com", 10).is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// AAII: survey text patterns
// ═══════════════════════════════════════════════════════════════════

mod aaii_parse {
    use super::*;

    #[test]
    fn finds_both_percentages() {
        let html = "<div><h3>Bullish</h3><span>42.0%</span></div>\
                    <div>Neutral 20.5%</div>\
                    <div><h3>Bearish:</h3> <b>37.5%</b></div>";
        let reading = parse_survey(html);
        assert_eq!(reading.bullish, Some(42.0));
        assert_eq!(reading.bearish, Some(37.5));
    }

    #[test]
    fn integer_percentages() {
        let reading = parse_survey("bullish 40% bearish 33%");
        assert_eq!(reading.bullish, Some(40.0));
        assert_eq!(reading.bearish, Some(33.0));
    }

    #[test]
    fn no_match_is_empty() {
        assert!(parse_survey("<p>Please log in</p>").is_empty());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Gemini: reply parsing
// ═══════════════════════════════════════════════════════════════════

mod gemini_parse {
    use super::*;

    #[test]
    fn full_reply() {
        let reply = r#"{"score": 0.5, "label": "Bullish", "confidence": 0.8, "summary": "Buenas noticias.", "recommendation": "Comprar"}"#;
        let result = parse_verdict(reply).unwrap().into_result("aapl", 4);
        assert_eq!(result.symbol, "AAPL");
        assert_eq!(result.score, 75);
        assert_eq!(result.label, SentimentLabel::Bullish);
        assert_eq!(result.color, SentimentColor::Green);
        assert_eq!(result.confidence, 0.8);
        assert_eq!(result.summary, "Buenas noticias.");
        assert_eq!(result.recommendation, "Comprar");
        assert_eq!(result.news_count, 4);
    }

    #[test]
    fn fenced_reply() {
        let reply = "```json\n{\"score\": -0.5}\n```";
        let verdict = parse_verdict(reply).unwrap();
        assert_eq!(verdict.score, -0.5);
    }

    #[test]
    fn missing_fields_are_defaulted() {
        let result = parse_verdict(r#"{"score": -0.5}"#).unwrap().into_result("X", 3);
        assert_eq!(result.score, 25);
        assert_eq!(result.label, SentimentLabel::Bearish);
        assert_eq!(result.color, SentimentColor::Red);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.summary, "");
        assert_eq!(result.recommendation, "Vender");
    }

    #[test]
    fn color_follows_raw_score_not_label() {
        let result = parse_verdict(r#"{"score": 0.0, "label": "Bullish"}"#)
            .unwrap()
            .into_result("X", 1);
        assert_eq!(result.label, SentimentLabel::Bullish);
        assert_eq!(result.color, SentimentColor::Gray);
        assert_eq!(result.score, 50);
    }

    #[test]
    fn out_of_range_values_are_clamped() {
        let result = parse_verdict(r#"{"score": 4.0, "confidence": 7}"#)
            .unwrap()
            .into_result("X", 1);
        assert_eq!(result.score, 100);
        assert_eq!(result.confidence, 1.0);
    }

    #[test]
    fn missing_score_is_error() {
        let err = parse_verdict(r#"{"label": "Bullish"}"#).unwrap_err();
        assert!(matches!(err, CoreError::ParseFailure(_)));
    }

    #[test]
    fn non_json_is_error() {
        assert!(parse_verdict("I think it is bullish").is_err());
    }
}

// ═══════════════════════════════════════════════════════════════════
// Lexicon: offline scorer
// ═══════════════════════════════════════════════════════════════════

mod lexicon {
    use super::*;

    #[tokio::test]
    async fn positive_headlines_are_bullish() {
        let scorer = LexiconScorer::new();
        let result = scorer
            .score("aapl", &headlines(&["Apple shares surge on record profit", "Strong growth beats estimates"]))
            .await
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Bullish);
        assert_eq!(result.recommendation, "Comprar");
        assert_eq!(result.color, SentimentColor::Green);
        assert!(result.score > 55);
        assert_eq!(result.confidence, 0.5);
        assert_eq!(result.summary, "Análisis básico de palabras clave (Modo Offline).");
        assert_eq!(result.news_count, 2);
    }

    #[tokio::test]
    async fn negative_headlines_are_bearish() {
        let scorer = LexiconScorer::new();
        let result = scorer
            .score("x", &headlines(&["Shares plunge after lawsuit and weak guidance"]))
            .await
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Bearish);
        assert_eq!(result.recommendation, "Vender");
        assert!(result.score < 45);
    }

    #[tokio::test]
    async fn neutral_headlines_score_fifty() {
        let scorer = LexiconScorer::new();
        let result = scorer
            .score("x", &headlines(&["Company to hold annual meeting"]))
            .await
            .unwrap();
        assert_eq!(result.label, SentimentLabel::Neutral);
        assert_eq!(result.score, 50);
        assert_eq!(result.recommendation, "Mantener");
    }
}

// ═══════════════════════════════════════════════════════════════════
// HTTP providers (mock server)
// ═══════════════════════════════════════════════════════════════════

mod finviz_http {
    use super::*;

    #[tokio::test]
    async fn fetches_quote_page() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/quote.ashx")
                    .query_param("t", "AAPL")
                    .query_param("p", "d");
                then.status(200).body(NEWS_PAGE);
            })
            .await;

        let scraper = FinvizNewsScraper::with_base_url(server.base_url(), TIMEOUT);
        let items = scraper.headlines("AAPL").await.unwrap();
        mock.assert_async().await;
        assert_eq!(items.len(), 2);
        assert_eq!(items[1].link, format!("{}/news/123", server.base_url()));
    }

    #[tokio::test]
    async fn blocked_page_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/quote.ashx");
                then.status(403).body("Forbidden");
            })
            .await;

        let scraper = FinvizNewsScraper::with_base_url(server.base_url(), TIMEOUT);
        assert!(scraper.headlines("AAPL").await.is_err());
    }
}

mod gemini_http {
    use super::*;

    fn reply_body(text: &str) -> serde_json::Value {
        json!({"candidates": [{"content": {"parts": [{"text": text}], "role": "model"}}]})
    }

    #[tokio::test]
    async fn scores_through_generate_content() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/v1beta/models/gemini-2.0-flash:generateContent")
                    .query_param("key", "test-key");
                then.status(200).json_body(reply_body(
                    "```json\n{\"score\": 0.5, \"label\": \"Bullish\", \"confidence\": 0.9, \"summary\": \"Resumen.\", \"recommendation\": \"Comprar\"}\n```",
                ));
            })
            .await;

        let scorer = GeminiScorer::with_base_url("test-key".into(), server.base_url());
        let result = scorer
            .score("AAPL", &headlines(&["Apple beats", "iPhone demand strong"]))
            .await
            .unwrap();
        mock.assert_async().await;
        assert_eq!(result.score, 75);
        assert_eq!(result.label, SentimentLabel::Bullish);
        assert_eq!(result.summary, "Resumen.");
        assert_eq!(result.news_count, 2);
    }

    #[tokio::test]
    async fn news_count_caps_at_ten() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(reply_body("{\"score\": 0.0}"));
            })
            .await;

        let many: Vec<String> = (0..14).map(|i| format!("headline {i}")).collect();
        let scorer = GeminiScorer::with_base_url("k".into(), server.base_url());
        let result = scorer.score("X", &many).await.unwrap();
        assert_eq!(result.news_count, 10);
    }

    #[tokio::test]
    async fn http_error_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(429).json_body(json!({"error": {"message": "quota"}}));
            })
            .await;

        let scorer = GeminiScorer::with_base_url("k".into(), server.base_url());
        let err = scorer.score("X", &headlines(&["a"])).await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
    }

    #[tokio::test]
    async fn reply_without_score_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST);
                then.status(200).json_body(reply_body("{\"label\": \"Bullish\"}"));
            })
            .await;

        let scorer = GeminiScorer::with_base_url("k".into(), server.base_url());
        assert!(scorer.score("X", &headlines(&["a"])).await.is_err());
    }
}

mod cnn_http {
    use super::*;

    #[tokio::test]
    async fn reads_score_and_rating() {
        let server = MockServer::start_async().await;
        let mock = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/index/fearandgreed/graphdata")
                    .header("Referer", "https://edition.cnn.com/");
                then.status(200).json_body(json!({
                    "fear_and_greed": {
                        "score": 63.8,
                        "rating": "greed",
                        "timestamp": "2025-10-17T23:59:57+00:00",
                        "previous_close": 60.1
                    }
                }));
            })
            .await;

        let provider = CnnFearGreedProvider::with_base_url(server.base_url(), TIMEOUT);
        let reading = provider.reading().await.unwrap();
        mock.assert_async().await;
        assert_eq!(reading.score, 63.8);
        assert_eq!(reading.rating, "greed");
        assert_eq!(reading.timestamp.as_deref(), Some("2025-10-17T23:59:57+00:00"));
    }

    #[tokio::test]
    async fn rejected_request_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(418);
            })
            .await;

        let provider = CnnFearGreedProvider::with_base_url(server.base_url(), TIMEOUT);
        assert!(provider.reading().await.is_err());
    }
}

mod aaii_http {
    use super::*;

    #[tokio::test]
    async fn scrapes_survey_page() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/sentimentsurvey");
                then.status(200)
                    .body("<table><tr><td>Bullish</td><td>41.2%</td></tr><tr><td>Bearish</td><td>30.0%</td></tr></table>");
            })
            .await;

        let scraper = AaiiSurveyScraper::with_base_url(server.base_url(), TIMEOUT);
        let reading = scraper.reading().await.unwrap();
        assert_eq!(reading.bullish, Some(41.2));
        assert_eq!(reading.bearish, Some(30.0));
    }
}

mod translate_http {
    use super::*;

    #[tokio::test]
    async fn joins_translated_segments() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/translate_a/single")
                    .query_param("tl", "es")
                    .query_param("q", "Technology");
                then.status(200)
                    .json_body(json!([[["Tecnología", "Technology", null, null, 1]], null, "en"]));
            })
            .await;

        let translator = GoogleTranslator::with_base_url(server.base_url(), "es", TIMEOUT);
        assert_eq!(translator.translate("Technology").await.unwrap(), "Tecnología");
    }

    #[tokio::test]
    async fn blank_text_skips_request() {
        let translator = GoogleTranslator::with_base_url("http://127.0.0.1:9", "es", TIMEOUT);
        assert_eq!(translator.translate("  ").await.unwrap(), "  ");
    }

    #[tokio::test]
    async fn server_error_is_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET);
                then.status(503);
            })
            .await;

        let translator = GoogleTranslator::with_base_url(server.base_url(), "es", TIMEOUT);
        assert!(translator.translate("Energy").await.is_err());
    }
}

mod yahoo_http {
    use super::*;

    #[tokio::test]
    async fn quote_summary_maps_modules() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v10/finance/quoteSummary/AAPL")
                    .query_param("modules", "price,summaryDetail,assetProfile,financialData");
                then.status(200).json_body(json!({
                    "quoteSummary": {
                        "result": [{
                            "price": {
                                "shortName": "Apple Inc.",
                                "longName": "Apple Inc.",
                                "quoteType": "EQUITY",
                                "currency": "USD",
                                "regularMarketPrice": {"raw": 190.5, "fmt": "190.50"},
                                "regularMarketChangePercent": {"raw": 0.0125, "fmt": "1.25%"},
                                "marketCap": {"raw": 2.9e12, "fmt": "2.9T"},
                                "regularMarketVolume": {"raw": 51234567.0}
                            },
                            "summaryDetail": {
                                "trailingPE": {"raw": 30.1},
                                "forwardPE": {},
                                "dividendYield": {"raw": 0.005},
                                "dividendRate": {"raw": 0.96}
                            },
                            "assetProfile": {"sector": "Technology", "website": "https://www.apple.com"},
                            "financialData": {"currentPrice": {"raw": 190.6}}
                        }],
                        "error": null
                    }
                }));
            })
            .await;

        let provider = YahooFinanceProvider::with_base_url(server.base_url()).unwrap();
        let summary = provider.quote_summary("AAPL").await.unwrap();
        assert_eq!(summary.short_name.as_deref(), Some("Apple Inc."));
        assert_eq!(summary.quote_type.as_deref(), Some("EQUITY"));
        assert_eq!(summary.best_price(), Some(190.6));
        assert_eq!(summary.regular_market_price, Some(190.5));
        assert!((summary.change_percent.unwrap() - 1.25).abs() < 1e-9);
        assert_eq!(summary.volume, Some(51_234_567));
        assert_eq!(summary.trailing_pe, Some(30.1));
        assert_eq!(summary.forward_pe, None);
        assert_eq!(summary.sector.as_deref(), Some("Technology"));
        assert_eq!(summary.currency.as_deref(), Some("USD"));
    }

    #[tokio::test]
    async fn crumb_handshake_runs_once_per_provider() {
        let server = MockServer::start_async().await;
        let cookie = server
            .mock_async(|when, then| {
                when.method(GET).path("/cookie");
                then.status(404).header("set-cookie", "A3=session; Path=/");
            })
            .await;
        let getcrumb = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/test/getcrumb");
                then.status(200).body("crumb-123");
            })
            .await;
        let summary = server
            .mock_async(|when, then| {
                when.method(GET)
                    .path_includes("/v10/finance/quoteSummary/")
                    .query_param("crumb", "crumb-123");
                then.status(200).json_body(json!({
                    "quoteSummary": {"result": [{"price": {"shortName": "Vodafone"}}], "error": null}
                }));
            })
            .await;

        let provider = YahooFinanceProvider::with_base_url(server.base_url())
            .unwrap()
            .with_cookie_url(server.url("/cookie"));
        for symbol in ["VOD.L", "SAN.MC", "SHOP.TO"] {
            assert!(provider.quote_summary(symbol).await.is_ok());
        }

        cookie.assert_calls_async(1).await;
        getcrumb.assert_calls_async(1).await;
        summary.assert_calls_async(3).await;
    }

    #[tokio::test]
    async fn rejected_crumb_is_fetched_again() {
        let server = MockServer::start_async().await;
        let getcrumb = server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/test/getcrumb");
                then.status(200).body("stale");
            })
            .await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v10/finance/quoteSummary/AAPL");
                then.status(401);
            })
            .await;

        let provider = YahooFinanceProvider::with_base_url(server.base_url())
            .unwrap()
            .with_cookie_url(server.url("/cookie"));
        let err = provider.quote_summary("AAPL").await.unwrap_err();
        assert!(matches!(err, CoreError::UpstreamUnavailable { .. }));
        assert!(provider.quote_summary("AAPL").await.is_err());
        getcrumb.assert_calls_async(2).await;
    }

    #[tokio::test]
    async fn unknown_symbol_is_not_found() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v10/finance/quoteSummary/NOPE123");
                then.status(404).json_body(json!({
                    "quoteSummary": {
                        "result": null,
                        "error": {"code": "Not Found", "description": "Quote not found for symbol: NOPE123"}
                    }
                }));
            })
            .await;

        let provider = YahooFinanceProvider::with_base_url(server.base_url()).unwrap();
        let err = provider.quote_summary("NOPE123").await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn search_maps_quotes() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(GET).path("/v1/finance/search").query_param("q", "santander");
                then.status(200).json_body(json!({
                    "quotes": [
                        {"symbol": "SAN.MC", "longname": "Banco Santander, S.A.", "shortname": "BANCO SANTANDER", "quoteType": "EQUITY", "exchange": "MCE"},
                        {"symbol": "SAN", "shortname": "Banco Santander ADR"},
                        {"name": "news item without symbol"}
                    ],
                    "news": []
                }));
            })
            .await;

        let provider = YahooFinanceProvider::with_base_url(server.base_url()).unwrap();
        let matches = provider.search("santander").await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].symbol, "SAN.MC");
        assert_eq!(matches[0].name, "Banco Santander, S.A.");
        assert_eq!(matches[0].asset_type, "EQUITY");
        assert_eq!(matches[0].exchange, "MCE");
        assert_eq!(matches[1].name, "Banco Santander ADR");
        assert_eq!(matches[1].asset_type, "Unknown");
        assert_eq!(matches[1].exchange, "Unknown");
    }
}
