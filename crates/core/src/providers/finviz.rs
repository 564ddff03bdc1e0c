use async_trait::async_trait;
use regex_lite::Regex;
use reqwest::Client;
use std::sync::OnceLock;
use std::time::Duration;

use super::traits::NewsSource;
use crate::errors::CoreError;
use crate::models::news::NewsItem;

const PROVIDER: &str = "Finviz";
const BASE_URL: &str = "https://finviz.com";
const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
     (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Maximum number of headlines kept from the news table.
pub const MAX_HEADLINES: usize = 10;

/// Scrapes the per-symbol news table from Finviz's quote page.
///
/// There is no API contract here: the parser depends on the page keeping a
/// `<table id="news-table">` whose rows carry a timestamp cell, one anchor,
/// and an optional `(Source)` span. No retry, no alternate source.
pub struct FinvizNewsScraper {
    client: Client,
    base_url: String,
}

impl FinvizNewsScraper {
    pub fn new(timeout: Duration) -> Self {
        Self::with_base_url(BASE_URL, timeout)
    }

    pub fn with_base_url(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .user_agent(USER_AGENT)
                .build()
                .unwrap_or_else(|_| Client::new()),
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl NewsSource for FinvizNewsScraper {
    fn name(&self) -> &str {
        PROVIDER
    }

    async fn headlines(&self, symbol: &str) -> Result<Vec<NewsItem>, CoreError> {
        let html = self
            .client
            .get(format!("{}/quote.ashx", self.base_url))
            .query(&[("t", symbol), ("p", "d")])
            .send()
            .await?
            .error_for_status()?
            .text()
            .await?;

        Ok(parse_news_table(&html, &self.base_url, MAX_HEADLINES))
    }
}

// ── HTML parsing ────────────────────────────────────────────────────

fn anchor_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r#"(?is)<a\b[^>]*?href\s*=\s*["']([^"']*)["'][^>]*>(.*?)</a>"#)
            .expect("static regex")
    })
}

fn cell_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<td\b[^>]*>(.*?)</td>").expect("static regex"))
}

fn source_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?is)<span\b[^>]*>\s*\(([^)<]+)\)\s*</span>").expect("static regex")
    })
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?s)<[^>]*>").expect("static regex"))
}

/// Strip tags, decode the handful of entities Finviz emits, collapse whitespace.
pub(crate) fn clean_text(fragment: &str) -> String {
    let stripped = tag_re().replace_all(fragment, "");
    let decoded = stripped
        .replace("&nbsp;", " ")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&#x27;", "'")
        .replace("&apos;", "'")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Finviz prints the date only on the first row of each day (`Oct-18-25 09:30AM`),
/// following rows show just the time. Carry the last seen date forward.
fn carry_date(raw: &str, last_date: &mut Option<String>) -> String {
    match raw.split_once(' ') {
        Some((date, _)) => {
            *last_date = Some(date.to_string());
            raw.to_string()
        }
        None => match last_date {
            Some(date) if !raw.is_empty() => format!("{date} {raw}"),
            _ => raw.to_string(),
        },
    }
}

/// Parse up to `limit` headlines out of a Finviz quote page.
///
/// A page without the news table yields an empty list.
pub fn parse_news_table(html: &str, base_url: &str, limit: usize) -> Vec<NewsItem> {
    let start = match html
        .find(r#"id="news-table""#)
        .or_else(|| html.find("id='news-table'"))
    {
        Some(idx) => idx,
        None => return Vec::new(),
    };
    let table = &html[start..];
    let table = match table.find("</table>") {
        Some(end) => &table[..end],
        None => table,
    };

    let mut items = Vec::new();
    let mut last_date = None;

    for row in table.split("<tr").skip(1) {
        if items.len() >= limit {
            break;
        }
        let row = row.split("</tr>").next().unwrap_or(row);

        let Some(anchor) = anchor_re().captures(row) else {
            continue;
        };
        let title = clean_text(anchor.get(2).map_or("", |m| m.as_str()));
        if title.is_empty() {
            continue;
        }

        let href = anchor.get(1).map_or("", |m| m.as_str()).replace("&amp;", "&");
        let link = if href.starts_with('/') {
            format!("{base_url}{href}")
        } else {
            href
        };

        let raw_time = cell_re()
            .captures(row)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_default();
        let time = carry_date(&raw_time, &mut last_date);

        let source = source_re()
            .captures(row)
            .and_then(|c| c.get(1))
            .map(|m| clean_text(m.as_str()))
            .unwrap_or_else(|| PROVIDER.to_string());

        items.push(NewsItem {
            title,
            link,
            time,
            source,
        });
    }

    items
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clean_text_decodes_entities() {
        assert_eq!(clean_text("<b>AT&amp;T</b>  &quot;rallies&quot;"), "AT&T \"rallies\"");
    }

    #[test]
    fn carry_date_fills_time_only_rows() {
        let mut last = None;
        assert_eq!(carry_date("Oct-18-25 09:30AM", &mut last), "Oct-18-25 09:30AM");
        assert_eq!(carry_date("08:15AM", &mut last), "Oct-18-25 08:15AM");
    }

    #[test]
    fn carry_date_without_previous_date_keeps_raw() {
        let mut last = None;
        assert_eq!(carry_date("08:15AM", &mut last), "08:15AM");
    }
}
