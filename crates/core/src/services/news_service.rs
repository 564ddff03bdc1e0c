use std::sync::Arc;

use crate::models::news::NewsItem;
use crate::providers::finviz::MAX_HEADLINES;
use crate::providers::traits::{NewsSource, Translator};
use crate::services::translate_or_keep;

/// Per-symbol headlines. Never fails: any source error yields an empty list.
pub struct NewsService {
    source: Arc<dyn NewsSource>,
    translator: Arc<dyn Translator>,
}

impl NewsService {
    pub fn new(source: Arc<dyn NewsSource>, translator: Arc<dyn Translator>) -> Self {
        Self { source, translator }
    }

    /// Up to ten headlines, newest first.
    pub async fn headlines(&self, symbol: &str) -> Vec<NewsItem> {
        let symbol = symbol.trim().to_uppercase();
        if symbol.is_empty() {
            return Vec::new();
        }
        match self.source.headlines(&symbol).await {
            Ok(mut items) => {
                items.truncate(MAX_HEADLINES);
                items
            }
            Err(e) => {
                tracing::warn!(symbol = %symbol, source = self.source.name(), error = %e, "news scrape failed");
                Vec::new()
            }
        }
    }

    /// Headlines with titles translated for display.
    ///
    /// Always returns at least one item: a placeholder when nothing was found.
    pub async fn translated_headlines(&self, symbol: &str) -> Vec<NewsItem> {
        let items = self.headlines(symbol).await;
        if items.is_empty() {
            return vec![NewsItem::placeholder(symbol)];
        }

        let mut translated = Vec::with_capacity(items.len());
        for mut item in items {
            item.title = translate_or_keep(self.translator.as_ref(), &item.title).await;
            translated.push(item);
        }
        translated
    }
}
