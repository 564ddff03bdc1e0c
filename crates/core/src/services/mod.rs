pub mod currency_service;
pub mod market_sentiment_service;
pub mod news_service;
pub mod quote_service;
pub mod sentiment_service;

use crate::providers::traits::Translator;

/// Translate `text`, keeping the original on any failure.
pub(crate) async fn translate_or_keep(translator: &dyn Translator, text: &str) -> String {
    match translator.translate(text).await {
        Ok(translated) if !translated.trim().is_empty() => translated,
        Ok(_) => text.to_string(),
        Err(e) => {
            tracing::debug!(error = %e, "translation failed, keeping original text");
            text.to_string()
        }
    }
}
