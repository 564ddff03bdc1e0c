use serde::{Deserialize, Serialize};

/// A headline scraped from a per-symbol news page.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewsItem {
    pub title: String,
    pub link: String,
    /// Timestamp text exactly as the source shows it (e.g. `Oct-18-25 09:30AM`).
    pub time: String,
    #[serde(default)]
    pub source: String,
}

impl NewsItem {
    /// Single item returned to the frontend when a symbol has no scrapable news.
    pub fn placeholder(symbol: &str) -> Self {
        Self {
            title: format!(
                "No hay noticias recientes para {} (o Finviz bloqueado)",
                symbol.to_uppercase()
            ),
            link: "#".to_string(),
            time: "Ahora".to_string(),
            source: "Sistema BolsaIA".to_string(),
        }
    }
}
