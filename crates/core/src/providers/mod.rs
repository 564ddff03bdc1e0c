pub mod traits;

// Upstream implementations
pub mod aaii;
pub mod cnn;
pub mod finviz;
pub mod gemini;
pub mod google_translate;
pub mod lexicon;
pub mod yahoo_finance;
