pub mod chart;
pub mod market;
pub mod news;
pub mod portfolio;
pub mod quote;
pub mod sentiment;
pub mod settings;
