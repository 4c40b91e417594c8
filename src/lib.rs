pub mod app;
pub mod cli;
pub mod config;
pub mod data;
pub mod logging;
pub mod normalize;
pub mod portal;
pub mod scraper;
pub mod utils;
