pub use client::BeinClient;
pub use config::{ScraperConfig, ServerConfig};
pub use error::{BeinError, Result};
pub use model::*;

mod bein_scraper;
mod client;
pub mod config;
mod error;
pub mod model;
pub mod server;
