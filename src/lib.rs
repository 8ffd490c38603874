//! Keyword search over the public ads library.
//!
//! A scrape opens a browser session, loads the keyword search, scrolls until
//! the number of rendered ads converges and extracts one [`AdRecord`] per
//! distinct library id.

pub mod browser;
pub mod config;
pub mod convergence;
pub mod error;
pub mod extract;
pub mod filter;
pub mod results;
pub mod session;
pub mod snapshot;
pub mod utils;

#[cfg(test)]
mod testing;

// Re-export commonly used types for convenience
pub use browser::WebDriverLauncher;
pub use config::ScraperConfig;
pub use error::{Result, ScrapeError};
pub use results::{AdRecord, ScrapeReport};
pub use session::ScrapeSession;

/// Scrape up to `max_results` ads for `keyword` through a WebDriver browser
pub async fn scrape(keyword: &str, max_results: usize, config: ScraperConfig) -> Result<Vec<AdRecord>> {
    let launcher = WebDriverLauncher::new(&config);
    let session = ScrapeSession::new(launcher, config)
        .map_err(|e| ScrapeError::InvalidArgument(e.to_string()))?;
    session.execute(keyword, max_results).await
}
