//! One scrape request, from keyword to records.

use crate::config::ScraperConfig;
use crate::convergence::{ConvergenceController, ConvergenceOutcome};
use crate::error::{ConfigError, Result, ScrapeError, SessionError};
use crate::extract::SnapshotParser;
use crate::results::{AdRecord, ScrapeReport};
use crate::snapshot::ContentNode;
use crate::utils::search_url;
use async_trait::async_trait;
use std::collections::HashSet;
use std::time::Duration;

/// A live browser tab the scrape drives
///
/// Implementations are used by one scrape at a time. `close` consumes the
/// session, so it runs at most once.
#[async_trait]
pub trait RenderSession: Send {
    /// Load a URL, failing if it does not finish within `timeout_ms`
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> std::result::Result<(), SessionError>;

    /// Cooperative delay
    async fn wait(&mut self, duration: Duration) {
        if !duration.is_zero() {
            tokio::time::sleep(duration).await;
        }
    }

    /// Current rendered content tree
    async fn current_snapshot(&mut self) -> std::result::Result<ContentNode, SessionError>;

    /// Trigger one unit of lazy loading (one scroll step)
    async fn advance_content(&mut self) -> std::result::Result<(), SessionError>;

    /// Click the cookie consent button if it shows up within `timeout_ms`
    ///
    /// Best effort: returns whether a banner was dismissed, never fails.
    async fn dismiss_consent_if_present(&mut self, timeout_ms: u64) -> bool;

    /// PNG capture of the current viewport
    async fn screenshot(&mut self) -> std::result::Result<Vec<u8>, SessionError>;

    /// Release the session
    async fn close(self: Box<Self>) -> std::result::Result<(), SessionError>;
}

/// Opens rendering sessions
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self) -> std::result::Result<Box<dyn RenderSession>, SessionError>;
}

/// Runs scrapes against a launcher
pub struct ScrapeSession<L> {
    launcher: L,
    parser: SnapshotParser,
    config: ScraperConfig,
}

impl<L: SessionLauncher> ScrapeSession<L> {
    /// Create a scrape session, compiling the extraction rules of `config`
    pub fn new(launcher: L, config: ScraperConfig) -> std::result::Result<Self, ConfigError> {
        let parser = SnapshotParser::new(&config.extraction, &config.assets)?;
        Ok(Self {
            launcher,
            parser,
            config,
        })
    }

    /// Scrapes up to `max_results` ads for `keyword`
    pub async fn execute(&self, keyword: &str, max_results: usize) -> Result<Vec<AdRecord>> {
        Ok(self.run(keyword, max_results).await?.records)
    }

    /// Like [`ScrapeSession::execute`], wrapped in a timestamped report
    pub async fn report(&self, keyword: &str, max_results: usize) -> Result<ScrapeReport> {
        let outcome = self.run(keyword, max_results).await?;
        Ok(ScrapeReport::new(
            keyword.trim(),
            outcome.reported_total,
            outcome.records,
        ))
    }

    async fn run(&self, keyword: &str, max_results: usize) -> Result<ConvergenceOutcome> {
        let keyword = keyword.trim();
        if keyword.is_empty() {
            return Err(ScrapeError::InvalidArgument(
                "a search keyword is required".to_string(),
            ));
        }
        if max_results == 0 {
            return Err(ScrapeError::InvalidArgument(
                "max_results must be at least 1".to_string(),
            ));
        }

        ::log::info!("Scraping ads for '{}', max {}", keyword, max_results);
        let url = search_url(keyword);

        let mut session = self.launcher.launch().await.map_err(|e| {
            ::log::error!("Failed to start browser session: {}", e);
            ScrapeError::from(e)
        })?;

        let mut seen = HashSet::new();
        let controller =
            ConvergenceController::new(&self.parser, &self.config.timing, &self.config.convergence);
        let outcome = controller
            .run(session.as_mut(), &url, max_results, &mut seen)
            .await;

        if outcome.is_err() {
            self.save_error_screenshot(session.as_mut()).await;
        }

        // Released on every path, before any error propagates
        match session.close().await {
            Ok(()) => ::log::debug!("Browser session closed"),
            Err(e) => ::log::warn!("Failed to close browser session: {}", e),
        }

        match outcome {
            Ok(outcome) => {
                ::log::info!(
                    "Scrape for '{}' finished with {} ads ({:?} after {} scrolls)",
                    keyword,
                    outcome.records.len(),
                    outcome.stop_reason,
                    outcome.scrolls
                );
                Ok(outcome)
            }
            Err(e) => {
                ::log::error!("Scrape for '{}' failed: {}", keyword, e);
                Err(e.into())
            }
        }
    }

    /// Best effort: a failed capture or write is only logged
    async fn save_error_screenshot(&self, session: &mut dyn RenderSession) {
        let Some(path) = &self.config.error_screenshot else {
            return;
        };

        match session.screenshot().await {
            Ok(png) => match tokio::fs::write(path, png).await {
                Ok(()) => ::log::info!("Saved error screenshot to {}", path.display()),
                Err(e) => ::log::warn!("Failed to write {}: {}", path.display(), e),
            },
            Err(e) => ::log::warn!("Failed to capture error screenshot: {}", e),
        }
    }
}
