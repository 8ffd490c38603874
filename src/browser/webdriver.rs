use crate::error::SessionError;
use crate::session::RenderSession;
use crate::snapshot::ContentNode;
use crate::snapshot::html::from_html;
use async_trait::async_trait;
use fantoccini::{Client, Locator};
use std::time::Duration;
use tokio::time::timeout;

/// A browser tab driven over WebDriver
pub struct WebDriverSession {
    client: Client,
    consent_selector: String,
    scroll_step_px: u32,
}

impl WebDriverSession {
    pub fn new(client: Client, consent_selector: &str, scroll_step_px: u32) -> Self {
        Self {
            client,
            consent_selector: consent_selector.to_string(),
            scroll_step_px,
        }
    }
}

#[async_trait]
impl RenderSession for WebDriverSession {
    async fn navigate(&mut self, url: &str, timeout_ms: u64) -> Result<(), SessionError> {
        let started = std::time::Instant::now();

        match timeout(Duration::from_millis(timeout_ms), self.client.goto(url)).await {
            Ok(Ok(())) => {
                ::log::debug!(
                    "Loaded {} in {:.2} seconds",
                    url,
                    started.elapsed().as_secs_f64()
                );
                Ok(())
            }
            Ok(Err(e)) => Err(SessionError::Navigation {
                url: url.to_string(),
                message: e.to_string(),
            }),
            Err(_) => Err(SessionError::Timeout {
                action: "navigation",
                millis: timeout_ms,
            }),
        }
    }

    async fn current_snapshot(&mut self) -> Result<ContentNode, SessionError> {
        let html = self.client.source().await?;

        // Relative asset and link URLs resolve against the page itself
        let base = match self.client.current_url().await {
            Ok(url) => Some(url),
            Err(e) => {
                ::log::debug!("Could not read current URL: {}", e);
                None
            }
        };

        ::log::trace!("Page source is {} bytes", html.len());
        Ok(from_html(&html, base.as_ref()))
    }

    async fn advance_content(&mut self) -> Result<(), SessionError> {
        self.client
            .execute(
                "window.scrollBy(0, arguments[0]);",
                vec![serde_json::json!(self.scroll_step_px)],
            )
            .await?;
        Ok(())
    }

    async fn dismiss_consent_if_present(&mut self, timeout_ms: u64) -> bool {
        let button = self
            .client
            .wait()
            .at_most(Duration::from_millis(timeout_ms))
            .for_element(Locator::Css(&self.consent_selector))
            .await;

        match button {
            Ok(button) => match button.click().await {
                Ok(()) => true,
                Err(e) => {
                    ::log::debug!("Cookie banner found but not clickable: {}", e);
                    false
                }
            },
            Err(_) => false,
        }
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>, SessionError> {
        Ok(self.client.screenshot().await?)
    }

    async fn close(self: Box<Self>) -> Result<(), SessionError> {
        self.client.close().await?;
        Ok(())
    }
}
