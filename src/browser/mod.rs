//! WebDriver-backed rendering sessions.

pub mod webdriver;

use crate::config::ScraperConfig;
use crate::error::SessionError;
use crate::session::{RenderSession, SessionLauncher};
use async_trait::async_trait;
use fantoccini::wd::Capabilities;
use fantoccini::{Client, ClientBuilder};
use serde_json::json;
use webdriver::WebDriverSession;

/// Opens browser sessions against a WebDriver server
pub struct WebDriverLauncher {
    webdriver_url: String,
    fallback_urls: Vec<String>,
    headless: bool,
    window_size: (u32, u32),
    user_agent: String,
    locale: String,
    consent_selector: String,
    scroll_step_px: u32,
}

impl WebDriverLauncher {
    pub fn new(config: &ScraperConfig) -> Self {
        Self {
            webdriver_url: config.webdriver_url.clone(),
            fallback_urls: config.fallback_webdriver_urls.clone(),
            headless: config.headless,
            window_size: config.window_size,
            user_agent: config.user_agent.clone(),
            locale: config.locale.clone(),
            consent_selector: config.consent_selector.clone(),
            scroll_step_px: config.convergence.scroll_step_px,
        }
    }

    /// Browser capabilities requested for every session
    pub fn capabilities(&self) -> Capabilities {
        let (width, height) = self.window_size;
        let mut args = vec![
            "--no-sandbox".to_string(),
            "--disable-setuid-sandbox".to_string(),
            format!("--window-size={width},{height}"),
            format!("--lang={}", self.locale),
        ];
        if !self.user_agent.is_empty() {
            args.push(format!("--user-agent={}", self.user_agent));
        }
        if self.headless {
            args.push("--headless=new".to_string());
        }

        let mut caps = Capabilities::new();
        caps.insert(
            "goog:chromeOptions".to_string(),
            json!({
                "args": args,
                "prefs": { "intl.accept_languages": self.locale },
            }),
        );
        caps
    }

    /// Connects to the configured WebDriver server, then to the fallbacks
    async fn connect(&self) -> Result<Client, SessionError> {
        let candidates = std::iter::once(&self.webdriver_url).chain(
            self.fallback_urls
                .iter()
                .filter(|url| **url != self.webdriver_url),
        );

        let mut last_error = String::from("no WebDriver URL configured");
        for (attempt, url) in candidates.enumerate() {
            if attempt > 0 {
                ::log::info!("Trying fallback WebDriver URL: {}", url);
            }

            let mut builder = ClientBuilder::native();
            builder.capabilities(self.capabilities());
            match builder.connect(url).await {
                Ok(client) => {
                    ::log::debug!("Connected to WebDriver at {}", url);
                    return Ok(client);
                }
                Err(e) => {
                    if attempt == 0 {
                        ::log::error!("Failed to connect to WebDriver at {}: {}", url, e);
                    }
                    last_error = format!("{url}: {e}");
                }
            }
        }

        ::log::error!(
            "Make sure a WebDriver server is running or set the WEBDRIVER_URL environment variable"
        );
        Err(SessionError::Connect(last_error))
    }
}

#[async_trait]
impl SessionLauncher for WebDriverLauncher {
    async fn launch(&self) -> Result<Box<dyn RenderSession>, SessionError> {
        let client = self.connect().await?;
        Ok(Box::new(WebDriverSession::new(
            client,
            &self.consent_selector,
            self.scroll_step_px,
        )))
    }
}
