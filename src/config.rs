use crate::error::ConfigError;
use crate::extract::rules::ExtractionRules;
use crate::filter::AssetFilterConfig;
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration for an ads library scrape
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScraperConfig {
    /// URL for the WebDriver instance
    #[serde(default = "default_webdriver_url")]
    pub webdriver_url: String,

    /// WebDriver URLs tried when the primary one refuses the session
    #[serde(default = "default_fallback_webdriver_urls")]
    pub fallback_webdriver_urls: Vec<String>,

    /// Run the browser without a visible window
    #[serde(default = "default_headless")]
    pub headless: bool,

    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),

    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Interface language requested from the browser
    #[serde(default = "default_locale")]
    pub locale: String,

    /// CSS selector of the cookie consent accept button
    #[serde(default = "default_consent_selector")]
    pub consent_selector: String,

    /// Where a screenshot of the page is saved when a scrape fails
    #[serde(default = "default_error_screenshot")]
    pub error_screenshot: Option<PathBuf>,

    #[serde(default)]
    pub timing: TimingConfig,

    #[serde(default)]
    pub convergence: ConvergenceConfig,

    #[serde(default)]
    pub extraction: ExtractionRules,

    #[serde(default)]
    pub assets: AssetFilterConfig,
}

/// Waits and timeouts, all in milliseconds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimingConfig {
    #[serde(default = "default_navigation_timeout_ms")]
    pub navigation_timeout_ms: u64,

    /// Wait after navigation before touching the page
    #[serde(default = "default_settle_ms")]
    pub settle_ms: u64,

    /// Wait after each scroll step
    #[serde(default = "default_scroll_delay_ms")]
    pub scroll_delay_ms: u64,

    #[serde(default = "default_consent_timeout_ms")]
    pub consent_timeout_ms: u64,
}

/// Stop policy of the incremental loading loop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConvergenceConfig {
    /// Measure the ad count after every this many scrolls
    #[serde(default = "default_measure_every")]
    pub measure_every: u32,

    /// Consecutive measurements without growth before giving up
    #[serde(default = "default_stall_limit")]
    pub stall_limit: u32,

    /// Expected new ads per scroll, sizes the scroll budget
    #[serde(default = "default_ads_per_scroll")]
    pub ads_per_scroll: f64,

    /// Upper bound of the scroll budget
    #[serde(default = "default_max_scrolls")]
    pub max_scrolls: u32,

    /// Vertical distance of one scroll step, in pixels
    #[serde(default = "default_scroll_step_px")]
    pub scroll_step_px: u32,
}

/// Default value for webdriver_url
fn default_webdriver_url() -> String {
    "http://localhost:4444".to_string()
}

fn default_fallback_webdriver_urls() -> Vec<String> {
    vec![
        "http://localhost:9515".to_string(), // ChromeDriver default
        "http://127.0.0.1:4444".to_string(), // Try with IP instead of localhost
    ]
}

fn default_headless() -> bool {
    true
}

fn default_window_size() -> (u32, u32) {
    (1920, 1080)
}

fn default_user_agent() -> String {
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string()
}

fn default_locale() -> String {
    "es-ES".to_string()
}

fn default_consent_selector() -> String {
    r#"button[data-cookiebanner="accept_button"]"#.to_string()
}

fn default_error_screenshot() -> Option<PathBuf> {
    Some(PathBuf::from("error_screenshot.png"))
}

fn default_navigation_timeout_ms() -> u64 {
    60_000
}

fn default_settle_ms() -> u64 {
    12_000
}

fn default_scroll_delay_ms() -> u64 {
    2_000
}

fn default_consent_timeout_ms() -> u64 {
    3_000
}

fn default_measure_every() -> u32 {
    3
}

fn default_stall_limit() -> u32 {
    3
}

fn default_ads_per_scroll() -> f64 {
    2.5
}

fn default_max_scrolls() -> u32 {
    30
}

fn default_scroll_step_px() -> u32 {
    2000
}

impl Default for TimingConfig {
    fn default() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_ms: default_settle_ms(),
            scroll_delay_ms: default_scroll_delay_ms(),
            consent_timeout_ms: default_consent_timeout_ms(),
        }
    }
}

impl TimingConfig {
    /// Timing with every wait set to zero, for scripted sessions
    pub fn immediate() -> Self {
        Self {
            navigation_timeout_ms: default_navigation_timeout_ms(),
            settle_ms: 0,
            scroll_delay_ms: 0,
            consent_timeout_ms: 0,
        }
    }

    pub fn settle(&self) -> Duration {
        Duration::from_millis(self.settle_ms)
    }

    pub fn scroll_delay(&self) -> Duration {
        Duration::from_millis(self.scroll_delay_ms)
    }
}

impl Default for ConvergenceConfig {
    fn default() -> Self {
        Self {
            measure_every: default_measure_every(),
            stall_limit: default_stall_limit(),
            ads_per_scroll: default_ads_per_scroll(),
            max_scrolls: default_max_scrolls(),
            scroll_step_px: default_scroll_step_px(),
        }
    }
}

impl ConvergenceConfig {
    /// Scroll budget for a target: `min(ceil(target / ads_per_scroll), max_scrolls)`
    pub fn scroll_budget(&self, target: usize) -> u32 {
        // Unusable rates fall back to the hard cap
        if !self.ads_per_scroll.is_finite() || self.ads_per_scroll <= 0.0 {
            return self.max_scrolls;
        }
        let estimate = (target as f64 / self.ads_per_scroll).ceil();
        if estimate >= f64::from(self.max_scrolls) {
            self.max_scrolls
        } else {
            estimate as u32
        }
    }
}

impl Default for ScraperConfig {
    fn default() -> Self {
        Self {
            webdriver_url: default_webdriver_url(),
            fallback_webdriver_urls: default_fallback_webdriver_urls(),
            headless: default_headless(),
            window_size: default_window_size(),
            user_agent: default_user_agent(),
            locale: default_locale(),
            consent_selector: default_consent_selector(),
            error_screenshot: default_error_screenshot(),
            timing: TimingConfig::default(),
            convergence: ConvergenceConfig::default(),
            extraction: ExtractionRules::default(),
            assets: AssetFilterConfig::default(),
        }
    }
}

impl ScraperConfig {
    /// Load configuration from a file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let mut file = File::open(path)?;
        let mut contents = String::new();
        file.read_to_string(&mut contents)?;

        Self::from_json(&contents)
    }

    /// Load configuration from a JSON string
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(json)?;
        Ok(config)
    }

    /// Override the WebDriver URL with the `WEBDRIVER_URL` environment variable if set
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(webdriver_url) = std::env::var("WEBDRIVER_URL") {
            if !webdriver_url.is_empty() {
                self.webdriver_url = webdriver_url;
            }
        }
        self
    }
}
