use crate::error::ConfigError;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Regex rules that classify the URLs found inside an ad container
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssetFilterConfig {
    /// Image sources served at the fixed advertiser avatar size
    #[serde(default = "default_avatar_patterns")]
    pub avatar_patterns: Vec<String>,

    /// Image sources served from the content delivery network (at least one must match)
    #[serde(default = "default_creative_patterns")]
    pub creative_patterns: Vec<String>,

    /// Image sources that are interface chrome (these take precedence over creative patterns)
    #[serde(default = "default_exclude_patterns")]
    pub exclude_patterns: Vec<String>,

    /// Link targets that wrap an outbound destination
    #[serde(default = "default_redirect_patterns")]
    pub redirect_patterns: Vec<String>,
}

fn default_avatar_patterns() -> Vec<String> {
    vec![r"s60x60".to_string()]
}

fn default_creative_patterns() -> Vec<String> {
    vec![r"scontent".to_string(), r"fbcdn".to_string()]
}

fn default_exclude_patterns() -> Vec<String> {
    vec![
        // Static interface sprites and icons
        r"/rsrc\.php/".to_string(),
        r"\.svg($|\?)".to_string(),
        // Emoji glyphs rendered as images
        r"/images/emoji\.php/".to_string(),
    ]
}

fn default_redirect_patterns() -> Vec<String> {
    vec![r"facebook\.com/l\.php".to_string()]
}

impl Default for AssetFilterConfig {
    fn default() -> Self {
        Self {
            avatar_patterns: default_avatar_patterns(),
            creative_patterns: default_creative_patterns(),
            exclude_patterns: default_exclude_patterns(),
            redirect_patterns: default_redirect_patterns(),
        }
    }
}

/// Classifies image and link URLs using compiled [`AssetFilterConfig`] rules
#[derive(Debug)]
pub struct AssetFilter {
    avatar_regexes: Vec<Regex>,
    creative_regexes: Vec<Regex>,
    exclude_regexes: Vec<Regex>,
    redirect_regexes: Vec<Regex>,
}

impl Default for AssetFilter {
    fn default() -> Self {
        Self::new(&AssetFilterConfig::default()).expect("Default asset patterns should be valid")
    }
}

impl AssetFilter {
    /// Create a new asset filter from configuration
    pub fn new(config: &AssetFilterConfig) -> Result<Self, ConfigError> {
        Ok(Self {
            avatar_regexes: compile_all(&config.avatar_patterns)?,
            creative_regexes: compile_all(&config.creative_patterns)?,
            exclude_regexes: compile_all(&config.exclude_patterns)?,
            redirect_regexes: compile_all(&config.redirect_patterns)?,
        })
    }

    /// Whether an image source is the advertiser's avatar
    pub fn is_avatar(&self, src: &str) -> bool {
        any_match(&self.avatar_regexes, src)
    }

    /// Whether an image source is part of the ad creative
    pub fn is_creative(&self, src: &str) -> bool {
        if src.is_empty() || self.is_avatar(src) {
            return false;
        }

        // Exclusions take precedence
        if any_match(&self.exclude_regexes, src) {
            return false;
        }

        any_match(&self.creative_regexes, src)
    }

    /// Whether a link target is an outbound redirect wrapper
    pub fn is_redirect(&self, href: &str) -> bool {
        any_match(&self.redirect_regexes, href)
    }
}

/// Compiles a list of patterns, reporting the first invalid one
pub(crate) fn compile_all(patterns: &[String]) -> Result<Vec<Regex>, ConfigError> {
    patterns.iter().map(|p| compile(p)).collect()
}

pub(crate) fn compile(pattern: &str) -> Result<Regex, ConfigError> {
    Regex::new(pattern).map_err(|source| ConfigError::Pattern {
        pattern: pattern.to_string(),
        source,
    })
}

fn any_match(regexes: &[Regex], value: &str) -> bool {
    regexes.iter().any(|regex| regex.is_match(value))
}
