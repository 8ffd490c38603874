//! Locale marker tables and the compiled rules the parser runs on.
//!
//! Every phrase the parser looks for lives here as configuration. Supporting
//! another interface language means appending a [`LocaleMarkers`] entry;
//! the extraction code walks the list in order and never names a locale.

use crate::error::ConfigError;
use crate::filter::compile;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Phrases one interface language uses around an ad
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocaleMarkers {
    /// Language tag, informational only
    pub locale: String,

    /// Text of the "view ad details" button
    pub details_marker: String,

    /// Label printed before the library identifier
    pub library_id_marker: String,

    /// Patterns whose first capture group is the start date
    #[serde(default)]
    pub date_patterns: Vec<String>,

    /// Pattern whose first capture group is the page-wide result count
    #[serde(default)]
    pub reported_total_pattern: Option<String>,
}

/// Configuration for container detection and field extraction
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionRules {
    /// Supported interface languages, tried in order
    #[serde(default = "default_locales")]
    pub locales: Vec<LocaleMarkers>,

    /// Lines containing any of these are never taken as the page name
    #[serde(default = "default_name_exclusions")]
    pub name_exclusions: Vec<String>,

    /// Lines containing any of these are never taken as the promo text
    #[serde(default = "default_promo_exclusions")]
    pub promo_exclusions: Vec<String>,

    /// Platform names reported when they appear in a container
    #[serde(default = "default_platforms")]
    pub platforms: Vec<String>,

    /// Containers must be strictly longer than this (characters)
    #[serde(default = "default_min_container_chars")]
    pub min_container_chars: usize,

    /// Containers must be strictly shorter than this (characters)
    #[serde(default = "default_max_container_chars")]
    pub max_container_chars: usize,

    /// Number of leading lines searched for the page name
    #[serde(default = "default_name_scan_lines")]
    pub name_scan_lines: usize,

    /// Inclusive character bounds of a page name line
    #[serde(default = "default_name_min_chars")]
    pub name_min_chars: usize,
    #[serde(default = "default_name_max_chars")]
    pub name_max_chars: usize,

    /// Minimum characters of a promo text line
    #[serde(default = "default_promo_min_chars")]
    pub promo_min_chars: usize,

    #[serde(default = "default_page_name_limit")]
    pub page_name_limit: usize,
    #[serde(default = "default_promo_text_limit")]
    pub promo_text_limit: usize,
    #[serde(default = "default_max_images")]
    pub max_images: usize,
}

fn default_locales() -> Vec<LocaleMarkers> {
    vec![
        LocaleMarkers {
            locale: "es".to_string(),
            details_marker: "Ver detalles del anuncio".to_string(),
            library_id_marker: "Identificador de la biblioteca".to_string(),
            date_patterns: vec![
                r"En circulaci[oó]n desde el (\d{1,2} (?:de )?\w+\.? (?:de )?\d{4})".to_string(),
            ],
            reported_total_pattern: Some(r"(\d[\d.,]*)\s+resultados".to_string()),
        },
        LocaleMarkers {
            locale: "en".to_string(),
            details_marker: "See ad details".to_string(),
            library_id_marker: "Library ID".to_string(),
            date_patterns: vec![
                r"Started running on (\w+\.? \d{1,2}, \d{4})".to_string(),
                r"Started running on (\d{1,2} \w+\.? \d{4})".to_string(),
            ],
            reported_total_pattern: Some(r"(\d[\d.,]*)\s+results".to_string()),
        },
    ]
}

fn phrases(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

fn default_name_exclusions() -> Vec<String> {
    phrases(&[
        "Activo",
        "Inactivo",
        "Identificador",
        "Ver detalles",
        "Active",
        "Inactive",
        "Library ID",
        "See ad details",
    ])
}

fn default_promo_exclusions() -> Vec<String> {
    phrases(&[
        "Identificador",
        "Ver detalles",
        "Plataformas",
        "circulaci",
        "Filtros",
        "Library ID",
        "See ad details",
        "Platforms",
        "Started running",
        "Filters",
    ])
}

fn default_platforms() -> Vec<String> {
    phrases(&["Facebook", "Instagram", "Messenger", "Audience Network"])
}

fn default_min_container_chars() -> usize {
    100
}

fn default_max_container_chars() -> usize {
    2500
}

fn default_name_scan_lines() -> usize {
    5
}

fn default_name_min_chars() -> usize {
    6
}

fn default_name_max_chars() -> usize {
    59
}

fn default_promo_min_chars() -> usize {
    31
}

fn default_page_name_limit() -> usize {
    100
}

fn default_promo_text_limit() -> usize {
    400
}

fn default_max_images() -> usize {
    3
}

impl Default for ExtractionRules {
    fn default() -> Self {
        Self {
            locales: default_locales(),
            name_exclusions: default_name_exclusions(),
            promo_exclusions: default_promo_exclusions(),
            platforms: default_platforms(),
            min_container_chars: default_min_container_chars(),
            max_container_chars: default_max_container_chars(),
            name_scan_lines: default_name_scan_lines(),
            name_min_chars: default_name_min_chars(),
            name_max_chars: default_name_max_chars(),
            promo_min_chars: default_promo_min_chars(),
            page_name_limit: default_page_name_limit(),
            promo_text_limit: default_promo_text_limit(),
            max_images: default_max_images(),
        }
    }
}

/// One locale with its patterns compiled
#[derive(Debug)]
pub(crate) struct CompiledLocale {
    pub locale: String,
    pub details_marker: String,
    pub library_id_marker: String,
    pub library_id: Regex,
    pub dates: Vec<Regex>,
    pub reported_total: Option<Regex>,
}

impl CompiledLocale {
    fn new(markers: &LocaleMarkers) -> Result<Self, ConfigError> {
        // At least 15 digits right after the marker and its separator
        let library_id = compile(&format!(
            r"{}[:\s]+(\d{{15,}})",
            regex::escape(&markers.library_id_marker)
        ))?;

        let dates = markers
            .date_patterns
            .iter()
            .map(|p| compile(p))
            .collect::<Result<Vec<_>, _>>()?;

        let reported_total = markers
            .reported_total_pattern
            .as_deref()
            .map(compile)
            .transpose()?;

        Ok(Self {
            locale: markers.locale.clone(),
            details_marker: markers.details_marker.clone(),
            library_id_marker: markers.library_id_marker.clone(),
            library_id,
            dates,
            reported_total,
        })
    }

    /// Whether the text carries both container markers of this locale
    pub fn marks_container(&self, text: &str) -> bool {
        text.contains(&self.details_marker) && text.contains(&self.library_id_marker)
    }
}

/// Compiles every locale of the rules, in order
pub(crate) fn compile_locales(rules: &ExtractionRules) -> Result<Vec<CompiledLocale>, ConfigError> {
    rules.locales.iter().map(CompiledLocale::new).collect()
}

/// First capture group of the first matching pattern
pub(crate) fn first_capture<'t>(regexes: &[Regex], text: &'t str) -> Option<&'t str> {
    regexes
        .iter()
        .find_map(|regex| regex.captures(text))
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str())
}
