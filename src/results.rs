use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value used when no start date could be recovered
pub const NO_DATE: &str = "N/A";

/// Value used when no advertiser name could be recovered
pub const UNKNOWN_PAGE: &str = "Unknown";

/// One advertisement extracted from the ads library
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdRecord {
    /// 1-based position within the scrape output
    pub sequence: usize,

    /// Advertiser / page display name
    pub page_name: String,

    /// Small avatar image of the advertiser
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,

    /// Library identifier, unique per ad
    pub library_id: String,

    /// Locale-dependent start date text, or "N/A"
    pub start_date: String,

    /// First qualifying body line of the ad
    pub promo_text: String,

    /// Platforms the ad runs on, as named in the listing
    #[serde(default)]
    pub platforms: Vec<String>,

    /// Creative image URLs
    pub image_urls: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub video: Option<AdVideo>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub cta: Option<CallToAction>,
}

/// Video creative attached to an ad
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdVideo {
    pub poster_url: String,
    pub source_url: String,
}

/// Outbound call-to-action block of an ad
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallToAction {
    pub domain: String,
    pub title: String,
    pub subtitle: String,
    pub button_label: String,

    /// Real destination, decoded from the redirect wrapper
    pub destination_url: String,
}

/// Output of a full scrape, as written by the CLI
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScrapeReport {
    pub keyword: String,
    pub total: usize,

    /// Result count printed by the library page itself, if found
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reported_total: Option<u64>,

    pub extracted_at: DateTime<Utc>,
    pub ads: Vec<AdRecord>,
}

impl ScrapeReport {
    /// Create a report stamped with the current time
    pub fn new(keyword: &str, reported_total: Option<u64>, ads: Vec<AdRecord>) -> Self {
        Self {
            keyword: keyword.to_string(),
            total: ads.len(),
            reported_total,
            extracted_at: Utc::now(),
            ads,
        }
    }
}

/// Renumbers records 1..=N in their current order
pub fn renumber(records: &mut [AdRecord]) {
    for (index, record) in records.iter_mut().enumerate() {
        record.sequence = index + 1;
    }
}
