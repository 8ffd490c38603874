//! Turns content tree snapshots into ad records.

pub mod fields;
pub mod rules;

#[cfg(test)]
mod tests;

use crate::error::ConfigError;
use crate::filter::{AssetFilter, AssetFilterConfig};
use crate::results::{AdRecord, renumber};
use crate::snapshot::ContentNode;
use crate::snapshot::text::visible_lines;
use rules::{CompiledLocale, ExtractionRules, compile_locales};
use std::collections::HashSet;

/// Heuristic parser for ads library snapshots
///
/// The parser is immutable once built; all per-scrape state lives in the
/// `seen` set handed to [`SnapshotParser::parse`].
#[derive(Debug)]
pub struct SnapshotParser {
    rules: ExtractionRules,
    locales: Vec<CompiledLocale>,
    assets: AssetFilter,
}

impl Default for SnapshotParser {
    fn default() -> Self {
        Self::new(&ExtractionRules::default(), &AssetFilterConfig::default())
            .expect("Default extraction rules should be valid")
    }
}

impl SnapshotParser {
    /// Compile a parser from extraction rules and asset patterns
    pub fn new(rules: &ExtractionRules, assets: &AssetFilterConfig) -> Result<Self, ConfigError> {
        let locales = compile_locales(rules)?;
        ::log::debug!(
            "Extraction rules cover locales: {}",
            locales
                .iter()
                .map(|l| l.locale.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        Ok(Self {
            rules: rules.clone(),
            locales,
            assets: AssetFilter::new(assets)?,
        })
    }

    /// Extracts the ads in a snapshot that are not in `seen` yet
    ///
    /// Every accepted library id is inserted into `seen`. The result keeps
    /// discovery order, holds at most `limit` records and is numbered from 1.
    pub fn parse(
        &self,
        root: &ContentNode,
        seen: &mut HashSet<String>,
        limit: usize,
    ) -> Vec<AdRecord> {
        let mut records = Vec::new();

        for node in root.descendants() {
            let Some(library_id) = self.container_id(node) else {
                continue;
            };

            // Nested nodes of an accepted container repeat its id
            if !seen.insert(library_id.clone()) {
                ::log::trace!("Skipping duplicate container for {}", library_id);
                continue;
            }

            records.push(self.extract(node, library_id));
        }

        ::log::debug!(
            "Snapshot yielded {} new ads ({} ids seen overall)",
            records.len(),
            seen.len()
        );

        records.truncate(limit);
        renumber(&mut records);
        records
    }

    /// Number of distinct ads in a snapshot, without extracting fields
    pub fn count(&self, root: &ContentNode) -> usize {
        root.descendants()
            .filter_map(|node| self.container_id(node))
            .collect::<HashSet<_>>()
            .len()
    }

    /// Result count the library page prints for the whole search
    pub fn reported_total(&self, root: &ContentNode) -> Option<u64> {
        self.locales
            .iter()
            .filter_map(|locale| locale.reported_total.as_ref())
            .find_map(|regex| regex.captures(&root.text))
            .and_then(|captures| captures.get(1))
            .and_then(|m| {
                let digits: String = m.as_str().chars().filter(char::is_ascii_digit).collect();
                digits.parse().ok()
            })
    }

    /// Library id of a node that qualifies as an ad container
    fn container_id(&self, node: &ContentNode) -> Option<String> {
        let len = node.text_len();
        if len <= self.rules.min_container_chars || len >= self.rules.max_container_chars {
            return None;
        }

        self.locales
            .iter()
            .filter(|locale| locale.marks_container(&node.text))
            .find_map(|locale| locale.library_id.captures(&node.text))
            .and_then(|captures| captures.get(1))
            .map(|m| m.as_str().to_string())
    }

    fn extract(&self, node: &ContentNode, library_id: String) -> AdRecord {
        let lines = visible_lines(&node.text);
        let (page_name, logo_url) = fields::page_name(node, &lines, &self.rules, &self.assets);

        let record = AdRecord {
            sequence: 0,
            page_name,
            logo_url,
            library_id,
            start_date: fields::start_date(&self.locales, &node.text),
            promo_text: fields::promo_text(&lines, &self.rules),
            platforms: fields::platforms(&node.text, &self.rules),
            image_urls: fields::image_urls(node, &self.assets, self.rules.max_images),
            video: fields::video(node),
            cta: fields::call_to_action(node, &self.assets),
        };

        ::log::trace!(
            "Extracted ad {} from {} ({} images)",
            record.library_id,
            record.page_name,
            record.image_urls.len()
        );

        record
    }
}
