//! Per-field extractors.
//!
//! Each extractor reads one container and falls back to the field's default
//! when the signal it looks for is missing or malformed.

use crate::extract::rules::{CompiledLocale, ExtractionRules, first_capture};
use crate::filter::AssetFilter;
use crate::results::{AdVideo, CallToAction, NO_DATE, UNKNOWN_PAGE};
use crate::snapshot::ContentNode;
use crate::snapshot::text::contains_any;
use crate::utils::clamp_chars;
use url::Url;

const REDIRECT_HOST: &str = "https://l.facebook.com/";

/// Start date text from the first locale whose date phrase matches
pub(crate) fn start_date(locales: &[CompiledLocale], text: &str) -> String {
    locales
        .iter()
        .find_map(|locale| first_capture(&locale.dates, text))
        .map(str::to_string)
        .unwrap_or_else(|| NO_DATE.to_string())
}

/// Page name and avatar URL
///
/// The avatar image's alt text wins; otherwise the first short leading
/// line that is not interface boilerplate.
pub fn page_name(
    node: &ContentNode,
    lines: &[&str],
    rules: &ExtractionRules,
    assets: &AssetFilter,
) -> (String, Option<String>) {
    let avatar = node.images.iter().find(|image| assets.is_avatar(&image.src));
    let logo_url = avatar.map(|image| image.src.clone());

    let from_alt = avatar
        .and_then(|image| image.alt.as_deref())
        .map(str::trim)
        .filter(|alt| !alt.is_empty());

    let name = from_alt
        .or_else(|| {
            lines
                .iter()
                .take(rules.name_scan_lines)
                .copied()
                .find(|line| {
                    let len = line.chars().count();
                    len >= rules.name_min_chars
                        && len <= rules.name_max_chars
                        && !contains_any(line, &rules.name_exclusions)
                })
        })
        .unwrap_or(UNKNOWN_PAGE);

    (clamp_chars(name, rules.page_name_limit), logo_url)
}

/// First long line that is not interface boilerplate
pub fn promo_text(lines: &[&str], rules: &ExtractionRules) -> String {
    lines
        .iter()
        .find(|line| {
            line.chars().count() >= rules.promo_min_chars
                && !contains_any(line, &rules.promo_exclusions)
        })
        .map(|line| clamp_chars(line, rules.promo_text_limit))
        .unwrap_or_default()
}

/// Platform names mentioned in the container, in configured order
pub fn platforms(text: &str, rules: &ExtractionRules) -> Vec<String> {
    rules
        .platforms
        .iter()
        .filter(|platform| text.contains(platform.as_str()))
        .cloned()
        .collect()
}

/// Creative image URLs, in document order, without repeats
pub fn image_urls(node: &ContentNode, assets: &AssetFilter, max: usize) -> Vec<String> {
    let mut urls: Vec<String> = Vec::new();
    for image in &node.images {
        if urls.len() >= max {
            break;
        }
        if assets.is_creative(&image.src) && !urls.contains(&image.src) {
            urls.push(image.src.clone());
        }
    }
    urls
}

/// Video block; missing attributes become empty strings
pub fn video(node: &ContentNode) -> Option<AdVideo> {
    node.video.as_ref().map(|video| AdVideo {
        poster_url: video.poster.clone().unwrap_or_default(),
        source_url: video.src.clone().unwrap_or_default(),
    })
}

/// Call-to-action block from the first outbound redirect link
pub fn call_to_action(node: &ContentNode, assets: &AssetFilter) -> Option<CallToAction> {
    let link = node.links.iter().find(|link| assets.is_redirect(&link.href))?;
    let label = |index: usize| link.labels.get(index).cloned().unwrap_or_default();

    Some(CallToAction {
        domain: label(0),
        title: label(1),
        subtitle: label(2),
        button_label: link.button_text.clone().unwrap_or_default(),
        destination_url: decode_destination(&link.href),
    })
}

/// Decodes the `u` query parameter of a redirect link
///
/// The parameter is read form-decoded (`+` is a space), then percent-decoded
/// once more, so double-encoded destinations come out fully decoded.
/// Returns an empty string when the parameter is missing or does not decode.
pub fn decode_destination(href: &str) -> String {
    let parsed = Url::parse(href).or_else(|_| {
        // Relative wrapper links from snapshots built without a base URL
        Url::parse(REDIRECT_HOST).and_then(|base| base.join(href))
    });
    let Ok(url) = parsed else {
        return String::new();
    };

    let Some((_, value)) = url.query_pairs().find(|(key, _)| key == "u") else {
        return String::new();
    };

    match urlencoding::decode(&value) {
        Ok(decoded) => decoded.into_owned(),
        Err(e) => {
            ::log::debug!("Could not decode redirect target in {}: {}", href, e);
            String::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::rules::compile_locales;
    use crate::snapshot::{LinkRef, VideoRef};

    #[test]
    fn test_decode_destination() {
        assert_eq!(
            decode_destination(
                "https://l.facebook.com/l.php?u=https%3A%2F%2Fshop.example%2Fsale%3Fid%3D7&h=AT0"
            ),
            "https://shop.example/sale?id=7"
        );

        // Parameter missing
        assert_eq!(
            decode_destination("https://l.facebook.com/l.php?h=AT0"),
            ""
        );

        // No query at all
        assert_eq!(decode_destination("https://l.facebook.com/l.php"), "");

        // Invalid UTF-8 after the second decode
        assert_eq!(
            decode_destination("https://l.facebook.com/l.php?u=%25FF%25FE"),
            ""
        );

        // Relative wrapper link
        assert_eq!(
            decode_destination("/l.php?u=https%3A%2F%2Fa.example%2F"),
            "https://a.example/"
        );
    }

    #[test]
    fn test_decode_destination_plus_is_space() {
        assert_eq!(
            decode_destination("https://l.facebook.com/l.php?u=https%3A%2F%2Fa.example%2F%3Fq%3Da+b&h=1"),
            "https://a.example/?q=a b"
        );
    }

    #[test]
    fn test_decode_destination_double_encoded() {
        assert_eq!(
            decode_destination("https://l.facebook.com/l.php?u=https%3A%2F%2Fa.example%2FJos%25C3%25A9&h=1"),
            "https://a.example/José"
        );
    }

    #[test]
    fn test_decode_ignores_similar_parameter_names() {
        assert_eq!(
            decode_destination("https://l.facebook.com/l.php?uu=nope&u=https%3A%2F%2Fa.example"),
            "https://a.example"
        );
    }

    #[test]
    fn test_start_date_default() {
        let locales = compile_locales(&ExtractionRules::default()).unwrap();
        assert_eq!(start_date(&locales, "nothing here"), "N/A");
        assert_eq!(
            start_date(&locales, "Activo\nEn circulación desde el 3 oct 2024"),
            "3 oct 2024"
        );
    }

    #[test]
    fn test_page_name_from_avatar_alt() {
        let rules = ExtractionRules::default();
        let assets = AssetFilter::default();
        let node = ContentNode::new("Activo").with_image(
            "https://scontent.xx.fbcdn.net/v/logo.jpg?stp=s60x60",
            Some("Bulevar Tienda"),
        );

        let (name, logo) = page_name(&node, &["Activo", "Some other line"], &rules, &assets);
        assert_eq!(name, "Bulevar Tienda");
        assert_eq!(
            logo.as_deref(),
            Some("https://scontent.xx.fbcdn.net/v/logo.jpg?stp=s60x60")
        );
    }

    #[test]
    fn test_page_name_from_lines() {
        let rules = ExtractionRules::default();
        let assets = AssetFilter::default();
        let node = ContentNode::default();

        // Too short, boilerplate, then a valid name
        let lines = ["Hola", "Activo", "Identificador de la biblioteca: 1", "Zapatos Lola"];
        let (name, logo) = page_name(&node, &lines, &rules, &assets);
        assert_eq!(name, "Zapatos Lola");
        assert_eq!(logo, None);
    }

    #[test]
    fn test_page_name_only_scans_leading_lines() {
        let rules = ExtractionRules::default();
        let assets = AssetFilter::default();
        let node = ContentNode::default();

        let lines = ["Activo", "Inactivo", "abc", "de", "Activo", "Late Name Line"];
        let (name, _) = page_name(&node, &lines, &rules, &assets);
        assert_eq!(name, "Unknown");
    }

    #[test]
    fn test_avatar_without_alt_falls_back_to_lines() {
        let rules = ExtractionRules::default();
        let assets = AssetFilter::default();
        let node = ContentNode::default().with_image("https://x.fbcdn.net/p_s60x60.jpg", None);

        let (name, logo) = page_name(&node, &["Tienda Azul"], &rules, &assets);
        assert_eq!(name, "Tienda Azul");
        assert!(logo.is_some());
    }

    #[test]
    fn test_promo_text_skips_boilerplate() {
        let rules = ExtractionRules::default();
        let lines = [
            "Identificador de la biblioteca: 123456789012345",
            "En circulación desde el 5 sept 2024 y sigue activo",
            "short",
            "🔥 Descuentos de temporada en toda la tienda online 🔥",
        ];
        assert_eq!(
            promo_text(&lines, &rules),
            "🔥 Descuentos de temporada en toda la tienda online 🔥"
        );
        assert_eq!(promo_text(&["short"], &rules), "");
    }

    #[test]
    fn test_promo_text_is_clamped() {
        let rules = ExtractionRules::default();
        let long = "x".repeat(1000);
        assert_eq!(promo_text(&[long.as_str()], &rules).chars().count(), 400);
    }

    #[test]
    fn test_image_urls_limit_and_filter() {
        let assets = AssetFilter::default();
        let node = ContentNode::default()
            .with_image("https://scontent.xx.fbcdn.net/logo_s60x60.jpg", Some("Shop"))
            .with_image("https://static.xx.fbcdn.net/rsrc.php/icon.png", None)
            .with_image("https://scontent.xx.fbcdn.net/1.jpg", None)
            .with_image("https://scontent.xx.fbcdn.net/1.jpg", None)
            .with_image("https://scontent.xx.fbcdn.net/2.jpg", None)
            .with_image("https://scontent.xx.fbcdn.net/3.jpg", None)
            .with_image("https://scontent.xx.fbcdn.net/4.jpg", None);

        assert_eq!(
            image_urls(&node, &assets, 3),
            vec![
                "https://scontent.xx.fbcdn.net/1.jpg",
                "https://scontent.xx.fbcdn.net/2.jpg",
                "https://scontent.xx.fbcdn.net/3.jpg",
            ]
        );
    }

    #[test]
    fn test_video_missing_attributes() {
        let node = ContentNode::default().with_video(VideoRef {
            poster: Some("https://x.fbcdn.net/poster.jpg".to_string()),
            src: None,
        });
        assert_eq!(
            video(&node),
            Some(AdVideo {
                poster_url: "https://x.fbcdn.net/poster.jpg".to_string(),
                source_url: String::new(),
            })
        );
        assert_eq!(video(&ContentNode::default()), None);
    }

    #[test]
    fn test_call_to_action_positions() {
        let assets = AssetFilter::default();
        let node = ContentNode::default()
            .with_link(LinkRef {
                href: "https://www.facebook.com/BulevarTienda".to_string(),
                labels: vec!["not a cta".to_string()],
                button_text: None,
            })
            .with_link(LinkRef {
                href: "https://l.facebook.com/l.php?u=https%3A%2F%2Fbulevartienda.com%2F&h=AT1"
                    .to_string(),
                labels: vec!["BULEVARTIENDA.COM".to_string(), "Nueva colección".to_string()],
                button_text: Some("Comprar".to_string()),
            });

        let cta = call_to_action(&node, &assets).unwrap();
        assert_eq!(cta.domain, "BULEVARTIENDA.COM");
        assert_eq!(cta.title, "Nueva colección");
        assert_eq!(cta.subtitle, "");
        assert_eq!(cta.button_label, "Comprar");
        assert_eq!(cta.destination_url, "https://bulevartienda.com/");
    }

    #[test]
    fn test_no_redirect_link_means_no_cta() {
        let assets = AssetFilter::default();
        let node = ContentNode::default().with_link(LinkRef {
            href: "https://www.facebook.com/ads/library/?id=1".to_string(),
            ..LinkRef::default()
        });
        assert_eq!(call_to_action(&node, &assets), None);
    }

    #[test]
    fn test_platforms() {
        let rules = ExtractionRules::default();
        assert_eq!(
            platforms("Plataformas\nInstagram Facebook", &rules),
            vec!["Facebook", "Instagram"]
        );
        assert!(platforms("nothing", &rules).is_empty());
    }
}
