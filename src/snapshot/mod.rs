//! Read-only model of a rendered page.
//!
//! A snapshot is a tree of [`ContentNode`]s. Each node carries what the
//! browser would report for the element: its aggregated visible text and
//! the images, video and links found inside it. The extraction code only
//! ever reads these trees, so they can be built from page source
//! ([`html::from_html`]) or assembled by hand in tests.

pub mod html;
pub mod text;

use serde::{Deserialize, Serialize};

/// Image found under a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageRef {
    pub src: String,
    #[serde(default)]
    pub alt: Option<String>,
}

/// Video element found under a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoRef {
    #[serde(default)]
    pub poster: Option<String>,
    #[serde(default)]
    pub src: Option<String>,
}

/// Link found under a node
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,

    /// Non-empty label texts nested in the link, in document order
    #[serde(default)]
    pub labels: Vec<String>,

    /// Text of the element marked `role="button"` inside the link
    #[serde(default)]
    pub button_text: Option<String>,
}

/// One node of a rendered content tree
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentNode {
    /// Aggregated visible text, one rendered line per `\n`
    #[serde(default)]
    pub text: String,

    /// Images inside this node, in document order
    #[serde(default)]
    pub images: Vec<ImageRef>,

    /// First video inside this node
    #[serde(default)]
    pub video: Option<VideoRef>,

    /// Links inside this node, in document order
    #[serde(default)]
    pub links: Vec<LinkRef>,

    #[serde(default)]
    pub children: Vec<ContentNode>,
}

impl ContentNode {
    /// Create a leaf node with the given visible text
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_image(mut self, src: &str, alt: Option<&str>) -> Self {
        self.images.push(ImageRef {
            src: src.to_string(),
            alt: alt.map(str::to_string),
        });
        self
    }

    pub fn with_video(mut self, video: VideoRef) -> Self {
        self.video = Some(video);
        self
    }

    pub fn with_link(mut self, link: LinkRef) -> Self {
        self.links.push(link);
        self
    }

    pub fn with_child(mut self, child: ContentNode) -> Self {
        self.children.push(child);
        self
    }

    /// Number of characters in the visible text
    pub fn text_len(&self) -> usize {
        self.text.chars().count()
    }

    /// Iterates over this node and all of its descendants in pre-order
    pub fn descendants(&self) -> Descendants<'_> {
        Descendants { stack: vec![self] }
    }
}

/// Pre-order iterator over a content tree
pub struct Descendants<'a> {
    stack: Vec<&'a ContentNode>,
}

impl<'a> Iterator for Descendants<'a> {
    type Item = &'a ContentNode;

    fn next(&mut self) -> Option<Self::Item> {
        let node = self.stack.pop()?;
        self.stack.extend(node.children.iter().rev());
        Some(node)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descendants_pre_order() {
        let tree = ContentNode::new("root")
            .with_child(ContentNode::new("a").with_child(ContentNode::new("a1")))
            .with_child(ContentNode::new("b"));

        let order: Vec<&str> = tree.descendants().map(|n| n.text.as_str()).collect();
        assert_eq!(order, vec!["root", "a", "a1", "b"]);
    }

    #[test]
    fn test_text_len_counts_chars() {
        assert_eq!(ContentNode::new("circulación").text_len(), 11);
    }

    #[test]
    fn test_tree_from_json() {
        let tree: ContentNode = serde_json::from_str(
            r#"{"text": "outer", "children": [{"text": "inner", "images": [{"src": "x.jpg"}]}]}"#,
        )
        .unwrap();
        assert_eq!(tree.children.len(), 1);
        assert_eq!(tree.children[0].images[0].alt, None);
    }
}
