use crate::snapshot::text::{normalize_visible_text, normalize_whitespace_in_segment};
use crate::snapshot::{ContentNode, ImageRef, LinkRef, VideoRef};
use scraper::{ElementRef, Html, Selector};
use std::sync::LazyLock;
use url::Url;

/// Label blocks nested inside call-to-action links
static LINK_LABEL_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("div._4ik4._4ik5").unwrap());

static BUTTON_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse(r#"[role="button"]"#).unwrap());

static VIDEO_SOURCE_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("source[src]").unwrap());

/// Elements whose content is never rendered as text
const HIDDEN_TAGS: &[&str] = &["head", "script", "style", "noscript", "template", "title"];

/// Elements that start and end their own line when rendered
const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "blockquote",
    "body",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hr",
    "li",
    "main",
    "nav",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tr",
    "ul",
];

/// Elements rendered as cells of a table row
const CELL_TAGS: &[&str] = &["td", "th"];

/// Elements nested deeper than this are folded into their ancestor at this
/// depth: their text, images, video and links still count, but they get no
/// node of their own.
pub const MAX_TREE_DEPTH: usize = 256;

/// Builds a content tree from rendered page source
///
/// Relative image, video and link URLs are resolved against `base` when it
/// is given. Arbitrarily deep markup is walked without recursion.
pub fn from_html(html: &str, base: Option<&Url>) -> ContentNode {
    let doc = Html::parse_document(html);
    let root = build_tree(doc.root_element(), base);

    ::log::trace!(
        "Built content tree with {} nodes",
        root.descendants().count()
    );

    root
}

/// Direct content of an element that takes part in rendering
enum Piece<'a> {
    Text(&'a str),
    Element(ElementRef<'a>),
}

/// An element whose children are still being walked
struct Frame<'a> {
    tag: &'a str,
    node: ContentNode,
    raw: String,
    pending: std::vec::IntoIter<Piece<'a>>,
}

impl<'a> Frame<'a> {
    fn open(element: ElementRef<'a>, base: Option<&Url>) -> Self {
        let tag = element.value().name();
        let mut node = ContentNode::default();
        let mut raw = String::new();

        match tag {
            "img" => {
                if let Some(src) = element.value().attr("src") {
                    node.images.push(ImageRef {
                        src: resolve(base, src),
                        alt: element.value().attr("alt").map(str::to_string),
                    });
                }
            }
            "video" => node.video = Some(video_ref(element, base)),
            "a" => {
                if let Some(href) = element.value().attr("href") {
                    node.links.push(link_ref(element, href, base));
                }
            }
            "br" => raw.push('\n'),
            _ => {}
        }

        let pending = element
            .children()
            .filter_map(|child| {
                if let Some(text) = child.value().as_text() {
                    return Some(Piece::Text(&**text));
                }
                let child_element = ElementRef::wrap(child)?;
                if HIDDEN_TAGS.contains(&child_element.value().name()) {
                    None
                } else {
                    Some(Piece::Element(child_element))
                }
            })
            .collect::<Vec<_>>()
            .into_iter();

        Self {
            tag,
            node,
            raw,
            pending,
        }
    }

    /// Seals the node, returning it with the raw text it contributes upwards
    fn finish(self) -> (ContentNode, String) {
        let Frame {
            tag,
            mut node,
            mut raw,
            ..
        } = self;

        node.text = normalize_visible_text(&raw);

        if BLOCK_TAGS.contains(&tag) {
            raw.insert(0, '\n');
            raw.push('\n');
        } else if CELL_TAGS.contains(&tag) {
            raw.push('\t');
        }

        (node, raw)
    }

    /// Aggregates a finished child; a folded child leaves no node behind
    fn adopt(&mut self, child: ContentNode, child_raw: String, fold: bool) {
        self.node.images.extend(child.images.iter().cloned());
        if self.node.video.is_none() {
            self.node.video = child.video.clone();
        }
        self.node.links.extend(child.links.iter().cloned());
        self.raw.push_str(&child_raw);

        if !fold {
            self.node.children.push(child);
        }
    }
}

fn build_tree(root: ElementRef<'_>, base: Option<&Url>) -> ContentNode {
    let mut stack = vec![Frame::open(root, base)];

    loop {
        let Some(frame) = stack.last_mut() else {
            return ContentNode::default();
        };

        match frame.pending.next() {
            Some(Piece::Text(text)) => {
                // Source formatting whitespace never produces a rendered line break
                frame.raw.push_str(&collapse_whitespace(text));
            }
            Some(Piece::Element(element)) => stack.push(Frame::open(element, base)),
            None => {
                let depth = stack.len() - 1;
                let (node, raw) = match stack.pop() {
                    Some(finished) => finished.finish(),
                    None => return ContentNode::default(),
                };

                match stack.last_mut() {
                    Some(parent) => parent.adopt(node, raw, depth > MAX_TREE_DEPTH),
                    None => return node,
                }
            }
        }
    }
}

fn video_ref(element: ElementRef<'_>, base: Option<&Url>) -> VideoRef {
    let src = element.value().attr("src").map(str::to_string).or_else(|| {
        element
            .select(&VIDEO_SOURCE_SELECTOR)
            .next()
            .and_then(|source| source.value().attr("src"))
            .map(str::to_string)
    });

    VideoRef {
        poster: element.value().attr("poster").map(|p| resolve(base, p)),
        src: src.map(|s| resolve(base, &s)),
    }
}

fn link_ref(element: ElementRef<'_>, href: &str, base: Option<&Url>) -> LinkRef {
    let labels = element
        .select(&LINK_LABEL_SELECTOR)
        .map(text_content)
        .filter(|label| !label.is_empty())
        .collect();

    let button_text = element.select(&BUTTON_SELECTOR).next().map(text_content);

    LinkRef {
        href: resolve(base, href),
        labels,
        button_text,
    }
}

/// Trimmed text content of an element, whitespace collapsed
fn text_content(element: ElementRef<'_>) -> String {
    normalize_whitespace_in_segment(&element.text().collect::<String>())
}

fn collapse_whitespace(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut in_space = false;
    for c in text.chars() {
        if c.is_whitespace() {
            if !in_space {
                out.push(' ');
            }
            in_space = true;
        } else {
            out.push(c);
            in_space = false;
        }
    }
    out
}

fn resolve(base: Option<&Url>, raw: &str) -> String {
    match base.map(|b| b.join(raw)) {
        Some(Ok(url)) => url.to_string(),
        _ => raw.to_string(),
    }
}
