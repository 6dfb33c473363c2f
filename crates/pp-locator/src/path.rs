//! Locator path synthesis for a single element.
//!
//! Three independent paths are derived per element:
//!
//! * full XPath: every level down from the document element, `tag[n]` where
//!   `n` counts same-tag element siblings up to and including the node;
//! * id XPath: the same segments, but stopping at the nearest ancestor that
//!   has an `id`, which contributes `*[@id="..."]`;
//! * CSS path: `tag:nth-of-type(n)` segments (bare `tag` for the first of its
//!   type), stopping at the nearest element with an `id` (`tag#id`).
//!
//! Non-element handles produce empty strings.

use pp_dom::Document;
use pp_dom::NodeId;

/// All three locator paths of one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementPaths {
    pub full_xpath: String,
    pub xpath: String,
    pub css_path: String,
}

impl ElementPaths {
    pub fn of(doc: &Document, element: NodeId) -> Self {
        Self {
            full_xpath: full_xpath(doc, element),
            xpath: id_xpath(doc, element),
            css_path: css_path(doc, element),
        }
    }
}

pub fn full_xpath(doc: &Document, element: NodeId) -> String {
    let mut segments = Vec::new();
    let mut cursor = Some(element).filter(|id| doc.is_element(*id));
    while let Some(current) = cursor {
        segments.push(xpath_segment(doc, current));
        cursor = doc.parent_element(current);
    }

    if segments.is_empty() {
        return String::new();
    }
    segments.reverse();
    format!("/{}", segments.join("/"))
}

pub fn id_xpath(doc: &Document, element: NodeId) -> String {
    if !doc.is_element(element) {
        return String::new();
    }
    if let Some(id) = doc.element_id(element) {
        return format!("//*[@id=\"{id}\"]");
    }

    let mut segments = Vec::new();
    let mut cursor = Some(element);
    while let Some(current) = cursor {
        segments.push(xpath_segment(doc, current));
        cursor = doc.parent_element(current);
        if let Some(id) = cursor.and_then(|ancestor| doc.element_id(ancestor)) {
            segments.push(format!("*[@id=\"{id}\"]"));
            break;
        }
    }

    segments.reverse();
    format!("//{}", segments.join("/"))
}

pub fn css_path(doc: &Document, element: NodeId) -> String {
    let mut selectors = Vec::new();
    let mut cursor = Some(element).filter(|id| doc.is_element(*id));
    while let Some(current) = cursor {
        let tag = doc.tag_name(current).unwrap_or_default();
        if let Some(id) = doc.element_id(current) {
            selectors.push(format!("{tag}#{id}"));
            break;
        }

        match same_tag_position(doc, current) {
            1 => selectors.push(tag.to_owned()),
            nth => selectors.push(format!("{tag}:nth-of-type({nth})")),
        }
        cursor = doc.parent_element(current);
    }

    selectors.reverse();
    selectors.join(" > ")
}

/// Finds the element a CSS path produced by [`css_path`] points at.
///
/// Only the shapes `css_path` emits are understood: `tag`, `tag#id` and
/// `tag:nth-of-type(n)` joined by ` > `. The first segment is either an
/// id anchor or the document element.
pub fn resolve_css_path(doc: &Document, path: &str) -> Option<NodeId> {
    let mut segments = path.split('>').map(str::trim);
    let first = parse_css_segment(segments.next()?)?;

    let mut current = match first {
        CssSegment::Anchor { tag, id } => doc.descendants(doc.root()).find(|node| {
            doc.element_id(*node) == Some(id) && doc.tag_name(*node) == Some(tag)
        })?,
        CssSegment::Positional { tag, nth } => {
            let root_element = doc.document_element()?;
            (nth == 1 && doc.tag_name(root_element) == Some(tag)).then_some(root_element)?
        }
    };

    for segment in segments {
        let CssSegment::Positional { tag, nth } = parse_css_segment(segment)? else {
            return None;
        };
        current = doc
            .children(current)
            .iter()
            .copied()
            .filter(|child| doc.tag_name(*child) == Some(tag))
            .nth(nth.checked_sub(1)?)?;
    }

    Some(current)
}

enum CssSegment<'a> {
    Anchor { tag: &'a str, id: &'a str },
    Positional { tag: &'a str, nth: usize },
}

fn parse_css_segment(segment: &str) -> Option<CssSegment<'_>> {
    if segment.is_empty() {
        return None;
    }
    if let Some((tag, id)) = segment.split_once('#') {
        return Some(CssSegment::Anchor { tag, id });
    }
    match segment.split_once(":nth-of-type(") {
        Some((tag, rest)) => {
            let nth = rest.strip_suffix(')')?.trim().parse().ok()?;
            Some(CssSegment::Positional { tag, nth })
        }
        None => Some(CssSegment::Positional {
            tag: segment,
            nth: 1,
        }),
    }
}

fn xpath_segment(doc: &Document, element: NodeId) -> String {
    let tag = doc.tag_name(element).unwrap_or_default();
    format!("{tag}[{}]", same_tag_position(doc, element))
}

/// 1-based position among element siblings sharing the tag name.
fn same_tag_position(doc: &Document, element: NodeId) -> usize {
    let tag = doc.tag_name(element);
    let earlier = doc
        .preceding_siblings(element)
        .iter()
        .filter(|sibling| doc.is_element(**sibling) && doc.tag_name(**sibling) == tag)
        .count();
    earlier + 1
}

#[cfg(test)]
mod tests {
    use super::ElementPaths;
    use super::css_path;
    use super::full_xpath;
    use super::id_xpath;
    use super::resolve_css_path;
    use pp_dom::Document;
    use pp_dom::NodeId;
    use pp_html::HtmlParser;

    fn parse(input: &str) -> Document {
        match HtmlParser.parse(input) {
            Ok(doc) => doc,
            Err(error) => panic!("{error}"),
        }
    }

    fn elements(doc: &Document, tag: &str) -> Vec<NodeId> {
        doc.descendants(doc.root())
            .filter(|id| doc.tag_name(*id) == Some(tag))
            .collect()
    }

    #[test]
    fn css_path_stops_at_id_anchor() {
        let doc = parse(r#"<div id="x"><span>foo</span><span>foo</span></div>"#);
        let spans = elements(&doc, "span");
        assert_eq!(css_path(&doc, spans[1]), "div#x > span:nth-of-type(2)");
        assert_eq!(css_path(&doc, spans[0]), "div#x > span");
    }

    #[test]
    fn element_with_id_has_short_xpath() {
        let doc = parse(r#"<body><p>a</p><input id="email" name="email"></body>"#);
        let input = elements(&doc, "input")[0];
        assert_eq!(id_xpath(&doc, input), r#"//*[@id="email"]"#);
        assert_eq!(css_path(&doc, input), "input#email");
        assert_eq!(full_xpath(&doc, input), "/html[1]/body[1]/input[1]");
    }

    #[test]
    fn id_xpath_anchors_on_nearest_identified_ancestor() {
        let doc = parse(
            r#"<body><div id="outer"><section><p>a</p><div><p>b</p><p>c</p></div></section></div></body>"#,
        );
        let target = elements(&doc, "p")[2];
        assert_eq!(
            id_xpath(&doc, target),
            r#"//*[@id="outer"]/section[1]/div[1]/p[2]"#
        );
        assert_eq!(
            full_xpath(&doc, target),
            "/html[1]/body[1]/div[1]/section[1]/div[1]/p[2]"
        );
    }

    #[test]
    fn id_xpath_without_any_id_reaches_document_element() {
        let doc = parse("<body><ul><li>a</li><li>b</li></ul></body>");
        let second = elements(&doc, "li")[1];
        assert_eq!(id_xpath(&doc, second), "//html[1]/body[1]/ul[1]/li[2]");
        assert_eq!(css_path(&doc, second), "html > body > ul > li:nth-of-type(2)");
    }

    #[test]
    fn sibling_position_counts_only_same_tag() {
        let doc = parse("<body><p>a</p><div>b</div><p>c</p>text<div>d</div></body>");
        let divs = elements(&doc, "div");
        assert_eq!(full_xpath(&doc, divs[1]), "/html[1]/body[1]/div[2]");
        let paragraphs = elements(&doc, "p");
        assert_eq!(css_path(&doc, paragraphs[1]), "html > body > p:nth-of-type(2)");
    }

    #[test]
    fn full_xpath_segments_match_depth() {
        let doc = parse(
            r#"<body><main id="m"><article><h1>t</h1><p><a name="n" href="/">x</a></p></article></main></body>"#,
        );
        for element in doc.descendants(doc.root()).filter(|id| doc.is_element(*id)) {
            let path = full_xpath(&doc, element);
            assert_eq!(
                path.split('/').skip(1).count(),
                doc.element_depth(element),
                "{path}"
            );
            if let Some(id) = doc.element_id(element) {
                assert_eq!(id_xpath(&doc, element), format!("//*[@id=\"{id}\"]"));
            }
        }
    }

    #[test]
    fn css_path_never_climbs_past_identified_ancestor() {
        let doc = parse(
            r#"<body><div class="wrap"><div id="panel"><ul><li>a</li><li>b</li></ul></div></div></body>"#,
        );
        for element in doc.descendants(doc.root()).filter(|id| doc.is_element(*id)) {
            let path = css_path(&doc, element);
            if path.contains("#panel") {
                assert!(path.starts_with("div#panel"), "{path}");
            }
        }
    }

    #[test]
    fn non_elements_yield_empty_paths() {
        let doc = parse("<body><p>text</p></body>");
        let text = doc
            .descendants(doc.root())
            .find(|id| doc.is_text(*id))
            .unwrap_or_else(|| unreachable!());
        let paths = ElementPaths::of(&doc, text);
        assert!(paths.full_xpath.is_empty());
        assert!(paths.xpath.is_empty());
        assert!(paths.css_path.is_empty());
        assert!(full_xpath(&doc, doc.root()).is_empty());
    }

    #[test]
    fn detached_element_without_id_is_its_own_root() {
        let mut doc = Document::new();
        let orphan = doc.create_element("SPAN");
        assert_eq!(full_xpath(&doc, orphan), "/span[1]");
        assert_eq!(id_xpath(&doc, orphan), "//span[1]");
        assert_eq!(css_path(&doc, orphan), "span");
    }

    #[test]
    fn resolves_generated_css_paths_back_to_elements() {
        let doc = parse(
            r#"<body><div id="x"><span>foo</span><span>foo</span></div><ul><li>a</li><li>b</li></ul></body>"#,
        );
        for element in doc.descendants(doc.root()).filter(|id| doc.is_element(*id)) {
            let path = css_path(&doc, element);
            assert_eq!(resolve_css_path(&doc, &path), Some(element), "{path}");
        }
        assert_eq!(resolve_css_path(&doc, "div#missing > span"), None);
        assert_eq!(resolve_css_path(&doc, "html > body > ul > li:nth-of-type(3)"), None);
        assert_eq!(resolve_css_path(&doc, ""), None);
    }

    #[test]
    fn wide_sibling_lists_index_every_row() {
        let rows = (0..4000)
            .map(|n| format!("<li>row {n}</li><!-- {n} -->"))
            .collect::<String>();
        let doc = parse(&format!("<body><ul id=\"wide\">{rows}<p>tail</p></ul></body>"));
        let items = elements(&doc, "li");
        assert_eq!(items.len(), 4000);

        for (offset, item) in items.iter().enumerate() {
            let paths = ElementPaths::of(&doc, *item);
            assert!(paths.full_xpath.ends_with(&format!("/li[{}]", offset + 1)));
        }
        let last = items[3999];
        assert_eq!(css_path(&doc, last), "ul#wide > li:nth-of-type(4000)");
        assert_eq!(id_xpath(&doc, last), r#"//*[@id="wide"]/li[4000]"#);
        let tail = elements(&doc, "p")[0];
        assert_eq!(css_path(&doc, tail), "ul#wide > p");
    }
}
