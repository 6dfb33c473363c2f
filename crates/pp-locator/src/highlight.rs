//! Text match highlighting.
//!
//! [`TextMatchWalker`] rewrites every case-insensitive literal occurrence of a
//! query inside text nodes into `<mark data-highlight-id="n">` elements. Each
//! matching text node is replaced in place by the interleaved plain and marked
//! fragments, so sibling order around it is untouched. Text directly under
//! `script` or `style` is never searched.

use pp_core::ErrorKind;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use pp_dom::Document;
use pp_dom::NodeId;
use regex::Regex;
use regex::RegexBuilder;
use tracing::debug;

pub const MARKER_TAG: &str = "mark";
pub const HIGHLIGHT_ID_ATTR: &str = "data-highlight-id";

/// One inserted marker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HighlightMarker {
    /// 1-based, unique within the pass.
    pub index: usize,
    pub node: NodeId,
    pub text: String,
}

/// Outcome of one highlight pass, markers in discovery order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HighlightPass {
    pub markers: Vec<HighlightMarker>,
}

impl HighlightPass {
    pub fn match_count(&self) -> usize {
        self.markers.len()
    }
}

/// Compiled literal query, reusable across documents.
#[derive(Debug, Clone)]
pub struct TextMatchWalker {
    query: String,
    pattern: Option<Regex>,
}

impl TextMatchWalker {
    /// Fails before any tree is touched if the pattern cannot be compiled.
    pub fn new(query: &str) -> LocatorResult<Self> {
        let pattern = if query.is_empty() {
            None
        } else {
            let compiled = RegexBuilder::new(&regex::escape(query))
                .case_insensitive(true)
                .build()
                .map_err(|error| {
                    LocatorError::new(
                        ErrorKind::Pattern,
                        "pattern.compile_failed",
                        format!("failed to compile search pattern for `{query}`: {error}"),
                    )
                })?;
            Some(compiled)
        };

        Ok(Self {
            query: query.to_owned(),
            pattern,
        })
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    /// Highlights every match under `root`. An empty query matches nothing.
    pub fn highlight(&self, doc: &mut Document, root: NodeId) -> LocatorResult<HighlightPass> {
        let mut pass = HighlightPass::default();
        let Some(pattern) = &self.pattern else {
            return Ok(pass);
        };

        walk(doc, root, pattern, &mut pass)?;
        debug!(
            query = %self.query,
            matches = pass.match_count(),
            "highlight pass finished"
        );
        Ok(pass)
    }
}

fn walk(
    doc: &mut Document,
    node: NodeId,
    pattern: &Regex,
    pass: &mut HighlightPass,
) -> LocatorResult<()> {
    if doc.is_text(node) {
        return highlight_text_node(doc, node, pattern, pass);
    }

    // Children get replaced while we iterate; walk a snapshot.
    let children = doc.children(node).to_vec();
    for child in children {
        walk(doc, child, pattern, pass)?;
    }
    Ok(())
}

fn highlight_text_node(
    doc: &mut Document,
    node: NodeId,
    pattern: &Regex,
    pass: &mut HighlightPass,
) -> LocatorResult<()> {
    let Some(parent) = doc.parent(node) else {
        return Ok(());
    };
    if doc
        .tag_name(parent)
        .is_some_and(|tag| matches!(tag, "script" | "style"))
    {
        return Ok(());
    }

    let text = doc.text(node).unwrap_or_default().to_owned();
    let mut fragments = Vec::new();
    let mut last_end = 0_usize;
    for found in pattern.find_iter(&text) {
        if found.start() > last_end {
            fragments.push(doc.create_text(&text[last_end..found.start()]));
        }

        let index = pass.markers.len() + 1;
        let marker = doc.create_element(MARKER_TAG);
        doc.set_attribute(marker, HIGHLIGHT_ID_ATTR, &index.to_string())?;
        let marked_text = doc.create_text(found.as_str());
        doc.append_child(marker, marked_text)?;
        fragments.push(marker);
        pass.markers.push(HighlightMarker {
            index,
            node: marker,
            text: found.as_str().to_owned(),
        });

        last_end = found.end();
    }

    if fragments.is_empty() {
        return Ok(());
    }
    if last_end < text.len() {
        fragments.push(doc.create_text(&text[last_end..]));
    }

    doc.replace_with(node, &fragments)
}

/// Markers under `root` in document order.
pub fn markers_in(doc: &Document, root: NodeId) -> Vec<NodeId> {
    doc.descendants(root)
        .filter(|id| {
            doc.tag_name(*id) == Some(MARKER_TAG) && doc.attribute(*id, HIGHLIGHT_ID_ATTR).is_some()
        })
        .collect()
}

/// Marker carrying highlight index `index`, if still present under `root`.
pub fn find_marker(doc: &Document, root: NodeId, index: usize) -> Option<NodeId> {
    markers_in(doc, root).into_iter().find(|marker| {
        doc.attribute(*marker, HIGHLIGHT_ID_ATTR)
            .and_then(|value| value.trim().parse::<usize>().ok())
            == Some(index)
    })
}

/// Highlight index of `marker`, or `None` for anything that is not a marker.
pub fn marker_index(doc: &Document, marker: NodeId) -> Option<usize> {
    if doc.tag_name(marker) != Some(MARKER_TAG) {
        return None;
    }
    doc.attribute(marker, HIGHLIGHT_ID_ATTR)?.trim().parse().ok()
}
