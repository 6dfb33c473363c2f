//! HTML tokenization and tree building.
//!
//! The builder is forgiving and stops well short of the full HTML5
//! algorithm. It recovers from stray end tags, applies the common implied end
//! tags (`p`, `li`, table cells, ...) and always produces an
//! `html > head + body` skeleton so element paths look the way a browser
//! would report them.

mod tokenizer;

use pp_core::LocatorResult;
use pp_dom::Document;
use pp_dom::NodeId;
use pp_dom::is_void_element;
use tokenizer::Token;
use tracing::debug;

/// Parses raw HTML into a DOM document.
#[derive(Debug, Default)]
pub struct HtmlParser;

impl HtmlParser {
    pub fn parse(&self, input: &str) -> LocatorResult<Document> {
        let tokens = tokenizer::tokenize(input);
        let token_count = tokens.len();
        let mut builder = TreeBuilder::new();
        for token in tokens {
            builder.push(token)?;
        }
        let mut doc = builder.finish();
        ensure_skeleton(&mut doc)?;

        debug!(
            tokens = token_count,
            nodes = doc.node_count(),
            "parsed html document"
        );
        Ok(doc)
    }
}

struct TreeBuilder {
    doc: Document,
    open: Vec<NodeId>,
}

impl TreeBuilder {
    fn new() -> Self {
        let doc = Document::new();
        let root = doc.root();
        Self {
            doc,
            open: vec![root],
        }
    }

    fn current(&self) -> NodeId {
        self.open.last().copied().unwrap_or_else(|| self.doc.root())
    }

    fn current_tag(&self) -> Option<&str> {
        self.doc.tag_name(self.current())
    }

    fn push(&mut self, token: Token) -> LocatorResult<()> {
        match token {
            Token::Text(text) => {
                let node = self.doc.create_text(text);
                self.doc.append_child(self.current(), node)
            }
            Token::Start {
                name,
                attrs,
                self_closing,
            } => {
                self.close_implied_by(&name);
                let element = self.doc.create_element(&name);
                for (attr, value) in &attrs {
                    self.doc.set_attribute(element, attr, value)?;
                }
                self.doc.append_child(self.current(), element)?;
                if !self_closing && !is_void_element(&name) {
                    self.open.push(element);
                }
                Ok(())
            }
            Token::End { name } => {
                self.close(&name);
                Ok(())
            }
        }
    }

    /// Pops up to and including the nearest open `name`; stray end tags are ignored.
    fn close(&mut self, name: &str) {
        let Some(position) = self
            .open
            .iter()
            .rposition(|id| self.doc.tag_name(*id) == Some(name))
        else {
            return;
        };
        self.open.truncate(position);
    }

    fn close_implied_by(&mut self, starting: &str) {
        while let Some(current) = self.current_tag() {
            if !implicitly_closed_by(current, starting) {
                break;
            }
            self.open.pop();
        }
    }

    fn finish(self) -> Document {
        self.doc
    }
}

fn implicitly_closed_by(open: &str, starting: &str) -> bool {
    match open {
        "p" => matches!(
            starting,
            "p" | "div"
                | "ul"
                | "ol"
                | "dl"
                | "table"
                | "form"
                | "pre"
                | "blockquote"
                | "section"
                | "article"
                | "header"
                | "footer"
                | "nav"
                | "aside"
                | "h1"
                | "h2"
                | "h3"
                | "h4"
                | "h5"
                | "h6"
                | "hr"
        ),
        "li" => starting == "li",
        "dt" | "dd" => matches!(starting, "dt" | "dd"),
        "option" => matches!(starting, "option" | "optgroup"),
        "td" | "th" => matches!(starting, "td" | "th" | "tr"),
        "tr" => starting == "tr",
        _ => false,
    }
}

fn is_head_content(doc: &Document, id: NodeId) -> bool {
    doc.tag_name(id).is_some_and(|tag| {
        matches!(
            tag,
            "title" | "meta" | "link" | "base" | "style" | "script" | "noscript"
        )
    })
}

fn is_blank_text(doc: &Document, id: NodeId) -> bool {
    doc.text(id).is_some_and(|text| text.trim().is_empty())
}

/// Guarantees `#document > html > (head, body)`, moving stray content into place.
fn ensure_skeleton(doc: &mut Document) -> LocatorResult<()> {
    let root = doc.root();
    let existing_html = doc
        .children(root)
        .iter()
        .copied()
        .find(|id| doc.tag_name(*id) == Some("html"));
    let html = match existing_html {
        Some(html) => html,
        None => {
            let html = doc.create_element("html");
            let stray = doc.children(root).to_vec();
            doc.append_child(root, html)?;
            for child in stray {
                doc.append_child(html, child)?;
            }
            html
        }
    };

    // Anything else left at the top level belongs inside <html>.
    for child in doc.children(root).to_vec() {
        if child != html && !is_blank_text(doc, child) {
            doc.append_child(html, child)?;
        }
    }

    let existing_head = doc
        .children(html)
        .iter()
        .copied()
        .find(|id| doc.tag_name(*id) == Some("head"));
    let existing_body = doc
        .children(html)
        .iter()
        .copied()
        .find(|id| doc.tag_name(*id) == Some("body"));

    let head = match existing_head {
        Some(head) => head,
        None => doc.create_element("head"),
    };
    let body = match existing_body {
        Some(body) => body,
        None => doc.create_element("body"),
    };

    let strays = doc
        .children(html)
        .iter()
        .copied()
        .filter(|id| *id != head && *id != body)
        .collect::<Vec<_>>();

    let body_position = existing_body
        .and_then(|body| doc.children(html).iter().position(|id| *id == body));
    let mut seen_body_content = false;
    let mut head_moves = Vec::new();
    let mut body_moves = Vec::new();
    for child in strays {
        if is_blank_text(doc, child) {
            continue;
        }
        let before_body = match (body_position, doc.children(html).iter().position(|id| *id == child)) {
            (Some(body), Some(position)) => position < body,
            _ => true,
        };
        if existing_head.is_none() && before_body && !seen_body_content && is_head_content(doc, child)
        {
            head_moves.push(child);
        } else {
            seen_body_content = true;
            body_moves.push(child);
        }
    }

    if existing_head.is_none() {
        doc.append_child(html, head)?;
    }
    if existing_body.is_none() {
        doc.append_child(html, body)?;
    }
    for child in head_moves {
        doc.append_child(head, child)?;
    }
    for child in body_moves {
        doc.append_child(body, child)?;
    }

    // Keep head before body.
    if doc.children(html).iter().position(|id| *id == head)
        > doc.children(html).iter().position(|id| *id == body)
    {
        doc.append_child(html, body)?;
    }

    Ok(())
}
