//! HTML serialization for feeding the preview surface.

use crate::Document;
use crate::NodeId;
use crate::NodeKind;

impl Document {
    /// Serializes `id` and its subtree. The document node serializes its children.
    pub fn outer_html(&self, id: NodeId) -> String {
        let mut out = String::new();
        self.write_node(id, false, &mut out);
        out
    }

    pub fn inner_html(&self, id: NodeId) -> String {
        let raw = self.tag_name(id).is_some_and(is_raw_text_tag);
        let mut out = String::new();
        for child in self.children(id) {
            self.write_node(*child, raw, &mut out);
        }
        out
    }

    pub fn to_html(&self) -> String {
        let mut out = String::from("<!DOCTYPE html>");
        out.push_str(&self.outer_html(self.root()));
        out
    }

    fn write_node(&self, id: NodeId, raw_text: bool, out: &mut String) {
        let Some(node) = self.node(id) else {
            return;
        };

        match &node.kind {
            NodeKind::Document => {
                for child in &node.children {
                    self.write_node(*child, false, out);
                }
            }
            NodeKind::Text(text) if raw_text => out.push_str(text),
            NodeKind::Text(text) => out.push_str(&escape_text(text)),
            NodeKind::Element(data) => {
                out.push('<');
                out.push_str(&data.tag);
                for (name, value) in &data.attrs {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    out.push_str(&escape_attribute(value));
                    out.push('"');
                }
                out.push('>');

                if is_void_element(&data.tag) {
                    return;
                }

                let raw = is_raw_text_tag(&data.tag);
                for child in &node.children {
                    self.write_node(*child, raw, out);
                }
                out.push_str("</");
                out.push_str(&data.tag);
                out.push('>');
            }
        }
    }
}

pub fn escape_text(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
    out
}

pub fn escape_attribute(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    for ch in input.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(ch),
        }
    }
    out
}

fn is_raw_text_tag(tag: &str) -> bool {
    matches!(tag, "script" | "style")
}

pub fn is_void_element(tag: &str) -> bool {
    matches!(
        tag,
        "area"
            | "base"
            | "br"
            | "col"
            | "embed"
            | "hr"
            | "img"
            | "input"
            | "link"
            | "meta"
            | "param"
            | "source"
            | "track"
            | "wbr"
    )
}

#[cfg(test)]
mod tests {
    use crate::Document;

    #[test]
    fn serializes_nested_elements_with_escaping() {
        let mut doc = Document::new();
        let div = doc.create_element("div");
        let text = doc.create_text("a < b & c");
        let br = doc.create_element("br");
        let script = doc.create_element("script");
        let code = doc.create_text("if (a < b) {}");
        assert!(doc.set_attribute(div, "title", "say \"hi\"").is_ok());
        assert!(doc.append_child(doc.root(), div).is_ok());
        assert!(doc.append_child(div, text).is_ok());
        assert!(doc.append_child(div, br).is_ok());
        assert!(doc.append_child(div, script).is_ok());
        assert!(doc.append_child(script, code).is_ok());

        assert_eq!(
            doc.outer_html(doc.root()),
            "<div title=\"say &quot;hi&quot;\">a &lt; b &amp; c<br><script>if (a < b) {}</script></div>"
        );
        assert_eq!(doc.inner_html(script), "if (a < b) {}");
        assert!(doc.to_html().starts_with("<!DOCTYPE html><div"));
    }
}
