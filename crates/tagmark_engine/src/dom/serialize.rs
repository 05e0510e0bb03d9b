use super::{Document, NodeId, NodeKind};

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "basefont", "bgsound", "br", "col", "embed", "frame", "hr", "img", "input",
    "keygen", "link", "meta", "param", "source", "track", "wbr",
];

// Same set html5ever writes unescaped; `noscript` is raw because pages parse with scripting on.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "style", "script", "xmp", "iframe", "noembed", "noframes", "plaintext", "noscript",
];

pub(super) fn document_html(doc: &Document) -> String {
    let mut out = String::new();
    if let Some(name) = doc.doctype() {
        out.push_str("<!DOCTYPE ");
        out.push_str(name);
        out.push('>');
    }
    for child in doc.children(doc.root()) {
        write_node(doc, *child, false, &mut out);
    }
    out
}

pub(super) fn node_html(doc: &Document, id: NodeId) -> String {
    let mut out = String::new();
    write_node(doc, id, false, &mut out);
    out
}

fn write_node(doc: &Document, id: NodeId, raw_text: bool, out: &mut String) {
    match doc.kind(id) {
        NodeKind::Document => {
            for child in doc.children(id) {
                write_node(doc, *child, false, out);
            }
        }
        NodeKind::Text(text) if raw_text => out.push_str(text),
        NodeKind::Text(text) => escape_into(text, false, out),
        NodeKind::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeKind::Element(el) => {
            out.push('<');
            out.push_str(el.name());
            for (name, value) in el.attrs() {
                out.push(' ');
                out.push_str(name);
                out.push_str("=\"");
                escape_into(value, true, out);
                out.push('"');
            }
            out.push('>');
            if VOID_ELEMENTS.contains(&el.name()) {
                return;
            }
            let raw = RAW_TEXT_ELEMENTS.contains(&el.name());
            for child in doc.children(id) {
                write_node(doc, *child, raw, out);
            }
            out.push_str("</");
            out.push_str(el.name());
            out.push('>');
        }
    }
}

fn escape_into(text: &str, attribute: bool, out: &mut String) {
    for ch in text.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' if !attribute => out.push_str("&lt;"),
            '>' if !attribute => out.push_str("&gt;"),
            '"' if attribute => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(ch),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::Document;
    use pretty_assertions::assert_eq;
    use scraper::Html;

    #[test]
    fn raw_text_elements_match_scraper_output() {
        for html in [
            "<iframe><b>x</b></iframe>",
            "<xmp>a < b & c</xmp>",
            "<noembed><i>n</i></noembed>",
            "<noframes><p>f</p></noframes>",
            "<noscript><img src=x></noscript>",
            "<script>if (a < b) {}</script>",
        ] {
            let page = format!("<html><head></head><body>{html}</body></html>");
            assert_eq!(
                Document::parse(&page).to_html(),
                Html::parse_document(&page).html(),
                "{html}"
            );
        }
    }

    #[test]
    fn plain_text_is_still_escaped() {
        let doc = Document::parse("<p>a &lt; b &amp; c</p>");
        let p = doc.first_element_named(doc.root(), "p").unwrap();
        assert_eq!(doc.outer_html(p), "<p>a &lt; b &amp; c</p>");
    }
}
