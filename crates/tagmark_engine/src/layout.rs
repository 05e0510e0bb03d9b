use crate::config::MinSize;
use crate::dom::{Document, NodeId};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn covers(&self, min: MinSize) -> bool {
        self.width >= min.width && self.height >= min.height
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Positioning {
    #[default]
    Static,
    Relative,
    Absolute,
    Fixed,
    Sticky,
}

/// Source of rendered geometry. Annotators never assume a layout engine is
/// present; a probe that knows nothing returns `None` and the size-based
/// container strategies simply do not match.
pub trait LayoutProbe: Send + Sync {
    fn size(&self, doc: &Document, id: NodeId) -> Option<Size>;
    fn positioning(&self, doc: &Document, id: NodeId) -> Positioning;
}

/// Reads geometry from inline `width`/`height`/`position` style declarations,
/// falling back to `width`/`height` attributes.
#[derive(Debug, Default, Clone, Copy)]
pub struct InlineStyleLayout;

impl LayoutProbe for InlineStyleLayout {
    fn size(&self, doc: &Document, id: NodeId) -> Option<Size> {
        let width = dimension(doc, id, "width")?;
        let height = dimension(doc, id, "height")?;
        Some(Size { width, height })
    }

    fn positioning(&self, doc: &Document, id: NodeId) -> Positioning {
        match doc
            .style(id, "position")
            .map(|v| v.to_ascii_lowercase())
            .as_deref()
        {
            Some("relative") => Positioning::Relative,
            Some("absolute") => Positioning::Absolute,
            Some("fixed") => Positioning::Fixed,
            Some("sticky") => Positioning::Sticky,
            _ => Positioning::Static,
        }
    }
}

fn dimension(doc: &Document, id: NodeId, property: &str) -> Option<f32> {
    if let Some(value) = doc.style(id, property) {
        return parse_px(&value);
    }
    doc.attr(id, property).and_then(parse_px)
}

fn parse_px(raw: &str) -> Option<f32> {
    let trimmed = raw.trim();
    let number = trimmed.strip_suffix("px").unwrap_or(trimmed).trim();
    number.parse::<f32>().ok().filter(|v| v.is_finite() && *v >= 0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_style_then_attributes() {
        let doc = Document::parse(
            r#"<div id="a" style="width: 320px; height: 90px; position: relative"></div><img width="40" height="30">"#,
        );
        let div = doc.first_element_named(doc.root(), "div").unwrap();
        let img = doc.first_element_named(doc.root(), "img").unwrap();
        let probe = InlineStyleLayout;

        assert_eq!(
            probe.size(&doc, div),
            Some(Size {
                width: 320.0,
                height: 90.0
            })
        );
        assert_eq!(probe.positioning(&doc, div), Positioning::Relative);
        assert_eq!(
            probe.size(&doc, img),
            Some(Size {
                width: 40.0,
                height: 30.0
            })
        );
        assert_eq!(probe.positioning(&doc, img), Positioning::Static);
    }

    #[test]
    fn percentages_are_unknown() {
        let doc = Document::parse(r#"<div style="width: 50%; height: 10px"></div>"#);
        let div = doc.first_element_named(doc.root(), "div").unwrap();
        assert_eq!(InlineStyleLayout.size(&doc, div), None);
    }
}
