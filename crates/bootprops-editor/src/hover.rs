//! Hover documentation and navigation targets.

use crate::error::{Result, check_offset};
use crate::outline::{Located, Outline};
use crate::resolve::render;
use crate::types::HoverInfo;
use bootprops_metadata::{PropertyIndex, PropertyMetadata};
use tracing::debug;

/// Documentation of the property under `offset`.
///
/// Hovering a key or its value describes the key's property. Keys that only
/// group other properties (`spring`, `server`) have no documentation and
/// yield `None`.
///
/// # Errors
///
/// Fails if `offset` is not a position in `text`.
pub fn hover(text: &str, offset: usize, index: &dyn PropertyIndex) -> Result<Option<HoverInfo>> {
    check_offset(text, offset)?;
    let outline = Outline::new(text);
    let Some((located, property)) = property_at(&outline, offset, index) else {
        return Ok(None);
    };
    debug!(offset, path = %property.path, "hover");
    Ok(Some(HoverInfo {
        range: located.range,
        path: property.path.clone(),
        html: render_html(property),
    }))
}

/// Setter references of the property under `offset`, for go-to-definition.
///
/// # Errors
///
/// Fails if `offset` is not a position in `text`.
pub fn link_targets(text: &str, offset: usize, index: &dyn PropertyIndex) -> Result<Vec<String>> {
    check_offset(text, offset)?;
    let outline = Outline::new(text);
    Ok(property_at(&outline, offset, index)
        .map(|(_, property)| property.targets.clone())
        .unwrap_or_default())
}

fn property_at<'i>(
    outline: &Outline<'_>,
    offset: usize,
    index: &'i dyn PropertyIndex,
) -> Option<(Located, &'i PropertyMetadata)> {
    let located = outline.locate(offset)?;
    let path = render(&outline.path(located.node).flattened());
    index.find_exact(&path).map(|property| (located, property))
}

fn render_html(property: &PropertyMetadata) -> String {
    let mut html = format!("<html><body><b>{}</b>", escape(&property.path));
    if let Some(ty) = &property.type_name {
        let ty = escape(ty);
        html.push_str(&format!("<br><a href=\"type%2F{ty}\">{ty}</a>"));
    }
    if let Some(default) = property.default_text() {
        html.push_str(&format!("<br><br>Default: <i>{}</i>", escape(&default)));
    }
    if let Some(description) = property.description.as_deref().filter(|d| !d.is_empty()) {
        html.push_str(&format!("<br><br>{}", escape(description)));
    }
    html.push_str("</body></html>");
    html
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
