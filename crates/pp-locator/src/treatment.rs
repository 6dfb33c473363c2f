//! Inline-style treatments applied to selected elements and markers.

use pp_core::LocatorResult;
use pp_dom::Document;
use pp_dom::NodeId;

pub const ACTIVE_OUTLINE: &str = "3px solid red";
pub const ACTIVE_BACKGROUND: &str = "#b2fab4";
pub const NEUTRAL_MARKER_BACKGROUND: &str = "#ffeb3b";

/// Red outline on a light green background; used for both click selections
/// and the focused marker.
pub fn apply_active(doc: &mut Document, element: NodeId) -> LocatorResult<()> {
    doc.set_style_property(element, "outline", ACTIVE_OUTLINE)?;
    doc.set_style_property(element, "background-color", ACTIVE_BACKGROUND)
}

pub fn clear(doc: &mut Document, element: NodeId) -> LocatorResult<()> {
    doc.set_style_property(element, "outline", "")?;
    doc.set_style_property(element, "background-color", "")
}

pub fn apply_neutral_marker(doc: &mut Document, marker: NodeId) -> LocatorResult<()> {
    doc.set_style_property(marker, "outline", "")?;
    doc.set_style_property(marker, "background-color", NEUTRAL_MARKER_BACKGROUND)
}

pub fn is_active(doc: &Document, element: NodeId) -> bool {
    doc.style_property(element, "outline").as_deref() == Some(ACTIVE_OUTLINE)
        && doc.style_property(element, "background-color").as_deref() == Some(ACTIVE_BACKGROUND)
}
