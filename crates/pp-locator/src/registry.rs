//! Click-selected locator records.
//!
//! The registry's `NodeId -> LocatorId` map is authoritative. The
//! `data-locator-id` attribute and the selected outline on each element are
//! projections of it, written on add and stripped on removal.

use crate::element_type::element_type_label;
use crate::path::ElementPaths;
use crate::treatment;
use core::fmt;
use core::str::FromStr;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use pp_dom::Document;
use pp_dom::NodeId;
use std::collections::HashMap;
use tracing::debug;

pub const LOCATOR_ID_ATTR: &str = "data-locator-id";

/// Rendered in place of a missing `id` or `name` attribute.
pub const MISSING_ATTRIBUTE: &str = "-";

/// Session-unique record identifier. Never reused after removal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LocatorId(u64);

impl LocatorId {
    pub fn value(self) -> u64 {
        self.0
    }
}

impl fmt::Display for LocatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for LocatorId {
    type Err = LocatorError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        raw.trim().parse::<u64>().map(Self).map_err(|error| {
            LocatorError::dom(
                "registry.locator_id_invalid",
                format!("`{raw}` is not a locator id: {error}"),
            )
        })
    }
}

/// Everything captured about one element.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRecord {
    pub id: LocatorId,
    pub element: NodeId,
    pub element_id: Option<String>,
    pub element_name: Option<String>,
    pub full_xpath: String,
    pub xpath: String,
    pub css_path: String,
    /// Lower-cased tag name.
    pub tag: String,
    /// Matched text when the record describes a search hit.
    pub match_text: Option<String>,
    pub type_label: String,
}

impl LocatorRecord {
    /// `None` when `element` is not an element node.
    pub fn capture(doc: &Document, element: NodeId, id: LocatorId) -> Option<Self> {
        let tag = doc.tag_name(element)?.to_owned();
        let paths = ElementPaths::of(doc, element);
        Some(Self {
            id,
            element,
            element_id: doc.element_id(element).map(str::to_owned),
            element_name: element_name(doc, element),
            full_xpath: paths.full_xpath,
            xpath: paths.xpath,
            css_path: paths.css_path,
            type_label: element_type_label(&tag),
            tag,
            match_text: None,
        })
    }

    pub fn element_id_or_sentinel(&self) -> &str {
        self.element_id.as_deref().unwrap_or(MISSING_ATTRIBUTE)
    }

    pub fn element_name_or_sentinel(&self) -> &str {
        self.element_name.as_deref().unwrap_or(MISSING_ATTRIBUTE)
    }
}

/// Ordered set of click selections for the loaded document.
#[derive(Debug)]
pub struct SelectionRegistry {
    records: Vec<LocatorRecord>,
    by_element: HashMap<NodeId, LocatorId>,
    next_id: u64,
}

impl Default for SelectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl SelectionRegistry {
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            by_element: HashMap::new(),
            next_id: 1,
        }
    }

    pub fn records(&self) -> &[LocatorRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, id: LocatorId) -> Option<&LocatorRecord> {
        self.records.iter().find(|record| record.id == id)
    }

    pub fn id_for(&self, element: NodeId) -> Option<LocatorId> {
        self.by_element.get(&element).copied()
    }

    pub fn contains_element(&self, element: NodeId) -> bool {
        self.by_element.contains_key(&element)
    }

    /// Records `element` and marks it selected. Returns `None` when it was
    /// already recorded or is not an element.
    pub fn add_from_click(
        &mut self,
        doc: &mut Document,
        element: NodeId,
    ) -> LocatorResult<Option<LocatorId>> {
        if self.contains_element(element) {
            return Ok(None);
        }

        let id = LocatorId(self.next_id);
        let Some(record) = LocatorRecord::capture(doc, element, id) else {
            return Ok(None);
        };

        doc.set_attribute(element, LOCATOR_ID_ATTR, &id.to_string())?;
        treatment::apply_active(doc, element)?;

        self.next_id += 1;
        self.by_element.insert(element, id);
        debug!(locator = %id, css = %record.css_path, "locator selected");
        self.records.push(record);
        Ok(Some(id))
    }

    /// Unselects `element`. A never-selected element is left untouched.
    pub fn remove_by_element(
        &mut self,
        doc: &mut Document,
        element: NodeId,
    ) -> LocatorResult<Option<LocatorRecord>> {
        match self.id_for(element) {
            Some(id) => self.remove_by_id(doc, id),
            None => Ok(None),
        }
    }

    /// Removes by an id read back from the DOM projection, e.g. `"17"`.
    pub fn remove_by_id_text(
        &mut self,
        doc: &mut Document,
        raw: &str,
    ) -> LocatorResult<Option<LocatorRecord>> {
        let id = raw.parse::<LocatorId>()?;
        self.remove_by_id(doc, id)
    }

    pub fn remove_by_id(
        &mut self,
        doc: &mut Document,
        id: LocatorId,
    ) -> LocatorResult<Option<LocatorRecord>> {
        let Some(position) = self.records.iter().position(|record| record.id == id) else {
            return Ok(None);
        };

        let element = self.records[position].element;
        unproject(doc, element)?;
        self.by_element.remove(&element);
        debug!(locator = %id, "locator removed");
        Ok(Some(self.records.remove(position)))
    }

    /// Empties the registry and strips every projection from `doc`.
    pub fn clear(&mut self, doc: &mut Document) -> LocatorResult<()> {
        for record in &self.records {
            if doc.is_element(record.element) {
                unproject(doc, record.element)?;
            }
        }
        self.forget();
        Ok(())
    }

    /// Empties the registry without touching any tree, for when the document
    /// the records point into has been discarded.
    pub fn forget(&mut self) {
        self.records.clear();
        self.by_element.clear();
    }
}

/// Non-empty `name` attribute.
pub(crate) fn element_name(doc: &Document, element: NodeId) -> Option<String> {
    doc.attribute(element, "name")
        .filter(|name| !name.is_empty())
        .map(str::to_owned)
}

fn unproject(doc: &mut Document, element: NodeId) -> LocatorResult<()> {
    treatment::clear(doc, element)?;
    doc.remove_attribute(element, LOCATOR_ID_ATTR)
}
