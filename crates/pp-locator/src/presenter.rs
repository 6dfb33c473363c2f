//! Paginated locator tables and marker focus.

use crate::element_type::element_type_label;
use crate::highlight;
use crate::highlight::HighlightMarker;
use crate::path::ElementPaths;
use crate::registry::LocatorRecord;
use crate::registry::MISSING_ATTRIBUTE;
use crate::registry::element_name;
use crate::treatment;
use core::ops::Range;
use core::ops::RangeInclusive;
use pp_core::LocatorResult;
use pp_dom::Document;
use pp_dom::NodeId;
use pp_dom::escape_attribute;
use pp_dom::escape_text;
use tracing::debug;

pub const PAGE_SIZE: usize = 10;
/// Maximum number of numbered page buttons.
pub const PAGE_WINDOW: usize = 5;

const SELECTION_HEADERS: &[&str] = &["ID", "Name", "Full XPath", "XPath", "CSS Path", "Tag"];
const MATCH_HEADERS: &[&str] = &["#", "ID", "Name", "Full XPath", "XPath", "CSS Path", "Type"];
const DETAIL_HEADERS: &[&str] = &["ID", "Name", "Full XPath", "XPath", "CSS Path", "Type"];

/// Side effects the preview surface should perform after an operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewEffect {
    /// Bring the table's top edge into view.
    ScrollToTableTop,
    /// Scroll the marker to the vertical center of the preview.
    ScrollIntoViewCenter(NodeId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    current_page: usize,
    total_items: usize,
}

impl Pagination {
    pub fn new(total_items: usize) -> Self {
        Self {
            current_page: 1,
            total_items,
        }
    }

    pub fn current_page(&self) -> usize {
        self.current_page
    }

    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Never below one, even with no items.
    pub fn total_pages(&self) -> usize {
        self.total_items.div_ceil(PAGE_SIZE).max(1)
    }

    /// Zero-based item indices shown on the current page.
    pub fn item_range(&self) -> Range<usize> {
        let start = (self.current_page - 1) * PAGE_SIZE;
        let end = (start + PAGE_SIZE).min(self.total_items);
        start.min(end)..end
    }

    /// Numbered buttons to show: up to five pages, centred on the current one
    /// where possible.
    pub fn window(&self) -> RangeInclusive<usize> {
        let total = self.total_pages();
        let length = PAGE_WINDOW.min(total);
        let start = total
            .saturating_sub(PAGE_WINDOW - 1)
            .min(self.current_page.saturating_sub(2))
            .max(1);
        start..=start + length - 1
    }

    pub fn can_change_to(&self, page: usize) -> bool {
        page >= 1 && page <= self.total_pages() && page != self.current_page
    }

    /// Returns whether the page actually changed.
    pub fn change_to(&mut self, page: usize) -> bool {
        if !self.can_change_to(page) {
            return false;
        }
        self.current_page = page;
        true
    }

    pub fn page_of_item(item: usize) -> usize {
        item / PAGE_SIZE + 1
    }

    /// Updates the item count, pulling the current page back into range.
    pub fn set_total_items(&mut self, total_items: usize) {
        self.total_items = total_items;
        self.current_page = self.current_page.clamp(1, self.total_pages());
    }
}

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorRow {
    /// 1-based position in the full row set.
    pub number: usize,
    /// Marker this row was derived from, for search rows.
    pub highlight_index: Option<usize>,
    pub element: NodeId,
    pub element_id: Option<String>,
    pub element_name: Option<String>,
    pub full_xpath: String,
    pub xpath: String,
    pub css_path: String,
    pub tag: String,
    pub match_text: Option<String>,
    pub type_label: String,
}

impl LocatorRow {
    pub fn from_record(number: usize, record: &LocatorRecord) -> Self {
        Self {
            number,
            highlight_index: None,
            element: record.element,
            element_id: record.element_id.clone(),
            element_name: record.element_name.clone(),
            full_xpath: record.full_xpath.clone(),
            xpath: record.xpath.clone(),
            css_path: record.css_path.clone(),
            tag: record.tag.clone(),
            match_text: record.match_text.clone(),
            type_label: record.type_label.clone(),
        }
    }

    /// Row for the element directly containing `marker`.
    pub fn for_marker(doc: &Document, number: usize, marker: &HighlightMarker) -> Option<Self> {
        let element = doc.parent_element(marker.node)?;
        let tag = doc.tag_name(element)?.to_owned();
        let paths = ElementPaths::of(doc, element);
        Some(Self {
            number,
            highlight_index: Some(marker.index),
            element,
            element_id: doc.element_id(element).map(str::to_owned),
            element_name: element_name(doc, element),
            full_xpath: paths.full_xpath,
            xpath: paths.xpath,
            css_path: paths.css_path,
            type_label: element_type_label(&tag),
            tag,
            match_text: Some(marker.text.clone()),
        })
    }

    fn cells(&self, kind: TableKind) -> Vec<String> {
        let id = self.element_id.as_deref().unwrap_or(MISSING_ATTRIBUTE).to_owned();
        let name = self.element_name.as_deref().unwrap_or(MISSING_ATTRIBUTE).to_owned();
        let paths = [
            self.full_xpath.clone(),
            self.xpath.clone(),
            self.css_path.clone(),
        ];
        match kind {
            TableKind::Selections => {
                let mut cells = vec![id, name];
                cells.extend(paths);
                cells.push(self.tag.to_ascii_uppercase());
                cells
            }
            TableKind::Matches => {
                let mut cells = vec![self.number.to_string(), id, name];
                cells.extend(paths);
                cells.push(self.type_label.clone());
                cells
            }
            TableKind::Detail => {
                let mut cells = vec![id, name];
                cells.extend(paths);
                cells.push(self.type_label.clone());
                cells
            }
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableKind {
    /// Click-mode registry.
    Selections,
    /// Every search match, one row per marker.
    Matches,
    /// Single row for one clicked marker.
    Detail,
}

impl TableKind {
    pub fn headers(self) -> &'static [&'static str] {
        match self {
            Self::Selections => SELECTION_HEADERS,
            Self::Matches => MATCH_HEADERS,
            Self::Detail => DETAIL_HEADERS,
        }
    }

    fn noun(self) -> &'static str {
        match self {
            Self::Selections => "locators",
            Self::Matches | Self::Detail => "matches",
        }
    }

    fn empty_message(self) -> &'static str {
        match self {
            Self::Selections => "No locators selected.",
            Self::Matches | Self::Detail => "No matches found to display.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageButton {
    pub page: usize,
    pub active: bool,
}

/// Pagination controls. `previous`/`next` are `None` when disabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pager {
    pub current_page: usize,
    pub total_pages: usize,
    pub previous: Option<usize>,
    pub next: Option<usize>,
    pub pages: Vec<PageButton>,
}

/// A single rendered page of the result view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedTable {
    pub kind: TableKind,
    /// `Showing a-b of n ...`, or the detail caption.
    pub info: Option<String>,
    pub rows: Vec<LocatorRow>,
    pub pager: Option<Pager>,
    /// Set instead of everything else when there is nothing to show.
    pub empty_message: Option<&'static str>,
}

impl RenderedTable {
    pub fn headers(&self) -> &'static [&'static str] {
        self.kind.headers()
    }

    pub fn is_empty(&self) -> bool {
        self.empty_message.is_some()
    }

    pub fn to_html(&self) -> String {
        if let Some(message) = self.empty_message {
            return match self.kind {
                TableKind::Selections => format!("<div>{message}</div>"),
                TableKind::Matches | TableKind::Detail => format!("<p>{message}</p>"),
            };
        }

        let mut out = String::new();
        if let Some(info) = &self.info {
            match (self.kind, self.rows.first().and_then(|row| row.match_text.as_deref())) {
                (TableKind::Detail, Some(text)) => {
                    out.push_str(&format!(
                        "<div class=\"pagination-info\">Locator info for selected match: <strong>{}</strong></div>",
                        escape_text(text)
                    ));
                }
                _ => {
                    out.push_str(&format!(
                        "<div class=\"pagination-info\">{}</div>",
                        escape_text(info)
                    ));
                }
            }
        }

        out.push_str("<table class=\"locator-table\"><thead><tr>");
        for header in self.headers() {
            out.push_str(&format!("<th>{}</th>", escape_text(header)));
        }
        out.push_str("</tr></thead><tbody>");

        for row in &self.rows {
            match row.highlight_index {
                Some(index) if self.kind == TableKind::Matches => {
                    out.push_str(&format!("<tr data-highlight-id=\"{index}\">"));
                }
                _ => out.push_str("<tr>"),
            }
            for (column, cell) in row.cells(self.kind).iter().enumerate() {
                if is_path_column(self.kind, column) {
                    out.push_str(&format!("<td><code>{}</code></td>", escape_text(cell)));
                } else {
                    out.push_str(&format!("<td>{}</td>", escape_text(cell)));
                }
            }
            out.push_str("</tr>");
        }
        out.push_str("</tbody></table>");

        if let Some(pager) = &self.pager {
            out.push_str("<div class=\"pagination-container\"><div class=\"pagination-buttons\">");
            push_step_button(&mut out, "Previous", pager.previous);
            for button in &pager.pages {
                let class = if button.active { "page-btn active" } else { "page-btn" };
                out.push_str(&format!(
                    "<button class=\"{}\" data-page=\"{}\">{}</button>",
                    escape_attribute(class),
                    button.page,
                    button.page
                ));
            }
            push_step_button(&mut out, "Next", pager.next);
            out.push_str("</div></div>");
        }

        out
    }

    /// Column-aligned plain text for terminals.
    pub fn to_text(&self) -> String {
        if let Some(message) = self.empty_message {
            return format!("{message}\n");
        }

        let mut out = String::new();
        if let Some(info) = &self.info {
            out.push_str(info);
            out.push('\n');
        }

        let headers = self.headers();
        let body = self
            .rows
            .iter()
            .map(|row| row.cells(self.kind))
            .collect::<Vec<_>>();
        let widths = headers
            .iter()
            .enumerate()
            .map(|(column, header)| {
                body.iter()
                    .filter_map(|cells| cells.get(column))
                    .map(|cell| cell.chars().count())
                    .chain([header.chars().count()])
                    .max()
                    .unwrap_or_default()
            })
            .collect::<Vec<_>>();

        push_text_line(&mut out, headers.iter().copied(), &widths);
        let rule = widths
            .iter()
            .map(|width| "-".repeat(*width))
            .collect::<Vec<_>>();
        push_text_line(&mut out, rule.iter().map(String::as_str), &widths);
        for cells in &body {
            push_text_line(&mut out, cells.iter().map(String::as_str), &widths);
        }

        if let Some(pager) = &self.pager {
            let mut controls = vec![
                match pager.previous {
                    Some(_) => "< Previous",
                    None => "(Previous)",
                }
                .to_owned(),
            ];
            controls.extend(pager.pages.iter().map(|button| {
                if button.active {
                    format!("[{}]", button.page)
                } else {
                    button.page.to_string()
                }
            }));
            controls.push(
                match pager.next {
                    Some(_) => "Next >",
                    None => "(Next)",
                }
                .to_owned(),
            );
            out.push_str(&controls.join("  "));
            out.push('\n');
        }

        out
    }
}

fn is_path_column(kind: TableKind, column: usize) -> bool {
    let first_path = match kind {
        TableKind::Matches => 3,
        TableKind::Selections | TableKind::Detail => 2,
    };
    (first_path..first_path + 3).contains(&column)
}

fn push_step_button(out: &mut String, label: &str, target: Option<usize>) {
    match target {
        Some(page) => {
            out.push_str(&format!(
                "<button class=\"page-btn\" data-page=\"{page}\">{label}</button>"
            ));
        }
        None => {
            out.push_str(&format!(
                "<button class=\"page-btn disabled\" disabled>{label}</button>"
            ));
        }
    }
}

fn push_text_line<'a>(out: &mut String, cells: impl Iterator<Item = &'a str>, widths: &[usize]) {
    let line = cells
        .zip(widths)
        .map(|(cell, width)| format!("{cell:<width$}"))
        .collect::<Vec<_>>()
        .join(" | ");
    out.push_str(line.trim_end());
    out.push('\n');
}

/// Holds the current row set and page, and renders one page at a time.
#[derive(Debug, Clone)]
pub struct ResultPresenter {
    kind: TableKind,
    rows: Vec<LocatorRow>,
    pagination: Pagination,
}

impl Default for ResultPresenter {
    fn default() -> Self {
        Self::new()
    }
}

impl ResultPresenter {
    pub fn new() -> Self {
        Self {
            kind: TableKind::Selections,
            rows: Vec::new(),
            pagination: Pagination::new(0),
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    pub fn rows(&self) -> &[LocatorRow] {
        &self.rows
    }

    pub fn pagination(&self) -> Pagination {
        self.pagination
    }

    /// Shows the click-mode registry; the current page survives if still valid.
    pub fn show_selections(&mut self, records: &[LocatorRecord]) {
        let rows = records
            .iter()
            .enumerate()
            .map(|(position, record)| LocatorRow::from_record(position + 1, record))
            .collect::<Vec<_>>();
        if self.kind != TableKind::Selections {
            self.pagination = Pagination::new(0);
        }
        self.kind = TableKind::Selections;
        self.pagination.set_total_items(rows.len());
        self.rows = rows;
    }

    /// Replaces the view with a fresh match set, starting at page one.
    pub fn show_matches(&mut self, rows: Vec<LocatorRow>) {
        self.kind = TableKind::Matches;
        self.pagination = Pagination::new(rows.len());
        self.rows = rows;
    }

    /// Single-row view describing one clicked marker.
    pub fn show_detail(&mut self, row: LocatorRow) -> ViewEffect {
        self.kind = TableKind::Detail;
        self.pagination = Pagination::new(1);
        self.rows = vec![row];
        ViewEffect::ScrollToTableTop
    }

    /// Rejected (returns `None`) when out of range or already current.
    pub fn change_page(&mut self, page: usize) -> Option<ViewEffect> {
        if !self.pagination.change_to(page) {
            debug!(
                page,
                current = self.pagination.current_page(),
                total = self.pagination.total_pages(),
                "page change rejected"
            );
            return None;
        }
        Some(ViewEffect::ScrollToTableTop)
    }

    /// Moves to the page holding the row for highlight `index`.
    pub fn show_page_of_highlight(&mut self, index: usize) -> Option<ViewEffect> {
        if self.kind != TableKind::Matches {
            return None;
        }
        let position = self
            .rows
            .iter()
            .position(|row| row.highlight_index == Some(index))?;
        self.change_page(Pagination::page_of_item(position))
    }

    pub fn render(&self) -> RenderedTable {
        if self.rows.is_empty() {
            return RenderedTable {
                kind: self.kind,
                info: None,
                rows: Vec::new(),
                pager: None,
                empty_message: Some(self.kind.empty_message()),
            };
        }

        if self.kind == TableKind::Detail {
            let caption = self.rows[0].match_text.clone().unwrap_or_default();
            return RenderedTable {
                kind: self.kind,
                info: Some(format!("Locator info for selected match: {caption}")),
                rows: self.rows.clone(),
                pager: None,
                empty_message: None,
            };
        }

        let range = self.pagination.item_range();
        let current = self.pagination.current_page();
        let total_pages = self.pagination.total_pages();
        let pager = Pager {
            current_page: current,
            total_pages,
            previous: (current > 1).then(|| current - 1),
            next: (current < total_pages).then(|| current + 1),
            pages: self
                .pagination
                .window()
                .map(|page| PageButton {
                    page,
                    active: page == current,
                })
                .collect(),
        };

        RenderedTable {
            kind: self.kind,
            info: Some(format!(
                "Showing {}-{} of {} {}",
                range.start + 1,
                range.end,
                self.rows.len(),
                self.kind.noun()
            )),
            rows: self.rows[range].to_vec(),
            pager: Some(pager),
            empty_message: None,
        }
    }
}

/// Resets every marker under `root` to neutral, then emphasizes marker `index`.
/// Nothing changes when no marker carries that index.
pub fn focus_marker(
    doc: &mut Document,
    root: NodeId,
    index: usize,
) -> LocatorResult<Option<ViewEffect>> {
    let Some(target) = highlight::find_marker(doc, root, index) else {
        return Ok(None);
    };

    for marker in highlight::markers_in(doc, root) {
        treatment::apply_neutral_marker(doc, marker)?;
    }
    treatment::apply_active(doc, target)?;
    Ok(Some(ViewEffect::ScrollIntoViewCenter(target)))
}

#[cfg(test)]
mod tests {
    use super::LocatorRow;
    use super::Pagination;
    use super::ResultPresenter;
    use super::TableKind;
    use super::ViewEffect;
    use super::focus_marker;
    use crate::highlight::TextMatchWalker;
    use crate::highlight::find_marker;
    use crate::highlight::markers_in;
    use crate::treatment;
    use pp_dom::Document;
    use pp_dom::NodeId;
    use pp_html::HtmlParser;

    fn row(number: usize) -> LocatorRow {
        LocatorRow {
            number,
            highlight_index: Some(number),
            element: Document::new().root(),
            element_id: None,
            element_name: Some(format!("field{number}")),
            full_xpath: format!("/html[1]/body[1]/p[{number}]"),
            xpath: format!("//html[1]/body[1]/p[{number}]"),
            css_path: format!("html > body > p:nth-of-type({number})"),
            tag: "p".to_owned(),
            match_text: Some("foo".to_owned()),
            type_label: "Text <p>".to_owned(),
        }
    }

    fn presenter_with(count: usize) -> ResultPresenter {
        let mut presenter = ResultPresenter::new();
        presenter.show_matches((1..=count).map(row).collect());
        presenter
    }

    fn numbers(presenter: &ResultPresenter) -> Vec<usize> {
        presenter.render().rows.iter().map(|row| row.number).collect()
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let mut presenter = presenter_with(23);
        assert_eq!(presenter.pagination().total_pages(), 3);

        let before = presenter.render();
        assert_eq!(presenter.change_page(0), None);
        assert_eq!(presenter.change_page(4), None);
        assert_eq!(presenter.change_page(1), None);
        assert_eq!(presenter.render(), before);

        assert_eq!(presenter.change_page(2), Some(ViewEffect::ScrollToTableTop));
        assert_eq!(numbers(&presenter), (11..=20).collect::<Vec<_>>());
        assert_eq!(
            presenter.render().info.as_deref(),
            Some("Showing 11-20 of 23 matches")
        );

        assert!(presenter.change_page(3).is_some());
        assert_eq!(numbers(&presenter), vec![21, 22, 23]);
    }

    #[test]
    fn current_page_stays_in_bounds() {
        let mut pagination = Pagination::new(0);
        assert_eq!(pagination.total_pages(), 1);
        assert_eq!(pagination.item_range(), 0..0);

        pagination.set_total_items(35);
        assert!(pagination.change_to(4));
        pagination.set_total_items(12);
        assert_eq!(pagination.current_page(), 2);
        pagination.set_total_items(0);
        assert_eq!(pagination.current_page(), 1);
    }

    #[test]
    fn page_window_slides_with_current_page() {
        let mut pagination = Pagination::new(95);
        assert_eq!(pagination.window(), 1..=5);
        assert!(pagination.change_to(6));
        assert_eq!(pagination.window(), 4..=8);
        assert!(pagination.change_to(10));
        assert_eq!(pagination.window(), 6..=10);

        let mut short = Pagination::new(23);
        assert!(short.change_to(3));
        assert_eq!(short.window(), 1..=3);
    }

    #[test]
    fn pager_disables_steps_at_the_ends() {
        let mut presenter = presenter_with(23);
        let first = presenter.render().pager.unwrap_or_else(|| unreachable!());
        assert_eq!(first.previous, None);
        assert_eq!(first.next, Some(2));
        assert!(first.pages[0].active);

        assert!(presenter.change_page(3).is_some());
        let last = presenter.render().pager.unwrap_or_else(|| unreachable!());
        assert_eq!(last.previous, Some(2));
        assert_eq!(last.next, None);
        assert!(last.pages[2].active);
    }

    #[test]
    fn empty_views_render_messages() {
        let mut presenter = ResultPresenter::new();
        assert_eq!(presenter.render().to_html(), "<div>No locators selected.</div>");
        presenter.show_matches(Vec::new());
        assert_eq!(presenter.render().to_html(), "<p>No matches found to display.</p>");
        assert_eq!(presenter.render().to_text(), "No matches found to display.\n");
    }

    #[test]
    fn html_is_escaped_and_carries_highlight_ids() {
        let mut entry = row(1);
        entry.element_id = Some("a<b".to_owned());
        entry.type_label = "Text <p>".to_owned();
        let mut presenter = ResultPresenter::new();
        presenter.show_matches(vec![entry]);

        let html = presenter.render().to_html();
        assert!(html.contains(
            "<tr data-highlight-id=\"1\"><td>1</td><td>a&lt;b</td><td>field1</td>"
        ));
        assert!(html.contains("<td><code>html &gt; body &gt; p:nth-of-type(1)</code></td>"));
        assert!(html.contains("<td>Text &lt;p&gt;</td>"));
        assert!(html.contains("<button class=\"page-btn disabled\" disabled>Previous</button>"));
        assert!(html.contains("<button class=\"page-btn active\" data-page=\"1\">1</button>"));
    }

    #[test]
    fn text_rendering_aligns_columns() {
        let presenter = presenter_with(2);
        let text = presenter.render().to_text();
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "Showing 1-2 of 2 matches");
        assert!(lines[1].starts_with("# | ID | Name   | Full XPath"));
        assert!(lines[3].starts_with("1 | -  | field1 | /html[1]/body[1]/p[1]"));
        assert_eq!(lines.last().copied(), Some("(Previous)  [1]  (Next)"));
    }

    #[test]
    fn detail_view_has_caption_and_no_pager() {
        let mut presenter = presenter_with(3);
        assert_eq!(presenter.show_detail(row(2)), ViewEffect::ScrollToTableTop);
        let table = presenter.render();
        assert_eq!(table.kind, TableKind::Detail);
        assert_eq!(table.pager, None);
        assert_eq!(table.headers().first().copied(), Some("ID"));
        assert!(
            table
                .to_html()
                .contains("Locator info for selected match: <strong>foo</strong>")
        );
        assert_eq!(presenter.change_page(2), None);
    }

    #[test]
    fn moves_to_page_of_highlight() {
        let mut presenter = presenter_with(23);
        assert_eq!(
            presenter.show_page_of_highlight(15),
            Some(ViewEffect::ScrollToTableTop)
        );
        assert_eq!(presenter.pagination().current_page(), 2);
        assert_eq!(presenter.show_page_of_highlight(12), None);
        assert_eq!(presenter.show_page_of_highlight(99), None);
    }

    fn highlighted(html: &str, query: &str) -> (Document, NodeId) {
        let mut doc = match HtmlParser.parse(html) {
            Ok(doc) => doc,
            Err(error) => panic!("{error}"),
        };
        let body = doc.body().unwrap_or_else(|| unreachable!());
        let walker = TextMatchWalker::new(query).unwrap_or_else(|_| unreachable!());
        assert!(walker.highlight(&mut doc, body).is_ok());
        (doc, body)
    }

    #[test]
    fn focus_emphasizes_only_the_requested_marker() {
        let (mut doc, body) = highlighted("<body><p>foo foo foo</p></body>", "foo");
        assert!(focus_marker(&mut doc, body, 1).is_ok());
        let effect = focus_marker(&mut doc, body, 3);
        let third = find_marker(&doc, body, 3).unwrap_or_else(|| unreachable!());
        assert_eq!(effect.ok().flatten(), Some(ViewEffect::ScrollIntoViewCenter(third)));

        for marker in markers_in(&doc, body) {
            let active = treatment::is_active(&doc, marker);
            assert_eq!(active, marker == third);
            if !active {
                assert_eq!(
                    doc.style_property(marker, "background-color").as_deref(),
                    Some("#ffeb3b")
                );
                assert_eq!(doc.style_property(marker, "outline"), None);
            }
        }
    }

    #[test]
    fn focus_on_unknown_index_changes_nothing() {
        let (mut doc, body) = highlighted("<body><p>foo foo</p></body>", "foo");
        let before = doc.to_html();
        assert!(matches!(focus_marker(&mut doc, body, 9), Ok(None)));
        assert_eq!(doc.to_html(), before);
    }
}
