//! The engine's entry points for a UI shell.
//!
//! A session owns the loaded page (both its source text and the live tree),
//! the click-selection registry and the result view. A new page load or a new
//! search replaces all three wholesale. Nothing is committed until the fetch
//! and the highlight pass have both succeeded.

use crate::highlight;
use crate::highlight::TextMatchWalker;
use crate::presenter;
use crate::presenter::LocatorRow;
use crate::presenter::RenderedTable;
use crate::presenter::ResultPresenter;
use crate::presenter::ViewEffect;
use crate::registry::LocatorId;
use crate::registry::LocatorRecord;
use crate::registry::SelectionRegistry;
use pp_core::EngineConfig;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use pp_core::PresentationMode;
use pp_core::StatusMessage;
use pp_dom::Document;
use pp_dom::NodeId;
use pp_html::HtmlParser;
use pp_net::PageFetcher;
use tracing::info;
use tracing::warn;

/// Result of one highlight pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchOutcome {
    pub query: String,
    pub match_count: usize,
    pub table: RenderedTable,
    pub status: StatusMessage,
}

#[derive(Debug)]
struct LoadedPage {
    source: String,
    document: Document,
}

#[derive(Debug)]
pub struct LocatorSession {
    config: EngineConfig,
    parser: HtmlParser,
    page: Option<LoadedPage>,
    registry: SelectionRegistry,
    presenter: ResultPresenter,
    last_query: Option<String>,
}

impl LocatorSession {
    pub fn new(config: EngineConfig) -> Self {
        Self {
            config,
            parser: HtmlParser,
            page: None,
            registry: SelectionRegistry::new(),
            presenter: ResultPresenter::new(),
            last_query: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn presentation_mode(&self) -> PresentationMode {
        self.config.presentation_mode
    }

    pub fn registry(&self) -> &SelectionRegistry {
        &self.registry
    }

    pub fn document(&self) -> Option<&Document> {
        self.page.as_ref().map(|page| &page.document)
    }

    pub fn last_query(&self) -> Option<&str> {
        self.last_query.as_deref()
    }

    /// Serialized live document, highlights and selections included.
    pub fn outer_html(&self) -> Option<String> {
        self.document().map(Document::to_html)
    }

    pub fn current_table(&self) -> RenderedTable {
        self.presenter.render()
    }

    /// Fetches `url` and makes it the loaded page.
    pub fn load_page(&mut self, fetcher: &mut dyn PageFetcher, url: &str) -> LocatorResult<()> {
        let url = url.trim();
        if url.is_empty() {
            return Err(LocatorError::input("input.url_empty", "Please enter a URL."));
        }
        let html = fetcher.fetch(url)?;
        self.load_html(html)?;
        info!(url, "page loaded");
        Ok(())
    }

    pub fn load_html(&mut self, html: impl Into<String>) -> LocatorResult<()> {
        let source = html.into();
        let document = self.parser.parse(&source)?;
        self.commit(source, document);
        self.presenter.show_selections(self.registry.records());
        Ok(())
    }

    /// Fetches `url` and highlights `query` in it, as one step.
    pub fn search_page(
        &mut self,
        fetcher: &mut dyn PageFetcher,
        url: &str,
        query: &str,
    ) -> LocatorResult<SearchOutcome> {
        let (url, query) = (url.trim(), query.trim());
        if url.is_empty() || query.is_empty() {
            return Err(LocatorError::input(
                "input.search_incomplete",
                StatusMessage::missing_search_input().text,
            ));
        }

        let source = fetcher.fetch(url)?;
        self.search_source(source, query)
    }

    /// Highlights `query` in a fresh copy of the loaded page.
    pub fn run_search(&mut self, query: &str) -> LocatorResult<SearchOutcome> {
        let query = query.trim();
        if query.is_empty() {
            return Err(LocatorError::input(
                "input.query_empty",
                "Please enter text to highlight.",
            ));
        }
        let source = self
            .page
            .as_ref()
            .map(|page| page.source.clone())
            .ok_or_else(no_document)?;
        self.search_source(source, query)
    }

    fn search_source(&mut self, source: String, query: &str) -> LocatorResult<SearchOutcome> {
        let walker = TextMatchWalker::new(query)?;
        let mut document = self.parser.parse(&source)?;
        let root = search_root(&document).ok_or_else(no_document)?;
        let pass = walker.highlight(&mut document, root)?;

        let rows = pass
            .markers
            .iter()
            .enumerate()
            .filter_map(|(position, marker)| LocatorRow::for_marker(&document, position + 1, marker))
            .collect::<Vec<_>>();
        let match_count = pass.match_count();

        self.commit(source, document);
        self.presenter.show_matches(rows);
        self.last_query = Some(query.to_owned());

        info!(query, matches = match_count, "search finished");
        let status = if match_count == 0 {
            StatusMessage::no_matches(query)
        } else {
            StatusMessage::highlighted(match_count, query)
        };
        Ok(SearchOutcome {
            query: query.to_owned(),
            match_count,
            table: self.presenter.render(),
            status,
        })
    }

    /// Selects `element`; repeated clicks on a selected element are ignored.
    pub fn on_element_clicked(&mut self, element: NodeId) -> LocatorResult<Option<LocatorId>> {
        let page = self.page.as_mut().ok_or_else(no_document)?;
        let added = self.registry.add_from_click(&mut page.document, element)?;
        if added.is_some() {
            self.presenter.show_selections(self.registry.records());
        }
        Ok(added)
    }

    /// Unselects `element`; unselected elements are left alone.
    pub fn on_element_double_clicked(
        &mut self,
        element: NodeId,
    ) -> LocatorResult<Option<LocatorRecord>> {
        let page = self.page.as_mut().ok_or_else(no_document)?;
        let removed = self.registry.remove_by_element(&mut page.document, element)?;
        if removed.is_some() {
            self.presenter.show_selections(self.registry.records());
        }
        Ok(removed)
    }

    pub fn change_page(&mut self, page: usize) -> Option<ViewEffect> {
        self.presenter.change_page(page)
    }

    /// Emphasizes marker `index` and resets every other marker.
    pub fn focus_match(&mut self, index: usize) -> LocatorResult<Option<ViewEffect>> {
        let page = self.page.as_mut().ok_or_else(no_document)?;
        let Some(root) = search_root(&page.document) else {
            return Ok(None);
        };
        let effect = presenter::focus_marker(&mut page.document, root, index)?;
        if effect.is_none() {
            warn!(index, "no marker carries this highlight index");
        }
        Ok(effect)
    }

    /// A marker was clicked in the preview. What the table does depends on
    /// the configured presentation mode.
    pub fn on_marker_clicked(&mut self, marker: NodeId) -> LocatorResult<Vec<ViewEffect>> {
        let Some(index) = self
            .document()
            .and_then(|document| highlight::marker_index(document, marker))
        else {
            return Ok(Vec::new());
        };

        let mut effects = Vec::new();
        match self.config.presentation_mode {
            PresentationMode::IndexedTable => {
                effects.extend(self.focus_match(index)?);
                effects.extend(self.presenter.show_page_of_highlight(index));
            }
            PresentationMode::DetailRow => {
                // Emphasis without scrolling; the table comes into view instead.
                self.focus_match(index)?;
                let row = self.document().and_then(|document| {
                    let text = document.text_content(marker);
                    let found = highlight::HighlightMarker {
                        index,
                        node: marker,
                        text,
                    };
                    LocatorRow::for_marker(document, 1, &found)
                });
                if let Some(row) = row {
                    effects.push(self.presenter.show_detail(row));
                }
            }
        }
        Ok(effects)
    }

    fn commit(&mut self, source: String, document: Document) {
        // Old node handles point into the discarded tree.
        self.registry.forget();
        self.page = Some(LoadedPage { source, document });
        self.last_query = None;
    }
}

fn search_root(document: &Document) -> Option<NodeId> {
    document.body().or_else(|| document.document_element())
}

fn no_document() -> LocatorError {
    LocatorError::dom("session.no_document", "no page is loaded")
}

#[cfg(test)]
mod tests {
    use super::LocatorSession;
    use crate::highlight::find_marker;
    use crate::highlight::markers_in;
    use crate::path::resolve_css_path;
    use crate::presenter::TableKind;
    use crate::presenter::ViewEffect;
    use crate::registry::LOCATOR_ID_ATTR;
    use crate::treatment;
    use pp_core::EngineConfig;
    use pp_core::LocatorError;
    use pp_core::LocatorResult;
    use pp_core::PresentationMode;
    use pp_core::StatusLevel;
    use pp_dom::Document;
    use pp_dom::NodeId;
    use pp_net::PageFetcher;

    struct StubFetcher {
        pages: Vec<(&'static str, &'static str)>,
        requests: Vec<String>,
    }

    impl StubFetcher {
        fn new(pages: Vec<(&'static str, &'static str)>) -> Self {
            Self {
                pages,
                requests: Vec::new(),
            }
        }
    }

    impl PageFetcher for StubFetcher {
        fn fetch(&mut self, url: &str) -> LocatorResult<String> {
            self.requests.push(url.to_owned());
            self.pages
                .iter()
                .find(|(known, _)| *known == url)
                .map(|(_, html)| (*html).to_owned())
                .ok_or_else(|| LocatorError::fetch("fetch.http_status", "HTTP error! status: 404"))
        }
    }

    const PAGE: &str = r#"<html><head><title>Pets</title><style>.cat{}</style></head>
<body><div id="x"><span>foo</span><span>foo</span></div>
<p>Cats category categorical</p><input name="q" value="cat"></body></html>"#;

    fn session() -> LocatorSession {
        LocatorSession::new(EngineConfig::default())
    }

    fn loaded(html: &str) -> LocatorSession {
        let mut session = session();
        if let Err(error) = session.load_html(html) {
            panic!("{error}");
        }
        session
    }

    fn element(session: &LocatorSession, css: &str) -> NodeId {
        let document = session.document().unwrap_or_else(|| unreachable!());
        resolve_css_path(document, css).unwrap_or_else(|| panic!("no element at {css}"))
    }

    #[test]
    fn clicking_second_span_records_css_path() {
        let mut session = loaded(PAGE);
        let span = element(&session, "div#x > span:nth-of-type(2)");
        let id = session.on_element_clicked(span).ok().flatten();
        assert!(id.is_some());

        let table = session.current_table();
        assert_eq!(table.kind, TableKind::Selections);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].css_path, "div#x > span:nth-of-type(2)");
        assert!(table.to_html().contains("<td>SPAN</td>"));
    }

    #[test]
    fn double_click_toggles_selection_off() {
        let mut session = loaded(PAGE);
        let span = element(&session, "div#x > span");
        assert!(session.on_element_clicked(span).is_ok());
        let removed = session.on_element_double_clicked(span);
        assert!(matches!(removed, Ok(Some(_))));

        let document = session.document().unwrap_or_else(|| unreachable!());
        assert!(document.elements_with_attribute(document.root(), LOCATOR_ID_ATTR).is_empty());
        assert_eq!(
            session.current_table().empty_message,
            Some("No locators selected.")
        );
    }

    #[test]
    fn double_clicking_unselected_element_is_a_no_op() {
        let mut session = loaded(PAGE);
        let before = session.outer_html();
        let paragraph = element(&session, "html > body > p");
        assert!(matches!(session.on_element_double_clicked(paragraph), Ok(None)));
        assert_eq!(session.outer_html(), before);
        assert!(session.registry().is_empty());
    }

    #[test]
    fn search_highlights_and_reports_rows() {
        let mut session = loaded(PAGE);
        let outcome = match session.run_search("cat") {
            Ok(outcome) => outcome,
            Err(error) => panic!("{error}"),
        };

        // The style rule and the input's value attribute are not text content.
        assert_eq!(outcome.match_count, 3);
        assert_eq!(outcome.status.level, StatusLevel::Success);
        assert_eq!(
            outcome.status.text,
            "Successfully highlighted 3 occurrences of \"cat\"."
        );
        let indices = outcome
            .table
            .rows
            .iter()
            .map(|row| row.highlight_index)
            .collect::<Vec<_>>();
        assert_eq!(indices, vec![Some(1), Some(2), Some(3)]);
        assert!(outcome.table.rows.iter().all(|row| row.css_path == "html > body > p"));
        assert_eq!(outcome.table.rows[0].type_label, "Text <p>");
        assert_eq!(outcome.table.rows[0].match_text.as_deref(), Some("Cat"));
    }

    #[test]
    fn repeated_search_is_deterministic() {
        let mut session = loaded(PAGE);
        let first = session.run_search("foo");
        let second = session.run_search("foo");
        assert!(first.is_ok());
        assert_eq!(first.ok(), second.ok());

        let document = session.document().unwrap_or_else(|| unreachable!());
        let body = document.body().unwrap_or_else(|| unreachable!());
        assert_eq!(markers_in(document, body).len(), 2);
    }

    #[test]
    fn search_without_matches_keeps_page_identical() {
        let mut session = loaded(PAGE);
        let before = session.outer_html();
        let outcome = session.run_search("zebra");
        assert!(outcome.as_ref().is_ok_and(|outcome| outcome.match_count == 0));
        assert!(outcome.is_ok_and(|outcome| outcome.status.level == StatusLevel::Info));
        assert_eq!(session.outer_html(), before);
        assert_eq!(
            session.current_table().empty_message,
            Some("No matches found to display.")
        );
    }

    #[test]
    fn search_replaces_click_selections() {
        let mut session = loaded(PAGE);
        let span = element(&session, "div#x > span");
        assert!(session.on_element_clicked(span).is_ok());
        assert!(session.run_search("foo").is_ok());

        assert!(session.registry().is_empty());
        let document = session.document().unwrap_or_else(|| unreachable!());
        assert!(document.elements_with_attribute(document.root(), LOCATOR_ID_ATTR).is_empty());
    }

    #[test]
    fn failed_fetch_commits_nothing() {
        let mut session = loaded(PAGE);
        assert!(session.run_search("foo").is_ok());
        let before = session.outer_html();

        let mut fetcher = StubFetcher::new(Vec::new());
        let result = session.search_page(&mut fetcher, "https://example.com/missing", "foo");
        assert!(result.is_err_and(|error| error.is_fetch()));
        assert_eq!(session.outer_html(), before);
        assert_eq!(session.last_query(), Some("foo"));
    }

    #[test]
    fn incomplete_search_input_is_rejected_before_fetching() {
        let mut session = session();
        let mut fetcher = StubFetcher::new(vec![("https://example.com/", PAGE)]);
        let result = session.search_page(&mut fetcher, "https://example.com/", "   ");
        assert!(result.is_err_and(|error| {
            error.is_input_validation()
                && error.message == "Please enter both URL and text to highlight."
        }));
        assert!(fetcher.requests.is_empty());
        assert!(session.load_page(&mut fetcher, " ").is_err());
    }

    #[test]
    fn search_page_fetches_then_highlights() {
        let mut session = session();
        let mut fetcher = StubFetcher::new(vec![("https://example.com/", PAGE)]);
        let outcome = session.search_page(&mut fetcher, " https://example.com/ ", "categ");
        assert_eq!(outcome.map(|outcome| outcome.match_count).ok(), Some(2));
        assert_eq!(fetcher.requests, vec!["https://example.com/".to_owned()]);
    }

    #[test]
    fn operations_before_load_report_missing_document() {
        let mut session = session();
        assert!(session.run_search("foo").is_err());
        assert!(session.focus_match(1).is_err());
        let stray = Document::new().root();
        assert!(session.on_element_clicked(stray).is_err());
        assert!(session.on_marker_clicked(stray).is_ok_and(|effects| effects.is_empty()));
    }

    fn many_matches() -> String {
        let items = (0..23).map(|n| format!("<li>item {n}</li>")).collect::<String>();
        format!("<body><ul>{items}</ul></body>")
    }

    #[test]
    fn paginates_search_rows() {
        let mut session = loaded(&many_matches());
        let outcome = session.run_search("item");
        assert_eq!(outcome.map(|outcome| outcome.match_count).ok(), Some(23));

        assert_eq!(session.change_page(0), None);
        assert_eq!(session.change_page(4), None);
        assert_eq!(session.change_page(2), Some(ViewEffect::ScrollToTableTop));
        let table = session.current_table();
        let numbers = table.rows.iter().map(|row| row.number).collect::<Vec<_>>();
        assert_eq!(numbers, (11..=20).collect::<Vec<_>>());
        assert_eq!(table.rows[0].type_label, "List Item");
    }

    #[test]
    fn focus_match_moves_emphasis() {
        let mut session = loaded(PAGE);
        assert!(session.run_search("foo").is_ok());
        assert!(matches!(session.focus_match(2), Ok(Some(ViewEffect::ScrollIntoViewCenter(_)))));
        assert!(matches!(session.focus_match(7), Ok(None)));

        let document = session.document().unwrap_or_else(|| unreachable!());
        let body = document.body().unwrap_or_else(|| unreachable!());
        let second = find_marker(document, body, 2).unwrap_or_else(|| unreachable!());
        assert!(treatment::is_active(document, second));
    }

    #[test]
    fn marker_click_in_indexed_mode_focuses_and_pages() {
        let mut session = loaded(&many_matches());
        assert!(session.run_search("item").is_ok());
        let marker = {
            let document = session.document().unwrap_or_else(|| unreachable!());
            let body = document.body().unwrap_or_else(|| unreachable!());
            find_marker(document, body, 17).unwrap_or_else(|| unreachable!())
        };

        let effects = match session.on_marker_clicked(marker) {
            Ok(effects) => effects,
            Err(error) => panic!("{error}"),
        };
        assert_eq!(
            effects,
            vec![
                ViewEffect::ScrollIntoViewCenter(marker),
                ViewEffect::ScrollToTableTop
            ]
        );
        assert_eq!(session.current_table().pager.map(|pager| pager.current_page), Some(2));
    }

    #[test]
    fn marker_click_in_detail_mode_shows_one_row() {
        let config = EngineConfig {
            presentation_mode: PresentationMode::DetailRow,
            ..EngineConfig::default()
        };
        let mut session = LocatorSession::new(config);
        assert!(session.load_html(PAGE).is_ok());
        assert!(session.run_search("foo").is_ok());
        let marker = {
            let document = session.document().unwrap_or_else(|| unreachable!());
            let body = document.body().unwrap_or_else(|| unreachable!());
            find_marker(document, body, 2).unwrap_or_else(|| unreachable!())
        };

        let effects = session.on_marker_clicked(marker);
        assert_eq!(effects.ok(), Some(vec![ViewEffect::ScrollToTableTop]));
        let table = session.current_table();
        assert_eq!(table.kind, TableKind::Detail);
        assert_eq!(table.rows.len(), 1);
        assert_eq!(table.rows[0].css_path, "div#x > span:nth-of-type(2)");
        assert_eq!(
            table.info.as_deref(),
            Some("Locator info for selected match: foo")
        );
    }

    #[test]
    fn clicking_non_marker_does_nothing() {
        let mut session = loaded(PAGE);
        let paragraph = element(&session, "html > body > p");
        assert!(matches!(session.on_marker_clicked(paragraph), Ok(effects) if effects.is_empty()));
    }
}
