//! Locator engine: text highlighting, click selection and result tables.
//!
//! [`LocatorSession`] is the entry point a UI shell drives. The remaining
//! modules are usable on their own against any [`pp_dom::Document`].

pub mod debounce;
pub mod element_type;
pub mod highlight;
pub mod path;
pub mod presenter;
pub mod registry;
pub mod session;
pub mod treatment;

pub use debounce::QueryDebouncer;
pub use element_type::element_type_label;
pub use highlight::HighlightMarker;
pub use highlight::HighlightPass;
pub use highlight::TextMatchWalker;
pub use path::ElementPaths;
pub use path::resolve_css_path;
pub use presenter::LocatorRow;
pub use presenter::Pagination;
pub use presenter::RenderedTable;
pub use presenter::ResultPresenter;
pub use presenter::TableKind;
pub use presenter::ViewEffect;
pub use registry::LocatorId;
pub use registry::LocatorRecord;
pub use registry::SelectionRegistry;
pub use session::LocatorSession;
pub use session::SearchOutcome;
