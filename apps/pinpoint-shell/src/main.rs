use clap::Parser;
use pp_core::EngineConfig;
use pp_core::LocatorError;
use pp_core::LocatorResult;
use pp_core::PresentationMode;
use pp_core::StatusLevel;
use pp_core::StatusMessage;
use pp_dom::NodeId;
use pp_locator::LocatorSession;
use pp_locator::highlight;
use pp_locator::resolve_css_path;
use pp_net::ProxyClient;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::debug;
use tracing::error;
use tracing_subscriber::EnvFilter;

const LOG_ENV: &str = "PINPOINT_LOG";

#[derive(Parser, Debug)]
#[command(author, version, about = "Pinpoint - highlight text on a page and report element locators", long_about = None)]
struct Args {
    /// Page to load through the proxy
    #[arg(index = 1)]
    url: Option<String>,
    /// Load HTML from a local file instead of the proxy
    #[arg(long, value_name = "PATH", conflicts_with = "url")]
    html_file: Option<PathBuf>,
    /// Highlight every case-insensitive occurrence of this text
    #[arg(long, value_name = "TEXT")]
    search: Option<String>,
    /// Select the element at this CSS path (repeatable)
    #[arg(long = "click", value_name = "CSS_PATH")]
    clicks: Vec<String>,
    /// Unselect the element at this CSS path (repeatable)
    #[arg(long = "unclick", value_name = "CSS_PATH")]
    unclicks: Vec<String>,
    /// Emphasize highlighted match N
    #[arg(long, value_name = "N")]
    focus: Option<usize>,
    /// Act as if highlighted match N was clicked in the page
    #[arg(long = "marker", value_name = "N")]
    marker: Option<usize>,
    /// Show this page of the result table
    #[arg(long, value_name = "N")]
    page: Option<usize>,
    /// Marker click presentation: table or detail
    #[arg(long, value_parser = parse_presentation)]
    presentation: Option<PresentationMode>,
    /// Proxy endpoint, overriding PINPOINT_PROXY_URL
    #[arg(long, value_name = "URL")]
    proxy: Option<String>,
    /// Print the result table as HTML instead of aligned text
    #[arg(long)]
    html: bool,
    /// Write the processed page to this file
    #[arg(long, value_name = "PATH")]
    write_page: Option<PathBuf>,
}

fn parse_presentation(raw: &str) -> Result<PresentationMode, String> {
    PresentationMode::from_name(raw)
        .ok_or_else(|| format!("unknown presentation `{raw}` (expected `table` or `detail`)"))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing();

    match run(&args) {
        Ok(status) => {
            print_status(&status);
            ExitCode::SUCCESS
        }
        Err(failure) => {
            error!(code = failure.code, "{}", failure.message);
            print_status(&StatusMessage::from_error(&failure));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

fn print_status(status: &StatusMessage) {
    match status.level {
        StatusLevel::Error => eprintln!("[{}] {}", status.level.as_str(), status.text),
        StatusLevel::Info | StatusLevel::Success => {
            println!("[{}] {}", status.level.as_str(), status.text);
        }
    }
}

fn config_from(args: &Args) -> LocatorResult<EngineConfig> {
    let mut config = EngineConfig::from_env()?;
    if let Some(proxy) = &args.proxy {
        config.proxy_endpoint = proxy.clone();
    }
    if let Some(mode) = args.presentation {
        config.presentation_mode = mode;
    }
    config.validate()?;
    Ok(config)
}

fn run(args: &Args) -> LocatorResult<StatusMessage> {
    let config = config_from(args)?;
    debug!(proxy = %config.proxy_endpoint, mode = config.presentation_mode.as_str(), "configuration loaded");
    let mut session = LocatorSession::new(config);
    let mut status = load(&mut session, args)?;

    for path in &args.clicks {
        let element = element_at(&session, path)?;
        if session.on_element_clicked(element)?.is_none() {
            status = StatusMessage::info(format!("`{path}` is already selected."));
        } else {
            status = StatusMessage::success(format!("Selected `{path}`."));
        }
    }
    for path in &args.unclicks {
        let element = element_at(&session, path)?;
        if session.on_element_double_clicked(element)?.is_none() {
            status = StatusMessage::info(format!("`{path}` was not selected."));
        } else {
            status = StatusMessage::success(format!("Unselected `{path}`."));
        }
    }

    if let Some(index) = args.focus {
        if session.focus_match(index)?.is_none() {
            status = StatusMessage::info(format!("No match #{index} on this page."));
        }
    }
    if let Some(index) = args.marker {
        let marker = session.document().and_then(|document| {
            let root = document.body().or_else(|| document.document_element())?;
            highlight::find_marker(document, root, index)
        });
        match marker {
            Some(marker) => {
                session.on_marker_clicked(marker)?;
            }
            None => status = StatusMessage::info(format!("No match #{index} on this page.")),
        }
    }
    if let Some(page) = args.page {
        if session.change_page(page).is_none() {
            debug!(page, "page unchanged");
        }
    }

    let table = session.current_table();
    if args.html {
        println!("{}", table.to_html());
    } else {
        print!("{}", table.to_text());
    }

    if let (Some(path), Some(html)) = (&args.write_page, session.outer_html()) {
        std::fs::write(path, html).map_err(|io_error| {
            LocatorError::input(
                "shell.write_failed",
                format!("failed to write {}: {io_error}", path.display()),
            )
        })?;
    }
    Ok(status)
}

fn load(session: &mut LocatorSession, args: &Args) -> LocatorResult<StatusMessage> {
    if let Some(path) = &args.html_file {
        let bytes = std::fs::read(path).map_err(|io_error| {
            LocatorError::input(
                "shell.read_failed",
                format!("failed to read {}: {io_error}", path.display()),
            )
        })?;
        session.load_html(pp_net::decode_page_text(&bytes, None))?;
        return match &args.search {
            Some(query) => Ok(session.run_search(query)?.status),
            None => Ok(StatusMessage::info(format!("Loaded {}.", path.display()))),
        };
    }

    let url = args.url.as_deref().unwrap_or_default();
    let mut client = ProxyClient::from_config(session.config())?;
    match &args.search {
        Some(query) => Ok(session.search_page(&mut client, url, query)?.status),
        None => {
            session.load_page(&mut client, url)?;
            Ok(StatusMessage::info(format!("Loaded {}.", url.trim())))
        }
    }
}

fn element_at(session: &LocatorSession, path: &str) -> LocatorResult<NodeId> {
    session
        .document()
        .and_then(|document| resolve_css_path(document, path))
        .ok_or_else(|| {
            LocatorError::input(
                "shell.element_not_found",
                format!("No element matches `{path}`."),
            )
        })
}
