//! ShowScout - Look up tv shows and browse their episodes
//!
//! This library provides a catalog client for the TVMaze API, an in-memory
//! page model, a renderer that writes shows and episodes into that page, and
//! a controller that turns user interactions into lookups.

mod catalog;
mod config;
mod controller;
mod page;
mod renderer;

pub use catalog::{Catalog, CatalogError, Episode, Show, ShowId, TvMazeCatalog};
pub use config::{CatalogConfig, ConfigError, GENERIC_IMAGE, TVMAZE_API_BASE};
pub use controller::{Controller, Handled, LookupError, UiEvent};
pub use page::{Container, Content, Element, ElementId, Node, Page, Parent};
pub use renderer::{EPISODES_CONTROL_CLASS, Renderer, SHOW_BLOCK_CLASS};

use std::io;
use thiserror::Error;

/// Top-level error type for ShowScout operations
#[derive(Debug, Error)]
pub enum ShowScoutError {
    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A search or episode lookup failed
    #[error("Lookup error: {0}")]
    Lookup(#[from] LookupError),

    /// HTML rendering error
    #[error("Render error: {0}")]
    Render(#[from] askama::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Runs a single search against the catalog and returns the rendered page
///
/// # Examples
///
/// ```no_run
/// use show_scout::{search_page, CatalogConfig};
///
/// let page = search_page(CatalogConfig::tvmaze().unwrap(), "bletchley").unwrap();
/// println!("{}", page.to_text());
/// ```
pub fn search_page(config: CatalogConfig, term: &str) -> Result<Page, ShowScoutError> {
    let mut controller = Controller::new(TvMazeCatalog::new(config));
    controller.page_mut().set_search_term(term);
    controller.dispatch(UiEvent::Submit)?;
    Ok(controller.into_page())
}
