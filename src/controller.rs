//! Interaction controller
//!
//! Binds the two user interactions (search form submission and a click on a
//! show's "Episodes" control) to catalog lookups and rendering. The
//! controller owns the page, the renderer and the catalog for the lifetime of
//! a view; dropping it (or calling `into_page`) tears the view down.

use crate::catalog::{Catalog, CatalogError, ShowId};
use crate::page::{ElementId, Page};
use crate::renderer::{EPISODES_CONTROL_CLASS, Renderer, SHOW_BLOCK_CLASS};
use thiserror::Error;
use tracing::{info, warn};

/// Errors surfaced by a user interaction
#[derive(Debug, Error)]
pub enum LookupError {
    /// The catalog lookup failed
    #[error("Catalog lookup failed: {0}")]
    Catalog(#[from] CatalogError),

    /// The clicked control does not belong to a currently rendered show
    #[error("No rendered show owns element {0}")]
    UnknownShow(ElementId),

    /// The fetched records could not be rendered
    #[error("Rendering failed: {0}")]
    Render(#[from] askama::Error),
}

/// A user interaction delivered to the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiEvent {
    /// The search form was submitted
    Submit,
    /// Something inside the shows list was clicked
    Click { target: ElementId },
}

/// What the controller did in response to an event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Handled {
    /// A search ran and its shows were rendered
    Searched { show_count: usize },
    /// A show was expanded into its episodes
    Expanded { show_id: ShowId, episode_count: usize },
    /// The event did not target anything the controller reacts to
    Ignored,
}

/// Sequences catalog lookups with rendering for one page
pub struct Controller<C>
where
    C: Catalog,
{
    catalog: C,
    renderer: Renderer,
    page: Page,
}

impl<C> Controller<C>
where
    C: Catalog,
{
    /// Creates a controller for a fresh page
    pub fn new(catalog: C) -> Self {
        Self::with_page(catalog, Page::new())
    }

    /// Creates a controller bound to an existing page
    pub fn with_page(catalog: C, page: Page) -> Self {
        Self {
            catalog,
            renderer: Renderer::new(),
            page,
        }
    }

    /// The page this controller renders into
    pub fn page(&self) -> &Page {
        &self.page
    }

    /// Mutable access to the page, e.g. to fill in the search term
    pub fn page_mut(&mut self) -> &mut Page {
        &mut self.page
    }

    /// Tears the view down and hands back the page
    pub fn into_page(self) -> Page {
        self.page
    }

    /// Routes an event to its flow
    ///
    /// On failure the error is also written to the page's status line and
    /// previously rendered content is left as it was.
    pub fn dispatch(&mut self, event: UiEvent) -> Result<Handled, LookupError> {
        let result = match event {
            UiEvent::Submit => self.search(),
            UiEvent::Click { target } => self.expand_episodes(target),
        };

        match &result {
            Ok(Handled::Ignored) => {}
            Ok(_) => self.page.set_status(None),
            Err(e) => {
                warn!(error = %e, "Lookup failed");
                self.page.set_status(Some(e.to_string()));
            }
        }

        result
    }

    /// Search flow: read the term, fetch shows, hide episodes, render shows
    fn search(&mut self) -> Result<Handled, LookupError> {
        let term = self.page.search_term().to_string();
        info!(term = %term, "Searching for shows");

        let shows = self.catalog.search_shows(&term)?;

        self.page.hide_episodes_area();
        self.renderer.render_shows(&mut self.page, &shows)?;

        Ok(Handled::Searched {
            show_count: shows.len(),
        })
    }

    /// Expand flow: resolve the owning show, fetch and render its episodes
    fn expand_episodes(&mut self, target: ElementId) -> Result<Handled, LookupError> {
        if self.page.closest(target, EPISODES_CONTROL_CLASS).is_none() {
            return Ok(Handled::Ignored);
        }

        let show_id = self.show_id_for(target)?;
        info!(show_id = %show_id, "Expanding episodes");

        let episodes = self.catalog.list_episodes(show_id)?;
        self.renderer.render_episodes(&mut self.page, &episodes)?;

        Ok(Handled::Expanded {
            show_id,
            episode_count: episodes.len(),
        })
    }

    /// Resolves the show owning an element via its closest show block
    pub fn show_id_for(&self, target: ElementId) -> Result<ShowId, LookupError> {
        self.page
            .closest(target, SHOW_BLOCK_CLASS)
            .and_then(|block| self.renderer.show_id_for(block))
            .ok_or(LookupError::UnknownShow(target))
    }
}
