/// Data structures and traits for TV show catalog lookups.
///
/// This module provides the normalized `Show` and `Episode` records surfaced
/// to the page, the tagged `CatalogError` taxonomy, and the `Catalog` trait
/// implemented by remote catalog services.
mod tvmaze;
mod tvmaze_types;

pub use tvmaze::TvMazeCatalog;

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Errors that can occur while talking to a catalog service.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The request never produced a response (DNS, connect, TLS, ...)
    #[error("Request failed: {0}")]
    Network(String),

    /// The service answered with a non-success status code
    #[error("HTTP {status} {reason}")]
    HttpStatus { status: u16, reason: String },

    /// The response body did not match the expected shape
    #[error("Failed to parse API response: {0}")]
    Decode(String),
}

/// Identifier of a show in the remote catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ShowId(pub u64);

impl fmt::Display for ShowId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// A normalized TV series record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Show {
    /// Catalog identifier
    pub id: ShowId,
    /// Display name of the show
    pub name: String,
    /// Short description, may contain HTML markup
    pub summary: String,
    /// Poster URL, never empty
    pub image: String,
}

/// A normalized single-episode record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Episode {
    /// Catalog identifier of the episode
    pub id: u64,
    /// The episode title
    pub name: String,
    /// The season number this episode belongs to (0 for specials)
    pub season: u32,
    /// The episode number within the season
    pub number: u32,
}

/// Trait for catalog services that can search shows and list their episodes.
///
/// Implementors issue read-only lookups against a remote catalog and
/// normalize the responses. No retry is attempted; every failure is
/// returned to the caller as a tagged `CatalogError`.
pub trait Catalog {
    /// Searches for shows matching a free-text term.
    ///
    /// The term is passed to the service verbatim. Empty or odd terms are
    /// the service's concern.
    fn search_shows(&self, term: &str) -> Result<Vec<Show>, CatalogError>;

    /// Lists all episodes of the given show.
    fn list_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogError>;
}

impl<C: Catalog + ?Sized> Catalog for &C {
    fn search_shows(&self, term: &str) -> Result<Vec<Show>, CatalogError> {
        (**self).search_shows(term)
    }

    fn list_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogError> {
        (**self).list_episodes(show_id)
    }
}
