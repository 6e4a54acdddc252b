//! Catalog configuration
//!
//! Holds the remote service location and the fallback poster used when a
//! show has no image of its own.

use thiserror::Error;
use url::Url;

/// Base URL of the public TVMaze API
pub const TVMAZE_API_BASE: &str = "https://api.tvmaze.com";

/// Poster substituted for shows without an image
pub const GENERIC_IMAGE: &str = "https://store-images.s-microsoft.com/image/apps.65316.13510798887490672.6e1ebb25-96c8-4504-b714-1f7cbca3c5ad.f9514a23-1eb8-4916-a18e-99b1a9817d15?mode=scale&q=90&h=300&w=300";

/// Errors that can occur while building a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The API base is not an absolute http(s) URL
    #[error("Invalid API base URL '{input}': {reason}")]
    InvalidBaseUrl { input: String, reason: String },

    /// The fallback image must not be empty
    #[error("Fallback image URL must not be empty")]
    EmptyFallbackImage,
}

/// Settings for a catalog client
#[derive(Debug, Clone, PartialEq)]
pub struct CatalogConfig {
    /// Root of the catalog API, e.g. `https://api.tvmaze.com`
    pub base_url: Url,
    /// Poster URL used when the catalog omits one
    pub fallback_image: String,
}

impl CatalogConfig {
    /// Builds a configuration from user supplied strings
    ///
    /// # Arguments
    ///
    /// * `base_url` - Root of the catalog API; must be http or https
    /// * `fallback_image` - Poster URL for shows without an image
    pub fn new(base_url: &str, fallback_image: &str) -> Result<Self, ConfigError> {
        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidBaseUrl {
            input: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") {
            return Err(ConfigError::InvalidBaseUrl {
                input: base_url.to_string(),
                reason: format!("unsupported scheme '{}'", parsed.scheme()),
            });
        }

        if fallback_image.trim().is_empty() {
            return Err(ConfigError::EmptyFallbackImage);
        }

        Ok(Self {
            base_url: parsed,
            fallback_image: fallback_image.to_string(),
        })
    }

    /// Configuration for the public TVMaze API with the generic poster
    pub fn tvmaze() -> Result<Self, ConfigError> {
        Self::new(TVMAZE_API_BASE, GENERIC_IMAGE)
    }

    /// Appends path segments to the base URL
    ///
    /// Any path prefix on the base is kept, so a base of
    /// `http://localhost:8080/tvmaze` yields `http://localhost:8080/tvmaze/shows/1`.
    /// Segments are percent-encoded.
    pub fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        url.set_query(None);
        // http(s) URLs always have a path, so this only fails for schemes `new` rejects
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}
