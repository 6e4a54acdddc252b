/// TVMaze API response types for deserialization.
///
/// These structures mirror the JSON response format from the TVMaze API.
/// Only the fields we normalize are declared; everything else is ignored.
use serde::Deserialize;

/// One match from the `/search/shows` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeSearchEnvelope {
    /// The matched show record
    pub show: TvMazeShow,
}

/// A show record as nested inside a search envelope.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeShow {
    pub id: u64,
    /// Show name (null for some stub records)
    pub name: Option<String>,
    /// Summary in HTML format (may be null)
    pub summary: Option<String>,
    /// Poster images, null when the show has none
    pub image: Option<TvMazeImage>,
}

/// Image links attached to a show.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeImage {
    pub medium: Option<String>,
}

/// A single episode from the `/shows/{id}/episodes` endpoint.
#[derive(Debug, Deserialize)]
pub(super) struct TvMazeEpisode {
    pub id: u64,
    /// Episode title (may be null for episodes without a title)
    pub name: Option<String>,
    /// Season number (null for some specials)
    pub season: Option<u32>,
    /// Episode number within the season (null for specials)
    pub number: Option<u32>,
}
