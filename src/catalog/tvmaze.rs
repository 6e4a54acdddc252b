/// TVMaze catalog implementation.
use super::tvmaze_types::{TvMazeEpisode, TvMazeSearchEnvelope, TvMazeShow};
use super::{Catalog, CatalogError, Episode, Show, ShowId};
use crate::config::CatalogConfig;
use serde::de::DeserializeOwned;
use tracing::{debug, info};
use url::Url;

/// Catalog client for the TVMaze API.
///
/// This client queries https://api.tvmaze.com (or a configured mirror)
/// using the show search and per-show episode endpoints.
pub struct TvMazeCatalog {
    client: reqwest::blocking::Client,
    config: CatalogConfig,
}

impl TvMazeCatalog {
    /// Creates a new TVMaze catalog client.
    pub fn new(config: CatalogConfig) -> Self {
        Self::with_client(config, reqwest::blocking::Client::new())
    }

    /// Creates a catalog client that sends requests through the given HTTP client.
    pub fn with_client(config: CatalogConfig, client: reqwest::blocking::Client) -> Self {
        Self { client, config }
    }

    /// Converts a TVMaze show to our internal Show structure.
    ///
    /// A missing image object, or one without a usable medium URL, is
    /// replaced with the fallback poster so `image` is never empty.
    fn convert_show(tvmaze_show: TvMazeShow, fallback_image: &str) -> Show {
        let image = tvmaze_show
            .image
            .and_then(|image| image.medium)
            .filter(|url| !url.trim().is_empty())
            .unwrap_or_else(|| fallback_image.to_string());

        Show {
            id: ShowId(tvmaze_show.id),
            name: tvmaze_show.name.unwrap_or_default(),
            summary: tvmaze_show.summary.unwrap_or_default(),
            image,
        }
    }

    /// Converts a TVMaze episode to our internal Episode structure.
    fn convert_episode(tvmaze_episode: TvMazeEpisode) -> Episode {
        Episode {
            id: tvmaze_episode.id,
            name: tvmaze_episode.name.unwrap_or_default(),
            season: tvmaze_episode.season.unwrap_or(0),
            number: tvmaze_episode.number.unwrap_or(0),
        }
    }

    /// Parses a `/search/shows` response body into normalized shows.
    fn parse_search_response(body: &str, fallback_image: &str) -> Result<Vec<Show>, CatalogError> {
        let envelopes: Vec<TvMazeSearchEnvelope> = decode(body)?;

        Ok(envelopes
            .into_iter()
            .map(|envelope| Self::convert_show(envelope.show, fallback_image))
            .collect())
    }

    /// Parses a `/shows/{id}/episodes` response body into normalized episodes.
    fn parse_episodes_response(body: &str) -> Result<Vec<Episode>, CatalogError> {
        let episodes: Vec<TvMazeEpisode> = decode(body)?;

        Ok(episodes.into_iter().map(Self::convert_episode).collect())
    }

    /// Performs a GET request and returns the body of a successful response.
    fn get_body(&self, url: Url, query: &[(&str, &str)]) -> Result<String, CatalogError> {
        let response = self
            .client
            .get(url)
            .query(query)
            .send()
            .map_err(|e| CatalogError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CatalogError::HttpStatus {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        response
            .text()
            .map_err(|e| CatalogError::Network(e.to_string()))
    }
}

/// Deserializes a JSON body, tagging shape mismatches as decode failures.
fn decode<T: DeserializeOwned>(body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Decode(e.to_string()))
}

impl Catalog for TvMazeCatalog {
    fn search_shows(&self, term: &str) -> Result<Vec<Show>, CatalogError> {
        info!(term = %term, "Searching TVMaze for shows");

        let url = self.config.endpoint(&["search", "shows"]);
        let body = self.get_body(url, &[("q", term)])?;
        let shows = Self::parse_search_response(&body, &self.config.fallback_image)?;

        debug!(count = shows.len(), "TVMaze search returned shows");
        Ok(shows)
    }

    fn list_episodes(&self, show_id: ShowId) -> Result<Vec<Episode>, CatalogError> {
        info!(show_id = %show_id, "Fetching episodes from TVMaze");

        let id = show_id.to_string();
        let url = self.config.endpoint(&["shows", &id, "episodes"]);
        let body = self.get_body(url, &[])?;
        let episodes = Self::parse_episodes_response(&body)?;

        debug!(count = episodes.len(), "TVMaze returned episodes");
        Ok(episodes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::GENERIC_IMAGE;
    use std::io::{BufRead, BufReader, Write};
    use std::net::TcpListener;
    use std::sync::mpsc;
    use std::thread;

    #[test]
    fn test_search_substitutes_fallback_image() {
        let body = r#"[{"score": 0.9, "show": {"id": 1, "name": "The Bletchley Circle", "summary": "<p>s</p>", "image": null}}]"#;

        let shows = TvMazeCatalog::parse_search_response(body, GENERIC_IMAGE).unwrap();

        assert_eq!(
            shows,
            vec![Show {
                id: ShowId(1),
                name: "The Bletchley Circle".to_string(),
                summary: "<p>s</p>".to_string(),
                image: GENERIC_IMAGE.to_string(),
            }]
        );
    }

    #[test]
    fn test_search_keeps_medium_image() {
        let body = r#"[
            {"show": {"id": 2, "name": "A", "summary": null, "image": {"medium": "http://img/a.jpg", "original": "http://img/a_big.jpg"}}},
            {"show": {"id": 3, "name": "B", "summary": "<b>x</b>", "image": {"medium": null}}},
            {"show": {"id": 4, "name": "C", "summary": "", "image": {"medium": ""}}}
        ]"#;

        let shows = TvMazeCatalog::parse_search_response(body, GENERIC_IMAGE).unwrap();

        assert_eq!(shows.len(), 3);
        assert_eq!(shows[0].image, "http://img/a.jpg");
        assert_eq!(shows[0].summary, "");
        assert_eq!(shows[1].image, GENERIC_IMAGE);
        assert_eq!(shows[2].image, GENERIC_IMAGE);
        assert!(shows.iter().all(|show| !show.image.is_empty()));
    }

    #[test]
    fn test_episodes_drop_extra_fields() {
        let body = r#"[{"id": 10, "name": "Pilot", "season": 1, "number": 1, "extra": "x"}]"#;

        let episodes = TvMazeCatalog::parse_episodes_response(body).unwrap();

        assert_eq!(
            episodes,
            vec![Episode {
                id: 10,
                name: "Pilot".to_string(),
                season: 1,
                number: 1,
            }]
        );
    }

    #[test]
    fn test_episodes_with_missing_numbers() {
        let body = r#"[{"id": 11, "name": null, "season": 2, "number": null}]"#;

        let episodes = TvMazeCatalog::parse_episodes_response(body).unwrap();

        assert_eq!(episodes[0].name, "");
        assert_eq!(episodes[0].season, 2);
        assert_eq!(episodes[0].number, 0);
    }

    #[test]
    fn test_malformed_payload_is_decode_error() {
        let result = TvMazeCatalog::parse_search_response(r#"{"not": "an array"}"#, GENERIC_IMAGE);
        assert!(matches!(result, Err(CatalogError::Decode(_))));

        let result = TvMazeCatalog::parse_episodes_response("<html>oops</html>");
        assert!(matches!(result, Err(CatalogError::Decode(_))));
    }

    /// Serves a single canned HTTP response on a local port
    ///
    /// Returns the base URL to configure and a receiver yielding the request
    /// line the client sent.
    fn serve_once(status: &'static str, body: &'static str) -> (String, mpsc::Receiver<String>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let (tx, rx) = mpsc::channel();

        thread::spawn(move || {
            let (mut stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());

            let mut request_line = String::new();
            reader.read_line(&mut request_line).unwrap();
            loop {
                let mut header = String::new();
                let read = reader.read_line(&mut header).unwrap();
                if read == 0 || header == "\r\n" {
                    break;
                }
            }
            let _ = tx.send(request_line.trim_end().to_string());

            let response = format!(
                "HTTP/1.1 {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
                status,
                body.len(),
                body
            );
            stream.write_all(response.as_bytes()).unwrap();
        });

        (format!("http://{}", addr), rx)
    }

    fn local_catalog(base_url: &str) -> TvMazeCatalog {
        let config = CatalogConfig::new(base_url, GENERIC_IMAGE).unwrap();
        let client = reqwest::blocking::Client::builder()
            .no_proxy()
            .build()
            .unwrap();
        TvMazeCatalog::with_client(config, client)
    }

    #[test]
    fn test_search_encodes_term_in_query() {
        let (base_url, requests) = serve_once(
            "200 OK",
            r#"[{"show": {"id": 1, "name": "The Bletchley Circle", "summary": "<p>s</p>", "image": null}}]"#,
        );
        let catalog = local_catalog(&base_url);

        let shows = catalog.search_shows("a b&c").unwrap();

        assert_eq!(
            requests.recv().unwrap(),
            "GET /search/shows?q=a+b%26c HTTP/1.1"
        );
        assert_eq!(shows.len(), 1);
        assert_eq!(shows[0].id, ShowId(1));
        assert_eq!(shows[0].image, GENERIC_IMAGE);
    }

    #[test]
    fn test_episodes_request_path() {
        let (base_url, requests) = serve_once(
            "200 OK",
            r#"[{"id": 10, "name": "Pilot", "season": 1, "number": 1, "extra": "x"}]"#,
        );
        let catalog = local_catalog(&base_url);

        let episodes = catalog.list_episodes(ShowId(1)).unwrap();

        assert_eq!(requests.recv().unwrap(), "GET /shows/1/episodes HTTP/1.1");
        assert_eq!(
            episodes,
            vec![Episode {
                id: 10,
                name: "Pilot".to_string(),
                season: 1,
                number: 1,
            }]
        );
    }

    #[test]
    fn test_not_found_is_http_status_error() {
        let (base_url, _requests) = serve_once("404 Not Found", "");
        let catalog = local_catalog(&base_url);

        let result = catalog.search_shows("bletchley");

        match result {
            Err(CatalogError::HttpStatus { status, reason }) => {
                assert_eq!(status, 404);
                assert_eq!(reason, "Not Found");
            }
            other => panic!("expected HttpStatus error, got {:?}", other),
        }
    }

    #[test]
    fn test_server_error_is_http_status_error() {
        let (base_url, _requests) = serve_once("500 Internal Server Error", r#"{"error": 1}"#);
        let catalog = local_catalog(&base_url);

        let result = catalog.list_episodes(ShowId(7));

        assert!(matches!(
            result,
            Err(CatalogError::HttpStatus { status: 500, .. })
        ));
    }

    #[test]
    fn test_non_json_success_is_decode_error() {
        let (base_url, _requests) = serve_once("200 OK", "<html>maintenance</html>");
        let catalog = local_catalog(&base_url);

        let result = catalog.search_shows("bletchley");

        assert!(matches!(result, Err(CatalogError::Decode(_))));
    }

    #[test]
    fn test_unreachable_service_is_network_error() {
        // Reserve a free port, then release it so nothing is listening there
        let port = TcpListener::bind("127.0.0.1:0")
            .unwrap()
            .local_addr()
            .unwrap()
            .port();
        let catalog = local_catalog(&format!("http://127.0.0.1:{}", port));

        let result = catalog.search_shows("bletchley");
        assert!(matches!(result, Err(CatalogError::Network(_))));
    }
}
