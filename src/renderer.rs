//! Rendering of shows and episodes into the page
//!
//! The renderer fully replaces the contents of the shows list or episodes
//! list on every call. It also remembers which show each rendered show
//! block stands for, so the controller can resolve a click without reading
//! ids back out of markup.

use crate::catalog::{Episode, Show, ShowId};
use crate::page::{Container, ElementId, Node, Page};
use askama::Template;
use std::collections::HashMap;
use tracing::debug;

/// Class marking the block rendered for one show
pub const SHOW_BLOCK_CLASS: &str = "Show";

/// Class marking the "Episodes" control inside a show block
pub const EPISODES_CONTROL_CLASS: &str = "Show-getEpisodes";

/// Markup for one show block
#[derive(Template)]
#[template(path = "show.html")]
struct ShowBlockTemplate<'a> {
    show: &'a Show,
}

/// Markup for one episode list item
#[derive(Template)]
#[template(path = "episode.html")]
struct EpisodeItemTemplate<'a> {
    episode: &'a Episode,
}

/// Renders catalog records into a page
#[derive(Debug, Default)]
pub struct Renderer {
    /// Show block element -> show it was rendered for
    show_blocks: HashMap<ElementId, ShowId>,
}

impl Renderer {
    /// Creates a renderer with no rendered show blocks
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the shows list with one block per show
    ///
    /// The mapping from show blocks to show ids is rebuilt from scratch, so
    /// blocks from a previous search can no longer be resolved. All markup
    /// is rendered before the page is touched, so a template failure leaves
    /// the previous content in place.
    pub fn render_shows(&mut self, page: &mut Page, shows: &[Show]) -> Result<(), askama::Error> {
        let blocks = shows
            .iter()
            .map(show_block)
            .collect::<Result<Vec<_>, _>>()?;

        page.clear(Container::ShowsList);
        self.show_blocks.clear();

        for (show, node) in shows.iter().zip(blocks) {
            let block = page.append(Container::ShowsList, node);
            self.show_blocks.insert(block, show.id);
        }

        debug!(count = shows.len(), "Rendered shows");
        Ok(())
    }

    /// Reveals the episodes area and replaces its list with the given episodes
    pub fn render_episodes(
        &mut self,
        page: &mut Page,
        episodes: &[Episode],
    ) -> Result<(), askama::Error> {
        let items = episodes
            .iter()
            .map(episode_item)
            .collect::<Result<Vec<_>, _>>()?;

        page.show_episodes_area();
        page.clear(Container::EpisodesList);

        for item in items {
            page.append(Container::EpisodesList, item);
        }

        debug!(count = episodes.len(), "Rendered episodes");
        Ok(())
    }

    /// Looks up the show a rendered show block stands for
    pub fn show_id_for(&self, block: ElementId) -> Option<ShowId> {
        self.show_blocks.get(&block).copied()
    }
}

/// Builds the element tree and markup for a single show
fn show_block(show: &Show) -> Result<Node, askama::Error> {
    let markup = ShowBlockTemplate { show }.render()?;

    Ok(Node::new("div")
        .class("Show col-md-12 col-lg-6 mb-4")
        .attr("data-show-id", show.id.to_string())
        .child(
            Node::new("div")
                .class("media")
                .child(
                    Node::new("img")
                        .class("card-img-top w-25 me-3")
                        .attr("src", show.image.as_str())
                        .attr("alt", show.name.as_str()),
                )
                .child(
                    Node::new("div")
                        .class("media-body")
                        .child(
                            Node::new("h5")
                                .class("Show-name text-primary")
                                .text(show.name.as_str()),
                        )
                        .child(
                            Node::new("div").child(
                                Node::new("small")
                                    .class("Show-summary")
                                    .markup(show.summary.as_str()),
                            ),
                        )
                        .child(
                            Node::new("button")
                                .class("btn btn-outline-light btn-sm Show-getEpisodes")
                                .child(Node::new("span").text("Episodes")),
                        ),
                ),
        )
        .rendered(markup))
}

/// Builds the list item for a single episode
fn episode_item(episode: &Episode) -> Result<Node, askama::Error> {
    let markup = EpisodeItemTemplate { episode }.render()?;

    Ok(Node::new("li")
        .text(format!(
            "{} (season: {} number: {})",
            episode.name, episode.season, episode.number
        ))
        .rendered(markup))
}
