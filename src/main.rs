use clap::{ArgAction, Parser, Subcommand};
use dialoguer::{Input, Select};
use show_scout::{
    Catalog, CatalogConfig, Container, Controller, EPISODES_CONTROL_CLASS, GENERIC_IMAGE, Page,
    Renderer, ShowId, ShowScoutError, TVMAZE_API_BASE, TvMazeCatalog, UiEvent, search_page,
};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use thiserror::Error;
use tracing_subscriber::EnvFilter;

/// Look up tv shows in the TVMaze catalog and browse their episodes
#[derive(Debug, Parser)]
#[command(name = "show-scout", version, about)]
struct Cli {
    /// Root URL of the catalog API
    #[arg(long, global = true, default_value = TVMAZE_API_BASE)]
    api_base: String,

    /// Poster used for shows without an image
    #[arg(long, global = true, default_value = GENERIC_IMAGE)]
    fallback_image: String,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Search once and print the matching shows
    Search {
        /// Free-text search term
        term: String,

        /// Also write the rendered page as an HTML document
        #[arg(long)]
        html: Option<PathBuf>,
    },

    /// List all episodes of a show
    Episodes {
        /// Catalog id of the show
        show_id: u64,
    },

    /// Search interactively and expand shows into their episodes
    Browse {
        /// Term for the first search
        term: Option<String>,
    },
}

/// Errors that end the CLI
#[derive(Debug, Error)]
enum CliError {
    #[error(transparent)]
    App(#[from] ShowScoutError),

    #[error("Prompt failed: {0}")]
    Prompt(#[from] dialoguer::Error),
}

/// Installs the stderr log subscriber for the requested verbosity
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(format!("show_scout={}", level)))
        .with_writer(std::io::stderr)
        .init();
}

fn run_search(config: CatalogConfig, term: &str, html: Option<PathBuf>) -> Result<(), CliError> {
    let page = search_page(config, term)?;

    if page.children(Container::ShowsList).is_empty() {
        println!("No shows found for '{}'.", term);
    } else {
        print!("{}", page.to_text());
    }

    if let Some(path) = html {
        let html = page.to_html().map_err(ShowScoutError::from)?;
        fs::write(&path, html).map_err(ShowScoutError::from)?;
        println!("\nWrote {}", path.display());
    }

    Ok(())
}

fn run_episodes(config: CatalogConfig, show_id: u64) -> Result<(), CliError> {
    let catalog = TvMazeCatalog::new(config);
    let episodes = catalog
        .list_episodes(ShowId(show_id))
        .map_err(|e| ShowScoutError::Lookup(e.into()))?;

    let mut page = Page::new();
    Renderer::new()
        .render_episodes(&mut page, &episodes)
        .map_err(ShowScoutError::from)?;

    if episodes.is_empty() {
        println!("No episodes found for show #{}.", show_id);
    } else {
        print!("{}", page.to_text());
    }

    Ok(())
}

fn run_browse(config: CatalogConfig, first_term: Option<String>) -> Result<(), CliError> {
    let mut controller = Controller::new(TvMazeCatalog::new(config));
    let mut pending_term = first_term;

    loop {
        let term = match pending_term.take() {
            Some(term) => term,
            None => Input::<String>::new()
                .with_prompt("Search shows (empty to quit)")
                .allow_empty(true)
                .interact_text()?,
        };

        if term.trim().is_empty() {
            return Ok(());
        }

        controller.page_mut().set_search_term(term);
        if let Err(e) = controller.dispatch(UiEvent::Submit) {
            eprintln!("Error: {}", e);
            continue;
        }

        let blocks = controller.page().children(Container::ShowsList).to_vec();
        if blocks.is_empty() {
            println!("No shows found.");
            continue;
        }
        print!("{}", controller.page().to_text());

        // Pick shows until the user asks for a new search
        loop {
            let page = controller.page();
            let mut items: Vec<String> = blocks
                .iter()
                .map(|block| {
                    page.find_descendant(*block, "Show-name")
                        .map(|name| page.text_content(name))
                        .unwrap_or_default()
                })
                .collect();
            items.push("<new search>".to_string());

            let choice = Select::new()
                .with_prompt("Show episodes for")
                .items(&items)
                .default(0)
                .interact()?;

            let Some(block) = blocks.get(choice) else {
                break;
            };
            let Some(control) = page.find_descendant(*block, EPISODES_CONTROL_CLASS) else {
                break;
            };

            match controller.dispatch(UiEvent::Click { target: control }) {
                Ok(_) => {
                    println!("\n=== {} ===", items[choice]);
                    let page = controller.page();
                    for item in page.children(Container::EpisodesList) {
                        println!("  {}", page.text_content(*item));
                    }
                    println!();
                }
                Err(e) => eprintln!("Error: {}", e),
            }
        }
    }
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config =
        CatalogConfig::new(&cli.api_base, &cli.fallback_image).map_err(ShowScoutError::from)?;

    match cli.command {
        Some(Command::Search { term, html }) => run_search(config, &term, html),
        Some(Command::Episodes { show_id }) => run_episodes(config, show_id),
        Some(Command::Browse { term }) => run_browse(config, term),
        None => run_browse(config, None),
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("\nError: {}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_defaults_to_tvmaze() {
        let cli = Cli::parse_from(["show-scout", "search", "bletchley"]);
        assert_eq!(cli.api_base, TVMAZE_API_BASE);
        assert_eq!(cli.fallback_image, GENERIC_IMAGE);
        assert!(matches!(
            cli.command,
            Some(Command::Search { ref term, html: None }) if term == "bletchley"
        ));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "show-scout",
            "episodes",
            "1",
            "--api-base",
            "http://localhost:8080",
            "-vv",
        ]);
        assert_eq!(cli.api_base, "http://localhost:8080");
        assert_eq!(cli.verbose, 2);
        assert!(matches!(cli.command, Some(Command::Episodes { show_id: 1 })));
    }
}
