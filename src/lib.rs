pub mod card;
pub mod commands;
pub mod config;
pub mod dom;
pub mod error;
pub mod feeds;
pub mod i18n;
pub mod logging;
pub mod poller;
pub mod presence;
pub mod render;
pub mod schedule;
pub mod settings;
pub mod themes;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncBufReadExt, BufReader};

use card::{Card, RenderHook};
use commands::Command;
use config::CardConfig;
use dom::Document;
use error::{CardError, SettingsError};
use feeds::{FeedClient, HttpFetcher};
use i18n::TranslationTable;
use poller::Poller;
use settings::{FilePreferenceStore, MemoryPreferenceStore, PreferenceStore, Preferences};
use themes::ThemeRegistry;

/// Loads configuration, then polls and renders until `quit`, end of input
/// or Ctrl-C.
pub fn run() -> Result<(), CardError> {
    let config = logging::with_bootstrap_logging(CardConfig::load)?;
    let _guard = logging::init_logging(config.log_dir.as_deref());

    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?
        .block_on(serve(config))
}

async fn serve(config: CardConfig) -> Result<(), CardError> {
    tracing::info!(
        "Starting digital card: profile {} every {}s, links {} every {}s",
        config.profile_url,
        config.profile_refresh_secs,
        config.links_url,
        config.links_refresh_secs
    );

    let store: Arc<dyn PreferenceStore> = match open_store(config.data_dir.as_deref()) {
        Ok(store) => store,
        Err(e) => {
            tracing::warn!("{}; preferences will not be saved", e);
            Arc::new(MemoryPreferenceStore::new())
        }
    };

    let card = Card::new(
        TranslationTable::builtin(),
        ThemeRegistry::builtin(),
        store,
        &Preferences {
            language: config.default_language.clone(),
            theme: config.default_theme.clone(),
        },
    )
    .with_render_hook(page_writer(config.output.clone()));
    card.render_all();
    let card = Arc::new(card);

    let fetcher = HttpFetcher::new(config.request_timeout())?;
    let feeds = FeedClient::new(
        Arc::new(fetcher),
        config.profile_url.clone(),
        config.links_url.clone(),
        config.links_schema,
    );
    let mut poller = Poller::new(
        Arc::clone(&card),
        feeds,
        config.profile_refresh(),
        config.links_refresh(),
    );

    poller.start().await;
    println!("{}", commands::HELP);

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        tokio::select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    tracing::info!("End of input");
                    break;
                };
                match Command::parse(&line) {
                    Ok(Some(Command::Quit)) => break,
                    Ok(Some(command)) => handle(&poller, command).await,
                    Ok(None) => {}
                    Err(message) => println!("{message}"),
                }
            }
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("Interrupted");
                break;
            }
        }
    }

    poller.teardown();
    Ok(())
}

async fn handle(poller: &Poller, command: Command) {
    let card = poller.card();
    match command {
        Command::Language(code) => {
            if !card.change_language(&code) {
                let supported: Vec<_> = card
                    .translations()
                    .languages()
                    .map(|l| l.code.as_str())
                    .collect();
                println!("unsupported language {code}; try one of {}", supported.join(", "));
            }
        }
        Command::Theme(id) => {
            if !card.change_theme(&id) {
                let supported: Vec<_> = card.themes().themes().iter().map(|t| t.id).collect();
                println!("unknown theme {id}; try one of {}", supported.join(", "));
            }
        }
        Command::Refresh => {
            let (profile, links) = poller.refresh_now().await;
            println!("profile: {profile:?}, links: {links:?}");
        }
        Command::Show => println!("{}", card.document().to_html()),
        Command::Help => println!("{}", commands::HELP),
        Command::Quit => {}
    }
}

fn open_store(data_dir: Option<&Path>) -> Result<Arc<dyn PreferenceStore>, SettingsError> {
    let dir = data_dir.ok_or(SettingsError::NoDataDir)?;
    let store = FilePreferenceStore::open(dir)?;
    tracing::info!("Preferences stored in {}", store.path().display());
    Ok(Arc::new(store))
}

/// Page writes taking longer than this are reported; the card stays locked
/// while the hook runs.
const SLOW_WRITE: Duration = Duration::from_millis(200);

fn page_writer(output: PathBuf) -> RenderHook {
    Box::new(move |doc| {
        let started = Instant::now();
        if let Err(e) = write_page(&output, doc) {
            tracing::warn!("Failed to write {}: {}", output.display(), e);
            return;
        }

        let elapsed = started.elapsed();
        if elapsed > SLOW_WRITE {
            tracing::warn!("Writing {} took {:?}", output.display(), elapsed);
        } else {
            tracing::debug!("Wrote {} in {:?}", output.display(), elapsed);
        }
    })
}

fn write_page(path: &Path, doc: &Document) -> std::io::Result<()> {
    let page = format!("<!DOCTYPE html>\n{}\n", doc.to_html());
    std::fs::write(path, page)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn card(output: PathBuf) -> Card {
        Card::new(
            TranslationTable::builtin(),
            ThemeRegistry::builtin(),
            Arc::new(MemoryPreferenceStore::new()),
            &Preferences {
                language: "en".to_string(),
                theme: "dark".to_string(),
            },
        )
        .with_render_hook(page_writer(output))
    }

    #[test]
    fn test_page_written_on_render() {
        let dir = tempfile::tempdir().unwrap();
        let output = dir.path().join("card.html");
        let card = card(output.clone());
        assert!(!output.exists());

        card.render_all();
        let page = std::fs::read_to_string(&output).unwrap();
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("Loading status..."));

        assert!(card.change_theme("light"));
        let page = std::fs::read_to_string(&output).unwrap();
        assert!(page.contains("theme-light"));
    }

    #[test]
    fn test_unwritable_output_is_not_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let card = card(dir.path().join("missing").join("card.html"));

        card.render_all();
        assert!(card.change_language("ru"));
        assert_eq!(card.language(), "ru");
    }
}
