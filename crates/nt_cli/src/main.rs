use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use nt_core::{ArticleStorage, Result};
use nt_scrappers::cli::{handle_command, ScraperArgs, ScraperCommands as NtScraperCommands};
use nt_scrappers::logging::init_logging;
use nt_scrappers::{seed_sources, HttpFetcher, ScrapeConfig, ScraperManager};
use nt_storage::InMemoryStorage;
use tracing::{info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct HumanDuration(Duration);

impl FromStr for HumanDuration {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let mut total_seconds = 0u64;
        let mut current_number = String::new();
        let mut has_unit = false;

        for c in s.chars() {
            if c.is_ascii_digit() {
                current_number.push(c);
            } else if let Ok(num) = current_number.parse::<u64>() {
                match c {
                    's' => total_seconds += num,
                    'm' => total_seconds += num * 60,
                    'h' => total_seconds += num * 3600,
                    'd' => total_seconds += num * 86400,
                    _ => return Err(format!("Invalid duration unit: {}", c)),
                }
                current_number.clear();
                has_unit = true;
            } else if !c.is_whitespace() {
                return Err(format!("Invalid character in duration: {}", c));
            }
        }

        // A trailing bare number counts as seconds
        if !current_number.is_empty() {
            match current_number.parse::<u64>() {
                Ok(num) => {
                    total_seconds += num;
                    has_unit = true;
                }
                Err(_) => return Err("Invalid number in duration".to_string()),
            }
        }

        if !has_unit {
            return Err("Duration must include a number".to_string());
        }
        if total_seconds == 0 {
            return Err("Duration must be positive".to_string());
        }

        Ok(HumanDuration(Duration::from_secs(total_seconds)))
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Storage backend
    #[arg(long, env = "NT_STORAGE", default_value = "memory")]
    storage: String,
    /// JSON snapshot loaded at startup (when present) and written after every cycle
    #[arg(long, env = "NT_SNAPSHOT")]
    snapshot: Option<PathBuf>,
    /// Maximum number of requests in flight
    #[arg(long, env = "NT_CONCURRENCY", default_value_t = 8)]
    concurrency: usize,
    /// Request timeout in seconds
    #[arg(long, env = "NT_TIMEOUT", default_value_t = 20)]
    timeout: u64,
    #[arg(long, env = "NT_USER_AGENT")]
    user_agent: Option<String>,
    /// Pages followed per category listing
    #[arg(long, env = "NT_MAX_PAGES", default_value_t = 2)]
    max_pages: usize,
    /// Do not download publisher stylesheets
    #[arg(long, env = "NT_NO_CSS")]
    no_css: bool,
    /// Sources to leave out of this run, by name (e.g. "Basta!")
    #[arg(long, env = "NT_SKIP", value_delimiter = ',')]
    skip: Vec<String>,
    /// Print results as JSON
    #[arg(long, env = "NT_JSON")]
    json: bool,
    /// -v for debug, -vv for trace
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

impl Cli {
    fn scrape_config(&self) -> ScrapeConfig {
        let defaults = ScrapeConfig::default();
        ScrapeConfig {
            concurrency: self.concurrency,
            request_timeout: Duration::from_secs(self.timeout),
            user_agent: self.user_agent.clone().unwrap_or(defaults.user_agent),
            max_listing_pages: self.max_pages,
            fetch_stylesheets: !self.no_css,
        }
    }

    fn log_level(&self) -> &'static str {
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    Scrape {
        #[command(subcommand)]
        command: Option<ScraperCommands>,
    },
}

#[derive(clap::Subcommand, Debug)]
enum ScraperCommands {
    Source {
        /// The source to scrape in format region/source (e.g. france/reporterre). If not specified, scrapes all sources.
        #[arg(required = false)]
        source: Option<String>,
        /// Run in periodic mode with the specified interval (e.g. 1h, 30m, 1d, 1h15m30s)
        #[arg(long)]
        interval: Option<HumanDuration>,
    },
    List,
    Url {
        url: String,
    },
}

async fn save_snapshot(storage: &InMemoryStorage, cli: &Cli) {
    if let Some(path) = &cli.snapshot {
        match storage.write_snapshot(path).await {
            Ok(()) => info!("💾 Snapshot written to {}", path.display()),
            Err(e) => warn!("⚠️ Failed to write snapshot {}: {}", path.display(), e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.log_level());

    let storage = Arc::new(nt_storage::create_storage(&cli.storage, cli.snapshot.as_deref(), seed_sources()).await?);
    for name in &cli.skip {
        storage.set_source_enabled(name, false).await?;
    }
    info!("💾 Storage initialized successfully (using {})", cli.storage);

    let config = cli.scrape_config();
    let fetcher = Arc::new(HttpFetcher::new(&config)?);
    let manager = ScraperManager::new(storage.clone(), fetcher, config);

    let scraper_names: Vec<_> = manager
        .get_scrapers()
        .iter()
        .map(|scraper| scraper.source_metadata().name)
        .collect();
    info!("🦗 Scrapers initialized successfully: {}", scraper_names.join(", "));

    let cancel = manager.cancellation_token();
    tokio::spawn({
        let cancel = cancel.clone();
        async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("🛑 Interrupted, finishing current work");
                cancel.cancel();
            }
        }
    });

    let scrape_everything = ScraperCommands::Source {
        source: None,
        interval: None,
    };
    let command = match &cli.command {
        Commands::Scrape { command } => command.as_ref().unwrap_or(&scrape_everything),
    };

    match command {
        ScraperCommands::Source { source, interval } => {
            info!(
                "🦗 Scraping articles from {}",
                source.as_deref().filter(|s| !s.is_empty()).unwrap_or("all sources")
            );
            let args = ScraperArgs {
                command: NtScraperCommands::Source { source: source.clone() },
            };

            if let Some(interval) = interval {
                info!("Running in periodic mode with {}s interval", interval.0.as_secs());
                while !cancel.is_cancelled() {
                    info!("Starting scrape cycle");
                    if let Err(e) = handle_command(args.clone(), &manager, cli.json).await {
                        eprintln!("Error during scrape: {}", e);
                    }
                    save_snapshot(&storage, &cli).await;

                    info!("Waiting {}s before next scrape", interval.0.as_secs());
                    tokio::select! {
                        _ = tokio::time::sleep(interval.0) => {}
                        _ = cancel.cancelled() => break,
                    }
                }
            } else {
                handle_command(args, &manager, cli.json).await?;
                save_snapshot(&storage, &cli).await;
            }
        }
        ScraperCommands::List => {
            let args = ScraperArgs {
                command: NtScraperCommands::List,
            };
            handle_command(args, &manager, cli.json).await?;
        }
        ScraperCommands::Url { url } => {
            info!("Scraping single URL: {}", url);
            let args = ScraperArgs {
                command: NtScraperCommands::Url { url: url.clone() },
            };
            handle_command(args, &manager, cli.json).await?;
            save_snapshot(&storage, &cli).await;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_human_duration() {
        assert_eq!("1h".parse::<HumanDuration>().unwrap().0, Duration::from_secs(3600));
        assert_eq!(
            "1h15m30s".parse::<HumanDuration>().unwrap().0,
            Duration::from_secs(4530)
        );
        assert_eq!("90".parse::<HumanDuration>().unwrap().0, Duration::from_secs(90));
        assert!("1w".parse::<HumanDuration>().is_err());
        assert!("".parse::<HumanDuration>().is_err());
        assert!("0s".parse::<HumanDuration>().is_err());
    }

    #[test]
    fn test_cli_config() {
        let cli = Cli::try_parse_from([
            "nt", "--concurrency", "3", "--no-css", "--skip", "Basta!,Acrimed", "-v", "scrape", "source",
            "france/reporterre",
        ])
        .unwrap();
        let config = cli.scrape_config();

        assert_eq!(config.concurrency, 3);
        assert!(!config.fetch_stylesheets);
        assert_eq!(cli.skip, vec!["Basta!", "Acrimed"]);
        assert_eq!(cli.log_level(), "debug");
    }
}
