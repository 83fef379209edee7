use clap::{Args, Subcommand};
use nt_core::{ArticleStatus, Result};

use crate::manager::{IngestReport, ScraperManager};

#[derive(Args, Debug, Clone)]
pub struct ScraperArgs {
    #[command(subcommand)]
    pub command: ScraperCommands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ScraperCommands {
    /// Ingest feeds, listings and static pages of a source
    Source {
        /// The source to scrape in format region/source (e.g. france/reporterre). If not specified, scrapes all sources.
        source: Option<String>,
    },
    /// List available scrapers
    List,
    /// Scrape a single article
    Url { url: String },
}

fn status_emoji(status: ArticleStatus) -> &'static str {
    match status {
        ArticleStatus::New => "🆕",
        ArticleStatus::Updated => "📝",
        ArticleStatus::Unchanged => "⏭️",
    }
}

fn print_report(report: &IngestReport) {
    println!(
        "{}: 🆕 {} 📝 {} ⏭️ {} ❌ {} 📄 {} 🎨 {}{}",
        report.source,
        report.new,
        report.updated,
        report.unchanged,
        report.failed,
        report.pages,
        report.stylesheets,
        if report.cancelled { " (cancelled)" } else { "" }
    );
}

/// Runs one scraper command. With `json`, results are printed as JSON
/// instead of one line per item.
pub async fn handle_command(args: ScraperArgs, manager: &ScraperManager, json: bool) -> Result<()> {
    match args.command {
        ScraperCommands::Source { source } => {
            let source = source.filter(|s| !s.is_empty());
            let reports = manager.scrape_source(source.as_deref()).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&reports)?);
            } else {
                reports.iter().for_each(print_report);
            }
        }
        ScraperCommands::List => {
            let all = manager.get_all_scrapers();
            if json {
                let listing: Vec<_> = all
                    .iter()
                    .flat_map(|(region, sources)| {
                        sources.iter().map(move |meta| {
                            serde_json::json!({ "id": meta.id, "name": meta.name, "region": region })
                        })
                    })
                    .collect();
                println!("{}", serde_json::to_string_pretty(&listing)?);
            } else {
                for (region, sources) in all {
                    println!("{}:", region);
                    for meta in sources {
                        println!("  - {} {}", meta.emoji, meta.name);
                    }
                }
            }
        }
        ScraperCommands::Url { url } => {
            let (article, status) = manager.scrape_url(&url).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&article)?);
            } else {
                println!("{} {} - {}", status_emoji(status), article.title, article.url);
            }
        }
    }
    Ok(())
}
