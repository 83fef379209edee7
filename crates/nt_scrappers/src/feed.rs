//! RSS items to articles.

use std::sync::LazyLock;

use nt_core::{Article, Error, Result, Source};
use rss::{Channel, Item};
use scraper::{Html, Selector};
use tracing::warn;

use crate::toolkit::{dates, dom};

static PARAGRAPH: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("p").expect("PARAGRAPH is a valid static selector"));

/// Parses a whole feed. Items without a link are skipped; only a document
/// that is not RSS at all is an error.
pub fn parse_feed(bytes: &[u8], source: &Source) -> Result<Vec<Article>> {
    let channel = Channel::read_from(bytes)
        .map_err(|e| Error::Feed(format!("{}: {}", source.name, e)))?;

    Ok(channel
        .items()
        .iter()
        .filter_map(|item| {
            let article = to_article(item, source);
            if article.is_none() {
                warn!(source = %source.name, title = ?item.title(), "Skipping feed item without a link");
            }
            article
        })
        .collect())
}

pub fn to_article(item: &Item, source: &Source) -> Option<Article> {
    let url = item.link().map(str::trim).filter(|link| !link.is_empty())?;

    let mut article = Article::stub(source.id, &source.name, url);
    article.title = item.title().map(str::trim).unwrap_or_default().to_string();
    article.is_top_story = true;

    let dublin_core = item.dublin_core_ext();
    article.author = item
        .author()
        .filter(|author| !author.trim().is_empty())
        .or_else(|| dublin_core.and_then(|dc| dc.creators().first().map(String::as_str)))
        .map(|author| author.trim().to_string())
        .unwrap_or_default();

    article.description = item.description().map(first_paragraph_text).unwrap_or_default();

    match dublin_core.map(|dc| dc.subjects()).filter(|subjects| !subjects.is_empty()) {
        Some(subjects) => article.set_categories(subjects),
        None => article.set_categories(item.categories().iter().map(|c| c.name())),
    }

    article.published_date = dublin_core
        .and_then(|dc| dc.dates().iter().find_map(|date| dates::parse_iso(date)))
        .or_else(|| item.pub_date().and_then(dates::parse_iso))
        .unwrap_or(0);

    Some(article)
}

/// The direct text of the first `<p>` of an HTML description, or the whole
/// description as plain text when it has no paragraph.
pub fn first_paragraph_text(description: &str) -> String {
    let fragment = Html::parse_fragment(description);
    let text: String = match fragment.select(&PARAGRAPH).next() {
        Some(paragraph) => paragraph
            .children()
            .filter_map(|child| child.value().as_text().map(|text| text.text.to_string()))
            .collect(),
        None => fragment.root_element().text().collect(),
    };
    dom::collapse_whitespace(&text)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> Source {
        Source::new(1, "Reporterre", "https://reporterre.net/")
    }

    #[test]
    fn test_first_paragraph_text() {
        assert_eq!(first_paragraph_text("<p>Hello world</p><p>more</p>"), "Hello world");
        assert_eq!(
            first_paragraph_text("<p>Le <a href='x'>lien</a> exclu</p>"),
            "Le exclu"
        );
        assert_eq!(first_paragraph_text("Texte   brut"), "Texte brut");
        assert_eq!(first_paragraph_text(""), "");
    }

    #[test]
    fn test_item_without_link_is_skipped() {
        let item = Item {
            title: Some("Sans lien".to_string()),
            ..Default::default()
        };
        assert!(to_article(&item, &source()).is_none());
    }

    #[test]
    fn test_item_fields() {
        let item = Item {
            title: Some(" Un titre ".to_string()),
            link: Some("https://reporterre.net/Un-titre".to_string()),
            description: Some("<p>Chapô</p>".to_string()),
            pub_date: Some("Tue, 13 Oct 2020 09:40:19 +0000".to_string()),
            ..Default::default()
        };
        let article = to_article(&item, &source()).unwrap();

        assert_eq!(article.title, "Un titre");
        assert_eq!(article.url, "https://reporterre.net/Un-titre");
        assert_eq!(article.description, "Chapô");
        assert_eq!(article.published_date, 1_602_582_019_000);
        assert_eq!(article.source_id, 1);
        assert!(article.is_top_story);
        assert!(article.author.is_empty());
    }

    #[test]
    fn test_title_and_author_are_trimmed_only() {
        let item = Item {
            title: Some("  Climat :  le  point \n".to_string()),
            link: Some("https://reporterre.net/Climat-le-point".to_string()),
            ..Default::default()
        };
        let article = to_article(&item, &source()).unwrap();
        assert_eq!(article.title, "Climat :  le  point");

        let signed = Item {
            author: Some(" Hervé  Kempf ".to_string()),
            ..item
        };
        assert_eq!(to_article(&signed, &source()).unwrap().author, "Hervé  Kempf");
    }

    #[test]
    fn test_garbage_is_a_feed_error() {
        let err = parse_feed(b"<html>not a feed</html>", &source()).unwrap_err();
        assert!(matches!(err, Error::Feed(_)));
    }
}
