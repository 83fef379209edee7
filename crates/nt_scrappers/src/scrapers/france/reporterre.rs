use crate::scrapers::cascade::Candidate;
use crate::scrapers::profile::{ArticleSelectors, ListingSelectors, PageSelectors, SiteProfile};
use crate::scrapers::sanitize::SanitizeStep;
use crate::scrapers::{Scraper, SourceMetadata};

use super::REGION;

const PROFILE: SiteProfile = SiteProfile {
    name: "Reporterre",
    base_url: "https://reporterre.net/",
    host: "reporterre.net",
    feed_path: "spip.php?page=backend",
    listing_paths: &["Climat", "Alternatives", "Luttes", "Animaux"],
    page_paths: &["Qui-sommes-nous"],
    stylesheet: "link[rel='stylesheet'][href*='squelettes']",
    article: ArticleSelectors {
        title: &[
            Candidate::Text("h1.titre-article"),
            Candidate::Meta("og:title"),
            Candidate::Text("h1"),
        ],
        section: &[Candidate::Text(".ariane a.rubrique")],
        theme: &[Candidate::Text(".surtitre")],
        author: &[
            Candidate::Text(".auteurs .auteur"),
            Candidate::JsonLdAuthor,
            Candidate::Meta("author"),
        ],
        date: &[
            Candidate::Attr("time.date-publication", "datetime"),
            Candidate::Meta("article:published_time"),
            Candidate::Text(".date-publication"),
        ],
        description: &[Candidate::Text(".chapo"), Candidate::Meta("og:description")],
        body: "div.texte-article",
        image: ".logo-article img",
    },
    listing: ListingSelectors {
        item: ".liste-articles article",
        link: "a.lien-article",
        date: &[Candidate::Attr("time", "datetime"), Candidate::Text(".date")],
        top_story: Some(".une article"),
        next_page: Some(".pagination a.suivant"),
    },
    pages: PageSelectors {
        title: &[Candidate::Text("h1"), Candidate::Meta("og:title")],
        body: "div.texte",
        nav_buttons: &["bouton-page"],
        primary_button: "Qui sommes-nous",
    },
    pipeline: &[
        SanitizeStep::AppendFootnotes("div.notes"),
        SanitizeStep::RewriteUrls,
        SanitizeStep::MarkCssAnchor("reporterre-article"),
        SanitizeStep::StripWidgets(&["div.forum", ".partage", ".don-encart", "script"]),
        SanitizeStep::EscapeHashtags,
        SanitizeStep::ForceHttps,
    ],
};

#[derive(Debug, Clone, Default)]
pub struct ReporterreScraper;

impl ReporterreScraper {
    pub fn new() -> Self {
        Self
    }
}

impl Scraper for ReporterreScraper {
    fn profile(&self) -> &'static SiteProfile {
        &PROFILE
    }

    fn source_metadata(&self) -> SourceMetadata {
        SourceMetadata {
            id: 1,
            name: "Reporterre",
            emoji: "🌱",
            region: REGION,
        }
    }

    fn cli_names(&self) -> Vec<&str> {
        vec!["reporterre"]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::page::Page;

    fn page(url: &str, html: &str) -> Page {
        Page::new(1, url, PROFILE.base_url, html)
    }

    #[test]
    fn test_profile_is_valid() {
        PROFILE.validate().unwrap();
    }

    #[test]
    fn test_can_handle() {
        let scraper = ReporterreScraper::new();
        assert!(scraper.can_handle("https://reporterre.net/Le-climat"));
        assert!(!scraper.can_handle("https://basta.media/Le-climat"));
    }

    #[test]
    fn test_article_falls_back_to_og_title() {
        let html = r#"<html><head>
            <meta property="og:title" content="Titre depuis og">
            <meta property="article:published_time" content="2020-10-13T09:40:19+00:00">
            </head><body><div class="texte-article"><p>Texte</p></div></body></html>"#;
        let article = ReporterreScraper::new()
            .extract_article(&page("https://reporterre.net/X", html))
            .unwrap();

        assert_eq!(article.title, "Titre depuis og");
        assert_eq!(article.published_date, 1_602_582_019_000);
        assert_eq!(article.source_name, "Reporterre");
        assert!(article.body.contains("reporterre-article"));
    }

    #[test]
    fn test_listing_puts_top_story_first() {
        let html = r#"<html><body>
            <section class="une"><article><a class="lien-article" href="/B">B</a></article></section>
            <div class="liste-articles">
              <article><a class="lien-article" href="/A">A</a><time datetime="2020-10-12">12 oct.</time></article>
              <article><a class="lien-article" href="/B">B</a></article>
              <article><span>sans lien</span></article>
            </div></body></html>"#;
        let stubs = ReporterreScraper::new()
            .extract_category_listing(&page("https://reporterre.net/Climat", html))
            .unwrap();

        let urls: Vec<_> = stubs.iter().map(|a| a.url.as_str()).collect();
        assert_eq!(urls, vec!["https://reporterre.net/B", "https://reporterre.net/A"]);
        assert!(stubs[0].is_top_story);
        assert!(!stubs[1].is_top_story);
        assert_eq!(stubs[1].published_date, 1_602_460_800_000);
    }
}
