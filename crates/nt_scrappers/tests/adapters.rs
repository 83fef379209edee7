use nt_scrappers::prelude::*;
use nt_scrappers::scrapers::france::{AcrimedScraper, BastaScraper, DiploScraper, ReporterreScraper};

const REPORTERRE_ARTICLE: &str = include_str!("fixtures/reporterre/article.html");
const REPORTERRE_LISTING: &str = include_str!("fixtures/reporterre/listing_1.html");
const REPORTERRE_LISTING_2: &str = include_str!("fixtures/reporterre/listing_2.html");
const REPORTERRE_ABOUT: &str = include_str!("fixtures/reporterre/about.html");
const BASTA_ARTICLE: &str = include_str!("fixtures/basta/article.html");
const ACRIMED_ARTICLE: &str = include_str!("fixtures/acrimed/article.html");
const DIPLO_ARTICLE: &str = include_str!("fixtures/diplo/article.html");

fn page_for(scraper: &dyn Scraper, url: &str, html: &str) -> Page {
    Page::new(scraper.source_metadata().id, url, scraper.base_url(), html)
}

fn assert_no_relative_links(body: &str) {
    for attr in ["href=\"/", "src=\"/", "href=\"spip", "src=\"IMG"] {
        assert!(!body.contains(attr), "relative link left in body: {attr}");
    }
    assert!(!body.contains("http://"));
}

#[test]
fn test_reporterre_article() {
    let scraper = ReporterreScraper::new();
    let page = page_for(&scraper, "https://reporterre.net/Les-rivieres-francaises-s-assechent", REPORTERRE_ARTICLE);
    let article = scraper.extract_article(&page).unwrap();

    assert_eq!(article.title, "Les rivières françaises s’assèchent");
    assert_eq!(article.section, "Eau");
    assert_eq!(article.theme, "Sécheresse");
    assert_eq!(article.author, "Lorène Lavocat");
    assert_eq!(article.published_date, 1_602_582_019_000);
    assert_eq!(article.description, "En 2020, la sécheresse a frappé la moitié des départements.");
    assert_eq!(article.image_url, "https://reporterre.net/IMG/arton21345.jpg");
    assert_eq!(article.image_width, Some(800));
    assert_eq!(article.image_height, Some(533));
    assert_eq!(article.css_url, "https://reporterre.net/squelettes/css/reporterre.css");
    assert_eq!(article.source_id, 1);

    let body = &article.body;
    assert!(body.starts_with(r#"<div class="texte-article reporterre-article">"#));
    assert!(body.contains(r#"href="https://reporterre.net/Rivieres""#));
    assert!(body.contains("https://reporterre.net/IMG/a-400.jpg 400w, https://reporterre.net/IMG/a-800.jpg 800w"));
    assert!(body.contains(r#"src="https://reporterre.net/IMG/a.jpg""#));
    assert!(body.contains("https://www.eaufrance.fr/"));
    assert!(body.contains("Selon les relevés"));
    assert!(!body.contains("onclick"));
    assert!(!body.contains("rapport.pdf"));
    assert!(!body.contains("Partager"));
    assert!(!body.contains("Soutenez"));
    assert!(!body.contains("track()"));
    assert!(!body.contains('#'));
    assert_no_relative_links(body);
}

#[test]
fn test_extraction_is_deterministic() {
    let scraper = ReporterreScraper::new();
    let page = page_for(&scraper, "https://reporterre.net/X", REPORTERRE_ARTICLE);
    assert_eq!(scraper.extract_article(&page).unwrap(), scraper.extract_article(&page).unwrap());

    let scraper = BastaScraper::new();
    let page = page_for(&scraper, "https://basta.media/X", BASTA_ARTICLE);
    assert_eq!(scraper.extract_article(&page).unwrap(), scraper.extract_article(&page).unwrap());
}

#[test]
fn test_merge_into_feed_stub_keeps_feed_date() {
    let scraper = ReporterreScraper::new();
    let url = "https://reporterre.net/Les-rivieres-francaises-s-assechent";
    let page = page_for(&scraper, url, REPORTERRE_ARTICLE);

    let mut stub = Article::stub(1, "Reporterre", url);
    stub.published_date = 1_602_460_800_000;
    stub.description = "Hello world".to_string();
    stub.categories = "Eau|Climat".to_string();
    stub.is_top_story = true;
    scraper.extract_article_into(&page, &mut stub).unwrap();

    assert_eq!(stub.published_date, 1_602_460_800_000);
    assert_eq!(stub.categories, "Eau|Climat");
    assert!(stub.is_top_story);
    assert_eq!(stub.title, "Les rivières françaises s’assèchent");
    assert!(stub.description.starts_with("En 2020"));
}

#[test]
fn test_reporterre_listing() {
    let scraper = ReporterreScraper::new();
    let page = page_for(&scraper, "https://reporterre.net/Climat", REPORTERRE_LISTING);
    let stubs = scraper.extract_category_listing(&page).unwrap();

    let urls: Vec<_> = stubs.iter().map(|s| s.url.as_str()).collect();
    assert_eq!(
        urls,
        vec![
            "https://reporterre.net/Deuxieme",
            "https://reporterre.net/Les-rivieres-francaises-s-assechent",
            "https://reporterre.net/Troisieme",
        ]
    );
    assert!(stubs[0].is_top_story);
    assert!(stubs[1..].iter().all(|s| !s.is_top_story));
    assert_eq!(stubs[1].published_date, 1_602_547_200_000);
    assert_eq!(stubs[2].published_date, 1_602_374_400_000);
    assert!(stubs.iter().all(|s| s.title.is_empty() && s.body.is_empty()));

    assert_eq!(
        scraper.next_listing_page(&page).unwrap().as_deref(),
        Some("https://reporterre.net/Climat?debut_articles=10")
    );
    let last = page_for(&scraper, "https://reporterre.net/Climat?debut_articles=20", REPORTERRE_LISTING_2);
    assert_eq!(scraper.next_listing_page(&last).unwrap(), None);
}

#[test]
fn test_reporterre_source_pages() {
    let scraper = ReporterreScraper::new();
    let page = page_for(&scraper, "https://reporterre.net/Qui-sommes-nous", REPORTERRE_ABOUT);
    let pages = scraper.extract_source_pages(&page).unwrap();

    assert_eq!(pages.len(), 2);
    assert!(pages[0].is_primary);
    assert_eq!(pages[0].position, 0);
    assert_eq!(pages[0].button_name, "Qui sommes-nous");
    assert_eq!(pages[0].title, "Qui sommes-nous");
    assert!(pages[0].body.contains("https://reporterre.net/Contact"));
    assert!(!pages[0].body.contains("Nous soutenir"));

    let mut secondary = pages[1].clone();
    assert!(!secondary.is_primary);
    assert_eq!(secondary.position, 1);
    assert_eq!(secondary.button_name, "Nous soutenir");
    assert_eq!(secondary.url, "https://reporterre.net/Nous-soutenir");

    let support = page_for(
        &scraper,
        &secondary.url,
        r#"<h1>Nous soutenir</h1><div class="texte"><p>Faites un don.</p></div>"#,
    );
    scraper.complete_source_page(&mut secondary, &support).unwrap();
    assert_eq!(secondary.title, "Nous soutenir");
    assert!(secondary.body.contains("Faites un don."));
    assert!(!secondary.is_primary);
    assert_eq!(secondary.position, 1);
}

#[test]
fn test_basta_article() {
    let scraper = BastaScraper::new();
    let page = page_for(&scraper, "https://basta.media/Face-aux-pesticides", BASTA_ARTICLE);
    let article = scraper.extract_article(&page).unwrap();

    assert_eq!(article.title, "Face aux pesticides, des riverains s’organisent");
    assert_eq!(article.section, "Écologie");
    assert_eq!(article.theme, "Agriculture");
    assert_eq!(article.author, "Sophie Chapelle");
    assert_eq!(article.published_date, 1_614_765_600_000);
    assert_eq!(article.description, "Dans la Drôme, des habitants documentent les épandages.");
    assert_eq!(
        article.image_url,
        "https://basta.media/local/cache-vignettes/L720xH480/pesticides.jpg"
    );
    assert_eq!(article.image_width, Some(720));
    assert_eq!(article.image_height, Some(480));
    assert_eq!(article.css_url, "https://basta.media/squelettes/basta.css?1612");

    let body = &article.body;
    assert!(body.contains("https://basta.media/spip.php?page=article"));
    assert!(body.contains("https://www.youtube.com/embed/abc"));
    assert!(body.contains("%23pesticides"));
    assert!(body.contains("Chiffres de la préfecture"));
    assert!(!body.contains("Soutenez"));
    assert!(!body.contains("Commenter"));
    assert_no_relative_links(body);
}

#[test]
fn test_acrimed_article() {
    let scraper = AcrimedScraper::new();
    let page = page_for(&scraper, "https://www.acrimed.org/JT-une-semaine-ordinaire", ACRIMED_ARTICLE);
    let article = scraper.extract_article(&page).unwrap();

    assert_eq!(article.title, "JT : une semaine ordinaire");
    assert_eq!(article.section, "Journalisme");
    assert_eq!(article.author, "Pauline Perrenot, Mathias Reymond");
    assert_eq!(article.published_date, 1_610_699_400_000);
    assert_eq!(article.description, "Retour sur une semaine de journaux télévisés.");
    assert!(article.image_url.is_empty());
    assert_eq!(article.image_width, None);
    assert_eq!(article.css_url, "https://www.acrimed.org/squelettes/css/acrimed.css");

    let body = &article.body;
    assert_eq!(body.matches("Note incluse dans le texte").count(), 1);
    assert!(body.contains("https://www.acrimed.org/Autre-article"));
    assert!(!body.contains("Partager"));
    assert_no_relative_links(body);
}

#[test]
fn test_diplo_article() {
    let scraper = DiploScraper::new();
    let page = page_for(&scraper, "https://www.monde-diplomatique.fr/2020/10/HALIMI/62288", DIPLO_ARTICLE);
    let article = scraper.extract_article(&page).unwrap();

    assert_eq!(article.title, "Informer sur le climat");
    assert_eq!(article.theme, "Médias");
    assert!(article.section.is_empty());
    assert_eq!(article.author, "Serge Halimi");
    assert_eq!(article.published_date, 1_601_510_400_000);
    assert_eq!(article.description, "Les rédactions découvrent l’urgence.");
    assert_eq!(article.image_url, "https://www.monde-diplomatique.fr/IMG/climat-400.jpg");
    assert_eq!(article.css_url, "https://www.monde-diplomatique.fr/squelettes/css/diplo.css");

    let body = &article.body;
    assert!(body.contains("https://www.monde-diplomatique.fr/2020/09/A/62200"));
    assert!(body.contains("Voir le dossier"));
    assert!(!body.contains("Abonnez-vous"));
    assert_no_relative_links(body);
}

#[test]
fn test_blank_page_yields_blank_fields() {
    for factory in nt_scrappers::get_scraper_factories() {
        let scraper = factory();
        let page = page_for(scraper.as_ref(), "https://example.org/vide", "<html><body></body></html>");
        let article = scraper.extract_article(&page).unwrap();

        assert!(article.title.is_empty());
        assert!(article.body.is_empty());
        assert_eq!(article.published_date, 0);
        assert_eq!(article.url, "https://example.org/vide");
        assert!(scraper.extract_category_listing(&page).unwrap().is_empty());
        assert_eq!(scraper.next_listing_page(&page).unwrap(), None);

        let pages = scraper.extract_source_pages(&page).unwrap();
        assert_eq!(pages.len(), 1);
        assert!(pages[0].is_primary);
    }
}
