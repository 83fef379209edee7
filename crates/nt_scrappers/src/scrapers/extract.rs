//! Extraction shared by every adapter, driven by its [`SiteProfile`].

use std::collections::HashSet;

use kuchikiki::NodeRef;
use nt_core::{Article, Result, SourcePage};
use tracing::debug;

use crate::page::Page;
use crate::scrapers::cascade::{first_date, first_non_blank, Candidate};
use crate::scrapers::profile::SiteProfile;
use crate::scrapers::sanitize::sanitize;
use crate::toolkit::{dom, urls, Dom};

pub fn extract_article(profile: &SiteProfile, page: &Page) -> Result<Article> {
    let dom = Dom::parse(&page.html);
    let root = dom.root();
    let selectors = &profile.article;

    let mut article = Article::stub(page.source_id, profile.name, page.url.clone());
    article.title = field(root, selectors.title, "title", page)?;
    article.section = field(root, selectors.section, "section", page)?;
    article.theme = field(root, selectors.theme, "theme", page)?;
    article.author = field(root, selectors.author, "author", page)?;
    article.description = field(root, selectors.description, "description", page)?;
    article.published_date = first_date(root, selectors.date)?.unwrap_or(0);
    article.css_url = stylesheet_url(root, profile, page)?;

    if let Some(image) = dom::select_first(root, selectors.image)? {
        article.image_url = image_source(&image)
            .map(|src| urls::to_absolute(&src, &page.base_url))
            .unwrap_or_default();
        article.image_width = dimension(&image, "width");
        article.image_height = dimension(&image, "height");
    }
    if article.image_url.is_empty() {
        article.image_url = Candidate::Meta("og:image")
            .extract(root)?
            .map(|src| urls::to_absolute(&src, &page.base_url))
            .unwrap_or_default();
    }

    // The body goes last: sanitation mutates the tree the other fields
    // were read from.
    match dom::select_first(root, selectors.body)? {
        Some(body) => {
            article.body = sanitize(&body, root, &page.base_url, profile.pipeline)?;
        }
        None => debug!(url = %page.url, "No article body matching {}", selectors.body),
    }

    Ok(article)
}

/// Extracts `page` and folds the result into `article`: only non-blank
/// fresh values replace existing ones.
pub fn extract_article_into(profile: &SiteProfile, page: &Page, article: &mut Article) -> Result<()> {
    let fresh = extract_article(profile, page)?;
    article.merge_from(fresh);
    Ok(())
}

pub fn extract_category_listing(profile: &SiteProfile, page: &Page) -> Result<Vec<Article>> {
    let dom = Dom::parse(&page.html);
    let root = dom.root();
    let selectors = &profile.listing;

    let mut seen = HashSet::new();
    let mut articles = Vec::new();

    if let Some(top_selector) = selectors.top_story {
        if let Some(top) = dom::select_first(root, top_selector)? {
            if let Some(mut stub) = listing_stub(&top, profile, page)? {
                stub.is_top_story = true;
                seen.insert(stub.url.clone());
                articles.push(stub);
            }
        }
    }

    for item in dom::select_all(root, selectors.item)? {
        match listing_stub(&item, profile, page)? {
            Some(stub) if seen.insert(stub.url.clone()) => articles.push(stub),
            Some(_) => {}
            None => debug!(url = %page.url, "Listing item without a link"),
        }
    }

    Ok(articles)
}

pub fn next_listing_page(profile: &SiteProfile, page: &Page) -> Result<Option<String>> {
    let Some(selector) = profile.listing.next_page else {
        return Ok(None);
    };
    let dom = Dom::parse(&page.html);
    Ok(dom
        .select_first(selector)?
        .and_then(|anchor| dom::attr_non_blank(&anchor, "href"))
        .map(|href| urls::to_absolute(&href, &page.base_url))
        .filter(|next| next != &page.url))
}

pub fn extract_source_pages(profile: &SiteProfile, page: &Page) -> Result<Vec<SourcePage>> {
    let mut primary = SourcePage::new(page.source_id, page.url.clone());
    primary.is_primary = true;
    primary.position = 0;
    primary.button_name = profile.pages.primary_button.to_string();

    let buttons = fill_source_page(profile, page, &mut primary)?;

    let mut seen = HashSet::from([primary.url.clone()]);
    let mut pages = vec![primary];
    for (name, url) in buttons {
        if !seen.insert(url.clone()) {
            continue;
        }
        let mut stub = SourcePage::new(page.source_id, url);
        stub.button_name = name;
        stub.position = pages.len() as i32;
        pages.push(stub);
    }
    Ok(pages)
}

/// Fills title, body and stylesheet of a secondary page from its own
/// document. Position, button name and primary flag are kept.
pub fn complete_source_page(profile: &SiteProfile, stub: &mut SourcePage, page: &Page) -> Result<()> {
    fill_source_page(profile, page, stub)?;
    Ok(())
}

/// Reads a static page into `target` and returns the navigation buttons
/// found in its body as `(label, absolute url)`. The buttons are detached
/// before the body is serialized.
fn fill_source_page(
    profile: &SiteProfile,
    page: &Page,
    target: &mut SourcePage,
) -> Result<Vec<(String, String)>> {
    let dom = Dom::parse(&page.html);
    let root = dom.root();

    if let Some(title) = first_non_blank(root, profile.pages.title)? {
        target.title = title;
    }
    let css_url = stylesheet_url(root, profile, page)?;
    if !css_url.is_empty() {
        target.css_url = css_url;
    }

    let Some(body) = dom::select_first(root, profile.pages.body)? else {
        debug!(url = %page.url, "No page body matching {}", profile.pages.body);
        return Ok(Vec::new());
    };

    let mut buttons = Vec::new();
    for anchor in dom::get_all(&body, "a") {
        let is_button = profile
            .pages
            .nav_buttons
            .iter()
            .any(|class| dom::has_attr_value(&anchor, "class", class));
        if !is_button {
            continue;
        }
        let label = dom::text_of(&anchor);
        let href = dom::attr_non_blank(&anchor, "href").filter(|href| !href.starts_with('#'));
        anchor.detach();
        if let Some(href) = href {
            buttons.push((label, urls::to_absolute(&href, &page.base_url)));
        }
    }

    target.body = sanitize(&body, root, &page.base_url, profile.pipeline)?;
    Ok(buttons)
}

fn listing_stub(item: &NodeRef, profile: &SiteProfile, page: &Page) -> Result<Option<Article>> {
    let Some(href) = dom::select_first(item, profile.listing.link)?
        .and_then(|anchor| dom::attr_non_blank(&anchor, "href"))
    else {
        return Ok(None);
    };

    let mut stub = Article::stub(page.source_id, profile.name, urls::to_absolute(&href, &page.base_url));
    stub.published_date = first_date(item, profile.listing.date)?.unwrap_or(0);
    Ok(Some(stub))
}

fn field(root: &NodeRef, candidates: &[Candidate], name: &str, page: &Page) -> Result<String> {
    let value = first_non_blank(root, candidates)?;
    if value.is_none() && !candidates.is_empty() {
        debug!(url = %page.url, field = name, "No value found");
    }
    Ok(value.unwrap_or_default())
}

fn stylesheet_url(root: &NodeRef, profile: &SiteProfile, page: &Page) -> Result<String> {
    Ok(dom::select_first(root, profile.stylesheet)?
        .and_then(|link| dom::attr_non_blank(&link, "href"))
        .map(|href| urls::to_absolute(&href, &page.base_url))
        .unwrap_or_default())
}

fn image_source(image: &NodeRef) -> Option<String> {
    dom::attr_non_blank(image, "src")
        .or_else(|| dom::attr_non_blank(image, "data-src"))
        .or_else(|| dom::attr_non_blank(image, "srcset").and_then(|set| urls::first_src_set_url(&set)))
}

fn dimension(image: &NodeRef, attr: &str) -> Option<u32> {
    dom::attr_non_blank(image, attr)?
        .trim_end_matches("px")
        .parse()
        .ok()
}
