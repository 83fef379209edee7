use serde::{Deserialize, Serialize};

/// Separator used to encode [`Article::categories`].
pub const CATEGORY_SEPARATOR: char = '|';

/// Sentinel for a [`SourcePage`] whose ordering has not been assigned.
pub const UNSET_POSITION: i32 = -1;

/// A news article as produced by a feed item, a listing page or a full page
/// fetch. Fields that could not be extracted are left blank (or `0` for the
/// date) rather than failing the extraction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Storage identifier, `0` until persisted.
    pub id: i64,
    pub source_id: i64,
    pub source_name: String,
    pub url: String,
    pub title: String,
    pub section: String,
    pub theme: String,
    pub author: String,
    /// Epoch milliseconds, `0` when unknown.
    pub published_date: i64,
    /// Sanitized HTML fragment with absolute URLs.
    pub body: String,
    /// Ordered categories joined with [`CATEGORY_SEPARATOR`].
    pub categories: String,
    pub description: String,
    pub image_url: String,
    pub image_width: Option<u32>,
    pub image_height: Option<u32>,
    pub css_url: String,
    pub is_top_story: bool,
    pub read: bool,
}

impl Article {
    /// A listing stub: only the url (and possibly a date) is known.
    pub fn stub(source_id: i64, source_name: &str, url: impl Into<String>) -> Self {
        Self {
            source_id,
            source_name: source_name.to_string(),
            url: url.into(),
            ..Default::default()
        }
    }

    pub fn category_list(&self) -> Vec<String> {
        self.categories
            .split(CATEGORY_SEPARATOR)
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }

    pub fn set_categories<I, S>(&mut self, categories: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.categories = categories
            .into_iter()
            .map(|c| c.as_ref().trim().replace(CATEGORY_SEPARATOR, " "))
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(&CATEGORY_SEPARATOR.to_string());
    }

    pub fn has_date(&self) -> bool {
        self.published_date != 0
    }

    /// Folds a freshly extracted article into this one.
    ///
    /// Text fields are only replaced by non-blank values. A known
    /// publication date is never replaced; an unknown one takes the fresh
    /// value. Identity (`id`), the `read` flag and top-story status are kept.
    pub fn merge_from(&mut self, fresh: Article) {
        fn take(current: &mut String, fresh: String) {
            if !fresh.trim().is_empty() {
                *current = fresh;
            }
        }

        let fresh_date = fresh.published_date;
        if fresh.source_id != 0 {
            self.source_id = fresh.source_id;
        }
        take(&mut self.source_name, fresh.source_name);
        take(&mut self.url, fresh.url);
        take(&mut self.title, fresh.title);
        take(&mut self.section, fresh.section);
        take(&mut self.theme, fresh.theme);
        take(&mut self.author, fresh.author);
        take(&mut self.body, fresh.body);
        take(&mut self.categories, fresh.categories);
        take(&mut self.description, fresh.description);
        take(&mut self.css_url, fresh.css_url);

        if !fresh.image_url.trim().is_empty() {
            self.image_url = fresh.image_url;
            self.image_width = fresh.image_width;
            self.image_height = fresh.image_height;
        }

        if !self.has_date() && fresh_date != 0 {
            self.published_date = fresh_date;
        }

        self.is_top_story |= fresh.is_top_story;
    }
}

/// A publisher whose feed and pages are ingested.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Source {
    pub id: i64,
    pub name: String,
    pub url: String,
    pub is_enabled: bool,
}

impl Source {
    pub fn new(id: i64, name: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            url: url.into(),
            is_enabled: true,
        }
    }
}

/// A static, non-article page of a source ("about", "who we are", ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourcePage {
    pub id: i64,
    pub source_id: i64,
    pub url: String,
    pub button_name: String,
    pub title: String,
    pub body: String,
    pub css_url: String,
    pub position: i32,
    pub is_primary: bool,
}

impl SourcePage {
    pub fn new(source_id: i64, url: impl Into<String>) -> Self {
        Self {
            id: 0,
            source_id,
            url: url.into(),
            button_name: String::new(),
            title: String::new(),
            body: String::new(),
            css_url: String::new(),
            position: UNSET_POSITION,
            is_primary: false,
        }
    }
}

/// A cached stylesheet so article bodies keep the publisher's styling.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Css {
    pub id: i64,
    pub url: String,
    pub style: String,
}

impl Css {
    pub fn new(url: impl Into<String>, style: impl Into<String>) -> Self {
        Self {
            id: 0,
            url: url.into(),
            style: style.into(),
        }
    }
}
