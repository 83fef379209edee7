use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A selector table entry that does not compile. This is a code defect,
    /// never a property of the page being parsed.
    #[error("Invalid selector: {0:?}")]
    Selector(String),

    /// A sanitation pipeline whose steps are declared in an order that
    /// cannot be executed.
    #[error("Invalid sanitation pipeline: {0}")]
    Pipeline(String),

    #[error("Feed error: {0}")]
    Feed(String),

    #[error("Fetch error: {0}")]
    Fetch(String),

    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    #[error("Scraping error: {0}")]
    Scraping(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("External error: {0}")]
    External(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
