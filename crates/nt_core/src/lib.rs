pub mod error;
pub mod storage;
pub mod types;

pub use error::{Error, Result};
pub use storage::{ArticleStatus, ArticleStorage};
pub use types::{Article, Css, Source, SourcePage, CATEGORY_SEPARATOR, UNSET_POSITION};
