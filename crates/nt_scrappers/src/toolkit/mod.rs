//! Site-independent building blocks the adapters compose: DOM queries, URL
//! rewriting and date parsing.

pub mod dates;
pub mod dom;
pub mod urls;

pub use dom::Dom;
