use crate::scrapers::Region;

pub mod acrimed;
pub mod basta;
pub mod diplo;
pub mod reporterre;

pub use acrimed::AcrimedScraper;
pub use basta::BastaScraper;
pub use diplo::DiploScraper;
pub use reporterre::ReporterreScraper;

pub const REGION: Region = Region {
    name: "france",
    emoji: "🇫🇷",
};
