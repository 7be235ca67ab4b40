pub mod accumulator;
pub mod budget;
pub mod discovery;
pub mod error;
pub mod parse;
pub mod resolver;
pub mod run;
pub mod selectors;
pub mod surface;
pub mod webdriver;

pub use accumulator::{accumulate_records, Accumulation, AccumulationStop};
pub use budget::Budget;
pub use discovery::{discover_listings, Discovery, DiscoverySettings, DiscoveryStop};
pub use error::{RunAborted, ScrapeError, SurfaceError};
pub use resolver::{ExtractionPlan, FieldResolver, OpenTier, Strategy};
pub use run::{scrape_query, ScrapeReport};
pub use surface::{AutomationSurface, SessionGuard};
pub use webdriver::{ElementRef, WebDriverError, WebDriverSurface};
