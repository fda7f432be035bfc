pub mod cache_schema;
pub mod config;
pub mod quote;
pub mod shipment;

pub use cache_schema::CacheRow;
pub use config::{CacheConfig, CarrierConfig, EngineConfig, ShipquoteConfig};
pub use quote::{CandidateRequest, NoQuoteReason, QuoteOutcome, ResolvedResponse};
pub use shipment::{ContentType, Item, Package, Party, PaymentType, ShipmentContext};
