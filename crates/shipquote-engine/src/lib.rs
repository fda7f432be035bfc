pub mod aggregator;
pub mod customs;
pub mod diagnostics;
pub mod dispatcher;
pub mod error;
pub mod fields;
pub mod message;
pub mod quoter;
pub mod request;
pub mod response;
pub mod transport;

pub mod test_support;

pub use aggregator::Aggregator;
pub use diagnostics::{DateVerdict, DiagnosticRecord, DiagnosticsSink, TracingSink};
pub use dispatcher::{Dispatcher, PendingFetch};
pub use error::{EngineError, ResponseError, TransportError};
pub use message::{MessageStamp, ServicePrefix};
pub use quoter::Quoter;
pub use request::RequestBuilder;
pub use response::{inspect_response, ResponseVerdict};
pub use transport::{HttpTransport, OutboundRequest, RatingTransport, TransportResponse};
