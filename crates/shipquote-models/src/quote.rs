use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One rendered rate request for a single candidate ship date.
///
/// `serialized_body` is the deterministic request document and doubles as
/// the response cache key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateRequest {
    /// Position in the look-forward window (0 = requested ship date).
    pub sequence: usize,
    pub ship_date: NaiveDate,
    pub serialized_body: String,
}

/// A candidate after its response has been obtained, from cache or network.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedResponse {
    pub sequence: usize,
    pub ship_date: NaiveDate,
    pub request_body: String,
    /// Empty when the network call failed.
    pub response_body: String,
    pub served_from_cache: bool,
    /// Transport failure description, if the fetch failed.
    pub fetch_error: Option<String>,
}

/// Why no date in the window produced a usable quote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum NoQuoteReason {
    /// The carrier reported the first candidate date as unavailable.
    DateUnavailable {
        ship_date: NaiveDate,
        condition_code: u32,
    },
    /// The first candidate's body could not be read.
    MalformedResponse { ship_date: NaiveDate, detail: String },
    /// The first candidate's network call failed.
    TransportFailure { ship_date: NaiveDate, detail: String },
    /// Nothing was dispatched.
    NoCandidates,
}

/// Result of one quotation call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum QuoteOutcome {
    /// Body of the latest contiguous available date, passed on untouched.
    Quoted { ship_date: NaiveDate, body: String },
    NoQuote { reason: NoQuoteReason },
}

impl QuoteOutcome {
    /// Selected response body, or the empty string when there is no quote.
    pub fn body(&self) -> &str {
        match self {
            Self::Quoted { body, .. } => body,
            Self::NoQuote { .. } => "",
        }
    }

    pub fn is_quoted(&self) -> bool {
        matches!(self, Self::Quoted { .. })
    }

    pub fn ship_date(&self) -> Option<NaiveDate> {
        match self {
            Self::Quoted { ship_date, .. } => Some(*ship_date),
            Self::NoQuote { .. } => None,
        }
    }
}
