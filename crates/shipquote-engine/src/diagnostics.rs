//! Per-date audit records emitted after selection.

use chrono::NaiveDate;
use tracing::{debug, info};

/// Elements whose values never leave the process in a diagnostic record.
const REDACTED_ELEMENTS: [&str; 2] = ["SiteID", "Password"];
const MASK: &str = "****";

/// What selection concluded about one candidate date.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DateVerdict {
    Accepted,
    Unavailable { condition_code: u32 },
    Malformed { detail: String },
    /// No body at all: the request failed on the wire.
    TransportFailure { detail: String },
    /// Later than the date that stopped selection.
    NotEvaluated,
}

impl DateVerdict {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accepted => "accepted",
            Self::Unavailable { .. } => "unavailable",
            Self::Malformed { .. } => "malformed",
            Self::TransportFailure { .. } => "transport_failure",
            Self::NotEvaluated => "not_evaluated",
        }
    }
}

/// One resolved date: what went out, what came back, and where it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiagnosticRecord {
    pub ship_date: NaiveDate,
    /// Request document with credentials masked.
    pub request: String,
    pub response: String,
    pub from_cache: bool,
    pub verdict: DateVerdict,
}

impl DiagnosticRecord {
    pub fn new(
        ship_date: NaiveDate,
        request: &str,
        response: &str,
        from_cache: bool,
        verdict: DateVerdict,
    ) -> Self {
        Self {
            ship_date,
            request: redact(request),
            response: response.to_string(),
            from_cache,
            verdict,
        }
    }
}

pub trait DiagnosticsSink: Send + Sync {
    fn record(&self, record: &DiagnosticRecord);
}

/// Writes records through `tracing`. Bodies only appear at debug level.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticsSink for TracingSink {
    fn record(&self, record: &DiagnosticRecord) {
        info!(
            ship_date = %record.ship_date,
            from_cache = record.from_cache,
            verdict = record.verdict.as_str(),
            "Rate response resolved"
        );
        debug!(
            ship_date = %record.ship_date,
            request = %record.request,
            response = %record.response,
            "Rate exchange"
        );
    }
}

/// Mask credential element values in a request document.
pub fn redact(document: &str) -> String {
    let mut out = document.to_string();
    for element in REDACTED_ELEMENTS {
        out = mask_element(&out, element);
    }
    out
}

fn mask_element(document: &str, element: &str) -> String {
    let open = format!("<{element}>");
    let close = format!("</{element}>");
    let mut out = String::with_capacity(document.len());
    let mut rest = document;
    while let Some(start) = rest.find(&open) {
        let value_start = start + open.len();
        let Some(len) = rest[value_start..].find(&close) else {
            break;
        };
        out.push_str(&rest[..value_start]);
        out.push_str(MASK);
        out.push_str(&close);
        rest = &rest[value_start + len + close.len()..];
    }
    out.push_str(rest);
    out
}
