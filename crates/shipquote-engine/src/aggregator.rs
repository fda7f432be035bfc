use std::sync::Arc;

use chrono::NaiveDate;
use shipquote_cache::ResponseCache;
use shipquote_models::quote::{NoQuoteReason, QuoteOutcome, ResolvedResponse};
use tracing::{error, info, warn};

use crate::diagnostics::{DateVerdict, DiagnosticRecord, DiagnosticsSink};
use crate::dispatcher::PendingFetch;
use crate::error::TransportError;
use crate::response::{inspect_response, ResponseVerdict};

/// Fan-in point of a quotation call: waits for every fetch, then picks the
/// latest date of the contiguous available run starting at the first
/// candidate.
pub struct Aggregator {
    cache: Arc<dyn ResponseCache>,
    diagnostics: Arc<dyn DiagnosticsSink>,
    unavailable_code: u32,
}

impl Aggregator {
    pub fn new(
        cache: Arc<dyn ResponseCache>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        unavailable_code: u32,
    ) -> Self {
        Self {
            cache,
            diagnostics,
            unavailable_code,
        }
    }

    pub async fn resolve(&self, pending: Vec<PendingFetch>) -> QuoteOutcome {
        let resolved = collect(pending).await;
        self.select(resolved).await
    }

    /// Walk candidates in date order. Every available date is cached and
    /// becomes the current best; the first unavailable or unreadable date
    /// ends the walk and later dates are never inspected.
    pub async fn select(&self, mut resolved: Vec<ResolvedResponse>) -> QuoteOutcome {
        resolved.sort_by_key(|r| (r.ship_date, r.sequence));

        let mut best: Option<(NaiveDate, String)> = None;
        let mut stop: Option<NoQuoteReason> = None;

        for entry in resolved.iter() {
            if stop.is_some() {
                self.emit(entry, DateVerdict::NotEvaluated);
                continue;
            }

            let verdict = match &entry.fetch_error {
                Some(detail) => Err(NoQuoteReason::TransportFailure {
                    ship_date: entry.ship_date,
                    detail: detail.clone(),
                }),
                None => match inspect_response(&entry.response_body, self.unavailable_code) {
                    Ok(ResponseVerdict::Available) => Ok(()),
                    Ok(ResponseVerdict::Unavailable { condition_code }) => {
                        Err(NoQuoteReason::DateUnavailable {
                            ship_date: entry.ship_date,
                            condition_code,
                        })
                    }
                    Err(e) => Err(NoQuoteReason::MalformedResponse {
                        ship_date: entry.ship_date,
                        detail: e.to_string(),
                    }),
                },
            };

            match verdict {
                Ok(()) => {
                    if let Err(e) = self
                        .cache
                        .set(&entry.request_body, &entry.response_body)
                        .await
                    {
                        warn!(ship_date = %entry.ship_date, error = %e, "Failed to cache rate response");
                    }
                    best = Some((entry.ship_date, entry.response_body.clone()));
                    self.emit(entry, DateVerdict::Accepted);
                }
                Err(reason) => {
                    info!(ship_date = %entry.ship_date, ?reason, "Candidate date not usable, stopping selection");
                    self.emit(entry, date_verdict(&reason));
                    stop = Some(reason);
                }
            }
        }

        match best {
            Some((ship_date, body)) => QuoteOutcome::Quoted { ship_date, body },
            None => QuoteOutcome::NoQuote {
                reason: stop.unwrap_or(NoQuoteReason::NoCandidates),
            },
        }
    }

    fn emit(&self, entry: &ResolvedResponse, verdict: DateVerdict) {
        self.diagnostics.record(&DiagnosticRecord::new(
            entry.ship_date,
            &entry.request_body,
            &entry.response_body,
            entry.served_from_cache,
            verdict,
        ));
    }
}

/// Await every in-flight fetch. Failures become empty bodies; nothing here
/// cancels a sibling.
pub async fn collect(pending: Vec<PendingFetch>) -> Vec<ResolvedResponse> {
    let mut resolved = Vec::with_capacity(pending.len());

    for fetch in pending {
        match fetch {
            PendingFetch::Cached { candidate, body } => resolved.push(ResolvedResponse {
                sequence: candidate.sequence,
                ship_date: candidate.ship_date,
                request_body: candidate.serialized_body,
                response_body: body,
                served_from_cache: true,
                fetch_error: None,
            }),
            PendingFetch::InFlight { candidate, handle } => {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(join_error) => {
                        error!(ship_date = %candidate.ship_date, error = %join_error, "Rate fetch task failed");
                        Err(TransportError::Task(join_error.to_string()))
                    }
                };

                let (response_body, fetch_error) = match result {
                    Ok(response) => (response.body, None),
                    Err(e) => {
                        warn!(ship_date = %candidate.ship_date, error = %e, "Rate request failed");
                        (String::new(), Some(e.to_string()))
                    }
                };

                resolved.push(ResolvedResponse {
                    sequence: candidate.sequence,
                    ship_date: candidate.ship_date,
                    request_body: candidate.serialized_body,
                    response_body,
                    served_from_cache: false,
                    fetch_error,
                });
            }
        }
    }

    resolved
}

fn date_verdict(reason: &NoQuoteReason) -> DateVerdict {
    match reason {
        NoQuoteReason::DateUnavailable { condition_code, .. } => DateVerdict::Unavailable {
            condition_code: *condition_code,
        },
        NoQuoteReason::MalformedResponse { detail, .. } => DateVerdict::Malformed {
            detail: detail.clone(),
        },
        NoQuoteReason::TransportFailure { detail, .. } => DateVerdict::TransportFailure {
            detail: detail.clone(),
        },
        NoQuoteReason::NoCandidates => DateVerdict::NotEvaluated,
    }
}
