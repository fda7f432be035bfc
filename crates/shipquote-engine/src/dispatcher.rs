use std::sync::Arc;

use reqwest::Url;
use shipquote_cache::ResponseCache;
use shipquote_models::quote::CandidateRequest;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::error::{EngineError, TransportError};
use crate::message::{stamp, MessageStamp, ServicePrefix};
use crate::transport::{OutboundRequest, RatingTransport, TransportResponse, XML_CONTENT_TYPE};

/// A candidate whose response is either already known or still on the wire.
#[derive(Debug)]
pub enum PendingFetch {
    Cached {
        candidate: CandidateRequest,
        body: String,
    },
    InFlight {
        candidate: CandidateRequest,
        handle: JoinHandle<Result<TransportResponse, TransportError>>,
    },
}

impl PendingFetch {
    pub fn is_cached(&self) -> bool {
        matches!(self, Self::Cached { .. })
    }
}

/// Fans candidates out: cache hits resolve immediately, misses are spawned
/// as independent tasks and left running.
///
/// Never writes the cache. Only the aggregator does, once a body is known
/// to be usable.
pub struct Dispatcher {
    transport: Arc<dyn RatingTransport>,
    cache: Arc<dyn ResponseCache>,
    endpoint: Url,
}

impl Dispatcher {
    pub fn new(
        transport: Arc<dyn RatingTransport>,
        cache: Arc<dyn ResponseCache>,
        endpoint: Url,
    ) -> Self {
        Self {
            transport,
            cache,
            endpoint,
        }
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    /// One [`PendingFetch`] per candidate. Does not wait on any network call.
    ///
    /// Cache read failures count as misses. The only error is a request
    /// document that cannot be stamped, which is a defect.
    pub async fn dispatch(
        &self,
        candidates: Vec<CandidateRequest>,
    ) -> Result<Vec<PendingFetch>, EngineError> {
        let mut pending = Vec::with_capacity(candidates.len());

        for candidate in candidates {
            let cached = match self.cache.get(&candidate.serialized_body).await {
                Ok(hit) => hit,
                Err(e) => {
                    warn!(ship_date = %candidate.ship_date, error = %e, "Cache lookup failed, fetching");
                    None
                }
            };

            if let Some(body) = cached {
                debug!(ship_date = %candidate.ship_date, "Serving rate response from cache");
                pending.push(PendingFetch::Cached { candidate, body });
                continue;
            }

            let header = MessageStamp::fresh(ServicePrefix::Quote);
            let request = OutboundRequest {
                url: self.endpoint.clone(),
                content_type: XML_CONTENT_TYPE,
                body: stamp(&candidate.serialized_body, &header)?,
            };
            debug!(
                ship_date = %candidate.ship_date,
                message_reference = %header.reference,
                "Dispatching rate request"
            );

            let transport = Arc::clone(&self.transport);
            let handle = tokio::spawn(async move { transport.post(request).await });
            pending.push(PendingFetch::InFlight { candidate, handle });
        }

        Ok(pending)
    }
}
