use std::sync::Arc;

use chrono::Days;
use reqwest::Url;
use shipquote_cache::ResponseCache;
use shipquote_models::config::{CarrierConfig, EngineConfig};
use shipquote_models::quote::{CandidateRequest, QuoteOutcome};
use shipquote_models::shipment::ShipmentContext;
use tracing::info;

use crate::aggregator::Aggregator;
use crate::diagnostics::DiagnosticsSink;
use crate::dispatcher::Dispatcher;
use crate::error::EngineError;
use crate::request::RequestBuilder;
use crate::transport::RatingTransport;

/// Multi-date rate quotation: build one request per candidate date,
/// dispatch, then select.
pub struct Quoter {
    builder: RequestBuilder,
    dispatcher: Dispatcher,
    aggregator: Aggregator,
    look_forward_days: u32,
}

impl Quoter {
    /// # Errors
    ///
    /// `EngineError::Configuration` when the selected gateway URL does not parse.
    pub fn new(
        transport: Arc<dyn RatingTransport>,
        cache: Arc<dyn ResponseCache>,
        diagnostics: Arc<dyn DiagnosticsSink>,
        carrier: CarrierConfig,
        engine: &EngineConfig,
    ) -> Result<Self, EngineError> {
        let endpoint = Url::parse(carrier.endpoint()).map_err(|e| {
            EngineError::Configuration(format!(
                "invalid gateway URL \"{}\": {e}",
                carrier.endpoint()
            ))
        })?;

        Ok(Self {
            builder: RequestBuilder::new(carrier),
            dispatcher: Dispatcher::new(transport, Arc::clone(&cache), endpoint),
            aggregator: Aggregator::new(cache, diagnostics, engine.unavailable_condition_code),
            look_forward_days: engine.look_forward_days,
        })
    }

    pub fn endpoint(&self) -> &Url {
        self.dispatcher.endpoint()
    }

    /// The requested ship date plus `look_forward_days` following days.
    pub fn candidates(&self, ctx: &ShipmentContext) -> Result<Vec<CandidateRequest>, EngineError> {
        (0..=self.look_forward_days)
            .map(|offset| {
                let ship_date = ctx
                    .ship_date
                    .checked_add_days(Days::new(u64::from(offset)))
                    .ok_or_else(|| {
                        EngineError::Configuration(format!(
                            "ship date {} + {offset} days is out of range",
                            ctx.ship_date
                        ))
                    })?;
                self.builder.build(ctx, offset as usize, ship_date)
            })
            .collect()
    }

    /// Quote a shipment. Carrier-side and network problems come back as
    /// [`QuoteOutcome::NoQuote`]; errors are reserved for defects.
    pub async fn quote(&self, ctx: &ShipmentContext) -> Result<QuoteOutcome, EngineError> {
        let candidates = self.candidates(ctx)?;
        info!(
            ship_date = %ctx.ship_date,
            candidates = candidates.len(),
            "Requesting rate quotes"
        );

        let pending = self.dispatcher.dispatch(candidates).await?;
        let cached = pending.iter().filter(|p| p.is_cached()).count();
        info!(
            cached,
            in_flight = pending.len() - cached,
            "Rate requests dispatched"
        );

        let outcome = self.aggregator.resolve(pending).await;
        match &outcome {
            QuoteOutcome::Quoted { ship_date, .. } => {
                info!(ship_date = %ship_date, "Rate quote selected");
            }
            QuoteOutcome::NoQuote { reason } => {
                info!(?reason, "No rate quote available");
            }
        }
        Ok(outcome)
    }
}
