//! Fixtures and fakes for exercising the engine without a carrier account.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use shipquote_models::config::CarrierConfig;
use shipquote_models::shipment::{ContentType, Item, Package, Party, ShipmentContext};

use crate::diagnostics::{DiagnosticRecord, DiagnosticsSink};
use crate::error::TransportError;
use crate::transport::{OutboundRequest, RatingTransport, TransportResponse};

#[derive(Debug, Clone)]
enum Script {
    Respond(String),
    Fail(TransportError),
}

/// Transport that answers by the `<Date>` found in the request body.
///
/// Dates with no script fail with an HTTP error. Every call is logged.
#[derive(Debug, Default)]
pub struct MockTransport {
    scripts: HashMap<NaiveDate, Script>,
    delays: HashMap<NaiveDate, Duration>,
    calls: Mutex<Vec<OutboundRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn respond(mut self, date: &str, body: impl Into<String>) -> Self {
        self.scripts.insert(parse_date(date), Script::Respond(body.into()));
        self
    }

    pub fn fail(mut self, date: &str, error: TransportError) -> Self {
        self.scripts.insert(parse_date(date), Script::Fail(error));
        self
    }

    pub fn delay(mut self, date: &str, delay: Duration) -> Self {
        self.delays.insert(parse_date(date), delay);
        self
    }

    pub fn calls(&self) -> Vec<OutboundRequest> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }

    /// Dates that reached the network, sorted.
    pub fn called_dates(&self) -> Vec<NaiveDate> {
        let mut dates: Vec<_> = self
            .calls()
            .iter()
            .filter_map(|c| date_of(&c.body))
            .collect();
        dates.sort();
        dates
    }
}

#[async_trait]
impl RatingTransport for MockTransport {
    async fn post(&self, request: OutboundRequest) -> Result<TransportResponse, TransportError> {
        let date = date_of(&request.body);
        if let Ok(mut calls) = self.calls.lock() {
            calls.push(request);
        }

        let Some(date) = date else {
            return Err(TransportError::Http("request has no <Date>".to_string()));
        };
        if let Some(delay) = self.delays.get(&date) {
            tokio::time::sleep(*delay).await;
        }

        match self.scripts.get(&date) {
            Some(Script::Respond(body)) => Ok(TransportResponse {
                status: 200,
                body: body.clone(),
            }),
            Some(Script::Fail(error)) => Err(error.clone()),
            None => Err(TransportError::Http(format!("no scripted response for {date}"))),
        }
    }
}

/// Keeps every diagnostic record in memory.
#[derive(Debug, Default)]
pub struct MemorySink {
    records: Mutex<Vec<DiagnosticRecord>>,
}

impl MemorySink {
    pub fn records(&self) -> Vec<DiagnosticRecord> {
        self.records.lock().map(|r| r.clone()).unwrap_or_default()
    }
}

impl DiagnosticsSink for MemorySink {
    fn record(&self, record: &DiagnosticRecord) {
        if let Ok(mut records) = self.records.lock() {
            records.push(record.clone());
        }
    }
}

fn parse_date(date: &str) -> NaiveDate {
    NaiveDate::parse_from_str(date, "%Y-%m-%d").unwrap_or_default()
}

fn date_of(body: &str) -> Option<NaiveDate> {
    let start = body.find("<Date>")? + "<Date>".len();
    let end = start + body[start..].find("</Date>")?;
    NaiveDate::parse_from_str(&body[start..end], "%Y-%m-%d").ok()
}

/// Sandbox carrier account with a 12-digit account number.
pub fn sample_carrier() -> CarrierConfig {
    CarrierConfig {
        account: "951234567890".to_string(),
        site_id: "ShipquoteSite".to_string(),
        password: "s3cret-pass".to_string(),
        sandbox_mode: true,
        ..CarrierConfig::default()
    }
}

/// Two non-document packages from Athens to New York on 2026-10-19.
pub fn sample_context() -> ShipmentContext {
    ShipmentContext {
        ship_date: NaiveDate::from_ymd_opt(2026, 10, 19).unwrap_or_default(),
        shipper: Party {
            company_name: Some("Aegean Ceramics".to_string()),
            person_name: Some("Eleni Marou".to_string()),
            phone_number: Some("+30 210 5550100".to_string()),
            street1: "14 Ermou Street".to_string(),
            street2: Some("Floor 2".to_string()),
            city: "Athens".to_string(),
            region_code: None,
            postal_code: "10563".to_string(),
            country_code: "GR".to_string(),
            country_name: Some("Greece".to_string()),
        },
        recipient: Party {
            company_name: None,
            person_name: Some("John Carter".to_string()),
            phone_number: Some("+1 212 555 0199".to_string()),
            street1: "350 Fifth Avenue".to_string(),
            street2: None,
            city: "New York".to_string(),
            region_code: Some("NY".to_string()),
            postal_code: "10118".to_string(),
            country_code: "US".to_string(),
            country_name: Some("United States".to_string()),
        },
        packages: vec![
            Package {
                weight: 1.25,
                length: Some(30.0),
                width: Some(20.0),
                height: Some(10.0),
                container: ContentType::NonDocuments,
                items: vec![item("Vase"), item("Bowl")],
            },
            Package {
                weight: 0.4,
                length: None,
                width: None,
                height: None,
                container: ContentType::NonDocuments,
                items: vec![item("Plate")],
            },
        ],
        order_subtotal: Decimal::new(14990, 2),
        website_currency: Some("EUR".to_string()),
    }
}

fn item(name: &str) -> Item {
    Item {
        name: name.to_string(),
    }
}

/// A quote response for `date` carrying no condition code.
pub fn available_body(date: &str) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <res:DCTResponse xmlns:res=\"http://www.dhl.com\"><GetQuoteResponse>\
         <Response><ServiceHeader><MessageReference>SHIPQ_QUOT_0000000000000000000</MessageReference>\
         </ServiceHeader></Response>\
         <BkgDetails><QtdShp><GlobalProductCode>P</GlobalProductCode>\
         <PickupDate>{date}</PickupDate><ShippingCharge>48.20</ShippingCharge>\
         </QtdShp></BkgDetails></GetQuoteResponse></res:DCTResponse>"
    )
}

/// A quote response whose first condition carries `code`.
pub fn unavailable_body(code: u32) -> String {
    format!(
        "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
         <res:DCTResponse xmlns:res=\"http://www.dhl.com\"><GetQuoteResponse>\
         <Note><ActionStatus>Failure</ActionStatus>\
         <Condition><ConditionCode>{code}</ConditionCode>\
         <ConditionData>Product not available on the requested date</ConditionData></Condition>\
         </Note></GetQuoteResponse></res:DCTResponse>"
    )
}
