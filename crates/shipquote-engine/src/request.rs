//! Renders the `GetQuote` rate request document for one candidate date.

use std::io;

use chrono::NaiveDate;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use shipquote_models::config::CarrierConfig;
use shipquote_models::quote::CandidateRequest;
use shipquote_models::shipment::{Party, PaymentType, ShipmentContext};

use crate::customs::{is_dutiable, resolve_currency};
use crate::error::EngineError;
use crate::fields::{
    format_amount, format_weight, piece_contents, piece_dimensions, shipment_contents,
    split_address, truncate, unit_code, ACCOUNT_NUMBER_MAX_LEN, COMPANY_NAME_MAX_LEN,
    PERSON_NAME_MAX_LEN, PHONE_NUMBER_MAX_LEN,
};

const ROOT_ELEMENT: &str = "p:DCTRequest";
const ROOT_ATTRIBUTES: [(&str, &str); 6] = [
    ("xmlns:p", "http://www.dhl.com"),
    ("xmlns:p1", "http://www.dhl.com/datatypes"),
    ("xmlns:p2", "http://www.dhl.com/DCTRequestdatatypes"),
    ("xmlns:xsi", "http://www.w3.org/2001/XMLSchema-instance"),
    ("xsi:schemaLocation", "http://www.dhl.com DCT-req.xsd"),
    ("schemaVersion", "2.0"),
];

/// Builds one deterministic request document per candidate date.
///
/// The document carries no per-message values, so identical inputs always
/// render identical text and the text can key the response cache.
/// `MessageTime`/`MessageReference` are added by [`crate::message::stamp`]
/// when the request is actually sent.
#[derive(Debug, Clone)]
pub struct RequestBuilder {
    carrier: CarrierConfig,
}

impl RequestBuilder {
    pub fn new(carrier: CarrierConfig) -> Self {
        Self { carrier }
    }

    pub fn build(
        &self,
        ctx: &ShipmentContext,
        sequence: usize,
        ship_date: NaiveDate,
    ) -> Result<CandidateRequest, EngineError> {
        Ok(CandidateRequest {
            sequence,
            ship_date,
            serialized_body: self.render(ctx, ship_date)?,
        })
    }

    pub fn render(&self, ctx: &ShipmentContext, ship_date: NaiveDate) -> Result<String, EngineError> {
        let dutiable = is_dutiable(
            self.carrier.content_type,
            &ctx.shipper.country_code,
            &ctx.recipient.country_code,
        );
        let currency = resolve_currency(ctx);

        let mut xml = XmlOut::new();
        xml.writer
            .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)))?;
        xml.writer.write_event(Event::Start(
            BytesStart::new(ROOT_ELEMENT).with_attributes(ROOT_ATTRIBUTES),
        ))?;
        xml.open("GetQuote")?;

        self.write_service_request(&mut xml)?;
        self.write_billing(&mut xml, dutiable)?;
        self.write_shipper(&mut xml, &ctx.shipper)?;
        write_consignee(&mut xml, &ctx.recipient)?;
        self.write_shipment_details(&mut xml, ctx, ship_date, dutiable, &currency)?;
        if dutiable {
            xml.open("Dutiable")?;
            xml.leaf("DeclaredValue", &format_amount(ctx.order_subtotal))?;
            xml.leaf("DeclaredCurrency", &currency)?;
            xml.close("Dutiable")?;
        }

        xml.close("GetQuote")?;
        xml.close(ROOT_ELEMENT)?;
        xml.finish()
    }

    fn account(&self) -> String {
        truncate(&self.carrier.account, ACCOUNT_NUMBER_MAX_LEN)
    }

    fn write_service_request(&self, xml: &mut XmlOut) -> io::Result<()> {
        xml.open("Request")?;
        xml.open("ServiceHeader")?;
        xml.leaf("SiteID", &self.carrier.site_id)?;
        xml.leaf("Password", &self.carrier.password)?;
        xml.close("ServiceHeader")?;
        xml.open("MetaData")?;
        xml.leaf("SoftwareName", &self.carrier.software_name)?;
        xml.leaf("SoftwareVersion", env!("CARGO_PKG_VERSION"))?;
        xml.close("MetaData")?;
        xml.close("Request")
    }

    fn write_billing(&self, xml: &mut XmlOut, dutiable: bool) -> io::Result<()> {
        let account = self.account();
        xml.open("Billing")?;
        xml.leaf("ShipperAccountNumber", &account)?;
        xml.leaf("ShippingPaymentType", PaymentType::Shipper.code())?;
        xml.leaf("BillingAccountNumber", &account)?;
        if dutiable {
            let duty = self.carrier.duty_payment_type;
            xml.leaf("DutyPaymentType", duty.code())?;
            if duty == PaymentType::Shipper {
                // The duty account is sent in full.
                xml.leaf("DutyAccountNumber", &self.carrier.account)?;
            }
        }
        xml.close("Billing")
    }

    fn write_shipper(&self, xml: &mut XmlOut, shipper: &Party) -> io::Result<()> {
        let account = self.account();
        xml.open("Shipper")?;
        xml.leaf("ShipperID", &account)?;
        xml.leaf("CompanyName", &company_name(shipper))?;
        xml.leaf("RegisteredAccount", &account)?;
        write_location_and_contact(xml, shipper)?;
        xml.close("Shipper")
    }

    fn write_shipment_details(
        &self,
        xml: &mut XmlOut,
        ctx: &ShipmentContext,
        ship_date: NaiveDate,
        dutiable: bool,
        currency: &str,
    ) -> io::Result<()> {
        xml.open("ShipmentDetails")?;
        xml.open("Pieces")?;
        let mut contents = Vec::with_capacity(ctx.packages.len());
        for (index, package) in ctx.packages.iter().enumerate() {
            let piece_text = piece_contents(&package.items);
            xml.open("Piece")?;
            xml.leaf("PieceID", &(index + 1).to_string())?;
            xml.leaf("PackageType", package.container.package_type_code())?;
            xml.leaf("Weight", &format_weight(package.weight))?;
            if let Some((width, height, depth)) = piece_dimensions(package) {
                xml.leaf("Width", &width.to_string())?;
                xml.leaf("Height", &height.to_string())?;
                xml.leaf("Depth", &depth.to_string())?;
            }
            xml.leaf("PieceContents", &piece_text)?;
            xml.close("Piece")?;
            contents.push(piece_text);
        }
        xml.close("Pieces")?;

        xml.leaf("WeightUnit", &unit_code(&self.carrier.weight_unit))?;
        xml.leaf("Date", &ship_date.format("%Y-%m-%d").to_string())?;
        xml.leaf("Contents", &shipment_contents(&contents))?;
        xml.leaf("DimensionUnit", &unit_code(&self.carrier.dimension_unit))?;
        let package_type = ctx
            .packages
            .last()
            .map(|p| p.container.package_type_code())
            .unwrap_or_else(|| self.carrier.content_type.package_type_code());
        xml.leaf("PackageType", package_type)?;
        xml.leaf("IsDutiable", if dutiable { "Y" } else { "N" })?;
        xml.leaf("CurrencyCode", currency)?;
        xml.close("ShipmentDetails")
    }
}

fn write_consignee(xml: &mut XmlOut, recipient: &Party) -> io::Result<()> {
    xml.open("Consignee")?;
    xml.leaf("CompanyName", &company_name(recipient))?;
    write_location_and_contact(xml, recipient)?;
    xml.close("Consignee")
}

fn company_name(party: &Party) -> String {
    let name = party
        .company_name
        .as_deref()
        .filter(|n| !n.trim().is_empty())
        .or(party.person_name.as_deref())
        .unwrap_or_default();
    truncate(name, COMPANY_NAME_MAX_LEN)
}

fn write_location_and_contact(xml: &mut XmlOut, party: &Party) -> io::Result<()> {
    let lines = split_address(&party.street());
    if lines.is_empty() {
        xml.leaf("AddressLine1", "")?;
    }
    for (index, line) in lines.iter().enumerate() {
        xml.leaf(&format!("AddressLine{}", index + 1), line)?;
    }
    xml.leaf("City", &party.city)?;
    if let Some(region) = party.region_code.as_deref().filter(|r| !r.is_empty()) {
        xml.leaf("Division", region)?;
    }
    xml.leaf("PostalCode", &party.postal_code)?;
    xml.leaf("CountryCode", &party.country_code)?;
    xml.leaf(
        "CountryName",
        party.country_name.as_deref().unwrap_or(&party.country_code),
    )?;
    xml.open("Contact")?;
    xml.leaf(
        "PersonName",
        &truncate(party.person_name.as_deref().unwrap_or_default(), PERSON_NAME_MAX_LEN),
    )?;
    xml.leaf(
        "PhoneNumber",
        &truncate(party.phone_number.as_deref().unwrap_or_default(), PHONE_NUMBER_MAX_LEN),
    )?;
    xml.close("Contact")
}

/// Thin element-level helpers over a quick-xml writer.
struct XmlOut {
    writer: Writer<Vec<u8>>,
}

impl XmlOut {
    fn new() -> Self {
        Self {
            writer: Writer::new(Vec::new()),
        }
    }

    fn open(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_event(Event::Start(BytesStart::new(name)))
    }

    fn close(&mut self, name: &str) -> io::Result<()> {
        self.writer.write_event(Event::End(BytesEnd::new(name)))
    }

    fn leaf(&mut self, name: &str, text: &str) -> io::Result<()> {
        self.open(name)?;
        self.writer.write_event(Event::Text(BytesText::new(text)))?;
        self.close(name)
    }

    fn finish(self) -> Result<String, EngineError> {
        String::from_utf8(self.writer.into_inner())
            .map_err(|e| EngineError::Encoding(io::Error::new(io::ErrorKind::InvalidData, e)))
    }
}
