use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Who pays a charge on the carrier account.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
pub enum PaymentType {
    #[default]
    #[serde(rename = "S", alias = "shipper")]
    Shipper,
    #[serde(rename = "R", alias = "receiver")]
    Receiver,
    #[serde(rename = "T", alias = "third_party")]
    ThirdParty,
}

impl PaymentType {
    pub const ALL: [PaymentType; 3] = [Self::Shipper, Self::Receiver, Self::ThirdParty];

    /// Single-letter code used on the wire.
    pub fn code(self) -> &'static str {
        match self {
            Self::Shipper => "S",
            Self::Receiver => "R",
            Self::ThirdParty => "T",
        }
    }

    /// Operator-facing label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Shipper => "Shipper",
            Self::Receiver => "Receiver",
            Self::ThirdParty => "Third Party",
        }
    }
}

/// Whether a package carries documents or goods.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ContentType {
    Documents,
    #[default]
    NonDocuments,
}

impl ContentType {
    /// Carrier package-type code: express envelope for documents,
    /// custom packaging for everything else.
    pub fn package_type_code(self) -> &'static str {
        match self {
            Self::Documents => "EE",
            Self::NonDocuments => "CP",
        }
    }
}

/// One side of the shipment (shipper or recipient).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Party {
    pub company_name: Option<String>,
    pub person_name: Option<String>,
    pub phone_number: Option<String>,
    pub street1: String,
    #[serde(default)]
    pub street2: Option<String>,
    pub city: String,
    /// State, province or division code.
    #[serde(default)]
    pub region_code: Option<String>,
    pub postal_code: String,
    /// ISO 3166-1 alpha-2.
    pub country_code: String,
    #[serde(default)]
    pub country_name: Option<String>,
}

impl Party {
    /// Street lines joined the way the carrier expects them before splitting.
    pub fn street(&self) -> String {
        match &self.street2 {
            Some(second) => format!("{} {}", self.street1, second),
            None => self.street1.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Item {
    pub name: String,
}

/// A physical package. Dimensions are only sent when all three are non-zero.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Package {
    pub weight: f64,
    #[serde(default)]
    pub length: Option<f64>,
    #[serde(default)]
    pub width: Option<f64>,
    #[serde(default)]
    pub height: Option<f64>,
    #[serde(default)]
    pub container: ContentType,
    #[serde(default)]
    pub items: Vec<Item>,
}

/// Business fields supplied by the storefront for one rate request.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipmentContext {
    /// First candidate ship date; later candidates are derived from it.
    pub ship_date: NaiveDate,
    pub shipper: Party,
    pub recipient: Party,
    pub packages: Vec<Package>,
    /// Order subtotal, used as the declared value on dutiable shipments.
    pub order_subtotal: Decimal,
    /// Base currency of the originating website.
    #[serde(default)]
    pub website_currency: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn party(country: &str) -> Party {
        Party {
            company_name: Some("Acme".to_string()),
            person_name: Some("Jane Roe".to_string()),
            phone_number: Some("+30 210 000".to_string()),
            street1: "1 Main St".to_string(),
            street2: None,
            city: "Athens".to_string(),
            region_code: None,
            postal_code: "10558".to_string(),
            country_code: country.to_string(),
            country_name: None,
        }
    }

    #[test]
    fn payment_type_wire_codes() {
        assert_eq!(serde_json::to_string(&PaymentType::Shipper).unwrap(), "\"S\"");
        assert_eq!(serde_json::to_string(&PaymentType::ThirdParty).unwrap(), "\"T\"");
        let parsed: PaymentType = serde_json::from_str("\"receiver\"").unwrap();
        assert_eq!(parsed, PaymentType::Receiver);
        assert_eq!(PaymentType::Receiver.code(), "R");
    }

    #[test]
    fn payment_type_labels() {
        let labels: Vec<_> = PaymentType::ALL.iter().map(|p| p.label()).collect();
        assert_eq!(labels, vec!["Shipper", "Receiver", "Third Party"]);
    }

    #[test]
    fn package_type_codes() {
        assert_eq!(ContentType::Documents.package_type_code(), "EE");
        assert_eq!(ContentType::NonDocuments.package_type_code(), "CP");
    }

    #[test]
    fn street_joins_second_line() {
        let mut p = party("GR");
        assert_eq!(p.street(), "1 Main St");
        p.street2 = Some("Floor 3".to_string());
        assert_eq!(p.street(), "1 Main St Floor 3");
    }

    #[test]
    fn context_from_json_uses_defaults() {
        let json = serde_json::json!({
            "ship_date": "2026-10-19",
            "shipper": party("GR"),
            "recipient": party("US"),
            "packages": [{"weight": 1.5}],
            "order_subtotal": "42.10"
        });
        let ctx: ShipmentContext = serde_json::from_value(json).unwrap();
        assert_eq!(ctx.packages[0].container, ContentType::NonDocuments);
        assert!(ctx.packages[0].items.is_empty());
        assert_eq!(ctx.order_subtotal, dec!(42.10));
        assert!(ctx.website_currency.is_none());
    }
}
