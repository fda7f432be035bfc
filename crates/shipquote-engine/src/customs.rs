use shipquote_models::shipment::{ContentType, ShipmentContext};

/// Currency declared when the website does not carry one.
pub const DEFAULT_CURRENCY: &str = "USD";

/// EU member states. Shipments inside this zone clear no customs.
pub const EU_COUNTRY_CODES: [&str; 27] = [
    "AT", "BE", "BG", "CY", "CZ", "DE", "DK", "EE", "ES", "FI", "FR", "GR", "HR", "HU", "IE",
    "IT", "LT", "LU", "LV", "MT", "NL", "PL", "PT", "RO", "SE", "SI", "SK",
];

pub fn is_eu_country(country_code: &str) -> bool {
    EU_COUNTRY_CODES
        .iter()
        .any(|c| c.eq_ignore_ascii_case(country_code.trim()))
}

/// Same country, or both ends inside the EU.
pub fn is_domestic(origin: &str, destination: &str) -> bool {
    origin.trim().eq_ignore_ascii_case(destination.trim())
        || (is_eu_country(origin) && is_eu_country(destination))
}

/// Goods crossing a customs border.
pub fn is_dutiable(content_type: ContentType, origin: &str, destination: &str) -> bool {
    content_type == ContentType::NonDocuments && !is_domestic(origin, destination)
}

/// Currency code used for the rate and the declared value.
pub fn resolve_currency(ctx: &ShipmentContext) -> String {
    ctx.website_currency
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty())
        .map(str::to_uppercase)
        .unwrap_or_else(|| DEFAULT_CURRENCY.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn same_country_is_domestic() {
        assert!(is_domestic("US", "us"));
        assert!(!is_dutiable(ContentType::NonDocuments, "US", "US"));
    }

    #[test]
    fn intra_eu_is_domestic() {
        assert!(is_domestic("GR", "DE"));
        assert!(!is_dutiable(ContentType::NonDocuments, "FR", "IT"));
    }

    #[test]
    fn eu_to_outside_is_dutiable() {
        assert!(!is_domestic("GR", "GB"));
        assert!(is_dutiable(ContentType::NonDocuments, "GR", "US"));
    }

    #[test]
    fn documents_never_dutiable() {
        assert!(!is_dutiable(ContentType::Documents, "GR", "US"));
    }

    #[test]
    fn eu_list_has_no_duplicates() {
        let mut codes = EU_COUNTRY_CODES.to_vec();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), 27);
    }
}
