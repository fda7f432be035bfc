use serde::{Deserialize, Serialize};

use crate::shipment::{ContentType, PaymentType};

/// Top-level configuration for shipquote.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ShipquoteConfig {
    pub carrier: CarrierConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub engine: EngineConfig,
}

/// Carrier account, credentials and gateway endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CarrierConfig {
    pub account: String,
    pub site_id: String,
    pub password: String,
    /// Route requests to `sandbox_url` instead of `gateway_url`.
    #[serde(default)]
    pub sandbox_mode: bool,
    #[serde(default = "default_gateway_url")]
    pub gateway_url: String,
    #[serde(default = "default_sandbox_url")]
    pub sandbox_url: String,
    /// Who pays duties on dutiable shipments.
    #[serde(default)]
    pub duty_payment_type: PaymentType,
    /// What the store ships; only non-documents can be dutiable.
    #[serde(default)]
    pub content_type: ContentType,
    #[serde(default = "default_weight_unit")]
    pub weight_unit: String,
    #[serde(default = "default_dimension_unit")]
    pub dimension_unit: String,
    #[serde(default = "default_software_name")]
    pub software_name: String,
}

impl CarrierConfig {
    /// The gateway URL requests should go to.
    pub fn endpoint(&self) -> &str {
        if self.sandbox_mode {
            &self.sandbox_url
        } else {
            &self.gateway_url
        }
    }
}

impl Default for CarrierConfig {
    fn default() -> Self {
        Self {
            account: String::new(),
            site_id: String::new(),
            password: String::new(),
            sandbox_mode: false,
            gateway_url: default_gateway_url(),
            sandbox_url: default_sandbox_url(),
            duty_payment_type: PaymentType::default(),
            content_type: ContentType::default(),
            weight_unit: default_weight_unit(),
            dimension_unit: default_dimension_unit(),
            software_name: default_software_name(),
        }
    }
}

/// Configuration for the response cache.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CacheConfig {
    /// Persistent SQLite store shared across runs. Memory-only when absent.
    #[serde(default)]
    pub sqlite_path: Option<String>,
    /// Maximum number of entries in the in-memory moka cache.
    #[serde(default = "default_memory_capacity")]
    pub memory_max_capacity: u64,
    /// How long a response stays in the moka hot tier.
    #[serde(default = "default_memory_ttl")]
    pub memory_ttl_seconds: u64,
    /// How long a response stays in the persistent tier.
    #[serde(default = "default_cache_ttl")]
    pub ttl_seconds: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            sqlite_path: None,
            memory_max_capacity: default_memory_capacity(),
            memory_ttl_seconds: default_memory_ttl(),
            ttl_seconds: default_cache_ttl(),
        }
    }
}

/// Configuration for the quotation engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EngineConfig {
    /// Extra days quoted after the requested ship date.
    #[serde(default = "default_look_forward")]
    pub look_forward_days: u32,
    /// Condition code the carrier uses for "service not available on this date".
    #[serde(default = "default_unavailable_code")]
    pub unavailable_condition_code: u32,
    /// Per-request HTTP timeout.
    #[serde(default = "default_request_timeout")]
    pub request_timeout_seconds: u64,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            look_forward_days: default_look_forward(),
            unavailable_condition_code: default_unavailable_code(),
            request_timeout_seconds: default_request_timeout(),
        }
    }
}

fn default_gateway_url() -> String {
    "https://xmlpi-ea.dhl.com/XMLShippingServlet".to_string()
}
fn default_sandbox_url() -> String {
    "https://xmlpitest-ea.dhl.com/XMLShippingServlet".to_string()
}
fn default_weight_unit() -> String {
    "KG".to_string()
}
fn default_dimension_unit() -> String {
    "CM".to_string()
}
fn default_software_name() -> String {
    "shipquote".to_string()
}
fn default_memory_capacity() -> u64 {
    10_000
}
fn default_memory_ttl() -> u64 {
    900
}
fn default_cache_ttl() -> u64 {
    86_400
}
fn default_look_forward() -> u32 {
    5
}
fn default_unavailable_code() -> u32 {
    1003
}
fn default_request_timeout() -> u64 {
    30
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_from_toml() {
        let toml_str = r#"
[carrier]
account = "123456789"
site_id = "site"
password = "secret"
"#;
        let config: ShipquoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.engine.look_forward_days, 5);
        assert_eq!(config.engine.unavailable_condition_code, 1003);
        assert_eq!(config.cache.sqlite_path, None);
        assert_eq!(config.carrier.duty_payment_type, PaymentType::Shipper);
        assert_eq!(config.carrier.content_type, ContentType::NonDocuments);
        assert_eq!(config.carrier.weight_unit, "KG");
    }

    #[test]
    fn full_config_from_toml() {
        let toml_str = r#"
[carrier]
account = "987654321"
site_id = "site"
password = "secret"
sandbox_mode = true
duty_payment_type = "R"
content_type = "documents"

[cache]
sqlite_path = "/tmp/quotes.db"
memory_max_capacity = 500
ttl_seconds = 3600

[engine]
look_forward_days = 2
unavailable_condition_code = 6
"#;
        let config: ShipquoteConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.carrier.duty_payment_type, PaymentType::Receiver);
        assert_eq!(config.carrier.content_type, ContentType::Documents);
        assert_eq!(config.cache.sqlite_path.as_deref(), Some("/tmp/quotes.db"));
        assert_eq!(config.cache.memory_ttl_seconds, 900);
        assert_eq!(config.engine.look_forward_days, 2);
        assert_eq!(config.engine.request_timeout_seconds, 30);
    }

    #[test]
    fn endpoint_follows_sandbox_flag() {
        let mut carrier = CarrierConfig::default();
        assert!(carrier.endpoint().contains("xmlpi-ea"));
        carrier.sandbox_mode = true;
        assert!(carrier.endpoint().contains("xmlpitest-ea"));
    }

    #[test]
    fn roundtrip_config() {
        let config = ShipquoteConfig {
            carrier: CarrierConfig::default(),
            cache: CacheConfig::default(),
            engine: EngineConfig::default(),
        };
        let json = serde_json::to_string(&config).unwrap();
        let parsed: ShipquoteConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(config, parsed);
    }
}
