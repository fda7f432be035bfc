//! Service header values that must be unique per outbound message.
//!
//! The request document rendered by [`crate::request::RequestBuilder`] leaves
//! `MessageTime` and `MessageReference` out so it can serve as a stable cache
//! key. [`stamp`] splices fresh values in right before a message is sent.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use crate::error::EngineError;

/// Fixed tag that opens every message reference we generate.
pub const MESSAGE_REFERENCE_TAG: &str = "SHIPQ";
/// The carrier accepts message references of 28 to 32 characters.
pub const MESSAGE_REFERENCE_MIN_LEN: usize = 28;
pub const MESSAGE_REFERENCE_MAX_LEN: usize = 32;

const SERVICE_HEADER_OPEN: &str = "<ServiceHeader>";

/// Carrier service a message is addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServicePrefix {
    Quote,
    ShipmentValidate,
    Tracking,
}

impl ServicePrefix {
    pub fn code(self) -> &'static str {
        match self {
            Self::Quote => "QUOT",
            Self::ShipmentValidate => "SHIP",
            Self::Tracking => "TRCK",
        }
    }
}

impl fmt::Display for ServicePrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

impl FromStr for ServicePrefix {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "QUOT" => Ok(Self::Quote),
            "SHIP" => Ok(Self::ShipmentValidate),
            "TRCK" => Ok(Self::Tracking),
            other => Err(EngineError::Configuration(format!(
                "Invalid service prefix \"{other}\" provided while building MessageReference"
            ))),
        }
    }
}

/// `MessageTime` + `MessageReference` pair for one outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageStamp {
    pub time: String,
    pub reference: String,
}

impl MessageStamp {
    /// A new stamp for right now. Never reuse one across dates or retries.
    pub fn fresh(prefix: ServicePrefix) -> Self {
        Self::at(Utc::now(), prefix, Uuid::new_v4())
    }

    pub fn at(now: DateTime<Utc>, prefix: ServicePrefix, token: Uuid) -> Self {
        Self {
            time: message_time(now),
            reference: message_reference(prefix, token),
        }
    }
}

/// RFC 3339 timestamp with whole seconds, e.g. `2026-10-19T09:30:00+00:00`.
pub fn message_time(now: DateTime<Utc>) -> String {
    now.to_rfc3339_opts(SecondsFormat::Secs, false)
}

/// `SHIPQ_<prefix>_<token>` with separators stripped from the token, cut to
/// the protocol maximum.
pub fn message_reference(prefix: ServicePrefix, token: Uuid) -> String {
    let token: String = token
        .to_string()
        .chars()
        .filter(|c| !matches!(c, '-' | '.' | '_'))
        .collect();
    let mut reference = format!("{MESSAGE_REFERENCE_TAG}_{prefix}_{token}");
    reference.truncate(MESSAGE_REFERENCE_MAX_LEN);
    reference
}

/// Insert the stamp's values at the head of the document's `ServiceHeader`.
pub fn stamp(document: &str, stamp: &MessageStamp) -> Result<String, EngineError> {
    let at = document
        .find(SERVICE_HEADER_OPEN)
        .map(|i| i + SERVICE_HEADER_OPEN.len())
        .ok_or_else(|| {
            EngineError::Configuration("request document has no ServiceHeader".to_string())
        })?;

    let mut out = String::with_capacity(document.len() + 128);
    out.push_str(&document[..at]);
    out.push_str("<MessageTime>");
    out.push_str(&stamp.time);
    out.push_str("</MessageTime><MessageReference>");
    out.push_str(&stamp.reference);
    out.push_str("</MessageReference>");
    out.push_str(&document[at..]);
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn prefix_codes_round_trip() {
        for prefix in [
            ServicePrefix::Quote,
            ServicePrefix::ShipmentValidate,
            ServicePrefix::Tracking,
        ] {
            assert_eq!(prefix.code().parse::<ServicePrefix>().unwrap(), prefix);
        }
    }

    #[test]
    fn unknown_prefix_is_configuration_error() {
        let err = "RATE".parse::<ServicePrefix>().unwrap_err();
        assert!(matches!(err, EngineError::Configuration(_)));
        assert!(err.to_string().contains("RATE"));
    }

    #[test]
    fn reference_fits_protocol_bounds() {
        for prefix in [
            ServicePrefix::Quote,
            ServicePrefix::ShipmentValidate,
            ServicePrefix::Tracking,
        ] {
            let reference = message_reference(prefix, Uuid::new_v4());
            assert!(reference.len() >= MESSAGE_REFERENCE_MIN_LEN);
            assert!(reference.len() <= MESSAGE_REFERENCE_MAX_LEN);
            assert!(reference.starts_with(&format!("SHIPQ_{}_", prefix.code())));
            assert!(!reference[11..].contains('-'));
        }
    }

    #[test]
    fn fresh_references_differ() {
        let a = MessageStamp::fresh(ServicePrefix::Quote);
        let b = MessageStamp::fresh(ServicePrefix::Quote);
        assert_ne!(a.reference, b.reference);
    }

    #[test]
    fn message_time_is_rfc3339() {
        let now = Utc.with_ymd_and_hms(2026, 10, 19, 9, 30, 5).unwrap();
        assert_eq!(message_time(now), "2026-10-19T09:30:05+00:00");
    }

    #[test]
    fn stamp_inserts_header_values() {
        let doc = "<Request><ServiceHeader><SiteID>s</SiteID></ServiceHeader></Request>";
        let header = MessageStamp {
            time: "T".to_string(),
            reference: "R".to_string(),
        };
        let stamped = stamp(doc, &header).unwrap();
        assert_eq!(
            stamped,
            "<Request><ServiceHeader><MessageTime>T</MessageTime>\
             <MessageReference>R</MessageReference><SiteID>s</SiteID></ServiceHeader></Request>"
        );
    }

    #[test]
    fn stamp_without_header_fails() {
        let header = MessageStamp::fresh(ServicePrefix::Quote);
        assert!(matches!(
            stamp("<Request/>", &header),
            Err(EngineError::Configuration(_))
        ));
    }
}
