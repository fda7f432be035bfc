//! Reads just enough of a rate response to tell whether the date is usable.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::ResponseError;

/// Element path (by local name) of the carrier's condition code. Matches
/// anywhere a `GetQuoteResponse` appears.
const CONDITION_CODE_PATH: [&str; 4] = ["GetQuoteResponse", "Note", "Condition", "ConditionCode"];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResponseVerdict {
    /// No unavailable signal. The body goes downstream unchanged.
    Available,
    Unavailable { condition_code: u32 },
}

/// Classify a response body.
///
/// Only the first condition code found is considered. A code that is
/// missing, non-numeric or different from `unavailable_code` leaves the
/// body available. Bodies that are not a well-formed XML document are
/// malformed.
pub fn inspect_response(body: &str, unavailable_code: u32) -> Result<ResponseVerdict, ResponseError> {
    match extract_condition_code(body)? {
        Some(text) => match text.trim().parse::<u32>() {
            Ok(code) if code == unavailable_code => Ok(ResponseVerdict::Unavailable {
                condition_code: code,
            }),
            _ => Ok(ResponseVerdict::Available),
        },
        None => Ok(ResponseVerdict::Available),
    }
}

/// Text of the first `//GetQuoteResponse/Note/Condition/ConditionCode`.
pub fn extract_condition_code(body: &str) -> Result<Option<String>, ResponseError> {
    if body.trim().is_empty() {
        return Err(ResponseError::Malformed("empty response body".to_string()));
    }

    let mut reader = Reader::from_str(body);
    reader.config_mut().trim_text(true);

    let mut path: Vec<String> = Vec::new();
    let mut saw_root = false;
    let mut root_closed = false;
    let mut capturing: Option<String> = None;
    let mut found: Option<String> = None;

    loop {
        let event = reader.read_event();
        // One root element; only comments and processing instructions around it.
        let outside_root = path.is_empty()
            && match &event {
                Ok(Event::Start(_) | Event::Empty(_)) => root_closed,
                Ok(Event::Text(_) | Event::CData(_)) => true,
                _ => false,
            };
        if outside_root {
            return Err(ResponseError::Malformed(format!(
                "content outside the root element at position {}",
                reader.buffer_position()
            )));
        }

        match event {
            Ok(Event::Start(e)) => {
                saw_root = true;
                path.push(String::from_utf8_lossy(e.local_name().as_ref()).into_owned());
                if found.is_none() && capturing.is_none() && at_condition_code(&path) {
                    capturing = Some(String::new());
                }
            }
            Ok(Event::Empty(e)) => {
                saw_root = true;
                if path.is_empty() {
                    root_closed = true;
                } else if found.is_none() && e.local_name().as_ref() == b"ConditionCode" {
                    path.push("ConditionCode".to_string());
                    if at_condition_code(&path) {
                        found = Some(String::new());
                    }
                    path.pop();
                }
            }
            Ok(Event::End(_)) => {
                if capturing.is_some() && at_condition_code(&path) {
                    found = capturing.take();
                }
                path.pop();
                root_closed = path.is_empty();
            }
            Ok(Event::Text(t)) => {
                if let Some(buf) = capturing.as_mut() {
                    let text = t
                        .unescape()
                        .map_err(|e| ResponseError::Malformed(e.to_string()))?;
                    buf.push_str(&text);
                }
            }
            Ok(Event::CData(c)) => {
                if let Some(buf) = capturing.as_mut() {
                    buf.push_str(&String::from_utf8_lossy(&c));
                }
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(ResponseError::Malformed(format!(
                    "XML error at position {}: {e}",
                    reader.error_position()
                )))
            }
        }
    }

    if !saw_root {
        return Err(ResponseError::Malformed("no root element".to_string()));
    }
    if let Some(open) = path.last() {
        return Err(ResponseError::Malformed(format!("unclosed element <{open}>")));
    }
    Ok(found)
}

fn at_condition_code(path: &[String]) -> bool {
    path.len() >= CONDITION_CODE_PATH.len()
        && path[path.len() - CONDITION_CODE_PATH.len()..]
            .iter()
            .zip(CONDITION_CODE_PATH)
            .all(|(have, want)| have == want)
}
