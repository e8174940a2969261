// Decoders for the platform's response shapes.
//
// Bodies are parsed once into a `serde_json::Value` and then read through
// JSON pointers. A field that is absent or has the wrong type fails with
// `MissingField` naming its dotted path, so a drifting response never
// yields partially filled data. Unit conversions happen here so the rest
// of the crate only sees final units.

use serde_json::Value;

use crate::error::{ClientError, Result};
use crate::vocab::RequestStatus;

#[derive(Debug, Clone, PartialEq)]
pub struct RequestDetail {
    pub created: String,
    /// Description of the first item picked up on the first section.
    pub item_description: String,
    pub description: String,
    pub status: RequestStatus,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Route {
    pub distance_meters: f64,
    /// Whole kilometers, truncated toward zero.
    pub distance_km: i64,
    pub commitment_seconds: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ShipperAvailability {
    pub id: String,
    pub nickname: String,
    pub reputation: f64,
    /// Whole minutes, truncated toward zero.
    pub commitment_minutes: i64,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    pub id: String,
}

/// Parse a body that is passed through without further interpretation.
pub fn raw(body: &str, what: &str) -> Result<Value> {
    serde_json::from_str(body).map_err(|source| ClientError::Decode {
        what: what.to_string(),
        source,
    })
}

pub fn request_detail(body: &str) -> Result<RequestDetail> {
    let doc = raw(body, "request")?;
    let code = int_at(&doc, "/request/status")?;

    Ok(RequestDetail {
        created: str_at(&doc, "/request/created")?.to_string(),
        item_description: str_at(&doc, "/request/sections/0/start/dropins/0/description")?
            .to_string(),
        description: str_at(&doc, "/request/description")?.to_string(),
        status: RequestStatus::try_from(code)?,
    })
}

pub fn route(body: &str) -> Result<Route> {
    let doc = raw(body, "route")?;
    let distance_meters = f64_at(&doc, "/distance")?;

    Ok(Route {
        distance_meters,
        distance_km: meters_to_km(distance_meters),
        commitment_seconds: f64_at(&doc, "/commitment")?,
    })
}

/// Remaining time of a request, in (fractional) minutes.
pub fn remaining_minutes(body: &str) -> Result<f64> {
    let doc = raw(body, "remaining time")?;
    Ok(f64_at(&doc, "/remaining")? / 60.0)
}

pub fn availability(body: &str) -> Result<Vec<ShipperAvailability>> {
    let doc = raw(body, "availability")?;
    let shippers = doc
        .pointer("/shippers")
        .and_then(Value::as_array)
        .ok_or_else(|| ClientError::missing("shippers"))?;

    // Entries are read relative to the document so errors carry the full path.
    (0..shippers.len())
        .map(|i| {
            let at = |field: &str| format!("/shippers/{i}/{field}");
            Ok(ShipperAvailability {
                id: str_at(&doc, &at("id"))?.to_string(),
                nickname: str_at(&doc, &at("nickname"))?.to_string(),
                reputation: f64_at(&doc, &at("reputation"))?,
                commitment_minutes: seconds_to_minutes(f64_at(&doc, &at("commitment"))?),
            })
        })
        .collect()
}

pub fn identity(body: &str) -> Result<Identity> {
    let doc = raw(body, "identity")?;
    Ok(Identity {
        id: str_at(&doc, "/id")?.to_string(),
    })
}

pub fn meters_to_km(meters: f64) -> i64 {
    (meters / 1000.0).trunc() as i64
}

fn seconds_to_minutes(seconds: f64) -> i64 {
    (seconds / 60.0).trunc() as i64
}

fn str_at<'a>(doc: &'a Value, pointer: &str) -> Result<&'a str> {
    doc.pointer(pointer)
        .and_then(Value::as_str)
        .ok_or_else(|| ClientError::missing(dotted(pointer)))
}

fn f64_at(doc: &Value, pointer: &str) -> Result<f64> {
    doc.pointer(pointer)
        .and_then(Value::as_f64)
        .ok_or_else(|| ClientError::missing(dotted(pointer)))
}

/// Integral number; `1.0` is accepted, `1.5` is not.
fn int_at(doc: &Value, pointer: &str) -> Result<i64> {
    let value = doc
        .pointer(pointer)
        .ok_or_else(|| ClientError::missing(dotted(pointer)))?;
    value
        .as_i64()
        .or_else(|| {
            value
                .as_f64()
                .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                .map(|f| f as i64)
        })
        .ok_or_else(|| ClientError::missing(dotted(pointer)))
}

/// `/request/sections/0/start` -> `request.sections[0].start`
fn dotted(pointer: &str) -> String {
    let mut out = String::new();
    for segment in pointer.split('/').filter(|s| !s.is_empty()) {
        if segment.chars().all(|c| c.is_ascii_digit()) {
            out.push('[');
            out.push_str(segment);
            out.push(']');
        } else {
            if !out.is_empty() {
                out.push('.');
            }
            out.push_str(segment);
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn detail_body(status: Value) -> String {
        json!({
            "request": {
                "created": "2024-01-01T00:00:00Z",
                "description": "Groceries",
                "status": status,
                "sections": [{ "start": { "dropins": [{ "description": "Box" }] } }]
            }
        })
        .to_string()
    }

    #[test]
    fn decodes_request_detail() {
        let detail = request_detail(&detail_body(json!(1))).unwrap();
        assert_eq!(detail.created, "2024-01-01T00:00:00Z");
        assert_eq!(detail.item_description, "Box");
        assert_eq!(detail.description, "Groceries");
        assert_eq!(detail.status, RequestStatus::AwaitingResponse);
    }

    #[test]
    fn float_status_code_is_accepted_when_integral() {
        let detail = request_detail(&detail_body(json!(3.0))).unwrap();
        assert_eq!(detail.status, RequestStatus::Accepted);
    }

    #[test]
    fn fractional_status_is_a_malformed_field() {
        let err = request_detail(&detail_body(json!(1.5))).unwrap_err();
        assert!(matches!(err, ClientError::MissingField { ref field } if field == "request.status"));
    }

    #[test]
    fn out_of_range_status_is_reported() {
        let err = request_detail(&detail_body(json!(7))).unwrap_err();
        assert!(matches!(err, ClientError::UnknownStatus(7)));
    }

    #[test]
    fn missing_dropin_names_the_full_path() {
        let body = json!({
            "request": {
                "created": "2024-01-01T00:00:00Z",
                "description": "Groceries",
                "status": 0,
                "sections": [{ "start": { "dropins": [] } }]
            }
        })
        .to_string();
        let err = request_detail(&body).unwrap_err();
        match err {
            ClientError::MissingField { field } => {
                assert_eq!(field, "request.sections[0].start.dropins[0].description")
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn malformed_body_is_a_decode_error() {
        let err = route("<html>oops</html>").unwrap_err();
        assert!(matches!(err, ClientError::Decode { .. }));
    }

    #[test]
    fn route_truncates_distance_to_km() {
        let r = route(r#"{"distance": 12999.9, "commitment": 900}"#).unwrap();
        assert_eq!(r.distance_km, 12);
        assert_eq!(r.distance_meters, 12999.9);
        assert_eq!(r.commitment_seconds, 900.0);
        assert_eq!(meters_to_km(999.0), 0);
        assert_eq!(meters_to_km((r.distance_km * 1000) as f64), r.distance_km);
    }

    #[test]
    fn route_with_string_distance_is_malformed() {
        let err = route(r#"{"distance": "12km", "commitment": 900}"#).unwrap_err();
        assert!(matches!(err, ClientError::MissingField { ref field } if field == "distance"));
    }

    #[test]
    fn remaining_keeps_fractional_minutes() {
        assert_eq!(remaining_minutes(r#"{"remaining": 150}"#).unwrap(), 2.5);
        assert_eq!(remaining_minutes(r#"{"remaining": 61}"#).unwrap(), 61.0 / 60.0);
    }

    #[test]
    fn availability_converts_commitment_to_whole_minutes() {
        let body = json!({
            "shippers": [
                { "id": "s1", "nickname": "Ana", "reputation": 4.8, "commitment": 120 },
                { "id": "s2", "nickname": "Leo", "reputation": 3, "commitment": 179 }
            ]
        })
        .to_string();
        let shippers = availability(&body).unwrap();
        assert_eq!(shippers.len(), 2);
        assert_eq!(shippers[0].commitment_minutes, 2);
        assert_eq!(shippers[1].commitment_minutes, 2);
        assert_eq!(shippers[1].reputation, 3.0);
    }

    #[test]
    fn availability_entry_without_id_is_reported() {
        let body = json!({ "shippers": [{ "nickname": "Ana", "reputation": 4.8, "commitment": 120 }] })
            .to_string();
        let err = availability(&body).unwrap_err();
        assert!(matches!(err, ClientError::MissingField { ref field } if field == "shippers[0].id"));
    }

    #[test]
    fn identity_requires_id() {
        assert_eq!(identity(r#"{"id":"u-1"}"#).unwrap().id, "u-1");
        assert!(matches!(
            identity(r#"{"nickname":"ana"}"#).unwrap_err(),
            ClientError::MissingField { .. }
        ));
    }
}
