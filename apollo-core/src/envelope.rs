//! The uniform response envelope.
//!
//! Every data endpoint answers with one JSON object that holds the request
//! parameters it understood plus either `data` and `success: true`, or an
//! `error_message`. The two shapes are separate types so a response can
//! never carry both.

use serde_json::{Map, Value};

use crate::{encode, Datum, EncodingError};

/// Parameters unpacked from a request body, echoed back in the envelope.
pub type Params = Map<String, Value>;

pub const KEY_STATUS: &str = "status";
pub const KEY_SUCCESS: &str = "success";
pub const KEY_DATA: &str = "data";
pub const KEY_ERROR_MESSAGE: &str = "error_message";

/// A successful operation result.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct Envelope {
    /// HTTP-like status code repeated in the body.
    pub status: u16,
    /// Parameters the request was unpacked into.
    pub params: Params,
    /// Opaque backend result.
    pub data: Datum,
}

impl Envelope {
    #[must_use]
    pub fn new(status: u16, params: Params, data: Datum) -> Self {
        Self { status, params, data }
    }

    /// Encode into the JSON body.
    ///
    /// Envelope keys take precedence over parameters with the same name.
    ///
    /// # Errors
    /// Returns [`EncodingError`] if `data` holds a value JSON cannot represent.
    pub fn encode(&self) -> Result<Value, EncodingError> {
        let data = encode(&self.data)?;
        let mut body = self.params.clone();
        body.insert(KEY_DATA.to_owned(), data);
        body.insert(KEY_SUCCESS.to_owned(), Value::Bool(true));
        body.insert(KEY_STATUS.to_owned(), Value::from(self.status));
        Ok(Value::Object(body))
    }
}

/// A failed operation. Has no `data` and no `success` key.
#[derive(Debug, Clone, PartialEq)]
#[non_exhaustive]
pub struct ErrorEnvelope {
    pub status: u16,
    /// Whatever parameters were unpacked before the failure; empty if
    /// unpacking itself failed.
    pub params: Params,
    pub error_message: String,
}

impl ErrorEnvelope {
    #[must_use]
    pub fn new(status: u16, params: Params, error_message: impl Into<String>) -> Self {
        Self { status, params, error_message: error_message.into() }
    }

    /// Encode into the JSON body. Infallible: every field is already JSON.
    #[must_use]
    pub fn to_json(&self) -> Value {
        let mut body = self.params.clone();
        body.remove(KEY_DATA);
        body.remove(KEY_SUCCESS);
        body.insert(KEY_STATUS.to_owned(), Value::from(self.status));
        body.insert(KEY_ERROR_MESSAGE.to_owned(), Value::String(self.error_message.clone()));
        Value::Object(body)
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use serde_json::json;

    use super::*;

    fn params(value: Value) -> Params {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[test]
    fn success_envelope_has_data_and_success() {
        let envelope = Envelope::new(
            200,
            params(json!({"keyspace": "ks", "tablename": null})),
            Datum::List(vec![Datum::from("row")]),
        );
        let body = match envelope.encode() {
            Ok(b) => b,
            Err(e) => panic!("encode failed: {e}"),
        };
        assert_eq!(
            body,
            json!({
                "keyspace": "ks",
                "tablename": null,
                "data": ["row"],
                "success": true,
                "status": 200,
            })
        );
    }

    #[test]
    fn success_envelope_encodes_temporal_data() {
        let day = match NaiveDate::from_ymd_opt(2017, 11, 2) {
            Some(d) => d,
            None => panic!("invalid date"),
        };
        let envelope = Envelope::new(201, Params::new(), Datum::Date(day));
        assert_eq!(
            envelope.encode(),
            Ok(json!({"data": "2017-11-02", "success": true, "status": 201}))
        );
    }

    #[test]
    fn success_envelope_propagates_encoding_error() {
        let envelope = Envelope::new(200, Params::new(), Datum::Float(f64::NAN));
        assert!(envelope.encode().is_err(), "NaN data must not encode");
    }

    #[test]
    fn envelope_keys_override_params() {
        let envelope = Envelope::new(200, params(json!({"status": "bogus"})), Datum::Null);
        let body = match envelope.encode() {
            Ok(b) => b,
            Err(e) => panic!("encode failed: {e}"),
        };
        assert_eq!(body["status"], 200);
    }

    #[test]
    fn error_envelope_has_message_and_no_data() {
        let envelope = ErrorEnvelope::new(
            500,
            params(json!({"keyspace": "ks", "data": [1]})),
            "table not found",
        );
        let body = envelope.to_json();
        assert_eq!(body["status"], 500);
        assert_eq!(body["error_message"], "table not found");
        assert_eq!(body["keyspace"], "ks");
        assert!(body.get("data").is_none(), "error envelope must not carry data");
        assert!(body.get("success").is_none(), "error envelope must not carry success");
    }
}
