//! Request decoding and protocol validation
//!
//! Turns a raw body into one [`Envelope`] or an ordered batch of them. Any
//! malformed batch member rejects the whole batch.

use serde_json::{Map, Value};

use crate::errors::{RpcError, RpcResult};

pub const PROTOCOL_VERSION: &str = "2.0";
const METHOD_SEPARATOR: char = '.';

#[derive(Debug, Clone, PartialEq)]
pub enum Params {
    Positional(Vec<Value>),
    Named(Map<String, Value>),
}

impl Params {
    pub fn is_empty(&self) -> bool {
        match self {
            Self::Positional(values) => values.is_empty(),
            Self::Named(map) => map.is_empty(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Envelope {
    pub id: Option<i64>,
    pub namespace: String,
    pub method: String,
    pub params: Option<Params>,
}

impl Envelope {
    pub fn is_notification(&self) -> bool {
        self.id.is_none()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Request {
    Single(Envelope),
    Batch(Vec<Envelope>),
}

pub fn parse(raw: &[u8]) -> RpcResult<Request> {
    let body: Value = serde_json::from_slice(raw).map_err(|_| RpcError::parse_error())?;

    if is_falsy(&body) {
        return Err(RpcError::invalid_request());
    }

    match body {
        Value::Array(items) => items
            .iter()
            .map(parse_envelope)
            .collect::<RpcResult<Vec<_>>>()
            .map(Request::Batch),
        other => parse_envelope(&other).map(Request::Single),
    }
}

pub fn parse_envelope(raw: &Value) -> RpcResult<Envelope> {
    let object = raw.as_object().ok_or_else(RpcError::invalid_request)?;

    if object.get("jsonrpc").and_then(Value::as_str) != Some(PROTOCOL_VERSION) {
        return Err(RpcError::invalid_request());
    }

    let id = match object.get("id") {
        None | Some(Value::Null) => None,
        Some(value) => Some(coerce_id(value)?),
    };

    let params = match object.get("params") {
        None | Some(Value::Null) => None,
        Some(value) => Some(coerce_params(value)),
    };

    let raw_method = object
        .get("method")
        .and_then(Value::as_str)
        .ok_or_else(RpcError::invalid_request)?;
    let (namespace, method) = split_method(raw_method)?;

    Ok(Envelope {
        id,
        namespace: namespace.to_string(),
        method: method.to_string(),
        params,
    })
}

fn split_method(raw: &str) -> RpcResult<(&str, &str)> {
    let mut parts = raw.split(METHOD_SEPARATOR);
    match (parts.next(), parts.next(), parts.next()) {
        (Some(namespace), Some(method), None) if !namespace.is_empty() && !method.is_empty() => {
            Ok((namespace, method))
        }
        _ => Err(RpcError::invalid_request()),
    }
}

fn coerce_id(value: &Value) -> RpcResult<i64> {
    match value {
        Value::Number(number) => number
            .as_i64()
            .or_else(|| number.as_f64().map(|float| float.trunc() as i64))
            .ok_or_else(RpcError::invalid_request),
        Value::String(text) => {
            let text = text.trim();
            Ok(text
                .parse::<i64>()
                .ok()
                .or_else(|| text.parse::<f64>().ok().map(|float| float.trunc() as i64))
                .unwrap_or(0))
        }
        Value::Bool(flag) => Ok(i64::from(*flag)),
        _ => Err(RpcError::invalid_request()),
    }
}

fn coerce_params(value: &Value) -> Params {
    match value {
        Value::Array(values) => Params::Positional(values.clone()),
        Value::Object(map) => Params::Named(map.clone()),
        scalar => Params::Positional(vec![scalar.clone()]),
    }
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(flag) => !flag,
        Value::Number(number) => number.as_f64() == Some(0.0),
        Value::String(text) => text.is_empty() || text == "0",
        Value::Array(items) => items.is_empty(),
        Value::Object(_) => false,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::errors::ErrorCode;

    fn code_of(raw: &str) -> Option<ErrorCode> {
        parse(raw.as_bytes())
            .expect_err("request should be rejected")
            .protocol_code()
    }

    #[test]
    fn parses_single_request_with_named_params() {
        let request = parse(br#"{"jsonrpc":"2.0","id":1,"method":"Math.add","params":{"a":2,"b":3}}"#)
            .expect("valid request");

        let Request::Single(envelope) = request else {
            panic!("expected single request");
        };
        assert_eq!(envelope.id, Some(1));
        assert_eq!(envelope.namespace, "Math");
        assert_eq!(envelope.method, "add");
        let Some(Params::Named(params)) = envelope.params else {
            panic!("expected named params");
        };
        assert_eq!(params.get("b"), Some(&json!(3)));
    }

    #[test]
    fn missing_id_marks_notification() {
        let Request::Single(envelope) =
            parse(br#"{"jsonrpc":"2.0","method":"Log.write","params":["hi"]}"#).expect("valid")
        else {
            panic!("expected single request");
        };

        assert!(envelope.is_notification());
        assert_eq!(
            envelope.params,
            Some(Params::Positional(vec![json!("hi")]))
        );
    }

    #[test]
    fn one_element_array_stays_a_batch() {
        let request = parse(br#"[{"jsonrpc":"2.0","id":4,"method":"A.f"}]"#).expect("valid");

        match request {
            Request::Batch(items) => {
                assert_eq!(items.len(), 1);
                assert_eq!(items[0].id, Some(4));
                assert_eq!(items[0].params, None);
            }
            other => panic!("expected batch, got {other:?}"),
        }
    }

    #[test]
    fn malformed_member_rejects_whole_batch() {
        assert_eq!(
            code_of(r#"[{"jsonrpc":"2.0","id":1,"method":"A.f"},{"jsonrpc":"1.0","id":2,"method":"A.g"}]"#),
            Some(ErrorCode::InvalidRequest)
        );
    }

    #[test]
    fn undecodable_body_is_parse_error() {
        assert_eq!(code_of("not-json"), Some(ErrorCode::ParseError));
    }

    #[test]
    fn falsy_bodies_are_invalid_requests() {
        for raw in ["[]", "null", "false", "0", "\"\""] {
            assert_eq!(code_of(raw), Some(ErrorCode::InvalidRequest), "body {raw}");
        }
    }

    #[test]
    fn version_and_method_shape_are_validated() {
        for raw in [
            r#"{"id":1,"method":"A.f"}"#,
            r#"{"jsonrpc":"1.0","id":1,"method":"A.f"}"#,
            r#"{"jsonrpc":2.0,"id":1,"method":"A.f"}"#,
            r#"{"jsonrpc":"2.0","id":1}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":"noseparator"}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":"A.b.c"}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":".f"}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":"A."}"#,
            r#"{"jsonrpc":"2.0","id":1,"method":42}"#,
            r#""just a string""#,
        ] {
            assert_eq!(code_of(raw), Some(ErrorCode::InvalidRequest), "body {raw}");
        }
    }

    #[test]
    fn ids_coerce_to_integers() {
        assert_eq!(coerce_id(&json!(7)).ok(), Some(7));
        assert_eq!(coerce_id(&json!("12")).ok(), Some(12));
        assert_eq!(coerce_id(&json!(3.9)).ok(), Some(3));
        assert_eq!(coerce_id(&json!("abc")).ok(), Some(0));
        assert!(coerce_id(&json!({"nested": 1})).is_err());
    }

    #[test]
    fn scalar_params_become_single_positional_arg() {
        assert_eq!(
            coerce_params(&json!("x")),
            Params::Positional(vec![json!("x")])
        );
    }
}
