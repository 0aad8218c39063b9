//! Wire serialization of dispatch outcomes
//!
//! Every response carries `"jsonrpc":"2.0"`. A successful notification
//! serializes to an empty string so batch aggregation can drop it.

use serde::Serialize;
use serde_json::{Map, Value};

use crate::rpc::dispatcher::Outcome;
use crate::rpc::envelope::PROTOCOL_VERSION;
use crate::rpc::error_map::ErrorDescriptor;

#[derive(Debug, Serialize)]
struct WireError<'a> {
    code: i64,
    message: &'a str,
}

#[derive(Debug, Serialize)]
struct WireResponse<'a> {
    jsonrpc: &'static str,
    id: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<&'a Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<WireError<'a>>,
}

pub fn build(outcome: &Outcome, id: Option<i64>) -> Result<String, serde_json::Error> {
    match outcome {
        Outcome::Failure(descriptor) => build_error(descriptor, id),
        Outcome::Success { .. } if id.is_none() => Ok(String::new()),
        Outcome::Success { payload, .. } => {
            let empty = Value::Object(Map::new());
            let result = if is_empty_array(payload) {
                &empty
            } else {
                payload
            };
            serde_json::to_string(&WireResponse {
                jsonrpc: PROTOCOL_VERSION,
                id,
                result: Some(result),
                error: None,
            })
        }
    }
}

pub fn build_error(
    descriptor: &ErrorDescriptor,
    id: Option<i64>,
) -> Result<String, serde_json::Error> {
    serde_json::to_string(&WireResponse {
        jsonrpc: PROTOCOL_VERSION,
        id,
        result: None,
        error: Some(WireError {
            code: descriptor.code,
            message: &descriptor.message,
        }),
    })
}

fn is_empty_array(value: &Value) -> bool {
    value.as_array().is_some_and(Vec::is_empty)
}
