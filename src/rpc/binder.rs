use serde_json::Value;

use crate::errors::{RpcError, RpcResult};
use crate::rpc::envelope::Params;
use crate::rpc::registry::MethodSignature;

/// Produces the ordered argument list for a call.
///
/// Positional arguments pass through untouched, without an arity check.
/// Named arguments are matched against the declared parameters in order,
/// falling back to each parameter's default.
pub fn bind(signature: &MethodSignature, params: Option<&Params>) -> RpcResult<Vec<Value>> {
    let Some(params) = params.filter(|params| !params.is_empty()) else {
        return Ok(Vec::new());
    };

    match params {
        Params::Positional(values) => Ok(values.clone()),
        Params::Named(args) => signature
            .params
            .iter()
            .map(|param| {
                args.get(&param.name)
                    .filter(|value| !value.is_null())
                    .or(param.default.as_ref())
                    .cloned()
                    .ok_or_else(RpcError::invalid_params)
            })
            .collect(),
    }
}
