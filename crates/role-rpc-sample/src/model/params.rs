//! Request schemas and argument decoding shared by the dummy services and controller.

use super::Dummy;
use role_rpc::message::{self, Params};
use role_rpc::validation::{ObjectSchema, TypeCode};
use role_rpc::{RpcError, RpcResult};
use serde_json::Value;

pub const DUMMY_FIELD: &str = "dummy";
pub const DUMMY_ID_FIELD: &str = "dummy_id";
pub const FILTER_FIELD: &str = "filter";

/// Shape of a dummy inside a request.
pub fn dummy_schema() -> ObjectSchema {
    ObjectSchema::new(false)
        .with_optional_property("id", TypeCode::String)
        .with_required_property("key", TypeCode::String)
        .with_required_property("content", TypeCode::String)
}

pub fn get_dummies_schema() -> ObjectSchema {
    ObjectSchema::new(true).with_optional_object(
        FILTER_FIELD,
        ObjectSchema::new(true).with_optional_property("key", TypeCode::String),
    )
}

pub fn dummy_id_schema() -> ObjectSchema {
    ObjectSchema::new(true).with_required_property(DUMMY_ID_FIELD, TypeCode::String)
}

pub fn dummy_body_schema() -> ObjectSchema {
    ObjectSchema::new(true).with_required_object(DUMMY_FIELD, dummy_schema())
}

pub fn dummy_arg(args: &Params) -> RpcResult<Dummy> {
    let value = args.get(DUMMY_FIELD).cloned().unwrap_or(Value::Null);
    Ok(serde_json::from_value(value)?)
}

pub fn dummy_id_arg(args: &Params) -> RpcResult<String> {
    message::str_field(args, DUMMY_ID_FIELD)
        .map(str::to_string)
        .ok_or_else(|| RpcError::Validation(vec![format!("{DUMMY_ID_FIELD} is required")]))
}

/// The `filter.key` argument, if any.
pub fn key_filter_arg(args: &Params) -> Option<String> {
    args.get(FILTER_FIELD)
        .and_then(|filter| filter.get("key"))
        .and_then(Value::as_str)
        .map(str::to_string)
}
