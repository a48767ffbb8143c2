//! # Payload Validation
//!
//! Structural validators attached to registered actions. A validator returns the list of
//! problems it found; an empty list means the payload is accepted.

use crate::error::{RpcError, RpcResult};
use crate::message::{is_envelope_field, Params};
use serde_json::Value;
use std::fmt;

/// A structural check over a request payload.
pub trait Schema: Send + Sync {
    fn validate(&self, params: &Params) -> Vec<String>;

    fn validate_and_return_error(&self, params: &Params) -> RpcResult<()> {
        let issues = self.validate(params);
        if issues.is_empty() {
            Ok(())
        } else {
            Err(RpcError::Validation(issues))
        }
    }
}

impl<F> Schema for F
where
    F: Fn(&Params) -> Vec<String> + Send + Sync,
{
    fn validate(&self, params: &Params) -> Vec<String> {
        self(params)
    }
}

/// JSON value types a property may be declared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeCode {
    Any,
    String,
    Integer,
    Number,
    Boolean,
    Object,
    Array,
}

impl TypeCode {
    fn matches(&self, value: &Value) -> bool {
        match self {
            TypeCode::Any => true,
            TypeCode::String => value.is_string(),
            TypeCode::Integer => value.is_i64() || value.is_u64(),
            TypeCode::Number => value.is_number(),
            TypeCode::Boolean => value.is_boolean(),
            TypeCode::Object => value.is_object(),
            TypeCode::Array => value.is_array(),
        }
    }
}

impl fmt::Display for TypeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TypeCode::Any => "any",
            TypeCode::String => "a string",
            TypeCode::Integer => "an integer",
            TypeCode::Number => "a number",
            TypeCode::Boolean => "a boolean",
            TypeCode::Object => "an object",
            TypeCode::Array => "an array",
        };
        f.write_str(name)
    }
}

#[derive(Clone)]
enum PropertyType {
    Type(TypeCode),
    Object(ObjectSchema),
}

#[derive(Clone)]
struct Property {
    name: String,
    kind: PropertyType,
    required: bool,
}

/// Validates the properties of a JSON object.
///
/// ```
/// use role_rpc::validation::{ObjectSchema, Schema, TypeCode};
/// use serde_json::json;
///
/// let schema = ObjectSchema::new(true).with_required_property("dummy_id", TypeCode::String);
/// let ok = json!({ "dummy_id": "1" });
/// let bad = json!({ "dummy_id": 1 });
/// assert!(schema.validate(ok.as_object().unwrap()).is_empty());
/// assert_eq!(schema.validate(bad.as_object().unwrap()).len(), 1);
/// ```
#[derive(Clone)]
pub struct ObjectSchema {
    properties: Vec<Property>,
    allow_undefined: bool,
}

impl ObjectSchema {
    /// `allow_undefined` lets through properties the schema doesn't declare.
    pub fn new(allow_undefined: bool) -> Self {
        Self {
            properties: Vec::new(),
            allow_undefined,
        }
    }

    pub fn with_required_property(self, name: &str, type_code: TypeCode) -> Self {
        self.with_property(name, PropertyType::Type(type_code), true)
    }

    pub fn with_optional_property(self, name: &str, type_code: TypeCode) -> Self {
        self.with_property(name, PropertyType::Type(type_code), false)
    }

    pub fn with_required_object(self, name: &str, schema: ObjectSchema) -> Self {
        self.with_property(name, PropertyType::Object(schema), true)
    }

    pub fn with_optional_object(self, name: &str, schema: ObjectSchema) -> Self {
        self.with_property(name, PropertyType::Object(schema), false)
    }

    fn with_property(mut self, name: &str, kind: PropertyType, required: bool) -> Self {
        self.properties.push(Property {
            name: name.to_string(),
            kind,
            required,
        });
        self
    }

    fn validate_at(&self, path: &str, params: &Params, issues: &mut Vec<String>) {
        for property in &self.properties {
            let full_name = if path.is_empty() {
                property.name.clone()
            } else {
                format!("{path}.{}", property.name)
            };

            match params.get(&property.name) {
                None | Some(Value::Null) => {
                    if property.required {
                        issues.push(format!("{full_name} is required"));
                    }
                }
                Some(value) => match &property.kind {
                    PropertyType::Type(type_code) => {
                        if !type_code.matches(value) {
                            issues.push(format!("{full_name} must be {type_code}"));
                        }
                    }
                    PropertyType::Object(schema) => match value.as_object() {
                        Some(nested) => schema.validate_at(&full_name, nested, issues),
                        None => issues.push(format!("{full_name} must be {}", TypeCode::Object)),
                    },
                },
            }
        }

        if !self.allow_undefined {
            for name in params.keys() {
                let declared = self.properties.iter().any(|p| &p.name == name);
                if !declared && !(path.is_empty() && is_envelope_field(name)) {
                    issues.push(format!("{} is not allowed", join(path, name)));
                }
            }
        }
    }
}

fn join(path: &str, name: &str) -> String {
    if path.is_empty() {
        name.to_string()
    } else {
        format!("{path}.{name}")
    }
}

impl Schema for ObjectSchema {
    fn validate(&self, params: &Params) -> Vec<String> {
        let mut issues = Vec::new();
        self.validate_at("", params, &mut issues);
        issues
    }
}
