//! Emission Configuration
//!
//! Type mappings used by the TypeScript emitter. Resolution and
//! normalization are config-driven elsewhere; only rendering lives here.

use serde::{Deserialize, Serialize};

/// Type mappings for JSON scalar types and formats
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeMappings {
    /// JSON string -> language type
    #[serde(default = "ts_string")]
    pub string: String,
    /// JSON integer -> language type
    #[serde(default = "ts_number")]
    pub integer: String,
    /// JSON number -> language type
    #[serde(default = "ts_number")]
    pub number: String,
    /// JSON boolean -> language type
    #[serde(default = "ts_boolean")]
    pub boolean: String,

    /// Format-specific mappings
    #[serde(default = "ts_string")]
    pub datetime: String,
    #[serde(default = "ts_string")]
    pub date: String,
    #[serde(default)]
    pub uri: Option<String>,

    /// Unknown/any type
    #[serde(default = "ts_unknown")]
    pub any: String,
}

fn ts_string() -> String {
    "string".to_string()
}

fn ts_number() -> String {
    "number".to_string()
}

fn ts_boolean() -> String {
    "boolean".to_string()
}

fn ts_unknown() -> String {
    "unknown".to_string()
}

impl Default for TypeMappings {
    fn default() -> Self {
        Self {
            string: ts_string(),
            integer: ts_number(),
            number: ts_number(),
            boolean: ts_boolean(),
            datetime: ts_string(),
            date: ts_string(),
            uri: None,
            any: ts_unknown(),
        }
    }
}

impl TypeMappings {
    /// Get the type string for a JSON scalar
    pub fn scalar_type(&self, scalar: &str) -> &str {
        match scalar {
            "string" => &self.string,
            "integer" => &self.integer,
            "number" => &self.number,
            "boolean" => &self.boolean,
            _ => &self.any,
        }
    }

    /// Get the type string for a JSON format, if it overrides the scalar
    pub fn format_type(&self, format: &str) -> Option<&str> {
        match format {
            "date-time" => Some(&self.datetime),
            "date" => Some(&self.date),
            "uri" | "uri-reference" => self.uri.as_deref(),
            _ => None,
        }
    }

    /// Wrap a type in an array
    pub fn wrap_array(&self, type_str: &str) -> String {
        if type_str.contains(' ') {
            format!("Array<{}>", type_str)
        } else {
            format!("{}[]", type_str)
        }
    }

    /// Wrap a type in a string-keyed map
    pub fn wrap_map(&self, value_type: &str) -> String {
        format!("Record<string, {}>", value_type)
    }
}

/// Quote a property name if it is not a valid bare identifier
pub fn property_key(name: &str) -> String {
    let mut chars = name.chars();
    let valid = match chars.next() {
        Some(first) => {
            (first.is_ascii_alphabetic() || first == '_' || first == '$')
                && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$')
        }
        None => false,
    };
    if valid {
        name.to_string()
    } else {
        format!("'{}'", name.replace('\'', "\\'"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_typescript_defaults() {
        let types = TypeMappings::default();
        assert_eq!(types.scalar_type("string"), "string");
        assert_eq!(types.scalar_type("integer"), "number");
        assert_eq!(types.scalar_type("null"), "unknown");
        assert_eq!(types.format_type("date-time"), Some("string"));
        assert_eq!(types.format_type("uri"), None);
    }

    #[test]
    fn test_wrap_containers() {
        let types = TypeMappings::default();
        assert_eq!(types.wrap_array("number"), "number[]");
        assert_eq!(types.wrap_array("Record<string, unknown>"), "Array<Record<string, unknown>>");
        assert_eq!(types.wrap_map("string"), "Record<string, string>");
    }

    #[test]
    fn test_property_key_quoting() {
        assert_eq!(property_key("isbn"), "isbn");
        assert_eq!(property_key("_links"), "_links");
        assert_eq!(property_key("first-name"), "'first-name'");
        assert_eq!(property_key("1st"), "'1st'");
    }
}
