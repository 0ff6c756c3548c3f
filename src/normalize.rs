//! Schema Normalizer
//!
//! Configuration-driven, idempotent mutations applied uniformly to every
//! collected schema before reference resolution.
//!
//! - `suppress_additional_properties`: force `additionalProperties: false`
//! - `strip_trivial_titles`: drop `title` from every property without a
//!   `$ref`, so scalar fields don't turn into named type aliases downstream.
//!   Descends into nested `properties` maps only (not array `items`); for
//!   `definitions`, only each definition's direct properties are stripped.

use serde_json::Value;

use crate::config::NormalizeConfig;
use crate::schema::{Properties, SchemaDocument};

/// Normalize every schema in place
pub fn normalize_all<'a>(
    schemas: impl IntoIterator<Item = &'a mut SchemaDocument>,
    config: &NormalizeConfig,
) {
    for schema in schemas {
        normalize_schema(schema, config);
    }
}

/// Normalize a single schema in place
pub fn normalize_schema(schema: &mut SchemaDocument, config: &NormalizeConfig) {
    if config.suppress_additional_properties {
        schema.additional_properties = Some(Value::Bool(false));
    }

    if config.strip_trivial_titles {
        strip_titles(&mut schema.properties, true);
        for (_, definition) in schema.definitions.iter_mut() {
            if let Some(props) = definition.properties.as_mut() {
                strip_titles(props, false);
            }
        }
    }
}

fn strip_titles(properties: &mut Properties, recurse: bool) {
    for (_, prop) in properties.iter_mut() {
        if !prop.has_ref() {
            prop.title = None;
        }
        if recurse {
            if let Some(nested) = prop.properties.as_mut() {
                strip_titles(nested, true);
            }
        }
    }
}
