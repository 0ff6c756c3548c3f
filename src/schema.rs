//! Metadata document types
//!
//! Typed views over the three documents the upstream API serves: the HAL
//! profile listing, one JSON-Schema per entity and one ALPS affordance
//! document per entity. Unknown keys are kept in `extra` so a rewritten
//! schema serializes back without losing anything.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A discovered repository endpoint (e.g. `books` -> `/api/profile/books`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct EntityDescriptor {
    /// Link relation name from the profile document
    pub name: String,
    /// Href of the entity's metadata, as served
    pub href: String,
}

impl EntityDescriptor {
    /// Create a new descriptor
    pub fn new(name: impl Into<String>, href: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            href: href.into(),
        }
    }
}

/// The top-level profile document (`{"_links": {...}}`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ProfileDocument {
    /// Link relation name -> link object, in document order
    #[serde(rename = "_links", default, skip_serializing_if = "Option::is_none")]
    pub links: Option<Map<String, Value>>,
}

/// Ordered mapping of field name to property schema.
///
/// Field order is the order the server declared them in, which is also the
/// order fields are emitted in.
pub type Properties = IndexMap<String, PropertySchema>;

// =============================================================================
// Schemas
// =============================================================================

/// A single property of a schema, nested recursively for object types
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PropertySchema {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "$ref", default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub properties: Option<Properties>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub items: Option<Box<PropertySchema>>,

    /// Everything else (readOnly, description, enum, ...)
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PropertySchema {
    /// Shorthand for a `{"type": kind}` property
    pub fn of_kind(kind: impl Into<String>) -> Self {
        Self {
            kind: Some(kind.into()),
            ..Self::default()
        }
    }

    /// Builder-style format setter
    pub fn with_format(mut self, format: impl Into<String>) -> Self {
        self.format = Some(format.into());
        self
    }

    /// Builder-style title setter
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// `type: "string", format: "uri"`, the marker for a probable foreign link
    pub fn is_uri_string(&self) -> bool {
        self.kind.as_deref() == Some("string") && self.format.as_deref() == Some("uri")
    }

    pub fn has_ref(&self) -> bool {
        self.reference.is_some()
    }
}

/// The JSON-Schema document served for one entity
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SchemaDocument {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub properties: Properties,

    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub definitions: Properties,

    /// Usually a bool, but JSON-Schema allows a schema here too
    #[serde(rename = "additionalProperties", default, skip_serializing_if = "Option::is_none")]
    pub additional_properties: Option<Value>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl SchemaDocument {
    /// Create an object schema with a title and properties
    pub fn new(title: impl Into<String>, properties: Properties) -> Self {
        Self {
            title: Some(title.into()),
            kind: Some("object".to_string()),
            properties,
            ..Self::default()
        }
    }
}

// =============================================================================
// ALPS affordance documents
// =============================================================================

/// An `application/alps+json` document
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AlpsDocument {
    #[serde(default)]
    pub alps: Alps,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Alps {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    #[serde(default)]
    pub descriptor: Vec<AffordanceDescriptor>,
}

/// A single ALPS descriptor; entity blocks nest their field descriptors
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AffordanceDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,

    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,

    /// Resource type reference, e.g. `http://host/api/profile/authors#author-representation`
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rt: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub descriptor: Vec<AffordanceDescriptor>,
}

impl AffordanceDescriptor {
    /// `rt` with everything from the last `#` onward removed
    pub fn rt_base(&self) -> Option<&str> {
        self.rt.as_deref().map(|rt| match rt.rfind('#') {
            Some(pos) => &rt[..pos],
            None => rt,
        })
    }

    /// Find a nested descriptor by field name
    pub fn field(&self, name: &str) -> Option<&AffordanceDescriptor> {
        self.descriptor.iter().find(|d| d.name.as_deref() == Some(name))
    }
}

impl AlpsDocument {
    /// First top-level descriptor whose href satisfies `matches`
    pub fn entity_block(&self, matches: impl Fn(&str) -> bool) -> Option<&AffordanceDescriptor> {
        self.alps
            .descriptor
            .iter()
            .find(|d| d.href.as_deref().map(&matches).unwrap_or(false))
    }
}
