//! Entity Discovery
//!
//! Turns the profile document's links into entity descriptors.

use tracing::debug;

use crate::error::{CodegenError, Result};
use crate::schema::{EntityDescriptor, ProfileDocument};

/// The self-reference relation, never an entity
pub const SELF_RELATION: &str = "self";

/// Extract one descriptor per non-reserved link, in document order.
///
/// A document without a `_links` container is a [`CodegenError::Discovery`];
/// an empty container is valid and yields no entities.
pub fn discover_entities(
    profile: &ProfileDocument,
    reserved: &[String],
) -> Result<Vec<EntityDescriptor>> {
    let links = profile.links.as_ref().ok_or_else(|| {
        CodegenError::Discovery("profile document has no _links container".to_string())
    })?;

    let mut entities = Vec::with_capacity(links.len());
    for (relation, link) in links {
        if relation == SELF_RELATION || reserved.iter().any(|r| r == relation) {
            continue;
        }

        let href = link
            .get("href")
            .and_then(|v| v.as_str())
            .ok_or_else(|| {
                CodegenError::Discovery(format!("link '{}' has no string href", relation))
            })?;

        debug!(entity = %relation, %href, "discovered entity");
        entities.push(EntityDescriptor::new(relation.clone(), href));
    }

    Ok(entities)
}
