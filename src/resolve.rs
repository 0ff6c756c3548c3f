//! Reference Resolver
//!
//! A JSON-Schema alone cannot tell a plain string from a link to another
//! resource: both are `{"type": "string", "format": "uri"}`. The entity's ALPS
//! document can, through the `rt` (resource type) of the field's descriptor.
//! Resolution bridges the two documents:
//!
//! 1. fetch the entity's ALPS document
//! 2. find the descriptor block whose href is the entity's href
//! 3. for every top-level `string`/`uri` property, look up the field's
//!    descriptor, strip the `rt` fragment and find the entity with that href
//! 4. rewrite the property to `{"type": "object", "title": <target title>}`
//!
//! Every lookup is checked before anything is rewritten, so a failed
//! resolution leaves the schema exactly as it was.

use tracing::{debug, info};

use crate::catalog::{EntityCatalog, ReferencedSchema};
use crate::error::{CodegenError, Result};
use crate::schema::AlpsDocument;
use crate::source::MetadataSource;

/// Resolves references entity by entity, one ALPS fetch at a time
#[derive(Debug)]
pub struct ReferenceResolver<'a, S> {
    source: &'a S,
}

impl<'a, S: MetadataSource> ReferenceResolver<'a, S> {
    pub fn new(source: &'a S) -> Self {
        Self { source }
    }

    /// Resolve every entity in catalog order, storing each entity's
    /// referenced schemas on its entry
    pub async fn resolve_all(&self, catalog: &mut EntityCatalog) -> Result<()> {
        for index in 0..catalog.len() {
            let references = self.resolve_entity(catalog, index).await?;
            if let Some(entry) = catalog.get_mut(index) {
                entry.references = references;
            }
        }
        info!(count = catalog.len(), "resolved references");
        Ok(())
    }

    /// Fetch the ALPS document for the entity at `index` and resolve it
    pub async fn resolve_entity(
        &self,
        catalog: &mut EntityCatalog,
        index: usize,
    ) -> Result<Vec<ReferencedSchema>> {
        let (name, href) = match catalog.get(index) {
            Some(entry) => (entry.descriptor.name.clone(), entry.descriptor.href.clone()),
            None => return Err(missing_entry(index)),
        };

        debug!(entity = %name, %href, "fetching affordance document");
        let alps = self
            .source
            .fetch_alps(&href)
            .await
            .map_err(|e| {
                CodegenError::resolution(&name, format!("affordance document unavailable: {}", e))
            })?;

        resolve_references(catalog, index, &alps)
    }
}

/// A planned property rewrite
struct Rewrite {
    field: String,
    title: String,
}

/// Rewrite the schema at `index` using its ALPS document and return the other
/// schemas it references (deduplicated by href, self excluded).
pub fn resolve_references(
    catalog: &mut EntityCatalog,
    index: usize,
    alps: &AlpsDocument,
) -> Result<Vec<ReferencedSchema>> {
    let entry = catalog.get(index).ok_or_else(|| missing_entry(index))?;
    let name = entry.descriptor.name.as_str();
    let fail = |reason: String| CodegenError::resolution(name, reason);

    let matcher = catalog.matcher();
    let block = alps
        .entity_block(|href| matcher.same(href, &entry.descriptor.href))
        .ok_or_else(|| {
            fail(format!(
                "affordance document has no descriptor for {}",
                entry.descriptor.href
            ))
        })?;

    let mut rewrites = Vec::new();
    let mut references: Vec<ReferencedSchema> = Vec::new();

    for (field, _) in entry.schema.properties.iter().filter(|(_, p)| p.is_uri_string()) {
        let descriptor = block
            .field(field)
            .ok_or_else(|| fail(format!("field '{}' has no affordance descriptor", field)))?;

        let target_href = descriptor
            .rt_base()
            .ok_or_else(|| fail(format!("descriptor for field '{}' carries no rt", field)))?;

        let target_index = catalog
            .position_of(target_href)
            .ok_or_else(|| {
                fail(format!("field '{}' references unknown entity {}", field, target_href))
            })?;
        let target = catalog.get(target_index).ok_or_else(|| missing_entry(target_index))?;

        let title = target.schema.title.clone().ok_or_else(|| {
            fail(format!(
                "field '{}' references entity '{}' whose schema declares no title",
                field, target.descriptor.name
            ))
        })?;

        debug!(entity = %name, %field, target = %target.descriptor.name, "field is a reference");

        if target_index != index && !references.iter().any(|r| r.href == target.descriptor.href) {
            references.push(ReferencedSchema {
                entity: target.descriptor.name.clone(),
                href: target.descriptor.href.clone(),
                title: title.clone(),
            });
        }
        rewrites.push(Rewrite {
            field: field.to_string(),
            title,
        });
    }

    if let Some(entry) = catalog.get_mut(index) {
        for rewrite in rewrites {
            if let Some(prop) = entry.schema.properties.get_mut(&rewrite.field) {
                prop.kind = Some("object".to_string());
                prop.format = None;
                prop.title = Some(rewrite.title);
            }
        }
    }

    Ok(references)
}

fn missing_entry(index: usize) -> CodegenError {
    CodegenError::resolution(format!("#{}", index), "no such catalog entry")
}
