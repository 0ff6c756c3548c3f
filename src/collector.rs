//! Schema Collector
//!
//! Fetches one schema per discovered entity, strictly one request at a time,
//! and pairs each with its descriptor in an [`EntityCatalog`].

use std::collections::HashMap;
use tracing::{debug, info};

use crate::catalog::EntityCatalog;
use crate::error::{CodegenError, Result};
use crate::href::HrefMatcher;
use crate::schema::EntityDescriptor;
use crate::source::MetadataSource;

/// Collect schemas for `entities` in order.
///
/// The first failed fetch aborts the whole collection with a
/// [`CodegenError::Collection`] naming the entity; there is no partial result.
pub async fn collect_schemas<S: MetadataSource>(
    source: &S,
    entities: Vec<EntityDescriptor>,
    matcher: HrefMatcher,
) -> Result<EntityCatalog> {
    ensure_unique_hrefs(&entities, &matcher)?;

    let mut catalog = EntityCatalog::new(matcher);
    for descriptor in entities {
        debug!(entity = %descriptor.name, href = %descriptor.href, "fetching schema");
        let schema = source
            .fetch_schema(&descriptor.href)
            .await
            .map_err(|e| CodegenError::collection(descriptor.name.clone(), e))?;
        catalog.insert(descriptor, schema)?;
    }

    info!(count = catalog.len(), "collected schemas");
    Ok(catalog)
}

/// Reject duplicate hrefs before any request goes out
fn ensure_unique_hrefs(entities: &[EntityDescriptor], matcher: &HrefMatcher) -> Result<()> {
    let mut seen: HashMap<String, &str> = HashMap::with_capacity(entities.len());
    for entity in entities {
        if let Some(first) = seen.insert(matcher.key(&entity.href), &entity.name) {
            return Err(CodegenError::Discovery(format!(
                "entities '{}' and '{}' share href {}",
                first, entity.name, entity.href
            )));
        }
    }
    Ok(())
}
