//! Pipeline
//!
//! Discovery → Collector → Normalizer → Reference Resolver → Emission.
//!
//! Each stage finishes completely before the next starts, and no two fetches
//! are ever in flight together. Any failure aborts the run; nothing is
//! emitted until every entity has been resolved.

use serde::Serialize;
use tracing::{info, warn};

use crate::catalog::{CatalogEntry, EntityCatalog};
use crate::codegen::{self, GeneratedFile};
use crate::collector::collect_schemas;
use crate::config::CodegenConfig;
use crate::discovery::discover_entities;
use crate::error::{CodegenError, Result};
use crate::graph::ReferenceGraph;
use crate::href::HrefMatcher;
use crate::normalize::normalize_all;
use crate::resolve::ReferenceResolver;
use crate::source::MetadataSource;

/// A fully resolved run
#[derive(Debug)]
pub struct PipelineOutput {
    pub catalog: EntityCatalog,
    /// Groups of entities that reference each other
    pub cycles: Vec<Vec<String>>,
}

impl PipelineOutput {
    /// JSON-friendly view of the resolved catalog
    pub fn summary(&self) -> RunSummary<'_> {
        RunSummary {
            entities: self.catalog.entries(),
            cycles: &self.cycles,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct RunSummary<'a> {
    pub entities: &'a [CatalogEntry],
    pub cycles: &'a [Vec<String>],
}

/// Pipeline over one metadata source
#[derive(Debug)]
pub struct Pipeline<'a, S> {
    source: &'a S,
    config: &'a CodegenConfig,
}

impl<'a, S: MetadataSource> Pipeline<'a, S> {
    pub fn new(source: &'a S, config: &'a CodegenConfig) -> Self {
        Self { source, config }
    }

    /// Run every stage up to and including reference resolution
    pub async fn run(&self) -> Result<PipelineOutput> {
        let profile = self.source.fetch_profile().await.map_err(|e| match e {
            CodegenError::Authentication(_) => e,
            other => CodegenError::Discovery(format!("profile document unavailable: {}", other)),
        })?;

        let entities = discover_entities(&profile, &self.config.discovery.reserved)?;
        info!(count = entities.len(), "discovered entities");

        let matcher = HrefMatcher::new(self.config.resolve.href_policy, self.source.base_url());
        let mut catalog = collect_schemas(self.source, entities, matcher).await?;

        normalize_all(catalog.schemas_mut(), &self.config.normalize);

        ReferenceResolver::new(self.source).resolve_all(&mut catalog).await?;

        let cycles = ReferenceGraph::from_catalog(&catalog).cycles();
        for cycle in &cycles {
            warn!(entities = %cycle.join(" -> "), "reference cycle");
        }

        Ok(PipelineOutput { catalog, cycles })
    }

    /// Run the pipeline and render sources; nothing is written
    pub async fn generate(&self) -> Result<(PipelineOutput, Vec<GeneratedFile>)> {
        let output = self.run().await?;
        let files = codegen::generate(&output.catalog, &self.config.output)?;
        Ok((output, files))
    }
}
