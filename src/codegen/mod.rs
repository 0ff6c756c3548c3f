//! Code Generation
//!
//! Consumes a resolved [`EntityCatalog`] and renders client sources.
//!
//! Architecture:
//! - EmissionUnit: the handoff for one entity (descriptor, final schema,
//!   referenced schemas). Emitters never see the catalog or the network.
//! - Emitters: language-specific string builders that consume units
//! - write_files: the only step that touches the filesystem, run once the
//!   whole pipeline has succeeded

pub mod config;
pub mod names;
pub mod typescript;

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::catalog::{CatalogEntry, EntityCatalog, ReferencedSchema};
use crate::config::OutputConfig;
use crate::error::{CodegenError, Result};
use crate::schema::{EntityDescriptor, SchemaDocument};

// =============================================================================
// Emission Unit
// =============================================================================

/// Everything an emitter may know about one entity
#[derive(Debug, Clone, Copy)]
pub struct EmissionUnit<'a> {
    pub entity: &'a EntityDescriptor,
    pub schema: &'a SchemaDocument,
    pub references: &'a [ReferencedSchema],
}

impl<'a> EmissionUnit<'a> {
    pub fn from_entry(entry: &'a CatalogEntry) -> Self {
        Self {
            entity: &entry.descriptor,
            schema: &entry.schema,
            references: &entry.references,
        }
    }

    /// Data class name: the schema title, or the entity name when untitled
    pub fn class_name(&self) -> String {
        match self.schema.title.as_deref() {
            Some(title) => names::pascal_case(title),
            None => names::pascal_case(&self.entity.name),
        }
    }

    pub fn service_name(&self) -> String {
        format!("{}Service", self.class_name())
    }

    /// Module path of the data class, without extension
    pub fn class_module(&self) -> String {
        class_module(&self.class_name())
    }

    pub fn service_module(&self) -> String {
        format!("{}.service", names::kebab_case(&self.entity.name))
    }
}

/// Module path of the data class named `class_name`
pub fn class_module(class_name: &str) -> String {
    names::kebab_case(class_name)
}

/// Units for every entry in catalog order
pub fn emission_units(catalog: &EntityCatalog) -> impl Iterator<Item = EmissionUnit<'_>> {
    catalog.entries().iter().map(EmissionUnit::from_entry)
}

// =============================================================================
// Generated Output
// =============================================================================

/// One generated source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedFile {
    /// Path relative to the output directory
    pub path: PathBuf,
    pub contents: String,
}

impl GeneratedFile {
    fn new(module: &str, contents: String) -> Self {
        Self {
            path: PathBuf::from(format!("{}.ts", module)),
            contents,
        }
    }
}

// =============================================================================
// Public API
// =============================================================================

/// Render TypeScript sources for every entity `output` lets through.
///
/// All entities stay visible to type mapping; filtering only decides which
/// files are produced. Two entities rendering to the same file is an error.
pub fn generate(catalog: &EntityCatalog, output: &OutputConfig) -> Result<Vec<GeneratedFile>> {
    let units: Vec<EmissionUnit<'_>> = emission_units(catalog)
        .filter(|unit| output.emits(&unit.entity.name))
        .collect();

    let mut files = Vec::with_capacity(units.len() * 2 + 1);
    let mut owners: HashMap<PathBuf, &str> = HashMap::with_capacity(units.len() * 2);

    for unit in &units {
        for reference in unit.references {
            if !output.emits(&reference.entity) {
                warn!(
                    entity = %unit.entity.name,
                    referenced = %reference.entity,
                    "referenced entity is filtered out of emission; its import will not resolve"
                );
            }
        }

        let class =
            GeneratedFile::new(&unit.class_module(), typescript::emit_class(unit, &output.types));
        let service = GeneratedFile::new(&unit.service_module(), typescript::emit_service(unit));

        for file in [class, service] {
            if let Some(other) = owners.insert(file.path.clone(), &unit.entity.name) {
                return Err(CodegenError::Emission(format!(
                    "entities '{}' and '{}' both render to {}",
                    other,
                    unit.entity.name,
                    file.path.display()
                )));
            }
            debug!(entity = %unit.entity.name, path = %file.path.display(), "rendered");
            files.push(file);
        }
    }

    if !units.is_empty() {
        files.push(GeneratedFile::new("index", typescript::emit_index(&units)));
    }

    info!(entities = units.len(), files = files.len(), "generated sources");
    Ok(files)
}

/// Write `files` under `dir`, creating directories as needed
pub fn write_files(dir: &Path, files: &[GeneratedFile]) -> Result<()> {
    std::fs::create_dir_all(dir)?;
    for file in files {
        let path = dir.join(&file.path);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, &file.contents)?;
        debug!(path = %path.display(), "wrote");
    }
    info!(dir = %dir.display(), count = files.len(), "wrote generated sources");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{Properties, PropertySchema};

    fn catalog() -> EntityCatalog {
        let mut catalog = EntityCatalog::default();
        let mut book = Properties::new();
        book.insert("title".into(), PropertySchema::of_kind("string"));
        book.insert("author".into(), PropertySchema::of_kind("object").with_title("Author"));
        catalog
            .insert(EntityDescriptor::new("books", "/api/books"), SchemaDocument::new("Book", book))
            .unwrap();

        let mut author = Properties::new();
        author.insert("name".into(), PropertySchema::of_kind("string"));
        catalog
            .insert(
                EntityDescriptor::new("authors", "/api/authors"),
                SchemaDocument::new("Author", author),
            )
            .unwrap();

        catalog.get_mut(0).unwrap().references = vec![ReferencedSchema {
            entity: "authors".into(),
            href: "/api/authors".into(),
            title: "Author".into(),
        }];
        catalog
    }

    fn paths(files: &[GeneratedFile]) -> Vec<String> {
        files.iter().map(|f| f.path.display().to_string()).collect()
    }

    #[test]
    fn test_unit_names() {
        let catalog = catalog();
        let unit = EmissionUnit::from_entry(catalog.get(0).unwrap());
        assert_eq!(unit.class_name(), "Book");
        assert_eq!(unit.service_name(), "BookService");
        assert_eq!(unit.class_module(), "book");
        assert_eq!(unit.service_module(), "books.service");
    }

    #[test]
    fn test_untitled_schema_uses_entity_name() {
        let mut catalog = EntityCatalog::default();
        let mut schema = SchemaDocument::new("x", Properties::new());
        schema.title = None;
        catalog
            .insert(EntityDescriptor::new("bookAuthors", "/api/bookAuthors"), schema)
            .unwrap();
        let unit = EmissionUnit::from_entry(catalog.get(0).unwrap());
        assert_eq!(unit.class_name(), "BookAuthors");
        assert_eq!(unit.service_module(), "book-authors.service");
    }

    #[test]
    fn test_generate_files_per_entity_plus_index() {
        let files = generate(&catalog(), &OutputConfig::default()).unwrap();
        assert_eq!(
            paths(&files),
            vec!["book.ts", "books.service.ts", "author.ts", "authors.service.ts", "index.ts"]
        );
    }

    #[test]
    fn test_output_filters() {
        let mut output = OutputConfig::default();
        output.exclude = vec!["books".into()];
        let files = generate(&catalog(), &output).unwrap();
        assert_eq!(paths(&files), vec!["author.ts", "authors.service.ts", "index.ts"]);

        let mut output = OutputConfig::default();
        output.include = vec!["nothing".into()];
        assert!(generate(&catalog(), &output).unwrap().is_empty());
    }

    #[test]
    fn test_colliding_titles_are_rejected() {
        let mut catalog = EntityCatalog::default();
        catalog
            .insert(
                EntityDescriptor::new("books", "/api/books"),
                SchemaDocument::new("Book", Properties::new()),
            )
            .unwrap();
        catalog
            .insert(
                EntityDescriptor::new("novels", "/api/novels"),
                SchemaDocument::new("Book", Properties::new()),
            )
            .unwrap();

        let err = generate(&catalog, &OutputConfig::default()).unwrap_err();
        assert!(matches!(err, CodegenError::Emission(_)));
        assert!(err.to_string().contains("book.ts"));
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let out = dir.path().join("generated");
        let files = generate(&catalog(), &OutputConfig::default()).unwrap();

        write_files(&out, &files).unwrap();

        for file in &files {
            let written = std::fs::read_to_string(out.join(&file.path)).unwrap();
            assert_eq!(written, file.contents);
        }
    }
}
