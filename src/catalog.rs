//! Entity Catalog
//!
//! Pairs each entity descriptor with its schema and, after resolution, the
//! schemas it references. Entries keep discovery order; lookups go through a
//! policy-normalized href index so no stage ever relies on two lists staying
//! index-aligned.

use serde::Serialize;
use std::collections::HashMap;

use crate::error::{CodegenError, Result};
use crate::href::HrefMatcher;
use crate::schema::{EntityDescriptor, SchemaDocument};

/// A schema referenced by another entity's schema
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferencedSchema {
    /// Entity name of the referenced schema
    pub entity: String,
    /// Href of the referenced entity
    pub href: String,
    /// Declared title of the referenced schema (the emitted type name)
    pub title: String,
}

/// One entity with everything the pipeline learned about it
#[derive(Debug, Clone, Serialize)]
pub struct CatalogEntry {
    pub descriptor: EntityDescriptor,
    pub schema: SchemaDocument,
    /// Other schemas this one references, deduplicated, self excluded
    pub references: Vec<ReferencedSchema>,
}

impl CatalogEntry {
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }
}

/// Ordered, href-indexed set of entities
#[derive(Debug, Clone, Default)]
pub struct EntityCatalog {
    entries: Vec<CatalogEntry>,
    by_href: HashMap<String, usize>,
    matcher: HrefMatcher,
}

impl EntityCatalog {
    pub fn new(matcher: HrefMatcher) -> Self {
        Self {
            entries: Vec::new(),
            by_href: HashMap::new(),
            matcher,
        }
    }

    /// Append an entity; its href must be unique under the catalog's policy
    pub fn insert(
        &mut self,
        descriptor: EntityDescriptor,
        schema: SchemaDocument,
    ) -> Result<usize> {
        let key = self.matcher.key(&descriptor.href);
        if let Some(&existing) = self.by_href.get(&key) {
            return Err(CodegenError::Discovery(format!(
                "entities '{}' and '{}' share href {}",
                self.entries[existing].descriptor.name, descriptor.name, descriptor.href
            )));
        }

        let index = self.entries.len();
        self.by_href.insert(key, index);
        self.entries.push(CatalogEntry {
            descriptor,
            schema,
            references: Vec::new(),
        });
        Ok(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn matcher(&self) -> &HrefMatcher {
        &self.matcher
    }

    pub fn entries(&self) -> &[CatalogEntry] {
        &self.entries
    }

    pub fn get(&self, index: usize) -> Option<&CatalogEntry> {
        self.entries.get(index)
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut CatalogEntry> {
        self.entries.get_mut(index)
    }

    /// Position of the entity whose href matches `href`
    pub fn position_of(&self, href: &str) -> Option<usize> {
        self.by_href.get(&self.matcher.key(href)).copied()
    }

    pub fn find_by_href(&self, href: &str) -> Option<&CatalogEntry> {
        self.position_of(href).and_then(|i| self.entries.get(i))
    }

    pub fn find_by_name(&self, name: &str) -> Option<&CatalogEntry> {
        self.entries.iter().find(|e| e.descriptor.name == name)
    }

    pub fn schemas(&self) -> impl Iterator<Item = &SchemaDocument> {
        self.entries.iter().map(|e| &e.schema)
    }

    pub fn schemas_mut(&mut self) -> impl Iterator<Item = &mut SchemaDocument> {
        self.entries.iter_mut().map(|e| &mut e.schema)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::href::HrefPolicy;
    use crate::schema::Properties;

    fn schema(title: &str) -> SchemaDocument {
        SchemaDocument::new(title, Properties::new())
    }

    #[test]
    fn test_entries_keep_insertion_order() {
        let mut catalog = EntityCatalog::default();
        catalog.insert(EntityDescriptor::new("books", "/api/books"), schema("Book")).unwrap();
        catalog.insert(EntityDescriptor::new("authors", "/api/authors"), schema("Author")).unwrap();

        let names: Vec<&str> = catalog.entries().iter().map(|e| e.name()).collect();
        assert_eq!(names, vec!["books", "authors"]);
        assert_eq!(catalog.position_of("/api/authors"), Some(1));
    }

    #[test]
    fn test_lookup_follows_policy() {
        let mut exact = EntityCatalog::new(HrefMatcher::exact());
        exact.insert(EntityDescriptor::new("books", "/api/books"), schema("Book")).unwrap();
        assert!(exact.find_by_href("/api/books/").is_none());

        let mut normalized = EntityCatalog::new(HrefMatcher::new(HrefPolicy::Normalized, None));
        normalized.insert(EntityDescriptor::new("books", "/api/books"), schema("Book")).unwrap();
        assert_eq!(
            normalized.find_by_href("/api/books/").map(|e| e.name()),
            Some("books")
        );
    }

    #[test]
    fn test_duplicate_href_is_rejected() {
        let mut catalog = EntityCatalog::default();
        catalog.insert(EntityDescriptor::new("books", "/api/books"), schema("Book")).unwrap();
        let err = catalog
            .insert(EntityDescriptor::new("novels", "/api/books/"), schema("Novel"))
            .unwrap_err();
        assert!(err.to_string().contains("novels"));
        assert_eq!(catalog.len(), 1);
    }
}
