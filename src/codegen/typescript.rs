//! TypeScript Emitter
//!
//! Renders an [`EmissionUnit`] as a data class module and a fetch-based
//! service module.
//!
//! Key constraints:
//! - Only the unit is read: its schema, its referenced schemas and its entity
//! - Scalar and format types come from [`TypeMappings`]
//! - A titled object property is a class only when the title names this
//!   entity or one of its references; anything else is a plain record

use std::collections::HashMap;

use serde_json::Value;

use super::config::{property_key, TypeMappings};
use super::{class_module, names, EmissionUnit};
use crate::schema::{Properties, PropertySchema, SchemaDocument};

const DEFINITIONS_PREFIX: &str = "#/definitions/";

// =============================================================================
// Public API
// =============================================================================

/// Emit the data class module
pub fn emit_class(unit: &EmissionUnit<'_>, types: &TypeMappings) -> String {
    let scope = TypeScope::new(unit);
    let mut output = String::new();

    emit_header(&mut output, unit);

    for (_, class) in &scope.imports {
        output.push_str(&format!("import {{ {} }} from './{}';\n", class, class_module(class)));
    }
    if !scope.imports.is_empty() {
        output.push('\n');
    }

    for (name, definition) in unit.schema.definitions.iter() {
        emit_definition(&mut output, name, definition, &scope, types);
        output.push('\n');
    }

    output.push_str(&format!("export class {} {{\n", scope.own_class));
    let required = required_fields(unit.schema);
    for (name, prop) in unit.schema.properties.iter() {
        emit_field(&mut output, name, prop, required.contains(&name.as_str()), &scope, types);
    }
    output.push_str("}\n");

    output
}

/// Emit the service stub module
pub fn emit_service(unit: &EmissionUnit<'_>) -> String {
    let mut output = String::new();
    emit_header(&mut output, unit);

    let class = unit.class_name();
    output.push_str(&format!("import {{ {} }} from './{}';\n\n", class, unit.class_module()));
    output.push_str(
        &SERVICE_TEMPLATE
            .replace("__SERVICE__", &unit.service_name())
            .replace("__CLASS__", &class)
            .replace("__PATH__", &unit.entity.name)
            .replace("__EMBEDDED__", &unit.entity.name),
    );
    output
}

/// Emit the barrel module re-exporting every unit
pub fn emit_index(units: &[EmissionUnit<'_>]) -> String {
    let mut output = String::from("// Generated by hal-codegen. Do not edit.\n\n");
    for unit in units {
        output.push_str(&format!("export * from './{}';\n", unit.class_module()));
        output.push_str(&format!("export * from './{}';\n", unit.service_module()));
    }
    output
}

// =============================================================================
// Type Scope
// =============================================================================

/// Class names visible from one module
struct TypeScope {
    own_title: Option<String>,
    own_class: String,
    /// referenced title -> class name, in reference order
    imports: Vec<(String, String)>,
    /// definition key -> interface name
    definitions: HashMap<String, String>,
}

impl TypeScope {
    fn new(unit: &EmissionUnit<'_>) -> Self {
        let own_class = unit.class_name();
        let imports = unit
            .references
            .iter()
            .map(|r| (r.title.clone(), names::pascal_case(&r.title)))
            .filter(|(_, class)| *class != own_class)
            .collect();
        let definitions = unit
            .schema
            .definitions
            .keys()
            .map(|key| (key.clone(), definition_name(key)))
            .collect();

        Self {
            own_title: unit.schema.title.clone(),
            own_class,
            imports,
            definitions,
        }
    }

    /// Class for a titled object property, if the title is in scope
    fn class_for(&self, title: &str) -> Option<&str> {
        if self.own_title.as_deref() == Some(title) {
            return Some(&self.own_class);
        }
        self.imports
            .iter()
            .find(|(t, _)| t == title)
            .map(|(_, class)| class.as_str())
    }

    fn definition_for(&self, reference: &str) -> Option<&str> {
        reference
            .strip_prefix(DEFINITIONS_PREFIX)
            .and_then(|key| self.definitions.get(key))
            .map(String::as_str)
    }
}

fn definition_name(key: &str) -> String {
    names::pascal_case(key)
}

// =============================================================================
// Type Mapping
// =============================================================================

fn property_type(prop: &PropertySchema, scope: &TypeScope, types: &TypeMappings) -> String {
    if let Some(reference) = prop.reference.as_deref() {
        return scope
            .definition_for(reference)
            .map(str::to_string)
            .unwrap_or_else(|| types.any.clone());
    }

    if let Some(literals) = enum_literals(prop) {
        return literals;
    }

    match prop.kind.as_deref() {
        Some("array") => {
            let item = match prop.items.as_deref() {
                Some(items) => property_type(items, scope, types),
                None => types.any.clone(),
            };
            types.wrap_array(&item)
        }
        Some("object") => match prop.title.as_deref().and_then(|t| scope.class_for(t)) {
            Some(class) => class.to_string(),
            None => types.wrap_map(&types.any),
        },
        Some(scalar) => prop
            .format
            .as_deref()
            .and_then(|f| types.format_type(f))
            .unwrap_or_else(|| types.scalar_type(scalar))
            .to_string(),
        None => types.any.clone(),
    }
}

/// `'A' | 'B'` for a string enum
fn enum_literals(prop: &PropertySchema) -> Option<String> {
    let values = prop.extra.get("enum")?.as_array()?;
    let literals: Vec<String> = values
        .iter()
        .map(|v| v.as_str().map(|s| format!("'{}'", escape_literal(s))))
        .collect::<Option<_>>()?;
    if literals.is_empty() {
        return None;
    }
    Some(literals.join(" | "))
}

/// Body of a single-quoted literal
fn escape_literal(value: &str) -> String {
    value.replace('\\', "\\\\").replace('\'', "\\'")
}

fn required_fields(schema: &SchemaDocument) -> Vec<&str> {
    match schema.extra.get("required") {
        Some(Value::Array(names)) => names.iter().filter_map(Value::as_str).collect(),
        _ => Vec::new(),
    }
}

// =============================================================================
// Emission
// =============================================================================

fn emit_header(output: &mut String, unit: &EmissionUnit<'_>) {
    output.push_str(&format!(
        "// Generated by hal-codegen from {}. Do not edit.\n\n",
        unit.entity.href
    ));
}

fn emit_field(
    output: &mut String,
    name: &str,
    prop: &PropertySchema,
    required: bool,
    scope: &TypeScope,
    types: &TypeMappings,
) {
    let marker = if required { "!" } else { "?" };
    output.push_str(&format!(
        "  {}{}: {};\n",
        property_key(name),
        marker,
        property_type(prop, scope, types)
    ));
}

fn emit_definition(
    output: &mut String,
    key: &str,
    definition: &PropertySchema,
    scope: &TypeScope,
    types: &TypeMappings,
) {
    output.push_str(&format!("export interface {} {{\n", definition_name(key)));
    if let Some(props) = definition.properties.as_ref() {
        emit_interface_fields(output, props, scope, types);
    }
    output.push_str("}\n");
}

fn emit_interface_fields(
    output: &mut String,
    props: &Properties,
    scope: &TypeScope,
    types: &TypeMappings,
) {
    for (name, prop) in props.iter() {
        emit_field(output, name, prop, false, scope, types);
    }
}

const SERVICE_TEMPLATE: &str = r#"export class __SERVICE__ {
  constructor(
    private readonly baseUrl: string,
    private readonly init: RequestInit = {},
  ) {}

  async findAll(): Promise<__CLASS__[]> {
    const page = await this.send<{ _embedded?: { __EMBEDDED__?: __CLASS__[] } }>(this.url(), 'GET');
    return page._embedded?.__EMBEDDED__ ?? [];
  }

  findById(id: string | number): Promise<__CLASS__> {
    return this.send<__CLASS__>(this.url(id), 'GET');
  }

  create(entity: __CLASS__): Promise<__CLASS__> {
    return this.send<__CLASS__>(this.url(), 'POST', entity);
  }

  update(id: string | number, entity: __CLASS__): Promise<__CLASS__> {
    return this.send<__CLASS__>(this.url(id), 'PUT', entity);
  }

  async remove(id: string | number): Promise<void> {
    await this.send<void>(this.url(id), 'DELETE');
  }

  private url(id?: string | number): string {
    const base = `${this.baseUrl}/__PATH__`;
    return id === undefined ? base : `${base}/${encodeURIComponent(String(id))}`;
  }

  private async send<T>(url: string, method: string, body?: unknown): Promise<T> {
    const response = await fetch(url, {
      ...this.init,
      method,
      headers: {
        Accept: 'application/hal+json',
        'Content-Type': 'application/json',
        ...(this.init.headers as Record<string, string> | undefined),
      },
      body: body === undefined ? undefined : JSON.stringify(body),
    });
    if (!response.ok) {
      throw new Error(`${method} ${url} failed with HTTP ${response.status}`);
    }
    if (response.status === 204) {
      return undefined as T;
    }
    return (await response.json()) as T;
  }
}
"#;
