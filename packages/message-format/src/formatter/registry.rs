//! Formatter registry
//!
//! Owns the registered formatters, the type graph and a per-type resolution
//! cache. The cache is invalidated whenever a type formatter is registered or a
//! type is declared; a lookup that raced with a registration never stores its
//! result.

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::builtin;
use super::types::TypeGraph;
use super::ParameterFormatter;

type Formatters = Arc<[Arc<dyn ParameterFormatter>]>;

struct TypeEntry {
    order: i32,
    sequence: usize,
    formatter: Arc<dyn ParameterFormatter>,
}

#[derive(Default)]
struct Registrations {
    types: TypeGraph,
    named: HashMap<String, Arc<dyn ParameterFormatter>>,
    typed: HashMap<String, Vec<TypeEntry>>,
    generation: u64,
}

#[derive(Default)]
struct TypeCache {
    generation: u64,
    entries: HashMap<String, Formatters>,
}

pub struct FormatterRegistry {
    registrations: RwLock<Registrations>,
    cache: RwLock<TypeCache>,
    sequence: AtomicUsize,
    fallback: Arc<dyn ParameterFormatter>,
}

impl FormatterRegistry {
    /// Registry without formatters; every value renders through the generic
    /// string formatter.
    pub fn new() -> Self {
        FormatterRegistry {
            registrations: RwLock::new(Registrations::default()),
            cache: RwLock::new(TypeCache::default()),
            sequence: AtomicUsize::new(0),
            fallback: Arc::new(builtin::StringFormatter),
        }
    }

    /// Registry with all built-in formatters
    pub fn with_defaults() -> Self {
        let registry = FormatterRegistry::new();
        for formatter in builtin::default_formatters() {
            registry.register(formatter);
        }
        registry
    }

    /// Registers a formatter under its name and for its types. A named
    /// formatter replaces an earlier one with the same name; among type
    /// formatters with equal order the latest registration wins.
    pub fn register(&self, formatter: Arc<dyn ParameterFormatter>) {
        let types = formatter.formattable_types();
        let sequence = self.sequence.fetch_add(1, Ordering::Relaxed);

        let generation = {
            let mut registrations = self.registrations.write();

            if let Some(name) = formatter.name() {
                tracing::debug!(name, "registering named formatter");
                registrations
                    .named
                    .insert(name.to_string(), Arc::clone(&formatter));
            }

            if types.is_empty() {
                return;
            }

            for formattable in types {
                tracing::debug!(type_name = %formattable.type_name, order = formattable.order, "registering type formatter");
                let entries = registrations.typed.entry(formattable.type_name).or_default();
                entries.push(TypeEntry {
                    order: formattable.order,
                    sequence,
                    formatter: Arc::clone(&formatter),
                });
                entries.sort_by(|a, b| a.order.cmp(&b.order).then(b.sequence.cmp(&a.sequence)));
            }

            registrations.generation += 1;
            registrations.generation
        };

        self.invalidate(generation);
    }

    /// Declares a runtime type with its super type and interfaces.
    pub fn declare_type(&self, name: &str, super_type: Option<&str>, interfaces: &[&str]) {
        let generation = {
            let mut registrations = self.registrations.write();
            registrations.types.declare(name, super_type, interfaces);
            registrations.generation += 1;
            registrations.generation
        };

        self.invalidate(generation);
    }

    fn invalidate(&self, generation: u64) {
        let mut cache = self.cache.write();
        if cache.generation < generation {
            tracing::debug!(generation, cached = cache.entries.len(), "invalidating formatter cache");
            cache.generation = generation;
            cache.entries.clear();
        }
    }

    /// The formatter registered under `name`
    pub fn named(&self, name: &str) -> Option<Arc<dyn ParameterFormatter>> {
        self.registrations.read().named.get(name).cloned()
    }

    /// Formatters for a type in dispatch order: the exact type, its interfaces,
    /// then the super types.
    pub fn formatters_for(&self, type_name: &str) -> Formatters {
        // Fast path: cached resolution
        if let Some(formatters) = self.cache.read().entries.get(type_name) {
            return Arc::clone(formatters);
        }

        let (generation, formatters) = {
            let registrations = self.registrations.read();
            let formatters: Vec<Arc<dyn ParameterFormatter>> = registrations
                .types
                .walk(type_name)
                .iter()
                .filter_map(|t| registrations.typed.get(t))
                .flat_map(|entries| entries.iter().map(|e| Arc::clone(&e.formatter)))
                .collect();
            (registrations.generation, Formatters::from(formatters))
        };

        tracing::trace!(type_name, count = formatters.len(), "resolved formatters by type");

        let mut cache = self.cache.write();
        if cache.generation == generation {
            cache
                .entries
                .entry(type_name.to_string())
                .or_insert_with(|| Arc::clone(&formatters));
        }

        formatters
    }

    /// Formatter for a parameter: the named formatter if `format` names one,
    /// otherwise the first formatter for the value's type, otherwise the
    /// generic string formatter.
    pub fn resolve(&self, format: Option<&str>, type_name: &str) -> Arc<dyn ParameterFormatter> {
        if let Some(name) = format.filter(|name| !name.is_empty()) {
            if let Some(formatter) = self.named(name) {
                return formatter;
            }
            tracing::debug!(format = name, type_name, "unknown format, dispatching by type");
        }

        match self.formatters_for(type_name).first() {
            Some(formatter) => Arc::clone(formatter),
            None => Arc::clone(&self.fallback),
        }
    }
}

impl Default for FormatterRegistry {
    fn default() -> Self {
        FormatterRegistry::with_defaults()
    }
}

impl std::fmt::Debug for FormatterRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let registrations = self.registrations.read();
        let mut named: Vec<&String> = registrations.named.keys().collect();
        named.sort();
        f.debug_struct("FormatterRegistry")
            .field("named", &named)
            .field("types", &registrations.typed.len())
            .finish()
    }
}
