//! Schema registry: schema name to factory, current version and upgrade
//! functions.
//!
//! Registries are assembled with a [`TypeRegistryBuilder`] and immutable once
//! built. The process-wide registry is initialised once, either explicitly
//! through [`install`] or lazily with the built-in schemas on first use.

use std::collections::BTreeMap;
use std::fmt;

use hashbrown::HashMap;
use log::{debug, warn};
use once_cell::sync::OnceCell;
use serde_json::{Map, Value as JsonValue};

use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::schema::{Schema, SchemaType};
use crate::schemas;

pub type SchemaFactory = fn() -> Box<dyn Schema>;

/// Rewrites a field map written by an older version in place.
pub type UpgradeFn = fn(&mut Map<String, JsonValue>);

fn create_default<T: SchemaType>() -> Box<dyn Schema> {
    Box::new(T::default())
}

#[derive(Clone)]
pub struct SchemaEntry {
    name: String,
    version: i64,
    factory: SchemaFactory,
    /// Keyed by the version each function upgrades *to*.
    upgrades: BTreeMap<i64, UpgradeFn>,
}

impl fmt::Debug for SchemaEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SchemaEntry")
            .field("name", &self.name)
            .field("version", &self.version)
            .field("upgrades", &self.upgrades.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl SchemaEntry {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> i64 {
        self.version
    }

    pub fn create(&self) -> Box<dyn Schema> {
        (self.factory)()
    }

    /// Run every upgrade newer than `from_version`, oldest first.
    pub(crate) fn upgrade(&self, from_version: i64, fields: &mut Map<String, JsonValue>) {
        for (_, upgrade) in self.upgrades.range(from_version + 1..=self.version) {
            upgrade(fields);
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct TypeRegistry {
    entries: HashMap<String, SchemaEntry>,
    aliases: HashMap<String, String>,
}

impl TypeRegistry {
    pub fn builder() -> TypeRegistryBuilder {
        TypeRegistryBuilder::default()
    }

    /// Every schema this crate defines, plus legacy aliases and upgrades.
    pub fn builtin() -> Self {
        let mut builder = TypeRegistryBuilder::default();
        builder.add_builtins();
        builder.build()
    }

    pub(crate) fn resolve(&self, name: &str) -> Option<&SchemaEntry> {
        if let Some(entry) = self.entries.get(name) {
            return Some(entry);
        }
        let target = self.aliases.get(name)?;
        debug!("schema alias {name} resolved to {target}");
        self.entries.get(target)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.resolve(name).is_some()
    }

    pub fn version_of(&self, name: &str) -> Option<i64> {
        self.resolve(name).map(SchemaEntry::version)
    }

    /// Sorted names of registered schemas, aliases excluded.
    pub fn schema_names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.entries.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    /// New default-constructed instance of a registered schema.
    pub fn create(&self, name: &str) -> Result<Object> {
        let entry = self.resolve(name).ok_or_else(|| not_registered(name))?;
        Ok(Object::from_boxed(entry.create()))
    }
}

fn not_registered(name: &str) -> Error {
    Error::new(
        ErrorKind::SchemaNotRegistered,
        format!("schema '{name}' is not registered"),
    )
}

#[derive(Default)]
pub struct TypeRegistryBuilder {
    registry: TypeRegistry,
}

impl TypeRegistryBuilder {
    pub fn with_builtins() -> Self {
        let mut builder = Self::default();
        builder.add_builtins();
        builder
    }

    pub fn register<T: SchemaType>(&mut self) -> Result<&mut Self> {
        self.register_factory(T::SCHEMA_NAME, T::SCHEMA_VERSION, create_default::<T>)
    }

    pub fn register_factory(
        &mut self,
        name: &str,
        version: i64,
        factory: SchemaFactory,
    ) -> Result<&mut Self> {
        if self.registry.entries.contains_key(name) || self.registry.aliases.contains_key(name) {
            return Err(Error::new(
                ErrorKind::SchemaAlreadyRegistered,
                format!("schema '{name}' is already registered"),
            ));
        }
        self.insert(name, version, factory);
        Ok(self)
    }

    /// Accept `alias` in documents as a spelling of `target`.
    pub fn register_alias(&mut self, alias: &str, target: &str) -> Result<&mut Self> {
        if !self.registry.entries.contains_key(target) {
            return Err(not_registered(target));
        }
        if self.registry.entries.contains_key(alias) {
            return Err(Error::new(
                ErrorKind::SchemaAlreadyRegistered,
                format!("alias '{alias}' collides with a registered schema"),
            ));
        }
        if let Some(previous) = self.registry.aliases.get(alias) {
            warn!("ignoring duplicate alias {alias} (already maps to {previous})");
            return Ok(self);
        }
        self.registry
            .aliases
            .insert(alias.to_string(), target.to_string());
        Ok(self)
    }

    /// Register the function that upgrades `name` documents to `to_version`.
    pub fn register_upgrade(
        &mut self,
        name: &str,
        to_version: i64,
        upgrade: UpgradeFn,
    ) -> Result<&mut Self> {
        let entry = self
            .registry
            .entries
            .get_mut(name)
            .ok_or_else(|| not_registered(name))?;
        if entry.upgrades.contains_key(&to_version) {
            warn!("ignoring duplicate upgrade of {name} to version {to_version}");
            return Ok(self);
        }
        entry.upgrades.insert(to_version, upgrade);
        Ok(self)
    }

    pub fn build(self) -> TypeRegistry {
        self.registry
    }

    fn insert(&mut self, name: &str, version: i64, factory: SchemaFactory) {
        self.registry.entries.insert(
            name.to_string(),
            SchemaEntry {
                name: name.to_string(),
                version,
                factory,
                upgrades: BTreeMap::new(),
            },
        );
    }

    fn insert_type<T: SchemaType>(&mut self) {
        self.insert(T::SCHEMA_NAME, T::SCHEMA_VERSION, create_default::<T>);
    }

    fn add_builtins(&mut self) {
        use schemas::*;

        self.insert_type::<SerializableObject>();
        self.insert_type::<SerializableObjectWithMetadata>();
        self.insert_type::<Composable>();
        self.insert_type::<Item>();
        self.insert_type::<Composition>();
        self.insert_type::<Track>();
        self.insert_type::<Stack>();
        self.insert_type::<Clip>();
        self.insert_type::<Gap>();
        self.insert_type::<Transition>();
        self.insert_type::<Effect>();
        self.insert_type::<TimeEffect>();
        self.insert_type::<LinearTimeWarp>();
        self.insert_type::<FreezeFrame>();
        self.insert_type::<MediaReference>();
        self.insert_type::<ExternalReference>();
        self.insert_type::<GeneratorReference>();
        self.insert_type::<MissingReference>();
        self.insert_type::<Marker>();
        self.insert_type::<Timeline>();
        self.insert_type::<SerializableCollection>();
        self.insert_type::<UnknownSchema>();

        for (alias, target) in [
            ("Filler", Gap::SCHEMA_NAME),
            ("Sequence", Track::SCHEMA_NAME),
            ("SerializeableCollection", SerializableCollection::SCHEMA_NAME),
        ] {
            self.registry
                .aliases
                .insert(alias.to_string(), target.to_string());
        }

        if let Some(marker) = self.registry.entries.get_mut(Marker::SCHEMA_NAME) {
            marker.upgrades.insert(2, upgrade_marker_to_v2);
        }
    }
}

static GLOBAL: OnceCell<TypeRegistry> = OnceCell::new();

/// Install the process-wide registry. Succeeds only before first use.
pub fn install(registry: TypeRegistry) -> Result<()> {
    GLOBAL.set(registry).map_err(|_| {
        Error::new(
            ErrorKind::SchemaAlreadyRegistered,
            "the process-wide registry is already initialised",
        )
    })
}

/// The process-wide registry; the built-in schemas unless [`install`] ran first.
pub fn global() -> &'static TypeRegistry {
    GLOBAL.get_or_init(TypeRegistry::builtin)
}
