use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, Context, Result};
use once_cell::sync::Lazy;
use serde::Deserialize;
use serde_json::Value;

static MANIFEST: Lazy<Manifest> = Lazy::new(|| {
    let raw = include_str!("../../../../fixtures/manifest.json");
    serde_json::from_str(raw).expect("fixtures manifest should parse")
});

#[derive(Debug, Deserialize)]
struct Manifest {
    timelines: HashMap<String, String>,
    compat: HashMap<String, CompatEntry>,
    invalid: HashMap<String, InvalidEntry>,
}

/// Documents written by older or foreign writers. `expect_schema` names the
/// schema the root should decode to, when it is worth checking.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CompatEntry {
    Path(String),
    Detailed {
        path: String,
        #[serde(default)]
        expect_schema: Option<String>,
    },
}

impl CompatEntry {
    fn as_path(&self) -> &str {
        match self {
            CompatEntry::Path(path) => path,
            CompatEntry::Detailed { path, .. } => path,
        }
    }
}

#[derive(Debug, Deserialize)]
struct InvalidEntry {
    path: String,
    error: String,
}

fn fixtures_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("../../../fixtures")
}

fn resolve_path(rel: &str) -> PathBuf {
    fixtures_root().join(rel)
}

fn read_to_string(rel: &str) -> Result<String> {
    let path = resolve_path(rel);
    fs::read_to_string(&path)
        .with_context(|| format!("failed to read fixture at {}", path.display()))
}

fn load_json(rel: &str) -> Result<Value> {
    let text = read_to_string(rel)?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse JSON fixture {rel}"))
}

fn lookup<'a, T>(map: &'a HashMap<String, T>, kind: &str, name: &str) -> Result<&'a T> {
    map.get(name)
        .ok_or_else(|| anyhow!("unknown {kind} fixture '{name}'"))
}

fn sorted_keys<T>(map: &HashMap<String, T>) -> Vec<String> {
    let mut keys: Vec<String> = map.keys().cloned().collect();
    keys.sort();
    keys
}

/// Well-formed documents in the current format.
pub mod timelines {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.timelines)
    }

    pub fn json(name: &str) -> Result<String> {
        let rel = lookup(&MANIFEST.timelines, "timeline", name)?;
        read_to_string(rel)
    }

    pub fn value(name: &str) -> Result<Value> {
        let rel = lookup(&MANIFEST.timelines, "timeline", name)?;
        load_json(rel)
    }

    pub fn path(name: &str) -> Result<PathBuf> {
        let rel = lookup(&MANIFEST.timelines, "timeline", name)?;
        Ok(resolve_path(rel))
    }
}

/// Legacy schema names, old versions and schemas this library does not know.
pub mod compat {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.compat)
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.compat, "compat", name)?;
        read_to_string(entry.as_path())
    }

    pub fn expected_schema(name: &str) -> Result<Option<String>> {
        let entry = lookup(&MANIFEST.compat, "compat", name)?;
        Ok(match entry {
            CompatEntry::Path(_) => None,
            CompatEntry::Detailed { expect_schema, .. } => expect_schema.clone(),
        })
    }
}

/// Documents that must fail to decode. The expected error kind is given in
/// its snake_case serialized form.
pub mod invalid {
    use super::*;

    pub fn keys() -> Vec<String> {
        sorted_keys(&MANIFEST.invalid)
    }

    pub fn json(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.invalid, "invalid", name)?;
        read_to_string(&entry.path)
    }

    pub fn expected_error(name: &str) -> Result<String> {
        let entry = lookup(&MANIFEST.invalid, "invalid", name)?;
        Ok(entry.error.clone())
    }
}
