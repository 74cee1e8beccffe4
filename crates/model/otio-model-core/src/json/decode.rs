use hashbrown::HashMap;
use log::debug;
use otio_time_core::{RationalTime, TimeRange, TimeTransform};
use serde_json::{Map, Value as JsonValue};

use crate::config::Config;
use crate::dictionary::{Dictionary, Vector};
use crate::error::{Error, ErrorKind, Result};
use crate::object::Object;
use crate::registry::TypeRegistry;
use crate::schema::Schema;
use crate::schemas::UnknownSchema;
use crate::value::Value;

use super::{REF_ID_KEY, REF_SCHEMA, SCHEMA_KEY};

/// Value schemas with no model type; kept verbatim as `Value::Unknown`.
const OPAQUE_VALUE_SCHEMAS: &[&str] = &["V2d", "Box2d"];

fn malformed(message: impl Into<String>) -> Error {
    Error::new(ErrorKind::MalformedSchema, message)
}

fn type_mismatch(key: &str, expected: &str, found: &JsonValue) -> Error {
    Error::new(
        ErrorKind::TypeMismatch,
        format!("field '{key}': expected {expected}, found {}", json_type_name(found)),
    )
}

fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}

/// Split `"<Name>.<Version>"`. The name may itself contain dots.
pub(crate) fn parse_schema_tag(tag: &str) -> Result<(&str, i64)> {
    let (name, version) = tag
        .rsplit_once('.')
        .ok_or_else(|| malformed(format!("schema tag '{tag}' has no version")))?;
    if name.is_empty() {
        return Err(malformed(format!("schema tag '{tag}' has no name")));
    }
    let version = version
        .parse::<i64>()
        .map_err(|_| malformed(format!("schema tag '{tag}' has a non-integer version")))?;
    Ok((name, version))
}

fn schema_tag(map: &Map<String, JsonValue>) -> Result<Option<(String, i64)>> {
    match map.get(SCHEMA_KEY) {
        None => Ok(None),
        Some(JsonValue::String(tag)) => {
            let (name, version) = parse_schema_tag(tag)?;
            Ok(Some((name.to_string(), version)))
        }
        Some(other) => Err(malformed(format!(
            "{SCHEMA_KEY} must be a string, found {}",
            json_type_name(other)
        ))),
    }
}

fn number(map: &Map<String, JsonValue>, key: &str, owner: &str) -> Result<f64> {
    match map.get(key) {
        Some(JsonValue::Number(n)) => n
            .as_f64()
            .ok_or_else(|| type_mismatch(key, "a double", &JsonValue::Number(n.clone()))),
        // Non-finite doubles are written as null.
        Some(JsonValue::Null) => Ok(f64::NAN),
        Some(other) => Err(type_mismatch(key, "a number", other)),
        None => Err(malformed(format!("{owner} is missing '{key}'"))),
    }
}

fn nested<'m>(map: &'m Map<String, JsonValue>, key: &str, owner: &str) -> Result<&'m Map<String, JsonValue>> {
    match map.get(key) {
        Some(JsonValue::Object(inner)) => Ok(inner),
        Some(other) => Err(type_mismatch(key, "an object", other)),
        None => Err(malformed(format!("{owner} is missing '{key}'"))),
    }
}

pub(crate) fn decode_time(map: &Map<String, JsonValue>) -> Result<RationalTime> {
    Ok(RationalTime::new(
        number(map, "value", "RationalTime")?,
        number(map, "rate", "RationalTime")?,
    ))
}

pub(crate) fn decode_range(map: &Map<String, JsonValue>) -> Result<TimeRange> {
    Ok(TimeRange::new(
        decode_time(nested(map, "start_time", "TimeRange")?)?,
        decode_time(nested(map, "duration", "TimeRange")?)?,
    ))
}

pub(crate) fn decode_transform(map: &Map<String, JsonValue>) -> Result<TimeTransform> {
    Ok(TimeTransform::new(
        decode_time(nested(map, "offset", "TimeTransform")?)?,
        number(map, "scale", "TimeTransform")?,
        number(map, "rate", "TimeTransform")?,
    ))
}

/// Rebuilds an object graph from a JSON tree, resolving
/// `SerializableObjectRef` entries by `OTIO_REF_ID`.
pub(crate) struct Decoder<'r> {
    registry: &'r TypeRegistry,
    config: &'r Config,
    defined: HashMap<String, Object>,
    pending: HashMap<String, Object>,
}

impl<'r> Decoder<'r> {
    pub(crate) fn new(registry: &'r TypeRegistry, config: &'r Config) -> Self {
        Self {
            registry,
            config,
            defined: HashMap::new(),
            pending: HashMap::new(),
        }
    }

    pub(crate) fn decode_root(mut self, json: JsonValue) -> Result<Object> {
        let map = match json {
            JsonValue::Object(map) => map,
            other => {
                return Err(malformed(format!(
                    "document root must be a schema object, found {}",
                    json_type_name(&other)
                )))
            }
        };
        if !map.contains_key(SCHEMA_KEY) {
            return Err(malformed(format!("document root has no {SCHEMA_KEY}")));
        }
        let root = match self.decode_tagged(map)? {
            Value::Object(object) => object,
            other => {
                return Err(malformed(format!(
                    "document root must be a schema object, found {:?}",
                    other.kind()
                )))
            }
        };
        if let Some(id) = self.pending.keys().next() {
            return Err(Error::new(
                ErrorKind::UnresolvedObjectReference,
                format!("no object defines OTIO_REF_ID '{id}'"),
            ));
        }
        Ok(root)
    }

    fn decode_value(&mut self, json: JsonValue) -> Result<Value> {
        Ok(match json {
            JsonValue::Null => Value::None,
            JsonValue::Bool(b) => Value::Bool(b),
            JsonValue::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Double(n.as_f64().unwrap_or(f64::NAN)),
            },
            JsonValue::String(s) => Value::String(s),
            JsonValue::Array(items) => {
                let mut vector = Vector::new();
                for item in items {
                    vector.push(self.decode_value(item)?);
                }
                Value::Vector(vector)
            }
            JsonValue::Object(map) => {
                if map.contains_key(SCHEMA_KEY) {
                    self.decode_tagged(map)?
                } else {
                    Value::Dictionary(self.decode_dictionary(map)?)
                }
            }
        })
    }

    fn decode_dictionary(&mut self, map: Map<String, JsonValue>) -> Result<Dictionary> {
        let mut dict = Dictionary::new();
        for (key, value) in map {
            let value = self.decode_value(value)?;
            dict.insert(key, value);
        }
        Ok(dict)
    }

    /// Decode a map carrying `OTIO_SCHEMA`.
    fn decode_tagged(&mut self, map: Map<String, JsonValue>) -> Result<Value> {
        let Some((name, version)) = schema_tag(&map)? else {
            return Err(malformed(format!("object has no {SCHEMA_KEY}")));
        };
        match name.as_str() {
            "RationalTime" => Ok(Value::RationalTime(decode_time(&map)?)),
            "TimeRange" => Ok(Value::TimeRange(decode_range(&map)?)),
            "TimeTransform" => Ok(Value::TimeTransform(decode_transform(&map)?)),
            "SerializableObjectRef" => {
                let id = match map.get("id") {
                    Some(JsonValue::String(id)) => id.clone(),
                    _ => return Err(malformed(format!("{REF_SCHEMA} without a string 'id'"))),
                };
                Ok(Value::Object(self.resolve_reference(id)))
            }
            opaque if OPAQUE_VALUE_SCHEMAS.contains(&opaque) => Ok(Value::Unknown {
                type_name: name.clone(),
                payload: JsonValue::Object(map),
            }),
            _ => Ok(Value::Object(self.decode_object(&name, version, map)?)),
        }
    }

    fn resolve_reference(&mut self, id: String) -> Object {
        if let Some(object) = self.defined.get(&id) {
            return object.clone();
        }
        self.pending
            .entry(id)
            .or_insert_with(Object::placeholder)
            .clone()
    }

    /// Node for a definition: the placeholder handed out to earlier
    /// references, or a fresh one.
    fn claim(&mut self, ref_id: Option<String>) -> Result<Object> {
        let Some(ref_id) = ref_id else {
            return Ok(Object::placeholder());
        };
        if self.defined.contains_key(&ref_id) {
            return Err(Error::new(
                ErrorKind::DuplicateObjectReference,
                format!("OTIO_REF_ID '{ref_id}' is defined more than once"),
            ));
        }
        let object = self
            .pending
            .remove(&ref_id)
            .unwrap_or_else(Object::placeholder);
        self.defined.insert(ref_id, object.clone());
        Ok(object)
    }

    fn new_body(
        &self,
        name: &str,
        version: i64,
        map: &mut Map<String, JsonValue>,
    ) -> Result<Box<dyn Schema>> {
        let Some(entry) = self.registry.resolve(name) else {
            if !self.config.allow_unknown_schemas {
                return Err(Error::new(
                    ErrorKind::SchemaNotRegistered,
                    format!("schema '{name}' is not registered"),
                ));
            }
            debug!("preserving unregistered schema {name}.{version}");
            return Ok(Box::new(UnknownSchema::new(name, version)));
        };
        if version > entry.version() {
            return Err(Error::new(
                ErrorKind::SchemaVersionUnsupported,
                format!(
                    "{name}.{version} is newer than the supported version {}",
                    entry.version()
                ),
            ));
        }
        if version < entry.version() {
            debug!(
                "upgrading {name} from version {version} to {}",
                entry.version()
            );
            entry.upgrade(version, map);
        }
        Ok(entry.create())
    }

    fn decode_object(
        &mut self,
        name: &str,
        version: i64,
        mut map: Map<String, JsonValue>,
    ) -> Result<Object> {
        map.shift_remove(SCHEMA_KEY);
        let ref_id = match map.shift_remove(REF_ID_KEY) {
            None => None,
            Some(JsonValue::String(id)) => Some(id),
            Some(other) => return Err(type_mismatch(REF_ID_KEY, "a string", &other)),
        };

        let mut body = self.new_body(name, version, &mut map)?;
        let object = self.claim(ref_id)?;

        let mut reader = Reader {
            decoder: self,
            fields: map,
        };
        body.read_fields(&mut reader)?;
        let leftover = reader.fields;
        let dynamic_fields = self.decode_dictionary(leftover)?;

        object.replace_body(body);
        *object.dynamic_fields_mut() = dynamic_fields;
        adopt_children(&object)?;
        Ok(object)
    }
}

fn adopt_children(parent: &Object) -> Result<()> {
    let children: Vec<Object> = match parent.body().children() {
        Some(children) => children.to_vec(),
        None => return Ok(()),
    };
    for child in &children {
        if !child.is_composable() && !child.is_unknown_schema() {
            return Err(Error::new(
                ErrorKind::TypeMismatch,
                format!(
                    "{} cannot hold a {} as a child",
                    parent.schema_name(),
                    child.schema_name()
                ),
            ));
        }
        if child.parent().is_some() || child.is_self_or_ancestor_of(parent) {
            return Err(Error::new(
                ErrorKind::ChildAlreadyParented,
                format!("{child:?} already has a parent"),
            ));
        }
        child.set_parent(Some(parent));
    }
    Ok(())
}

/// Field source handed to [`crate::Schema::read_fields`].
///
/// Each read removes its key; whatever is left becomes the object's dynamic
/// fields. A `null` value reads as absent.
pub struct Reader<'d, 'r> {
    decoder: &'d mut Decoder<'r>,
    fields: Map<String, JsonValue>,
}

impl Reader<'_, '_> {
    fn take(&mut self, key: &str) -> Option<JsonValue> {
        match self.fields.shift_remove(key) {
            Some(JsonValue::Null) | None => None,
            Some(value) => Some(value),
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn read_bool(&mut self, key: &str) -> Result<Option<bool>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Bool(b)) => Ok(Some(b)),
            Some(other) => Err(type_mismatch(key, "a bool", &other)),
        }
    }

    pub fn read_i64(&mut self, key: &str) -> Result<Option<i64>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Number(n)) if n.is_i64() => Ok(n.as_i64()),
            Some(other) => Err(type_mismatch(key, "an integer", &other)),
        }
    }

    pub fn read_f64(&mut self, key: &str) -> Result<Option<f64>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Number(n)) => Ok(n.as_f64()),
            Some(other) => Err(type_mismatch(key, "a number", &other)),
        }
    }

    pub fn read_string(&mut self, key: &str) -> Result<Option<String>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s)),
            Some(other) => Err(type_mismatch(key, "a string", &other)),
        }
    }

    pub fn read_time(&mut self, key: &str) -> Result<Option<RationalTime>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Object(map)) => decode_time(&map).map(Some),
            Some(other) => Err(type_mismatch(key, "a RationalTime", &other)),
        }
    }

    pub fn read_range(&mut self, key: &str) -> Result<Option<TimeRange>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Object(map)) => decode_range(&map).map(Some),
            Some(other) => Err(type_mismatch(key, "a TimeRange", &other)),
        }
    }

    pub fn read_transform(&mut self, key: &str) -> Result<Option<TimeTransform>> {
        match self.take(key) {
            None => Ok(None),
            Some(JsonValue::Object(map)) => decode_transform(&map).map(Some),
            Some(other) => Err(type_mismatch(key, "a TimeTransform", &other)),
        }
    }

    pub fn read_object(&mut self, key: &str) -> Result<Option<Object>> {
        match self.take(key) {
            None => Ok(None),
            Some(json) => self.object_from(key, json).map(Some),
        }
    }

    /// Absent or `null` reads as an empty list.
    pub fn read_objects(&mut self, key: &str) -> Result<Vec<Object>> {
        match self.take(key) {
            None => Ok(Vec::new()),
            Some(JsonValue::Array(items)) => items
                .into_iter()
                .map(|item| self.object_from(key, item))
                .collect(),
            Some(other) => Err(type_mismatch(key, "an array of objects", &other)),
        }
    }

    /// Absent or `null` reads as an empty dictionary.
    pub fn read_dictionary(&mut self, key: &str) -> Result<Dictionary> {
        match self.take(key) {
            None => Ok(Dictionary::new()),
            Some(JsonValue::Object(map)) if !map.contains_key(SCHEMA_KEY) => {
                self.decoder.decode_dictionary(map)
            }
            Some(other) => Err(type_mismatch(key, "a dictionary", &other)),
        }
    }

    pub fn read_value(&mut self, key: &str) -> Result<Option<Value>> {
        match self.take(key) {
            None => Ok(None),
            Some(json) => self.decoder.decode_value(json).map(Some),
        }
    }

    fn object_from(&mut self, key: &str, json: JsonValue) -> Result<Object> {
        let found = json_type_name(&json);
        match json {
            JsonValue::Object(map) if map.contains_key(SCHEMA_KEY) => {
                match self.decoder.decode_tagged(map)? {
                    Value::Object(object) => Ok(object),
                    other => Err(Error::new(
                        ErrorKind::TypeMismatch,
                        format!("field '{key}': expected an object, found {:?}", other.kind()),
                    )),
                }
            }
            _ => Err(Error::new(
                ErrorKind::TypeMismatch,
                format!("field '{key}': expected a schema object, found {found}"),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn schema_tags_split_on_the_last_dot() {
        assert_eq!(parse_schema_tag("Clip.1").unwrap(), ("Clip", 1));
        assert_eq!(parse_schema_tag("studio.Widget.12").unwrap(), ("studio.Widget", 12));
        for bad in ["Clip", "Clip.x", ".1", "Clip.1.5x"] {
            assert_eq!(
                parse_schema_tag(bad).unwrap_err().kind(),
                ErrorKind::MalformedSchema,
                "{bad}"
            );
        }
    }

    #[test]
    fn untagged_time_maps_are_accepted() {
        let map = serde_json::json!({ "value": 12, "rate": 24 });
        let time = decode_time(map.as_object().unwrap()).unwrap();
        assert_eq!(time, RationalTime::new(12.0, 24.0));
    }

    #[test]
    fn missing_time_fields_are_malformed() {
        let map = serde_json::json!({ "value": 12 });
        let err = decode_time(map.as_object().unwrap()).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MalformedSchema);
    }
}
