use hashbrown::HashMap;
use otio_time_core::{RationalTime, TimeRange, TimeTransform};
use serde_json::{Map, Number, Value as JsonValue};

use crate::dictionary::{Dictionary, Vector};
use crate::ids::{ObjectId, RefIdAllocator};
use crate::object::Object;
use crate::value::Value;

use super::{REF_ID_KEY, REF_SCHEMA, SCHEMA_KEY};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Pass {
    /// Count how often each object is reached; output is discarded.
    Discover,
    Emit,
}

/// Two-pass object graph encoder.
///
/// The discovery pass runs the same field writers as the emit pass, so both
/// see exactly the same edges. Objects reached more than once are emitted in
/// full at their first occurrence and as `SerializableObjectRef` afterwards.
pub(crate) struct Encoder {
    pass: Pass,
    visits: HashMap<ObjectId, usize>,
    order: Vec<Object>,
    ref_ids: HashMap<ObjectId, String>,
    allocator: RefIdAllocator,
}

impl Encoder {
    fn new() -> Self {
        Self {
            pass: Pass::Discover,
            visits: HashMap::new(),
            order: Vec::new(),
            ref_ids: HashMap::new(),
            allocator: RefIdAllocator::default(),
        }
    }

    pub(crate) fn encode_root(root: &Object) -> JsonValue {
        let mut encoder = Self::new();
        encoder.encode_object(root);
        encoder.pass = Pass::Emit;
        encoder.encode_object(root)
    }

    /// Every object reachable from `root`, each once, in discovery order.
    pub(crate) fn discover(root: &Object) -> Vec<Object> {
        let mut encoder = Self::new();
        encoder.encode_object(root);
        encoder.order
    }

    fn encode_object(&mut self, object: &Object) -> JsonValue {
        let id = object.id();
        match self.pass {
            Pass::Discover => {
                let visits = self.visits.entry(id).or_insert(0);
                *visits += 1;
                if *visits > 1 {
                    return JsonValue::Null;
                }
                self.order.push(object.clone());
                self.encode_fields(object, None)
            }
            Pass::Emit => {
                if let Some(ref_id) = self.ref_ids.get(&id) {
                    let mut map = Map::new();
                    map.insert(SCHEMA_KEY.to_string(), REF_SCHEMA.into());
                    map.insert("id".to_string(), ref_id.clone().into());
                    return JsonValue::Object(map);
                }
                let shared = self.visits.get(&id).copied().unwrap_or(0) > 1;
                let ref_id = if shared {
                    let ref_id = self.allocator.alloc(&object.schema_name());
                    self.ref_ids.insert(id, ref_id.clone());
                    Some(ref_id)
                } else {
                    None
                };
                self.encode_fields(object, ref_id)
            }
        }
    }

    fn encode_fields(&mut self, object: &Object, ref_id: Option<String>) -> JsonValue {
        let mut writer = Writer {
            encoder: self,
            fields: Map::new(),
        };
        let body = object.body();
        writer
            .fields
            .insert(SCHEMA_KEY.to_string(), body.serialized_tag().into());
        if let Some(ref_id) = ref_id {
            writer.fields.insert(REF_ID_KEY.to_string(), ref_id.into());
        }
        body.write_fields(&mut writer);
        drop(body);
        for (key, value) in object.dynamic_fields().iter() {
            writer.write_value(key, value);
        }
        JsonValue::Object(writer.fields)
    }

    fn encode_value(&mut self, value: &Value) -> JsonValue {
        match value {
            Value::None => JsonValue::Null,
            Value::Bool(b) => JsonValue::Bool(*b),
            Value::Int(i) => JsonValue::Number((*i).into()),
            Value::Double(d) => encode_f64(*d),
            Value::String(s) => JsonValue::String(s.clone()),
            Value::RationalTime(t) => encode_time(*t),
            Value::TimeRange(r) => encode_range(*r),
            Value::TimeTransform(t) => encode_transform(*t),
            Value::Object(o) => self.encode_object(o),
            Value::Dictionary(d) => self.encode_dictionary(d),
            Value::Vector(v) => self.encode_vector(v),
            Value::Unknown { payload, .. } => payload.clone(),
        }
    }

    fn encode_dictionary(&mut self, dict: &Dictionary) -> JsonValue {
        let mut map = Map::new();
        for (key, value) in dict {
            map.insert(key.clone(), self.encode_value(value));
        }
        JsonValue::Object(map)
    }

    fn encode_vector(&mut self, vector: &Vector) -> JsonValue {
        JsonValue::Array(vector.iter().map(|v| self.encode_value(v)).collect())
    }
}

/// Non-finite doubles have no JSON spelling and are written as `null`.
fn encode_f64(value: f64) -> JsonValue {
    Number::from_f64(value).map_or(JsonValue::Null, JsonValue::Number)
}

pub(crate) fn encode_time(time: RationalTime) -> JsonValue {
    let mut map = Map::new();
    map.insert(SCHEMA_KEY.to_string(), "RationalTime.1".into());
    map.insert("rate".to_string(), encode_f64(time.rate()));
    map.insert("value".to_string(), encode_f64(time.value()));
    JsonValue::Object(map)
}

pub(crate) fn encode_range(range: TimeRange) -> JsonValue {
    let mut map = Map::new();
    map.insert(SCHEMA_KEY.to_string(), "TimeRange.1".into());
    map.insert("duration".to_string(), encode_time(range.duration()));
    map.insert("start_time".to_string(), encode_time(range.start_time()));
    JsonValue::Object(map)
}

pub(crate) fn encode_transform(transform: TimeTransform) -> JsonValue {
    let mut map = Map::new();
    map.insert(SCHEMA_KEY.to_string(), "TimeTransform.1".into());
    map.insert("offset".to_string(), encode_time(transform.offset()));
    map.insert("rate".to_string(), encode_f64(transform.rate()));
    map.insert("scale".to_string(), encode_f64(transform.scale()));
    JsonValue::Object(map)
}

/// Field sink handed to [`crate::Schema::write_fields`].
pub struct Writer<'e> {
    encoder: &'e mut Encoder,
    fields: Map<String, JsonValue>,
}

impl Writer<'_> {
    pub fn write_null(&mut self, key: &str) {
        self.fields.insert(key.to_string(), JsonValue::Null);
    }

    pub fn write_bool(&mut self, key: &str, value: bool) {
        self.fields.insert(key.to_string(), JsonValue::Bool(value));
    }

    pub fn write_i64(&mut self, key: &str, value: i64) {
        self.fields.insert(key.to_string(), value.into());
    }

    pub fn write_f64(&mut self, key: &str, value: f64) {
        self.fields.insert(key.to_string(), encode_f64(value));
    }

    pub fn write_str(&mut self, key: &str, value: &str) {
        self.fields
            .insert(key.to_string(), JsonValue::String(value.to_string()));
    }

    pub fn write_time(&mut self, key: &str, value: RationalTime) {
        self.fields.insert(key.to_string(), encode_time(value));
    }

    pub fn write_optional_time(&mut self, key: &str, value: Option<RationalTime>) {
        match value {
            Some(time) => self.write_time(key, time),
            None => self.write_null(key),
        }
    }

    pub fn write_range(&mut self, key: &str, value: TimeRange) {
        self.fields.insert(key.to_string(), encode_range(value));
    }

    pub fn write_transform(&mut self, key: &str, value: TimeTransform) {
        self.fields.insert(key.to_string(), encode_transform(value));
    }

    pub fn write_object(&mut self, key: &str, value: Option<&Object>) {
        let json = match value {
            Some(object) => self.encoder.encode_object(object),
            None => JsonValue::Null,
        };
        self.fields.insert(key.to_string(), json);
    }

    pub fn write_objects(&mut self, key: &str, values: &[Object]) {
        let items = values
            .iter()
            .map(|object| self.encoder.encode_object(object))
            .collect();
        self.fields.insert(key.to_string(), JsonValue::Array(items));
    }

    pub fn write_dictionary(&mut self, key: &str, value: &Dictionary) {
        let json = self.encoder.encode_dictionary(value);
        self.fields.insert(key.to_string(), json);
    }

    pub fn write_value(&mut self, key: &str, value: &Value) {
        let json = self.encoder.encode_value(value);
        self.fields.insert(key.to_string(), json);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn times_use_tagged_objects() {
        let json = encode_range(TimeRange::new(
            RationalTime::new(1.0, 24.0),
            RationalTime::new(10.0, 24.0),
        ));
        assert_eq!(
            json,
            json!({
                "OTIO_SCHEMA": "TimeRange.1",
                "duration": {"OTIO_SCHEMA": "RationalTime.1", "rate": 24.0, "value": 10.0},
                "start_time": {"OTIO_SCHEMA": "RationalTime.1", "rate": 24.0, "value": 1.0},
            })
        );
    }

    #[test]
    fn non_finite_doubles_become_null() {
        assert_eq!(encode_f64(f64::NAN), JsonValue::Null);
        assert_eq!(encode_f64(f64::INFINITY), JsonValue::Null);
        assert_eq!(encode_f64(2.5), json!(2.5));
    }
}
