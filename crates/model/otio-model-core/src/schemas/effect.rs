use crate::error::Result;
use crate::json::{Reader, Writer};
use crate::schema::{meta_accessors, schema_identity, schema_type, EffectFields, ObjectMeta, Schema};

/// A named effect applied to an item.
#[derive(Debug, Default)]
pub struct Effect {
    pub meta: ObjectMeta,
    pub effect: EffectFields,
}

schema_type!(Effect, "Effect", 1);

impl Effect {
    pub fn new(name: impl Into<String>, effect_name: impl Into<String>) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            effect: EffectFields {
                effect_name: effect_name.into(),
            },
        }
    }
}

/// An effect that changes the timing of the item it is attached to.
#[derive(Debug, Default)]
pub struct TimeEffect {
    pub meta: ObjectMeta,
    pub effect: EffectFields,
}

schema_type!(TimeEffect, "TimeEffect", 1);

/// Constant speed change; `time_scalar` 2.0 plays twice as fast.
#[derive(Debug)]
pub struct LinearTimeWarp {
    pub meta: ObjectMeta,
    pub effect: EffectFields,
    pub time_scalar: f64,
}

impl Default for LinearTimeWarp {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            effect: EffectFields {
                effect_name: "LinearTimeWarp".to_string(),
            },
            time_scalar: 1.0,
        }
    }
}

schema_type!(LinearTimeWarp, "LinearTimeWarp", 1);

impl LinearTimeWarp {
    pub fn new(name: impl Into<String>, time_scalar: f64) -> Self {
        Self {
            meta: ObjectMeta::named(name),
            time_scalar,
            ..Self::default()
        }
    }
}

/// Holds a single frame: a linear time warp with a zero scalar.
#[derive(Debug)]
pub struct FreezeFrame {
    pub meta: ObjectMeta,
    pub effect: EffectFields,
    pub time_scalar: f64,
}

impl Default for FreezeFrame {
    fn default() -> Self {
        Self {
            meta: ObjectMeta::default(),
            effect: EffectFields {
                effect_name: "FreezeFrame".to_string(),
            },
            time_scalar: 0.0,
        }
    }
}

schema_type!(FreezeFrame, "FreezeFrame", 1);

macro_rules! effect_schema {
    ($ty:ty) => {
        impl Schema for $ty {
            schema_identity!();
            meta_accessors!();

            fn effect(&self) -> Option<&EffectFields> {
                Some(&self.effect)
            }

            fn write_fields(&self, writer: &mut Writer<'_>) {
                self.meta.write(writer);
                self.effect.write(writer);
            }

            fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
                self.meta.read(reader)?;
                self.effect.read(reader)
            }
        }
    };
    ($ty:ty, time_scalar) => {
        impl Schema for $ty {
            schema_identity!();
            meta_accessors!();

            fn effect(&self) -> Option<&EffectFields> {
                Some(&self.effect)
            }

            fn write_fields(&self, writer: &mut Writer<'_>) {
                self.meta.write(writer);
                self.effect.write(writer);
                writer.write_f64("time_scalar", self.time_scalar);
            }

            fn read_fields(&mut self, reader: &mut Reader<'_, '_>) -> Result<()> {
                self.meta.read(reader)?;
                self.effect.read(reader)?;
                if let Some(scalar) = reader.read_f64("time_scalar")? {
                    self.time_scalar = scalar;
                }
                Ok(())
            }
        }
    };
}

effect_schema!(Effect);
effect_schema!(TimeEffect);
effect_schema!(LinearTimeWarp, time_scalar);
effect_schema!(FreezeFrame, time_scalar);
