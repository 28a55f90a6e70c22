//! Host type → shader type mapping
//!
//! Every value that ends up in generated source goes through a
//! [`TypeDescriptor`]: literals are encoded by it and constant-buffer members
//! take their declared type name from it.

use std::any::{Any, TypeId, type_name};
use std::collections::HashMap;

use glam::{Mat4, Vec2, Vec3, Vec4};

use crate::{Error, Result};

/// Shader type name plus literal encoder for a host type `T`
#[derive(Debug, Clone)]
pub struct TypeDescriptor<T> {
    type_name: String,
    encode: fn(&T) -> String,
}

impl<T> TypeDescriptor<T> {
    pub fn new(type_name: impl Into<String>, encode: fn(&T) -> String) -> Self {
        Self {
            type_name: type_name.into(),
            encode,
        }
    }

    /// Shader type name (`float3`, `float4x4`, ...)
    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    /// Shader literal text for `value`
    pub fn literal(&self, value: &T) -> String {
        (self.encode)(value)
    }
}

/// Runtime-typed table of [`TypeDescriptor`]s
pub struct TypeRegistry {
    descriptors: HashMap<TypeId, Box<dyn Any + Send + Sync>>,
}

impl TypeRegistry {
    /// An empty registry
    pub fn new() -> Self {
        Self {
            descriptors: HashMap::new(),
        }
    }

    /// A registry with `f32`, `Vec2`, `Vec3`, `Vec4` and `Mat4` registered
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(TypeDescriptor::new("float", |v: &f32| encode_float(*v)));
        registry.register(TypeDescriptor::new("float2", |v: &Vec2| {
            encode_vector("float2", &v.to_array())
        }));
        registry.register(TypeDescriptor::new("float3", |v: &Vec3| {
            encode_vector("float3", &v.to_array())
        }));
        registry.register(TypeDescriptor::new("float4", |v: &Vec4| {
            encode_vector("float4", &v.to_array())
        }));
        registry.register(TypeDescriptor::new("float4x4", encode_matrix));
        registry
    }

    /// Associate `T` with a descriptor, replacing any previous one
    pub fn register<T: 'static>(&mut self, descriptor: TypeDescriptor<T>) {
        self.descriptors
            .insert(TypeId::of::<T>(), Box::new(descriptor));
    }

    /// Look up the descriptor registered for `T`
    pub fn describe<T: 'static>(&self) -> Result<&TypeDescriptor<T>> {
        self.descriptors
            .get(&TypeId::of::<T>())
            .and_then(|d| d.downcast_ref::<TypeDescriptor<T>>())
            .ok_or_else(|| {
                Error::Lookup(format!(
                    "No type description registered for type {}",
                    type_name::<T>()
                ))
            })
    }

    /// Check whether `T` has a descriptor
    pub fn contains<T: 'static>(&self) -> bool {
        self.descriptors.contains_key(&TypeId::of::<T>())
    }
}

impl Default for TypeRegistry {
    fn default() -> Self {
        Self::with_builtins()
    }
}

impl std::fmt::Debug for TypeRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypeRegistry")
            .field("types", &self.descriptors.len())
            .finish()
    }
}

/// Encode an `f32` so that parsing the text gives back the same value
///
/// Finite values use the shortest round-trip decimal form, which always has a
/// `.` or an exponent. Infinities and NaN have no literal syntax and are
/// written as their bit pattern.
pub fn encode_float(value: f32) -> String {
    if value.is_finite() {
        format!("{value:?}")
    } else {
        format!("asfloat(0x{:08x}u)", value.to_bits())
    }
}

/// Encode a vector constructor, e.g. `float3(1.0, 2.0, 3.0)`
pub fn encode_vector(type_name: &str, components: &[f32]) -> String {
    let parts: Vec<String> = components.iter().map(|c| encode_float(*c)).collect();
    format!("{}({})", type_name, parts.join(", "))
}

/// Encode a matrix row by row, so `mul(M, v)` matches `M * v` on the host
pub fn encode_matrix(m: &Mat4) -> String {
    let rows: Vec<f32> = (0..4).flat_map(|i| m.row(i).to_array()).collect();
    encode_vector("float4x4", &rows)
}
