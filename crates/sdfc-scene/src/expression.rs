//! Shader-expression values
//!
//! An [`Expression`] is whatever can stand in for one typed value in the
//! generated source: a constant baked into the text, a constant-buffer slot
//! refreshed every frame, or a raw snippet of shader code.
//!
//! ## Example
//!
//! ```rust
//! use sdfc_scene::{Expression, SceneBuilder, TypeRegistry};
//!
//! let mut scene = SceneBuilder::default();
//! let radius: Expression<f32> = 0.5_f32.into();
//! let pulsing = scene.dynamic(|| 0.75_f32)?;
//!
//! let registry = TypeRegistry::with_builtins();
//! assert_eq!(radius.build_source(&registry)?, "0.5");
//! assert!(pulsing.build_source(&registry)?.starts_with("expr_"));
//! # Ok::<(), sdfc_scene::Error>(())
//! ```

use std::fmt;
use std::sync::Arc;

use bytemuck::Pod;

use crate::scene::SceneBuilder;
use crate::types::TypeRegistry;
use crate::{Error, Result};

/// Per-frame value source of a dynamic expression
pub type Evaluator<T> = Arc<dyn Fn() -> T + Send + Sync>;

/// A value of type `T` as it appears in generated source
pub enum Expression<T> {
    /// Host value encoded as a literal
    Literal(T),
    /// Constant-buffer slot rewritten every frame
    Dynamic(Dynamic<T>),
    /// Raw shader text, emitted verbatim
    Code(String),
}

/// Slot name and evaluator of a [`Expression::Dynamic`]
pub struct Dynamic<T> {
    slot: String,
    evaluator: Evaluator<T>,
}

impl<T> Dynamic<T> {
    pub(crate) fn new(slot: String, evaluator: Evaluator<T>) -> Self {
        Self { slot, evaluator }
    }

    /// Constant-buffer member holding the value
    pub fn slot(&self) -> &str {
        &self.slot
    }

    /// Current value on the host
    pub fn evaluate(&self) -> T {
        (self.evaluator)()
    }
}

impl<T> Expression<T> {
    /// Raw shader text, for values the type system cannot express
    pub fn code(text: impl Into<String>) -> Self {
        Self::Code(text.into())
    }

    pub fn is_literal(&self) -> bool {
        matches!(self, Self::Literal(_))
    }

    pub fn is_dynamic(&self) -> bool {
        matches!(self, Self::Dynamic(_))
    }
}

impl<T: 'static> Expression<T> {
    /// Shader text standing for this value
    ///
    /// Literals need a descriptor for `T` in `registry`; slots and code are
    /// emitted as-is.
    pub fn build_source(&self, registry: &TypeRegistry) -> Result<String> {
        match self {
            Self::Literal(value) => Ok(registry.describe::<T>()?.literal(value)),
            Self::Dynamic(dynamic) => Ok(dynamic.slot.clone()),
            Self::Code(text) => Ok(text.clone()),
        }
    }
}

impl<T: Clone> Expression<T> {
    /// Evaluate the expression on the host
    pub fn value(&self) -> Result<T> {
        match self {
            Self::Literal(value) => Ok(value.clone()),
            Self::Dynamic(dynamic) => Ok(dynamic.evaluate()),
            Self::Code(text) => Err(Error::NotSupported(format!(
                "cannot evaluate code expression `{text}` on the host"
            ))),
        }
    }
}

impl<T: Clone + Send + Sync + 'static> Expression<T> {
    /// Map the value through `f`
    ///
    /// Literals are mapped immediately. Dynamic values get a new slot of type
    /// `U` in `scene` whose evaluator runs the old one and then `f`, so the
    /// mapping happens on the host every frame instead of in the shader.
    pub fn apply<U, F>(&self, scene: &mut SceneBuilder, f: F) -> Result<Expression<U>>
    where
        U: Pod + Send + Sync + 'static,
        F: Fn(T) -> U + Send + Sync + 'static,
    {
        match self {
            Self::Literal(value) => Ok(Expression::Literal(f(value.clone()))),
            Self::Dynamic(dynamic) => {
                let inner = Arc::clone(&dynamic.evaluator);
                scene.dynamic(move || f(inner()))
            }
            Self::Code(text) => Err(Error::NotSupported(format!(
                "cannot apply a host function to code expression `{text}`"
            ))),
        }
    }
}

impl<T> From<T> for Expression<T> {
    fn from(value: T) -> Self {
        Self::Literal(value)
    }
}

impl<T: Clone> Clone for Expression<T> {
    fn clone(&self) -> Self {
        match self {
            Self::Literal(value) => Self::Literal(value.clone()),
            Self::Dynamic(dynamic) => Self::Dynamic(dynamic.clone()),
            Self::Code(text) => Self::Code(text.clone()),
        }
    }
}

impl<T> Clone for Dynamic<T> {
    fn clone(&self) -> Self {
        Self {
            slot: self.slot.clone(),
            evaluator: Arc::clone(&self.evaluator),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Expression<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(value) => f.debug_tuple("Literal").field(value).finish(),
            Self::Dynamic(dynamic) => f.debug_tuple("Dynamic").field(&dynamic.slot).finish(),
            Self::Code(text) => f.debug_tuple("Code").field(text).finish(),
        }
    }
}

impl<T> fmt::Debug for Dynamic<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Dynamic").field("slot", &self.slot).finish_non_exhaustive()
    }
}
