//! Boundary to the shader compiler and renderer
//!
//! Compiling HLSL and dispatching it are left to the caller. A
//! [`ShaderCompiler`] turns source into a program; [`CompiledScene`] keeps that
//! program together with the parameter writers that must run before each
//! dispatch.

use crate::config::SceneConfig;
use crate::params::{ConstantBlock, Parameter, ParameterFeed, ParameterSink};
use crate::Result;

/// Turns generated source into a runnable program
pub trait ShaderCompiler {
    type Program;
    type Error: std::error::Error + Send + Sync + 'static;

    /// Compile `source`, using `config.entry_point` and `config.profile`
    fn compile(&self, source: &str, config: &SceneConfig)
    -> std::result::Result<Self::Program, Self::Error>;
}

/// A compiled scene ready to be rendered frame by frame
#[derive(Debug)]
pub struct CompiledScene<P> {
    program: P,
    source: String,
    parameters: Vec<Parameter>,
    feeds: Vec<ParameterFeed>,
}

impl<P> CompiledScene<P> {
    pub(crate) fn new(
        program: P,
        source: String,
        parameters: Vec<Parameter>,
        feeds: Vec<ParameterFeed>,
    ) -> Self {
        Self {
            program,
            source,
            parameters,
            feeds,
        }
    }

    pub fn program(&self) -> &P {
        &self.program
    }

    /// The source the program was compiled from
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Constant-buffer members in declaration order
    pub fn parameters(&self) -> &[Parameter] {
        &self.parameters
    }

    /// A zeroed CPU-side constant buffer with HLSL packing
    pub fn constant_block(&self) -> ConstantBlock {
        ConstantBlock::packed(&self.parameters)
    }

    /// Run every parameter writer in registration order
    pub fn write_parameters(&self, sink: &mut dyn ParameterSink) -> Result<()> {
        for feed in &self.feeds {
            feed.run(sink)?;
        }
        Ok(())
    }

    /// Refresh all parameters, then dispatch
    ///
    /// `dispatch` only runs once every write succeeded.
    pub fn frame<R>(
        &self,
        sink: &mut dyn ParameterSink,
        dispatch: impl FnOnce(&P) -> R,
    ) -> Result<R> {
        self.write_parameters(sink)?;
        Ok(dispatch(&self.program))
    }

    pub fn into_program(self) -> P {
        self.program
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::{Error, Node, SceneBuilder};
    use glam::{Mat4, Vec3, Vec4};
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;

    #[derive(Debug, thiserror::Error)]
    #[error("{0}")]
    struct Rejected(String);

    /// Accepts anything and records the source length
    struct EchoCompiler;

    impl ShaderCompiler for EchoCompiler {
        type Program = usize;
        type Error = Rejected;

        fn compile(&self, source: &str, _: &SceneConfig) -> std::result::Result<usize, Rejected> {
            Ok(source.len())
        }
    }

    struct RejectingCompiler;

    impl ShaderCompiler for RejectingCompiler {
        type Program = ();
        type Error = Rejected;

        fn compile(&self, _: &str, config: &SceneConfig) -> std::result::Result<(), Rejected> {
            Err(Rejected(format!("{}: unexpected token", config.entry_point)))
        }
    }

    fn scene() -> SceneBuilder {
        let mut scene = SceneBuilder::default();
        scene.define_camera_transform::<Mat4>("camTransform").unwrap();
        let radius = scene.dynamic(|| 0.5_f32).unwrap();
        let root = scene.add(Node::sphere(radius, Vec3::ZERO, Vec4::ONE));
        scene.set_root(root);
        scene.on_frame("camera", |sink| {
            sink.write_value("camTransform", &Mat4::from_translation(Vec3::Z))
        });
        scene
    }

    #[test]
    fn test_compile_packages_program() {
        let compiled = scene().compile(&EchoCompiler).unwrap();
        assert_eq!(*compiled.program(), compiled.source().len());
        assert_eq!(compiled.parameters().len(), 2);
    }

    #[test]
    fn test_compile_error_is_wrapped() {
        let result = scene().compile(&RejectingCompiler);
        let Err(Error::Compile(inner)) = result else {
            panic!("expected a compile error");
        };
        assert!(inner.to_string().contains("CSMain"));
    }

    #[test]
    fn test_frame_writes_before_dispatch() {
        let compiled = scene().compile(&EchoCompiler).unwrap();
        let mut block = compiled.constant_block();

        let slot = compiled.parameters()[1].name.clone();
        let seen = compiled
            .frame(&mut block, |_| true)
            .unwrap();
        assert!(seen);
        assert_eq!(block.read::<f32>(&slot).unwrap(), 0.5);
        assert_eq!(
            block.read::<Mat4>("camTransform").unwrap(),
            Mat4::from_translation(Vec3::Z)
        );
    }

    #[test]
    fn test_failed_write_skips_dispatch() {
        let compiled = scene().compile(&EchoCompiler).unwrap();
        // Block without the camera member
        let mut block = ConstantBlock::packed(&compiled.parameters()[1..]);
        let dispatched = Arc::new(AtomicBool::new(false));

        let flag = Arc::clone(&dispatched);
        let result = compiled.frame(&mut block, move |_| flag.store(true, Ordering::SeqCst));
        assert!(matches!(result, Err(Error::Lookup(_))));
        assert!(!dispatched.load(Ordering::SeqCst));
    }
}
