//! Integration tests for compiling a scene and feeding it frame by frame

// Tests are allowed to use expect/unwrap for cleaner error messages
#![allow(clippy::expect_used)]
#![allow(clippy::unwrap_used)]

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};

use sdfc_scene::glam::{Mat4, Vec2, Vec3, Vec4};
use sdfc_scene::{
    ConstantBlock, Error, Node, ParameterSink, Result, SceneBuilder, SceneConfig, ShaderCompiler,
};

/// Stand-in for a real HLSL compiler: keeps the source it was given
#[derive(Default)]
struct RecordingCompiler {
    seen: Mutex<Vec<(String, String)>>,
}

#[derive(Debug, thiserror::Error)]
#[error("compiler unavailable")]
struct Unavailable;

impl ShaderCompiler for RecordingCompiler {
    type Program = String;
    type Error = Unavailable;

    fn compile(
        &self,
        source: &str,
        config: &SceneConfig,
    ) -> std::result::Result<String, Unavailable> {
        self.seen
            .lock()
            .map_err(|_| Unavailable)?
            .push((config.entry_point.clone(), config.profile.clone()));
        Ok(source.to_string())
    }
}

/// Sink that remembers the order of writes
#[derive(Default)]
struct WriteLog(Vec<String>);

impl ParameterSink for WriteLog {
    fn write_bytes(&mut self, name: &str, _bytes: &[u8]) -> Result<()> {
        self.0.push(name.to_string());
        Ok(())
    }
}

/// Frame clock shared between the test and a dynamic expression
fn clock() -> (Arc<AtomicU32>, impl Fn() -> f32 + Send + Sync + 'static) {
    let time = Arc::new(AtomicU32::new(0.0_f32.to_bits()));
    let reader = Arc::clone(&time);
    (time, move || f32::from_bits(reader.load(Ordering::SeqCst)))
}

fn set(time: &AtomicU32, value: f32) {
    time.store(value.to_bits(), Ordering::SeqCst);
}

#[test]
fn compiled_scene_refreshes_parameters_each_frame() {
    let (time, now) = clock();
    let mut scene = SceneBuilder::default();
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();

    let radius = scene.dynamic(move || 1.0 + now()).unwrap();
    let ball = scene.add(Node::sphere(radius, Vec3::ZERO, Vec4::ONE));
    scene.set_root(ball);
    scene.on_frame("camera", |sink| {
        sink.write_value("camTransform", &Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0)))
    });

    let compiler = RecordingCompiler::default();
    let compiled = scene.compile(&compiler).expect("Scene should compile");
    assert_eq!(compiled.program(), compiled.source());
    assert_eq!(
        compiler.seen.lock().unwrap().as_slice(),
        &[("CSMain".to_string(), "cs_5_0".to_string())]
    );

    let slot = compiled.parameters()[1].name.clone();
    let mut block = compiled.constant_block();

    set(&time, 0.5);
    compiled.frame(&mut block, |_| ()).unwrap();
    assert_eq!(block.read::<f32>(&slot).unwrap(), 1.5);

    set(&time, 2.0);
    compiled.frame(&mut block, |_| ()).unwrap();
    assert_eq!(block.read::<f32>(&slot).unwrap(), 3.0);
    assert_eq!(
        block.read::<Mat4>("camTransform").unwrap(),
        Mat4::from_translation(Vec3::new(0.0, 0.0, -5.0))
    );
}

#[test]
fn feeds_run_in_registration_order() {
    let mut scene = SceneBuilder::default();
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();
    scene.on_frame("camera", |sink| sink.write_value("camTransform", &Mat4::IDENTITY));
    let k = scene.dynamic(|| 0.2_f32).unwrap();
    let center = scene.dynamic(|| Vec3::Y).unwrap();

    let a = scene.add(Node::sphere(1.0_f32, center, Vec4::ONE));
    let b = scene.add(Node::plane(Vec3::Y, 0.0_f32, Vec4::ONE));
    let root = scene.add(Node::smooth_union(k, [a, b]));
    scene.set_root(root);

    let compiled = scene.compile(&RecordingCompiler::default()).unwrap();
    let mut log = WriteLog::default();
    let dispatched = compiled.frame(&mut log, |program| !program.is_empty()).unwrap();

    assert!(dispatched);
    let expected: Vec<String> = ["camTransform", "expr_0", "expr_1"]
        .iter()
        .map(|s| (*s).to_string())
        .collect();
    assert_eq!(log.0, expected);
}

#[test]
fn constant_block_follows_hlsl_packing() {
    let mut scene = SceneBuilder::default();
    scene.define_parameter::<f32>("time").unwrap();
    scene.define_parameter::<Vec2>("jitter").unwrap();
    scene.define_parameter::<Vec3>("lightDir").unwrap();
    scene.define_parameter::<Vec4>("fogColor").unwrap();
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();
    scene.define_parameter::<f32>("exposure").unwrap();

    let block = ConstantBlock::packed(scene.parameters());
    let offsets: Vec<(&str, usize)> = block
        .members()
        .iter()
        .map(|m| (m.name.as_str(), m.offset))
        .collect();

    // lightDir would straddle the first register, so it moves to the second
    assert_eq!(
        offsets,
        vec![
            ("time", 0),
            ("jitter", 4),
            ("lightDir", 16),
            ("fogColor", 32),
            ("camTransform", 48),
            ("exposure", 112),
        ]
    );
    assert_eq!(block.as_bytes().len(), 128);
}

#[test]
fn layout_serializes_for_hosts() {
    let mut scene = SceneBuilder::default();
    scene.define_parameter::<f32>("time").unwrap();
    let block = ConstantBlock::packed(scene.parameters());

    let json = serde_json::to_value(block.members()).unwrap();
    assert_eq!(json[0]["name"], "time");
    assert_eq!(json[0]["offset"], 0);
    assert_eq!(json[0]["size"], 4);

    let params = serde_json::to_value(scene.parameters()).unwrap();
    assert_eq!(params[0]["type_name"], "float");
}

#[test]
fn compiler_failure_is_reported() {
    struct Broken;

    impl ShaderCompiler for Broken {
        type Program = ();
        type Error = Unavailable;

        fn compile(&self, _: &str, _: &SceneConfig) -> std::result::Result<(), Unavailable> {
            Err(Unavailable)
        }
    }

    let mut scene = SceneBuilder::default();
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();
    let root = scene.add(Node::sphere(1.0_f32, Vec3::ZERO, Vec4::ONE));
    scene.set_root(root);

    let err = scene.compile(&Broken).unwrap_err();
    assert!(matches!(err, Error::Compile(_)));
    assert!(err.to_string().contains("compiler unavailable"));
}

#[test]
fn dynamic_transform_stays_dynamic() {
    let (time, now) = clock();
    let mut scene = SceneBuilder::default();
    scene.define_camera_transform::<Mat4>("camTransform").unwrap();

    let spin = scene.dynamic(move || Mat4::from_rotation_y(now())).unwrap();
    let ball = scene.add(Node::sphere(0.5_f32, Vec3::X, Vec4::ONE));
    let spinning = scene.transform(spin, ball).unwrap();
    scene.set_root(spinning);

    // Object-to-parent and its derived inverse each get a slot
    assert_eq!(scene.feeds().len(), 2);

    let compiled = scene.compile(&RecordingCompiler::default()).unwrap();
    let mut block = compiled.constant_block();
    set(&time, 0.3);
    compiled.write_parameters(&mut block).unwrap();

    let object_to_parent = block.read::<Mat4>("expr_0").unwrap();
    let parent_to_object = block.read::<Mat4>("expr_1").unwrap();
    assert!(object_to_parent.abs_diff_eq(Mat4::from_rotation_y(0.3), 1e-6));
    assert!(parent_to_object.abs_diff_eq(Mat4::from_rotation_y(-0.3), 1e-5));
}
