//! sdfc CLI - Build CSG demo scenes into HLSL ray-marching shaders

mod demos;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use sdfc_math::hyperbolic;
use sdfc_scene::glam::Vec3;
use sdfc_scene::{ConstantBlock, CpuScene, SceneBuilder, SceneConfig, Space};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, fmt};

use demos::Demo;

#[derive(Parser)]
#[command(name = "sdfc")]
#[command(about = "Compile CSG scene graphs into SDF ray-marching shaders", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the built-in demo scenes
    List,

    /// Generate the shader source of a demo scene
    Build {
        /// Demo scene name (see `sdfc list`)
        demo: String,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Scene settings as JSON (see `sdfc config`)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the constant buffer layout of a demo scene as JSON
    Layout {
        /// Demo scene name
        demo: String,

        /// Scene settings as JSON
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Evaluate a demo scene on the CPU at one point
    Probe {
        /// Demo scene name
        demo: String,

        /// Point to sample; lifted onto the hyperboloid for hyperbolic scenes
        #[arg(
            required = true,
            num_args = 3,
            value_names = ["X", "Y", "Z"],
            allow_negative_numbers = true
        )]
        point: Vec<f32>,
    },

    /// Print the default scene settings as JSON
    Config {
        /// Geometry the settings are for
        #[arg(long, value_enum, default_value = "euclidean")]
        space: SpaceArg,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum SpaceArg {
    Euclidean,
    Hyperbolic,
}

impl From<SpaceArg> for Space {
    fn from(arg: SpaceArg) -> Self {
        match arg {
            SpaceArg::Euclidean => Space::Euclidean,
            SpaceArg::Hyperbolic => Space::Hyperbolic,
        }
    }
}

/// One constant buffer member as reported by `sdfc layout`
#[derive(Serialize)]
struct LayoutEntry<'a> {
    name: &'a str,
    type_name: &'a str,
    offset: usize,
    size: usize,
}

fn main() -> Result<()> {
    // stdout carries shader text and JSON, logs go to stderr
    let stderr_layer = fmt::layer().with_writer(std::io::stderr);
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(filter)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::List => {
            list_demos();
        }
        Commands::Build {
            demo,
            output,
            config,
        } => {
            run_build(&demo, output.as_deref(), config.as_deref())?;
        }
        Commands::Layout { demo, config } => {
            run_layout(&demo, config.as_deref())?;
        }
        Commands::Probe { demo, point } => {
            run_probe(&demo, Vec3::from_slice(&point))?;
        }
        Commands::Config { space } => {
            let config = SceneConfig::for_space(space.into());
            println!("{}", serde_json::to_string_pretty(&config)?);
        }
    }

    Ok(())
}

fn list_demos() {
    let width = demos::DEMOS.iter().map(|d| d.name.len()).max().unwrap_or(0);
    for demo in demos::DEMOS {
        let space = match demo.space {
            Space::Euclidean => "euclidean",
            Space::Hyperbolic => "hyperbolic",
        };
        println!("{:width$}  {:10}  {}", demo.name, space, demo.description);
    }
}

fn find_demo(name: &str) -> Result<&'static Demo> {
    demos::find(name).with_context(|| format!("Unknown demo '{name}' (see `sdfc list`)"))
}

fn load_config(demo: &Demo, path: Option<&Path>) -> Result<SceneConfig> {
    let Some(path) = path else {
        return Ok(SceneConfig::for_space(demo.space));
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config {}", path.display()))?;
    let config = serde_json::from_str(&text)
        .with_context(|| format!("Invalid config {}", path.display()))?;
    tracing::info!(path = %path.display(), "Loaded scene config");
    Ok(config)
}

fn instantiate(name: &str, config_path: Option<&Path>) -> Result<SceneBuilder> {
    let demo = find_demo(name)?;
    let config = load_config(demo, config_path)?;
    demo.instantiate(config)
        .with_context(|| format!("Failed to set up demo '{name}'"))
}

fn run_build(name: &str, output: Option<&Path>, config: Option<&Path>) -> Result<()> {
    let mut scene = instantiate(name, config)?;
    let source = scene
        .build_source()
        .with_context(|| format!("Failed to build demo '{name}'"))?;

    match output {
        Some(path) => {
            std::fs::write(path, &source)
                .with_context(|| format!("Failed to write {}", path.display()))?;
            tracing::info!(
                path = %path.display(),
                bytes = source.len(),
                parameters = scene.parameters().len(),
                "Wrote shader source"
            );
        }
        None => print!("{source}"),
    }
    Ok(())
}

fn run_layout(name: &str, config: Option<&Path>) -> Result<()> {
    let scene = instantiate(name, config)?;
    let block = ConstantBlock::packed(scene.parameters());

    let entries: Vec<LayoutEntry> = scene
        .parameters()
        .iter()
        .zip(block.members())
        .map(|(param, member)| LayoutEntry {
            name: &param.name,
            type_name: &param.type_name,
            offset: member.offset,
            size: member.size,
        })
        .collect();

    println!("{}", serde_json::to_string_pretty(&entries)?);
    tracing::debug!(bytes = block.as_bytes().len(), "Constant buffer size");
    Ok(())
}

fn run_probe(name: &str, point: Vec3) -> Result<()> {
    let demo = find_demo(name)?;
    let scene = demo.instantiate(SceneConfig::for_space(demo.space))?;
    let root = scene
        .root()
        .with_context(|| format!("Demo '{name}' has no root"))?;

    let p = match demo.space {
        Space::Euclidean => point.extend(1.0),
        Space::Hyperbolic => hyperbolic::lift(point),
    };

    let cpu = CpuScene::new(&scene);
    let distance = cpu.distance(root, p)?;
    let hit = cpu.hit(root, p)?;

    println!("point:    {p}");
    println!("distance: {distance}");
    println!("normal:   {}", hit.normal);
    println!("albedo:   {}", hit.albedo);
    Ok(())
}
