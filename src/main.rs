//! Run one frame of a scene through the model pipeline and print the draw list
//!
//! Usage:
//!   model-pipeline scene.ron                      # fixed-point software backend
//!   model-pipeline --backend float scene.ron
//!   model-pipeline --backend gpu --headless-gpu scene.ron
//!   model-pipeline --config pipeline.ron scene.ron

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;

use model_pipeline::pipeline::{BackendKind, DrawList, GpuCapabilities, ModelPipeline, PipelineConfig};
use model_pipeline::scene::Scene;

#[derive(Parser)]
#[command(name = "model-pipeline")]
#[command(about = "Transform, cull, clip and depth-sort a scene for one frame")]
#[command(version = model_pipeline::VERSION)]
struct Cli {
    /// Pipeline configuration (RON)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Backend override: fixed, float or gpu
    #[arg(long)]
    backend: Option<BackendKind>,

    /// Provide default-sized GPU buffers when the config has none
    #[arg(long)]
    headless_gpu: bool,

    /// Scene file (RON)
    scene: PathBuf,
}

fn init_logging() {
    use env_logger::{Builder, Env};
    Builder::from_env(Env::default().default_filter_or("info")).init();
}

fn main() -> Result<()> {
    init_logging();
    let cli = Cli::parse();

    let mut config = match &cli.config {
        Some(path) => PipelineConfig::load(path)
            .with_context(|| format!("Failed to load config {}", path.display()))?,
        None => PipelineConfig::default(),
    };
    if let Some(backend) = cli.backend {
        config.backend = backend;
    }
    if cli.headless_gpu && config.gpu.is_none() {
        config.gpu = Some(GpuCapabilities::default());
    }

    let scene = Scene::load(&cli.scene)
        .with_context(|| format!("Failed to load scene {}", cli.scene.display()))?;
    let mut pipeline = ModelPipeline::new(&config).context("Failed to set up pipeline")?;

    pipeline.set_camera(scene.camera.clone());
    pipeline.draw_list_clear();
    scene.submit(&mut pipeline);
    let list = pipeline.draw_list_finish();

    print_draw_list(&list);
    println!("{}", pipeline.last_frame_stats());
    Ok(())
}

fn print_draw_list(list: &DrawList) {
    match list {
        DrawList::Sorted(polygons) => {
            println!("{} polygons, back to front:", polygons.len());
            for p in polygons {
                println!(
                    "  #{:<4} object {:<4} polygon {:<4} depth {:>9.3}  verts {}{}  {:?} intensity {:.2}",
                    p.sequence,
                    p.object.0,
                    p.polygon,
                    p.sort_key,
                    p.vertices.len(),
                    if p.clipped { " (clipped)" } else { "" },
                    p.shading,
                    p.intensity
                );
            }
        }
        DrawList::Batched(batch) => {
            println!(
                "GPU batch: {} draws, {} vertices ({} bytes), {} triangles",
                batch.draws.len(),
                batch.vertices.len(),
                batch.vertex_bytes().len(),
                batch.triangle_count()
            );
            for draw in &batch.draws {
                println!(
                    "  object {:<4} indices {}..{} ambient {:.2}",
                    draw.object.0,
                    draw.first_index,
                    draw.first_index + draw.index_count,
                    draw.ambient
                );
            }
        }
    }
}
