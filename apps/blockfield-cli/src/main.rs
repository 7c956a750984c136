use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::Context;
use blockfield_common::{BlockPos, BlockType};
use blockfield_input::{Action, PointerButton};
use blockfield_kernel::{World, WorldConfig};
use blockfield_render::{MeshRegistry, RenderView, Renderer, TopDownRenderer};
use blockfield_tools::WorldInspector;
use clap::{Parser, Subcommand};
use glam::Vec3;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "blockfield-cli", about = "CLI tool for blockfield worlds")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// YAML world configuration; defaults apply when omitted
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Print summaries as JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print version and crate info
    Info,
    /// Generate the default terrain, apply a script and advance time
    Simulate {
        /// Action script (JSON if the extension is .json, YAML otherwise)
        #[arg(short, long)]
        script: Option<PathBuf>,
        /// Simulated milliseconds to advance after the script
        #[arg(short, long, default_value = "5000")]
        millis: u64,
        /// Start from an empty world instead of the default terrain
        #[arg(long)]
        empty: bool,
        /// Print the top-down map
        #[arg(long)]
        map: bool,
    },
    /// Cast a pointer ray into the default terrain and apply the click
    Click {
        /// Ray origin as x,y,z
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        origin: Vec<f32>,
        /// Ray direction as x,y,z
        #[arg(long, value_delimiter = ',', num_args = 3, allow_negative_numbers = true)]
        direction: Vec<f32>,
        /// Place instead of break
        #[arg(long)]
        place: bool,
        /// Block type placed with --place
        #[arg(long, default_value = "GRASS")]
        block: String,
        /// Maximum pick distance
        #[arg(long, default_value = "8.0")]
        reach: f32,
    },
    /// Inspect one block and its column after advancing time
    Inspect {
        #[arg(allow_negative_numbers = true)]
        x: i32,
        #[arg(allow_negative_numbers = true)]
        y: i32,
        #[arg(allow_negative_numbers = true)]
        z: i32,
        /// Simulated milliseconds to advance before inspecting
        #[arg(short, long, default_value = "0")]
        millis: u64,
    },
}

fn load_config(path: Option<&Path>) -> anyhow::Result<WorldConfig> {
    let Some(path) = path else {
        return Ok(WorldConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading config {}", path.display()))?;
    let config: WorldConfig = serde_yaml::from_str(&text)
        .with_context(|| format!("parsing config {}", path.display()))?;
    tracing::info!(path = %path.display(), "loaded world config");
    Ok(config)
}

fn load_script(path: &Path) -> anyhow::Result<Vec<Action>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading script {}", path.display()))?;
    let actions = if path.extension().is_some_and(|ext| ext == "json") {
        serde_json::from_str(&text)?
    } else {
        serde_yaml::from_str(&text)?
    };
    Ok(actions)
}

fn terrain_world(config: WorldConfig, empty: bool) -> anyhow::Result<World<MeshRegistry>> {
    let mut world = World::with_scene(MeshRegistry::new(), config)?;
    if !empty {
        world.generate_default_terrain();
    }
    Ok(world)
}

fn vec3(components: &[f32]) -> anyhow::Result<Vec3> {
    match components {
        [x, y, z] => Ok(Vec3::new(*x, *y, *z)),
        _ => anyhow::bail!("expected three components, got {}", components.len()),
    }
}

fn print_summary(world: &World<MeshRegistry>, json: bool) -> anyhow::Result<()> {
    let summary = WorldInspector::summary(world);
    if json {
        println!("{}", serde_json::to_string_pretty(&summary)?);
    } else {
        println!("{summary}");
        for (texture, count) in world.scene().texture_usage() {
            println!("  {texture}: {count}");
        }
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .init();

    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Info => {
            println!("blockfield-cli v{}", env!("CARGO_PKG_VERSION"));
            println!("kernel: now={:?}", World::new().now());
            println!("render: {}", blockfield_render::crate_info());
            println!("input: {}", blockfield_input::crate_info());
            println!("tools: {}", blockfield_tools::crate_info());
            println!(
                "config: chunk_size={} decay={}ms growth={}ms transitions={:?}",
                config.chunk_size, config.decay_delay_ms, config.growth_delay_ms, config.transitions
            );
        }
        Commands::Simulate {
            script,
            millis,
            empty,
            map,
        } => {
            let mut world = terrain_world(config, empty)?;
            if let Some(path) = script {
                let actions = load_script(&path)?;
                println!("Applying {} actions from {}", actions.len(), path.display());
                for action in actions {
                    let outcome = action.apply(&mut world);
                    tracing::debug!(?outcome, "action applied");
                }
            }
            let transitions = world.advance(Duration::from_millis(millis));
            println!("Advanced {millis}ms: {transitions} transitions");

            if map {
                let view = RenderView::fit(&world).unwrap_or_default();
                print!("{}", TopDownRenderer::new().render(&world, &view));
            }
            print_summary(&world, cli.json)?;
        }
        Commands::Click {
            origin,
            direction,
            place,
            block,
            reach,
        } => {
            let held: BlockType = block.parse()?;
            let mut world = terrain_world(config, false)?;
            let hit = world.raycast(vec3(&origin)?, vec3(&direction)?, reach);
            match &hit {
                Some(hit) => println!(
                    "Hit {} at {} (distance {:.2})",
                    hit.block, hit.position, hit.distance
                ),
                None => println!("No block within {reach}"),
            }
            let button = if place {
                PointerButton::Secondary
            } else {
                PointerButton::Primary
            };
            let action = Action::from_pick(button, hit.as_ref(), held);
            let outcome = action.apply(&mut world);
            println!("{action:?} -> {outcome:?}");
            print_summary(&world, cli.json)?;
        }
        Commands::Inspect { x, y, z, millis } => {
            let mut world = terrain_world(config, false)?;
            world.advance(Duration::from_millis(millis));
            let position = BlockPos::new(x, y, z);
            let info = WorldInspector::inspect_block(&world, position);
            let column = WorldInspector::column(&world, x, z);
            if cli.json {
                let report = serde_json::json!({ "block": info, "column": column });
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                match info {
                    Some(info) => println!("{info}"),
                    None => println!("No block at {position}"),
                }
                for (y, block) in column {
                    println!("  y={y}: {block}");
                }
            }
        }
    }

    Ok(())
}
