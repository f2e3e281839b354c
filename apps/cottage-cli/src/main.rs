use clap::{Parser, Subcommand};
use cottage_kernel::{Showcase, ShowcaseConfig};
use cottage_render::{DebugTextRenderer, Renderer};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "cottage-cli", about = "Headless tool for the cottage scene")]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Directory holding the scene textures
    #[arg(long, default_value = "textures")]
    textures: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build the scene, wait for textures and print it
    Describe {
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
    /// Replay a key sequence and print the resulting house and camera state
    Keys {
        /// Keys to press in order, e.g. "aaokk"
        sequence: String,
        /// Print the summary as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Press each character of `sequence` in order. Returns how many were unmapped.
fn replay(showcase: &mut Showcase, sequence: &str) -> usize {
    let mut unmapped = 0;
    for key in sequence.chars() {
        match showcase.handle_key(&key.to_string()) {
            Some(action) => tracing::debug!("key {key:?} -> {action:?}"),
            None => {
                tracing::debug!("key {key:?} is not mapped");
                unmapped += 1;
            }
        }
    }
    tracing::info!(
        "replayed {} keys, {} scene events",
        sequence.chars().count(),
        showcase.drain_scene_events().len()
    );
    unmapped
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_writer(std::io::stderr)
        .init();

    let config = ShowcaseConfig {
        texture_dir: cli.textures,
        ..ShowcaseConfig::default()
    };

    match cli.command {
        Commands::Describe { json } => {
            let mut showcase = Showcase::new(&config)?;
            showcase.wait_for_textures();
            let summary = showcase.summary();
            if json {
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                print!(
                    "{}",
                    DebugTextRenderer::new().render(showcase.scene(), showcase.camera())
                );
                println!("{summary}");
            }
        }
        Commands::Keys { sequence, json } => {
            let mut showcase = Showcase::offline(config.width, config.height)?;
            let unmapped = replay(&mut showcase, &sequence);
            if json {
                println!("{}", serde_json::to_string_pretty(&showcase.summary())?);
            } else {
                let t = showcase.transform();
                println!(
                    "Keys: {} pressed, {} unmapped",
                    sequence.chars().count(),
                    unmapped
                );
                println!(
                    "House: position=({}, {}, {}) rotation=({}, {}, {}) deg",
                    t.x, t.y, t.z, t.qq1, t.qq2, t.qq3
                );
                println!("Camera Z: {}", showcase.camera_readout());
            }
        }
    }

    Ok(())
}
