use clap::{Parser, Subcommand};
use std::io::BufRead;
use std::path::{Path, PathBuf};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use color_tones::{
    ColorQuantizer, MovementAccumulator, QuantizeMethod, SampleOutcome, ThresholdScale,
};
use tonewalk::models::AppConfig;
use tonewalk::rendering::{decode_png, encode_rgba};
use tonewalk::server;

#[derive(Parser)]
#[command(name = "tonewalk")]
#[command(about = "Tonewalk - play an image's colors as tones while you walk")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve,
    /// Quantize a PNG and print its palette
    Quantize {
        /// Input PNG file
        input: PathBuf,

        /// Palette size (clamped to 1..=256)
        #[arg(short, long)]
        k: Option<i64>,

        /// Strategy: direct, uniform or kmeans
        #[arg(short, long)]
        method: Option<QuantizeMethod>,

        /// Write the palette preview PNG here
        #[arg(short, long)]
        preview: Option<PathBuf>,
    },
    /// Replay movement magnitudes (meters, one per line on stdin) against an image
    Walk {
        /// Input PNG file
        input: PathBuf,

        /// Palette size (clamped to 1..=256)
        #[arg(short, long)]
        k: Option<i64>,

        /// Strategy: direct, uniform or kmeans
        #[arg(short, long)]
        method: Option<QuantizeMethod>,

        /// Threshold slider position in [0, 1]
        #[arg(short, long)]
        slider: Option<f64>,
    },
    /// Convert between threshold slider positions and feet
    Threshold {
        /// Slider position in [0, 1]
        #[arg(long, conflicts_with = "feet")]
        slider: Option<f64>,

        /// Threshold in feet
        #[arg(long)]
        feet: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Serve) => run_server().await,
        Some(Commands::Quantize {
            input,
            k,
            method,
            preview,
        }) => run_quantize_command(&input, k, method, preview.as_deref()),
        Some(Commands::Walk {
            input,
            k,
            method,
            slider,
        }) => run_walk_command(&input, k, method, slider),
        Some(Commands::Threshold { slider, feet }) => {
            run_threshold_command(slider, feet);
            Ok(())
        }
        None => {
            run_status_command();
            Ok(())
        }
    }
}

/// Minimal logging for CLI commands
fn init_cli_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tonewalk=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer().without_time())
        .init();
}

/// Build a quantizer from config plus CLI overrides and load the image.
fn load_image(
    input: &Path,
    k: Option<i64>,
    method: Option<QuantizeMethod>,
) -> anyhow::Result<ColorQuantizer> {
    let config = AppConfig::from_env();
    let k = k.unwrap_or(config.quantization.k);
    let method = method.unwrap_or(config.quantization.method);

    let bytes = std::fs::read(input)
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {e}", input.display()))?;
    let image = decode_png(&bytes)?;

    let mut quantizer = ColorQuantizer::new(k, method);
    let report = quantizer.load_pixels(&image.rgba, image.width, image.height)?;
    if let Some(adj) = &report.adjustment {
        eprintln!("Note: {}", adj.message);
    }
    Ok(quantizer)
}

/// Quantize an image and print the palette (no server needed)
fn run_quantize_command(
    input: &Path,
    k: Option<i64>,
    method: Option<QuantizeMethod>,
    preview: Option<&Path>,
) -> anyhow::Result<()> {
    init_cli_tracing();

    let quantizer = load_image(input, k, method)?;
    let Some(state) = quantizer.state() else {
        anyhow::bail!("No palette was built");
    };

    println!(
        "{}: {} unique colors, {} samples",
        input.display(),
        quantizer.unique_color_count(),
        state.sequence().len()
    );
    println!(
        "Palette ({}, k={}, {} colors):",
        quantizer.method(),
        quantizer.k(),
        state.palette().len()
    );
    for (tone, hex) in state.palette().to_hex().iter().enumerate() {
        println!("  {tone:>3}  {hex}");
    }

    if let Some(path) = preview {
        if let Some(image) = quantizer.preview() {
            let side = image.side as u32;
            let png = encode_rgba(side, side, &image.rgba)?;
            std::fs::write(path, png)?;
            println!("Preview written to {}", path.display());
        }
    }

    Ok(())
}

/// Feed stdin magnitudes through the movement accumulator and print tones
fn run_walk_command(
    input: &Path,
    k: Option<i64>,
    method: Option<QuantizeMethod>,
    slider: Option<f64>,
) -> anyhow::Result<()> {
    init_cli_tracing();

    let mut quantizer = load_image(input, k, method)?;
    let scale = ThresholdScale::default();
    let slider = slider.unwrap_or_else(|| AppConfig::from_env().movement.threshold_slider);
    let mut accumulator = MovementAccumulator::new(scale.to_threshold(slider));
    println!("Threshold: {:.2} ft", accumulator.threshold_feet());

    let mut tones = 0usize;
    for (index, line) in std::io::stdin().lock().lines().enumerate() {
        let line = line?;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        let magnitude: f64 = match trimmed.parse() {
            Ok(m) => m,
            Err(e) => {
                tracing::warn!(line = index + 1, %e, "Skipping invalid magnitude");
                continue;
            }
        };

        match accumulator.on_sample(magnitude, &mut quantizer) {
            SampleOutcome::Tone(play) => {
                tones += 1;
                println!(
                    "tone {:>3}  after {:.2} ft  (total {:.2} ft)",
                    play.tone, play.since_last_tone, play.lifetime
                );
            }
            SampleOutcome::Silent(e) => tracing::warn!(%e, "Threshold crossed without a tone"),
            _ => {}
        }
    }

    println!("{tones} tones over {:.2} ft", accumulator.lifetime());
    Ok(())
}

fn run_threshold_command(slider: Option<f64>, feet: Option<f64>) {
    let scale = ThresholdScale::default();
    match (slider, feet) {
        (_, Some(feet)) => println!("{feet} ft -> slider {:.4}", scale.to_slider(feet)),
        (Some(slider), None) => {
            println!("slider {slider} -> {:.2} ft", scale.to_threshold(slider))
        }
        (None, None) => {
            println!(
                "Threshold scale: {} ft to {} ft, x{} per step ({:.2} steps)",
                scale.min_feet,
                scale.max_feet,
                scale.step_multiplier,
                scale.total_steps()
            );
            for tenth in 0..=10u8 {
                let s = f64::from(tenth) / 10.0;
                println!("  slider {s:.1}  {:>7.2} ft", scale.to_threshold(s));
            }
        }
    }
}

/// Show status information when run without arguments
fn run_status_command() {
    const VERSION: &str = env!("CARGO_PKG_VERSION");

    let bind_addr = std::env::var("BIND_ADDR").ok();
    let config_file = std::env::var("CONFIG_FILE").ok();

    println!("Tonewalk v{VERSION}");
    println!("Image colors as tones, one step at a time\n");

    println!("Environment Variables:");
    println!(
        "  BIND_ADDR   = {}",
        bind_addr.as_deref().unwrap_or("0.0.0.0:3000 (default)")
    );
    println!(
        "  CONFIG_FILE = {}",
        config_file.as_deref().unwrap_or("(not set)")
    );

    let config = AppConfig::from_env();
    let scale = ThresholdScale::default();
    println!("\nConfiguration:");
    println!("  k                = {}", config.quantization.k);
    println!("  method           = {}", config.quantization.method);
    println!(
        "  threshold_slider = {} ({:.2} ft)",
        config.movement.threshold_slider,
        scale.to_threshold(config.movement.threshold_slider)
    );
    println!("  debounce_ms      = {}", config.reconfigure.debounce_ms);

    println!("\nCommands:");
    println!("  tonewalk serve                 Start the HTTP server");
    println!("  tonewalk quantize <png>        Print an image's palette");
    println!("  tonewalk walk <png> < samples  Replay movement samples");
    println!("  tonewalk threshold             Show the threshold scale");
    println!("\nRun 'tonewalk --help' for more options.");
}

/// Run the HTTP server
async fn run_server() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tonewalk=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let bind_addr = std::env::var("BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let config = AppConfig::from_env();
    tracing::info!(
        k = config.quantization.k,
        method = %config.quantization.method,
        slider = config.movement.threshold_slider,
        debounce_ms = config.reconfigure.debounce_ms,
        "Configuration loaded"
    );

    let state = server::create_app_state(config);
    let app = server::build_router(state);

    let listener = tokio::net::TcpListener::bind(&bind_addr).await?;
    tracing::info!(addr = %bind_addr, "Tonewalk server listening");

    axum::serve(listener, app).await?;

    Ok(())
}
