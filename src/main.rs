use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{Level, info, warn};
use tracing_subscriber::FmtSubscriber;

use rakkan::{BatchRequest, Config, Position, run_batch, startup_checks};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Global options that apply to all commands
    #[arg(short, long, default_value = "rakkan.toml", global = true)]
    config: PathBuf,

    /// Overrides `app.log_level` from the config file
    #[arg(short, long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Watermark a batch of images
    Apply {
        /// Watermark image (PNG recommended)
        #[arg(short, long)]
        watermark: Option<PathBuf>,

        /// Existing output directory
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Bottom-Left, Bottom-Right, Top-Right, Top-Left or Center
        #[arg(short, long)]
        position: Option<String>,

        /// JPEG/WebP quality (1-100)
        #[arg(short, long)]
        quality: Option<u8>,

        /// Print the batch summary as JSON
        #[arg(long)]
        json: bool,

        /// Images to watermark, processed in the given order
        #[arg(required = true)]
        images: Vec<PathBuf>,
    },

    /// List the recognized watermark positions
    Positions,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Read before logging is up so the configured level can apply
    let config_present = cli.config.exists();
    let config = Config::load(&cli.config)?;

    let level_name = cli
        .log_level
        .clone()
        .unwrap_or_else(|| config.app.log_level.clone());
    let level = match level_name.to_lowercase().as_str() {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)?;

    if config_present {
        info!("Configuration loaded from: {:?}", cli.config);
    } else {
        info!("Config file not found at {:?}, using defaults", cli.config);
    }

    match cli.command {
        Commands::Apply {
            watermark,
            output,
            position,
            quality,
            json,
            images,
        } => {
            run_apply(
                config,
                ApplyArgs {
                    watermark,
                    output,
                    position,
                    quality,
                    json,
                    images,
                },
            )
            .await
        }
        Commands::Positions => {
            for position in Position::ALL {
                println!("{}", position);
            }
            Ok(())
        }
    }
}

struct ApplyArgs {
    watermark: Option<PathBuf>,
    output: Option<PathBuf>,
    position: Option<String>,
    quality: Option<u8>,
    json: bool,
    images: Vec<PathBuf>,
}

async fn run_apply(config: Config, args: ApplyArgs) -> Result<(), Box<dyn std::error::Error>> {
    let watermark = args
        .watermark
        .or(config.watermark.path)
        .ok_or("No watermark given (use --watermark or watermark.path in the config)")?;
    let output_dir = args
        .output
        .or(config.output.directory)
        .ok_or("No output directory given (use --output or output.directory in the config)")?;
    let position = args
        .position
        .as_deref()
        .map(Position::parse)
        .unwrap_or(config.watermark.position);
    let quality = args.quality.unwrap_or(config.watermark.quality);

    let images = startup_checks::dedupe_inputs(args.images);
    let cancel = Arc::new(AtomicBool::new(false));
    let request = BatchRequest::new(images, watermark, output_dir, position)
        .with_quality(quality)
        .with_cancel_flag(cancel.clone());

    match startup_checks::perform_startup_checks(&request) {
        Ok(()) => info!("All startup checks passed"),
        Err(errors) => {
            if startup_checks::report_startup_errors(&errors) {
                tracing::error!("Critical startup check failed, exiting");
                return Err("Critical startup check failed".into());
            } else {
                warn!("Non-critical startup checks reported warnings, continuing");
            }
        }
    }

    tokio::spawn(cancel_on_ctrl_c(cancel));

    let outcome = tokio::task::spawn_blocking(move || run_batch(&request)).await??;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome.summary())?);
    } else {
        for failure in &outcome.failures {
            eprintln!("{}", failure);
        }
        if outcome.cancelled {
            println!(
                "Cancelled. {} of {} images watermarked before stopping.",
                outcome.succeeded, outcome.total
            );
        } else {
            println!(
                "Processing complete! {} of {} images successfully watermarked.",
                outcome.succeeded, outcome.total
            );
        }
    }

    if !outcome.is_complete_success() {
        std::process::exit(2);
    }

    Ok(())
}

async fn cancel_on_ctrl_c(cancel: Arc<AtomicBool>) {
    if tokio::signal::ctrl_c().await.is_ok() {
        warn!("Interrupt received, stopping after the current image");
        cancel.store(true, Ordering::SeqCst);
    }
}
