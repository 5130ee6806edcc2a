use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use image_converter::config::{self, Overrides};
use image_converter::imaging::{RustBackend, operations};
use image_converter::web::{self, AppState};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::process::ExitCode;
use tokio::net::TcpListener;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(name = "image-converter")]
#[command(about = "Upload an image, convert it to grayscale or blur it")]
#[command(long_about = "\
Upload an image, convert it to grayscale or blur it

Runs a small web server (the default command) with an upload form. Uploaded
files land in the upload directory under a content-hash name; processed
results land in the result directory as processed_<hash>-<operation>.<ext>.

Operations:
  grayscale   Each pixel becomes the plain mean of its R, G and B channels
  blur        Gaussian blur with sigma 10

Run 'image-converter gen-config' to generate a documented config.toml.")]
#[command(version)]
struct Cli {
    /// Path to config.toml (missing file means stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    /// Verbose logging (debug level). RUST_LOG takes precedence.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(clap::Args, Clone, Default)]
struct ServeArgs {
    /// Address to listen on, e.g. 0.0.0.0:8080
    #[arg(long)]
    bind: Option<SocketAddr>,

    /// Directory for raw uploads
    #[arg(long)]
    upload_dir: Option<PathBuf>,

    /// Directory for processed results
    #[arg(long)]
    result_dir: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Command {
    /// Run the web server (default)
    Serve(ServeArgs),
    /// Apply one operation to a file without the web server
    Convert {
        /// Source image
        input: PathBuf,
        /// Destination; the format follows the extension
        output: PathBuf,
        /// grayscale or blur
        #[arg(short, long)]
        operation: String,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            tracing::error!("{err:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose {
        "image_converter=debug,tower_http=debug"
    } else {
        "image_converter=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command.unwrap_or(Command::Serve(ServeArgs::default())) {
        Command::Serve(args) => serve(&cli.config, args).await,
        Command::Convert {
            input,
            output,
            operation,
        } => {
            let transformed = tokio::task::spawn_blocking(move || {
                operations::transform_named(&RustBackend::new(), &input, &output, &operation)
                    .map(|t| (t, output))
            })
            .await
            .context("convert worker panicked")??;
            let (transformed, output) = transformed;
            println!(
                "{} → {} ({}x{})",
                transformed.operation,
                output.display(),
                transformed.dimensions.width,
                transformed.dimensions.height
            );
            Ok(())
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
            Ok(())
        }
    }
}

async fn serve(config_path: &std::path::Path, args: ServeArgs) -> Result<()> {
    let config = config::load_config(config_path)
        .with_context(|| format!("failed to load {}", config_path.display()))?
        .apply_overrides(Overrides {
            bind: args.bind,
            upload_dir: args.upload_dir,
            result_dir: args.result_dir,
        })?;

    let state = AppState::new(&config)
        .await
        .context("failed to create storage directories")?;
    let listener = TcpListener::bind(config.server.bind)
        .await
        .with_context(|| format!("failed to bind {}", config.server.bind))?;

    tracing::info!(
        addr = %listener.local_addr()?,
        uploads = %config.storage.upload_dir.display(),
        results = %config.storage.result_dir.display(),
        "listening"
    );

    web::serve(listener, state).await.context("server error")
}
