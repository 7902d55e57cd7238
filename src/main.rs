use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::error;

use shop_ingest::config::{credential_help, Config, Provider};
use shop_ingest::constants::{
    DEFAULT_CONFIG_FILE, DEFAULT_GEOCODED_CSV, DEFAULT_SAMPLE_JSON, DEFAULT_SHOPS_JSON, DEFAULT_SHOP_CSV,
};
use shop_ingest::error::IngestError;
use shop_ingest::geocode::GeocodeSummary;
use shop_ingest::logging;
use shop_ingest::pipeline::{run_geocode, run_transform, Pipeline, TransformPaths, TransformSummary};

#[derive(Parser)]
#[command(name = "shop_ingest")]
#[command(about = "Geocode and normalize beauty shop listings for upload")]
#[command(version = "0.1.0")]
struct Cli {
    /// Optional TOML file with geocoder/transform tunables
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct ProviderArgs {
    /// Use the Google Geocoding API instead of Kakao
    #[arg(long)]
    google: bool,
}

impl ProviderArgs {
    fn provider(&self) -> Provider {
        if self.google {
            Provider::Google
        } else {
            Provider::Kakao
        }
    }
}

#[derive(Args)]
struct TransformArgs {
    /// Geocoded shop table
    #[arg(long, default_value = DEFAULT_GEOCODED_CSV)]
    input: PathBuf,
    /// Full JSON array of normalized shops
    #[arg(long, default_value = DEFAULT_SHOPS_JSON)]
    output: PathBuf,
    /// JSON array holding only the first few shops
    #[arg(long, default_value = DEFAULT_SAMPLE_JSON)]
    sample_output: PathBuf,
}

impl From<TransformArgs> for TransformPaths {
    fn from(args: TransformArgs) -> Self {
        TransformPaths {
            input: args.input,
            output: args.output,
            sample_output: args.sample_output,
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Append LATITUDE/LONGITUDE columns to a shop table
    Geocode {
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, default_value = DEFAULT_SHOP_CSV)]
        input: PathBuf,
        #[arg(long, default_value = DEFAULT_GEOCODED_CSV)]
        output: PathBuf,
    },
    /// Turn a geocoded table into upload-ready JSON
    Transform {
        #[command(flatten)]
        paths: TransformArgs,
    },
    /// Run geocode then transform
    Run {
        #[command(flatten)]
        provider: ProviderArgs,
        #[arg(long, default_value = DEFAULT_SHOP_CSV)]
        input: PathBuf,
        /// Intermediate geocoded table
        #[arg(long, default_value = DEFAULT_GEOCODED_CSV)]
        geocoded: PathBuf,
        #[arg(long, default_value = DEFAULT_SHOPS_JSON)]
        output: PathBuf,
        #[arg(long, default_value = DEFAULT_SAMPLE_JSON)]
        sample_output: PathBuf,
    },
}

fn print_geocode_summary(summary: &GeocodeSummary, output: &std::path::Path) {
    println!("\n{}", "=".repeat(60));
    println!("Geocoding complete! ({})", summary.provider);
    println!("Total rows: {}", summary.total_rows);
    println!("Successfully geocoded: {}", summary.geocoded);
    println!("Failed: {}", summary.failed());
    println!("   No results: {}", summary.not_found);
    println!("   Lookup errors: {}", summary.lookup_errors);
    println!("   Empty address: {}", summary.empty_address);
    println!("Output file: {}", output.display());
    println!("{}", "=".repeat(60));
}

fn print_transform_summary(summary: &TransformSummary, paths: &TransformPaths) {
    println!("\n{}", "=".repeat(60));
    println!("📊 Transformation Summary:");
    println!("{}", "=".repeat(60));
    println!("Total shops processed: {}", summary.total_rows);
    println!("Successfully transformed: {}", summary.transformed);
    println!("Skipped (no coordinates): {}", summary.skipped_missing_coordinates);
    println!("Skipped (invalid coordinates): {}", summary.skipped_invalid_coordinates);
    println!("Outside Seoul bounds (kept): {}", summary.out_of_bounds);
    println!("\n📈 Category Distribution:");
    for (category, count) in summary.category_distribution() {
        println!("  {:20} : {:3} shops", category, count);
    }
    println!("\n✅ Output saved to: {}", paths.output.display());
    println!("📝 Test batch saved to: {}", paths.sample_output.display());
    println!("{}\n", "=".repeat(60));
}

/// Log and print the failure, then hand it back as the process error.
fn into_report(e: IngestError) -> anyhow::Error {
    error!("Run failed: {}", e);
    println!("\n❌ Error: {}", e);
    if matches!(e, IngestError::Config(_)) {
        println!("\n{}", credential_help());
    }
    anyhow::Error::new(e)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let log_guard = logging::init_logging();

    let Cli {
        config: config_path,
        command,
    } = Cli::parse();

    let result = async move {
        let config = Config::load(&config_path)?;
        match command {
            Commands::Geocode { provider, input, output } => {
                println!("🌏 Geocoding {} with {}...", input.display(), provider.provider().name());
                let summary = run_geocode(provider.provider(), &config, &input, &output).await?;
                print_geocode_summary(&summary, &output);
            }
            Commands::Transform { paths } => {
                let paths = TransformPaths::from(paths);
                let summary = run_transform(&paths, config.transform.sample_size)?;
                print_transform_summary(&summary, &paths);
            }
            Commands::Run {
                provider,
                input,
                geocoded,
                output,
                sample_output,
            } => {
                println!("🚀 Running full pipeline (geocode + transform)...");
                let paths = TransformPaths {
                    input: geocoded,
                    output,
                    sample_output,
                };
                let result = Pipeline::run(provider.provider(), &config, &input, &paths).await?;
                print_geocode_summary(&result.geocode, &paths.input);
                print_transform_summary(&result.transform, &paths);
            }
        }
        Ok::<(), IngestError>(())
    }
    .await;

    // Drop the guard before returning so the file log is flushed
    let result = result.map_err(into_report);
    drop(log_guard);
    result
}
