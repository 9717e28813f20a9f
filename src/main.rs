use clap::{Parser, Subcommand};
use snapfilter::filters::GaussianNoise;
use snapfilter::imaging::{ImagingBackend, RustBackend};
use snapfilter::pipeline::FilterPipeline;
use snapfilter::process::{ProcessSettings, parse_filter_form};
use snapfilter::store::UploadStore;
use snapfilter::{config, output, server};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "snapfilter")]
#[command(about = "Upload an image, pick filters, download the result")]
#[command(long_about = "\
Upload an image, pick filters, download the result

Filters are applied in the order given:

  bw        Black & White (luma on all channels)
  sepia     Warm brown tone
  blur      Gaussian blur; --intensity is the kernel size (rounded up to odd)
  negative  255 - value
  edges     Black/white edge map
  bright    value * 1.5 + 50
  vintage   Sepia plus film grain

Every upload is resized to the configured canvas (800x600 by default) and
both the original and the filtered PNG are kept in the upload directory.
Only the newest files are kept (10 by default).

Run 'snapfilter gen-config' to generate a documented config.toml.")]
#[command(version = env!("SNAPFILTER_BUILD"))]
struct Cli {
    /// Config file (missing file means stock defaults)
    #[arg(long, default_value = "config.toml", global = true)]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the upload form web server
    Serve {
        /// Listen address, overrides server.bind
        #[arg(long)]
        bind: Option<String>,
        /// Upload directory, overrides store.upload_dir
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
    /// Filter a local image without starting the server
    Apply {
        input: PathBuf,
        output: PathBuf,
        /// Filter to apply; repeat to chain
        #[arg(long = "filter", short = 'f')]
        filters: Vec<String>,
        /// Blur kernel size (defaults to filters.default_intensity)
        #[arg(long)]
        intensity: Option<String>,
        /// Seed for the vintage grain, for reproducible output
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List stored uploads, oldest first
    List {
        /// Upload directory, overrides store.upload_dir
        #[arg(long)]
        upload_dir: Option<PathBuf>,
    },
    /// Print a stock config.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind, upload_dir } => {
            let mut app_config = config::load_config(&cli.config)?;
            if let Some(bind) = bind {
                app_config.server.bind = bind;
            }
            if let Some(dir) = upload_dir {
                app_config.store.upload_dir = dir;
            }
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .enable_all()
                .build()?;
            runtime.block_on(server::serve(app_config))?;
        }
        Command::Apply {
            input,
            output: output_path,
            filters,
            intensity,
            seed,
        } => {
            let app_config = config::load_config(&cli.config)?;
            let settings = ProcessSettings::from_app_config(&app_config);
            let specs = parse_filter_form(&filters, intensity.as_deref(), &settings)?;

            let backend = RustBackend::new();
            let decoded = backend.decode(&std::fs::read(&input)?)?;
            let mut noise = match seed {
                Some(seed) => GaussianNoise::seeded(seed),
                None => GaussianNoise::from_entropy(),
            };
            let filtered = FilterPipeline::new(&backend, &mut noise).apply(&decoded, &specs)?;
            std::fs::write(&output_path, backend.encode_png(&filtered)?)?;

            output::print_apply_output(
                &specs,
                filtered.width(),
                filtered.height(),
                &input,
                &output_path,
            );
        }
        Command::List { upload_dir } => {
            let mut app_config = config::load_config(&cli.config)?;
            if let Some(dir) = upload_dir {
                app_config.store.upload_dir = dir;
            }
            let store = UploadStore::open(app_config.store)?;
            output::print_store_listing(&store.list()?, store.max_assets());
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
