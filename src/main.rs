use clap::{Parser, Subcommand};
use font_manifest::minify::LightningMinifier;
use font_manifest::{config, manifest, output, pipeline};
use std::path::{Path, PathBuf};

/// Flags shared by commands that extract fonts.
#[derive(clap::Args, Clone)]
struct FontArgs {
    /// Accepted font format, most preferred first (repeatable; replaces the configured list)
    #[arg(long = "format", value_name = "FORMAT")]
    formats: Vec<String>,

    /// Keep fonts embedded as data: URIs
    #[arg(long)]
    data_uris: bool,

    /// Pretty-print the manifest JSON
    #[arg(long)]
    pretty: bool,
}

#[derive(Parser)]
#[command(name = "font-manifest")]
#[command(about = "Manifest of the web fonts a stylesheet actually uses")]
#[command(long_about = "\
Manifest of the web fonts a stylesheet actually uses

A font is listed when an @font-face rule declares it and a style rule refers
to its family. For each @font-face only the most preferred source format is
kept (woff2, then woff, by default).

  @font-face { font-family: 'Font A'; src: url(/fonts/a.woff2) format('woff2'); }
  body { font-family: 'Font A'; }

produces

  {\"/fonts/a.woff2\": {\"family\": \"Font A\", \"weight\": \"normal\", \"style\": \"normal\",
                      \"format\": \"woff2\", \"url\": \"/fonts/a.woff2\", \"src\": ..., \"css\": ...}}

Configuration is read from font-manifest.toml in the current directory.
Run 'font-manifest gen-config' to generate a documented one.")]
#[command(version)]
struct Cli {
    /// Config file (default: ./font-manifest.toml, if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print the manifest of a single stylesheet
    Extract {
        /// Stylesheet to read
        file: PathBuf,

        #[command(flatten)]
        fonts: FontArgs,
    },
    /// Extract fonts from every stylesheet in a build directory and write the merged manifest
    Build {
        /// Build output directory
        #[arg(long, default_value = "dist")]
        dir: PathBuf,

        /// Only process stylesheets whose name contains this text (repeatable)
        #[arg(long, value_name = "TEXT")]
        only: Vec<String>,

        /// Only process the stylesheets of this output group
        #[arg(long)]
        group: Option<String>,

        #[command(flatten)]
        fonts: FontArgs,
    },
    /// Print a stock font-manifest.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    match cli.command {
        Command::Extract { file, fonts } => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_font_args(&mut config, &fonts);
            config.validate()?;

            let css = std::fs::read_to_string(&file)?;
            let name = file.display().to_string();
            let extraction = manifest::generate_manifest(&css, Some(&name), &config.fonts)?;
            let json = if config.assets.pretty {
                serde_json::to_string_pretty(&extraction.manifest)?
            } else {
                serde_json::to_string(&extraction.manifest)?
            };
            println!("{}", json);
        }
        Command::Build {
            dir,
            only,
            group,
            fonts,
        } => {
            let mut config = load_config(cli.config.as_deref())?;
            apply_font_args(&mut config, &fonts);
            if !only.is_empty() {
                config.assets.only = only;
            }
            config.validate()?;
            init_thread_pool(&config.processing);

            println!("==> Extracting fonts from {}", dir.display());
            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_pipeline_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = pipeline::build(
                &dir,
                &config,
                group.as_deref(),
                &LightningMinifier,
                Some(tx),
            );
            printer.join().ok();
            let report = result?;

            println!();
            output::print_build_summary(&report);
            if !report.failures.is_empty() {
                return Err(format!(
                    "{} stylesheet(s) could not be parsed",
                    report.failures.len()
                )
                .into());
            }
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}

/// Load the explicit config file, or `font-manifest.toml` from the current
/// directory when there is one.
fn load_config(path: Option<&Path>) -> Result<config::Config, config::ConfigError> {
    match path {
        Some(path) => config::load_config_file(path),
        None => config::load_config(Path::new(".")),
    }
}

/// Command-line flags override the config file.
fn apply_font_args(config: &mut config::Config, args: &FontArgs) {
    if !args.formats.is_empty() {
        config.fonts.formats = args.formats.clone();
    }
    if args.data_uris {
        config.fonts.data_uris = true;
    }
    if args.pretty {
        config.assets.pretty = true;
    }
}

/// Initialize the rayon thread pool based on processing config.
///
/// Capped at the number of available CPU cores.
fn init_thread_pool(processing: &config::ProcessingConfig) {
    let threads = config::effective_threads(processing);
    rayon::ThreadPoolBuilder::new()
        .num_threads(threads)
        .build_global()
        .ok();
}
