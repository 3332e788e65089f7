use clap::{Args, Parser, Subcommand};
use imager::batch::{BatchConfig, run_batch};
use imager::config::{self, ImagerConfig};
use imager::pipeline::Pipeline;
use imager::request::{ProcessingOptions, RequestError};
use imager::store::{FsStore, ImageStore};
use imager::{logging, output};
use std::path::PathBuf;

/// Options that select and tune the processing stages.
#[derive(Args, Clone, Debug)]
struct StageArgs {
    /// Trim to the bounding box of visible (non-transparent) content
    #[arg(short = 'c', long)]
    crop: bool,

    /// Remove the background with the configured remover
    #[arg(short = 'b', long)]
    remove_bg: bool,

    /// Resize onto a WIDTHxHEIGHT canvas, keeping the aspect ratio
    #[arg(short = 'r', long, value_name = "WxH")]
    resize: Option<String>,

    /// Pixels kept free on every side when resizing
    #[arg(short = 'p', long, default_value_t = 0)]
    padding: u32,

    /// Background to composite onto: hex code, color name, or image path
    #[arg(long, value_name = "SPEC")]
    background: Option<String>,

    /// Use a named preset instead of individual options (see `imager presets`)
    #[arg(
        long,
        value_name = "NAME",
        conflicts_with_all = ["crop", "remove_bg", "resize", "padding", "background"]
    )]
    preset: Option<String>,
}

impl StageArgs {
    /// Validate into processing options. Runs before any file is touched.
    fn resolve(&self, config: &ImagerConfig) -> Result<ProcessingOptions, RequestError> {
        match &self.preset {
            Some(name) => config.preset(name),
            None => ProcessingOptions::from_raw(
                self.crop,
                self.remove_bg,
                self.resize.as_deref(),
                self.padding,
                self.background.as_deref(),
            ),
        }
    }
}

#[derive(Parser)]
#[command(name = "imager")]
#[command(about = "Batch image processor for product and profile shots")]
#[command(long_about = "\
Batch image processor for product and profile shots

Every image goes through the same optional stages, in this order:

  remove background (-b) → autocrop (-c) → resize + pad (-r, -p) → add background (--background)

Output files are PNG and named after the stages that ran:

  photo.jpg  -c -r 200x200         → photo_c_200x200.png
  cat.png    -b -c -r 320x280 --background whitesmoke
                                   → cat_b_c_320x280_bg.png

Batch layout:

  input/
  ├── a.jpg                        # Processed, then moved to processed/
  └── processed/                   # Created on first run
  output/                          # Created on first run

Run 'imager gen-config' to generate a documented imager.toml.")]
#[command(version)]
struct Cli {
    /// Config file (default: imager.toml in the working directory, if present)
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// More diagnostics on stderr (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Process every image in a directory and archive the inputs
    Batch {
        /// Intake directory
        #[arg(short = 'i', long, default_value = "input")]
        input: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        stages: StageArgs,

        /// Write the run summary as JSON to this file
        #[arg(long, value_name = "FILE")]
        report: Option<PathBuf>,
    },
    /// Process a single image; the input is left where it is
    File {
        /// Image to process
        input: PathBuf,

        /// Output directory
        #[arg(short = 'o', long, default_value = "output")]
        output: PathBuf,

        #[command(flatten)]
        stages: StageArgs,
    },
    /// List the configured presets
    Presets,
    /// Print a stock imager.toml with all options documented
    GenConfig,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    logging::init_tracing(cli.verbose);

    match cli.command {
        Command::Batch {
            input,
            output: output_dir,
            stages,
            report: report_path,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let template = stages.resolve(&config)?;
            let remover = config.build_remover()?;
            let store = FsStore::new();
            let pipeline = Pipeline::new(remover.as_ref(), &store, config.fallback_color()?);
            let batch = BatchConfig::new(input, output_dir)
                .with_archive_dir(config.batch.archive_dir.as_str());

            let (tx, rx) = std::sync::mpsc::channel();
            let printer = std::thread::spawn(move || {
                for event in rx {
                    for line in output::format_batch_event(&event) {
                        println!("{}", line);
                    }
                }
            });
            let result = run_batch(&batch, &template, &pipeline, Some(tx));
            printer
                .join()
                .map_err(|_| "progress printer thread panicked")?;
            let report = result?;

            output::print_batch_summary(&report);
            if let Some(path) = report_path {
                let json = serde_json::to_string_pretty(&report)?;
                std::fs::write(&path, json)?;
            }
        }
        Command::File {
            input,
            output: output_dir,
            stages,
        } => {
            let config = config::load_config(cli.config.as_deref())?;
            let options = stages.resolve(&config)?;
            let remover = config.build_remover()?;
            let store = FsStore::new();
            let pipeline = Pipeline::new(remover.as_ref(), &store, config.fallback_color()?);

            store.ensure_dir(&output_dir)?;
            let outcome = pipeline.run(&options.for_file(&input, &output_dir))?;
            output::print_file_outcome(&outcome);
        }
        Command::Presets => {
            let config = config::load_config(cli.config.as_deref())?;
            output::print_presets(&config.presets);
        }
        Command::GenConfig => {
            print!("{}", config::stock_config_toml());
        }
    }

    Ok(())
}
