use clap::Parser;
use dds_batch::batch::{BatchObserver, ProgressSnapshot};
use dds_batch::{BatchJob, Cascade, ConvertConfig};
use image::RgbaImage;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::debug;
use tracing_subscriber::EnvFilter;

/// Convert every DDS texture under a folder into a 16-bit PNG, mirroring
/// the folder structure.
#[derive(Debug, Parser)]
#[command(name = "dds2png", version, about)]
struct Args {
    /// Folder to scan for .dds files
    source: PathBuf,

    /// Folder that receives the mirrored .png tree
    destination: PathBuf,

    /// texconv executable (name on PATH or full path)
    #[arg(long, default_value = dds_batch::config::DEFAULT_TEXCONV)]
    texconv: PathBuf,

    /// Bounding box for preview thumbnails
    #[arg(long, default_value_t = dds_batch::config::DEFAULT_PREVIEW_SIZE)]
    preview_size: u32,

    /// Print the run summary as JSON when done
    #[arg(long)]
    summary_json: bool,

    /// Log every decoder attempt
    #[arg(short, long)]
    verbose: bool,
}

/// Terminal front end: progress bar plus log lines printed above it.
struct TerminalObserver {
    bar: ProgressBar,
}

impl TerminalObserver {
    fn new() -> Self {
        let bar = ProgressBar::new(0);
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({percent}%) {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("=>-");
        bar.set_style(style);
        Self { bar }
    }

    fn finish(&self) {
        self.bar.finish_and_clear();
    }
}

impl BatchObserver for TerminalObserver {
    fn on_log(&mut self, line: &str) {
        self.bar.println(line);
    }

    fn on_preview(&mut self, source: &Path, thumbnail: &RgbaImage) {
        debug!(
            "Preview {}x{} for {}",
            thumbnail.width(),
            thumbnail.height(),
            source.display()
        );
    }

    fn on_progress(&mut self, snapshot: &ProgressSnapshot) {
        self.bar.set_length(snapshot.total as u64);
        self.bar.set_position(snapshot.processed as u64);
        self.bar.set_message(snapshot.eta_label());
    }
}

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    let config = ConvertConfig::new()
        .with_texconv_program(args.texconv)
        .with_preview_size(args.preview_size);
    let cascade = Cascade::standard(&config);
    debug!("Decoder order: {:?}", cascade.decoder_names());

    let job = BatchJob::new(args.source, args.destination, &cascade, &config);
    let mut observer = TerminalObserver::new();
    let result = job.run(&mut observer);
    observer.finish();

    match result {
        Ok(summary) => {
            if args.summary_json {
                match serde_json::to_string_pretty(&summary) {
                    Ok(json) => println!("{}", json),
                    Err(e) => eprintln!("⚠️  Could not serialize summary: {}", e),
                }
            } else {
                println!(
                    "✅ Converted {} of {} files ({} failed, {} skipped) in {:.2} seconds.",
                    summary.converted,
                    summary.total,
                    summary.failed,
                    summary.skipped,
                    summary.elapsed_secs
                );
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            ExitCode::FAILURE
        }
    }
}
