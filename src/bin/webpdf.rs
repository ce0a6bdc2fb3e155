//! CLI binary for webpdf.
//!
//! A thin shim over the library crate that maps CLI flags onto an
//! `Orchestrator`, runs one submission and performs the requested
//! post-generation actions.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;
use webpdf::{
    CommandPrintHost, ImageCandidate, Orchestrator, Orientation, PageFormat, ProgressCallback,
    Severity, SnapshotConfig, SubmissionProgressCallback, UiStatus, DEFAULT_ENDPOINT,
    DOWNLOAD_FILENAME, MAX_WAIT_MS,
};

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal callback: a percentage bar while the request is in flight and
/// one coloured line per notification.
struct CliProgressCallback {
    bar: ProgressBar,
    quiet: bool,
}

impl CliProgressCallback {
    fn new(show_bar: bool, quiet: bool) -> Arc<Self> {
        let bar = if show_bar {
            ProgressBar::new(100)
        } else {
            ProgressBar::hidden()
        };

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  [{bar:42.green/238}] {pos:>3}%  ⏱ {elapsed_precise}  {msg}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Rendering");

        Arc::new(Self { bar, quiet })
    }
}

impl SubmissionProgressCallback for CliProgressCallback {
    fn on_submit_start(&self, image_count: usize) {
        self.bar.reset();
        self.bar.set_message(if image_count == 0 {
            "just a moment…".to_string()
        } else {
            format!("{image_count} image(s)")
        });
        self.bar.enable_steady_tick(Duration::from_millis(80));
    }

    fn on_progress(&self, percent: u8) {
        self.bar.set_position(u64::from(percent));
    }

    fn on_submit_finish(&self, _succeeded: bool) {
        self.bar.finish_and_clear();
    }

    fn on_notify(&self, status: &UiStatus) {
        if self.quiet && status.severity != Severity::Error {
            return;
        }
        let line = match status.severity {
            Severity::Success => format!("{} {}", green("✔"), status.message),
            Severity::Error => format!("{} {}", red("✘"), red(&status.message)),
            Severity::Neutral => format!("{} {}", cyan("◆"), status.message),
        };
        self.bar.suspend(|| eprintln!("{line}"));
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Snapshot a page into ./webPDF.pdf
  webpdf https://www.rust-lang.org

  # Landscape Letter, wait 5 s for scripts, write to a chosen file
  webpdf https://example.org --format letter --orientation landscape --wait 5000 -o site.pdf

  # Images only
  webpdf --image scan1.png --image scan2.jpg -o scans.pdf

  # Generate and print in one go
  webpdf https://example.org --print

  # Machine-readable result
  webpdf https://example.org --json

PAGE FORMATS:
  Letter   8.5 × 11.0 in      A0  33.1 × 46.8 in      A4   8.3 × 11.7 in
  Legal    8.5 × 14.0 in      A1  23.4 × 33.1 in      A5   5.8 × 8.3 in
  Tabloid 11.0 × 17.0 in      A2  16.5 × 23.4 in      A6   4.1 × 5.8 in
                              A3  11.7 × 16.5 in

LIMITS:
  Images must be image/* files of at most 10 MB each; others are skipped with
  a warning. Wait time is 0–10000 ms. Every page gets a 1 cm margin.

ENVIRONMENT VARIABLES:
  WEBPDF_ENDPOINT   Snapshot service URL
  WEBPDF_OUTPUT     Default output path
  RUST_LOG          Override log filter (e.g. webpdf=debug)
"#;

/// Turn web pages and images into PDFs through a snapshot service.
#[derive(Parser, Debug)]
#[command(
    name = "webpdf",
    version,
    about = "Turn web pages and images into PDFs through a snapshot service",
    long_about = "Send a URL and/or images to a remote snapshot service and save the PDF it \
renders. Page format, orientation, wait time and rendering flags map directly onto the \
service's PDF options.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Page to snapshot (absolute http/https URL). Optional when images are given.
    url: Option<String>,

    /// Image file to include; repeat for several.
    #[arg(short, long = "image", value_name = "PATH")]
    images: Vec<PathBuf>,

    /// Page format.
    #[arg(long, env = "WEBPDF_FORMAT", value_enum, default_value = "a4")]
    format: FormatArg,

    /// Page orientation.
    #[arg(long, env = "WEBPDF_ORIENTATION", value_enum, default_value = "portrait")]
    orientation: OrientationArg,

    /// Milliseconds the service waits after page load before rendering.
    #[arg(long, env = "WEBPDF_WAIT", default_value_t = 2000,
          value_parser = clap::value_parser!(u32).range(0..=MAX_WAIT_MS as i64))]
    wait: u32,

    /// Do not render CSS backgrounds.
    #[arg(long, env = "WEBPDF_NO_BACKGROUND")]
    no_background: bool,

    /// Render the header/footer (date, title, URL, page numbers).
    #[arg(long, env = "WEBPDF_HEADER_FOOTER")]
    header_footer: bool,

    /// Output file or directory (a directory receives webPDF.pdf).
    #[arg(short, long, env = "WEBPDF_OUTPUT", default_value = ".")]
    output: PathBuf,

    /// Snapshot service endpoint.
    #[arg(long, env = "WEBPDF_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    endpoint: String,

    /// Request timeout in seconds.
    #[arg(long, env = "WEBPDF_TIMEOUT", default_value_t = 120)]
    timeout: u64,

    /// Send the PDF to the printer after saving it.
    #[arg(long)]
    print: bool,

    /// Command used for printing; receives the PDF path as last argument.
    #[arg(long, env = "WEBPDF_PRINTER_CMD", default_value = "lp")]
    printer_cmd: String,

    /// Print the artifact metadata and skipped images as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "WEBPDF_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "WEBPDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "WEBPDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum FormatArg {
    Letter,
    Legal,
    Tabloid,
    A0,
    A1,
    A2,
    A3,
    A4,
    A5,
    A6,
}

impl From<FormatArg> for PageFormat {
    fn from(v: FormatArg) -> Self {
        match v {
            FormatArg::Letter => PageFormat::Letter,
            FormatArg::Legal => PageFormat::Legal,
            FormatArg::Tabloid => PageFormat::Tabloid,
            FormatArg::A0 => PageFormat::A0,
            FormatArg::A1 => PageFormat::A1,
            FormatArg::A2 => PageFormat::A2,
            FormatArg::A3 => PageFormat::A3,
            FormatArg::A4 => PageFormat::A4,
            FormatArg::A5 => PageFormat::A5,
            FormatArg::A6 => PageFormat::A6,
        }
    }
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum OrientationArg {
    Portrait,
    Landscape,
}

impl From<OrientationArg> for Orientation {
    fn from(v: OrientationArg) -> Self {
        match v {
            OrientationArg::Portrait => Orientation::Portrait,
            OrientationArg::Landscape => Orientation::Landscape,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar and status lines provide all the feedback that matters.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build session ────────────────────────────────────────────────────
    let config = SnapshotConfig::builder()
        .endpoint(cli.endpoint.clone())
        .request_timeout_secs(cli.timeout)
        .build()
        .context("Invalid configuration")?;

    let callback: ProgressCallback = CliProgressCallback::new(show_progress, cli.quiet);
    let mut session = Orchestrator::from_config(config)
        .context("Failed to initialise HTTP client")?
        .with_callback(callback);

    session.set_url(cli.url.clone().unwrap_or_default());
    {
        let options = session.options_mut();
        options.format = cli.format.into();
        options.orientation = cli.orientation.into();
        options.set_wait_ms(cli.wait);
        options.print_background = !cli.no_background;
        options.display_header_footer = cli.header_footer;
    }

    let mut rejected = Vec::new();
    if !cli.images.is_empty() {
        let candidates = cli.images.iter().map(ImageCandidate::from_path).collect();
        rejected = session.add_images(candidates).await;
        if !cli.quiet {
            eprintln!(
                "{} {}/{} images accepted",
                cyan("◆"),
                bold(&session.form().images.len().to_string()),
                cli.images.len()
            );
        }
        if !rejected.is_empty() && session.form().images.is_empty() && cli.url.is_none() {
            anyhow::bail!("None of the {} images could be used", rejected.len());
        }
    }

    if !cli.quiet {
        eprintln!(
            "{} {} {}",
            cyan("◆"),
            bold(&format!(
                "{} {}",
                session.form().options.format,
                session.form().options.orientation
            )),
            dim(&format!("({})", session.size_hint()))
        );
    }

    // ── Generate ─────────────────────────────────────────────────────────
    let info = session.submit().await.context("PDF generation failed")?;

    // ── Post-generation actions ──────────────────────────────────────────
    // Each action is attempted even if an earlier one failed.
    let mut failures = 0usize;

    match session.download(&cli.output).await {
        Ok(path) => {
            if cli.json {
                let mut saved = info.clone();
                saved.path = path.clone();
                let report = serde_json::json!({
                    "artifact": saved,
                    "rejected": rejected,
                });
                println!(
                    "{}",
                    serde_json::to_string_pretty(&report).context("Failed to serialise output")?
                );
            }
            if !cli.quiet {
                eprintln!(
                    "   {}  →  {}",
                    dim(&session.info_line().unwrap_or_default()),
                    bold(&path.display().to_string())
                );
            }
        }
        Err(e) => {
            failures += 1;
            tracing::error!("Saving {} failed: {}", DOWNLOAD_FILENAME, e);
        }
    }

    if cli.print {
        let host = CommandPrintHost::new(cli.printer_cmd.clone());
        match session.print(&host).await {
            Ok(()) => {
                if !cli.quiet {
                    eprintln!("{} Sent to '{}'", green("✔"), cli.printer_cmd);
                }
            }
            Err(e) => {
                failures += 1;
                tracing::error!("Printing failed: {}", e);
            }
        }
    }

    if failures > 0 {
        anyhow::bail!("{failures} post-generation action(s) failed");
    }
    Ok(())
}
