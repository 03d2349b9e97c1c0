//! CLI binary for pdftext2md.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `ConversionConfig` and prints the result. `pdf2md <pdf>` and
//! `pdf2md convert <pdf>` are the same command.

use anyhow::{Context, Result};
use clap::builder::FalseyValueParser;
use clap::{Args, Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use pdftext2md::config::{
    DEFAULT_ASSETS_DIR, DEFAULT_IMAGE_TIMEOUT_SECS, DEFAULT_IMAGE_TOOL, DEFAULT_OUTPUT,
};
use pdftext2md::{
    ConversionConfig, ConversionProgressCallback, ConversionStage, Converter, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that shows the current stage and prints one line per finished stage.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        let style = ProgressStyle::with_template("{spinner:.cyan} {msg}  {elapsed:.dim}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(style);
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self { bar })
    }
}

impl ConversionProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: ConversionStage) {
        self.bar.set_message(format!("{stage}…"));
    }

    fn on_stage_complete(&self, stage: ConversionStage) {
        self.bar.println(format!("  {} {}", green("✓"), dim(stage.label())));
    }

    fn on_stage_error(&self, stage: ConversionStage, _error: &str) {
        self.bar.println(format!("  {} {}", red("✗"), stage.label()));
        self.bar.finish_and_clear();
    }

    fn on_conversion_complete(&self, _image_count: usize, _markdown_len: usize) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert with defaults (output.md + assets/)
  pdf2md document.pdf

  # Choose output file and image directory
  pdf2md convert sample.pdf -o result.md -a images

  # Encrypted PDF, tighter subprocess timeout
  pdf2md --password secret --image-timeout 60 report.pdf

  # Machine-readable summary
  pdf2md --json --quiet paper.pdf > report.json

REQUIREMENTS:
  pdfcpu           must be on PATH (or pass --image-tool)
  libpdfium        PDFIUM_LIB_PATH, ./libpdfium.*, or a system install

ENVIRONMENT VARIABLES:
  PDFIUM_LIB_PATH        Path to the pdfium shared library
  PDF2MD_IMAGE_TOOL      Image-extraction executable (default: pdfcpu)
  RUST_LOG               Overrides the log filter, e.g. RUST_LOG=pdftext2md=debug
"#;

/// Convert a PDF into Markdown text plus extracted images.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2md",
    version,
    about = "Convert PDF files to Markdown format",
    long_about = "pdf2md extracts text and images from a PDF file and writes a Markdown (.md) \
file whose body is the PDF text, followed by references to the extracted images.",
    arg_required_else_help = true,
    subcommand_negates_reqs = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,

    #[command(flatten)]
    input: InputArg,

    #[command(flatten)]
    options: ConvertOptions,
}

impl Cli {
    /// The input path, whichever form named it.
    fn input(&self) -> Option<&PathBuf> {
        match &self.command {
            Some(Command::Convert(arg)) => arg.input.as_ref(),
            None => self.input.input.as_ref(),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Convert a PDF file to Markdown (same as the bare form).
    Convert(InputArg),
}

#[derive(Args, Debug)]
struct InputArg {
    /// PDF file to convert.
    #[arg(required = true)]
    input: Option<PathBuf>,
}

/// Options shared by the bare form and `convert`; accepted on either side
/// of the subcommand name.
#[derive(Args, Debug)]
struct ConvertOptions {
    /// Output Markdown file.
    #[arg(short, long, global = true, env = "PDF2MD_OUTPUT", default_value = DEFAULT_OUTPUT)]
    output: PathBuf,

    /// Directory to save extracted images.
    #[arg(short, long, global = true, env = "PDF2MD_ASSETS", default_value = DEFAULT_ASSETS_DIR)]
    assets: PathBuf,

    /// Image-extraction executable.
    #[arg(long, global = true, env = "PDF2MD_IMAGE_TOOL", default_value = DEFAULT_IMAGE_TOOL)]
    image_tool: String,

    /// Extra argument for the image tool, placed before `extract` (repeatable).
    #[arg(
        long = "image-tool-arg",
        global = true,
        value_name = "ARG",
        allow_hyphen_values = true
    )]
    image_tool_args: Vec<String>,

    /// Seconds before the image tool is killed.
    #[arg(long, global = true, env = "PDF2MD_IMAGE_TIMEOUT", default_value_t = DEFAULT_IMAGE_TIMEOUT_SECS,
          value_parser = clap::value_parser!(u64).range(1..))]
    image_timeout: u64,

    /// PDF user password for encrypted documents.
    #[arg(long, global = true, env = "PDF2MD_PASSWORD")]
    password: Option<String>,

    // Boolean env vars accept 1/0, yes/no, on/off, true/false.
    /// Fail if the PDF has no text layer.
    #[arg(long, global = true, env = "PDF2MD_REQUIRE_TEXT", value_parser = FalseyValueParser::new())]
    require_text: bool,

    /// Print the conversion report as JSON on stdout.
    #[arg(long, global = true, env = "PDF2MD_JSON", value_parser = FalseyValueParser::new())]
    json: bool,

    /// Disable the progress spinner.
    #[arg(long, global = true, env = "PDF2MD_NO_PROGRESS", value_parser = FalseyValueParser::new())]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, global = true, env = "PDF2MD_VERBOSE", value_parser = FalseyValueParser::new())]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, global = true, env = "PDF2MD_QUIET", value_parser = FalseyValueParser::new())]
    quiet: bool,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let args = &cli.options;

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner owns the terminal while it runs, so library INFO logs are
    // hidden unless --verbose is given.
    let show_progress = !args.quiet && !args.no_progress && !args.json;
    let filter = if args.verbose {
        "debug"
    } else if args.quiet || show_progress {
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

    let input = cli.input().cloned().context("Missing input PDF path")?;

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn ConversionProgressCallback>)
    } else {
        None
    };
    let config = build_config(args, progress_cb)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let report = Converter::new(config)
        .run(&input)
        .await
        .context("Conversion failed")?;

    if args.json {
        println!(
            "{}",
            serde_json::to_string_pretty(&report).context("Failed to serialise report")?
        );
    } else if !args.quiet {
        println!(
            "Conversion completed. Markdown saved to {} with images in {}/",
            report.output.display(),
            report.assets_dir.display()
        );
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(args: &ConvertOptions, progress: Option<ProgressCallback>) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .output(&args.output)
        .assets(&args.assets)
        .image_tool(&args.image_tool)
        .image_tool_args(args.image_tool_args.iter().cloned())
        .image_timeout_secs(args.image_timeout)
        .require_text(args.require_text);

    if let Some(ref pwd) = args.password {
        builder = builder.password(pwd);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{CommandFactory, FromArgMatches};

    fn parse(argv: &[&str]) -> Cli {
        Cli::try_parse_from(argv).expect("valid arguments")
    }

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn bare_form_uses_defaults() {
        let cli = parse(&["pdf2md", "doc.pdf"]);
        assert_eq!(cli.input(), Some(&PathBuf::from("doc.pdf")));
        assert_eq!(cli.options.output, PathBuf::from("output.md"));
        assert_eq!(cli.options.assets, PathBuf::from("assets"));
        assert_eq!(cli.options.image_tool, "pdfcpu");
        assert_eq!(cli.options.image_timeout, 300);
    }

    #[test]
    fn subcommand_and_bare_form_agree() {
        let a = parse(&["pdf2md", "sample.pdf", "-o", "out.md", "-a", "pics"]);
        let b = parse(&["pdf2md", "convert", "sample.pdf", "-o", "out.md", "-a", "pics"]);
        assert_eq!(a.input(), b.input());
        assert_eq!(a.options.output, b.options.output);
        assert_eq!(a.options.assets, b.options.assets);
    }

    #[test]
    fn options_may_precede_the_subcommand() {
        let cli = parse(&["pdf2md", "-o", "out.md", "-a", "pics", "convert", "a.pdf"]);
        assert!(matches!(cli.command, Some(Command::Convert(_))));
        assert_eq!(cli.input(), Some(&PathBuf::from("a.pdf")));
        assert_eq!(cli.options.output, PathBuf::from("out.md"));
        assert_eq!(cli.options.assets, PathBuf::from("pics"));

        let cli = parse(&["pdf2md", "--json", "convert", "a.pdf", "--require-text"]);
        assert!(cli.options.json);
        assert!(cli.options.require_text);
    }

    #[test]
    fn subcommand_requires_input() {
        assert!(Cli::try_parse_from(["pdf2md", "convert"]).is_err());
    }

    #[test]
    fn zero_timeout_is_rejected() {
        assert!(Cli::try_parse_from(["pdf2md", "doc.pdf", "--image-timeout", "0"]).is_err());
    }

    #[test]
    fn boolean_env_values_are_accepted() {
        // Private variable names keep this test independent of the real ones.
        std::env::set_var("PDF2MD_TEST_JSON_ON", "1");
        std::env::set_var("PDF2MD_TEST_QUIET_OFF", "0");
        let cmd = Cli::command()
            .mut_arg("json", |a| a.env("PDF2MD_TEST_JSON_ON"))
            .mut_arg("quiet", |a| a.env("PDF2MD_TEST_QUIET_OFF"));

        let matches = cmd.try_get_matches_from(["pdf2md", "doc.pdf"]).unwrap();
        let cli = Cli::from_arg_matches(&matches).unwrap();

        assert!(cli.options.json);
        assert!(!cli.options.quiet);
    }

    #[test]
    fn build_config_maps_flags() {
        let cli = parse(&[
            "pdf2md",
            "doc.pdf",
            "--image-tool",
            "/usr/local/bin/pdfcpu",
            "--image-tool-arg",
            "-q",
            "--password",
            "pw",
            "--require-text",
        ]);
        let config = build_config(&cli.options, None).unwrap();
        assert_eq!(config.image_tool, "/usr/local/bin/pdfcpu");
        assert_eq!(config.image_tool_args, vec!["-q".to_string()]);
        assert_eq!(config.password.as_deref(), Some("pw"));
        assert!(config.require_text);
    }
}
