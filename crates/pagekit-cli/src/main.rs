use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand, ValueEnum};
use pagekit_nup::{CancelFlag, NUpOptions, NUpOutcome, ProgressSink, SourceFile};
use pagekit_toc::{TocFont, TocOptions, generate_table_of_contents};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "pagekit", about = "PDF page-layout tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Lay out several source pages per output sheet
    Nup {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file (defaults to <input>_<n>-up.pdf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pages per sheet (2, 4, 9 or 16)
        #[arg(long, default_value = "4")]
        pages: u32,

        /// Output paper size
        #[arg(long, default_value = "a4", value_enum)]
        paper: PaperArg,

        /// Output orientation
        #[arg(long, default_value = "auto", value_enum)]
        orientation: OrientationArg,

        /// Disable the outer margin and cell gutters
        #[arg(long)]
        no_margins: bool,

        /// Draw a border around each placed page
        #[arg(long)]
        border: bool,

        /// Border color as #RRGGBB
        #[arg(long, default_value = "#000000")]
        border_color: String,

        /// Load options from a JSON config instead of the layout flags
        #[arg(long)]
        config: Option<PathBuf>,
    },

    /// Generate a clickable table of contents from bookmarks
    Toc {
        /// Input PDF file
        #[arg(short, long)]
        input: PathBuf,

        /// Output PDF file
        #[arg(short, long)]
        output: PathBuf,

        /// Heading for the contents page
        #[arg(long, default_value = "Table of Contents")]
        title: String,

        /// Entry font size in points
        #[arg(long, default_value = "12.0")]
        font_size: f32,

        /// Contents page font
        #[arg(long, default_value = "helvetica", value_enum)]
        font: FontArg,

        /// Skip the bookmark pointing at the contents page
        #[arg(long)]
        no_bookmark: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum PaperArg {
    A4,
    Letter,
    Legal,
    A3,
}

impl From<PaperArg> for pagekit_nup::PaperSize {
    fn from(arg: PaperArg) -> Self {
        match arg {
            PaperArg::A4 => Self::A4,
            PaperArg::Letter => Self::Letter,
            PaperArg::Legal => Self::Legal,
            PaperArg::A3 => Self::A3,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum OrientationArg {
    Portrait,
    Landscape,
    Auto,
}

impl From<OrientationArg> for pagekit_nup::Orientation {
    fn from(arg: OrientationArg) -> Self {
        match arg {
            OrientationArg::Portrait => Self::Portrait,
            OrientationArg::Landscape => Self::Landscape,
            OrientationArg::Auto => Self::Auto,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum FontArg {
    Times,
    Helvetica,
    Courier,
}

impl From<FontArg> for TocFont {
    fn from(arg: FontArg) -> Self {
        match arg {
            FontArg::Times => Self::Times,
            FontArg::Helvetica => Self::Helvetica,
            FontArg::Courier => Self::Courier,
        }
    }
}

fn print_progress(percent: f32, message: &str) {
    println!("[{percent:>3.0}%] {message}");
}

async fn read_source(path: &Path) -> Result<SourceFile> {
    let bytes = tokio::fs::read(path)
        .await
        .with_context(|| format!("failed to read {}", path.display()))?;
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "input.pdf".to_string());
    Ok(SourceFile::new(name, bytes))
}

async fn run_nup(
    input: PathBuf,
    output: Option<PathBuf>,
    options: NUpOptions,
) -> Result<()> {
    let source = read_source(&input).await?;

    // Ctrl-C flips the cancel flag; the pipeline stops at its next poll
    let cancel = CancelFlag::new();
    let signal_cancel = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            eprintln!("cancelling...");
            signal_cancel.cancel();
        }
    });

    let progress = ProgressSink::new(print_progress);
    let outcome = pagekit_nup::process(vec![source], &options, progress, cancel)
        .await
        .map_err(|err| anyhow::anyhow!("{} ({:?})", err, err.code()))?;

    let artifact = match outcome {
        NUpOutcome::Complete(artifact) => artifact,
        NUpOutcome::Cancelled => {
            println!("Cancelled; no output written.");
            return Ok(());
        }
    };

    // The artifact already carries the derived _<n>-up.pdf name
    let output_path = output.unwrap_or_else(|| input.with_file_name(&artifact.filename));
    tokio::fs::write(&output_path, &artifact.bytes)
        .await
        .with_context(|| format!("failed to write {}", output_path.display()))?;

    println!(
        "{} pages -> {} sheets ({} per sheet) -> {}",
        artifact.metadata.original_page_count,
        artifact.metadata.output_sheet_count,
        artifact.metadata.pages_per_sheet,
        output_path.display()
    );
    Ok(())
}

async fn run_toc(
    input: PathBuf,
    output: PathBuf,
    options: TocOptions,
) -> Result<()> {
    let source = read_source(&input).await?;
    let bytes = generate_table_of_contents(source.bytes, &options, print_progress).await?;

    tokio::fs::write(&output, &bytes)
        .await
        .with_context(|| format!("failed to write {}", output.display()))?;
    println!("Contents added -> {}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        Commands::Nup {
            input,
            output,
            pages,
            paper,
            orientation,
            no_margins,
            border,
            border_color,
            config,
        } => {
            let options = match config {
                Some(path) => NUpOptions::load(&path)
                    .await
                    .map_err(|err| anyhow::anyhow!("{err}"))?,
                None => NUpOptions {
                    pages_per_sheet: pagekit_nup::PagesPerSheet::try_from(pages)
                        .map_err(|err| anyhow::anyhow!("{err}"))?,
                    paper_size: paper.into(),
                    orientation: orientation.into(),
                    use_margins: !no_margins,
                    add_border: border,
                    border_color,
                },
            };
            run_nup(input, output, options).await
        }

        Commands::Toc {
            input,
            output,
            title,
            font_size,
            font,
            no_bookmark,
        } => {
            if font_size <= 0.0 {
                bail!("font size must be positive");
            }
            let options = TocOptions {
                title,
                font_size,
                font: font.into(),
                add_bookmark: !no_bookmark,
            };
            run_toc(input, output, options).await
        }
    }
}
