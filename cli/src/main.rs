//! docfuse CLI - document reconstruction tool

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docfuse::{
    BlockKind, GarbageConfig, Origin, RawDocument, Reconstructor, StyleSpan, TableCell,
};

#[derive(Parser)]
#[command(name = "docfuse")]
#[command(version)]
#[command(about = "Reconstruct documents from layout extractor output", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconstruct a document from raw extractor JSON
    Reconstruct {
        /// Input layout JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Style span JSON file (array of spans)
        #[arg(long, value_name = "FILE")]
        spans: Option<PathBuf>,

        /// Table cell JSON file (array of cell sets, one per table)
        #[arg(long, value_name = "FILE")]
        tables: Option<PathBuf>,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Coordinate origin of the input
        #[arg(long, value_enum, default_value = "auto")]
        origin: OriginArg,

        /// Span/block overlap ratio required for style fusion (0.0-1.0)
        #[arg(long, default_value = "0.5")]
        overlap_threshold: f32,
    },

    /// Judge whether an extracted text file is garbage output
    Check {
        /// Extracted text file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Minimum plausible character count
        #[arg(long, default_value = "50")]
        min_chars: usize,
    },

    /// Show layout document information
    Info {
        /// Input layout JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

#[derive(Copy, Clone, PartialEq, Eq, ValueEnum)]
enum OriginArg {
    /// Detect the origin from coordinate trends
    Auto,
    /// Force top-left origin (Y grows downward)
    TopLeft,
    /// Force bottom-left origin (Y grows upward)
    BottomLeft,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Reconstruct {
            input,
            spans,
            tables,
            output,
            compact,
            origin,
            overlap_threshold,
        } => cmd_reconstruct(
            &input,
            spans.as_deref(),
            tables.as_deref(),
            output.as_deref(),
            compact,
            origin,
            overlap_threshold,
        ),
        Commands::Check { input, min_chars } => cmd_check(&input, min_chars),
        Commands::Info { input } => cmd_info(&input),
        Commands::Version => {
            cmd_version();
            Ok(())
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn cmd_reconstruct(
    input: &Path,
    spans: Option<&Path>,
    tables: Option<&Path>,
    output: Option<&Path>,
    compact: bool,
    origin: OriginArg,
    overlap_threshold: f32,
) -> Result<(), Box<dyn std::error::Error>> {
    let pb = ProgressBar::new(3);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {msg}")
            .unwrap()
            .progress_chars("#>-"),
    );

    pb.set_message("Loading inputs...");
    let raw = RawDocument::from_json(&fs::read_to_string(input)?)?;

    let spans: Vec<StyleSpan> = match spans {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    let tables: Vec<Vec<TableCell>> = match tables {
        Some(path) => serde_json::from_str(&fs::read_to_string(path)?)?,
        None => Vec::new(),
    };
    pb.inc(1);

    pb.set_message("Reconstructing...");
    let mut reconstructor = Reconstructor::new().with_overlap_threshold(overlap_threshold);
    reconstructor = match origin {
        OriginArg::Auto => reconstructor,
        OriginArg::TopLeft => reconstructor.with_origin(Origin::TopLeft),
        OriginArg::BottomLeft => reconstructor.with_origin(Origin::BottomLeft),
    };
    let doc = reconstructor.reconstruct(&raw, &spans, &tables)?;
    log::info!(
        "reconstructed {} block(s) and {} table(s) across {} page(s)",
        doc.blocks.len(),
        doc.tables.len(),
        doc.pages.len()
    );
    pb.inc(1);

    pb.set_message("Writing output...");
    let json = doc.to_json(!compact)?;
    if let Some(path) = output {
        fs::write(path, &json)?;
        pb.inc(1);
        pb.finish_with_message("Done!");
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        pb.inc(1);
        pb.finish_and_clear();
        println!("{}", json);
    }

    let anomalies = doc.anomaly_count();
    if anomalies > 0 {
        eprintln!(
            "{} {} block(s) flagged out of page bounds",
            "Warning:".yellow().bold(),
            anomalies
        );
    }

    Ok(())
}

fn cmd_check(input: &Path, min_chars: usize) -> Result<(), Box<dyn std::error::Error>> {
    let text = fs::read_to_string(input)?;
    let config = GarbageConfig::new().with_min_chars(min_chars);

    if config.is_garbage(&text) {
        println!(
            "{} {} looks like garbage extraction output",
            "Garbage:".red().bold(),
            input.display()
        );
        std::process::exit(1);
    }

    println!(
        "{} {} looks like real extracted text",
        "OK:".green().bold(),
        input.display()
    );
    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let raw = RawDocument::from_json(&fs::read_to_string(input)?)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: {}", "Pages".bold(), raw.page_count());
    println!("{}: {}", "Blocks".bold(), raw.blocks.len());

    let mut text_blocks = 0;
    let mut titles = 0;
    let mut table_blocks = 0;
    let mut figures = 0;
    for block in &raw.blocks {
        match block.kind.kind() {
            BlockKind::Text => text_blocks += 1,
            BlockKind::Title => titles += 1,
            BlockKind::Table => table_blocks += 1,
            BlockKind::Figure => figures += 1,
            BlockKind::Unknown => {}
        }
    }

    println!();
    println!("{}", "Content Statistics".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    let text = raw.plain_text();
    println!("{}: {}", "Words".bold(), text.split_whitespace().count());
    println!("{}: {}", "Characters".bold(), text.chars().count());
    println!("{}: {}", "Text blocks".bold(), text_blocks);
    println!("{}: {}", "Titles".bold(), titles);
    println!("{}: {}", "Tables".bold(), table_blocks);
    println!("{}: {}", "Figures".bold(), figures);

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "docfuse".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("Document reconstruction tool");
    println!();
    println!("License: MIT");
}
