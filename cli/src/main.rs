//! docblocks CLI - OCR detection structuring tool

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use clap::{Parser, Subcommand};
use colored::Colorize;

use docblocks::{
    Detection, Error, JsonFormat, PageInput, PageResult, PipelineOptions,
    process_detections_with_options,
};

#[derive(Parser)]
#[command(name = "docblocks")]
#[command(author = "iyulab")]
#[command(version)]
#[command(about = "Structure OCR detections into blocks, sections, and hierarchy", long_about = None)]
struct Cli {
    /// Input detections JSON file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output file (stdout if not specified)
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,

    /// Skip block merging (one block per detection)
    #[arg(long)]
    no_merge: bool,

    /// Merge distance threshold in pixels (1-100)
    #[arg(long, default_value = "30")]
    merge_threshold: u32,

    /// Group blocks into header/body/footer sections
    #[arg(short, long)]
    sections: bool,

    /// Build the containment hierarchy
    #[arg(long)]
    hierarchy: bool,

    /// Page height in pixels (overrides the input file value)
    #[arg(long)]
    page_height: Option<f32>,

    /// Abort if processing exceeds this many milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show a summary of an input file without writing output
    Info {
        /// Input detections JSON file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            if let Some(input) = cli.input {
                cmd_process(
                    &input,
                    cli.output.as_deref(),
                    &ProcessArgs {
                        no_merge: cli.no_merge,
                        merge_threshold: cli.merge_threshold,
                        sections: cli.sections,
                        hierarchy: cli.hierarchy,
                        page_height: cli.page_height,
                        timeout_ms: cli.timeout_ms,
                        compact: cli.compact,
                    },
                )
            } else {
                println!("{}", "Usage: docblocks <FILE> [-o OUTPUT]".yellow());
                println!("       docblocks --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

struct ProcessArgs {
    no_merge: bool,
    merge_threshold: u32,
    sections: bool,
    hierarchy: bool,
    page_height: Option<f32>,
    timeout_ms: Option<u64>,
    compact: bool,
}

fn cmd_process(
    input: &Path,
    output: Option<&Path>,
    args: &ProcessArgs,
) -> Result<(), Box<dyn std::error::Error>> {
    let page = read_page_input(input)?;

    let mut options = PipelineOptions::new()
        .with_merging(!args.no_merge)
        .with_merge_threshold(args.merge_threshold);
    if args.sections {
        options = options.with_sections();
    }
    if args.hierarchy {
        options = options.with_hierarchy();
    }
    if let Some(ms) = args.timeout_ms {
        options = options.with_deadline(Instant::now() + Duration::from_millis(ms));
    }

    let page_height = args.page_height.or(page.page_height);
    let result = process_detections_with_options(&page.detections, page_height, &options)?;

    report_warnings(&result);

    let format = if args.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };
    let json = docblocks::render::to_json(&result, format)?;

    if let Some(path) = output {
        fs::write(path, &json)?;
        println!(
            "{} {} ({} detections -> {} blocks)",
            "Saved to".green(),
            path.display(),
            page.detections.len(),
            result.total_blocks
        );
    } else {
        println!("{}", json);
    }

    Ok(())
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let page = read_page_input(input)?;

    println!("{}", "Input file:".green().bold());
    println!("  {} {}", "detections:".dimmed(), page.detections.len());
    if let Some(w) = page.page_width {
        println!("  {} {}", "page width:".dimmed(), w);
    }
    if let Some(h) = page.page_height {
        println!("  {} {}", "page height:".dimmed(), h);
    }

    if !page.detections.is_empty() {
        let mean = page.detections.iter().map(|d| d.confidence).sum::<f32>()
            / page.detections.len() as f32;
        println!("  {} {:.3}", "mean confidence:".dimmed(), mean);
    }

    Ok(())
}

fn cmd_version() {
    println!("docblocks {}", env!("CARGO_PKG_VERSION"));
}

/// Read a detections file. Accepts either the page envelope with
/// `detections` (and optional page dimensions) or a bare detection array.
fn read_page_input(path: &Path) -> Result<PageInput, Error> {
    let content = fs::read_to_string(path)?;

    if let Ok(page) = serde_json::from_str::<PageInput>(&content) {
        return Ok(page);
    }
    match serde_json::from_str::<Vec<Detection>>(&content) {
        Ok(detections) => Ok(PageInput {
            page_width: None,
            page_height: None,
            detections,
        }),
        Err(e) => Err(Error::Detections(format!(
            "{}: {}",
            path.display(),
            e
        ))),
    }
}

fn report_warnings(result: &PageResult) {
    for warning in &result.warnings {
        match warning.detection_index {
            Some(i) => eprintln!(
                "{}: {} (detection {})",
                "Warning".yellow().bold(),
                warning.message,
                i
            ),
            None => eprintln!("{}: {}", "Warning".yellow().bold(), warning.message),
        }
    }
}
