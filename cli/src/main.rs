//! relayout CLI - PDF page layout reconstruction tool

use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use relayout::{
    ConvertOptions, ConvertResult, Converter, DocumentSource, ExtractOptions, PageSelection,
    PdfSource, RenderOptions,
};

#[derive(Parser)]
#[command(name = "relayout")]
#[command(version)]
#[command(about = "Rebuild PDF page layouts as HTML with JPEG and SVG assets", long_about = None)]
struct Cli {
    /// Input PDF file
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Folder in which the `{name}/` output folder is created
    #[arg(value_name = "OUTPUT_ROOT")]
    output: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a PDF to HTML plus assets
    Convert {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Folder in which the `{name}/` output folder is created
        #[arg(short, long, value_name = "DIR")]
        output: Option<PathBuf>,

        /// Vertical distance within which text runs join one line
        #[arg(long, default_value_t = relayout::extract::DEFAULT_Y_TOLERANCE)]
        tolerance: f32,

        /// Page range (e.g., "1-10", "1,3,5")
        #[arg(long)]
        pages: Option<String>,

        /// Skip undecodable images and pages instead of failing
        #[arg(long)]
        lenient: bool,

        /// Do not export raster images
        #[arg(long)]
        no_images: bool,

        /// Do not export vector drawings
        #[arg(long)]
        no_vectors: bool,

        /// Also write the element model as `{name}.json`
        #[arg(long)]
        json: bool,

        /// CSS font-family for text elements
        #[arg(long)]
        font_family: Option<String>,
    },

    /// Show document information
    Info {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,
    },

    /// Show version information
    Version,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("LOG_LEVEL", "warn"))
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Convert {
            input,
            output,
            tolerance,
            pages,
            lenient,
            no_images,
            no_vectors,
            json,
            font_family,
        }) => build_options(
            tolerance,
            pages.as_deref(),
            lenient,
            !no_images,
            !no_vectors,
            json,
            font_family,
        )
        .and_then(|options| cmd_convert(&input, output.as_deref(), options)),
        Some(Commands::Info { input }) => cmd_info(&input),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: convert if input is provided
            if let Some(input) = cli.input {
                cmd_convert(&input, cli.output.as_deref(), ConvertOptions::default())
            } else {
                println!("{}", "Usage: relayout <FILE> [OUTPUT_ROOT]".yellow());
                println!("       relayout --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn build_options(
    tolerance: f32,
    pages: Option<&str>,
    lenient: bool,
    images: bool,
    vectors: bool,
    json: bool,
    font_family: Option<String>,
) -> Result<ConvertOptions, Box<dyn std::error::Error>> {
    let page_selection = match pages {
        Some(p) => PageSelection::parse(p)?,
        None => PageSelection::All,
    };

    let mut extract = ExtractOptions::new()
        .with_tolerance(tolerance)
        .with_pages(page_selection)
        .with_images(images)
        .with_vectors(vectors);
    if lenient {
        extract = extract.lenient();
    }

    let mut render = RenderOptions::new();
    if let Some(family) = font_family {
        render = render.with_font_family(family);
    }

    Ok(ConvertOptions::new()
        .with_extract_options(extract)
        .with_render_options(render)
        .with_json(json))
}

fn cmd_convert(
    input: &Path,
    output_root: Option<&Path>,
    options: ConvertOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_root = output_root
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));
    log::debug!(
        "converting {} into {} (tolerance {})",
        input.display(),
        output_root.display(),
        options.extract.y_tolerance
    );

    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(format!("Converting {}...", input.display()));

    let result = Converter::new(options).convert_file(input, &output_root);
    match result {
        Ok(result) => {
            pb.finish_with_message("Done!");
            print_summary(&result);
            Ok(())
        }
        Err(e) => {
            pb.finish_and_clear();
            Err(e.into())
        }
    }
}

fn print_summary(result: &ConvertResult) {
    let stats = &result.stats;

    println!("\n{}", "Output:".green().bold());
    println!("  {} {}", "├─".dimmed(), result.output_dir.display());
    println!("  {} {}", "├─".dimmed(), result.html_path.display());
    if let Some(ref json) = result.json_path {
        println!("  {} {}", "├─".dimmed(), json.display());
    }
    println!(
        "  {} {} images, {} vectors",
        "└─".dimmed(),
        stats.image_count,
        stats.vector_count
    );

    println!();
    println!("{}: {}", "Pages".bold(), stats.page_count);
    println!("{}: {}", "Text elements".bold(), stats.text_count);
    println!("{}: {}", "Words".bold(), stats.word_count);
}

fn cmd_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let source = PdfSource::open(input)?;

    println!("{}", "Document Information".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    println!("{}: {}", "File".bold(), input.display());
    println!("{}: PDF {}", "Format".bold(), source.version());
    println!("{}: {}", "Pages".bold(), source.page_count());

    println!();
    println!("{}", "Page Content".cyan().bold());
    println!("{}", "─".repeat(40).dimmed());

    for index in 0..source.page_count() {
        match source.load_page(index) {
            Ok(page) => {
                let text = page.blocks.iter().filter(|b| b.is_text()).count();
                let vectors = page.blocks.len() - text;
                println!(
                    "{} {}: {} text blocks, {} vector blocks, {} images",
                    "Page".bold(),
                    index + 1,
                    text,
                    vectors,
                    page.images.len()
                );
            }
            Err(e) => println!("{} {}: {}", "Page".bold(), index + 1, e.to_string().red()),
        }
    }

    Ok(())
}

fn cmd_version() {
    println!("{} {}", "relayout".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("PDF page layout reconstruction tool");
}
