//! labeltrack CLI
//!
//! Batch front end for the label pipeline: feed it photos of shipping
//! labels, collect the corrected tracking numbers, and optionally export
//! them to a text file, one per line.

use std::collections::HashSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use core_pipeline::{compute_image_hash, LabelConfig, LabelPipeline, LabelScan};
use walkdir::WalkDir;

#[allow(dead_code)]
mod built_info {
    include!(concat!(env!("OUT_DIR"), "/built.rs"));
}

const IMAGE_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "bmp", "tif", "tiff"];

fn long_version() -> &'static str {
    Box::leak(
        format!(
            "{} ({}, built {} on {})",
            built_info::PKG_VERSION,
            built_info::RUSTC_VERSION,
            env!("BUILT_TIME_UTC"),
            env!("BUILT_HOST"),
        )
        .into_boxed_str(),
    )
}

#[derive(Parser)]
#[command(name = "labeltrack")]
#[command(about = "Extract parcel tracking numbers from shipping label photos", long_about = None)]
#[command(version, long_version = long_version())]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full pipeline over photos and collect tracking numbers
    Extract {
        /// Input image files or directories
        #[arg(required = true)]
        inputs: Vec<PathBuf>,

        /// Write all found numbers to this file, one per line
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Save the binarized band next to each result for inspection
        #[arg(long)]
        debug_dir: Option<PathBuf>,

        /// Bottom share of the photo to scan, in (0, 1]
        #[arg(long, default_value_t = 0.18)]
        fraction: f32,

        /// Luminance cutoff for binarization (0-255)
        #[arg(long, default_value_t = 140)]
        threshold: u8,

        /// Emit results as JSON instead of plain text
        #[arg(long)]
        json: bool,
    },

    /// Crop and binarize only, to tune --fraction and --threshold
    Preview {
        /// Input image file
        input: PathBuf,

        /// Directory to write the band images into
        #[arg(short, long, default_value = ".")]
        out_dir: PathBuf,

        /// Bottom share of the photo to scan, in (0, 1]
        #[arg(long, default_value_t = 0.18)]
        fraction: f32,

        /// Luminance cutoff for binarization (0-255)
        #[arg(long, default_value_t = 140)]
        threshold: u8,
    },
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Extract {
            inputs,
            output,
            debug_dir,
            fraction,
            threshold,
            json,
        } => cmd_extract(
            &inputs,
            output.as_deref(),
            debug_dir.as_deref(),
            fraction,
            threshold,
            json,
        ),
        Commands::Preview {
            input,
            out_dir,
            fraction,
            threshold,
        } => cmd_preview(&input, &out_dir, fraction, threshold),
    }
}

#[cfg(feature = "tesseract")]
fn build_engine() -> Result<core_pipeline::ocr::tesseract::TesseractOcr> {
    core_pipeline::ocr::tesseract::TesseractOcr::new(None, "eng")
        .context("failed to initialize Tesseract")
}

#[cfg(not(feature = "tesseract"))]
fn build_engine() -> Result<core_pipeline::MockOcr> {
    Err(core_pipeline::OcrError::NotAvailable.into())
}

fn config_for(fraction: f32, threshold: u8) -> Result<LabelConfig> {
    if !(fraction > 0.0 && fraction <= 1.0) {
        bail!("--fraction must be in (0, 1], got {fraction}");
    }
    Ok(LabelConfig {
        bottom_fraction: fraction,
        binarize_threshold: threshold,
        ..LabelConfig::default()
    })
}

fn cmd_extract(
    inputs: &[PathBuf],
    output: Option<&Path>,
    debug_dir: Option<&Path>,
    fraction: f32,
    threshold: u8,
    json: bool,
) -> Result<()> {
    let config = config_for(fraction, threshold)?;
    let engine = build_engine()?;
    let pipeline = LabelPipeline::new(engine, config);

    let files = collect_images(inputs)?;
    if files.is_empty() {
        bail!("no image files found in the given inputs");
    }

    let mut seen_hashes = HashSet::new();
    let mut results = Vec::new();

    for path in &files {
        let data = fs::read(path).with_context(|| format!("failed to read {}", path.display()))?;
        if !seen_hashes.insert(compute_image_hash(&data)) {
            tracing::info!(path = %path.display(), "skipping duplicate photo");
            continue;
        }

        let scan = pipeline
            .process_bytes(&data)
            .with_context(|| format!("failed to process {}", path.display()))?;

        if let Some(dir) = debug_dir {
            save_debug_band(dir, path, &scan)?;
        }

        results.push((path.clone(), scan));
    }

    if json {
        print_json(&results)?;
    } else {
        print_plain(&results);
    }

    if let Some(output) = output {
        let numbers: Vec<&str> = results
            .iter()
            .filter_map(|(_, scan)| scan.tracking_number.as_ref())
            .map(|number| number.as_str())
            .collect();
        write_export(output, &numbers)?;
        println!("wrote {} numbers to {}", numbers.len(), output.display());
    }

    Ok(())
}

fn cmd_preview(input: &Path, out_dir: &Path, fraction: f32, threshold: u8) -> Result<()> {
    let config = config_for(fraction, threshold)?;
    let data = fs::read(input).with_context(|| format!("failed to read {}", input.display()))?;
    let image = image::load_from_memory(&data).context("failed to decode image")?;

    let band = core_pipeline::extract_bottom_band(&image, config.bottom_fraction);
    let binarized = core_pipeline::binarize(&band, config.binarize_threshold);

    fs::create_dir_all(out_dir)?;
    let stem = file_stem(input);
    let band_path = out_dir.join(format!("{stem}_band.png"));
    let binarized_path = out_dir.join(format!("{stem}_binarized.png"));
    band.save(&band_path)
        .with_context(|| format!("failed to write {}", band_path.display()))?;
    binarized
        .save(&binarized_path)
        .with_context(|| format!("failed to write {}", binarized_path.display()))?;

    println!(
        "band      -> {} ({}x{})",
        band_path.display(),
        band.width(),
        band.height()
    );
    println!(
        "binarized -> {} (threshold {})",
        binarized_path.display(),
        threshold
    );
    Ok(())
}

fn collect_images(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            for entry in WalkDir::new(input).sort_by_file_name() {
                let entry = entry?;
                if entry.file_type().is_file() && has_image_extension(entry.path()) {
                    files.push(entry.into_path());
                }
            }
        } else if input.is_file() {
            files.push(input.clone());
        } else {
            bail!("no such file or directory: {}", input.display());
        }
    }
    Ok(files)
}

fn has_image_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| IMAGE_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn file_stem(path: &Path) -> &str {
    path.file_stem().and_then(|stem| stem.to_str()).unwrap_or("label")
}

fn save_debug_band(dir: &Path, source: &Path, scan: &LabelScan) -> Result<()> {
    fs::create_dir_all(dir)?;
    let band_path = dir.join(format!("{}_band.png", file_stem(source)));
    scan.binarized
        .save(&band_path)
        .with_context(|| format!("failed to write {}", band_path.display()))?;
    Ok(())
}

fn print_plain(results: &[(PathBuf, LabelScan)]) {
    let mut found = 0usize;
    for (path, scan) in results {
        match &scan.tracking_number {
            Some(number) => {
                found += 1;
                match &scan.candidate {
                    Some(candidate) if candidate.as_str() != number.as_str() => {
                        println!("{}: {} (read as {})", path.display(), number, candidate)
                    }
                    _ => println!("{}: {}", path.display(), number),
                }
            }
            None => println!("{}: no number found", path.display()),
        }
    }
    println!("{found}/{} photos had a readable number", results.len());
}

fn print_json(results: &[(PathBuf, LabelScan)]) -> Result<()> {
    let entries: Vec<serde_json::Value> = results
        .iter()
        .map(|(path, scan)| {
            serde_json::json!({
                "file": path.display().to_string(),
                "tracking_number": scan.tracking_number.as_ref().map(|n| n.as_str()),
                "candidate": scan.candidate,
                "ocr_text": scan.ocr_text,
            })
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

fn write_export(path: &Path, numbers: &[&str]) -> Result<()> {
    let mut file =
        fs::File::create(path).with_context(|| format!("failed to create {}", path.display()))?;
    writeln!(
        file,
        "# tracking numbers exported {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    )?;
    writeln!(file, "# count: {}", numbers.len())?;
    writeln!(file)?;
    for number in numbers {
        writeln!(file, "{number}")?;
    }
    Ok(())
}
