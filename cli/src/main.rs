//! `lsbmorph` entry point: command-line companion for the LSB morphology
//! classifier.
//!
//! Inspect shorthand tokens, build canonical tokens from explicit choices,
//! and resolve the image filenames the classification view would request at
//! a given contrast step.

use anyhow::Context;
use clap::{Parser, Subcommand};
use lsbmorph_core::config::{Config, ConfigLoader, lsb_class_label, morphology_label};
use lsbmorph_core::display::{ContrastStep, ImageBand, galaxy_images, image_filename, vmax_label};
use lsbmorph_core::form::FormState;
use lsbmorph_shorthand::{Classification, LsbClass, Morphology, encode};

#[derive(Debug, Parser)]
#[command(name = "lsbmorph", about = "LSB morphology classifier tools", version)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Decode a shorthand token into a classification record.
    Decode(DecodeArgs),
    /// Build the canonical token for explicit classification choices.
    Encode(EncodeArgs),
    /// Resolve the expected image paths for a galaxy.
    Images(ImagesArgs),
    /// Print the contrast cycle table.
    Contrast,
}

#[derive(Debug, Parser)]
struct DecodeArgs {
    /// Shorthand token, e.g. "-12ra". Sanitized the way the form field is.
    token: String,

    /// Emit JSON instead of the human-readable report.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Parser)]
struct EncodeArgs {
    /// LSB class: yes, no, failed or unset.
    #[arg(long, default_value = "unset")]
    lsb: LsbClass,

    /// Morphology: late-type, early-type, featureless, unsure or unset.
    #[arg(long, default_value = "unset")]
    morphology: Morphology,

    /// Set the valid-redshift flag.
    #[arg(long)]
    valid_redshift: bool,

    /// Set the awesome flag.
    #[arg(long)]
    awesome: bool,
}

#[derive(Debug, Parser)]
struct ImagesArgs {
    /// Galaxy catalog id, e.g. KiDSDR4_J000000.000+000000.00.
    #[arg(long = "galaxy-id", short = 'i')]
    galaxy_id: String,

    /// vmax percentile for the masked/model/residual bands
    /// (default from configuration).
    #[arg(long)]
    vmax: Option<f64>,

    /// vmax percentile for the raw band (default from configuration).
    #[arg(long = "vmax-raw")]
    vmax_raw: Option<f64>,

    /// Use contrast-cycle step N instead of explicit percentiles.
    #[arg(long, conflicts_with_all = ["vmax", "vmax_raw"])]
    step: Option<usize>,

    /// Emit JSON instead of the human-readable listing.
    #[arg(long)]
    json: bool,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Decode(args) => run_decode(&args),
        Command::Encode(args) => run_encode(&args),
        Command::Images(args) => run_images(&args),
        Command::Contrast => run_contrast(),
    }
}

fn load_config() -> anyhow::Result<Config> {
    let config = ConfigLoader::new()
        .load()
        .context("failed to load configuration")?;
    tracing::debug!(?config, "configuration loaded");
    Ok(config)
}

fn run_decode(args: &DecodeArgs) -> anyhow::Result<()> {
    let mut form = FormState::new();
    let update = form.apply_token(&args.token);
    let complete = form.validate();

    if args.json {
        let payload = serde_json::json!({
            "token": update.text,
            "classification": update.classification,
            "cycle_contrast": update.cycle_contrast,
            "complete": complete.is_ok(),
        });
        println!("{}", serde_json::to_string_pretty(&payload)?);
        return Ok(());
    }

    let c = update.classification;
    println!("token:          {}", update.text);
    println!(
        "lsb_class:      {}",
        format_axis(lsb_class_label(c.lsb_class), c.lsb_class.code())
    );
    println!(
        "morphology:     {}",
        format_axis(morphology_label(c.morphology), c.morphology.code())
    );
    println!("valid_redshift: {}", c.valid_redshift);
    println!("awesome:        {}", c.awesome);
    if update.cycle_contrast {
        println!("note:           token requested a contrast cycle");
    }
    match complete {
        Ok(()) => println!("complete:       yes"),
        Err(err) => println!("complete:       no ({err})"),
    }
    Ok(())
}

fn format_axis(label: Option<&str>, code: Option<i8>) -> String {
    match (label, code) {
        (Some(label), Some(code)) => format!("{label} ({code})"),
        _ => "unset".to_string(),
    }
}

fn run_encode(args: &EncodeArgs) -> anyhow::Result<()> {
    let token = encode(Classification {
        lsb_class: args.lsb,
        morphology: args.morphology,
        valid_redshift: args.valid_redshift,
        awesome: args.awesome,
    });
    println!("{token}");
    Ok(())
}

fn run_images(args: &ImagesArgs) -> anyhow::Result<()> {
    let config = load_config()?;
    let (vmax, vmax_raw) = resolve_percentiles(args, &config)?;
    let images = galaxy_images(&args.galaxy_id, vmax, vmax_raw);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&images)?);
        return Ok(());
    }

    for image in images {
        let label = vmax_label(image.band, vmax, vmax_raw).unwrap_or_default();
        println!("{:<14} {} {label}", image.band.as_ref(), image.path);
    }
    Ok(())
}

fn resolve_percentiles(args: &ImagesArgs, config: &Config) -> anyhow::Result<(f64, f64)> {
    if let Some(step) = args.step {
        let cycle = config.contrast_cycle().context("invalid contrast tables")?;
        let ContrastStep { vmax, vmax_raw, .. } = cycle.step(step);
        return Ok((vmax, vmax_raw));
    }
    Ok((
        args.vmax.unwrap_or(config.vmax_percentile),
        args.vmax_raw.unwrap_or(config.vmax_percentile_raw),
    ))
}

fn run_contrast() -> anyhow::Result<()> {
    let config = load_config()?;
    let cycle = config.contrast_cycle().context("invalid contrast tables")?;

    println!("step  vmax    vmax_raw  masked filename                 raw filename");
    for n in 0..cycle.len() {
        let step = cycle.step(n);
        println!(
            "{:<5} {:<7} {:<9} {:<31} {}",
            step.index,
            step.vmax,
            step.vmax_raw,
            image_filename(ImageBand::MaskedRBand, step.vmax, step.vmax_raw),
            image_filename(ImageBand::RawRBand, step.vmax, step.vmax_raw),
        );
    }
    Ok(())
}
