//! Overlay inspector
//!
//! Loads an extraction envelope and prints what the review UI would show:
//! the form rows, the highlight boxes of a page, or the canonical form of a
//! single bounding region. All output is JSON on stdout; logs go to stderr.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use overlay_core::{region, LengthUnit, PageSize, ReviewConfig, ReviewSession};
use serde_json::json;
use shared_types::{FieldKey, RawBoundingRegion};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[derive(Parser, Debug)]
#[command(name = "overlay-inspect")]
#[command(version, about = "Inspect field highlights of an invoice extraction")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print the form rows in display order
    Index {
        /// Extraction envelope (JSON)
        envelope: PathBuf,

        /// Review configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,
    },

    /// Print the highlight boxes of one page
    Overlays {
        /// Extraction envelope (JSON)
        envelope: PathBuf,

        /// Review configuration (TOML)
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Page to display
        #[arg(short, long, default_value_t = 1)]
        page: u32,

        /// Native page size reported by the renderer, e.g. `612x792pt`
        #[arg(long, value_parser = parse_page_size)]
        page_size: Option<PageSize>,

        /// Simulate hovering this field key, e.g. `InvoiceTotal` or `Amount-0`
        #[arg(long)]
        hover: Option<String>,

        /// Page sent with the hover (defaults to the field's page)
        #[arg(long, requires = "hover")]
        hover_page: Option<u32>,
    },

    /// Normalise one bounding region and project it onto a page
    Region {
        /// Region as JSON or in printed form, e.g. `"{'pageNumber': 2, 'polygon': [...]}"`
        region: String,

        /// Reference page size
        #[arg(long, value_parser = parse_page_size, default_value = "8.5x11in")]
        page_size: PageSize,
    },
}

/// `WIDTHxHEIGHT[unit]` with unit `in`, `pt` or `px` (inches when omitted)
fn parse_page_size(s: &str) -> Result<PageSize, String> {
    let (width, rest) = s
        .split_once(['x', 'X'])
        .ok_or_else(|| format!("expected WIDTHxHEIGHT[unit], got {:?}", s))?;
    let unit_start = rest
        .find(|c: char| c.is_ascii_alphabetic())
        .unwrap_or(rest.len());
    let (height, unit) = rest.split_at(unit_start);

    let width: f64 = width.trim().parse().map_err(|_| format!("invalid width: {:?}", width))?;
    let height: f64 = height.trim().parse().map_err(|_| format!("invalid height: {:?}", height))?;
    let unit = if unit.is_empty() {
        LengthUnit::Inch
    } else {
        unit.parse()?
    };

    let size = PageSize::new(width, height, unit);
    if !size.is_valid() {
        return Err(format!("page size must be positive, got {}", s));
    }
    Ok(size)
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ReviewConfig> {
    match path {
        Some(path) => ReviewConfig::from_file(path),
        None => Ok(ReviewConfig::default()),
    }
}

fn load_session(envelope: &Path, config: Option<&Path>) -> anyhow::Result<ReviewSession> {
    let config = load_config(config)?;
    let json = fs::read_to_string(envelope)
        .with_context(|| format!("Failed to read envelope: {}", envelope.display()))?;
    ReviewSession::from_json(&json, &config)
        .with_context(|| format!("Failed to load envelope: {}", envelope.display()))
}

fn index(envelope: &Path, config: Option<&Path>) -> anyhow::Result<serde_json::Value> {
    let session = load_session(envelope, config)?;
    let titles: Vec<String> = (0..session.index().item_count())
        .map(|i| session.item_title(i))
        .collect();

    Ok(json!({
        "fileId": session.file_id(),
        "rows": session.form_rows(),
        "itemTitles": titles,
    }))
}

fn overlays(
    envelope: &Path,
    config: Option<&Path>,
    page: u32,
    page_size: Option<PageSize>,
    hover: Option<&str>,
    hover_page: Option<u32>,
) -> anyhow::Result<serde_json::Value> {
    let mut session = load_session(envelope, config)?;
    session.go_to_page(page);

    if let Some(size) = page_size {
        let displayed = session.viewer().page();
        if !session.report_page_size(displayed, size) {
            tracing::warn!(
                page = displayed,
                "page size cannot be converted to the polygon unit; keeping the analysis size"
            );
        }
    }

    if let Some(key) = hover {
        let hover_page = hover_page.or_else(|| {
            session
                .index()
                .get(&FieldKey::from(key))
                .map(|entry| entry.page_num)
        });
        if hover_page.is_none() {
            bail!("unknown field key {:?}; pass --hover-page to hover it anyway", key);
        }
        let transition = session.set_hovered_key(key, hover_page);
        tracing::info!(key, ?transition, "simulated hover");
    }

    let displayed = session.viewer().page();
    Ok(json!({
        "page": displayed,
        "reference": session.reference_size(displayed),
        "hover": session.hover_state(),
        "overlays": session.overlays(),
    }))
}

fn inspect_region(text: &str, page_size: PageSize) -> serde_json::Value {
    let raw = serde_json::from_str::<RawBoundingRegion>(text)
        .unwrap_or_else(|_| RawBoundingRegion::Encoded(text.to_string()));
    let page_number = region::page_number_or_default(Some(&raw));

    match region::try_parse(&raw) {
        Ok(parsed) => json!({
            "pageNumber": page_number,
            "polygon": parsed.polygon,
            "rect": page_size.project(&parsed.polygon),
        }),
        Err(e) => json!({
            "pageNumber": page_number,
            "polygon": null,
            "rect": null,
            "error": e.to_string(),
        }),
    }
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // stdout carries the JSON output
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = match &args.command {
        Command::Index { envelope, config } => index(envelope, config.as_deref())?,
        Command::Overlays {
            envelope,
            config,
            page,
            page_size,
            hover,
            hover_page,
        } => overlays(
            envelope,
            config.as_deref(),
            *page,
            *page_size,
            hover.as_deref(),
            *hover_page,
        )?,
        Command::Region { region, page_size } => inspect_region(region, *page_size),
    };

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_page_size() {
        assert_eq!(
            parse_page_size("612x792pt").unwrap(),
            PageSize::new(612.0, 792.0, LengthUnit::Point)
        );
        assert_eq!(parse_page_size("8.5x11").unwrap(), PageSize::LETTER);
        assert_eq!(
            parse_page_size("800X1000px").unwrap(),
            PageSize::new(800.0, 1000.0, LengthUnit::Pixel)
        );
        assert!(parse_page_size("612").is_err());
        assert!(parse_page_size("0x792pt").is_err());
        assert!(parse_page_size("612x792furlong").is_err());
    }

    #[test]
    fn test_inspect_region_both_shapes() {
        let encoded = inspect_region("{'pageNumber': 2, 'polygon': [1,1,2,1,2,2,1,2]}", PageSize::LETTER);
        let structured = inspect_region(
            r#"{"pageNumber": 2, "polygon": [1,1,2,1,2,2,1,2]}"#,
            PageSize::LETTER,
        );
        assert_eq!(encoded, structured);
        assert_eq!(encoded["pageNumber"], 2);
        assert!((encoded["rect"]["leftPct"].as_f64().unwrap() - 11.76).abs() < 0.01);
    }

    #[test]
    fn test_inspect_region_reports_error() {
        let out = inspect_region("{'pageNumber': 3, 'polygon': [1,2,3]}", PageSize::LETTER);
        assert_eq!(out["pageNumber"], 3);
        assert!(out["rect"].is_null());
        assert_eq!(out["error"], "polygon has 3 numbers, expected 8");
    }
}
