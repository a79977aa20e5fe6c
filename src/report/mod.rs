//! Export of session reports and map data.

pub mod generator;
pub mod map;

pub use generator::{generate_json_report, generate_markdown_report};
pub use map::generate_geojson;

use crate::cli::OutputFormat;
use crate::models::{MapPoint, SessionReport};
use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;

/// Render and write a session report.
pub fn write_session_report(report: &SessionReport, path: &Path, format: OutputFormat) -> Result<()> {
    let output = match format {
        OutputFormat::Json => generate_json_report(report)?,
        OutputFormat::Markdown => generate_markdown_report(report),
    };

    std::fs::write(path, output)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Session report written to {}", path.display());
    Ok(())
}

/// Write listing locations as GeoJSON.
pub fn write_geojson(city: &str, points: &[MapPoint], path: &Path) -> Result<()> {
    let content = serde_json::to_string_pretty(&generate_geojson(city, points))?;

    std::fs::write(path, content)
        .with_context(|| format!("Failed to write map to {}", path.display()))?;
    info!("Wrote {} map points to {}", points.len(), path.display());
    Ok(())
}
