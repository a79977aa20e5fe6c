//! Session report generation.
//!
//! Renders a session (city summary, latest estimate and transcript) as
//! Markdown or JSON.

use crate::context::format_estimate_note;
use crate::models::{ConversationTurn, PointEstimate, ReportMetadata, SessionReport, SummaryRow};
use anyhow::Result;

/// Generate a complete Markdown report.
pub fn generate_markdown_report(report: &SessionReport) -> String {
    let mut output = String::new();

    output.push_str(&format!("# {} Investment Session\n\n", report.metadata.city));
    output.push_str(&generate_metadata_section(&report.metadata));
    output.push_str(&generate_summary_section(&report.currency, &report.summary));
    output.push_str(&generate_estimate_section(&report.currency, report.estimate.as_ref()));
    output.push_str(&generate_transcript_section(&report.transcript));
    output.push_str(&generate_footer());

    output
}

/// Generate the metadata section.
fn generate_metadata_section(metadata: &ReportMetadata) -> String {
    let mut section = String::new();

    section.push_str("## Metadata\n\n");
    section.push_str(&format!("- **City:** {}\n", metadata.city));
    section.push_str(&format!(
        "- **Generated:** {}\n",
        metadata.generated_at.format("%Y-%m-%d %H:%M:%S UTC")
    ));
    section.push_str(&format!("- **Model Used:** `{}`\n", metadata.model_used));
    section.push_str(&format!("- **Listings:** {}\n", metadata.total_listings));
    section.push_str(&format!("- **Messages:** {}\n\n", metadata.turns));

    section
}

/// Generate the neighbourhood summary table.
fn generate_summary_section(currency: &str, rows: &[SummaryRow]) -> String {
    let mut section = String::new();

    section.push_str("## Summary\n\n");

    if rows.is_empty() {
        section.push_str("No listings are available for this city.\n\n");
        return section;
    }

    section.push_str("| Neighbourhood | Room Type | Average Price | Listings |\n");
    section.push_str("|:---|:---|---:|---:|\n");
    for row in rows {
        section.push_str(&format!(
            "| {} | {} | {}{:.2} | {} |\n",
            row.neighbourhood, row.room_type, currency, row.avg_price, row.listings_count
        ));
    }
    section.push('\n');

    section
}

/// Generate the estimate section, empty when no estimate was requested.
fn generate_estimate_section(currency: &str, estimate: Option<&PointEstimate>) -> String {
    let Some(estimate) = estimate else {
        return String::new();
    };

    let mut section = String::new();

    section.push_str("## Estimate\n\n");
    section.push_str(&format!(
        "- **Estimated Nightly Price:** {}{:.2}\n",
        currency, estimate.avg_price
    ));
    section.push_str(&format!(
        "- **Estimated Monthly Revenue:** {}{:.2}\n",
        currency, estimate.monthly_revenue
    ));
    section.push_str(&format!(
        "- **Matching Listings:** {}\n\n",
        estimate.matched_listings
    ));
    section.push_str(&format!("> {}\n\n", format_estimate_note(currency, estimate)));

    section
}

/// Generate the conversation transcript.
fn generate_transcript_section(transcript: &[ConversationTurn]) -> String {
    if transcript.is_empty() {
        return String::new();
    }

    let mut section = String::new();

    section.push_str("## Conversation\n\n");
    for turn in transcript {
        section.push_str(&format!(
            "### {} ({})\n\n{}\n\n",
            turn.role,
            turn.timestamp.format("%H:%M:%S"),
            turn.content
        ));
    }

    section
}

/// Generate the report footer.
fn generate_footer() -> String {
    let mut footer = String::new();

    footer.push_str("---\n\n");
    footer.push_str("*Report generated by StayAdvisor*\n");

    footer
}

/// Generate a JSON report.
pub fn generate_json_report(report: &SessionReport) -> Result<String> {
    serde_json::to_string_pretty(report).map_err(Into::into)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn create_test_report() -> SessionReport {
        SessionReport {
            metadata: ReportMetadata {
                city: "London".to_string(),
                generated_at: Utc::now(),
                model_used: "gpt-4".to_string(),
                total_listings: 3,
                turns: 2,
            },
            currency: "£".to_string(),
            summary: vec![SummaryRow {
                neighbourhood: "Soho".to_string(),
                room_type: "Entire home".to_string(),
                avg_price: 150.0,
                listings_count: 2,
            }],
            estimate: Some(PointEstimate {
                neighbourhood: "Soho".to_string(),
                room_type: "Entire home".to_string(),
                avg_price: 150.0,
                monthly_revenue: 3000.0,
                matched_listings: 2,
                fallback: false,
            }),
            transcript: vec![
                ConversationTurn::user("Best area?"),
                ConversationTurn::assistant("**Soho** averages £150.00 a night."),
            ],
        }
    }

    #[test]
    fn test_generate_markdown_report() {
        let markdown = generate_markdown_report(&create_test_report());

        assert!(markdown.starts_with("# London Investment Session"));
        assert!(markdown.contains("## Metadata"));
        assert!(markdown.contains("| Soho | Entire home | £150.00 | 2 |"));
        assert!(markdown.contains("**Estimated Monthly Revenue:** £3000.00"));
        assert!(markdown.contains("## Conversation"));
        assert!(markdown.contains("### You ("));
        assert!(markdown.contains("### Advisor ("));
    }

    #[test]
    fn test_markdown_without_estimate_or_turns() {
        let mut report = create_test_report();
        report.estimate = None;
        report.transcript.clear();
        report.summary.clear();

        let markdown = generate_markdown_report(&report);
        assert!(!markdown.contains("## Estimate"));
        assert!(!markdown.contains("## Conversation"));
        assert!(markdown.contains("No listings are available"));
    }

    #[test]
    fn test_generate_json_report() {
        let json = generate_json_report(&create_test_report()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["metadata"]["city"], "London");
        assert_eq!(value["summary"][0]["listings_count"], 2);
        assert_eq!(value["transcript"][1]["role"], "assistant");
        assert_eq!(value["estimate"]["monthly_revenue"], 3000.0);
    }
}
