//! Assistant context construction.
//!
//! Turns aggregated listing data and the latest estimate into the
//! text that is prefixed to every chat request. Everything here is pure.

use crate::models::{PointEstimate, SummaryRow};

/// Instructions appended after the data blocks.
const ADVISOR_GUIDELINES: &str = "If the CSV does not have certain data (like occupancy rates), \
disclaim that Airbnb does not provide those data points in this dataset, but you can approximate \
from external sources using numeric or percentage-based insights. Always provide numeric or \
percentage-based data if possible. Be concise, professional, and directly to the point. Present \
key details and the final most important output in bold or bullet points.";

/// Render the per-neighbourhood summary block.
pub fn format_summary(city: &str, currency: &str, rows: &[SummaryRow]) -> String {
    let mut lines = Vec::with_capacity(rows.len() + 1);

    lines.push(format!(
        "Summary of {} data (by neighbourhood & room_type):",
        city
    ));
    for row in rows {
        lines.push(format_summary_row(currency, row));
    }

    lines.join("\n")
}

/// One summary line, e.g. `- Soho / Entire home: Average Price = £150.00, Listings = 2`.
pub fn format_summary_row(currency: &str, row: &SummaryRow) -> String {
    format!(
        "- {} / {}: Average Price = {}{:.2}, Listings = {}",
        row.neighbourhood, row.room_type, currency, row.avg_price, row.listings_count
    )
}

/// Sentence describing a point estimate, passed to the assistant as extra context.
pub fn format_estimate_note(currency: &str, estimate: &PointEstimate) -> String {
    format!(
        "For neighborhood '{}' and property type '{}', the average nightly price is {}{:.2}. \
         Estimated monthly revenue is {}{:.2}.",
        estimate.neighbourhood,
        estimate.room_type,
        currency,
        estimate.avg_price,
        currency,
        estimate.monthly_revenue
    )
}

/// Build the system prompt for a city from the summary and optional estimate note.
pub fn build_system_prompt(city: &str, summary_text: &str, estimate_note: Option<&str>) -> String {
    let mut prompt = String::new();

    prompt.push_str(&format!("You are an Airbnb Investment Advisor for {}.\n\n", city));
    prompt.push_str(&format!(
        "Below is the summarized CSV data for all listings:\n{}\n\n",
        summary_text
    ));
    if let Some(note) = estimate_note.filter(|n| !n.is_empty()) {
        prompt.push_str(&format!("Additionally, optional snippet: {}\n\n", note));
    }
    prompt.push_str(ADVISOR_GUIDELINES);

    prompt
}
