//! Data models for the advisor.
//!
//! This module contains the listing data, derived statistics and
//! conversation types shared across the application.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Assumed number of booked nights per month used for revenue estimates.
pub const BOOKED_NIGHTS_PER_MONTH: f64 = 20.0;

/// One rental unit record from a city's dataset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Listing {
    /// Neighbourhood name as it appears in the source data.
    pub neighbourhood: String,
    /// Accommodation category (e.g. "Entire home/apt", "Private room").
    pub room_type: String,
    /// Nightly price in the city's currency.
    pub price: f64,
    /// Latitude, when the source row carried a usable value.
    pub latitude: Option<f64>,
    /// Longitude, when the source row carried a usable value.
    pub longitude: Option<f64>,
}

impl Listing {
    /// Convenience constructor for a listing without coordinates.
    #[cfg(test)]
    pub fn new(neighbourhood: &str, room_type: &str, price: f64) -> Self {
        Self {
            neighbourhood: neighbourhood.to_string(),
            room_type: room_type.to_string(),
            price,
            latitude: None,
            longitude: None,
        }
    }
}

/// A titled set of example questions, e.g. "💰 Financial & ROI Analysis".
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuestionGroup {
    pub title: String,
    pub questions: Vec<String>,
}

/// All listings for one city, immutable once loaded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CityDataset {
    /// City display name (e.g. "London").
    pub name: String,
    /// Currency symbol used when rendering prices.
    pub currency: String,
    /// The listing rows.
    pub listings: Vec<Listing>,
    /// Suggested questions for users who have not asked anything yet.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub example_questions: Vec<QuestionGroup>,
}

impl CityDataset {
    pub fn new(name: impl Into<String>, currency: impl Into<String>, listings: Vec<Listing>) -> Self {
        Self {
            name: name.into(),
            currency: currency.into(),
            listings,
            example_questions: Vec::new(),
        }
    }

    pub fn with_example_questions(mut self, groups: Vec<QuestionGroup>) -> Self {
        self.example_questions = groups;
        self
    }

    pub fn len(&self) -> usize {
        self.listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listings.is_empty()
    }
}

/// Aggregated statistics for one (neighbourhood, room type) pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SummaryRow {
    pub neighbourhood: String,
    pub room_type: String,
    /// Mean nightly price over the matching listings.
    pub avg_price: f64,
    /// Number of matching listings, always at least 1.
    pub listings_count: usize,
}

/// Nightly price and monthly revenue projection for a single filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointEstimate {
    pub neighbourhood: String,
    pub room_type: String,
    /// Estimated nightly price.
    pub avg_price: f64,
    /// `avg_price` multiplied by the booked nights per month.
    pub monthly_revenue: f64,
    /// Number of listings that matched the filter exactly.
    pub matched_listings: usize,
    /// True when no listing matched and the city-wide mean was used.
    pub fallback: bool,
}

/// A listing that can be placed on a map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapPoint {
    pub neighbourhood: String,
    pub room_type: String,
    pub price: f64,
    pub latitude: f64,
    pub longitude: f64,
}

/// Author of a conversation message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
}

impl Role {
    /// Wire name used by chat-completion APIs.
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::System => write!(f, "System"),
            Role::User => write!(f, "You"),
            Role::Assistant => write!(f, "Advisor"),
        }
    }
}

/// One message in a session transcript.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationTurn {
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationTurn {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }
}

/// Metadata stamped onto exported session reports.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportMetadata {
    pub city: String,
    pub generated_at: DateTime<Utc>,
    pub model_used: String,
    pub total_listings: usize,
    pub turns: usize,
}

/// Everything a session has produced, ready for export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SessionReport {
    pub metadata: ReportMetadata,
    pub currency: String,
    pub summary: Vec<SummaryRow>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub estimate: Option<PointEstimate>,
    pub transcript: Vec<ConversationTurn>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_wire_names() {
        assert_eq!(Role::System.as_str(), "system");
        assert_eq!(Role::User.as_str(), "user");
        assert_eq!(Role::Assistant.as_str(), "assistant");
    }

    #[test]
    fn test_role_serializes_lowercase() {
        let json = serde_json::to_string(&Role::Assistant).unwrap();
        assert_eq!(json, "\"assistant\"");
    }

    #[test]
    fn test_turn_constructors() {
        let turn = ConversationTurn::user("hello");
        assert_eq!(turn.role, Role::User);
        assert_eq!(turn.content, "hello");

        let reply = ConversationTurn::assistant("hi there");
        assert_eq!(reply.role, Role::Assistant);
    }

    #[test]
    fn test_dataset_len() {
        let dataset = CityDataset::new("London", "£", vec![Listing::new("Soho", "Entire home", 100.0)]);
        assert_eq!(dataset.len(), 1);
        assert!(!dataset.is_empty());
        assert!(CityDataset::new("Paris", "€", vec![]).is_empty());
    }
}
