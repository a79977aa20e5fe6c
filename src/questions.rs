//! Example questions for users who don't know where to start.
//!
//! London and Paris ship with curated lists; any other city gets a
//! generic set with its name filled in. A `[[cities]]` entry can replace
//! either with its own `example_questions`.

use crate::models::QuestionGroup;

fn group(title: &str, questions: &[&str]) -> QuestionGroup {
    QuestionGroup {
        title: title.to_string(),
        questions: questions.iter().map(|q| q.to_string()).collect(),
    }
}

fn london() -> Vec<QuestionGroup> {
    vec![
        group(
            "🏡 Neighborhood & Market Analysis (London)",
            &[
                "Which neighborhood in London has the highest Airbnb occupancy rate?",
                "What are the best areas in London for Airbnb investment in 2025?",
                "How do occupancy rates compare between Shoreditch, Soho, and Camden?",
            ],
        ),
        group(
            "💰 Financial & ROI Analysis",
            &[
                "What is the expected ROI for a £500,000 property in London?",
                "How long does it take to recover my investment for an Airbnb in Westminster?",
                "How do property taxes and maintenance costs impact Airbnb profitability in London?",
            ],
        ),
        group(
            "🔍 Personalized Investment Recommendations",
            &[
                "I have a £750,000 budget. Which area in London offers the best Airbnb returns?",
                "Is it better to invest in a studio or a two-bedroom apartment for Airbnb in London?",
                "Which neighborhoods in London offer the best balance between affordability and high demand?",
            ],
        ),
        group(
            "⚠️ Regulation & Legal Checks",
            &[
                "Are there any short-term rental restrictions in Westminster?",
                "Can I legally list my property as an Airbnb in central London?",
            ],
        ),
    ]
}

fn paris() -> Vec<QuestionGroup> {
    vec![
        group(
            "🏡 Neighborhood & Market Analysis (Paris)",
            &[
                "Which arrondissement in Paris has the highest Airbnb occupancy rate?",
                "What are the best areas in Paris for Airbnb investment in 2025?",
                "How do occupancy rates compare between Le Marais, Montmartre, and the Latin Quarter?",
            ],
        ),
        group(
            "💰 Financial & ROI Analysis",
            &[
                "What is the expected ROI for a €600,000 apartment in Paris?",
                "How long does it take to recover my investment for an Airbnb near the Eiffel Tower?",
                "How do property taxes and maintenance costs impact Airbnb profitability in Paris?",
            ],
        ),
        group(
            "🔍 Personalized Investment Recommendations",
            &[
                "I have a €750,000 budget. Which area in Paris offers the best Airbnb returns?",
                "Is it better to invest in a studio or a two-bedroom apartment for Airbnb in Paris?",
                "Which arrondissements in Paris offer the best balance between affordability and high demand?",
            ],
        ),
        group(
            "⚠️ Regulation & Legal Checks",
            &[
                "Are there any short-term rental restrictions in central Paris?",
                "Can I legally list my property as an Airbnb near the Champs-Élysées?",
            ],
        ),
    ]
}

fn generic(city: &str) -> Vec<QuestionGroup> {
    vec![
        QuestionGroup {
            title: "🏡 Neighborhood & Market Analysis".to_string(),
            questions: vec![
                format!("Which neighbourhood in {} has the highest average nightly price?", city),
                format!("What are the best areas in {} for Airbnb investment?", city),
            ],
        },
        QuestionGroup {
            title: "💰 Financial & ROI Analysis".to_string(),
            questions: vec![
                format!("What monthly revenue can an entire home earn in {}?", city),
                format!(
                    "How do property taxes and maintenance costs impact Airbnb profitability in {}?",
                    city
                ),
            ],
        },
        QuestionGroup {
            title: "⚠️ Regulation & Legal Checks".to_string(),
            questions: vec![format!("Are there any short-term rental restrictions in {}?", city)],
        },
    ]
}

/// Built-in example questions for a city (matched case-insensitively).
pub fn defaults_for(city: &str) -> Vec<QuestionGroup> {
    match city.to_lowercase().as_str() {
        "london" => london(),
        "paris" => paris(),
        _ => generic(city),
    }
}

/// Render question groups as a terminal list.
pub fn format_questions(city: &str, groups: &[QuestionGroup]) -> String {
    if groups.is_empty() {
        return format!("No example questions are configured for {}.", city);
    }

    let mut output = format!("Example questions for {}:\n", city);
    for group in groups {
        output.push_str(&format!("\n{}\n", group.title));
        for question in &group.questions {
            output.push_str(&format!("  • {}\n", question));
        }
    }

    output
}
