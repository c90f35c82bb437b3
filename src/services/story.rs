use chrono::Utc;

use crate::models::conversation::{ConversationTurn, DataStory, StorySection, StorySectionKind};

pub const DEFAULT_TITLE: &str = "Analytics Report";

fn section(kind: StorySectionKind, content: impl Into<String>) -> StorySection {
    StorySection {
        kind,
        content: content.into(),
        chart: None,
    }
}

/// Assemble a report from conversation turns: a title and summary, then for
/// each turn its query, chart, text and insight in that order.
pub fn generate_story(turns: &[ConversationTurn], title: Option<&str>) -> DataStory {
    let title = title
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or(DEFAULT_TITLE)
        .to_string();

    let mut sections = vec![
        section(StorySectionKind::Heading, title.clone()),
        section(
            StorySectionKind::Text,
            format!("This report summarizes {} analytical queries and their findings.", turns.len()),
        ),
    ];

    for turn in turns {
        sections.push(section(StorySectionKind::Heading, turn.user_query.clone()));

        if let Some(chart) = &turn.response.chart {
            sections.push(StorySection {
                kind: StorySectionKind::Chart,
                content: chart.title.clone(),
                chart: Some(chart.clone()),
            });
        }

        if let Some(text) = &turn.response.text {
            sections.push(section(StorySectionKind::Text, text.clone()));
        }

        sections.push(section(StorySectionKind::Insight, turn.response.explanation.clone()));
    }

    DataStory {
        title,
        generated_at: Utc::now(),
        sections,
    }
}
