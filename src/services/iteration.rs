use crate::models::response::{ChartType, QueryInterpretation, ResponseMessage};

pub const NO_PREVIOUS_CHART: &str = "I don't see a previous chart to modify. Could you first ask me to show you some data, then I can change how it's displayed?";

struct Rationale {
    explanation: &'static str,
    assumption: &'static str,
}

fn rationale(target: ChartType) -> Rationale {
    match target {
        ChartType::Bar => Rationale {
            explanation: "Bar charts are effective for comparing discrete values and showing differences between data points clearly. This format makes it easier to compare individual values at a glance.",
            assumption: "User prefers bar chart for this comparison",
        },
        ChartType::Area => Rationale {
            explanation: "Area charts emphasize the magnitude of change over time and show cumulative totals effectively. The filled area helps visualize the overall volume or scale of the data.",
            assumption: "User wants to emphasize volume/scale",
        },
        ChartType::Line => Rationale {
            explanation: "Line charts make trends and turning points easy to follow across an ordered axis. They work best when the x-axis represents time or another natural sequence.",
            assumption: "User wants to follow the trend across the sequence",
        },
        ChartType::Pie => Rationale {
            explanation: "Pie charts show how each value contributes to the whole. They read best with a handful of categories whose shares differ noticeably.",
            assumption: "User wants to see each value as a share of the total",
        },
        ChartType::StackedBar => Rationale {
            explanation: "Stacked bar charts show each series' contribution alongside the combined total for every category, so both the parts and the whole can be compared.",
            assumption: "Series can be meaningfully added together",
        },
        _ => Rationale {
            explanation: "The same data is shown in a different visual form.",
            assumption: "User prefers a different visualization",
        },
    }
}

fn with_article(label: &str) -> String {
    let article = match label.chars().next() {
        Some('a' | 'e' | 'i' | 'o' | 'u') => "an",
        _ => "a",
    };
    format!("{} {}", article, label)
}

/// Rebuild `last`'s chart as `target`. Without a previous chart the user is
/// told there is nothing to modify.
pub fn convert_chart(target: ChartType, last: Option<&ResponseMessage>) -> ResponseMessage {
    let (previous, chart) = match last.and_then(|r| r.chart.as_ref().map(|chart| (r, chart))) {
        Some(found) => found,
        None => {
            log::debug!("No previous chart to convert to {}", target);
            return ResponseMessage::text(
                NO_PREVIOUS_CHART,
                "No chart exists to transform.",
                QueryInterpretation::new(
                    "Modify existing chart type",
                    &["chart type", target.label()],
                    "previous response",
                    &["User wants to iterate on previous visualization"],
                ),
            );
        }
    };

    let rationale = rationale(target);
    let interpretation = QueryInterpretation {
        intent: format!("Change visualization type to {}", target.label()),
        entities: vec![target.label().to_string(), "visualization change".to_string()],
        data_source: previous.interpretation.data_source.clone(),
        assumptions: vec![
            "Same data, different visualization".to_string(),
            rationale.assumption.to_string(),
        ],
    };

    ResponseMessage::mixed(
        chart.retyped(target),
        format!("I've converted the chart to {} format.", with_article(target.label())),
        rationale.explanation,
        interpretation,
    )
}

pub fn to_bar_chart(_query: &str, last: Option<&ResponseMessage>) -> ResponseMessage {
    convert_chart(ChartType::Bar, last)
}

pub fn to_area_chart(_query: &str, last: Option<&ResponseMessage>) -> ResponseMessage {
    convert_chart(ChartType::Area, last)
}

pub fn to_line_chart(_query: &str, last: Option<&ResponseMessage>) -> ResponseMessage {
    convert_chart(ChartType::Line, last)
}

pub fn to_pie_chart(_query: &str, last: Option<&ResponseMessage>) -> ResponseMessage {
    convert_chart(ChartType::Pie, last)
}

pub fn to_stacked_bar_chart(_query: &str, last: Option<&ResponseMessage>) -> ResponseMessage {
    convert_chart(ChartType::StackedBar, last)
}
