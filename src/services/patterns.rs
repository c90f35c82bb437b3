use regex::{Regex, RegexBuilder};
use thiserror::Error;

use crate::models::conversation::QueryContext;
use crate::models::response::ResponseMessage;
use crate::services::{iteration, synthesizer};

/// Pure mapping from (query, previous response) to a response
pub type Handler = fn(&str, Option<&ResponseMessage>) -> ResponseMessage;

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("Invalid trigger pattern in entry '{entry}': {source}")]
    InvalidPattern {
        entry: &'static str,
        #[source]
        source: regex::Error,
    },
    #[error("Registry has no unconditional fallback entry")]
    MissingFallback,
    #[error("Unconditional entry '{entry}' must be the last in the registry")]
    MisplacedFallback { entry: &'static str },
}

/// A single trigger rule, matched case-insensitively against the whole query
#[derive(Debug, Clone)]
pub enum Trigger {
    Pattern(Regex),
    Always,
}

impl Trigger {
    pub fn matches(&self, query: &str) -> bool {
        match self {
            Trigger::Pattern(regex) => regex.is_match(query),
            Trigger::Always => true,
        }
    }
}

#[derive(Clone)]
pub struct PatternEntry {
    name: &'static str,
    triggers: Vec<Trigger>,
    handler: Handler,
    examples: &'static [&'static str],
}

impl PatternEntry {
    /// Entry triggered by any of `patterns`, tried in the order given
    pub fn new(name: &'static str, patterns: &[&str], handler: Handler) -> Result<Self, RegistryError> {
        let triggers = patterns
            .iter()
            .map(|pattern| {
                RegexBuilder::new(pattern)
                    .case_insensitive(true)
                    .build()
                    .map(Trigger::Pattern)
                    .map_err(|source| RegistryError::InvalidPattern { entry: name, source })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            name,
            triggers,
            handler,
            examples: &[],
        })
    }

    /// Entry that matches every query
    pub fn fallback(name: &'static str, handler: Handler) -> Self {
        Self {
            name,
            triggers: vec![Trigger::Always],
            handler,
            examples: &[],
        }
    }

    /// Canonical phrasings this entry is expected to win
    pub fn with_examples(mut self, examples: &'static [&'static str]) -> Self {
        self.examples = examples;
        self
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn examples(&self) -> &'static [&'static str] {
        self.examples
    }

    pub fn matches(&self, query: &str) -> bool {
        self.triggers.iter().any(|trigger| trigger.matches(query))
    }

    fn is_unconditional(&self) -> bool {
        self.triggers.iter().any(|trigger| matches!(trigger, Trigger::Always))
    }

    pub fn handle(&self, query: &str, last_response: Option<&ResponseMessage>) -> ResponseMessage {
        (self.handler)(query, last_response)
    }
}

impl std::fmt::Debug for PatternEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PatternEntry")
            .field("name", &self.name)
            .field("triggers", &self.triggers.len())
            .finish()
    }
}

/// Ordered list of entries; earlier entries win
#[derive(Debug, Clone)]
pub struct PatternRegistry {
    entries: Vec<PatternEntry>,
    fallback: PatternEntry,
}

impl PatternRegistry {
    /// Build a registry from entries in priority order. The last entry, and
    /// only the last, must match unconditionally.
    pub fn new(mut entries: Vec<PatternEntry>) -> Result<Self, RegistryError> {
        let fallback = match entries.pop() {
            Some(entry) if entry.is_unconditional() => entry,
            _ => return Err(RegistryError::MissingFallback),
        };

        if let Some(entry) = entries.iter().find(|entry| entry.is_unconditional()) {
            return Err(RegistryError::MisplacedFallback { entry: entry.name });
        }

        Ok(Self { entries, fallback })
    }

    /// The registry used by the rule-based provider
    pub fn standard() -> Result<Self, RegistryError> {
        let entries = vec![
            // Chart conversions go first: "make it a bar chart" must never be
            // read as a request for one of the topic views below. Stacked bar
            // precedes plain bar because its phrasing contains "bar chart".
            PatternEntry::new(
                "iterate-stacked-bar",
                &[
                    r"\b(?:make|change|convert|turn|switch)\b.*\bstacked\b",
                    r"\b(?:show|display)\b.*\bas\s+(?:an?\s+)?stacked\b",
                ],
                iteration::to_stacked_bar_chart,
            )?
            .with_examples(&["Make it a stacked bar chart", "Show as stacked bars"]),
            PatternEntry::new(
                "iterate-bar",
                &[
                    r"\b(?:make|change|convert|turn|switch)\b.*\bbar\b.*\bchart\b",
                    r"\b(?:show|display)\b.*\bas\s+(?:an?\s+)?bars?\b",
                ],
                iteration::to_bar_chart,
            )?
            .with_examples(&["Make it a bar chart", "Convert to bar chart", "Show as bar"]),
            PatternEntry::new(
                "iterate-area",
                &[
                    r"\b(?:make|change|convert|turn|switch)\b.*\barea\b.*\bchart\b",
                    r"\b(?:show|display)\b.*\bas\s+(?:an?\s+)?area\b",
                ],
                iteration::to_area_chart,
            )?
            .with_examples(&["Show as area chart", "Convert to area chart"]),
            PatternEntry::new(
                "iterate-line",
                &[
                    r"\b(?:make|change|convert|turn|switch)\b.*\bline\b.*\bchart\b",
                    r"\b(?:show|display)\b.*\bas\s+(?:an?\s+)?lines?\b",
                ],
                iteration::to_line_chart,
            )?
            .with_examples(&["Make it a line chart", "Display as line"]),
            PatternEntry::new(
                "iterate-pie",
                &[
                    r"\b(?:make|change|convert|turn|switch)\b.*\bpie\b.*\bchart\b",
                    r"\b(?:show|display)\b.*\bas\s+(?:an?\s+)?pie\b",
                ],
                iteration::to_pie_chart,
            )?
            .with_examples(&["Make it a pie chart", "Show as pie"]),
            // Causal questions about sales mention "sales" and often a
            // quarter, so they must beat the quarterly view.
            PatternEntry::new(
                "sales-decline",
                &[
                    r"why.*sales.*(?:drop|decline|decrease|fall)",
                    r"what.*caused.*(?:drop|decline)",
                    r"explain.*(?:q3|third quarter)",
                ],
                synthesizer::sales_decline,
            )?
            .with_examples(&[
                "Why did sales drop in Q3?",
                "Why did sales drop over the last quarter?",
                "What caused the decline?",
                "Explain the third quarter",
            ]),
            // "monthly sales by category" asks for the category split.
            PatternEntry::new(
                "sales-by-category",
                &[
                    r"sales.*(?:by|per) categor",
                    r"categor.*breakdown",
                    r"show.*categories",
                ],
                synthesizer::sales_by_category,
            )?
            .with_examples(&[
                "Show sales by category",
                "Give me a category breakdown",
                "Show monthly sales by category",
            ]),
            PatternEntry::new(
                "revenue-vs-profit",
                &[
                    r"(?:revenue|sales).*(?:\bvs\b|versus|\band\b).*profit",
                    r"compare.*profit",
                    r"profit.*margin",
                ],
                synthesizer::revenue_vs_profit,
            )?
            .with_examples(&[
                "Compare revenue and profit by quarter",
                "Show revenue vs profit",
                "What is our profit margin?",
            ]),
            // A trend over time stays a trend even when "total" is mentioned.
            PatternEntry::new(
                "quarterly-sales",
                &[
                    r"sales.*(?:over|last|past|previous).*(?:quarter|q1|q2|q3|q4)",
                    r"show.*sales.*quarter",
                    r"revenue.*trend",
                ],
                synthesizer::quarterly_sales,
            )?
            .with_examples(&[
                "Show me sales over the last quarter",
                "Show sales by quarter",
                "Show me the revenue trend",
                "What is the total revenue trend",
            ]),
            PatternEntry::new(
                "revenue-kpi",
                &[
                    r"total.*revenue",
                    r"revenue.*kpi",
                    r"how much.*(?:revenue|money)",
                    r"headline.*(?:number|figure|metric)",
                ],
                synthesizer::revenue_kpi,
            )?
            .with_examples(&["What is our total revenue?", "Show the revenue KPI", "How much money did we earn?"]),
            PatternEntry::new(
                "monthly-revenue",
                &[
                    r"sales.*month",
                    r"monthly.*revenue",
                    r"show.*(?:by|per) month",
                ],
                synthesizer::monthly_revenue,
            )?
            .with_examples(&["Show monthly revenue", "Show sales by month", "Break down sales per month"]),
            PatternEntry::new(
                "top-products",
                &[
                    r"(?:top|best).*selling.*product",
                    r"what.*products.*sold",
                    r"best.*products",
                ],
                synthesizer::top_products,
            )?
            .with_examples(&[
                "What were our top selling products last month?",
                "What products sold well?",
                "Show me best products",
            ]),
            PatternEntry::new(
                "customer-demographics",
                &[
                    r"customer.*(?:demographic|age)",
                    r"who.*(?:customer|buying)",
                    r"show.*(?:audience|demographics)",
                ],
                synthesizer::customer_demographics,
            )?
            .with_examples(&["What are customer demographics?", "Who are our customers?", "Show audience"]),
            PatternEntry::new(
                "customer-satisfaction",
                &[
                    r"customer.*satisfaction",
                    r"how.*(?:happy|satisfied)",
                    r"satisfaction.*score",
                ],
                synthesizer::customer_satisfaction,
            )?
            .with_examples(&["How satisfied are our customers?", "What is the customer satisfaction score?"]),
            PatternEntry::new(
                "inventory-status",
                &[
                    r"inventory.*(?:status|level)",
                    r"stock.*level",
                    r"what.*inventory",
                    r"show.*stock",
                ],
                synthesizer::inventory_status,
            )?
            .with_examples(&["What's our inventory status?", "Show stock levels"]),
            PatternEntry::new(
                "conversion-funnel",
                &[
                    r"conversion.*(?:funnel|rate)",
                    r"funnel.*analysis",
                    r"show.*conversion",
                ],
                synthesizer::conversion_funnel,
            )?
            .with_examples(&["Show me the conversion funnel", "What is our conversion rate?"]),
            PatternEntry::new(
                "website-traffic",
                &[
                    r"(?:website|site).*traffic",
                    r"visits.*trend",
                    r"show.*(?:visitors|traffic)",
                ],
                synthesizer::website_traffic,
            )?
            .with_examples(&["Show website traffic trends", "Show visitors"]),
            PatternEntry::fallback("fallback", synthesizer::fallback)
                .with_examples(&["Tell me a joke", "random gibberish xyz", "Show sales as well as product lines"]),
        ];

        Self::new(entries)
    }

    /// All entries in evaluation order, fallback last
    pub fn entries(&self) -> impl Iterator<Item = &PatternEntry> {
        self.entries.iter().chain(std::iter::once(&self.fallback))
    }

    /// The first entry with a trigger matching `query`
    pub fn classify(&self, query: &str) -> &PatternEntry {
        self.entries
            .iter()
            .find(|entry| entry.matches(query))
            .unwrap_or(&self.fallback)
    }

    /// Route the query to its handler. Never fails: the fallback always matches.
    pub fn dispatch(&self, query: &str, context: &QueryContext) -> ResponseMessage {
        let entry = self.classify(query);
        log::debug!("Query '{}' matched pattern entry '{}'", query, entry.name());
        entry.handle(query, context.last_response.as_ref())
    }
}
