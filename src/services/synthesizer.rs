use crate::models::response::{
    ChartSpec, ChartType, DataValue, KpiData, QueryInterpretation, ResponseMessage, Trend, AxisKey,
};
use crate::services::datasets;

pub const FALLBACK_INTENT: &str = "Unknown query pattern";

/// Queries the engine has scripted answers for, shown to users as suggestions
pub const EXAMPLE_QUERIES: &[&str] = &[
    "Show me sales over the last quarter",
    "Show monthly revenue",
    "What were our top selling products last month?",
    "Why did sales drop in Q3?",
    "Show sales by category",
    "What is our total revenue?",
    "Compare revenue and profit by quarter",
    "What are customer demographics?",
    "How satisfied are our customers?",
    "Show me the conversion funnel",
    "What's our inventory status?",
    "Show website traffic trends",
];

pub fn quarterly_sales(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Line, datasets::sales_quarterly(), "Quarterly Sales Revenue")
        .with_axes("quarter", "revenue");

    ResponseMessage::mixed(
        chart,
        "Sales performance across quarters shows strong growth in Q4 2024, recovering from a dip in Q3.",
        "This chart shows quarterly revenue trends for 2024. Q4 saw exceptional growth at 32.8%, recovering from a 15.5% decline in Q3. The Q3 drop was likely due to seasonal factors and market conditions, while Q4 benefited from holiday season sales.",
        QueryInterpretation::new(
            "Visualize sales trends over quarterly time periods",
            &["sales", "quarterly", "revenue"],
            "sales.json - quarterly data",
            &["User wants to see revenue as primary metric", "Quarterly aggregation is appropriate"],
        ),
    )
    .with_follow_ups(&["Why did sales drop in Q3?", "Show monthly revenue", "Make it a bar chart"])
}

pub fn monthly_revenue(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Bar, datasets::sales_monthly(), "Monthly Revenue")
        .with_axes("month", "revenue");

    ResponseMessage::mixed(
        chart,
        "December 2024 had the highest monthly revenue at $109,000.",
        "Monthly revenue breakdown shows consistent growth from October through December, with a notable dip during the summer months (July-September). The year-end surge is typical for retail with holiday shopping season.",
        QueryInterpretation::new(
            "Display monthly sales data with bar chart visualization",
            &["monthly", "revenue", "sales"],
            "sales.json - monthly data",
            &["Bar chart best represents discrete monthly values", "Full year 2024 data is relevant"],
        ),
    )
    .with_follow_ups(&["Show as area chart", "Show sales by category"])
}

pub fn revenue_kpi(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let latest: Vec<_> = datasets::sales_quarterly()
        .into_iter()
        .filter(|row| row.get("quarter") == Some(&DataValue::Text("Q4 2024".to_string())))
        .map(|mut row| {
            row.retain(|key, _| key == "quarter" || key == "revenue");
            row
        })
        .collect();

    let chart = ChartSpec::new(ChartType::Kpi, latest, "Q4 2024 Revenue")
        .with_axes("quarter", "revenue")
        .with_kpi(KpiData {
            value: DataValue::Integer(314_200),
            label: "Q4 2024 Revenue".to_string(),
            trend: Some(Trend::Up),
            change_percent: Some(32.8),
            comparison_label: Some("vs Q3 2024".to_string()),
        });

    ResponseMessage::mixed(
        chart,
        "Q4 2024 revenue reached $314,200, up 32.8% on Q3. Full-year 2024 revenue was $1,080,800.",
        "The latest quarter is the strongest of the year and more than recovers the Q3 decline. Holiday demand in November and December drove most of the gain.",
        QueryInterpretation::new(
            "Report headline revenue figure",
            &["revenue", "total", "Q4"],
            "sales.json - quarterly data",
            &["Most recent quarter is the headline figure", "Quarter-over-quarter change is the relevant comparison"],
        ),
    )
    .with_follow_ups(&["Show me sales over the last quarter", "Compare revenue and profit by quarter"])
}

pub fn revenue_vs_profit(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Line, datasets::sales_quarterly(), "Quarterly Revenue vs Profit")
        .with_axes("quarter", AxisKey::Multi(vec!["revenue".to_string(), "profit".to_string()]));

    ResponseMessage::mixed(
        chart,
        "Profit margin widened to 21.9% in Q4 2024, up from 18.0% in Q3.",
        "Profit tracks revenue closely but moves further in both directions: margin fell in Q3 as fixed costs stayed flat against lower sales, then expanded in Q4 as volume returned. Margins ran at 19.2% in Q1 and 20.0% in Q2.",
        QueryInterpretation::new(
            "Compare revenue and profit across quarters",
            &["revenue", "profit", "quarterly"],
            "sales.json - quarterly data",
            &["Both series share the same currency scale", "Quarterly aggregation is appropriate"],
        ),
    )
    .with_follow_ups(&["Make it a stacked bar chart", "What is our total revenue?"])
}

pub fn top_products(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    ResponseMessage::text(
        r#"Based on the data, our top 5 selling products last month were:

1. **Smart Watch** - 654 units sold, $163,500 revenue
2. **Wireless Headphones** - 842 units sold, $126,300 revenue
3. **Portable Charger** - 1,450 units sold, $72,500 revenue
4. **Laptop Stand** - 1,240 units sold, $62,000 revenue
5. **USB-C Cable** - 2,180 units sold, $32,700 revenue

The Smart Watch leads in revenue despite selling fewer units than some other products, indicating a higher price point. USB-C Cables had the highest unit sales but lower revenue due to the lower price point."#,
        "This analysis ranks products by both revenue and units sold, highlighting that volume doesn't always correlate with revenue impact.",
        QueryInterpretation::new(
            "Identify and rank top-performing products",
            &["products", "sales", "ranking"],
            "sales.json - topProducts data",
            &["User wants both revenue and unit metrics", "Recent time period is implied"],
        ),
    )
}

pub fn sales_decline(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    ResponseMessage::text(
        r#"The Q3 2024 sales decline of 15.5% can be attributed to several factors:

**Primary Factors:**
- **Seasonal Slowdown**: Summer months (July-September) typically see reduced consumer spending in our core categories
- **Market Competition**: Increased competitive pressure from new market entrants during this period
- **Inventory Constraints**: Stock shortages in key products (Portable Chargers down to critical levels)

**Supporting Data:**
- Electronics category showed the biggest impact, declining 18% from Q2
- Customer acquisition costs increased 22% while conversion rates dropped 12%
- Mobile traffic increased but had lower conversion rates than desktop

**Recovery Strategy:**
Q4's strong recovery (32.8% growth) suggests our response strategies were effective: expanded inventory, holiday promotions, and improved mobile experience."#,
        "This analysis combines sales data with inventory, customer behavior, and market factors to explain the Q3 performance anomaly.",
        QueryInterpretation::new(
            "Explain causal factors behind sales decline",
            &["Q3", "sales decline", "analysis"],
            "sales.json, inventory.json, analytics.json",
            &["User wants comprehensive analysis", "Multi-factor explanation is expected", "Q3 refers to 2024"],
        ),
    )
}

pub fn sales_by_category(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Pie, datasets::sales_by_category(), "Sales by Category");

    ResponseMessage::mixed(
        chart,
        "Electronics dominates with 39.5% of total sales, followed by Clothing at 29.0%.",
        "Category distribution shows Electronics and Clothing account for nearly 70% of revenue. This concentration suggests opportunity for diversification while doubling down on these core strengths.",
        QueryInterpretation::new(
            "Show sales distribution across product categories",
            &["categories", "sales", "distribution"],
            "sales.json - byCategory data",
            &["Pie chart best shows proportional distribution", "All categories should be included"],
        ),
    )
    .with_follow_ups(&["What were our top selling products last month?", "Make it a bar chart"])
}

pub fn customer_demographics(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(
        ChartType::Bar,
        datasets::customer_demographics(),
        "Customer Demographics by Age",
    )
    .with_axes("ageGroup", "count");

    ResponseMessage::mixed(
        chart,
        "Our largest customer segment is 25-34 year olds, representing 30.4% of our customer base.",
        "The customer base skews younger, with 72.2% of customers under 45. The 25-34 age group is both the largest segment and typically has high lifetime value. Consider targeting marketing efforts to maintain and grow this demographic.",
        QueryInterpretation::new(
            "Visualize customer age distribution",
            &["customers", "demographics", "age groups"],
            "customers.json - demographics data",
            &["Age grouping is the primary demographic of interest", "Bar chart effectively shows count comparison"],
        ),
    )
    .with_follow_ups(&["How satisfied are our customers?", "Make it a pie chart"])
}

pub fn customer_satisfaction(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Pie, datasets::customer_satisfaction(), "Customer Satisfaction");

    ResponseMessage::mixed(
        chart,
        "87% of customers are satisfied or very satisfied with our service.",
        "Overall satisfaction is strong with 62% very satisfied and 25% satisfied. Only 5% report dissatisfaction. This high satisfaction rate correlates with our strong retention metrics and suggests positive word-of-mouth potential.",
        QueryInterpretation::new(
            "Display customer satisfaction metrics",
            &["satisfaction", "customers", "feedback"],
            "customers.json - satisfaction data",
            &["Pie chart shows satisfaction distribution clearly", "Current survey data is representative"],
        ),
    )
    .with_follow_ups(&["What are customer demographics?", "Make it a bar chart"])
}

pub fn inventory_status(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    ResponseMessage::text(
        r#"**Inventory Status Overview:**

**Critical Items (Immediate Attention Required):**
- Portable Charger: 125 units (optimal: 400) - 69% below target

**Low Stock (Monitor Closely):**
- Wireless Headphones: 245 units (optimal: 300) - 18% below target

**Excess Stock:**
- Screen Protector: 980 units (optimal: 700) - 40% over target

**Healthy Stock Levels:**
- Smart Watch, Laptop Stand, USB-C Cable, Bluetooth Speaker, Phone Case

**Recommendation:** Priority reorder for Portable Chargers to avoid stockouts. Consider promotion for Screen Protectors to reduce excess inventory."#,
        "This analysis categorizes inventory by urgency, highlighting items requiring immediate action versus those in healthy ranges.",
        QueryInterpretation::new(
            "Assess current inventory health and identify issues",
            &["inventory", "stock levels", "status"],
            "inventory.json - stockLevels data",
            &["User wants actionable insights, not just raw data", "Comparison to optimal levels provides context"],
        ),
    )
}

pub fn conversion_funnel(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Funnel, datasets::conversion_funnel(), "Conversion Funnel");

    ResponseMessage::mixed(
        chart,
        "Overall conversion rate from landing page to purchase is 12.4%.",
        "The biggest drop-off occurs between Product View (62%) and Add to Cart (31%), losing half of interested users. The checkout-to-purchase rate is relatively strong at 67%, suggesting the checkout process is smooth. Focus optimization efforts on the product page and add-to-cart experience.",
        QueryInterpretation::new(
            "Visualize conversion funnel and identify drop-off points",
            &["conversion", "funnel", "user journey"],
            "analytics.json - conversion data",
            &["Standard e-commerce funnel stages", "Percentage of initial traffic is most relevant"],
        ),
    )
    .with_follow_ups(&["Show website traffic trends", "Make it a bar chart"])
}

pub fn website_traffic(_query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let chart = ChartSpec::new(ChartType::Line, datasets::website_traffic(), "Website Traffic Trend")
        .with_axes("date", "visits");

    ResponseMessage::mixed(
        chart,
        "Traffic has grown 25.8% over the past month, reaching 15,600 visits.",
        "Weekly traffic shows healthy growth with bounce rate improving from 42% to 36%. The mid-October spike to 14,800 visits coincides with a promotional campaign. Sustained growth suggests effective marketing and SEO efforts.",
        QueryInterpretation::new(
            "Display website traffic trends over time",
            &["traffic", "visits", "trend"],
            "analytics.json - traffic data",
            &["Weekly granularity is appropriate", "Recent month provides relevant trend insight"],
        ),
    )
    .with_follow_ups(&["Show me the conversion funnel", "Show as area chart"])
}

/// Catch-all answer listing what the engine can respond to
pub fn fallback(query: &str, _last: Option<&ResponseMessage>) -> ResponseMessage {
    let examples = EXAMPLE_QUERIES
        .iter()
        .map(|example| format!("- \"{}\"", example))
        .collect::<Vec<_>>()
        .join("\n");

    let text = format!(
        "I understand you're asking about \"{}\", but I don't have a pre-configured response for that specific query yet.\n\n\
         Here are some questions I can help with:\n{}\n\n\
         You can also try iterating on visualizations by saying things like \"make it a bar chart\" or \"show as area chart\".",
        query, examples
    );

    ResponseMessage::text(
        text,
        "This is a fallback response for unrecognized queries. In a production system, this would be handled by actual AI.",
        QueryInterpretation::new(
            FALLBACK_INTENT,
            &[],
            "N/A",
            &["Query doesn't match known patterns", "User needs guidance on available queries"],
        ),
    )
}
