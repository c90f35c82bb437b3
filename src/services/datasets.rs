use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::models::dataset::{DatasetSchema, FieldSchema};
use crate::models::response::{DataRecord, DataValue};

/// (quarter, revenue, profit, orders)
const SALES_QUARTERLY: &[(&str, i64, i64, i64)] = &[
    ("Q1 2024", 250_000, 48_000, 3_120),
    ("Q2 2024", 280_000, 56_000, 3_410),
    ("Q3 2024", 236_600, 42_500, 2_980),
    ("Q4 2024", 314_200, 68_900, 3_870),
];

/// (month, revenue, orders)
const SALES_MONTHLY: &[(&str, i64, i64)] = &[
    ("Jan", 80_400, 1_010),
    ("Feb", 81_200, 1_020),
    ("Mar", 88_400, 1_090),
    ("Apr", 90_500, 1_110),
    ("May", 93_200, 1_130),
    ("Jun", 96_300, 1_170),
    ("Jul", 76_800, 970),
    ("Aug", 77_500, 990),
    ("Sep", 82_300, 1_020),
    ("Oct", 98_600, 1_210),
    ("Nov", 106_600, 1_300),
    ("Dec", 109_000, 1_360),
];

/// (category, revenue, share of total)
const SALES_BY_CATEGORY: &[(&str, i64, f64)] = &[
    ("Electronics", 426_916, 39.5),
    ("Clothing", 313_432, 29.0),
    ("Home & Garden", 178_332, 16.5),
    ("Sports", 97_272, 9.0),
    ("Books", 64_848, 6.0),
];

/// (product, units sold, revenue)
const TOP_PRODUCTS: &[(&str, i64, i64)] = &[
    ("Smart Watch", 654, 163_500),
    ("Wireless Headphones", 842, 126_300),
    ("Portable Charger", 1_450, 72_500),
    ("Laptop Stand", 1_240, 62_000),
    ("USB-C Cable", 2_180, 32_700),
];

/// (age group, customers, share of total)
const CUSTOMER_DEMOGRAPHICS: &[(&str, i64, f64)] = &[
    ("18-24", 2_150, 17.2),
    ("25-34", 3_800, 30.4),
    ("35-44", 3_075, 24.6),
    ("45-54", 1_975, 15.8),
    ("55+", 1_500, 12.0),
];

/// (rating, percent of respondents)
const CUSTOMER_SATISFACTION: &[(&str, i64)] = &[
    ("Very Satisfied", 62),
    ("Satisfied", 25),
    ("Neutral", 8),
    ("Dissatisfied", 3),
    ("Very Dissatisfied", 2),
];

/// (stage, users, percent of landing traffic)
const CONVERSION_FUNNEL: &[(&str, i64, f64)] = &[
    ("Landing Page", 10_000, 100.0),
    ("Product View", 6_200, 62.0),
    ("Add to Cart", 3_100, 31.0),
    ("Checkout", 1_850, 18.5),
    ("Purchase", 1_240, 12.4),
];

/// (week starting, visits, bounce rate)
const WEBSITE_TRAFFIC: &[(&str, i64, i64)] = &[
    ("2024-09-30", 12_400, 42),
    ("2024-10-07", 12_900, 41),
    ("2024-10-14", 14_800, 39),
    ("2024-10-21", 13_600, 38),
    ("2024-10-28", 15_600, 36),
];

/// (product, current units, optimal units, status)
const STOCK_LEVELS: &[(&str, i64, i64, &str)] = &[
    ("Portable Charger", 125, 400, "critical"),
    ("Wireless Headphones", 245, 300, "low"),
    ("Screen Protector", 980, 700, "excess"),
    ("Smart Watch", 310, 300, "healthy"),
    ("Laptop Stand", 420, 400, "healthy"),
    ("USB-C Cable", 850, 800, "healthy"),
    ("Bluetooth Speaker", 190, 200, "healthy"),
    ("Phone Case", 560, 550, "healthy"),
];

fn record(fields: Vec<(&str, DataValue)>) -> DataRecord {
    fields
        .into_iter()
        .map(|(key, value)| (key.to_string(), value))
        .collect()
}

fn text(value: &str) -> DataValue {
    DataValue::Text(value.to_string())
}

pub fn sales_quarterly() -> Vec<DataRecord> {
    SALES_QUARTERLY
        .iter()
        .map(|&(quarter, revenue, profit, orders)| {
            record(vec![
                ("quarter", text(quarter)),
                ("revenue", DataValue::Integer(revenue)),
                ("profit", DataValue::Integer(profit)),
                ("orders", DataValue::Integer(orders)),
            ])
        })
        .collect()
}

pub fn sales_monthly() -> Vec<DataRecord> {
    SALES_MONTHLY
        .iter()
        .map(|&(month, revenue, orders)| {
            record(vec![
                ("month", text(month)),
                ("revenue", DataValue::Integer(revenue)),
                ("orders", DataValue::Integer(orders)),
            ])
        })
        .collect()
}

pub fn sales_by_category() -> Vec<DataRecord> {
    SALES_BY_CATEGORY
        .iter()
        .map(|&(name, value, percentage)| {
            record(vec![
                ("name", text(name)),
                ("value", DataValue::Integer(value)),
                ("percentage", DataValue::Float(percentage)),
            ])
        })
        .collect()
}

pub fn top_products() -> Vec<DataRecord> {
    TOP_PRODUCTS
        .iter()
        .map(|&(product, units, revenue)| {
            record(vec![
                ("product", text(product)),
                ("unitsSold", DataValue::Integer(units)),
                ("revenue", DataValue::Integer(revenue)),
            ])
        })
        .collect()
}

pub fn customer_demographics() -> Vec<DataRecord> {
    CUSTOMER_DEMOGRAPHICS
        .iter()
        .map(|&(age_group, count, percentage)| {
            record(vec![
                ("ageGroup", text(age_group)),
                ("count", DataValue::Integer(count)),
                ("percentage", DataValue::Float(percentage)),
            ])
        })
        .collect()
}

pub fn customer_satisfaction() -> Vec<DataRecord> {
    CUSTOMER_SATISFACTION
        .iter()
        .map(|&(name, value)| record(vec![("name", text(name)), ("value", DataValue::Integer(value))]))
        .collect()
}

pub fn conversion_funnel() -> Vec<DataRecord> {
    CONVERSION_FUNNEL
        .iter()
        .map(|&(name, value, percentage)| {
            record(vec![
                ("name", text(name)),
                ("value", DataValue::Integer(value)),
                ("percentage", DataValue::Float(percentage)),
            ])
        })
        .collect()
}

pub fn website_traffic() -> Vec<DataRecord> {
    WEBSITE_TRAFFIC
        .iter()
        .map(|&(date, visits, bounce_rate)| {
            record(vec![
                ("date", text(date)),
                ("visits", DataValue::Integer(visits)),
                ("bounceRate", DataValue::Integer(bounce_rate)),
            ])
        })
        .collect()
}

pub fn stock_levels() -> Vec<DataRecord> {
    STOCK_LEVELS
        .iter()
        .map(|&(product, current, optimal, status)| {
            record(vec![
                ("product", text(product)),
                ("current", DataValue::Integer(current)),
                ("optimal", DataValue::Integer(optimal)),
                ("status", text(status)),
            ])
        })
        .collect()
}

/// The four business domains in the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Sales,
    Customers,
    Analytics,
    Inventory,
}

impl Dataset {
    pub const ALL: [Dataset; 4] = [
        Dataset::Sales,
        Dataset::Customers,
        Dataset::Analytics,
        Dataset::Inventory,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Sales => "sales",
            Dataset::Customers => "customers",
            Dataset::Analytics => "analytics",
            Dataset::Inventory => "inventory",
        }
    }

    /// Named tables of the dataset in declaration order
    pub fn tables(&self) -> Vec<(&'static str, Vec<DataRecord>)> {
        match self {
            Dataset::Sales => vec![
                ("quarterly", sales_quarterly()),
                ("monthly", sales_monthly()),
                ("byCategory", sales_by_category()),
                ("topProducts", top_products()),
            ],
            Dataset::Customers => vec![
                ("demographics", customer_demographics()),
                ("satisfaction", customer_satisfaction()),
            ],
            Dataset::Analytics => vec![
                ("conversion", conversion_funnel()),
                ("traffic", website_traffic()),
            ],
            Dataset::Inventory => vec![("stockLevels", stock_levels())],
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Dataset {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Dataset::ALL
            .iter()
            .copied()
            .find(|dataset| dataset.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| anyhow::anyhow!("Unknown dataset: {}", s))
    }
}

/// Names of every dataset in the store
pub fn list_datasets() -> Vec<String> {
    Dataset::ALL.iter().map(|d| d.name().to_string()).collect()
}

fn value_matches(value: &DataValue, raw: &str) -> bool {
    match value {
        DataValue::Text(s) => s == raw,
        DataValue::Integer(n) => raw.trim().parse::<i64>().map(|r| r == *n).unwrap_or(false),
        DataValue::Float(f) => raw.trim().parse::<f64>().map(|r| r == *f).unwrap_or(false),
    }
}

/// Every row of every table in the dataset, keeping only rows whose fields
/// equal all the given filters. Unknown datasets yield no rows.
pub fn query_dataset(name: &str, filters: &HashMap<String, String>) -> Vec<DataRecord> {
    let dataset = match name.parse::<Dataset>() {
        Ok(dataset) => dataset,
        Err(_) => return Vec::new(),
    };

    dataset
        .tables()
        .into_iter()
        .flat_map(|(_, rows)| rows)
        .filter(|row| {
            filters.iter().all(|(key, expected)| {
                row.get(key).map(|value| value_matches(value, expected)).unwrap_or(false)
            })
        })
        .collect()
}

/// Schema of the dataset's first table
pub fn schema(name: &str) -> Option<DatasetSchema> {
    let dataset = name.parse::<Dataset>().ok()?;
    let (_, rows) = dataset.tables().into_iter().next()?;
    let first = rows.first()?;

    Some(DatasetSchema {
        name: dataset.name().to_string(),
        fields: first
            .iter()
            .map(|(field, value)| FieldSchema {
                name: field.clone(),
                field_type: value.type_name().to_string(),
            })
            .collect(),
    })
}
