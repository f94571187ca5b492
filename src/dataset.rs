//! The in-memory sales dataset and its row schema.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A single order line from the Superstore export.
///
/// Field names map onto the dataset's column headers; columns not listed
/// here (ship mode, customer, postal code, ...) are ignored on load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaleRecord {
    #[serde(rename = "Order Date", with = "order_date")]
    pub order_date: NaiveDate,
    #[serde(rename = "Region")]
    pub region: String,
    #[serde(rename = "State")]
    pub state: String,
    #[serde(rename = "City")]
    pub city: String,
    #[serde(rename = "Category")]
    pub category: String,
    #[serde(rename = "Sub-Category")]
    pub sub_category: String,
    #[serde(rename = "Sales")]
    pub sales: f64,
    #[serde(rename = "Profit")]
    pub profit: f64,
    #[serde(rename = "Quantity")]
    pub quantity: u32,
}

/// An immutable, fully loaded dataset.
///
/// The engine only ever derives filtered or grouped views from it; rows are
/// never mutated or reordered after load.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    rows: Vec<SaleRecord>,
}

impl Dataset {
    pub fn new(rows: Vec<SaleRecord>) -> Self {
        Self { rows }
    }

    pub fn rows(&self) -> &[SaleRecord] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Earliest and latest order date in the dataset, used to seed the
    /// default date-range bounds. `None` for an empty dataset.
    pub fn date_span(&self) -> Option<(NaiveDate, NaiveDate)> {
        let first = self.rows.first()?.order_date;
        let span = self
            .rows
            .iter()
            .fold((first, first), |(min, max), row| {
                (min.min(row.order_date), max.max(row.order_date))
            });
        Some(span)
    }
}

/// Parses a date cell, accepting the month-first format the Superstore
/// export ships with as well as ISO dates.
pub fn parse_date(value: &str) -> Option<NaiveDate> {
    const FORMATS: &[&str] = &["%m/%d/%Y", "%m/%d/%y", "%Y-%m-%d"];

    let value = value.trim();
    FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(value, fmt).ok())
}

mod order_date {
    use chrono::NaiveDate;
    use serde::{Deserialize, Deserializer, Serializer, de};

    pub fn serialize<S: Serializer>(date: &NaiveDate, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&date.format("%Y-%m-%d").to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDate, D::Error> {
        let raw = String::deserialize(deserializer)?;
        super::parse_date(&raw)
            .ok_or_else(|| de::Error::custom(format!("unrecognized date: {raw:?}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(date: &str) -> SaleRecord {
        SaleRecord {
            order_date: parse_date(date).unwrap(),
            region: "East".to_string(),
            state: "New York".to_string(),
            city: "New York City".to_string(),
            category: "Furniture".to_string(),
            sub_category: "Chairs".to_string(),
            sales: 100.0,
            profit: 20.0,
            quantity: 2,
        }
    }

    #[test]
    fn test_parse_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 15).unwrap();
        assert_eq!(parse_date("3/15/2021"), Some(expected));
        assert_eq!(parse_date("03/15/21"), Some(expected));
        assert_eq!(parse_date("2021-03-15"), Some(expected));
        assert_eq!(parse_date("15 March 2021"), None);
        assert_eq!(parse_date(""), None);
    }

    #[test]
    fn test_date_span() {
        let ds = Dataset::new(vec![
            record("2021-06-01"),
            record("2021-01-15"),
            record("2021-12-31"),
        ]);

        let (min, max) = ds.date_span().unwrap();
        assert_eq!(min, NaiveDate::from_ymd_opt(2021, 1, 15).unwrap());
        assert_eq!(max, NaiveDate::from_ymd_opt(2021, 12, 31).unwrap());
    }

    #[test]
    fn test_date_span_empty_dataset() {
        assert!(Dataset::new(vec![]).date_span().is_none());
    }

    #[test]
    fn test_record_deserializes_from_superstore_headers() {
        let csv = "\
Order Date,Region,State,City,Category,Sub-Category,Sales,Profit,Quantity
11/8/2016,South,Kentucky,Henderson,Furniture,Bookcases,261.96,41.9136,2
";
        let mut rdr = csv::Reader::from_reader(csv.as_bytes());
        let rows: Vec<SaleRecord> = rdr.deserialize().collect::<Result<_, _>>().unwrap();

        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].order_date, NaiveDate::from_ymd_opt(2016, 11, 8).unwrap());
        assert_eq!(rows[0].sub_category, "Bookcases");
        assert_eq!(rows[0].quantity, 2);
    }
}
