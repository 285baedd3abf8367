//! Chart mapping - from a catalog query result to a render description
//!
//! [`chart_for`] is pure: it reads the result set and never touches storage.
//! An empty result always maps to [`RenderSpec::NoData`].

use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use super::catalog::CatalogQuery;
use super::result::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// Continuous color scale applied to bar values
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorScale {
    Blues,
    Greens,
    Oranges,
    Purples,
    Reds,
    Viridis,
}

/// A named sequence of values aligned with the chart's categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub values: Vec<f64>,
}

impl Series {
    pub fn new(name: impl Into<String>, values: Vec<f64>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Chart {
    GroupedBar {
        title: String,
        x_title: String,
        y_title: String,
        categories: Vec<String>,
        series: Vec<Series>,
    },
    Bar {
        title: String,
        orientation: Orientation,
        labels: Vec<String>,
        values: Vec<f64>,
        color_scale: Option<ColorScale>,
    },
    Pie {
        title: String,
        labels: Vec<String>,
        values: Vec<f64>,
    },
    Line {
        title: String,
        x_title: String,
        y_title: String,
        x: Vec<String>,
        series: Vec<Series>,
    },
}

impl Chart {
    pub fn title(&self) -> &str {
        match self {
            Chart::GroupedBar { title, .. }
            | Chart::Bar { title, .. }
            | Chart::Pie { title, .. }
            | Chart::Line { title, .. } => title,
        }
    }
}

/// What the presentation layer should draw for one result
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "layout", rename_all = "snake_case")]
pub enum RenderSpec {
    NoData { message: String },
    Single { chart: Chart },
    DualSubplot { left: Chart, right: Chart },
}

impl RenderSpec {
    pub fn is_no_data(&self) -> bool {
        matches!(self, RenderSpec::NoData { .. })
    }

    /// Charts in drawing order
    pub fn charts(&self) -> Vec<&Chart> {
        match self {
            RenderSpec::NoData { .. } => Vec::new(),
            RenderSpec::Single { chart } => vec![chart],
            RenderSpec::DualSubplot { left, right } => vec![left, right],
        }
    }
}

fn single(chart: Chart) -> RenderSpec {
    RenderSpec::Single { chart }
}

pub(crate) fn texts(set: &ResultSet, column: &str) -> Result<Vec<String>> {
    let cells = set
        .column(column)
        .ok_or_else(|| Error::Chart(format!("missing column {}", column)))?;
    Ok(cells.into_iter().map(|v| v.to_string()).collect())
}

pub(crate) fn numbers(set: &ResultSet, column: &str) -> Result<Vec<f64>> {
    let cells = set
        .column(column)
        .ok_or_else(|| Error::Chart(format!("missing column {}", column)))?;
    cells
        .into_iter()
        .map(|v| {
            v.as_f64()
                .ok_or_else(|| Error::Chart(format!("non-numeric value '{}' in {}", v, column)))
        })
        .collect()
}

pub(crate) fn bar(
    set: &ResultSet,
    title: &str,
    orientation: Orientation,
    label_column: &str,
    value_column: &str,
    color_scale: Option<ColorScale>,
) -> Result<Chart> {
    Ok(Chart::Bar {
        title: title.to_string(),
        orientation,
        labels: texts(set, label_column)?,
        values: numbers(set, value_column)?,
        color_scale,
    })
}

pub(crate) fn pie(set: &ResultSet, title: &str, label_column: &str, value_column: &str) -> Result<Chart> {
    Ok(Chart::Pie {
        title: title.to_string(),
        labels: texts(set, label_column)?,
        values: numbers(set, value_column)?,
    })
}

/// Occurrences per distinct value, most frequent first; ties keep first-seen order
fn value_counts(values: Vec<String>) -> (Vec<String>, Vec<f64>) {
    let mut counts: Vec<(String, usize)> = Vec::new();
    for value in values {
        match counts.iter_mut().find(|(v, _)| *v == value) {
            Some((_, n)) => *n += 1,
            None => counts.push((value, 1)),
        }
    }
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().map(|(v, n)| (v, n as f64)).unzip()
}

fn no_data_message(query: CatalogQuery) -> String {
    match query {
        CatalogQuery::ExpiringSoon => "No food items are expiring within 7 days.".to_string(),
        CatalogQuery::MonthlyClaimsTrend => "No monthly trend data available yet.".to_string(),
        other => format!("No data available for visualization: {}", other.description()),
    }
}

/// Select the chart for a catalog query result
pub fn chart_for(query: CatalogQuery, set: &ResultSet) -> Result<RenderSpec> {
    if set.is_empty() {
        return Ok(RenderSpec::NoData {
            message: no_data_message(query),
        });
    }

    let description = query.description();
    let spec = match query {
        CatalogQuery::CityCoverage => single(Chart::GroupedBar {
            title: description,
            x_title: "City".to_string(),
            y_title: "Count".to_string(),
            categories: texts(set, "City")?,
            series: vec![
                Series::new("Providers", numbers(set, "Total_Providers")?),
                Series::new("Receivers", numbers(set, "Total_Receivers")?),
            ],
        }),
        CatalogQuery::ProviderTypeContribution => RenderSpec::DualSubplot {
            left: bar(set, "Total Quantity by Provider Type", Orientation::Vertical, "Provider_Type", "Total_Quantity", None)?,
            right: pie(set, "Food Listings Distribution", "Provider_Type", "Total_Food_Listings")?,
        },
        CatalogQuery::ProviderContacts => {
            let (labels, values) = value_counts(texts(set, "City")?);
            single(Chart::Bar {
                title: "Number of Providers by City".to_string(),
                orientation: Orientation::Vertical,
                labels,
                values,
                color_scale: None,
            })
        }
        CatalogQuery::TopReceivers => single(bar(
            set,
            &description,
            Orientation::Horizontal,
            "Receiver_Name",
            "Total_Quantity_Claimed",
            Some(ColorScale::Blues),
        )?),
        CatalogQuery::OverallAvailability => {
            let items = numbers(set, "Total_Food_Items")?[0];
            let providers = numbers(set, "Total_Active_Providers")?[0];
            single(Chart::Pie {
                title: description,
                labels: vec!["Total Food Items".to_string(), "Total Active Providers".to_string()],
                values: vec![items, providers],
            })
        }
        CatalogQuery::ListingsByCity => single(bar(
            set,
            &description,
            Orientation::Vertical,
            "City",
            "Total_Listings",
            Some(ColorScale::Greens),
        )?),
        CatalogQuery::FoodTypeAvailability => RenderSpec::DualSubplot {
            left: bar(set, "Total Quantity by Food Type", Orientation::Vertical, "Food_Type", "Total_Quantity", None)?,
            right: pie(set, "Food Type Distribution", "Food_Type", "Total_Listings")?,
        },
        CatalogQuery::TopClaimedFoods => single(bar(
            &set.head(10),
            "Top 10 Food Items by Claims",
            Orientation::Horizontal,
            "Food_Name",
            "Total_Claims",
            Some(ColorScale::Oranges),
        )?),
        CatalogQuery::TopProvidersByClaims => single(bar(
            set,
            &description,
            Orientation::Horizontal,
            "Provider_Name",
            "Successful_Claims",
            Some(ColorScale::Purples),
        )?),
        CatalogQuery::ClaimStatusDistribution => RenderSpec::DualSubplot {
            left: pie(set, "Claims Status Distribution", "Status", "Count")?,
            right: bar(set, "Claims Status Percentage", Orientation::Vertical, "Status", "Percentage", None)?,
        },
        CatalogQuery::ReceiverTypeAverages => single(bar(
            set,
            &description,
            Orientation::Vertical,
            "Receiver_Type",
            "Average_Quantity_Per_Claim",
            Some(ColorScale::Reds),
        )?),
        CatalogQuery::MealTypeClaims => RenderSpec::DualSubplot {
            left: bar(set, "Total Claims by Meal Type", Orientation::Vertical, "Meal_Type", "Total_Claims", None)?,
            right: bar(set, "Total Quantity by Meal Type", Orientation::Vertical, "Meal_Type", "Total_Quantity_Claimed", None)?,
        },
        CatalogQuery::TopDonors => single(bar(
            &set.head(10),
            "Top 10 Providers by Donation",
            Orientation::Horizontal,
            "Provider_Name",
            "Total_Quantity_Donated",
            Some(ColorScale::Viridis),
        )?),
        CatalogQuery::ExpiringSoon => single(bar(
            set,
            &description,
            Orientation::Horizontal,
            "Food_Name",
            "Days_Until_Expiry",
            Some(ColorScale::Reds),
        )?),
        CatalogQuery::MonthlyClaimsTrend => single(Chart::Line {
            title: description,
            x_title: "Month".to_string(),
            y_title: "Number of Claims".to_string(),
            x: texts(set, "Month")?,
            series: vec![
                Series::new("Total Claims", numbers(set, "Total_Claims")?),
                Series::new("Completed", numbers(set, "Completed_Claims")?),
                Series::new("Pending", numbers(set, "Pending_Claims")?),
                Series::new("Cancelled", numbers(set, "Cancelled_Claims")?),
            ],
        }),
    };
    Ok(spec)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::Value;

    fn set(columns: &[&str], rows: Vec<Vec<Value>>) -> ResultSet {
        ResultSet {
            columns: columns.iter().map(|c| c.to_string()).collect(),
            rows,
        }
    }

    fn text(s: &str) -> Value {
        Value::Text(s.to_string())
    }

    #[test]
    fn test_empty_result_is_no_data_for_every_query() {
        for query in CatalogQuery::all() {
            let spec = chart_for(*query, &ResultSet::default()).unwrap();
            assert!(spec.is_no_data(), "{}", query);
            assert!(spec.charts().is_empty());
        }

        let spec = chart_for(CatalogQuery::ExpiringSoon, &ResultSet::default()).unwrap();
        assert_eq!(
            spec,
            RenderSpec::NoData { message: "No food items are expiring within 7 days.".to_string() }
        );
    }

    #[test]
    fn test_city_coverage_is_grouped_bar() {
        let result = set(
            &["City", "Total_Providers", "Total_Receivers"],
            vec![vec![text("Austin"), Value::Integer(3), Value::Integer(1)]],
        );
        let spec = chart_for(CatalogQuery::CityCoverage, &result).unwrap();
        match spec {
            RenderSpec::Single { chart: Chart::GroupedBar { categories, series, .. } } => {
                assert_eq!(categories, vec!["Austin"]);
                assert_eq!(series.len(), 2);
                assert_eq!(series[0].values, vec![3.0]);
                assert_eq!(series[1].name, "Receivers");
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_provider_contacts_counts_cities() {
        let result = set(
            &["City", "Name", "Type", "Contact", "Address"],
            vec![
                vec![text("Austin"), text("A"), text("Cafeteria"), text("1"), text("x")],
                vec![text("Boston"), text("B"), text("Cafeteria"), text("2"), text("y")],
                vec![text("Boston"), text("C"), text("Cafeteria"), text("3"), text("z")],
            ],
        );
        let spec = chart_for(CatalogQuery::ProviderContacts, &result).unwrap();
        match spec {
            RenderSpec::Single { chart: Chart::Bar { labels, values, .. } } => {
                assert_eq!(labels, vec!["Boston", "Austin"]);
                assert_eq!(values, vec![2.0, 1.0]);
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_status_distribution_is_dual() {
        let result = set(
            &["Status", "Count", "Percentage"],
            vec![
                vec![text("Completed"), Value::Integer(3), Value::Real(75.0)],
                vec![text("Pending"), Value::Integer(1), Value::Real(25.0)],
            ],
        );
        let spec = chart_for(CatalogQuery::ClaimStatusDistribution, &result).unwrap();
        let charts = spec.charts();
        assert_eq!(charts.len(), 2);
        assert!(matches!(charts[0], Chart::Pie { .. }));
        assert!(matches!(charts[1], Chart::Bar { orientation: Orientation::Vertical, .. }));
    }

    #[test]
    fn test_top_claimed_foods_keeps_first_ten() {
        let rows = (0..15)
            .map(|i| vec![text(&format!("Food {}", i)), Value::Integer(15 - i)])
            .collect();
        let result = set(&["Food_Name", "Total_Claims"], rows);
        let spec = chart_for(CatalogQuery::TopClaimedFoods, &result).unwrap();
        match spec {
            RenderSpec::Single { chart: Chart::Bar { labels, orientation, .. } } => {
                assert_eq!(labels.len(), 10);
                assert_eq!(orientation, Orientation::Horizontal);
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_monthly_trend_has_four_series() {
        let result = set(
            &["Month", "Total_Claims", "Completed_Claims", "Pending_Claims", "Cancelled_Claims"],
            vec![vec![text("2025-03"), Value::Integer(3), Value::Integer(1), Value::Integer(1), Value::Integer(1)]],
        );
        let spec = chart_for(CatalogQuery::MonthlyClaimsTrend, &result).unwrap();
        match spec {
            RenderSpec::Single { chart: Chart::Line { series, x, .. } } => {
                assert_eq!(x, vec!["2025-03"]);
                assert_eq!(series.iter().map(|s| s.name.as_str()).collect::<Vec<_>>(), vec!["Total Claims", "Completed", "Pending", "Cancelled"]);
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_missing_column_is_chart_error() {
        let result = set(&["Unexpected"], vec![vec![Value::Integer(1)]]);
        let err = chart_for(CatalogQuery::ListingsByCity, &result).unwrap_err();
        assert!(matches!(err, Error::Chart(_)));
    }

    #[test]
    fn test_render_spec_json_shape() {
        let spec = RenderSpec::NoData { message: "none".to_string() };
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["layout"], "no_data");
        assert_eq!(json["message"], "none");
    }
}
