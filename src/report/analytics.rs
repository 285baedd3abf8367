//! Analytics-tab charts, outside the numbered catalog

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::storage::FoodStore;
use crate::{Error, Result};
use super::chart::{self, Orientation, RenderSpec};
use super::result::ResultSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Analytic {
    ProviderContribution,
    ClaimsStatus,
    FoodTypeDistribution,
}

impl Analytic {
    pub fn all() -> &'static [Analytic] {
        &[
            Analytic::ProviderContribution,
            Analytic::ClaimsStatus,
            Analytic::FoodTypeDistribution,
        ]
    }

    /// URL/CLI slug
    pub fn as_str(&self) -> &'static str {
        match self {
            Analytic::ProviderContribution => "provider_contribution",
            Analytic::ClaimsStatus => "claims_status",
            Analytic::FoodTypeDistribution => "food_type_distribution",
        }
    }

    pub fn heading(&self) -> &'static str {
        match self {
            Analytic::ProviderContribution => "Provider Contribution Analysis",
            Analytic::ClaimsStatus => "Claims Status Analysis",
            Analytic::FoodTypeDistribution => "Food Type Distribution",
        }
    }

    pub fn sql(&self) -> &'static str {
        match self {
            Analytic::ProviderContribution => r#"
                SELECT p.Type AS Provider_Type, COUNT(fl.Food_ID) AS Total_Food_Listings,
                       COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity
                FROM providers p
                JOIN food_listings fl ON p.Provider_ID = fl.Provider_ID
                GROUP BY p.Type
                ORDER BY Total_Quantity DESC
            "#,
            Analytic::ClaimsStatus => r#"
                SELECT Status, COUNT(*) AS Count
                FROM claims
                GROUP BY Status
                ORDER BY Count DESC
            "#,
            Analytic::FoodTypeDistribution => r#"
                SELECT Food_Type, COUNT(Food_ID) AS Total_Listings,
                       COALESCE(SUM(Quantity), 0) AS Total_Quantity
                FROM food_listings
                GROUP BY Food_Type
                ORDER BY Total_Quantity DESC
            "#,
        }
    }

    fn empty_message(&self) -> &'static str {
        match self {
            Analytic::ProviderContribution => "No provider data available",
            Analytic::ClaimsStatus => "No claims data available",
            Analytic::FoodTypeDistribution => "No food listings data available",
        }
    }

    /// Map a result of [`Analytic::sql`] to its chart
    pub fn chart(&self, set: &ResultSet) -> Result<RenderSpec> {
        if set.is_empty() {
            return Ok(RenderSpec::NoData {
                message: self.empty_message().to_string(),
            });
        }
        let chart = match self {
            Analytic::ProviderContribution => chart::bar(
                set,
                "Food Contribution by Provider Type",
                Orientation::Vertical,
                "Provider_Type",
                "Total_Quantity",
                None,
            )?,
            Analytic::ClaimsStatus => chart::pie(set, "Claims Status Distribution", "Status", "Count")?,
            Analytic::FoodTypeDistribution => chart::bar(
                set,
                "Food Availability by Type",
                Orientation::Vertical,
                "Food_Type",
                "Total_Quantity",
                None,
            )?,
        };
        Ok(RenderSpec::Single { chart })
    }

    pub fn run(&self, store: &FoodStore) -> Result<AnalyticRun> {
        let result = store.query(self.sql())?;
        let render = self.chart(&result)?;
        Ok(AnalyticRun {
            analytic: *self,
            result,
            render,
        })
    }
}

impl FromStr for Analytic {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase().replace('-', "_");
        Analytic::all()
            .iter()
            .copied()
            .find(|a| a.as_str() == wanted)
            .ok_or_else(|| Error::InvalidValue(format!("Unknown analytic: {}", s)))
    }
}

impl std::fmt::Display for Analytic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.heading())
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct AnalyticRun {
    pub analytic: Analytic,
    pub result: ResultSet,
    pub render: RenderSpec,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Claim, ClaimStatus, parse_timestamp};
    use crate::report::Chart;

    #[test]
    fn test_empty_tables_give_no_data() {
        let store = FoodStore::open_in_memory().unwrap();
        for analytic in Analytic::all() {
            let run = analytic.run(&store).unwrap();
            assert!(run.result.is_empty());
            assert!(run.render.is_no_data());
        }
    }

    #[test]
    fn test_claims_status_is_pie() {
        let store = FoodStore::open_in_memory().unwrap();
        let ts = parse_timestamp("2025-01-01 09:00:00").unwrap();
        store.insert_claim(&Claim::new(1, 1, 1, ClaimStatus::Pending, ts)).unwrap();
        store.insert_claim(&Claim::new(2, 1, 1, ClaimStatus::Pending, ts)).unwrap();

        let run = Analytic::ClaimsStatus.run(&store).unwrap();
        match run.render {
            RenderSpec::Single { chart: Chart::Pie { labels, values, .. } } => {
                assert_eq!(labels, vec!["Pending"]);
                assert_eq!(values, vec![2.0]);
            }
            other => panic!("unexpected spec {:?}", other),
        }
    }

    #[test]
    fn test_parse_slug() {
        assert_eq!("claims-status".parse::<Analytic>().unwrap(), Analytic::ClaimsStatus);
        assert!("nope".parse::<Analytic>().is_err());
    }
}
