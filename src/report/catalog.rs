//! The reporting catalog: fifteen fixed, parameter-free queries
//!
//! Each entry pairs a statement with a description and a chart rule
//! (see [`crate::report::chart`]). Aggregated sums are wrapped in
//! `COALESCE(..., 0)` so empty tables yield zeros instead of NULL.

use serde::{Deserialize, Serialize};
use crate::storage::FoodStore;
use crate::{Error, Result};
use super::result::ResultSet;

/// One of the fifteen catalog queries, in catalog order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CatalogQuery {
    CityCoverage,
    ProviderTypeContribution,
    ProviderContacts,
    TopReceivers,
    OverallAvailability,
    ListingsByCity,
    FoodTypeAvailability,
    TopClaimedFoods,
    TopProvidersByClaims,
    ClaimStatusDistribution,
    ReceiverTypeAverages,
    MealTypeClaims,
    TopDonors,
    ExpiringSoon,
    MonthlyClaimsTrend,
}

impl CatalogQuery {
    /// Number of catalog entries
    pub const COUNT: usize = 15;

    pub fn all() -> &'static [CatalogQuery] {
        &[
            CatalogQuery::CityCoverage,
            CatalogQuery::ProviderTypeContribution,
            CatalogQuery::ProviderContacts,
            CatalogQuery::TopReceivers,
            CatalogQuery::OverallAvailability,
            CatalogQuery::ListingsByCity,
            CatalogQuery::FoodTypeAvailability,
            CatalogQuery::TopClaimedFoods,
            CatalogQuery::TopProvidersByClaims,
            CatalogQuery::ClaimStatusDistribution,
            CatalogQuery::ReceiverTypeAverages,
            CatalogQuery::MealTypeClaims,
            CatalogQuery::TopDonors,
            CatalogQuery::ExpiringSoon,
            CatalogQuery::MonthlyClaimsTrend,
        ]
    }

    /// Zero-based position in the catalog
    pub fn index(&self) -> usize {
        *self as usize
    }

    /// One-based number as shown to users
    pub fn number(&self) -> usize {
        self.index() + 1
    }

    pub fn from_index(index: usize) -> Option<CatalogQuery> {
        Self::all().get(index).copied()
    }

    pub fn from_number(number: usize) -> Option<CatalogQuery> {
        number.checked_sub(1).and_then(Self::from_index)
    }

    /// Title without the leading number
    pub fn title(&self) -> &'static str {
        match self {
            CatalogQuery::CityCoverage => "Food Providers and Receivers Count by City",
            CatalogQuery::ProviderTypeContribution => "Provider Type Contribution Analysis",
            CatalogQuery::ProviderContacts => "Provider Contact Information by City",
            CatalogQuery::TopReceivers => "Top 10 Receivers by Quantity Claimed",
            CatalogQuery::OverallAvailability => "Overall Food Availability Statistics",
            CatalogQuery::ListingsByCity => "Food Listings Count by City",
            CatalogQuery::FoodTypeAvailability => "Food Type Availability Analysis",
            CatalogQuery::TopClaimedFoods => "Top 15 Food Items by Number of Claims",
            CatalogQuery::TopProvidersByClaims => "Top 10 Providers by Successful Claims",
            CatalogQuery::ClaimStatusDistribution => "Claims Status Distribution",
            CatalogQuery::ReceiverTypeAverages => "Average Quantity Claimed by Receiver Type",
            CatalogQuery::MealTypeClaims => "Meal Type Claims Analysis",
            CatalogQuery::TopDonors => "Top 15 Providers by Total Quantity Donated",
            CatalogQuery::ExpiringSoon => "Food Items Expiring Within 7 Days",
            CatalogQuery::MonthlyClaimsTrend => "Monthly Claims Trend",
        }
    }

    /// Numbered description, e.g. `"5. Overall Food Availability Statistics"`
    pub fn description(&self) -> String {
        format!("{}. {}", self.number(), self.title())
    }

    pub fn sql(&self) -> &'static str {
        match self {
            CatalogQuery::CityCoverage => r#"
                SELECT
                    p.City,
                    COUNT(DISTINCT p.Provider_ID) AS Total_Providers,
                    COUNT(DISTINCT r.Receiver_ID) AS Total_Receivers
                FROM providers p
                LEFT JOIN receivers r ON p.City = r.City
                GROUP BY p.City
                ORDER BY Total_Providers DESC
            "#,
            CatalogQuery::ProviderTypeContribution => r#"
                SELECT
                    p.Type AS Provider_Type,
                    COUNT(fl.Food_ID) AS Total_Food_Listings,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity
                FROM providers p
                JOIN food_listings fl ON p.Provider_ID = fl.Provider_ID
                GROUP BY p.Type
                ORDER BY Total_Quantity DESC
            "#,
            CatalogQuery::ProviderContacts => r#"
                SELECT City, Name, Type, Contact, Address
                FROM providers
                ORDER BY City, Name
            "#,
            CatalogQuery::TopReceivers => r#"
                SELECT
                    r.Name AS Receiver_Name,
                    r.Type AS Receiver_Type,
                    r.City,
                    COUNT(c.Claim_ID) AS Total_Claims,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity_Claimed
                FROM receivers r
                JOIN claims c ON r.Receiver_ID = c.Receiver_ID
                JOIN food_listings fl ON c.Food_ID = fl.Food_ID
                WHERE c.Status = 'Completed'
                GROUP BY r.Receiver_ID, r.Name, r.Type, r.City
                ORDER BY Total_Quantity_Claimed DESC
                LIMIT 10
            "#,
            CatalogQuery::OverallAvailability => r#"
                SELECT
                    COALESCE(SUM(Quantity), 0) AS Total_Available_Quantity,
                    COUNT(Food_ID) AS Total_Food_Items,
                    COUNT(DISTINCT Provider_ID) AS Total_Active_Providers
                FROM food_listings
            "#,
            CatalogQuery::ListingsByCity => r#"
                SELECT
                    Location AS City,
                    COUNT(Food_ID) AS Total_Listings,
                    COALESCE(SUM(Quantity), 0) AS Total_Quantity,
                    AVG(Quantity) AS Average_Quantity_Per_Listing
                FROM food_listings
                GROUP BY Location
                ORDER BY Total_Listings DESC
            "#,
            CatalogQuery::FoodTypeAvailability => r#"
                SELECT
                    Food_Type,
                    COUNT(Food_ID) AS Total_Listings,
                    COALESCE(SUM(Quantity), 0) AS Total_Quantity,
                    ROUND(AVG(Quantity), 2) AS Average_Quantity
                FROM food_listings
                GROUP BY Food_Type
                ORDER BY Total_Quantity DESC
            "#,
            CatalogQuery::TopClaimedFoods => r#"
                SELECT
                    fl.Food_Name,
                    fl.Food_Type,
                    fl.Meal_Type,
                    COUNT(c.Claim_ID) AS Total_Claims,
                    fl.Quantity AS Available_Quantity
                FROM food_listings fl
                LEFT JOIN claims c ON fl.Food_ID = c.Food_ID
                GROUP BY fl.Food_ID, fl.Food_Name, fl.Food_Type, fl.Meal_Type, fl.Quantity
                ORDER BY Total_Claims DESC
                LIMIT 15
            "#,
            CatalogQuery::TopProvidersByClaims => r#"
                SELECT
                    p.Name AS Provider_Name,
                    p.Type AS Provider_Type,
                    p.City,
                    COUNT(c.Claim_ID) AS Successful_Claims,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity_Claimed
                FROM providers p
                JOIN food_listings fl ON p.Provider_ID = fl.Provider_ID
                JOIN claims c ON fl.Food_ID = c.Food_ID
                WHERE c.Status = 'Completed'
                GROUP BY p.Provider_ID, p.Name, p.Type, p.City
                ORDER BY Successful_Claims DESC
                LIMIT 10
            "#,
            CatalogQuery::ClaimStatusDistribution => r#"
                SELECT
                    Status,
                    COUNT(*) AS Count,
                    ROUND(COUNT(*) * 100.0 / (SELECT COUNT(*) FROM claims), 2) AS Percentage
                FROM claims
                GROUP BY Status
                ORDER BY Count DESC
            "#,
            CatalogQuery::ReceiverTypeAverages => r#"
                SELECT
                    r.Type AS Receiver_Type,
                    COUNT(DISTINCT r.Receiver_ID) AS Total_Receivers,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity_Claimed,
                    ROUND(AVG(fl.Quantity), 2) AS Average_Quantity_Per_Claim
                FROM receivers r
                JOIN claims c ON r.Receiver_ID = c.Receiver_ID
                JOIN food_listings fl ON c.Food_ID = fl.Food_ID
                WHERE c.Status = 'Completed'
                GROUP BY r.Type
                ORDER BY Average_Quantity_Per_Claim DESC
            "#,
            CatalogQuery::MealTypeClaims => r#"
                SELECT
                    fl.Meal_Type,
                    COUNT(c.Claim_ID) AS Total_Claims,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity_Claimed,
                    ROUND(AVG(fl.Quantity), 2) AS Average_Quantity_Per_Claim
                FROM food_listings fl
                JOIN claims c ON fl.Food_ID = c.Food_ID
                WHERE c.Status = 'Completed'
                GROUP BY fl.Meal_Type
                ORDER BY Total_Quantity_Claimed DESC
            "#,
            CatalogQuery::TopDonors => r#"
                SELECT
                    p.Name AS Provider_Name,
                    p.Type AS Provider_Type,
                    p.City,
                    COUNT(fl.Food_ID) AS Total_Food_Items,
                    COALESCE(SUM(fl.Quantity), 0) AS Total_Quantity_Donated
                FROM providers p
                LEFT JOIN food_listings fl ON p.Provider_ID = fl.Provider_ID
                GROUP BY p.Provider_ID, p.Name, p.Type, p.City
                ORDER BY Total_Quantity_Donated DESC
                LIMIT 15
            "#,
            // Day difference is taken against the current UTC calendar date on every run.
            CatalogQuery::ExpiringSoon => r#"
                SELECT
                    fl.Food_Name,
                    fl.Food_Type,
                    fl.Meal_Type,
                    fl.Quantity,
                    fl.Expiry_Date,
                    fl.Location,
                    p.Name AS Provider_Name,
                    p.Contact AS Provider_Contact,
                    CAST(julianday(fl.Expiry_Date) - julianday(date('now')) AS INTEGER) AS Days_Until_Expiry
                FROM food_listings fl
                JOIN providers p ON fl.Provider_ID = p.Provider_ID
                WHERE julianday(fl.Expiry_Date) - julianday(date('now')) BETWEEN 0 AND 7
                ORDER BY Days_Until_Expiry ASC
            "#,
            CatalogQuery::MonthlyClaimsTrend => r#"
                SELECT
                    strftime('%Y-%m', c.Timestamp) AS Month,
                    COUNT(c.Claim_ID) AS Total_Claims,
                    COUNT(CASE WHEN c.Status = 'Completed' THEN 1 END) AS Completed_Claims,
                    COUNT(CASE WHEN c.Status = 'Pending' THEN 1 END) AS Pending_Claims,
                    COUNT(CASE WHEN c.Status = 'Cancelled' THEN 1 END) AS Cancelled_Claims
                FROM claims c
                GROUP BY strftime('%Y-%m', c.Timestamp)
                ORDER BY Month DESC
            "#,
        }
    }
}

impl std::fmt::Display for CatalogQuery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Outcome of one query during a full catalog run
#[derive(Debug)]
pub struct CatalogRun {
    pub query: CatalogQuery,
    pub result: Result<ResultSet>,
}

impl CatalogRun {
    pub fn description(&self) -> String {
        self.query.description()
    }

    /// JSON body with rows and chart, or the error text for a failed query
    pub fn to_json(&self) -> serde_json::Value {
        let rendered = self
            .result
            .as_ref()
            .map_err(|e| e.to_string())
            .and_then(|set| {
                super::chart::chart_for(self.query, set)
                    .map(|render| (set, render))
                    .map_err(|e| e.to_string())
            });
        match rendered {
            Ok((set, render)) => serde_json::json!({
                "number": self.query.number(),
                "title": self.query.title(),
                "columns": set.columns,
                "rows": set.records(),
                "render": render,
            }),
            Err(error) => serde_json::json!({
                "number": self.query.number(),
                "title": self.query.title(),
                "error": error,
            }),
        }
    }
}

/// Execute one catalog query
pub fn run(store: &FoodStore, query: CatalogQuery) -> Result<ResultSet> {
    tracing::debug!("Running catalog query {}", query.number());
    store
        .query_raw(query.sql())
        .map_err(|source| Error::QueryExecution {
            query: query.number(),
            source,
        })
}

/// Execute every catalog query in order. A failing query is recorded in its
/// own entry and does not stop the rest.
pub fn run_all(store: &FoodStore) -> Vec<CatalogRun> {
    CatalogQuery::all()
        .iter()
        .map(|&query| {
            let result = run(store, query);
            if let Err(e) = &result {
                tracing::warn!("{}: {}", query.description(), e);
            }
            CatalogRun { query, result }
        })
        .collect()
}
