//! Dashboard sections
//!
//! Each shell (CLI, HTTP) maps its own entry points onto [`MenuAction`] and
//! dispatches with a `match`, never by comparing labels.

use serde::{Deserialize, Serialize};
use std::str::FromStr;
use crate::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MenuAction {
    Dashboard,
    QueryResults,
    Analytics,
    FoodListings,
    Providers,
    Receivers,
    Claims,
    AddRecords,
    UpdateRecords,
    DeleteRecords,
}

impl MenuAction {
    pub fn all() -> &'static [MenuAction] {
        &[
            MenuAction::Dashboard,
            MenuAction::QueryResults,
            MenuAction::Analytics,
            MenuAction::FoodListings,
            MenuAction::Providers,
            MenuAction::Receivers,
            MenuAction::Claims,
            MenuAction::AddRecords,
            MenuAction::UpdateRecords,
            MenuAction::DeleteRecords,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            MenuAction::Dashboard => "Dashboard",
            MenuAction::QueryResults => "SQL Query Results (All 15)",
            MenuAction::Analytics => "Analytics",
            MenuAction::FoodListings => "Food Listings",
            MenuAction::Providers => "Providers",
            MenuAction::Receivers => "Receivers",
            MenuAction::Claims => "Claims",
            MenuAction::AddRecords => "Add Records",
            MenuAction::UpdateRecords => "Update Records",
            MenuAction::DeleteRecords => "Delete Records",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            MenuAction::Dashboard => "🏠",
            MenuAction::QueryResults => "📊",
            MenuAction::Analytics => "📈",
            MenuAction::FoodListings => "🍎",
            MenuAction::Providers => "👥",
            MenuAction::Receivers => "🤝",
            MenuAction::Claims => "📋",
            MenuAction::AddRecords => "➕",
            MenuAction::UpdateRecords => "✏️",
            MenuAction::DeleteRecords => "🗑️",
        }
    }

    /// CLI subcommand serving this section
    pub fn command(&self) -> &'static str {
        match self {
            MenuAction::Dashboard => "dashboard",
            MenuAction::QueryResults => "report",
            MenuAction::Analytics => "analytics",
            MenuAction::FoodListings => "listings",
            MenuAction::Providers => "providers",
            MenuAction::Receivers => "receivers",
            MenuAction::Claims => "claims",
            MenuAction::AddRecords => "add",
            MenuAction::UpdateRecords => "update",
            MenuAction::DeleteRecords => "delete",
        }
    }

    pub fn summary(&self) -> &'static str {
        match self {
            MenuAction::Dashboard => "Headline figures and the most recent listings",
            MenuAction::QueryResults => "Fifteen fixed reporting queries, each with a chart",
            MenuAction::Analytics => "Provider contribution, claim status and food type breakdowns",
            MenuAction::FoodListings => "Browse listings by city, food type and meal type",
            MenuAction::Providers => "Donating businesses, optionally limited to one city",
            MenuAction::Receivers => "Organisations and people claiming food",
            MenuAction::Claims => "Claims with the claimed food and receiver names",
            MenuAction::AddRecords => "Insert a provider, receiver, food listing or claim",
            MenuAction::UpdateRecords => "Change contacts, listing quantities and claim statuses",
            MenuAction::DeleteRecords => "Remove a record by id; requires --confirm",
        }
    }

    /// Whether the section changes stored records
    pub fn is_write(&self) -> bool {
        matches!(
            self,
            MenuAction::AddRecords | MenuAction::UpdateRecords | MenuAction::DeleteRecords
        )
    }
}

impl FromStr for MenuAction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_lowercase();
        MenuAction::all()
            .iter()
            .copied()
            .find(|a| a.command() == wanted)
            .ok_or_else(|| Error::InvalidValue(format!("Unknown menu section: {}", s)))
    }
}

impl std::fmt::Display for MenuAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.icon(), self.label())
    }
}
