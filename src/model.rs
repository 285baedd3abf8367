//! Record types - providers, receivers, food listings and claims
//!
//! Every categorical column is a closed enumeration. The stored spelling
//! (e.g. `"Grocery Store"`, `"Non-Vegetarian"`) is the one written to SQLite,
//! serialized to JSON and shown to users.

use crate::{Error, Result};
use chrono::{NaiveDate, NaiveDateTime};
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Storage format of `food_listings.Expiry_Date`
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Storage format of `claims.Timestamp`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Lowercase and drop separators so `grocery-store` matches `Grocery Store`
fn normalize(s: &str) -> String {
    s.chars()
        .filter(|c| !matches!(c, ' ' | '-' | '_'))
        .flat_map(char::to_lowercase)
        .collect()
}

macro_rules! stored_enum {
    (
        $(#[$meta:meta])*
        $name:ident, $label:literal {
            $($(#[$vmeta:meta])* $variant:ident => $stored:literal),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $stored)]
                $variant,
            )+
        }

        impl $name {
            /// Get the stored string representation
            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $stored,)+
                }
            }

            /// Get all values in declaration order
            pub fn all() -> &'static [$name] {
                &[$($name::$variant,)+]
            }
        }

        impl FromStr for $name {
            type Err = Error;

            fn from_str(s: &str) -> Result<Self> {
                let wanted = normalize(s);
                $name::all()
                    .iter()
                    .copied()
                    .find(|v| normalize(v.as_str()) == wanted)
                    .ok_or_else(|| Error::InvalidValue(format!("Unknown {}: {}", $label, s)))
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.as_str())
            }
        }

        impl ToSql for $name {
            fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                Ok(ToSqlOutput::from(self.as_str()))
            }
        }

        impl FromSql for $name {
            fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                value
                    .as_str()?
                    .parse()
                    .map_err(|e: Error| FromSqlError::Other(Box::new(e)))
            }
        }
    };
}

stored_enum! {
    /// Kind of business donating food
    ProviderType, "provider type" {
        Restaurant => "Restaurant",
        GroceryStore => "Grocery Store",
        Supermarket => "Supermarket",
        Cafeteria => "Cafeteria",
    }
}

stored_enum! {
    /// Kind of organisation or person claiming food
    ReceiverType, "receiver type" {
        Ngo => "NGO",
        CommunityCenter => "Community Center",
        Individual => "Individual",
    }
}

stored_enum! {
    /// Dietary category of a listing
    FoodType, "food type" {
        Vegetarian => "Vegetarian",
        NonVegetarian => "Non-Vegetarian",
        Vegan => "Vegan",
    }
}

stored_enum! {
    MealType, "meal type" {
        Breakfast => "Breakfast",
        Lunch => "Lunch",
        Dinner => "Dinner",
        Snacks => "Snacks",
    }
}

stored_enum! {
    /// Lifecycle status of a claim. Any status may be set at any time.
    ClaimStatus, "claim status" {
        Pending => "Pending",
        Completed => "Completed",
        Cancelled => "Cancelled",
    }
}

/// The four record types managed by the store
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Provider,
    Receiver,
    FoodListing,
    Claim,
}

impl EntityKind {
    /// Human-readable name used in confirmation messages
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Provider => "Provider",
            EntityKind::Receiver => "Receiver",
            EntityKind::FoodListing => "Food listing",
            EntityKind::Claim => "Claim",
        }
    }

    /// Backing table name
    pub fn table(&self) -> &'static str {
        match self {
            EntityKind::Provider => "providers",
            EntityKind::Receiver => "receivers",
            EntityKind::FoodListing => "food_listings",
            EntityKind::Claim => "claims",
        }
    }

    /// Primary key column name
    pub fn id_column(&self) -> &'static str {
        match self {
            EntityKind::Provider => "Provider_ID",
            EntityKind::Receiver => "Receiver_ID",
            EntityKind::FoodListing => "Food_ID",
            EntityKind::Claim => "Claim_ID",
        }
    }
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record ids start at 1
pub fn check_id(entity: EntityKind, id: i64) -> Result<()> {
    if id < 1 {
        return Err(Error::InvalidValue(format!("{} ID must be at least 1, got {}", entity, id)));
    }
    Ok(())
}

/// A food donor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Provider {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub provider_type: ProviderType,
    pub address: String,
    pub city: String,
    pub contact: String,
}

impl Provider {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        provider_type: ProviderType,
        address: impl Into<String>,
        city: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            provider_type,
            address: address.into(),
            city: city.into(),
            contact: contact.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_id(EntityKind::Provider, self.id)
    }
}

/// An organisation or person claiming food
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receiver {
    pub id: i64,
    pub name: String,
    #[serde(rename = "type")]
    pub receiver_type: ReceiverType,
    pub city: String,
    pub contact: String,
}

impl Receiver {
    pub fn new(
        id: i64,
        name: impl Into<String>,
        receiver_type: ReceiverType,
        city: impl Into<String>,
        contact: impl Into<String>,
    ) -> Self {
        Self {
            id,
            name: name.into(),
            receiver_type,
            city: city.into(),
            contact: contact.into(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        check_id(EntityKind::Receiver, self.id)
    }
}

/// A quantity of food offered by a provider until its expiry date.
///
/// `quantity` is unsigned, so a negative quantity cannot be represented.
/// `provider_id` is not checked against `providers`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FoodListing {
    pub id: i64,
    pub food_name: String,
    pub quantity: u32,
    pub expiry_date: NaiveDate,
    pub provider_id: i64,
    pub provider_type: ProviderType,
    /// City the food can be collected in
    pub location: String,
    pub food_type: FoodType,
    pub meal_type: MealType,
}

impl FoodListing {
    /// Ids and the offered quantity must be at least 1
    pub fn validate(&self) -> Result<()> {
        check_id(EntityKind::FoodListing, self.id)?;
        check_id(EntityKind::Provider, self.provider_id)?;
        if self.quantity == 0 {
            return Err(Error::InvalidValue("Quantity must be at least 1".to_string()));
        }
        Ok(())
    }
}

/// A receiver's request against a food listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Claim {
    pub id: i64,
    pub food_id: i64,
    pub receiver_id: i64,
    pub status: ClaimStatus,
    pub timestamp: NaiveDateTime,
}

impl Claim {
    pub fn new(id: i64, food_id: i64, receiver_id: i64, status: ClaimStatus, timestamp: NaiveDateTime) -> Self {
        Self {
            id,
            food_id,
            receiver_id,
            status,
            timestamp,
        }
    }

    /// Timestamp in its stored text form
    pub fn timestamp_text(&self) -> String {
        self.timestamp.format(TIMESTAMP_FORMAT).to_string()
    }

    pub fn validate(&self) -> Result<()> {
        check_id(EntityKind::Claim, self.id)?;
        check_id(EntityKind::FoodListing, self.food_id)?;
        check_id(EntityKind::Receiver, self.receiver_id)
    }
}

/// Parse a `YYYY-MM-DD` date
pub fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|e| Error::InvalidValue(format!("Invalid date '{}': {}", s, e)))
}

/// Parse a `YYYY-MM-DD HH:MM:SS` timestamp (a `T` separator is accepted too)
pub fn parse_timestamp(s: &str) -> Result<NaiveDateTime> {
    let s = s.trim();
    NaiveDateTime::parse_from_str(s, TIMESTAMP_FORMAT)
        .or_else(|_| NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S"))
        .map_err(|e| Error::InvalidValue(format!("Invalid timestamp '{}': {}", s, e)))
}
