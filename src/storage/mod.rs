//! Storage Layer - SQLite-backed persistence
//!
//! System of record is SQLite with tables:
//! - providers(Provider_ID, Name, Type, Address, City, Contact)
//! - receivers(Receiver_ID, Name, Type, City, Contact)
//! - food_listings(Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type)
//! - claims(Claim_ID, Food_ID, Receiver_ID, Status, Timestamp)

pub mod schema;
pub mod sqlite;

pub use sqlite::{FoodStore, ListingFilter, ListingFilterOptions, Overview};
