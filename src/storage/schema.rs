//! Database schema definitions
//!
//! Column names keep the capitalised spelling of the source dataset
//! (`Provider_ID`, `Food_Name`, ...) because the catalog queries and their
//! result columns are written against it.

/// SQL to create the providers table
pub const CREATE_PROVIDERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS providers (
    Provider_ID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Type TEXT NOT NULL,
    Address TEXT NOT NULL,
    City TEXT NOT NULL,
    Contact TEXT NOT NULL
)
"#;

/// SQL to create the receivers table
pub const CREATE_RECEIVERS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS receivers (
    Receiver_ID INTEGER PRIMARY KEY,
    Name TEXT NOT NULL,
    Type TEXT NOT NULL,
    City TEXT NOT NULL,
    Contact TEXT NOT NULL
)
"#;

/// SQL to create the food_listings table.
/// The foreign key is declarative only; `PRAGMA foreign_keys` stays off,
/// so deleting a provider leaves its listings in place.
pub const CREATE_FOOD_LISTINGS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS food_listings (
    Food_ID INTEGER PRIMARY KEY,
    Food_Name TEXT NOT NULL,
    Quantity INTEGER NOT NULL CHECK (Quantity >= 0),
    Expiry_Date TEXT NOT NULL,
    Provider_ID INTEGER NOT NULL REFERENCES providers(Provider_ID),
    Provider_Type TEXT NOT NULL,
    Location TEXT NOT NULL,
    Food_Type TEXT NOT NULL,
    Meal_Type TEXT NOT NULL
)
"#;

/// SQL to create the claims table
pub const CREATE_CLAIMS_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS claims (
    Claim_ID INTEGER PRIMARY KEY,
    Food_ID INTEGER NOT NULL REFERENCES food_listings(Food_ID),
    Receiver_ID INTEGER NOT NULL REFERENCES receivers(Receiver_ID),
    Status TEXT NOT NULL,
    Timestamp TEXT NOT NULL
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_providers_city ON providers(City)",
    "CREATE INDEX IF NOT EXISTS idx_food_listings_provider ON food_listings(Provider_ID)",
    "CREATE INDEX IF NOT EXISTS idx_food_listings_location ON food_listings(Location)",
    "CREATE INDEX IF NOT EXISTS idx_claims_food ON claims(Food_ID)",
    "CREATE INDEX IF NOT EXISTS idx_claims_receiver ON claims(Receiver_ID)",
    "CREATE INDEX IF NOT EXISTS idx_claims_status ON claims(Status)",
];

/// Tables every database must contain
pub const REQUIRED_TABLES: &[&str] = &["providers", "receivers", "food_listings", "claims"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PROVIDERS_TABLE,
        CREATE_RECEIVERS_TABLE,
        CREATE_FOOD_LISTINGS_TABLE,
        CREATE_CLAIMS_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}
