//! SQLite storage implementation

use std::path::Path;
use rusqlite::{Connection, OpenFlags, OptionalExtension, params, params_from_iter};
use serde::{Deserialize, Serialize};
use crate::{Error, Result};
use crate::model::{check_id, Claim, ClaimStatus, EntityKind, FoodListing, FoodType, MealType, Provider, Receiver};
use crate::report::ResultSet;
use super::schema;

/// Storage handle over the food-donation database.
///
/// Owns the single connection of the process. Every write is its own
/// auto-committed statement.
pub struct FoodStore {
    conn: Connection,
}

impl FoodStore {
    /// Open an existing database file. The file is never created here.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_WRITE | OpenFlags::SQLITE_OPEN_NO_MUTEX | OpenFlags::SQLITE_OPEN_URI,
        )
        .map_err(|source| Error::StorageUnavailable {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self { conn };
        store.configure()?;
        store.verify_schema(path)?;
        tracing::debug!("Opened database {}", path.display());
        Ok(store)
    }

    /// Create (or open) a database file and make sure the schema exists
    pub fn create(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| Error::StorageUnavailable {
            path: path.display().to_string(),
            source,
        })?;
        let store = Self { conn };
        store.configure()?;
        store.initialize_schema()?;
        tracing::info!("Initialized database {}", path.display());
        Ok(store)
    }

    /// Open an in-memory database (for testing)
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self { conn };
        store.configure()?;
        store.initialize_schema()?;
        Ok(store)
    }

    /// Foreign keys stay declarative: orphaned references are allowed and
    /// deletes never cascade. Bundled SQLite builds default enforcement on.
    fn configure(&self) -> Result<()> {
        self.conn.execute_batch("PRAGMA foreign_keys = OFF;")?;
        Ok(())
    }

    /// Initialize the database schema
    pub fn initialize_schema(&self) -> Result<()> {
        for stmt in schema::all_schema_statements() {
            self.conn.execute(stmt, [])?;
        }
        Ok(())
    }

    fn verify_schema(&self, path: &Path) -> Result<()> {
        for table in schema::REQUIRED_TABLES {
            let found: Option<String> = self
                .conn
                .query_row(
                    "SELECT name FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .optional()
                .map_err(|source| Error::StorageUnavailable {
                    path: path.display().to_string(),
                    source,
                })?;
            if found.is_none() {
                tracing::warn!("Table {} missing from {}", table, path.display());
            }
        }
        Ok(())
    }

    /// Run a parameter-free statement and collect its rows
    pub fn query(&self, sql: &str) -> Result<ResultSet> {
        tracing::debug!(sql = sql.trim(), "query");
        let mut stmt = self.conn.prepare(sql)?;
        Ok(ResultSet::collect(&mut stmt, [])?)
    }

    /// Like [`FoodStore::query`] but keeps the raw driver error for callers
    /// that attach their own context
    pub(crate) fn query_raw(&self, sql: &str) -> rusqlite::Result<ResultSet> {
        let mut stmt = self.conn.prepare(sql)?;
        ResultSet::collect(&mut stmt, [])
    }

    fn count(&self, sql: &str) -> Result<u64> {
        let count: i64 = self.conn.query_row(sql, [], |row| row.get(0))?;
        Ok(count.max(0) as u64)
    }

    /// Guard for single-row writes addressed by primary key
    fn expect_one(entity: EntityKind, id: i64, affected: usize) -> Result<()> {
        if affected == 0 {
            tracing::debug!("{} {} matched no rows", entity, id);
            return Err(Error::NotFound { entity, id });
        }
        Ok(())
    }

    fn delete_row(&self, entity: EntityKind, id: i64) -> Result<String> {
        check_id(entity, id)?;
        let sql = format!("DELETE FROM {} WHERE {} = ?1", entity.table(), entity.id_column());
        let affected = self.conn.execute(&sql, [id])?;
        Self::expect_one(entity, id, affected)?;
        tracing::info!("Deleted {} {}", entity.as_str().to_lowercase(), id);
        Ok(format!("{} {} deleted successfully.", entity, id))
    }

    // ========== Provider Operations ==========

    pub fn insert_provider(&self, provider: &Provider) -> Result<String> {
        provider.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO providers (Provider_ID, Name, Type, Address, City, Contact)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6)
            "#,
            params![
                provider.id,
                provider.name,
                provider.provider_type,
                provider.address,
                provider.city,
                provider.contact,
            ],
        )?;
        tracing::info!("Inserted provider {}", provider.id);
        Ok(format!("Provider {} inserted successfully.", provider.name))
    }

    pub fn update_provider_contact(&self, provider_id: i64, new_contact: &str) -> Result<String> {
        check_id(EntityKind::Provider, provider_id)?;
        let affected = self.conn.execute(
            "UPDATE providers SET Contact = ?1 WHERE Provider_ID = ?2",
            params![new_contact, provider_id],
        )?;
        Self::expect_one(EntityKind::Provider, provider_id, affected)?;
        tracing::info!("Updated contact of provider {}", provider_id);
        Ok(format!("Provider {} contact updated to {}.", provider_id, new_contact))
    }

    /// Delete a provider. Its food listings are left in place.
    pub fn delete_provider(&self, provider_id: i64) -> Result<String> {
        self.delete_row(EntityKind::Provider, provider_id)
    }

    pub fn get_provider(&self, provider_id: i64) -> Result<Option<Provider>> {
        let found = self
            .conn
            .query_row(
                "SELECT Provider_ID, Name, Type, Address, City, Contact FROM providers WHERE Provider_ID = ?1",
                [provider_id],
                |row| Ok(Self::row_to_provider(row)),
            )
            .optional()?;
        decode_one(EntityKind::Provider, provider_id, found)
    }

    pub fn providers(&self) -> Result<Vec<Provider>> {
        let mut stmt = self.conn.prepare(
            "SELECT Provider_ID, Name, Type, Address, City, Contact FROM providers ORDER BY Provider_ID",
        )?;
        let providers = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, Self::row_to_provider(row))))?;
        keep_readable(EntityKind::Provider, providers)
    }

    pub fn providers_in_city(&self, city: &str) -> Result<Vec<Provider>> {
        let mut stmt = self.conn.prepare(
            "SELECT Provider_ID, Name, Type, Address, City, Contact FROM providers WHERE City = ?1 ORDER BY Provider_ID",
        )?;
        let providers = stmt
            .query_map([city], |row| Ok((row.get::<_, i64>(0)?, Self::row_to_provider(row))))?;
        keep_readable(EntityKind::Provider, providers)
    }

    fn row_to_provider(row: &rusqlite::Row) -> rusqlite::Result<Provider> {
        Ok(Provider {
            id: row.get(0)?,
            name: row.get(1)?,
            provider_type: row.get(2)?,
            address: row.get(3)?,
            city: row.get(4)?,
            contact: row.get(5)?,
        })
    }

    // ========== Receiver Operations ==========

    pub fn insert_receiver(&self, receiver: &Receiver) -> Result<String> {
        receiver.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO receivers (Receiver_ID, Name, Type, City, Contact)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                receiver.id,
                receiver.name,
                receiver.receiver_type,
                receiver.city,
                receiver.contact,
            ],
        )?;
        tracing::info!("Inserted receiver {}", receiver.id);
        Ok(format!("Receiver {} inserted successfully.", receiver.name))
    }

    pub fn update_receiver_contact(&self, receiver_id: i64, new_contact: &str) -> Result<String> {
        check_id(EntityKind::Receiver, receiver_id)?;
        let affected = self.conn.execute(
            "UPDATE receivers SET Contact = ?1 WHERE Receiver_ID = ?2",
            params![new_contact, receiver_id],
        )?;
        Self::expect_one(EntityKind::Receiver, receiver_id, affected)?;
        tracing::info!("Updated contact of receiver {}", receiver_id);
        Ok(format!("Receiver {} contact updated to {}.", receiver_id, new_contact))
    }

    pub fn delete_receiver(&self, receiver_id: i64) -> Result<String> {
        self.delete_row(EntityKind::Receiver, receiver_id)
    }

    pub fn get_receiver(&self, receiver_id: i64) -> Result<Option<Receiver>> {
        let found = self
            .conn
            .query_row(
                "SELECT Receiver_ID, Name, Type, City, Contact FROM receivers WHERE Receiver_ID = ?1",
                [receiver_id],
                |row| Ok(Self::row_to_receiver(row)),
            )
            .optional()?;
        decode_one(EntityKind::Receiver, receiver_id, found)
    }

    pub fn receivers(&self) -> Result<Vec<Receiver>> {
        let mut stmt = self
            .conn
            .prepare("SELECT Receiver_ID, Name, Type, City, Contact FROM receivers ORDER BY Receiver_ID")?;
        let receivers = stmt
            .query_map([], |row| Ok((row.get::<_, i64>(0)?, Self::row_to_receiver(row))))?;
        keep_readable(EntityKind::Receiver, receivers)
    }

    fn row_to_receiver(row: &rusqlite::Row) -> rusqlite::Result<Receiver> {
        Ok(Receiver {
            id: row.get(0)?,
            name: row.get(1)?,
            receiver_type: row.get(2)?,
            city: row.get(3)?,
            contact: row.get(4)?,
        })
    }

    // ========== Food Listing Operations ==========

    pub fn insert_food_listing(&self, listing: &FoodListing) -> Result<String> {
        listing.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO food_listings (Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
            params![
                listing.id,
                listing.food_name,
                listing.quantity,
                listing.expiry_date,
                listing.provider_id,
                listing.provider_type,
                listing.location,
                listing.food_type,
                listing.meal_type,
            ],
        )?;
        tracing::info!("Inserted food listing {}", listing.id);
        Ok(format!("Food listing {} inserted successfully.", listing.food_name))
    }

    /// Set the remaining quantity; 0 marks the listing as used up
    pub fn update_food_quantity(&self, food_id: i64, new_quantity: u32) -> Result<String> {
        check_id(EntityKind::FoodListing, food_id)?;
        let affected = self.conn.execute(
            "UPDATE food_listings SET Quantity = ?1 WHERE Food_ID = ?2",
            params![new_quantity, food_id],
        )?;
        Self::expect_one(EntityKind::FoodListing, food_id, affected)?;
        tracing::info!("Updated quantity of food listing {}", food_id);
        Ok(format!("Food listing {} quantity updated to {}.", food_id, new_quantity))
    }

    /// Delete a listing. Claims against it are left in place.
    pub fn delete_food_listing(&self, food_id: i64) -> Result<String> {
        self.delete_row(EntityKind::FoodListing, food_id)
    }

    pub fn get_food_listing(&self, food_id: i64) -> Result<Option<FoodListing>> {
        let found = self
            .conn
            .query_row(
                "SELECT Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type FROM food_listings WHERE Food_ID = ?1",
                [food_id],
                |row| Ok(Self::row_to_listing(row)),
            )
            .optional()?;
        decode_one(EntityKind::FoodListing, food_id, found)
    }

    /// Listings matching every filter that is set, in `Food_ID` order
    pub fn food_listings(&self, filter: &ListingFilter) -> Result<Vec<FoodListing>> {
        let mut sql = String::from(
            "SELECT Food_ID, Food_Name, Quantity, Expiry_Date, Provider_ID, Provider_Type, Location, Food_Type, Meal_Type FROM food_listings",
        );
        let mut clauses = Vec::new();
        let mut values: Vec<String> = Vec::new();
        if let Some(city) = &filter.city {
            values.push(city.clone());
            clauses.push(format!("Location = ?{}", values.len()));
        }
        if let Some(food_type) = filter.food_type {
            values.push(food_type.as_str().to_string());
            clauses.push(format!("Food_Type = ?{}", values.len()));
        }
        if let Some(meal_type) = filter.meal_type {
            values.push(meal_type.as_str().to_string());
            clauses.push(format!("Meal_Type = ?{}", values.len()));
        }
        if !clauses.is_empty() {
            sql.push_str(" WHERE ");
            sql.push_str(&clauses.join(" AND "));
        }
        sql.push_str(" ORDER BY Food_ID");

        let mut stmt = self.conn.prepare(&sql)?;
        let listings = stmt
            .query_map(params_from_iter(values.iter()), |row| {
                Ok((row.get::<_, i64>(0)?, Self::row_to_listing(row)))
            })?;
        keep_readable(EntityKind::FoodListing, listings)
    }

    /// Distinct values present in the listings, for building filters
    pub fn listing_filter_options(&self) -> Result<ListingFilterOptions> {
        let distinct = |column: &str| -> Result<Vec<String>> {
            let sql = format!("SELECT DISTINCT {0} FROM food_listings ORDER BY {0}", column);
            let mut stmt = self.conn.prepare(&sql)?;
            let values = stmt
                .query_map([], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(values)
        };
        Ok(ListingFilterOptions {
            cities: distinct("Location")?,
            food_types: distinct("Food_Type")?,
            meal_types: distinct("Meal_Type")?,
        })
    }

    fn row_to_listing(row: &rusqlite::Row) -> rusqlite::Result<FoodListing> {
        Ok(FoodListing {
            id: row.get(0)?,
            food_name: row.get(1)?,
            quantity: row.get(2)?,
            expiry_date: row.get(3)?,
            provider_id: row.get(4)?,
            provider_type: row.get(5)?,
            location: row.get(6)?,
            food_type: row.get(7)?,
            meal_type: row.get(8)?,
        })
    }

    // ========== Claim Operations ==========

    pub fn insert_claim(&self, claim: &Claim) -> Result<String> {
        claim.validate()?;
        self.conn.execute(
            r#"
            INSERT INTO claims (Claim_ID, Food_ID, Receiver_ID, Status, Timestamp)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
            params![
                claim.id,
                claim.food_id,
                claim.receiver_id,
                claim.status,
                claim.timestamp_text(),
            ],
        )?;
        tracing::info!("Inserted claim {}", claim.id);
        Ok(format!("Claim {} inserted successfully.", claim.id))
    }

    pub fn update_claim_status(&self, claim_id: i64, new_status: ClaimStatus) -> Result<String> {
        check_id(EntityKind::Claim, claim_id)?;
        let affected = self.conn.execute(
            "UPDATE claims SET Status = ?1 WHERE Claim_ID = ?2",
            params![new_status, claim_id],
        )?;
        Self::expect_one(EntityKind::Claim, claim_id, affected)?;
        tracing::info!("Updated status of claim {}", claim_id);
        Ok(format!("Claim {} status updated to {}.", claim_id, new_status))
    }

    pub fn delete_claim(&self, claim_id: i64) -> Result<String> {
        self.delete_row(EntityKind::Claim, claim_id)
    }

    pub fn get_claim(&self, claim_id: i64) -> Result<Option<Claim>> {
        let found = self
            .conn
            .query_row(
                "SELECT Claim_ID, Food_ID, Receiver_ID, Status, Timestamp FROM claims WHERE Claim_ID = ?1",
                [claim_id],
                |row| Ok(Self::row_to_claim(row)),
            )
            .optional()?;
        decode_one(EntityKind::Claim, claim_id, found)
    }

    /// Claims joined with the claimed food's name and the receiver's name
    pub fn claims_overview(&self) -> Result<ResultSet> {
        self.query(
            r#"
            SELECT c.Claim_ID, c.Food_ID, fl.Food_Name, c.Receiver_ID,
                   r.Name AS Receiver_Name, c.Status, c.Timestamp
            FROM claims c
            JOIN food_listings fl ON c.Food_ID = fl.Food_ID
            JOIN receivers r ON c.Receiver_ID = r.Receiver_ID
            ORDER BY c.Claim_ID
            "#,
        )
    }

    fn row_to_claim(row: &rusqlite::Row) -> rusqlite::Result<Claim> {
        Ok(Claim {
            id: row.get(0)?,
            food_id: row.get(1)?,
            receiver_id: row.get(2)?,
            status: row.get(3)?,
            timestamp: row.get(4)?,
        })
    }

    // ========== Dashboard Aggregates ==========

    /// Headline counts. Every figure is 0 on empty tables.
    pub fn overview(&self) -> Result<Overview> {
        Ok(Overview {
            providers: self.count("SELECT COUNT(*) FROM providers")?,
            receivers: self.count("SELECT COUNT(*) FROM receivers")?,
            food_listings: self.count("SELECT COUNT(*) FROM food_listings")?,
            claims: self.count("SELECT COUNT(*) FROM claims")?,
            total_quantity: self.count("SELECT COALESCE(SUM(Quantity), 0) FROM food_listings")?,
            pending_claims: self.count("SELECT COUNT(*) FROM claims WHERE Status = 'Pending'")?,
        })
    }

    /// Most recently added listings, newest first
    pub fn recent_food_listings(&self, limit: usize) -> Result<ResultSet> {
        let mut stmt = self.conn.prepare(
            r#"
            SELECT Food_Name, Quantity, Location, Food_Type, Meal_Type
            FROM food_listings
            ORDER BY Food_ID DESC
            LIMIT ?1
            "#,
        )?;
        Ok(ResultSet::collect(&mut stmt, [limit as i64])?)
    }
}

/// Describe a row-level decoding failure; `None` for driver failures
fn unreadable_reason(err: &rusqlite::Error) -> Option<String> {
    match err {
        rusqlite::Error::FromSqlConversionFailure(col, _, e) => Some(format!("column {}: {}", col, e)),
        rusqlite::Error::IntegralValueOutOfRange(col, value) => {
            Some(format!("column {}: {} is out of range", col, value))
        }
        rusqlite::Error::InvalidColumnType(col, name, ty) => {
            Some(format!("column {} ({}): unexpected {}", col, name, ty))
        }
        _ => None,
    }
}

/// Collect decoded rows, skipping (and logging) rows whose stored values
/// fall outside the record types
fn keep_readable<T>(
    entity: EntityKind,
    rows: impl Iterator<Item = rusqlite::Result<(i64, rusqlite::Result<T>)>>,
) -> Result<Vec<T>> {
    let mut kept = Vec::new();
    for row in rows {
        let (id, decoded) = row?;
        match decoded {
            Ok(record) => kept.push(record),
            Err(e) => match unreadable_reason(&e) {
                Some(reason) => tracing::warn!("Skipping {} {}: {}", entity.as_str().to_lowercase(), id, reason),
                None => return Err(e.into()),
            },
        }
    }
    Ok(kept)
}

fn decode_one<T>(entity: EntityKind, id: i64, found: Option<rusqlite::Result<T>>) -> Result<Option<T>> {
    match found {
        None => Ok(None),
        Some(Ok(record)) => Ok(Some(record)),
        Some(Err(e)) => match unreadable_reason(&e) {
            Some(reason) => Err(Error::UnreadableRow { entity, id, reason }),
            None => Err(e.into()),
        },
    }
}

/// Optional filters for browsing food listings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilter {
    pub city: Option<String>,
    pub food_type: Option<FoodType>,
    pub meal_type: Option<MealType>,
}

/// Distinct filter values present in `food_listings`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ListingFilterOptions {
    pub cities: Vec<String>,
    pub food_types: Vec<String>,
    pub meal_types: Vec<String>,
}

/// Headline dashboard figures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Overview {
    pub providers: u64,
    pub receivers: u64,
    pub food_listings: u64,
    pub claims: u64,
    pub total_quantity: u64,
    pub pending_claims: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ProviderType, ReceiverType};
    use chrono::NaiveDate;

    fn test_cafe() -> Provider {
        Provider::new(101, "Test Cafe", ProviderType::Cafeteria, "1 Elm St", "Springfield", "555-0100")
    }

    fn listing(id: i64, provider_id: i64, city: &str, food_type: FoodType, meal_type: MealType) -> FoodListing {
        FoodListing {
            id,
            food_name: format!("Food {}", id),
            quantity: 10,
            expiry_date: NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
            provider_id,
            provider_type: ProviderType::Restaurant,
            location: city.to_string(),
            food_type,
            meal_type,
        }
    }

    fn claim(id: i64, food_id: i64, receiver_id: i64, status: ClaimStatus) -> Claim {
        let ts = crate::model::parse_timestamp("2025-03-01 12:00:00").unwrap();
        Claim::new(id, food_id, receiver_id, status, ts)
    }

    #[test]
    fn test_insert_then_read_by_city() {
        let store = FoodStore::open_in_memory().unwrap();
        let msg = store.insert_provider(&test_cafe()).unwrap();
        assert_eq!(msg, "Provider Test Cafe inserted successfully.");
        store
            .insert_provider(&Provider::new(102, "Other", ProviderType::Restaurant, "2 Oak St", "Shelbyville", "555-0200"))
            .unwrap();

        let found = store.providers_in_city("Springfield").unwrap();
        assert_eq!(found, vec![test_cafe()]);
    }

    #[test]
    fn test_duplicate_insert_is_constraint_violation() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_provider(&test_cafe()).unwrap();

        let mut dup = test_cafe();
        dup.name = "Impostor".to_string();
        let err = store.insert_provider(&dup).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let kept = store.get_provider(101).unwrap().unwrap();
        assert_eq!(kept.name, "Test Cafe");
    }

    #[test]
    fn test_update_quantity_then_read() {
        let store = FoodStore::open_in_memory().unwrap();
        store
            .insert_food_listing(&listing(7, 1, "Austin", FoodType::Vegan, MealType::Lunch))
            .unwrap();

        let msg = store.update_food_quantity(7, 42).unwrap();
        assert_eq!(msg, "Food listing 7 quantity updated to 42.");
        assert_eq!(store.get_food_listing(7).unwrap().unwrap().quantity, 42);
    }

    #[test]
    fn test_update_missing_row_reports_not_found() {
        let store = FoodStore::open_in_memory().unwrap();
        let err = store.update_food_quantity(9999, 1).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: EntityKind::FoodListing, id: 9999 }));

        assert!(matches!(
            store.update_provider_contact(1, "x").unwrap_err(),
            Error::NotFound { entity: EntityKind::Provider, .. }
        ));
        assert!(matches!(
            store.update_receiver_contact(1, "x").unwrap_err(),
            Error::NotFound { entity: EntityKind::Receiver, .. }
        ));
        assert!(matches!(
            store.update_claim_status(1, ClaimStatus::Completed).unwrap_err(),
            Error::NotFound { entity: EntityKind::Claim, .. }
        ));
    }

    #[test]
    fn test_delete_then_read() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_claim(&claim(3, 1, 1, ClaimStatus::Pending)).unwrap();
        assert!(store.get_claim(3).unwrap().is_some());

        let msg = store.delete_claim(3).unwrap();
        assert_eq!(msg, "Claim 3 deleted successfully.");
        assert!(store.get_claim(3).unwrap().is_none());

        let err = store.delete_claim(3).unwrap_err();
        assert!(matches!(err, Error::NotFound { entity: EntityKind::Claim, id: 3 }));
    }

    #[test]
    fn test_delete_does_not_cascade() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_provider(&test_cafe()).unwrap();
        store
            .insert_food_listing(&listing(1, 101, "Springfield", FoodType::Vegetarian, MealType::Dinner))
            .unwrap();
        store.insert_claim(&claim(1, 1, 5, ClaimStatus::Pending)).unwrap();

        store.delete_provider(101).unwrap();
        assert!(store.get_food_listing(1).unwrap().is_some());

        store.delete_food_listing(1).unwrap();
        assert!(store.get_claim(1).unwrap().is_some());
    }

    #[test]
    fn test_contact_and_status_updates() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_provider(&test_cafe()).unwrap();
        store
            .insert_receiver(&Receiver::new(1, "Shelter", ReceiverType::Ngo, "Springfield", "555-0300"))
            .unwrap();
        store.insert_claim(&claim(1, 1, 1, ClaimStatus::Pending)).unwrap();

        store.update_provider_contact(101, "555-9999").unwrap();
        store.update_receiver_contact(1, "555-8888").unwrap();
        let msg = store.update_claim_status(1, ClaimStatus::Cancelled).unwrap();
        assert_eq!(msg, "Claim 1 status updated to Cancelled.");

        assert_eq!(store.get_provider(101).unwrap().unwrap().contact, "555-9999");
        assert_eq!(store.get_receiver(1).unwrap().unwrap().contact, "555-8888");
        assert_eq!(store.get_claim(1).unwrap().unwrap().status, ClaimStatus::Cancelled);
    }

    #[test]
    fn test_food_listing_roundtrip_keeps_dates_and_enums() {
        let store = FoodStore::open_in_memory().unwrap();
        let original = listing(4, 2, "Austin", FoodType::NonVegetarian, MealType::Breakfast);
        store.insert_food_listing(&original).unwrap();
        assert_eq!(store.get_food_listing(4).unwrap().unwrap(), original);

        let stored: String = store
            .conn
            .query_row("SELECT Expiry_Date FROM food_listings WHERE Food_ID = 4", [], |r| r.get(0))
            .unwrap();
        assert_eq!(stored, "2030-01-01");
    }

    #[test]
    fn test_listing_filters() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_food_listing(&listing(1, 1, "Austin", FoodType::Vegan, MealType::Lunch)).unwrap();
        store.insert_food_listing(&listing(2, 1, "Austin", FoodType::Vegetarian, MealType::Lunch)).unwrap();
        store.insert_food_listing(&listing(3, 1, "Boston", FoodType::Vegan, MealType::Dinner)).unwrap();

        let all = store.food_listings(&ListingFilter::default()).unwrap();
        assert_eq!(all.len(), 3);

        let austin_vegan = store
            .food_listings(&ListingFilter {
                city: Some("Austin".into()),
                food_type: Some(FoodType::Vegan),
                meal_type: None,
            })
            .unwrap();
        assert_eq!(austin_vegan.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1]);

        let dinners = store
            .food_listings(&ListingFilter {
                meal_type: Some(MealType::Dinner),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(dinners.len(), 1);

        let options = store.listing_filter_options().unwrap();
        assert_eq!(options.cities, vec!["Austin", "Boston"]);
        assert_eq!(options.food_types, vec!["Vegan", "Vegetarian"]);
    }

    #[test]
    fn test_overview_on_empty_and_filled_tables() {
        let store = FoodStore::open_in_memory().unwrap();
        assert_eq!(store.overview().unwrap(), Overview::default());

        store.insert_provider(&test_cafe()).unwrap();
        store.insert_food_listing(&listing(1, 101, "Springfield", FoodType::Vegan, MealType::Lunch)).unwrap();
        store.insert_food_listing(&listing(2, 101, "Springfield", FoodType::Vegan, MealType::Lunch)).unwrap();
        store.insert_claim(&claim(1, 1, 1, ClaimStatus::Pending)).unwrap();
        store.insert_claim(&claim(2, 2, 1, ClaimStatus::Completed)).unwrap();

        let overview = store.overview().unwrap();
        assert_eq!(overview.providers, 1);
        assert_eq!(overview.food_listings, 2);
        assert_eq!(overview.total_quantity, 20);
        assert_eq!(overview.claims, 2);
        assert_eq!(overview.pending_claims, 1);
    }

    #[test]
    fn test_recent_listings_newest_first() {
        let store = FoodStore::open_in_memory().unwrap();
        for id in 1..=7 {
            store.insert_food_listing(&listing(id, 1, "Austin", FoodType::Vegan, MealType::Lunch)).unwrap();
        }
        let recent = store.recent_food_listings(5).unwrap();
        assert_eq!(recent.len(), 5);
        assert_eq!(recent.get(0, "Food_Name").and_then(|v| v.as_str()), Some("Food 7"));
    }

    #[test]
    fn test_claims_overview_joins_names() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_food_listing(&listing(1, 1, "Austin", FoodType::Vegan, MealType::Lunch)).unwrap();
        store
            .insert_receiver(&Receiver::new(9, "Shelter", ReceiverType::CommunityCenter, "Austin", "555"))
            .unwrap();
        store.insert_claim(&claim(1, 1, 9, ClaimStatus::Pending)).unwrap();

        let set = store.claims_overview().unwrap();
        assert_eq!(set.get(0, "Receiver_Name").and_then(|v| v.as_str()), Some("Shelter"));
        assert_eq!(set.get(0, "Food_Name").and_then(|v| v.as_str()), Some("Food 1"));
    }

    #[test]
    fn test_open_missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = FoodStore::open(&dir.path().join("absent.db")).err().unwrap();
        assert!(matches!(err, Error::StorageUnavailable { .. }));
        assert!(!err.is_recoverable());
    }

    #[test]
    fn test_create_then_open() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("food.db");
        {
            let store = FoodStore::create(&path).unwrap();
            store.insert_provider(&test_cafe()).unwrap();
        }
        let reopened = FoodStore::open(&path).unwrap();
        assert_eq!(reopened.providers().unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_ids_rejected_for_every_table() {
        let store = FoodStore::open_in_memory().unwrap();
        let shelter = Receiver::new(1, "Shelter", ReceiverType::Ngo, "Austin", "555-0300");
        store.insert_receiver(&shelter).unwrap();
        let err = store.insert_receiver(&shelter).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        let food = listing(1, 1, "Austin", FoodType::Vegan, MealType::Lunch);
        store.insert_food_listing(&food).unwrap();
        let err = store.insert_food_listing(&food).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        store.insert_claim(&claim(1, 1, 1, ClaimStatus::Pending)).unwrap();
        let err = store.insert_claim(&claim(1, 1, 1, ClaimStatus::Completed)).unwrap_err();
        assert!(matches!(err, Error::ConstraintViolation(_)));

        assert_eq!(store.get_claim(1).unwrap().unwrap().status, ClaimStatus::Pending);
        assert_eq!(store.overview().unwrap().receivers, 1);
    }

    #[test]
    fn test_non_positive_ids_and_zero_quantity_rejected() {
        let store = FoodStore::open_in_memory().unwrap();
        let mut nameless = test_cafe();
        nameless.id = 0;
        assert!(matches!(store.insert_provider(&nameless).unwrap_err(), Error::InvalidValue(_)));

        let mut empty = listing(1, 101, "Austin", FoodType::Vegan, MealType::Lunch);
        empty.quantity = 0;
        assert!(matches!(store.insert_food_listing(&empty).unwrap_err(), Error::InvalidValue(_)));
        assert!(matches!(
            store.insert_claim(&claim(1, -4, 1, ClaimStatus::Pending)).unwrap_err(),
            Error::InvalidValue(_)
        ));
        assert!(matches!(store.delete_receiver(-1).unwrap_err(), Error::InvalidValue(_)));
        assert!(matches!(store.update_food_quantity(0, 5).unwrap_err(), Error::InvalidValue(_)));
        assert_eq!(store.overview().unwrap(), Overview::default());

        // An existing listing may be drawn down to nothing
        store.insert_food_listing(&listing(2, 101, "Austin", FoodType::Vegan, MealType::Lunch)).unwrap();
        store.update_food_quantity(2, 0).unwrap();
        assert_eq!(store.get_food_listing(2).unwrap().unwrap().quantity, 0);
    }

    #[test]
    fn test_rows_outside_the_enums_are_skipped_in_typed_reads() {
        let store = FoodStore::open_in_memory().unwrap();
        store.insert_provider(&test_cafe()).unwrap();
        store
            .conn
            .execute(
                "INSERT INTO providers VALUES (102, 'Caterer', 'Catering Service', '3 Pine St', 'Springfield', '555')",
                [],
            )
            .unwrap();
        store
            .insert_food_listing(&listing(1, 101, "Springfield", FoodType::Vegan, MealType::Lunch))
            .unwrap();
        store
            .conn
            .execute(
                "INSERT INTO food_listings VALUES (2, 'Soup', 3, '2030-01-01', 101, 'Restaurant', 'Springfield', 'Vegan', 'Brunch')",
                [],
            )
            .unwrap();

        let providers = store.providers().unwrap();
        assert_eq!(providers, vec![test_cafe()]);
        assert_eq!(store.providers_in_city("Springfield").unwrap().len(), 1);
        let listings = store.food_listings(&ListingFilter::default()).unwrap();
        assert_eq!(listings.iter().map(|l| l.id).collect::<Vec<_>>(), vec![1]);

        let err = store.get_provider(102).unwrap_err();
        assert!(matches!(err, Error::UnreadableRow { entity: EntityKind::Provider, id: 102, .. }));
        assert!(matches!(
            store.get_food_listing(2).unwrap_err(),
            Error::UnreadableRow { entity: EntityKind::FoodListing, id: 2, .. }
        ));

        // Raw result sets keep every row
        assert_eq!(store.overview().unwrap().providers, 2);
        let raw = store.query("SELECT Type FROM providers ORDER BY Provider_ID").unwrap();
        assert_eq!(raw.get(1, "Type").and_then(|v| v.as_str()), Some("Catering Service"));
    }
}
