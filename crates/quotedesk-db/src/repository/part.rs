//! # Part Repository
//!
//! Database operations for the part catalog.
//!
//! ## Key Operations
//! - Text search across part_number, name, barcode
//! - CRUD with soft delete (is_active flag)
//! - Aggregate stock adjustment by delta
//!
//! Search uses indexed LIKE matching. The catalog here is thousands of
//! rows, not millions, so a virtual search table is not worth its write
//! amplification.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quotedesk_core::validation::{
    validate_name, validate_non_negative_cents, validate_page, validate_reference_number,
    validate_search_query,
};
use quotedesk_core::{NewPart, Page, Part};

/// Filter for part listings.
#[derive(Debug, Clone, Default)]
pub struct PartFilter {
    /// Text matched against part_number, name, and barcode.
    pub search: Option<String>,
    /// When true, soft-deleted parts are included.
    pub include_inactive: bool,
}

const PART_COLUMNS: &str = "id, part_number, name, description, barcode, price_cents, \
     current_stock, track_inventory, is_active, created_at, updated_at";

/// Repository for part catalog operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.parts();
/// let part = repo.insert(NewPart { part_number: "BRK-330".into(), .. }).await?;
/// let hits = repo.list(&PartFilter { search: Some("brake".into()), ..Default::default() },
///                      &Page::default()).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PartRepository {
    pool: SqlitePool,
}

impl PartRepository {
    /// Creates a new PartRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartRepository { pool }
    }

    /// Inserts a new catalog part.
    ///
    /// Fails with [`DbError::UniqueViolation`] when the part number is
    /// already taken.
    pub async fn insert(&self, new: NewPart) -> DbResult<Part> {
        validate_reference_number("part_number", &new.part_number)?;
        validate_name("name", &new.name)?;
        validate_non_negative_cents("price_cents", new.price_cents)?;

        let now = Utc::now();
        let part = Part {
            id: Uuid::new_v4().to_string(),
            part_number: new.part_number.trim().to_string(),
            name: new.name.trim().to_string(),
            description: new.description,
            barcode: new.barcode,
            price_cents: new.price_cents,
            current_stock: new.current_stock,
            track_inventory: new.track_inventory,
            is_active: true,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO parts
                (id, part_number, name, description, barcode, price_cents,
                 current_stock, track_inventory, is_active, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&part.id)
        .bind(&part.part_number)
        .bind(&part.name)
        .bind(&part.description)
        .bind(&part.barcode)
        .bind(part.price_cents)
        .bind(part.current_stock)
        .bind(part.track_inventory)
        .bind(part.is_active)
        .bind(part.created_at)
        .bind(part.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("part_number", &part.part_number)
            }
            other => other,
        })?;

        debug!(part_id = %part.id, part_number = %part.part_number, "Part created");

        Ok(part)
    }

    /// Gets a part by ID, or None if not found.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Part>> {
        let sql = format!("SELECT {PART_COLUMNS} FROM parts WHERE id = ?1");
        let part = sqlx::query_as::<_, Part>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(part)
    }

    /// Gets a part by its business number, or None if not found.
    pub async fn get_by_part_number(&self, part_number: &str) -> DbResult<Option<Part>> {
        let sql = format!("SELECT {PART_COLUMNS} FROM parts WHERE part_number = ?1");
        let part = sqlx::query_as::<_, Part>(&sql)
            .bind(part_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(part)
    }

    /// Lists catalog parts with optional text search, newest first.
    pub async fn list(&self, filter: &PartFilter, page: &Page) -> DbResult<Vec<Part>> {
        validate_page(page)?;

        let search = match &filter.search {
            Some(raw) => validate_search_query(raw)?,
            None => String::new(),
        };

        debug!(search = %search, include_inactive = filter.include_inactive, "Listing parts");

        // Empty pattern disables the text condition via the ?1 = '' branch.
        let pattern = if search.is_empty() {
            String::new()
        } else {
            format!("%{search}%")
        };

        let sql = format!(
            r#"
            SELECT {PART_COLUMNS}
            FROM parts
            WHERE (?1 = '' OR part_number LIKE ?2 OR name LIKE ?2 OR barcode LIKE ?2)
              AND (?3 = 1 OR is_active = 1)
            ORDER BY created_at DESC
            LIMIT ?4 OFFSET ?5
            "#
        );

        let parts = sqlx::query_as::<_, Part>(&sql)
            .bind(&search)
            .bind(&pattern)
            .bind(filter.include_inactive)
            .bind(page.limit as i64)
            .bind(page.offset())
            .fetch_all(&self.pool)
            .await?;

        Ok(parts)
    }

    /// Counts parts matching a filter, for pagination metadata.
    pub async fn count(&self, filter: &PartFilter) -> DbResult<i64> {
        let search = match &filter.search {
            Some(raw) => validate_search_query(raw)?,
            None => String::new(),
        };
        let pattern = if search.is_empty() {
            String::new()
        } else {
            format!("%{search}%")
        };

        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM parts
            WHERE (?1 = '' OR part_number LIKE ?2 OR name LIKE ?2 OR barcode LIKE ?2)
              AND (?3 = 1 OR is_active = 1)
            "#,
        )
        .bind(&search)
        .bind(&pattern)
        .bind(filter.include_inactive)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }

    /// Updates a part's catalog attributes.
    ///
    /// The part number is immutable once issued; it identifies the part on
    /// printed documents.
    pub async fn update(&self, id: &str, updated: NewPart) -> DbResult<Part> {
        validate_name("name", &updated.name)?;
        validate_non_negative_cents("price_cents", updated.price_cents)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE parts
            SET name = ?2, description = ?3, barcode = ?4, price_cents = ?5,
                current_stock = ?6, track_inventory = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(updated.name.trim())
        .bind(&updated.description)
        .bind(&updated.barcode)
        .bind(updated.price_cents)
        .bind(updated.current_stock)
        .bind(updated.track_inventory)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Part", id));
        }

        debug!(part_id = %id, "Part updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Part", id))
    }

    /// Adjusts aggregate stock by a signed delta.
    ///
    /// No-op for parts with inventory tracking disabled. Stock may go
    /// negative; oversell is a reporting concern, not a hard stop.
    pub async fn adjust_stock(&self, id: &str, delta: i64) -> DbResult<Part> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE parts
            SET current_stock = COALESCE(current_stock, 0) + ?2, updated_at = ?3
            WHERE id = ?1 AND track_inventory = 1
            "#,
        )
        .bind(id)
        .bind(delta)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Missing part and untracked part both land here; disambiguate.
            return match self.get_by_id(id).await? {
                Some(part) => Ok(part),
                None => Err(DbError::not_found("Part", id)),
            };
        }

        debug!(part_id = %id, delta = delta, "Stock adjusted");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Part", id))
    }

    /// Soft-deletes a part (hides it from active listings).
    ///
    /// Existing quotation items keep their reference; history is never
    /// rewritten.
    pub async fn soft_delete(&self, id: &str) -> DbResult<()> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE parts SET is_active = 0, updated_at = ?2 WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Part", id));
        }

        debug!(part_id = %id, "Part soft-deleted");

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn brake_pad() -> NewPart {
        NewPart {
            part_number: "BRK-PAD-330".to_string(),
            name: "Brake Pad Set".to_string(),
            description: Some("Front axle, ceramic".to_string()),
            barcode: Some("5449000000996".to_string()),
            price_cents: 4_999,
            current_stock: Some(10),
            track_inventory: true,
        }
    }

    #[tokio::test]
    async fn test_insert_and_lookup() {
        let db = test_db().await;
        let repo = db.parts();

        let part = repo.insert(brake_pad()).await.unwrap();
        assert!(part.is_active);

        let by_id = repo.get_by_id(&part.id).await.unwrap().unwrap();
        assert_eq!(by_id.part_number, "BRK-PAD-330");

        let by_number = repo.get_by_part_number("BRK-PAD-330").await.unwrap();
        assert!(by_number.is_some());
    }

    #[tokio::test]
    async fn test_duplicate_part_number_rejected() {
        let db = test_db().await;
        let repo = db.parts();

        repo.insert(brake_pad()).await.unwrap();
        let err = repo.insert(brake_pad()).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));
    }

    #[tokio::test]
    async fn test_search_matches_number_name_barcode() {
        let db = test_db().await;
        let repo = db.parts();
        repo.insert(brake_pad()).await.unwrap();
        repo.insert(NewPart {
            part_number: "OIL-FLT-101".to_string(),
            name: "Oil Filter".to_string(),
            price_cents: 899,
            ..Default::default()
        })
        .await
        .unwrap();

        for term in ["BRK", "Brake", "544900"] {
            let filter = PartFilter {
                search: Some(term.to_string()),
                ..Default::default()
            };
            let hits = repo.list(&filter, &Page::default()).await.unwrap();
            assert_eq!(hits.len(), 1, "term {term:?}");
            assert_eq!(hits[0].part_number, "BRK-PAD-330");
        }

        let all = repo.list(&PartFilter::default(), &Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_soft_delete_hides_from_active_listing() {
        let db = test_db().await;
        let repo = db.parts();

        let part = repo.insert(brake_pad()).await.unwrap();
        repo.soft_delete(&part.id).await.unwrap();

        let active = repo.list(&PartFilter::default(), &Page::default()).await.unwrap();
        assert!(active.is_empty());

        let all_filter = PartFilter {
            include_inactive: true,
            ..Default::default()
        };
        let all = repo.list(&all_filter, &Page::default()).await.unwrap();
        assert_eq!(all.len(), 1);
        assert!(!all[0].is_active);

        assert_eq!(repo.count(&PartFilter::default()).await.unwrap(), 0);
        assert_eq!(repo.count(&all_filter).await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_adjust_stock_by_delta() {
        let db = test_db().await;
        let repo = db.parts();

        let part = repo.insert(brake_pad()).await.unwrap();
        let after = repo.adjust_stock(&part.id, -3).await.unwrap();
        assert_eq!(after.current_stock, Some(7));

        let restocked = repo.adjust_stock(&part.id, 5).await.unwrap();
        assert_eq!(restocked.current_stock, Some(12));
    }

    #[tokio::test]
    async fn test_adjust_stock_untracked_is_noop() {
        let db = test_db().await;
        let repo = db.parts();

        let part = repo
            .insert(NewPart {
                part_number: "SVC-MISC".to_string(),
                name: "Shop Supplies".to_string(),
                price_cents: 100,
                track_inventory: false,
                ..Default::default()
            })
            .await
            .unwrap();

        let after = repo.adjust_stock(&part.id, -1).await.unwrap();
        assert_eq!(after.current_stock, None);
    }
}
