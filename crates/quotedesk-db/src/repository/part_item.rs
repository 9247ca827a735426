//! # Part Item Repository
//!
//! Database operations for serialized/lot-tracked inventory units.
//!
//! ## Bulk Ingestion
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    All-or-Nothing Bulk Insert                           │
//! │                                                                         │
//! │  insert_bulk([item1 .. itemN])   (1 ≤ N ≤ 100)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  validate every item up front ──fail──► nothing written                 │
//! │       │ ok                                                              │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │    INSERT item1 ... INSERT itemN   (any failure rolls back all)         │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quotedesk_core::validation::{validate_new_part_item, validate_page, validate_part_item_batch};
use quotedesk_core::{
    NewPartItem, Page, PartCondition, PartItem, PartItemPatch, PartItemStatus,
};

/// Filter for part item listings.
#[derive(Debug, Clone, Default)]
pub struct PartItemFilter {
    pub part_id: Option<String>,
    pub status: Option<PartItemStatus>,
    pub condition: Option<PartCondition>,
    pub supplier_id: Option<String>,
    pub quotation_id: Option<String>,
}

const PART_ITEM_COLUMNS: &str = "id, part_id, barcode, serial_number, location, shelve_location, \
     supplier_id, purchase_price_cents, purchase_date, expiry_date, \
     warranty_period_days, condition, status, quotation_id, created_at, updated_at";

/// Repository for part item operations.
#[derive(Debug, Clone)]
pub struct PartItemRepository {
    pool: SqlitePool,
}

impl PartItemRepository {
    /// Creates a new PartItemRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PartItemRepository { pool }
    }

    /// Inserts a single part item.
    pub async fn insert(&self, new: NewPartItem) -> DbResult<PartItem> {
        validate_new_part_item(&new)?;

        let mut tx = self.pool.begin().await?;
        let item = Self::insert_in_tx(&mut tx, new).await?;
        tx.commit().await?;

        debug!(item_id = %item.id, part_id = %item.part_id, "Part item created");

        Ok(item)
    }

    /// Inserts a batch of part items in a single transaction.
    ///
    /// The whole batch is validated before any write; a constraint failure
    /// on any row (duplicate barcode, unknown part) rolls back every row.
    pub async fn insert_bulk(&self, items: Vec<NewPartItem>) -> DbResult<Vec<PartItem>> {
        validate_part_item_batch(&items)?;

        let count = items.len();
        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(count);

        for new in items {
            created.push(Self::insert_in_tx(&mut tx, new).await?);
        }

        tx.commit().await?;

        info!(count = count, "Bulk part items created");

        Ok(created)
    }

    async fn insert_in_tx(
        tx: &mut sqlx::Transaction<'_, sqlx::Sqlite>,
        new: NewPartItem,
    ) -> DbResult<PartItem> {
        let now = Utc::now();
        let item = PartItem {
            id: Uuid::new_v4().to_string(),
            part_id: new.part_id,
            barcode: new.barcode,
            serial_number: new.serial_number,
            location: new.location,
            shelve_location: new.shelve_location,
            supplier_id: new.supplier_id,
            purchase_price_cents: new.purchase_price_cents,
            purchase_date: new.purchase_date,
            expiry_date: new.expiry_date,
            warranty_period_days: new.warranty_period_days,
            condition: new.condition,
            status: new.status,
            quotation_id: new.quotation_id,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO part_items
                (id, part_id, barcode, serial_number, location, shelve_location,
                 supplier_id, purchase_price_cents, purchase_date, expiry_date,
                 warranty_period_days, condition, status, quotation_id,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                    ?14, ?15, ?16)
            "#,
        )
        .bind(&item.id)
        .bind(&item.part_id)
        .bind(&item.barcode)
        .bind(&item.serial_number)
        .bind(&item.location)
        .bind(&item.shelve_location)
        .bind(&item.supplier_id)
        .bind(item.purchase_price_cents)
        .bind(item.purchase_date)
        .bind(item.expiry_date)
        .bind(item.warranty_period_days)
        .bind(item.condition)
        .bind(item.status)
        .bind(&item.quotation_id)
        .bind(item.created_at)
        .bind(item.updated_at)
        .execute(&mut **tx)
        .await?;

        Ok(item)
    }

    /// Gets a part item by ID, or None if not found.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<PartItem>> {
        let sql = format!("SELECT {PART_ITEM_COLUMNS} FROM part_items WHERE id = ?1");
        let item = sqlx::query_as::<_, PartItem>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(item)
    }

    /// True when a barcode is already assigned to some item.
    pub async fn barcode_exists(&self, barcode: &str) -> DbResult<bool> {
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM part_items WHERE barcode = ?1")
                .bind(barcode)
                .fetch_one(&self.pool)
                .await?;

        Ok(count > 0)
    }

    /// Lists part items matching a filter, newest first.
    pub async fn list(&self, filter: &PartItemFilter, page: &Page) -> DbResult<Vec<PartItem>> {
        validate_page(page)?;

        let mut qb = sqlx::QueryBuilder::<sqlx::Sqlite>::new(format!(
            "SELECT {PART_ITEM_COLUMNS} FROM part_items WHERE 1 = 1"
        ));

        if let Some(part_id) = &filter.part_id {
            qb.push(" AND part_id = ").push_bind(part_id);
        }
        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(condition) = filter.condition {
            qb.push(" AND condition = ").push_bind(condition);
        }
        if let Some(supplier_id) = &filter.supplier_id {
            qb.push(" AND supplier_id = ").push_bind(supplier_id);
        }
        if let Some(quotation_id) = &filter.quotation_id {
            qb.push(" AND quotation_id = ").push_bind(quotation_id);
        }

        qb.push(" ORDER BY created_at DESC LIMIT ")
            .push_bind(page.limit as i64)
            .push(" OFFSET ")
            .push_bind(page.offset());

        let items = qb.build_query_as::<PartItem>().fetch_all(&self.pool).await?;

        Ok(items)
    }

    /// Applies an allow-listed patch to a part item.
    ///
    /// Status and condition changes pass through the typed enums; there is
    /// no way to smuggle a free-text status into storage through this path.
    pub async fn update(&self, id: &str, patch: PartItemPatch) -> DbResult<PartItem> {
        if patch.is_empty() {
            return Err(quotedesk_core::error::ValidationError::EmptyPatch.into());
        }

        let mut item = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("PartItem", id))?;

        if let Some(status) = patch.status {
            item.status = status;
        }
        if let Some(condition) = patch.condition {
            item.condition = condition;
        }
        if let Some(location) = patch.location {
            item.location = Some(location);
        }
        if let Some(shelve_location) = patch.shelve_location {
            item.shelve_location = Some(shelve_location);
        }
        if let Some(quotation_id) = patch.quotation_id {
            item.quotation_id = Some(quotation_id);
        }
        item.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE part_items
            SET status = ?2, condition = ?3, location = ?4, shelve_location = ?5,
                quotation_id = ?6, updated_at = ?7
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(item.status)
        .bind(item.condition)
        .bind(&item.location)
        .bind(&item.shelve_location)
        .bind(&item.quotation_id)
        .bind(item.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("PartItem", id));
        }

        debug!(item_id = %id, status = item.status.as_str(), "Part item updated");

        Ok(item)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use quotedesk_core::NewPart;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    async fn seed_part(db: &Database) -> String {
        db.parts()
            .insert(NewPart {
                part_number: "BRK-PAD-330".to_string(),
                name: "Brake Pad Set".to_string(),
                price_cents: 4_999,
                ..Default::default()
            })
            .await
            .unwrap()
            .id
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let part_id = seed_part(&db).await;

        let mut new = NewPartItem::for_part(&part_id);
        new.barcode = Some("ITEM-0001".to_string());

        let item = db.part_items().insert(new).await.unwrap();
        assert_eq!(item.status, PartItemStatus::Available);

        let fetched = db.part_items().get_by_id(&item.id).await.unwrap().unwrap();
        assert_eq!(fetched.barcode.as_deref(), Some("ITEM-0001"));

        assert!(db.part_items().barcode_exists("ITEM-0001").await.unwrap());
        assert!(!db.part_items().barcode_exists("ITEM-9999").await.unwrap());
    }

    #[tokio::test]
    async fn test_insert_unknown_part_rejected() {
        let db = test_db().await;
        let err = db
            .part_items()
            .insert(NewPartItem::for_part(Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }));
    }

    #[tokio::test]
    async fn test_bulk_insert_all_or_nothing() {
        let db = test_db().await;
        let part_id = seed_part(&db).await;
        let repo = db.part_items();

        // A duplicate barcode inside the batch fails the third insert and
        // must roll back the first two.
        let mut a = NewPartItem::for_part(&part_id);
        a.barcode = Some("DUP-1".to_string());
        let b = NewPartItem::for_part(&part_id);
        let mut c = NewPartItem::for_part(&part_id);
        c.barcode = Some("DUP-1".to_string());

        let err = repo.insert_bulk(vec![a, b, c]).await.unwrap_err();
        assert!(matches!(err, DbError::UniqueViolation { .. }));

        let filter = PartItemFilter {
            part_id: Some(part_id.clone()),
            ..Default::default()
        };
        let items = repo.list(&filter, &Page::default()).await.unwrap();
        assert!(items.is_empty());

        // A clean batch lands entirely.
        let batch: Vec<_> = (0..5).map(|_| NewPartItem::for_part(&part_id)).collect();
        let created = repo.insert_bulk(batch).await.unwrap();
        assert_eq!(created.len(), 5);

        let items = repo.list(&filter, &Page::default()).await.unwrap();
        assert_eq!(items.len(), 5);
    }

    #[tokio::test]
    async fn test_bulk_insert_size_limits() {
        let db = test_db().await;
        let part_id = seed_part(&db).await;
        let repo = db.part_items();

        assert!(repo.insert_bulk(vec![]).await.is_err());

        let too_many: Vec<_> = (0..101).map(|_| NewPartItem::for_part(&part_id)).collect();
        let err = repo.insert_bulk(too_many).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_filters_by_status_and_condition() {
        let db = test_db().await;
        let part_id = seed_part(&db).await;
        let repo = db.part_items();

        let mut damaged = NewPartItem::for_part(&part_id);
        damaged.status = PartItemStatus::Damaged;
        damaged.condition = PartCondition::Used;
        repo.insert(damaged).await.unwrap();
        repo.insert(NewPartItem::for_part(&part_id)).await.unwrap();

        let filter = PartItemFilter {
            status: Some(PartItemStatus::Damaged),
            ..Default::default()
        };
        let hits = repo.list(&filter, &Page::default()).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].condition, PartCondition::Used);
    }

    #[tokio::test]
    async fn test_update_patch() {
        let db = test_db().await;
        let part_id = seed_part(&db).await;
        let repo = db.part_items();

        let item = repo.insert(NewPartItem::for_part(&part_id)).await.unwrap();

        let err = repo.update(&item.id, PartItemPatch::default()).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let patch = PartItemPatch {
            status: Some(PartItemStatus::Reserved),
            location: Some("Aisle 4".to_string()),
            ..Default::default()
        };
        let updated = repo.update(&item.id, patch).await.unwrap();
        assert_eq!(updated.status, PartItemStatus::Reserved);
        assert_eq!(updated.location.as_deref(), Some("Aisle 4"));
        // Untouched fields survive the patch.
        assert_eq!(updated.condition, item.condition);
    }
}
