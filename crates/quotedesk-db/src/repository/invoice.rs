//! # Invoice Repository
//!
//! The invoice ledger: reads, the narrow `{due_date, notes}` update, and
//! payment recording.
//!
//! ## Payment Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Payments and Derived Status                          │
//! │                                                                         │
//! │  record_payment(actor, id, amount)                                      │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │    INSERT INTO invoice_payments (append-only ledger row)                │
//! │    UPDATE invoices SET amount_paid_cents += amount                      │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  amount_paid only ever grows; there is no "set amount_paid" path.       │
//! │                                                                         │
//! │  Payment status is never stored. It is derived on read:                 │
//! │    paid ≥ total            → paid    (overpayment included)             │
//! │    else past due           → overdue                                    │
//! │    else paid = 0           → pending                                    │
//! │    else                    → partial                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quotedesk_core::validation::{validate_page, validate_positive_cents};
use quotedesk_core::{
    Actor, Invoice, InvoiceOrderBy, InvoicePatch, InvoicePayment, Page, PaymentStatus, SortOrder,
};

/// Filter for invoice listings. All conditions are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct InvoiceFilter {
    pub company_id: Option<String>,
    /// Derived at query time from the accumulator, total, and due date.
    pub payment_status: Option<PaymentStatus>,
    pub due_after: Option<DateTime<Utc>>,
    pub due_before: Option<DateTime<Utc>>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    /// Matched against invoice_number, customer_name, customer_email.
    pub search: Option<String>,
    pub order_by: InvoiceOrderBy,
    pub order: SortOrder,
}

const INVOICE_COLUMNS: &str = "id, invoice_number, quotation_id, company_id, customer_name, \
     customer_email, customer_phone, total_cents, amount_paid_cents, due_date, \
     notes, created_by, updated_by, created_at, updated_at";

/// Repository for invoice operations.
///
/// Invoices are only ever born from quotation conversion (see
/// [`crate::repository::quotation::QuotationRepository::convert_to_invoice`]);
/// there is no standalone insert here.
#[derive(Debug, Clone)]
pub struct InvoiceRepository {
    pool: SqlitePool,
}

impl InvoiceRepository {
    /// Creates a new InvoiceRepository.
    pub fn new(pool: SqlitePool) -> Self {
        InvoiceRepository { pool }
    }

    /// Gets an invoice by ID, or None if not found.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Gets an invoice by its business number.
    pub async fn get_by_number(&self, invoice_number: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE invoice_number = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(invoice_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Gets the invoice derived from a quotation, if conversion happened.
    pub async fn get_by_quotation_id(&self, quotation_id: &str) -> DbResult<Option<Invoice>> {
        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE quotation_id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(quotation_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(invoice)
    }

    /// Lists invoices matching a filter.
    pub async fn list(&self, filter: &InvoiceFilter, page: &Page) -> DbResult<Vec<Invoice>> {
        validate_page(page)?;

        let mut qb = self.filtered_query(
            format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE 1 = 1"),
            filter,
            Utc::now(),
        );

        qb.push(format!(
            " ORDER BY {} {} LIMIT ",
            filter.order_by.as_column(),
            filter.order.as_sql()
        ))
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());

        let invoices = qb.build_query_as::<Invoice>().fetch_all(&self.pool).await?;

        Ok(invoices)
    }

    /// Counts invoices matching a filter, for pagination metadata.
    pub async fn count(&self, filter: &InvoiceFilter) -> DbResult<i64> {
        let mut qb = self.filtered_query(
            "SELECT COUNT(*) FROM invoices WHERE 1 = 1".to_string(),
            filter,
            Utc::now(),
        );

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(count)
    }

    fn filtered_query<'a>(
        &self,
        base: String,
        filter: &'a InvoiceFilter,
        now: DateTime<Utc>,
    ) -> sqlx::QueryBuilder<'a, sqlx::Sqlite> {
        let mut qb = sqlx::QueryBuilder::new(base);

        if let Some(company_id) = &filter.company_id {
            qb.push(" AND company_id = ").push_bind(company_id);
        }
        if let Some(status) = filter.payment_status {
            // Same derivation as PaymentStatus::derive, expressed over the
            // stored columns.
            match status {
                PaymentStatus::Paid => {
                    qb.push(" AND amount_paid_cents >= total_cents");
                }
                PaymentStatus::Overdue => {
                    qb.push(" AND amount_paid_cents < total_cents AND due_date < ")
                        .push_bind(now);
                }
                PaymentStatus::Partial => {
                    qb.push(
                        " AND amount_paid_cents > 0 AND amount_paid_cents < total_cents \
                          AND due_date >= ",
                    )
                    .push_bind(now);
                }
                PaymentStatus::Pending => {
                    qb.push(" AND amount_paid_cents = 0 AND due_date >= ")
                        .push_bind(now);
                }
            }
        }
        if let Some(after) = filter.due_after {
            qb.push(" AND due_date >= ").push_bind(after);
        }
        if let Some(before) = filter.due_before {
            qb.push(" AND due_date <= ").push_bind(before);
        }
        if let Some(after) = filter.created_after {
            qb.push(" AND created_at >= ").push_bind(after);
        }
        if let Some(before) = filter.created_before {
            qb.push(" AND created_at <= ").push_bind(before);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (invoice_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb
    }

    /// Applies the `{due_date, notes}` patch to an invoice.
    ///
    /// Totals, the accumulator, and the quotation link have no update path
    /// at all; a caller wanting to change them is asking for a different
    /// document.
    pub async fn update(&self, actor: &Actor, id: &str, patch: InvoicePatch) -> DbResult<Invoice> {
        if patch.is_empty() {
            return Err(quotedesk_core::error::ValidationError::EmptyPatch.into());
        }

        let mut invoice = self
            .get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Invoice", id))?;

        if let Some(due_date) = patch.due_date {
            invoice.due_date = due_date;
        }
        if let Some(notes) = patch.notes {
            invoice.notes = Some(notes);
        }
        invoice.updated_by = Some(actor.id.clone());
        invoice.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET due_date = ?2, notes = ?3, updated_by = ?4, updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(invoice.due_date)
        .bind(&invoice.notes)
        .bind(&invoice.updated_by)
        .bind(invoice.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Invoice", id));
        }

        debug!(invoice_id = %id, updated_by = %actor.id, "Invoice updated");

        Ok(invoice)
    }

    /// Records a payment against an invoice.
    ///
    /// ## What This Does
    /// 1. Rejects non-positive amounts
    /// 2. Appends a ledger row and bumps the accumulator in one transaction
    /// 3. Returns the invoice after the payment landed
    ///
    /// Overpayment is accepted; the derived status reads `paid` and the
    /// balance due reads zero. Refunds are a bookkeeping action outside
    /// this path, so the accumulator never decreases.
    pub async fn record_payment(
        &self,
        actor: &Actor,
        id: &str,
        amount_cents: i64,
    ) -> DbResult<Invoice> {
        validate_positive_cents("amount_cents", amount_cents)?;

        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE invoices
            SET amount_paid_cents = amount_paid_cents + ?2,
                updated_by = ?3, updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(amount_cents)
        .bind(&actor.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            tx.rollback().await?;
            return Err(DbError::not_found("Invoice", id));
        }

        let payment = InvoicePayment {
            id: Uuid::new_v4().to_string(),
            invoice_id: id.to_string(),
            amount_cents,
            recorded_by: actor.id.clone(),
            recorded_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO invoice_payments
                (id, invoice_id, amount_cents, recorded_by, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(&payment.id)
        .bind(&payment.invoice_id)
        .bind(payment.amount_cents)
        .bind(&payment.recorded_by)
        .bind(payment.recorded_at)
        .execute(&mut *tx)
        .await?;

        let sql = format!("SELECT {INVOICE_COLUMNS} FROM invoices WHERE id = ?1");
        let invoice = sqlx::query_as::<_, Invoice>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;

        info!(
            invoice_id = %id,
            amount_cents = amount_cents,
            amount_paid_cents = invoice.amount_paid_cents,
            recorded_by = %actor.id,
            "Payment recorded"
        );

        Ok(invoice)
    }

    /// Returns the payment ledger for an invoice, oldest first.
    pub async fn payments(&self, invoice_id: &str) -> DbResult<Vec<InvoicePayment>> {
        let rows = sqlx::query_as::<_, InvoicePayment>(
            r#"
            SELECT id, invoice_id, amount_cents, recorded_by, recorded_at
            FROM invoice_payments
            WHERE invoice_id = ?1
            ORDER BY recorded_at ASC, id ASC
            "#,
        )
        .bind(invoice_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use chrono::Duration;
    use quotedesk_core::{NewPart, NewQuotation, NewQuotationItem};

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn actor() -> Actor {
        Actor::new("user-1", "sales")
    }

    /// Seeds a part, a quotation over it, and converts; returns the invoice.
    async fn seed_invoice(db: &Database, total_cents: i64) -> Invoice {
        let part = db
            .parts()
            .insert(NewPart {
                part_number: format!("PRT-{}", Uuid::new_v4().simple()),
                name: "Part".to_string(),
                price_cents: total_cents,
                ..Default::default()
            })
            .await
            .unwrap();

        let (quotation, _) = db
            .quotations()
            .create(
                &actor(),
                NewQuotation::default(),
                vec![NewQuotationItem::new(&part.id, 1, total_cents)],
            )
            .await
            .unwrap();

        db.quotations()
            .convert_to_invoice(&actor(), &quotation.id)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_record_payment_accumulates() {
        let db = test_db().await;
        let invoice = seed_invoice(&db, 10_000).await;
        let repo = db.invoices();

        let after_first = repo
            .record_payment(&actor(), &invoice.id, 4_000)
            .await
            .unwrap();
        assert_eq!(after_first.amount_paid_cents, 4_000);
        assert_eq!(after_first.payment_status(Utc::now()), PaymentStatus::Partial);

        let after_second = repo
            .record_payment(&actor(), &invoice.id, 6_000)
            .await
            .unwrap();
        assert_eq!(after_second.amount_paid_cents, 10_000);
        assert_eq!(after_second.payment_status(Utc::now()), PaymentStatus::Paid);

        let ledger = repo.payments(&invoice.id).await.unwrap();
        assert_eq!(ledger.len(), 2);
        assert_eq!(ledger[0].amount_cents, 4_000);
        assert_eq!(ledger[1].amount_cents, 6_000);
    }

    #[tokio::test]
    async fn test_record_payment_rejects_non_positive() {
        let db = test_db().await;
        let invoice = seed_invoice(&db, 10_000).await;
        let repo = db.invoices();

        assert!(repo.record_payment(&actor(), &invoice.id, 0).await.is_err());
        assert!(repo.record_payment(&actor(), &invoice.id, -100).await.is_err());

        // Nothing landed in the ledger or the accumulator.
        assert!(repo.payments(&invoice.id).await.unwrap().is_empty());
        let unchanged = repo.get_by_id(&invoice.id).await.unwrap().unwrap();
        assert_eq!(unchanged.amount_paid_cents, 0);
    }

    #[tokio::test]
    async fn test_overpayment_allowed_and_reads_paid() {
        let db = test_db().await;
        let invoice = seed_invoice(&db, 5_000).await;

        let after = db
            .invoices()
            .record_payment(&actor(), &invoice.id, 7_500)
            .await
            .unwrap();

        assert_eq!(after.amount_paid_cents, 7_500);
        assert_eq!(after.balance_due().cents(), 0);
        assert_eq!(after.payment_status(Utc::now()), PaymentStatus::Paid);
    }

    #[tokio::test]
    async fn test_record_payment_missing_invoice() {
        let db = test_db().await;
        let err = db
            .invoices()
            .record_payment(&actor(), &Uuid::new_v4().to_string(), 100)
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_update_patch_due_date_and_notes_only() {
        let db = test_db().await;
        let invoice = seed_invoice(&db, 5_000).await;
        let repo = db.invoices();

        let err = repo
            .update(&actor(), &invoice.id, InvoicePatch::default())
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));

        let new_due = Utc::now() + Duration::days(60);
        let patch = InvoicePatch {
            due_date: Some(new_due),
            notes: Some("net 60 agreed".to_string()),
        };
        let updated = repo.update(&actor(), &invoice.id, patch).await.unwrap();

        assert_eq!(updated.due_date, new_due);
        assert_eq!(updated.notes.as_deref(), Some("net 60 agreed"));
        assert_eq!(updated.updated_by.as_deref(), Some("user-1"));
        // The immutable columns stayed put.
        assert_eq!(updated.total_cents, invoice.total_cents);
        assert_eq!(updated.quotation_id, invoice.quotation_id);
    }

    #[tokio::test]
    async fn test_lookup_by_number_and_quotation() {
        let db = test_db().await;
        let invoice = seed_invoice(&db, 5_000).await;
        let repo = db.invoices();

        let by_number = repo
            .get_by_number(&invoice.invoice_number)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_number.id, invoice.id);

        let by_quotation = repo
            .get_by_quotation_id(&invoice.quotation_id)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(by_quotation.id, invoice.id);
    }

    #[tokio::test]
    async fn test_list_filters_by_derived_payment_status() {
        let db = test_db().await;
        let repo = db.invoices();

        let unpaid = seed_invoice(&db, 10_000).await;
        let partial = seed_invoice(&db, 10_000).await;
        let paid = seed_invoice(&db, 10_000).await;
        let overdue = seed_invoice(&db, 10_000).await;

        repo.record_payment(&actor(), &partial.id, 2_500).await.unwrap();
        repo.record_payment(&actor(), &paid.id, 10_000).await.unwrap();
        // Push one invoice past its due date, partially paid.
        repo.record_payment(&actor(), &overdue.id, 2_500).await.unwrap();
        let past = InvoicePatch {
            due_date: Some(Utc::now() - Duration::days(1)),
            ..Default::default()
        };
        repo.update(&actor(), &overdue.id, past).await.unwrap();

        let expect = [
            (PaymentStatus::Pending, &unpaid),
            (PaymentStatus::Partial, &partial),
            (PaymentStatus::Paid, &paid),
            (PaymentStatus::Overdue, &overdue),
        ];
        for (status, invoice) in expect {
            let filter = InvoiceFilter {
                payment_status: Some(status),
                ..Default::default()
            };
            let hits = repo.list(&filter, &Page::default()).await.unwrap();
            assert_eq!(hits.len(), 1, "status {status:?}");
            assert_eq!(hits[0].id, invoice.id, "status {status:?}");
            assert_eq!(repo.count(&filter).await.unwrap(), 1);
        }
    }

    #[tokio::test]
    async fn test_list_ordering_by_due_date() {
        let db = test_db().await;
        let repo = db.invoices();

        let a = seed_invoice(&db, 1_000).await;
        let b = seed_invoice(&db, 2_000).await;

        let sooner = InvoicePatch {
            due_date: Some(Utc::now() + Duration::days(5)),
            ..Default::default()
        };
        repo.update(&actor(), &b.id, sooner).await.unwrap();

        let filter = InvoiceFilter {
            order_by: InvoiceOrderBy::DueDate,
            order: SortOrder::Asc,
            ..Default::default()
        };
        let hits = repo.list(&filter, &Page::default()).await.unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].id, b.id);
        assert_eq!(hits[1].id, a.id);
    }
}
