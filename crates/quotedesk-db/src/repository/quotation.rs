//! # Quotation Repository
//!
//! Quotation lifecycle: creation, status-gated updates, and the one-way
//! conversion into an invoice.
//!
//! ## Conversion Path
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                 Quotation → Invoice Conversion                          │
//! │                                                                         │
//! │  convert_to_invoice(actor, id)                                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  BEGIN TRANSACTION                                                      │
//! │    UPDATE quotations SET status = 'invoiced'                            │
//! │     WHERE id = ? AND status IN ('draft','pending','confirmed')          │
//! │       │                                                                 │
//! │       ├── 0 rows → rollback, report current status (or not found)       │
//! │       │                                                                 │
//! │       ▼  1 row (this caller won the race)                               │
//! │    INSERT INTO invoices (snapshot of quotation, amount_paid = 0)        │
//! │  COMMIT                                                                 │
//! │                                                                         │
//! │  UNIQUE (quotation_id) on invoices backs the same guarantee at the      │
//! │  storage level.                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Two callers converting the same quotation concurrently: exactly one
//! invoice exists afterwards, the loser gets a status conflict.

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quotedesk_core::validation::{validate_new_quotation, validate_page};
use quotedesk_core::{
    default_due_date, generate_invoice_number, generate_quotation_number, Actor, Invoice,
    NewQuotation, NewQuotationItem, Page, Quotation, QuotationItem, QuotationOrderBy,
    QuotationPatch, QuotationStatus, SortOrder,
};

/// Filter for quotation listings. All conditions are combined with AND.
#[derive(Debug, Clone, Default)]
pub struct QuotationFilter {
    pub status: Option<QuotationStatus>,
    pub company_id: Option<String>,
    /// Exact match; use `search` for partial matching.
    pub customer_email: Option<String>,
    pub created_by: Option<String>,
    pub created_after: Option<DateTime<Utc>>,
    pub created_before: Option<DateTime<Utc>>,
    pub min_total_cents: Option<i64>,
    pub max_total_cents: Option<i64>,
    /// Matched against quotation_number, customer_name, customer_email.
    pub search: Option<String>,
    pub order_by: QuotationOrderBy,
    pub order: SortOrder,
}

const QUOTATION_COLUMNS: &str = "id, quotation_number, company_id, customer_name, customer_email, \
     customer_phone, status, subtotal_cents, tax_cents, discount_cents, \
     shipping_cents, total_cents, valid_until, payment_terms, notes, \
     internal_notes, created_by, updated_by, created_at, updated_at";

/// Repository for quotation operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.quotations();
/// let (quotation, items) = repo.create(&actor, draft, items).await?;
/// let invoice = repo.convert_to_invoice(&actor, &quotation.id).await?;
/// ```
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: SqlitePool,
}

impl QuotationRepository {
    /// Creates a new QuotationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuotationRepository { pool }
    }

    /// Creates a quotation with its line items in one transaction.
    ///
    /// ## What This Does
    /// 1. Validates the draft and every item, recomputing all derived
    ///    amounts; caller-supplied totals that disagree are rejected
    /// 2. Generates `QT-<millis><seq>` when no number was supplied
    /// 3. Inserts the quotation and its items atomically
    ///
    /// The stored subtotal/total are always the recomputed values.
    pub async fn create(
        &self,
        actor: &Actor,
        draft: NewQuotation,
        items: Vec<NewQuotationItem>,
    ) -> DbResult<(Quotation, Vec<QuotationItem>)> {
        let totals = validate_new_quotation(&draft, &items)?;

        let now = Utc::now();
        let quotation = Quotation {
            id: Uuid::new_v4().to_string(),
            quotation_number: draft
                .quotation_number
                .clone()
                .unwrap_or_else(|| generate_quotation_number(now)),
            company_id: draft.company_id.clone(),
            customer_name: draft.customer_name.clone(),
            customer_email: draft.customer_email.clone(),
            customer_phone: draft.customer_phone.clone(),
            status: QuotationStatus::Draft,
            subtotal_cents: totals.subtotal_cents,
            tax_cents: draft.tax_cents,
            discount_cents: draft.discount_cents,
            shipping_cents: draft.shipping_cents,
            total_cents: totals.total_cents,
            valid_until: draft.valid_until_or_default(now),
            payment_terms: draft.payment_terms.clone(),
            notes: draft.notes.clone(),
            internal_notes: draft.internal_notes.clone(),
            created_by: actor.id.clone(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotations
                (id, quotation_number, company_id, customer_name, customer_email,
                 customer_phone, status, subtotal_cents, tax_cents, discount_cents,
                 shipping_cents, total_cents, valid_until, payment_terms, notes,
                 internal_notes, created_by, updated_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14,
                    ?15, ?16, ?17, ?18, ?19, ?20)
            "#,
        )
        .bind(&quotation.id)
        .bind(&quotation.quotation_number)
        .bind(&quotation.company_id)
        .bind(&quotation.customer_name)
        .bind(&quotation.customer_email)
        .bind(&quotation.customer_phone)
        .bind(quotation.status)
        .bind(quotation.subtotal_cents)
        .bind(quotation.tax_cents)
        .bind(quotation.discount_cents)
        .bind(quotation.shipping_cents)
        .bind(quotation.total_cents)
        .bind(quotation.valid_until)
        .bind(&quotation.payment_terms)
        .bind(&quotation.notes)
        .bind(&quotation.internal_notes)
        .bind(&quotation.created_by)
        .bind(&quotation.updated_by)
        .bind(quotation.created_at)
        .bind(quotation.updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { .. } => {
                DbError::duplicate("quotation_number", &quotation.quotation_number)
            }
            other => other,
        })?;

        let mut stored_items = Vec::with_capacity(items.len());
        for (position, item) in items.into_iter().enumerate() {
            let row = QuotationItem {
                id: Uuid::new_v4().to_string(),
                quotation_id: quotation.id.clone(),
                part_id: item.part_id.clone(),
                quantity: item.quantity,
                unit_price_cents: item.unit_price_cents,
                discount_percent: item.discount_percent,
                line_total_cents: item.computed_line_total().cents(),
                position: position as i64,
                created_at: now,
            };

            sqlx::query(
                r#"
                INSERT INTO quotation_items
                    (id, quotation_id, part_id, quantity, unit_price_cents,
                     discount_percent, line_total_cents, position, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                "#,
            )
            .bind(&row.id)
            .bind(&row.quotation_id)
            .bind(&row.part_id)
            .bind(row.quantity)
            .bind(row.unit_price_cents)
            .bind(row.discount_percent)
            .bind(row.line_total_cents)
            .bind(row.position)
            .bind(row.created_at)
            .execute(&mut *tx)
            .await?;

            stored_items.push(row);
        }

        tx.commit().await?;

        info!(
            quotation_id = %quotation.id,
            quotation_number = %quotation.quotation_number,
            total_cents = quotation.total_cents,
            items = stored_items.len(),
            created_by = %actor.id,
            "Quotation created"
        );

        Ok((quotation, stored_items))
    }

    /// Gets a quotation with its line items, or None if not found.
    ///
    /// Items come back in their stored position order.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<(Quotation, Vec<QuotationItem>)>> {
        let Some(quotation) = self.fetch(id).await? else {
            return Ok(None);
        };

        let items = sqlx::query_as::<_, QuotationItem>(
            r#"
            SELECT id, quotation_id, part_id, quantity, unit_price_cents,
                   discount_percent, line_total_cents, position, created_at
            FROM quotation_items
            WHERE quotation_id = ?1
            ORDER BY position ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(Some((quotation, items)))
    }

    /// Gets a quotation header by its business number.
    pub async fn get_by_number(&self, quotation_number: &str) -> DbResult<Option<Quotation>> {
        let sql = format!("SELECT {QUOTATION_COLUMNS} FROM quotations WHERE quotation_number = ?1");
        let quotation = sqlx::query_as::<_, Quotation>(&sql)
            .bind(quotation_number)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quotation)
    }

    /// Lists quotation headers matching a filter.
    pub async fn list(&self, filter: &QuotationFilter, page: &Page) -> DbResult<Vec<Quotation>> {
        validate_page(page)?;

        let mut qb = self.filtered_query(format!(
            "SELECT {QUOTATION_COLUMNS} FROM quotations WHERE 1 = 1"
        ), filter);

        // Sort key comes from a fixed column set, never caller text.
        qb.push(format!(
            " ORDER BY {} {} LIMIT ",
            filter.order_by.as_column(),
            filter.order.as_sql()
        ))
        .push_bind(page.limit as i64)
        .push(" OFFSET ")
        .push_bind(page.offset());

        let quotations = qb
            .build_query_as::<Quotation>()
            .fetch_all(&self.pool)
            .await?;

        Ok(quotations)
    }

    /// Counts quotations matching a filter, for pagination metadata.
    pub async fn count(&self, filter: &QuotationFilter) -> DbResult<i64> {
        let mut qb = self.filtered_query(
            "SELECT COUNT(*) FROM quotations WHERE 1 = 1".to_string(),
            filter,
        );

        let (count,): (i64,) = qb.build_query_as().fetch_one(&self.pool).await?;

        Ok(count)
    }

    fn filtered_query<'a>(
        &self,
        base: String,
        filter: &'a QuotationFilter,
    ) -> sqlx::QueryBuilder<'a, sqlx::Sqlite> {
        let mut qb = sqlx::QueryBuilder::new(base);

        if let Some(status) = filter.status {
            qb.push(" AND status = ").push_bind(status);
        }
        if let Some(company_id) = &filter.company_id {
            qb.push(" AND company_id = ").push_bind(company_id);
        }
        if let Some(email) = &filter.customer_email {
            qb.push(" AND customer_email = ").push_bind(email);
        }
        if let Some(created_by) = &filter.created_by {
            qb.push(" AND created_by = ").push_bind(created_by);
        }
        if let Some(after) = filter.created_after {
            qb.push(" AND created_at >= ").push_bind(after);
        }
        if let Some(before) = filter.created_before {
            qb.push(" AND created_at <= ").push_bind(before);
        }
        if let Some(min) = filter.min_total_cents {
            qb.push(" AND total_cents >= ").push_bind(min);
        }
        if let Some(max) = filter.max_total_cents {
            qb.push(" AND total_cents <= ").push_bind(max);
        }
        if let Some(search) = &filter.search {
            let pattern = format!("%{}%", search.trim());
            qb.push(" AND (quotation_number LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_name LIKE ")
                .push_bind(pattern.clone())
                .push(" OR customer_email LIKE ")
                .push_bind(pattern)
                .push(")");
        }

        qb
    }

    /// Applies an allow-listed patch to an unlocked quotation.
    ///
    /// ## Gates
    /// - `confirmed`, `invoiced`, `sold` quotations are immutable here
    /// - a status change must be permitted by the transition table
    /// - amounts and line items cannot be changed at all (not in the patch)
    ///
    /// The write itself re-checks the lock in its WHERE clause, so a
    /// concurrent confirm/convert between read and write loses nothing.
    pub async fn update(
        &self,
        actor: &Actor,
        id: &str,
        patch: QuotationPatch,
    ) -> DbResult<Quotation> {
        if patch.is_empty() {
            return Err(quotedesk_core::error::ValidationError::EmptyPatch.into());
        }

        let mut quotation = self
            .fetch(id)
            .await?
            .ok_or_else(|| DbError::not_found("Quotation", id))?;

        if quotation.is_locked() {
            return Err(DbError::invalid_status(
                "Quotation",
                id,
                quotation.status.as_str(),
            ));
        }

        if let Some(next) = patch.status {
            if !quotation.status.can_transition_to(next) {
                debug!(
                    quotation_id = %id,
                    from = quotation.status.as_str(),
                    to = next.as_str(),
                    "Rejected status transition"
                );
                return Err(DbError::invalid_status(
                    "Quotation",
                    id,
                    quotation.status.as_str(),
                ));
            }
            quotation.status = next;
        }

        if let Some(company_id) = patch.company_id {
            quotation.company_id = Some(company_id);
        }
        if let Some(name) = patch.customer_name {
            quotation.customer_name = Some(name);
        }
        if let Some(email) = patch.customer_email {
            quotation.customer_email = Some(email);
        }
        if let Some(phone) = patch.customer_phone {
            quotation.customer_phone = Some(phone);
        }
        if let Some(valid_until) = patch.valid_until {
            quotation.valid_until = valid_until;
        }
        if let Some(terms) = patch.payment_terms {
            quotation.payment_terms = Some(terms);
        }
        if let Some(notes) = patch.notes {
            quotation.notes = Some(notes);
        }
        if let Some(internal) = patch.internal_notes {
            quotation.internal_notes = Some(internal);
        }
        quotation.updated_by = Some(actor.id.clone());
        quotation.updated_at = Utc::now();

        let result = sqlx::query(
            r#"
            UPDATE quotations
            SET company_id = ?2, customer_name = ?3, customer_email = ?4,
                customer_phone = ?5, status = ?6, valid_until = ?7,
                payment_terms = ?8, notes = ?9, internal_notes = ?10,
                updated_by = ?11, updated_at = ?12
            WHERE id = ?1
              AND status NOT IN ('confirmed', 'invoiced', 'sold')
            "#,
        )
        .bind(id)
        .bind(&quotation.company_id)
        .bind(&quotation.customer_name)
        .bind(&quotation.customer_email)
        .bind(&quotation.customer_phone)
        .bind(quotation.status)
        .bind(quotation.valid_until)
        .bind(&quotation.payment_terms)
        .bind(&quotation.notes)
        .bind(&quotation.internal_notes)
        .bind(&quotation.updated_by)
        .bind(quotation.updated_at)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Lost a race with a confirm/convert, or the row is gone.
            return match self.fetch(id).await? {
                Some(current) => Err(DbError::invalid_status(
                    "Quotation",
                    id,
                    current.status.as_str(),
                )),
                None => Err(DbError::not_found("Quotation", id)),
            };
        }

        debug!(
            quotation_id = %id,
            status = quotation.status.as_str(),
            updated_by = %actor.id,
            "Quotation updated"
        );

        Ok(quotation)
    }

    /// Converts a quotation into an invoice, exactly once.
    ///
    /// ## Semantics
    /// - allowed from `draft`, `pending`, `confirmed`; the quotation lands
    ///   on `invoiced`
    /// - the invoice snapshots company/customer fields and the total
    /// - `amount_paid` starts at 0; due date is conversion time + 30 days
    /// - any other current status (or a lost race) reports a status
    ///   conflict; a missing quotation reports not found
    pub async fn convert_to_invoice(&self, actor: &Actor, id: &str) -> DbResult<Invoice> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await?;

        // Conditional UPDATE is the linearization point: of any number of
        // concurrent converters, exactly one moves the row.
        let claimed = sqlx::query(
            r#"
            UPDATE quotations
            SET status = 'invoiced', updated_by = ?2, updated_at = ?3
            WHERE id = ?1 AND status IN ('draft', 'pending', 'confirmed')
            "#,
        )
        .bind(id)
        .bind(&actor.id)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if claimed.rows_affected() == 0 {
            tx.rollback().await?;
            return match self.fetch(id).await? {
                Some(current) => Err(DbError::invalid_status(
                    "Quotation",
                    id,
                    current.status.as_str(),
                )),
                None => Err(DbError::not_found("Quotation", id)),
            };
        }

        let sql = format!("SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = ?1");
        let quotation = sqlx::query_as::<_, Quotation>(&sql)
            .bind(id)
            .fetch_one(&mut *tx)
            .await?;

        let invoice = Invoice {
            id: Uuid::new_v4().to_string(),
            invoice_number: generate_invoice_number(now),
            quotation_id: quotation.id.clone(),
            company_id: quotation.company_id.clone(),
            customer_name: quotation.customer_name.clone(),
            customer_email: quotation.customer_email.clone(),
            customer_phone: quotation.customer_phone.clone(),
            total_cents: quotation.total_cents,
            amount_paid_cents: 0,
            due_date: default_due_date(now),
            notes: None,
            created_by: actor.id.clone(),
            updated_by: None,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO invoices
                (id, invoice_number, quotation_id, company_id, customer_name,
                 customer_email, customer_phone, total_cents, amount_paid_cents,
                 due_date, notes, created_by, updated_by, created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13,
                    ?14, ?15)
            "#,
        )
        .bind(&invoice.id)
        .bind(&invoice.invoice_number)
        .bind(&invoice.quotation_id)
        .bind(&invoice.company_id)
        .bind(&invoice.customer_name)
        .bind(&invoice.customer_email)
        .bind(&invoice.customer_phone)
        .bind(invoice.total_cents)
        .bind(invoice.amount_paid_cents)
        .bind(invoice.due_date)
        .bind(&invoice.notes)
        .bind(&invoice.created_by)
        .bind(&invoice.updated_by)
        .bind(invoice.created_at)
        .bind(invoice.updated_at)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        info!(
            quotation_id = %id,
            invoice_id = %invoice.id,
            invoice_number = %invoice.invoice_number,
            total_cents = invoice.total_cents,
            converted_by = %actor.id,
            "Quotation converted to invoice"
        );

        Ok(invoice)
    }

    /// Expires open quotations whose validity deadline has passed.
    ///
    /// Only `draft` and `pending` quotations expire; a confirmed quotation
    /// stays convertible until someone acts on it. Returns the number of
    /// rows moved.
    pub async fn expire_overdue(&self, now: DateTime<Utc>) -> DbResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE quotations
            SET status = 'expired', updated_at = ?1
            WHERE status IN ('draft', 'pending') AND valid_until < ?1
            "#,
        )
        .bind(now)
        .execute(&self.pool)
        .await?;

        let expired = result.rows_affected();
        if expired > 0 {
            info!(count = expired, "Expired overdue quotations");
        }

        Ok(expired)
    }

    async fn fetch(&self, id: &str) -> DbResult<Option<Quotation>> {
        let sql = format!("SELECT {QUOTATION_COLUMNS} FROM quotations WHERE id = ?1");
        let quotation = sqlx::query_as::<_, Quotation>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(quotation)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
