//! # Company Repository
//!
//! Database operations for the customer/supplier directory.
//!
//! Companies are referenced by quotations (the buyer) and by part items
//! (the supplier). A company can be both a customer and a supplier.

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use quotedesk_core::validation::{validate_name, validate_page};
use quotedesk_core::{Company, NewCompany, Page};

/// Repository for company database operations.
#[derive(Debug, Clone)]
pub struct CompanyRepository {
    pool: SqlitePool,
}

impl CompanyRepository {
    /// Creates a new CompanyRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CompanyRepository { pool }
    }

    /// Inserts a new company and returns the stored record.
    pub async fn insert(&self, new: NewCompany) -> DbResult<Company> {
        validate_name("name", &new.name)?;

        let now = Utc::now();
        let company = Company {
            id: Uuid::new_v4().to_string(),
            name: new.name.trim().to_string(),
            email: new.email,
            phone: new.phone,
            address: new.address,
            is_customer: new.is_customer,
            is_supplier: new.is_supplier,
            created_at: now,
            updated_at: now,
        };

        sqlx::query(
            r#"
            INSERT INTO companies
                (id, name, email, phone, address, is_customer, is_supplier,
                 created_at, updated_at)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            "#,
        )
        .bind(&company.id)
        .bind(&company.name)
        .bind(&company.email)
        .bind(&company.phone)
        .bind(&company.address)
        .bind(company.is_customer)
        .bind(company.is_supplier)
        .bind(company.created_at)
        .bind(company.updated_at)
        .execute(&self.pool)
        .await?;

        debug!(company_id = %company.id, name = %company.name, "Company created");

        Ok(company)
    }

    /// Gets a company by ID, or None if not found.
    pub async fn get_by_id(&self, id: &str) -> DbResult<Option<Company>> {
        let company = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, email, phone, address, is_customer, is_supplier,
                   created_at, updated_at
            FROM companies
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        Ok(company)
    }

    /// Lists companies, optionally restricted to customers or suppliers.
    ///
    /// Ordered by name.
    pub async fn list(
        &self,
        customers_only: bool,
        suppliers_only: bool,
        page: &Page,
    ) -> DbResult<Vec<Company>> {
        validate_page(page)?;

        let companies = sqlx::query_as::<_, Company>(
            r#"
            SELECT id, name, email, phone, address, is_customer, is_supplier,
                   created_at, updated_at
            FROM companies
            WHERE (?1 = 0 OR is_customer = 1)
              AND (?2 = 0 OR is_supplier = 1)
            ORDER BY name ASC
            LIMIT ?3 OFFSET ?4
            "#,
        )
        .bind(customers_only)
        .bind(suppliers_only)
        .bind(page.limit as i64)
        .bind(page.offset())
        .fetch_all(&self.pool)
        .await?;

        Ok(companies)
    }

    /// Updates a company's contact details and role flags.
    pub async fn update(&self, id: &str, updated: NewCompany) -> DbResult<Company> {
        validate_name("name", &updated.name)?;

        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE companies
            SET name = ?2, email = ?3, phone = ?4, address = ?5,
                is_customer = ?6, is_supplier = ?7, updated_at = ?8
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(updated.name.trim())
        .bind(&updated.email)
        .bind(&updated.phone)
        .bind(&updated.address)
        .bind(updated.is_customer)
        .bind(updated.is_supplier)
        .bind(now)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Company", id));
        }

        debug!(company_id = %id, "Company updated");

        self.get_by_id(id)
            .await?
            .ok_or_else(|| DbError::not_found("Company", id))
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

    fn customer(name: &str) -> NewCompany {
        NewCompany {
            name: name.to_string(),
            is_customer: true,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_insert_and_get() {
        let db = test_db().await;
        let repo = db.companies();

        let created = repo.insert(customer("Apex Auto Group")).await.unwrap();
        let fetched = repo.get_by_id(&created.id).await.unwrap().unwrap();

        assert_eq!(fetched.name, "Apex Auto Group");
        assert!(fetched.is_customer);
        assert!(!fetched.is_supplier);
    }

    #[tokio::test]
    async fn test_insert_rejects_blank_name() {
        let db = test_db().await;
        let err = db.companies().insert(customer("   ")).await.unwrap_err();
        assert!(matches!(err, DbError::Validation(_)));
    }

    #[tokio::test]
    async fn test_list_role_filters() {
        let db = test_db().await;
        let repo = db.companies();

        repo.insert(customer("Buyer Co")).await.unwrap();
        repo.insert(NewCompany {
            name: "Supplier Co".to_string(),
            is_supplier: true,
            ..Default::default()
        })
        .await
        .unwrap();

        let customers = repo.list(true, false, &Page::default()).await.unwrap();
        assert_eq!(customers.len(), 1);
        assert_eq!(customers[0].name, "Buyer Co");

        let suppliers = repo.list(false, true, &Page::default()).await.unwrap();
        assert_eq!(suppliers.len(), 1);
        assert_eq!(suppliers[0].name, "Supplier Co");

        let all = repo.list(false, false, &Page::default()).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_missing_company() {
        let db = test_db().await;
        let err = db
            .companies()
            .update("no-such-id", customer("Anything"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::NotFound { .. }));
    }
}
