//! # Quotation Repository
//!
//! Persistence for numbered quotations and their line items.
//!
//! ## Record Lifecycle
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      Quotation Lifecycle                                │
//! │                                                                         │
//! │  1. INSERT                                                             │
//! │     └── insert(NewQuotation) → header + items in one transaction       │
//! │         number is UNIQUE: a second row with the same number fails      │
//! │                                                                         │
//! │  2. UPDATE (any number of times)                                       │
//! │     └── update(id, QuotationChanges)                                   │
//! │         replaces date, bill-to, items and totals                       │
//! │         number and created_at are NOT part of the statement            │
//! │                                                                         │
//! │  3. DELETE                                                             │
//! │     └── delete(id) → items cascade                                     │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Reads load the header and its items inside one transaction, so a
//! quotation is never assembled from two versions of the record.

use std::collections::HashMap;

use chrono::{DateTime, NaiveDate, Utc};
use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};
use furnisure_core::{BillTo, GstRates, LineItem, Money, Quotation, StoredTotals, TaxRate, Totals};

/// Column holding the document number; unique violations on it mean two
/// quotations were about to share a number.
pub const NUMBER_COLUMN: &str = "quotations.number";

// =============================================================================
// Write Models
// =============================================================================

/// A quotation about to be stored for the first time.
#[derive(Debug, Clone)]
pub struct NewQuotation {
    pub number: String,
    pub date: NaiveDate,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub rates: GstRates,
    /// Complete for created quotations; imports keep whatever they had.
    pub totals: StoredTotals,
    /// Usually now; imported records keep their original timestamp.
    pub created_at: DateTime<Utc>,
}

/// The editable part of a stored quotation.
#[derive(Debug, Clone)]
pub struct QuotationChanges {
    pub date: NaiveDate,
    pub bill_to: BillTo,
    pub items: Vec<LineItem>,
    pub totals: Totals,
}

// =============================================================================
// Records
// =============================================================================

#[derive(Debug, Clone, sqlx::FromRow)]
struct QuotationRecord {
    id: String,
    number: String,
    quotation_date: NaiveDate,
    bill_to_name: String,
    bill_to_address: String,
    bill_to_city: String,
    bill_to_mobile: String,
    cgst_bps: i64,
    sgst_bps: i64,
    subtotal_paise: Option<i64>,
    cgst_paise: Option<i64>,
    sgst_paise: Option<i64>,
    grand_total_paise: Option<i64>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, sqlx::FromRow)]
struct ItemRecord {
    quotation_id: String,
    description: String,
    unit_price_paise: i64,
    quantity: i64,
}

const SELECT_QUOTATION: &str = r#"
    SELECT
        id, number, quotation_date,
        bill_to_name, bill_to_address, bill_to_city, bill_to_mobile,
        cgst_bps, sgst_bps,
        subtotal_paise, cgst_paise, sgst_paise, grand_total_paise,
        created_at, updated_at
    FROM quotations
"#;

impl QuotationRecord {
    fn into_quotation(self, items: Vec<LineItem>) -> DbResult<Quotation> {
        let rates = GstRates::new(
            rate_from_column(&self.id, self.cgst_bps)?,
            rate_from_column(&self.id, self.sgst_bps)?,
        );

        let totals = StoredTotals {
            subtotal: self.subtotal_paise.map(Money::from_paise),
            cgst_amount: self.cgst_paise.map(Money::from_paise),
            sgst_amount: self.sgst_paise.map(Money::from_paise),
            grand_total: self.grand_total_paise.map(Money::from_paise),
        };

        Ok(Quotation {
            id: self.id,
            number: self.number,
            date: self.quotation_date,
            bill_to: BillTo {
                name: self.bill_to_name,
                address: self.bill_to_address,
                city: self.bill_to_city,
                mobile: self.bill_to_mobile,
            },
            items,
            rates,
            totals,
            created_at: self.created_at,
            updated_at: self.updated_at,
        })
    }
}

impl From<ItemRecord> for LineItem {
    fn from(record: ItemRecord) -> Self {
        LineItem {
            description: record.description,
            unit_price: Money::from_paise(record.unit_price_paise),
            quantity: record.quantity,
        }
    }
}

fn rate_from_column(id: &str, bps: i64) -> DbResult<TaxRate> {
    u32::try_from(bps)
        .map(TaxRate::from_bps)
        .map_err(|_| DbError::corrupt("Quotation", format!("{}: tax rate {} bps", id, bps)))
}

// =============================================================================
// Repository
// =============================================================================

/// Repository for quotation database operations.
#[derive(Debug, Clone)]
pub struct QuotationRepository {
    pool: SqlitePool,
}

impl QuotationRepository {
    /// Creates a new QuotationRepository.
    pub fn new(pool: SqlitePool) -> Self {
        QuotationRepository { pool }
    }

    /// Stores a new quotation with a fresh UUID.
    ///
    /// ## Errors
    /// - `DbError::UniqueViolation` on [`NUMBER_COLUMN`] if the number is taken
    pub async fn insert(&self, new: NewQuotation) -> DbResult<Quotation> {
        let id = Uuid::new_v4().to_string();
        let updated_at = new.created_at;

        debug!(id = %id, number = %new.number, "Inserting quotation");

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO quotations (
                id, number, quotation_date,
                bill_to_name, bill_to_address, bill_to_city, bill_to_mobile,
                cgst_bps, sgst_bps,
                subtotal_paise, cgst_paise, sgst_paise, grand_total_paise,
                created_at, updated_at
            ) VALUES (
                ?1, ?2, ?3,
                ?4, ?5, ?6, ?7,
                ?8, ?9,
                ?10, ?11, ?12, ?13,
                ?14, ?15
            )
            "#,
        )
        .bind(&id)
        .bind(&new.number)
        .bind(new.date)
        .bind(&new.bill_to.name)
        .bind(&new.bill_to.address)
        .bind(&new.bill_to.city)
        .bind(&new.bill_to.mobile)
        .bind(i64::from(new.rates.cgst.bps()))
        .bind(i64::from(new.rates.sgst.bps()))
        .bind(new.totals.subtotal.map(|m| m.paise()))
        .bind(new.totals.cgst_amount.map(|m| m.paise()))
        .bind(new.totals.sgst_amount.map(|m| m.paise()))
        .bind(new.totals.grand_total.map(|m| m.paise()))
        .bind(new.created_at)
        .bind(updated_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| match DbError::from(e) {
            DbError::UniqueViolation { field, .. } => DbError::duplicate(field, &new.number),
            other => other,
        })?;

        insert_items(&mut tx, &id, &new.items).await?;

        tx.commit().await?;

        Ok(Quotation {
            id,
            number: new.number,
            date: new.date,
            bill_to: new.bill_to,
            items: new.items,
            rates: new.rates,
            totals: new.totals,
            created_at: new.created_at,
            updated_at,
        })
    }

    /// All quotations, newest first.
    pub async fn find_all(&self) -> DbResult<Vec<Quotation>> {
        let mut tx = self.pool.begin().await?;

        let records: Vec<QuotationRecord> = sqlx::query_as(&format!(
            "{} ORDER BY created_at DESC, number DESC",
            SELECT_QUOTATION
        ))
        .fetch_all(&mut *tx)
        .await?;

        let item_records: Vec<ItemRecord> = sqlx::query_as(
            r#"
            SELECT quotation_id, description, unit_price_paise, quantity
            FROM quotation_items
            ORDER BY quotation_id, position
            "#,
        )
        .fetch_all(&mut *tx)
        .await?;

        tx.commit().await?;

        let mut items_by_quotation: HashMap<String, Vec<LineItem>> = HashMap::new();
        for record in item_records {
            items_by_quotation
                .entry(record.quotation_id.clone())
                .or_default()
                .push(record.into());
        }

        records
            .into_iter()
            .map(|record| {
                let items = items_by_quotation.remove(&record.id).unwrap_or_default();
                record.into_quotation(items)
            })
            .collect()
    }

    /// Gets a quotation by ID.
    pub async fn find_by_id(&self, id: &str) -> DbResult<Option<Quotation>> {
        let mut tx = self.pool.begin().await?;
        let quotation = load(&mut tx, id).await?;
        tx.commit().await?;

        Ok(quotation)
    }

    /// Gets a quotation by its document number.
    pub async fn find_by_number(&self, number: &str) -> DbResult<Option<Quotation>> {
        let mut tx = self.pool.begin().await?;

        let id: Option<String> = sqlx::query_scalar("SELECT id FROM quotations WHERE number = ?1")
            .bind(number)
            .fetch_optional(&mut *tx)
            .await?;

        let quotation = match id {
            Some(id) => load(&mut tx, &id).await?,
            None => None,
        };
        tx.commit().await?;

        Ok(quotation)
    }

    /// Replaces the editable fields of quotation `id`.
    ///
    /// `number`, `rates` and `created_at` are left as stored.
    ///
    /// ## Errors
    /// - `DbError::NotFound` if no quotation has this id
    pub async fn update(&self, id: &str, changes: QuotationChanges) -> DbResult<Quotation> {
        let now = Utc::now();

        debug!(id = %id, items = changes.items.len(), "Updating quotation");

        let mut tx = self.pool.begin().await?;

        let result = sqlx::query(
            r#"
            UPDATE quotations SET
                quotation_date = ?2,
                bill_to_name = ?3,
                bill_to_address = ?4,
                bill_to_city = ?5,
                bill_to_mobile = ?6,
                subtotal_paise = ?7,
                cgst_paise = ?8,
                sgst_paise = ?9,
                grand_total_paise = ?10,
                updated_at = ?11
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(changes.date)
        .bind(&changes.bill_to.name)
        .bind(&changes.bill_to.address)
        .bind(&changes.bill_to.city)
        .bind(&changes.bill_to.mobile)
        .bind(changes.totals.subtotal.paise())
        .bind(changes.totals.cgst_amount.paise())
        .bind(changes.totals.sgst_amount.paise())
        .bind(changes.totals.grand_total.paise())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Quotation", id));
        }

        sqlx::query("DELETE FROM quotation_items WHERE quotation_id = ?1")
            .bind(id)
            .execute(&mut *tx)
            .await?;

        insert_items(&mut tx, id, &changes.items).await?;

        let updated = load(&mut tx, id)
            .await?
            .ok_or_else(|| DbError::not_found("Quotation", id))?;

        tx.commit().await?;

        Ok(updated)
    }

    /// Deletes quotation `id` and its items. Returns `false` if nothing matched.
    pub async fn delete(&self, id: &str) -> DbResult<bool> {
        let result = sqlx::query("DELETE FROM quotations WHERE id = ?1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        debug!(id = %id, deleted = result.rows_affected(), "Deleted quotation");
        Ok(result.rows_affected() > 0)
    }

    /// Number of stored quotations.
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotations")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

/// Header and items of quotation `id`, read on one connection.
async fn load(conn: &mut SqliteConnection, id: &str) -> DbResult<Option<Quotation>> {
    let record: Option<QuotationRecord> =
        sqlx::query_as(&format!("{} WHERE id = ?1", SELECT_QUOTATION))
            .bind(id)
            .fetch_optional(&mut *conn)
            .await?;

    let Some(record) = record else {
        return Ok(None);
    };

    let items: Vec<ItemRecord> = sqlx::query_as(
        r#"
        SELECT quotation_id, description, unit_price_paise, quantity
        FROM quotation_items
        WHERE quotation_id = ?1
        ORDER BY position
        "#,
    )
    .bind(id)
    .fetch_all(&mut *conn)
    .await?;

    record
        .into_quotation(items.into_iter().map(LineItem::from).collect())
        .map(Some)
}

async fn insert_items(
    conn: &mut SqliteConnection,
    quotation_id: &str,
    items: &[LineItem],
) -> DbResult<()> {
    for (position, item) in items.iter().enumerate() {
        sqlx::query(
            r#"
            INSERT INTO quotation_items (
                quotation_id, position, description, unit_price_paise, quantity
            ) VALUES (?1, ?2, ?3, ?4, ?5)
            "#,
        )
        .bind(quotation_id)
        .bind(position as i64)
        .bind(&item.description)
        .bind(item.unit_price.paise())
        .bind(item.quantity)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Database, DbConfig};
    use furnisure_core::compute_totals;

    async fn test_db() -> Database {
        Database::new(DbConfig::in_memory()).await.unwrap()
    }

    fn chair(quantity: i64) -> LineItem {
        LineItem {
            description: "Dining chair".to_string(),
            unit_price: Money::from_paise(17000),
            quantity,
        }
    }

    fn new_quotation(number: &str, items: Vec<LineItem>) -> NewQuotation {
        let totals = compute_totals(&items, GstRates::standard()).unwrap();
        NewQuotation {
            number: number.to_string(),
            date: NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(),
            bill_to: BillTo {
                name: "Shantinath Agency".to_string(),
                ..BillTo::default()
            },
            items,
            rates: GstRates::standard(),
            totals: totals.into(),
            created_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn test_insert_and_find_by_id() {
        let db = test_db().await;
        let repo = db.quotations();

        let stored = repo
            .insert(new_quotation("CE0001-21-22", vec![chair(4), chair(1)]))
            .await
            .unwrap();
        let loaded = repo.find_by_id(&stored.id).await.unwrap().unwrap();

        assert_eq!(loaded.number, "CE0001-21-22");
        assert_eq!(loaded.items.len(), 2);
        assert_eq!(loaded.items[0].quantity, 4);
        assert_eq!(loaded.items[1].quantity, 1);
        assert_eq!(loaded.bill_to.name, "Shantinath Agency");
        assert_eq!(loaded.totals, stored.totals);
        assert_eq!(loaded.rates, GstRates::standard());
    }

    #[tokio::test]
    async fn test_find_missing_returns_none() {
        let db = test_db().await;
        assert!(db.quotations().find_by_id("missing").await.unwrap().is_none());
        assert!(db
            .quotations()
            .find_by_number("CE9999-21-22")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn test_duplicate_number_is_unique_violation() {
        let db = test_db().await;
        let repo = db.quotations();

        repo.insert(new_quotation("CE0001-21-22", vec![chair(1)]))
            .await
            .unwrap();
        let err = repo
            .insert(new_quotation("CE0001-21-22", vec![chair(2)]))
            .await
            .unwrap_err();

        assert!(err.is_unique_violation_on(NUMBER_COLUMN));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_number_and_created_at() {
        let db = test_db().await;
        let repo = db.quotations();

        let stored = repo
            .insert(new_quotation("CE0007-21-22", vec![chair(4)]))
            .await
            .unwrap();

        let items = vec![chair(10)];
        let totals = compute_totals(&items, GstRates::standard()).unwrap();
        let updated = repo
            .update(
                &stored.id,
                QuotationChanges {
                    date: NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
                    bill_to: BillTo::default(),
                    items,
                    totals,
                },
            )
            .await
            .unwrap();

        assert_eq!(updated.number, "CE0007-21-22");
        assert_eq!(updated.created_at, stored.created_at);
        assert_eq!(updated.items.len(), 1);
        assert_eq!(updated.items[0].quantity, 10);
        assert_eq!(updated.totals.complete(), Some(totals));
        assert!(updated.updated_at >= stored.updated_at);
    }

    #[tokio::test]
    async fn test_update_missing_is_not_found() {
        let db = test_db().await;
        let items = vec![chair(1)];
        let totals = compute_totals(&items, GstRates::standard()).unwrap();

        let err = db
            .quotations()
            .update(
                "missing",
                QuotationChanges {
                    date: NaiveDate::from_ymd_opt(2022, 4, 2).unwrap(),
                    bill_to: BillTo::default(),
                    items,
                    totals,
                },
            )
            .await
            .unwrap_err();

        assert!(matches!(err, DbError::NotFound { .. }));
    }

    #[tokio::test]
    async fn test_find_all_newest_first() {
        let db = test_db().await;
        let repo = db.quotations();

        let mut older = new_quotation("CE0001-21-22", vec![chair(1)]);
        older.created_at = Utc::now() - chrono::Duration::days(1);
        repo.insert(older).await.unwrap();
        repo.insert(new_quotation("CE0002-21-22", vec![chair(2), chair(3)]))
            .await
            .unwrap();

        let all = repo.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].number, "CE0002-21-22");
        assert_eq!(all[0].items.len(), 2);
        assert_eq!(all[1].number, "CE0001-21-22");
        assert_eq!(all[1].items.len(), 1);
    }

    #[tokio::test]
    async fn test_missing_totals_load_as_empty() {
        let db = test_db().await;
        let repo = db.quotations();

        let mut legacy = new_quotation("CE0003-20-21", vec![chair(1)]);
        legacy.totals = StoredTotals::default();
        let stored = repo.insert(legacy).await.unwrap();

        let loaded = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert!(loaded.totals.is_empty());
    }

    #[tokio::test]
    async fn test_partial_totals_keep_each_stored_amount() {
        let db = test_db().await;
        let repo = db.quotations();

        let mut legacy = new_quotation("CE0004-20-21", vec![chair(4)]);
        legacy.totals.sgst_amount = None;
        legacy.totals.grand_total = Some(Money::from_paise(74120));
        let stored = repo.insert(legacy).await.unwrap();

        let loaded = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(loaded.totals.subtotal, Some(Money::from_paise(68000)));
        assert_eq!(loaded.totals.cgst_amount, Some(Money::from_paise(6120)));
        assert_eq!(loaded.totals.sgst_amount, None);
        assert_eq!(loaded.totals.grand_total, Some(Money::from_paise(74120)));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_reads_during_updates_see_one_version() {
        let dir = tempfile::tempdir().unwrap();
        let db = Database::new(DbConfig::new(dir.path().join("reads.db")).max_connections(8))
            .await
            .unwrap();
        let repo = db.quotations();

        let stored = repo
            .insert(new_quotation("CE0001-21-22", vec![chair(1)]))
            .await
            .unwrap();

        let writer = {
            let repo = repo.clone();
            let id = stored.id.clone();
            tokio::spawn(async move {
                for quantity in 2..=200 {
                    let items = vec![chair(quantity), chair(1)];
                    let totals = compute_totals(&items, GstRates::standard()).unwrap();
                    repo.update(
                        &id,
                        QuotationChanges {
                            date: NaiveDate::from_ymd_opt(2021, 5, 3).unwrap(),
                            bill_to: BillTo::default(),
                            items,
                            totals,
                        },
                    )
                    .await
                    .unwrap();
                }
            })
        };

        let mut reads = 0;
        loop {
            let done = writer.is_finished();
            let loaded = repo.find_by_id(&stored.id).await.unwrap().unwrap();
            let expected = compute_totals(&loaded.items, loaded.rates).unwrap();
            assert_eq!(loaded.totals.complete(), Some(expected));

            for q in repo.find_all().await.unwrap() {
                assert!(!q.items.is_empty());
                let expected = compute_totals(&q.items, q.rates).unwrap();
                assert_eq!(q.totals.complete(), Some(expected));
            }
            reads += 1;
            if done {
                break;
            }
        }
        writer.await.unwrap();

        let last = repo.find_by_id(&stored.id).await.unwrap().unwrap();
        assert_eq!(last.items[0].quantity, 200);
        assert!(reads > 0);
    }

    #[tokio::test]
    async fn test_delete_cascades_items() {
        let db = test_db().await;
        let repo = db.quotations();

        let stored = repo
            .insert(new_quotation("CE0001-21-22", vec![chair(1), chair(2)]))
            .await
            .unwrap();

        assert!(repo.delete(&stored.id).await.unwrap());
        assert!(!repo.delete(&stored.id).await.unwrap());
        assert_eq!(repo.count().await.unwrap(), 0);

        let orphans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM quotation_items")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(orphans, 0);
    }
}
