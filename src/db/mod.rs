//! This module is responsible for reading, writing and managing the SQLite database of expenses.
//!
//! Every operation is a single statement; nothing spans a transaction except schema migrations.
//! Nothing is cached between calls, every read goes to the store.

mod migrations;

use crate::error::Res;
use crate::model::{Amount, Expense, GroupBy, NewExpense};
use crate::month::MonthWindow;
use anyhow::{bail, Context};
use serde::{Deserialize, Serialize};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, trace};

/// A handle to the SQLite database. Cloning is cheap, clones share the same connection pool.
#[derive(Debug, Clone)]
pub(crate) struct Db {
    pool: SqlitePool,
}

/// The summed amount for one observed value of a grouped column.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct GroupTotal {
    pub value: String,
    pub total: Amount,
}

#[derive(sqlx::FromRow)]
struct ExpenseRow {
    id: i64,
    date: String,
    category: String,
    payment_method: String,
    amount: String,
    user: String,
}

impl TryFrom<ExpenseRow> for Expense {
    type Error = anyhow::Error;

    fn try_from(row: ExpenseRow) -> Res<Self> {
        let amount = Amount::from_str(&row.amount)
            .with_context(|| format!("Expense {} has an unreadable amount", row.id))?;
        Ok(Expense {
            id: row.id,
            date: row.date,
            category: row.category,
            payment_method: row.payment_method,
            amount,
            user: row.user,
        })
    }
}

impl Db {
    /// - Validates that no file currently exists at `path`
    /// - Creates a new SQLite file at `path`
    /// - Initializes the database schema
    pub(crate) async fn init(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if path.exists() {
            bail!("A database already exists at '{}'", path.display());
        }
        Self::open(path, true).await
    }

    /// - Validates that there is a SQLite file at `path`
    /// - Updates the database schema with migrations if it is out-of-date
    pub(crate) async fn load(path: impl AsRef<Path>) -> Res<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            bail!("The database file is missing '{}'", path.display());
        }
        Self::open(path, false).await
    }

    async fn open(path: &Path, create: bool) -> Res<Self> {
        let options = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.display()))
            .context("Unable to parse the SQLite connection string")?
            .create_if_missing(create);

        let pool = SqlitePoolOptions::new()
            .connect_with(options)
            .await
            .with_context(|| format!("Unable to open the SQLite database '{}'", path.display()))?;

        let version = migrations::current_version(&pool).await?;
        migrations::run(&pool, version, migrations::CURRENT_VERSION).await?;
        debug!("Opened database '{}'", path.display());
        Ok(Self { pool })
    }

    #[cfg(test)]
    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// All expenses dated within `window`, most recently inserted first.
    pub(crate) async fn list_all(&self, window: &MonthWindow) -> Res<Vec<Expense>> {
        trace!("list_all {window}");
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, date, category, payment_method, amount, user FROM expenses \
             WHERE date >= ? AND date <= ? ORDER BY id DESC",
        )
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .context("Unable to list expenses")?;
        rows.into_iter().map(Expense::try_from).collect()
    }

    /// Expenses of `user` (exact match on the stored label) dated within `window`, most recently
    /// inserted first.
    pub(crate) async fn list_by_user(&self, user: &str, window: &MonthWindow) -> Res<Vec<Expense>> {
        trace!("list_by_user {user} {window}");
        let rows: Vec<ExpenseRow> = sqlx::query_as(
            "SELECT id, date, category, payment_method, amount, user FROM expenses \
             WHERE user = ? AND date >= ? AND date <= ? ORDER BY id DESC",
        )
        .bind(user)
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to list expenses for '{user}'"))?;
        rows.into_iter().map(Expense::try_from).collect()
    }

    /// Persists `expense` and returns the id assigned to it.
    pub(crate) async fn insert(&self, expense: &NewExpense) -> Res<i64> {
        let result = sqlx::query(
            "INSERT INTO expenses (date, category, payment_method, amount, user) \
             VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&expense.date)
        .bind(&expense.category)
        .bind(&expense.payment_method)
        .bind(expense.amount.to_string())
        .bind(&expense.user)
        .execute(&self.pool)
        .await
        .context("Unable to insert expense")?;
        let id = result.last_insert_rowid();
        debug!("Inserted expense {id}");
        Ok(id)
    }

    /// The total spent by `user` within `window`. Zero when nothing matches, an `AmountOverflow`
    /// error when the total does not fit.
    pub(crate) async fn sum_by_user(&self, user: &str, window: &MonthWindow) -> Res<Amount> {
        let amounts: Vec<(String,)> = sqlx::query_as(
            "SELECT amount FROM expenses WHERE user = ? AND date >= ? AND date <= ?",
        )
        .bind(user)
        .bind(window.start())
        .bind(window.end())
        .fetch_all(&self.pool)
        .await
        .with_context(|| format!("Unable to total expenses for '{user}'"))?;

        let mut total = Amount::ZERO;
        for (amount,) in &amounts {
            let amount =
                Amount::from_str(amount).context("Unreadable amount in the expenses table")?;
            total = total
                .try_add(amount)
                .with_context(|| format!("Unable to total expenses for '{user}'"))?;
        }
        Ok(total)
    }

    /// One total per distinct value of the `group` column observed within `window`, sorted by
    /// value. Values with no expenses in the window do not appear.
    pub(crate) async fn sum_grouped_by(
        &self,
        group: GroupBy,
        window: &MonthWindow,
    ) -> Res<Vec<GroupTotal>> {
        // The column name comes from a closed enum, never from the caller.
        let sql = format!(
            "SELECT {col}, amount FROM expenses WHERE date >= ? AND date <= ?",
            col = group.column()
        );
        let rows: Vec<(String, String)> = sqlx::query_as(&sql)
            .bind(window.start())
            .bind(window.end())
            .fetch_all(&self.pool)
            .await
            .with_context(|| format!("Unable to total expenses by {group}"))?;

        let mut totals: BTreeMap<String, Amount> = BTreeMap::new();
        for (value, amount) in rows {
            let amount =
                Amount::from_str(&amount).context("Unreadable amount in the expenses table")?;
            let total = totals.entry(value).or_default();
            *total = total
                .try_add(amount)
                .with_context(|| format!("Unable to total expenses by {group}"))?;
        }
        Ok(totals
            .into_iter()
            .map(|(value, total)| GroupTotal { value, total })
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AmountOverflow, User};
    use tempfile::TempDir;

    fn march() -> MonthWindow {
        MonthWindow::from_str("2024-03").unwrap()
    }

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    async fn new_db() -> (TempDir, Db) {
        let t = TempDir::new().unwrap();
        let db = Db::init(t.path().join("book.sqlite")).await.unwrap();
        (t, db)
    }

    async fn seed(db: &Db) -> Vec<i64> {
        let rows = [
            NewExpense::new("2024-02-29", "衣服", "花呗", amt("10"), "畅"),
            NewExpense::new("2024-03-01", "衣服", "花呗", amt("100"), "畅"),
            NewExpense::new("2024-03-05", "电子产品", "白条", amt("199.5"), "畅"),
            NewExpense::new("2024-03-09", "衣服", "浦发银行信用卡", amt("20.25"), "杰"),
            NewExpense::new("2024-03-31", "家具", "花呗", amt("300"), "杰"),
            NewExpense::new("2024-04-01", "家具", "花呗", amt("999"), "杰"),
        ];
        let mut ids = Vec::new();
        for row in &rows {
            ids.push(db.insert(row).await.unwrap());
        }
        ids
    }

    #[tokio::test]
    async fn test_init_refuses_existing_file() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("book.sqlite");
        Db::init(&path).await.unwrap();
        assert!(Db::init(&path).await.is_err());
    }

    #[tokio::test]
    async fn test_load_requires_existing_file() {
        let t = TempDir::new().unwrap();
        let path = t.path().join("book.sqlite");
        assert!(Db::load(&path).await.is_err());
        Db::init(&path).await.unwrap();
        Db::load(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_ids_increase() {
        let (_t, db) = new_db().await;
        let ids = seed(&db).await;
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[tokio::test]
    async fn test_list_all_filters_by_month_and_orders_by_id_desc() {
        let (_t, db) = new_db().await;
        let ids = seed(&db).await;
        let listed = db.list_all(&march()).await.unwrap();
        let listed_ids: Vec<i64> = listed.iter().map(|e| e.id).collect();
        assert_eq!(listed_ids, vec![ids[4], ids[3], ids[2], ids[1]]);
    }

    #[tokio::test]
    async fn test_list_by_user() {
        let (_t, db) = new_db().await;
        seed(&db).await;
        let listed = db.list_by_user(User::Jie.label(), &march()).await.unwrap();
        assert_eq!(listed.len(), 2);
        assert!(listed.iter().all(|e| e.user == "杰"));
        assert_eq!(listed[0].date, "2024-03-31");
        assert_eq!(listed[1].amount, amt("20.25"));
    }

    #[tokio::test]
    async fn test_insert_then_list_round_trip() {
        let (_t, db) = new_db().await;
        let before = db.list_by_user("畅", &march()).await.unwrap();
        assert!(before.is_empty());
        seed(&db).await;
        let newest_before = db.list_by_user("畅", &march()).await.unwrap()[0].id;

        let expense = NewExpense::new("2024-03-05", "电子产品", "花呗", amt("199.5"), "畅");
        let id = db.insert(&expense).await.unwrap();
        let listed = db.list_by_user("畅", &march()).await.unwrap();
        assert_eq!(listed[0], expense.with_id(id));
        assert!(id > newest_before);
    }

    #[tokio::test]
    async fn test_insert_accepts_unknown_labels() {
        let (_t, db) = new_db().await;
        let expense = NewExpense::new("2024-03-02", "宠物", "现金", amt("-5"), "someone");
        db.insert(&expense).await.unwrap();
        let listed = db.list_by_user("someone", &march()).await.unwrap();
        assert_eq!(listed.len(), 1);
        assert_eq!(listed[0].category, "宠物");
        assert_eq!(listed[0].amount, amt("-5"));
    }

    #[tokio::test]
    async fn test_sum_by_user() {
        let (_t, db) = new_db().await;
        seed(&db).await;
        assert_eq!(
            db.sum_by_user("畅", &march()).await.unwrap(),
            amt("299.5")
        );
        assert_eq!(
            db.sum_by_user("杰", &march()).await.unwrap(),
            amt("320.25")
        );
    }

    #[tokio::test]
    async fn test_sum_by_user_with_no_rows_is_zero() {
        let (_t, db) = new_db().await;
        let total = db.sum_by_user("畅", &march()).await.unwrap();
        assert!(total.is_zero());
        assert_eq!(serde_json::to_string(&total).unwrap(), "0");
    }

    #[tokio::test]
    async fn test_sum_grouped_by_category() {
        let (_t, db) = new_db().await;
        seed(&db).await;
        let totals = db.sum_grouped_by(GroupBy::Category, &march()).await.unwrap();
        // Sorted by the UTF-8 bytes of the value.
        let expected = vec![
            GroupTotal {
                value: "家具".into(),
                total: amt("300"),
            },
            GroupTotal {
                value: "电子产品".into(),
                total: amt("199.5"),
            },
            GroupTotal {
                value: "衣服".into(),
                total: amt("120.25"),
            },
        ];
        assert_eq!(totals, expected);
    }

    #[tokio::test]
    async fn test_sum_grouped_by_counts_each_record_once() {
        let (_t, db) = new_db().await;
        seed(&db).await;
        let window = march();
        let all = Amount::try_sum(db.list_all(&window).await.unwrap().iter().map(|e| e.amount))
            .unwrap();
        for group in [GroupBy::Category, GroupBy::PaymentMethod] {
            let totals = db.sum_grouped_by(group, &window).await.unwrap();
            let grouped = Amount::try_sum(totals.iter().map(|g| g.total)).unwrap();
            assert_eq!(grouped, all, "for {group}");
        }
    }

    #[tokio::test]
    async fn test_sum_grouped_by_payment_method_only_observed_values() {
        let (_t, db) = new_db().await;
        seed(&db).await;
        let totals = db
            .sum_grouped_by(GroupBy::PaymentMethod, &march())
            .await
            .unwrap();
        let values: Vec<&str> = totals.iter().map(|g| g.value.as_str()).collect();
        assert_eq!(values.len(), 3);
        assert!(!values.contains(&"其他"));
        let huabei = totals.iter().find(|g| g.value == "花呗").unwrap();
        assert_eq!(huabei.total, amt("400"));
    }

    #[tokio::test]
    async fn test_sums_that_overflow_are_errors() {
        let (_t, db) = new_db().await;
        let big = amt("70000000000000000000000000000");
        for _ in 0..2 {
            let expense = NewExpense::new("2024-03-05", "家具", "花呗", big, "畅");
            db.insert(&expense).await.unwrap();
        }

        let err = db.sum_by_user("畅", &march()).await.unwrap_err();
        assert!(err.chain().any(|c| c.is::<AmountOverflow>()));
        for group in [GroupBy::Category, GroupBy::PaymentMethod] {
            let err = db.sum_grouped_by(group, &march()).await.unwrap_err();
            assert!(err.chain().any(|c| c.is::<AmountOverflow>()));
        }

        // The records themselves are still readable.
        assert_eq!(db.list_by_user("畅", &march()).await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_extreme_amounts_round_trip() {
        let (_t, db) = new_db().await;
        let min = amt("-79228162514264337593543950335");
        let expense = NewExpense::new("2024-03-05", "其他", "其他", min, "杰");
        db.insert(&expense).await.unwrap();
        assert_eq!(db.sum_by_user("杰", &march()).await.unwrap(), min);
    }
}
