use crate::model::Amount;
use serde::{Deserialize, Serialize};

/// A persisted expense record. Records are immutable once inserted.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Expense {
    /// Assigned by the store at insert time, increasing with every insert.
    pub id: i64,
    /// `YYYY-MM-DD`, as supplied by the user.
    pub date: String,
    pub category: String,
    pub payment_method: String,
    pub amount: Amount,
    /// The user label, e.g. `畅`.
    pub user: String,
}

/// The body of an insert request. Nothing here is checked against the fixed label sets.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewExpense {
    pub date: String,
    pub category: String,
    pub payment_method: String,
    pub amount: Amount,
    pub user: String,
}

impl NewExpense {
    pub fn new(
        date: impl Into<String>,
        category: impl Into<String>,
        payment_method: impl Into<String>,
        amount: impl Into<Amount>,
        user: impl Into<String>,
    ) -> Self {
        Self {
            date: date.into(),
            category: category.into(),
            payment_method: payment_method.into(),
            amount: amount.into(),
            user: user.into(),
        }
    }

    /// The record as it reads back from the store once it has been assigned `id`.
    pub fn with_id(self, id: i64) -> Expense {
        Expense {
            id,
            date: self.date,
            category: self.category,
            payment_method: self.payment_method,
            amount: self.amount,
            user: self.user,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_new_expense_from_json() {
        let json = r#"{
            "date": "2024-03-05",
            "category": "电子产品",
            "paymentMethod": "花呗",
            "amount": 199.5,
            "user": "畅"
        }"#;
        let expense: NewExpense = serde_json::from_str(json).unwrap();
        assert_eq!(expense.payment_method, "花呗");
        assert_eq!(expense.amount, Amount::from_str("199.5").unwrap());
    }

    #[test]
    fn test_new_expense_missing_field() {
        let json = r#"{"date": "2024-03-05", "category": "其他", "amount": 1, "user": "杰"}"#;
        let err = serde_json::from_str::<NewExpense>(json).unwrap_err();
        assert!(err.to_string().contains("paymentMethod"));
    }

    #[test]
    fn test_expense_to_json() {
        let expense = NewExpense::new("2024-03-05", "家具", "白条", 300i64, "杰").with_id(9);
        let value = serde_json::to_value(&expense).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "id": 9,
                "date": "2024-03-05",
                "category": "家具",
                "paymentMethod": "白条",
                "amount": 300,
                "user": "杰"
            })
        );
    }
}
