//! Insert command handler.

use crate::args::InsertArgs;
use crate::commands::Out;
use crate::error::{Error, ErrorType, IntoResult};
use crate::model::{NewExpense, User};
use crate::{Config, Result};
use chrono::NaiveDate;

/// Inserts a new expense into the local SQLite database and returns its id.
///
/// The user may be given by label (`畅`) or by alias (`chang`); aliases are stored as their label
/// so the record shows up in the per-user views. Any other user, category or payment method is
/// stored as given.
///
/// # Errors
///
/// - Returns `InvalidInput` if `date` is not a `YYYY-MM-DD` calendar date.
/// - Returns `StoreUnavailable` if the database write fails.
pub async fn insert(config: Config, args: InsertArgs) -> Result<Out<i64>> {
    if NaiveDate::parse_from_str(&args.date, "%Y-%m-%d").is_err() {
        return Err(Error::msg(
            ErrorType::InvalidInput,
            format!("'{}' is not a date of the form YYYY-MM-DD", args.date),
        ));
    }
    let user = match args.user.parse::<User>() {
        Ok(user) => user.label().to_string(),
        Err(_) => args.user,
    };

    let expense = NewExpense::new(
        args.date,
        args.category,
        args.payment_method,
        args.amount,
        user,
    );
    let id = config
        .db()
        .insert(&expense)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;

    Ok(Out::new(
        format!(
            "Inserted expense {id}: {} {} for {} on {}",
            expense.amount.pretty(),
            expense.category,
            expense.user,
            expense.date
        ),
        id,
    ))
}
