//! Types that represent the core data model, such as `Expense` and `Amount`.
mod amount;
mod expense;
mod labels;

pub use amount::{Amount, AmountError, AmountOverflow};
pub use expense::{Expense, NewExpense};
pub use labels::{GroupBy, User, CATEGORIES, PAYMENT_METHODS};
