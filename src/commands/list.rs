use crate::args::ListArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::Expense;
use crate::month::MonthWindow;
use crate::{Config, Result};

/// Lists the expenses of a month, newest id first, optionally for a single user.
///
/// The month defaults to the current local month.
pub async fn list(config: Config, args: ListArgs) -> Result<Out<Vec<Expense>>> {
    let window = args.month.unwrap_or_else(MonthWindow::current);
    let db = config.db();
    let expenses = match args.user {
        Some(user) => db.list_by_user(user.label(), &window).await,
        None => db.list_all(&window).await,
    }
    .pub_result(ErrorType::StoreUnavailable)?;

    let header = format!("{} expense(s) in {window}", expenses.len());
    let message = std::iter::once(header)
        .chain(expenses.iter().map(|e| {
            format!(
                "{:>5}  {}  {}  {}  {}  {}",
                e.id,
                e.date,
                e.user,
                e.category,
                e.payment_method,
                e.amount.pretty()
            )
        }))
        .collect::<Vec<_>>()
        .join("\n");
    Ok(Out::new(message, expenses))
}
