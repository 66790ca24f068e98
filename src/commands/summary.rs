use crate::args::SummaryArgs;
use crate::commands::Out;
use crate::error::{ErrorType, IntoResult};
use crate::model::User;
use crate::month::MonthWindow;
use crate::summary::{self as table, SummaryRow};
use crate::{Config, Result};

/// Prints the summary table for a month: each user's total and remaining allowance, then one row
/// per category or payment method.
pub async fn summary(config: Config, args: SummaryArgs) -> Result<Out<Vec<SummaryRow>>> {
    let window = args.month.unwrap_or_else(MonthWindow::current);
    let db = config.db();
    let chang = db
        .list_by_user(User::Chang.label(), &window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;
    let jie = db
        .list_by_user(User::Jie.label(), &window)
        .await
        .pub_result(ErrorType::StoreUnavailable)?;

    let rows = table::summarize(&chang, &jie, args.group)?;
    let message = format!("Summary for {window}\n\n{}", table::render(&rows));
    Ok(Out::new(message, rows))
}
