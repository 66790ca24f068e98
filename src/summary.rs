//! The summary table: each user's total for the month against their allowance, followed by a
//! breakdown per category or per payment method.
//!
//! Everything here is a pure function of the two users' expense lists.

use crate::model::{Amount, AmountOverflow, Expense, GroupBy, User};
use prettytable::format::FormatBuilder;
use prettytable::{Cell, Row, Table};
use serde::{Deserialize, Serialize};

/// The label of the first row of the table.
pub const TOTAL_LABEL: &str = "总花销";

/// The fixed monthly spending allowance of `user`.
pub fn allowance(user: User) -> Amount {
    match user {
        User::Chang => Amount::from(1500i64),
        User::Jie => Amount::from(1000i64),
    }
}

/// One row of the summary table.
///
/// Only the total row carries remainders; detail rows leave them empty.
#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SummaryRow {
    /// `total`, `category-<label>` or `payment-<label>`.
    pub key: String,
    pub label: String,
    pub chang: Amount,
    pub jie: Amount,
    pub remaining_chang: Option<Amount>,
    pub remaining_jie: Option<Amount>,
}

impl SummaryRow {
    pub fn is_total(&self) -> bool {
        self.remaining_chang.is_some()
    }
}

/// Builds the summary table from each user's expenses for the month.
///
/// The total row comes first and counts every expense. Detail rows follow in the fixed order of
/// `group.labels()`, including labels nobody spent on. An expense whose category or payment
/// method is not one of the fixed labels is counted in the total row only.
///
/// Fails only when a total or remainder does not fit in an `Amount`.
pub fn summarize(
    chang: &[Expense],
    jie: &[Expense],
    group: GroupBy,
) -> Result<Vec<SummaryRow>, AmountOverflow> {
    let chang_total = Amount::try_sum(chang.iter().map(|e| e.amount))?;
    let jie_total = Amount::try_sum(jie.iter().map(|e| e.amount))?;

    let mut rows = Vec::with_capacity(group.labels().len() + 1);
    rows.push(SummaryRow {
        key: "total".to_string(),
        label: TOTAL_LABEL.to_string(),
        chang: chang_total,
        jie: jie_total,
        remaining_chang: Some(allowance(User::Chang).try_sub(chang_total)?),
        remaining_jie: Some(allowance(User::Jie).try_sub(jie_total)?),
    });

    for &label in group.labels() {
        rows.push(SummaryRow {
            key: format!("{}-{label}", group.key_prefix()),
            label: label.to_string(),
            chang: subtotal(chang, group, label)?,
            jie: subtotal(jie, group, label)?,
            remaining_chang: None,
            remaining_jie: None,
        });
    }
    Ok(rows)
}

fn subtotal(expenses: &[Expense], group: GroupBy, label: &str) -> Result<Amount, AmountOverflow> {
    Amount::try_sum(
        expenses
            .iter()
            .filter(|e| group_value(e, group) == label)
            .map(|e| e.amount),
    )
}

fn group_value(expense: &Expense, group: GroupBy) -> &str {
    match group {
        GroupBy::Category => &expense.category,
        GroupBy::PaymentMethod => &expense.payment_method,
    }
}

/// Renders the table as aligned text for the terminal. Columns are padded by display width, so
/// the Chinese labels line up.
pub fn render(rows: &[SummaryRow]) -> String {
    let mut table = Table::new();
    table.set_format(FormatBuilder::new().column_separator(' ').padding(0, 1).build());
    table.set_titles(Row::new(vec![
        Cell::new("分类"),
        Cell::new(&format!("{}总花销", User::Chang.label())),
        Cell::new(&format!("{}剩余额度", User::Chang.label())),
        Cell::new(&format!("{}总花销", User::Jie.label())),
        Cell::new(&format!("{}剩余额度", User::Jie.label())),
    ]));
    for row in rows {
        table.add_row(Row::new(vec![
            Cell::new(&row.label),
            number(Some(row.chang)),
            number(row.remaining_chang),
            number(Some(row.jie)),
            number(row.remaining_jie),
        ]));
    }
    table.to_string()
}

fn number(amount: Option<Amount>) -> Cell {
    let text = amount.map(|a| a.pretty()).unwrap_or_else(|| "-".to_string());
    Cell::new(&text).style_spec("r")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NewExpense;
    use std::str::FromStr;

    fn amt(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    fn expense(id: i64, category: &str, method: &str, amount: &str, user: User) -> Expense {
        NewExpense::new("2024-03-05", category, method, amt(amount), user.label()).with_id(id)
    }

    fn fixture() -> (Vec<Expense>, Vec<Expense>) {
        let chang = vec![
            expense(1, "衣服", "花呗", "100", User::Chang),
            expense(2, "电子产品", "白条", "199.5", User::Chang),
            expense(3, "衣服", "花呗", "50.25", User::Chang),
        ];
        let jie = vec![
            expense(4, "家具", "浦发银行信用卡", "300", User::Jie),
            expense(5, "其他", "其他", "12", User::Jie),
        ];
        (chang, jie)
    }

    fn detail_sum(rows: &[SummaryRow], column: impl Fn(&SummaryRow) -> Amount) -> Amount {
        Amount::try_sum(rows[1..].iter().map(column)).unwrap()
    }

    #[test]
    fn test_total_row() {
        let (chang, jie) = fixture();
        let rows = summarize(&chang, &jie, GroupBy::Category).unwrap();
        let total = &rows[0];
        assert!(total.is_total());
        assert_eq!(total.key, "total");
        assert_eq!(total.label, TOTAL_LABEL);
        assert_eq!(total.chang, amt("349.75"));
        assert_eq!(total.jie, amt("312"));
        assert_eq!(total.remaining_chang, Some(amt("1150.25")));
        assert_eq!(total.remaining_jie, Some(amt("688")));
    }

    #[test]
    fn test_remaining_plus_total_is_allowance() {
        let (chang, jie) = fixture();
        for group in [GroupBy::Category, GroupBy::PaymentMethod] {
            let total = &summarize(&chang, &jie, group).unwrap()[0];
            let chang = total.remaining_chang.unwrap().try_add(total.chang).unwrap();
            let jie = total.remaining_jie.unwrap().try_add(total.jie).unwrap();
            assert_eq!(chang, allowance(User::Chang));
            assert_eq!(jie, allowance(User::Jie));
        }
    }

    #[test]
    fn test_over_allowance_goes_negative() {
        let jie = vec![
            expense(1, "家具", "花呗", "999.99", User::Jie),
            expense(2, "衣服", "花呗", "0.02", User::Jie),
        ];
        let total = &summarize(&[], &jie, GroupBy::Category).unwrap()[0];
        assert_eq!(total.remaining_jie, Some(amt("-0.01")));
        let allowance = total.remaining_jie.unwrap().try_add(total.jie).unwrap();
        assert_eq!(allowance, amt("1000"));
        assert_eq!(total.remaining_chang, Some(amt("1500")));
    }

    #[test]
    fn test_detail_rows_follow_fixed_order_and_include_zeroes() {
        let (chang, jie) = fixture();
        let rows = summarize(&chang, &jie, GroupBy::Category).unwrap();
        let keys: Vec<&str> = rows.iter().map(|r| r.key.as_str()).collect();
        assert_eq!(
            keys,
            vec![
                "total",
                "category-衣服",
                "category-化妆品",
                "category-电子产品",
                "category-家具",
                "category-其他",
            ]
        );
        let cosmetics = &rows[2];
        assert!(cosmetics.chang.is_zero());
        assert!(cosmetics.jie.is_zero());
        assert_eq!(cosmetics.remaining_chang, None);
        assert_eq!(cosmetics.remaining_jie, None);
        assert_eq!(rows[1].chang, amt("150.25"));
    }

    #[test]
    fn test_payment_method_rows() {
        let (chang, jie) = fixture();
        let rows = summarize(&chang, &jie, GroupBy::PaymentMethod).unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1].key, "payment-花呗");
        assert_eq!(rows[1].chang, amt("150.25"));
        assert_eq!(rows[2].chang, amt("199.5"));
        assert_eq!(rows[3].label, "浦发银行信用卡");
        assert_eq!(rows[3].jie, amt("300"));
        assert_eq!(rows[4].jie, amt("12"));
    }

    #[test]
    fn test_detail_rows_sum_to_total() {
        let (chang, jie) = fixture();
        for group in [GroupBy::Category, GroupBy::PaymentMethod] {
            let rows = summarize(&chang, &jie, group).unwrap();
            let chang_detail = detail_sum(&rows, |r| r.chang);
            let jie_detail = detail_sum(&rows, |r| r.jie);
            assert_eq!(chang_detail, rows[0].chang);
            assert_eq!(jie_detail, rows[0].jie);
        }
    }

    #[test]
    fn test_unknown_category_counts_in_total_only() {
        let (mut chang, jie) = fixture();
        chang.push(expense(6, "宠物", "花呗", "40", User::Chang));
        let rows = summarize(&chang, &jie, GroupBy::Category).unwrap();
        let chang_detail = detail_sum(&rows, |r| r.chang);
        assert_eq!(rows[0].chang, amt("389.75"));
        assert_eq!(chang_detail, amt("349.75"));
        assert!(rows.iter().all(|r| r.label != "宠物"));

        // The same expense is inside the enumeration when grouped by payment method.
        let rows = summarize(&chang, &jie, GroupBy::PaymentMethod).unwrap();
        let chang_detail = detail_sum(&rows, |r| r.chang);
        assert_eq!(chang_detail, rows[0].chang);
    }

    #[test]
    fn test_empty_month() {
        let rows = summarize(&[], &[], GroupBy::PaymentMethod).unwrap();
        assert_eq!(rows.len(), 1 + GroupBy::PaymentMethod.labels().len());
        assert!(rows.iter().all(|r| r.chang.is_zero() && r.jie.is_zero()));
        assert_eq!(rows[0].remaining_chang, Some(allowance(User::Chang)));
    }

    #[test]
    fn test_row_json_shape() {
        let rows = summarize(&[], &[], GroupBy::Category).unwrap();
        let total = serde_json::to_value(&rows[0]).unwrap();
        assert_eq!(total["remainingChang"], serde_json::json!(1500));
        let detail = serde_json::to_value(&rows[1]).unwrap();
        assert!(detail["remainingJie"].is_null());
        assert_eq!(detail["label"], "衣服");
    }

    #[test]
    fn test_render() {
        let (chang, jie) = fixture();
        let text = render(&summarize(&chang, &jie, GroupBy::Category).unwrap());
        let lines: Vec<&str> = text.lines().filter(|l| !l.is_empty()).collect();
        assert_eq!(lines.len(), 7);
        assert!(lines[0].starts_with("分类"));
        assert!(lines[1].starts_with(TOTAL_LABEL));
        assert!(lines[1].contains("1,150.25"));
        assert!(lines[2].contains('-'));
    }

    #[test]
    fn test_render_aligns_by_display_width() {
        // Every label and header here is ASCII or a double-width CJK character.
        fn width(line: &str) -> usize {
            line.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum()
        }
        let (chang, jie) = fixture();
        let text = render(&summarize(&chang, &jie, GroupBy::PaymentMethod).unwrap());
        let widths: Vec<usize> = text.lines().filter(|l| !l.is_empty()).map(width).collect();
        assert_eq!(widths.len(), 6);
        assert!(widths.iter().all(|w| *w == widths[0]), "{widths:?}\n{text}");
    }

    #[test]
    fn test_total_overflow_is_an_error() {
        let chang = vec![
            expense(1, "家具", "花呗", "70000000000000000000000000000", User::Chang),
            expense(2, "家具", "花呗", "70000000000000000000000000000", User::Chang),
        ];
        assert_eq!(
            summarize(&chang, &[], GroupBy::Category),
            Err(AmountOverflow)
        );
    }

    #[test]
    fn test_remaining_overflow_is_an_error() {
        let jie = vec![expense(1, "其他", "其他", "-79228162514264337593543950335", User::Jie)];
        assert_eq!(summarize(&[], &jie, GroupBy::Category), Err(AmountOverflow));
    }

    #[test]
    fn test_largest_amounts_within_range() {
        let jie = vec![expense(1, "其他", "其他", "-79228162514264337593543949335", User::Jie)];
        let rows = summarize(&[], &jie, GroupBy::Category).unwrap();
        assert_eq!(
            rows[0].remaining_jie,
            Some(amt("79228162514264337593543950335"))
        );
    }
}
