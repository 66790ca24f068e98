//! The fixed label sets of the household: the two users, the expense categories and the payment
//! methods. The server does not enforce these on insert; they drive routing and the summary table.

use crate::error::{Error, ErrorType};
use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Expense categories in display order.
pub const CATEGORIES: [&str; 5] = ["衣服", "化妆品", "电子产品", "家具", "其他"];

/// Payment methods in display order.
pub const PAYMENT_METHODS: [&str; 4] = ["花呗", "白条", "浦发银行信用卡", "其他"];

/// One of the two members of the household.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Ord, PartialOrd, Hash)]
pub enum User {
    Chang,
    Jie,
}

impl User {
    pub const ALL: [User; 2] = [User::Chang, User::Jie];

    /// The value stored in the `user` column, e.g. `畅`.
    pub fn label(&self) -> &'static str {
        match self {
            User::Chang => "畅",
            User::Jie => "杰",
        }
    }

    /// The ASCII name used in URLs and on the command line, e.g. `chang`.
    pub fn alias(&self) -> &'static str {
        match self {
            User::Chang => "chang",
            User::Jie => "jie",
        }
    }
}

impl Display for User {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.alias())
    }
}

impl FromStr for User {
    type Err = Error;

    /// Accepts either the alias or the label.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        User::ALL
            .into_iter()
            .find(|u| u.alias() == s || u.label() == s)
            .ok_or_else(|| Error::msg(ErrorType::NotFound, format!("No user named '{s}'")))
    }
}

/// Which column the summary table is broken down by.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Default,
    Serialize,
    Deserialize,
    clap::ValueEnum,
)]
#[serde(rename_all = "camelCase")]
pub enum GroupBy {
    /// One row per expense category.
    #[default]
    Category,
    /// One row per payment method.
    PaymentMethod,
}

serde_plain::derive_display_from_serialize!(GroupBy);
serde_plain::derive_fromstr_from_deserialize!(GroupBy);

impl GroupBy {
    /// The fixed labels that make up the detail rows, in display order.
    pub fn labels(&self) -> &'static [&'static str] {
        match self {
            GroupBy::Category => &CATEGORIES,
            GroupBy::PaymentMethod => &PAYMENT_METHODS,
        }
    }

    /// The SQLite column holding the grouped value.
    pub(crate) fn column(&self) -> &'static str {
        match self {
            GroupBy::Category => "category",
            GroupBy::PaymentMethod => "payment_method",
        }
    }

    /// The prefix of summary row keys, e.g. `category-衣服`.
    pub(crate) fn key_prefix(&self) -> &'static str {
        match self {
            GroupBy::Category => "category",
            GroupBy::PaymentMethod => "payment",
        }
    }
}
