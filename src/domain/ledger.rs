//! Ledger domain types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a balance-affecting event. Deposits and credits carry positive
/// amounts, debits negative; `balance_after` on the entry must equal the
/// account balance right after the entry applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerKind {
    Deposit,
    Debit,
    Credit,
}

impl LedgerKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            LedgerKind::Deposit => "deposit",
            LedgerKind::Debit => "debit",
            LedgerKind::Credit => "credit",
        }
    }
}

impl fmt::Display for LedgerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LedgerKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "deposit" => Ok(LedgerKind::Deposit),
            "debit" => Ok(LedgerKind::Debit),
            "credit" => Ok(LedgerKind::Credit),
            other => Err(format!("unknown ledger kind '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_round_trip() {
        for kind in [LedgerKind::Deposit, LedgerKind::Debit, LedgerKind::Credit] {
            assert_eq!(kind.as_str().parse::<LedgerKind>().unwrap(), kind);
        }
    }
}
