//! Shared domain enums

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

// ---------------------------------------------------------------------------
// LoanStatus
// ---------------------------------------------------------------------------

/// Lifecycle state of a loan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    Active,
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "active" => Ok(LoanStatus::Active),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

// ---------------------------------------------------------------------------
// LoanAction
// ---------------------------------------------------------------------------

/// Lifecycle event recorded in the loan history log
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum LoanAction {
    Created,
    Returned,
}

impl LoanAction {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanAction::Created => "created",
            LoanAction::Returned => "returned",
        }
    }
}

impl std::fmt::Display for LoanAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn loan_status_round_trips_through_strings() {
        assert_eq!(LoanStatus::from_str("active").unwrap(), LoanStatus::Active);
        assert_eq!(
            LoanStatus::from_str("Returned").unwrap(),
            LoanStatus::Returned
        );
        assert_eq!(LoanStatus::Active.to_string(), "active");
        assert!(LoanStatus::from_str("overdue").is_err());
    }
}
