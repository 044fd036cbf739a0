//! Credit types awarded on application approval

use serde::{Deserialize, Serialize};

/// Kind of credit a student can accumulate
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "credit_type", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum CreditType {
    Suketuo,
    Lecture,
    Labor,
}

impl CreditType {
    /// All credit types, in reporting order
    pub const ALL: [CreditType; 3] = [CreditType::Suketuo, CreditType::Lecture, CreditType::Labor];

    /// Balance column on `users` that this credit type accumulates into
    pub fn balance_column(self) -> &'static str {
        match self {
            CreditType::Suketuo => "suketuo_credits",
            CreditType::Lecture => "lecture_credits",
            CreditType::Labor => "labor_credits",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            CreditType::Suketuo => "suketuo",
            CreditType::Lecture => "lecture",
            CreditType::Labor => "labor",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn balance_column_is_distinct_per_type() {
        let columns: Vec<_> = CreditType::ALL.iter().map(|t| t.balance_column()).collect();
        assert_eq!(columns.len(), 3);
        assert!(columns.iter().all(|c| c.ends_with("_credits")));
        assert_eq!(
            columns.iter().collect::<std::collections::HashSet<_>>().len(),
            3
        );
    }
}
