use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Processing stage of a wool batch.
///
/// Variants are declared in canonical order; the derived `Ord` follows that
/// order and `Completed` is the only terminal stage.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    EnumIter,
    DeriveActiveEnum,
    Serialize,
    Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum Stage {
    #[sea_orm(string_value = "Shearing")]
    Shearing,
    #[sea_orm(string_value = "Cleaning")]
    Cleaning,
    #[sea_orm(string_value = "Sorting")]
    Sorting,
    #[sea_orm(string_value = "Carding")]
    Carding,
    #[sea_orm(string_value = "Spinning")]
    Spinning,
    #[sea_orm(string_value = "Weaving")]
    Weaving,
    #[sea_orm(string_value = "Dyeing")]
    Dyeing,
    #[sea_orm(string_value = "Finishing")]
    Finishing,
    #[sea_orm(string_value = "Distribution")]
    Distribution,
    #[sea_orm(string_value = "Completed")]
    Completed,
}

impl Stage {
    pub const ALL: [Stage; 10] = [
        Stage::Shearing,
        Stage::Cleaning,
        Stage::Sorting,
        Stage::Carding,
        Stage::Spinning,
        Stage::Weaving,
        Stage::Dyeing,
        Stage::Finishing,
        Stage::Distribution,
        Stage::Completed,
    ];

    /// Zero-based position in the canonical sequence.
    pub fn position(self) -> usize {
        self as usize
    }

    pub fn next(self) -> Option<Stage> {
        Self::ALL.get(self.position() + 1).copied()
    }

    pub fn previous(self) -> Option<Stage> {
        self.position()
            .checked_sub(1)
            .and_then(|idx| Self::ALL.get(idx).copied())
    }

    pub fn is_terminal(self) -> bool {
        self == Stage::Completed
    }

    /// Share of the journey covered once this stage is reached, 10..=100.
    pub fn progress_percentage(self) -> u8 {
        let reached = (self.position() + 1) as f64;
        ((reached / Self::ALL.len() as f64) * 100.0).round() as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Stage::Shearing => "Shearing",
            Stage::Cleaning => "Cleaning",
            Stage::Sorting => "Sorting",
            Stage::Carding => "Carding",
            Stage::Spinning => "Spinning",
            Stage::Weaving => "Weaving",
            Stage::Dyeing => "Dyeing",
            Stage::Finishing => "Finishing",
            Stage::Distribution => "Distribution",
            Stage::Completed => "Completed",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Operational status of a batch, orthogonal to its stage.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(32))")]
pub enum BatchStatus {
    #[sea_orm(string_value = "In Progress")]
    #[serde(rename = "In Progress")]
    InProgress,
    #[sea_orm(string_value = "On Hold")]
    #[serde(rename = "On Hold")]
    OnHold,
    #[sea_orm(string_value = "Quality Issue")]
    #[serde(rename = "Quality Issue")]
    QualityIssue,
    #[sea_orm(string_value = "Delayed")]
    Delayed,
    #[sea_orm(string_value = "Completed")]
    Completed,
    #[sea_orm(string_value = "Cancelled")]
    Cancelled,
}

impl BatchStatus {
    pub const ALL: [BatchStatus; 6] = [
        BatchStatus::InProgress,
        BatchStatus::OnHold,
        BatchStatus::QualityIssue,
        BatchStatus::Delayed,
        BatchStatus::Completed,
        BatchStatus::Cancelled,
    ];

    /// Statuses that may accompany an event attributed to an earlier stage.
    pub fn permits_regression(self) -> bool {
        matches!(self, BatchStatus::QualityIssue | BatchStatus::OnHold)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            BatchStatus::InProgress => "In Progress",
            BatchStatus::OnHold => "On Hold",
            BatchStatus::QualityIssue => "Quality Issue",
            BatchStatus::Delayed => "Delayed",
            BatchStatus::Completed => "Completed",
            BatchStatus::Cancelled => "Cancelled",
        }
    }
}

impl fmt::Display for BatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
