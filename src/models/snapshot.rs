use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{ApprovalStatus, BatchStatus, IssueType, SnapshotPeriod, Stage, UserRole};

/// `numerator / denominator` as a percentage; 0 when the denominator is 0.
pub fn percentage(numerator: u64, denominator: u64) -> f64 {
    if denominator == 0 {
        0.0
    } else {
        numerator as f64 / denominator as f64 * 100.0
    }
}

/// Mean of `values`, or `None` when empty.
pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum::<f64>() / values.len() as f64)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StageCount {
    pub stage: Stage,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusCount {
    pub status: BatchStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalCount {
    pub status: ApprovalStatus,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleCount {
    pub role: UserRole,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IssueTypeCount {
    pub issue_type: IssueType,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegionCount {
    pub country: String,
    pub state: Option<String>,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct FarmRollup {
    pub total: u64,
    pub active: u64,
    pub by_approval_status: Vec<ApprovalCount>,
    pub new_registrations: u64,
    pub with_valid_organic_certification: u64,
    pub by_region: Vec<RegionCount>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct BatchRollup {
    pub total: u64,
    pub by_stage: Vec<StageCount>,
    pub by_status: Vec<StatusCount>,
    pub new_batches: u64,
    pub completed_in_period: u64,
    pub with_active_quality_issues: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmBreakdown {
    pub farm_id: Uuid,
    pub farm_name: String,
    pub batch_count: u64,
    pub completed_batches: u64,
    pub wool_produced_kg: f64,
    pub estimated_revenue: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductionRollup {
    pub total_wool_kg: f64,
    pub wool_kg_in_period: f64,
    pub average_batch_weight_kg: Option<f64>,
    pub by_farm: Vec<FarmBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct QualityRollup {
    pub checks_passed: u64,
    pub checks_failed: u64,
    pub average_check_score: Option<f64>,
    pub average_fiber_diameter: Option<f64>,
    pub average_clean_yield: Option<f64>,
    pub issues_reported: u64,
    pub issues_resolved: u64,
    pub issues_by_type: Vec<IssueTypeCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessorBreakdown {
    pub processor_id: Uuid,
    pub processor_name: String,
    pub company: Option<String>,
    pub batches_handled: u64,
    pub updates_recorded: u64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ProcessingRollup {
    /// Mean whole-day processing duration of batches completed in the period.
    pub average_processing_days: Option<f64>,
    pub on_time: u64,
    pub delayed: u64,
    pub by_processor: Vec<ProcessorBreakdown>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UserRollup {
    pub total: u64,
    pub active: u64,
    pub by_role: Vec<RoleCount>,
    pub new_registrations: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyTotal {
    pub currency: String,
    pub amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct RevenueRollup {
    pub estimated_total: Vec<CurrencyTotal>,
    pub estimated_in_period: Vec<CurrencyTotal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ActivityRollup {
    pub updates_recorded: u64,
    pub documents_attached: u64,
    pub stage_advances: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StageDuration {
    pub stage: Stage,
    pub average_days: f64,
    pub samples: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bottleneck {
    pub stage: Stage,
    pub waiting_batches: u64,
    pub average_days_waiting: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EfficiencyRollup {
    pub average_stage_completion: Vec<StageDuration>,
    /// Stage with the highest average completion time.
    pub slowest_stage: Option<Stage>,
    pub bottlenecks: Vec<Bottleneck>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct SustainabilityRollup {
    pub organic_batches: u64,
    pub certified_batches: u64,
    pub energy_consumed_kwh: f64,
    pub water_used_liters: f64,
}

/// Percentages in 0..=100.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rates {
    pub completion_rate: f64,
    pub quality_pass_rate: f64,
    pub on_time_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct SnapshotMetrics {
    pub period: SnapshotPeriod,
    pub as_of: DateTime<Utc>,
    pub window_start: DateTime<Utc>,
    pub farms: FarmRollup,
    pub batches: BatchRollup,
    pub production: ProductionRollup,
    pub quality: QualityRollup,
    pub processing: ProcessingRollup,
    pub users: UserRollup,
    pub revenue: RevenueRollup,
    pub activity: ActivityRollup,
    pub efficiency: EfficiencyRollup,
    pub sustainability: SustainabilityRollup,
    pub rates: Rates,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn percentage_is_zero_without_denominator() {
        assert_eq!(percentage(0, 0), 0.0);
        assert_eq!(percentage(5, 0), 0.0);
        assert_eq!(percentage(1, 4), 25.0);
    }

    #[test]
    fn mean_of_nothing_is_none() {
        assert_eq!(mean(&[]), None);
        assert_eq!(mean(&[2.0, 4.0]), Some(3.0));
    }
}
