//! Snapshot fold over farms, users, batches and their event logs.
//!
//! [`compute_snapshot`] performs no I/O and never reads the clock, so the
//! same rows and `as_of` always produce the same [`SnapshotMetrics`].

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use uuid::Uuid;

use crate::entities::{batch, batch_update, farm, user};
use crate::models::snapshot::{
    mean, percentage, ActivityRollup, ApprovalCount, BatchRollup, Bottleneck, CurrencyTotal,
    EfficiencyRollup, FarmBreakdown, FarmRollup, IssueTypeCount, ProcessingRollup, ProcessorBreakdown,
    ProductionRollup, QualityRollup, Rates, RegionCount, RevenueRollup, RoleCount, SnapshotMetrics,
    StageCount, StageDuration, StatusCount, SustainabilityRollup, UserRollup,
};
use crate::models::{
    days_between, BatchProjection, BatchStatus, CertificationKind, EventFacts, IssueType, SnapshotPeriod,
    Stage, UserRole,
};

/// Rows the fold reads. Events may arrive in any order.
#[derive(Debug, Clone, Copy)]
pub struct RollupInput<'a> {
    pub farms: &'a [farm::Model],
    pub users: &'a [user::Model],
    pub batches: &'a [batch::Model],
    pub events: &'a [batch_update::Model],
}

struct Window {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl Window {
    fn contains(&self, at: DateTime<Utc>) -> bool {
        at >= self.start && at <= self.end
    }
}

/// A batch as it stood at `as_of`, with the events that got it there.
struct BatchAtCutoff<'a> {
    batch: &'a batch::Model,
    events: Vec<&'a batch_update::Model>,
    projection: BatchProjection,
}

impl BatchAtCutoff<'_> {
    fn registered_at(&self) -> DateTime<Utc> {
        self.events
            .first()
            .map_or(self.batch.shearing_date, |genesis| genesis.timestamp)
    }

    fn completed_at(&self) -> Option<DateTime<Utc>> {
        self.projection.actual_completion_date
    }
}

fn replay_to_cutoff<'a>(input: &RollupInput<'a>, as_of: DateTime<Utc>) -> Vec<BatchAtCutoff<'a>> {
    let mut by_batch: HashMap<Uuid, Vec<&'a batch_update::Model>> = HashMap::new();
    for event in input.events.iter().filter(|e| e.timestamp <= as_of) {
        by_batch.entry(event.batch_id).or_default().push(event);
    }

    let mut batches: Vec<&'a batch::Model> = input.batches.iter().collect();
    batches.sort_by(|a, b| a.batch_code.cmp(&b.batch_code).then(a.id.cmp(&b.id)));

    batches
        .into_iter()
        .filter_map(|batch| {
            let mut events = by_batch.remove(&batch.id)?;
            events.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then(a.sequence.cmp(&b.sequence)));
            let projection = BatchProjection::replay(
                batch.shearing_date,
                events.iter().map(|e| EventFacts::from(*e)),
            );
            Some(BatchAtCutoff {
                batch,
                events,
                projection,
            })
        })
        .collect()
}

pub fn compute_snapshot(input: &RollupInput<'_>, period: SnapshotPeriod, as_of: DateTime<Utc>) -> SnapshotMetrics {
    let window = Window {
        start: period.window_start(as_of),
        end: as_of,
    };
    let batches = replay_to_cutoff(input, as_of);

    let batch_rollup = batch_rollup(&batches, &window, as_of);
    let quality = quality_rollup(&batches, &window);
    let processing = processing_rollup(&batches, &window);

    let completed_now = batches
        .iter()
        .filter(|b| b.projection.is_completed())
        .count() as u64;
    let rates = Rates {
        completion_rate: percentage(completed_now, batch_rollup.total),
        quality_pass_rate: percentage(quality.checks_passed, quality.checks_passed + quality.checks_failed),
        on_time_rate: percentage(processing.on_time, processing.on_time + processing.delayed),
    };

    SnapshotMetrics {
        period,
        as_of,
        window_start: window.start,
        farms: farm_rollup(input.farms, &window, as_of),
        batches: batch_rollup,
        production: production_rollup(&batches, &window),
        quality,
        processing,
        users: user_rollup(input.users, &window, as_of),
        revenue: revenue_rollup(&batches, &window),
        activity: activity_rollup(&batches, &window),
        efficiency: efficiency_rollup(&batches, as_of),
        sustainability: sustainability_rollup(&batches, &window, as_of),
        rates,
    }
}

fn farm_rollup(farms: &[farm::Model], window: &Window, as_of: DateTime<Utc>) -> FarmRollup {
    let existing: Vec<&farm::Model> = farms.iter().filter(|f| f.created_at <= as_of).collect();

    let mut by_status = BTreeMap::new();
    let mut by_region: BTreeMap<(String, Option<String>), u64> = BTreeMap::new();
    for farm in &existing {
        *by_status.entry(farm.approval_status).or_insert(0u64) += 1;
        let country = farm
            .location
            .country
            .clone()
            .unwrap_or_else(|| "Unknown".to_string());
        *by_region.entry((country, farm.location.state.clone())).or_insert(0) += 1;
    }

    FarmRollup {
        total: existing.len() as u64,
        active: existing.iter().filter(|f| f.is_active).count() as u64,
        by_approval_status: by_status
            .into_iter()
            .map(|(status, count)| ApprovalCount { status, count })
            .collect(),
        new_registrations: existing.iter().filter(|f| window.contains(f.created_at)).count() as u64,
        with_valid_organic_certification: existing
            .iter()
            .filter(|f| f.has_valid_organic_certification(as_of))
            .count() as u64,
        by_region: by_region
            .into_iter()
            .map(|((country, state), count)| RegionCount { country, state, count })
            .collect(),
    }
}

fn user_rollup(users: &[user::Model], window: &Window, as_of: DateTime<Utc>) -> UserRollup {
    let existing: Vec<&user::Model> = users.iter().filter(|u| u.created_at <= as_of).collect();
    let mut by_role: BTreeMap<UserRole, u64> = BTreeMap::new();
    for user in &existing {
        *by_role.entry(user.role).or_insert(0) += 1;
    }

    UserRollup {
        total: existing.len() as u64,
        active: existing.iter().filter(|u| u.is_active).count() as u64,
        by_role: by_role
            .into_iter()
            .map(|(role, count)| RoleCount { role, count })
            .collect(),
        new_registrations: existing.iter().filter(|u| window.contains(u.created_at)).count() as u64,
    }
}

fn batch_rollup(batches: &[BatchAtCutoff<'_>], window: &Window, as_of: DateTime<Utc>) -> BatchRollup {
    let by_stage = Stage::ALL
        .iter()
        .map(|&stage| StageCount {
            stage,
            count: batches
                .iter()
                .filter(|b| b.projection.current_stage == stage)
                .count() as u64,
        })
        .collect();
    let by_status = BatchStatus::ALL
        .iter()
        .map(|&status| StatusCount {
            status,
            count: batches.iter().filter(|b| b.projection.status == status).count() as u64,
        })
        .collect();

    let with_active_quality_issues = batches
        .iter()
        .filter(|b| {
            b.batch.quality_issues.0.iter().any(|issue| {
                issue.reported_at <= as_of
                    && !(issue.resolved && issue.resolved_at.map_or(true, |at| at <= as_of))
            })
        })
        .count() as u64;

    BatchRollup {
        total: batches.len() as u64,
        by_stage,
        by_status,
        new_batches: batches.iter().filter(|b| window.contains(b.registered_at())).count() as u64,
        completed_in_period: batches
            .iter()
            .filter(|b| b.completed_at().is_some_and(|at| window.contains(at)))
            .count() as u64,
        with_active_quality_issues,
    }
}

fn production_rollup(batches: &[BatchAtCutoff<'_>], window: &Window) -> ProductionRollup {
    let weights: Vec<f64> = batches.iter().map(|b| b.batch.weight_in_kg()).collect();

    let mut by_farm: BTreeMap<(String, Uuid), FarmBreakdown> = BTreeMap::new();
    for entry in batches {
        let batch = entry.batch;
        let row = by_farm
            .entry((batch.farm_name.clone(), batch.farm_id))
            .or_insert_with(|| FarmBreakdown {
                farm_id: batch.farm_id,
                farm_name: batch.farm_name.clone(),
                batch_count: 0,
                completed_batches: 0,
                wool_produced_kg: 0.0,
                estimated_revenue: Decimal::ZERO,
            });
        row.batch_count += 1;
        if entry.projection.is_completed() {
            row.completed_batches += 1;
        }
        row.wool_produced_kg += batch.weight_in_kg();
        if let Some(revenue) = &batch.revenue_estimate {
            row.estimated_revenue += revenue.amount;
        }
    }

    ProductionRollup {
        total_wool_kg: weights.iter().sum(),
        wool_kg_in_period: batches
            .iter()
            .filter(|b| window.contains(b.registered_at()))
            .map(|b| b.batch.weight_in_kg())
            .sum(),
        average_batch_weight_kg: mean(&weights),
        by_farm: by_farm.into_values().collect(),
    }
}

fn quality_rollup(batches: &[BatchAtCutoff<'_>], window: &Window) -> QualityRollup {
    let mut passed = 0;
    let mut failed = 0;
    let mut scores = Vec::new();
    for event in batches
        .iter()
        .flat_map(|b| b.events.iter())
        .filter(|e| window.contains(e.timestamp))
    {
        let Some(check) = &event.quality_check else {
            continue;
        };
        match check.outcome() {
            Some(true) => passed += 1,
            Some(false) => failed += 1,
            None => {}
        }
        if let Some(score) = check.score {
            scores.push(f64::from(score));
        }
    }

    let diameters: Vec<f64> = batches
        .iter()
        .filter_map(|b| b.batch.quality_metrics.fiber_diameter.as_ref().map(|d| d.value))
        .collect();
    let yields: Vec<f64> = batches
        .iter()
        .filter_map(|b| b.batch.quality_metrics.clean_yield)
        .collect();

    let mut by_type: BTreeMap<IssueType, u64> = BTreeMap::new();
    let mut reported = 0;
    let mut resolved = 0;
    for issue in batches.iter().flat_map(|b| b.batch.quality_issues.0.iter()) {
        if window.contains(issue.reported_at) {
            reported += 1;
            *by_type.entry(issue.issue_type).or_insert(0) += 1;
        }
        if issue.resolved && issue.resolved_at.is_some_and(|at| window.contains(at)) {
            resolved += 1;
        }
    }

    QualityRollup {
        checks_passed: passed,
        checks_failed: failed,
        average_check_score: mean(&scores),
        average_fiber_diameter: mean(&diameters),
        average_clean_yield: mean(&yields),
        issues_reported: reported,
        issues_resolved: resolved,
        issues_by_type: by_type
            .into_iter()
            .map(|(issue_type, count)| IssueTypeCount { issue_type, count })
            .collect(),
    }
}

fn processing_rollup(batches: &[BatchAtCutoff<'_>], window: &Window) -> ProcessingRollup {
    let mut durations = Vec::new();
    let mut on_time = 0;
    let mut delayed = 0;

    for entry in batches {
        match entry.completed_at() {
            Some(done) if window.contains(done) => {
                if let Some(days) = entry.projection.processing_duration {
                    durations.push(days as f64);
                }
                match entry.batch.estimated_completion_date {
                    Some(estimate) if done > estimate => delayed += 1,
                    Some(_) => on_time += 1,
                    None => {}
                }
            }
            Some(_) => {}
            None if entry.projection.status == BatchStatus::Delayed => delayed += 1,
            None => {}
        }
    }

    struct Tally {
        name: String,
        company: Option<String>,
        batches: BTreeSet<Uuid>,
        updates: u64,
    }
    let mut processors: BTreeMap<Uuid, Tally> = BTreeMap::new();
    for entry in batches {
        for event in entry.events.iter().filter(|e| window.contains(e.timestamp)) {
            let actor = &event.updated_by;
            if !matches!(actor.role, UserRole::Processor | UserRole::Distributor) {
                continue;
            }
            let tally = processors.entry(actor.user_id).or_insert_with(|| Tally {
                name: actor.name.clone(),
                company: actor.company.clone(),
                batches: BTreeSet::new(),
                updates: 0,
            });
            tally.batches.insert(entry.batch.id);
            tally.updates += 1;
        }
    }
    let mut by_processor: Vec<ProcessorBreakdown> = processors
        .into_iter()
        .map(|(processor_id, tally)| ProcessorBreakdown {
            processor_id,
            processor_name: tally.name,
            company: tally.company,
            batches_handled: tally.batches.len() as u64,
            updates_recorded: tally.updates,
        })
        .collect();
    by_processor.sort_by(|a, b| {
        b.updates_recorded
            .cmp(&a.updates_recorded)
            .then(a.processor_id.cmp(&b.processor_id))
    });

    ProcessingRollup {
        average_processing_days: mean(&durations),
        on_time,
        delayed,
        by_processor,
    }
}

fn revenue_rollup(batches: &[BatchAtCutoff<'_>], window: &Window) -> RevenueRollup {
    let mut total: BTreeMap<String, Decimal> = BTreeMap::new();
    let mut in_period: BTreeMap<String, Decimal> = BTreeMap::new();
    for entry in batches {
        let Some(revenue) = &entry.batch.revenue_estimate else {
            continue;
        };
        *total.entry(revenue.currency.clone()).or_default() += revenue.amount;
        if window.contains(entry.registered_at()) {
            *in_period.entry(revenue.currency.clone()).or_default() += revenue.amount;
        }
    }

    let totals = |map: BTreeMap<String, Decimal>| {
        map.into_iter()
            .map(|(currency, amount)| CurrencyTotal { currency, amount })
            .collect()
    };
    RevenueRollup {
        estimated_total: totals(total),
        estimated_in_period: totals(in_period),
    }
}

fn activity_rollup(batches: &[BatchAtCutoff<'_>], window: &Window) -> ActivityRollup {
    let mut activity = ActivityRollup::default();
    for entry in batches {
        let mut previous: Option<Stage> = None;
        for event in &entry.events {
            if window.contains(event.timestamp) {
                activity.updates_recorded += 1;
                if previous.is_some_and(|stage| stage != event.stage) {
                    activity.stage_advances += 1;
                }
            }
            previous = Some(event.stage);
        }
        activity.documents_attached += entry
            .batch
            .documents
            .0
            .iter()
            .filter(|d| window.contains(d.uploaded_at))
            .count() as u64;
    }
    activity
}

fn efficiency_rollup(batches: &[BatchAtCutoff<'_>], as_of: DateTime<Utc>) -> EfficiencyRollup {
    let mut closed: BTreeMap<Stage, Vec<f64>> = BTreeMap::new();
    let mut waiting: BTreeMap<Stage, Vec<f64>> = BTreeMap::new();

    for entry in batches {
        for segment in &entry.projection.timeline {
            if segment.stage.is_terminal() {
                continue;
            }
            match segment.duration {
                Some(days) => closed.entry(segment.stage).or_default().push(days),
                None => waiting
                    .entry(segment.stage)
                    .or_default()
                    .push(days_between(segment.start_date, as_of)),
            }
        }
    }

    let average_stage_completion: Vec<StageDuration> = closed
        .into_iter()
        .filter_map(|(stage, days)| {
            mean(&days).map(|average_days| StageDuration {
                stage,
                average_days,
                samples: days.len() as u64,
            })
        })
        .collect();

    let slowest_stage = average_stage_completion
        .iter()
        .fold(None::<&StageDuration>, |slowest, candidate| match slowest {
            Some(current) if current.average_days >= candidate.average_days => Some(current),
            _ => Some(candidate),
        })
        .map(|d| d.stage);

    let bottlenecks = waiting
        .into_iter()
        .filter_map(|(stage, days)| {
            mean(&days).map(|average_days_waiting| Bottleneck {
                stage,
                waiting_batches: days.len() as u64,
                average_days_waiting,
            })
        })
        .collect();

    EfficiencyRollup {
        average_stage_completion,
        slowest_stage,
        bottlenecks,
    }
}

fn sustainability_rollup(
    batches: &[BatchAtCutoff<'_>],
    window: &Window,
    as_of: DateTime<Utc>,
) -> SustainabilityRollup {
    let mut rollup = SustainabilityRollup::default();
    for entry in batches {
        let valid: Vec<_> = entry
            .batch
            .certifications
            .0
            .iter()
            .filter(|c| c.is_valid_at(as_of))
            .collect();
        if !valid.is_empty() {
            rollup.certified_batches += 1;
        }
        if valid.iter().any(|c| c.kind == CertificationKind::Organic) {
            rollup.organic_batches += 1;
        }
        for details in entry
            .events
            .iter()
            .filter(|e| window.contains(e.timestamp))
            .filter_map(|e| e.processing_details.as_ref())
        {
            rollup.energy_consumed_kwh += details.energy_consumed.unwrap_or(0.0);
            rollup.water_used_liters += details.water_used.unwrap_or(0.0);
        }
    }
    rollup
}
