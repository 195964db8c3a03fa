//! Property-based tests for the lifecycle fold and the analytics arithmetic.

use chrono::{Duration, NaiveDate, TimeZone, Utc};
use proptest::prelude::*;
use uuid::Uuid;

use woolchain_api::{
    models::{
        codes::{batch_code, normalize_batch_code},
        snapshot::percentage,
        Actor, BatchProjection, BatchStatus, EventFacts, Location, Proposal, SnapshotPeriod, Stage, UserRole,
    },
    services::analytics::percent_change,
};

fn stage_strategy() -> impl Strategy<Value = Stage> {
    prop::sample::select(Stage::ALL.to_vec())
}

fn status_strategy() -> impl Strategy<Value = BatchStatus> {
    prop::sample::select(BatchStatus::ALL.to_vec())
}

fn period_strategy() -> impl Strategy<Value = SnapshotPeriod> {
    prop_oneof![
        Just(SnapshotPeriod::Daily),
        Just(SnapshotPeriod::Weekly),
        Just(SnapshotPeriod::Monthly),
        Just(SnapshotPeriod::Quarterly),
        Just(SnapshotPeriod::Yearly),
    ]
}

/// (stage, status, hours after the previous proposal, raises issues)
fn proposals_strategy() -> impl Strategy<Value = Vec<(Stage, BatchStatus, i64, bool)>> {
    prop::collection::vec(
        (stage_strategy(), status_strategy(), -24i64..96, any::<bool>()),
        0..40,
    )
}

fn operator() -> Actor {
    Actor {
        user_id: Uuid::nil(),
        name: "Line Operator".to_string(),
        role: UserRole::Processor,
        company: None,
        contact_email: None,
        contact_phone: None,
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    #[test]
    fn admitted_events_never_move_a_batch_backwards(proposals in proposals_strategy()) {
        let shearing = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let place = Location::default();
        let actor = operator();

        let mut projection = BatchProjection::new(shearing);
        projection.apply(EventFacts {
            stage: Stage::Shearing,
            status: BatchStatus::InProgress,
            location: &place,
            actor: &actor,
            timestamp: shearing,
        });

        let mut clock = shearing;
        let mut accepted = 1;
        for (stage, status, hours, raises_issues) in proposals {
            clock += Duration::hours(hours);
            let before = projection.clone();
            let proposal = Proposal { stage, status, timestamp: clock, raises_issues };

            let Ok(admission) = projection.admit(&proposal) else {
                continue;
            };
            prop_assert!(admission.stage >= before.current_stage);
            if let Some(flagged) = admission.flagged_stage {
                prop_assert!(flagged < before.current_stage);
            }

            projection.apply(EventFacts {
                stage: admission.stage,
                status,
                location: &place,
                actor: &actor,
                timestamp: clock,
            });
            accepted += 1;

            prop_assert!(projection.current_stage >= before.current_stage);
            prop_assert!(projection.current_stage.position() <= before.current_stage.position() + 1);
            if before.is_completed() {
                prop_assert_eq!(projection.current_stage, Stage::Completed);
                prop_assert_eq!(projection.timeline.len(), before.timeline.len());
                prop_assert_eq!(projection.actual_completion_date, before.actual_completion_date);
            }
        }

        prop_assert_eq!(projection.total_updates, accepted);
        prop_assert!(projection.timeline.iter().filter(|s| s.is_open()).count() <= 1);
        prop_assert!(projection
            .timeline
            .windows(2)
            .all(|w| w[0].stage < w[1].stage && w[0].start_date <= w[1].start_date));
        prop_assert_eq!(projection.is_completed(), projection.actual_completion_date.is_some());
    }

    #[test]
    fn percentages_stay_within_bounds(denominator in 0u64..10_000, share in 0.0f64..=1.0) {
        let numerator = (denominator as f64 * share).floor() as u64;
        let rate = percentage(numerator, denominator);
        prop_assert!(rate.is_finite());
        prop_assert!((0.0..=100.0).contains(&rate));
        if denominator == 0 {
            prop_assert_eq!(rate, 0.0);
        }
    }

    #[test]
    fn percent_change_is_undefined_only_without_a_base(current in 0.0f64..1e6, previous in 0.0f64..1e6) {
        let change = percent_change(current, previous);
        prop_assert_eq!(change.is_none(), previous == 0.0);
        if let Some(delta) = change {
            prop_assert!(delta.is_finite());
            prop_assert!(delta >= -100.0);
        }
    }

    #[test]
    fn generated_batch_codes_normalize_to_themselves(
        days in 0u64..20_000,
        sequence in 1u32..=9999,
    ) {
        let date = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap() + chrono::Days::new(days);
        let code = batch_code(date, sequence);
        prop_assert_eq!(normalize_batch_code(&code.to_lowercase()), Some(code));
    }

    #[test]
    fn previous_period_date_is_strictly_earlier(period in period_strategy(), days in 0u64..20_000) {
        let date = NaiveDate::from_ymd_opt(2000, 1, 1).unwrap() + chrono::Days::new(days);
        let previous = period.previous_date(date).unwrap();
        prop_assert!(previous < date);
    }
}
