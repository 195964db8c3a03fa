//! Pure fold from a batch's event log to its materialized fields.
//!
//! The lifecycle service never edits `current_stage`, `current_location` or
//! the timeline directly: it replays the stored events through
//! [`BatchProjection`], admits the candidate event, applies it and writes the
//! resulting projection back onto the batch row.

use chrono::{DateTime, Utc};
use thiserror::Error;

use super::accounts::UserRole;
use super::provenance::{whole_days_ceil, Custodian, Location, TimelineSegment};
use super::stage::{BatchStatus, Stage};
use super::updates::Actor;
use crate::entities::batch_update;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransitionError {
    #[error("cannot move batch from {from} to {to}: {reason}")]
    InvalidTransition {
        from: Stage,
        to: Stage,
        reason: &'static str,
    },
    #[error("batch is completed; only notes, documents and issue resolution are accepted")]
    TerminalState,
    #[error("event timestamp {timestamp} precedes the latest accepted event at {latest}")]
    OutOfOrder {
        timestamp: DateTime<Utc>,
        latest: DateTime<Utc>,
    },
}

/// Facts of one event that the fold depends on.
#[derive(Debug, Clone, Copy)]
pub struct EventFacts<'a> {
    pub stage: Stage,
    pub status: BatchStatus,
    pub location: &'a Location,
    pub actor: &'a Actor,
    pub timestamp: DateTime<Utc>,
}

impl<'a> From<&'a batch_update::Model> for EventFacts<'a> {
    fn from(event: &'a batch_update::Model) -> Self {
        Self {
            stage: event.stage,
            status: event.status,
            location: &event.location,
            actor: &event.updated_by,
            timestamp: event.timestamp,
        }
    }
}

/// What a caller proposes before the engine decides how to record it.
#[derive(Debug, Clone, Copy)]
pub struct Proposal {
    pub stage: Stage,
    pub status: BatchStatus,
    pub timestamp: DateTime<Utc>,
    pub raises_issues: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdmissionKind {
    Advance,
    SameStage,
    /// Issue attributed to an earlier stage; the batch does not move back.
    Regression,
    /// Note or document on a completed batch.
    Annotation,
}

/// Outcome of [`BatchProjection::admit`]: the stage the event is stored
/// with, plus the earlier stage it was attributed to, if any.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    pub kind: AdmissionKind,
    pub stage: Stage,
    pub flagged_stage: Option<Stage>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BatchProjection {
    pub shearing_date: DateTime<Utc>,
    pub current_stage: Stage,
    pub status: BatchStatus,
    pub current_location: Location,
    pub current_processor: Option<Custodian>,
    pub timeline: Vec<TimelineSegment>,
    pub total_updates: i32,
    pub last_update_date: Option<DateTime<Utc>>,
    pub actual_completion_date: Option<DateTime<Utc>>,
    pub processing_duration: Option<i64>,
}

impl BatchProjection {
    /// State before the genesis event.
    pub fn new(shearing_date: DateTime<Utc>) -> Self {
        Self {
            shearing_date,
            current_stage: Stage::Shearing,
            status: BatchStatus::InProgress,
            current_location: Location::default(),
            current_processor: None,
            timeline: Vec::new(),
            total_updates: 0,
            last_update_date: None,
            actual_completion_date: None,
            processing_duration: None,
        }
    }

    pub fn replay<'a, I>(shearing_date: DateTime<Utc>, events: I) -> Self
    where
        I: IntoIterator<Item = EventFacts<'a>>,
    {
        events
            .into_iter()
            .fold(Self::new(shearing_date), |mut projection, event| {
                projection.apply(event);
                projection
            })
    }

    pub fn is_completed(&self) -> bool {
        self.current_stage.is_terminal()
    }

    /// Decides whether `proposal` may follow the events folded so far.
    pub fn admit(&self, proposal: &Proposal) -> Result<Admission, TransitionError> {
        if let Some(latest) = self.last_update_date {
            if proposal.timestamp < latest {
                return Err(TransitionError::OutOfOrder {
                    timestamp: proposal.timestamp,
                    latest,
                });
            }
        }

        let from = self.current_stage;
        let to = proposal.stage;

        if from.is_terminal() {
            let annotation = to == Stage::Completed
                && proposal.status == BatchStatus::Completed
                && !proposal.raises_issues;
            return if annotation {
                Ok(Admission {
                    kind: AdmissionKind::Annotation,
                    stage: from,
                    flagged_stage: None,
                })
            } else {
                Err(TransitionError::TerminalState)
            };
        }

        let completes = to == Stage::Completed;
        if completes != (proposal.status == BatchStatus::Completed) {
            return Err(TransitionError::InvalidTransition {
                from,
                to,
                reason: "the Completed stage and the Completed status must be reported together",
            });
        }

        if to == from {
            return Ok(Admission {
                kind: AdmissionKind::SameStage,
                stage: from,
                flagged_stage: None,
            });
        }

        if to < from {
            return if proposal.status.permits_regression() {
                Ok(Admission {
                    kind: AdmissionKind::Regression,
                    stage: from,
                    flagged_stage: Some(to),
                })
            } else {
                Err(TransitionError::InvalidTransition {
                    from,
                    to,
                    reason: "stages cannot move backwards",
                })
            };
        }

        if from.next() != Some(to) {
            return Err(TransitionError::InvalidTransition {
                from,
                to,
                reason: "stages cannot be skipped",
            });
        }

        if self.status == BatchStatus::Cancelled {
            return Err(TransitionError::InvalidTransition {
                from,
                to,
                reason: "a cancelled batch cannot advance",
            });
        }

        Ok(Admission {
            kind: AdmissionKind::Advance,
            stage: to,
            flagged_stage: None,
        })
    }

    /// Folds one accepted event. Never fails; admission happens first.
    pub fn apply(&mut self, event: EventFacts<'_>) {
        let stage_changed = self.timeline.is_empty() || event.stage != self.current_stage;
        if stage_changed {
            if let Some(open) = self.timeline.iter_mut().rev().find(|s| s.is_open()) {
                open.close(event.timestamp);
            }
            let mut segment = TimelineSegment::open(event.stage, event.timestamp);
            if event.stage.is_terminal() {
                segment.close(event.timestamp);
            }
            self.timeline.push(segment);
        }

        if event.stage.is_terminal() && self.actual_completion_date.is_none() {
            self.actual_completion_date = Some(event.timestamp);
            self.processing_duration = Some(whole_days_ceil(self.shearing_date, event.timestamp));
        }

        if matches!(event.actor.role, UserRole::Processor | UserRole::Distributor) {
            self.current_processor = Some(event.actor.as_custodian());
        }

        self.current_stage = event.stage;
        self.status = event.status;
        self.current_location = event.location.clone();
        self.total_updates += 1;
        self.last_update_date = Some(event.timestamp);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration, TimeZone};
    use uuid::Uuid;

    fn shearing() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 10, 9, 0, 0).unwrap()
    }

    fn actor(role: UserRole) -> Actor {
        Actor {
            user_id: Uuid::nil(),
            name: "Mill Operator".into(),
            role,
            company: Some("Valley Mill".into()),
            contact_email: Some("ops@valleymill.test".into()),
            contact_phone: None,
        }
    }

    fn place(name: &str) -> Location {
        Location {
            facility_name: Some(name.into()),
            ..Default::default()
        }
    }

    fn proposal(stage: Stage, status: BatchStatus, days: i64) -> Proposal {
        Proposal {
            stage,
            status,
            timestamp: shearing() + Duration::days(days),
            raises_issues: false,
        }
    }

    fn at_stage(stage: Stage) -> BatchProjection {
        let farmer = actor(UserRole::Farmer);
        let farm = place("Home Farm");
        let mut projection = BatchProjection::new(shearing());
        for (day, s) in Stage::ALL.iter().take(stage.position() + 1).enumerate() {
            let status = if s.is_terminal() {
                BatchStatus::Completed
            } else {
                BatchStatus::InProgress
            };
            projection.apply(EventFacts {
                stage: *s,
                status,
                location: &farm,
                actor: &farmer,
                timestamp: shearing() + Duration::days(day as i64),
            });
        }
        projection
    }

    #[test]
    fn advancing_closes_and_opens_segments() {
        let mut projection = at_stage(Stage::Shearing);
        let admission = projection
            .admit(&proposal(Stage::Cleaning, BatchStatus::InProgress, 2))
            .unwrap();
        assert_eq!(admission.kind, AdmissionKind::Advance);

        let mill = place("Scour Works");
        let operator = actor(UserRole::Processor);
        projection.apply(EventFacts {
            stage: admission.stage,
            status: BatchStatus::InProgress,
            location: &mill,
            actor: &operator,
            timestamp: shearing() + Duration::days(2),
        });

        assert_eq!(projection.current_stage, Stage::Cleaning);
        assert_eq!(projection.current_location, mill);
        assert_eq!(projection.timeline.len(), 2);
        assert_eq!(projection.timeline[0].duration, Some(2.0));
        assert!(projection.timeline[1].is_open());
        assert_eq!(
            projection.current_processor.as_ref().map(|c| c.name.as_str()),
            Some("Mill Operator")
        );
        assert_eq!(projection.total_updates, 2);
    }

    #[test]
    fn backwards_without_issue_status_is_rejected() {
        let projection = at_stage(Stage::Cleaning);
        let err = projection
            .admit(&proposal(Stage::Shearing, BatchStatus::InProgress, 3))
            .unwrap_err();
        assert_matches!(err, TransitionError::InvalidTransition { from: Stage::Cleaning, to: Stage::Shearing, .. });
    }

    #[test]
    fn backwards_with_quality_issue_keeps_current_stage() {
        let projection = at_stage(Stage::Carding);
        let admission = projection
            .admit(&proposal(Stage::Cleaning, BatchStatus::QualityIssue, 5))
            .unwrap();
        assert_eq!(admission.kind, AdmissionKind::Regression);
        assert_eq!(admission.stage, Stage::Carding);
        assert_eq!(admission.flagged_stage, Some(Stage::Cleaning));
    }

    #[test]
    fn skipping_stages_is_rejected() {
        let projection = at_stage(Stage::Shearing);
        let err = projection
            .admit(&proposal(Stage::Sorting, BatchStatus::InProgress, 1))
            .unwrap_err();
        assert_matches!(err, TransitionError::InvalidTransition { reason: "stages cannot be skipped", .. });
    }

    #[test]
    fn completed_stage_requires_completed_status() {
        let projection = at_stage(Stage::Distribution);
        let err = projection
            .admit(&proposal(Stage::Completed, BatchStatus::InProgress, 12))
            .unwrap_err();
        assert_matches!(err, TransitionError::InvalidTransition { .. });

        let err = projection
            .admit(&proposal(Stage::Distribution, BatchStatus::Completed, 12))
            .unwrap_err();
        assert_matches!(err, TransitionError::InvalidTransition { .. });
    }

    #[test]
    fn completed_batch_only_takes_annotations() {
        let projection = at_stage(Stage::Completed);
        assert!(projection.is_completed());
        assert_eq!(projection.processing_duration, Some(9));

        let err = projection
            .admit(&proposal(Stage::Distribution, BatchStatus::InProgress, 20))
            .unwrap_err();
        assert_eq!(err, TransitionError::TerminalState);

        let admission = projection
            .admit(&proposal(Stage::Completed, BatchStatus::Completed, 20))
            .unwrap();
        assert_eq!(admission.kind, AdmissionKind::Annotation);

        let mut with_issue = proposal(Stage::Completed, BatchStatus::Completed, 20);
        with_issue.raises_issues = true;
        assert_eq!(projection.admit(&with_issue), Err(TransitionError::TerminalState));
    }

    #[test]
    fn cancelled_batch_cannot_advance() {
        let mut projection = at_stage(Stage::Sorting);
        projection.status = BatchStatus::Cancelled;
        assert_matches!(
            projection.admit(&proposal(Stage::Carding, BatchStatus::InProgress, 5)),
            Err(TransitionError::InvalidTransition { .. })
        );
        assert!(projection
            .admit(&proposal(Stage::Sorting, BatchStatus::InProgress, 5))
            .is_ok());
    }

    #[test]
    fn out_of_order_timestamp_is_rejected() {
        let projection = at_stage(Stage::Cleaning);
        assert_matches!(
            projection.admit(&proposal(Stage::Sorting, BatchStatus::InProgress, 0)),
            Err(TransitionError::OutOfOrder { .. })
        );
    }

    #[test]
    fn completion_opens_zero_length_segment() {
        let projection = at_stage(Stage::Completed);
        let last = projection.timeline.last().unwrap();
        assert_eq!(last.stage, Stage::Completed);
        assert_eq!(last.duration, Some(0.0));
        assert!(projection.timeline.iter().all(|s| !s.is_open()));
        assert_eq!(
            projection.actual_completion_date,
            Some(shearing() + Duration::days(9))
        );
    }
}
