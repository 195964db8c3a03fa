//! Domain value types shared by entities, services and handlers.

pub mod accounts;
pub mod codes;
pub mod period;
pub mod projection;
pub mod provenance;
pub mod snapshot;
pub mod stage;
pub mod updates;

pub use accounts::{ApprovalStatus, FarmCertification, FarmCertifications, FarmContact, FarmLocation, UserRole};
pub use period::SnapshotPeriod;
pub use projection::{Admission, AdmissionKind, BatchProjection, EventFacts, Proposal, TransitionError};
pub use provenance::{
    days_between, whole_days_ceil, Certification, CertificationKind, Certifications, Coordinates, Custodian,
    Document, DocumentKind, Documents, IssueType, Location, QualityIssue, QualityIssues, QualityMetrics,
    RevenueEstimate, Severity, Timeline, TimelineSegment, Weight, WeightUnit,
};
pub use stage::{BatchStatus, Stage};
pub use updates::{Actor, IssueReport, Measurements, ProcessingDetails, QualityCheck};
