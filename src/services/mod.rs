// Batch lifecycle
pub mod lifecycle;
pub mod timeline;

// Accounts
pub mod farms;
pub mod users;

// Analytics and reporting
pub mod analytics;
pub mod rollup;
pub mod snapshot_worker;

// Consumer-facing
pub mod public_trace;
