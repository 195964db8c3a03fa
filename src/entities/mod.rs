pub mod analytics_snapshot;
pub mod batch;
pub mod batch_update;
pub mod farm;
pub mod user;

pub use analytics_snapshot::Entity as AnalyticsSnapshot;
pub use batch::Entity as Batch;
pub use batch_update::Entity as BatchUpdate;
pub use farm::Entity as Farm;
pub use user::Entity as User;
