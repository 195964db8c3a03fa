use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Aggregation period of an analytics snapshot.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum SnapshotPeriod {
    #[sea_orm(string_value = "Daily")]
    Daily,
    #[sea_orm(string_value = "Weekly")]
    Weekly,
    #[sea_orm(string_value = "Monthly")]
    Monthly,
    #[sea_orm(string_value = "Quarterly")]
    Quarterly,
    #[sea_orm(string_value = "Yearly")]
    Yearly,
}

enum Offset {
    Days(u64),
    Months(u32),
}

impl SnapshotPeriod {
    fn offset(self) -> Offset {
        match self {
            SnapshotPeriod::Daily => Offset::Days(1),
            SnapshotPeriod::Weekly => Offset::Days(7),
            SnapshotPeriod::Monthly => Offset::Months(1),
            SnapshotPeriod::Quarterly => Offset::Months(3),
            SnapshotPeriod::Yearly => Offset::Months(12),
        }
    }

    /// Calendar date one period before `date`. Month arithmetic clamps to the
    /// last day of the target month (31 Mar minus one month is 29 Feb).
    pub fn previous_date(self, date: NaiveDate) -> Option<NaiveDate> {
        match self.offset() {
            Offset::Days(n) => date.checked_sub_days(Days::new(n)),
            Offset::Months(n) => date.checked_sub_months(Months::new(n)),
        }
    }

    /// Start of the window that ends at `as_of`.
    pub fn window_start(self, as_of: DateTime<Utc>) -> DateTime<Utc> {
        let start = match self.offset() {
            Offset::Days(n) => as_of.checked_sub_days(Days::new(n)),
            Offset::Months(n) => as_of.checked_sub_months(Months::new(n)),
        };
        start.unwrap_or(DateTime::<Utc>::MIN_UTC)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SnapshotPeriod::Daily => "Daily",
            SnapshotPeriod::Weekly => "Weekly",
            SnapshotPeriod::Monthly => "Monthly",
            SnapshotPeriod::Quarterly => "Quarterly",
            SnapshotPeriod::Yearly => "Yearly",
        }
    }
}

impl fmt::Display for SnapshotPeriod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SnapshotPeriod {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "daily" => Ok(SnapshotPeriod::Daily),
            "weekly" => Ok(SnapshotPeriod::Weekly),
            "monthly" => Ok(SnapshotPeriod::Monthly),
            "quarterly" => Ok(SnapshotPeriod::Quarterly),
            "yearly" => Ok(SnapshotPeriod::Yearly),
            other => Err(format!("unknown snapshot period '{}'", other)),
        }
    }
}
