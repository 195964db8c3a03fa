use chrono::{DateTime, Utc};
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::accounts::UserRole;
use super::provenance::{Custodian, IssueType, Severity, WeightUnit};

/// User who recorded an event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Actor {
    pub user_id: Uuid,
    pub name: String,
    pub role: UserRole,
    pub company: Option<String>,
    #[serde(default)]
    pub contact_email: Option<String>,
    #[serde(default)]
    pub contact_phone: Option<String>,
}

impl Actor {
    pub fn as_custodian(&self) -> Custodian {
        Custodian {
            user_id: self.user_id,
            name: self.name.clone(),
            company: self.company.clone(),
            contact_email: self.contact_email.clone(),
            contact_phone: self.contact_phone.clone(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MeasuredWeight {
    pub value: f64,
    pub unit: WeightUnit,
    /// Difference from the previous measurement, same unit.
    pub change: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Moisture {
    /// Percent.
    pub value: f64,
    pub acceptable: Option<bool>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Temperature {
    pub value: f64,
    pub unit: TemperatureUnit,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct Measurements {
    pub weight: Option<MeasuredWeight>,
    pub moisture: Option<Moisture>,
    pub temperature: Option<Temperature>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct QualityCheck {
    pub performed: bool,
    pub passed: Option<bool>,
    pub inspector: Option<String>,
    pub inspection_date: Option<DateTime<Utc>>,
    pub findings: Option<String>,
    /// 0..=100.
    pub score: Option<u8>,
}

impl QualityCheck {
    /// `Some(passed)` only for checks that were performed and graded.
    pub fn outcome(&self) -> Option<bool> {
        if self.performed {
            self.passed
        } else {
            None
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimeUnit {
    Minutes,
    Hours,
    Days,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ProcessingTime {
    pub value: f64,
    pub unit: TimeUnit,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct ProcessingDetails {
    pub machine_used: Option<String>,
    pub batch_size: Option<f64>,
    pub processing_time: Option<ProcessingTime>,
    pub operator: Option<String>,
    /// kWh.
    pub energy_consumed: Option<f64>,
    /// Litres.
    pub water_used: Option<f64>,
}

/// Issue raised alongside an event; becomes a batch quality issue on acceptance.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueReport {
    pub issue_type: IssueType,
    pub description: String,
    #[serde(default)]
    pub severity: Severity,
}
