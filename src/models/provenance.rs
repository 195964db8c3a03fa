use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

const KG_PER_LB: f64 = 0.453592;

#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
#[serde(rename_all = "lowercase")]
pub enum WeightUnit {
    #[sea_orm(string_value = "kg")]
    Kg,
    #[sea_orm(string_value = "lbs")]
    Lbs,
    #[sea_orm(string_value = "grams")]
    Grams,
}

impl WeightUnit {
    pub fn to_kg(self, value: f64) -> f64 {
        match self {
            WeightUnit::Kg => value,
            WeightUnit::Lbs => value * KG_PER_LB,
            WeightUnit::Grams => value / 1000.0,
        }
    }
}

impl Default for WeightUnit {
    fn default() -> Self {
        WeightUnit::Kg
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    #[serde(default)]
    pub unit: WeightUnit,
}

impl Weight {
    pub fn kg(value: f64) -> Self {
        Self {
            value,
            unit: WeightUnit::Kg,
        }
    }

    /// Weight in the canonical unit.
    pub fn in_kg(&self) -> f64 {
        self.unit.to_kg(self.value)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Physical place a batch is held at.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct Location {
    pub facility_name: Option<String>,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl Location {
    /// Facility and region only; street address and coordinates dropped.
    pub fn coarse(&self) -> Location {
        Location {
            facility_name: self.facility_name.clone(),
            address: None,
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            coordinates: None,
        }
    }
}

/// Party currently holding a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Custodian {
    pub user_id: Uuid,
    pub name: String,
    pub company: Option<String>,
    pub contact_email: Option<String>,
    pub contact_phone: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FiberGrade {
    Ultrafine,
    Superfine,
    Fine,
    Medium,
    Strong,
    Coarse,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiberDiameter {
    /// Microns.
    pub value: f64,
    pub grade: Option<FiberGrade>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WoolColor {
    White,
    #[serde(rename = "Off-White")]
    OffWhite,
    Cream,
    Brown,
    Black,
    Gray,
    Mixed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StrengthRating {
    Weak,
    Fair,
    Good,
    Excellent,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Strength {
    /// Newtons per kilotex.
    pub value: f64,
    pub rating: Option<StrengthRating>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Crimp {
    /// Crimps per centimetre.
    pub frequency: f64,
    pub definition: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct QualityMetrics {
    pub fiber_diameter: Option<FiberDiameter>,
    /// Centimetres.
    pub staple_length: Option<f64>,
    /// Percent.
    pub clean_yield: Option<f64>,
    pub color: Option<WoolColor>,
    pub strength: Option<Strength>,
    /// Percent.
    pub vegetable_matter: Option<f64>,
    pub crimp: Option<Crimp>,
}

impl QualityMetrics {
    pub fn out_of_range_field(&self) -> Option<&'static str> {
        let pct = |v: Option<f64>| v.map_or(false, |v| !(0.0..=100.0).contains(&v));
        if pct(self.clean_yield) {
            return Some("clean_yield");
        }
        if pct(self.vegetable_matter) {
            return Some("vegetable_matter");
        }
        if self
            .fiber_diameter
            .map_or(false, |d| !d.value.is_finite() || d.value <= 0.0)
        {
            return Some("fiber_diameter");
        }
        if self.staple_length.map_or(false, |l| l < 0.0) {
            return Some("staple_length");
        }
        None
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CertificationKind {
    Organic,
    #[serde(rename = "Fair Trade")]
    FairTrade,
    #[serde(rename = "Animal Welfare")]
    AnimalWelfare,
    Sustainability,
    Quality,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Certification {
    pub kind: CertificationKind,
    pub certified_by: String,
    pub certificate_number: Option<String>,
    pub issued_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    pub document_url: Option<String>,
}

impl Certification {
    pub fn is_valid_at(&self, at: DateTime<Utc>) -> bool {
        self.expiry_date.map_or(true, |expiry| expiry > at)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Certifications(pub Vec<Certification>);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum IssueType {
    Contamination,
    #[serde(rename = "Low Quality")]
    LowQuality,
    Damage,
    Mislabeling,
    Documentation,
    Delay,
    Equipment,
    Safety,
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Medium
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityIssue {
    pub id: Uuid,
    pub issue_type: IssueType,
    pub description: String,
    pub severity: Severity,
    pub reported_by: Option<Uuid>,
    pub reported_at: DateTime<Utc>,
    /// Event that raised the issue, if any.
    pub source_update: Option<Uuid>,
    pub resolved: bool,
    pub resolved_at: Option<DateTime<Utc>>,
    pub resolution: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct QualityIssues(pub Vec<QualityIssue>);

impl QualityIssues {
    pub fn has_unresolved(&self) -> bool {
        self.0.iter().any(|issue| !issue.resolved)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DocumentKind {
    Certificate,
    #[serde(rename = "Quality Report")]
    QualityReport,
    Invoice,
    #[serde(rename = "Shipping Document")]
    ShippingDocument,
    Photo,
    Other,
}

/// Reference to an externally stored document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Document {
    pub id: Uuid,
    pub title: String,
    pub kind: DocumentKind,
    pub url: String,
    pub uploaded_by: Option<Uuid>,
    pub uploaded_at: DateTime<Utc>,
    pub file_size: Option<i64>,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Documents(pub Vec<Document>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineSegment {
    pub stage: super::Stage,
    pub start_date: DateTime<Utc>,
    pub end_date: Option<DateTime<Utc>>,
    /// Days, fractional.
    pub duration: Option<f64>,
}

impl TimelineSegment {
    pub fn open(stage: super::Stage, start_date: DateTime<Utc>) -> Self {
        Self {
            stage,
            start_date,
            end_date: None,
            duration: None,
        }
    }

    pub fn close(&mut self, end_date: DateTime<Utc>) {
        self.end_date = Some(end_date);
        self.duration = Some(days_between(self.start_date, end_date));
    }

    pub fn is_open(&self) -> bool {
        self.end_date.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct Timeline(pub Vec<TimelineSegment>);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, FromJsonQueryResult)]
pub struct RevenueEstimate {
    pub amount: Decimal,
    pub currency: String,
}

/// Fractional days from `start` to `end`.
pub fn days_between(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 86_400.0
}

/// Whole days from `start` to `end`, rounded up and never negative.
pub fn whole_days_ceil(start: DateTime<Utc>, end: DateTime<Utc>) -> i64 {
    days_between(start, end).ceil().max(0.0) as i64
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn weight_converts_to_kg() {
        let lbs = Weight {
            value: 100.0,
            unit: WeightUnit::Lbs,
        };
        assert!((lbs.in_kg() - 45.3592).abs() < 1e-9);
        let grams = Weight {
            value: 2500.0,
            unit: WeightUnit::Grams,
        };
        assert!((grams.in_kg() - 2.5).abs() < 1e-9);
        assert_eq!(Weight::kg(12.0).in_kg(), 12.0);
    }

    #[test]
    fn duration_rounds_partial_days_up() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 8, 0, 0).unwrap();
        let end = Utc.with_ymd_and_hms(2024, 3, 4, 9, 0, 0).unwrap();
        assert_eq!(whole_days_ceil(start, end), 4);
        assert_eq!(whole_days_ceil(start, start), 0);
        assert_eq!(whole_days_ceil(end, start), 0);
    }

    #[test]
    fn quality_metrics_range_check() {
        let mut metrics = QualityMetrics {
            clean_yield: Some(68.0),
            ..Default::default()
        };
        assert_eq!(metrics.out_of_range_field(), None);
        metrics.vegetable_matter = Some(120.0);
        assert_eq!(metrics.out_of_range_field(), Some("vegetable_matter"));
    }

    #[test]
    fn crimp_definition_survives_json_column() {
        let metrics = QualityMetrics {
            crimp: Some(Crimp {
                frequency: 5.5,
                definition: Some("well defined".into()),
            }),
            ..Default::default()
        };
        let stored = serde_json::to_value(&metrics).unwrap();
        assert_eq!(stored["crimp"]["definition"], "well defined");
        let restored: QualityMetrics = serde_json::from_value(stored).unwrap();
        assert_eq!(restored, metrics);
    }

    #[test]
    fn coarse_location_drops_street_and_coordinates() {
        let loc = Location {
            facility_name: Some("Mill".into()),
            address: Some("1 Fleece Rd".into()),
            city: Some("Geelong".into()),
            state: Some("VIC".into()),
            country: Some("Australia".into()),
            coordinates: Some(Coordinates {
                latitude: -38.1,
                longitude: 144.3,
            }),
        };
        let coarse = loc.coarse();
        assert_eq!(coarse.address, None);
        assert_eq!(coarse.coordinates, None);
        assert_eq!(coarse.city.as_deref(), Some("Geelong"));
    }
}
