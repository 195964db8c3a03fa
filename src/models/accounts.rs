use chrono::{DateTime, Utc};
use sea_orm::entity::prelude::*;
use sea_orm::FromJsonQueryResult;
use serde::{Deserialize, Serialize};
use std::fmt;

use super::provenance::{Coordinates, Location};

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    #[sea_orm(string_value = "admin")]
    Admin,
    #[sea_orm(string_value = "farmer")]
    Farmer,
    #[sea_orm(string_value = "processor")]
    Processor,
    #[sea_orm(string_value = "distributor")]
    Distributor,
    #[sea_orm(string_value = "public")]
    Public,
}

impl fmt::Display for UserRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UserRole::Admin => "admin",
            UserRole::Farmer => "farmer",
            UserRole::Processor => "processor",
            UserRole::Distributor => "distributor",
            UserRole::Public => "public",
        };
        f.write_str(name)
    }
}

#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, EnumIter, DeriveActiveEnum, Serialize, Deserialize,
)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum ApprovalStatus {
    #[sea_orm(string_value = "Pending")]
    Pending,
    #[sea_orm(string_value = "Approved")]
    Approved,
    #[sea_orm(string_value = "Rejected")]
    Rejected,
    #[sea_orm(string_value = "Suspended")]
    Suspended,
}

impl fmt::Display for ApprovalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApprovalStatus::Pending => "Pending",
            ApprovalStatus::Approved => "Approved",
            ApprovalStatus::Rejected => "Rejected",
            ApprovalStatus::Suspended => "Suspended",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct FarmLocation {
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
    pub zip_code: Option<String>,
    pub coordinates: Option<Coordinates>,
}

impl FarmLocation {
    /// Batch location for wool still on the named farm.
    pub fn as_origin(&self, farm_name: &str) -> Location {
        Location {
            facility_name: Some(farm_name.to_string()),
            address: self.address.clone(),
            city: self.city.clone(),
            state: self.state.clone(),
            country: self.country.clone(),
            coordinates: self.coordinates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
#[serde(default)]
pub struct FarmContact {
    pub phone: Option<String>,
    pub email: Option<String>,
    pub alternate_phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FarmCertification {
    pub name: String,
    pub issued_by: String,
    pub certificate_number: Option<String>,
    pub issued_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_organic: bool,
    pub document_url: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, FromJsonQueryResult)]
pub struct FarmCertifications(pub Vec<FarmCertification>);

impl FarmCertifications {
    pub fn has_valid_organic(&self, at: DateTime<Utc>) -> bool {
        self.0
            .iter()
            .any(|cert| cert.is_organic && cert.expiry_date.map_or(true, |expiry| expiry > at))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn organic(expiry: Option<DateTime<Utc>>) -> FarmCertification {
        FarmCertification {
            name: "ACO Organic".into(),
            issued_by: "ACO".into(),
            certificate_number: None,
            issued_date: None,
            expiry_date: expiry,
            is_organic: true,
            document_url: None,
        }
    }

    #[test]
    fn organic_certification_honours_expiry() {
        let now = Utc::now();
        let expired = FarmCertifications(vec![organic(Some(now - Duration::days(1)))]);
        assert!(!expired.has_valid_organic(now));

        let open_ended = FarmCertifications(vec![organic(None)]);
        assert!(open_ended.has_valid_organic(now));

        let mut non_organic = organic(None);
        non_organic.is_organic = false;
        assert!(!FarmCertifications(vec![non_organic]).has_valid_organic(now));
    }
}
