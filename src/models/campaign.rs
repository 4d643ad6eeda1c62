use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::models::statistics::{calculate_campaign_statistics, CampaignCounts, CampaignStatistics};

/// The backend hands out ids as integers on some endpoints and strings on others.
pub(crate) fn deserialize_id_flexible<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        String(String),
    }

    match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(i) => Ok(i.to_string()),
        IdRepr::String(s) if !s.trim().is_empty() => Ok(s),
        IdRepr::String(_) => Err(serde::de::Error::custom("Empty id")),
    }
}

fn deserialize_optional_id<'de, D>(deserializer: D) -> std::result::Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    struct Wrapper(#[serde(deserialize_with = "deserialize_id_flexible")] String);

    Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|w| w.0))
}

fn deserialize_count<'de, D>(deserializer: D) -> std::result::Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u64>::deserialize(deserializer)?.unwrap_or(0))
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CampaignStatus {
    Draft,
    Scheduled,
    Active,
    Completed,
    Failed,
    #[serde(other)]
    Unknown,
}

impl CampaignStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CampaignStatus::Draft => "draft",
            CampaignStatus::Scheduled => "scheduled",
            CampaignStatus::Active => "active",
            CampaignStatus::Completed => "completed",
            CampaignStatus::Failed => "failed",
            CampaignStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for CampaignStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            CampaignStatus::Draft => "Draft",
            CampaignStatus::Scheduled => "Scheduled",
            CampaignStatus::Active => "Active",
            CampaignStatus::Completed => "Completed",
            CampaignStatus::Failed => "Failed",
            CampaignStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl FromStr for CampaignStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "draft" => Ok(CampaignStatus::Draft),
            "scheduled" => Ok(CampaignStatus::Scheduled),
            "active" => Ok(CampaignStatus::Active),
            "completed" => Ok(CampaignStatus::Completed),
            "failed" => Ok(CampaignStatus::Failed),
            other => Err(format!("Unknown campaign status: {}", other)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RecipientStatus {
    Pending,
    Sent,
    Delivered,
    Read,
    Failed,
    #[serde(other)]
    Unknown,
}

impl RecipientStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            RecipientStatus::Pending => "pending",
            RecipientStatus::Sent => "sent",
            RecipientStatus::Delivered => "delivered",
            RecipientStatus::Read => "read",
            RecipientStatus::Failed => "failed",
            RecipientStatus::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RecipientStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            RecipientStatus::Pending => "Pending",
            RecipientStatus::Sent => "Sent",
            RecipientStatus::Delivered => "Delivered",
            RecipientStatus::Read => "Read",
            RecipientStatus::Failed => "Failed",
            RecipientStatus::Unknown => "Unknown",
        };
        f.write_str(label)
    }
}

impl FromStr for RecipientStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pending" => Ok(RecipientStatus::Pending),
            "sent" => Ok(RecipientStatus::Sent),
            "delivered" => Ok(RecipientStatus::Delivered),
            "read" => Ok(RecipientStatus::Read),
            "failed" => Ok(RecipientStatus::Failed),
            other => Err(format!("Unknown recipient status: {}", other)),
        }
    }
}

pub fn is_campaign_active(status: &CampaignStatus) -> bool {
    *status == CampaignStatus::Active
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Campaign {
    #[serde(deserialize_with = "deserialize_id_flexible")]
    pub id: String,
    pub name: String,
    pub status: CampaignStatus,
    #[serde(default)]
    pub template_name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub total_audience: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub delivered_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub read_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub replied_count: u64,
    #[serde(default, deserialize_with = "deserialize_count")]
    pub failed_count: u64,
    #[serde(default)]
    pub scheduled_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub is_deleted: bool,
}

impl Campaign {
    pub fn is_active(&self) -> bool {
        is_campaign_active(&self.status)
    }

    pub fn counts(&self) -> CampaignCounts {
        CampaignCounts {
            total_audience: self.total_audience,
            delivered_count: self.delivered_count,
            read_count: self.read_count,
            replied_count: self.replied_count,
        }
    }

    pub fn statistics(&self) -> CampaignStatistics {
        calculate_campaign_statistics(&self.counts())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipient {
    #[serde(default, deserialize_with = "deserialize_optional_id")]
    pub id: Option<String>,
    pub mobile_number: String,
    #[serde(default)]
    pub dynamic_variables: Vec<String>,
    pub status: RecipientStatus,
    #[serde(default)]
    pub sent_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub delivered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub read_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub error_message: Option<String>,
}

/// A campaign together with the recipients the backend returned for it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignDetails {
    #[serde(flatten)]
    pub campaign: Campaign,
    #[serde(default)]
    pub recipients: Vec<Recipient>,
}

impl CampaignDetails {
    pub fn is_active(&self) -> bool {
        self.campaign.is_active()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_campaign_with_numeric_id_and_missing_counts() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": 42,
            "name": "Diwali offers",
            "status": "active",
            "total_audience": 200,
            "delivered_count": 100,
            "read_count": null
        }))
        .unwrap();

        assert_eq!(campaign.id, "42");
        assert!(campaign.is_active());
        assert_eq!(campaign.read_count, 0);
        assert!(!campaign.is_deleted);
    }

    #[test]
    fn unrecognized_status_becomes_unknown() {
        let campaign: Campaign = serde_json::from_value(json!({
            "id": "c-1",
            "name": "x",
            "status": "paused"
        }))
        .unwrap();
        assert_eq!(campaign.status, CampaignStatus::Unknown);
        assert!(!campaign.is_active());

        let status: RecipientStatus = serde_json::from_value(json!("bounced")).unwrap();
        assert_eq!(status, RecipientStatus::Unknown);
    }

    #[test]
    fn details_flatten_campaign_fields() {
        let details: CampaignDetails = serde_json::from_value(json!({
            "id": "c-7",
            "name": "Reminder",
            "status": "completed",
            "total_audience": 1,
            "recipients": [
                { "mobile_number": "919876543210", "dynamic_variables": ["Asha"], "status": "read" }
            ]
        }))
        .unwrap();

        assert_eq!(details.campaign.id, "c-7");
        assert_eq!(details.recipients.len(), 1);
        assert_eq!(details.recipients[0].status, RecipientStatus::Read);
        assert!(!details.is_active());
    }

    #[test]
    fn status_parsing_is_case_insensitive() {
        assert_eq!("Active".parse::<CampaignStatus>(), Ok(CampaignStatus::Active));
        assert!("paused".parse::<CampaignStatus>().is_err());
        assert_eq!("READ".parse::<RecipientStatus>(), Ok(RecipientStatus::Read));
    }
}
