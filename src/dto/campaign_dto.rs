use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::models::campaign::{Campaign, CampaignStatus, RecipientStatus};
use crate::utils::csv::ValidRow;

/// Every backend response wraps its payload in `data`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiEnvelope<T> {
    pub data: T,
    #[serde(default)]
    pub message: Option<String>,
}

/// Error bodies come in a few shapes; take whichever text is present.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ApiErrorBody {
    pub fn text(self) -> Option<String> {
        self.message.or(self.error)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CampaignListQuery {
    pub page: u32,
    pub limit: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<CampaignStatus>,
}

impl CampaignListQuery {
    pub fn new(limit: u32) -> Self {
        Self {
            page: 1,
            limit,
            status: None,
        }
    }

    pub fn with_status(mut self, status: Option<CampaignStatus>) -> Self {
        self.status = status;
        self
    }

    pub fn with_page(mut self, page: u32) -> Self {
        self.page = page.max(1);
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CampaignPage {
    #[serde(default)]
    pub campaigns: Vec<Campaign>,
    #[serde(default, rename = "totalPages", alias = "total_pages")]
    pub total_pages: u32,
    #[serde(default, rename = "totalItems", alias = "total_items")]
    pub total_items: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CampaignDetailQuery {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub recipient_status: Option<RecipientStatus>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum AudienceSelection {
    /// A saved audience; template variables are bound once for everyone.
    Audience { audience_id: String },
    /// Recipients from a validated CSV upload, each with its own variables.
    Csv { recipients: Vec<ValidRow> },
}

impl AudienceSelection {
    pub fn recipient_count(&self) -> Option<usize> {
        match self {
            AudienceSelection::Audience { .. } => None,
            AudienceSelection::Csv { recipients } => Some(recipients.len()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum Schedule {
    Now,
    At { scheduled_at: DateTime<Utc> },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct LaunchCampaignPayload {
    #[validate(length(min = 1, max = 100))]
    pub name: String,
    #[validate(length(min = 1))]
    pub template_id: String,
    pub audience: AudienceSelection,
    pub schedule: Schedule,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variables: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LaunchCampaignResponse {
    pub campaign: Campaign,
}
