use serde::Serialize;

use crate::models::campaign::{CampaignStatus, RecipientStatus};

/// Badge color used when rendering a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StatusColor {
    Gray,
    Blue,
    Green,
    Yellow,
    Purple,
    Red,
}

impl StatusColor {
    /// ANSI SGR foreground code for terminal output.
    pub fn ansi_code(&self) -> u8 {
        match self {
            StatusColor::Gray => 90,
            StatusColor::Blue => 34,
            StatusColor::Green => 32,
            StatusColor::Yellow => 33,
            StatusColor::Purple => 35,
            StatusColor::Red => 31,
        }
    }

    pub fn paint(&self, text: &str) -> String {
        format!("\x1b[{}m{}\x1b[0m", self.ansi_code(), text)
    }
}

pub fn campaign_status_color(status: &CampaignStatus) -> StatusColor {
    match status {
        CampaignStatus::Draft => StatusColor::Gray,
        CampaignStatus::Scheduled => StatusColor::Blue,
        CampaignStatus::Active => StatusColor::Green,
        CampaignStatus::Completed => StatusColor::Purple,
        CampaignStatus::Failed => StatusColor::Red,
        CampaignStatus::Unknown => StatusColor::Gray,
    }
}

pub fn recipient_status_color(status: &RecipientStatus) -> StatusColor {
    match status {
        RecipientStatus::Pending => StatusColor::Yellow,
        RecipientStatus::Sent => StatusColor::Blue,
        RecipientStatus::Delivered => StatusColor::Green,
        RecipientStatus::Read => StatusColor::Purple,
        RecipientStatus::Failed => StatusColor::Red,
        RecipientStatus::Unknown => StatusColor::Gray,
    }
}
