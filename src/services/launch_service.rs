use chrono::{DateTime, Utc};

use crate::dto::campaign_dto::{AudienceSelection, LaunchCampaignPayload, Schedule};
use crate::error::{Error, Result};
use crate::models::template::Template;
use crate::utils::csv::ValidRow;
use crate::utils::validation::{first_arity_mismatch, validate};

/// Collects the launch form selections and turns them into a payload once
/// they are consistent with the chosen template.
#[derive(Debug, Clone, Default)]
pub struct LaunchBuilder {
    name: String,
    audience: Option<AudienceSelection>,
    scheduled_at: Option<DateTime<Utc>>,
    variables: Vec<String>,
}

impl LaunchBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn audience(mut self, audience_id: impl Into<String>) -> Self {
        self.audience = Some(AudienceSelection::Audience {
            audience_id: audience_id.into(),
        });
        self
    }

    pub fn csv_recipients(mut self, recipients: Vec<ValidRow>) -> Self {
        self.audience = Some(AudienceSelection::Csv { recipients });
        self
    }

    pub fn schedule_at(mut self, at: DateTime<Utc>) -> Self {
        self.scheduled_at = Some(at);
        self
    }

    /// Values for the template placeholders, in order. Only used with a saved audience.
    pub fn variables(mut self, values: Vec<String>) -> Self {
        self.variables = values.into_iter().map(|v| v.trim().to_string()).collect();
        self
    }

    pub fn build(self, template: &Template, now: DateTime<Utc>) -> Result<LaunchCampaignPayload> {
        let audience = self
            .audience
            .ok_or_else(|| Error::BadRequest("Select an audience or upload a CSV".to_string()))?;

        let variables = match &audience {
            AudienceSelection::Audience { audience_id } => {
                if audience_id.trim().is_empty() {
                    return Err(Error::BadRequest("Audience id is empty".to_string()));
                }
                if self.variables.len() != template.variable_count {
                    return Err(Error::BadRequest(format!(
                        "Template {} expects {} variables, got {}",
                        template.name,
                        template.variable_count,
                        self.variables.len()
                    )));
                }
                if self.variables.iter().any(|v| v.is_empty()) {
                    return Err(Error::BadRequest(
                        "One or more template variables are empty".to_string(),
                    ));
                }
                self.variables
            }
            AudienceSelection::Csv { recipients } => {
                if recipients.is_empty() {
                    return Err(Error::BadRequest("CSV contains no valid recipients".to_string()));
                }
                if let Some(idx) = first_arity_mismatch(template, recipients) {
                    return Err(Error::BadRequest(format!(
                        "Recipient {} has {} variables, template {} expects {}",
                        recipients[idx].mobile_number,
                        recipients[idx].dynamic_variables.len(),
                        template.name,
                        template.variable_count
                    )));
                }
                Vec::new()
            }
        };

        let schedule = match self.scheduled_at {
            None => Schedule::Now,
            Some(at) if at > now => Schedule::At { scheduled_at: at },
            Some(at) => {
                return Err(Error::BadRequest(format!(
                    "Scheduled time {} is not in the future",
                    at.to_rfc3339()
                )))
            }
        };

        let payload = LaunchCampaignPayload {
            name: self.name.trim().to_string(),
            template_id: template.id.clone(),
            audience,
            schedule,
            variables,
        };
        validate(&payload)?;
        Ok(payload)
    }
}
