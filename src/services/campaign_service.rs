use async_trait::async_trait;
use tracing::info;

use crate::dto::campaign_dto::{
    CampaignDetailQuery, CampaignListQuery, CampaignPage, LaunchCampaignPayload,
    LaunchCampaignResponse,
};
use crate::error::Result;
use crate::models::campaign::{Campaign, CampaignDetails, RecipientStatus};
use crate::services::api_client::ApiClient;
use crate::utils::validation::validate;

/// Read side of the campaign API, as consumed by the watchers.
#[async_trait]
pub trait CampaignSource: Send + Sync {
    async fn list_campaigns(&self, query: &CampaignListQuery) -> Result<CampaignPage>;

    async fn get_campaign(
        &self,
        id: &str,
        recipient_status: Option<RecipientStatus>,
    ) -> Result<CampaignDetails>;
}

#[derive(Clone)]
pub struct CampaignService {
    api: ApiClient,
}

impl CampaignService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_campaigns(&self, query: &CampaignListQuery) -> Result<CampaignPage> {
        let response = self.api.get(&["campaigns"])?.query(query).send().await?;
        ApiClient::decode(response).await
    }

    pub async fn list_deleted_campaigns(&self, query: &CampaignListQuery) -> Result<CampaignPage> {
        let response = self
            .api
            .get(&["campaigns", "deleted"])?
            .query(&[("page", query.page), ("limit", query.limit)])
            .send()
            .await?;
        ApiClient::decode(response).await
    }

    pub async fn get_campaign(
        &self,
        id: &str,
        recipient_status: Option<RecipientStatus>,
    ) -> Result<CampaignDetails> {
        let response = self
            .api
            .get(&["campaign", id])?
            .query(&CampaignDetailQuery { recipient_status })
            .send()
            .await?;
        ApiClient::decode(response).await
    }

    pub async fn launch_campaign(&self, payload: &LaunchCampaignPayload) -> Result<Campaign> {
        validate(payload)?;
        let response = self
            .api
            .post(&["campaign", "launch"])?
            .json(payload)
            .send()
            .await?;
        let launched: LaunchCampaignResponse = ApiClient::decode(response).await?;
        info!(
            campaign_id = %launched.campaign.id,
            status = %launched.campaign.status,
            "Campaign launched"
        );
        Ok(launched.campaign)
    }

    pub async fn soft_delete_campaign(&self, id: &str) -> Result<()> {
        let response = self.api.delete(&["campaign", id])?.send().await?;
        ApiClient::expect_success(response).await?;
        info!(campaign_id = id, "Campaign moved to deleted");
        Ok(())
    }

    pub async fn restore_campaign(&self, id: &str) -> Result<()> {
        let response = self
            .api
            .post(&["campaign", id, "restore"])?
            .send()
            .await?;
        ApiClient::expect_success(response).await?;
        info!(campaign_id = id, "Campaign restored");
        Ok(())
    }

    pub async fn permanently_delete_campaign(&self, id: &str) -> Result<()> {
        let response = self
            .api
            .delete(&["campaign", id, "permanent"])?
            .send()
            .await?;
        ApiClient::expect_success(response).await?;
        info!(campaign_id = id, "Campaign permanently deleted");
        Ok(())
    }
}

#[async_trait]
impl CampaignSource for CampaignService {
    async fn list_campaigns(&self, query: &CampaignListQuery) -> Result<CampaignPage> {
        CampaignService::list_campaigns(self, query).await
    }

    async fn get_campaign(
        &self,
        id: &str,
        recipient_status: Option<RecipientStatus>,
    ) -> Result<CampaignDetails> {
        CampaignService::get_campaign(self, id, recipient_status).await
    }
}
