pub mod config;
pub mod dto;
pub mod error;
pub mod models;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::config::Config;
use crate::error::Result;
use crate::models::session::Session;
use crate::services::{
    api_client::ApiClient, campaign_service::CampaignService, session_service::SessionStore,
    template_service::TemplateService,
};

/// Everything an API-calling operation needs, built once at start-up and
/// passed explicitly.
#[derive(Clone)]
pub struct AppContext {
    pub config: Config,
    pub session: Session,
    pub campaign_service: CampaignService,
    pub template_service: TemplateService,
}

impl AppContext {
    pub fn new(config: Config, session: Session) -> Result<Self> {
        let api = ApiClient::new(&config, session.clone())?;
        let campaign_service = CampaignService::new(api.clone());
        let template_service = TemplateService::new(api);

        Ok(Self {
            config,
            session,
            campaign_service,
            template_service,
        })
    }

    /// Loads the persisted session and wires the services against it.
    pub async fn load(config: Config) -> Result<Self> {
        let session = SessionStore::new(&config.session_file).load().await?;
        Self::new(config, session)
    }

    /// Writes the session back so the next run starts signed in.
    pub async fn shutdown(&self) -> Result<()> {
        if self.session.is_authenticated() {
            SessionStore::new(&self.config.session_file)
                .save(&self.session)
                .await?;
        }
        Ok(())
    }

    pub fn campaign_source(&self) -> Arc<dyn services::campaign_service::CampaignSource> {
        Arc::new(self.campaign_service.clone())
    }
}
