use crate::error::Result;
use crate::models::template::Template;
use crate::services::api_client::ApiClient;

#[derive(Clone)]
pub struct TemplateService {
    api: ApiClient,
}

impl TemplateService {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    pub async fn list_templates(&self) -> Result<Vec<Template>> {
        let response = self.api.get(&["templates"])?.send().await?;
        ApiClient::decode(response).await
    }

    pub async fn get_template(&self, id: &str) -> Result<Template> {
        let response = self.api.get(&["template", id])?.send().await?;
        ApiClient::decode(response).await
    }
}
