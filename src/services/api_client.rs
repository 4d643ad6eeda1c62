use reqwest::{Client, RequestBuilder, Response};
use serde::de::DeserializeOwned;
use tracing::debug;
use url::Url;

use crate::config::Config;
use crate::dto::campaign_dto::{ApiEnvelope, ApiErrorBody};
use crate::error::{Error, Result};
use crate::models::session::Session;

pub const ORGANIZATION_HEADER: &str = "X-Organization-Id";

/// Shared HTTP plumbing for the backend API: base URL, auth headers and
/// envelope decoding.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session: Session,
}

impl ApiClient {
    pub fn new(config: &Config, session: Session) -> Result<Self> {
        let base_url = Url::parse(&config.api_base_url)?;
        if base_url.cannot_be_a_base() {
            return Err(Error::Config(format!(
                "Invalid value for API_BASE_URL: {}",
                config.api_base_url
            )));
        }
        let client = Client::builder().timeout(config.api_timeout()).build()?;

        Ok(Self {
            client,
            base_url,
            session,
        })
    }

    /// Appends `segments` to the base path. Each segment is percent-encoded,
    /// so an id containing `/`, `?` or `#` stays a single path segment.
    pub fn url(&self, segments: &[&str]) -> Result<Url> {
        if let Some(bad) = segments
            .iter()
            .find(|s| matches!(s.trim(), "" | "." | ".."))
        {
            return Err(Error::BadRequest(format!("Invalid id: {:?}", bad)));
        }
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| Error::Internal(format!("Base URL cannot take a path: {}", self.base_url)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn authorize(&self, builder: RequestBuilder) -> RequestBuilder {
        let mut builder = builder;
        if let Some(token) = self.session.token.as_deref().filter(|t| !t.is_empty()) {
            builder = builder.bearer_auth(token);
        }
        if let Some(org) = &self.session.organization_id {
            builder = builder.header(ORGANIZATION_HEADER, org);
        }
        builder
    }

    pub fn get(&self, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("GET {}", url);
        Ok(self.authorize(self.client.get(url)))
    }

    pub fn post(&self, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("POST {}", url);
        Ok(self.authorize(self.client.post(url)))
    }

    pub fn delete(&self, segments: &[&str]) -> Result<RequestBuilder> {
        let url = self.url(segments)?;
        debug!("DELETE {}", url);
        Ok(self.authorize(self.client.delete(url)))
    }

    /// Unwraps `{ "data": ... }` from a successful response.
    pub async fn decode<T: DeserializeOwned>(response: Response) -> Result<T> {
        let response = Self::check(response).await?;
        let envelope = response.json::<ApiEnvelope<T>>().await?;
        Ok(envelope.data)
    }

    /// Succeeds on any 2xx, ignoring the body.
    pub async fn expect_success(response: Response) -> Result<()> {
        Self::check(response).await?;
        Ok(())
    }

    async fn check(response: Response) -> Result<Response> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        let body = response.text().await.unwrap_or_default();
        let message = serde_json::from_str::<ApiErrorBody>(&body)
            .ok()
            .and_then(ApiErrorBody::text)
            .unwrap_or_else(|| {
                status
                    .canonical_reason()
                    .unwrap_or("Request failed")
                    .to_string()
            });
        Err(Error::from_status(status, message))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> ApiClient {
        ApiClient::new(&Config::with_base_url(base), Session::default()).unwrap()
    }

    #[test]
    fn ids_stay_inside_one_path_segment() {
        let api = client("http://backend.local/api/");

        let url = api.url(&["campaign", "7/permanent"]).unwrap();
        assert_eq!(url.path(), "/api/campaign/7%2Fpermanent");

        let url = api.url(&["campaign", "a?recipient_status=read#x"]).unwrap();
        assert_eq!(url.path(), "/api/campaign/a%3Frecipient_status=read%23x");
        assert_eq!(url.query(), None);
        assert_eq!(url.fragment(), None);
    }

    #[test]
    fn dot_and_empty_ids_are_rejected() {
        let api = client("http://backend.local/api");
        for id in ["", " ", ".", ".."] {
            assert!(matches!(
                api.url(&["campaign", id, "restore"]),
                Err(Error::BadRequest(_))
            ));
        }
        assert_eq!(
            api.url(&["campaigns"]).unwrap().as_str(),
            "http://backend.local/api/campaigns"
        );
    }
}
