//! Application state shared by the upload and search flows

use crate::auth::{self, AuthContext};
use crate::config::Settings;
use crate::encoding::SelectedFile;
use crate::metrics::Metrics;
use crate::network::{ApiGatewayClient, HttpClient, PhotoApi};
use crate::search::{SearchOrchestrator, SearchOutcome};
use crate::upload::{UploadBatch, UploadOrchestrator};
use crate::view::{Gallery, InputField, StatusMessage, Templates};
use std::sync::Arc;

/// Everything one session needs, constructed once
pub struct AppState {
    /// Global settings
    pub settings: Arc<Settings>,
    /// Credentials for the session
    pub auth: Arc<AuthContext>,
    pub metrics: Arc<Metrics>,
    pub uploads: UploadOrchestrator,
    pub search: SearchOrchestrator,
    pub file_input: InputField,
    pub search_input: InputField,
    pub status: StatusMessage,
    pub gallery: Gallery,
    /// Template renderer
    pub templates: Templates,
}

impl AppState {
    /// Build the HTTP client, auth context and API client from settings
    pub fn new(settings: Settings) -> crate::Result<Self> {
        let client = HttpClient::with_settings(&settings.outgoing)?;
        let provider = auth::provider_from_settings(&settings.auth, &client)?;
        let auth = Arc::new(AuthContext::new(provider, settings.auth.region.clone()));
        let api = Arc::new(ApiGatewayClient::new(
            client,
            auth.clone(),
            &settings.api,
            &settings.auth.signing_service,
        ));
        Self::with_api(settings, auth, api)
    }

    /// Build around any API implementation
    pub fn with_api(
        settings: Settings,
        auth: Arc<AuthContext>,
        api: Arc<dyn PhotoApi>,
    ) -> crate::Result<Self> {
        let metrics = Arc::new(Metrics::new());
        let gallery = Gallery::new();

        let uploads = UploadOrchestrator::new(api.clone(), metrics.clone())
            .with_max_concurrent(settings.upload.max_concurrent);
        let search = SearchOrchestrator::new(api, metrics.clone(), gallery.clone())
            .discard_stale_responses(settings.search.discard_stale_responses);
        let templates = Templates::new(settings.ui.clone())?;

        Ok(Self {
            settings: Arc::new(settings),
            auth,
            metrics,
            uploads,
            search,
            file_input: InputField::new(),
            search_input: InputField::new(),
            status: StatusMessage::new(),
            gallery,
            templates,
        })
    }

    /// Select files and dispatch them
    pub fn upload(&self, files: Vec<SelectedFile>) -> UploadBatch {
        let selection = files
            .iter()
            .map(|f| f.name.as_str())
            .collect::<Vec<_>>()
            .join(", ");
        self.file_input.set(selection);
        self.uploads.submit(files, &self.file_input, &self.status)
    }

    /// Type a query and press search
    pub async fn search(&self, query: &str) -> SearchOutcome {
        self.search_input.set(query);
        self.search.submit(&self.search_input).await
    }

    /// Current gallery as a standalone HTML page
    pub fn render_page(&self) -> crate::Result<String> {
        let status = self.status.text();
        self.templates
            .render_page("Photo album", &self.gallery.elements(), status.as_deref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::AnonymousCredentials;
    use crate::test_support::{MockApi, Reply};
    use serde_json::json;

    fn state(api: MockApi) -> AppState {
        let auth = Arc::new(AuthContext::new(Arc::new(AnonymousCredentials), "us-east-1"));
        AppState::with_api(Settings::default(), auth, Arc::new(api)).unwrap()
    }

    #[tokio::test]
    async fn test_search_renders_page() {
        let api = MockApi::new().reply(
            "cat",
            Reply::Data(json!({"results": [{"url": "a.png"}, {"url": "b.png"}]})),
        );
        let app = state(api);

        assert!(app.search("cat").await.is_rendered());
        assert!(app.search_input.is_empty());

        let html = app.render_page().unwrap();
        assert_eq!(html.matches("<img").count(), 2);
        assert!(html.contains("2 search results for <b>cat</b>"));
    }

    #[tokio::test]
    async fn test_upload_clears_file_input() {
        let app = state(MockApi::new());
        let batch = app.upload(vec![SelectedFile::from_bytes("a.png", vec![1, 2, 3])]);
        assert!(app.file_input.is_empty());
        assert_eq!(app.status.text().as_deref(), Some("Uploading 1 image(s)"));
        assert!(batch.summary().await.all_succeeded());
    }

    #[test]
    fn test_new_requires_pool_for_cognito() {
        assert!(AppState::new(Settings::default()).is_err());
    }
}
