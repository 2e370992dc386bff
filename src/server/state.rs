use axum::http::StatusCode;

use crate::messages::Locale;
use crate::providers::{OpenAI, Provider};
use crate::settings::Settings;
use crate::translator::Translator;

/// Immutable per-process state shared by every request.
#[derive(Debug, Clone)]
pub struct ServerState<P: Provider + Clone> {
    pub translator: Translator<P>,
    /// Used when a request does not carry its own key.
    pub default_key: Option<String>,
    pub locale: Locale,
    pub provider_failure_status: StatusCode,
}

impl<P: Provider + Clone> ServerState<P> {
    pub fn new(provider: P, default_key: Option<String>) -> Self {
        Self {
            translator: Translator::new(provider),
            default_key: default_key.filter(|key| !key.trim().is_empty()),
            locale: Locale::default(),
            provider_failure_status: StatusCode::OK,
        }
    }

    pub fn with_locale(mut self, locale: Locale) -> Self {
        self.locale = locale;
        self
    }

    pub fn with_provider_failure_status(mut self, status: StatusCode) -> Self {
        self.provider_failure_status = status;
        self
    }
}

impl ServerState<OpenAI> {
    pub fn from_settings(settings: &Settings, default_key: Option<String>) -> Self {
        let provider = OpenAI::new(String::new())
            .with_model(settings.model.clone())
            .with_base_url(settings.base_url.clone());
        let status =
            StatusCode::from_u16(settings.provider_failure_status).unwrap_or(StatusCode::OK);
        ServerState::new(provider, default_key)
            .with_locale(Locale::from_code(&settings.locale))
            .with_provider_failure_status(status)
    }
}
