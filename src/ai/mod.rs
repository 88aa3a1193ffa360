pub mod claude;
pub mod groq;
pub mod prompt;

use async_trait::async_trait;

use crate::calendar::Meeting;
use crate::error::{RecapError, Result};
use crate::github::{ActivityMap, Window};

/// A text-generation backend able to turn a rendered prompt into a
/// report body. The pipeline depends only on this capability, never on
/// a concrete provider.
#[async_trait]
pub trait ReportClient: Send + Sync + std::fmt::Debug {
    /// Send the prompt to the backend and return the generated report
    async fn generate_report(&self, prompt: &str) -> Result<String>;
}

/// Provider selection and credentials for the report backend
#[derive(Debug, Clone)]
pub struct AiSettings {
    /// Provider discriminator ("groq", "claude")
    pub provider: String,
    /// API key for the selected provider
    pub api_key: String,
    /// Model override; each provider has its own default
    pub model: Option<String>,
}

/// Resolve the provider discriminator to a concrete backend.
///
/// An unrecognized discriminator is a configuration error, raised before
/// any client is constructed or any network activity occurs.
pub fn create_report_client(settings: &AiSettings) -> Result<Box<dyn ReportClient>> {
    match settings.provider.as_str() {
        "groq" => {
            let mut client = groq::GroqClient::new(settings.api_key.clone())?;
            if let Some(model) = &settings.model {
                client = client.with_model(model.clone());
            }
            Ok(Box::new(client))
        }
        "claude" => {
            let mut client = claude::ClaudeClient::new(settings.api_key.clone())?;
            if let Some(model) = &settings.model {
                client = client.with_model(model.clone());
            }
            Ok(Box::new(client))
        }
        other => Err(RecapError::config(format!(
            "unsupported AI provider: {}",
            other
        ))),
    }
}

/// Render the prompt from the collected activity and delegate to the
/// report backend. The backend's output is returned verbatim.
pub async fn generate_ai_report(
    activity: &ActivityMap,
    username: &str,
    window: &Window,
    meetings: &[Meeting],
    template: &str,
    client: &dyn ReportClient,
) -> Result<String> {
    let prompt = prompt::build_report_prompt(activity, username, window, meetings, template)?;
    client.generate_report(&prompt).await
}
