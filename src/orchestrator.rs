use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;

use crate::ai::prompt::DEFAULT_TEMPLATE;
use crate::ai::{self, create_report_client, AiSettings, ReportClient};
use crate::calendar::{CalendarClient, Meeting};
use crate::config::Config;
use crate::error::Result;
use crate::github::client::{GitHubClient, SourceControl};
use crate::github::collector::get_user_activity;
use crate::github::{ActivityMap, Window};

/// Orchestrator for the report pipeline: owns the configuration and the
/// collaborators, constructed once and injected into each stage.
pub struct Orchestrator {
    config: Config,
    github: Arc<dyn SourceControl>,
    calendar: Option<CalendarClient>,
    report_client: Box<dyn ReportClient>,
}

impl Orchestrator {
    /// Create a new orchestrator; fails fast on missing credentials or an
    /// unsupported AI provider, before any network activity.
    pub fn new(config: Config) -> Result<Self> {
        let github: Arc<dyn SourceControl> =
            Arc::new(GitHubClient::new(config.github_token()?)?);

        let calendar = if config.calendar_enabled {
            Some(CalendarClient::new(
                config.calendar_token()?,
                config.calendar_id.clone(),
            )?)
        } else {
            None
        };

        let report_client = create_report_client(&AiSettings {
            provider: config.ai_provider.clone(),
            api_key: config.ai_api_key()?,
            model: config.ai_model.clone(),
        })?;

        Ok(Self {
            config,
            github,
            calendar,
            report_client,
        })
    }

    /// The reporting window for this run
    pub fn window(&self) -> Window {
        Window::days_back(self.config.days_to_report)
    }

    /// Collect GitHub activity across all configured repositories
    pub async fn collect_activity(&self, window: &Window) -> ActivityMap {
        info!(
            username = %self.config.github_username,
            repositories = self.config.repositories.len(),
            start = %window.start_date(),
            end = %window.end_date(),
            "collecting GitHub activity"
        );
        get_user_activity(
            Arc::clone(&self.github),
            &self.config.github_username,
            window,
            &self.config.repositories,
        )
        .await
    }

    /// Fetch calendar meetings, or nothing when the calendar is disabled
    pub async fn collect_meetings(&self, window: &Window) -> Result<Vec<Meeting>> {
        match &self.calendar {
            Some(calendar) => calendar.get_events(window).await,
            None => Ok(Vec::new()),
        }
    }

    /// Generate the report and write it under the output directory,
    /// returning the path of the written file.
    pub async fn generate_report(
        &self,
        activity: &ActivityMap,
        meetings: &[Meeting],
        window: &Window,
    ) -> Result<PathBuf> {
        let template = self.load_template()?;
        let report = ai::generate_ai_report(
            activity,
            &self.config.github_username,
            window,
            meetings,
            &template,
            self.report_client.as_ref(),
        )
        .await?;

        self.write_report(&report, window)
    }

    /// Load the prompt template, falling back to the built-in one
    fn load_template(&self) -> Result<String> {
        match &self.config.prompt_template {
            Some(path) => Ok(fs::read_to_string(path)?),
            None => Ok(DEFAULT_TEMPLATE.to_string()),
        }
    }

    /// Report filename, derived from the username and the window end date
    pub fn report_filename(username: &str, window: &Window) -> String {
        format!("weekly_report_{}_{}.html", username, window.end_date())
    }

    fn write_report(&self, report: &str, window: &Window) -> Result<PathBuf> {
        fs::create_dir_all(&self.config.output_dir)?;
        let path = self
            .config
            .output_dir
            .join(Self::report_filename(&self.config.github_username, window));
        fs::write(&path, report)?;
        info!(path = %path.display(), "report written");
        Ok(path)
    }

    /// Get a reference to the config
    pub fn config(&self) -> &Config {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use std::io::Write;
    use tempfile::TempDir;

    fn test_config(output_dir: PathBuf) -> Config {
        Config {
            github_username: "alice".to_string(),
            repositories: vec!["org/alpha".to_string()],
            github_token: Some("ghp_test".to_string()),
            groq_api_key: Some("gsk_test".to_string()),
            calendar_enabled: false,
            output_dir,
            ..Config::default()
        }
    }

    fn test_window() -> Window {
        Window::new(
            Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap(),
            Utc.with_ymd_and_hms(2024, 6, 8, 0, 0, 0).unwrap(),
        )
        .unwrap()
    }

    #[test]
    fn test_report_filename() {
        assert_eq!(
            Orchestrator::report_filename("alice", &test_window()),
            "weekly_report_alice_2024-06-08.html"
        );
    }

    #[test]
    fn test_orchestrator_creation() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(test_config(temp_dir.path().to_path_buf())).unwrap();
        assert!(orchestrator.calendar.is_none());
        assert_eq!(orchestrator.config().github_username, "alice");
    }

    #[test]
    fn test_orchestrator_rejects_unknown_provider() {
        let temp_dir = TempDir::new().unwrap();
        let mut config = test_config(temp_dir.path().to_path_buf());
        config.ai_provider = "watson".to_string();
        config.groq_api_key = None;
        assert!(Orchestrator::new(config).is_err());
    }

    #[test]
    fn test_load_template_default() {
        let temp_dir = TempDir::new().unwrap();
        let orchestrator = Orchestrator::new(test_config(temp_dir.path().to_path_buf())).unwrap();
        let template = orchestrator.load_template().unwrap();
        assert!(template.contains("{username}"));
        assert!(template.contains("{meetings_html}"));
    }

    #[test]
    fn test_load_template_from_file() {
        let temp_dir = TempDir::new().unwrap();
        let template_path = temp_dir.path().join("custom.html");
        let mut file = std::fs::File::create(&template_path).unwrap();
        write!(file, "custom {{username}}").unwrap();

        let mut config = test_config(temp_dir.path().to_path_buf());
        config.prompt_template = Some(template_path);
        let orchestrator = Orchestrator::new(config).unwrap();
        assert_eq!(orchestrator.load_template().unwrap(), "custom {username}");
    }

    #[test]
    fn test_write_report_creates_output_dir() {
        let temp_dir = TempDir::new().unwrap();
        let output_dir = temp_dir.path().join("nested").join("result");
        let orchestrator = Orchestrator::new(test_config(output_dir.clone())).unwrap();

        let path = orchestrator
            .write_report("<html></html>", &test_window())
            .unwrap();

        assert!(path.starts_with(&output_dir));
        assert_eq!(std::fs::read_to_string(path).unwrap(), "<html></html>");
    }
}
