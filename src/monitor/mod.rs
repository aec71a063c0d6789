pub mod usage;
pub mod mailer;

pub use usage::{AlertLevel, Thresholds, UsageReport};
pub use mailer::{compose_alert, AlertEmail, AlertMailer, SmtpMailer};

use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config_manager::Config;
use crate::translate::deepl::DeepLProvider;
use crate::translate::error::ProviderError;

#[derive(Debug, Error)]
pub enum MonitorError {
    #[error("DeepL API key for the usage monitor is not configured")]
    MissingApiKey,

    #[error("DeepL usage request failed: {0}")]
    Usage(#[from] ProviderError),

    #[error("alert mail failed: {0}")]
    Mail(String),
}

/// Result of one monitoring run, also the `/api/monitor` response body
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonitorOutcome {
    pub success: bool,
    pub usage: UsageReport,
    pub alert: Option<AlertLevel>,
}

/// Watches DeepL character usage and mails an alert past the thresholds
pub struct UsageMonitor {
    deepl: DeepLProvider,
    api_key: Option<String>,
    thresholds: Thresholds,
    mailer: Option<Arc<dyn AlertMailer>>,
}

impl UsageMonitor {
    pub fn new(
        deepl: DeepLProvider,
        api_key: Option<String>,
        thresholds: Thresholds,
        mailer: Option<Arc<dyn AlertMailer>>,
    ) -> Self {
        Self {
            deepl,
            api_key,
            thresholds,
            mailer,
        }
    }

    pub fn from_config(config: &Config, client: Client) -> Self {
        let mailer = SmtpMailer::from_config(&config.monitor.smtp)
            .map(|m| Arc::new(m) as Arc<dyn AlertMailer>);
        if mailer.is_none() {
            warn!("SMTP not configured, usage alerts will only be logged");
        }

        Self::new(
            DeepLProvider::new(client, &config.providers.deepl),
            config.monitor_deepl_key().map(|s| s.to_string()),
            Thresholds {
                high: config.monitor.high_threshold,
                critical: config.monitor.critical_threshold,
            },
            mailer,
        )
    }

    /// Fetch usage and decide whether it warrants an alert
    pub async fn check_usage(&self) -> Result<(UsageReport, Option<AlertLevel>), MonitorError> {
        let api_key = self.api_key.as_deref().ok_or(MonitorError::MissingApiKey)?;
        let usage = self.deepl.usage(api_key).await?;
        let report = UsageReport::from_usage(&usage);
        let level = self.thresholds.classify(report.ratio());
        Ok((report, level))
    }

    /// Check usage and send the alert mail when a threshold is crossed.
    /// Mail failures are logged and do not fail the run.
    pub async fn run(&self) -> Result<MonitorOutcome, MonitorError> {
        let (report, level) = self.check_usage().await?;
        info!(
            "DeepL usage: {}/{} ({}%)",
            report.used, report.limit, report.percentage
        );

        if let Some(level) = level {
            warn!("DeepL usage alert: {}", level.as_str());
            match &self.mailer {
                Some(mailer) => {
                    let alert = compose_alert(&report, level);
                    if let Err(e) = mailer.send(&alert).await {
                        error!("Error sending alert email: {}", e);
                    }
                }
                None => warn!("No mailer configured, alert {} not sent", level.as_str()),
            }
        }

        Ok(MonitorOutcome {
            success: true,
            usage: report,
            alert: level,
        })
    }
}

/// Run the monitor every `every`, logging failures
pub fn spawn_periodic(monitor: Arc<UsageMonitor>, every: Duration) -> JoinHandle<()> {
    info!("Usage monitor scheduled every {:?}", every);
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        loop {
            ticker.tick().await;
            if let Err(e) = monitor.run().await {
                error!("Scheduled usage check failed: {}", e);
            }
        }
    })
}
