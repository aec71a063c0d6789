use std::sync::Arc;
use reqwest::Client;

use crate::analytics::{AnalyticsSink, HttpAnalyticsSink, NoopAnalytics};
use crate::config_manager::{non_empty, Config};
use crate::monitor::UsageMonitor;
use crate::translate::{FallbackCoordinator, TranslationProviderFactory};

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub coordinator: Arc<FallbackCoordinator>,
    pub analytics: Arc<dyn AnalyticsSink>,
    pub monitor: Arc<UsageMonitor>,
}

impl AppState {
    pub fn new(config: Config) -> anyhow::Result<Self> {
        let client = Client::builder()
            .timeout(config.system_config.request_timeout())
            .build()?;

        let analytics: Arc<dyn AnalyticsSink> = if config.analytics.enabled && non_empty(&config.analytics.base_url).is_some() {
            Arc::new(HttpAnalyticsSink::new(client.clone(), config.analytics.endpoint()))
        } else {
            Arc::new(NoopAnalytics)
        };

        let providers = TranslationProviderFactory::create_chain(&config.providers, client.clone())?;
        let coordinator = Arc::new(FallbackCoordinator::new(providers, analytics.clone()));
        let monitor = Arc::new(UsageMonitor::from_config(&config, client));

        Ok(Self::from_parts(config, coordinator, analytics, monitor))
    }

    pub fn from_parts(
        config: Config,
        coordinator: Arc<FallbackCoordinator>,
        analytics: Arc<dyn AnalyticsSink>,
        monitor: Arc<UsageMonitor>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            coordinator,
            analytics,
            monitor,
        }
    }
}
