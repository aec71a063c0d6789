pub mod main;
pub mod system;
pub mod providers;
pub mod analytics;
pub mod monitor;
pub mod utils;

pub use main::{non_empty, Config};
pub use system::SystemConfig;
pub use providers::{DeepLConfig, GroqConfig, HuggingFaceConfig, ProvidersConfig};
pub use analytics::AnalyticsConfig;
pub use monitor::{MonitorConfig, SmtpConfig};
