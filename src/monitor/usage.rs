use serde::Serialize;

use crate::translate::deepl::DeepLUsage;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AlertLevel {
    High,
    Critical,
}

impl AlertLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            AlertLevel::High => "HIGH",
            AlertLevel::Critical => "CRITICAL",
        }
    }
}

/// Fractions of the character limit that trigger an alert
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Thresholds {
    pub high: f64,
    pub critical: f64,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            high: 0.85,
            critical: 0.95,
        }
    }
}

impl Thresholds {
    pub fn classify(&self, ratio: f64) -> Option<AlertLevel> {
        if ratio >= self.critical {
            Some(AlertLevel::Critical)
        } else if ratio >= self.high {
            Some(AlertLevel::High)
        } else {
            None
        }
    }
}

/// Character usage summary for the current billing period
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UsageReport {
    pub used: u64,
    pub limit: u64,
    pub remaining: u64,
    /// Rounded to the nearest whole percent
    pub percentage: u32,
    pub end_time: Option<String>,
}

impl UsageReport {
    pub fn from_usage(usage: &DeepLUsage) -> Self {
        let ratio = usage_ratio(usage.character_count, usage.character_limit);
        Self {
            used: usage.character_count,
            limit: usage.character_limit,
            remaining: usage.character_limit.saturating_sub(usage.character_count),
            percentage: (ratio * 100.0).round() as u32,
            end_time: usage.end_time.clone(),
        }
    }

    pub fn ratio(&self) -> f64 {
        usage_ratio(self.used, self.limit)
    }
}

/// A zero limit counts as no usage
fn usage_ratio(used: u64, limit: u64) -> f64 {
    if limit == 0 {
        0.0
    } else {
        used as f64 / limit as f64
    }
}
