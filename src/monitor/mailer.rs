use async_trait::async_trait;
use chrono::DateTime;
use lettre::message::header::ContentType;
use lettre::message::Mailbox;
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Message, SmtpTransport, Transport};
use tracing::info;

use super::usage::{AlertLevel, UsageReport};
use super::MonitorError;
use crate::config_manager::{non_empty, SmtpConfig};

/// Rendered alert ready to be sent
#[derive(Debug, Clone, PartialEq)]
pub struct AlertEmail {
    pub subject: String,
    pub html: String,
}

#[async_trait]
pub trait AlertMailer: Send + Sync {
    async fn send(&self, alert: &AlertEmail) -> Result<(), MonitorError>;
}

/// Sends alerts through an authenticated SMTP relay
pub struct SmtpMailer {
    relay: String,
    username: String,
    password: String,
    from: String,
    to: Vec<String>,
}

impl SmtpMailer {
    /// `None` when username, password or recipient are missing
    pub fn from_config(config: &SmtpConfig) -> Option<Self> {
        let username = non_empty(&config.username)?;
        let password = non_empty(&config.password)?;
        let to: Vec<String> = config
            .to
            .split(',')
            .filter_map(non_empty)
            .map(|s| s.to_string())
            .collect();
        if to.is_empty() {
            return None;
        }

        Some(Self {
            relay: config.relay.clone(),
            username: username.to_string(),
            password: password.to_string(),
            from: non_empty(&config.from).unwrap_or(username).to_string(),
            to,
        })
    }

    fn build_message(&self, alert: &AlertEmail) -> Result<Message, MonitorError> {
        let mut builder = Message::builder()
            .from(self.from.parse::<Mailbox>().map_err(mail_error)?)
            .subject(alert.subject.clone())
            .header(ContentType::TEXT_HTML);
        for recipient in &self.to {
            builder = builder.to(recipient.parse::<Mailbox>().map_err(mail_error)?);
        }
        builder.body(alert.html.clone()).map_err(mail_error)
    }
}

fn mail_error<E: std::fmt::Display>(e: E) -> MonitorError {
    MonitorError::Mail(e.to_string())
}

#[async_trait]
impl AlertMailer for SmtpMailer {
    async fn send(&self, alert: &AlertEmail) -> Result<(), MonitorError> {
        let message = self.build_message(alert)?;
        let transport = SmtpTransport::relay(&self.relay)
            .map_err(mail_error)?
            .credentials(Credentials::new(self.username.clone(), self.password.clone()))
            .build();

        // lettre's SmtpTransport blocks
        tokio::task::spawn_blocking(move || transport.send(&message))
            .await
            .map_err(mail_error)?
            .map_err(mail_error)?;

        info!("Alert email sent: {}", alert.subject);
        Ok(())
    }
}

/// 1234567 -> "1,234,567"
pub fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(ch);
    }
    out
}

fn billing_end(end_time: Option<&str>) -> String {
    match end_time {
        Some(raw) => DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.format("%d/%m/%Y").to_string())
            .unwrap_or_else(|_| raw.to_string()),
        None => "n/a".to_string(),
    }
}

pub fn compose_alert(report: &UsageReport, level: AlertLevel) -> AlertEmail {
    let critical = level == AlertLevel::Critical;
    let (accent, panel, heading_color, icon) = if critical {
        ("#ff4444", "#ffebee", "#c62828", "🚨")
    } else {
        ("#ff9800", "#fff3e0", "#e65100", "⚠️")
    };

    let subject = if critical {
        "🚨 CRITICAL: DeepL characters almost exhausted".to_string()
    } else {
        "⚠️ WARNING: DeepL characters running low".to_string()
    };

    let (action_title, action_text) = if critical {
        (
            "URGENT ACTION REQUIRED",
            "Characters are almost exhausted! Upgrade or replace the DeepL API key as soon as possible to avoid service interruptions.",
        )
    } else {
        (
            "Recommended action",
            "Keep an eye on usage and consider upgrading the DeepL API key if needed.",
        )
    };

    let html = format!(
        r#"<div style="font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;">
  <div style="background: {accent}; color: white; padding: 20px; border-radius: 8px 8px 0 0;">
    <h1 style="margin: 0; font-size: 24px;">{icon} DeepL API monitoring</h1>
  </div>
  <div style="background: #f9f9f9; padding: 20px; border-radius: 0 0 8px 8px;">
    <h2 style="color: #333; margin-top: 0;">Current usage</h2>
    <div style="background: white; padding: 15px; border-radius: 6px; margin: 15px 0;">
      <table style="width: 100%; border-collapse: collapse;">
        <tr><td style="padding: 8px 0; font-weight: bold;">Characters used:</td><td style="padding: 8px 0; text-align: right;">{used}</td></tr>
        <tr><td style="padding: 8px 0; font-weight: bold;">Monthly limit:</td><td style="padding: 8px 0; text-align: right;">{limit}</td></tr>
        <tr><td style="padding: 8px 0; font-weight: bold;">Characters remaining:</td><td style="padding: 8px 0; text-align: right; color: {accent};">{remaining}</td></tr>
        <tr><td style="padding: 8px 0; font-weight: bold;">Usage:</td><td style="padding: 8px 0; text-align: right; font-size: 18px; color: {accent};">{percentage}%</td></tr>
      </table>
    </div>
    <div style="background: {panel}; padding: 15px; border-radius: 6px; border-left: 4px solid {accent};">
      <h3 style="margin-top: 0; color: {heading_color};">{action_title}</h3>
      <p style="margin-bottom: 0;">{action_text}</p>
    </div>
    <p style="font-size: 12px; color: #666; margin-top: 20px;">
      Current billing period ends on {end}<br>
      This alert was generated automatically by the translation proxy usage monitor.
    </p>
  </div>
</div>"#,
        accent = accent,
        panel = panel,
        heading_color = heading_color,
        icon = icon,
        used = group_thousands(report.used),
        limit = group_thousands(report.limit),
        remaining = group_thousands(report.remaining),
        percentage = report.percentage,
        action_title = action_title,
        action_text = action_text,
        end = billing_end(report.end_time.as_deref()),
    );

    AlertEmail { subject, html }
}
