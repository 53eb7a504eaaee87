// src/notify/mod.rs

pub mod email;
pub mod sms;

use std::fmt;

use serde::Serialize;
use tracing::{info, warn};

use crate::error::{DashboardError, Result};

pub use email::{SmtpConfig, SmtpEmail};
pub use sms::{normalize_phone, TwilioConfig, TwilioSms};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Channel {
    Sms,
    Email,
}

impl Channel {
    pub fn as_str(&self) -> &str {
        match self {
            Channel::Sms => "SMS",
            Channel::Email => "email",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One way of delivering an alert. Each send stands alone.
pub trait AlertChannel {
    fn channel(&self) -> Channel;

    fn send(&self, destination: &str, subject: &str, message: &str) -> Result<()>;
}

/// Contact details typed into the alert form.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Contact {
    pub phone: Option<String>,
    pub email: Option<String>,
}

impl Contact {
    pub fn new(phone: Option<String>, email: Option<String>) -> Self {
        let keep = |s: Option<String>| s.filter(|v| !v.trim().is_empty());
        Self {
            phone: keep(phone),
            email: keep(email),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.phone.is_none() && self.email.is_none()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub subject: String,
    pub message: String,
}

impl Alert {
    pub fn test_alert(country: &str) -> Self {
        Self {
            subject: "Test Alert".to_string(),
            message: format!(
                "This is a test alert from the Real-Time Disaster Alert System for {}.",
                country
            ),
        }
    }
}

/// Outcome per channel. `None` means the channel was not requested.
#[derive(Debug, Default)]
pub struct DispatchReport {
    pub sms: Option<Result<()>>,
    pub email: Option<Result<()>>,
}

impl DispatchReport {
    pub fn all_sent(&self) -> bool {
        [&self.sms, &self.email]
            .into_iter()
            .flatten()
            .all(|r| r.is_ok())
    }

    /// Channels that were requested but did not deliver.
    pub fn failures(&self) -> Vec<(Channel, &DashboardError)> {
        [(Channel::Sms, &self.sms), (Channel::Email, &self.email)]
            .into_iter()
            .filter_map(|(channel, outcome)| match outcome {
                Some(Err(e)) => Some((channel, e)),
                _ => None,
            })
            .collect()
    }
}

fn send_on(channel: &dyn AlertChannel, destination: &str, alert: &Alert) -> Result<()> {
    let result = channel.send(destination, &alert.subject, &alert.message);
    match &result {
        Ok(()) => info!(channel = %channel.channel(), destination, "alert sent"),
        Err(e) => warn!(channel = %channel.channel(), destination, error = %e, "alert failed"),
    }
    result
}

/// Send `alert` on every channel the contact asked for. A failing channel
/// never stops the other one.
pub fn dispatch(
    sms: &dyn AlertChannel,
    email: &dyn AlertChannel,
    contact: &Contact,
    alert: &Alert,
) -> Result<DispatchReport> {
    if contact.is_empty() {
        return Err(DashboardError::NoContact);
    }

    Ok(DispatchReport {
        sms: contact.phone.as_deref().map(|to| send_on(sms, to, alert)),
        email: contact.email.as_deref().map(|to| send_on(email, to, alert)),
    })
}

/// Stand-in for a channel whose credentials are missing.
pub struct Unconfigured(pub Channel);

impl AlertChannel for Unconfigured {
    fn channel(&self) -> Channel {
        self.0
    }

    fn send(&self, _destination: &str, _subject: &str, _message: &str) -> Result<()> {
        Err(DashboardError::NotificationFailed {
            channel: self.0,
            reason: "not configured".to_string(),
        })
    }
}
