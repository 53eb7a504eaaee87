use once_cell::sync::Lazy;
use regex::Regex;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::{AlertChannel, Channel};
use crate::error::{DashboardError, Result};

pub const DEFAULT_TWILIO_API_BASE: &str = "https://api.twilio.com";

static INTERNATIONAL_PHONE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\+[1-9][0-9]{6,14}$").unwrap());

fn default_api_base() -> String {
    DEFAULT_TWILIO_API_BASE.to_string()
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TwilioConfig {
    pub account_sid: String,
    pub auth_token: String,
    /// Sender number, international format.
    pub from_number: String,
    #[serde(default = "default_api_base")]
    pub api_base: String,
}

/// Strip common separators and check for `+<country code><number>`.
pub fn normalize_phone(raw: &str) -> Option<String> {
    let compact: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')' | '.'))
        .collect();
    INTERNATIONAL_PHONE.is_match(&compact).then_some(compact)
}

/// SMS through the Twilio Messages REST endpoint.
pub struct TwilioSms {
    client: Client,
    config: TwilioConfig,
}

impl TwilioSms {
    pub fn new(client: Client, config: TwilioConfig) -> Self {
        Self { client, config }
    }

    fn messages_url(&self) -> String {
        format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.config.api_base.trim_end_matches('/'),
            self.config.account_sid
        )
    }
}

impl AlertChannel for TwilioSms {
    fn channel(&self) -> Channel {
        Channel::Sms
    }

    fn send(&self, destination: &str, _subject: &str, message: &str) -> Result<()> {
        let to = normalize_phone(destination).ok_or_else(|| DashboardError::InvalidDestination {
            channel: Channel::Sms,
            destination: destination.to_string(),
        })?;
        let failed = |reason: String| DashboardError::NotificationFailed {
            channel: Channel::Sms,
            reason,
        };

        let url = self.messages_url();
        debug!(%url, %to, "posting SMS");
        self.client
            .post(&url)
            .basic_auth(&self.config.account_sid, Some(&self.config.auth_token))
            .form(&[
                ("To", to.as_str()),
                ("From", self.config.from_number.as_str()),
                ("Body", message),
            ])
            .send()
            .map_err(|e| failed(format!("POST failed: {}", e)))?
            .error_for_status()
            .map_err(|e| failed(format!("Twilio rejected the message: {}", e)))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    fn config(api_base: String) -> TwilioConfig {
        TwilioConfig {
            account_sid: "AC123".into(),
            auth_token: "secret".into(),
            from_number: "+15005550006".into(),
            api_base,
        }
    }

    #[test]
    fn phone_numbers_need_country_code() {
        assert_eq!(normalize_phone("+91 98765-43210").as_deref(), Some("+919876543210"));
        assert_eq!(normalize_phone("+1 (415) 555.0100").as_deref(), Some("+14155550100"));
        assert_eq!(normalize_phone("9876543210"), None);
        assert_eq!(normalize_phone("+0123456789"), None);
        assert_eq!(normalize_phone("+91abc"), None);
    }

    #[test]
    fn posts_message_form() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", Matcher::Regex("^Basic ".into()))
            .match_body(Matcher::AllOf(vec![
                Matcher::UrlEncoded("To".into(), "+919876543210".into()),
                Matcher::UrlEncoded("From".into(), "+15005550006".into()),
                Matcher::UrlEncoded("Body".into(), "hello".into()),
            ]))
            .with_status(201)
            .with_body("{}")
            .create();

        let sms = TwilioSms::new(Client::new(), config(server.url()));
        sms.send("+91 98765 43210", "ignored", "hello").unwrap();
        mock.assert();
    }

    #[test]
    fn rejected_message_is_notification_failure() {
        let mut server = mockito::Server::new();
        let _mock = server
            .mock("POST", Matcher::Any)
            .with_status(400)
            .with_body(r#"{"message":"bad number"}"#)
            .create();

        let sms = TwilioSms::new(Client::new(), config(server.url()));
        let err = sms.send("+919876543210", "", "hello").unwrap_err();
        assert!(matches!(
            err,
            DashboardError::NotificationFailed { channel: Channel::Sms, .. }
        ));
    }

    #[test]
    fn invalid_destination_is_not_sent() {
        let sms = TwilioSms::new(Client::new(), config("http://127.0.0.1:1".into()));
        let err = sms.send("12345", "", "hello").unwrap_err();
        assert!(matches!(err, DashboardError::InvalidDestination { .. }));
    }
}
