//! SES Query API client.
//!
//! SES (API version 2010-12-01) speaks the AWS Query protocol: every call is
//! a signed, form-encoded `POST /` and every response is XML. Only the four
//! actions Maildown needs are exposed.
//!
//! Reference: <https://docs.aws.amazon.com/ses/latest/APIReference/>

use std::time::Duration;

use chrono::Utc;
use quick_xml::events::Event;
use quick_xml::Reader;
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use tracing::debug;
use url::{form_urlencoded, Url};

use super::signing::{sign_form_post, FORM_CONTENT_TYPE};
use crate::backend::OutgoingMessage;
use crate::credentials::Credentials;
use crate::error::{MaildownError, MaildownResult};

const API_VERSION: &str = "2010-12-01";
const CHARSET: &str = "UTF-8";

/// Remote operations offered by SES
#[cfg_attr(test, mockall::automock)]
pub trait SesApi {
    /// Cheap authenticated call used only to prove the credentials work
    fn list_configuration_sets(&self) -> MaildownResult<()>;

    fn list_verified_email_addresses(&self) -> MaildownResult<Vec<String>>;

    /// Ask SES to mail a confirmation link to `email`
    fn verify_email_address(&self, email: &str) -> MaildownResult<()>;

    /// Send the message, returning the SES message id
    fn send_email(&self, message: &OutgoingMessage) -> MaildownResult<String>;
}

/// Builds authenticated SES clients
#[cfg_attr(test, mockall::automock)]
pub trait Connector {
    fn connect(&self, credentials: &Credentials) -> MaildownResult<Box<dyn SesApi>>;
}

/// Connects to the real SES HTTPS endpoint for the credentials' region
#[derive(Debug, Default, Clone, Copy)]
pub struct HttpConnector;

impl Connector for HttpConnector {
    fn connect(&self, credentials: &Credentials) -> MaildownResult<Box<dyn SesApi>> {
        Ok(Box::new(SesClient::new(credentials.clone())?))
    }
}

/// Blocking HTTP client for one SES region
pub struct SesClient {
    http: Client,
    credentials: Credentials,
    endpoint: String,
    host: String,
}

impl SesClient {
    pub fn new(credentials: Credentials) -> MaildownResult<Self> {
        let endpoint = format!("https://email.{}.amazonaws.com/", credentials.region());
        Self::with_endpoint(credentials, endpoint)
    }

    /// Create a client against a custom endpoint (LocalStack and similar)
    pub fn with_endpoint(credentials: Credentials, endpoint: impl Into<String>) -> MaildownResult<Self> {
        let endpoint = endpoint.into();
        let host = host_header(&endpoint)
            .ok_or_else(|| MaildownError::http(format!("Invalid SES endpoint: {}", endpoint)))?;

        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(concat!("maildown/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            http,
            credentials,
            endpoint,
            host,
        })
    }

    fn call(&self, action: &str, params: &[(String, String)]) -> MaildownResult<String> {
        let body = form_urlencoded::Serializer::new(String::new())
            .append_pair("Action", action)
            .append_pair("Version", API_VERSION)
            .extend_pairs(params)
            .finish();
        let signed = sign_form_post(&self.credentials, &self.host, &body, Utc::now());

        debug!(action, endpoint = %self.endpoint, "calling SES");
        let response = self
            .http
            .post(&self.endpoint)
            .header(CONTENT_TYPE, FORM_CONTENT_TYPE)
            .header("x-amz-date", signed.amz_date)
            .header(AUTHORIZATION, signed.authorization)
            .body(body)
            .send()?;

        let status = response.status();
        let text = response.text()?;
        if !status.is_success() {
            let err = parse_error(status.as_u16(), &text);
            debug!(action, %err, "SES returned an error");
            return Err(err);
        }
        Ok(text)
    }
}

impl SesApi for SesClient {
    fn list_configuration_sets(&self) -> MaildownResult<()> {
        let params = [("MaxItems".to_string(), "1".to_string())];
        self.call("ListConfigurationSets", &params).map(|_| ())
    }

    fn list_verified_email_addresses(&self) -> MaildownResult<Vec<String>> {
        let body = self.call("ListVerifiedEmailAddresses", &[])?;
        parse_verified_addresses(&body)
    }

    fn verify_email_address(&self, email: &str) -> MaildownResult<()> {
        let params = [("EmailAddress".to_string(), email.to_string())];
        self.call("VerifyEmailAddress", &params).map(|_| ())
    }

    fn send_email(&self, message: &OutgoingMessage) -> MaildownResult<String> {
        let body = self.call("SendEmail", &send_email_params(message))?;
        parse_message_id(&body)
    }
}

/// Host header value for an endpoint URL, with the port when it is not the default
fn host_header(endpoint: &str) -> Option<String> {
    let url = Url::parse(endpoint).ok()?;
    let host = url.host_str()?;
    Some(match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    })
}

fn send_email_params(message: &OutgoingMessage) -> Vec<(String, String)> {
    let mut params = vec![("Source".to_string(), message.sender.clone())];
    for (i, recipient) in message.recipients.iter().enumerate() {
        params.push((
            format!("Destination.ToAddresses.member.{}", i + 1),
            recipient.clone(),
        ));
    }
    for (field, data) in [
        ("Message.Subject", &message.subject),
        ("Message.Body.Html", &message.html_body),
        ("Message.Body.Text", &message.text_body),
    ] {
        params.push((format!("{}.Data", field), data.clone()));
        params.push((format!("{}.Charset", field), CHARSET.to_string()));
    }
    params
}

fn parse_verified_addresses(body: &str) -> MaildownResult<Vec<String>> {
    element_texts(body, "member", Some("VerifiedEmailAddresses")).map_err(malformed_response)
}

fn parse_message_id(body: &str) -> MaildownResult<String> {
    element_texts(body, "MessageId", None)
        .map_err(malformed_response)?
        .into_iter()
        .next()
        .ok_or_else(|| MaildownError::ProviderRequest {
            code: "MalformedResponse".into(),
            message: "SendEmail response did not contain a MessageId".into(),
            status: 200,
        })
}

/// Turn an SES `<ErrorResponse>` document into an error
fn parse_error(status: u16, body: &str) -> MaildownError {
    let first = |tag: &str| {
        element_texts(body, tag, None)
            .ok()
            .and_then(|texts| texts.into_iter().next())
    };
    MaildownError::ProviderRequest {
        code: first("Code").unwrap_or_else(|| "UnknownError".to_string()),
        message: first("Message").unwrap_or_else(|| format!("HTTP {} from SES", status)),
        status,
    }
}

fn malformed_response(err: quick_xml::Error) -> MaildownError {
    MaildownError::ProviderRequest {
        code: "MalformedResponse".into(),
        message: format!("Invalid XML from SES: {}", err),
        status: 200,
    }
}

/// Decoded text of every `<tag>` element, in document order
///
/// Names are matched without their namespace prefix. With `within`, only
/// elements nested inside a `<within>` element are collected.
fn element_texts(xml: &str, tag: &str, within: Option<&str>) -> Result<Vec<String>, quick_xml::Error> {
    let mut reader = Reader::from_str(xml);
    reader.trim_text(true);

    let mut results = Vec::new();
    let mut current: Option<String> = None;
    let mut parent_depth = 0usize;

    loop {
        match reader.read_event()? {
            Event::Start(e) => {
                let name = e.local_name();
                if within.is_some_and(|parent| name.as_ref() == parent.as_bytes()) {
                    parent_depth += 1;
                } else if name.as_ref() == tag.as_bytes() && (within.is_none() || parent_depth > 0) {
                    current = Some(String::new());
                }
            }
            Event::Text(e) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&e.unescape()?);
                }
            }
            Event::CData(e) => {
                if let Some(text) = current.as_mut() {
                    text.push_str(&String::from_utf8_lossy(&e.into_inner()));
                }
            }
            Event::End(e) => {
                let name = e.local_name();
                if name.as_ref() == tag.as_bytes() {
                    if let Some(text) = current.take() {
                        results.push(text);
                    }
                } else if within.is_some_and(|parent| name.as_ref() == parent.as_bytes()) {
                    parent_depth = parent_depth.saturating_sub(1);
                }
            }
            Event::Eof => break,
            _ => {}
        }
    }
    Ok(results)
}
