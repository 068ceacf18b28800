//! AdopteUnMec dating-site backend (api.adopteunmec.com).
//!
//! JSON API where every call is a POST to `api.php` with the command in
//! the query string. The server signals a dropped session with error
//! codes `0.0.2` / `1.1.1`; such a call transparently re-logs in once
//! and retries once before reporting an authentication failure.

use crate::backends::Backend;
use crate::browser::{HttpTransport, Transport, TransportRequest};
use crate::capabilities::{ChatMessage, ChatProvider, Person};
use crate::config::{CredentialsConfig, HttpConfig};
use crate::error::AdapterError;
use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::sync::{Arc, Mutex};
use url::Url;

const BACKEND_NAME: &str = "adopteunmec";
const API_URL: &str = "https://api.adopteunmec.com/api.php";
const API_KEY: &str = "fb0123456789abcd";

/// Error codes the server uses for an invalid or expired session.
const SESSION_ERROR_CODES: &[&str] = &["0.0.2", "1.1.1"];

/// Identity of the logged-in user, learned at login time.
#[derive(Debug, Default, Clone)]
struct Identity {
    id: i64,
    name: String,
}

#[derive(Debug, Default)]
struct Session {
    logged_in: bool,
    identity: Identity,
}

/// Dating-site backend exposing the chat capability.
pub struct AdopteunmecBackend {
    transport: Arc<dyn Transport>,
    username: String,
    password: String,
    session: Mutex<Session>,
}

impl AdopteunmecBackend {
    pub fn new(http: &HttpConfig, config: &CredentialsConfig) -> Result<Self, AdapterError> {
        let transport = HttpTransport::new(
            &http.user_agent,
            http.timeout_secs,
            http.delay_between_requests_sec,
        )?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &CredentialsConfig) -> Self {
        Self {
            transport,
            username: config.username.clone(),
            password: config.password.clone(),
            session: Mutex::new(Session::default()),
        }
    }

    fn api_url(command: &str, action: &str, param: &str) -> Result<String, AdapterError> {
        let mut url =
            Url::parse(API_URL).map_err(|e| AdapterError::InvalidUrl(e.to_string()))?;
        url.query_pairs_mut()
            .append_pair("S", API_KEY)
            .append_pair("C", command)
            .append_pair("A", action)
            .append_pair("P", param)
            .append_pair("O", "json");
        Ok(url.to_string())
    }

    /// One raw API POST, decoded to JSON.
    async fn call(
        &self,
        command: &str,
        action: &str,
        param: &str,
        data: Vec<(String, String)>,
    ) -> Result<JsonValue, AdapterError> {
        let url = Self::api_url(command, action, param)?;
        let response = self
            .transport
            .execute(&TransportRequest::post_form(url.clone(), data))
            .await?;

        match response.status {
            200..=299 => {}
            status => {
                return Err(AdapterError::Status { status, url });
            }
        }

        serde_json::from_slice(&response.body)
            .map_err(|e| AdapterError::Parse(format!("API response: {}", e)))
    }

    fn session_expired(value: &JsonValue) -> bool {
        value["errors"]
            .as_array()
            .and_then(|errors| errors.first())
            .and_then(JsonValue::as_str)
            .is_some_and(|code| SESSION_ERROR_CODES.contains(&code))
    }

    fn check_errors(value: JsonValue) -> Result<JsonValue, AdapterError> {
        let has_errors = value["errors"]
            .as_array()
            .is_some_and(|errors| !errors.is_empty());
        if has_errors {
            return Err(AdapterError::Parse(format!(
                "API error: {}",
                value["errors"]
            )));
        }
        Ok(value)
    }

    /// Authenticates with the stored credentials. No-op when a valid
    /// session already exists.
    async fn login(&self) -> Result<(), AdapterError> {
        if self.session.lock().expect("session lock poisoned").logged_in {
            return Ok(());
        }

        let value = self
            .call(
                "me",
                "login",
                "",
                vec![
                    ("login".to_string(), self.username.clone()),
                    ("pass".to_string(), self.password.clone()),
                ],
            )
            .await?;

        let has_errors = value["errors"]
            .as_array()
            .is_some_and(|errors| !errors.is_empty());
        if has_errors {
            return Err(AdapterError::Authentication(
                "credentials rejected".to_string(),
            ));
        }

        let me = &value["result"]["me"];
        let identity = Identity {
            id: me["id"].as_i64().unwrap_or_default(),
            name: me["pseudo"].as_str().unwrap_or_default().to_string(),
        };

        let mut session = self.session.lock().expect("session lock poisoned");
        session.identity = identity;
        session.logged_in = true;
        Ok(())
    }

    /// Authenticated API call: login guard up front, then at most one
    /// transparent re-login when the server dropped the session.
    async fn api_request(
        &self,
        command: &str,
        action: &str,
        param: &str,
        data: Vec<(String, String)>,
    ) -> Result<JsonValue, AdapterError> {
        self.login().await?;

        let value = self.call(command, action, param, data.clone()).await?;
        if !Self::session_expired(&value) {
            return Self::check_errors(value);
        }

        self.session.lock().expect("session lock poisoned").logged_in = false;
        self.login().await?;

        let value = self.call(command, action, param, data).await?;
        if Self::session_expired(&value) {
            return Err(AdapterError::Authentication(
                "session rejected after re-login".to_string(),
            ));
        }
        Self::check_errors(value)
    }

    fn my_id(&self) -> i64 {
        self.session
            .lock()
            .expect("session lock poisoned")
            .identity
            .id
    }
}

impl Backend for AdopteunmecBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_chat(&self) -> Option<&dyn ChatProvider> {
        Some(self)
    }
}

#[async_trait]
impl ChatProvider for AdopteunmecBackend {
    async fn iter_contacts(&self) -> Result<Vec<Person>, AdapterError> {
        let value = self
            .api_request("contact", "list", "", Vec::new())
            .await?;

        let contacts = value["result"]["contacts"]
            .as_array()
            .ok_or_else(|| AdapterError::Extraction("contacts list".to_string()))?;

        let mut persons = Vec::new();
        for contact in contacts {
            let id = contact["id"]
                .as_i64()
                .ok_or_else(|| AdapterError::Extraction("contact id".to_string()))?;

            let mut person = Person::new(id.to_string(), BACKEND_NAME);
            person.name = contact["pseudo"]
                .as_str()
                .map(str::to_string)
                .into();
            person.short_description = contact["announce"]
                .as_str()
                .map(str::to_string)
                .filter(|text| !text.is_empty())
                .into();
            persons.push(person);
        }

        Ok(persons)
    }

    async fn iter_messages(&self, contact_id: &str) -> Result<Vec<ChatMessage>, AdapterError> {
        let value = self
            .api_request("message", "list", contact_id, Vec::new())
            .await?;

        let messages = value["result"]["messages"]
            .as_array()
            .ok_or_else(|| AdapterError::Extraction("messages list".to_string()))?;

        let my_id = self.my_id();
        let mut out = Vec::new();
        for message in messages {
            let id = message["id"]
                .as_str()
                .map(str::to_string)
                .or_else(|| message["id"].as_i64().map(|n| n.to_string()))
                .ok_or_else(|| AdapterError::Extraction("message id".to_string()))?;

            let mut chat = ChatMessage::new(id, BACKEND_NAME);
            chat.contact.set(contact_id.to_string());
            chat.content = message["message"]
                .as_str()
                .map(str::to_string)
                .into();
            chat.date = message["date"].as_str().map(str::to_string).into();
            chat.outgoing
                .set(message["from"].as_i64() == Some(my_id));
            out.push(chat);
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::testing::{ScriptedTransport, page};

    const LOGIN_OK: &str = r#"{
        "errors": [],
        "result": {"me": {"id": 4242, "pseudo": "testuser", "sex": 1}}
    }"#;

    const SESSION_EXPIRED: &str = r#"{"errors": ["0.0.2"], "result": null}"#;

    const MESSAGES_OK: &str = r#"{
        "errors": [],
        "result": {"messages": [
            {"id": "m1", "from": 51, "to": 4242, "message": "salut", "date": "2026-08-01 10:00"},
            {"id": "m2", "from": 4242, "to": 51, "message": "hello", "date": "2026-08-01 10:05"}
        ]}
    }"#;

    const CONTACTS_OK: &str = r#"{
        "errors": [],
        "result": {"contacts": [
            {"id": 51, "pseudo": "alice", "announce": "bonjour"},
            {"id": 52, "pseudo": "bob", "announce": ""}
        ]}
    }"#;

    fn credentials() -> CredentialsConfig {
        CredentialsConfig {
            enabled: true,
            username: "user@example.com".to_string(),
            password: "secret".to_string(),
        }
    }

    fn login_url() -> String {
        AdopteunmecBackend::api_url("me", "login", "").unwrap()
    }

    fn messages_url(contact: &str) -> String {
        AdopteunmecBackend::api_url("message", "list", contact).unwrap()
    }

    fn contacts_url() -> String {
        AdopteunmecBackend::api_url("contact", "list", "").unwrap()
    }

    #[tokio::test]
    async fn test_iter_contacts_logs_in_first() {
        let transport = ScriptedTransport::new()
            .on(&login_url(), page(&login_url(), LOGIN_OK))
            .on(&contacts_url(), page(&contacts_url(), CONTACTS_OK));
        let transport = Arc::new(transport);
        let backend = AdopteunmecBackend::with_transport(transport.clone(), &credentials());

        let contacts = backend.iter_contacts().await.unwrap();
        assert_eq!(contacts.len(), 2);
        assert_eq!(contacts[0].name.value().unwrap(), "alice");
        assert!(contacts[1].short_description.is_empty());
        assert_eq!(transport.request_count("A=login"), 1);

        // Second call reuses the session.
        backend.iter_contacts().await.unwrap();
        assert_eq!(transport.request_count("A=login"), 1);
    }

    #[tokio::test]
    async fn test_dropped_session_relogs_in_once_and_retries() {
        let url = messages_url("51");
        let transport = ScriptedTransport::new()
            .on(&login_url(), page(&login_url(), LOGIN_OK))
            .on(&url, page(&url, SESSION_EXPIRED))
            .on(&url, page(&url, MESSAGES_OK));
        let transport = Arc::new(transport);
        let backend = AdopteunmecBackend::with_transport(transport.clone(), &credentials());

        let messages = backend.iter_messages("51").await.unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(*messages[0].outgoing.value().unwrap(), false);
        assert_eq!(*messages[1].outgoing.value().unwrap(), true);

        // Guard login plus exactly one re-login after the expiry code.
        assert_eq!(transport.request_count("A=login"), 2);
        assert_eq!(transport.request_count("C=message"), 2);
    }

    #[tokio::test]
    async fn test_persistent_session_rejection_stops_after_one_relogin() {
        let url = messages_url("51");
        let transport = ScriptedTransport::new()
            .on(&login_url(), page(&login_url(), LOGIN_OK))
            .on(&url, page(&url, SESSION_EXPIRED));
        let transport = Arc::new(transport);
        let backend = AdopteunmecBackend::with_transport(transport.clone(), &credentials());

        let err = backend.iter_messages("51").await.unwrap_err();
        assert!(matches!(err, AdapterError::Authentication(_)));
        assert_eq!(transport.request_count("A=login"), 2);
        assert_eq!(transport.request_count("C=message"), 2);
    }

    #[tokio::test]
    async fn test_rejected_credentials() {
        let rejected = r#"{"errors": ["1.2.1"], "result": null}"#;
        let transport =
            ScriptedTransport::new().on(&login_url(), page(&login_url(), rejected));
        let backend = AdopteunmecBackend::with_transport(Arc::new(transport), &credentials());

        let err = backend.iter_contacts().await.unwrap_err();
        assert!(matches!(err, AdapterError::Authentication(_)));
    }
}
