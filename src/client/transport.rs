//! Transports that carry one action to the backend and bring back its envelope.
//!
//! `Direct` is an ordinary HTTP request/response. `Callback` asks the backend
//! to wrap the envelope in a named function call, the shape a script-tag
//! loader receives when cross-origin reads are blocked. Both speak the same
//! actions and yield the same typed data.

use std::time::Duration;

use chrono::Utc;
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::ClientConfig;
use crate::errors::AppError;
use crate::models::{Action, ActionBody, Envelope};

/// One request to the action endpoint.
#[derive(Debug, Clone)]
pub struct ActionRequest {
    pub action: Action,
    pub params: Vec<(&'static str, String)>,
    /// JSON body, sent as a POST
    pub body: Option<ActionBody>,
}

impl ActionRequest {
    pub fn get(action: Action) -> Self {
        Self {
            action,
            params: Vec::new(),
            body: None,
        }
    }

    pub fn with_params(mut self, params: Vec<(&'static str, String)>) -> Self {
        self.params.extend(params);
        self
    }

    pub fn post(action: Action, mut body: ActionBody) -> Self {
        body.action = action.as_str().to_string();
        Self {
            action,
            params: Vec::new(),
            body: Some(body),
        }
    }

    /// Query string pairs, with a cache-busting `t`.
    fn query(&self) -> Vec<(&'static str, String)> {
        let mut query = vec![
            ("action", self.action.as_str().to_string()),
            ("t", Utc::now().timestamp_millis().to_string()),
        ];
        query.extend(self.params.iter().cloned());
        query
    }
}

/// Plain request/response over HTTP.
#[derive(Debug, Clone)]
pub struct DirectTransport {
    http: Client,
    url: String,
}

impl DirectTransport {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
        }
    }

    async fn exchange(&self, request: &ActionRequest) -> Result<Envelope<Value>, AppError> {
        let response = match &request.body {
            Some(body) => self.http.post(&self.url).json(body).send().await?,
            None => self.http.get(&self.url).query(&request.query()).send().await?,
        };

        let status = response.status();
        let text = response.text().await?;
        match serde_json::from_str::<Envelope<Value>>(&text) {
            Ok(envelope) => Ok(envelope),
            Err(_) if !status.is_success() => Err(AppError::Transport(format!("HTTP {}", status))),
            Err(e) => Err(AppError::Transport(format!("Malformed response: {}", e))),
        }
    }
}

/// Callback-wrapped GET requests with a fixed timeout. Requests with a body
/// are posted as plain JSON under the same timeout.
#[derive(Debug, Clone)]
pub struct CallbackTransport {
    http: Client,
    url: String,
    timeout: Duration,
}

impl CallbackTransport {
    pub fn new(url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            http: Client::new(),
            url: url.into(),
            timeout,
        }
    }

    async fn exchange(&self, request: &ActionRequest) -> Result<Envelope<Value>, AppError> {
        let callback = callback_name();

        let fetch = async {
            let response = match &request.body {
                // Payloads too large for a query string still go as a POST
                Some(body) => self.http.post(&self.url).json(body).send().await?,
                None => {
                    let mut query = request.query();
                    query.push(("callback", callback.clone()));
                    self.http.get(&self.url).query(&query).send().await?
                }
            };
            Ok::<_, AppError>(response.text().await?)
        };
        let text = tokio::time::timeout(self.timeout, fetch)
            .await
            .map_err(|_| AppError::Transport("Callback request timeout".to_string()))??;

        let json = match &request.body {
            Some(_) => text.as_str(),
            None => unwrap_callback(&text, &callback)
                .ok_or_else(|| AppError::Transport("Callback request failed".to_string()))?,
        };
        serde_json::from_str(json)
            .map_err(|e| AppError::Transport(format!("Malformed callback payload: {}", e)))
    }
}

/// A fresh, unique callback function name.
pub fn callback_name() -> String {
    let suffix = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "jsonp_callback_{}_{}",
        Utc::now().timestamp_millis(),
        &suffix[..9]
    )
}

/// Extract the JSON argument from `callback(<json>);`.
pub fn unwrap_callback<'a>(body: &'a str, callback: &str) -> Option<&'a str> {
    let rest = body.trim().strip_prefix(callback)?.strip_prefix('(')?;
    let rest = rest.strip_suffix(';').unwrap_or(rest).trim_end();
    rest.strip_suffix(')')
}

/// The two interchangeable ways of reaching the backend.
#[derive(Debug, Clone)]
pub enum Transport {
    Direct(DirectTransport),
    Callback(CallbackTransport),
}

impl Transport {
    pub fn direct(config: &ClientConfig) -> Self {
        Transport::Direct(DirectTransport::new(&config.backend_url))
    }

    pub fn callback(config: &ClientConfig) -> Self {
        Transport::Callback(CallbackTransport::new(
            &config.backend_url,
            config.callback_timeout,
        ))
    }

    /// Probe with the `test` action: direct when it works, otherwise the
    /// callback transport when that works, otherwise direct anyway.
    pub async fn detect(config: &ClientConfig) -> Self {
        let probe = ActionRequest::get(Action::Test);

        let direct = Self::direct(config);
        match direct.send::<Value>(&probe).await {
            Ok(_) => return direct,
            Err(e) => tracing::warn!("Direct transport probe failed, trying callback: {}", e),
        }

        let callback = Self::callback(config);
        match callback.send::<Value>(&probe).await {
            Ok(_) => callback,
            Err(e) => {
                tracing::warn!("Callback transport probe failed too: {}", e);
                direct
            }
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Transport::Direct(_) => "direct",
            Transport::Callback(_) => "callback",
        }
    }

    /// Send one action and decode its `data`.
    ///
    /// A `success: false` envelope becomes the typed error named by its `code`.
    pub async fn send<T: DeserializeOwned>(&self, request: &ActionRequest) -> Result<T, AppError> {
        let envelope = match self {
            Transport::Direct(transport) => transport.exchange(request).await?,
            Transport::Callback(transport) => transport.exchange(request).await?,
        };

        if !envelope.success {
            let message = envelope
                .error
                .unwrap_or_else(|| format!("{} failed", request.action.as_str()));
            return Err(AppError::from_code(envelope.code.as_deref(), message));
        }

        serde_json::from_value(envelope.data)
            .map_err(|e| AppError::Transport(format!("Unexpected response data: {}", e)))
    }
}
