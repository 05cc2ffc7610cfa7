use std::sync::Mutex;
use std::time::Duration;

use serde::Deserialize;
use serde_json::Value;

use irp_core::backend::BackendService;
use irp_core::domain::{Incident, IncidentStatus, SessionUser};
use irp_core::error::AppError;

use crate::config::BackendConfig;

/// REST client for the hosted backend-as-a-service: PostgREST-style table endpoints,
/// object storage, and session auth. One instance is constructed at startup and shared
/// by reference; it owns the session access token.
pub struct RestBackend {
    config: BackendConfig,
    agent: ureq::Agent,
    access_token: Mutex<Option<String>>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AuthUserBody {
    id: String,
    email: Option<String>,
}

pub fn list_incidents_url(base_url: &str) -> String {
    format!("{base_url}/rest/v1/incidents?select=*&order=reported_at.desc")
}

pub fn count_incidents_url(base_url: &str, status: Option<IncidentStatus>) -> String {
    match status {
        None => format!("{base_url}/rest/v1/incidents?select=id"),
        Some(s) => format!("{base_url}/rest/v1/incidents?select=id&status=eq.{}", s.as_str()),
    }
}

fn table_url(base_url: &str, table: &str) -> String {
    format!("{base_url}/rest/v1/{table}")
}

fn storage_object_url(base_url: &str, bucket: &str, name: &str) -> String {
    format!("{base_url}/storage/v1/object/{bucket}/{name}")
}

/// Total row count from a `Content-Range` header such as `0-24/57` or `*/57`.
pub fn parse_content_range_total(header: &str) -> Option<i64> {
    header.rsplit('/').next()?.parse().ok()
}

/// Map a non-2xx response onto the structured error shape. The service reports
/// `message`/`code`/`details` as JSON; anything else falls back to a generic code.
pub fn error_from_status(op: &str, status: u16, body: &str) -> AppError {
    let parsed: Option<ServiceErrorBody> = serde_json::from_str(body).ok();
    let message = parsed
        .as_ref()
        .and_then(|b| b.message.clone())
        .unwrap_or_else(|| format!("Backend request failed during {op}"));
    let code = parsed
        .as_ref()
        .and_then(|b| b.code.clone())
        .unwrap_or_else(|| format!("BACKEND_HTTP_{status}"));

    let details = match parsed.and_then(|b| b.details) {
        Some(d) => format!("status={status}; {d}"),
        None => format!("status={status}"),
    };

    AppError::new(code, message)
        .with_details(details)
        .with_retryable(status >= 500)
}

fn map_call_error(op: &str, err: ureq::Error) -> AppError {
    match err {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            error_from_status(op, status, &body)
        }
        ureq::Error::Transport(t) => AppError::new(
            "BACKEND_UNREACHABLE",
            format!("Failed to reach backend during {op}"),
        )
        .with_details(t.to_string())
        .with_retryable(true),
    }
}

impl RestBackend {
    pub fn new(config: BackendConfig) -> Self {
        let agent = ureq::AgentBuilder::new()
            .timeout(Duration::from_secs(15))
            .build();
        Self {
            config,
            agent,
            access_token: Mutex::new(None),
        }
    }

    /// Attach (or clear) the session access token obtained from the auth flow; while
    /// absent, requests carry the anon key.
    pub fn set_access_token(&self, token: Option<String>) -> Result<(), AppError> {
        *self.lock_token()? = token;
        Ok(())
    }

    fn lock_token(&self) -> Result<std::sync::MutexGuard<'_, Option<String>>, AppError> {
        self.access_token
            .lock()
            .map_err(|_| AppError::new("BACKEND_STATE_POISONED", "Access token lock poisoned"))
    }

    fn bearer(&self) -> Result<String, AppError> {
        let token = self.lock_token()?;
        Ok(format!(
            "Bearer {}",
            token.as_deref().unwrap_or(&self.config.anon_key)
        ))
    }

    fn request(&self, method: &str, url: &str) -> Result<ureq::Request, AppError> {
        Ok(self
            .agent
            .request(method, url)
            .set("apikey", &self.config.anon_key)
            .set("Authorization", &self.bearer()?))
    }
}

impl BackendService for RestBackend {
    fn list_incidents(&self) -> Result<Vec<Incident>, AppError> {
        let url = list_incidents_url(&self.config.base_url);
        let response = self
            .request("GET", &url)?
            .call()
            .map_err(|e| map_call_error("incident list", e))?;
        response.into_json().map_err(|e| {
            AppError::new("BACKEND_DECODE_FAILED", "Failed to decode incident list")
                .with_details(e.to_string())
        })
    }

    fn count_incidents(&self, status: Option<IncidentStatus>) -> Result<i64, AppError> {
        let url = count_incidents_url(&self.config.base_url, status);
        let response = self
            .request("HEAD", &url)?
            .set("Prefer", "count=exact")
            .call()
            .map_err(|e| map_call_error("incident count", e))?;

        response
            .header("Content-Range")
            .and_then(parse_content_range_total)
            .ok_or_else(|| {
                AppError::new(
                    "BACKEND_DECODE_FAILED",
                    "Count response carried no usable Content-Range header",
                )
            })
    }

    fn insert_row(&self, table: &str, row: &Value) -> Result<i64, AppError> {
        let url = table_url(&self.config.base_url, table);
        let response = self
            .request("POST", &url)?
            .set("Prefer", "return=representation")
            .send_json(serde_json::json!([row]))
            .map_err(|e| map_call_error("row insert", e))?;

        let rows: Vec<Value> = response.into_json().map_err(|e| {
            AppError::new("BACKEND_DECODE_FAILED", "Failed to decode insert response")
                .with_details(e.to_string())
        })?;
        rows.first()
            .and_then(|r| r.get("id"))
            .and_then(Value::as_i64)
            .ok_or_else(|| {
                AppError::new(
                    "BACKEND_DECODE_FAILED",
                    "Insert response carried no assigned id",
                )
            })
    }

    fn update_row(&self, table: &str, id: i64, patch: &Value) -> Result<(), AppError> {
        let url = format!("{}?id=eq.{id}", table_url(&self.config.base_url, table));
        self.request("PATCH", &url)?
            .set("Prefer", "return=minimal")
            .send_json(patch.clone())
            .map_err(|e| map_call_error("row update", e))?;
        Ok(())
    }

    fn upload_object(&self, bucket: &str, name: &str, bytes: &[u8]) -> Result<(), AppError> {
        let url = storage_object_url(&self.config.base_url, bucket, name);
        self.request("POST", &url)?
            .set("Content-Type", "application/octet-stream")
            .send_bytes(bytes)
            .map_err(|e| map_call_error("object upload", e))?;
        Ok(())
    }

    fn current_user(&self) -> Result<Option<SessionUser>, AppError> {
        let url = format!("{}/auth/v1/user", self.config.base_url);
        let response = match self.request("GET", &url)?.call() {
            Ok(response) => response,
            // No (or expired) session is an anonymous visitor, not an error.
            Err(ureq::Error::Status(401 | 403, _)) => return Ok(None),
            Err(e) => return Err(map_call_error("session lookup", e)),
        };

        let body: AuthUserBody = response.into_json().map_err(|e| {
            AppError::new("BACKEND_DECODE_FAILED", "Failed to decode session user")
                .with_details(e.to_string())
        })?;
        Ok(Some(SessionUser {
            id: body.id,
            email: body.email,
        }))
    }

    fn sign_out(&self) -> Result<(), AppError> {
        let url = format!("{}/auth/v1/logout", self.config.base_url);
        self.request("POST", &url)?
            .call()
            .map_err(|e| map_call_error("sign out", e))?;
        self.set_access_token(None)
    }
}
