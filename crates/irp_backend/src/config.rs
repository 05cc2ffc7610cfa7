use irp_core::error::AppError;

pub const BACKEND_URL_ENV: &str = "IRP_BACKEND_URL";
pub const BACKEND_ANON_KEY_ENV: &str = "IRP_BACKEND_ANON_KEY";

/// Connection settings for the hosted backend. When no URL is configured the shell
/// falls back to the in-memory demo backend instead.
#[derive(Debug, Clone)]
pub struct BackendConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl BackendConfig {
    pub fn new(base_url: &str, anon_key: &str) -> Result<Self, AppError> {
        let base_url = base_url.trim_end_matches('/').to_string();
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(AppError::new(
                "CONFIG_INVALID_URL",
                "Backend base URL must be http(s)",
            )
            .with_details(format!("base_url={base_url}")));
        }
        if anon_key.trim().is_empty() {
            return Err(AppError::new(
                "CONFIG_MISSING_KEY",
                "Backend anon key must not be empty",
            ));
        }
        Ok(Self {
            base_url,
            anon_key: anon_key.to_string(),
        })
    }

    /// Read the configuration from the environment. `Ok(None)` means no backend is
    /// configured (demo mode); a URL without a key is an error.
    pub fn from_env() -> Result<Option<Self>, AppError> {
        let Ok(base_url) = std::env::var(BACKEND_URL_ENV) else {
            return Ok(None);
        };
        let anon_key = std::env::var(BACKEND_ANON_KEY_ENV).map_err(|_| {
            AppError::new(
                "CONFIG_MISSING_KEY",
                format!("{BACKEND_URL_ENV} is set but {BACKEND_ANON_KEY_ENV} is not"),
            )
        })?;
        Self::new(&base_url, &anon_key).map(Some)
    }
}
