pub mod backend;
pub mod dashboard;
pub mod demo;
pub mod domain;
pub mod error;
pub mod export;
pub mod filter;
pub mod intake;
pub mod session;
pub mod stats;

#[cfg(test)]
mod tests {
    use super::error::AppError;

    #[test]
    fn app_error_is_structured() {
        let err = AppError::new("BACKEND_TEST", "request failed").with_retryable(false);
        assert_eq!(err.code, "BACKEND_TEST");
        assert_eq!(err.message, "request failed");
        assert_eq!(err.retryable, false);
    }

    #[test]
    fn app_error_user_message_composes_all_parts() {
        let err = AppError::new("BACKEND_TEST", "request failed").with_details("row missing");
        assert_eq!(
            err.user_message(),
            "Error: request failed (Code: BACKEND_TEST) Details: row missing"
        );
    }
}
