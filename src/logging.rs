use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

/// Logger struct for structured, operation-scoped logging
///
/// Every store operation creates one `Logger`; all events it emits share the
/// same correlation id so a pending/fulfilled/rejected sequence can be
/// followed in the output of any `tracing` subscriber.
pub struct Logger {
    request_id: String,
    operation: &'static str,
}

impl Logger {
    /// Create a new Logger instance with a fresh correlation id
    ///
    /// # Arguments
    ///
    /// * `operation` - The store operation being traced, e.g. `files/upload`
    pub fn new(operation: &'static str) -> Self {
        Self {
            request_id: Uuid::new_v4().to_string(),
            operation,
        }
    }

    /// Log an info message
    ///
    /// # Arguments
    ///
    /// * `message` - The log message
    /// * `data` - Optional additional data to include in the log
    pub fn info(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(tracing::Level::INFO, message, data);
    }

    /// Log a warning message
    pub fn warn(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(tracing::Level::WARN, message, data);
    }

    /// Log an error message
    pub fn error(&self, message: &str, data: Option<serde_json::Value>) {
        self.log(tracing::Level::ERROR, message, data);
    }

    fn log(&self, level: tracing::Level, message: &str, data: Option<serde_json::Value>) {
        let log_data = json!({
            "timestamp": Utc::now().to_rfc3339(),
            "request_id": self.request_id,
            "operation": self.operation,
            "message": message,
            "data": data
        })
        .to_string();

        // `tracing` macros need the level at compile time
        if level == tracing::Level::ERROR {
            tracing::error!(request_id = %self.request_id, operation = self.operation, "{}", log_data);
        } else if level == tracing::Level::WARN {
            tracing::warn!(request_id = %self.request_id, operation = self.operation, "{}", log_data);
        } else {
            tracing::info!(request_id = %self.request_id, operation = self.operation, "{}", log_data);
        }
    }
}

/// Macro to create a JSON object for additional log data
///
/// Usage: log_data!("file_id" => 7, "status" => "failed")
#[macro_export]
macro_rules! log_data {
    ($($key:expr => $value:expr),*) => {
        Some(serde_json::json!({ $($key: $value),* }))
    };
}
