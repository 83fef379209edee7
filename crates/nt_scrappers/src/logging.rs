use std::collections::VecDeque;
use std::sync::Once;

use tracing_subscriber::EnvFilter;

static INIT: Once = Once::new();

/// Prepends a chain of prefixes (source emoji, source name, url...) to
/// every message.
#[derive(Debug, Clone, Default)]
pub struct Logger {
    prefixes: VecDeque<String>,
}

impl Logger {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_new_prefixes(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.clear();
        self.prefixes.push_back(prefix.into());
        self
    }

    pub fn with_prefix(&self, prefix: impl Into<String>) -> Self {
        let mut logger = self.clone();
        logger.prefixes.push_back(prefix.into());
        logger
    }

    fn prefix(&self) -> String {
        self.prefixes.iter().map(|p| format!("{} ", p)).collect()
    }

    pub fn info(&self, message: &str) {
        tracing::info!("{}{}", self.prefix(), message);
    }

    pub fn error(&self, message: &str) {
        tracing::error!("{}{}", self.prefix(), message);
    }

    pub fn warn(&self, message: &str) {
        tracing::warn!("{}{}", self.prefix(), message);
    }

    pub fn debug(&self, message: &str) {
        tracing::debug!("{}{}", self.prefix(), message);
    }
}

/// Installs the fmt subscriber once. `RUST_LOG` wins over `default_level`.
pub fn init_logging(default_level: &str) -> Logger {
    if !tracing::dispatcher::has_been_set() {
        INIT.call_once(|| {
            let filter = EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(default_level));
            tracing_subscriber::fmt().with_env_filter(filter).init();
        });
    }
    Logger::new()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prefixes_chain() {
        let logger = Logger::new().with_new_prefixes("🌱").with_prefix("Reporterre");
        assert_eq!(logger.prefix(), "🌱 Reporterre ");

        let reset = logger.clone().with_new_prefixes("✊");
        assert_eq!(reset.prefix(), "✊ ");
        assert_eq!(logger.prefix(), "🌱 Reporterre ");
    }
}
