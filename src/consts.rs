//! Project-wide constants.

use std::path::PathBuf;
use std::time::Duration;

pub const AUTHOR: &str = env!("CARGO_PKG_AUTHORS");
pub const HOMEPAGE: &str = env!("CARGO_PKG_HOMEPAGE");
pub const REPO: &str = env!("CARGO_PKG_REPOSITORY");

/// Provider key used for credential storage.
pub const PROVIDER: &str = "gemini";

/// Default Gemini model when none is specified or configured.
pub const DEFAULT_MODEL: &str = "gemini-3-flash-preview";

/// Base URL of the Generative Language API.
pub const GEMINI_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Environment variables checked for an API key, in order.
pub const API_KEY_ENV_VARS: &[&str] = &["GEMINI_API_KEY", "API_KEY"];

/// How long a single analysis may take before it is abandoned.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// The one message users see when an analysis fails, whatever the cause.
pub const GENERIC_FAILURE_MESSAGE: &str =
    "Something went sideways while checking your symptoms. Try again, bestie?";

/// Local emergency number shown on the emergency strip.
pub const EMERGENCY_NUMBER: &str = "119";
pub const EMERGENCY_REGION: &str = "Kenya";
pub const NEAREST_ER_URL: &str = "https://www.google.com/maps/search/nearest+emergency+room";

/// Config key for the persisted model choice.
pub const MODEL_CONFIG_KEY: &str = "model";

/// Default database path: `~/.njoki/njoki.db`.
/// Single DB for credentials and config.
pub fn default_db_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(std::env::temp_dir)
        .join(".njoki")
        .join("njoki.db")
}

/// Format a number with comma separators (e.g. 1,234,567).
pub fn format_number(n: u64) -> String {
    let s = n.to_string();
    let mut result = String::with_capacity(s.len() + s.len() / 3);
    for (i, c) in s.chars().enumerate() {
        if i > 0 && (s.len() - i).is_multiple_of(3) {
            result.push(',');
        }
        result.push(c);
    }
    result
}
