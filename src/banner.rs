//! Startup banner and session summary display.

use std::time::Duration;

use crate::advisor::TokenUsage;
use crate::consts::{AUTHOR, HOMEPAGE, REPO, format_number};
use crate::render;

/// Session configuration for display in the startup banner.
pub struct BannerInfo<'a> {
    pub model: &'a str,
    pub auth_status: &'a str,
    pub timeout: Duration,
    pub retries: u32,
    pub strict: bool,
}

pub fn banner_text(info: &BannerInfo) -> String {
    let retries = if info.retries == 0 {
        "off".to_string()
    } else {
        format!("up to {}", info.retries)
    };
    let replies = if info.strict { "strict" } else { "lenient" };
    format!(
        r#"
   ╔═══════════════════════════════════════╗
   ║              N J O K I                ║
   ║         your health bestie            ║
   ╚═══════════════════════════════════════╝

   version   {}
   by        {}
   home      {}
   repo      {}
   model     gemini ({})
   auth      {}
   timeout   {}s
   retries   {}
   replies   {}
"#,
        env!("CARGO_PKG_VERSION"),
        AUTHOR,
        HOMEPAGE,
        REPO,
        info.model,
        info.auth_status,
        info.timeout.as_secs(),
        retries,
        replies,
    )
}

/// Print the banner, the disclaimer, and the emergency strip.
pub fn print_banner(info: &BannerInfo) {
    println!("{}", banner_text(info));
    println!("{}", render::disclaimer());
    println!("{}", render::emergency_strip());
    println!("  What's the vibe today? Tell me how you're feeling... (/help for commands)");
}

/// Print the session summary (token usage + farewell).
pub fn print_session_summary(usage: TokenUsage) {
    if usage.total() > 0 {
        println!(
            "session: {:>6} input + {:>6} output = {:>6} tokens",
            format_number(usage.input_tokens),
            format_number(usage.output_tokens),
            format_number(usage.total()),
        );
    }
    println!("take care, bestie.");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> BannerInfo<'static> {
        BannerInfo {
            model: "gemini-3-flash-preview",
            auth_status: "API key ✓",
            timeout: Duration::from_secs(60),
            retries: 0,
            strict: false,
        }
    }

    #[test]
    fn banner_shows_session_settings() {
        let text = banner_text(&info());
        assert!(text.contains("gemini (gemini-3-flash-preview)"));
        assert!(text.contains("API key ✓"));
        assert!(text.contains("60s"));
        assert!(text.contains("retries   off"));
        assert!(text.contains("replies   lenient"));
    }

    #[test]
    fn banner_shows_retry_budget() {
        let text = banner_text(&BannerInfo {
            retries: 3,
            strict: true,
            ..info()
        });
        assert!(text.contains("up to 3"));
        assert!(text.contains("strict"));
    }

    #[test]
    fn print_functions_do_not_panic() {
        print_banner(&info());
        print_session_summary(TokenUsage {
            input_tokens: 1234,
            output_tokens: 567,
        });
        print_session_summary(TokenUsage::default());
    }
}
