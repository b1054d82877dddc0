//! User-Agent presented to upstream platforms by the extraction engine.
//!
//! Several platforms (Facebook and Instagram in particular) refuse or degrade
//! responses to non-browser clients, so the engine is told to present a
//! desktop Chrome identity unless the operator configures another one.

/// Desktop Chrome on Windows, the identity the engine presents by default.
const DESKTOP_CHROME_UA: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
(KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36";

/// Default User-Agent handed to the extraction engine.
#[must_use]
pub fn default_browser_user_agent() -> String {
    DESKTOP_CHROME_UA.to_string()
}
