//! Shared User-Agent string for portal traffic.

/// Project URL for User-Agent identification.
const PROJECT_UA_URL: &str = "https://github.com/fierce/lms-mirror";

/// Default User-Agent for every portal request (identifies the tool).
#[must_use]
pub(crate) fn default_portal_user_agent() -> String {
    let version = env!("CARGO_PKG_VERSION");
    format!("lms-mirror/{version} (course-mirror-tool; +{PROJECT_UA_URL})")
}
