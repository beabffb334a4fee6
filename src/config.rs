//! Immutable portal configuration injected into every component.
//!
//! Endpoints, the listing markup marker, the login form layout, the retry
//! bound and the content-type table all live here so that no component
//! reaches for ambient globals.

use std::collections::HashMap;

use url::Url;

/// Base URL of the portal mirrored by default.
pub const DEFAULT_BASE_URL: &str = "https://read.mi.hs-rm.de/";

/// Maximum requests per logical transport call (including the first).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// CSS class that marks an anchor as the title of a container item.
pub const DEFAULT_ITEM_TITLE_CLASS: &str = "il_ContainerItemTitle";

/// Substring of the final login URL that indicates a bounce back to the login page.
pub const DEFAULT_LOGIN_MARKER: &str = "login";

/// Default HTTP connect timeout (30 seconds).
pub const DEFAULT_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default HTTP read timeout: longest idle gap between body reads (5 minutes).
pub const DEFAULT_READ_TIMEOUT_SECS: u64 = 300;

const LOGIN_PATH: &str = "ilias.php?lang=de&client_id=readmi&cmd=post&cmdClass=ilstartupgui\
    &cmdNode=sx&baseClass=ilStartUpGUI&rtoken=";

const MEMBERSHIPS_PATH: &str = "ilias.php?baseClass=ilPersonalDesktopGUI&cmd=jumpToMemberships";

/// MIME type to extension pairs known to the portal.
const DEFAULT_CONTENT_TYPES: &[(&str, &str)] = &[
    ("application/java-archive", ".jar"),
    ("application/octet-stream", ".dtd"),
    ("application/pdf", ".pdf"),
    ("application/postscript", ".eps"),
    ("application/xml", ".xml"),
    ("application/x-tex", ".tex"),
    ("application/zip", ".zip"),
    (
        "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        ".pptx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        ".docx",
    ),
    (
        "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        ".xlsx",
    ),
    ("application/json", ".json"),
    ("image/svg+xml", ".svg"),
    ("image/jpeg", ".jpg"),
    ("image/png", ".png"),
    ("image/gif", ".gif"),
    ("text/html", ".html"),
    ("text/plain", ".txt"),
    ("text/xml", ".xml"),
    ("video/mp4", ".mp4"),
    ("audio/mpeg", ".mp3"),
];

/// Fixed mapping from declared content types to filename extensions.
///
/// Lookups ignore media-type parameters and case, so
/// `text/html; charset=UTF-8` resolves like `text/html`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContentTypeTable {
    entries: HashMap<String, String>,
}

impl Default for ContentTypeTable {
    fn default() -> Self {
        DEFAULT_CONTENT_TYPES
            .iter()
            .fold(Self::empty(), |table, (mime, ext)| table.with_entry(mime, ext))
    }
}

impl ContentTypeTable {
    /// Creates a table with no entries; every lookup yields the empty extension.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            entries: HashMap::new(),
        }
    }

    /// Returns the table with `mime` mapped to `extension`.
    #[must_use]
    pub fn with_entry(mut self, mime: &str, extension: &str) -> Self {
        self.entries
            .insert(normalize_mime(mime), extension.to_string());
        self
    }

    /// Returns the extension for a `Content-Type` header value, or `""` when unmapped.
    #[must_use]
    pub fn extension_for(&self, content_type: &str) -> &str {
        self.entries
            .get(&normalize_mime(content_type))
            .map_or("", String::as_str)
    }

    /// Iterates over `(mime, extension)` pairs in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(mime, ext)| (mime.as_str(), ext.as_str()))
    }

    /// Number of mapped content types.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no content type is mapped.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

fn normalize_mime(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Field names and submit value of the portal's login form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginForm {
    pub username_field: String,
    pub password_field: String,
    pub submit_field: String,
    pub submit_value: String,
}

impl Default for LoginForm {
    fn default() -> Self {
        Self {
            username_field: "username".to_string(),
            password_field: "password".to_string(),
            submit_field: "cmd[doStandardAuthentication]".to_string(),
            submit_value: "Anmelden".to_string(),
        }
    }
}

/// Everything the mirror needs to know about a portal instance.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    /// Base URL used to absolutize relative listing links.
    pub base_url: Url,
    /// Endpoint receiving the login form POST.
    pub login_url: String,
    /// Listing of the user's course memberships (default crawl root).
    pub memberships_url: String,
    /// CSS class marking container-item title anchors in listings.
    pub item_title_class: String,
    /// Substring of the post-login URL that signals a rejected login.
    pub login_marker: String,
    /// Login form layout.
    pub login_form: LoginForm,
    /// Maximum requests per logical transport call.
    pub max_attempts: u32,
    /// HTTP connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// HTTP read timeout in seconds.
    pub read_timeout_secs: u64,
    /// Content-type to extension mapping for downloaded files.
    pub content_types: ContentTypeTable,
}

impl Default for PortalConfig {
    #[allow(clippy::expect_used)]
    fn default() -> Self {
        Self::for_base_url(DEFAULT_BASE_URL).expect("default base URL is a valid absolute URL")
    }
}

impl PortalConfig {
    /// Builds a configuration whose endpoints are all derived from `base_url`.
    ///
    /// A missing trailing slash is added so relative links resolve beneath
    /// the base rather than beside it.
    ///
    /// # Errors
    ///
    /// Returns [`url::ParseError`] when `base_url` is not an absolute URL.
    pub fn for_base_url(base_url: &str) -> Result<Self, url::ParseError> {
        let normalized = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{base_url}/")
        };
        let base_url = Url::parse(&normalized)?;
        let login_url = base_url.join(LOGIN_PATH)?.to_string();
        let memberships_url = base_url.join(MEMBERSHIPS_PATH)?.to_string();

        Ok(Self {
            base_url,
            login_url,
            memberships_url,
            item_title_class: DEFAULT_ITEM_TITLE_CLASS.to_string(),
            login_marker: DEFAULT_LOGIN_MARKER.to_string(),
            login_form: LoginForm::default(),
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            connect_timeout_secs: DEFAULT_CONNECT_TIMEOUT_SECS,
            read_timeout_secs: DEFAULT_READ_TIMEOUT_SECS,
            content_types: ContentTypeTable::default(),
        })
    }

    /// Returns the configuration with a different retry bound (minimum 1).
    #[must_use]
    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    /// Returns the configuration with different HTTP timeouts.
    #[must_use]
    pub fn with_timeouts(mut self, connect_timeout_secs: u64, read_timeout_secs: u64) -> Self {
        self.connect_timeout_secs = connect_timeout_secs;
        self.read_timeout_secs = read_timeout_secs;
        self
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_points_at_default_portal() {
        let config = PortalConfig::default();
        assert_eq!(config.base_url.as_str(), DEFAULT_BASE_URL);
        assert!(config.login_url.starts_with(DEFAULT_BASE_URL));
        assert!(config.login_url.contains("cmd=post"));
        assert!(config.memberships_url.contains("cmd=jumpToMemberships"));
        assert_eq!(config.max_attempts, 5);
        assert_eq!(config.item_title_class, "il_ContainerItemTitle");
    }

    #[test]
    fn test_default_login_url_does_not_contain_login_marker() {
        // A successful login that never redirects must not look rejected.
        let config = PortalConfig::default();
        assert!(!config.login_url.contains(&config.login_marker));
    }

    #[test]
    fn test_for_base_url_adds_trailing_slash() {
        let config = PortalConfig::for_base_url("http://127.0.0.1:8080").unwrap();
        assert_eq!(config.base_url.as_str(), "http://127.0.0.1:8080/");
        assert!(
            config
                .memberships_url
                .starts_with("http://127.0.0.1:8080/ilias.php?")
        );
    }

    #[test]
    fn test_for_base_url_rejects_relative_url() {
        assert!(PortalConfig::for_base_url("not a url").is_err());
    }

    #[test]
    fn test_with_max_attempts_minimum_is_one() {
        let config = PortalConfig::default().with_max_attempts(0);
        assert_eq!(config.max_attempts, 1);
    }

    #[test]
    fn test_content_type_table_known_types() {
        let table = ContentTypeTable::default();
        assert_eq!(table.extension_for("application/pdf"), ".pdf");
        assert_eq!(table.extension_for("application/zip"), ".zip");
        assert_eq!(table.extension_for("image/jpeg"), ".jpg");
        assert_eq!(table.extension_for("video/mp4"), ".mp4");
        assert_eq!(table.extension_for("application/octet-stream"), ".dtd");
    }

    #[test]
    fn test_content_type_table_maps_every_default_entry() {
        let table = ContentTypeTable::default();
        assert_eq!(table.len(), DEFAULT_CONTENT_TYPES.len());
        for (mime, ext) in DEFAULT_CONTENT_TYPES {
            assert_eq!(table.extension_for(mime), *ext, "lookup of {mime}");
            assert_eq!(
                table.extension_for(&format!("{}; charset=UTF-8", mime.to_ascii_uppercase())),
                *ext,
                "parameterized lookup of {mime}"
            );
        }
        for (mime, ext) in table.iter() {
            assert_eq!(table.extension_for(mime), ext);
        }
    }

    #[test]
    fn test_content_type_table_unmapped_is_empty() {
        let table = ContentTypeTable::default();
        assert_eq!(table.extension_for("application/x-unknown"), "");
        assert_eq!(table.extension_for(""), "");
    }

    #[test]
    fn test_content_type_table_strips_parameters_and_case() {
        let table = ContentTypeTable::default();
        assert_eq!(table.extension_for("text/html; charset=UTF-8"), ".html");
        assert_eq!(table.extension_for("text/plain;charset=UTF-8"), ".txt");
        assert_eq!(table.extension_for("Text/XML;charset=UTF-8"), ".xml");
    }

    #[test]
    fn test_content_type_table_unknown_type_is_empty() {
        let table = ContentTypeTable::default();
        assert_eq!(table.extension_for("application/x-unknown"), "");
        assert_eq!(table.extension_for(""), "");
    }

    #[test]
    fn test_content_type_table_custom_entry() {
        let table = ContentTypeTable::empty().with_entry("Application/X-Custom", ".cst");
        assert_eq!(table.len(), 1);
        assert_eq!(table.extension_for("application/x-custom"), ".cst");
        assert_eq!(table.extension_for("application/pdf"), "");
    }
}
