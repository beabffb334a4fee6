//! Item classification from the URL alone.
//!
//! Rules are evaluated in a fixed priority order: file, then forwarding link.
//! Anything that matches no rule is treated as a container, since the
//! portal's item taxonomy cannot be enumerated exhaustively.

use std::fmt;

/// What a listed item turns into locally.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ItemKind {
    /// Downloadable file, written as bytes.
    File,
    /// Server-side redirect to an external target, written as an HTML stub.
    ForwardingLink,
    /// Nested listing, mirrored as a directory and crawled recursively.
    Container,
}

impl ItemKind {
    /// Stable lowercase label for logs and reports.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::ForwardingLink => "link",
            Self::Container => "container",
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A URL-substring rule mapping to an item kind.
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    /// Kind assigned when the rule matches.
    pub kind: ItemKind,
    /// Case-sensitive substrings; any one of them matches.
    pub keywords: &'static [&'static str],
}

impl ClassificationRule {
    fn matches(&self, url: &str) -> bool {
        self.keywords.iter().any(|keyword| url.contains(keyword))
    }
}

/// Classification rules in priority order.
pub const CLASSIFICATION_RULES: &[ClassificationRule] = &[
    ClassificationRule {
        kind: ItemKind::File,
        keywords: &["download"],
    },
    ClassificationRule {
        kind: ItemKind::ForwardingLink,
        keywords: &["directlink", "Wiki", "showThreads", "ExerciseHandler"],
    },
];

/// Classifies an item by its URL. Pure and total: unmatched URLs are containers.
#[must_use]
pub fn classify(url: &str) -> ItemKind {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| rule.matches(url))
        .map_or(ItemKind::Container, |rule| rule.kind)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_download_is_file() {
        assert_eq!(
            classify("https://read.mi.hs-rm.de/goto.php?target=file_123_download"),
            ItemKind::File
        );
        assert_eq!(
            classify("https://portal.example/download/file_123"),
            ItemKind::File
        );
    }

    #[test]
    fn test_classify_forwarding_keywords() {
        for url in [
            "https://portal.example/ilias.php?cmd=directlink&ref=1",
            "https://portal.example/ilias.php?baseClass=ilWikiHandlerGUI",
            "https://portal.example/ilias.php?cmd=showThreads&ref=7",
            "https://portal.example/ilias.php?baseClass=ilExerciseHandlerGUI",
        ] {
            assert_eq!(classify(url), ItemKind::ForwardingLink, "url: {url}");
        }
    }

    #[test]
    fn test_classify_file_takes_priority_over_link() {
        assert_eq!(
            classify("https://portal.example/showThreads/download?ref=7"),
            ItemKind::File
        );
        assert_eq!(
            classify("https://portal.example/Wiki/download"),
            ItemKind::File
        );
    }

    #[test]
    fn test_classify_unknown_defaults_to_container() {
        assert_eq!(
            classify("https://portal.example/ilias.php?cmdNode=xy"),
            ItemKind::Container
        );
        assert_eq!(classify(""), ItemKind::Container);
    }

    #[test]
    fn test_classify_keywords_are_case_sensitive() {
        assert_eq!(
            classify("https://portal.example/DOWNLOAD/wiki"),
            ItemKind::Container
        );
    }

    #[test]
    fn test_item_kind_labels() {
        assert_eq!(ItemKind::File.to_string(), "file");
        assert_eq!(ItemKind::ForwardingLink.to_string(), "link");
        assert_eq!(ItemKind::Container.to_string(), "container");
    }
}
