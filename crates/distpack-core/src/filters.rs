//! Exclusion rules for staged directory subtrees.
//!
//! A rule either matches the end of an entry's file name (suffix rule) or
//! any part of its relative path (substring rule). Rules are checked for
//! every visited entry, not only for the top-level items being staged.

use std::fmt;
use std::path::Path;

/// A single exclusion rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExclusionRule {
    /// Matches when the final path segment ends with the suffix.
    Suffix(String),
    /// Matches when the string occurs anywhere in the relative path.
    Substring(String),
}

impl ExclusionRule {
    /// Parses the shorthand pattern syntax.
    ///
    /// A leading `*` makes a suffix rule; anything else is a substring rule.
    ///
    /// # Examples
    ///
    /// ```
    /// use distpack_core::ExclusionRule;
    ///
    /// assert_eq!(
    ///     ExclusionRule::from_pattern("*.es"),
    ///     ExclusionRule::Suffix(".es".to_string())
    /// );
    /// assert_eq!(
    ///     ExclusionRule::from_pattern("node_modules"),
    ///     ExclusionRule::Substring("node_modules".to_string())
    /// );
    /// ```
    pub fn from_pattern(pattern: &str) -> Self {
        pattern.strip_prefix('*').map_or_else(
            || Self::Substring(pattern.to_string()),
            |suffix| Self::Suffix(suffix.to_string()),
        )
    }

    /// Rules applied to every release: untranspiled `.es` sources, macOS
    /// folder metadata and installed dependencies.
    pub fn defaults() -> Vec<Self> {
        vec![
            Self::Suffix(".es".to_string()),
            Self::Substring(".DS_Store".to_string()),
            Self::Substring("node_modules".to_string()),
        ]
    }

    /// Returns `true` if this rule matches `relative_path`.
    pub fn matches(&self, relative_path: &Path) -> bool {
        match self {
            Self::Suffix(suffix) => relative_path
                .file_name()
                .is_some_and(|name| name.to_string_lossy().ends_with(suffix.as_str())),
            Self::Substring(needle) => relative_path
                .to_string_lossy()
                .contains(needle.as_str()),
        }
    }
}

impl fmt::Display for ExclusionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Suffix(suffix) => write!(f, "*{suffix}"),
            Self::Substring(needle) => f.write_str(needle),
        }
    }
}

/// Checks whether a path is excluded by any of the rules.
///
/// # Examples
///
/// ```
/// use distpack_core::ExclusionRule;
/// use distpack_core::filters::is_excluded;
/// use std::path::Path;
///
/// let rules = ExclusionRule::defaults();
/// assert!(is_excluded(Path::new("views/app.es"), &rules));
/// assert!(is_excluded(Path::new("lib/node_modules/x/index.js"), &rules));
/// assert!(!is_excluded(Path::new("views/app.js"), &rules));
/// ```
pub fn is_excluded(relative_path: &Path, rules: &[ExclusionRule]) -> bool {
    rules.iter().any(|rule| rule.matches(relative_path))
}
