//! Per-namespace NSS decomposition.
//!
//! The RFC parsers treat the NSS as an opaque string. An [`NssRegistry`]
//! maps NIDs to [`NssParser`]s that split it further, falling back to
//! [`OpaqueParser`] for namespaces nobody registered.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use tracing::trace;

use crate::constants::DEFAULT_SEPARATOR;
use crate::error::NssStructureError;

/// A decomposed NSS.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub enum ParsedNss {
    /// The NSS as a single value.
    Opaque {
        /// The encoded NSS
        value: String,
    },
    /// The NSS split on a separator.
    Hierarchical {
        /// Parts in order; may contain empty strings
        parts: Vec<String>,
        /// The separator the parts were split on
        separator: String,
    },
}

impl fmt::Display for ParsedNss {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Opaque { value } => f.write_str(value),
            Self::Hierarchical { parts, separator } => f.write_str(&parts.join(separator)),
        }
    }
}

/// Decomposes the NSS of one namespace.
pub trait NssParser: fmt::Debug + Send + Sync {
    /// Splits an encoded NSS into components.
    fn parse(&self, nss: &str) -> ParsedNss;

    /// Joins components back into an NSS.
    fn format(&self, components: &ParsedNss) -> String {
        components.to_string()
    }

    /// Checks components against the parser's shape.
    ///
    /// # Errors
    ///
    /// Returns the first structural problem found.
    fn validate(&self, _components: &ParsedNss) -> Result<(), NssStructureError> {
        Ok(())
    }
}

/// Keeps the NSS whole. Used for unregistered namespaces.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OpaqueParser;

impl NssParser for OpaqueParser {
    fn parse(&self, nss: &str) -> ParsedNss {
        ParsedNss::Opaque {
            value: nss.to_string(),
        }
    }
}

/// Splits the NSS on a separator, optionally bounding the part count.
///
/// # Examples
///
/// ```
/// use urn_lib::{HierarchicalParser, NssParser, ParsedNss};
///
/// let parser = HierarchicalParser::new("/").with_max_parts(3);
/// let parsed = parser.parse("a/b/c");
/// assert!(matches!(&parsed, ParsedNss::Hierarchical { parts, .. } if parts.len() == 3));
/// assert!(parser.validate(&parser.parse("a/b/c/d")).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HierarchicalParser {
    separator: String,
    min_parts: Option<usize>,
    max_parts: Option<usize>,
}

impl HierarchicalParser {
    /// Creates a parser splitting on `separator`, with no part bounds.
    #[must_use]
    pub fn new(separator: &str) -> Self {
        Self {
            separator: separator.to_string(),
            min_parts: None,
            max_parts: None,
        }
    }

    /// Requires at least `min` parts.
    #[must_use]
    pub const fn with_min_parts(mut self, min: usize) -> Self {
        self.min_parts = Some(min);
        self
    }

    /// Allows at most `max` parts.
    #[must_use]
    pub const fn with_max_parts(mut self, max: usize) -> Self {
        self.max_parts = Some(max);
        self
    }

    /// Returns the separator.
    #[must_use]
    pub fn separator(&self) -> &str {
        &self.separator
    }
}

impl Default for HierarchicalParser {
    fn default() -> Self {
        Self::new(DEFAULT_SEPARATOR)
    }
}

impl NssParser for HierarchicalParser {
    fn parse(&self, nss: &str) -> ParsedNss {
        let parts = if self.separator.is_empty() {
            vec![nss.to_string()]
        } else {
            nss.split(self.separator.as_str()).map(str::to_string).collect()
        };
        ParsedNss::Hierarchical {
            parts,
            separator: self.separator.clone(),
        }
    }

    fn validate(&self, components: &ParsedNss) -> Result<(), NssStructureError> {
        let actual = match components {
            ParsedNss::Opaque { .. } => 1,
            ParsedNss::Hierarchical { parts, .. } => parts.len(),
        };
        if let Some(min) = self.min_parts.filter(|&min| actual < min) {
            return Err(NssStructureError::TooFewParts { min, actual });
        }
        if let Some(max) = self.max_parts.filter(|&max| actual > max) {
            return Err(NssStructureError::TooManyParts { max, actual });
        }
        Ok(())
    }
}

/// Maps NIDs (case-insensitively) to NSS parsers.
///
/// # Examples
///
/// ```
/// use urn_lib::{HierarchicalParser, NssRegistry, ParsedNss};
///
/// let mut registry = NssRegistry::new();
/// registry.register("ISBN", HierarchicalParser::new("-"));
///
/// let parsed = registry.parse_full("isbn", "0-451-45052-3");
/// assert!(matches!(&parsed, ParsedNss::Hierarchical { parts, .. } if parts.len() == 4));
/// assert_eq!(registry.format_nss("isbn", &parsed), "0-451-45052-3");
///
/// assert_eq!(
///     registry.parse_full("other", "x:y"),
///     ParsedNss::Opaque { value: "x:y".into() }
/// );
/// ```
#[derive(Debug, Clone)]
pub struct NssRegistry {
    parsers: HashMap<String, Arc<dyn NssParser>>,
    fallback: Arc<dyn NssParser>,
}

impl NssRegistry {
    /// Creates an empty registry that falls back to [`OpaqueParser`].
    #[must_use]
    pub fn new() -> Self {
        Self::with_fallback(OpaqueParser)
    }

    /// Creates an empty registry with a custom fallback parser.
    #[must_use]
    pub fn with_fallback(fallback: impl NssParser + 'static) -> Self {
        Self {
            parsers: HashMap::new(),
            fallback: Arc::new(fallback),
        }
    }

    /// Registers `parser` for `nid`, replacing any previous one.
    pub fn register(&mut self, nid: &str, parser: impl NssParser + 'static) {
        self.parsers.insert(nid.to_lowercase(), Arc::new(parser));
    }

    /// Removes the parser for `nid`. Returns true if one was registered.
    pub fn unregister(&mut self, nid: &str) -> bool {
        self.parsers.remove(&nid.to_lowercase()).is_some()
    }

    /// Returns true if a parser is registered for `nid`.
    #[must_use]
    pub fn has_parser(&self, nid: &str) -> bool {
        self.parsers.contains_key(&nid.to_lowercase())
    }

    /// Returns the parser for `nid`, or the fallback.
    #[must_use]
    pub fn parser_for(&self, nid: &str) -> &dyn NssParser {
        self.parsers
            .get(&nid.to_lowercase())
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    /// Decomposes `nss` with the parser for `nid`.
    #[must_use]
    pub fn parse_full(&self, nid: &str, nss: &str) -> ParsedNss {
        trace!(nid, registered = self.has_parser(nid), "decomposing nss");
        self.parser_for(nid).parse(nss)
    }

    /// Joins components with the parser for `nid`.
    #[must_use]
    pub fn format_nss(&self, nid: &str, components: &ParsedNss) -> String {
        self.parser_for(nid).format(components)
    }

    /// Checks components with the parser for `nid`.
    ///
    /// # Errors
    ///
    /// Returns the parser's structural error.
    pub fn validate(&self, nid: &str, components: &ParsedNss) -> Result<(), NssStructureError> {
        self.parser_for(nid).validate(components)
    }

    /// Returns the registered NIDs, sorted.
    #[must_use]
    pub fn registered_nids(&self) -> Vec<&str> {
        let mut nids: Vec<&str> = self.parsers.keys().map(String::as_str).collect();
        nids.sort_unstable();
        nids
    }

    /// Removes every registration. The fallback is kept.
    pub fn clear(&mut self) {
        self.parsers.clear();
    }
}

impl Default for NssRegistry {
    fn default() -> Self {
        Self::new()
    }
}
