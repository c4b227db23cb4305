//! Protocol-aware parsing on top of the RFC parsers.
//!
//! A [`UrnWrapper`] strips a scheme prefix with a [`ProtocolHandler`],
//! parses the rest as an RFC 2141 or RFC 8141 name, and can hand the NSS
//! to an [`NssRegistry`] for further decomposition.

use std::fmt;
use std::marker::PhantomData;

use crate::error::{UrnError, UrnErrorKind};
use crate::nss::{NssRegistry, ParsedNss};
use crate::options::ParserOptions;
use crate::protocol::ProtocolHandler;
use crate::rfc2141::{Rfc2141Name, parse_rfc2141};
use crate::rfc8141::{Rfc8141Name, parse_rfc8141};

/// A structured name one of the RFC parsers produces.
pub trait UrnName: fmt::Display + Sized {
    /// Parses a name without its scheme prefix.
    ///
    /// # Errors
    ///
    /// Returns the parser's error.
    fn parse_name(input: &str, options: &ParserOptions) -> Result<Self, UrnError>;

    /// Returns the lowercased NID.
    fn nid(&self) -> &str;

    /// Returns the encoded NSS.
    fn nss(&self) -> &str;
}

impl UrnName for Rfc2141Name {
    fn parse_name(input: &str, options: &ParserOptions) -> Result<Self, UrnError> {
        parse_rfc2141(input, options)
    }

    fn nid(&self) -> &str {
        Self::nid(self)
    }

    fn nss(&self) -> &str {
        Self::nss(self)
    }
}

impl UrnName for Rfc8141Name {
    fn parse_name(input: &str, options: &ParserOptions) -> Result<Self, UrnError> {
        parse_rfc8141(input, options)
    }

    fn nid(&self) -> &str {
        Self::nid(self)
    }

    fn nss(&self) -> &str {
        Self::nss(self)
    }
}

/// A parsed name plus its decomposed NSS, when a registry is attached.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FullUrn<N> {
    /// The structured name
    pub name: N,
    /// The NSS as decomposed by the registry
    pub nss: Option<ParsedNss>,
}

/// Parses and formats URNs that carry a scheme prefix.
///
/// # Examples
///
/// ```
/// use urn_lib::{HierarchicalParser, NssRegistry, ParsedNss, Rfc8141Wrapper};
///
/// let mut registry = NssRegistry::new();
/// registry.register("ietf", HierarchicalParser::default());
/// let wrapper = Rfc8141Wrapper::default().with_registry(registry);
///
/// let full = wrapper.parse_full("URN:ietf:rfc:7230#sec").unwrap();
/// assert_eq!(full.name.fragment(), Some("sec"));
/// let Some(ParsedNss::Hierarchical { parts, .. }) = &full.nss else {
///     panic!("expected hierarchical nss");
/// };
/// assert_eq!(parts, &["rfc", "7230"]);
/// assert_eq!(wrapper.format(&full.name), "urn:ietf:rfc:7230#sec");
/// ```
#[derive(Debug, Clone)]
pub struct UrnWrapper<N> {
    handler: ProtocolHandler,
    options: ParserOptions,
    registry: Option<NssRegistry>,
    name: PhantomData<fn() -> N>,
}

/// Wrapper producing [`Rfc2141Name`]s.
pub type Rfc2141Wrapper = UrnWrapper<Rfc2141Name>;

/// Wrapper producing [`Rfc8141Name`]s.
pub type Rfc8141Wrapper = UrnWrapper<Rfc8141Name>;

impl<N: UrnName> UrnWrapper<N> {
    /// Creates a wrapper for the `urn` scheme with the given options and
    /// no registry.
    #[must_use]
    pub fn new(options: ParserOptions) -> Self {
        Self {
            handler: ProtocolHandler::urn(),
            options,
            registry: None,
            name: PhantomData,
        }
    }

    /// Replaces the protocol handler.
    #[must_use]
    pub fn with_protocol_handler(mut self, handler: ProtocolHandler) -> Self {
        self.handler = handler;
        self
    }

    /// Attaches a registry used by [`parse_full`](Self::parse_full).
    #[must_use]
    pub fn with_registry(mut self, registry: NssRegistry) -> Self {
        self.registry = Some(registry);
        self
    }

    /// Returns the protocol handler.
    #[must_use]
    pub const fn protocol_handler(&self) -> &ProtocolHandler {
        &self.handler
    }

    /// Returns the parser options.
    #[must_use]
    pub const fn options(&self) -> &ParserOptions {
        &self.options
    }

    /// Returns the registry, if one is attached.
    #[must_use]
    pub const fn registry(&self) -> Option<&NssRegistry> {
        self.registry.as_ref()
    }

    /// Strips the scheme prefix if present and parses the rest.
    ///
    /// # Errors
    ///
    /// Returns the RFC parser's error, reported against `raw`.
    pub fn parse(&self, raw: &str) -> Result<N, UrnError> {
        let stripped = self.handler.strip(raw);
        N::parse_name(stripped, &self.options).map_err(|e| UrnError::new(raw, e.kind))
    }

    /// Parses like [`parse`](Self::parse), then decomposes the NSS with the
    /// attached registry and checks the result.
    ///
    /// Without a registry, `nss` is `None`.
    ///
    /// # Errors
    ///
    /// Returns the RFC parser's error, or [`UrnErrorKind::NssStructure`]
    /// if the registered parser rejects the decomposed NSS.
    pub fn parse_full(&self, raw: &str) -> Result<FullUrn<N>, UrnError> {
        let name = self.parse(raw)?;
        let Some(registry) = &self.registry else {
            return Ok(FullUrn { name, nss: None });
        };
        let nss = registry.parse_full(name.nid(), name.nss());
        registry
            .validate(name.nid(), &nss)
            .map_err(|e| UrnError::new(raw, UrnErrorKind::NssStructure(e)))?;
        Ok(FullUrn {
            name,
            nss: Some(nss),
        })
    }

    /// Formats `name` and adds the scheme prefix.
    #[must_use]
    pub fn format(&self, name: &N) -> String {
        self.handler.add(&name.to_string())
    }
}

impl<N: UrnName> Default for UrnWrapper<N> {
    fn default() -> Self {
        Self::new(ParserOptions::default())
    }
}
