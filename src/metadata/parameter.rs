//! Parameter binding metadata.
//!
//! A [`ParameterMap`] records, for each argument position of one endpoint
//! method, how the runtime value at that position binds into the request.

use std::collections::BTreeMap;
use std::fmt;

/// Binding category of a method argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ParameterRole {
    /// Fills a `{name}` placeholder of the path template.
    Path,
    /// Query string entry.
    Query,
    /// Request header.
    Header,
    /// Request body.
    Body,
    /// Full request override (path, headers, url params).
    Request,
    /// Single named attribute.
    Attribute,
    /// Object whose keys are all merged into the attributes.
    Attributes,
}

impl ParameterRole {
    /// Whether declarations of this role may carry a name.
    #[must_use]
    pub const fn is_named(self) -> bool {
        matches!(self, Self::Path | Self::Query | Self::Header | Self::Attribute)
    }
}

impl fmt::Display for ParameterRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Path => write!(f, "path"),
            Self::Query => write!(f, "query"),
            Self::Header => write!(f, "header"),
            Self::Body => write!(f, "body"),
            Self::Request => write!(f, "request"),
            Self::Attribute => write!(f, "attribute"),
            Self::Attributes => write!(f, "attributes"),
        }
    }
}

/// Binding of one argument position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParameterMetadata {
    pub role: ParameterRole,
    pub name: Option<String>,
    pub position: usize,
}

/// Position-ordered parameter bindings for one endpoint method.
///
/// Built incrementally, one binding per declared parameter. Binding a position
/// twice replaces the earlier entry. Body, request and attributes bindings
/// never carry a name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ParameterMap {
    entries: BTreeMap<usize, ParameterMetadata>,
}

impl ParameterMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn path(self, position: usize, name: impl Into<String>) -> Self {
        self.bind(position, ParameterRole::Path, Some(name.into()))
    }

    #[must_use]
    pub fn query(self, position: usize, name: impl Into<String>) -> Self {
        self.bind(position, ParameterRole::Query, Some(name.into()))
    }

    #[must_use]
    pub fn header(self, position: usize, name: impl Into<String>) -> Self {
        self.bind(position, ParameterRole::Header, Some(name.into()))
    }

    #[must_use]
    pub fn attribute(self, position: usize, name: impl Into<String>) -> Self {
        self.bind(position, ParameterRole::Attribute, Some(name.into()))
    }

    #[must_use]
    pub fn body(self, position: usize) -> Self {
        self.bind(position, ParameterRole::Body, None)
    }

    #[must_use]
    pub fn request(self, position: usize) -> Self {
        self.bind(position, ParameterRole::Request, None)
    }

    #[must_use]
    pub fn attributes(self, position: usize) -> Self {
        self.bind(position, ParameterRole::Attributes, None)
    }

    /// Binds a position without a name.
    ///
    /// Path and query values then bind under `param<position>`; header and
    /// attribute values are dropped at resolution time.
    #[must_use]
    pub fn unnamed(self, position: usize, role: ParameterRole) -> Self {
        self.bind(position, role, None)
    }

    fn bind(mut self, position: usize, role: ParameterRole, name: Option<String>) -> Self {
        let name = name.filter(|_| role.is_named());
        self.entries.insert(
            position,
            ParameterMetadata {
                role,
                name,
                position,
            },
        );
        self
    }

    #[must_use]
    pub fn get(&self, position: usize) -> Option<&ParameterMetadata> {
        self.entries.get(&position)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ParameterMetadata> {
        self.entries.values()
    }
}
