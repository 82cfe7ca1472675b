//! Service container value types.

use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Separator between alternative aliases inside one tag alias.
pub const ALIAS_SEPARATOR: char = '|';

/// The class a service is implemented by.
///
/// Configuration may name the class directly or through a container
/// parameter written as `%parameter.name%`.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ServiceClassName {
    /// A fully-qualified class name.
    Literal(Arc<str>),
    /// The name of a parameter whose value is the class name.
    Parameter(Arc<str>),
}

impl ServiceClassName {
    /// Parse the raw `class` value of a service declaration.
    ///
    /// Returns `None` for blank values.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }
        if raw.len() > 2 && raw.starts_with('%') && raw.ends_with('%') {
            return Some(Self::Parameter(Arc::from(&raw[1..raw.len() - 1])));
        }
        Some(Self::Literal(Arc::from(raw.trim_start_matches('\\'))))
    }

    /// Whether the class comes from a `%parameter%`.
    pub fn is_parameter(&self) -> bool {
        matches!(self, Self::Parameter(_))
    }

    /// The class name, when written literally.
    pub fn literal(&self) -> Option<&str> {
        match self {
            Self::Literal(name) => Some(name),
            Self::Parameter(_) => None,
        }
    }

    /// The parameter name, when given as `%parameter%`.
    pub fn parameter(&self) -> Option<&str> {
        match self {
            Self::Parameter(name) => Some(name),
            Self::Literal(_) => None,
        }
    }
}

impl fmt::Display for ServiceClassName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Literal(name) => f.write_str(name),
            Self::Parameter(name) => write!(f, "%{name}%"),
        }
    }
}

/// Tag metadata attached to a service.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    pub name: SmolStr,
    /// Possibly several aliases joined with [`ALIAS_SEPARATOR`].
    pub alias: Option<Arc<str>>,
    pub attributes: IndexMap<SmolStr, Arc<str>>,
}

impl Tag {
    /// Create a tag without alias or attributes.
    pub fn new(name: impl Into<SmolStr>) -> Self {
        Self { name: name.into(), ..Self::default() }
    }

    /// Set the raw alias text; several aliases are joined with `|`.
    pub fn with_alias(mut self, alias: impl Into<Arc<str>>) -> Self {
        self.alias = Some(alias.into());
        self
    }

    /// Add an attribute.
    pub fn with_attribute(mut self, key: impl Into<SmolStr>, value: impl Into<Arc<str>>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    /// Look up an arbitrary tag attribute.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(|value| value.as_ref())
    }

    /// Every alternative alias of this tag. Empty when the tag has no alias.
    pub fn aliases(&self) -> impl Iterator<Item = &str> {
        self.alias
            .as_deref()
            .into_iter()
            .flat_map(|alias| alias.split(ALIAS_SEPARATOR))
            .map(str::trim)
            .filter(|alias| !alias.is_empty())
    }
}

/// A service declared in a container configuration document.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Service {
    pub id: Arc<str>,
    pub class_name: Option<ServiceClassName>,
    pub tags: Vec<Tag>,
}

impl Service {
    /// Create a service without class or tags.
    pub fn new(id: impl Into<Arc<str>>) -> Self {
        Self { id: id.into(), class_name: None, tags: Vec::new() }
    }

    /// Set the declared class.
    pub fn with_class(mut self, class_name: ServiceClassName) -> Self {
        self.class_name = Some(class_name);
        self
    }

    /// Add a tag.
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }

    /// Check if the service carries a tag named `name`.
    pub fn has_tag(&self, name: &str) -> bool {
        self.tags.iter().any(|tag| tag.name == name)
    }

    /// Tags with the given name. The tags borrow from the service only, so
    /// they outlive a temporary `name`.
    pub fn tags_named<'a, 'n>(&'a self, name: &'n str) -> impl Iterator<Item = &'a Tag> + use<'a, 'n> {
        self.tags.iter().filter(move |tag| tag.name == name)
    }
}
