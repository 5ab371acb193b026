use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// A name/value tag attached to every metric a recorder emits.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Dimension {
    pub name: String,
    pub value: String,
}

impl Dimension {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

impl fmt::Display for Dimension {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.name, self.value)
    }
}

/// Ordered, immutable set of dimensions.
///
/// Cloning is cheap: every datum of one recorder points at the same
/// allocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Dimensions(Arc<[Dimension]>);

impl Dimensions {
    pub const NAMESPACE: &'static str = "namespace";
    pub const COMPONENT: &'static str = "component";

    pub fn new(dimensions: Vec<Dimension>) -> Self {
        Self(dimensions.into())
    }

    /// `[namespace=<namespace>]`, followed by `component=<component>` when given.
    pub fn for_scope(namespace: impl Into<String>, component: Option<String>) -> Self {
        let mut dimensions = vec![Dimension::new(Self::NAMESPACE, namespace)];
        if let Some(component) = component {
            dimensions.push(Dimension::new(Self::COMPONENT, component));
        }
        Self::new(dimensions)
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|d| d.name == name)
            .map(|d| d.value.as_str())
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Dimension> {
        self.0.iter()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn shares_storage_with(&self, other: &Dimensions) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Display for Dimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined = self
            .0
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(",");
        write!(f, "[{}]", joined)
    }
}

impl<'a> IntoIterator for &'a Dimensions {
    type Item = &'a Dimension;
    type IntoIter = std::slice::Iter<'a, Dimension>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
