//! Variable registry: stable names with O(1) name → index lookup.
//!
//! Everything downstream of the registry (scores, orders, graphs) speaks in
//! dense `usize` indices. Names only matter at the edges: knowledge is written
//! against names and resolved once, and reports render names for humans.

use std::collections::HashMap;

use crate::error::KernelError;

/// An ordered, duplicate-free set of variable names.
///
/// Index `i` is the position of the name in registration order. Equality of
/// variables is equality of indices; two registries with the same names in a
/// different order are different registries.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Variables {
    names: Vec<String>,
    index: HashMap<String, usize>,
}

impl Variables {
    /// Build a registry from names in index order.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::DuplicateVariable`] if a name appears twice.
    pub fn new<I, S>(names: I) -> Result<Self, KernelError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut vars = Self::default();
        for name in names {
            vars.push(name.into())?;
        }
        Ok(vars)
    }

    /// Registry of `X1..=Xn`.
    #[must_use]
    pub fn numbered(n: usize) -> Self {
        let names: Vec<String> = (1..=n).map(|i| format!("X{i}")).collect();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        Self { names, index }
    }

    fn push(&mut self, name: String) -> Result<usize, KernelError> {
        if self.index.contains_key(&name) {
            return Err(KernelError::DuplicateVariable { name });
        }
        let i = self.names.len();
        self.index.insert(name.clone(), i);
        self.names.push(name);
        Ok(i)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.names.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of `name`, if registered.
    #[must_use]
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Index of `name`.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnknownVariable`] if `name` is not registered.
    pub fn require(&self, name: &str) -> Result<usize, KernelError> {
        self.index_of(name)
            .ok_or_else(|| KernelError::UnknownVariable { name: name.into() })
    }

    /// Name at `index`, if in range.
    #[must_use]
    pub fn name(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// All names in index order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Resolve a list of names into indices, preserving order.
    ///
    /// # Errors
    ///
    /// Returns [`KernelError::UnknownVariable`] on the first unknown name.
    pub fn resolve_order<S: AsRef<str>>(&self, names: &[S]) -> Result<Vec<usize>, KernelError> {
        names.iter().map(|n| self.require(n.as_ref())).collect()
    }

    /// Render indices as names. Out-of-range indices render as `#<index>`.
    #[must_use]
    pub fn render(&self, indices: &[usize]) -> Vec<String> {
        indices
            .iter()
            .map(|&i| self.name(i).map_or_else(|| format!("#{i}"), str::to_string))
            .collect()
    }
}
