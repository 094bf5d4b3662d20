//! Named and positional parameter storage with optional type tags.
//!
//! Placeholders are opaque tokens in the rendered SQL; the store never
//! escapes or interpolates values. The execution layer is responsible for
//! binding.

use std::fmt;

use serde_json::Value;

/// Driver-facing tag describing how a bound value should be typed.
///
/// Tags are carried verbatim to the execution layer; the assembler never
/// interprets them.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ParameterType {
    /// SQL NULL.
    Null,
    /// Integer.
    Integer,
    /// Character string.
    String,
    /// Boolean.
    Boolean,
    /// Floating point number.
    Float,
    /// Binary blob.
    Binary,
}

/// Key addressing one placeholder: a name (for `:name` tokens) or a 1-based
/// position (for `?` tokens).
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ParamKey {
    /// Named placeholder; stored without the leading `:`.
    Named(String),
    /// Positional placeholder, 1-based.
    Positional(usize),
}

impl From<&str> for ParamKey {
    fn from(name: &str) -> Self {
        ParamKey::Named(name.strip_prefix(':').unwrap_or(name).to_string())
    }
}

impl From<String> for ParamKey {
    fn from(name: String) -> Self {
        ParamKey::from(name.as_str())
    }
}

impl From<usize> for ParamKey {
    fn from(position: usize) -> Self {
        ParamKey::Positional(position)
    }
}

impl fmt::Display for ParamKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ParamKey::Named(name) => f.write_str(name),
            ParamKey::Positional(position) => write!(f, "{position}"),
        }
    }
}

#[derive(Clone, Debug)]
struct ParamEntry {
    key: ParamKey,
    value: Value,
    ty: Option<ParameterType>,
}

/// Insertion-ordered store of placeholder bindings.
///
/// Untyped entries are retrievable by value but absent from the typed view
/// ([`ParameterStore::parameter_types`]).
#[derive(Clone, Debug, Default)]
pub struct ParameterStore {
    entries: Vec<ParamEntry>,
    named_counter: usize,
    positional_counter: usize,
}

impl ParameterStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind `value` under a named placeholder and return the placeholder text.
    ///
    /// With an explicit `placeholder` the text is returned as given (one
    /// leading `:` is stripped for the internal key). Without one, the key is
    /// auto-generated as `dcValueN` and `":dcValueN"` is returned.
    pub fn create_named_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
        placeholder: Option<&str>,
    ) -> String {
        match placeholder {
            Some(text) => {
                self.insert(ParamKey::from(text), value.into(), ty);
                text.to_string()
            }
            None => {
                self.named_counter += 1;
                let name = format!("dcValue{}", self.named_counter);
                self.insert(ParamKey::Named(name.clone()), value.into(), ty);
                format!(":{name}")
            }
        }
    }

    /// Bind `value` at the next free integer position (starting at 1) and
    /// return `"?"`.
    pub fn create_positional_parameter(
        &mut self,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
    ) -> String {
        self.positional_counter += 1;
        self.insert(
            ParamKey::Positional(self.positional_counter),
            value.into(),
            ty,
        );
        "?".to_string()
    }

    /// Upsert a binding under an explicit key.
    pub fn set_parameter(
        &mut self,
        key: impl Into<ParamKey>,
        value: impl Into<Value>,
        ty: Option<ParameterType>,
    ) {
        self.insert(key.into(), value.into(), ty);
    }

    fn insert(&mut self, key: ParamKey, value: Value, ty: Option<ParameterType>) {
        if let Some(entry) = self.entries.iter_mut().find(|entry| entry.key == key) {
            entry.value = value;
            entry.ty = ty;
        } else {
            self.entries.push(ParamEntry { key, value, ty });
        }
    }

    /// The bound value, if the key is present (typed or not).
    pub fn parameter(&self, key: impl Into<ParamKey>) -> Option<&Value> {
        let key = key.into();
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .map(|entry| &entry.value)
    }

    /// The type tag for a key.
    ///
    /// Absent and present-but-untyped both read as `None`; the distinction
    /// is observable through [`ParameterStore::parameter`] and
    /// [`ParameterStore::parameter_types`].
    pub fn parameter_type(&self, key: impl Into<ParamKey>) -> Option<ParameterType> {
        let key = key.into();
        self.entries
            .iter()
            .find(|entry| entry.key == key)
            .and_then(|entry| entry.ty)
    }

    /// Every binding, in insertion order.
    pub fn parameters(&self) -> impl Iterator<Item = (&ParamKey, &Value)> {
        self.entries.iter().map(|entry| (&entry.key, &entry.value))
    }

    /// Only the explicitly typed bindings, in insertion order.
    pub fn parameter_types(&self) -> impl Iterator<Item = (&ParamKey, ParameterType)> {
        self.entries
            .iter()
            .filter_map(|entry| entry.ty.map(|ty| (&entry.key, ty)))
    }

    /// Number of bindings.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True when no binding is stored.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
