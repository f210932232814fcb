use std::fmt;

/// Kind of a single token in a JSON-like token stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    ObjectStart,
    ObjectEnd,
    ArrayStart,
    ArrayEnd,
    FieldName,
    String,
    Number,
    Bool,
    Null,
}

impl TokenKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ObjectStart => "START_OBJECT",
            Self::ObjectEnd => "END_OBJECT",
            Self::ArrayStart => "START_ARRAY",
            Self::ArrayEnd => "END_ARRAY",
            Self::FieldName => "FIELD_NAME",
            Self::String => "VALUE_STRING",
            Self::Number => "VALUE_NUMBER",
            Self::Bool => "VALUE_BOOL",
            Self::Null => "VALUE_NULL",
        }
    }

    /// Whether the token opens a nested structure.
    pub fn is_container_start(&self) -> bool {
        matches!(self, Self::ObjectStart | Self::ArrayStart)
    }

    /// Whether the token closes a nested structure.
    pub fn is_container_end(&self) -> bool {
        matches!(self, Self::ObjectEnd | Self::ArrayEnd)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Location of a token in its stream.
///
/// `index` is the zero-based ordinal of the token; `path` is a `$`-rooted
/// path to the value the token belongs to (e.g. `$.inner.items[2]`).
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Position {
    pub index: usize,
    pub path: String,
}

impl Position {
    pub fn new(index: usize, path: impl Into<String>) -> Self {
        Self {
            index,
            path: path.into(),
        }
    }
}

impl fmt::Display for Position {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "token {}", self.index)
        } else {
            write!(f, "token {} ({})", self.index, self.path)
        }
    }
}
