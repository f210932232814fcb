//! In-memory [`TokenCursor`] over a parsed `serde_json` document.

use std::fmt;

use serde::de::{DeserializeSeed, Deserializer, MapAccess, SeqAccess, Visitor};
use serde_json::Value as JsonValue;

use crate::{
    cursor::TokenCursor,
    error::TokenError,
    token::{Position, TokenKind},
};

#[derive(Debug, Clone, PartialEq)]
struct Token {
    kind: TokenKind,
    text: Option<String>,
    flag: bool,
    integral: bool,
    path: String,
}

impl Token {
    fn structural(kind: TokenKind, path: &str) -> Self {
        Self {
            kind,
            text: None,
            flag: false,
            integral: false,
            path: path.to_string(),
        }
    }

    fn scalar(kind: TokenKind, text: String, path: &str) -> Self {
        Self {
            kind,
            text: Some(text),
            ..Self::structural(kind, path)
        }
    }

    fn bool(value: bool, path: &str) -> Self {
        Self {
            flag: value,
            ..Self::scalar(TokenKind::Bool, value.to_string(), path)
        }
    }

    /// `literal` is kept as written; it is integral when it has no fraction
    /// or exponent.
    fn number(literal: String, path: &str) -> Self {
        Self {
            integral: !literal.contains(['.', 'e', 'E']),
            ..Self::scalar(TokenKind::Number, literal, path)
        }
    }
}

/// Token stream produced by flattening a JSON document.
///
/// Object members keep their document order. Text parsed with
/// [`parse`](Self::parse) keeps every occurrence of a repeated key and every
/// number literal exactly as written.
#[derive(Debug, Clone, PartialEq)]
pub struct TokenBuffer {
    tokens: Vec<Token>,
    cursor: Option<usize>,
}

impl TokenBuffer {
    /// Flatten an already-parsed JSON value.
    pub fn from_value(value: &JsonValue) -> Self {
        let mut tokens = Vec::new();
        flatten(value, "$", &mut tokens);
        Self {
            tokens,
            cursor: None,
        }
    }

    /// Tokenize JSON text.
    ///
    /// Tokens are emitted while parsing rather than from an intermediate
    /// `serde_json::Value`, whose maps keep only the last value of a key.
    pub fn parse(json: &str) -> Result<Self, TokenError> {
        let mut deserializer = serde_json::Deserializer::from_str(json);
        let mut tokens = Vec::new();
        TokenSink {
            path: "$".to_string(),
            out: &mut tokens,
        }
        .deserialize(&mut deserializer)
        .and_then(|()| deserializer.end())
        .map_err(|source| TokenError::Syntax { source })?;

        Ok(Self {
            tokens,
            cursor: None,
        })
    }

    /// Total number of tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }

    /// Move the cursor back before the first token.
    pub fn rewind(&mut self) {
        self.cursor = None;
    }

    fn current(&self) -> Option<&Token> {
        self.cursor.and_then(|i| self.tokens.get(i))
    }
}

impl TokenCursor for TokenBuffer {
    fn current_token(&self) -> Option<TokenKind> {
        self.current().map(|t| t.kind)
    }

    fn advance(&mut self) -> Result<Option<TokenKind>, TokenError> {
        let next = match self.cursor {
            None => 0,
            Some(i) => (i + 1).min(self.tokens.len()),
        };
        self.cursor = Some(next);
        Ok(self.current_token())
    }

    fn position(&self) -> Position {
        match self.current() {
            Some(token) => Position::new(self.cursor.unwrap_or_default(), token.path.clone()),
            None => Position::new(self.cursor.unwrap_or_default(), ""),
        }
    }

    fn text_value(&self) -> Option<&str> {
        self.current().and_then(|t| t.text.as_deref())
    }

    fn bool_value(&self) -> Option<bool> {
        self.current()
            .filter(|t| t.kind == TokenKind::Bool)
            .map(|t| t.flag)
    }

    fn is_integral(&self) -> bool {
        self.current()
            .is_some_and(|t| t.kind == TokenKind::Number && t.integral)
    }
}

fn flatten(value: &JsonValue, path: &str, out: &mut Vec<Token>) {
    match value {
        JsonValue::Null => out.push(Token::structural(TokenKind::Null, path)),
        JsonValue::Bool(b) => out.push(Token::bool(*b, path)),
        JsonValue::Number(n) => out.push(Token::number(n.to_string(), path)),
        JsonValue::String(s) => out.push(Token::scalar(TokenKind::String, s.clone(), path)),
        JsonValue::Array(items) => {
            out.push(Token::structural(TokenKind::ArrayStart, path));
            for (i, item) in items.iter().enumerate() {
                flatten(item, &format!("{path}[{i}]"), out);
            }
            out.push(Token::structural(TokenKind::ArrayEnd, path));
        }
        JsonValue::Object(members) => {
            out.push(Token::structural(TokenKind::ObjectStart, path));
            for (name, member) in members {
                let member_path = format!("{path}.{name}");
                out.push(Token::scalar(TokenKind::FieldName, name.clone(), &member_path));
                flatten(member, &member_path, out);
            }
            out.push(Token::structural(TokenKind::ObjectEnd, path));
        }
    }
}

/// Map key under which `serde_json`'s `arbitrary_precision` feature hands a
/// number literal to a visitor, as a one-entry map.
const NUMBER_LITERAL_KEY: &str = "$serde_json::private::Number";

/// Appends the tokens of one JSON value to `out` as it is parsed.
struct TokenSink<'a> {
    path: String,
    out: &'a mut Vec<Token>,
}

impl<'de> DeserializeSeed<'de> for TokenSink<'_> {
    type Value = ();

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<(), D::Error> {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for TokenSink<'_> {
    type Value = ();

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_unit<E>(self) -> Result<(), E> {
        self.out.push(Token::structural(TokenKind::Null, &self.path));
        Ok(())
    }

    fn visit_bool<E>(self, v: bool) -> Result<(), E> {
        self.out.push(Token::bool(v, &self.path));
        Ok(())
    }

    fn visit_i64<E>(self, v: i64) -> Result<(), E> {
        self.out.push(Token::number(v.to_string(), &self.path));
        Ok(())
    }

    fn visit_u64<E>(self, v: u64) -> Result<(), E> {
        self.out.push(Token::number(v.to_string(), &self.path));
        Ok(())
    }

    fn visit_f64<E>(self, v: f64) -> Result<(), E> {
        self.out.push(Token::number(v.to_string(), &self.path));
        Ok(())
    }

    fn visit_str<E>(self, v: &str) -> Result<(), E> {
        self.out
            .push(Token::scalar(TokenKind::String, v.to_string(), &self.path));
        Ok(())
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<(), A::Error> {
        let Self { path, out } = self;
        out.push(Token::structural(TokenKind::ArrayStart, &path));
        let mut index = 0usize;
        loop {
            let element = TokenSink {
                path: format!("{path}[{index}]"),
                out: &mut *out,
            };
            if seq.next_element_seed(element)?.is_none() {
                break;
            }
            index += 1;
        }
        out.push(Token::structural(TokenKind::ArrayEnd, &path));
        Ok(())
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<(), A::Error> {
        let Self { path, out } = self;
        let start = out.len();
        out.push(Token::structural(TokenKind::ObjectStart, &path));

        while let Some(name) = map.next_key::<String>()? {
            if name == NUMBER_LITERAL_KEY && out.len() == start + 1 {
                let literal: String = map.next_value()?;
                out.truncate(start);
                out.push(Token::number(literal, &path));
                return Ok(());
            }

            let member_path = format!("{path}.{name}");
            out.push(Token::scalar(TokenKind::FieldName, name, &member_path));
            map.next_value_seed(TokenSink {
                path: member_path,
                out: &mut *out,
            })?;
        }

        out.push(Token::structural(TokenKind::ObjectEnd, &path));
        Ok(())
    }
}
