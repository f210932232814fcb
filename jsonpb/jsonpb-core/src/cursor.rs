//! Pull-style cursor over a token stream.

use crate::{
    error::{ScalarError, TokenError},
    number::{parse_float, parse_integral},
    token::{Position, TokenKind},
};

/// Pull cursor consumed by decoders.
///
/// A cursor starts before the first token; [`advance`](Self::advance) moves
/// to the next token and returns its kind, or `None` once the stream is
/// exhausted. Scalar accessors read the token the cursor currently sits on.
pub trait TokenCursor {
    /// Kind of the current token, `None` before the first token or past the end.
    fn current_token(&self) -> Option<TokenKind>;

    /// Move to the next token.
    fn advance(&mut self) -> Result<Option<TokenKind>, TokenError>;

    /// Location of the current token.
    fn position(&self) -> Position;

    /// Text of the current token: the name of a `FieldName`, the contents of a
    /// `String`, or the literal of a `Number` / `Bool`.
    fn text_value(&self) -> Option<&str>;

    /// Value of the current `Bool` token.
    fn bool_value(&self) -> Option<bool>;

    /// Whether the current `Number` token is an integral literal.
    fn is_integral(&self) -> bool;

    fn i32_value(&self) -> Result<i32, ScalarError> {
        parse_integral(self.number_text()?)
    }

    fn i64_value(&self) -> Result<i64, ScalarError> {
        parse_integral(self.number_text()?)
    }

    fn u32_value(&self) -> Result<u32, ScalarError> {
        parse_integral(self.number_text()?)
    }

    fn u64_value(&self) -> Result<u64, ScalarError> {
        parse_integral(self.number_text()?)
    }

    fn f32_value(&self) -> Result<f32, ScalarError> {
        parse_float(self.number_text()?)
    }

    fn f64_value(&self) -> Result<f64, ScalarError> {
        parse_float(self.number_text()?)
    }

    /// Skip the structure opened by the current token.
    ///
    /// When the current token is `ObjectStart` / `ArrayStart` the cursor ends
    /// on the matching close token; for any other token this is a no-op.
    fn skip_children(&mut self) -> Result<(), TokenError> {
        if !self.current_token().is_some_and(|t| t.is_container_start()) {
            return Ok(());
        }

        let mut depth = 1usize;
        while depth > 0 {
            match self.advance()? {
                Some(t) if t.is_container_start() => depth += 1,
                Some(t) if t.is_container_end() => depth -= 1,
                Some(_) => {}
                None => {
                    return Err(TokenError::UnexpectedEof {
                        position: self.position(),
                    });
                }
            }
        }
        Ok(())
    }

    #[doc(hidden)]
    fn number_text(&self) -> Result<&str, ScalarError> {
        match self.current_token() {
            Some(TokenKind::Number) => self.text_value().ok_or(ScalarError::Invalid),
            _ => Err(ScalarError::Invalid),
        }
    }
}
