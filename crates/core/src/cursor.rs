//! Forward-only cursor over a caller-owned argument list.
//!
//! The cursor borrows the token slice and never copies, allocates or frees
//! tokens. Its only state is the read position and the coalesce
//! configuration, so sub-cursors are plain views over a narrower slice.

use tracing::trace;

use crate::config::CoalesceDefaults;
use crate::error::ArgError;
use crate::flags::ArgFlags;
use crate::token::{HostString, Token, TokenKind};

/// Backing storage of a cursor: one kind for the whole sequence.
enum Tokens<'a, H> {
    Raw(&'a [&'a [u8]]),
    Host(&'a [H]),
}

impl<H> Clone for Tokens<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Tokens<'_, H> {}

impl<'a, H> Tokens<'a, H> {
    fn len(&self) -> usize {
        match self {
            Tokens::Raw(argv) => argv.len(),
            Tokens::Host(argv) => argv.len(),
        }
    }

    fn get(&self, index: usize) -> Option<Token<'a, H>> {
        match *self {
            Tokens::Raw(argv) => argv.get(index).map(|t| Token::Raw(*t)),
            Tokens::Host(argv) => argv.get(index).map(Token::Host),
        }
    }

    fn sub(&self, start: usize, end: usize) -> Self {
        match *self {
            Tokens::Raw(argv) => Tokens::Raw(&argv[start..end]),
            Tokens::Host(argv) => Tokens::Host(&argv[start..end]),
        }
    }
}

/// Cursor over an ordered, read-only sequence of argument tokens.
///
/// Invariant: `position() + remaining() == len()`, and the position never
/// exceeds `len()`.
///
/// The host type `H` only matters for cursors built with
/// [`ArgsCursor::from_host`]; raw cursors use the `String` default.
pub struct ArgsCursor<'a, H = String> {
    tokens: Tokens<'a, H>,
    position: usize,
    coalesce: CoalesceDefaults,
}

impl<H> Clone for ArgsCursor<'_, H> {
    fn clone(&self) -> Self {
        Self {
            tokens: self.tokens,
            position: self.position,
            coalesce: self.coalesce,
        }
    }
}

impl<H> std::fmt::Debug for ArgsCursor<'_, H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let kind = match self.tokens {
            Tokens::Raw(_) => TokenKind::Raw,
            Tokens::Host(_) => TokenKind::Host,
        };
        f.debug_struct("ArgsCursor")
            .field("kind", &kind)
            .field("len", &self.tokens.len())
            .field("position", &self.position)
            .finish()
    }
}

impl<'a> ArgsCursor<'a> {
    /// Create a cursor over plain byte-string tokens, positioned at the first.
    pub fn from_raw(argv: &'a [&'a [u8]]) -> Self {
        Self {
            tokens: Tokens::Raw(argv),
            position: 0,
            coalesce: CoalesceDefaults::default(),
        }
    }
}

impl<'a, H: HostString> ArgsCursor<'a, H> {
    /// Create a cursor over host-native string handles, positioned at the first.
    pub fn from_host(argv: &'a [H]) -> Self {
        Self {
            tokens: Tokens::Host(argv),
            position: 0,
            coalesce: CoalesceDefaults::default(),
        }
    }

    /// Replace the values produced for non-numeric input under
    /// [`ArgFlags::COALESCE`].
    pub fn with_coalesce(mut self, defaults: CoalesceDefaults) -> Self {
        self.coalesce = defaults;
        self
    }

    /// The coalesce configuration in effect.
    pub fn coalesce(&self) -> &CoalesceDefaults {
        &self.coalesce
    }

    /// Which storage this cursor's tokens live in.
    pub fn kind(&self) -> TokenKind {
        match self.tokens {
            Tokens::Raw(_) => TokenKind::Raw,
            Tokens::Host(_) => TokenKind::Host,
        }
    }

    /// Total number of tokens, fixed at construction.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Returns `true` if the cursor was built over no tokens at all.
    pub fn is_empty(&self) -> bool {
        self.tokens.len() == 0
    }

    /// Zero-based index of the next token to be read.
    pub fn position(&self) -> usize {
        self.position
    }

    /// Number of tokens not yet consumed.
    pub fn remaining(&self) -> usize {
        self.tokens.len() - self.position
    }

    /// Returns `true` once every token has been consumed.
    pub fn is_at_end(&self) -> bool {
        self.position >= self.tokens.len()
    }

    /// The token at the current position, or `None` at the end.
    pub fn current(&self) -> Option<Token<'a, H>> {
        self.tokens.get(self.position)
    }

    /// The token `offset` positions ahead of the current one.
    pub fn peek_at(&self, offset: usize) -> Option<Token<'a, H>> {
        self.tokens.get(self.position.checked_add(offset)?)
    }

    /// Advance by one token. Returns `false` if already at the end.
    pub fn advance(&mut self) -> bool {
        self.advance_by(1)
    }

    /// Advance by `by` tokens, clamping at the end.
    ///
    /// Returns `false` iff `by` exceeds [`remaining()`](Self::remaining); the
    /// cursor is then left at the end.
    pub fn advance_by(&mut self, by: usize) -> bool {
        let remaining = self.remaining();
        if by > remaining {
            trace!(by, remaining, "advance clamped at end");
            self.position = self.tokens.len();
            return false;
        }
        self.position += by;
        true
    }

    /// Take the next `n` tokens as an independent sub-cursor.
    ///
    /// The sub-cursor starts at its own position 0 and inherits the coalesce
    /// configuration. Fails with [`ArgError::Missing`] without moving if
    /// fewer than `n` tokens remain.
    pub fn get_slice(&mut self, n: usize) -> Result<ArgsCursor<'a, H>, ArgError> {
        if n > self.remaining() {
            return Err(ArgError::Missing);
        }
        let start = self.position;
        self.position += n;
        Ok(ArgsCursor {
            tokens: self.tokens.sub(start, start + n),
            position: 0,
            coalesce: self.coalesce,
        })
    }

    /// Read a variadic group: `<count> <arg 1> .. <arg count>`.
    ///
    /// The count token is consumed as soon as it parses, so a count larger
    /// than what follows leaves the cursor just past the count and fails with
    /// [`ArgError::Missing`].
    pub fn get_var_args(&mut self) -> Result<ArgsCursor<'a, H>, ArgError> {
        let count = self.get_u32(ArgFlags::empty())? as usize;
        trace!(count, remaining = self.remaining(), "variadic group");
        self.get_slice(count)
    }
}

/// Iterator over the tokens a cursor has not consumed yet.
///
/// Created by [`ArgsCursor::iter`] and by `IntoIterator`. Iterating never
/// moves the cursor it came from.
pub struct Remaining<'a, H = String> {
    tokens: Tokens<'a, H>,
    position: usize,
}

impl<'a, H> Iterator for Remaining<'a, H> {
    type Item = Token<'a, H>;

    fn next(&mut self) -> Option<Self::Item> {
        let token = self.tokens.get(self.position)?;
        self.position += 1;
        Some(token)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let n = self.tokens.len().saturating_sub(self.position);
        (n, Some(n))
    }
}

impl<H> ExactSizeIterator for Remaining<'_, H> {}

impl<'a, H: HostString> ArgsCursor<'a, H> {
    /// The unread tokens, without consuming them.
    pub fn iter(&self) -> Remaining<'a, H> {
        Remaining {
            tokens: self.tokens,
            position: self.position,
        }
    }
}

impl<'a, H: HostString> IntoIterator for ArgsCursor<'a, H> {
    type Item = Token<'a, H>;
    type IntoIter = Remaining<'a, H>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
