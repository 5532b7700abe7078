//! Argument tokens: raw byte strings and host-native string handles.

use std::borrow::Cow;

use crate::error::ArgError;
use crate::spec::ValueType;

/// Byte accessor for a host-native string handle.
///
/// A host (command dispatcher, driver, FFI layer) owns its argument strings
/// in its own representation. The cursor never copies them; it only asks for
/// the bytes of the token currently under it.
pub trait HostString {
    /// The token's bytes, without any terminator.
    fn host_bytes(&self) -> &[u8];
}

impl HostString for String {
    fn host_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl HostString for &str {
    fn host_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl HostString for Box<str> {
    fn host_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl HostString for Cow<'_, str> {
    fn host_bytes(&self) -> &[u8] {
        self.as_bytes()
    }
}

impl HostString for Vec<u8> {
    fn host_bytes(&self) -> &[u8] {
        self
    }
}

impl HostString for Box<[u8]> {
    fn host_bytes(&self) -> &[u8] {
        self
    }
}

/// Which storage a cursor's tokens live in. Fixed at construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TokenKind {
    /// Plain byte strings.
    Raw,
    /// Host-native string handles.
    Host,
}

/// One argument token, borrowed from the caller's sequence.
#[derive(Debug)]
pub enum Token<'a, H> {
    /// A plain byte string.
    Raw(&'a [u8]),
    /// A host-native string handle.
    Host(&'a H),
}

// Manual impls: a derive would require `H: Clone`.
impl<H> Clone for Token<'_, H> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H> Copy for Token<'_, H> {}

impl<H: PartialEq> PartialEq for Token<'_, H> {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Token::Raw(a), Token::Raw(b)) => a == b,
            (Token::Host(a), Token::Host(b)) => a == b,
            _ => false,
        }
    }
}

impl<'a, H: HostString> Token<'a, H> {
    /// The token's bytes.
    pub fn as_bytes(&self) -> &'a [u8] {
        match *self {
            Token::Raw(bytes) => bytes,
            Token::Host(handle) => handle.host_bytes(),
        }
    }

    /// The token's length in bytes.
    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    /// Returns `true` for a zero-length token.
    pub fn is_empty(&self) -> bool {
        self.as_bytes().is_empty()
    }

    /// Which storage this token lives in.
    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Raw(_) => TokenKind::Raw,
            Token::Host(_) => TokenKind::Host,
        }
    }

    /// The token as UTF-8 text.
    pub fn to_str(&self) -> Result<&'a str, ArgError> {
        std::str::from_utf8(self.as_bytes()).map_err(|_| ArgError::Parse {
            token: self.lossy(),
            expected: ValueType::Bytes,
        })
    }

    /// Case-insensitive (ASCII) comparison against a name.
    pub fn eq_ignore_case(&self, name: &str) -> bool {
        self.as_bytes().eq_ignore_ascii_case(name.as_bytes())
    }

    /// Owned, lossily decoded copy of the token for error reporting.
    pub(crate) fn lossy(&self) -> String {
        String::from_utf8_lossy(self.as_bytes()).into_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_and_host_expose_same_bytes() {
        let owned = String::from("LIMIT");
        let raw: Token<'_, String> = Token::Raw(b"LIMIT");
        let host = Token::Host(&owned);
        assert_eq!(raw.as_bytes(), host.as_bytes());
        assert_eq!(raw.kind(), TokenKind::Raw);
        assert_eq!(host.kind(), TokenKind::Host);
        assert_eq!(host.len(), 5);
    }

    #[test]
    fn to_str_rejects_invalid_utf8() {
        let tok: Token<'_, String> = Token::Raw(&[0xff, 0xfe]);
        let err = tok.to_str().unwrap_err();
        assert!(matches!(err, ArgError::Parse { .. }));
    }

    #[test]
    fn eq_ignore_case_is_exact_length() {
        let tok: Token<'_, String> = Token::Raw(b"WithScores");
        assert!(tok.eq_ignore_case("WITHSCORES"));
        assert!(!tok.eq_ignore_case("WITHSCORE"));
        assert!(!tok.eq_ignore_case("WITHSCORESX"));
    }

    #[test]
    fn byte_vec_handles() {
        let handle: Vec<u8> = vec![b'4', b'2'];
        let tok = Token::Host(&handle);
        assert_eq!(tok.to_str().unwrap(), "42");
        assert!(!tok.is_empty());
    }
}
