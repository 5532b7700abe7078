//! Declarative name → typed-destination matching.
//!
//! A spec table maps argument names to caller-owned destinations. The
//! matcher walks the cursor once: each token is taken as a name, looked up
//! case-insensitively, and the value that follows it (if the entry takes
//! one) is extracted straight into the destination.

use std::fmt;

use tracing::{debug, trace};

use crate::cursor::ArgsCursor;
use crate::error::{ArgError, SpecError};
use crate::flags::ArgFlags;
use crate::token::{HostString, Token};

/// Type of value a spec entry extracts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueType {
    /// Raw byte string.
    Bytes,
    /// Token in the host's native storage.
    Token,
    /// Signed 64-bit integer.
    I64,
    /// Unsigned 64-bit integer.
    U64,
    /// Unsigned 32-bit integer.
    U32,
    /// Signed 32-bit integer.
    I32,
    /// Double-precision float.
    F64,
    /// Presence flag; takes no value.
    Flag,
}

impl ValueType {
    /// Stable lowercase name, as used in messages.
    pub fn name(self) -> &'static str {
        match self {
            ValueType::Bytes => "string",
            ValueType::Token => "native-string",
            ValueType::I64 => "signed-64",
            ValueType::U64 => "unsigned-64",
            ValueType::U32 => "unsigned-32",
            ValueType::I32 => "signed-32",
            ValueType::F64 => "double",
            ValueType::Flag => "flag",
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Caller-owned destination of a spec entry.
///
/// Destinations are only written when extraction succeeds. String
/// destinations are `Option`s so callers can tell which names appeared;
/// numeric destinations keep whatever default the caller put there.
#[derive(Debug)]
pub enum ArgTarget<'t, 'a, H = String> {
    /// Byte string destination.
    Bytes(&'t mut Option<&'a [u8]>),
    /// Native token destination.
    Token(&'t mut Option<Token<'a, H>>),
    /// Signed 64-bit destination.
    I64(&'t mut i64),
    /// Unsigned 64-bit destination.
    U64(&'t mut u64),
    /// Unsigned 32-bit destination.
    U32(&'t mut u32),
    /// Signed 32-bit destination.
    I32(&'t mut i32),
    /// Double destination.
    F64(&'t mut f64),
    /// Set to `true` when the name appears.
    Flag(&'t mut bool),
}

impl<H> ArgTarget<'_, '_, H> {
    /// Type of value this destination receives.
    pub fn value_type(&self) -> ValueType {
        match self {
            ArgTarget::Bytes(_) => ValueType::Bytes,
            ArgTarget::Token(_) => ValueType::Token,
            ArgTarget::I64(_) => ValueType::I64,
            ArgTarget::U64(_) => ValueType::U64,
            ArgTarget::U32(_) => ValueType::U32,
            ArgTarget::I32(_) => ValueType::I32,
            ArgTarget::F64(_) => ValueType::F64,
            ArgTarget::Flag(_) => ValueType::Flag,
        }
    }
}

/// One entry of a spec table.
#[derive(Debug)]
pub struct ArgSpec<'t, 'a, H = String> {
    /// Name that selects this entry, matched ignoring ASCII case.
    pub name: &'t str,
    /// Where the value goes.
    pub target: ArgTarget<'t, 'a, H>,
    /// Flags applied to the value extraction.
    pub flags: ArgFlags,
    /// Receives the byte length for string destinations.
    pub len: Option<&'t mut usize>,
}

impl<'t, 'a, H: HostString> ArgSpec<'t, 'a, H> {
    /// Entry with no flags and no length destination.
    pub fn new(name: &'t str, target: ArgTarget<'t, 'a, H>) -> Self {
        Self {
            name,
            target,
            flags: ArgFlags::empty(),
            len: None,
        }
    }

    /// Set the extraction flags.
    pub fn with_flags(mut self, flags: ArgFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Also write the byte length of a string value into `len`.
    pub fn with_len(mut self, len: &'t mut usize) -> Self {
        self.len = Some(len);
        self
    }

    /// Type of value this entry extracts.
    pub fn value_type(&self) -> ValueType {
        self.target.value_type()
    }

    /// Extract this entry's value from the cursor into its destination.
    fn fill(&mut self, ac: &mut ArgsCursor<'a, H>) -> Result<(), ArgError> {
        let flags = self.flags;
        match &mut self.target {
            ArgTarget::Bytes(out) => {
                let bytes = ac.get_bytes(flags)?;
                if let Some(len) = self.len.as_deref_mut() {
                    *len = bytes.len();
                }
                **out = Some(bytes);
            }
            ArgTarget::Token(out) => {
                let token = ac.get_token(flags)?;
                if let Some(len) = self.len.as_deref_mut() {
                    *len = token.len();
                }
                **out = Some(token);
            }
            ArgTarget::I64(out) => **out = ac.get_i64(flags)?,
            ArgTarget::U64(out) => **out = ac.get_u64(flags)?,
            ArgTarget::U32(out) => **out = ac.get_u32(flags)?,
            ArgTarget::I32(out) => **out = ac.get_i32(flags)?,
            ArgTarget::F64(out) => **out = ac.get_f64(flags)?,
            ArgTarget::Flag(out) => **out = true,
        }
        Ok(())
    }
}

/// Match the remaining tokens against a spec table.
///
/// Runs until the cursor is exhausted (success) or the first failure. Entries
/// whose names never appear are left untouched; a name that appears twice
/// overwrites the earlier value. When several entries share a name the first
/// one wins.
///
/// On [`SpecError::UnknownName`] the cursor sits just past the unknown name;
/// on [`SpecError::Invalid`] it sits on the value that failed.
pub fn parse_arg_spec<'a, H: HostString>(
    ac: &mut ArgsCursor<'a, H>,
    specs: &mut [ArgSpec<'_, 'a, H>],
) -> Result<(), SpecError> {
    while let Some(token) = ac.current() {
        let at = ac.position();
        ac.advance();

        let Some(index) = specs.iter().position(|s| token.eq_ignore_case(s.name)) else {
            let name = token.lossy();
            debug!(arg = %name, at, "unknown argument name");
            return Err(SpecError::UnknownName { name, at });
        };

        let spec = &mut specs[index];
        let name = spec.name;
        trace!(arg = name, at, value_type = %spec.value_type(), "matched spec entry");

        if let Err(source) = spec.fill(ac) {
            debug!(arg = name, at, error = %source, "spec entry failed");
            return Err(SpecError::Invalid {
                index,
                name: name.to_string(),
                at,
                source,
            });
        }
    }
    Ok(())
}
