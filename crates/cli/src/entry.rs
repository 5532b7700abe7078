//! `--entry NAME:TYPE[:FLAG,...]` definitions and the slots they fill.

use argcursor_core::{ArgFlags, ArgSpec, ArgTarget, ArgsCursor, Token, ValueType};
use serde_json::Value;

/// One spec entry requested on the command line.
#[derive(Debug, Clone, PartialEq)]
pub(crate) struct EntryDef {
    pub(crate) name: String,
    pub(crate) value_type: ValueType,
    pub(crate) flags: ArgFlags,
}

fn value_type(name: &str) -> Option<ValueType> {
    let vt = match name.to_ascii_lowercase().as_str() {
        "string" | "bytes" | "str" => ValueType::Bytes,
        "native-string" | "token" => ValueType::Token,
        "signed-64" | "i64" => ValueType::I64,
        "unsigned-64" | "u64" => ValueType::U64,
        "unsigned-32" | "u32" => ValueType::U32,
        "signed-32" | "i32" => ValueType::I32,
        "double" | "f64" => ValueType::F64,
        "flag" | "bool" => ValueType::Flag,
        _ => return None,
    };
    Some(vt)
}

fn flag(name: &str) -> Option<ArgFlags> {
    let f = match name.to_ascii_lowercase().as_str() {
        "positive" => ArgFlags::POSITIVE,
        "non-negative" => ArgFlags::NON_NEGATIVE,
        "no-advance" => ArgFlags::NO_ADVANCE,
        "coalesce" => ArgFlags::COALESCE,
        _ => return None,
    };
    Some(f)
}

/// Parse `NAME:TYPE[:FLAG,...]`; used as a clap value parser.
pub(crate) fn parse_entry(s: &str) -> Result<EntryDef, String> {
    let mut parts = s.splitn(3, ':');
    let name = parts.next().unwrap_or_default();
    if name.is_empty() {
        return Err("entry name is empty".to_string());
    }
    let ty = parts
        .next()
        .ok_or_else(|| format!("entry {name:?} has no type (expected NAME:TYPE)"))?;
    let value_type = value_type(ty).ok_or_else(|| format!("unknown value type {ty:?}"))?;

    let mut flags = ArgFlags::empty();
    if let Some(list) = parts.next() {
        for f in list.split(',').filter(|f| !f.is_empty()) {
            flags |= flag(f).ok_or_else(|| format!("unknown flag {f:?}"))?;
        }
    }

    Ok(EntryDef {
        name: name.to_string(),
        value_type,
        flags,
    })
}

/// Destination storage for one entry.
#[derive(Debug)]
enum Stored<'a> {
    Bytes(Option<&'a [u8]>),
    Token(Option<Token<'a, String>>),
    I64(i64),
    U64(u64),
    U32(u32),
    I32(i32),
    F64(f64),
    Flag(bool),
}

/// Caller-owned destination for one entry, plus its length output.
#[derive(Debug)]
pub(crate) struct Slot<'a> {
    stored: Stored<'a>,
    len: usize,
}

impl<'a> Slot<'a> {
    pub(crate) fn new(value_type: ValueType) -> Self {
        let stored = match value_type {
            ValueType::Bytes => Stored::Bytes(None),
            ValueType::Token => Stored::Token(None),
            ValueType::I64 => Stored::I64(0),
            ValueType::U64 => Stored::U64(0),
            ValueType::U32 => Stored::U32(0),
            ValueType::I32 => Stored::I32(0),
            ValueType::F64 => Stored::F64(0.0),
            ValueType::Flag => Stored::Flag(false),
        };
        Self { stored, len: 0 }
    }

    /// Borrow this slot as a matcher entry for `def`.
    pub(crate) fn spec<'t>(&'t mut self, def: &'t EntryDef) -> ArgSpec<'t, 'a, String> {
        let (target, takes_len) = match &mut self.stored {
            Stored::Bytes(v) => (ArgTarget::Bytes(v), true),
            Stored::Token(v) => (ArgTarget::Token(v), true),
            Stored::I64(v) => (ArgTarget::I64(v), false),
            Stored::U64(v) => (ArgTarget::U64(v), false),
            Stored::U32(v) => (ArgTarget::U32(v), false),
            Stored::I32(v) => (ArgTarget::I32(v), false),
            Stored::F64(v) => (ArgTarget::F64(v), false),
            Stored::Flag(v) => (ArgTarget::Flag(v), false),
        };
        let spec = ArgSpec::new(def.name.as_str(), target).with_flags(def.flags);
        if takes_len {
            spec.with_len(&mut self.len)
        } else {
            spec
        }
    }

    /// The slot's value as JSON; string slots that were never filled are `null`.
    pub(crate) fn to_json(&self) -> Value {
        match &self.stored {
            Stored::Bytes(v) => v.map_or(Value::Null, |b| {
                Value::String(String::from_utf8_lossy(b).into_owned())
            }),
            Stored::Token(v) => v.map_or(Value::Null, |t| {
                Value::String(String::from_utf8_lossy(t.as_bytes()).into_owned())
            }),
            Stored::I64(v) => Value::from(*v),
            Stored::U64(v) => Value::from(*v),
            Stored::U32(v) => Value::from(*v),
            Stored::I32(v) => Value::from(*v),
            Stored::F64(v) => Value::from(*v),
            Stored::Flag(v) => Value::Bool(*v),
        }
    }

    /// Byte length reported for string slots.
    pub(crate) fn len(&self) -> Option<usize> {
        matches!(self.stored, Stored::Bytes(_) | Stored::Token(_)).then_some(self.len)
    }
}

/// Run the matcher over `ac` with one slot per entry.
pub(crate) fn run<'a>(
    ac: &mut ArgsCursor<'a, String>,
    defs: &[EntryDef],
    slots: &mut [Slot<'a>],
) -> Result<(), argcursor_core::SpecError> {
    let mut specs: Vec<ArgSpec<'_, 'a, String>> = slots
        .iter_mut()
        .zip(defs)
        .map(|(slot, def)| slot.spec(def))
        .collect();
    argcursor_core::parse_arg_spec(ac, &mut specs)
}
