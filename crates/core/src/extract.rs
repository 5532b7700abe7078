//! Typed extractors: read the current token as a typed value.
//!
//! Every extractor follows the same contract: fail with
//! [`ArgError::Missing`] at the end of input, convert the whole token
//! (no partial parses), apply sign constraints, and only then advance. A
//! failed extraction never moves the cursor and never produces a value.

use std::num::IntErrorKind;

use tracing::trace;

use crate::config::CoalesceDefaults;
use crate::cursor::ArgsCursor;
use crate::error::ArgError;
use crate::flags::ArgFlags;
use crate::spec::ValueType;
use crate::token::{HostString, Token};

/// Why a token failed numeric conversion.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Failure {
    /// Not a number at all.
    NotNumeric,
    /// A fractional number where an integer was required.
    Fractional,
    /// A number outside the target type's range.
    Range,
}

/// A primitive numeric target.
trait Numeric: Copy + PartialOrd {
    const TYPE: ValueType;
    const ZERO: Self;

    /// Convert the full text; `truncate` accepts fractional input for integers.
    fn from_text(text: &str, truncate: bool) -> Result<Self, Failure>;

    fn coalesced(defaults: &CoalesceDefaults) -> Self;
}

fn integer_from_text<T: TryFrom<i128>>(text: &str, truncate: bool) -> Result<T, Failure> {
    let n = decimal_to_integer(text, truncate)?;
    T::try_from(n).map_err(|_| Failure::Range)
}

/// Exact integer value of `[+-]digits[.digits][(e|E)[+-]digits]`.
///
/// Integral decimals ("10.0", "1e3") are integers too. The expansion is done
/// on the digits, so values past 2^53 keep every digit.
fn decimal_to_integer(text: &str, truncate: bool) -> Result<i128, Failure> {
    let (negative, body) = match text.as_bytes().first() {
        Some(b'-') => (true, &text[1..]),
        Some(b'+') => (false, &text[1..]),
        _ => (false, text),
    };
    let (mantissa, exponent) = match body.find(['e', 'E']) {
        Some(i) => (&body[..i], Some(&body[i + 1..])),
        None => (body, None),
    };
    let (int, frac) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    let is_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    if (int.is_empty() && frac.is_empty()) || !is_digits(int) || !is_digits(frac) {
        return Err(Failure::NotNumeric);
    }
    let exponent = match exponent.map(str::parse::<i64>) {
        None => 0,
        Some(Ok(e)) => e,
        Some(Err(e)) => match e.kind() {
            IntErrorKind::PosOverflow => i64::MAX,
            IntErrorKind::NegOverflow => i64::MIN,
            _ => return Err(Failure::NotNumeric),
        },
    };

    let digits = format!("{int}{frac}");
    let significant = digits.trim_start_matches('0');
    if significant.is_empty() {
        return Ok(0);
    }
    let scale = exponent.saturating_sub(frac.len() as i64);
    let whole = if scale < 0 {
        let dropped = usize::try_from(scale.unsigned_abs()).unwrap_or(usize::MAX);
        let (kept, fraction) = significant.split_at(significant.len().saturating_sub(dropped));
        if !truncate && fraction.bytes().any(|b| b != b'0') {
            return Err(Failure::Fractional);
        }
        kept
    } else {
        significant
    };
    if whole.is_empty() {
        return Ok(0);
    }

    let mut n: i128 = whole.parse().map_err(|_| Failure::Range)?;
    if scale > 0 {
        n = u32::try_from(scale)
            .ok()
            .and_then(|p| 10i128.checked_pow(p))
            .and_then(|m| n.checked_mul(m))
            .ok_or(Failure::Range)?;
    }
    Ok(if negative { -n } else { n })
}

macro_rules! impl_integer {
    ($ty:ty, $vt:expr, $field:ident) => {
        impl Numeric for $ty {
            const TYPE: ValueType = $vt;
            const ZERO: Self = 0;

            fn from_text(text: &str, truncate: bool) -> Result<Self, Failure> {
                integer_from_text(text, truncate)
            }

            fn coalesced(defaults: &CoalesceDefaults) -> Self {
                defaults.$field
            }
        }
    };
}

impl_integer!(i64, ValueType::I64, i64);
impl_integer!(u64, ValueType::U64, u64);
impl_integer!(u32, ValueType::U32, u32);
impl_integer!(i32, ValueType::I32, i32);

impl Numeric for f64 {
    const TYPE: ValueType = ValueType::F64;
    const ZERO: Self = 0.0;

    fn from_text(text: &str, _truncate: bool) -> Result<Self, Failure> {
        match text.parse::<f64>() {
            Ok(d) if d.is_nan() => Err(Failure::NotNumeric),
            // A finite literal too large for a double, not a spelled-out infinity.
            Ok(d) if d.is_infinite() && !names_infinity(text) => Err(Failure::Range),
            Ok(d) => Ok(d),
            Err(_) => Err(Failure::NotNumeric),
        }
    }

    fn coalesced(defaults: &CoalesceDefaults) -> Self {
        defaults.f64
    }
}

fn names_infinity(text: &str) -> bool {
    let unsigned = text.strip_prefix(['+', '-']).unwrap_or(text);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

impl<'a, H: HostString> ArgsCursor<'a, H> {
    /// Consume the current token unless `NO_ADVANCE` is set.
    fn finish(&mut self, flags: ArgFlags) {
        if !flags.contains(ArgFlags::NO_ADVANCE) {
            self.advance();
        }
    }

    fn get_number<T: Numeric>(&mut self, flags: ArgFlags) -> Result<T, ArgError> {
        let token = self.current().ok_or(ArgError::Missing)?;
        let coalesce = flags.contains(ArgFlags::COALESCE);
        let parsed = std::str::from_utf8(token.as_bytes())
            .map_err(|_| Failure::NotNumeric)
            .and_then(|text| T::from_text(text, coalesce));

        let value = match parsed {
            Ok(v) => v,
            Err(Failure::NotNumeric) if coalesce => {
                let expected = T::TYPE;
                trace!(token = %token.lossy(), %expected, "coalesced to default");
                T::coalesced(self.coalesce())
            }
            Err(Failure::Range) => return Err(out_of_range(&token, T::TYPE)),
            Err(_) => {
                return Err(ArgError::Parse {
                    token: token.lossy(),
                    expected: T::TYPE,
                });
            }
        };

        if flags.contains(ArgFlags::NON_NEGATIVE) && value < T::ZERO {
            return Err(out_of_range(&token, T::TYPE));
        }
        if flags.contains(ArgFlags::POSITIVE) && value <= T::ZERO {
            return Err(out_of_range(&token, T::TYPE));
        }

        self.finish(flags);
        Ok(value)
    }

    /// Read the current token as a signed 64-bit integer.
    pub fn get_i64(&mut self, flags: ArgFlags) -> Result<i64, ArgError> {
        self.get_number(flags)
    }

    /// Read the current token as an unsigned 64-bit integer.
    ///
    /// Negative input is out of range rather than malformed.
    pub fn get_u64(&mut self, flags: ArgFlags) -> Result<u64, ArgError> {
        self.get_number(flags)
    }

    /// Read the current token as an unsigned 32-bit integer.
    pub fn get_u32(&mut self, flags: ArgFlags) -> Result<u32, ArgError> {
        self.get_number(flags)
    }

    /// Read the current token as a signed 32-bit integer.
    pub fn get_i32(&mut self, flags: ArgFlags) -> Result<i32, ArgError> {
        self.get_number(flags)
    }

    /// Read the current token as a double. `NaN` is rejected.
    pub fn get_f64(&mut self, flags: ArgFlags) -> Result<f64, ArgError> {
        self.get_number(flags)
    }

    /// Read the current token as bytes. Only `NO_ADVANCE` applies.
    pub fn get_bytes(&mut self, flags: ArgFlags) -> Result<&'a [u8], ArgError> {
        let token = self.current().ok_or(ArgError::Missing)?;
        self.finish(flags);
        Ok(token.as_bytes())
    }

    /// Read the current token as UTF-8 text. Only `NO_ADVANCE` applies.
    pub fn get_str(&mut self, flags: ArgFlags) -> Result<&'a str, ArgError> {
        let token = self.current().ok_or(ArgError::Missing)?;
        let text = token.to_str()?;
        self.finish(flags);
        Ok(text)
    }

    /// Read the current token as-is, in its native storage.
    pub fn get_token(&mut self, flags: ArgFlags) -> Result<Token<'a, H>, ArgError> {
        let token = self.current().ok_or(ArgError::Missing)?;
        self.finish(flags);
        Ok(token)
    }

    /// Take the next token's bytes when the caller already knows it exists.
    ///
    /// Returns `None` instead of an error at the end of input.
    pub fn next_bytes(&mut self) -> Option<&'a [u8]> {
        self.get_bytes(ArgFlags::empty()).ok()
    }
}

fn out_of_range<H: HostString>(token: &Token<'_, H>, expected: ValueType) -> ArgError {
    ArgError::OutOfRange {
        token: token.lossy(),
        expected,
    }
}
