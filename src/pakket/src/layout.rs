//! Textual descriptions of bit-packed record layouts.
//!
//! A layout is a comma-separated list of fields, such as
//! `u8,i16,f32,u3,i17,bytes:4,str:16`.

use std::{fmt, str::FromStr};

use pakket_bit_buf::{BitReader, BitWriter};
use pakket_utils::{bits::low_mask, text::truncate_str};
use thiserror::Error;

/// Errors produced when parsing layouts and field values.
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum LayoutError {
    /// The layout names a field kind that does not exist.
    #[error("unknown field kind '{0}'")]
    UnknownField(String),

    /// A field width or length is out of its supported range.
    #[error("invalid width in field '{0}'")]
    InvalidWidth(String),

    /// A value cannot be represented by its field.
    #[error("value '{value}' does not fit field '{field}'")]
    InvalidValue { field: Field, value: String },

    /// The number of values does not match the number of fields.
    #[error("layout has {expected} fields, but {actual} values were given")]
    ValueCount { expected: usize, actual: usize },
}

/// A single field in a [`Layout`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Field {
    /// A single bit flag.
    Bool,
    /// An unsigned integer of the given bit width.
    Uint(u32),
    /// A signed integer of the given bit width.
    Int(u32),
    /// An IEEE-754 single precision float.
    F32,
    /// An IEEE-754 double precision float.
    F64,
    /// A run of the given number of bytes.
    Bytes(usize),
    /// A null-terminated string, optionally bounded in length.
    Str(Option<usize>),
}

/// A decoded field value, or one about to be encoded.
#[derive(Clone, Debug, PartialEq)]
pub enum Value {
    Bool(bool),
    Uint(u64, u32),
    Int(i64, u32),
    F32(f32),
    F64(f64),
    Bytes(Vec<u8>),
    Str(String, Option<usize>),
}

/// An ordered list of [`Field`]s.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Layout(pub Vec<Field>);

fn parse_width(spec: &str, digits: &str) -> Result<u32, LayoutError> {
    match digits.parse() {
        Ok(nbits @ 1..=64) => Ok(nbits),
        _ => Err(LayoutError::InvalidWidth(spec.to_owned())),
    }
}

fn parse_len(spec: &str, digits: &str) -> Result<usize, LayoutError> {
    digits
        .parse()
        .map_err(|_| LayoutError::InvalidWidth(spec.to_owned()))
}

fn parse_hex(s: &str) -> Option<Vec<u8>> {
    if s.len() % 2 != 0 {
        return None;
    }

    (0..s.len())
        .step_by(2)
        .map(|i| s.get(i..i + 2).and_then(|b| u8::from_str_radix(b, 16).ok()))
        .collect()
}

fn parse_uint(s: &str) -> Option<u64> {
    match s.strip_prefix("0x") {
        Some(hex) => u64::from_str_radix(hex, 16).ok(),
        None => s.parse().ok(),
    }
}

impl FromStr for Field {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let spec = s.trim();

        let field = match spec {
            "bool" => Self::Bool,
            "f32" => Self::F32,
            "f64" => Self::F64,
            "str" => Self::Str(None),

            _ => {
                if let Some(len) = spec.strip_prefix("bytes:") {
                    Self::Bytes(parse_len(spec, len)?)
                } else if let Some(len) = spec.strip_prefix("str:") {
                    Self::Str(Some(parse_len(spec, len)?))
                } else if let Some(nbits) = spec.strip_prefix('u') {
                    Self::Uint(parse_width(spec, nbits)?)
                } else if let Some(nbits) = spec.strip_prefix('i') {
                    Self::Int(parse_width(spec, nbits)?)
                } else {
                    return Err(LayoutError::UnknownField(spec.to_owned()));
                }
            }
        };

        Ok(field)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool => f.write_str("bool"),
            Self::Uint(nbits) => write!(f, "u{nbits}"),
            Self::Int(nbits) => write!(f, "i{nbits}"),
            Self::F32 => f.write_str("f32"),
            Self::F64 => f.write_str("f64"),
            Self::Bytes(len) => write!(f, "bytes:{len}"),
            Self::Str(None) => f.write_str("str"),
            Self::Str(Some(max)) => write!(f, "str:{max}"),
        }
    }
}

impl Field {
    /// Reads a value of this field's kind from `reader`.
    pub fn decode(self, reader: &mut BitReader) -> pakket_bit_buf::Result<Value> {
        let value = match self {
            Self::Bool => Value::Bool(reader.read_bool()?),

            Self::Uint(8) => Value::Uint(reader.read_u8()?.into(), 8),
            Self::Uint(16) => Value::Uint(reader.read_u16()?.into(), 16),
            Self::Uint(32) => Value::Uint(reader.read_u32()?.into(), 32),
            Self::Uint(64) => Value::Uint(reader.read_u64()?, 64),
            Self::Uint(nbits) => Value::Uint(reader.read_uint(nbits)?, nbits),

            Self::Int(8) => Value::Int(reader.read_i8()?.into(), 8),
            Self::Int(16) => Value::Int(reader.read_i16()?.into(), 16),
            Self::Int(32) => Value::Int(reader.read_i32()?.into(), 32),
            Self::Int(64) => Value::Int(reader.read_i64()?, 64),
            Self::Int(nbits) => Value::Int(reader.read_int(nbits)?, nbits),

            Self::F32 => Value::F32(reader.read_f32()?),
            Self::F64 => Value::F64(reader.read_f64()?),
            Self::Bytes(len) => Value::Bytes(reader.read_bytes(len)?),
            Self::Str(max) => Value::Str(reader.read_string(max)?, max),
        };

        Ok(value)
    }

    /// Parses a textual value for this field.
    ///
    /// Integers accept decimal or `0x`-prefixed hex notation, byte
    /// runs are given as hex strings of the exact length.
    pub fn parse_value(self, s: &str) -> Result<Value, LayoutError> {
        let value = match self {
            Self::Bool => match s {
                "true" | "1" => Some(Value::Bool(true)),
                "false" | "0" => Some(Value::Bool(false)),
                _ => None,
            },

            Self::Uint(nbits) => parse_uint(s)
                .filter(|&v| v <= low_mask(nbits))
                .map(|v| Value::Uint(v, nbits)),

            Self::Int(nbits) => s
                .parse::<i64>()
                .ok()
                .filter(|v| (i64::MIN >> (64 - nbits)..=i64::MAX >> (64 - nbits)).contains(v))
                .map(|v| Value::Int(v, nbits)),

            Self::F32 => s.parse().ok().map(Value::F32),
            Self::F64 => s.parse().ok().map(Value::F64),

            Self::Bytes(len) => parse_hex(s)
                .filter(|b| b.len() == len)
                .map(Value::Bytes),

            Self::Str(max) => (!s.contains('\0')).then(|| Value::Str(s.to_owned(), max)),
        };

        value.ok_or_else(|| LayoutError::InvalidValue {
            field: self,
            value: s.to_owned(),
        })
    }
}

impl Value {
    /// Gets the number of bits this value occupies when encoded.
    pub fn bit_len(&self) -> usize {
        match self {
            Self::Bool(..) => 1,
            Self::Uint(_, nbits) | Self::Int(_, nbits) => *nbits as usize,
            Self::F32(..) => 32,
            Self::F64(..) => 64,
            Self::Bytes(b) => b.len() << 3,
            Self::Str(s, None) => (s.len() + 1) << 3,
            Self::Str(s, Some(max)) => {
                let len = truncate_str(s, *max).len();
                (len + (len < *max) as usize) << 3
            }
        }
    }

    /// Writes this value to `writer`.
    pub fn encode(&self, writer: &mut BitWriter) -> pakket_bit_buf::Result<()> {
        match *self {
            Self::Bool(v) => writer.write_bool(v),

            Self::Uint(v, 8) => writer.write_u8(v as u8),
            Self::Uint(v, 16) => writer.write_u16(v as u16),
            Self::Uint(v, 32) => writer.write_u32(v as u32),
            Self::Uint(v, 64) => writer.write_u64(v),
            Self::Uint(v, nbits) => writer.write_uint(v, nbits),

            Self::Int(v, 8) => writer.write_i8(v as i8),
            Self::Int(v, 16) => writer.write_i16(v as i16),
            Self::Int(v, 32) => writer.write_i32(v as i32),
            Self::Int(v, 64) => writer.write_i64(v),
            Self::Int(v, nbits) => writer.write_int(v, nbits),

            Self::F32(v) => writer.write_f32(v),
            Self::F64(v) => writer.write_f64(v),
            Self::Bytes(ref b) => writer.write_bytes(b),
            Self::Str(ref s, None) => writer.write_string(s),
            Self::Str(ref s, Some(max)) => writer.write_string_bounded(s, max),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(v) => write!(f, "{v}"),
            Self::Uint(v, _) => write!(f, "{v}"),
            Self::Int(v, _) => write!(f, "{v}"),
            Self::F32(v) => write!(f, "{v}"),
            Self::F64(v) => write!(f, "{v}"),
            Self::Bytes(b) => b.iter().try_for_each(|b| write!(f, "{b:02x}")),
            Self::Str(s, _) => write!(f, "{s:?}"),
        }
    }
}

impl FromStr for Layout {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.split(',').map(str::parse).collect::<Result<_, _>>().map(Self)
    }
}

impl Layout {
    /// Parses one value per field of the layout.
    pub fn parse_values<S: AsRef<str>>(&self, values: &[S]) -> Result<Vec<Value>, LayoutError> {
        if values.len() != self.0.len() {
            return Err(LayoutError::ValueCount {
                expected: self.0.len(),
                actual: values.len(),
            });
        }

        self.0
            .iter()
            .zip(values)
            .map(|(field, v)| field.parse_value(v.as_ref()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_layout() {
        let layout: Layout = "u8, i16,f32,u3,i17,bytes:4,str,str:16,bool,f64,u64"
            .parse()
            .unwrap();

        assert_eq!(
            layout.0,
            [
                Field::Uint(8),
                Field::Int(16),
                Field::F32,
                Field::Uint(3),
                Field::Int(17),
                Field::Bytes(4),
                Field::Str(None),
                Field::Str(Some(16)),
                Field::Bool,
                Field::F64,
                Field::Uint(64),
            ]
        );
    }

    #[test]
    fn reject_bad_fields() {
        assert_eq!(
            "u8,q7".parse::<Layout>(),
            Err(LayoutError::UnknownField("q7".into()))
        );
        assert_eq!(
            "u65".parse::<Field>(),
            Err(LayoutError::InvalidWidth("u65".into()))
        );
        assert_eq!(
            "i0".parse::<Field>(),
            Err(LayoutError::InvalidWidth("i0".into()))
        );
        assert_eq!(
            "bytes:x".parse::<Field>(),
            Err(LayoutError::InvalidWidth("bytes:x".into()))
        );
    }

    #[test]
    fn field_display_round_trips() {
        for spec in ["bool", "u3", "i64", "f32", "bytes:7", "str", "str:3"] {
            assert_eq!(spec.parse::<Field>().unwrap().to_string(), spec);
        }
    }

    #[test]
    fn value_ranges() {
        assert_eq!(Field::Uint(3).parse_value("7"), Ok(Value::Uint(7, 3)));
        assert!(Field::Uint(3).parse_value("8").is_err());
        assert_eq!(Field::Uint(16).parse_value("0xBEEF"), Ok(Value::Uint(0xBEEF, 16)));

        assert_eq!(Field::Int(4).parse_value("-8"), Ok(Value::Int(-8, 4)));
        assert!(Field::Int(4).parse_value("8").is_err());
        assert!(Field::Int(4).parse_value("-9").is_err());

        assert_eq!(
            Field::Bytes(2).parse_value("dead"),
            Ok(Value::Bytes(vec![0xDE, 0xAD]))
        );
        assert!(Field::Bytes(2).parse_value("dea").is_err());
        assert!(Field::Bool.parse_value("yes").is_err());
        assert!(Field::Str(None).parse_value("a\0b").is_err());
    }

    #[test]
    fn bounded_string_length_keeps_whole_characters() {
        // Truncating "é€" at 2 or 4 bytes would split a character.
        assert_eq!(Value::Str("é€".into(), Some(2)).bit_len(), 16);
        assert_eq!(Value::Str("é€".into(), Some(4)).bit_len(), 24);
        assert_eq!(Value::Str("é€".into(), Some(5)).bit_len(), 40);
    }

    #[test]
    fn value_count_mismatch() {
        let layout: Layout = "u8,u8".parse().unwrap();
        assert_eq!(
            layout.parse_values(&["1"]),
            Err(LayoutError::ValueCount {
                expected: 2,
                actual: 1
            })
        );
    }

    #[test]
    fn encode_then_decode() {
        let layout: Layout = "bool,u3,i17,u16,i64,f32,bytes:3,str,str:2,str:4".parse().unwrap();
        let values = layout
            .parse_values(&[
                "1", "5", "-65536", "0xBEEF", "-5635455352", "0.5", "00ff10", "hi", "abc",
                "aé€",
            ])
            .unwrap();

        let nbits: usize = values.iter().map(Value::bit_len).sum();
        let mut writer = BitWriter::new(nbits.div_ceil(8));
        for value in &values {
            value.encode(&mut writer).unwrap();
        }
        assert_eq!(writer.bits_written(), nbits);

        let mut reader = BitReader::new(writer.into_inner());
        for (field, expected) in layout.0.iter().zip(&values) {
            let decoded = field.decode(&mut reader).unwrap();
            match (field, expected) {
                (Field::Str(Some(max)), Value::Str(s, _)) => {
                    let truncated = truncate_str(s, *max).to_owned();
                    assert_eq!(decoded, Value::Str(truncated, Some(*max)));
                }
                _ => assert_eq!(&decoded, expected),
            }
        }
    }

    #[test]
    fn display_values() {
        assert_eq!(Value::Bytes(vec![0x0A, 0xFF]).to_string(), "0aff");
        assert_eq!(Value::Str("a\"b".into(), None).to_string(), r#""a\"b""#);
        assert_eq!(Value::Int(-3, 5).to_string(), "-3");
    }
}
