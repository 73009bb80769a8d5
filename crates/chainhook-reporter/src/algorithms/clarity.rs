//! # Clarity Value Codec
//!
//! Consensus serialization of Clarity values as used by the Stacks node
//! `call-read` endpoint: arguments go out hex-encoded, results come back
//! hex-encoded.
//!
//! Decoding is bounded in nesting depth and declared lengths are checked
//! against the remaining input before allocating.

use crate::algorithms::c32::c32_address;
use thiserror::Error;

/// Maximum nesting of composite values accepted by the decoder.
pub const MAX_DEPTH: usize = 32;

mod type_prefix {
    pub const INT: u8 = 0x00;
    pub const UINT: u8 = 0x01;
    pub const BUFFER: u8 = 0x02;
    pub const BOOL_TRUE: u8 = 0x03;
    pub const BOOL_FALSE: u8 = 0x04;
    pub const PRINCIPAL_STANDARD: u8 = 0x05;
    pub const PRINCIPAL_CONTRACT: u8 = 0x06;
    pub const RESPONSE_OK: u8 = 0x07;
    pub const RESPONSE_ERR: u8 = 0x08;
    pub const OPTIONAL_NONE: u8 = 0x09;
    pub const OPTIONAL_SOME: u8 = 0x0a;
    pub const LIST: u8 = 0x0b;
    pub const TUPLE: u8 = 0x0c;
    pub const STRING_ASCII: u8 = 0x0d;
    pub const STRING_UTF8: u8 = 0x0e;
}

/// Codec failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClarityError {
    #[error("invalid hex: {0}")]
    Hex(String),

    #[error("unexpected end of input at offset {0}")]
    UnexpectedEof(usize),

    #[error("unknown type prefix 0x{prefix:02x} at offset {offset}")]
    UnknownType { prefix: u8, offset: usize },

    #[error("value nested deeper than {}", MAX_DEPTH)]
    TooDeep,

    #[error("invalid string: {0}")]
    InvalidString(String),

    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
}

/// Standard principal: address version and hash160.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StandardPrincipal {
    pub version: u8,
    pub hash160: [u8; 20],
}

impl StandardPrincipal {
    /// c32check address (`SP...`).
    pub fn to_address(&self) -> String {
        c32_address(self.version, &self.hash160)
    }
}

/// A decoded Clarity value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClarityValue {
    Int(i128),
    UInt(u128),
    Buffer(Vec<u8>),
    Bool(bool),
    StandardPrincipal(StandardPrincipal),
    ContractPrincipal {
        issuer: StandardPrincipal,
        name: String,
    },
    ResponseOk(Box<ClarityValue>),
    ResponseErr(Box<ClarityValue>),
    OptionalNone,
    OptionalSome(Box<ClarityValue>),
    List(Vec<ClarityValue>),
    /// Fields in serialized order.
    Tuple(Vec<(String, ClarityValue)>),
    StringAscii(String),
    StringUtf8(String),
}

impl ClarityValue {
    /// Serialize to consensus bytes.
    pub fn serialize(&self) -> Vec<u8> {
        let mut out = Vec::new();
        self.write_to(&mut out);
        out
    }

    /// Serialize to `0x`-prefixed hex, the form `call-read` expects.
    pub fn to_hex(&self) -> String {
        format!("0x{}", hex::encode(self.serialize()))
    }

    fn write_to(&self, out: &mut Vec<u8>) {
        use type_prefix::*;
        match self {
            Self::Int(v) => {
                out.push(INT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::UInt(v) => {
                out.push(UINT);
                out.extend_from_slice(&v.to_be_bytes());
            }
            Self::Buffer(bytes) => {
                out.push(BUFFER);
                write_len_prefixed(out, bytes);
            }
            Self::Bool(true) => out.push(BOOL_TRUE),
            Self::Bool(false) => out.push(BOOL_FALSE),
            Self::StandardPrincipal(p) => {
                out.push(PRINCIPAL_STANDARD);
                write_principal(out, p);
            }
            Self::ContractPrincipal { issuer, name } => {
                out.push(PRINCIPAL_CONTRACT);
                write_principal(out, issuer);
                out.push(name.len() as u8);
                out.extend_from_slice(name.as_bytes());
            }
            Self::ResponseOk(inner) => {
                out.push(RESPONSE_OK);
                inner.write_to(out);
            }
            Self::ResponseErr(inner) => {
                out.push(RESPONSE_ERR);
                inner.write_to(out);
            }
            Self::OptionalNone => out.push(OPTIONAL_NONE),
            Self::OptionalSome(inner) => {
                out.push(OPTIONAL_SOME);
                inner.write_to(out);
            }
            Self::List(items) => {
                out.push(LIST);
                out.extend_from_slice(&(items.len() as u32).to_be_bytes());
                for item in items {
                    item.write_to(out);
                }
            }
            Self::Tuple(fields) => {
                out.push(TUPLE);
                out.extend_from_slice(&(fields.len() as u32).to_be_bytes());
                for (name, value) in fields {
                    out.push(name.len() as u8);
                    out.extend_from_slice(name.as_bytes());
                    value.write_to(out);
                }
            }
            Self::StringAscii(s) => {
                out.push(STRING_ASCII);
                write_len_prefixed(out, s.as_bytes());
            }
            Self::StringUtf8(s) => {
                out.push(STRING_UTF8);
                write_len_prefixed(out, s.as_bytes());
            }
        }
    }

    /// Decode a single value occupying the whole input.
    pub fn deserialize(bytes: &[u8]) -> Result<Self, ClarityError> {
        let mut reader = Reader { bytes, pos: 0 };
        let value = reader.read_value(0)?;
        let remaining = bytes.len() - reader.pos;
        if remaining != 0 {
            return Err(ClarityError::TrailingBytes(remaining));
        }
        Ok(value)
    }

    /// Decode from hex, with or without a `0x` prefix.
    pub fn from_hex(hex_str: &str) -> Result<Self, ClarityError> {
        let trimmed = hex_str.strip_prefix("0x").unwrap_or(hex_str);
        let bytes = hex::decode(trimmed).map_err(|e| ClarityError::Hex(e.to_string()))?;
        Self::deserialize(&bytes)
    }

    /// Strip `(ok ..)` and `(some ..)` wrappers.
    pub fn unwrap_ok_or_some(&self) -> Option<&ClarityValue> {
        match self {
            Self::ResponseOk(inner) | Self::OptionalSome(inner) => inner.unwrap_ok_or_some(),
            Self::ResponseErr(_) | Self::OptionalNone => None,
            other => Some(other),
        }
    }

    /// Look up a tuple field by name.
    pub fn field(&self, name: &str) -> Option<&ClarityValue> {
        match self {
            Self::Tuple(fields) => fields.iter().find(|(n, _)| n == name).map(|(_, v)| v),
            _ => None,
        }
    }

    pub fn as_uint(&self) -> Option<u128> {
        match self {
            Self::UInt(v) => Some(*v),
            _ => None,
        }
    }

    /// Render a principal as an address; contract principals get `.name`.
    pub fn as_principal_address(&self) -> Option<String> {
        match self {
            Self::StandardPrincipal(p) => Some(p.to_address()),
            Self::ContractPrincipal { issuer, name } => {
                Some(format!("{}.{}", issuer.to_address(), name))
            }
            _ => None,
        }
    }
}

fn write_len_prefixed(out: &mut Vec<u8>, bytes: &[u8]) {
    out.extend_from_slice(&(bytes.len() as u32).to_be_bytes());
    out.extend_from_slice(bytes);
}

fn write_principal(out: &mut Vec<u8>, p: &StandardPrincipal) {
    out.push(p.version);
    out.extend_from_slice(&p.hash160);
}

struct Reader<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn take(&mut self, n: usize) -> Result<&'a [u8], ClarityError> {
        let end = self
            .pos
            .checked_add(n)
            .filter(|end| *end <= self.bytes.len())
            .ok_or(ClarityError::UnexpectedEof(self.pos))?;
        let slice = &self.bytes[self.pos..end];
        self.pos = end;
        Ok(slice)
    }

    fn read_u8(&mut self) -> Result<u8, ClarityError> {
        Ok(self.take(1)?[0])
    }

    fn read_u32(&mut self) -> Result<u32, ClarityError> {
        let mut buf = [0u8; 4];
        buf.copy_from_slice(self.take(4)?);
        Ok(u32::from_be_bytes(buf))
    }

    fn read_16(&mut self) -> Result<[u8; 16], ClarityError> {
        let mut buf = [0u8; 16];
        buf.copy_from_slice(self.take(16)?);
        Ok(buf)
    }

    fn read_principal(&mut self) -> Result<StandardPrincipal, ClarityError> {
        let version = self.read_u8()?;
        let mut hash160 = [0u8; 20];
        hash160.copy_from_slice(self.take(20)?);
        Ok(StandardPrincipal { version, hash160 })
    }

    fn read_name(&mut self) -> Result<String, ClarityError> {
        let len = usize::from(self.read_u8()?);
        let raw = self.take(len)?;
        String::from_utf8(raw.to_vec()).map_err(|e| ClarityError::InvalidString(e.to_string()))
    }

    fn read_len_prefixed(&mut self) -> Result<&'a [u8], ClarityError> {
        let len = self.read_u32()? as usize;
        self.take(len)
    }

    /// Element count for lists/tuples; every element needs at least one byte.
    fn read_count(&mut self) -> Result<usize, ClarityError> {
        let count = self.read_u32()? as usize;
        if count > self.bytes.len() - self.pos {
            return Err(ClarityError::UnexpectedEof(self.pos));
        }
        Ok(count)
    }

    fn read_value(&mut self, depth: usize) -> Result<ClarityValue, ClarityError> {
        use type_prefix::*;
        if depth > MAX_DEPTH {
            return Err(ClarityError::TooDeep);
        }

        let offset = self.pos;
        let prefix = self.read_u8()?;
        let value = match prefix {
            INT => ClarityValue::Int(i128::from_be_bytes(self.read_16()?)),
            UINT => ClarityValue::UInt(u128::from_be_bytes(self.read_16()?)),
            BUFFER => ClarityValue::Buffer(self.read_len_prefixed()?.to_vec()),
            BOOL_TRUE => ClarityValue::Bool(true),
            BOOL_FALSE => ClarityValue::Bool(false),
            PRINCIPAL_STANDARD => ClarityValue::StandardPrincipal(self.read_principal()?),
            PRINCIPAL_CONTRACT => {
                let issuer = self.read_principal()?;
                let name = self.read_name()?;
                ClarityValue::ContractPrincipal { issuer, name }
            }
            RESPONSE_OK => ClarityValue::ResponseOk(Box::new(self.read_value(depth + 1)?)),
            RESPONSE_ERR => ClarityValue::ResponseErr(Box::new(self.read_value(depth + 1)?)),
            OPTIONAL_NONE => ClarityValue::OptionalNone,
            OPTIONAL_SOME => ClarityValue::OptionalSome(Box::new(self.read_value(depth + 1)?)),
            LIST => {
                let count = self.read_count()?;
                let mut items = Vec::with_capacity(count);
                for _ in 0..count {
                    items.push(self.read_value(depth + 1)?);
                }
                ClarityValue::List(items)
            }
            TUPLE => {
                let count = self.read_count()?;
                let mut fields = Vec::with_capacity(count);
                for _ in 0..count {
                    let name = self.read_name()?;
                    fields.push((name, self.read_value(depth + 1)?));
                }
                ClarityValue::Tuple(fields)
            }
            STRING_ASCII => {
                let raw = self.read_len_prefixed()?;
                if !raw.is_ascii() {
                    return Err(ClarityError::InvalidString("non-ascii byte in string-ascii".into()));
                }
                ClarityValue::StringAscii(String::from_utf8_lossy(raw).into_owned())
            }
            STRING_UTF8 => {
                let raw = self.read_len_prefixed()?;
                ClarityValue::StringUtf8(
                    String::from_utf8(raw.to_vec())
                        .map_err(|e| ClarityError::InvalidString(e.to_string()))?,
                )
            }
            other => {
                return Err(ClarityError::UnknownType {
                    prefix: other,
                    offset,
                })
            }
        };

        Ok(value)
    }
}
