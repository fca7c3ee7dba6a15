use {
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
};

/// Longest byte string the interpreter will manipulate or store.
/// Concatenation and state writes that would exceed this bound fail.
pub const MAX_TEAL_VALUE_LEN: usize = 4096;

/// A single value as seen by the stack machine and the key-value
/// state store: an unsigned 64-bit integer or a bounded byte string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TealValue {
  Uint(u64),
  Bytes(Vec<u8>),
}

impl TealValue {
  /// Human readable name of the value's type, used in type-mismatch
  /// error messages.
  pub fn type_name(&self) -> &'static str {
    match self {
      TealValue::Uint(_) => "uint64",
      TealValue::Bytes(_) => "byte[]",
    }
  }

  pub fn as_uint(&self) -> Option<u64> {
    match self {
      TealValue::Uint(v) => Some(*v),
      TealValue::Bytes(_) => None,
    }
  }

  pub fn as_bytes(&self) -> Option<&[u8]> {
    match self {
      TealValue::Uint(_) => None,
      TealValue::Bytes(b) => Some(b),
    }
  }

  /// Truthiness of a value when used as a branch condition or a
  /// program result: nonzero integers are true, bytes are true when
  /// any byte is nonzero.
  pub fn is_truthy(&self) -> bool {
    match self {
      TealValue::Uint(v) => *v != 0,
      TealValue::Bytes(b) => b.iter().any(|b| *b != 0),
    }
  }
}

impl From<u64> for TealValue {
  fn from(v: u64) -> Self {
    TealValue::Uint(v)
  }
}

impl From<Vec<u8>> for TealValue {
  fn from(v: Vec<u8>) -> Self {
    TealValue::Bytes(v)
  }
}

impl From<&[u8]> for TealValue {
  fn from(v: &[u8]) -> Self {
    TealValue::Bytes(v.to_vec())
  }
}

impl From<bool> for TealValue {
  fn from(v: bool) -> Self {
    TealValue::Uint(v as u64)
  }
}

/// Key-value storage attached to applications, both for global state
/// and for the per-account local state created by opting in.
pub type TealKvStore = BTreeMap<Vec<u8>, TealValue>;
