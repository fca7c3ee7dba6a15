use {
  ed25519_dalek::PublicKey,
  multihash::{Hasher, Sha3_256},
  serde::{Deserialize, Serialize},
  std::{
    fmt::{Debug, Display},
    ops::Deref,
    str::FromStr,
  },
  thiserror::Error,
};

#[derive(Debug, Error)]
pub enum Error {
  #[error("address is not valid base58: {0}")]
  InvalidEncoding(#[from] bs58::decode::Error),

  #[error("address must decode to exactly 32 bytes, got {0}")]
  InvalidLength(usize),
}

/// Represents an address of an account on the simulated ledger.
///
/// An address is either the public key of an ed25519 keypair held by
/// some user, or an address derived by hashing, such as the account
/// that backs an application or a contract-account logic signature.
/// The runtime itself never needs to distinguish the two cases: a
/// derived address is simply one that nobody can produce a valid
/// signature for.
#[derive(
  Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Address([u8; 32]);

impl Address {
  /// The all-zero address. Used as the "nobody" value in global
  /// fields and as the receiver of burned funds in tests.
  pub const ZERO: Address = Address([0u8; 32]);

  pub const fn new(bytes: [u8; 32]) -> Self {
    Self(bytes)
  }

  /// Deterministically derives the address of the account that backs
  /// an application. All units held by this account are controlled
  /// exclusively by the application's approval program.
  pub fn for_app(app_id: u64) -> Self {
    let mut hasher = Sha3_256::default();
    hasher.update(b"appID");
    hasher.update(&app_id.to_le_bytes());
    Self(hasher.finalize().try_into().expect("sha3-256 is 32 bytes"))
  }

  /// Derives the contract-account address of a logic-signature
  /// program. A transaction sent from this address is authorized by
  /// the program's acceptance alone.
  pub fn for_program(program: &[u8]) -> Self {
    let mut hasher = Sha3_256::default();
    hasher.update(b"Program");
    hasher.update(program);
    Self(hasher.finalize().try_into().expect("sha3-256 is 32 bytes"))
  }

  pub fn to_bytes(self) -> [u8; 32] {
    self.0
  }
}

impl AsRef<[u8]> for Address {
  fn as_ref(&self) -> &[u8] {
    &self.0
  }
}

impl Deref for Address {
  type Target = [u8];

  fn deref(&self) -> &Self::Target {
    &self.0
  }
}

impl Display for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "{}", bs58::encode(self.0).into_string())
  }
}

impl Debug for Address {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    write!(f, "address({})", bs58::encode(self.0).into_string())
  }
}

impl From<Address> for String {
  fn from(addr: Address) -> Self {
    bs58::encode(addr.0).into_string()
  }
}

impl From<PublicKey> for Address {
  fn from(p: PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

impl From<&PublicKey> for Address {
  fn from(p: &PublicKey) -> Self {
    Self(*p.as_bytes())
  }
}

impl TryFrom<&[u8]> for Address {
  type Error = Error;

  fn try_from(value: &[u8]) -> Result<Self, Self::Error> {
    Ok(Self(
      value
        .try_into()
        .map_err(|_| Error::InvalidLength(value.len()))?,
    ))
  }
}

impl FromStr for Address {
  type Err = Error;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    let mut bytes = [0u8; 32];
    let len = bs58::decode(s).into(&mut bytes)?;
    if len != 32 {
      return Err(Error::InvalidLength(len));
    }
    Ok(Self(bytes))
  }
}
