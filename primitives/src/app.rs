use {
  crate::{Address, TealKvStore},
  serde::{Deserialize, Serialize},
};

pub type AppId = u64;

/// Capacity of a key-value state store, fixed when an application is
/// created. Writes that would exceed the declared slot counts are
/// rejected by the ledger.
#[derive(
  Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize,
)]
pub struct StateSchema {
  pub num_uints: u64,
  pub num_byte_slices: u64,
}

impl StateSchema {
  pub fn new(num_uints: u64, num_byte_slices: u64) -> Self {
    Self {
      num_uints,
      num_byte_slices,
    }
  }

  /// Total number of entries the schema admits.
  pub fn entries(&self) -> u64 {
    self.num_uints + self.num_byte_slices
  }
}

/// A deployed application: its two programs, its state capacities and
/// its global state. Local state lives in the accounts that opted in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppParams {
  /// Compiled program gating every application call except clear
  /// state.
  pub approval_program: Vec<u8>,

  /// Compiled program run on clear-state calls. Its verdict cannot
  /// prevent the caller's local state from being removed.
  pub clear_program: Vec<u8>,

  pub global_schema: StateSchema,
  pub local_schema: StateSchema,
  pub global_state: TealKvStore,
  pub creator: Address,
}
