use {
  crate::{
    b58::ToBase58String,
    Address,
    AppId,
    AssetConfigFields,
    AssetId,
    AssetParams,
    LogicSig,
    StateSchema,
  },
  multihash::{Hasher, Multihash, MultihashDigest, Sha3_256},
  once_cell::sync::OnceCell,
  serde::{Deserialize, Serialize},
  std::fmt::Debug,
};

/// What an application call asks the processor to do once the
/// approval (or clear) program has run.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default,
)]
pub enum OnComplete {
  #[default]
  NoOp,
  OptIn,
  CloseOut,
  ClearState,
  Update,
  Delete,
}

/// The closed set of transaction kinds the processor understands.
/// Each variant carries exactly the fields that are meaningful for
/// that kind, so dispatch is exhaustive and missing-field failures
/// cannot exist.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransactionKind {
  /// Moves microunits between accounts. When `close_remainder_to` is
  /// set the sender's whole remaining balance follows and the sender
  /// account is emptied.
  Payment {
    receiver: Address,
    amount: u64,
    close_remainder_to: Option<Address>,
  },

  /// Moves asset units between opted-in holders. When `close_to` is
  /// set the sender's remaining holding follows and the holding entry
  /// is removed.
  AssetTransfer {
    asset: AssetId,
    receiver: Address,
    amount: u64,
    close_to: Option<Address>,
  },

  /// Creates a zero-amount holding so the sender can receive units.
  AssetOptIn { asset: AssetId },

  /// Creates a new asset owned by the sender. The assigned id is
  /// reported in the receipt.
  AssetCreate { params: AssetParams },

  /// Replaces the asset's authority addresses. Manager-only.
  AssetConfig {
    asset: AssetId,
    fields: AssetConfigFields,
  },

  /// Freezes or unfreezes one holding. Freeze-authority-only.
  AssetFreeze {
    asset: AssetId,
    target: Address,
    frozen: bool,
  },

  /// Moves units out of `revoke_from`'s holding regardless of
  /// freezes. Clawback-authority-only. With `close_to` the revoked
  /// holder's remaining balance follows and the holding entry is
  /// removed; the creator's holding can still never be closed.
  AssetRevoke {
    asset: AssetId,
    revoke_from: Address,
    receiver: Address,
    amount: u64,
    close_to: Option<Address>,
  },

  /// Removes the asset entirely. Manager-only, and the creator must
  /// hold the full total supply.
  AssetDestroy { asset: AssetId },

  /// Calls an application. `app == 0` creates a new one from the
  /// attached programs and schemas.
  AppCall {
    app: AppId,
    on_complete: OnComplete,
    args: Vec<Vec<u8>>,
    accounts: Vec<Address>,
    foreign_apps: Vec<AppId>,
    foreign_assets: Vec<AssetId>,
    approval_program: Option<Vec<u8>>,
    clear_program: Option<Vec<u8>>,
    global_schema: Option<StateSchema>,
    local_schema: Option<StateSchema>,
  },
}

impl TransactionKind {
  /// Numeric transaction type as exposed to programs through the
  /// `TypeEnum` transaction field.
  pub fn type_enum(&self) -> u64 {
    match self {
      TransactionKind::Payment { .. } => 1,
      TransactionKind::AssetCreate { .. }
      | TransactionKind::AssetConfig { .. }
      | TransactionKind::AssetDestroy { .. } => 3,
      TransactionKind::AssetTransfer { .. }
      | TransactionKind::AssetOptIn { .. }
      | TransactionKind::AssetRevoke { .. } => 4,
      TransactionKind::AssetFreeze { .. } => 5,
      TransactionKind::AppCall { .. } => 6,
    }
  }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
  pub sender: Address,

  /// Fee in microunits. Fees are pooled across an atomic group: one
  /// member may overpay to cover another.
  pub fee: u64,

  /// First round (exclusive lower bound) at which this transaction
  /// is valid.
  pub first_valid: u64,

  /// Last round (exclusive upper bound) of the validity window.
  pub last_valid: u64,

  pub note: Vec<u8>,
  pub kind: TransactionKind,
}

/// How a transaction is authorized.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum TxnSignature {
  /// Signed with the sender's secret key. The simulator trusts the
  /// caller holds the key; only logic signatures are verified for
  /// real.
  Sig,

  /// Authorized by a logic-signature program, either delegated or as
  /// a contract account.
  Lsig(LogicSig),
}

/// A transaction together with its authorization and a lazily
/// computed, cached transaction id.
#[derive(Clone, Serialize, Deserialize)]
pub struct SignedTransaction {
  pub txn: Transaction,
  pub sig: TxnSignature,

  #[serde(skip)]
  id_cache: OnceCell<Multihash>,
}

impl SignedTransaction {
  pub fn new(txn: Transaction, sig: TxnSignature) -> Self {
    Self {
      txn,
      sig,
      id_cache: OnceCell::new(),
    }
  }

  /// Hash of the transaction contents that uniquely identifies it.
  pub fn id(&self) -> &Multihash {
    self.id_cache.get_or_init(|| {
      let mut hasher = Sha3_256::default();
      hasher.update(&rmp_serde::to_vec(&self.txn).unwrap());
      multihash::Code::Sha3_256.wrap(hasher.finalize()).unwrap()
    })
  }
}

impl Debug for SignedTransaction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    f.debug_struct("SignedTransaction")
      .field("txn", &self.txn)
      .field("id", &self.id().to_b58())
      .finish()
  }
}

#[cfg(test)]
mod tests {
  use {
    super::{SignedTransaction, Transaction, TransactionKind, TxnSignature},
    crate::Address,
  };

  fn payment(amount: u64) -> Transaction {
    Transaction {
      sender: Address::new([1u8; 32]),
      fee: 1000,
      first_valid: 0,
      last_valid: 1000,
      note: vec![],
      kind: TransactionKind::Payment {
        receiver: Address::new([2u8; 32]),
        amount,
        close_remainder_to: None,
      },
    }
  }

  #[test]
  fn txid_depends_on_contents() {
    let a = SignedTransaction::new(payment(10), TxnSignature::Sig);
    let b = SignedTransaction::new(payment(10), TxnSignature::Sig);
    let c = SignedTransaction::new(payment(11), TxnSignature::Sig);
    assert_eq!(a.id(), b.id());
    assert_ne!(a.id(), c.id());
  }
}
