#![allow(dead_code)]

use {
  kiln_primitives::{
    Address,
    AppId,
    AssetConfigFields,
    AssetId,
    AssetParams,
    OnComplete,
    SignedTransaction,
    StateSchema,
    Transaction,
    TransactionKind,
    TxnSignature,
  },
  kiln_vm::{ProgramCompiler, Runtime},
  std::collections::HashMap,
};

/// Transaction field codes as encoded in program bytes.
pub mod txn_field {
  pub const SENDER: u8 = 0;
  pub const FEE: u8 = 1;
  pub const FIRST_VALID: u8 = 2;
  pub const LAST_VALID: u8 = 3;
  pub const NOTE: u8 = 4;
  pub const RECEIVER: u8 = 5;
  pub const AMOUNT: u8 = 6;
  pub const CLOSE_REMAINDER_TO: u8 = 7;
  pub const TYPE_ENUM: u8 = 8;
  pub const XFER_ASSET: u8 = 9;
  pub const ASSET_AMOUNT: u8 = 10;
  pub const ASSET_SENDER: u8 = 11;
  pub const ASSET_RECEIVER: u8 = 12;
  pub const ASSET_CLOSE_TO: u8 = 13;
  pub const GROUP_INDEX: u8 = 14;
  pub const TX_ID: u8 = 15;
  pub const APPLICATION_ID: u8 = 16;
  pub const ON_COMPLETION: u8 = 17;
  pub const APPLICATION_ARGS: u8 = 18;
  pub const NUM_APP_ARGS: u8 = 19;
  pub const ACCOUNTS: u8 = 20;
  pub const NUM_ACCOUNTS: u8 = 21;
}

/// Global field codes as encoded in program bytes.
pub mod global_field {
  pub const MIN_TXN_FEE: u8 = 0;
  pub const MIN_BALANCE: u8 = 1;
  pub const MAX_TXN_LIFE: u8 = 2;
  pub const ZERO_ADDRESS: u8 = 3;
  pub const GROUP_SIZE: u8 = 4;
  pub const LOGIC_SIG_VERSION: u8 = 5;
  pub const ROUND: u8 = 6;
  pub const LATEST_TIMESTAMP: u8 = 7;
  pub const CURRENT_APPLICATION_ID: u8 = 8;
  pub const CREATOR_ADDRESS: u8 = 9;
  pub const CURRENT_APPLICATION_ADDRESS: u8 = 10;
}

/// Inner transaction field codes.
pub mod itxn_field {
  pub const TYPE_ENUM: u8 = 0;
  pub const RECEIVER: u8 = 1;
  pub const AMOUNT: u8 = 2;
  pub const FEE: u8 = 3;
  pub const XFER_ASSET: u8 = 4;
  pub const ASSET_RECEIVER: u8 = 5;
  pub const ASSET_AMOUNT: u8 = 6;
  pub const APPLICATION_ID: u8 = 7;
}

/// Asset holding field codes.
pub mod holding_field {
  pub const BALANCE: u8 = 0;
  pub const FROZEN: u8 = 1;
}

/// Emits program bytes in the runtime's instruction encoding. This is
/// the test suite's stand-in for the external compiler: labels are
/// resolved to relative branch offsets at build time, exactly as an
/// assembler would.
pub struct ProgramBuilder {
  version: u8,
  code: Vec<u8>,
  labels: HashMap<String, usize>,
  fixups: Vec<(usize, String)>,
}

impl ProgramBuilder {
  pub fn new(version: u8) -> Self {
    Self {
      version,
      code: vec![],
      labels: HashMap::new(),
      fixups: vec![],
    }
  }

  fn raw(mut self, bytes: &[u8]) -> Self {
    self.code.extend_from_slice(bytes);
    self
  }

  pub fn int(self, value: u64) -> Self {
    let mut bytes = vec![0x20];
    bytes.extend_from_slice(&value.to_le_bytes());
    self.raw(&bytes)
  }

  pub fn bytes(self, value: &[u8]) -> Self {
    let mut bytes = vec![0x21];
    bytes.extend_from_slice(&(value.len() as u16).to_le_bytes());
    bytes.extend_from_slice(value);
    self.raw(&bytes)
  }

  pub fn addr(self, address: &Address) -> Self {
    let bytes = address.to_bytes();
    self.bytes(&bytes)
  }

  pub fn err(self) -> Self {
    self.raw(&[0x00])
  }

  pub fn sha256(self) -> Self {
    self.raw(&[0x01])
  }

  pub fn add(self) -> Self {
    self.raw(&[0x08])
  }

  pub fn sub(self) -> Self {
    self.raw(&[0x09])
  }

  pub fn div(self) -> Self {
    self.raw(&[0x0a])
  }

  pub fn mul(self) -> Self {
    self.raw(&[0x0b])
  }

  pub fn lt(self) -> Self {
    self.raw(&[0x0c])
  }

  pub fn gt(self) -> Self {
    self.raw(&[0x0d])
  }

  pub fn le(self) -> Self {
    self.raw(&[0x0e])
  }

  pub fn ge(self) -> Self {
    self.raw(&[0x0f])
  }

  pub fn and(self) -> Self {
    self.raw(&[0x10])
  }

  pub fn or(self) -> Self {
    self.raw(&[0x11])
  }

  pub fn eq(self) -> Self {
    self.raw(&[0x12])
  }

  pub fn neq(self) -> Self {
    self.raw(&[0x13])
  }

  pub fn not(self) -> Self {
    self.raw(&[0x14])
  }

  pub fn len(self) -> Self {
    self.raw(&[0x15])
  }

  pub fn itob(self) -> Self {
    self.raw(&[0x16])
  }

  pub fn btoi(self) -> Self {
    self.raw(&[0x17])
  }

  pub fn arg(self, index: u8) -> Self {
    self.raw(&[0x2c, index])
  }

  pub fn txn(self, field: u8) -> Self {
    self.raw(&[0x31, field])
  }

  pub fn global(self, field: u8) -> Self {
    self.raw(&[0x32, field])
  }

  pub fn gtxn(self, group_index: u8, field: u8) -> Self {
    self.raw(&[0x33, group_index, field])
  }

  pub fn load(self, slot: u8) -> Self {
    self.raw(&[0x34, slot])
  }

  pub fn store(self, slot: u8) -> Self {
    self.raw(&[0x35, slot])
  }

  pub fn txna(self, field: u8, index: u8) -> Self {
    self.raw(&[0x36, field, index])
  }

  pub fn gtxna(self, group_index: u8, field: u8, index: u8) -> Self {
    self.raw(&[0x37, group_index, field, index])
  }

  pub fn ret(self) -> Self {
    self.raw(&[0x43])
  }

  pub fn assert(self) -> Self {
    self.raw(&[0x44])
  }

  pub fn pop(self) -> Self {
    self.raw(&[0x48])
  }

  pub fn dup(self) -> Self {
    self.raw(&[0x49])
  }

  pub fn dup2(self) -> Self {
    self.raw(&[0x4a])
  }

  pub fn swap(self) -> Self {
    self.raw(&[0x4c])
  }

  pub fn concat(self) -> Self {
    self.raw(&[0x50])
  }

  pub fn balance(self) -> Self {
    self.raw(&[0x60])
  }

  pub fn app_opted_in(self) -> Self {
    self.raw(&[0x61])
  }

  pub fn app_local_get(self) -> Self {
    self.raw(&[0x62])
  }

  pub fn app_global_get(self) -> Self {
    self.raw(&[0x63])
  }

  pub fn app_local_put(self) -> Self {
    self.raw(&[0x64])
  }

  pub fn app_global_put(self) -> Self {
    self.raw(&[0x65])
  }

  pub fn app_local_del(self) -> Self {
    self.raw(&[0x66])
  }

  pub fn app_global_del(self) -> Self {
    self.raw(&[0x67])
  }

  pub fn asset_holding_get(self, field: u8) -> Self {
    self.raw(&[0x70, field])
  }

  pub fn asset_params_get(self, field: u8) -> Self {
    self.raw(&[0x71, field])
  }

  pub fn min_balance(self) -> Self {
    self.raw(&[0x78])
  }

  pub fn retsub(self) -> Self {
    self.raw(&[0x89])
  }

  pub fn itxn_begin(self) -> Self {
    self.raw(&[0xb1])
  }

  pub fn itxn_field(self, field: u8) -> Self {
    self.raw(&[0xb2, field])
  }

  pub fn itxn_submit(self) -> Self {
    self.raw(&[0xb3])
  }

  /// Records a branch target at the current position.
  pub fn label(mut self, name: &str) -> Self {
    self.labels.insert(name.into(), self.code.len());
    self
  }

  fn branch(mut self, opcode: u8, label: &str) -> Self {
    self.code.push(opcode);
    self.fixups.push((self.code.len(), label.into()));
    self.code.extend_from_slice(&[0, 0]);
    self
  }

  pub fn bnz(self, label: &str) -> Self {
    self.branch(0x40, label)
  }

  pub fn bz(self, label: &str) -> Self {
    self.branch(0x41, label)
  }

  pub fn b(self, label: &str) -> Self {
    self.branch(0x42, label)
  }

  pub fn callsub(self, label: &str) -> Self {
    self.branch(0x88, label)
  }

  /// Resolves labels into relative offsets and prepends the version
  /// marker. `end` always refers to one past the last instruction.
  pub fn build(mut self) -> Vec<u8> {
    self.labels.insert("end".into(), self.code.len());
    for (position, label) in &self.fixups {
      let target = *self
        .labels
        .get(label)
        .unwrap_or_else(|| panic!("unknown label {label}"));
      let rel = target as i64 - (*position as i64 + 2);
      let rel = i16::try_from(rel).expect("branch out of range");
      self.code[*position..position + 2]
        .copy_from_slice(&rel.to_le_bytes());
    }
    let mut program = vec![self.version];
    program.extend_from_slice(&self.code);
    program
  }
}

/// The simplest approval program: accept unconditionally.
pub fn approve(version: u8) -> Vec<u8> {
  ProgramBuilder::new(version).int(1).build()
}

/// A program that always rejects.
pub fn reject(version: u8) -> Vec<u8> {
  ProgramBuilder::new(version).int(0).build()
}

/// Tests never reach the external compiler; programs are built
/// directly as bytes through [`ProgramBuilder`].
pub fn no_compiler() -> Box<dyn ProgramCompiler> {
  Box::new(|_: &str| -> Result<Vec<u8>, String> {
    Err("external compiler is not wired up in tests".to_string())
  })
}

pub fn addr(seed: u8) -> Address {
  Address::new([seed; 32])
}

/// A runtime with a generously funded master account.
pub fn runtime_with_master() -> (Runtime, Address) {
  let mut runtime = Runtime::new(no_compiler());
  let master = addr(0xaa);
  runtime.create_account(master, 1_000_000_000);
  (runtime, master)
}

pub fn txn(sender: Address, kind: TransactionKind) -> SignedTransaction {
  txn_with_fee(sender, 1000, kind)
}

pub fn txn_with_fee(
  sender: Address,
  fee: u64,
  kind: TransactionKind,
) -> SignedTransaction {
  SignedTransaction::new(
    Transaction {
      sender,
      fee,
      first_valid: 0,
      last_valid: 1000,
      note: vec![],
      kind,
    },
    TxnSignature::Sig,
  )
}

pub fn pay(from: Address, to: Address, amount: u64) -> SignedTransaction {
  txn(from, TransactionKind::Payment {
    receiver: to,
    amount,
    close_remainder_to: None,
  })
}

pub fn asset_create(
  from: Address,
  params: AssetParams,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetCreate { params })
}

pub fn asset_opt_in(from: Address, asset: AssetId) -> SignedTransaction {
  txn(from, TransactionKind::AssetOptIn { asset })
}

pub fn asset_transfer(
  from: Address,
  asset: AssetId,
  to: Address,
  amount: u64,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetTransfer {
    asset,
    receiver: to,
    amount,
    close_to: None,
  })
}

pub fn asset_transfer_close(
  from: Address,
  asset: AssetId,
  to: Address,
  amount: u64,
  close_to: Address,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetTransfer {
    asset,
    receiver: to,
    amount,
    close_to: Some(close_to),
  })
}

pub fn asset_freeze(
  from: Address,
  asset: AssetId,
  target: Address,
  frozen: bool,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetFreeze {
    asset,
    target,
    frozen,
  })
}

pub fn asset_revoke(
  from: Address,
  asset: AssetId,
  revoke_from: Address,
  receiver: Address,
  amount: u64,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetRevoke {
    asset,
    revoke_from,
    receiver,
    amount,
    close_to: None,
  })
}

pub fn asset_revoke_close(
  from: Address,
  asset: AssetId,
  revoke_from: Address,
  receiver: Address,
  amount: u64,
  close_to: Address,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetRevoke {
    asset,
    revoke_from,
    receiver,
    amount,
    close_to: Some(close_to),
  })
}

pub fn asset_config(
  from: Address,
  asset: AssetId,
  fields: AssetConfigFields,
) -> SignedTransaction {
  txn(from, TransactionKind::AssetConfig { asset, fields })
}

pub fn asset_destroy(from: Address, asset: AssetId) -> SignedTransaction {
  txn(from, TransactionKind::AssetDestroy { asset })
}

pub fn app_create(
  from: Address,
  approval: Vec<u8>,
  clear: Vec<u8>,
  global_schema: StateSchema,
  local_schema: StateSchema,
) -> SignedTransaction {
  txn(from, TransactionKind::AppCall {
    app: 0,
    on_complete: OnComplete::NoOp,
    args: vec![],
    accounts: vec![],
    foreign_apps: vec![],
    foreign_assets: vec![],
    approval_program: Some(approval),
    clear_program: Some(clear),
    global_schema: Some(global_schema),
    local_schema: Some(local_schema),
  })
}

pub fn app_call(
  from: Address,
  app: AppId,
  on_complete: OnComplete,
) -> SignedTransaction {
  app_call_args(from, app, on_complete, vec![], vec![])
}

pub fn app_call_args(
  from: Address,
  app: AppId,
  on_complete: OnComplete,
  args: Vec<Vec<u8>>,
  accounts: Vec<Address>,
) -> SignedTransaction {
  txn(from, TransactionKind::AppCall {
    app,
    on_complete,
    args,
    accounts,
    foreign_apps: vec![],
    foreign_assets: vec![],
    approval_program: None,
    clear_program: None,
    global_schema: None,
    local_schema: None,
  })
}
