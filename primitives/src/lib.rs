mod account;
mod address;
mod app;
mod asset;
mod b58;
mod lsig;
mod transaction;
mod value;

pub use {
  account::{Account, LocalState},
  address::{Address, Error as AddressError},
  app::{AppId, AppParams, StateSchema},
  asset::{AssetConfigFields, AssetHolding, AssetId, AssetParams},
  b58::ToBase58String,
  lsig::{Delegation, LogicSig},
  transaction::{
    OnComplete,
    SignedTransaction,
    Transaction,
    TransactionKind,
    TxnSignature,
  },
  value::{TealKvStore, TealValue, MAX_TEAL_VALUE_LEN},
};
