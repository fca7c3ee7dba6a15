use {
  crate::bytecode::ItxnFieldCode,
  kiln_primitives::{Address, TealValue, Transaction, TransactionKind},
  thiserror::Error,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error("inner transaction field {field} expects a {expected} value")]
  WrongFieldType {
    field: &'static str,
    expected: &'static str,
  },

  #[error("{0} is not a valid inner transaction type")]
  UnknownTypeEnum(u64),

  #[error("pending inner transaction has no type")]
  MissingType,

  #[error("inner transactions of type {0} cannot be emitted")]
  UnsupportedType(&'static str),
}

/// A pending inner transaction being assembled by a program between
/// `itxn_begin` and `itxn_submit`. Fields arrive one at a time and
/// are only checked for shape here; the assembled transaction goes
/// through the same processor pipeline as a top-level one.
#[derive(Debug, Clone, Default)]
pub struct PendingInnerTxn {
  type_enum: Option<u64>,
  receiver: Option<Address>,
  amount: u64,
  fee: u64,
  xfer_asset: u64,
  asset_receiver: Option<Address>,
  asset_amount: u64,
  app_id: u64,
}

impl PendingInnerTxn {
  pub fn set(
    &mut self,
    field: ItxnFieldCode,
    value: TealValue,
  ) -> Result<(), Error> {
    match field {
      ItxnFieldCode::TypeEnum => {
        self.type_enum = Some(expect_uint(value, "TypeEnum")?);
      }
      ItxnFieldCode::Receiver => {
        self.receiver = Some(expect_address(value, "Receiver")?);
      }
      ItxnFieldCode::Amount => {
        self.amount = expect_uint(value, "Amount")?;
      }
      ItxnFieldCode::Fee => {
        self.fee = expect_uint(value, "Fee")?;
      }
      ItxnFieldCode::XferAsset => {
        self.xfer_asset = expect_uint(value, "XferAsset")?;
      }
      ItxnFieldCode::AssetReceiver => {
        self.asset_receiver = Some(expect_address(value, "AssetReceiver")?);
      }
      ItxnFieldCode::AssetAmount => {
        self.asset_amount = expect_uint(value, "AssetAmount")?;
      }
      ItxnFieldCode::ApplicationId => {
        self.app_id = expect_uint(value, "ApplicationID")?;
      }
    }
    Ok(())
  }

  /// Assembles the transaction the program described. The sender is
  /// always the calling application's account.
  pub fn build(
    self,
    sender: Address,
    last_valid: u64,
  ) -> Result<Transaction, Error> {
    let kind = match self.type_enum.ok_or(Error::MissingType)? {
      1 => TransactionKind::Payment {
        receiver: self.receiver.unwrap_or(Address::ZERO),
        amount: self.amount,
        close_remainder_to: None,
      },
      // a zero-amount transfer to oneself is how an account opts
      // into an asset
      4 if self.asset_amount == 0
        && self.asset_receiver == Some(sender) =>
      {
        TransactionKind::AssetOptIn {
          asset: self.xfer_asset,
        }
      }
      4 => TransactionKind::AssetTransfer {
        asset: self.xfer_asset,
        receiver: self.asset_receiver.unwrap_or(Address::ZERO),
        amount: self.asset_amount,
        close_to: None,
      },
      // inner application calls are plain invocations: no nested
      // creation, no reference arrays
      6 => TransactionKind::AppCall {
        app: self.app_id,
        on_complete: Default::default(),
        args: vec![],
        accounts: vec![],
        foreign_apps: vec![],
        foreign_assets: vec![],
        approval_program: None,
        clear_program: None,
        global_schema: None,
        local_schema: None,
      },
      3 => return Err(Error::UnsupportedType("asset config")),
      5 => return Err(Error::UnsupportedType("asset freeze")),
      other => return Err(Error::UnknownTypeEnum(other)),
    };

    Ok(Transaction {
      sender,
      fee: self.fee,
      first_valid: 0,
      last_valid,
      note: vec![],
      kind,
    })
  }

  pub fn fee(&self) -> u64 {
    self.fee
  }
}

fn expect_uint(value: TealValue, field: &'static str) -> Result<u64, Error> {
  value.as_uint().ok_or(Error::WrongFieldType {
    field,
    expected: "uint64",
  })
}

fn expect_address(
  value: TealValue,
  field: &'static str,
) -> Result<Address, Error> {
  match value {
    TealValue::Bytes(bytes) if bytes.len() == 32 => {
      Ok(Address::try_from(bytes.as_slice()).expect("length checked"))
    }
    _ => Err(Error::WrongFieldType {
      field,
      expected: "32 byte address",
    }),
  }
}
