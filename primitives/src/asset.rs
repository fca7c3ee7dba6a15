use {
  crate::Address,
  serde::{Deserialize, Serialize},
};

pub type AssetId = u64;

/// Parameters of an asset, fixed or mutable, as recorded in the
/// creator's account.
///
/// The total supply, decimals and default-frozen flag are immutable
/// after creation. The four authority addresses are mutable through an
/// asset-config transaction signed by the current manager, with one
/// irreversible rule: an authority that has been blanked (`None`) can
/// never be set again.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetParams {
  /// Total number of units in existence. The sum of all holders'
  /// amounts equals this value at all times.
  pub total: u64,
  pub decimals: u32,

  /// Whether holdings created by opt-in start out frozen. The
  /// creator's own holding is never frozen by default.
  pub default_frozen: bool,

  pub unit_name: String,
  pub asset_name: String,
  pub url: String,
  pub metadata_hash: Vec<u8>,

  /// May reconfigure or destroy the asset.
  pub manager: Option<Address>,
  /// Holds un-issued supply by convention. Carries no special rights
  /// inside the runtime but is reported through the params opcode.
  pub reserve: Option<Address>,
  /// May freeze and unfreeze any holding of this asset.
  pub freeze: Option<Address>,
  /// May move units out of any holding, ignoring freezes.
  pub clawback: Option<Address>,

  pub creator: Address,
}

impl AssetParams {
  /// A minimal parameter set for tests and simple deployments. The
  /// creator address is assigned by the transaction processor.
  pub fn new(total: u64, decimals: u32, unit_name: &str, name: &str) -> Self {
    Self {
      total,
      decimals,
      default_frozen: false,
      unit_name: unit_name.into(),
      asset_name: name.into(),
      url: String::new(),
      metadata_hash: vec![],
      manager: None,
      reserve: None,
      freeze: None,
      clawback: None,
      creator: Address::ZERO,
    }
  }
}

/// One account's holding of one asset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetHolding {
  pub amount: u64,
  pub frozen: bool,
}

/// New authority addresses proposed by an asset-config transaction.
///
/// Every field is replaced wholesale: `Some(addr)` assigns a new
/// authority, `None` blanks it permanently.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssetConfigFields {
  pub manager: Option<Address>,
  pub reserve: Option<Address>,
  pub freeze: Option<Address>,
  pub clawback: Option<Address>,
}
