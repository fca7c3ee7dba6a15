use {
  crate::{
    AppId,
    AppParams,
    AssetHolding,
    AssetId,
    AssetParams,
    StateSchema,
    TealKvStore,
  },
  serde::{Deserialize, Serialize},
  std::collections::BTreeMap,
};

/// Local state an account stores for one application it opted into.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalState {
  pub schema: StateSchema,
  pub kv: TealKvStore,
}

/// All state recorded for a single address.
///
/// This is plain data; every invariant-preserving mutation lives in
/// the ledger, which also keeps `min_balance` consistent with the
/// holdings and schemas recorded here.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
  /// Spendable balance in microunits.
  pub balance: u64,

  /// Minimum balance this account must retain, derived from the
  /// number of created assets, holdings, created apps and opted-in
  /// local states.
  pub min_balance: u64,

  /// Holdings of assets this account has opted into (the creator's
  /// holding included).
  pub holdings: BTreeMap<AssetId, AssetHolding>,

  /// Parameters of assets created by this account.
  pub created_assets: BTreeMap<AssetId, AssetParams>,

  /// Applications created by this account.
  pub created_apps: BTreeMap<AppId, AppParams>,

  /// Local state for applications this account has opted into.
  pub app_local: BTreeMap<AppId, LocalState>,
}

impl Account {
  pub fn with_balance(balance: u64) -> Self {
    Self {
      balance,
      ..Self::default()
    }
  }

  pub fn holding(&self, asset: AssetId) -> Option<&AssetHolding> {
    self.holdings.get(&asset)
  }

  pub fn opted_in(&self, app: AppId) -> bool {
    self.app_local.contains_key(&app)
  }
}
