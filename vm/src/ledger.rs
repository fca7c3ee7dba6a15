use {
  kiln_primitives::{
    Account,
    Address,
    AppId,
    AppParams,
    AssetConfigFields,
    AssetHolding,
    AssetId,
    AssetParams,
    LocalState,
    StateSchema,
    TealKvStore,
    TealValue,
    MAX_TEAL_VALUE_LEN,
  },
  std::collections::BTreeMap,
  thiserror::Error,
};

/// Balance every account must retain just for existing.
pub const ACCOUNT_MIN_BALANCE: u64 = 1_000_000;

/// Additional minimum balance per created asset or per holding.
pub const ASSET_MIN_BALANCE: u64 = 100_000;

/// Base additional minimum balance per created or opted-in app.
pub const APP_MIN_BALANCE: u64 = 100_000;

/// Minimum-balance price of one state key.
pub const SCHEMA_KEY_COST: u64 = 25_000;
/// Minimum-balance price of one uint value slot.
pub const SCHEMA_UINT_COST: u64 = 3_500;
/// Minimum-balance price of one byte-slice value slot.
pub const SCHEMA_BYTES_COST: u64 = 25_000;

pub const MAX_GLOBAL_SCHEMA_ENTRIES: u64 = 64;
pub const MAX_LOCAL_SCHEMA_ENTRIES: u64 = 16;
pub const MAX_STATE_KEY_LEN: usize = 64;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error("account {0} does not exist")]
  AccountDoesNotExist(Address),

  #[error("asset {0} not found")]
  AssetNotFound(AssetId),

  #[error("application {0} not found")]
  AppNotFound(AppId),

  #[error("account {address} doesn't hold asset {asset}")]
  AssetNotOptedIn { address: Address, asset: AssetId },

  #[error("account {address} is not opted in to application {app}")]
  AppNotOptedIn { address: Address, app: AppId },

  #[error("account {address} has already opted in to asset {asset}")]
  AlreadyOptedInAsset { address: Address, asset: AssetId },

  #[error("account {address} has already opted in to application {app}")]
  AlreadyOptedInApp { address: Address, app: AppId },

  #[error(
    "balance {balance} of account {address} would fall below the \
     minimum balance {min_balance}"
  )]
  BalanceBelowMinimum {
    address: Address,
    balance: u64,
    min_balance: u64,
  },

  #[error("cannot withdraw {amount} microunits from account {address}")]
  InsufficientBalance { address: Address, amount: u64 },

  #[error(
    "cannot withdraw {amount} units of asset {asset} from account \
     {address}"
  )]
  InsufficientAssetBalance {
    address: Address,
    asset: AssetId,
    amount: u64,
  },

  #[error("asset {asset} is frozen for account {address}")]
  AssetFrozen { address: Address, asset: AssetId },

  #[error("account {0} cannot close to itself")]
  CannotCloseToSelf(Address),

  #[error("asset creator cannot close its holding of asset {0}")]
  CannotCloseAssetByCreator(AssetId),

  #[error(
    "holding of asset {asset} by account {address} still has {amount} \
     units and cannot be removed"
  )]
  HoldingNotEmpty {
    address: Address,
    asset: AssetId,
    amount: u64,
  },

  #[error(
    "asset {0} can only be destroyed when the creator holds the \
     entire total supply"
  )]
  AssetTotalMismatch(AssetId),

  #[error("account {address} is not the manager of asset {asset}")]
  UnauthorizedManager { asset: AssetId, address: Address },

  #[error("account {address} is not the freeze authority of asset {asset}")]
  UnauthorizedFreeze { asset: AssetId, address: Address },

  #[error(
    "account {address} is not the clawback authority of asset {asset}"
  )]
  UnauthorizedClawback { asset: AssetId, address: Address },

  #[error(
    "the {authority} authority of asset {asset} was blanked and can \
     never be set again"
  )]
  CannotReinstateAuthority {
    asset: AssetId,
    authority: &'static str,
  },

  #[error("state schema of {entries} entries exceeds the maximum of {max}")]
  SchemaTooLarge { entries: u64, max: u64 },

  #[error("state of application {0} exceeds its declared schema")]
  SchemaViolation(AppId),

  #[error("state key of {0} bytes exceeds the {MAX_STATE_KEY_LEN} byte cap")]
  StateKeyTooLong(usize),

  #[error(
    "state value of {0} bytes exceeds the {MAX_TEAL_VALUE_LEN} byte cap"
  )]
  StateValueTooLong(usize),
}

/// All mutable chain state of the simulated network: accounts and the
/// indexes that locate created assets and applications.
///
/// Every method either preserves the ledger invariants or fails
/// without touching anything observable. The transaction processor
/// clones the whole ledger per group and swaps the clone in only on
/// success, so methods here never need to undo partial work across
/// calls.
#[derive(Debug, Clone, Default)]
pub struct Ledger {
  accounts: BTreeMap<Address, Account>,
  asset_creators: BTreeMap<AssetId, Address>,
  app_creators: BTreeMap<AppId, Address>,
  next_asset_id: AssetId,
  next_app_id: AppId,
}

impl Ledger {
  pub fn new() -> Self {
    Self {
      next_asset_id: 1,
      next_app_id: 1,
      ..Self::default()
    }
  }

  /// Seeds an account with a starting balance. Used when constructing
  /// the initial state of a simulation.
  pub fn add_account(&mut self, address: Address, balance: u64) {
    let mut account = Account::with_balance(balance);
    account.min_balance = ACCOUNT_MIN_BALANCE;
    self.accounts.insert(address, account);
  }

  pub fn account(&self, address: &Address) -> Result<&Account, Error> {
    self
      .accounts
      .get(address)
      .ok_or(Error::AccountDoesNotExist(*address))
  }

  fn account_mut(&mut self, address: &Address) -> Result<&mut Account, Error> {
    self
      .accounts
      .get_mut(address)
      .ok_or(Error::AccountDoesNotExist(*address))
  }

  /// Creates an empty account if the address has never been seen.
  /// Receiving a payment is what brings an account into existence.
  pub fn ensure_account(&mut self, address: Address) -> &mut Account {
    self.accounts.entry(address).or_insert_with(|| {
      let mut account = Account::default();
      account.min_balance = ACCOUNT_MIN_BALANCE;
      account
    })
  }

  pub fn accounts(&self) -> impl Iterator<Item = (&Address, &Account)> {
    self.accounts.iter()
  }

  pub fn balance(&self, address: &Address) -> Result<u64, Error> {
    Ok(self.account(address)?.balance)
  }

  pub fn min_balance(&self, address: &Address) -> Result<u64, Error> {
    Ok(self.account(address)?.min_balance)
  }

  /// Checks the account invariant after a mutation that lowered the
  /// balance or raised the minimum.
  fn assert_above_min(&self, address: &Address) -> Result<(), Error> {
    let account = self.account(address)?;
    if account.balance < account.min_balance {
      return Err(Error::BalanceBelowMinimum {
        address: *address,
        balance: account.balance,
        min_balance: account.min_balance,
      });
    }
    Ok(())
  }

  /// Recomputes the derived minimum balance from the holdings and
  /// schemas currently recorded in the account.
  fn recompute_min_balance(&mut self, address: &Address) -> Result<(), Error> {
    let account = self.account_mut(address)?;
    let mut min = ACCOUNT_MIN_BALANCE;

    min += ASSET_MIN_BALANCE * account.holdings.len() as u64;
    min += ASSET_MIN_BALANCE
      * account
        .created_assets
        .keys()
        .filter(|id| !account.holdings.contains_key(id))
        .count() as u64;

    for app in account.created_apps.values() {
      min += APP_MIN_BALANCE + schema_cost(&app.global_schema);
    }
    for local in account.app_local.values() {
      min += APP_MIN_BALANCE + schema_cost(&local.schema);
    }

    account.min_balance = min;
    Ok(())
  }

  //
  // microunit transfers
  //

  pub fn withdraw(&mut self, address: &Address, amount: u64) -> Result<(), Error> {
    let account = self.account_mut(address)?;
    account.balance = account.balance.checked_sub(amount).ok_or(
      Error::InsufficientBalance {
        address: *address,
        amount,
      },
    )?;
    self.assert_above_min(address)
  }

  pub fn deposit(&mut self, address: Address, amount: u64) {
    self.ensure_account(address).balance += amount;
  }

  /// Moves microunits between two accounts, creating the receiver if
  /// it does not exist yet.
  pub fn transfer(
    &mut self,
    from: &Address,
    to: Address,
    amount: u64,
  ) -> Result<(), Error> {
    self.withdraw(from, amount)?;
    self.deposit(to, amount);
    Ok(())
  }

  /// Sends the sender's entire remaining balance to `close_to`,
  /// leaving the sender empty. The minimum-balance invariant does not
  /// apply to an account that was just closed.
  pub fn close_account(
    &mut self,
    from: &Address,
    close_to: Address,
  ) -> Result<(), Error> {
    if *from == close_to {
      return Err(Error::CannotCloseToSelf(*from));
    }
    let account = self.account_mut(from)?;
    let remainder = account.balance;
    account.balance = 0;
    self.deposit(close_to, remainder);
    Ok(())
  }

  //
  // assets
  //

  pub fn asset_params(&self, asset: AssetId) -> Result<&AssetParams, Error> {
    let creator = self
      .asset_creators
      .get(&asset)
      .ok_or(Error::AssetNotFound(asset))?;
    self
      .account(creator)?
      .created_assets
      .get(&asset)
      .ok_or(Error::AssetNotFound(asset))
  }

  fn asset_params_mut(
    &mut self,
    asset: AssetId,
  ) -> Result<&mut AssetParams, Error> {
    let creator = *self
      .asset_creators
      .get(&asset)
      .ok_or(Error::AssetNotFound(asset))?;
    self
      .account_mut(&creator)?
      .created_assets
      .get_mut(&asset)
      .ok_or(Error::AssetNotFound(asset))
  }

  pub fn holding(
    &self,
    address: &Address,
    asset: AssetId,
  ) -> Result<&AssetHolding, Error> {
    self
      .account(address)?
      .holdings
      .get(&asset)
      .ok_or(Error::AssetNotOptedIn {
        address: *address,
        asset,
      })
  }

  fn holding_mut(
    &mut self,
    address: &Address,
    asset: AssetId,
  ) -> Result<&mut AssetHolding, Error> {
    self
      .account_mut(address)?
      .holdings
      .get_mut(&asset)
      .ok_or(Error::AssetNotOptedIn {
        address: *address,
        asset,
      })
  }

  /// Creates a new asset owned by `creator` and returns the assigned
  /// id. The creator starts out holding the entire total supply; its
  /// own holding is never default-frozen.
  pub fn create_asset(
    &mut self,
    creator: &Address,
    mut params: AssetParams,
  ) -> Result<AssetId, Error> {
    params.creator = *creator;
    let id = self.next_asset_id;
    let total = params.total;

    let account = self.account_mut(creator)?;
    account.created_assets.insert(id, params);
    account.holdings.insert(id, AssetHolding {
      amount: total,
      frozen: false,
    });

    self.next_asset_id += 1;
    self.asset_creators.insert(id, *creator);
    self.recompute_min_balance(creator)?;
    self.assert_above_min(creator)?;
    Ok(id)
  }

  /// Creates a zero-amount holding for `address`. Rejected when the
  /// account already holds the asset; the real network warns on
  /// duplicate opt-ins and the store treats that as a state error.
  pub fn opt_in_asset(
    &mut self,
    address: &Address,
    asset: AssetId,
  ) -> Result<(), Error> {
    let default_frozen = self.asset_params(asset)?.default_frozen;
    let account = self.account_mut(address)?;
    if account.holdings.contains_key(&asset) {
      return Err(Error::AlreadyOptedInAsset {
        address: *address,
        asset,
      });
    }
    account.holdings.insert(asset, AssetHolding {
      amount: 0,
      frozen: default_frozen,
    });
    self.recompute_min_balance(address)?;
    self.assert_above_min(address)
  }

  /// Removes an empty holding. The creator cannot opt out (its
  /// holding backs the total-supply invariant) and a holding with
  /// units left must be closed through a transfer instead.
  pub fn opt_out_asset(
    &mut self,
    address: &Address,
    asset: AssetId,
  ) -> Result<(), Error> {
    if self.asset_params(asset)?.creator == *address {
      return Err(Error::CannotCloseAssetByCreator(asset));
    }
    let amount = self.holding(address, asset)?.amount;
    if amount != 0 {
      return Err(Error::HoldingNotEmpty {
        address: *address,
        asset,
        amount,
      });
    }
    self.account_mut(address)?.holdings.remove(&asset);
    self.recompute_min_balance(address)
  }

  /// Moves asset units between holders. Both sides must hold the
  /// asset, and unless the move is clawback-initiated neither side
  /// may be frozen. With `close_to` the sender's remaining units
  /// follow and the holding entry is removed; the asset's creator may
  /// never close its own holding.
  pub fn transfer_asset(
    &mut self,
    asset: AssetId,
    from: &Address,
    to: &Address,
    amount: u64,
    close_to: Option<Address>,
    clawback: bool,
  ) -> Result<(), Error> {
    if amount > 0 && !clawback {
      for side in [from, to] {
        if self.holding(side, asset)?.frozen {
          return Err(Error::AssetFrozen {
            address: *side,
            asset,
          });
        }
      }
    }

    // receiver must have opted in even for zero-amount transfers
    self.holding(to, asset)?;

    let from_holding = self.holding_mut(from, asset)?;
    from_holding.amount = from_holding.amount.checked_sub(amount).ok_or(
      Error::InsufficientAssetBalance {
        address: *from,
        asset,
        amount,
      },
    )?;
    self.holding_mut(to, asset)?.amount += amount;

    if let Some(close_to) = close_to {
      if close_to == *from {
        return Err(Error::CannotCloseToSelf(*from));
      }
      if self.asset_params(asset)?.creator == *from {
        return Err(Error::CannotCloseAssetByCreator(asset));
      }
      if !clawback && self.holding(&close_to, asset)?.frozen {
        return Err(Error::AssetFrozen {
          address: close_to,
          asset,
        });
      }
      self.holding(&close_to, asset)?;
      let remainder = self.holding(from, asset)?.amount;
      self.holding_mut(&close_to, asset)?.amount += remainder;
      self.account_mut(from)?.holdings.remove(&asset);
      self.recompute_min_balance(from)?;
    }
    Ok(())
  }

  /// Freezes or unfreezes one holding. Only the asset's current
  /// freeze authority may do this.
  pub fn freeze_asset(
    &mut self,
    asset: AssetId,
    authority: &Address,
    target: &Address,
    frozen: bool,
  ) -> Result<(), Error> {
    if self.asset_params(asset)?.freeze != Some(*authority) {
      return Err(Error::UnauthorizedFreeze {
        asset,
        address: *authority,
      });
    }
    self.holding_mut(target, asset)?.frozen = frozen;
    Ok(())
  }

  /// Clawback: moves units out of `revoke_from` regardless of
  /// freezes. Only the asset's current clawback authority may do
  /// this. A clawback may close a non-creator holder's balance to a
  /// designated address.
  pub fn revoke_asset(
    &mut self,
    asset: AssetId,
    authority: &Address,
    revoke_from: &Address,
    receiver: &Address,
    amount: u64,
    close_to: Option<Address>,
  ) -> Result<(), Error> {
    if self.asset_params(asset)?.clawback != Some(*authority) {
      return Err(Error::UnauthorizedClawback {
        asset,
        address: *authority,
      });
    }
    self.transfer_asset(asset, revoke_from, receiver, amount, close_to, true)
  }

  /// Replaces the asset's authority addresses. Only the current
  /// manager may reconfigure, and a blanked authority is blank
  /// forever.
  pub fn config_asset(
    &mut self,
    asset: AssetId,
    sender: &Address,
    fields: AssetConfigFields,
  ) -> Result<(), Error> {
    let params = self.asset_params(asset)?;
    if params.manager != Some(*sender) {
      return Err(Error::UnauthorizedManager {
        asset,
        address: *sender,
      });
    }

    let updates = [
      ("manager", params.manager, fields.manager),
      ("reserve", params.reserve, fields.reserve),
      ("freeze", params.freeze, fields.freeze),
      ("clawback", params.clawback, fields.clawback),
    ];
    for (authority, current, proposed) in updates {
      if current.is_none() && proposed.is_some() {
        return Err(Error::CannotReinstateAuthority { asset, authority });
      }
    }

    let params = self.asset_params_mut(asset)?;
    params.manager = fields.manager;
    params.reserve = fields.reserve;
    params.freeze = fields.freeze;
    params.clawback = fields.clawback;
    Ok(())
  }

  /// Destroys an asset. Only the manager may do this, and only while
  /// the creator holds the entire total supply, which guarantees no
  /// other account loses units.
  pub fn destroy_asset(
    &mut self,
    asset: AssetId,
    sender: &Address,
  ) -> Result<(), Error> {
    let params = self.asset_params(asset)?;
    if params.manager != Some(*sender) {
      return Err(Error::UnauthorizedManager {
        asset,
        address: *sender,
      });
    }
    let creator = params.creator;
    let total = params.total;

    if self.holding(&creator, asset)?.amount != total {
      return Err(Error::AssetTotalMismatch(asset));
    }

    let account = self.account_mut(&creator)?;
    account.created_assets.remove(&asset);
    account.holdings.remove(&asset);
    self.asset_creators.remove(&asset);
    self.recompute_min_balance(&creator)?;

    // drop leftover empty holdings of accounts that were opted in
    let holders: Vec<Address> = self
      .accounts
      .iter()
      .filter(|(_, acc)| acc.holdings.contains_key(&asset))
      .map(|(addr, _)| *addr)
      .collect();
    for addr in holders {
      self.account_mut(&addr)?.holdings.remove(&asset);
      self.recompute_min_balance(&addr)?;
    }
    Ok(())
  }

  /// Sum of all recorded holdings of an asset. Used by tests to
  /// check the fixed-supply invariant.
  pub fn circulating_supply(&self, asset: AssetId) -> u64 {
    self
      .accounts
      .values()
      .filter_map(|acc| acc.holdings.get(&asset))
      .map(|h| h.amount)
      .sum()
  }

  //
  // applications
  //

  pub fn app_params(&self, app: AppId) -> Result<&AppParams, Error> {
    let creator = self
      .app_creators
      .get(&app)
      .ok_or(Error::AppNotFound(app))?;
    self
      .account(creator)?
      .created_apps
      .get(&app)
      .ok_or(Error::AppNotFound(app))
  }

  fn app_params_mut(&mut self, app: AppId) -> Result<&mut AppParams, Error> {
    let creator = *self
      .app_creators
      .get(&app)
      .ok_or(Error::AppNotFound(app))?;
    self
      .account_mut(&creator)?
      .created_apps
      .get_mut(&app)
      .ok_or(Error::AppNotFound(app))
  }

  pub fn app_exists(&self, app: AppId) -> bool {
    self.app_creators.contains_key(&app)
  }

  /// Creates an application and its backing account, returning the
  /// assigned id. The creator's minimum balance grows before the
  /// approval program runs.
  pub fn create_app(
    &mut self,
    creator: &Address,
    approval_program: Vec<u8>,
    clear_program: Vec<u8>,
    global_schema: StateSchema,
    local_schema: StateSchema,
  ) -> Result<AppId, Error> {
    if global_schema.entries() > MAX_GLOBAL_SCHEMA_ENTRIES {
      return Err(Error::SchemaTooLarge {
        entries: global_schema.entries(),
        max: MAX_GLOBAL_SCHEMA_ENTRIES,
      });
    }
    if local_schema.entries() > MAX_LOCAL_SCHEMA_ENTRIES {
      return Err(Error::SchemaTooLarge {
        entries: local_schema.entries(),
        max: MAX_LOCAL_SCHEMA_ENTRIES,
      });
    }

    let id = self.next_app_id;
    self.account_mut(creator)?.created_apps.insert(id, AppParams {
      approval_program,
      clear_program,
      global_schema,
      local_schema,
      global_state: Default::default(),
      creator: *creator,
    });
    self.next_app_id += 1;
    self.app_creators.insert(id, *creator);
    self.ensure_account(Address::for_app(id));
    self.recompute_min_balance(creator)?;
    self.assert_above_min(creator)?;
    Ok(id)
  }

  pub fn update_app(
    &mut self,
    app: AppId,
    approval_program: Vec<u8>,
    clear_program: Vec<u8>,
  ) -> Result<(), Error> {
    let params = self.app_params_mut(app)?;
    params.approval_program = approval_program;
    params.clear_program = clear_program;
    Ok(())
  }

  /// Removes the application. Local state of opted-in accounts stays
  /// behind until they close out or clear.
  pub fn delete_app(&mut self, app: AppId) -> Result<(), Error> {
    let creator = *self
      .app_creators
      .get(&app)
      .ok_or(Error::AppNotFound(app))?;
    self.account_mut(&creator)?.created_apps.remove(&app);
    self.app_creators.remove(&app);
    self.recompute_min_balance(&creator)
  }

  /// Allocates local state for `address`. Duplicate opt-ins are a
  /// state error, mirroring the network's behavior.
  pub fn opt_in_app(
    &mut self,
    address: &Address,
    app: AppId,
  ) -> Result<(), Error> {
    let schema = self.app_params(app)?.local_schema;
    let account = self.account_mut(address)?;
    if account.app_local.contains_key(&app) {
      return Err(Error::AlreadyOptedInApp {
        address: *address,
        app,
      });
    }
    account.app_local.insert(app, LocalState {
      schema,
      kv: Default::default(),
    });
    self.recompute_min_balance(address)?;
    self.assert_above_min(address)
  }

  /// Removes `address`'s local state for an app. Works whether or
  /// not the application still exists, so accounts can always
  /// reclaim their minimum balance.
  pub fn close_out_app(
    &mut self,
    address: &Address,
    app: AppId,
  ) -> Result<(), Error> {
    let account = self.account_mut(address)?;
    if account.app_local.remove(&app).is_none() {
      return Err(Error::AppNotOptedIn {
        address: *address,
        app,
      });
    }
    self.recompute_min_balance(address)
  }

  //
  // application state
  //

  pub fn global_state(
    &self,
    app: AppId,
    key: &[u8],
  ) -> Result<Option<&TealValue>, Error> {
    Ok(self.app_params(app)?.global_state.get(key))
  }

  pub fn set_global_state(
    &mut self,
    app: AppId,
    key: Vec<u8>,
    value: TealValue,
  ) -> Result<(), Error> {
    assert_entry_bounds(&key, &value)?;
    let params = self.app_params_mut(app)?;
    params.global_state.insert(key, value);
    if !schema_fits(&params.global_state, &params.global_schema) {
      return Err(Error::SchemaViolation(app));
    }
    Ok(())
  }

  pub fn del_global_state(&mut self, app: AppId, key: &[u8]) -> Result<(), Error> {
    self.app_params_mut(app)?.global_state.remove(key);
    Ok(())
  }

  pub fn local_state(
    &self,
    app: AppId,
    address: &Address,
    key: &[u8],
  ) -> Result<Option<&TealValue>, Error> {
    let account = self.account(address)?;
    let local = account.app_local.get(&app).ok_or(Error::AppNotOptedIn {
      address: *address,
      app,
    })?;
    Ok(local.kv.get(key))
  }

  pub fn set_local_state(
    &mut self,
    app: AppId,
    address: &Address,
    key: Vec<u8>,
    value: TealValue,
  ) -> Result<(), Error> {
    assert_entry_bounds(&key, &value)?;
    let account = self.account_mut(address)?;
    let local =
      account
        .app_local
        .get_mut(&app)
        .ok_or(Error::AppNotOptedIn {
          address: *address,
          app,
        })?;
    local.kv.insert(key, value);
    if !schema_fits(&local.kv, &local.schema) {
      return Err(Error::SchemaViolation(app));
    }
    Ok(())
  }

  pub fn del_local_state(
    &mut self,
    app: AppId,
    address: &Address,
    key: &[u8],
  ) -> Result<(), Error> {
    let account = self.account_mut(address)?;
    let local =
      account
        .app_local
        .get_mut(&app)
        .ok_or(Error::AppNotOptedIn {
          address: *address,
          app,
        })?;
    local.kv.remove(key);
    Ok(())
  }
}

fn schema_cost(schema: &StateSchema) -> u64 {
  (SCHEMA_KEY_COST + SCHEMA_UINT_COST) * schema.num_uints
    + (SCHEMA_KEY_COST + SCHEMA_BYTES_COST) * schema.num_byte_slices
}

fn assert_entry_bounds(key: &[u8], value: &TealValue) -> Result<(), Error> {
  if key.len() > MAX_STATE_KEY_LEN {
    return Err(Error::StateKeyTooLong(key.len()));
  }
  if let TealValue::Bytes(bytes) = value {
    if bytes.len() > MAX_TEAL_VALUE_LEN {
      return Err(Error::StateValueTooLong(bytes.len()));
    }
  }
  Ok(())
}

fn schema_fits(kv: &TealKvStore, schema: &StateSchema) -> bool {
  let uints = kv
    .values()
    .filter(|v| matches!(v, TealValue::Uint(_)))
    .count() as u64;
  let bytes = kv.len() as u64 - uints;
  uints <= schema.num_uints && bytes <= schema.num_byte_slices
}
