use {
  common::{
    addr,
    asset_config,
    asset_create,
    asset_freeze,
    asset_opt_in,
    asset_revoke,
    asset_transfer,
    asset_transfer_close,
    pay,
    runtime_with_master,
  },
  kiln_primitives::{AssetConfigFields, AssetParams},
  kiln_vm::{ErrorKind, LedgerError, RuntimeError},
};

mod common;

#[test]
fn transfer_requires_opt_in_then_succeeds() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let alice = addr(1);
  let bob = addr(2);

  runtime.execute_one(pay(master, alice, 5_000_000))?;
  runtime.execute_one(pay(master, bob, 5_000_000))?;

  let receipt = runtime
    .execute_one(asset_create(alice, AssetParams::new(1000, 0, "G", "gold")))?;
  let gold = receipt.asset_id.expect("creation assigns an id");

  // the creator starts out holding the full supply
  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 1000);

  // bob has not opted in yet
  let err = runtime
    .execute_one(asset_transfer(alice, gold, bob, 200))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AssetNotOptedIn { .. })
  ));
  assert_eq!(err.kind(), ErrorKind::State);
  assert_eq!(err.to_string(), format!("account {bob} doesn't hold asset {gold}"));

  // the failed transfer left no trace
  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 1000);

  runtime.execute_one(asset_opt_in(bob, gold))?;
  runtime.execute_one(asset_transfer(alice, gold, bob, 200))?;

  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 800);
  assert_eq!(runtime.asset_holding(gold, &bob)?.amount, 200);
  assert_eq!(runtime.ledger().circulating_supply(gold), 1000);
  Ok(())
}

#[test]
fn duplicate_asset_opt_in_is_rejected() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let alice = addr(1);
  let bob = addr(2);

  runtime.execute_one(pay(master, alice, 5_000_000))?;
  runtime.execute_one(pay(master, bob, 5_000_000))?;

  let gold = runtime
    .execute_one(asset_create(alice, AssetParams::new(1000, 0, "G", "gold")))?
    .asset_id
    .unwrap();

  runtime.execute_one(asset_opt_in(bob, gold))?;
  let err = runtime.execute_one(asset_opt_in(bob, gold)).unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AlreadyOptedInAsset { .. })
  ));
  assert_eq!(err.kind(), ErrorKind::State);
  Ok(())
}

#[test]
fn close_to_creator_rules() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let alice = addr(1);
  let bob = addr(2);

  runtime.execute_one(pay(master, alice, 5_000_000))?;
  runtime.execute_one(pay(master, bob, 5_000_000))?;

  let gold = runtime
    .execute_one(asset_create(alice, AssetParams::new(1000, 0, "G", "gold")))?
    .asset_id
    .unwrap();
  runtime.execute_one(asset_opt_in(bob, gold))?;
  runtime.execute_one(asset_transfer(alice, gold, bob, 300))?;

  // the creator itself may never close its holding, not even toward
  // another account
  let err = runtime
    .execute_one(asset_transfer_close(alice, gold, bob, 0, bob))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::CannotCloseAssetByCreator(_))
  ));

  // a non-creator holder closing back to the creator is fine
  runtime.execute_one(asset_transfer_close(bob, gold, alice, 100, alice))?;
  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 1000);
  assert!(runtime.asset_holding(gold, &bob).is_err());
  assert_eq!(runtime.ledger().circulating_supply(gold), 1000);
  Ok(())
}

#[test]
fn frozen_holdings_move_only_by_clawback() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let alice = addr(1);
  let bob = addr(2);
  let treasurer = addr(3);

  runtime.execute_one(pay(master, alice, 5_000_000))?;
  runtime.execute_one(pay(master, bob, 5_000_000))?;
  runtime.execute_one(pay(master, treasurer, 5_000_000))?;

  let mut params = AssetParams::new(1000, 0, "G", "gold");
  params.manager = Some(alice);
  params.freeze = Some(treasurer);
  params.clawback = Some(treasurer);
  let gold = runtime.execute_one(asset_create(alice, params))?
    .asset_id
    .unwrap();

  runtime.execute_one(asset_opt_in(bob, gold))?;
  runtime.execute_one(asset_transfer(alice, gold, bob, 500))?;

  // only the freeze authority may freeze
  let err = runtime
    .execute_one(asset_freeze(alice, gold, bob, true))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authorization);

  runtime.execute_one(asset_freeze(treasurer, gold, bob, true))?;
  assert!(runtime.asset_holding(gold, &bob)?.frozen);

  // a frozen holding cannot move by ordinary transfer
  let err = runtime
    .execute_one(asset_transfer(bob, gold, alice, 10))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AssetFrozen { .. })
  ));

  // clawback ignores the freeze
  runtime.execute_one(asset_revoke(treasurer, gold, bob, alice, 200))?;
  assert_eq!(runtime.asset_holding(gold, &bob)?.amount, 300);
  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 700);

  // but a non-clawback sender cannot revoke
  let err = runtime
    .execute_one(asset_revoke(alice, gold, bob, alice, 10))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::UnauthorizedClawback { .. })
  ));
  assert_eq!(err.kind(), ErrorKind::Authorization);

  // a clawback may close the frozen holder out entirely
  runtime.execute_one(common::asset_revoke_close(
    treasurer, gold, bob, alice, 100, alice,
  ))?;
  assert!(runtime.asset_holding(gold, &bob).is_err());
  assert_eq!(runtime.asset_holding(gold, &alice)?.amount, 1000);
  assert_eq!(runtime.ledger().circulating_supply(gold), 1000);
  Ok(())
}

#[test]
fn reconfigure_authorities() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let alice = addr(1);
  let bob = addr(2);

  runtime.execute_one(pay(master, alice, 5_000_000))?;
  runtime.execute_one(pay(master, bob, 5_000_000))?;

  let mut params = AssetParams::new(1000, 0, "G", "gold");
  params.manager = Some(alice);
  params.freeze = Some(alice);
  let gold = runtime.execute_one(asset_create(alice, params))?
    .asset_id
    .unwrap();

  // a non-manager cannot reconfigure
  let err = runtime
    .execute_one(asset_config(bob, gold, AssetConfigFields {
      manager: Some(bob),
      ..Default::default()
    }))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Authorization);

  // hand the manager role to bob, blank the freeze authority
  runtime.execute_one(asset_config(alice, gold, AssetConfigFields {
    manager: Some(bob),
    ..Default::default()
  }))?;
  assert_eq!(runtime.asset_params(gold)?.manager, Some(bob));
  assert_eq!(runtime.asset_params(gold)?.freeze, None);

  // the blanked freeze authority is gone for good
  let err = runtime
    .execute_one(asset_config(bob, gold, AssetConfigFields {
      manager: Some(bob),
      freeze: Some(bob),
      ..Default::default()
    }))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::CannotReinstateAuthority { .. })
  ));
  Ok(())
}

#[test]
fn supply_is_conserved_across_random_transfers() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let holders: Vec<_> = (1u8..6).map(addr).collect();
  for holder in &holders {
    runtime.execute_one(pay(master, *holder, 5_000_000))?;
  }

  let gold = runtime
    .execute_one(asset_create(
      holders[0],
      AssetParams::new(10_000, 2, "G", "gold"),
    ))?
    .asset_id
    .unwrap();
  for holder in &holders[1..] {
    runtime.execute_one(asset_opt_in(*holder, gold))?;
  }

  // a fixed pattern of transfers, some of which fail
  for step in 0u64..20 {
    let from = holders[(step % 5) as usize];
    let to = holders[((step + 2) % 5) as usize];
    let _ = runtime.execute_one(asset_transfer(from, gold, to, step * 37));
    assert_eq!(runtime.ledger().circulating_supply(gold), 10_000);
  }
  Ok(())
}
