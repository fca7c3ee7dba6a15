use {
  common::{
    addr,
    app_call,
    app_call_args,
    app_create,
    approve,
    pay,
    reject,
    runtime_with_master,
    txn,
    ProgramBuilder,
    txn_field,
  },
  kiln_primitives::{
    Address,
    OnComplete,
    StateSchema,
    TealValue,
    TransactionKind,
  },
  kiln_vm::{ErrorKind, GroupError, LedgerError, RuntimeError},
};

mod common;

/// Counter application: `NoOp` increments a global counter, opting
/// in marks the caller's local state, everything else is approved
/// as-is.
fn counter_program() -> Vec<u8> {
  ProgramBuilder::new(4)
    .txn(txn_field::APPLICATION_ID)
    .bz("approve")
    .txn(txn_field::ON_COMPLETION)
    .bz("noop")
    .txn(txn_field::ON_COMPLETION)
    .int(1)
    .eq()
    .bnz("optin")
    .label("approve")
    .int(1)
    .b("end")
    .label("optin")
    .int(0)
    .bytes(b"joined")
    .int(1)
    .app_local_put()
    .int(1)
    .b("end")
    .label("noop")
    .bytes(b"count")
    .bytes(b"count")
    .app_global_get()
    .int(1)
    .add()
    .app_global_put()
    .int(1)
    .build()
}

/// A clear program that writes state and then fails. The failure may
/// not leave the write behind, and may not prevent the clear.
fn failing_clear_program() -> Vec<u8> {
  ProgramBuilder::new(4)
    .bytes(b"cleared")
    .int(1)
    .app_global_put()
    .err()
    .build()
}

fn deploy_counter(
  runtime: &mut kiln_vm::Runtime,
  master: Address,
  creator: Address,
) -> anyhow::Result<u64> {
  runtime.execute_one(pay(master, creator, 10_000_000))?;
  let app = runtime
    .execute_one(app_create(
      creator,
      counter_program(),
      failing_clear_program(),
      StateSchema::new(1, 0),
      StateSchema::new(1, 0),
    ))?
    .app_id
    .expect("creation assigns an id");
  Ok(app)
}

#[test]
fn create_and_count() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let app = deploy_counter(&mut runtime, master, creator)?;

  // the application account exists from creation on
  assert_eq!(runtime.balance(&Address::for_app(app))?, 0);
  assert_eq!(runtime.global_state(app, b"count")?, None);

  runtime.execute_one(app_call(creator, app, OnComplete::NoOp))?;
  runtime.execute_one(app_call(creator, app, OnComplete::NoOp))?;
  assert_eq!(
    runtime.global_state(app, b"count")?,
    Some(TealValue::Uint(2))
  );
  Ok(())
}

#[test]
fn opt_in_close_out_lifecycle() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let user = addr(2);
  let app = deploy_counter(&mut runtime, master, creator)?;
  runtime.execute_one(pay(master, user, 5_000_000))?;

  runtime.execute_one(app_call(user, app, OnComplete::OptIn))?;
  assert_eq!(
    runtime.local_state(app, &user, b"joined")?,
    Some(TealValue::Uint(1))
  );

  let err = runtime
    .execute_one(app_call(user, app, OnComplete::OptIn))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AlreadyOptedInApp { .. })
  ));
  assert_eq!(err.kind(), ErrorKind::State);

  runtime.execute_one(app_call(user, app, OnComplete::CloseOut))?;
  assert!(runtime.local_state(app, &user, b"joined").is_err());

  // closing out again has nothing to remove
  let err = runtime
    .execute_one(app_call(user, app, OnComplete::CloseOut))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AppNotOptedIn { .. })
  ));
  Ok(())
}

#[test]
fn clear_state_always_clears() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let user = addr(2);
  let app = deploy_counter(&mut runtime, master, creator)?;
  runtime.execute_one(pay(master, user, 5_000_000))?;

  runtime.execute_one(app_call(user, app, OnComplete::OptIn))?;

  // the clear program fails, the local state is removed anyway and
  // the failed program's writes are discarded
  runtime.execute_one(app_call(user, app, OnComplete::ClearState))?;
  assert!(runtime.local_state(app, &user, b"joined").is_err());
  assert_eq!(runtime.global_state(app, b"cleared")?, None);
  Ok(())
}

#[test]
fn clear_state_works_after_app_deletion() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let user = addr(2);
  let app = deploy_counter(&mut runtime, master, creator)?;
  runtime.execute_one(pay(master, user, 5_000_000))?;

  runtime.execute_one(app_call(user, app, OnComplete::OptIn))?;
  runtime.execute_one(app_call(creator, app, OnComplete::Delete))?;
  assert!(runtime.app_params(app).is_err());

  // the app is gone but the user can still reclaim their local state
  runtime.execute_one(app_call(user, app, OnComplete::ClearState))?;
  assert!(runtime.local_state(app, &user, b"joined").is_err());
  Ok(())
}

#[test]
fn update_swaps_programs() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let app = deploy_counter(&mut runtime, master, creator)?;

  runtime.execute_one(txn(creator, TransactionKind::AppCall {
    app,
    on_complete: OnComplete::Update,
    args: vec![],
    accounts: vec![],
    foreign_apps: vec![],
    foreign_assets: vec![],
    approval_program: Some(reject(4)),
    clear_program: Some(approve(4)),
    global_schema: None,
    local_schema: None,
  }))?;
  assert_eq!(runtime.app_params(app)?.approval_program, reject(4));

  // the updated program now rejects every call
  let err = runtime
    .execute_one(app_call(creator, app, OnComplete::NoOp))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Logic);
  assert_eq!(err.to_string(), "rejected by logic");
  Ok(())
}

#[test]
fn update_requires_programs() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let app = deploy_counter(&mut runtime, master, creator)?;

  let err = runtime
    .execute_one(app_call(creator, app, OnComplete::Update))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Group(GroupError::MissingAppFields)
  ));
  Ok(())
}

#[test]
fn delete_removes_the_app() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let app = deploy_counter(&mut runtime, master, creator)?;

  runtime.execute_one(app_call(creator, app, OnComplete::Delete))?;
  assert!(runtime.app_params(app).is_err());

  let err = runtime
    .execute_one(app_call(creator, app, OnComplete::NoOp))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Ledger(LedgerError::AppNotFound(_))
  ));
  Ok(())
}

#[test]
fn rejected_creation_burns_nothing() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  runtime.execute_one(pay(master, creator, 10_000_000))?;

  let before = runtime.account(&creator)?.clone();
  let err = runtime
    .execute_one(app_create(
      creator,
      reject(4),
      approve(4),
      StateSchema::new(0, 0),
      StateSchema::new(0, 0),
    ))
    .unwrap_err();
  assert_eq!(err.kind(), ErrorKind::Logic);
  assert_eq!(runtime.account(&creator)?, &before);

  // the rolled back creation did not consume the id
  let first = runtime
    .execute_one(app_create(
      creator,
      approve(4),
      approve(4),
      StateSchema::new(0, 0),
      StateSchema::new(0, 0),
    ))?
    .app_id
    .unwrap();
  assert_eq!(first, 1);
  assert_eq!(
    runtime.app_params(first)?.approval_program,
    approve(4)
  );
  Ok(())
}

#[test]
fn reference_arrays_are_bounded() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  let app = deploy_counter(&mut runtime, master, creator)?;

  let err = runtime
    .execute_one(app_call_args(
      creator,
      app,
      OnComplete::NoOp,
      vec![],
      (1u8..6).map(addr).collect(),
    ))
    .unwrap_err();
  assert!(matches!(
    err,
    RuntimeError::Group(GroupError::TooManyReferences {
      kind: "account",
      count: 5,
      max: 4
    })
  ));
  assert_eq!(err.kind(), ErrorKind::Resource);
  Ok(())
}

#[test]
fn time_gated_logic_follows_the_simulated_clock() -> anyhow::Result<()> {
  let (mut runtime, master) = runtime_with_master();
  let creator = addr(1);
  runtime.execute_one(pay(master, creator, 10_000_000))?;

  // approves only at round 50 or later
  let program = ProgramBuilder::new(4)
    .txn(txn_field::APPLICATION_ID)
    .bz("approve")
    .global(common::global_field::ROUND)
    .int(50)
    .ge()
    .b("end")
    .label("approve")
    .int(1)
    .build();

  let app = runtime
    .execute_one(app_create(
      creator,
      program,
      approve(4),
      StateSchema::new(0, 0),
      StateSchema::new(0, 0),
    ))?
    .app_id
    .unwrap();

  let err = runtime
    .execute_one(app_call(creator, app, OnComplete::NoOp))
    .unwrap_err();
  assert_eq!(err.to_string(), "rejected by logic");

  // the clock only moves when the caller moves it
  runtime.set_round_and_timestamp(50, 1_700_000_000);
  runtime.execute_one(app_call(creator, app, OnComplete::NoOp))?;
  Ok(())
}
