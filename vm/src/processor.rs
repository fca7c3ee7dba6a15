use {
  crate::{
    bytecode::Program,
    cost::MAX_APP_PROGRAM_COST,
    errors::RuntimeError,
    interpreter::{self, ExecutionMode},
    ledger::Ledger,
    lsig,
  },
  kiln_primitives::{
    Address,
    AppId,
    AssetId,
    OnComplete,
    SignedTransaction,
    StateSchema,
    ToBase58String,
    TransactionKind,
    TxnSignature,
  },
  serde::{Deserialize, Serialize},
  thiserror::Error,
  tracing::{debug, trace},
};

/// Minimum fee each transaction in a group must account for. Fees are
/// pooled, so one member may pay another's share.
pub const MIN_TXN_FEE: u64 = 1_000;

/// Most transactions an atomic group may contain.
pub const MAX_GROUP_SIZE: usize = 16;

/// Inner transactions one group may emit in total.
pub const MAX_INNER_TXNS: u32 = 256;

/// Deepest chain of applications calling applications.
pub const MAX_INNER_CALL_DEPTH: usize = 8;

/// Most arguments an application call may carry.
pub const MAX_APP_ARGS: usize = 16;

/// Most entries in an application call's account list.
pub const MAX_TX_ACCOUNTS: usize = 4;

/// Cap on accounts, foreign apps and foreign assets combined.
pub const MAX_REFERENCES: usize = 8;

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error("atomic group is empty")]
  EmptyGroup,

  #[error(
    "atomic group of {0} transactions exceeds the maximum of \
     {MAX_GROUP_SIZE}"
  )]
  GroupSizeExceeded(usize),

  #[error(
    "group fees of {collected} microunits do not cover the required \
     {required}"
  )]
  FeesNotEnough { required: u64, collected: u64 },

  #[error(
    "transaction validity window ({first}, {last}) does not cover \
     round {round}"
  )]
  InvalidRound { first: u64, last: u64, round: u64 },

  #[error(
    "application call carries {count} {kind} references, the maximum \
     is {max}"
  )]
  TooManyReferences {
    kind: &'static str,
    count: usize,
    max: usize,
  },

  #[error(
    "application create or update transaction is missing programs or \
     schemas"
  )]
  MissingAppFields,

  #[error("application {0} cannot call itself")]
  SelfCall(AppId),

  #[error(
    "application calls exceed the nesting depth of \
     {MAX_INNER_CALL_DEPTH}"
  )]
  CallDepthExceeded,
}

/// Confirmation metadata for one applied transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
  pub txid: String,

  /// Assigned id when the transaction created an asset.
  pub asset_id: Option<AssetId>,

  /// Assigned id when the transaction created an application.
  pub app_id: Option<AppId>,

  /// Interpreter cost consumed by the transaction's program run.
  pub cost: u64,
}

/// Working state of one atomic group evaluation.
///
/// Holds a private copy of the ledger; the caller swaps it in only
/// when the whole group succeeded, which is what makes the group
/// atomic. Everything the interpreter needs to read or mutate during
/// a program run lives here.
pub struct EvalContext {
  pub ledger: Ledger,
  pub group: Vec<SignedTransaction>,
  pub current: usize,
  pub round: u64,
  pub timestamp: u64,

  /// Pooled cost budget of all application calls in the group.
  pub app_budget: u64,
  pub pooled_app_cost: u64,

  /// Fee paid beyond the group's required minimum, spendable by
  /// inner transactions.
  pub fee_credit: u64,
  pub remaining_inner_txns: u32,

  /// Applications currently executing, outermost first. Guards
  /// against self-calls and unbounded call chains.
  pub app_call_stack: Vec<AppId>,
}

impl EvalContext {
  /// The id of the application whose program is currently running,
  /// or zero outside of application calls.
  pub fn current_app(&self) -> AppId {
    self.app_call_stack.last().copied().unwrap_or(0)
  }
}

/// Applies an atomic group against a snapshot of `ledger` and returns
/// the successor ledger together with per-transaction receipts.
///
/// On any error the working copy is dropped and the caller's ledger
/// is untouched; no partial group effect is ever observable.
pub fn execute_group(
  ledger: &Ledger,
  group: &[SignedTransaction],
  round: u64,
  timestamp: u64,
) -> Result<(Ledger, Vec<Receipt>), RuntimeError> {
  if group.is_empty() {
    return Err(Error::EmptyGroup.into());
  }
  if group.len() > MAX_GROUP_SIZE {
    return Err(Error::GroupSizeExceeded(group.len()).into());
  }

  for stxn in group {
    let txn = &stxn.txn;
    if txn.first_valid >= round || txn.last_valid <= round {
      return Err(
        Error::InvalidRound {
          first: txn.first_valid,
          last: txn.last_valid,
          round,
        }
        .into(),
      );
    }
  }

  let required = MIN_TXN_FEE * group.len() as u64;
  let collected: u64 = group.iter().map(|stxn| stxn.txn.fee).sum();
  if collected < required {
    return Err(
      Error::FeesNotEnough {
        required,
        collected,
      }
      .into(),
    );
  }

  let app_calls = group
    .iter()
    .filter(|stxn| {
      matches!(stxn.txn.kind, TransactionKind::AppCall { .. })
    })
    .count() as u64;

  let mut ctx = EvalContext {
    ledger: ledger.clone(),
    group: group.to_vec(),
    current: 0,
    round,
    timestamp,
    app_budget: MAX_APP_PROGRAM_COST * app_calls,
    pooled_app_cost: 0,
    fee_credit: collected - required,
    remaining_inner_txns: MAX_INNER_TXNS,
    app_call_stack: vec![],
  };

  debug!(size = group.len(), round, "applying atomic group");

  let mut receipts = Vec::with_capacity(group.len());
  for index in 0..ctx.group.len() {
    ctx.current = index;
    if let Err(e) = authorize(&mut ctx) {
      debug!(index, error = %e, "group rolled back");
      return Err(e);
    }
    match apply_transaction(&mut ctx) {
      Ok(receipt) => receipts.push(receipt),
      Err(e) => {
        debug!(index, error = %e, "group rolled back");
        return Err(e);
      }
    }
  }

  debug!(size = receipts.len(), "group committed");
  Ok((ctx.ledger, receipts))
}

/// Checks the authorization of the current transaction: secret-key
/// signatures are trusted, logic signatures are verified and their
/// program executed in signature mode.
fn authorize(ctx: &mut EvalContext) -> Result<(), RuntimeError> {
  match ctx.group[ctx.current].sig.clone() {
    TxnSignature::Sig => Ok(()),
    TxnSignature::Lsig(lsig) => lsig::verify_and_run(ctx, &lsig),
  }
}

/// Applies the current transaction of the context. Fee deduction
/// happens first; the kind dispatch below is exhaustive over the
/// closed transaction union.
pub(crate) fn apply_transaction(
  ctx: &mut EvalContext,
) -> Result<Receipt, RuntimeError> {
  let stxn = ctx.group[ctx.current].clone();
  let sender = stxn.txn.sender;
  let mut receipt = Receipt {
    txid: stxn.id().to_b58(),
    asset_id: None,
    app_id: None,
    cost: 0,
  };

  trace!(txid = %receipt.txid, "applying transaction");
  ctx.ledger.withdraw(&sender, stxn.txn.fee)?;

  match stxn.txn.kind {
    TransactionKind::Payment {
      receiver,
      amount,
      close_remainder_to,
    } => {
      ctx.ledger.transfer(&sender, receiver, amount)?;
      if let Some(close_to) = close_remainder_to {
        ctx.ledger.close_account(&sender, close_to)?;
      }
    }

    TransactionKind::AssetTransfer {
      asset,
      receiver,
      amount,
      close_to,
    } => {
      ctx
        .ledger
        .transfer_asset(asset, &sender, &receiver, amount, close_to, false)?;
    }

    TransactionKind::AssetOptIn { asset } => {
      ctx.ledger.opt_in_asset(&sender, asset)?;
    }

    TransactionKind::AssetCreate { params } => {
      receipt.asset_id = Some(ctx.ledger.create_asset(&sender, params)?);
    }

    TransactionKind::AssetConfig { asset, fields } => {
      ctx.ledger.config_asset(asset, &sender, fields)?;
    }

    TransactionKind::AssetFreeze {
      asset,
      target,
      frozen,
    } => {
      ctx.ledger.freeze_asset(asset, &sender, &target, frozen)?;
    }

    TransactionKind::AssetRevoke {
      asset,
      revoke_from,
      receiver,
      amount,
      close_to,
    } => {
      ctx.ledger.revoke_asset(
        asset,
        &sender,
        &revoke_from,
        &receiver,
        amount,
        close_to,
      )?;
    }

    TransactionKind::AssetDestroy { asset } => {
      ctx.ledger.destroy_asset(asset, &sender)?;
    }

    TransactionKind::AppCall {
      app,
      on_complete,
      args,
      accounts,
      foreign_apps,
      foreign_assets,
      approval_program,
      clear_program,
      global_schema,
      local_schema,
    } => {
      assert_reference_bounds(&args, &accounts, &foreign_apps, &foreign_assets)?;
      let (created, cost) = apply_app_call(
        ctx,
        sender,
        app,
        on_complete,
        approval_program,
        clear_program,
        global_schema,
        local_schema,
      )?;
      receipt.app_id = created;
      receipt.cost = cost;
    }
  }

  Ok(receipt)
}

fn assert_reference_bounds(
  args: &[Vec<u8>],
  accounts: &[Address],
  foreign_apps: &[AppId],
  foreign_assets: &[AssetId],
) -> Result<(), Error> {
  if args.len() > MAX_APP_ARGS {
    return Err(Error::TooManyReferences {
      kind: "argument",
      count: args.len(),
      max: MAX_APP_ARGS,
    });
  }
  if accounts.len() > MAX_TX_ACCOUNTS {
    return Err(Error::TooManyReferences {
      kind: "account",
      count: accounts.len(),
      max: MAX_TX_ACCOUNTS,
    });
  }
  let combined = accounts.len() + foreign_apps.len() + foreign_assets.len();
  if combined > MAX_REFERENCES {
    return Err(Error::TooManyReferences {
      kind: "combined",
      count: combined,
      max: MAX_REFERENCES,
    });
  }
  Ok(())
}

/// Dispatches one application call per its on-completion action.
/// Returns the created app id (for creation calls) and the cost the
/// program run consumed.
#[allow(clippy::too_many_arguments)]
fn apply_app_call(
  ctx: &mut EvalContext,
  sender: Address,
  app: AppId,
  on_complete: OnComplete,
  approval_program: Option<Vec<u8>>,
  clear_program: Option<Vec<u8>>,
  global_schema: Option<StateSchema>,
  local_schema: Option<StateSchema>,
) -> Result<(Option<AppId>, u64), RuntimeError> {
  if app == 0 {
    // creation: allocate the id and grow the creator's minimum
    // balance before the approval program runs
    let approval = approval_program.ok_or(Error::MissingAppFields)?;
    let clear = clear_program.ok_or(Error::MissingAppFields)?;
    let id = ctx.ledger.create_app(
      &sender,
      approval.clone(),
      clear,
      global_schema.ok_or(Error::MissingAppFields)?,
      local_schema.ok_or(Error::MissingAppFields)?,
    )?;
    let cost = run_app(ctx, id, &approval)?;
    return Ok((Some(id), cost));
  }

  if on_complete == OnComplete::ClearState {
    // force clear: local state goes away no matter what the clear
    // program says, a failing clear program leaves no partial state
    // writes behind, and clearing still works after the app itself
    // was deleted
    let clear = ctx
      .ledger
      .app_params(app)
      .ok()
      .map(|params| params.clear_program.clone());
    let mut cost = 0;
    if let Some(program) = clear {
      let snapshot = ctx.ledger.clone();
      match run_app(ctx, app, &program) {
        Ok(consumed) => cost = consumed,
        Err(e) => {
          trace!(error = %e, "clear program failed, clearing anyway");
          ctx.ledger = snapshot;
        }
      }
    }
    ctx.ledger.close_out_app(&sender, app)?;
    return Ok((None, cost));
  }

  let params = ctx.ledger.app_params(app)?.clone();
  let cost = match on_complete {
    OnComplete::NoOp | OnComplete::ClearState => {
      run_app(ctx, app, &params.approval_program)?
    }

    OnComplete::OptIn => {
      ctx.ledger.opt_in_app(&sender, app)?;
      run_app(ctx, app, &params.approval_program)?
    }

    OnComplete::CloseOut => {
      let cost = run_app(ctx, app, &params.approval_program)?;
      ctx.ledger.close_out_app(&sender, app)?;
      cost
    }

    OnComplete::Update => {
      let approval = approval_program.ok_or(Error::MissingAppFields)?;
      let clear = clear_program.ok_or(Error::MissingAppFields)?;
      let cost = run_app(ctx, app, &params.approval_program)?;
      ctx.ledger.update_app(app, approval, clear)?;
      cost
    }

    OnComplete::Delete => {
      let cost = run_app(ctx, app, &params.approval_program)?;
      ctx.ledger.delete_app(app)?;
      cost
    }
  };

  Ok((None, cost))
}

/// Parses and runs one application program with the call stack
/// bookkeeping shared by top-level and inner calls. Each inner
/// application call extends the pooled budget by one program's worth.
fn run_app(
  ctx: &mut EvalContext,
  app: AppId,
  program: &[u8],
) -> Result<u64, RuntimeError> {
  if ctx.app_call_stack.contains(&app) {
    return Err(Error::SelfCall(app).into());
  }
  if ctx.app_call_stack.len() >= MAX_INNER_CALL_DEPTH {
    return Err(Error::CallDepthExceeded.into());
  }
  if !ctx.app_call_stack.is_empty() {
    ctx.app_budget += MAX_APP_PROGRAM_COST;
  }

  let program = Program::parse(program)?;
  ctx.app_call_stack.push(app);
  let result =
    interpreter::run(ctx, &program, ExecutionMode::Application, &[]);
  ctx.app_call_stack.pop();
  Ok(result?)
}

/// Applies an inner transaction emitted by a running program. The
/// inner transaction forms its own single-member group so that group
/// introspection opcodes see it in isolation, and it shares the
/// atomic fate of the outer group.
pub(crate) fn apply_inner(
  ctx: &mut EvalContext,
  stxn: SignedTransaction,
) -> Result<(), RuntimeError> {
  let saved_group = std::mem::replace(&mut ctx.group, vec![stxn]);
  let saved_current = ctx.current;
  ctx.current = 0;

  let result = apply_transaction(ctx);

  ctx.group = saved_group;
  ctx.current = saved_current;
  result.map(|_| ())
}
