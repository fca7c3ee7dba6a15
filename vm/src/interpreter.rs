use {
  crate::{
    bytecode::{
      self,
      GlobalField,
      HoldingField,
      Instr,
      ParamsField,
      Program,
      TxnField,
      MAX_PROGRAM_VERSION,
    },
    cost::{
      instr_cost,
      static_cost,
      VersionPolicy,
      LOGIC_SIG_MAX_COST,
    },
    errors::RuntimeError,
    itxn::{self, PendingInnerTxn},
    ledger,
    processor::{self, EvalContext, MIN_TXN_FEE},
  },
  ed25519_dalek::{PublicKey, Signature, Verifier},
  kiln_primitives::{
    Address,
    AppId,
    OnComplete,
    SignedTransaction,
    TealValue,
    TransactionKind,
    TxnSignature,
    MAX_TEAL_VALUE_LEN,
  },
  multihash::{Hasher, Keccak256, Sha2_256},
  sha2::{Digest, Sha512_256},
  thiserror::Error,
};

/// Deepest the operand stack may grow.
pub const MAX_STACK_DEPTH: usize = 1000;

/// Number of scratch slots available to a program.
pub const SCRATCH_SIZE: usize = 256;

/// Execution mode of a program run. Signature mode is the stricter
/// one used for logic signatures: no state access, no inner
/// transactions and a smaller, static cost budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
  Signature,
  Application,
}

impl ExecutionMode {
  fn name(&self) -> &'static str {
    match self {
      ExecutionMode::Signature => "signature",
      ExecutionMode::Application => "application",
    }
  }
}

#[derive(Debug, Clone, Error)]
pub enum Error {
  #[error(transparent)]
  Compile(#[from] bytecode::Error),

  #[error(transparent)]
  State(#[from] ledger::Error),

  #[error(transparent)]
  InnerField(#[from] itxn::Error),

  #[error("inner transaction failed: {0}")]
  Inner(#[source] Box<RuntimeError>),

  #[error("stack underflow at instruction {0}")]
  StackUnderflow(usize),

  #[error("stack overflow at instruction {0}")]
  StackOverflow(usize),

  #[error(
    "type mismatch at instruction {pc}: expected {expected}, got {got}"
  )]
  TypeMismatch {
    pc: usize,
    expected: &'static str,
    got: &'static str,
  },

  #[error("integer overflow at instruction {0}")]
  Overflow(usize),

  #[error("integer underflow at instruction {0}")]
  Underflow(usize),

  #[error("division by zero at instruction {0}")]
  DivByZero(usize),

  #[error("index out of bound at instruction {0}")]
  IndexOutOfBound(usize),

  #[error(
    "byte value of {len} bytes exceeds the {MAX_TEAL_VALUE_LEN} byte \
     bound at instruction {pc}"
  )]
  ValueTooLong { pc: usize, len: usize },

  #[error("btoi input of {len} bytes is longer than 8 at instruction {pc}")]
  BtoiTooLong { pc: usize, len: usize },

  #[error("substring range is invalid at instruction {0}")]
  SubstringRange(usize),

  #[error("cost {cost} exceeds the budget {budget} of {mode} mode")]
  CostExceeded {
    cost: u64,
    budget: u64,
    mode: &'static str,
  },

  #[error("err opcode encountered at instruction {0}")]
  ErrEncountered(usize),

  #[error("assert failed at instruction {0}")]
  AssertFailed(usize),

  #[error("rejected by logic")]
  RejectedByLogic,

  #[error("retsub with an empty call stack at instruction {0}")]
  CallStackUnderflow(usize),

  #[error("{op} is not allowed in signature mode")]
  ForbiddenInSignatureMode { op: &'static str },

  #[error("{op} is only allowed in signature mode")]
  OnlyInSignatureMode { op: &'static str },

  #[error(
    "account referenced at instruction {0} is not the sender, an \
     application account or part of the transaction's account list"
  )]
  AccountNotReferenced(usize),

  #[error("inner transactions exceed the group allowance")]
  TooManyInnerTxns,

  #[error("{op} without a pending inner transaction at instruction {pc}")]
  NoPendingInnerTxn { pc: usize, op: &'static str },

  #[error("itxn_begin while an inner transaction is already pending")]
  InnerTxnAlreadyPending,

  #[error("group fees of {collected} do not cover the required {required}")]
  InnerFeeNotCovered { required: u64, collected: u64 },
}

/// Executes a decoded program against an evaluation context and
/// returns the cost it consumed. A program accepts by finishing with
/// exactly one nonzero uint on the stack; every other outcome is an
/// error.
pub fn run(
  ctx: &mut EvalContext,
  program: &Program,
  mode: ExecutionMode,
  args: &[Vec<u8>],
) -> Result<u64, Error> {
  let policy = VersionPolicy::for_version(program.version);

  // versions below 4 charge the whole program before running it
  if !policy.dynamic_cost {
    let total = static_cost(&program.instrs, program.version);
    charge(ctx, mode, total)?;
  }

  let mut interpreter = Interpreter {
    ctx,
    program,
    policy,
    mode,
    args,
    stack: Vec::new(),
    scratch: vec![TealValue::Uint(0); SCRATCH_SIZE],
    call_stack: Vec::new(),
    pending_itxn: None,
    pc: 0,
    cost: 0,
  };
  interpreter.exec_all()?;

  let accepted = interpreter.stack.len() == 1
    && matches!(interpreter.stack[0], TealValue::Uint(v) if v > 0);
  if !accepted {
    return Err(Error::RejectedByLogic);
  }
  Ok(interpreter.cost)
}

/// Adds cost to the right budget for the mode and fails when the
/// budget is exhausted. Application cost is pooled across the whole
/// group; signature cost is per program.
fn charge(
  ctx: &mut EvalContext,
  mode: ExecutionMode,
  amount: u64,
) -> Result<u64, Error> {
  match mode {
    ExecutionMode::Signature => {
      if amount > LOGIC_SIG_MAX_COST {
        return Err(Error::CostExceeded {
          cost: amount,
          budget: LOGIC_SIG_MAX_COST,
          mode: mode.name(),
        });
      }
      Ok(amount)
    }
    ExecutionMode::Application => {
      ctx.pooled_app_cost += amount;
      if ctx.pooled_app_cost > ctx.app_budget {
        return Err(Error::CostExceeded {
          cost: ctx.pooled_app_cost,
          budget: ctx.app_budget,
          mode: mode.name(),
        });
      }
      Ok(ctx.pooled_app_cost)
    }
  }
}

struct Interpreter<'a> {
  ctx: &'a mut EvalContext,
  program: &'a Program,
  policy: VersionPolicy,
  mode: ExecutionMode,
  args: &'a [Vec<u8>],
  stack: Vec<TealValue>,
  scratch: Vec<TealValue>,
  call_stack: Vec<usize>,
  pending_itxn: Option<PendingInnerTxn>,
  pc: usize,
  cost: u64,
}

impl<'a> Interpreter<'a> {
  fn exec_all(&mut self) -> Result<(), Error> {
    while self.pc < self.program.instrs.len() {
      let instr = self.program.instrs[self.pc].clone();

      if self.mode == ExecutionMode::Signature
        && instr.is_application_only()
      {
        return Err(Error::ForbiddenInSignatureMode { op: instr.name() });
      }

      let step = instr_cost(&instr, self.policy.version);
      self.cost += step;
      if self.policy.dynamic_cost {
        if self.mode == ExecutionMode::Signature
          && self.cost > LOGIC_SIG_MAX_COST
        {
          return Err(Error::CostExceeded {
            cost: self.cost,
            budget: LOGIC_SIG_MAX_COST,
            mode: self.mode.name(),
          });
        }
        if self.mode == ExecutionMode::Application {
          charge(self.ctx, self.mode, step)?;
        }
      }

      match self.exec_instr(&instr)? {
        Some(target) => self.pc = target,
        None => self.pc += 1,
      }
    }
    Ok(())
  }

  /// Executes one instruction. Returns the jump target for control
  /// flow instructions, `None` to fall through to the next one.
  fn exec_instr(&mut self, instr: &Instr) -> Result<Option<usize>, Error> {
    match instr {
      Instr::Err => return Err(Error::ErrEncountered(self.pc)),

      Instr::Sha256 => {
        let data = self.pop_bytes()?;
        let mut hasher = Sha2_256::default();
        hasher.update(&data);
        self.push(TealValue::Bytes(hasher.finalize().to_vec()))?;
      }
      Instr::Keccak256 => {
        let data = self.pop_bytes()?;
        let mut hasher = Keccak256::default();
        hasher.update(&data);
        self.push(TealValue::Bytes(hasher.finalize().to_vec()))?;
      }
      Instr::Sha512_256 => {
        let data = self.pop_bytes()?;
        self.push(TealValue::Bytes(Sha512_256::digest(&data).to_vec()))?;
      }
      Instr::Ed25519Verify => {
        let pubkey = self.pop_bytes()?;
        let sig = self.pop_bytes()?;
        let data = self.pop_bytes()?;
        let valid = match (
          PublicKey::from_bytes(&pubkey),
          Signature::try_from(sig.as_slice()),
        ) {
          (Ok(pubkey), Ok(sig)) => pubkey.verify(&data, &sig).is_ok(),
          _ => false,
        };
        self.push(TealValue::from(valid))?;
      }

      Instr::Add => self.binop(|a, b| a.checked_add(b), u64::wrapping_add,
        Error::Overflow(self.pc))?,
      Instr::Sub => self.binop(|a, b| a.checked_sub(b), u64::wrapping_sub,
        Error::Underflow(self.pc))?,
      Instr::Mul => self.binop(|a, b| a.checked_mul(b), u64::wrapping_mul,
        Error::Overflow(self.pc))?,
      Instr::Div => {
        let b = self.pop_uint()?;
        let a = self.pop_uint()?;
        if b == 0 {
          return Err(Error::DivByZero(self.pc));
        }
        self.push(TealValue::Uint(a / b))?;
      }
      Instr::Mod => {
        let b = self.pop_uint()?;
        let a = self.pop_uint()?;
        if b == 0 {
          return Err(Error::DivByZero(self.pc));
        }
        self.push(TealValue::Uint(a % b))?;
      }

      Instr::Lt => self.cmp(|a, b| a < b)?,
      Instr::Gt => self.cmp(|a, b| a > b)?,
      Instr::Le => self.cmp(|a, b| a <= b)?,
      Instr::Ge => self.cmp(|a, b| a >= b)?,
      Instr::And => self.cmp(|a, b| a != 0 && b != 0)?,
      Instr::Or => self.cmp(|a, b| a != 0 || b != 0)?,

      Instr::Eq | Instr::Neq => {
        let b = self.pop()?;
        let a = self.pop()?;
        let equal = match (&a, &b) {
          (TealValue::Uint(_), TealValue::Uint(_))
          | (TealValue::Bytes(_), TealValue::Bytes(_)) => a == b,
          _ => {
            return Err(Error::TypeMismatch {
              pc: self.pc,
              expected: a.type_name(),
              got: b.type_name(),
            })
          }
        };
        let result = if matches!(instr, Instr::Eq) { equal } else { !equal };
        self.push(TealValue::from(result))?;
      }

      Instr::Not => {
        let a = self.pop_uint()?;
        self.push(TealValue::from(a == 0))?;
      }
      Instr::Len => {
        let bytes = self.pop_bytes()?;
        self.push(TealValue::Uint(bytes.len() as u64))?;
      }
      Instr::Itob => {
        let a = self.pop_uint()?;
        self.push(TealValue::Bytes(a.to_be_bytes().to_vec()))?;
      }
      Instr::Btoi => {
        let bytes = self.pop_bytes()?;
        if bytes.len() > 8 {
          return Err(Error::BtoiTooLong {
            pc: self.pc,
            len: bytes.len(),
          });
        }
        let mut value = 0u64;
        for byte in bytes {
          value = value << 8 | byte as u64;
        }
        self.push(TealValue::Uint(value))?;
      }

      Instr::BitOr => self.bitop(|a, b| a | b)?,
      Instr::BitAnd => self.bitop(|a, b| a & b)?,
      Instr::BitXor => self.bitop(|a, b| a ^ b)?,
      Instr::BitNot => {
        let a = self.pop_uint()?;
        self.push(TealValue::Uint(!a))?;
      }

      Instr::Mulw => {
        let b = self.pop_uint()? as u128;
        let a = self.pop_uint()? as u128;
        let wide = a * b;
        self.push(TealValue::Uint((wide >> 64) as u64))?;
        self.push(TealValue::Uint(wide as u64))?;
      }
      Instr::Addw => {
        let b = self.pop_uint()? as u128;
        let a = self.pop_uint()? as u128;
        let wide = a + b;
        self.push(TealValue::Uint((wide >> 64) as u64))?;
        self.push(TealValue::Uint(wide as u64))?;
      }

      Instr::PushInt(value) => self.push(TealValue::Uint(*value))?,
      Instr::PushBytes(bytes) => {
        self.push(TealValue::Bytes(bytes.clone()))?
      }

      Instr::Arg(index) => {
        if self.mode != ExecutionMode::Signature {
          return Err(Error::OnlyInSignatureMode { op: "arg" });
        }
        let arg = self
          .args
          .get(*index as usize)
          .ok_or(Error::IndexOutOfBound(self.pc))?;
        self.push(TealValue::Bytes(arg.clone()))?;
      }

      Instr::Txn(field) => {
        let value = self.txn_field(self.ctx.current, *field, None)?;
        self.push(value)?;
      }
      Instr::Txna(field, index) => {
        let value =
          self.txn_field(self.ctx.current, *field, Some(*index))?;
        self.push(value)?;
      }
      Instr::Gtxn(group_index, field) => {
        let value = self.group_txn_field(*group_index, *field, None)?;
        self.push(value)?;
      }
      Instr::Gtxna(group_index, field, index) => {
        let value =
          self.group_txn_field(*group_index, *field, Some(*index))?;
        self.push(value)?;
      }
      Instr::Global(field) => {
        let value = self.global_field(*field)?;
        self.push(value)?;
      }

      Instr::Load(slot) => {
        self.push(self.scratch[*slot as usize].clone())?;
      }
      Instr::Store(slot) => {
        let value = self.pop()?;
        self.scratch[*slot as usize] = value;
      }

      Instr::Bnz(target) => {
        if self.pop_uint()? != 0 {
          return Ok(Some(*target));
        }
      }
      Instr::Bz(target) => {
        if self.pop_uint()? == 0 {
          return Ok(Some(*target));
        }
      }
      Instr::B(target) => return Ok(Some(*target)),

      Instr::Callsub(target) => {
        self.call_stack.push(self.pc + 1);
        return Ok(Some(*target));
      }
      Instr::Retsub => {
        let target = self
          .call_stack
          .pop()
          .ok_or(Error::CallStackUnderflow(self.pc))?;
        return Ok(Some(target));
      }

      Instr::Return => {
        let value = self.pop()?;
        self.stack.clear();
        self.stack.push(value);
        return Ok(Some(self.program.instrs.len()));
      }
      Instr::Assert => {
        if self.pop_uint()? == 0 {
          return Err(Error::AssertFailed(self.pc));
        }
      }

      Instr::Pop => {
        self.pop()?;
      }
      Instr::Dup => {
        let value = self.peek()?.clone();
        self.push(value)?;
      }
      Instr::Dup2 => {
        if self.stack.len() < 2 {
          return Err(Error::StackUnderflow(self.pc));
        }
        let b = self.stack[self.stack.len() - 1].clone();
        let a = self.stack[self.stack.len() - 2].clone();
        self.push(a)?;
        self.push(b)?;
      }
      Instr::Swap => {
        let b = self.pop()?;
        let a = self.pop()?;
        self.push(b)?;
        self.push(a)?;
      }

      Instr::Concat => {
        let b = self.pop_bytes()?;
        let mut a = self.pop_bytes()?;
        a.extend_from_slice(&b);
        if a.len() > MAX_TEAL_VALUE_LEN {
          return Err(Error::ValueTooLong {
            pc: self.pc,
            len: a.len(),
          });
        }
        self.push(TealValue::Bytes(a))?;
      }
      Instr::Substring(start, end) => {
        let bytes = self.pop_bytes()?;
        let value = substring(&bytes, *start as u64, *end as u64)
          .ok_or(Error::SubstringRange(self.pc))?;
        self.push(TealValue::Bytes(value))?;
      }
      Instr::Substring3 => {
        let end = self.pop_uint()?;
        let start = self.pop_uint()?;
        let bytes = self.pop_bytes()?;
        let value = substring(&bytes, start, end)
          .ok_or(Error::SubstringRange(self.pc))?;
        self.push(TealValue::Bytes(value))?;
      }

      Instr::Balance => {
        let address = self.pop_account()?;
        let balance = self.ctx.ledger.balance(&address)?;
        self.push(TealValue::Uint(balance))?;
      }
      Instr::MinBalance => {
        let address = self.pop_account()?;
        let min = self.ctx.ledger.min_balance(&address)?;
        self.push(TealValue::Uint(min))?;
      }

      Instr::AppOptedIn => {
        let app = self.pop_app_id()?;
        let address = self.pop_account()?;
        let opted = self.ctx.ledger.account(&address)?.opted_in(app);
        self.push(TealValue::from(opted))?;
      }
      Instr::AppLocalGet => {
        let key = self.pop_bytes()?;
        let address = self.pop_account()?;
        let app = self.ctx.current_app();
        let value = self
          .ctx
          .ledger
          .local_state(app, &address, &key)?
          .cloned()
          .unwrap_or(TealValue::Uint(0));
        self.push(value)?;
      }
      Instr::AppLocalPut => {
        let value = self.pop()?;
        let key = self.pop_bytes()?;
        let address = self.pop_account()?;
        let app = self.ctx.current_app();
        self.ctx.ledger.set_local_state(app, &address, key, value)?;
      }
      Instr::AppLocalDel => {
        let key = self.pop_bytes()?;
        let address = self.pop_account()?;
        let app = self.ctx.current_app();
        self.ctx.ledger.del_local_state(app, &address, &key)?;
      }
      Instr::AppGlobalGet => {
        let key = self.pop_bytes()?;
        let app = self.ctx.current_app();
        let value = self
          .ctx
          .ledger
          .global_state(app, &key)?
          .cloned()
          .unwrap_or(TealValue::Uint(0));
        self.push(value)?;
      }
      Instr::AppGlobalPut => {
        let value = self.pop()?;
        let key = self.pop_bytes()?;
        let app = self.ctx.current_app();
        self.ctx.ledger.set_global_state(app, key, value)?;
      }
      Instr::AppGlobalDel => {
        let key = self.pop_bytes()?;
        let app = self.ctx.current_app();
        self.ctx.ledger.del_global_state(app, &key)?;
      }

      Instr::AssetHoldingGet(field) => {
        let asset = self.pop_uint()?;
        let address = self.pop_account()?;
        match self.ctx.ledger.holding(&address, asset).ok().cloned() {
          Some(holding) => {
            let value = match field {
              HoldingField::Balance => TealValue::Uint(holding.amount),
              HoldingField::Frozen => TealValue::from(holding.frozen),
            };
            self.push(value)?;
            self.push(TealValue::Uint(1))?;
          }
          None => {
            self.push(TealValue::Uint(0))?;
            self.push(TealValue::Uint(0))?;
          }
        }
      }
      Instr::AssetParamsGet(field) => {
        let asset = self.pop_uint()?;
        match self.ctx.ledger.asset_params(asset).ok().cloned() {
          Some(params) => {
            let value = match field {
              ParamsField::Total => TealValue::Uint(params.total),
              ParamsField::Decimals => {
                TealValue::Uint(params.decimals as u64)
              }
              ParamsField::DefaultFrozen => {
                TealValue::from(params.default_frozen)
              }
              ParamsField::UnitName => {
                TealValue::Bytes(params.unit_name.clone().into_bytes())
              }
              ParamsField::Name => {
                TealValue::Bytes(params.asset_name.clone().into_bytes())
              }
              ParamsField::Url => {
                TealValue::Bytes(params.url.clone().into_bytes())
              }
              ParamsField::MetadataHash => {
                TealValue::Bytes(params.metadata_hash.clone())
              }
              ParamsField::Manager => address_value(params.manager),
              ParamsField::Reserve => address_value(params.reserve),
              ParamsField::Freeze => address_value(params.freeze),
              ParamsField::Clawback => address_value(params.clawback),
              ParamsField::Creator => {
                TealValue::Bytes(params.creator.to_bytes().to_vec())
              }
            };
            self.push(value)?;
            self.push(TealValue::Uint(1))?;
          }
          None => {
            self.push(TealValue::Uint(0))?;
            self.push(TealValue::Uint(0))?;
          }
        }
      }

      Instr::ItxnBegin => {
        if self.pending_itxn.is_some() {
          return Err(Error::InnerTxnAlreadyPending);
        }
        self.pending_itxn = Some(PendingInnerTxn::default());
      }
      Instr::ItxnField(field) => {
        let value = self.pop()?;
        let pc = self.pc;
        let pending =
          self
            .pending_itxn
            .as_mut()
            .ok_or(Error::NoPendingInnerTxn {
              pc,
              op: "itxn_field",
            })?;
        pending.set(*field, value)?;
      }
      Instr::ItxnSubmit => {
        let pending =
          self
            .pending_itxn
            .take()
            .ok_or(Error::NoPendingInnerTxn {
              pc: self.pc,
              op: "itxn_submit",
            })?;
        self.submit_inner(pending)?;
      }
    }
    Ok(None)
  }

  fn submit_inner(&mut self, pending: PendingInnerTxn) -> Result<(), Error> {
    if self.ctx.remaining_inner_txns == 0 {
      return Err(Error::TooManyInnerTxns);
    }
    self.ctx.remaining_inner_txns -= 1;

    // inner fees draw on the group's pooled fee credit; an explicit
    // fee set by the program adds to it.
    let fee = pending.fee();
    if fee < MIN_TXN_FEE {
      let needed = MIN_TXN_FEE - fee;
      if self.ctx.fee_credit < needed {
        return Err(Error::InnerFeeNotCovered {
          required: needed,
          collected: self.ctx.fee_credit,
        });
      }
      self.ctx.fee_credit -= needed;
    } else {
      self.ctx.fee_credit += fee - MIN_TXN_FEE;
    }

    let sender = Address::for_app(self.ctx.current_app());
    let txn = pending.build(sender, self.ctx.round + 1000)?;
    let stxn = SignedTransaction::new(txn, TxnSignature::Sig);

    processor::apply_inner(self.ctx, stxn)
      .map_err(|e| Error::Inner(Box::new(e)))?;
    Ok(())
  }

  //
  // transaction and global fields
  //

  fn group_txn_field(
    &self,
    group_index: u8,
    field: TxnField,
    array_index: Option<u8>,
  ) -> Result<TealValue, Error> {
    let index = group_index as usize;
    if index >= self.ctx.group.len() {
      return Err(Error::IndexOutOfBound(self.pc));
    }
    self.txn_field(index, field, array_index)
  }

  fn txn_field(
    &self,
    index: usize,
    field: TxnField,
    array_index: Option<u8>,
  ) -> Result<TealValue, Error> {
    let stxn = self
      .ctx
      .group
      .get(index)
      .ok_or(Error::IndexOutOfBound(self.pc))?;
    let txn = &stxn.txn;

    let zero_address = || TealValue::Bytes(vec![0u8; 32]);
    let value = match field {
      TxnField::Sender => TealValue::Bytes(txn.sender.to_bytes().to_vec()),
      TxnField::Fee => TealValue::Uint(txn.fee),
      TxnField::FirstValid => TealValue::Uint(txn.first_valid),
      TxnField::LastValid => TealValue::Uint(txn.last_valid),
      TxnField::Note => TealValue::Bytes(txn.note.clone()),
      TxnField::TypeEnum => TealValue::Uint(txn.kind.type_enum()),
      TxnField::GroupIndex => TealValue::Uint(index as u64),
      TxnField::TxId => TealValue::Bytes(stxn.id().digest().to_vec()),

      TxnField::Receiver => match &txn.kind {
        TransactionKind::Payment { receiver, .. } => {
          TealValue::Bytes(receiver.to_bytes().to_vec())
        }
        _ => zero_address(),
      },
      TxnField::Amount => match &txn.kind {
        TransactionKind::Payment { amount, .. } => TealValue::Uint(*amount),
        _ => TealValue::Uint(0),
      },
      TxnField::CloseRemainderTo => match &txn.kind {
        TransactionKind::Payment {
          close_remainder_to: Some(addr),
          ..
        } => TealValue::Bytes(addr.to_bytes().to_vec()),
        _ => zero_address(),
      },

      TxnField::XferAsset => match &txn.kind {
        TransactionKind::AssetTransfer { asset, .. }
        | TransactionKind::AssetOptIn { asset }
        | TransactionKind::AssetRevoke { asset, .. } => {
          TealValue::Uint(*asset)
        }
        _ => TealValue::Uint(0),
      },
      TxnField::AssetAmount => match &txn.kind {
        TransactionKind::AssetTransfer { amount, .. }
        | TransactionKind::AssetRevoke { amount, .. } => {
          TealValue::Uint(*amount)
        }
        _ => TealValue::Uint(0),
      },
      TxnField::AssetSender => match &txn.kind {
        TransactionKind::AssetRevoke { revoke_from, .. } => {
          TealValue::Bytes(revoke_from.to_bytes().to_vec())
        }
        _ => zero_address(),
      },
      TxnField::AssetReceiver => match &txn.kind {
        TransactionKind::AssetTransfer { receiver, .. }
        | TransactionKind::AssetRevoke { receiver, .. } => {
          TealValue::Bytes(receiver.to_bytes().to_vec())
        }
        _ => zero_address(),
      },
      TxnField::AssetCloseTo => match &txn.kind {
        TransactionKind::AssetTransfer {
          close_to: Some(addr),
          ..
        }
        | TransactionKind::AssetRevoke {
          close_to: Some(addr),
          ..
        } => TealValue::Bytes(addr.to_bytes().to_vec()),
        _ => zero_address(),
      },

      TxnField::ApplicationId => match &txn.kind {
        TransactionKind::AppCall { app, .. } => TealValue::Uint(*app),
        _ => TealValue::Uint(0),
      },
      TxnField::OnCompletion => match &txn.kind {
        TransactionKind::AppCall { on_complete, .. } => {
          TealValue::Uint(on_complete_code(*on_complete))
        }
        _ => TealValue::Uint(0),
      },
      TxnField::NumAppArgs => match &txn.kind {
        TransactionKind::AppCall { args, .. } => {
          TealValue::Uint(args.len() as u64)
        }
        _ => TealValue::Uint(0),
      },
      TxnField::NumAccounts => match &txn.kind {
        TransactionKind::AppCall { accounts, .. } => {
          TealValue::Uint(accounts.len() as u64)
        }
        _ => TealValue::Uint(0),
      },
      TxnField::ApprovalProgram => match &txn.kind {
        TransactionKind::AppCall {
          approval_program: Some(bytes),
          ..
        } => TealValue::Bytes(bytes.clone()),
        _ => TealValue::Bytes(vec![]),
      },
      TxnField::ClearStateProgram => match &txn.kind {
        TransactionKind::AppCall {
          clear_program: Some(bytes),
          ..
        } => TealValue::Bytes(bytes.clone()),
        _ => TealValue::Bytes(vec![]),
      },

      TxnField::ApplicationArgs => {
        let element = array_index.ok_or(Error::IndexOutOfBound(self.pc))?;
        match &txn.kind {
          TransactionKind::AppCall { args, .. } => args
            .get(element as usize)
            .map(|a| TealValue::Bytes(a.clone()))
            .ok_or(Error::IndexOutOfBound(self.pc))?,
          _ => return Err(Error::IndexOutOfBound(self.pc)),
        }
      }
      TxnField::Accounts => {
        let element = array_index.ok_or(Error::IndexOutOfBound(self.pc))?;
        match &txn.kind {
          TransactionKind::AppCall { accounts, .. } => accounts
            .get(element as usize)
            .map(|a| TealValue::Bytes(a.to_bytes().to_vec()))
            .ok_or(Error::IndexOutOfBound(self.pc))?,
          _ => return Err(Error::IndexOutOfBound(self.pc)),
        }
      }
    };
    Ok(value)
  }

  fn global_field(&self, field: GlobalField) -> Result<TealValue, Error> {
    Ok(match field {
      GlobalField::MinTxnFee => TealValue::Uint(MIN_TXN_FEE),
      GlobalField::MinBalance => {
        TealValue::Uint(ledger::ACCOUNT_MIN_BALANCE)
      }
      GlobalField::MaxTxnLife => TealValue::Uint(1000),
      GlobalField::ZeroAddress => TealValue::Bytes(vec![0u8; 32]),
      GlobalField::GroupSize => {
        TealValue::Uint(self.ctx.group.len() as u64)
      }
      GlobalField::LogicSigVersion => {
        TealValue::Uint(MAX_PROGRAM_VERSION as u64)
      }
      GlobalField::Round => TealValue::Uint(self.ctx.round),
      GlobalField::LatestTimestamp => TealValue::Uint(self.ctx.timestamp),
      GlobalField::CurrentApplicationId => {
        TealValue::Uint(self.ctx.current_app())
      }
      GlobalField::CreatorAddress => {
        let app = self.ctx.current_app();
        let creator = self.ctx.ledger.app_params(app)?.creator;
        TealValue::Bytes(creator.to_bytes().to_vec())
      }
      GlobalField::CurrentApplicationAddress => {
        let app = Address::for_app(self.ctx.current_app());
        TealValue::Bytes(app.to_bytes().to_vec())
      }
    })
  }

  //
  // operand helpers
  //

  fn push(&mut self, value: TealValue) -> Result<(), Error> {
    if self.stack.len() >= MAX_STACK_DEPTH {
      return Err(Error::StackOverflow(self.pc));
    }
    self.stack.push(value);
    Ok(())
  }

  fn pop(&mut self) -> Result<TealValue, Error> {
    self.stack.pop().ok_or(Error::StackUnderflow(self.pc))
  }

  fn peek(&self) -> Result<&TealValue, Error> {
    self.stack.last().ok_or(Error::StackUnderflow(self.pc))
  }

  fn pop_uint(&mut self) -> Result<u64, Error> {
    match self.pop()? {
      TealValue::Uint(v) => Ok(v),
      other => Err(Error::TypeMismatch {
        pc: self.pc,
        expected: "uint64",
        got: other.type_name(),
      }),
    }
  }

  fn pop_bytes(&mut self) -> Result<Vec<u8>, Error> {
    match self.pop()? {
      TealValue::Bytes(b) => Ok(b),
      other => Err(Error::TypeMismatch {
        pc: self.pc,
        expected: "byte[]",
        got: other.type_name(),
      }),
    }
  }

  /// Resolves an account reference from the stack: index 0 is the
  /// sender, higher indices point into the transaction's account
  /// list, and from version 4 an address may be passed directly as
  /// long as it is reachable from the transaction.
  fn pop_account(&mut self) -> Result<Address, Error> {
    let sender = self.current_txn().txn.sender;
    let accounts = match &self.current_txn().txn.kind {
      TransactionKind::AppCall { accounts, .. } => accounts.clone(),
      _ => vec![],
    };

    match self.pop()? {
      TealValue::Uint(0) => Ok(sender),
      TealValue::Uint(index) => accounts
        .get(index as usize - 1)
        .copied()
        .ok_or(Error::IndexOutOfBound(self.pc)),
      TealValue::Bytes(bytes) if self.policy.version >= 4 => {
        let address = Address::try_from(bytes.as_slice())
          .map_err(|_| Error::AccountNotReferenced(self.pc))?;
        let app_account = Address::for_app(self.ctx.current_app());
        if address == sender
          || address == app_account
          || accounts.contains(&address)
        {
          Ok(address)
        } else {
          Err(Error::AccountNotReferenced(self.pc))
        }
      }
      other => Err(Error::TypeMismatch {
        pc: self.pc,
        expected: "account reference",
        got: other.type_name(),
      }),
    }
  }

  /// Resolves an application reference: 0 means the currently
  /// executing application.
  fn pop_app_id(&mut self) -> Result<AppId, Error> {
    match self.pop_uint()? {
      0 => Ok(self.ctx.current_app()),
      id => Ok(id),
    }
  }

  fn current_txn(&self) -> &SignedTransaction {
    &self.ctx.group[self.ctx.current]
  }

  fn binop(
    &mut self,
    checked: impl Fn(u64, u64) -> Option<u64>,
    wrapping: impl Fn(u64, u64) -> u64,
    overflow: Error,
  ) -> Result<(), Error> {
    let b = self.pop_uint()?;
    let a = self.pop_uint()?;
    let value = match checked(a, b) {
      Some(v) => v,
      None if self.policy.checked_arithmetic => return Err(overflow),
      None => wrapping(a, b),
    };
    self.push(TealValue::Uint(value))
  }

  fn cmp(&mut self, op: impl Fn(u64, u64) -> bool) -> Result<(), Error> {
    let b = self.pop_uint()?;
    let a = self.pop_uint()?;
    self.push(TealValue::from(op(a, b)))
  }

  fn bitop(&mut self, op: impl Fn(u64, u64) -> u64) -> Result<(), Error> {
    let b = self.pop_uint()?;
    let a = self.pop_uint()?;
    self.push(TealValue::Uint(op(a, b)))
  }
}

fn substring(bytes: &[u8], start: u64, end: u64) -> Option<Vec<u8>> {
  if end < start || end > bytes.len() as u64 {
    return None;
  }
  Some(bytes[start as usize..end as usize].to_vec())
}

fn address_value(address: Option<Address>) -> TealValue {
  match address {
    Some(addr) => TealValue::Bytes(addr.to_bytes().to_vec()),
    None => TealValue::Bytes(vec![0u8; 32]),
  }
}

fn on_complete_code(on_complete: OnComplete) -> u64 {
  match on_complete {
    OnComplete::NoOp => 0,
    OnComplete::OptIn => 1,
    OnComplete::CloseOut => 2,
    OnComplete::ClearState => 3,
    OnComplete::Update => 4,
    OnComplete::Delete => 5,
  }
}
