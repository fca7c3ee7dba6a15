use {
  crate::{bytecode, interpreter, ledger, lsig, processor},
  thiserror::Error,
};

/// The five stable, numbered failure kinds surfaced at the
/// `execute_tx` boundary. Every internal error maps onto exactly one
/// of them, so callers can match on kinds without depending on
/// individual error variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
  /// Malformed or version-incompatible program; raised before any
  /// instruction executes.
  Compile,

  /// The program rejected the transaction, or failed in a way that
  /// programs can cause (err opcode, type confusion, arithmetic).
  Logic,

  /// A budget was exhausted: stack depth, cost, value length, group
  /// size, reference arrays.
  Resource,

  /// Referenced state is missing or in the wrong shape: unknown
  /// assets or apps, missing opt-ins, frozen holdings, balances.
  State,

  /// An authority or signature check failed.
  Authorization,
}

impl ErrorKind {
  /// Stable numeric code reported alongside errors.
  pub fn code(&self) -> u16 {
    match self {
      ErrorKind::Compile => 1,
      ErrorKind::Logic => 2,
      ErrorKind::Resource => 3,
      ErrorKind::State => 4,
      ErrorKind::Authorization => 5,
    }
  }
}

/// The boundary error type of the runtime. Internal components keep
/// their own error enums; everything converts into this one before it
/// crosses `execute_tx`.
#[derive(Debug, Clone, Error)]
pub enum RuntimeError {
  #[error(transparent)]
  Compile(#[from] bytecode::Error),

  #[error(transparent)]
  Ledger(#[from] ledger::Error),

  #[error(transparent)]
  Exec(#[from] interpreter::Error),

  #[error(transparent)]
  Group(#[from] processor::Error),

  #[error(transparent)]
  Lsig(#[from] lsig::Error),

  #[error("program template placeholder TMPL_{0} was not substituted")]
  UnresolvedTemplate(String),

  #[error("program compilation failed: {0}")]
  CompilerFailed(String),
}

impl RuntimeError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      RuntimeError::Compile(_) => ErrorKind::Compile,
      RuntimeError::UnresolvedTemplate(_) => ErrorKind::Compile,
      RuntimeError::CompilerFailed(_) => ErrorKind::Compile,
      RuntimeError::Lsig(_) => ErrorKind::Authorization,
      RuntimeError::Ledger(e) => ledger_kind(e),
      RuntimeError::Exec(e) => exec_kind(e),
      RuntimeError::Group(e) => group_kind(e),
    }
  }
}

fn ledger_kind(error: &ledger::Error) -> ErrorKind {
  use ledger::Error::*;
  match error {
    UnauthorizedManager { .. }
    | UnauthorizedFreeze { .. }
    | UnauthorizedClawback { .. } => ErrorKind::Authorization,
    _ => ErrorKind::State,
  }
}

fn exec_kind(error: &interpreter::Error) -> ErrorKind {
  use interpreter::Error::*;
  match error {
    Compile(_) => ErrorKind::Compile,
    State(e) => ledger_kind(e),
    Inner(e) => e.kind(),
    StackOverflow(_)
    | CostExceeded { .. }
    | ValueTooLong { .. }
    | TooManyInnerTxns
    | InnerFeeNotCovered { .. } => ErrorKind::Resource,
    _ => ErrorKind::Logic,
  }
}

fn group_kind(error: &processor::Error) -> ErrorKind {
  use processor::Error::*;
  match error {
    EmptyGroup
    | GroupSizeExceeded(_)
    | FeesNotEnough { .. }
    | TooManyReferences { .. }
    | CallDepthExceeded => ErrorKind::Resource,
    InvalidRound { .. } | MissingAppFields | SelfCall(_) => ErrorKind::State,
  }
}
