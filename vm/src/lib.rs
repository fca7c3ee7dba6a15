mod bytecode;
mod cost;
mod errors;
mod interpreter;
mod itxn;
mod ledger;
mod lsig;
mod processor;
mod runtime;

pub use {
  bytecode::{
    Error as CompileError,
    GlobalField,
    HoldingField,
    Instr,
    ItxnFieldCode,
    ParamsField,
    Program,
    TxnField,
    MAX_PROGRAM_VERSION,
    MIN_PROGRAM_VERSION,
  },
  cost::{
    instr_cost,
    VersionPolicy,
    LOGIC_SIG_MAX_COST,
    MAX_APP_PROGRAM_COST,
  },
  errors::{ErrorKind, RuntimeError},
  interpreter::{
    Error as ExecError,
    ExecutionMode,
    MAX_STACK_DEPTH,
    SCRATCH_SIZE,
  },
  itxn::Error as InnerTxnError,
  ledger::{
    Error as LedgerError,
    Ledger,
    ACCOUNT_MIN_BALANCE,
    APP_MIN_BALANCE,
    ASSET_MIN_BALANCE,
  },
  lsig::Error as LsigError,
  processor::{
    Error as GroupError,
    Receipt,
    MAX_GROUP_SIZE,
    MAX_INNER_CALL_DEPTH,
    MAX_INNER_TXNS,
    MIN_TXN_FEE,
  },
  runtime::{
    ProgramCompiler,
    Runtime,
    TemplateParams,
    TemplateValue,
  },
};
