use {
  crate::{
    bytecode::Program,
    errors::RuntimeError,
    interpreter::{self, ExecutionMode},
    processor::EvalContext,
  },
  kiln_primitives::{Address, LogicSig},
  thiserror::Error,
  tracing::trace,
};

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error(
    "delegation signature of logic signature is invalid for signer \
     {signer}"
  )]
  InvalidDelegationSignature { signer: Address },

  #[error(
    "logic signature authorizes {authorizer} but the transaction is \
     sent by {sender}"
  )]
  SenderMismatch {
    authorizer: Address,
    sender: Address,
  },
}

/// Decides whether the current transaction is authorized by its logic
/// signature.
///
/// Delegated mode first checks the ed25519 signature over the program
/// bytes; contract-account mode needs no signature because the
/// authorizing address is derived from the program itself. In both
/// modes the signature's address must be the transaction sender, and
/// the program must accept when run in signature mode over the
/// transaction group.
pub fn verify_and_run(
  ctx: &mut EvalContext,
  lsig: &LogicSig,
) -> Result<(), RuntimeError> {
  if let Some(delegation) = &lsig.delegation {
    if !lsig.verify_delegation() {
      return Err(
        Error::InvalidDelegationSignature {
          signer: Address::from(delegation.signer),
        }
        .into(),
      );
    }
  }

  let authorizer = lsig.address();
  let sender = ctx.group[ctx.current].txn.sender;
  if authorizer != sender {
    return Err(
      Error::SenderMismatch { authorizer, sender }.into(),
    );
  }

  trace!(%authorizer, "running logic signature program");
  let program = Program::parse(&lsig.program)?;
  interpreter::run(ctx, &program, ExecutionMode::Signature, &lsig.args)?;
  Ok(())
}
