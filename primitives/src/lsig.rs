use {
  crate::Address,
  ed25519_dalek::{Keypair, PublicKey, Signature, Signer, Verifier},
  serde::{Deserialize, Serialize},
};

/// A delegation attached to a logic signature: the delegator signs
/// the compiled program bytes, and from then on the program may
/// authorize transactions sent from the delegator's address.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Delegation {
  pub signer: PublicKey,
  pub sig: Signature,
}

/// A logic signature: a compiled program plus the arguments it will
/// be invoked with, optionally delegated by a keypair owner.
///
/// Without a delegation the logic signature authorizes only
/// transactions sent from its own derived contract-account address;
/// with one it authorizes transactions sent by the delegator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogicSig {
  pub program: Vec<u8>,
  pub args: Vec<Vec<u8>>,

  pub delegation: Option<Delegation>,
}

impl LogicSig {
  pub fn new(program: Vec<u8>, args: Vec<Vec<u8>>) -> Self {
    Self {
      program,
      args,
      delegation: None,
    }
  }

  /// Attaches a delegation by signing the program bytes.
  pub fn sign(&mut self, keypair: &Keypair) {
    self.delegation = Some(Delegation {
      signer: keypair.public,
      sig: keypair.sign(&self.program),
    });
  }

  /// The address this logic signature can authorize transactions
  /// for: the delegator's address in delegated mode, the program's
  /// derived contract-account address otherwise.
  pub fn address(&self) -> Address {
    match &self.delegation {
      Some(delegation) => Address::from(delegation.signer),
      None => Address::for_program(&self.program),
    }
  }

  /// Checks the delegation signature over the program bytes. Returns
  /// true for undelegated (contract-account) logic signatures, whose
  /// only authorization is the program itself.
  pub fn verify_delegation(&self) -> bool {
    match &self.delegation {
      Some(delegation) => delegation
        .signer
        .verify(&self.program, &delegation.sig)
        .is_ok(),
      None => true,
    }
  }
}

#[cfg(test)]
mod tests {
  use {super::LogicSig, crate::Address, ed25519_dalek::Keypair};

  #[test]
  fn contract_account_address_is_program_hash() {
    let lsig = LogicSig::new(vec![1, 2, 3], vec![]);
    assert_eq!(lsig.address(), Address::for_program(&[1, 2, 3]));
  }

  #[test]
  fn delegation_binds_signer_and_program() {
    let keypair = Keypair::generate(&mut rand::thread_rng());
    let mut lsig = LogicSig::new(vec![1, 2, 3], vec![]);
    lsig.sign(&keypair);

    assert_eq!(lsig.address(), Address::from(keypair.public));
    assert!(lsig.verify_delegation());

    // tampering with the program invalidates the delegation
    lsig.program.push(0xff);
    assert!(!lsig.verify_delegation());
  }
}
