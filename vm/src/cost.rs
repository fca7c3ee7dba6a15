use crate::bytecode::Instr;

/// Cost budget of a logic-signature program.
pub const LOGIC_SIG_MAX_COST: u64 = 20_000;

/// Cost budget contributed by each application call in a group. The
/// budget is pooled: one cheap call extends the room of an expensive
/// one in the same group.
pub const MAX_APP_PROGRAM_COST: u64 = 700;

/// Per-version behavior of the interpreter, selected once when a
/// program is loaded instead of being re-derived inside the opcode
/// loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VersionPolicy {
  pub version: u8,

  /// Versions below 2 wrap silently on arithmetic overflow and
  /// underflow; later versions must reject with an explicit error.
  pub checked_arithmetic: bool,

  /// Versions below 4 charge the whole program's static cost before
  /// execution; later versions meter cost opcode by opcode as
  /// execution proceeds.
  pub dynamic_cost: bool,

  /// Whether programs of this version may emit inner transactions.
  pub inner_transactions: bool,
}

impl VersionPolicy {
  /// The policy table. One entry per supported program version.
  pub fn for_version(version: u8) -> Self {
    Self {
      version,
      checked_arithmetic: version >= 2,
      dynamic_cost: version >= 4,
      inner_transactions: version >= 5,
    }
  }
}

/// Cost of executing one instruction under a given program version.
///
/// Everything costs one unit except the cryptographic opcodes, whose
/// price was re-tuned in version 2.
pub fn instr_cost(instr: &Instr, version: u8) -> u64 {
  match instr {
    Instr::Sha256 => {
      if version < 2 {
        7
      } else {
        35
      }
    }
    Instr::Sha512_256 => {
      if version < 2 {
        9
      } else {
        45
      }
    }
    Instr::Keccak256 => {
      if version < 2 {
        26
      } else {
        130
      }
    }
    Instr::Ed25519Verify => 1900,
    _ => 1,
  }
}

/// Static cost of a whole program, used by pre-v4 versions that
/// charge for the program before running it.
pub fn static_cost(instrs: &[Instr], version: u8) -> u64 {
  instrs.iter().map(|i| instr_cost(i, version)).sum()
}
