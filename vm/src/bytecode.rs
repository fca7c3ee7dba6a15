use {std::collections::HashMap, thiserror::Error};

/// Lowest bytecode version the runtime accepts.
pub const MIN_PROGRAM_VERSION: u8 = 1;

/// Highest bytecode version the runtime accepts. The per-version
/// behavior differences are collected in [`crate::cost::VersionPolicy`].
pub const MAX_PROGRAM_VERSION: u8 = 5;

/// Rejections raised while decoding a program, before any instruction
/// executes. Using an opcode or a field that the program's declared
/// version does not admit is caught here, never at run time.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum Error {
  #[error("program is empty")]
  EmptyProgram,

  #[error(
    "unsupported program version {0}, supported versions are \
     {MIN_PROGRAM_VERSION}..={MAX_PROGRAM_VERSION}"
  )]
  UnsupportedVersion(u8),

  #[error("unknown opcode 0x{0:02x} at offset {1}")]
  UnknownOpcode(u8, usize),

  #[error(
    "opcode {op} requires program version {min} but the program \
     declares version {got}"
  )]
  VersionGate {
    op: &'static str,
    min: u8,
    got: u8,
  },

  #[error(
    "{kind} field code {code} is unknown for program version {version}"
  )]
  UnknownField {
    kind: &'static str,
    code: u8,
    version: u8,
  },

  #[error("program truncated inside the instruction at offset {0}")]
  Truncated(usize),

  #[error("branch at offset {0} does not target an instruction boundary")]
  BadBranchTarget(usize),

  #[error("backward branches require program version 4, got {0}")]
  BackwardBranch(u8),
}

/// Fields of a transaction readable by programs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TxnField {
  Sender,
  Fee,
  FirstValid,
  LastValid,
  Note,
  Receiver,
  Amount,
  CloseRemainderTo,
  TypeEnum,
  XferAsset,
  AssetAmount,
  AssetSender,
  AssetReceiver,
  AssetCloseTo,
  GroupIndex,
  TxId,
  ApplicationId,
  OnCompletion,
  ApplicationArgs,
  NumAppArgs,
  Accounts,
  NumAccounts,
  ApprovalProgram,
  ClearStateProgram,
}

impl TxnField {
  fn from_code(code: u8, version: u8) -> Result<Self, Error> {
    use TxnField::*;
    let field = match code {
      0 => Sender,
      1 => Fee,
      2 => FirstValid,
      3 => LastValid,
      4 => Note,
      5 => Receiver,
      6 => Amount,
      7 => CloseRemainderTo,
      8 => TypeEnum,
      9 => XferAsset,
      10 => AssetAmount,
      11 => AssetSender,
      12 => AssetReceiver,
      13 => AssetCloseTo,
      14 => GroupIndex,
      15 => TxId,
      16 => ApplicationId,
      17 => OnCompletion,
      18 => ApplicationArgs,
      19 => NumAppArgs,
      20 => Accounts,
      21 => NumAccounts,
      22 => ApprovalProgram,
      23 => ClearStateProgram,
      _ => {
        return Err(Error::UnknownField {
          kind: "transaction",
          code,
          version,
        })
      }
    };
    if field.min_version() > version {
      return Err(Error::UnknownField {
        kind: "transaction",
        code,
        version,
      });
    }
    Ok(field)
  }

  fn min_version(&self) -> u8 {
    use TxnField::*;
    match self {
      ApplicationId | OnCompletion | ApplicationArgs | NumAppArgs
      | Accounts | NumAccounts | ApprovalProgram | ClearStateProgram => 2,
      _ => 1,
    }
  }

  /// Whether this field is an array and must be read through `txna`
  /// or `gtxna` with an element index.
  pub fn is_array(&self) -> bool {
    matches!(self, TxnField::ApplicationArgs | TxnField::Accounts)
  }
}

/// Fields of the execution environment readable through `global`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GlobalField {
  MinTxnFee,
  MinBalance,
  MaxTxnLife,
  ZeroAddress,
  GroupSize,
  LogicSigVersion,
  Round,
  LatestTimestamp,
  CurrentApplicationId,
  CreatorAddress,
  CurrentApplicationAddress,
}

impl GlobalField {
  fn from_code(code: u8, version: u8) -> Result<Self, Error> {
    use GlobalField::*;
    let field = match code {
      0 => MinTxnFee,
      1 => MinBalance,
      2 => MaxTxnLife,
      3 => ZeroAddress,
      4 => GroupSize,
      5 => LogicSigVersion,
      6 => Round,
      7 => LatestTimestamp,
      8 => CurrentApplicationId,
      9 => CreatorAddress,
      10 => CurrentApplicationAddress,
      _ => {
        return Err(Error::UnknownField {
          kind: "global",
          code,
          version,
        })
      }
    };
    let min = match field {
      MinTxnFee | MinBalance | MaxTxnLife | ZeroAddress | GroupSize => 1,
      LogicSigVersion | Round | LatestTimestamp | CurrentApplicationId => 2,
      CreatorAddress => 3,
      CurrentApplicationAddress => 5,
    };
    if min > version {
      return Err(Error::UnknownField {
        kind: "global",
        code,
        version,
      });
    }
    Ok(field)
  }
}

/// Fields readable through `asset_holding_get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HoldingField {
  Balance,
  Frozen,
}

impl HoldingField {
  fn from_code(code: u8, version: u8) -> Result<Self, Error> {
    match code {
      0 => Ok(HoldingField::Balance),
      1 => Ok(HoldingField::Frozen),
      _ => Err(Error::UnknownField {
        kind: "asset holding",
        code,
        version,
      }),
    }
  }
}

/// Fields readable through `asset_params_get`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamsField {
  Total,
  Decimals,
  DefaultFrozen,
  UnitName,
  Name,
  Url,
  MetadataHash,
  Manager,
  Reserve,
  Freeze,
  Clawback,
  Creator,
}

impl ParamsField {
  fn from_code(code: u8, version: u8) -> Result<Self, Error> {
    use ParamsField::*;
    Ok(match code {
      0 => Total,
      1 => Decimals,
      2 => DefaultFrozen,
      3 => UnitName,
      4 => Name,
      5 => Url,
      6 => MetadataHash,
      7 => Manager,
      8 => Reserve,
      9 => Freeze,
      10 => Clawback,
      11 => Creator,
      _ => {
        return Err(Error::UnknownField {
          kind: "asset params",
          code,
          version,
        })
      }
    })
  }
}

/// Fields settable on a pending inner transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ItxnFieldCode {
  TypeEnum,
  Receiver,
  Amount,
  Fee,
  XferAsset,
  AssetReceiver,
  AssetAmount,
  ApplicationId,
}

impl ItxnFieldCode {
  fn from_code(code: u8, version: u8) -> Result<Self, Error> {
    use ItxnFieldCode::*;
    Ok(match code {
      0 => TypeEnum,
      1 => Receiver,
      2 => Amount,
      3 => Fee,
      4 => XferAsset,
      5 => AssetReceiver,
      6 => AssetAmount,
      7 => ApplicationId,
      _ => {
        return Err(Error::UnknownField {
          kind: "inner transaction",
          code,
          version,
        })
      }
    })
  }
}

/// One decoded instruction. Branch and subroutine targets are already
/// resolved to instruction indices; a target equal to the instruction
/// count means "run off the end", which finishes the program with
/// whatever the stack holds.
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
  Err,
  Sha256,
  Keccak256,
  Sha512_256,
  Ed25519Verify,
  Add,
  Sub,
  Mul,
  Div,
  Mod,
  Lt,
  Gt,
  Le,
  Ge,
  And,
  Or,
  Eq,
  Neq,
  Not,
  Len,
  Itob,
  Btoi,
  BitOr,
  BitAnd,
  BitXor,
  BitNot,
  Mulw,
  Addw,
  PushInt(u64),
  PushBytes(Vec<u8>),
  Arg(u8),
  Txn(TxnField),
  Txna(TxnField, u8),
  Gtxn(u8, TxnField),
  Gtxna(u8, TxnField, u8),
  Global(GlobalField),
  Load(u8),
  Store(u8),
  Bnz(usize),
  Bz(usize),
  B(usize),
  Callsub(usize),
  Retsub,
  Return,
  Assert,
  Pop,
  Dup,
  Dup2,
  Swap,
  Concat,
  Substring(u8, u8),
  Substring3,
  Balance,
  MinBalance,
  AppOptedIn,
  AppLocalGet,
  AppLocalPut,
  AppLocalDel,
  AppGlobalGet,
  AppGlobalPut,
  AppGlobalDel,
  AssetHoldingGet(HoldingField),
  AssetParamsGet(ParamsField),
  ItxnBegin,
  ItxnField(ItxnFieldCode),
  ItxnSubmit,
}

impl Instr {
  /// Mnemonic used in error messages.
  pub fn name(&self) -> &'static str {
    use Instr::*;
    match self {
      Err => "err",
      Sha256 => "sha256",
      Keccak256 => "keccak256",
      Sha512_256 => "sha512_256",
      Ed25519Verify => "ed25519verify",
      Add => "+",
      Sub => "-",
      Mul => "*",
      Div => "/",
      Mod => "%",
      Lt => "<",
      Gt => ">",
      Le => "<=",
      Ge => ">=",
      And => "&&",
      Or => "||",
      Eq => "==",
      Neq => "!=",
      Not => "!",
      Len => "len",
      Itob => "itob",
      Btoi => "btoi",
      BitOr => "|",
      BitAnd => "&",
      BitXor => "^",
      BitNot => "~",
      Mulw => "mulw",
      Addw => "addw",
      PushInt(_) => "pushint",
      PushBytes(_) => "pushbytes",
      Arg(_) => "arg",
      Txn(_) => "txn",
      Txna(..) => "txna",
      Gtxn(..) => "gtxn",
      Gtxna(..) => "gtxna",
      Global(_) => "global",
      Load(_) => "load",
      Store(_) => "store",
      Bnz(_) => "bnz",
      Bz(_) => "bz",
      B(_) => "b",
      Callsub(_) => "callsub",
      Retsub => "retsub",
      Return => "return",
      Assert => "assert",
      Pop => "pop",
      Dup => "dup",
      Dup2 => "dup2",
      Swap => "swap",
      Concat => "concat",
      Substring(..) => "substring",
      Substring3 => "substring3",
      Balance => "balance",
      MinBalance => "min_balance",
      AppOptedIn => "app_opted_in",
      AppLocalGet => "app_local_get",
      AppLocalPut => "app_local_put",
      AppLocalDel => "app_local_del",
      AppGlobalGet => "app_global_get",
      AppGlobalPut => "app_global_put",
      AppGlobalDel => "app_global_del",
      AssetHoldingGet(_) => "asset_holding_get",
      AssetParamsGet(_) => "asset_params_get",
      ItxnBegin => "itxn_begin",
      ItxnField(_) => "itxn_field",
      ItxnSubmit => "itxn_submit",
    }
  }

  /// First program version in which this instruction is legal.
  pub fn min_version(&self) -> u8 {
    use Instr::*;
    match self {
      Err | Sha256 | Keccak256 | Sha512_256 | Ed25519Verify | Add | Sub
      | Mul | Div | Mod | Lt | Gt | Le | Ge | And | Or | Eq | Neq | Not
      | Len | Itob | Btoi | BitOr | BitAnd | BitXor | BitNot | Mulw
      | PushInt(_) | PushBytes(_) | Arg(_) | Txn(_) | Gtxn(..)
      | Global(_) | Load(_) | Store(_) | Bnz(_) | Pop | Dup => 1,
      Addw | Txna(..) | Gtxna(..) | Bz(_) | B(_) | Return | Dup2
      | Concat | Substring(..) | Substring3 | Balance | AppOptedIn
      | AppLocalGet | AppLocalPut | AppLocalDel | AppGlobalGet
      | AppGlobalPut | AppGlobalDel | AssetHoldingGet(_)
      | AssetParamsGet(_) => 2,
      Assert | Swap | MinBalance => 3,
      Callsub(_) | Retsub => 4,
      ItxnBegin | ItxnField(_) | ItxnSubmit => 5,
    }
  }

  /// Whether this instruction touches application state and is
  /// therefore forbidden in signature mode.
  pub fn is_application_only(&self) -> bool {
    use Instr::*;
    matches!(
      self,
      Balance
        | MinBalance
        | AppOptedIn
        | AppLocalGet
        | AppLocalPut
        | AppLocalDel
        | AppGlobalGet
        | AppGlobalPut
        | AppGlobalDel
        | AssetHoldingGet(_)
        | AssetParamsGet(_)
        | ItxnBegin
        | ItxnField(_)
        | ItxnSubmit
    )
  }
}

/// A fully decoded program: the declared version and its instruction
/// list with resolved branch targets.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
  pub version: u8,
  pub instrs: Vec<Instr>,
}

struct Reader<'a> {
  code: &'a [u8],
  pos: usize,
}

impl<'a> Reader<'a> {
  fn u8(&mut self) -> Result<u8, Error> {
    let b = *self
      .code
      .get(self.pos)
      .ok_or(Error::Truncated(self.pos))?;
    self.pos += 1;
    Ok(b)
  }

  fn u16(&mut self) -> Result<u16, Error> {
    Ok(u16::from_le_bytes([self.u8()?, self.u8()?]))
  }

  fn i16(&mut self) -> Result<i16, Error> {
    Ok(i16::from_le_bytes([self.u8()?, self.u8()?]))
  }

  fn u64(&mut self) -> Result<u64, Error> {
    let mut bytes = [0u8; 8];
    for b in bytes.iter_mut() {
      *b = self.u8()?;
    }
    Ok(u64::from_le_bytes(bytes))
  }

  fn bytes(&mut self, len: usize) -> Result<Vec<u8>, Error> {
    let end = self.pos + len;
    let slice = self
      .code
      .get(self.pos..end)
      .ok_or(Error::Truncated(self.pos))?;
    self.pos = end;
    Ok(slice.to_vec())
  }
}

impl Program {
  /// Decodes a whole program up front.
  ///
  /// The first byte is the version marker; every following byte
  /// belongs to exactly one instruction. Unknown opcodes, opcodes or
  /// fields beyond the declared version, truncated immediates and
  /// malformed branch targets all fail here.
  pub fn parse(code: &[u8]) -> Result<Self, Error> {
    let version = *code.first().ok_or(Error::EmptyProgram)?;
    if !(MIN_PROGRAM_VERSION..=MAX_PROGRAM_VERSION).contains(&version) {
      return Err(Error::UnsupportedVersion(version));
    }

    let mut reader = Reader {
      code: &code[1..],
      pos: 0,
    };
    let code_len = code.len() - 1;

    // first pass: decode instructions, branch targets kept as
    // absolute byte offsets into the instruction stream.
    let mut instrs = Vec::new();
    let mut offsets = HashMap::new();
    while reader.pos < code_len {
      let offset = reader.pos;
      offsets.insert(offset, instrs.len());
      let instr = decode_instr(&mut reader, version)?;
      if instr.min_version() > version {
        return Err(Error::VersionGate {
          op: instr.name(),
          min: instr.min_version(),
          got: version,
        });
      }
      if let Instr::Bnz(target)
      | Instr::Bz(target)
      | Instr::B(target)
      | Instr::Callsub(target) = &instr
      {
        if *target < reader.pos && version < 4 {
          return Err(Error::BackwardBranch(version));
        }
      }
      instrs.push((offset, instr));
    }

    // second pass: rewrite byte targets into instruction indices. a
    // target exactly one past the last byte is a jump to the end.
    let instrs = instrs
      .into_iter()
      .map(|(offset, instr)| {
        let resolve = |target: usize| -> Result<usize, Error> {
          if target == code_len {
            return Ok(offsets.len());
          }
          offsets
            .get(&target)
            .copied()
            .ok_or(Error::BadBranchTarget(offset))
        };
        Ok(match instr {
          Instr::Bnz(t) => Instr::Bnz(resolve(t)?),
          Instr::Bz(t) => Instr::Bz(resolve(t)?),
          Instr::B(t) => Instr::B(resolve(t)?),
          Instr::Callsub(t) => Instr::Callsub(resolve(t)?),
          other => other,
        })
      })
      .collect::<Result<Vec<_>, Error>>()?;

    Ok(Program { version, instrs })
  }
}

fn decode_instr(reader: &mut Reader, version: u8) -> Result<Instr, Error> {
  let offset = reader.pos;
  let opcode = reader.u8()?;

  // branch offsets are relative to the end of the instruction.
  let branch_target = |reader: &mut Reader| -> Result<usize, Error> {
    let rel = reader.i16()? as i64;
    let target = reader.pos as i64 + rel;
    if target < 0 {
      return Err(Error::BadBranchTarget(offset));
    }
    Ok(target as usize)
  };

  Ok(match opcode {
    0x00 => Instr::Err,
    0x01 => Instr::Sha256,
    0x02 => Instr::Keccak256,
    0x03 => Instr::Sha512_256,
    0x04 => Instr::Ed25519Verify,
    0x08 => Instr::Add,
    0x09 => Instr::Sub,
    0x0a => Instr::Div,
    0x0b => Instr::Mul,
    0x0c => Instr::Lt,
    0x0d => Instr::Gt,
    0x0e => Instr::Le,
    0x0f => Instr::Ge,
    0x10 => Instr::And,
    0x11 => Instr::Or,
    0x12 => Instr::Eq,
    0x13 => Instr::Neq,
    0x14 => Instr::Not,
    0x15 => Instr::Len,
    0x16 => Instr::Itob,
    0x17 => Instr::Btoi,
    0x18 => Instr::Mod,
    0x19 => Instr::BitOr,
    0x1a => Instr::BitAnd,
    0x1b => Instr::BitXor,
    0x1c => Instr::BitNot,
    0x1d => Instr::Mulw,
    0x1e => Instr::Addw,
    0x20 => Instr::PushInt(reader.u64()?),
    0x21 => {
      let len = reader.u16()? as usize;
      Instr::PushBytes(reader.bytes(len)?)
    }
    0x2c => Instr::Arg(reader.u8()?),
    0x31 => Instr::Txn(TxnField::from_code(reader.u8()?, version)?),
    0x32 => Instr::Global(GlobalField::from_code(reader.u8()?, version)?),
    0x33 => {
      let group = reader.u8()?;
      Instr::Gtxn(group, TxnField::from_code(reader.u8()?, version)?)
    }
    0x34 => Instr::Load(reader.u8()?),
    0x35 => Instr::Store(reader.u8()?),
    0x36 => {
      let field = TxnField::from_code(reader.u8()?, version)?;
      Instr::Txna(field, reader.u8()?)
    }
    0x37 => {
      let group = reader.u8()?;
      let field = TxnField::from_code(reader.u8()?, version)?;
      Instr::Gtxna(group, field, reader.u8()?)
    }
    0x40 => Instr::Bnz(branch_target(reader)?),
    0x41 => Instr::Bz(branch_target(reader)?),
    0x42 => Instr::B(branch_target(reader)?),
    0x43 => Instr::Return,
    0x44 => Instr::Assert,
    0x48 => Instr::Pop,
    0x49 => Instr::Dup,
    0x4a => Instr::Dup2,
    0x4c => Instr::Swap,
    0x50 => Instr::Concat,
    0x51 => {
      let start = reader.u8()?;
      Instr::Substring(start, reader.u8()?)
    }
    0x52 => Instr::Substring3,
    0x60 => Instr::Balance,
    0x61 => Instr::AppOptedIn,
    0x62 => Instr::AppLocalGet,
    0x63 => Instr::AppGlobalGet,
    0x64 => Instr::AppLocalPut,
    0x65 => Instr::AppGlobalPut,
    0x66 => Instr::AppLocalDel,
    0x67 => Instr::AppGlobalDel,
    0x70 => {
      Instr::AssetHoldingGet(HoldingField::from_code(reader.u8()?, version)?)
    }
    0x71 => {
      Instr::AssetParamsGet(ParamsField::from_code(reader.u8()?, version)?)
    }
    0x78 => Instr::MinBalance,
    0x88 => Instr::Callsub(branch_target(reader)?),
    0x89 => Instr::Retsub,
    0xb1 => Instr::ItxnBegin,
    0xb2 => {
      Instr::ItxnField(ItxnFieldCode::from_code(reader.u8()?, version)?)
    }
    0xb3 => Instr::ItxnSubmit,
    other => return Err(Error::UnknownOpcode(other, offset)),
  })
}
