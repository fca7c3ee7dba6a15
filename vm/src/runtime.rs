use {
  crate::{
    bytecode::Program,
    errors::RuntimeError,
    ledger::Ledger,
    processor::{self, Receipt},
  },
  kiln_primitives::{
    Account,
    Address,
    AppId,
    AppParams,
    AssetHolding,
    AssetId,
    AssetParams,
    SignedTransaction,
    TealValue,
  },
  std::collections::{BTreeMap, HashMap},
  tracing::debug,
};

/// The external bytecode compiler. The runtime never parses source
/// text itself; callers inject whatever toolchain turns their
/// contract source into program bytes.
pub trait ProgramCompiler {
  fn compile(&self, source: &str) -> Result<Vec<u8>, String>;
}

impl<F> ProgramCompiler for F
where
  F: Fn(&str) -> Result<Vec<u8>, String>,
{
  fn compile(&self, source: &str) -> Result<Vec<u8>, String> {
    self(source)
  }
}

/// A value substituted for a `TMPL_*` placeholder in program source
/// before it is handed to the compiler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
  Uint(u64),
  Address(Address),
  Bytes(Vec<u8>),
}

impl TemplateValue {
  fn render(&self) -> String {
    match self {
      TemplateValue::Uint(v) => v.to_string(),
      TemplateValue::Address(addr) => addr.to_string(),
      TemplateValue::Bytes(bytes) => format!("0x{}", hex::encode(bytes)),
    }
  }
}

pub type TemplateParams = BTreeMap<String, TemplateValue>;

/// The public facade of the simulator: owns the committed ledger and
/// the simulated clock, applies atomic groups, loads template
/// programs and answers state queries.
///
/// The clock never advances on its own; tests drive it explicitly
/// through [`Runtime::set_round_and_timestamp`] so time-gated
/// programs behave deterministically.
pub struct Runtime {
  ledger: Ledger,
  round: u64,
  timestamp: u64,
  compiler: Box<dyn ProgramCompiler>,

  /// Compiled programs memoized per (source, template parameters),
  /// so a template deployed many times compiles once.
  program_cache: HashMap<(String, String), Vec<u8>>,
}

impl Runtime {
  pub fn new(compiler: Box<dyn ProgramCompiler>) -> Self {
    Self {
      ledger: Ledger::new(),
      round: 2,
      timestamp: 1,
      compiler,
      program_cache: HashMap::new(),
    }
  }

  /// Seeds an account with a balance. Accounts can also come into
  /// existence by receiving a payment.
  pub fn create_account(&mut self, address: Address, balance: u64) {
    self.ledger.add_account(address, balance);
  }

  /// Sets the simulated clock read by time-gated programs and
  /// validity-window checks. Has no other side effect.
  pub fn set_round_and_timestamp(&mut self, round: u64, timestamp: u64) {
    self.round = round;
    self.timestamp = timestamp;
  }

  pub fn round(&self) -> u64 {
    self.round
  }

  pub fn timestamp(&self) -> u64 {
    self.timestamp
  }

  /// Applies one atomic group. Either every transaction's effect is
  /// committed, or none is and the error surfaces; there is no third
  /// outcome.
  pub fn execute_tx(
    &mut self,
    group: &[SignedTransaction],
  ) -> Result<Vec<Receipt>, RuntimeError> {
    let (ledger, receipts) =
      processor::execute_group(&self.ledger, group, self.round, self.timestamp)?;
    self.ledger = ledger;
    debug!(receipts = receipts.len(), "group committed to ledger");
    Ok(receipts)
  }

  /// Applies a single transaction as a group of one.
  pub fn execute_one(
    &mut self,
    stxn: SignedTransaction,
  ) -> Result<Receipt, RuntimeError> {
    let mut receipts = self.execute_tx(&[stxn])?;
    Ok(receipts.remove(0))
  }

  /// Substitutes `TMPL_*` placeholders into `source`, compiles it
  /// through the injected compiler and validates the result decodes.
  /// Compilations are memoized per (source, parameters).
  pub fn load_program(
    &mut self,
    source: &str,
    params: &TemplateParams,
  ) -> Result<Vec<u8>, RuntimeError> {
    let rendered: Vec<String> = params
      .iter()
      .map(|(key, value)| format!("{key}={}", value.render()))
      .collect();
    let cache_key = (source.to_string(), rendered.join(";"));
    if let Some(bytes) = self.program_cache.get(&cache_key) {
      return Ok(bytes.clone());
    }

    let mut substituted = source.to_string();
    for (key, value) in params {
      substituted =
        substituted.replace(&format!("TMPL_{key}"), &value.render());
    }
    if let Some(pos) = substituted.find("TMPL_") {
      let name: String = substituted[pos + 5..]
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || *c == '_')
        .collect();
      return Err(RuntimeError::UnresolvedTemplate(name));
    }

    let bytes = self
      .compiler
      .compile(&substituted)
      .map_err(RuntimeError::CompilerFailed)?;
    Program::parse(&bytes)?;

    self.program_cache.insert(cache_key, bytes.clone());
    Ok(bytes)
  }

  //
  // state accessors
  //

  pub fn ledger(&self) -> &Ledger {
    &self.ledger
  }

  pub fn account(&self, address: &Address) -> Result<&Account, RuntimeError> {
    Ok(self.ledger.account(address)?)
  }

  pub fn balance(&self, address: &Address) -> Result<u64, RuntimeError> {
    Ok(self.ledger.balance(address)?)
  }

  pub fn global_state(
    &self,
    app: AppId,
    key: &[u8],
  ) -> Result<Option<TealValue>, RuntimeError> {
    Ok(self.ledger.global_state(app, key)?.cloned())
  }

  pub fn local_state(
    &self,
    app: AppId,
    address: &Address,
    key: &[u8],
  ) -> Result<Option<TealValue>, RuntimeError> {
    Ok(self.ledger.local_state(app, address, key)?.cloned())
  }

  pub fn asset_holding(
    &self,
    asset: AssetId,
    address: &Address,
  ) -> Result<AssetHolding, RuntimeError> {
    Ok(self.ledger.holding(address, asset)?.clone())
  }

  pub fn asset_params(
    &self,
    asset: AssetId,
  ) -> Result<AssetParams, RuntimeError> {
    Ok(self.ledger.asset_params(asset)?.clone())
  }

  pub fn app_params(&self, app: AppId) -> Result<AppParams, RuntimeError> {
    Ok(self.ledger.app_params(app)?.clone())
  }
}
