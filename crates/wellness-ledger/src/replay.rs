use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use wellness_store::InMemoryStore;
use wellness_types::Identity;

use crate::config::LedgerConfig;
use crate::error::{ErrorKind, LedgerError, LedgerResult};
use crate::ledger::Ledger;
use crate::request::{Request, Response};

/// A scripted sequence of calls against a freshly bootstrapped ledger.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Script {
    pub deployer: Identity,
    #[serde(default)]
    pub calls: Vec<ScriptCall>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScriptCall {
    pub caller: Identity,
    pub request: Request,
}

impl Script {
    pub fn from_json(text: &str) -> LedgerResult<Self> {
        serde_json::from_str(text).map_err(|e| LedgerError::invalid(format!("script: {e}")))
    }
}

/// Result of one scripted call.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CallResult {
    Ok(Response),
    Err { kind: ErrorKind, message: String },
}

impl CallResult {
    pub fn is_ok(&self) -> bool {
        matches!(self, Self::Ok(_))
    }
}

impl From<LedgerResult<Response>> for CallResult {
    fn from(result: LedgerResult<Response>) -> Self {
        match result {
            Ok(response) => Self::Ok(response),
            Err(err) => Self::Err {
                kind: err.kind(),
                message: err.to_string(),
            },
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallOutcome {
    /// Zero-based position in the script.
    pub index: usize,
    pub caller: Identity,
    pub op: String,
    pub result: CallResult,
}

/// Everything a script run produced.
#[derive(Debug)]
pub struct ReplayResult {
    pub ledger: Ledger<InMemoryStore>,
    pub outcomes: Vec<CallOutcome>,
}

impl ReplayResult {
    pub fn failed(&self) -> usize {
        self.outcomes.iter().filter(|o| !o.result.is_ok()).count()
    }
}

/// Deterministic replay of call scripts.
pub struct ReplayEngine;

impl ReplayEngine {
    /// Bootstrap a ledger with `config` and apply every call in order.
    ///
    /// A failing call is recorded in its outcome and does not stop the
    /// script. Only genesis failures are returned as errors.
    pub fn run(script: &Script, config: LedgerConfig) -> LedgerResult<ReplayResult> {
        let mut ledger = Ledger::genesis(script.deployer.clone(), config)?;
        let mut outcomes = Vec::with_capacity(script.calls.len());

        for (index, call) in script.calls.iter().enumerate() {
            let op = call.request.op_name();
            let result = CallResult::from(ledger.execute(&call.caller, call.request.clone()));
            match &result {
                CallResult::Ok(_) => debug!(index, op, "script call succeeded"),
                CallResult::Err { kind, message } => {
                    warn!(index, op, %kind, %message, "script call failed")
                }
            }
            outcomes.push(CallOutcome {
                index,
                caller: call.caller.clone(),
                op: op.to_owned(),
                result,
            });
        }

        let result = ReplayResult { ledger, outcomes };
        info!(
            calls = result.outcomes.len(),
            failed = result.failed(),
            "script replayed"
        );
        Ok(result)
    }

    /// Run `script` twice and check that both runs reach the same state.
    pub fn verify_determinism(script: &Script, config: &LedgerConfig) -> LedgerResult<bool> {
        let first = Self::run(script, config.clone())?;
        let second = Self::run(script, config.clone())?;
        Ok(first.ledger.store().snapshot()? == second.ledger.store().snapshot()?
            && first.outcomes == second.outcomes)
    }
}
