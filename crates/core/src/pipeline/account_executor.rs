use std::path::PathBuf;
use std::sync::Arc;

use serde::Serialize;

use crate::identification::domain::creator_estimate::IdentificationOutcome;
use crate::pipeline::identify_creator_use_case::IdentifyCreatorUseCase;

pub type SendError = Box<dyn std::error::Error + Send + Sync>;

/// Builds a fresh use case for one account. Each account gets its own
/// collaborators; nothing is shared between runs.
pub type UseCaseFactory =
    Arc<dyn Fn(&AccountBatch) -> Result<IdentifyCreatorUseCase, SendError> + Send + Sync>;

/// One account's images, in the order they should be visited.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AccountBatch {
    pub account_id: String,
    pub images: Vec<PathBuf>,
}

impl AccountBatch {
    pub fn new(account_id: impl Into<String>, images: Vec<PathBuf>) -> Self {
        Self {
            account_id: account_id.into(),
            images,
        }
    }
}

/// Final state of one account: an outcome, or the reason the run failed.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AccountReport {
    Finished(IdentificationOutcome),
    Failed { account_id: String, error: String },
}

impl AccountReport {
    pub fn account_id(&self) -> &str {
        match self {
            AccountReport::Finished(outcome) => outcome.account_id(),
            AccountReport::Failed { account_id, .. } => account_id,
        }
    }

    pub fn outcome(&self) -> Option<&IdentificationOutcome> {
        match self {
            AccountReport::Finished(outcome) => Some(outcome),
            AccountReport::Failed { .. } => None,
        }
    }
}

/// Runs many independent accounts.
///
/// Reports come back in submission order. One account failing never stops
/// the others.
pub trait AccountExecutor: Send {
    fn run(&self, batches: Vec<AccountBatch>) -> Vec<AccountReport>;
}

/// Builds and runs one account's use case, folding every failure into the
/// report.
pub fn run_account(factory: &UseCaseFactory, batch: &AccountBatch) -> AccountReport {
    let mut use_case = match factory(batch) {
        Ok(use_case) => use_case,
        Err(e) => {
            log::error!("{}: setup failed: {e}", batch.account_id);
            return failed(batch, e.to_string());
        }
    };

    match use_case.execute(&batch.account_id, &batch.images) {
        Ok(outcome) => AccountReport::Finished(outcome),
        Err(e) => {
            log::error!("{}: identification failed: {e}", batch.account_id);
            failed(batch, e.to_string())
        }
    }
}

pub(crate) fn failed(batch: &AccountBatch, error: String) -> AccountReport {
    AccountReport::Failed {
        account_id: batch.account_id.clone(),
        error,
    }
}

/// Runs accounts one after another on the calling thread.
pub struct SequentialAccountExecutor {
    factory: UseCaseFactory,
}

impl SequentialAccountExecutor {
    pub fn new(factory: UseCaseFactory) -> Self {
        Self { factory }
    }
}

impl AccountExecutor for SequentialAccountExecutor {
    fn run(&self, batches: Vec<AccountBatch>) -> Vec<AccountReport> {
        batches
            .iter()
            .map(|batch| run_account(&self.factory, batch))
            .collect()
    }
}
