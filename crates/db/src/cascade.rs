//! All-or-nothing multi-table deletes.

use fedimoji_common::{AppError, AppResult};
use sea_orm::sea_query::DeleteStatement;
use sea_orm::{
    ColumnTrait, ConnectionTrait, DeleteMany, EntityTrait, QueryFilter, QueryTrait,
    TransactionTrait,
};
use tracing::{debug, error, warn};

use crate::entities::{
    account_to_emoji, emoji, status_to_emoji, AccountToEmoji, Emoji, StatusToEmoji,
};

/// One labelled delete statement.
#[derive(Debug, Clone)]
pub struct DeleteStep {
    label: &'static str,
    statement: DeleteStatement,
}

impl DeleteStep {
    /// Name used in logs and errors.
    #[must_use]
    pub const fn label(&self) -> &'static str {
        self.label
    }
}

/// Ordered delete steps run in a single transaction.
///
/// Either every step commits or none does. The transaction is rolled back
/// explicitly on a failed step, and implicitly when the future is dropped
/// (cancellation, timeout, panic unwinding).
#[derive(Debug, Clone, Default)]
pub struct CascadingDelete {
    steps: Vec<DeleteStep>,
}

impl CascadingDelete {
    /// An empty plan.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a step.
    #[must_use]
    pub fn step<E: EntityTrait>(mut self, label: &'static str, delete: DeleteMany<E>) -> Self {
        self.steps.push(DeleteStep {
            label,
            statement: delete.into_query(),
        });
        self
    }

    /// The steps in execution order.
    #[must_use]
    pub fn steps(&self) -> &[DeleteStep] {
        &self.steps
    }

    /// Run every step inside one transaction and commit.
    ///
    /// Returns the total number of rows removed. Any failure, including
    /// beginning or committing the transaction, is reported as
    /// [`AppError::Transaction`].
    pub async fn execute<C>(&self, db: &C) -> AppResult<u64>
    where
        C: TransactionTrait,
    {
        let txn = db
            .begin()
            .await
            .map_err(|e| AppError::Transaction(format!("begin: {e}")))?;
        let backend = txn.get_database_backend();

        let mut removed = 0;
        for step in &self.steps {
            match txn.execute(backend.build(&step.statement)).await {
                Ok(result) => {
                    debug!(step = step.label, rows = result.rows_affected(), "Delete step done");
                    removed += result.rows_affected();
                }
                Err(err) => {
                    error!(step = step.label, error = %err, "Delete step failed, rolling back");
                    if let Err(rollback_err) = txn.rollback().await {
                        warn!(error = %rollback_err, "Rollback failed");
                    }
                    return Err(AppError::Transaction(format!("{}: {err}", step.label)));
                }
            }
        }

        txn.commit()
            .await
            .map_err(|e| AppError::Transaction(format!("commit: {e}")))?;

        Ok(removed)
    }
}

/// Junction rows first, then the emoji itself.
#[must_use]
pub fn emoji_cascade(id: &str) -> CascadingDelete {
    CascadingDelete::new()
        .step(
            "status_to_emojis",
            StatusToEmoji::delete_many().filter(status_to_emoji::Column::EmojiId.eq(id)),
        )
        .step(
            "account_to_emojis",
            AccountToEmoji::delete_many().filter(account_to_emoji::Column::EmojiId.eq(id)),
        )
        .step("emojis", Emoji::delete_many().filter(emoji::Column::Id.eq(id)))
}
