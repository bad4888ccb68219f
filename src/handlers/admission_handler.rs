//! Transaction Admission Handler
//!
//! Validates, deduplicates, persists and announces each submitted
//! transaction.
//!
//! The dedup lookup runs before the unit of work opens and is not atomic
//! with the insert: two concurrent identical submissions can both be
//! admitted. Storage-level uniqueness on the idempotency key is the only way
//! to close that gap.

use std::sync::Arc;

use chrono::Utc;
use uuid::Uuid;

use crate::domain::{within_dedup_window, IdempotencyKey, NewTransaction, RequestContext, Transaction};
use crate::error::AppError;
use crate::messaging::{publish_json, MessagePublisher, TRANSACTIONS_QUEUE};
use crate::store::{TransactionStore, UnitOfWork};

use super::{AdmissionResult, SubmitTransactionCommand, ValidatedSubmission};

/// Handler for transaction submission
pub struct TransactionAdmissionHandler {
    store: Arc<dyn TransactionStore>,
    publisher: Arc<dyn MessagePublisher>,
}

impl TransactionAdmissionHandler {
    pub fn new(store: Arc<dyn TransactionStore>, publisher: Arc<dyn MessagePublisher>) -> Self {
        Self { store, publisher }
    }

    /// Execute the submit command
    pub async fn execute(
        &self,
        command: SubmitTransactionCommand,
        context: &RequestContext,
    ) -> Result<AdmissionResult, AppError> {
        // Field validation, before any I/O
        let submission = command.validate()?;

        let key = IdempotencyKey::generate(
            Utc::now(),
            submission.account_id,
            submission.transaction_type,
            submission.amount,
        );

        // Soft dedup on content within the window
        if let Some(existing) = self
            .store
            .find_most_recent(
                submission.account_id,
                submission.transaction_type,
                submission.amount,
            )
            .await?
        {
            if within_dedup_window(existing.created_at, key.issued_at()) {
                tracing::info!(
                    correlation_id = %context.correlation_id,
                    transaction_id = %existing.id,
                    account_id = %existing.account_id,
                    transaction_type = %existing.transaction_type,
                    amount_cents = existing.amount_cents,
                    "Duplicate submission suppressed"
                );
                return Ok(AdmissionResult {
                    transaction: existing,
                    duplicate: true,
                });
            }
        }

        let mut uow = self.store.begin().await?;

        let transaction = match self.admit(uow.as_mut(), &submission, key).await {
            Ok(transaction) => transaction,
            Err(err) => {
                if let Err(rollback_err) = uow.rollback().await {
                    tracing::error!(
                        correlation_id = %context.correlation_id,
                        error = %rollback_err,
                        "Rollback failed"
                    );
                }
                return Err(err);
            }
        };

        // The message is already out; a failed commit leaves it orphaned
        if let Err(err) = uow.commit().await {
            tracing::warn!(
                correlation_id = %context.correlation_id,
                transaction_id = %transaction.id,
                error = %err,
                "Commit failed after publish; queued message refers to a rolled-back row"
            );
            return Err(err.into());
        }

        tracing::info!(
            correlation_id = %context.correlation_id,
            transaction_id = %transaction.id,
            account_id = %transaction.account_id,
            transaction_type = %transaction.transaction_type,
            amount_cents = transaction.amount_cents,
            idempotency_key = %transaction.idempotency_key,
            "Transaction admitted"
        );

        Ok(AdmissionResult {
            transaction,
            duplicate: false,
        })
    }

    /// Resolve references, insert and publish inside the open unit of work
    async fn admit(
        &self,
        uow: &mut dyn UnitOfWork,
        submission: &ValidatedSubmission,
        key: IdempotencyKey,
    ) -> Result<Transaction, AppError> {
        let account = uow
            .resolve_account(submission.account_id)
            .await?
            .ok_or_else(|| AppError::AccountNotFound(submission.account_id.to_string()))?;

        let mut row = NewTransaction::pending(
            account.id,
            submission.transaction_type,
            submission.amount,
            key,
        );

        if let Some(token) = submission.card_token.as_deref() {
            let card_id = uow
                .resolve_card_by_token_and_account(token, account.id)
                .await?
                .ok_or_else(|| AppError::CardNotOwned(account.id.to_string()))?;
            row = row.with_card(card_id);
        }

        if let Some(original_id) = submission.refund_transaction_id {
            self.verify_refund_target(uow, original_id).await?;
            row = row.with_refund_of(original_id);
        }

        let transaction = uow.insert_transaction(&row).await?;

        publish_json(self.publisher.as_ref(), TRANSACTIONS_QUEUE, &transaction).await?;

        Ok(transaction)
    }

    async fn verify_refund_target(
        &self,
        uow: &mut dyn UnitOfWork,
        original_id: Uuid,
    ) -> Result<(), AppError> {
        match uow.find_transaction(original_id).await? {
            Some(_) => Ok(()),
            None => Err(AppError::InvalidReference(format!(
                "original transaction {} for refund not found",
                original_id
            ))),
        }
    }
}
