//! The composition root that wires the engine components to the persistence
//! stores.

use time::Date;

use crate::{
    Error,
    database_id::{AccountId, CardId, CategoryId, TransactionId},
    ledger::{
        balance::apply_delta,
        billing::plan_installments,
        recurrence::{Frequency, expand},
        transfer::{TransferExecutor, TransferOutcome},
    },
    models::{Transaction, TransactionDraft, TransactionKind, UserId},
    stores::{AccountStore, CardStore, CategoryStore, TransactionStore},
};

/// Tunable business rules for the ledger operations.
#[derive(Debug, Clone)]
pub struct LedgerConfig {
    /// The smallest amount, in cents, each installment of a multi-installment
    /// purchase may be.
    pub minimum_installment_cents: i64,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            minimum_installment_cents: 100,
        }
    }
}

/// The consumer-facing surface of the ledger engine.
///
/// The user-facing layers collect an intent (amounts, dates, counts) and call
/// one of the operations here; the service validates it, computes the set of
/// ledger mutations through the engine components, persists them through the
/// stores, and translates component failures into the crate's [Error]
/// taxonomy. It is also the layer that guarantees every multi-row intent
/// shares exactly one freshly-created group ID.
#[derive(Debug, Clone)]
pub struct LedgerService<A, C, G, T> {
    /// The business-rule configuration.
    pub config: LedgerConfig,
    /// The store for accounts and balances.
    pub accounts: A,
    /// The store for credit cards.
    pub cards: C,
    /// The store for categories.
    pub categories: G,
    /// The store for transactions and transaction groups.
    pub transactions: T,
}

impl<A, C, G, T> LedgerService<A, C, G, T>
where
    A: AccountStore,
    C: CardStore,
    G: CategoryStore,
    T: TransactionStore,
{
    /// Create a new service over the given stores.
    pub fn new(config: LedgerConfig, accounts: A, cards: C, categories: G, transactions: T) -> Self {
        Self {
            config,
            accounts,
            cards,
            categories,
            transactions,
        }
    }

    /// Move `amount_cents` from `source_id` to `destination_id`.
    ///
    /// See [TransferExecutor::execute] for the failure semantics. The
    /// returned outcome carries both final balances, a negative-balance
    /// advisory when the source was overdrawn, and whether the paired history
    /// entries were written.
    ///
    /// # Errors
    /// Propagates the [TransferExecutor] errors unchanged; in particular
    /// [Error::CompensationFailed] is never masked because it signals that
    /// manual reconciliation may be needed.
    pub fn transfer(
        &mut self,
        user_id: UserId,
        source_id: AccountId,
        destination_id: AccountId,
        amount_cents: i64,
        date: Date,
        description: &str,
    ) -> Result<TransferOutcome, Error> {
        TransferExecutor::new(&mut self.accounts, &mut self.transactions).execute(
            user_id,
            source_id,
            destination_id,
            amount_cents,
            date,
            description,
        )
    }

    /// Persist a single transaction with no expansion.
    ///
    /// A settled entry booked against an account also moves that account's
    /// stored balance, keeping it consistent with the entry log.
    ///
    /// # Errors
    /// Returns the store errors of the insert, [Error::AccountNotFound] /
    /// [Error::CardNotFound] / [Error::CardInactive] for bad references, or
    /// [Error::InvalidForeignKey] for a category the user does not own.
    pub fn create_simple_transaction(
        &mut self,
        user_id: UserId,
        draft: TransactionDraft,
    ) -> Result<Transaction, Error> {
        self.check_references(user_id, &draft)?;

        let transaction = self.transactions.insert(user_id, draft)?;
        self.apply_created_settlement(user_id, &transaction)?;

        Ok(transaction)
    }

    /// Expand a recurring intent into dated instances and persist them all at
    /// once.
    ///
    /// Every instance shares one freshly-created group ID; the batch insert
    /// is atomic, so a failure part-way leaves no instances behind. If the
    /// first instance is settled and booked against an account, the account
    /// balance moves with it.
    ///
    /// # Errors
    /// Returns [Error::InvalidSchedule] for a count outside `1..=`
    /// [crate::ledger::MAX_OCCURRENCES], or the reference/store errors of
    /// [LedgerService::create_simple_transaction].
    pub fn create_recurring_transaction(
        &mut self,
        user_id: UserId,
        template: TransactionDraft,
        start: Date,
        frequency: Frequency,
        count: u32,
        first_settled: bool,
    ) -> Result<Vec<Transaction>, Error> {
        self.check_references(user_id, &template)?;

        let drafts = expand(&template, start, frequency, count, first_settled)?;

        let group_id = self.transactions.create_group(user_id)?;
        let drafts = drafts
            .into_iter()
            .map(|draft| draft.group(group_id))
            .collect();

        let transactions = self.transactions.insert_batch(user_id, drafts)?;

        for transaction in &transactions {
            self.apply_created_settlement(user_id, transaction)?;
        }

        Ok(transactions)
    }

    /// Split a card purchase into installments, one per consecutive
    /// statement, and persist them all at once.
    ///
    /// Every installment shares one freshly-created group ID, carries its
    /// `(k/count)` position, and is billed to the due date of its statement
    /// cycle. Installment rows are card-only planned entries; they never
    /// touch an account balance.
    ///
    /// # Errors
    /// Returns [Error::CardNotFound] / [Error::CardInactive] for a bad card,
    /// [Error::InstallmentMinimumNotMet] or [Error::InvalidSchedule] from the
    /// planner, [Error::InvalidForeignKey] for a category the user does not
    /// own, or the store errors of the batch insert.
    pub fn create_installment_purchase(
        &mut self,
        user_id: UserId,
        card_id: CardId,
        purchase_date: Date,
        total_amount_cents: i64,
        count: u32,
        description: &str,
        category_id: Option<CategoryId>,
    ) -> Result<Vec<Transaction>, Error> {
        let card = self.cards.get(user_id, card_id)?;
        if let Some(category_id) = category_id {
            self.check_category(user_id, category_id)?;
        }

        let installments = plan_installments(
            &card,
            purchase_date,
            total_amount_cents,
            count,
            self.config.minimum_installment_cents,
        )?;

        let group_id = self.transactions.create_group(user_id)?;
        let drafts = installments
            .iter()
            .map(|installment| {
                let description = if count > 1 {
                    format!("{description} ({}/{count})", installment.number)
                } else {
                    description.to_string()
                };

                Transaction::draft(
                    installment.amount_cents,
                    TransactionKind::Expense,
                    purchase_date,
                    &description,
                )
                .card(card_id)
                .group(group_id)
                .installment(installment.number, count)
                .statement_due_date(installment.due_date)
                .category(category_id)
            })
            .collect();

        self.transactions.insert_batch(user_id, drafts)
    }

    /// Flip a transaction's settlement flag and keep the owning account's
    /// stored balance in step.
    ///
    /// Settling an account-booked entry applies its signed amount to the
    /// balance; un-settling reverses it. Flipping to the current value is a
    /// no-op.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if `id` does not resolve to a transaction
    /// owned by `user_id`.
    pub fn settle_transaction(
        &mut self,
        user_id: UserId,
        id: TransactionId,
        settled: bool,
    ) -> Result<Transaction, Error> {
        let before = self.transactions.get(user_id, id)?;
        if before.settled == settled {
            return Ok(before);
        }

        let after = self.transactions.set_settled(user_id, id, settled)?;

        if let Some(account_id) = after.account_id {
            let delta = if settled {
                after.signed_amount_cents()
            } else {
                -after.signed_amount_cents()
            };
            apply_delta(&mut self.accounts, user_id, account_id, delta)?;
        }

        Ok(after)
    }

    fn check_references(&self, user_id: UserId, draft: &TransactionDraft) -> Result<(), Error> {
        if let Some(account_id) = draft.account_id {
            self.accounts.get(user_id, account_id)?;
        }

        if let Some(card_id) = draft.card_id {
            let card = self.cards.get(user_id, card_id)?;
            if !card.active {
                return Err(Error::CardInactive(card_id));
            }
        }

        if let Some(category_id) = draft.category_id {
            self.check_category(user_id, category_id)?;
        }

        Ok(())
    }

    fn check_category(&self, user_id: UserId, category_id: CategoryId) -> Result<(), Error> {
        self.categories
            .get(user_id, category_id)
            .map_err(|error| match error {
                // The category either does not exist or belongs to another
                // user; the caller gets the same answer for both so account
                // enumeration is not possible.
                Error::NotFound => Error::InvalidForeignKey,
                error => error,
            })?;

        Ok(())
    }

    fn apply_created_settlement(
        &mut self,
        user_id: UserId,
        transaction: &Transaction,
    ) -> Result<(), Error> {
        if !transaction.settled {
            return Ok(());
        }

        if let Some(account_id) = transaction.account_id {
            apply_delta(
                &mut self.accounts,
                user_id,
                account_id,
                transaction.signed_amount_cents(),
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod ledger_service_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use crate::{
        Error,
        ledger::{Advisory, Frequency, HistoryOutcome, LedgerConfig},
        models::{Transaction, TransactionKind, UserId},
        stores::{
            AccountStore, CardStore, CategoryStore, TransactionQuery, TransactionStore,
            sqlite::{SqliteLedgerService, create_ledger_service},
        },
    };

    fn get_test_service() -> SqliteLedgerService {
        let conn = Connection::open_in_memory().unwrap();
        create_ledger_service(conn, LedgerConfig::default()).unwrap()
    }

    #[test]
    fn transfer_end_to_end_overdraws_with_advisory_and_linked_entries() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account_a = service.accounts.create(user_id, "A", 500).unwrap();
        let account_b = service.accounts.create(user_id, "B", 0).unwrap();

        let outcome = service
            .transfer(
                user_id,
                account_a.id,
                account_b.id,
                800,
                date!(2025 - 06 - 01),
                "Rent split",
            )
            .expect("the transfer should succeed despite overdrawing A");

        assert_eq!(outcome.source_balance_cents, -300);
        assert_eq!(outcome.destination_balance_cents, 800);
        assert_eq!(
            outcome.advisory,
            Some(Advisory::NegativeBalance {
                account_id: account_a.id,
                balance_cents: -300,
            })
        );

        let HistoryOutcome::Written { group_id } = outcome.history else {
            panic!("the history entries should have been written");
        };
        let entries = service
            .transactions
            .get_query(
                user_id,
                TransactionQuery {
                    group_id: Some(group_id),
                    ..Default::default()
                },
            )
            .unwrap();
        assert_eq!(entries.len(), 2);

        assert_eq!(
            service.accounts.get(user_id, account_a.id).unwrap().balance_cents,
            -300
        );
        assert_eq!(
            service.accounts.get(user_id, account_b.id).unwrap().balance_cents,
            800
        );
    }

    #[test]
    fn create_simple_transaction_moves_the_balance_when_settled() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account = service.accounts.create(user_id, "Checking", 10_000).unwrap();

        service
            .create_simple_transaction(
                user_id,
                Transaction::draft(
                    2_500,
                    TransactionKind::Expense,
                    date!(2025 - 06 - 01),
                    "Groceries",
                )
                .account(account.id)
                .settled(true),
            )
            .unwrap();

        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            7_500
        );
    }

    #[test]
    fn create_simple_transaction_leaves_the_balance_when_planned() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account = service.accounts.create(user_id, "Checking", 10_000).unwrap();

        service
            .create_simple_transaction(
                user_id,
                Transaction::draft(
                    2_500,
                    TransactionKind::Expense,
                    date!(2025 - 07 - 01),
                    "Scheduled bill",
                )
                .account(account.id),
            )
            .unwrap();

        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            10_000
        );
    }

    #[test]
    fn create_simple_transaction_rejects_foreign_categories() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let other_users_category = service.categories.create(UserId::new(2), "Theirs").unwrap();

        let result = service.create_simple_transaction(
            user_id,
            Transaction::draft(100, TransactionKind::Expense, date!(2025 - 06 - 01), "")
                .category(Some(other_users_category.id)),
        );

        assert_eq!(result, Err(Error::InvalidForeignKey));
    }

    #[test]
    fn recurring_series_shares_a_group_and_settles_only_the_first_instance() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account = service.accounts.create(user_id, "Checking", 50_000).unwrap();

        let instances = service
            .create_recurring_transaction(
                user_id,
                Transaction::draft(
                    8_990,
                    TransactionKind::Expense,
                    date!(2025 - 01 - 15),
                    "Gym membership",
                )
                .account(account.id),
                date!(2025 - 01 - 15),
                Frequency::Monthly,
                12,
                true,
            )
            .unwrap();

        assert_eq!(instances.len(), 12);

        let group_id = instances[0].group_id.expect("instances must carry a group");
        assert!(
            instances
                .iter()
                .all(|instance| instance.group_id == Some(group_id)),
            "all instances must share one group ID"
        );

        assert!(instances[0].settled);
        assert!(instances[1..].iter().all(|instance| !instance.settled));

        // Only the settled first instance moved the balance.
        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            50_000 - 8_990
        );
    }

    #[test]
    fn recurring_series_rejects_out_of_range_counts_without_rows() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);

        let result = service.create_recurring_transaction(
            user_id,
            Transaction::draft(100, TransactionKind::Expense, date!(2025 - 01 - 15), ""),
            date!(2025 - 01 - 15),
            Frequency::Monthly,
            61,
            false,
        );

        assert!(matches!(result, Err(Error::InvalidSchedule(_))));
        let rows = service
            .transactions
            .get_query(user_id, TransactionQuery::default())
            .unwrap();
        assert_eq!(rows, []);
    }

    #[test]
    fn installment_purchase_creates_linked_card_entries() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let card = service
            .cards
            .create(user_id, "Platinum", 28, 10, 500_000)
            .unwrap();

        let installments = service
            .create_installment_purchase(
                user_id,
                card.id,
                date!(2025 - 03 - 05),
                89_990,
                6,
                "Headphones",
                None,
            )
            .unwrap();

        assert_eq!(installments.len(), 6);

        let group_id = installments[0].group_id.unwrap();
        assert!(
            installments
                .iter()
                .all(|installment| installment.group_id == Some(group_id))
        );

        let total: i64 = installments
            .iter()
            .map(|installment| installment.amount_cents)
            .sum();
        assert_eq!(total, 89_990);

        assert_eq!(installments[0].installment_number, Some(1));
        assert_eq!(installments[0].installment_total, Some(6));
        assert_eq!(installments[0].description, "Headphones (1/6)");
        assert_eq!(installments[0].statement_due_date, Some(date!(2025 - 04 - 10)));
        assert_eq!(installments[5].statement_due_date, Some(date!(2025 - 09 - 10)));
        assert!(
            installments
                .iter()
                .all(|installment| installment.card_id == Some(card.id)
                    && installment.account_id.is_none()
                    && !installment.settled)
        );

        assert_eq!(service.transactions.card_usage(user_id, card.id), Ok(89_990));
    }

    #[test]
    fn installment_purchase_on_an_inactive_card_fails() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let card = service
            .cards
            .create(user_id, "Platinum", 28, 10, 500_000)
            .unwrap();
        service.cards.deactivate(user_id, card.id).unwrap();

        let result = service.create_installment_purchase(
            user_id,
            card.id,
            date!(2025 - 03 - 05),
            89_990,
            6,
            "Headphones",
            None,
        );

        assert_eq!(result, Err(Error::CardInactive(card.id)));
    }

    #[test]
    fn settle_transaction_moves_the_balance_in_both_directions() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account = service.accounts.create(user_id, "Checking", 10_000).unwrap();
        let transaction = service
            .create_simple_transaction(
                user_id,
                Transaction::draft(
                    3_000,
                    TransactionKind::Expense,
                    date!(2025 - 06 - 01),
                    "Planned bill",
                )
                .account(account.id),
            )
            .unwrap();

        let settled = service
            .settle_transaction(user_id, transaction.id, true)
            .unwrap();
        assert!(settled.settled);
        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            7_000
        );

        let unsettled = service
            .settle_transaction(user_id, transaction.id, false)
            .unwrap();
        assert!(!unsettled.settled);
        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            10_000
        );
    }

    #[test]
    fn settle_transaction_is_a_noop_when_the_flag_matches() {
        let mut service = get_test_service();
        let user_id = UserId::new(1);
        let account = service.accounts.create(user_id, "Checking", 10_000).unwrap();
        let transaction = service
            .create_simple_transaction(
                user_id,
                Transaction::draft(
                    3_000,
                    TransactionKind::Expense,
                    date!(2025 - 06 - 01),
                    "",
                )
                .account(account.id)
                .settled(true),
            )
            .unwrap();

        service
            .settle_transaction(user_id, transaction.id, true)
            .unwrap();

        assert_eq!(
            service.accounts.get(user_id, account.id).unwrap().balance_cents,
            7_000,
            "re-settling must not apply the delta twice"
        );
    }
}
