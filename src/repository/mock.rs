//! In-memory repositories for tests
//!
//! Writes made through a transaction are staged on the [`MockTx`] and only
//! reach the store on commit. Counters and failure switches let tests check
//! exactly which storage calls an orchestration made.

use super::*;
use std::sync::Mutex;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};

use crate::error::ErrorKind;

#[derive(Debug)]
enum Staged {
    Account(Account),
    Balance { account_id: String, balance: i64 },
    Transfer(Transfer),
}

pub struct MockTx {
    pub id: u64,
    staged: Vec<Staged>,
}

impl MockTx {
    fn staged_balance(&self, account_id: &str) -> Option<i64> {
        self.staged.iter().rev().find_map(|s| match s {
            Staged::Balance {
                account_id: id,
                balance,
            } if id == account_id => Some(*balance),
            _ => None,
        })
    }
}

pub struct MockBackend;

impl Backend for MockBackend {
    type Tx = MockTx;
    type Accounts = MockRepository;
    type Transfers = MockRepository;
    type Transactions = MockRepository;
}

#[derive(Default)]
struct Store {
    accounts: Vec<Account>,
    transfers: Vec<Transfer>,
}

impl Store {
    fn apply(&mut self, op: Staged) {
        match op {
            Staged::Account(account) => self.accounts.push(account),
            Staged::Balance {
                account_id,
                balance,
            } => {
                if let Some(acc) = self.accounts.iter_mut().find(|a| a.id() == account_id) {
                    *acc = Account::restore(
                        acc.id().to_string(),
                        acc.name().to_string(),
                        acc.document().to_string(),
                        acc.secret_hash().to_string(),
                        balance,
                        acc.created_at(),
                    );
                }
            }
            Staged::Transfer(transfer) => self.transfers.push(transfer),
        }
    }
}

/// One object serving all three repository traits
#[derive(Default)]
pub struct MockRepository {
    store: Mutex<Store>,
    next_tx: AtomicU64,
    begin_count: AtomicUsize,
    commit_count: AtomicUsize,
    rollback_count: AtomicUsize,
    transfer_create_count: AtomicUsize,
    update_balance_count: AtomicUsize,
    fail_transfer_create: Mutex<bool>,
    panic_transfer_create: Mutex<bool>,
    /// Fail the n-th (1-based) balance update
    fail_update_balance_at: Mutex<Option<usize>>,
    fail_health: Mutex<bool>,
    /// Balance committed by a competing writer when the next tx opens
    concurrent_balance_write: Mutex<Option<(String, i64)>>,
    last_account_page: Mutex<Option<(i64, i64)>>,
    last_transfer_page: Mutex<Option<(i64, i64)>>,
}

impl MockRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_accounts(accounts: impl IntoIterator<Item = Account>) -> Arc<Self> {
        let repo = Self::default();
        repo.store.lock().unwrap().accounts.extend(accounts);
        Arc::new(repo)
    }

    pub fn repositories(self: &Arc<Self>) -> Repositories<MockBackend> {
        Repositories::new(Arc::clone(self), Arc::clone(self), Arc::clone(self))
    }

    pub fn account(&self, id: &str) -> Option<Account> {
        let store = self.store.lock().unwrap();
        store.accounts.iter().find(|a| a.id() == id).cloned()
    }

    pub fn transfers(&self) -> Vec<Transfer> {
        self.store.lock().unwrap().transfers.clone()
    }

    pub fn set_fail_transfer_create(&self, fail: bool) {
        *self.fail_transfer_create.lock().unwrap() = fail;
    }

    pub fn set_panic_transfer_create(&self, panic: bool) {
        *self.panic_transfer_create.lock().unwrap() = panic;
    }

    pub fn set_fail_update_balance_at(&self, call: Option<usize>) {
        *self.fail_update_balance_at.lock().unwrap() = call;
    }

    pub fn set_fail_health(&self, fail: bool) {
        *self.fail_health.lock().unwrap() = fail;
    }

    /// On the next `begin_tx`, overwrite a stored balance as if another
    /// transfer had committed after the accounts were loaded.
    pub fn set_concurrent_balance_write(&self, account_id: &str, balance: i64) {
        *self.concurrent_balance_write.lock().unwrap() = Some((account_id.to_string(), balance));
    }

    pub fn begin_count(&self) -> usize {
        self.begin_count.load(Ordering::SeqCst)
    }

    pub fn commit_count(&self) -> usize {
        self.commit_count.load(Ordering::SeqCst)
    }

    pub fn rollback_count(&self) -> usize {
        self.rollback_count.load(Ordering::SeqCst)
    }

    pub fn transfer_create_count(&self) -> usize {
        self.transfer_create_count.load(Ordering::SeqCst)
    }

    pub fn update_balance_count(&self) -> usize {
        self.update_balance_count.load(Ordering::SeqCst)
    }

    pub fn last_account_page(&self) -> Option<(i64, i64)> {
        *self.last_account_page.lock().unwrap()
    }

    pub fn last_transfer_page(&self) -> Option<(i64, i64)> {
        *self.last_transfer_page.lock().unwrap()
    }

    fn write(&self, op: Staged, tx: Option<&mut MockTx>) {
        match tx {
            Some(tx) => tx.staged.push(op),
            None => self.store.lock().unwrap().apply(op),
        }
    }
}

fn page<T: Clone>(items: impl Iterator<Item = T>, limit: i64, offset: i64) -> Vec<T> {
    items
        .skip(offset.max(0) as usize)
        .take(limit.max(0) as usize)
        .collect()
}

#[async_trait]
impl AccountRepository for MockRepository {
    type Tx = MockTx;

    async fn find(&self, limit: i64, offset: i64) -> Result<Vec<Account>, AppError> {
        *self.last_account_page.lock().unwrap() = Some((limit, offset));
        let store = self.store.lock().unwrap();
        Ok(page(store.accounts.iter().cloned(), limit, offset))
    }

    async fn find_by_id(&self, id: &str) -> Result<Account, AppError> {
        self.account(id)
            .ok_or_else(|| AppError::not_found(format!("not found account: {}", id)))
    }

    async fn find_by_document(&self, document: &str) -> Result<Account, AppError> {
        let store = self.store.lock().unwrap();
        store
            .accounts
            .iter()
            .find(|a| a.document() == document)
            .cloned()
            .ok_or_else(|| AppError::not_found(format!("not found account by CPF: {}", document)))
    }

    async fn create(&self, account: &Account, tx: Option<&mut MockTx>) -> Result<(), AppError> {
        {
            let store = self.store.lock().unwrap();
            if store
                .accounts
                .iter()
                .any(|a| a.id() == account.id() || a.document() == account.document())
            {
                return Err(AppError::conflict("account already exists"));
            }
        }
        self.write(Staged::Account(account.clone()), tx);
        Ok(())
    }

    async fn update_balance(
        &self,
        account_id: &str,
        expected_balance: i64,
        new_balance: i64,
        tx: Option<&mut MockTx>,
    ) -> Result<(), AppError> {
        let call = self.update_balance_count.fetch_add(1, Ordering::SeqCst) + 1;
        if *self.fail_update_balance_at.lock().unwrap() == Some(call) {
            return Err(AppError::internal("mock update balance failure"));
        }

        let staged = tx.as_ref().and_then(|t| t.staged_balance(account_id));
        let current = match staged {
            Some(balance) => balance,
            None => self.find_by_id(account_id).await?.balance(),
        };
        if current != expected_balance {
            return Err(AppError::conflict(format!(
                "balance of account {} was modified concurrently",
                account_id
            )));
        }

        self.write(
            Staged::Balance {
                account_id: account_id.to_string(),
                balance: new_balance,
            },
            tx,
        );
        Ok(())
    }
}

#[async_trait]
impl TransferRepository for MockRepository {
    type Tx = MockTx;

    async fn find_by_origin_account_id(
        &self,
        account_id: &str,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<Transfer>, AppError> {
        *self.last_transfer_page.lock().unwrap() = Some((limit, offset));
        let store = self.store.lock().unwrap();
        let sent = store
            .transfers
            .iter()
            .rev()
            .filter(|t| t.origin().id() == account_id)
            .cloned();
        Ok(page(sent, limit, offset))
    }

    async fn create(&self, transfer: &Transfer, tx: Option<&mut MockTx>) -> Result<(), AppError> {
        self.transfer_create_count.fetch_add(1, Ordering::SeqCst);
        if *self.panic_transfer_create.lock().unwrap() {
            panic!("mock transfer create panic");
        }
        if *self.fail_transfer_create.lock().unwrap() {
            return Err(AppError::internal("unexpected number of affected rows"));
        }
        self.write(Staged::Transfer(transfer.clone()), tx);
        Ok(())
    }
}

#[async_trait]
impl TransactionManager for MockRepository {
    type Tx = MockTx;

    async fn begin_tx(&self) -> Result<MockTx, AppError> {
        self.begin_count.fetch_add(1, Ordering::SeqCst);
        if let Some((account_id, balance)) = self.concurrent_balance_write.lock().unwrap().take() {
            self.store
                .lock()
                .unwrap()
                .apply(Staged::Balance { account_id, balance });
        }
        Ok(MockTx {
            id: self.next_tx.fetch_add(1, Ordering::SeqCst),
            staged: Vec::new(),
        })
    }

    async fn commit_tx(&self, tx: MockTx) -> Result<(), AppError> {
        self.commit_count.fetch_add(1, Ordering::SeqCst);
        let mut store = self.store.lock().unwrap();
        for op in tx.staged {
            store.apply(op);
        }
        Ok(())
    }

    async fn rollback_tx(&self, _tx: MockTx) -> Result<(), AppError> {
        self.rollback_count.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn health_check(&self) -> Result<(), AppError> {
        if *self.fail_health.lock().unwrap() {
            return Err(AppError::new(ErrorKind::Internal).add("mock database down"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn account(id: &str, balance: i64) -> Account {
        Account::restore(
            id.into(),
            id.into(),
            format!("doc-{id}"),
            String::new(),
            balance,
            Utc::now(),
        )
    }

    #[tokio::test]
    async fn test_staged_writes_apply_on_commit_only() {
        let repo = MockRepository::with_accounts([account("a", 10)]);

        let mut tx = repo.begin_tx().await.unwrap();
        repo.update_balance("a", 10, 3, Some(&mut tx)).await.unwrap();
        assert_eq!(repo.account("a").unwrap().balance(), 10);

        repo.commit_tx(tx).await.unwrap();
        assert_eq!(repo.account("a").unwrap().balance(), 3);
    }

    #[tokio::test]
    async fn test_rollback_discards_writes() {
        let repo = MockRepository::with_accounts([account("a", 10)]);

        let mut tx = repo.begin_tx().await.unwrap();
        repo.update_balance("a", 10, 3, Some(&mut tx)).await.unwrap();
        repo.rollback_tx(tx).await.unwrap();

        assert_eq!(repo.account("a").unwrap().balance(), 10);
        assert_eq!(repo.rollback_count(), 1);
    }

    #[tokio::test]
    async fn test_stale_expected_balance_conflicts() {
        let repo = MockRepository::with_accounts([account("a", 10)]);
        let err = repo.update_balance("a", 9, 3, None).await.unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[tokio::test]
    async fn test_duplicate_account_conflicts() {
        let repo = MockRepository::with_accounts([account("a", 10)]);
        let err = AccountRepository::create(&*repo, &account("a", 0), None)
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }
}
