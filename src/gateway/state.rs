use std::sync::Arc;

use crate::auth::JwtService;
use crate::repository::{Backend, Repositories};
use crate::usecase::{
    CreateAccount, FindAccounts, FindBalance, FindTransfers, Login, MakeTransfer,
};

/// Gateway shared state
pub struct AppState<B: Backend> {
    pub jwt: JwtService,
    pub transactions: Arc<B::Transactions>,
    pub create_account: CreateAccount<B::Accounts>,
    pub find_accounts: FindAccounts<B::Accounts>,
    pub find_balance: FindBalance<B::Accounts>,
    pub login: Login<B::Accounts>,
    pub make_transfer: MakeTransfer<B>,
    pub find_transfers: FindTransfers<B::Transfers>,
}

impl<B: Backend> AppState<B> {
    pub fn new(repos: Repositories<B>, jwt: JwtService) -> Self {
        Self {
            create_account: CreateAccount::new(repos.accounts.clone()),
            find_accounts: FindAccounts::new(repos.accounts.clone()),
            find_balance: FindBalance::new(repos.accounts.clone()),
            login: Login::new(repos.accounts.clone(), jwt.clone()),
            find_transfers: FindTransfers::new(repos.transfers.clone()),
            transactions: repos.transactions.clone(),
            make_transfer: MakeTransfer::new(repos),
            jwt,
        }
    }
}
