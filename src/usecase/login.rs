//! Login by CPF and secret, answered with a session token

use serde::Serialize;
use std::sync::Arc;

use crate::auth::JwtService;
use crate::entity::document;
use crate::error::AppError;
use crate::repository::AccountRepository;

#[derive(Debug, Clone)]
pub struct LoginInput {
    pub cpf: String,
    pub secret: String,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct LoginOutput {
    pub token: String,
}

pub struct Login<A> {
    accounts: Arc<A>,
    jwt: JwtService,
}

impl<A: AccountRepository> Login<A> {
    pub fn new(accounts: Arc<A>, jwt: JwtService) -> Self {
        Self { accounts, jwt }
    }

    pub async fn execute(&self, input: LoginInput) -> Result<LoginOutput, AppError> {
        let account = self
            .accounts
            .find_by_document(&document::clean(&input.cpf))
            .await?;

        if !account.secret_is_correct(&input.secret) {
            tracing::info!(account_id = %account.id(), "login rejected");
            return Err(AppError::unauthorized("secret is incorrect"));
        }

        let token = self.jwt.issue(account.id())?;
        Ok(LoginOutput { token })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::Account;
    use crate::error::ErrorKind;
    use crate::repository::mock::MockRepository;
    use chrono::Utc;

    fn setup() -> (Login<MockRepository>, JwtService, String) {
        let acc = Account::new(None, "Lucas", "111.444.777-35", "s3cret", 0, Some(Utc::now()))
            .unwrap();
        let id = acc.id().to_string();
        let jwt = JwtService::new("test-secret", 24);
        let uc = Login::new(MockRepository::with_accounts([acc]), jwt.clone());
        (uc, jwt, id)
    }

    #[tokio::test]
    async fn test_login_issues_token_for_account() {
        let (uc, jwt, id) = setup();

        let out = uc
            .execute(LoginInput {
                cpf: "111.444.777-35".into(),
                secret: "s3cret".into(),
            })
            .await
            .unwrap();

        assert_eq!(jwt.verify(&out.token).unwrap().sub, id);
    }

    #[tokio::test]
    async fn test_plain_cpf_accepted() {
        let (uc, _, _) = setup();
        let out = uc
            .execute(LoginInput {
                cpf: "11144477735".into(),
                secret: "s3cret".into(),
            })
            .await;
        assert!(out.is_ok());
    }

    #[tokio::test]
    async fn test_wrong_secret_unauthorized() {
        let (uc, _, _) = setup();

        let err = uc
            .execute(LoginInput {
                cpf: "111.444.777-35".into(),
                secret: "wrong".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::Unauthorized);
        assert_eq!(err.to_string(), "secret is incorrect");
    }

    #[tokio::test]
    async fn test_unknown_document_not_found() {
        let (uc, _, _) = setup();

        let err = uc
            .execute(LoginInput {
                cpf: "529.982.247-25".into(),
                secret: "s3cret".into(),
            })
            .await
            .unwrap_err();

        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}
