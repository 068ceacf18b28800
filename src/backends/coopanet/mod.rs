//! Coopanet banking portal backend (www.coopanet.com).
//!
//! Credentialed site. Every capability method guards on the session
//! state: a call issued while logged out logs in first, and a session
//! dropped server-side (any navigation landing back on the login page)
//! triggers exactly one re-login and one retry before giving up.

mod pages;

use crate::backends::Backend;
use crate::browser::{Browser, HttpTransport, MAX_PAGES, Page, Router, Transport};
use crate::capabilities::{Account, BankProvider, Transaction};
use crate::config::{CredentialsConfig, HttpConfig};
use crate::error::AdapterError;
use async_trait::async_trait;
use std::sync::Arc;

const BACKEND_NAME: &str = "coopanet";
const BASE_URL: &str = "https://www.coopanet.com";

/// Page handlers of the coopanet portal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoopanetPage {
    Login,
    Accounts,
    Transactions,
}

fn router() -> Router<CoopanetPage> {
    Router::new()
        .route(r"https://www\.coopanet\.com/banque/sso/.*", CoopanetPage::Login)
        .route(
            r"https://www\.coopanet\.com/banque/cpt/incoopanetj2ee\.do.*",
            CoopanetPage::Accounts,
        )
        .route(
            r"https://www\.coopanet\.com/banque/cpt/cpt/situationcomptes\.do.*",
            CoopanetPage::Transactions,
        )
        .route(
            r"https://www\.coopanet\.com/banque/cpt/cpt/relevecompte\.do.*",
            CoopanetPage::Transactions,
        )
}

/// Banking backend.
pub struct CoopanetBackend {
    browser: Browser<CoopanetPage>,
    username: String,
    password: String,
}

impl CoopanetBackend {
    pub fn new(http: &HttpConfig, config: &CredentialsConfig) -> Result<Self, AdapterError> {
        let transport = HttpTransport::new(
            &http.user_agent,
            http.timeout_secs,
            http.delay_between_requests_sec,
        )?;
        Ok(Self::with_transport(Arc::new(transport), config))
    }

    pub fn with_transport(transport: Arc<dyn Transport>, config: &CredentialsConfig) -> Self {
        Self {
            browser: Browser::new(transport, router()),
            username: config.username.clone(),
            password: config.password.clone(),
        }
    }

    /// Authenticates with the stored credentials. No-op when a valid
    /// session already exists.
    async fn login(&self) -> Result<(), AdapterError> {
        if self.browser.is_logged_in() {
            return Ok(());
        }

        let page = self
            .browser
            .submit_form(
                &format!("{}/banque/sso/auth.do", BASE_URL),
                vec![
                    ("codeUtilisateur".to_string(), self.username.clone()),
                    ("codeConfidentiel".to_string(), self.password.clone()),
                ],
            )
            .await?;

        if page.kind == CoopanetPage::Login {
            return Err(AdapterError::Authentication(
                "credentials rejected".to_string(),
            ));
        }

        self.browser.set_logged_in(true);
        Ok(())
    }

    /// Navigates with the login guard: ensures a session first, then
    /// re-logs in at most once if the server dropped it.
    async fn navigate_authed(&self, url: &str) -> Result<Page<CoopanetPage>, AdapterError> {
        self.login().await?;

        let page = self.browser.navigate(url).await?;
        if page.kind != CoopanetPage::Login {
            return Ok(page);
        }

        // Session invalidated server-side: one re-login, one retry.
        self.browser.set_logged_in(false);
        self.login().await?;

        let page = self.browser.navigate(url).await?;
        if page.kind == CoopanetPage::Login {
            return Err(AdapterError::Authentication(
                "session rejected after re-login".to_string(),
            ));
        }
        Ok(page)
    }

    fn accounts_url() -> String {
        format!("{}/banque/cpt/incoopanetj2ee.do?ssomode=ok", BASE_URL)
    }

    fn history_url(account_id: &str) -> String {
        format!(
            "{}/banque/cpt/cpt/situationcomptes.do?lnkReleveAction=X&numeroExterne={}",
            BASE_URL, account_id
        )
    }
}

impl Backend for CoopanetBackend {
    fn name(&self) -> &'static str {
        BACKEND_NAME
    }

    fn as_bank(&self) -> Option<&dyn BankProvider> {
        Some(self)
    }
}

#[async_trait]
impl BankProvider for CoopanetBackend {
    async fn iter_accounts(&self) -> Result<Vec<Account>, AdapterError> {
        let page = self.navigate_authed(&Self::accounts_url()).await?;
        pages::parse_accounts(&page.body, BACKEND_NAME)
    }

    async fn get_account(&self, id: &str) -> Result<Option<Account>, AdapterError> {
        let accounts = self.iter_accounts().await?;
        Ok(accounts.into_iter().find(|account| account.id == id))
    }

    async fn iter_history(&self, account_id: &str) -> Result<Vec<Transaction>, AdapterError> {
        let mut transactions = Vec::new();
        let mut next = Some(Self::history_url(account_id));
        let mut page_count = 0u32;

        while let Some(url) = next {
            page_count += 1;
            if page_count > MAX_PAGES {
                break;
            }

            let page = self.navigate_authed(&url).await?;
            if page.kind != CoopanetPage::Transactions {
                return Err(AdapterError::UnroutableResponse { url: page.url });
            }

            let (batch, following) =
                pages::parse_transactions(&page.body, account_id, BACKEND_NAME)?;
            transactions.extend(batch);
            next = following;
        }

        Ok(transactions)
    }
}
