//! crates/campus_vault_core/src/accounts.rs
//!
//! The account directory maps identity-provider emails to portal roles, and
//! provisions the demo accounts used in development.

use serde::Serialize;
use std::sync::Arc;
use tokio::sync::Mutex;
use tracing::info;
use utoipa::ToSchema;

use crate::domain::{Account, Role};
use crate::ports::{KeyValueStore, PortResult};
use crate::store::{read_json, write_json};

pub const ACCOUNTS_KEY: &str = "campus_accounts";

const DEMO_ACCOUNTS: [(&str, &str, Role); 3] = [
    ("admin@campus.edu", "Admin User", Role::Admin),
    ("teacher@campus.edu", "Prof. Kumar", Role::Teacher),
    ("student@campus.edu", "Student Demo", Role::Student),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SeedStatus {
    Created,
    Exists,
}

/// What seeding did for one demo account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
pub struct SeedResult {
    pub email: String,
    pub status: SeedStatus,
    pub role: Role,
}

pub struct AccountDirectory {
    store: Arc<dyn KeyValueStore>,
    lock: Mutex<()>,
}

impl AccountDirectory {
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self {
            store,
            lock: Mutex::new(()),
        }
    }

    async fn load(&self) -> PortResult<Vec<Account>> {
        Ok(read_json(self.store.as_ref(), ACCOUNTS_KEY)
            .await?
            .unwrap_or_default())
    }

    pub async fn find_by_email(&self, email: &str) -> PortResult<Option<Account>> {
        let _guard = self.lock.lock().await;
        let email = email.trim();
        Ok(self
            .load()
            .await?
            .into_iter()
            .find(|a| a.email.eq_ignore_ascii_case(email)))
    }

    /// Provisions the three demo accounts. Safe to call repeatedly: existing
    /// accounts are reported as `Exists` and get their demo role re-applied.
    pub async fn seed_demo_accounts(&self) -> PortResult<Vec<SeedResult>> {
        let _guard = self.lock.lock().await;
        let mut accounts = self.load().await?;
        let mut results = Vec::with_capacity(DEMO_ACCOUNTS.len());

        for (email, name, role) in DEMO_ACCOUNTS {
            let status = match accounts
                .iter_mut()
                .find(|a| a.email.eq_ignore_ascii_case(email))
            {
                Some(existing) => {
                    existing.role = role;
                    SeedStatus::Exists
                }
                None => {
                    accounts.push(Account {
                        email: email.to_string(),
                        name: name.to_string(),
                        role,
                    });
                    SeedStatus::Created
                }
            };
            results.push(SeedResult {
                email: email.to_string(),
                status,
                role,
            });
        }

        write_json(self.store.as_ref(), ACCOUNTS_KEY, &accounts).await?;
        let created = results
            .iter()
            .filter(|r| r.status == SeedStatus::Created)
            .count();
        info!("Demo account seeding finished: {} created.", created);
        Ok(results)
    }
}
