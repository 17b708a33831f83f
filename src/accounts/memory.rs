use std::collections::HashMap;

use async_trait::async_trait;
use time::OffsetDateTime;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::accounts::{
    model::{Account, NewAccount, ProfileField},
    repo::{AccountStore, StoreError},
};

#[derive(Default)]
struct Inner {
    accounts: Vec<Account>,
    tokens: HashMap<String, Uuid>,
}

/// Mirrors the unique constraints of the `accounts` table.
#[derive(Default)]
pub struct MemoryAccountStore {
    inner: RwLock<Inner>,
}

impl MemoryAccountStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Test hook for flipping flags the HTTP surface never touches.
    pub async fn set_active(&self, account_id: Uuid, active: bool) {
        let mut inner = self.inner.write().await;
        if let Some(a) = inner.accounts.iter_mut().find(|a| a.id == account_id) {
            a.is_active = active;
        }
    }
}

const UNIQUE_FIELDS: [ProfileField; 4] = [
    ProfileField::Username,
    ProfileField::NomorInduk,
    ProfileField::NomorHp,
    ProfileField::NamaToko,
];

fn taken(accounts: &[Account], skip: Option<Uuid>, field: ProfileField, value: &str) -> bool {
    accounts
        .iter()
        .filter(|a| Some(a.id) != skip)
        .any(|a| field.current(a) == Some(value))
}

#[async_trait]
impl AccountStore for MemoryAccountStore {
    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        Ok(self.inner.read().await.accounts.clone())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.iter().find(|a| a.email == email).cloned())
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner.accounts.iter().find(|a| a.username == username).cloned())
    }

    async fn find_by_token(&self, key: &str) -> Result<Option<Account>, StoreError> {
        let inner = self.inner.read().await;
        let Some(id) = inner.tokens.get(key) else {
            return Ok(None);
        };
        Ok(inner.accounts.iter().find(|a| a.id == *id).cloned())
    }

    async fn token_for(&self, account_id: Uuid) -> Result<Option<String>, StoreError> {
        let inner = self.inner.read().await;
        Ok(inner
            .tokens
            .iter()
            .find(|(_, id)| **id == account_id)
            .map(|(k, _)| k.clone()))
    }

    async fn create_with_token(
        &self,
        account: NewAccount,
        token: &str,
    ) -> Result<Account, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.accounts.iter().any(|a| a.email == account.email) {
            return Err(StoreError::Conflict("email"));
        }
        if taken(&inner.accounts, None, ProfileField::Username, &account.username) {
            return Err(StoreError::Conflict("username"));
        }
        let created = Account {
            id: Uuid::new_v4(),
            email: account.email,
            username: account.username,
            password_hash: account.password_hash,
            role: account.role,
            nama_lengkap: None,
            nomor_induk: None,
            angkatan: None,
            jurusan: None,
            nama_panggilan: None,
            nomor_hp: None,
            nama_toko: None,
            tipe_dagangan: None,
            privilege: account.privilege,
            is_active: true,
            date_joined: OffsetDateTime::now_utc(),
            last_login: None,
        };
        inner.tokens.insert(token.to_string(), created.id);
        inner.accounts.push(created.clone());
        Ok(created)
    }

    async fn update_field(
        &self,
        account_id: Uuid,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if UNIQUE_FIELDS.contains(&field) && taken(&inner.accounts, Some(account_id), field, value) {
            return Err(StoreError::Conflict(field.key()));
        }
        if let Some(a) = inner.accounts.iter_mut().find(|a| a.id == account_id) {
            field.assign(a, value)?;
        }
        Ok(())
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(a) = inner.accounts.iter_mut().find(|a| a.id == account_id) {
            a.password_hash = password_hash.to_string();
        }
        Ok(())
    }

    async fn touch_last_login(
        &self,
        account_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        let mut inner = self.inner.write().await;
        if let Some(a) = inner.accounts.iter_mut().find(|a| a.id == account_id) {
            a.last_login = Some(at);
        }
        Ok(())
    }
}
