use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use thiserror::Error;
use time::OffsetDateTime;
use uuid::Uuid;

use crate::{
    accounts::model::{Account, GoodsCategory, NewAccount, ProfileField},
    error::AppError,
};

#[derive(Debug, Error)]
pub enum StoreError {
    /// A unique constraint rejected the write; carries the request field key.
    #[error("{0} already exists")]
    Conflict(&'static str),

    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

#[async_trait]
pub trait AccountStore: Send + Sync {
    async fn list(&self) -> Result<Vec<Account>, StoreError>;
    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError>;
    async fn find_by_token(&self, key: &str) -> Result<Option<Account>, StoreError>;
    async fn token_for(&self, account_id: Uuid) -> Result<Option<String>, StoreError>;

    /// Inserts the account and its token as one unit.
    async fn create_with_token(
        &self,
        account: NewAccount,
        token: &str,
    ) -> Result<Account, StoreError>;

    async fn update_field(
        &self,
        account_id: Uuid,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError>;
    async fn update_password(&self, account_id: Uuid, password_hash: &str)
        -> Result<(), StoreError>;
    async fn touch_last_login(&self, account_id: Uuid, at: OffsetDateTime)
        -> Result<(), StoreError>;
}

#[derive(Debug, FromRow)]
struct AccountRow {
    id: Uuid,
    email: String,
    username: String,
    password_hash: String,
    role: String,
    nama_lengkap: Option<String>,
    nama_panggilan: Option<String>,
    nomor_induk: Option<String>,
    nomor_hp: Option<String>,
    angkatan: Option<String>,
    jurusan: Option<String>,
    nama_toko: Option<String>,
    tipe_dagangan: Option<String>,
    privilege: String,
    is_active: bool,
    date_joined: OffsetDateTime,
    last_login: Option<OffsetDateTime>,
}

impl TryFrom<AccountRow> for Account {
    type Error = anyhow::Error;

    fn try_from(r: AccountRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            email: r.email,
            username: r.username,
            password_hash: r.password_hash,
            role: r.role.parse()?,
            nama_lengkap: r.nama_lengkap,
            nomor_induk: r.nomor_induk,
            angkatan: r.angkatan,
            jurusan: r.jurusan,
            nama_panggilan: r.nama_panggilan,
            nomor_hp: r.nomor_hp,
            nama_toko: r.nama_toko,
            tipe_dagangan: r
                .tipe_dagangan
                .as_deref()
                .map(|s| s.parse::<GoodsCategory>())
                .transpose()?,
            privilege: r.privilege.parse()?,
            is_active: r.is_active,
            date_joined: r.date_joined,
            last_login: r.last_login,
        })
    }
}

const ACCOUNT_COLUMNS: &str = "a.id, a.email, a.username, a.password_hash, a.role, \
     a.nama_lengkap, a.nama_panggilan, a.nomor_induk, a.nomor_hp, a.angkatan, a.jurusan, \
     a.nama_toko, a.tipe_dagangan, a.privilege, a.is_active, a.date_joined, a.last_login";

/// Maps a unique violation to the request field that owns the constraint.
fn classify(err: sqlx::Error, what: &'static str) -> StoreError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            let field = match db_err.constraint() {
                Some("accounts_email_key") => Some("email"),
                Some("accounts_username_key") => Some("username"),
                Some("accounts_nomor_induk_key") => Some("nomorInduk"),
                Some("accounts_nomor_hp_key") => Some("nomorHP"),
                Some("accounts_nama_toko_key") => Some("namaToko"),
                _ => None,
            };
            if let Some(field) = field {
                return StoreError::Conflict(field);
            }
        }
    }
    StoreError::Backend(anyhow::Error::new(err).context(what))
}

#[derive(Clone)]
pub struct PgAccountStore {
    db: PgPool,
}

impl PgAccountStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }

    async fn find_one(
        &self,
        predicate: &str,
        value: &str,
    ) -> Result<Option<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a WHERE {predicate}");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.db)
            .await
            .context("fetch account")?;
        Ok(row.map(Account::try_from).transpose()?)
    }
}

#[async_trait]
impl AccountStore for PgAccountStore {
    async fn list(&self) -> Result<Vec<Account>, StoreError> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts a ORDER BY a.date_joined, a.email");
        let rows = sqlx::query_as::<_, AccountRow>(&sql)
            .fetch_all(&self.db)
            .await
            .context("list accounts")?;
        let accounts = rows
            .into_iter()
            .map(Account::try_from)
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(accounts)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Account>, StoreError> {
        self.find_one("a.email = $1", email).await
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Account>, StoreError> {
        self.find_one("a.username = $1", username).await
    }

    async fn find_by_token(&self, key: &str) -> Result<Option<Account>, StoreError> {
        let sql = format!(
            "SELECT {ACCOUNT_COLUMNS} FROM accounts a \
             JOIN auth_tokens t ON t.account_id = a.id \
             WHERE t.key = $1"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(key)
            .fetch_optional(&self.db)
            .await
            .context("fetch account by token")?;
        Ok(row.map(Account::try_from).transpose()?)
    }

    async fn token_for(&self, account_id: Uuid) -> Result<Option<String>, StoreError> {
        let key = sqlx::query_scalar::<_, String>(
            r#"SELECT key FROM auth_tokens WHERE account_id = $1"#,
        )
        .bind(account_id)
        .fetch_optional(&self.db)
        .await
        .context("fetch token")?;
        Ok(key)
    }

    async fn create_with_token(
        &self,
        account: NewAccount,
        token: &str,
    ) -> Result<Account, StoreError> {
        let mut tx = self.db.begin().await.context("begin tx")?;

        let sql = format!(
            "INSERT INTO accounts AS a (id, email, username, password_hash, role, privilege) \
             VALUES ($1, $2, $3, $4, $5, $6) \
             RETURNING {ACCOUNT_COLUMNS}"
        );
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(Uuid::new_v4())
            .bind(&account.email)
            .bind(&account.username)
            .bind(&account.password_hash)
            .bind(account.role.as_str())
            .bind(account.privilege.as_str())
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| classify(e, "insert account"))?;

        sqlx::query(r#"INSERT INTO auth_tokens (key, account_id) VALUES ($1, $2)"#)
            .bind(token)
            .bind(row.id)
            .execute(&mut *tx)
            .await
            .context("insert token")?;

        tx.commit().await.context("commit tx")?;
        Ok(Account::try_from(row)?)
    }

    async fn update_field(
        &self,
        account_id: Uuid,
        field: ProfileField,
        value: &str,
    ) -> Result<(), StoreError> {
        // column names come from a closed enum, never from input
        let sql = format!("UPDATE accounts SET {} = $1 WHERE id = $2", field.column());
        sqlx::query(&sql)
            .bind(value)
            .bind(account_id)
            .execute(&self.db)
            .await
            .map_err(|e| classify(e, "update account field"))?;
        Ok(())
    }

    async fn update_password(
        &self,
        account_id: Uuid,
        password_hash: &str,
    ) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE accounts SET password_hash = $1 WHERE id = $2"#)
            .bind(password_hash)
            .bind(account_id)
            .execute(&self.db)
            .await
            .context("update password")?;
        Ok(())
    }

    async fn touch_last_login(
        &self,
        account_id: Uuid,
        at: OffsetDateTime,
    ) -> Result<(), StoreError> {
        sqlx::query(r#"UPDATE accounts SET last_login = $1 WHERE id = $2"#)
            .bind(at)
            .bind(account_id)
            .execute(&self.db)
            .await
            .context("update last_login")?;
        Ok(())
    }
}

fn field_label(field: &str) -> &str {
    match field {
        "email" => "email address",
        "nomorInduk" => "nomor induk mahasiswa/pegawai",
        "nomorHP" => "nomor hp",
        "namaToko" => "nama toko",
        other => other,
    }
}

pub fn conflict_message(field: &str) -> String {
    format!("account with this {} already exists.", field_label(field))
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Conflict(field) => AppError::field(field, conflict_message(field)),
            StoreError::Backend(e) => AppError::Internal(e),
        }
    }
}
