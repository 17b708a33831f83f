use anyhow::anyhow;
use time::OffsetDateTime;
use tracing::{debug, info, warn};

use crate::{
    accounts::{
        dto::{LoginRequest, ProfilePatch, RegisterRequest},
        model::{Account, NewAccount, Privilege, ProfileField},
        repo::{conflict_message, AccountStore},
        validate::{self, normalize_email, PASSWORD_MISMATCH, REQUIRED},
    },
    auth::{
        password::{hash_password, prepare_change, verify_password, PasswordChange},
        token::generate_token,
    },
    config::SuperuserConfig,
    error::{AppError, AppResult, FieldErrors},
};

pub const INVALID_CREDENTIALS: &str = "Unable to log in with provided credentials.";
pub const EMAIL_NOT_FOUND: &str = "Sorry, seems there's a problem with your email";
pub const PROHIBITED: &str = "Sorry, you're prohibited in this area";
pub const ROLE_MISMATCH: &str =
    "Sorry, seems there's a problem with the slug that relate to the email or role";
pub const PASSWORD_UNCHANGED: &str = "The new password still same with the previous one";

/// Validates and stores a new account together with its token.
/// Returns the account and the token key.
pub async fn create_account(
    store: &dyn AccountStore,
    req: RegisterRequest,
    privilege: Privilege,
) -> AppResult<(Account, String)> {
    let req = req.trimmed();
    let mut errors = validate::registration(&req);

    if errors.get("email").is_none() {
        if let Some(email) = req.email.as_deref() {
            if store.find_by_email(&normalize_email(email)).await?.is_some() {
                errors.add("email", conflict_message("email"));
            }
        }
    }
    if errors.get("username").is_none() {
        if let Some(username) = req.username.as_deref() {
            if store.find_by_username(username).await?.is_some() {
                errors.add("username", conflict_message("username"));
            }
        }
    }
    if !errors.is_empty() {
        warn!(fields = ?errors, "registration rejected");
        return Err(AppError::Validation(errors));
    }

    let RegisterRequest {
        email: Some(email),
        username: Some(username),
        password: Some(password),
        role: Some(role),
        ..
    } = req
    else {
        return Err(anyhow!("registration passed validation with a missing field").into());
    };

    let new_account = NewAccount {
        email: normalize_email(&email),
        username,
        password_hash: hash_password(&password)?,
        role: role.parse()?,
        privilege,
    };
    let token = generate_token();
    let account = store.create_with_token(new_account, &token).await?;

    info!(
        account_id = %account.id,
        email = %account.email,
        role = %account.role,
        privilege = account.privilege.as_str(),
        "account created"
    );
    Ok((account, token))
}

pub async fn register(
    store: &dyn AccountStore,
    req: RegisterRequest,
) -> AppResult<(Account, String)> {
    create_account(store, req, Privilege::Member).await
}

/// Creates the configured superuser unless the email is already taken.
pub async fn ensure_superuser(store: &dyn AccountStore, cfg: &SuperuserConfig) -> AppResult<()> {
    if store.find_by_email(&normalize_email(&cfg.email)).await?.is_some() {
        debug!(email = %cfg.email, "superuser already present");
        return Ok(());
    }
    let req = RegisterRequest {
        email: Some(cfg.email.clone()),
        username: Some(cfg.username.clone()),
        password: Some(cfg.password.clone()),
        password_confirmation: Some(cfg.password.clone()),
        role: Some(cfg.role.clone()),
    };
    create_account(store, req, Privilege::Superuser).await?;
    Ok(())
}

/// Checks credentials and returns the account's token.
pub async fn login(store: &dyn AccountStore, req: LoginRequest) -> AppResult<String> {
    let mut errors = FieldErrors::new();
    if req.username.as_deref().map_or(true, str::is_empty) {
        errors.add("username", REQUIRED);
    }
    if req.password.as_deref().map_or(true, str::is_empty) {
        errors.add("password", REQUIRED);
    }
    errors.into_result()?;

    let email = normalize_email(req.username.as_deref().unwrap_or_default());
    let password = req.password.unwrap_or_default();

    let account = store.find_by_email(&email).await?.filter(|a| a.is_active);
    let verified = match &account {
        Some(a) => verify_password(&password, &a.password_hash)?,
        None => false,
    };
    let account = match account {
        Some(a) if verified => a,
        _ => {
            warn!(email = %email, "login rejected");
            return Err(AppError::field("non_field_errors", INVALID_CREDENTIALS));
        }
    };

    store
        .touch_last_login(account.id, OffsetDateTime::now_utc())
        .await?;
    let token = store
        .token_for(account.id)
        .await?
        .ok_or_else(|| anyhow!("account {} has no token", account.id))?;

    info!(
        account_id = %account.id,
        joined = %account.date_joined,
        previous_login = ?account.last_login,
        "account logged in"
    );
    Ok(token)
}

/// Resolves the profile addressed by `/{role}/{email}` for `requester`.
/// Checks run in order: lookup, ownership or staff, role segment.
pub async fn load_profile(
    store: &dyn AccountStore,
    requester: &Account,
    role_segment: &str,
    email: &str,
) -> AppResult<Account> {
    let account = store
        .find_by_email(&normalize_email(email))
        .await?
        .ok_or_else(|| AppError::NotFound(EMAIL_NOT_FOUND.into()))?;

    if !requester.is_staff() && requester.id != account.id {
        warn!(requester = %requester.id, target = %account.id, "profile access denied");
        return Err(AppError::Forbidden(PROHIBITED.into()));
    }

    if account.role.as_str() != role_segment {
        return Err(AppError::BadRequest(ROLE_MISMATCH.into()));
    }

    Ok(account)
}

/// Applies one candidate value, rejecting it if it equals the stored one.
async fn apply_field(
    store: &dyn AccountStore,
    account: &mut Account,
    field: ProfileField,
    value: String,
) -> AppResult<()> {
    if field.current(account) == Some(value.as_str()) {
        return Err(AppError::field(field.key(), field.unchanged_message()));
    }
    store.update_field(account.id, field, &value).await?;
    field.assign(account, &value)?;
    debug!(account_id = %account.id, field = field.key(), "profile field updated");
    Ok(())
}

/// Field-by-field partial update.
///
/// Every present field is validated first. Then, in a fixed order
/// (username, password, profile fields), each candidate is compared with
/// the stored value: an equal value aborts the whole update, a different
/// one is written immediately. Writes made before an abort are kept.
pub async fn update_profile(
    store: &dyn AccountStore,
    account: Account,
    patch: ProfilePatch,
) -> AppResult<Account> {
    let patch = patch.trimmed();
    validate::patch(&patch).into_result()?;

    let mut account = account;

    if let Some(username) = patch.username {
        apply_field(store, &mut account, ProfileField::Username, username).await?;
    }

    if let (Some(password), Some(confirmation)) = (patch.password, patch.password_confirmation) {
        let hash = match prepare_change(&account.password_hash, &password, &confirmation)? {
            PasswordChange::Unchanged => {
                return Err(AppError::field("password", PASSWORD_UNCHANGED))
            }
            PasswordChange::Mismatch => {
                return Err(AppError::field("passwordConfirmation", PASSWORD_MISMATCH))
            }
            PasswordChange::Accepted(hash) => hash,
        };
        store.update_password(account.id, &hash).await?;
        account.password_hash = hash;
        info!(account_id = %account.id, "password changed");
    }

    let profile_fields = [
        (ProfileField::NamaLengkap, patch.nama_lengkap),
        (ProfileField::NomorInduk, patch.nomor_induk),
        (ProfileField::Angkatan, patch.angkatan),
        (ProfileField::Jurusan, patch.jurusan),
        (ProfileField::NamaPanggilan, patch.nama_panggilan),
        (ProfileField::NomorHp, patch.nomor_hp),
        (ProfileField::NamaToko, patch.nama_toko),
        (
            ProfileField::TipeDagangan,
            patch.tipe_dagangan.map(|c| c.to_lowercase()),
        ),
    ];
    for (field, value) in profile_fields {
        if let Some(value) = value {
            apply_field(store, &mut account, field, value).await?;
        }
    }

    Ok(account)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::accounts::{memory::MemoryAccountStore, model::GoodsCategory, model::Role};

    fn register_req(email: &str, username: &str, password: &str, role: &str) -> RegisterRequest {
        RegisterRequest {
            email: Some(email.into()),
            username: Some(username.into()),
            password: Some(password.into()),
            password_confirmation: Some(password.into()),
            role: Some(role.into()),
        }
    }

    async fn seeded(role: &str) -> (MemoryAccountStore, Account) {
        let store = MemoryAccountStore::new();
        let (account, _) = register(&store, register_req("a@b.com", "ab", "p1", role))
            .await
            .expect("register");
        (store, account)
    }

    fn expect_field(err: AppError, field: &str) -> String {
        match err {
            AppError::Validation(errors) => errors
                .get(field)
                .unwrap_or_else(|| panic!("no error for {field}: {errors:?}"))
                .to_string(),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn register_issues_exactly_one_token() {
        let store = MemoryAccountStore::new();
        let (account, token) = register(&store, register_req("A@B.com ", "ab", "p1", "Buyer"))
            .await
            .unwrap();
        assert_eq!(account.email, "a@b.com");
        assert_eq!(account.role, Role::Buyer);
        assert_eq!(account.privilege, Privilege::Member);
        assert_ne!(account.password_hash, "p1");
        assert_eq!(store.token_for(account.id).await.unwrap(), Some(token.clone()));
        let owner = store.find_by_token(&token).await.unwrap().unwrap();
        assert_eq!(owner.id, account.id);
    }

    #[tokio::test]
    async fn register_rejects_duplicates() {
        let (store, _) = seeded("buyer").await;

        let err = register(&store, register_req("a@b.com", "other", "p1", "buyer"))
            .await
            .unwrap_err();
        assert_eq!(expect_field(err, "email"), conflict_message("email"));

        let err = register(&store, register_req("c@d.com", "ab", "p1", "buyer"))
            .await
            .unwrap_err();
        assert_eq!(expect_field(err, "username"), conflict_message("username"));
        assert_eq!(store.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn register_rejects_missing_role() {
        let store = MemoryAccountStore::new();
        let mut req = register_req("a@b.com", "ab", "p1", "buyer");
        req.role = None;
        let err = register(&store, req).await.unwrap_err();
        assert_eq!(expect_field(err, "role"), REQUIRED);
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn login_returns_registration_token() {
        let store = MemoryAccountStore::new();
        let (account, token) = register(&store, register_req("a@b.com", "ab", "p1", "buyer"))
            .await
            .unwrap();
        let got = login(
            &store,
            LoginRequest {
                username: Some("a@b.com".into()),
                password: Some("p1".into()),
            },
        )
        .await
        .unwrap();
        assert_eq!(got, token);
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(stored.last_login.is_some());
        assert_eq!(stored.id, account.id);
    }

    #[tokio::test]
    async fn login_rejects_bad_password_and_inactive() {
        let (store, account) = seeded("buyer").await;
        let bad = LoginRequest {
            username: Some("a@b.com".into()),
            password: Some("nope".into()),
        };
        let err = login(&store, bad).await.unwrap_err();
        assert_eq!(expect_field(err, "non_field_errors"), INVALID_CREDENTIALS);

        store.set_active(account.id, false).await;
        let good = LoginRequest {
            username: Some("a@b.com".into()),
            password: Some("p1".into()),
        };
        assert!(login(&store, good).await.is_err());
    }

    #[tokio::test]
    async fn ensure_superuser_is_idempotent() {
        let store = MemoryAccountStore::new();
        let cfg = SuperuserConfig {
            email: "admin@kantin.id".into(),
            username: "admin".into(),
            password: "adminpassword".into(),
            role: "seller".into(),
        };
        ensure_superuser(&store, &cfg).await.unwrap();
        ensure_superuser(&store, &cfg).await.unwrap();
        let all = store.list().await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].privilege, Privilege::Superuser);
        assert!(all[0].is_staff());
    }

    #[tokio::test]
    async fn same_value_rejected_for_every_profile_field() {
        let cases: [(&str, ProfilePatch); 9] = [
            ("buyer", ProfilePatch { username: Some("newname".into()), ..Default::default() }),
            ("buyer", ProfilePatch { nama_lengkap: Some("Budi".into()), ..Default::default() }),
            ("buyer", ProfilePatch { nomor_induk: Some("1906".into()), ..Default::default() }),
            ("buyer", ProfilePatch { angkatan: Some("2019".into()), ..Default::default() }),
            ("buyer", ProfilePatch { jurusan: Some("Ilkom".into()), ..Default::default() }),
            ("seller", ProfilePatch { nama_panggilan: Some("Bu".into()), ..Default::default() }),
            ("seller", ProfilePatch { nomor_hp: Some("0812".into()), ..Default::default() }),
            ("seller", ProfilePatch { nama_toko: Some("Warung".into()), ..Default::default() }),
            ("seller", ProfilePatch { tipe_dagangan: Some("jajanan".into()), ..Default::default() }),
        ];

        for (role, patch) in cases {
            let (store, account) = seeded(role).await;
            let updated = update_profile(&store, account, patch.clone())
                .await
                .expect("first patch applies");
            let persisted = store.find_by_email("a@b.com").await.unwrap().unwrap();
            assert_eq!(persisted, updated);

            let err = update_profile(&store, persisted, patch).await.unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "{err:?}");
        }
    }

    #[tokio::test]
    async fn unchanged_field_aborts_but_keeps_earlier_writes() {
        let (store, account) = seeded("buyer").await;
        let patch = ProfilePatch {
            username: Some("fresh".into()),
            nama_lengkap: Some("X".into()),
            ..Default::default()
        };
        let account = update_profile(&store, account, patch).await.unwrap();

        let patch = ProfilePatch {
            username: Some("fresher".into()),
            nama_lengkap: Some("X".into()),
            jurusan: Some("Ilkom".into()),
            ..Default::default()
        };
        let err = update_profile(&store, account, patch).await.unwrap_err();
        assert_eq!(
            expect_field(err, "namaLengkap"),
            ProfileField::NamaLengkap.unchanged_message()
        );

        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.username, "fresher");
        assert_eq!(stored.jurusan, None);
    }

    #[tokio::test]
    async fn username_whitespace_rejected_before_compare() {
        let (store, account) = seeded("buyer").await;
        let patch = ProfilePatch {
            username: Some("a b".into()),
            ..Default::default()
        };
        let err = update_profile(&store, account, patch).await.unwrap_err();
        assert_eq!(expect_field(err, "username"), validate::USERNAME_WHITESPACE);
    }

    #[tokio::test]
    async fn password_change_rules() {
        let (store, account) = seeded("buyer").await;

        let same = ProfilePatch {
            password: Some("p1".into()),
            password_confirmation: Some("p1".into()),
            ..Default::default()
        };
        let err = update_profile(&store, account.clone(), same).await.unwrap_err();
        assert_eq!(expect_field(err, "password"), PASSWORD_UNCHANGED);

        let mismatch = ProfilePatch {
            password: Some("p2".into()),
            password_confirmation: Some("p3".into()),
            ..Default::default()
        };
        let err = update_profile(&store, account.clone(), mismatch).await.unwrap_err();
        assert_eq!(expect_field(err, "passwordConfirmation"), PASSWORD_MISMATCH);

        let good = ProfilePatch {
            password: Some("p2".into()),
            password_confirmation: Some("p2".into()),
            ..Default::default()
        };
        update_profile(&store, account, good).await.unwrap();
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert!(verify_password("p2", &stored.password_hash).unwrap());
        assert!(!verify_password("p1", &stored.password_hash).unwrap());
    }

    #[tokio::test]
    async fn goods_category_stored_lowercase() {
        let (store, account) = seeded("seller").await;
        let patch = ProfilePatch {
            tipe_dagangan: Some("Minuman".into()),
            ..Default::default()
        };
        let updated = update_profile(&store, account, patch).await.unwrap();
        assert_eq!(updated.tipe_dagangan, Some(GoodsCategory::Minuman));

        let again = ProfilePatch {
            tipe_dagangan: Some("MINUMAN".into()),
            ..Default::default()
        };
        let err = update_profile(&store, updated, again).await.unwrap_err();
        assert!(expect_field(err, "tipeDagangan").contains("item type"));
    }

    #[tokio::test]
    async fn unique_profile_field_conflict() {
        let cases: [(&str, ProfileField, ProfilePatch); 3] = [
            (
                "buyer",
                ProfileField::NomorInduk,
                ProfilePatch { nomor_induk: Some("1906350".into()), ..Default::default() },
            ),
            (
                "seller",
                ProfileField::NomorHp,
                ProfilePatch { nomor_hp: Some("08123456789".into()), ..Default::default() },
            ),
            (
                "seller",
                ProfileField::NamaToko,
                ProfilePatch { nama_toko: Some("Warung Bu Sri".into()), ..Default::default() },
            ),
        ];

        for (role, field, patch) in cases {
            let store = MemoryAccountStore::new();
            let (first, _) = register(&store, register_req("s1@b.com", "s1", "p1", role))
                .await
                .unwrap();
            let (second, _) = register(&store, register_req("s2@b.com", "s2", "p1", role))
                .await
                .unwrap();

            update_profile(&store, first, patch.clone()).await.unwrap();
            let err = update_profile(&store, second, patch).await.unwrap_err();
            assert_eq!(expect_field(err, field.key()), conflict_message(field.key()));
        }
    }

    #[tokio::test]
    async fn padded_value_counts_as_unchanged() {
        let (store, account) = seeded("buyer").await;
        let first = ProfilePatch {
            nama_lengkap: Some("X".into()),
            ..Default::default()
        };
        let account = update_profile(&store, account, first).await.unwrap();

        let padded = ProfilePatch {
            nama_lengkap: Some("  X ".into()),
            ..Default::default()
        };
        let err = update_profile(&store, account, padded).await.unwrap_err();
        assert_eq!(
            expect_field(err, "namaLengkap"),
            ProfileField::NamaLengkap.unchanged_message()
        );
        let stored = store.find_by_email("a@b.com").await.unwrap().unwrap();
        assert_eq!(stored.nama_lengkap.as_deref(), Some("X"));
    }

    #[tokio::test]
    async fn patch_stores_trimmed_values() {
        let (store, account) = seeded("seller").await;
        let patch = ProfilePatch {
            username: Some(" warung ".into()),
            nama_toko: Some("Warung Bu Sri\t".into()),
            ..Default::default()
        };
        let updated = update_profile(&store, account, patch).await.unwrap();
        assert_eq!(updated.username, "warung");
        assert_eq!(updated.nama_toko.as_deref(), Some("Warung Bu Sri"));
    }

    #[tokio::test]
    async fn register_trims_username() {
        let store = MemoryAccountStore::new();
        let (account, _) = register(&store, register_req(" a@b.com", "ab ", "p1", " buyer"))
            .await
            .unwrap();
        assert_eq!(account.username, "ab");
        assert_eq!(account.email, "a@b.com");
        assert!(store.find_by_username("ab").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn load_profile_checks_in_order() {
        let store = MemoryAccountStore::new();
        let (buyer, _) = register(&store, register_req("a@b.com", "ab", "p1", "buyer"))
            .await
            .unwrap();
        let (seller, _) = register(&store, register_req("s@b.com", "sb", "p1", "seller"))
            .await
            .unwrap();

        let err = load_profile(&store, &buyer, "buyer", "haha@test.com").await.unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        let err = load_profile(&store, &buyer, "seller", "s@b.com").await.unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));

        let err = load_profile(&store, &buyer, "seller", "a@b.com").await.unwrap_err();
        assert!(matches!(err, AppError::BadRequest(_)));

        let own = load_profile(&store, &seller, "seller", "S@B.com").await.unwrap();
        assert_eq!(own.id, seller.id);
    }
}
