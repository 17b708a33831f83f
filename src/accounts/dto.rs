use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::accounts::model::{Account, GoodsCategory, Role};

/// Shown in place of the password on every profile read.
pub const PASSWORD_MASK: &str = "*******";

/// Request body for registration. Every field is optional at the
/// serde level so missing ones are reported together.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: Option<String>,
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub role: Option<String>,
}

impl RegisterRequest {
    /// Strips surrounding whitespace from every text field except the passwords.
    pub fn trimmed(self) -> Self {
        Self {
            email: trim(self.email),
            username: trim(self.username),
            role: trim(self.role),
            ..self
        }
    }
}

fn trim(value: Option<String>) -> Option<String> {
    value.map(|v| v.trim().to_string())
}

#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub email: String,
    pub username: String,
    pub token: String,
    pub status: String,
}

/// `username` carries the login key, which is the email.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(alias = "email")]
    pub username: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub token: String,
}

/// Public listing entry; never carries password material.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AccountSummary {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub role: Role,
    pub nama_lengkap: Option<String>,
    pub nama_panggilan: Option<String>,
    pub nomor_induk: Option<String>,
    #[serde(rename = "nomorHP")]
    pub nomor_hp: Option<String>,
    pub angkatan: Option<String>,
    pub jurusan: Option<String>,
    pub nama_toko: Option<String>,
    pub tipe_dagangan: Option<GoodsCategory>,
}

impl From<Account> for AccountSummary {
    fn from(a: Account) -> Self {
        Self {
            id: a.id,
            email: a.email,
            username: a.username,
            role: a.role,
            nama_lengkap: a.nama_lengkap,
            nama_panggilan: a.nama_panggilan,
            nomor_induk: a.nomor_induk,
            nomor_hp: a.nomor_hp,
            angkatan: a.angkatan,
            jurusan: a.jurusan,
            nama_toko: a.nama_toko,
            tipe_dagangan: a.tipe_dagangan,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerProfile {
    pub email: String,
    pub username: String,
    pub role: Role,
    pub nama_lengkap: Option<String>,
    pub nomor_induk: Option<String>,
    pub angkatan: Option<String>,
    pub jurusan: Option<String>,
    pub password: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerProfile {
    pub email: String,
    pub username: String,
    pub role: Role,
    pub nama_lengkap: Option<String>,
    pub nama_panggilan: Option<String>,
    #[serde(rename = "nomorHP")]
    pub nomor_hp: Option<String>,
    pub nama_toko: Option<String>,
    pub tipe_dagangan: Option<GoodsCategory>,
    pub password: &'static str,
}

#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum ProfileView {
    Buyer(BuyerProfile),
    Seller(SellerProfile),
}

impl From<Account> for ProfileView {
    fn from(a: Account) -> Self {
        match a.role {
            Role::Buyer => ProfileView::Buyer(BuyerProfile {
                email: a.email,
                username: a.username,
                role: a.role,
                nama_lengkap: a.nama_lengkap,
                nomor_induk: a.nomor_induk,
                angkatan: a.angkatan,
                jurusan: a.jurusan,
                password: PASSWORD_MASK,
            }),
            Role::Seller => ProfileView::Seller(SellerProfile {
                email: a.email,
                username: a.username,
                role: a.role,
                nama_lengkap: a.nama_lengkap,
                nama_panggilan: a.nama_panggilan,
                nomor_hp: a.nomor_hp,
                nama_toko: a.nama_toko,
                tipe_dagangan: a.tipe_dagangan,
                password: PASSWORD_MASK,
            }),
        }
    }
}

/// PATCH body accepted for buyer accounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BuyerPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub nama_lengkap: Option<String>,
    pub nomor_induk: Option<String>,
    pub angkatan: Option<String>,
    pub jurusan: Option<String>,
}

/// PATCH body accepted for seller accounts.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SellerPatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub nama_lengkap: Option<String>,
    pub nama_panggilan: Option<String>,
    #[serde(rename = "nomorHP")]
    pub nomor_hp: Option<String>,
    pub nama_toko: Option<String>,
    pub tipe_dagangan: Option<String>,
}

/// Role-independent view of a patch, consumed by the update path.
#[derive(Debug, Default, Clone)]
pub struct ProfilePatch {
    pub username: Option<String>,
    pub password: Option<String>,
    pub password_confirmation: Option<String>,
    pub nama_lengkap: Option<String>,
    pub nomor_induk: Option<String>,
    pub angkatan: Option<String>,
    pub jurusan: Option<String>,
    pub nama_panggilan: Option<String>,
    pub nomor_hp: Option<String>,
    pub nama_toko: Option<String>,
    pub tipe_dagangan: Option<String>,
}

impl From<BuyerPatch> for ProfilePatch {
    fn from(p: BuyerPatch) -> Self {
        Self {
            username: p.username,
            password: p.password,
            password_confirmation: p.password_confirmation,
            nama_lengkap: p.nama_lengkap,
            nomor_induk: p.nomor_induk,
            angkatan: p.angkatan,
            jurusan: p.jurusan,
            ..Self::default()
        }
    }
}

impl From<SellerPatch> for ProfilePatch {
    fn from(p: SellerPatch) -> Self {
        Self {
            username: p.username,
            password: p.password,
            password_confirmation: p.password_confirmation,
            nama_lengkap: p.nama_lengkap,
            nama_panggilan: p.nama_panggilan,
            nomor_hp: p.nomor_hp,
            nama_toko: p.nama_toko,
            tipe_dagangan: p.tipe_dagangan,
            ..Self::default()
        }
    }
}

impl ProfilePatch {
    /// Parses a raw body into the shape allowed for `role`; other keys are dropped.
    pub fn for_role(role: Role, body: serde_json::Value) -> serde_json::Result<Self> {
        Ok(match role {
            Role::Buyer => serde_json::from_value::<BuyerPatch>(body)?.into(),
            Role::Seller => serde_json::from_value::<SellerPatch>(body)?.into(),
        })
    }

    /// Text fields are compared and stored without surrounding whitespace.
    /// Passwords are kept as sent.
    pub fn trimmed(self) -> Self {
        Self {
            username: trim(self.username),
            nama_lengkap: trim(self.nama_lengkap),
            nomor_induk: trim(self.nomor_induk),
            angkatan: trim(self.angkatan),
            jurusan: trim(self.jurusan),
            nama_panggilan: trim(self.nama_panggilan),
            nomor_hp: trim(self.nomor_hp),
            nama_toko: trim(self.nama_toko),
            tipe_dagangan: trim(self.tipe_dagangan),
            ..self
        }
    }
}
