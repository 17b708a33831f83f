use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Buyer,
    Seller,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Buyer => "buyer",
            Role::Seller => "seller",
        }
    }
}

impl FromStr for Role {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "buyer" => Ok(Role::Buyer),
            "seller" => Ok(Role::Seller),
            other => anyhow::bail!("unknown role {other:?}"),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a seller's stall sells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoodsCategory {
    Makanan,
    Minuman,
    Jajanan,
    Campuran,
}

impl GoodsCategory {
    pub const ALL: [GoodsCategory; 4] = [
        GoodsCategory::Makanan,
        GoodsCategory::Minuman,
        GoodsCategory::Jajanan,
        GoodsCategory::Campuran,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            GoodsCategory::Makanan => "makanan",
            GoodsCategory::Minuman => "minuman",
            GoodsCategory::Jajanan => "jajanan",
            GoodsCategory::Campuran => "campuran",
        }
    }
}

impl FromStr for GoodsCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lowered = s.trim().to_lowercase();
        Self::ALL
            .into_iter()
            .find(|c| c.as_str() == lowered)
            .ok_or_else(|| anyhow::anyhow!("unknown goods category {s:?}"))
    }
}

/// Replaces the admin/staff/superuser flag triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Privilege {
    Member,
    Staff,
    Superuser,
}

impl Privilege {
    pub fn as_str(&self) -> &'static str {
        match self {
            Privilege::Member => "member",
            Privilege::Staff => "staff",
            Privilege::Superuser => "superuser",
        }
    }

    pub fn is_staff(&self) -> bool {
        matches!(self, Privilege::Staff | Privilege::Superuser)
    }
}

impl FromStr for Privilege {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "member" => Ok(Privilege::Member),
            "staff" => Ok(Privilege::Staff),
            "superuser" => Ok(Privilege::Superuser),
            other => anyhow::bail!("unknown privilege {other:?}"),
        }
    }
}

/// Account record. Both profile field sets exist on every account;
/// only the set matching `role` is meaningful.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    pub id: Uuid,
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,

    // buyer
    pub nama_lengkap: Option<String>,
    pub nomor_induk: Option<String>,
    pub angkatan: Option<String>,
    pub jurusan: Option<String>,

    // seller
    pub nama_panggilan: Option<String>,
    pub nomor_hp: Option<String>,
    pub nama_toko: Option<String>,
    pub tipe_dagangan: Option<GoodsCategory>,

    pub privilege: Privilege,
    pub is_active: bool,
    pub date_joined: OffsetDateTime,
    pub last_login: Option<OffsetDateTime>,
}

impl Account {
    pub fn is_staff(&self) -> bool {
        self.privilege.is_staff()
    }
}

/// Input for creating an account; the password is already hashed.
#[derive(Debug, Clone)]
pub struct NewAccount {
    pub email: String,
    pub username: String,
    pub password_hash: String,
    pub role: Role,
    pub privilege: Privilege,
}

/// Profile columns that the update path may change one at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProfileField {
    Username,
    NamaLengkap,
    NomorInduk,
    Angkatan,
    Jurusan,
    NamaPanggilan,
    NomorHp,
    NamaToko,
    TipeDagangan,
}

impl ProfileField {
    /// Key used in request bodies and error maps.
    pub fn key(&self) -> &'static str {
        match self {
            ProfileField::Username => "username",
            ProfileField::NamaLengkap => "namaLengkap",
            ProfileField::NomorInduk => "nomorInduk",
            ProfileField::Angkatan => "angkatan",
            ProfileField::Jurusan => "jurusan",
            ProfileField::NamaPanggilan => "namaPanggilan",
            ProfileField::NomorHp => "nomorHP",
            ProfileField::NamaToko => "namaToko",
            ProfileField::TipeDagangan => "tipeDagangan",
        }
    }

    pub fn column(&self) -> &'static str {
        match self {
            ProfileField::Username => "username",
            ProfileField::NamaLengkap => "nama_lengkap",
            ProfileField::NomorInduk => "nomor_induk",
            ProfileField::Angkatan => "angkatan",
            ProfileField::Jurusan => "jurusan",
            ProfileField::NamaPanggilan => "nama_panggilan",
            ProfileField::NomorHp => "nomor_hp",
            ProfileField::NamaToko => "nama_toko",
            ProfileField::TipeDagangan => "tipe_dagangan",
        }
    }

    pub fn max_len(&self) -> usize {
        match self {
            ProfileField::Username => 50,
            ProfileField::NamaLengkap => 150,
            ProfileField::NomorInduk => 30,
            ProfileField::Angkatan => 5,
            ProfileField::Jurusan => 20,
            ProfileField::NamaPanggilan => 20,
            ProfileField::NomorHp => 15,
            ProfileField::NamaToko => 50,
            ProfileField::TipeDagangan => 10,
        }
    }

    pub fn unchanged_message(&self) -> &'static str {
        match self {
            ProfileField::Username => "The new username still same with the previous one",
            ProfileField::NamaLengkap => "The new full name still same with the previous one",
            ProfileField::NomorInduk => "The new number ID still same with the previous one",
            ProfileField::Angkatan => "The new university class still same with the previous one",
            ProfileField::Jurusan => "The new major still same with the previous one",
            ProfileField::NamaPanggilan => "The new nickname still same with the previous one",
            ProfileField::NomorHp => "The new phone number still same with the previous one",
            ProfileField::NamaToko => "The new stall name still same with the previous one",
            ProfileField::TipeDagangan => "The new item type still same with the previous one",
        }
    }

    pub fn current<'a>(&self, account: &'a Account) -> Option<&'a str> {
        match self {
            ProfileField::Username => Some(account.username.as_str()),
            ProfileField::NamaLengkap => account.nama_lengkap.as_deref(),
            ProfileField::NomorInduk => account.nomor_induk.as_deref(),
            ProfileField::Angkatan => account.angkatan.as_deref(),
            ProfileField::Jurusan => account.jurusan.as_deref(),
            ProfileField::NamaPanggilan => account.nama_panggilan.as_deref(),
            ProfileField::NomorHp => account.nomor_hp.as_deref(),
            ProfileField::NamaToko => account.nama_toko.as_deref(),
            ProfileField::TipeDagangan => account.tipe_dagangan.as_ref().map(GoodsCategory::as_str),
        }
    }

    /// Writes an already validated value into the in-memory record.
    pub fn assign(&self, account: &mut Account, value: &str) -> anyhow::Result<()> {
        let value = value.to_string();
        match self {
            ProfileField::Username => account.username = value,
            ProfileField::NamaLengkap => account.nama_lengkap = Some(value),
            ProfileField::NomorInduk => account.nomor_induk = Some(value),
            ProfileField::Angkatan => account.angkatan = Some(value),
            ProfileField::Jurusan => account.jurusan = Some(value),
            ProfileField::NamaPanggilan => account.nama_panggilan = Some(value),
            ProfileField::NomorHp => account.nomor_hp = Some(value),
            ProfileField::NamaToko => account.nama_toko = Some(value),
            ProfileField::TipeDagangan => account.tipe_dagangan = Some(value.parse()?),
        }
        Ok(())
    }
}
