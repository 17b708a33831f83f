use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MenuCategory {
    #[default]
    Makanan,
    Minuman,
}

impl MenuCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            MenuCategory::Makanan => "makanan",
            MenuCategory::Minuman => "minuman",
        }
    }
}

impl FromStr for MenuCategory {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "makanan" => Ok(MenuCategory::Makanan),
            "minuman" => Ok(MenuCategory::Minuman),
            other => anyhow::bail!("unknown menu category {other:?}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuItem {
    pub id: i64,
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub category: MenuCategory,
}

/// Validated field values for a create or full replace.
#[derive(Debug, Clone, PartialEq)]
pub struct MenuInput {
    pub name: String,
    pub price: Decimal,
    pub stock: i32,
    pub description: String,
    pub category: MenuCategory,
}
