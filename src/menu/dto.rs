use rust_decimal::Decimal;
use serde::Deserialize;

use crate::{
    accounts::validate::{BLANK, REQUIRED},
    error::FieldErrors,
    menu::model::{MenuCategory, MenuInput},
};

pub const DEFAULT_DESCRIPTION: &str = "deskripsi";

const NAME_MAX_LEN: usize = 100;
const DESCRIPTION_MAX_LEN: usize = 250;
const PRICE_MAX_SCALE: u32 = 2;
// NUMERIC(12,2)
const PRICE_MAX_INTEGER_DIGITS: u32 = 10;

#[derive(Debug, Default, Deserialize)]
pub struct MenuRequest {
    pub name: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<i64>,
    pub description: Option<String>,
    pub category: Option<String>,
}

impl MenuRequest {
    pub fn validate(self) -> Result<MenuInput, FieldErrors> {
        let mut errors = FieldErrors::new();

        let name = match self.name {
            None => {
                errors.add("name", REQUIRED);
                None
            }
            Some(n) if n.trim().is_empty() => {
                errors.add("name", BLANK);
                None
            }
            Some(n) if n.chars().count() > NAME_MAX_LEN => {
                errors.add(
                    "name",
                    format!("Ensure this field has no more than {NAME_MAX_LEN} characters."),
                );
                None
            }
            Some(n) => Some(n),
        };

        let price = match self.price {
            None => {
                errors.add("price", REQUIRED);
                None
            }
            Some(p) if p.normalize().scale() > PRICE_MAX_SCALE => {
                errors.add(
                    "price",
                    format!("Ensure that there are no more than {PRICE_MAX_SCALE} decimal places."),
                );
                None
            }
            Some(p) if p.abs() >= Decimal::from(10i64.pow(PRICE_MAX_INTEGER_DIGITS)) => {
                errors.add(
                    "price",
                    format!(
                        "Ensure that there are no more than {PRICE_MAX_INTEGER_DIGITS} digits before the decimal point."
                    ),
                );
                None
            }
            Some(p) => Some(p.round_dp(PRICE_MAX_SCALE)),
        };

        let stock = match self.stock {
            None => {
                errors.add("stock", REQUIRED);
                None
            }
            Some(s) if s < 0 => {
                errors.add("stock", "Ensure this value is greater than or equal to 0.");
                None
            }
            Some(s) => match i32::try_from(s) {
                Ok(s) => Some(s),
                Err(_) => {
                    errors.add(
                        "stock",
                        format!("Ensure this value is less than or equal to {}.", i32::MAX),
                    );
                    None
                }
            },
        };

        let description = match self.description {
            None => DEFAULT_DESCRIPTION.to_string(),
            Some(d) if d.trim().is_empty() => {
                errors.add("description", BLANK);
                d
            }
            Some(d) if d.chars().count() > DESCRIPTION_MAX_LEN => {
                errors.add(
                    "description",
                    format!("Ensure this field has no more than {DESCRIPTION_MAX_LEN} characters."),
                );
                d
            }
            Some(d) => d,
        };

        let category = match self.category.as_deref() {
            None => MenuCategory::default(),
            Some(c) => c.parse().unwrap_or_else(|_| {
                errors.add("category", format!("\"{c}\" is not a valid choice."));
                MenuCategory::default()
            }),
        };

        match (name, price, stock) {
            (Some(name), Some(price), Some(stock)) if errors.is_empty() => Ok(MenuInput {
                name,
                price,
                stock,
                description,
                category,
            }),
            _ => Err(errors),
        }
    }
}
