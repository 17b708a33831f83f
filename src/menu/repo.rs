use anyhow::Context;
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::{FromRow, PgPool};

use crate::menu::model::{MenuInput, MenuItem};

#[async_trait]
pub trait MenuStore: Send + Sync {
    async fn list(&self) -> anyhow::Result<Vec<MenuItem>>;
    async fn get(&self, id: i64) -> anyhow::Result<Option<MenuItem>>;
    async fn create(&self, input: MenuInput) -> anyhow::Result<MenuItem>;
    /// Returns `None` when no item has this id.
    async fn replace(&self, id: i64, input: MenuInput) -> anyhow::Result<Option<MenuItem>>;
    /// Returns whether a row was removed.
    async fn delete(&self, id: i64) -> anyhow::Result<bool>;
}

#[derive(Debug, FromRow)]
struct MenuRow {
    id: i64,
    name: String,
    price: Decimal,
    stock: i32,
    description: String,
    category: String,
}

impl TryFrom<MenuRow> for MenuItem {
    type Error = anyhow::Error;

    fn try_from(r: MenuRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: r.id,
            name: r.name,
            price: r.price,
            stock: r.stock,
            description: r.description,
            category: r.category.parse()?,
        })
    }
}

#[derive(Clone)]
pub struct PgMenuStore {
    db: PgPool,
}

impl PgMenuStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MenuStore for PgMenuStore {
    async fn list(&self) -> anyhow::Result<Vec<MenuItem>> {
        let rows = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, name, price, stock, description, category
            FROM menus
            ORDER BY id
            "#,
        )
        .fetch_all(&self.db)
        .await
        .context("list menus")?;
        rows.into_iter().map(MenuItem::try_from).collect()
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            SELECT id, name, price, stock, description, category
            FROM menus
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("get menu")?;
        row.map(MenuItem::try_from).transpose()
    }

    async fn create(&self, input: MenuInput) -> anyhow::Result<MenuItem> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            INSERT INTO menus (name, price, stock, description, category)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, name, price, stock, description, category
            "#,
        )
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.description)
        .bind(input.category.as_str())
        .fetch_one(&self.db)
        .await
        .context("insert menu")?;
        MenuItem::try_from(row)
    }

    async fn replace(&self, id: i64, input: MenuInput) -> anyhow::Result<Option<MenuItem>> {
        let row = sqlx::query_as::<_, MenuRow>(
            r#"
            UPDATE menus
               SET name = $2, price = $3, stock = $4, description = $5, category = $6
             WHERE id = $1
            RETURNING id, name, price, stock, description, category
            "#,
        )
        .bind(id)
        .bind(&input.name)
        .bind(input.price)
        .bind(input.stock)
        .bind(&input.description)
        .bind(input.category.as_str())
        .fetch_optional(&self.db)
        .await
        .context("update menu")?;
        row.map(MenuItem::try_from).transpose()
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        let result = sqlx::query(r#"DELETE FROM menus WHERE id = $1"#)
            .bind(id)
            .execute(&self.db)
            .await
            .context("delete menu")?;
        Ok(result.rows_affected() > 0)
    }
}
