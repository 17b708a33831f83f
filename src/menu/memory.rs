use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::menu::{
    model::{MenuInput, MenuItem},
    repo::MenuStore,
};

#[derive(Default)]
pub struct MemoryMenuStore {
    inner: Mutex<(i64, BTreeMap<i64, MenuItem>)>,
}

impl MemoryMenuStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn to_item(id: i64, input: MenuInput) -> MenuItem {
    MenuItem {
        id,
        name: input.name,
        price: input.price,
        stock: input.stock,
        description: input.description,
        category: input.category,
    }
}

#[async_trait]
impl MenuStore for MemoryMenuStore {
    async fn list(&self) -> anyhow::Result<Vec<MenuItem>> {
        Ok(self.inner.lock().await.1.values().cloned().collect())
    }

    async fn get(&self, id: i64) -> anyhow::Result<Option<MenuItem>> {
        Ok(self.inner.lock().await.1.get(&id).cloned())
    }

    async fn create(&self, input: MenuInput) -> anyhow::Result<MenuItem> {
        let mut guard = self.inner.lock().await;
        let (next_id, items) = &mut *guard;
        *next_id += 1;
        let item = to_item(*next_id, input);
        items.insert(item.id, item.clone());
        Ok(item)
    }

    async fn replace(&self, id: i64, input: MenuInput) -> anyhow::Result<Option<MenuItem>> {
        let mut guard = self.inner.lock().await;
        let Some(slot) = guard.1.get_mut(&id) else {
            return Ok(None);
        };
        *slot = to_item(id, input);
        Ok(Some(slot.clone()))
    }

    async fn delete(&self, id: i64) -> anyhow::Result<bool> {
        Ok(self.inner.lock().await.1.remove(&id).is_some())
    }
}
