// src/services/cart_store.rs

use crate::{
    common::error::AppError,
    models::cart::{CartItem, CartStats},
    services::cart_service::calculate_cart_stats,
    session::{SessionStorage, STORAGE_PREFIX},
};

/// Carrinho de uma vitrine, guardado no mesmo storage da sessão.
///
/// Cada operação devolve o estado resultante. Falha de escrita é logada e o
/// estado devolvido é o que se tentou gravar.
pub struct CartStore<S> {
    storage: S,
    key: String,
}

impl<S: SessionStorage> CartStore<S> {
    pub fn new(storage: S, slug: &str) -> Self {
        Self {
            storage,
            key: format!("{STORAGE_PREFIX}cart_{slug}"),
        }
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn items(&self) -> Vec<CartItem> {
        let raw = match self.storage.get(&self.key) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Vec::new(),
            Err(e) => {
                tracing::warn!("⚠️ Falha ao ler o carrinho '{}': {}", self.key, e);
                return Vec::new();
            }
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("⚠️ Carrinho '{}' ilegível, começando vazio: {}", self.key, e);
            Vec::new()
        })
    }

    pub fn stats(&self) -> Result<CartStats, AppError> {
        calculate_cart_stats(&self.items())
    }

    /// Mesmo produto, cor e tamanho somam na linha existente.
    pub fn add_item(&self, mut item: CartItem) -> Vec<CartItem> {
        item.quantity = item.quantity.max(1);
        let mut items = self.items();

        match items.iter_mut().find(|line| line.same_line(&item)) {
            Some(line) => line.quantity = line.quantity.saturating_add(item.quantity),
            None => items.push(item),
        }

        self.save(items)
    }

    /// Quantidade zero remove a linha.
    pub fn update_quantity(
        &self,
        id: &str,
        color: Option<&str>,
        size: Option<&str>,
        quantity: u32,
    ) -> Vec<CartItem> {
        let mut items = self.items();

        if quantity == 0 {
            items.retain(|line| !matches_line(line, id, color, size));
        } else if let Some(line) = items.iter_mut().find(|line| matches_line(line, id, color, size)) {
            line.quantity = quantity;
        }

        self.save(items)
    }

    pub fn remove_item(&self, id: &str, color: Option<&str>, size: Option<&str>) -> Vec<CartItem> {
        self.update_quantity(id, color, size, 0)
    }

    pub fn clear(&self) {
        if let Err(e) = self.storage.remove(&self.key) {
            tracing::warn!("⚠️ Falha ao limpar o carrinho '{}': {}", self.key, e);
        }
    }

    fn save(&self, items: Vec<CartItem>) -> Vec<CartItem> {
        let result = serde_json::to_string(&items)
            .map_err(|e| e.to_string())
            .and_then(|raw| self.storage.set(&self.key, &raw).map_err(|e| e.to_string()));

        if let Err(e) = result {
            tracing::warn!("⚠️ Falha ao gravar o carrinho '{}': {}", self.key, e);
        }
        items
    }
}

fn matches_line(line: &CartItem, id: &str, color: Option<&str>, size: Option<&str>) -> bool {
    line.id == id && line.selected_color.as_deref() == color && line.selected_size.as_deref() == size
}

#[cfg(test)]
mod tests {
    use chrono::{Duration, Utc};
    use rust_decimal::Decimal;
    use uuid::Uuid;

    use super::*;
    use crate::{
        permissions::Role,
        session::{MemoryStorage, SessionRecord, SessionStore},
    };

    fn shirt(size: &str, quantity: u32) -> CartItem {
        CartItem {
            id: "camiseta".into(),
            title: "Camiseta".into(),
            price: Decimal::from(50),
            discounted_price: Some(Decimal::from(40)),
            quantity,
            selected_color: Some("Preta".into()),
            selected_size: Some(size.into()),
            notes: None,
        }
    }

    #[test]
    fn same_variant_merges_and_other_variant_adds_a_line() {
        let cart = CartStore::new(MemoryStorage::new(), "loja");
        cart.add_item(shirt("M", 1));
        cart.add_item(shirt("M", 2));
        let items = cart.add_item(shirt("G", 0));

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].quantity, 3);
        // Quantidade mínima é 1.
        assert_eq!(items[1].quantity, 1);
        let stats = cart.stats().unwrap();
        assert_eq!(stats.item_count, 4);
        assert_eq!(stats.total, Decimal::from(160));
    }

    #[test]
    fn update_and_remove_lines() {
        let cart = CartStore::new(MemoryStorage::new(), "loja");
        cart.add_item(shirt("M", 1));
        cart.add_item(shirt("G", 1));

        let items = cart.update_quantity("camiseta", Some("Preta"), Some("G"), 5);
        assert_eq!(items[1].quantity, 5);

        let items = cart.remove_item("camiseta", Some("Preta"), Some("M"));
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].selected_size.as_deref(), Some("G"));

        cart.clear();
        assert!(cart.items().is_empty());
    }

    #[test]
    fn carts_are_cleared_with_the_session() {
        let storage = MemoryStorage::new();
        let store = SessionStore::new(storage.clone(), Duration::hours(1));
        store.create(&SessionRecord {
            id: Uuid::new_v4(),
            role: Role::Corretor,
            session_id: "sid".into(),
            display_name: "C".into(),
            expires_at: Utc::now() + Duration::hours(1),
        });

        let cart = CartStore::new(storage, "loja");
        cart.add_item(shirt("M", 1));
        store.clear_all_stored_data();

        assert!(cart.items().is_empty());
    }

    #[test]
    fn corrupted_cart_reads_as_empty() {
        let storage = MemoryStorage::new();
        let cart = CartStore::new(storage.clone(), "loja");
        storage.set(cart.key(), "nope").unwrap();
        assert!(cart.items().is_empty());
    }
}
