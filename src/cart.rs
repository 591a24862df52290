use crate::{
    inventory::{ErrorMessage, InventoryError, Store},
    item::{format_price, Item},
};
use log::info;
use std::error::Error;

/// Items picked for checkout. Lives only as long as the session that owns it.
#[derive(Debug, Default, Clone)]
pub struct Cart {
    items: Vec<Item>,
}

/// Everything one run of the program works against: the backing store and its cart.
#[derive(Debug, Default)]
pub struct Session {
    pub store: Store,
    pub cart: Cart,
}

impl Cart {
    pub fn new() -> Self {
        Cart { items: Vec::new() }
    }

    /// Looks the item up in `store` and appends a copy of it.
    pub fn add(&mut self, store: &Store, id: i64) -> Result<&Item, Box<dyn Error>> {
        match store.find(id) {
            Some(item) => {
                info!("Item {} added to cart", id);
                self.items.push(item);
                Ok(&self.items[self.items.len() - 1])
            }
            None => Err(InventoryError::not_found(id)),
        }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn total_in_cents(&self) -> Result<i64, Box<dyn Error>> {
        self.items
            .iter()
            .try_fold(0i64, |total, item| total.checked_add(item.price_in_cents))
            .ok_or_else(|| InventoryError::boxed(ErrorMessage::TotalTooLarge, None))
    }

    pub fn total(&self) -> Result<String, Box<dyn Error>> {
        Ok(format_price(self.total_in_cents()?))
    }

    /// Lines shown for the cart: every entry, the count per distinct item, the item
    /// count and the total. An empty cart is a single "Cart is empty" line.
    pub fn report(&self) -> Result<Vec<String>, Box<dyn Error>> {
        if self.is_empty() {
            return Ok(vec!["Cart is empty".to_string()]);
        }
        let total = self.total()?;
        let mut lines: Vec<String> = self.items.iter().map(|item| item.summary()).collect();
        lines.extend(
            self.quantities()
                .iter()
                .map(|(item, count)| format!("  {} x {}", count, item.name)),
        );
        lines.push(format!("Items: {}", self.len()));
        lines.push(format!("Total: {}", total));
        Ok(lines)
    }

    /// Count per distinct item, in the order each first entered the cart.
    pub fn quantities(&self) -> Vec<(&Item, usize)> {
        let mut counts: Vec<(&Item, usize)> = Vec::new();
        for item in &self.items {
            match counts.iter_mut().find(|(counted, _)| counted.id == item.id) {
                Some((_, count)) => *count += 1,
                None => counts.push((item, 1)),
            }
        }
        counts
    }

    pub fn cancel(&mut self) {
        self.items.clear();
        info!("Cart emptied");
    }
}

impl Session {
    pub fn new(store: Store) -> Self {
        Session {
            store,
            cart: Cart::new(),
        }
    }

    pub fn add_to_cart(&mut self, id: i64) -> Result<&Item, Box<dyn Error>> {
        self.cart.add(&self.store, id)
    }
}
