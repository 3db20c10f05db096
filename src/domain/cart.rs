use std::num::NonZeroU32;

use super::error::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: u64,
    pub quantity: NonZeroU32,
}

/// An edit to an existing cart line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartChange {
    SetQuantity { product_id: u64, quantity: u32 },
    Remove { product_id: u64 },
}

/// Client-owned cart contents. Lines are unique per product and keep
/// insertion order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Cart {
    lines: Vec<CartLine>,
}

impl Cart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a cart from raw `(product_id, quantity)` pairs, merging duplicates.
    pub fn from_pairs(
        pairs: impl IntoIterator<Item = (u64, u32)>,
    ) -> Result<Self, DomainError> {
        let mut cart = Self::new();
        for (product_id, quantity) in pairs {
            cart.add(product_id, quantity)?;
        }
        Ok(cart)
    }

    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn total_quantity(&self) -> u64 {
        self.lines
            .iter()
            .map(|line| u64::from(line.quantity.get()))
            .sum()
    }

    /// Add `quantity` units, merging into an existing line for the product.
    pub fn add(&mut self, product_id: u64, quantity: u32) -> Result<(), DomainError> {
        let quantity = positive(quantity)?;
        match self.position(product_id) {
            Some(index) => {
                let line = &mut self.lines[index];
                let merged = line.quantity.get().checked_add(quantity.get()).ok_or_else(|| {
                    DomainError::validation(format!(
                        "quantity for product {product_id} overflows"
                    ))
                })?;
                line.quantity = positive(merged)?;
            }
            None => self.lines.push(CartLine {
                product_id,
                quantity,
            }),
        }
        Ok(())
    }

    pub fn set_quantity(&mut self, product_id: u64, quantity: u32) -> Result<(), DomainError> {
        let quantity = positive(quantity)?;
        let index = self
            .position(product_id)
            .ok_or_else(|| DomainError::not_found("cart line"))?;
        self.lines[index].quantity = quantity;
        Ok(())
    }

    pub fn remove(&mut self, product_id: u64) -> Result<CartLine, DomainError> {
        let index = self
            .position(product_id)
            .ok_or_else(|| DomainError::not_found("cart line"))?;
        Ok(self.lines.remove(index))
    }

    pub fn apply(&mut self, change: CartChange) -> Result<(), DomainError> {
        match change {
            CartChange::SetQuantity {
                product_id,
                quantity,
            } => self.set_quantity(product_id, quantity),
            CartChange::Remove { product_id } => self.remove(product_id).map(|_| ()),
        }
    }

    fn position(&self, product_id: u64) -> Option<usize> {
        self.lines
            .iter()
            .position(|line| line.product_id == product_id)
    }
}

fn positive(quantity: u32) -> Result<NonZeroU32, DomainError> {
    NonZeroU32::new(quantity)
        .ok_or_else(|| DomainError::validation("quantity must be at least 1"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_merges_lines_for_same_product() {
        let mut cart = Cart::new();
        cart.add(10, 1).expect("add");
        cart.add(11, 2).expect("add");
        cart.add(10, 3).expect("add");

        assert_eq!(cart.lines().len(), 2);
        assert_eq!(cart.lines()[0].product_id, 10);
        assert_eq!(cart.lines()[0].quantity.get(), 4);
        assert_eq!(cart.total_quantity(), 6);
    }

    #[test]
    fn zero_quantity_is_rejected() {
        let mut cart = Cart::new();
        assert!(matches!(
            cart.add(1, 0),
            Err(DomainError::Validation { .. })
        ));

        cart.add(1, 1).expect("add");
        assert!(matches!(
            cart.set_quantity(1, 0),
            Err(DomainError::Validation { .. })
        ));
        assert_eq!(cart.lines()[0].quantity.get(), 1);
    }

    #[test]
    fn set_quantity_and_remove_require_existing_line() {
        let mut cart = Cart::new();
        assert_eq!(
            cart.set_quantity(5, 2),
            Err(DomainError::not_found("cart line"))
        );
        assert_eq!(cart.remove(5), Err(DomainError::not_found("cart line")));

        cart.add(5, 1).expect("add");
        cart.set_quantity(5, 7).expect("set");
        let removed = cart.remove(5).expect("remove");
        assert_eq!(removed.quantity.get(), 7);
        assert!(cart.is_empty());
    }

    #[test]
    fn changes_apply_in_order() {
        let mut cart = Cart::from_pairs([(1, 1), (2, 4), (3, 1)]).expect("valid pairs");
        let changes = [
            CartChange::SetQuantity {
                product_id: 2,
                quantity: 2,
            },
            CartChange::Remove { product_id: 1 },
        ];
        for change in changes {
            cart.apply(change).expect("change applies");
        }

        let lines: Vec<(u64, u32)> = cart
            .lines()
            .iter()
            .map(|line| (line.product_id, line.quantity.get()))
            .collect();
        assert_eq!(lines, vec![(2, 2), (3, 1)]);

        assert_eq!(
            cart.apply(CartChange::Remove { product_id: 1 }),
            Err(DomainError::not_found("cart line"))
        );
    }

    #[test]
    fn from_pairs_stops_on_invalid_quantity() {
        let err = Cart::from_pairs([(1, 2), (2, 0)]).expect_err("zero quantity");
        assert!(matches!(err, DomainError::Validation { .. }));

        let cart = Cart::from_pairs([(1, 2), (1, 1)]).expect("valid pairs");
        assert_eq!(cart.total_quantity(), 3);
    }

    #[test]
    fn overflowing_merge_is_rejected() {
        let mut cart = Cart::new();
        cart.add(1, u32::MAX).expect("add");
        assert!(cart.add(1, 1).is_err());
    }
}
