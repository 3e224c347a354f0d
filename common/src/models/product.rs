use serde::{Deserialize, Serialize};

/// A catalog line with its current quantity in the cart
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    /// Display name (e.g., "Peas")
    pub name: String,
    /// Singular unit (e.g., "bag")
    pub unit: String,
    /// Plural unit (e.g., "bags")
    pub plural_unit: String,
    /// Price of one unit in the base currency
    pub unit_price: f64,
    /// Units in the cart
    pub quantity: u32,
}

impl Product {
    pub fn new(
        name: impl Into<String>,
        unit: impl Into<String>,
        plural_unit: impl Into<String>,
        unit_price: f64,
    ) -> Self {
        Self {
            name: name.into(),
            unit: unit.into(),
            plural_unit: plural_unit.into(),
            unit_price,
            quantity: 0,
        }
    }

    pub fn with_quantity(mut self, quantity: u32) -> Self {
        self.quantity = quantity;
        self
    }

    /// Unit label for a count, e.g. "1 bag" but "2 bags"
    pub fn unit_label(&self, count: u32) -> &str {
        if count == 1 {
            &self.unit
        } else {
            &self.plural_unit
        }
    }

    /// Cost of the current quantity in the base currency
    pub fn subtotal(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unit_label() {
        let peas = Product::new("Peas", "bag", "bags", 0.95);
        assert_eq!(peas.unit_label(1), "bag");
        assert_eq!(peas.unit_label(0), "bags");
        assert_eq!(peas.unit_label(3), "bags");
    }

    #[test]
    fn test_subtotal() {
        let eggs = Product::new("Eggs", "dozen", "dozen", 2.10).with_quantity(3);
        assert!((eggs.subtotal() - 6.30).abs() < 1e-9);
        assert_eq!(Product::new("Milk", "bottle", "bottles", 1.30).subtotal(), 0.0);
    }
}
