use crate::schema::{Ingredient, Recipe};

/// How many times larger the slider range is than the base servings.
pub const MAX_SERVINGS_FACTOR: u32 = 4;

/// Display-time serving scaling for one recipe. The recipe itself is never modified.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServingScale {
    base: u32,
    servings: u32,
}

impl ServingScale {
    pub fn new(recipe: &Recipe) -> Self {
        let base = recipe.servings.max(1);
        Self {
            base,
            servings: base,
        }
    }

    pub fn base_servings(&self) -> u32 {
        self.base
    }

    pub fn servings(&self) -> u32 {
        self.servings
    }

    pub fn max_servings(&self) -> u32 {
        self.base * MAX_SERVINGS_FACTOR
    }

    /// Set the requested servings, clamped to `1..=max_servings()`.
    pub fn set_servings(&mut self, servings: u32) -> u32 {
        self.servings = servings.clamp(1, self.max_servings());
        self.servings
    }

    pub fn multiplier(&self) -> f64 {
        f64::from(self.servings) / f64::from(self.base)
    }

    pub fn scaled(&self, ingredient: &Ingredient) -> f64 {
        ingredient.quantity * self.multiplier()
    }
}

/// Quantity text for display: whole numbers without decimals, otherwise up to two places.
pub fn format_quantity(quantity: f64) -> String {
    let rounded = (quantity * 100.0).round() / 100.0;
    if rounded.fract() == 0.0 {
        format!("{}", rounded as i64)
    } else {
        format!("{:.2}", rounded)
            .trim_end_matches('0')
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::sample_recipe;

    #[test]
    fn doubling_servings_doubles_quantity() {
        let mut recipe = sample_recipe("Soup");
        recipe.servings = 2;
        let cups = Ingredient {
            name: "Stock".to_string(),
            quantity: 4.0,
            unit: "cups".to_string(),
        };

        let mut scale = ServingScale::new(&recipe);
        assert_eq!(scale.multiplier(), 1.0);
        scale.set_servings(4);
        assert_eq!(scale.scaled(&cups), 8.0);
        assert_eq!(recipe.servings, 2);
    }

    #[test]
    fn servings_clamp_to_slider_range() {
        let mut recipe = sample_recipe("Soup");
        recipe.servings = 3;
        let mut scale = ServingScale::new(&recipe);
        assert_eq!(scale.set_servings(0), 1);
        assert_eq!(scale.set_servings(50), 12);
    }

    #[test]
    fn quantities_format_compactly() {
        assert_eq!(format_quantity(8.0), "8");
        assert_eq!(format_quantity(0.5), "0.5");
        assert_eq!(format_quantity(1.0 / 3.0), "0.33");
        assert_eq!(format_quantity(2.25), "2.25");
    }
}
