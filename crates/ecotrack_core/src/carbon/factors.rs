//! Emission factors keyed by `(category, subcategory)`.

use crate::model::category::Category;

/// Factor used when no `(category, subcategory)` entry exists.
pub const DEFAULT_FACTOR: f64 = 0.1;

/// `(category, subcategory, kg CO₂e per unit)`; the unit is km, kg/serving,
/// kWh or currency unit depending on the category.
const EMISSION_FACTORS: &[(Category, &str, f64)] = &[
    // per km
    (Category::Transport, "car_gasoline", 0.21),
    (Category::Transport, "car_diesel", 0.17),
    (Category::Transport, "car_electric", 0.05),
    (Category::Transport, "bus", 0.08),
    (Category::Transport, "train", 0.04),
    (Category::Transport, "plane_domestic", 0.25),
    (Category::Transport, "plane_international", 0.18),
    // per kg or serving
    (Category::Food, "beef", 27.0),
    (Category::Food, "pork", 12.1),
    (Category::Food, "chicken", 6.9),
    (Category::Food, "fish", 6.1),
    (Category::Food, "dairy", 3.2),
    (Category::Food, "vegetables", 2.0),
    (Category::Food, "fruits", 1.1),
    (Category::Food, "grains", 1.4),
    // per kWh
    (Category::Energy, "electricity_grid", 0.5),
    (Category::Energy, "natural_gas", 0.18),
    (Category::Energy, "heating_oil", 0.27),
    // per currency unit spent
    (Category::Shopping, "clothing", 0.5),
    (Category::Shopping, "electronics", 0.3),
    (Category::Shopping, "home_goods", 0.2),
    (Category::Shopping, "books_media", 0.1),
];

/// Looks up the factor for one category/subcategory pair.
pub fn emission_factor(category: Category, subcategory: &str) -> Option<f64> {
    let subcategory = subcategory.trim();
    EMISSION_FACTORS
        .iter()
        .find(|(entry_category, entry_subcategory, _)| {
            *entry_category == category && entry_subcategory.eq_ignore_ascii_case(subcategory)
        })
        .map(|(_, _, kg_per_unit)| *kg_per_unit)
}

/// Estimates impact as `quantity * amount * factor`.
///
/// `quantity` defaults to 1 and unknown pairs use [`DEFAULT_FACTOR`].
pub fn calculate_carbon_impact(
    category: Category,
    subcategory: &str,
    amount: f64,
    quantity: Option<f64>,
) -> f64 {
    let factor = emission_factor(category, subcategory).unwrap_or(DEFAULT_FACTOR);
    quantity.unwrap_or(1.0) * amount * factor
}

#[cfg(test)]
mod tests {
    use super::{calculate_carbon_impact, emission_factor, DEFAULT_FACTOR};
    use crate::model::category::Category;

    #[test]
    fn known_pairs_resolve() {
        assert_eq!(emission_factor(Category::Food, "beef"), Some(27.0));
        assert_eq!(emission_factor(Category::Energy, "Natural_Gas"), Some(0.18));
        assert_eq!(emission_factor(Category::Shopping, "beef"), None);
    }

    #[test]
    fn impact_multiplies_quantity_amount_and_factor() {
        let impact = calculate_carbon_impact(Category::Food, "beef", 2.0, Some(3.0));
        assert!((impact - 162.0).abs() < 1e-9);

        let unknown = calculate_carbon_impact(Category::Other, "mystery", 40.0, None);
        assert!((unknown - 40.0 * DEFAULT_FACTOR).abs() < 1e-9);
    }
}
