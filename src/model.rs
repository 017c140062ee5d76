//! Output schema

use serde::{Deserialize, Serialize};

/// One product located on the page. Only emitted with a non-empty name.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ProductRecord {
    pub product_name: String,
    pub description: String,
    pub available_sizes: Vec<String>,
    pub nutrition_facts: NutritionFacts,
    pub ingredients: Vec<String>,
    /// Absolute URL, or empty when missing or unresolvable
    pub product_image_link: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct NutritionFacts {
    pub serving_size: String,
    pub servings_per_container: Option<u32>,
    pub calories: Option<f64>,
    pub total_fat: Nutrient,
    pub sodium: Nutrient,
    pub total_carbohydrate: Nutrient,
    pub total_sugars: Sugars,
    pub protein: Nutrient,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Nutrient {
    pub value: Option<f64>,
    /// Empty, or a fragment containing `%`
    pub daily_value: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Sugars {
    pub value: Option<f64>,
    pub includes_added_sugars: Nutrient,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_record_shape() {
        let json = serde_json::to_value(ProductRecord::default()).unwrap();

        assert_eq!(json["nutrition_facts"]["calories"], serde_json::Value::Null);
        assert_eq!(json["nutrition_facts"]["total_fat"]["daily_value"], "");
        assert_eq!(
            json["nutrition_facts"]["total_sugars"]["includes_added_sugars"]["value"],
            serde_json::Value::Null
        );
        assert_eq!(json["available_sizes"], serde_json::json!([]));
    }
}
