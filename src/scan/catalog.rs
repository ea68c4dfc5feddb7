//! Canned assessments handed out in rotation by the scan session.
//!
//! There is no real analysis behind these: every completed cycle takes the
//! entry at `cursor` modulo the catalog size and the cursor moves on by one.

use super::{RiskLevel, ScanResult};

struct Template {
    id: &'static str,
    product_name: &'static str,
    image: &'static str,
    summary: &'static str,
    reasoning: &'static str,
    risk_level: RiskLevel,
    highlight_ingredients: &'static [&'static str],
}

const TEMPLATES: [Template; 5] = [
    Template {
        id: "demo_1",
        product_name: "Mega Fizz Soda",
        image: "https://images.openfoodfacts.org/images/products/544/900/021/4911/front_en.119.400.jpg",
        summary: "High Sugar Warning",
        reasoning: "Contains 40g of added sugar (High Fructose Corn Syrup). Consuming this daily increases risk of insulin resistance. No nutritional value detected.",
        risk_level: RiskLevel::High,
        highlight_ingredients: &["High Fructose Corn Syrup", "Red 40"],
    },
    Template {
        id: "demo_2",
        product_name: "Organic Rolled Oats",
        image: "https://images.openfoodfacts.org/images/products/001/111/080/6389/front_en.3.400.jpg",
        summary: "Excellent Whole Grain",
        reasoning: "Single-ingredient product rich in beta-glucan fiber. Helps lower cholesterol and provides sustained energy.",
        risk_level: RiskLevel::Low,
        highlight_ingredients: &["100% Whole Grain Oats"],
    },
    Template {
        id: "demo_3",
        product_name: "Pro-Fit Protein Bar",
        image: "https://images.openfoodfacts.org/images/products/001/234/567/8901/front_en.4.400.jpg",
        summary: "Processed but High Protein",
        reasoning: "Good protein source (20g), but contains sugar alcohols (Maltitol) which may cause bloating.",
        risk_level: RiskLevel::Medium,
        highlight_ingredients: &["Whey Isolate", "Maltitol"],
    },
    Template {
        id: "demo_4",
        product_name: "Spicy Peanut Noodles",
        image: "https://images.openfoodfacts.org/images/products/073/762/806/4502/front_en.6.400.jpg",
        summary: "Allergen Alert: Peanuts",
        reasoning: "Contains peanuts and sesame oil. Sodium content (900mg) is 40% of your daily limit.",
        risk_level: RiskLevel::High,
        highlight_ingredients: &["Peanuts", "Sesame Oil"],
    },
    Template {
        id: "demo_5",
        product_name: "Hydra Electrolyte Mix",
        image: "https://images.openfoodfacts.org/images/products/085/000/012/3456/front_en.5.400.jpg",
        summary: "Clean Hydration",
        reasoning: "Free from artificial dyes and sweeteners. Uses Stevia and Monk Fruit.",
        risk_level: RiskLevel::Low,
        highlight_ingredients: &["Stevia Leaf", "Potassium"],
    },
];

impl Template {
    fn to_result(&self) -> ScanResult {
        ScanResult {
            id: self.id.to_string(),
            product_name: self.product_name.to_string(),
            image: self.image.to_string(),
            summary: self.summary.to_string(),
            reasoning: self.reasoning.to_string(),
            risk_level: self.risk_level,
            highlight_ingredients: self
                .highlight_ingredients
                .iter()
                .map(|s| s.to_string())
                .collect(),
        }
    }
}

/// Entry selected by a rotating cursor.
pub fn pick(cursor: usize) -> ScanResult {
    TEMPLATES[cursor % TEMPLATES.len()].to_result()
}

pub fn all() -> Vec<ScanResult> {
    TEMPLATES.iter().map(Template::to_result).collect()
}
