// 🔧 Feature Engineering - derived model inputs
//
// Age, renovation recency, binary flags, ratios and one-hot category bins.
// The pricing service publishes the names on `GET /features` and reports
// their count as `features_used`.

use crate::attributes::PropertyAttributes;
use serde::Serialize;

/// Output order of [`FeatureVector::values`]
pub const FEATURE_NAMES: [&str; 30] = [
    "bedrooms",
    "bathrooms",
    "living_area",
    "lot_area",
    "floors",
    "waterfront",
    "views",
    "condition",
    "grade",
    "house_area",
    "basement_area",
    "age",
    "years_since_renovation",
    "latitude",
    "longitude",
    "living_area_renovated",
    "lot_area_renovated",
    "schools_nearby",
    "airport_distance",
    "has_basement",
    "is_renovated",
    "has_waterfront",
    "living_to_lot_ratio",
    "basement_to_house_ratio",
    "condition_category_Average",
    "condition_category_Good",
    "grade_category_Medium",
    "grade_category_High",
    "views_category_Some",
    "views_category_Excellent",
];

/// Three equal-width bins over `[min, max]`, right-closed like `(a, b]`.
/// Returns 0, 1 or 2.
pub fn bin3(value: f64, min: f64, max: f64) -> usize {
    let width = (max - min) / 3.0;
    if value <= min + width {
        0
    } else if value <= min + 2.0 * width {
        1
    } else {
        2
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeatureVector {
    pub values: Vec<f64>,
}

impl FeatureVector {
    pub fn from_attributes(attrs: &PropertyAttributes, current_year: i32) -> Self {
        let year = current_year as f64;
        let age = year - attrs.built_year;
        let is_renovated = attrs.renovation_year > 0.0;
        let years_since_renovation = if is_renovated {
            year - attrs.renovation_year
        } else {
            age
        };

        let flag = |b: bool| if b { 1.0 } else { 0.0 };
        let condition_bin = bin3(attrs.condition, 1.0, 10.0);
        let grade_bin = bin3(attrs.grade, 1.0, 13.0);
        let views_bin = bin3(attrs.views, 0.0, 5.0);

        let values = vec![
            attrs.bedrooms,
            attrs.bathrooms,
            attrs.living_area,
            attrs.lot_area,
            attrs.floors,
            attrs.waterfront,
            attrs.views,
            attrs.condition,
            attrs.grade,
            attrs.house_area,
            attrs.basement_area,
            age,
            years_since_renovation,
            attrs.latitude,
            attrs.longitude,
            attrs.living_area_renovated,
            attrs.lot_area_renovated,
            attrs.schools_nearby,
            attrs.airport_distance,
            flag(attrs.basement_area > 0.0),
            flag(is_renovated),
            flag(attrs.waterfront >= 1.0),
            attrs.living_area / (attrs.lot_area + 1.0),
            attrs.basement_area / (attrs.house_area + 1.0),
            flag(condition_bin == 1),
            flag(condition_bin == 2),
            flag(grade_bin == 1),
            flag(grade_bin == 2),
            flag(views_bin == 1),
            flag(views_bin == 2),
        ];

        FeatureVector { values }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        FEATURE_NAMES
            .iter()
            .position(|n| *n == name)
            .and_then(|i| self.values.get(i).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vector_matches_names() {
        let features = FeatureVector::from_attributes(&PropertyAttributes::default(), 2024);
        assert_eq!(features.len(), FEATURE_NAMES.len());
    }

    #[test]
    fn test_age_and_renovation() {
        let attrs = PropertyAttributes::default();
        let features = FeatureVector::from_attributes(&attrs, 2024);
        assert_eq!(features.get("age"), Some(34.0));
        // Never renovated: recency falls back to age
        assert_eq!(features.get("years_since_renovation"), Some(34.0));
        assert_eq!(features.get("is_renovated"), Some(0.0));

        let renovated = PropertyAttributes {
            renovation_year: 2015.0,
            ..attrs
        };
        let features = FeatureVector::from_attributes(&renovated, 2024);
        assert_eq!(features.get("years_since_renovation"), Some(9.0));
        assert_eq!(features.get("is_renovated"), Some(1.0));
    }

    #[test]
    fn test_ratios() {
        let attrs = PropertyAttributes {
            living_area: 999.0,
            lot_area: 999.0,
            basement_area: 500.0,
            house_area: 999.0,
            ..PropertyAttributes::default()
        };
        let features = FeatureVector::from_attributes(&attrs, 2024);
        assert_eq!(features.get("living_to_lot_ratio"), Some(0.999));
        assert_eq!(features.get("basement_to_house_ratio"), Some(0.5));
        assert_eq!(features.get("has_basement"), Some(1.0));
    }

    #[test]
    fn test_category_bins() {
        assert_eq!(bin3(1.0, 1.0, 10.0), 0);
        assert_eq!(bin3(4.0, 1.0, 10.0), 0);
        assert_eq!(bin3(4.5, 1.0, 10.0), 1);
        assert_eq!(bin3(7.0, 1.0, 10.0), 1);
        assert_eq!(bin3(10.0, 1.0, 10.0), 2);

        // Defaults: condition 7 -> Average, grade 8 -> Medium, views 2 -> Some
        let features = FeatureVector::from_attributes(&PropertyAttributes::default(), 2024);
        assert_eq!(features.get("condition_category_Average"), Some(1.0));
        assert_eq!(features.get("condition_category_Good"), Some(0.0));
        assert_eq!(features.get("grade_category_Medium"), Some(1.0));
        assert_eq!(features.get("views_category_Some"), Some(1.0));
    }
}
