// 🏠 Property Attributes - Field Registry
// Every numeric field of the pricing form, with its label and declared range

use chrono::Datelike;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// ============================================================================
// FIELDS
// ============================================================================

/// Name of one field of [`PropertyAttributes`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Bedrooms,
    Bathrooms,
    LivingArea,
    LotArea,
    Floors,
    Waterfront,
    Views,
    Condition,
    Grade,
    HouseArea,
    BasementArea,
    BuiltYear,
    RenovationYear,
    Latitude,
    Longitude,
    LivingAreaRenovated,
    LotAreaRenovated,
    SchoolsNearby,
    AirportDistance,
}

impl Field {
    /// All fields, in form order.
    pub const ALL: [Field; 19] = [
        Field::Bedrooms,
        Field::Bathrooms,
        Field::LivingArea,
        Field::LotArea,
        Field::Floors,
        Field::Waterfront,
        Field::Views,
        Field::Condition,
        Field::Grade,
        Field::HouseArea,
        Field::BasementArea,
        Field::BuiltYear,
        Field::RenovationYear,
        Field::Latitude,
        Field::Longitude,
        Field::LivingAreaRenovated,
        Field::LotAreaRenovated,
        Field::SchoolsNearby,
        Field::AirportDistance,
    ];

    /// Wire name (JSON key)
    pub fn name(&self) -> &'static str {
        match self {
            Field::Bedrooms => "bedrooms",
            Field::Bathrooms => "bathrooms",
            Field::LivingArea => "living_area",
            Field::LotArea => "lot_area",
            Field::Floors => "floors",
            Field::Waterfront => "waterfront",
            Field::Views => "views",
            Field::Condition => "condition",
            Field::Grade => "grade",
            Field::HouseArea => "house_area",
            Field::BasementArea => "basement_area",
            Field::BuiltYear => "built_year",
            Field::RenovationYear => "renovation_year",
            Field::Latitude => "latitude",
            Field::Longitude => "longitude",
            Field::LivingAreaRenovated => "living_area_renovated",
            Field::LotAreaRenovated => "lot_area_renovated",
            Field::SchoolsNearby => "schools_nearby",
            Field::AirportDistance => "airport_distance",
        }
    }

    /// Human-readable label shown next to the input
    pub fn label(&self) -> &'static str {
        match self {
            Field::Bedrooms => "Bedrooms",
            Field::Bathrooms => "Bathrooms",
            Field::LivingArea => "Living area (sq ft)",
            Field::LotArea => "Lot area (sq ft)",
            Field::Floors => "Floors",
            Field::Waterfront => "Waterfront (0/1)",
            Field::Views => "Views",
            Field::Condition => "Condition",
            Field::Grade => "Grade",
            Field::HouseArea => "House area (sq ft)",
            Field::BasementArea => "Basement area (sq ft)",
            Field::BuiltYear => "Built year",
            Field::RenovationYear => "Renovation year",
            Field::Latitude => "Latitude",
            Field::Longitude => "Longitude",
            Field::LivingAreaRenovated => "Living area renovated",
            Field::LotAreaRenovated => "Lot area renovated",
            Field::SchoolsNearby => "Schools nearby",
            Field::AirportDistance => "Airport distance (km)",
        }
    }

    pub fn from_name(name: &str) -> Option<Field> {
        Field::ALL.iter().copied().find(|f| f.name() == name)
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// PROPERTY ATTRIBUTES
// ============================================================================

/// The attribute set submitted for pricing.
///
/// Serialized with the same snake_case keys the pricing service expects.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PropertyAttributes {
    pub bedrooms: f64,
    pub bathrooms: f64,
    pub living_area: f64,
    pub lot_area: f64,
    pub floors: f64,
    /// 0 or 1
    pub waterfront: f64,
    pub views: f64,
    pub condition: f64,
    pub grade: f64,
    pub house_area: f64,
    pub basement_area: f64,
    pub built_year: f64,
    pub renovation_year: f64,
    pub latitude: f64,
    pub longitude: f64,
    pub living_area_renovated: f64,
    pub lot_area_renovated: f64,
    pub schools_nearby: f64,
    pub airport_distance: f64,
}

impl Default for PropertyAttributes {
    fn default() -> Self {
        PropertyAttributes {
            bedrooms: 3.0,
            bathrooms: 2.0,
            living_area: 1800.0,
            lot_area: 5000.0,
            floors: 2.0,
            waterfront: 0.0,
            views: 2.0,
            condition: 7.0,
            grade: 8.0,
            house_area: 1620.0,
            basement_area: 0.0,
            built_year: 1990.0,
            renovation_year: 0.0,
            latitude: 47.5,
            longitude: -122.2,
            living_area_renovated: 1800.0,
            lot_area_renovated: 5000.0,
            schools_nearby: 3.0,
            airport_distance: 20.0,
        }
    }
}

impl PropertyAttributes {
    pub fn get(&self, field: Field) -> f64 {
        match field {
            Field::Bedrooms => self.bedrooms,
            Field::Bathrooms => self.bathrooms,
            Field::LivingArea => self.living_area,
            Field::LotArea => self.lot_area,
            Field::Floors => self.floors,
            Field::Waterfront => self.waterfront,
            Field::Views => self.views,
            Field::Condition => self.condition,
            Field::Grade => self.grade,
            Field::HouseArea => self.house_area,
            Field::BasementArea => self.basement_area,
            Field::BuiltYear => self.built_year,
            Field::RenovationYear => self.renovation_year,
            Field::Latitude => self.latitude,
            Field::Longitude => self.longitude,
            Field::LivingAreaRenovated => self.living_area_renovated,
            Field::LotAreaRenovated => self.lot_area_renovated,
            Field::SchoolsNearby => self.schools_nearby,
            Field::AirportDistance => self.airport_distance,
        }
    }

    /// Raw write of a single field. Derived fields are NOT updated here,
    /// see [`crate::validation::FieldValidator::apply_edit`].
    pub fn set(&mut self, field: Field, value: f64) {
        let slot = match field {
            Field::Bedrooms => &mut self.bedrooms,
            Field::Bathrooms => &mut self.bathrooms,
            Field::LivingArea => &mut self.living_area,
            Field::LotArea => &mut self.lot_area,
            Field::Floors => &mut self.floors,
            Field::Waterfront => &mut self.waterfront,
            Field::Views => &mut self.views,
            Field::Condition => &mut self.condition,
            Field::Grade => &mut self.grade,
            Field::HouseArea => &mut self.house_area,
            Field::BasementArea => &mut self.basement_area,
            Field::BuiltYear => &mut self.built_year,
            Field::RenovationYear => &mut self.renovation_year,
            Field::Latitude => &mut self.latitude,
            Field::Longitude => &mut self.longitude,
            Field::LivingAreaRenovated => &mut self.living_area_renovated,
            Field::LotAreaRenovated => &mut self.lot_area_renovated,
            Field::SchoolsNearby => &mut self.schools_nearby,
            Field::AirportDistance => &mut self.airport_distance,
        };
        *slot = value;
    }

    /// (field, value) pairs in form order
    pub fn iter(&self) -> impl Iterator<Item = (Field, f64)> + '_ {
        Field::ALL.iter().map(move |&f| (f, self.get(f)))
    }
}

// ============================================================================
// VALIDATION RANGE
// ============================================================================

/// Inclusive numeric range with the message shown when a value falls outside.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationRange {
    pub min: f64,
    pub max: f64,
    pub message: String,
}

impl ValidationRange {
    pub fn new(min: f64, max: f64, message: impl Into<String>) -> Self {
        ValidationRange {
            min,
            max,
            message: message.into(),
        }
    }

    /// NaN and infinities are never in range.
    pub fn contains(&self, value: f64) -> bool {
        value.is_finite() && value >= self.min && value <= self.max
    }
}

// ============================================================================
// ATTRIBUTE DEFINITION
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttributeDefinition {
    pub field: Field,

    /// What does this attribute mean?
    pub description: String,

    /// Declared range, if the field is validated at all
    pub range: Option<ValidationRange>,
}

impl AttributeDefinition {
    pub fn new(field: Field) -> Self {
        AttributeDefinition {
            field,
            description: String::new(),
            range: None,
        }
    }

    /// Builder: add description
    pub fn with_description(mut self, desc: impl Into<String>) -> Self {
        self.description = desc.into();
        self
    }

    /// Builder: add validation range
    pub fn with_range(mut self, min: f64, max: f64, message: impl Into<String>) -> Self {
        self.range = Some(ValidationRange::new(min, max, message));
        self
    }
}

// ============================================================================
// ATTRIBUTE REGISTRY
// ============================================================================

/// Catalog of every form field and how it is validated.
///
/// Built once; the year bounds of `built_year` and `renovation_year` are
/// fixed to the year the registry was created for.
#[derive(Debug, Clone)]
pub struct AttributeRegistry {
    attributes: BTreeMap<Field, AttributeDefinition>,
    current_year: i32,
}

impl AttributeRegistry {
    /// Registry bounded by the current local year
    pub fn new() -> Self {
        Self::for_year(chrono::Local::now().year())
    }

    pub fn for_year(current_year: i32) -> Self {
        let mut registry = AttributeRegistry {
            attributes: BTreeMap::new(),
            current_year,
        };

        registry.register_core_attributes();
        registry
    }

    fn register_core_attributes(&mut self) {
        let year = self.current_year;

        // ====================================================================
        // LAYOUT
        // ====================================================================

        self.register(
            AttributeDefinition::new(Field::Bedrooms)
                .with_description("Number of bedrooms")
                .with_range(1.0, 20.0, "Bedrooms must be between 1 and 20"),
        );
        self.register(
            AttributeDefinition::new(Field::Bathrooms)
                .with_description("Number of bathrooms, half baths count 0.5")
                .with_range(0.5, 20.0, "Bathrooms must be between 0.5 and 20"),
        );
        self.register(
            AttributeDefinition::new(Field::Floors)
                .with_description("Number of floors")
                .with_range(1.0, 10.0, "Floors must be between 1 and 10"),
        );

        // ====================================================================
        // AREAS
        // ====================================================================

        self.register(
            AttributeDefinition::new(Field::LivingArea)
                .with_description("Living area in square feet")
                .with_range(100.0, 50_000.0, "Living area must be between 100 and 50,000 sq ft"),
        );
        self.register(
            AttributeDefinition::new(Field::LotArea)
                .with_description("Lot area in square feet")
                .with_range(100.0, 1_000_000.0, "Lot area must be between 100 and 1,000,000 sq ft"),
        );
        self.register(
            AttributeDefinition::new(Field::HouseArea)
                .with_description("House area excluding basement, derived from living area")
                .with_range(100.0, 50_000.0, "House area must be between 100 and 50,000 sq ft"),
        );
        self.register(
            AttributeDefinition::new(Field::BasementArea)
                .with_description("Basement area in square feet")
                .with_range(0.0, 10_000.0, "Basement area must be between 0 and 10,000 sq ft"),
        );
        self.register(
            AttributeDefinition::new(Field::LivingAreaRenovated)
                .with_description("Living area after the last renovation"),
        );
        self.register(
            AttributeDefinition::new(Field::LotAreaRenovated)
                .with_description("Lot area after the last renovation"),
        );

        // ====================================================================
        // QUALITY
        // ====================================================================

        self.register(
            AttributeDefinition::new(Field::Waterfront)
                .with_description("Waterfront present: 0 = no, 1 = yes")
                .with_range(0.0, 1.0, "Waterfront must be 0 (no) or 1 (yes)"),
        );
        self.register(
            AttributeDefinition::new(Field::Views)
                .with_description("Number of views")
                .with_range(0.0, 5.0, "Views must be between 0 and 5"),
        );
        self.register(
            AttributeDefinition::new(Field::Condition)
                .with_description("Condition of the house")
                .with_range(1.0, 10.0, "Condition must be between 1 and 10"),
        );
        self.register(
            AttributeDefinition::new(Field::Grade)
                .with_description("Construction grade of the house")
                .with_range(1.0, 13.0, "Grade must be between 1 and 13"),
        );

        // ====================================================================
        // HISTORY
        // ====================================================================

        self.register(
            AttributeDefinition::new(Field::BuiltYear)
                .with_description("Year the house was built")
                .with_range(
                    1800.0,
                    year as f64,
                    format!("Built year must be between 1800 and {}", year),
                ),
        );
        self.register(
            AttributeDefinition::new(Field::RenovationYear)
                .with_description("Year of the last renovation, 0 if never renovated")
                .with_range(
                    0.0,
                    year as f64,
                    format!("Renovation year must be between 0 and {}", year),
                ),
        );

        // ====================================================================
        // LOCATION
        // ====================================================================

        self.register(AttributeDefinition::new(Field::Latitude).with_description("Latitude"));
        self.register(AttributeDefinition::new(Field::Longitude).with_description("Longitude"));
        self.register(
            AttributeDefinition::new(Field::SchoolsNearby)
                .with_description("Number of schools nearby")
                .with_range(0.0, 50.0, "Schools nearby must be between 0 and 50"),
        );
        self.register(
            AttributeDefinition::new(Field::AirportDistance)
                .with_description("Distance from the airport in km")
                .with_range(0.0, 500.0, "Airport distance must be between 0 and 500 km"),
        );
    }

    pub fn register(&mut self, attr: AttributeDefinition) {
        self.attributes.insert(attr.field, attr);
    }

    pub fn get(&self, field: Field) -> Option<&AttributeDefinition> {
        self.attributes.get(&field)
    }

    pub fn get_by_name(&self, name: &str) -> Option<&AttributeDefinition> {
        Field::from_name(name).and_then(|f| self.get(f))
    }

    /// Declared range for a field, `None` for unvalidated fields
    pub fn range(&self, field: Field) -> Option<&ValidationRange> {
        self.get(field).and_then(|attr| attr.range.as_ref())
    }

    pub fn list_all(&self) -> Vec<&AttributeDefinition> {
        self.attributes.values().collect()
    }

    pub fn count(&self) -> usize {
        self.attributes.len()
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }
}

impl Default for AttributeRegistry {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
