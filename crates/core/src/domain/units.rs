use serde::{Deserialize, Serialize};

/// Linear unit for catalog dimensions. The engine never converts between
/// linear units; gear and case dimensions must already share a unit.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DimensionUnit {
    In,
    Cm,
}

impl DimensionUnit {
    pub fn as_str(&self) -> &'static str {
        match self {
            DimensionUnit::In => "in",
            DimensionUnit::Cm => "cm",
        }
    }

    pub fn parse(value: &str) -> Option<DimensionUnit> {
        match value.to_ascii_lowercase().as_str() {
            "in" => Some(DimensionUnit::In),
            "cm" => Some(DimensionUnit::Cm),
            _ => None,
        }
    }
}

/// Length, width, and height in a single linear unit.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Dimensions {
    pub length: f64,
    pub width: f64,
    pub height: f64,
    pub unit: DimensionUnit,
}

impl Dimensions {
    pub fn new(length: f64, width: f64, height: f64, unit: DimensionUnit) -> Self {
        Self { length, width, height, unit }
    }

    /// Axes in a fixed (length, width, height) order.
    pub fn axes(&self) -> [f64; 3] {
        [self.length, self.width, self.height]
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeightUnit {
    Lb,
    Kg,
    G,
    Oz,
}

impl WeightUnit {
    fn kg_factor(&self) -> f64 {
        match self {
            WeightUnit::Lb => 0.453_592_37,
            WeightUnit::Kg => 1.0,
            WeightUnit::G => 0.001,
            WeightUnit::Oz => 0.028_349_523,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            WeightUnit::Lb => "lb",
            WeightUnit::Kg => "kg",
            WeightUnit::G => "g",
            WeightUnit::Oz => "oz",
        }
    }

    pub fn parse(value: &str) -> Option<WeightUnit> {
        match value.to_ascii_lowercase().as_str() {
            "lb" => Some(WeightUnit::Lb),
            "kg" => Some(WeightUnit::Kg),
            "g" => Some(WeightUnit::G),
            "oz" => Some(WeightUnit::Oz),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Weight {
    pub value: f64,
    pub unit: WeightUnit,
}

impl Weight {
    pub fn new(value: f64, unit: WeightUnit) -> Self {
        Self { value, unit }
    }

    /// Converted value in kilograms, the common unit for weight-ratio scoring.
    pub fn in_kg(&self) -> f64 {
        self.value * self.unit.kg_factor()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weight_conversion_to_kg() {
        assert!((Weight::new(1.0, WeightUnit::Kg).in_kg() - 1.0).abs() < 1e-9);
        assert!((Weight::new(1000.0, WeightUnit::G).in_kg() - 1.0).abs() < 1e-9);
        assert!((Weight::new(2.0, WeightUnit::Lb).in_kg() - 0.907_184_74).abs() < 1e-6);
        assert!((Weight::new(16.0, WeightUnit::Oz).in_kg() - 0.453_592_368).abs() < 1e-6);
    }

    #[test]
    fn axes_keep_declaration_order() {
        let dims = Dimensions::new(18.0, 9.0, 4.5, DimensionUnit::In);
        assert_eq!(dims.axes(), [18.0, 9.0, 4.5]);
    }
}
