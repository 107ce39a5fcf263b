//! Configuration for the pricing engine.

use serde::{Deserialize, Serialize};

/// Rejected pricing configuration values.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be a finite number, got {value}")]
    NotFinite { field: &'static str, value: f64 },

    #[error("{field} must be greater than zero, got {value}")]
    NotPositive { field: &'static str, value: f64 },

    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },

    #[error("infill fraction must be in (0, 1], got {value}")]
    InfillOutOfRange { value: f64 },
}

/// Material and pricing constants for one quoting policy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PricingConfig {
    /// Material density (g/cm³).
    pub density: f64,
    /// Share of the enclosed volume actually printed. 1.0 means solid.
    pub infill_fraction: f64,
    /// Price per gram of material.
    pub price_per_gram: f64,
    /// Lowest price ever quoted; covers fixed setup cost.
    pub min_price: f64,
    /// Heaviest model accepted for automatic quoting (g, after infill).
    pub max_mass_grams: f64,
}

impl Default for PricingConfig {
    /// PLA at 42% infill.
    fn default() -> Self {
        Self {
            density: 1.24,
            infill_fraction: 0.42,
            price_per_gram: 0.63,
            min_price: 2.0,
            max_mass_grams: 200.0,
        }
    }
}

impl PricingConfig {
    /// Fully solid prints, otherwise the defaults.
    pub fn solid() -> Self {
        Self {
            infill_fraction: 1.0,
            ..Self::default()
        }
    }

    pub fn with_density(mut self, density: f64) -> Self {
        self.density = density;
        self
    }

    pub fn with_infill_fraction(mut self, infill_fraction: f64) -> Self {
        self.infill_fraction = infill_fraction;
        self
    }

    pub fn with_price_per_gram(mut self, price_per_gram: f64) -> Self {
        self.price_per_gram = price_per_gram;
        self
    }

    pub fn with_min_price(mut self, min_price: f64) -> Self {
        self.min_price = min_price;
        self
    }

    pub fn with_max_mass_grams(mut self, max_mass_grams: f64) -> Self {
        self.max_mass_grams = max_mass_grams;
        self
    }

    /// Check every knob is finite and in range.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("density", self.density),
            ("infill_fraction", self.infill_fraction),
            ("price_per_gram", self.price_per_gram),
            ("min_price", self.min_price),
            ("max_mass_grams", self.max_mass_grams),
        ];
        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NotFinite { field, value });
            }
        }

        if self.density <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "density",
                value: self.density,
            });
        }
        if self.infill_fraction <= 0.0 || self.infill_fraction > 1.0 {
            return Err(ConfigError::InfillOutOfRange {
                value: self.infill_fraction,
            });
        }
        if self.price_per_gram < 0.0 {
            return Err(ConfigError::Negative {
                field: "price_per_gram",
                value: self.price_per_gram,
            });
        }
        if self.min_price < 0.0 {
            return Err(ConfigError::Negative {
                field: "min_price",
                value: self.min_price,
            });
        }
        if self.max_mass_grams <= 0.0 {
            return Err(ConfigError::NotPositive {
                field: "max_mass_grams",
                value: self.max_mass_grams,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(PricingConfig::default().validate(), Ok(()));
        assert_eq!(PricingConfig::solid().validate(), Ok(()));
        assert_eq!(PricingConfig::solid().infill_fraction, 1.0);
    }

    #[test]
    fn builders_override_single_fields() {
        let config = PricingConfig::default()
            .with_price_per_gram(0.30)
            .with_min_price(10.0);
        assert_eq!(config.price_per_gram, 0.30);
        assert_eq!(config.min_price, 10.0);
        assert_eq!(config.density, 1.24);
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert_eq!(
            PricingConfig::default().with_density(0.0).validate(),
            Err(ConfigError::NotPositive {
                field: "density",
                value: 0.0
            })
        );
        assert_eq!(
            PricingConfig::default().with_infill_fraction(1.5).validate(),
            Err(ConfigError::InfillOutOfRange { value: 1.5 })
        );
        assert_eq!(
            PricingConfig::default().with_min_price(-1.0).validate(),
            Err(ConfigError::Negative {
                field: "min_price",
                value: -1.0
            })
        );
        assert!(matches!(
            PricingConfig::default()
                .with_max_mass_grams(f64::NAN)
                .validate(),
            Err(ConfigError::NotFinite {
                field: "max_mass_grams",
                ..
            })
        ));
    }

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config: PricingConfig =
            serde_json::from_str(r#"{"pricePerGram": 0.3, "minPrice": 10}"#).unwrap();
        assert_eq!(config.price_per_gram, 0.3);
        assert_eq!(config.min_price, 10.0);
        assert_eq!(config.max_mass_grams, 200.0);
    }
}
