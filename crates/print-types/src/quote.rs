use serde::{Deserialize, Serialize};

/// Cubic millimeters per cubic centimeter.
pub const MM3_PER_CM3: f64 = 1000.0;

/// Priced result for one mesh. Values keep full precision; use the
/// `display_*` helpers for two-decimal output.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    /// Enclosed volume in mm³.
    pub volume_mm3: f64,
    /// Estimated material mass in grams, after infill.
    pub mass_grams: f64,
    /// Final price, never below the configured minimum.
    pub price_dollars: f64,
    /// Whether the minimum price replaced the per-gram price.
    pub floor_applied: bool,
}

impl Quote {
    pub fn volume_cm3(&self) -> f64 {
        self.volume_mm3 / MM3_PER_CM3
    }

    pub fn display_mass(&self) -> String {
        format_cents(self.mass_grams)
    }

    pub fn display_price(&self) -> String {
        format_cents(self.price_dollars)
    }
}

/// Format with exactly two decimal places.
pub fn format_cents(value: f64) -> String {
    format!("{:.2}", value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn display_uses_two_decimals() {
        let quote = Quote {
            volume_mm3: 1000.0,
            mass_grams: 0.5208,
            price_dollars: 2.0,
            floor_applied: true,
        };
        assert_eq!(quote.display_mass(), "0.52");
        assert_eq!(quote.display_price(), "2.00");
        assert_relative_eq!(quote.volume_cm3(), 1.0);
    }

    #[test]
    fn format_cents_pads_to_two_places() {
        assert_eq!(format_cents(0.372), "0.37");
        assert_eq!(format_cents(1.24), "1.24");
        assert_eq!(format_cents(10.0), "10.00");
    }
}
