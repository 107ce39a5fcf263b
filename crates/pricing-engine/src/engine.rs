use print_types::{MeshGeometry, Quote, MM3_PER_CM3};
use tracing::{info, instrument, warn};

use crate::config::{ConfigError, PricingConfig};
use crate::volume::enclosed_volume_mm3;

/// Reasons a parsed mesh cannot be quoted.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum QuoteError {
    #[error("Model exceeds {max_mass_grams}g auto limit.")]
    ModelTooLarge {
        mass_grams: f64,
        max_mass_grams: f64,
    },

    #[error("computed volume is not finite: {volume_mm3}")]
    NonFiniteVolume { volume_mm3: f64 },
}

impl QuoteError {
    /// Whether the uploader can fix this by changing the model.
    pub fn is_client_error(&self) -> bool {
        matches!(self, QuoteError::ModelTooLarge { .. })
    }
}

/// Turns mesh geometry into a [`Quote`] under one fixed [`PricingConfig`].
#[derive(Debug, Clone)]
pub struct PricingEngine {
    config: PricingConfig,
}

impl PricingEngine {
    pub fn new(config: PricingConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &PricingConfig {
        &self.config
    }

    /// Integrate the mesh volume and price it.
    #[instrument(skip_all, fields(triangles = mesh.triangle_count()))]
    pub fn quote(&self, mesh: &MeshGeometry) -> Result<Quote, QuoteError> {
        self.quote_volume(enclosed_volume_mm3(mesh))
    }

    /// Price an already-known enclosed volume (mm³).
    pub fn quote_volume(&self, volume_mm3: f64) -> Result<Quote, QuoteError> {
        if !volume_mm3.is_finite() {
            return Err(QuoteError::NonFiniteVolume { volume_mm3 });
        }

        let mass_grams = self.mass_grams(volume_mm3);
        if mass_grams > self.config.max_mass_grams {
            warn!(
                mass_grams,
                max_mass_grams = self.config.max_mass_grams,
                "model over automatic quote limit"
            );
            return Err(QuoteError::ModelTooLarge {
                mass_grams,
                max_mass_grams: self.config.max_mass_grams,
            });
        }

        let (price_dollars, floor_applied) = self.price_for_mass(mass_grams);
        info!(
            volume_mm3,
            mass_grams,
            price_dollars,
            floor_applied,
            "quoted model"
        );

        Ok(Quote {
            volume_mm3,
            mass_grams,
            price_dollars,
            floor_applied,
        })
    }

    /// Material mass (g) for an enclosed volume (mm³), after infill.
    pub fn mass_grams(&self, volume_mm3: f64) -> f64 {
        volume_mm3 / MM3_PER_CM3 * self.config.density * self.config.infill_fraction
    }

    /// Price for a mass, clamped up to the minimum. The flag reports whether
    /// the floor was used.
    pub fn price_for_mass(&self, mass_grams: f64) -> (f64, bool) {
        let price = mass_grams * self.config.price_per_gram;
        if price < self.config.min_price {
            (self.config.min_price, true)
        } else {
            (price, false)
        }
    }
}
