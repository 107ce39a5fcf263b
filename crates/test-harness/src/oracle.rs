//! Verification oracles: pure functions returning pass/fail verdicts.
//!
//! Each oracle returns an `OracleVerdict` with diagnostic detail, not panics,
//! so a run can collect every failure in one pass.

use pricing_engine::{enclosed_volume_mm3, PricingConfig};
use print_types::{MeshGeometry, Quote};

use crate::helpers::{edge_use_counts, mesh_extents};

/// The result of a single oracle check.
#[derive(Debug, Clone)]
pub struct OracleVerdict {
    pub oracle_name: String,
    pub passed: bool,
    pub detail: String,
    pub value: Option<f64>,
}

impl OracleVerdict {
    fn pass(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: None,
        }
    }

    fn pass_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: true,
            detail,
            value: Some(value),
        }
    }

    fn fail(name: &str, detail: String) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: None,
        }
    }

    fn fail_val(name: &str, detail: String, value: f64) -> Self {
        Self {
            oracle_name: name.to_string(),
            passed: false,
            detail,
            value: Some(value),
        }
    }
}

// ── Geometry Oracles ────────────────────────────────────────────────────────

/// Enclosed volume within `rel_tol` of `expected_mm3`.
pub fn check_volume(mesh: &MeshGeometry, expected_mm3: f64, rel_tol: f64) -> OracleVerdict {
    let volume = enclosed_volume_mm3(mesh);
    let scale = expected_mm3.abs().max(1.0);
    let error = (volume - expected_mm3).abs() / scale;

    if error <= rel_tol {
        OracleVerdict::pass_val(
            "volume",
            format!("{:.6} mm³ (expected {:.6})", volume, expected_mm3),
            volume,
        )
    } else {
        OracleVerdict::fail_val(
            "volume",
            format!(
                "{:.6} mm³, expected {:.6} (relative error {:.3e} > {:.3e})",
                volume, expected_mm3, error, rel_tol
            ),
            volume,
        )
    }
}

/// Every edge is shared by exactly two triangles.
pub fn check_watertight_mesh(mesh: &MeshGeometry) -> OracleVerdict {
    let counts = edge_use_counts(mesh);
    let unpaired = counts.values().filter(|&&c| c != 2).count();

    if unpaired == 0 {
        OracleVerdict::pass(
            "watertight_mesh",
            format!("all {} edges paired", counts.len()),
        )
    } else {
        OracleVerdict::fail(
            "watertight_mesh",
            format!("{} unpaired edges out of {} total", unpaired, counts.len()),
        )
    }
}

/// Bounding-box extents match `expected` within `tol` on every axis.
pub fn check_bounding_box(mesh: &MeshGeometry, expected: [f64; 3], tol: f64) -> OracleVerdict {
    let actual = mesh_extents(mesh);
    let worst = (0..3)
        .map(|i| (actual[i] - expected[i]).abs())
        .fold(0.0_f64, f64::max);

    if worst <= tol {
        OracleVerdict::pass_val("bounding_box", format!("extents {:?}", actual), worst)
    } else {
        OracleVerdict::fail_val(
            "bounding_box",
            format!("extents {:?}, expected {:?}", actual, expected),
            worst,
        )
    }
}

// ── Pricing Oracles ─────────────────────────────────────────────────────────

/// Price is the minimum exactly when the linear price falls below it, and the
/// linear price otherwise.
pub fn check_price_floor(quote: &Quote, config: &PricingConfig) -> OracleVerdict {
    let linear = quote.mass_grams * config.price_per_gram;
    let below_floor = linear < config.min_price;
    let expected = if below_floor { config.min_price } else { linear };

    if quote.price_dollars != expected {
        return OracleVerdict::fail_val(
            "price_floor",
            format!(
                "price {} but max({} × {}, {}) = {}",
                quote.price_dollars,
                quote.mass_grams,
                config.price_per_gram,
                config.min_price,
                expected
            ),
            quote.price_dollars,
        );
    }
    if quote.floor_applied != below_floor {
        return OracleVerdict::fail_val(
            "price_floor",
            format!(
                "floor_applied = {} but linear price {} vs minimum {}",
                quote.floor_applied, linear, config.min_price
            ),
            quote.price_dollars,
        );
    }
    OracleVerdict::pass_val(
        "price_floor",
        format!(
            "{} ({})",
            quote.display_price(),
            if below_floor { "minimum" } else { "per gram" }
        ),
        quote.price_dollars,
    )
}

/// A quote exists only for masses within the configured limit.
pub fn check_mass_limit(quote: &Quote, config: &PricingConfig) -> OracleVerdict {
    if quote.mass_grams <= config.max_mass_grams {
        OracleVerdict::pass_val(
            "mass_limit",
            format!("{:.4} g ≤ {} g", quote.mass_grams, config.max_mass_grams),
            quote.mass_grams,
        )
    } else {
        OracleVerdict::fail_val(
            "mass_limit",
            format!(
                "quoted {:.4} g above the {} g limit",
                quote.mass_grams, config.max_mass_grams
            ),
            quote.mass_grams,
        )
    }
}

// ── Composite ───────────────────────────────────────────────────────────────

/// Run every oracle that needs no expected values.
pub fn run_all_quote_checks(
    mesh: &MeshGeometry,
    quote: &Quote,
    config: &PricingConfig,
) -> Vec<OracleVerdict> {
    vec![
        check_watertight_mesh(mesh),
        check_volume(mesh, quote.volume_mm3, 1e-12),
        check_price_floor(quote, config),
        check_mass_limit(quote, config),
    ]
}
