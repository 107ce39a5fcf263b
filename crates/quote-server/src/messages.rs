use print_types::Quote;
use serde::{Deserialize, Serialize};

/// Successful `/price` response. Amounts are two-decimal strings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceResponse {
    pub mass_grams: String,
    pub price_dollars: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_url: Option<String>,
}

impl PriceResponse {
    pub fn new(quote: &Quote, file_url: Option<String>) -> Self {
        Self {
            mass_grams: quote.display_mass(),
            price_dollars: quote.display_price(),
            file_url,
        }
    }
}

/// Body of every error response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
