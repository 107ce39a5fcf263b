//! Server configuration from environment variables.

use std::net::{Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::str::FromStr;

use pricing_engine::PricingConfig;
use upload_store::StoredFile;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_UPLOAD_DIR: &str = "uploads";
const DEFAULT_MAX_UPLOAD_BYTES: usize = 50 * 1024 * 1024;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ServerConfigError {
    #[error("{key}={value:?} is invalid: {reason}")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Everything the server needs at startup.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
    /// Root of the upload store.
    pub upload_dir: PathBuf,
    /// `scheme://host` used to build links to stored files.
    pub public_base_url: String,
    /// Keep priced uploads and return a link to them.
    pub persist_uploads: bool,
    pub max_upload_bytes: usize,
    pub pricing: PricingConfig,
}

impl ServerConfig {
    /// Read from the process environment.
    pub fn from_env() -> Result<Self, ServerConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read using `lookup` for each variable. Unset or empty variables take
    /// their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ServerConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let port = parse_var(&get, "PORT")?.unwrap_or(DEFAULT_PORT);
        let upload_dir = get("UPLOAD_DIR")
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from(DEFAULT_UPLOAD_DIR));
        let persist_uploads = match get("PERSIST_UPLOADS") {
            Some(value) => parse_bool("PERSIST_UPLOADS", &value)?,
            None => true,
        };
        let max_upload_bytes =
            parse_var(&get, "MAX_UPLOAD_BYTES")?.unwrap_or(DEFAULT_MAX_UPLOAD_BYTES);

        let public_host = get("PUBLIC_HOST").or_else(|| get("RENDER_EXTERNAL_HOSTNAME"));
        let default_scheme = if public_host.is_some() { "https" } else { "http" };
        let scheme = get("PUBLIC_SCHEME").unwrap_or_else(|| default_scheme.to_string());
        let host = public_host.unwrap_or_else(|| format!("localhost:{}", port));
        let public_base_url = format!("{}://{}", scheme, host.trim_end_matches('/'));

        let mut pricing = PricingConfig::default();
        if let Some(v) = parse_var(&get, "PRICE_DENSITY")? {
            pricing = pricing.with_density(v);
        }
        if let Some(v) = parse_var(&get, "PRICE_INFILL_FRACTION")? {
            pricing = pricing.with_infill_fraction(v);
        }
        if let Some(v) = parse_var(&get, "PRICE_PER_GRAM")? {
            pricing = pricing.with_price_per_gram(v);
        }
        if let Some(v) = parse_var(&get, "PRICE_MIN")? {
            pricing = pricing.with_min_price(v);
        }
        if let Some(v) = parse_var(&get, "PRICE_MAX_MASS_GRAMS")? {
            pricing = pricing.with_max_mass_grams(v);
        }

        Ok(Self {
            port,
            upload_dir,
            public_base_url,
            persist_uploads,
            max_upload_bytes,
            pricing,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    /// Public download link for a stored upload.
    pub fn file_url(&self, file: &StoredFile) -> String {
        file.public_url(&format!("{}/uploads", self.public_base_url))
    }
}

fn parse_var<T, G>(get: &G, key: &'static str) -> Result<Option<T>, ServerConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    G: Fn(&str) -> Option<String>,
{
    get(key)
        .map(|value| {
            value
                .trim()
                .parse::<T>()
                .map_err(|e| ServerConfigError::Invalid {
                    key,
                    value: value.clone(),
                    reason: e.to_string(),
                })
        })
        .transpose()
}

fn parse_bool(key: &'static str, value: &str) -> Result<bool, ServerConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(ServerConfigError::Invalid {
            key,
            value: value.to_string(),
            reason: "expected true or false".to_string(),
        }),
    }
}
