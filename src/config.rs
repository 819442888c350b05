//! Configuration for the pixel access layer.
//!
//! Object-storage credentials and the tile-size policy are supplied once at
//! process configuration time, never per call. [`PixelsConfig`] is a
//! `clap::Args` struct so a host binary can flatten it into its own CLI:
//!
//! ```ignore
//! #[derive(clap::Parser)]
//! struct Cli {
//!     #[command(flatten)]
//!     pixels: ngff_pixels::PixelsConfig,
//! }
//! ```
//!
//! # Environment Variables
//!
//! - `NGFF_S3_ACCESS_KEY` - Access key for S3-compatible storage
//! - `NGFF_S3_SECRET_KEY` - Secret key for S3-compatible storage
//! - `NGFF_S3_REGION` - Region (default: us-east-1)
//! - `NGFF_S3_ENDPOINT` - Endpoint override for non-AWS object storage
//! - `NGFF_MAX_TILE_LENGTH` - Max tile edge length in pixels (default: 2048)

use clap::Args;

// =============================================================================
// Default Values
// =============================================================================

/// Default object storage region.
pub const DEFAULT_REGION: &str = "us-east-1";

/// Default maximum tile edge length in pixels.
pub const DEFAULT_MAX_TILE_LENGTH: u64 = 2048;

// =============================================================================
// Config
// =============================================================================

/// Process-level configuration for NGFF pixel access.
#[derive(Args, Debug, Clone, PartialEq, Eq)]
pub struct PixelsConfig {
    /// Access key for S3-compatible object storage.
    #[arg(long, env = "NGFF_S3_ACCESS_KEY")]
    pub s3_access_key: Option<String>,

    /// Secret key for S3-compatible object storage.
    #[arg(long, env = "NGFF_S3_SECRET_KEY", hide_env_values = true)]
    pub s3_secret_key: Option<String>,

    /// Object storage region.
    #[arg(long, default_value = DEFAULT_REGION, env = "NGFF_S3_REGION")]
    pub s3_region: String,

    /// Endpoint override for non-AWS object storage (MinIO, Ceph, ...).
    #[arg(long, env = "NGFF_S3_ENDPOINT")]
    pub s3_endpoint: Option<String>,

    /// Maximum tile width and height accepted by region reads.
    #[arg(long, default_value_t = DEFAULT_MAX_TILE_LENGTH, env = "NGFF_MAX_TILE_LENGTH")]
    pub max_tile_length: u64,
}

impl Default for PixelsConfig {
    fn default() -> Self {
        Self {
            s3_access_key: None,
            s3_secret_key: None,
            s3_region: DEFAULT_REGION.to_string(),
            s3_endpoint: None,
            max_tile_length: DEFAULT_MAX_TILE_LENGTH,
        }
    }
}

impl PixelsConfig {
    /// Validate the configuration and return an error message if invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.max_tile_length == 0 {
            return Err("max_tile_length must be greater than 0".to_string());
        }

        match (&self.s3_access_key, &self.s3_secret_key) {
            (Some(_), None) => {
                return Err(
                    "S3 access key given without a secret key. Set --s3-secret-key or NGFF_S3_SECRET_KEY"
                        .to_string(),
                )
            }
            (None, Some(_)) => {
                return Err(
                    "S3 secret key given without an access key. Set --s3-access-key or NGFF_S3_ACCESS_KEY"
                        .to_string(),
                )
            }
            _ => {}
        }

        if self.s3_region.is_empty() {
            return Err("S3 region must not be empty".to_string());
        }

        Ok(())
    }

    /// Object storage settings, if credentials were configured.
    pub fn s3_settings(&self) -> Option<S3Settings> {
        let access_key = self.s3_access_key.clone()?;
        let secret_key = self.s3_secret_key.clone()?;
        Some(S3Settings {
            access_key,
            secret_key,
            region: self.s3_region.clone(),
            endpoint: self.s3_endpoint.clone(),
        })
    }
}

/// Resolved object storage credentials.
#[derive(Clone, PartialEq, Eq)]
pub struct S3Settings {
    pub access_key: String,
    pub secret_key: String,
    pub region: String,
    pub endpoint: Option<String>,
}

impl std::fmt::Debug for S3Settings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("S3Settings")
            .field("access_key", &self.access_key)
            .field("secret_key", &"<redacted>")
            .field("region", &self.region)
            .field("endpoint", &self.endpoint)
            .finish()
    }
}

// =============================================================================
// Tests
// =============================================================================
