//! Metadata aggregation over NGFF group attributes.
//!
//! Builds the descriptive response for an image or label mask:
//!
//! ```json
//! {
//!   "size": {"t": 1, "c": 3, "z": 1, "height": 512, "width": 512},
//!   "type": "uint16",
//!   "min": 0,
//!   "max": 4095,
//!   "multiscales": {"datasets": [{"path": "0", "chunksize": [1, 1, 1, 256, 256]}]},
//!   "uuid": null
//! }
//! ```
//!
//! Optional fields that are missing or malformed are dropped with a log
//! line; only a missing pixel array fails the whole response.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{debug, error, warn};
use zarrs::group::{Group, GroupCreateError};

use crate::config::PixelsConfig;
use crate::error::{IoError, PixelsError};
use crate::io::{StorageLocator, StoreRoot};
use crate::pixels::{check_dimensionality, chunk_shape, open_array, PixelType};
use crate::pyramid::ImageIdentity;
use crate::region::{AXIS_X, AXIS_Y};

// =============================================================================
// Attribute Keys
// =============================================================================

/// Group attribute holding the pyramid description.
pub const MULTISCALES_KEY: &str = "multiscales";

/// Group attribute holding a precomputed `[min, max]` pair.
pub const MINMAX_KEY: &str = "minmax";

/// Group attribute holding rendering metadata.
pub const OMERO_KEY: &str = "omero";

/// Key injected into every multiscales dataset entry.
pub const CHUNKSIZE_KEY: &str = "chunksize";

// =============================================================================
// Response Types
// =============================================================================

/// Array extent per axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageSize {
    pub t: u64,
    pub c: u64,
    pub z: u64,
    pub height: u64,
    pub width: u64,
}

impl ImageSize {
    fn from_shape(shape: &[u64]) -> Self {
        Self {
            t: shape[0],
            c: shape[1],
            z: shape[2],
            height: shape[AXIS_Y],
            width: shape[AXIS_X],
        }
    }
}

/// Descriptive metadata for one image or label mask.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageMetadata {
    pub size: ImageSize,

    /// Descriptive pixel type name, e.g. `uint8`
    #[serde(rename = "type")]
    pub pixel_type: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min: Option<i64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max: Option<i64>,

    /// Multiscales descriptor with `chunksize` injected per dataset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub multiscales: Option<Value>,

    /// Shape UUID for label masks, `None` for images
    pub uuid: Option<String>,
}

// =============================================================================
// Metadata Aggregator
// =============================================================================

/// Read path for group attributes and per-level array descriptions.
#[derive(Debug, Clone, Default)]
pub struct MetadataAggregator {
    locator: StorageLocator,
}

impl MetadataAggregator {
    pub fn new(locator: StorageLocator) -> Self {
        Self { locator }
    }

    pub fn from_config(config: &PixelsConfig) -> Self {
        Self::new(StorageLocator::from_config(config))
    }

    /// Metadata of the image pixel array at `level`.
    pub async fn image_metadata(
        &self,
        image: &ImageIdentity,
        level: usize,
    ) -> Result<ImageMetadata, PixelsError> {
        let root = self.locator.locate(&image.root)?;
        self.aggregate(&root, &image.series_key(), &image.level_key(level), None)
            .await
            .map_err(|e| {
                warn!(image = %image, level = level, "Failed to build image metadata: {}", e);
                e
            })
    }

    /// Metadata of the label mask `uuid` at `level`.
    pub async fn label_metadata(
        &self,
        image: &ImageIdentity,
        uuid: &str,
        level: usize,
    ) -> Result<ImageMetadata, PixelsError> {
        let root = self.locator.locate(&image.root)?;
        self.aggregate(
            &root,
            &image.label_group_key(uuid),
            &image.label_level_key(uuid, level),
            Some(uuid),
        )
        .await
        .map_err(|e| {
            warn!(image = %image, label = uuid, level = level, "Failed to build label metadata: {}", e);
            e
        })
    }

    /// Look up a named attribute on the series group.
    ///
    /// The value may be stored as structured JSON or as a JSON-encoded
    /// string; both come back as structured JSON. Returns `Ok(None)` when
    /// the key is absent or its string form does not parse.
    pub async fn group_metadata(
        &self,
        image: &ImageIdentity,
        key: &str,
    ) -> Result<Option<Value>, PixelsError> {
        let root = self.locator.locate(&image.root)?;
        let attrs = group_attributes(&root, &image.series_key()).await?;

        match attrs.get(key) {
            None => Ok(None),
            Some(Value::String(encoded)) => {
                debug!(image = %image, key = key, "Decoding string-encoded group metadata");
                match serde_json::from_str(encoded) {
                    Ok(value) => Ok(Some(value)),
                    Err(e) => {
                        warn!(image = %image, key = key, "Malformed group metadata: {}", e);
                        Ok(None)
                    }
                }
            }
            Some(value) => Ok(Some(value.clone())),
        }
    }

    /// Rendering metadata stored under the `omero` key.
    pub async fn omero_metadata(
        &self,
        image: &ImageIdentity,
    ) -> Result<Option<Value>, PixelsError> {
        self.group_metadata(image, OMERO_KEY).await
    }

    async fn aggregate(
        &self,
        root: &StoreRoot,
        group_key: &str,
        array_key: &str,
        uuid: Option<&str>,
    ) -> Result<ImageMetadata, PixelsError> {
        // Attributes are optional; a failure here only drops fields
        let attrs = match group_attributes(root, group_key).await {
            Ok(attrs) => attrs,
            Err(e) => {
                warn!(path = %root.display_path(group_key), "Group attributes unavailable: {}", e);
                Map::new()
            }
        };

        let group_path = root.display_path(group_key);
        let multiscales = match multiscales_entry(&attrs, &group_path) {
            Some(mut entry) => {
                inject_chunk_sizes(root, group_key, &mut entry).await;
                Some(entry)
            }
            None => None,
        };
        let min_max = stored_min_max(&attrs, &group_path);

        let array = open_array(root, array_key).await?;
        check_dimensionality(&array)?;
        let pixel_type = PixelType::from_data_type(array.data_type())?;

        Ok(ImageMetadata {
            size: ImageSize::from_shape(array.shape()),
            pixel_type: pixel_type.name().to_string(),
            min: min_max.map(|(min, _)| min),
            max: min_max.map(|(_, max)| max),
            multiscales,
            uuid: uuid.map(str::to_string),
        })
    }
}

// =============================================================================
// Attribute Helpers
// =============================================================================

/// Attributes of the group at `key`.
pub async fn group_attributes(
    root: &StoreRoot,
    key: &str,
) -> Result<Map<String, Value>, PixelsError> {
    match Group::async_open(root.store(), &root.node_path(key)).await {
        Ok(group) => Ok(group.attributes().clone()),
        Err(GroupCreateError::MissingMetadata) => {
            Err(PixelsError::NotFound(root.display_path(key)))
        }
        Err(e) => Err(IoError::Storage(format!("{}: {}", root.display_path(key), e)).into()),
    }
}

/// The multiscales descriptor, as the first array entry or a bare object.
fn multiscales_entry(attrs: &Map<String, Value>, path: &str) -> Option<Value> {
    match attrs.get(MULTISCALES_KEY)? {
        Value::Array(entries) => match entries.first() {
            Some(entry @ Value::Object(_)) => Some(entry.clone()),
            _ => {
                error!(path = path, "Failed to get multiscales metadata as array or object");
                None
            }
        },
        entry @ Value::Object(_) => {
            debug!(path = path, "Multiscales metadata stored as a single object");
            Some(entry.clone())
        }
        _ => {
            error!(path = path, "Failed to get multiscales metadata as array or object");
            None
        }
    }
}

/// Attach each dataset's chunk shape under `chunksize`.
///
/// Datasets whose array cannot be opened are left untouched.
async fn inject_chunk_sizes(root: &StoreRoot, group_key: &str, multiscales: &mut Value) {
    let Some(datasets) = multiscales
        .get_mut("datasets")
        .and_then(Value::as_array_mut)
    else {
        return;
    };

    for (index, dataset) in datasets.iter_mut().enumerate() {
        let Some(entry) = dataset.as_object_mut() else {
            continue;
        };

        let path = entry
            .get("path")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| index.to_string());
        let array_key = format!("{}/{}", group_key, path);

        let chunks = match open_array(root, &array_key).await {
            Ok(array) => chunk_shape(&array),
            Err(e) => Err(e),
        };
        match chunks {
            Ok(chunks) => {
                entry.insert(CHUNKSIZE_KEY.to_string(), Value::from(chunks));
            }
            Err(e) => {
                warn!(path = %root.display_path(&array_key), "No chunk size for dataset: {}", e);
            }
        }
    }
}

/// Precomputed `[min, max]` from attributes, if well formed.
fn stored_min_max(attrs: &Map<String, Value>, path: &str) -> Option<(i64, i64)> {
    let value = attrs.get(MINMAX_KEY)?;
    let pair = value
        .as_array()
        .filter(|a| a.len() >= 2)
        .and_then(|a| Some((a[0].as_i64()?, a[1].as_i64()?)));

    if pair.is_none() {
        warn!(path = path, value = %value, "Ignoring malformed minmax attribute");
    }
    pair
}
