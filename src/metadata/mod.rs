//! Image and label metadata assembled from group attributes.

mod aggregator;

pub use aggregator::{
    group_attributes, ImageMetadata, ImageSize, MetadataAggregator, CHUNKSIZE_KEY, MINMAX_KEY,
    MULTISCALES_KEY, OMERO_KEY,
};
