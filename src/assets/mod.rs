//! Image acquisition: decoded raster assets and the loader collaborators.

/// Image loaders (filesystem, HTTP, proxy fallback).
pub mod loader;
/// Decoded raster image type.
pub mod raster;
