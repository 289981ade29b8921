//! Blob path generation.

use rand::distr::{Alphanumeric, SampleString};

/// Length of the random portion of a generated blob name.
const NAME_LEN: usize = 40;

/// Generate a fresh blob path under `dir`, preserving the original file
/// extension so stored blobs keep a recognizable type.
///
/// The path space is large enough that collisions are practically
/// impossible; callers still check-and-retry (see [`crate::transfer`]).
pub fn random_blob_path(dir: &str, extension: Option<&str>) -> String {
    let name = Alphanumeric.sample_string(&mut rand::rng(), NAME_LEN);
    match extension {
        Some(ext) if !ext.is_empty() => format!("{dir}/{name}.{ext}"),
        _ => format!("{dir}/{name}"),
    }
}
