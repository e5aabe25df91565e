//! Turning a checksum into something a reader can fetch.
//!
//! The byte store is not ours; a [`BlobUrlResolver`] is the seam where it
//! plugs in.

use arkive_types::Checksum;

/// Maps a blob checksum to a fetchable address in the external byte store.
pub trait BlobUrlResolver: Send + Sync {
    fn blob_url(&self, checksum: &Checksum) -> Result<String, String>;
}

/// Addresses blobs as `{base}/{checksum}`.
#[derive(Clone, Debug)]
pub struct PrefixUrlResolver {
    base: String,
}

impl PrefixUrlResolver {
    pub fn new(base: impl Into<String>) -> Self {
        let base = base.into();
        Self {
            base: base.trim_end_matches('/').to_string(),
        }
    }
}

impl BlobUrlResolver for PrefixUrlResolver {
    fn blob_url(&self, checksum: &Checksum) -> Result<String, String> {
        Ok(format!("{}/{}", self.base, checksum))
    }
}

impl<F> BlobUrlResolver for F
where
    F: Fn(&Checksum) -> Result<String, String> + Send + Sync,
{
    fn blob_url(&self, checksum: &Checksum) -> Result<String, String> {
        self(checksum)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prefix_resolver_joins_once() {
        let sum = Checksum::new("deadbeef").unwrap();
        let r = PrefixUrlResolver::new("https://blobs.example.com/");
        assert_eq!(r.blob_url(&sum).unwrap(), "https://blobs.example.com/deadbeef");
        let r = PrefixUrlResolver::new("https://blobs.example.com");
        assert_eq!(r.blob_url(&sum).unwrap(), "https://blobs.example.com/deadbeef");
    }

    #[test]
    fn closures_resolve() {
        let r =
            |c: &Checksum| -> Result<String, String> { Ok(format!("s3://bucket/{}", c.short())) };
        let sum = Checksum::new("deadbeefdeadbeef").unwrap();
        assert_eq!(r.blob_url(&sum).unwrap(), "s3://bucket/deadbeefdead");
    }
}
