use std::{cell::OnceCell, path::Path};

use self::hamming::Hamming;

pub mod hamming;

thread_local! {
    static HASHER: OnceCell<Hasher> = OnceCell::new();
}

/// A 64 bit average hash. Cheap and tolerant of pixel noise, but collides on
/// simple or symmetric imagery.
pub struct Hasher {
    hasher: image_hasher::Hasher<[u8; Hamming::BYTES]>,
}

impl Hasher {
    pub fn new() -> Self {
        Self {
            hasher: image_hasher::HasherConfig::with_bytes_type::<[u8; Hamming::BYTES]>()
                .hash_alg(image_hasher::HashAlg::Mean)
                .hash_size(8, 8)
                .to_hasher(),
        }
    }

    pub fn hash<I>(&self, img: &I) -> Hamming
    where
        I: image_hasher::Image,
    {
        let hash = self.hasher.hash_image(img);
        Hamming::from_slice(hash.as_bytes())
    }
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

pub fn hash<I>(img: &I) -> Hamming
where
    I: image_hasher::Image,
{
    HASHER.with(|h| h.get_or_init(Hasher::new).hash(img))
}

pub fn hash_from_path(path: &Path) -> image::ImageResult<Hamming> {
    let img = image::open(path)?;
    Ok(hash(&img))
}
