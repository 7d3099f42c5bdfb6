pub type Distance = u32;
pub type Container = u64;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Ord, PartialOrd, Hash)]
pub struct Hamming(pub Container);

impl Hamming {
    pub const BITS: u32 = Container::BITS;
    pub const BYTES: usize = std::mem::size_of::<Container>();
    pub const MIN_DIST: Distance = 0;
    pub const MAX_DIST: Distance = Hamming::BITS;

    pub fn from_slice(bytes: &[u8]) -> Self {
        assert_eq!(Hamming::BYTES, bytes.len());
        let array: [u8; Hamming::BYTES] = bytes
            .try_into()
            .expect("the slice is of the incorrect length");
        Self(Container::from_ne_bytes(array))
    }

    pub fn to_base64(self) -> String {
        base64::Engine::encode(
            &base64::prelude::BASE64_STANDARD_NO_PAD,
            self.0.to_ne_bytes(),
        )
    }

    pub fn distance_to(self, other: Self) -> Distance {
        (self.0 ^ other.0).count_ones()
    }

    /// How alike the two hashes are, as a percentage. Identical hashes give
    /// 100, complements give 0.
    pub fn similarity_to(self, other: Self) -> f64 {
        let matching = Hamming::BITS - self.distance_to(other);
        100.0 * f64::from(matching) / f64::from(Hamming::BITS)
    }
}

impl std::fmt::Display for Hamming {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.to_base64().fmt(f)
    }
}
