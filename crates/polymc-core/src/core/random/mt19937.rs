use rand::{RngCore, SeedableRng};

const N: usize = 624;
const M: usize = 397;
const MATRIX_A: u32 = 0x9908_b0df;
const UPPER_MASK: u32 = 0x8000_0000;
const LOWER_MASK: u32 = 0x7fff_ffff;

/// Seed used when a generator is drawn from before it was ever seeded.
pub const DEFAULT_SEED: u32 = 5489;

/// Mersenne Twister MT19937, bit-compatible with the 2002 reference generator.
///
/// Every draw advances a single stream, so the sequence of calls made by the
/// move engine (particle pick, displacement components, acceptance test) fully
/// determines a trajectory for a given seed.
#[derive(Clone)]
pub struct Mt19937 {
    mt: [u32; N],
    mti: usize,
}

impl std::fmt::Debug for Mt19937 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mt19937").field("mti", &self.mti).finish()
    }
}

impl Default for Mt19937 {
    fn default() -> Self {
        Self::unseeded()
    }
}

impl Mt19937 {
    pub fn new(seed: u32) -> Self {
        let mut rng = Self::unseeded();
        rng.seed(seed);
        rng
    }

    /// A generator that seeds itself with [`DEFAULT_SEED`] on the first draw.
    pub fn unseeded() -> Self {
        Self {
            mt: [0; N],
            mti: N + 1,
        }
    }

    pub fn from_key(key: &[u32]) -> Self {
        let mut rng = Self::unseeded();
        rng.seed_by_array(key);
        rng
    }

    pub fn seed(&mut self, seed: u32) {
        self.mt[0] = seed;
        for i in 1..N {
            let prev = self.mt[i - 1];
            self.mt[i] = 1_812_433_253u32
                .wrapping_mul(prev ^ (prev >> 30))
                .wrapping_add(i as u32);
        }
        self.mti = N;
    }

    pub fn seed_by_array(&mut self, key: &[u32]) {
        self.seed(19_650_218);
        let mut i = 1;
        let mut j = 0;
        let steps = N.max(key.len());
        for _ in 0..steps {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_664_525))
                .wrapping_add(key.get(j).copied().unwrap_or(0))
                .wrapping_add(j as u32);
            i += 1;
            j += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
            if j >= key.len() {
                j = 0;
            }
        }
        for _ in 0..(N - 1) {
            let prev = self.mt[i - 1];
            self.mt[i] = (self.mt[i] ^ (prev ^ (prev >> 30)).wrapping_mul(1_566_083_941))
                .wrapping_sub(i as u32);
            i += 1;
            if i >= N {
                self.mt[0] = self.mt[N - 1];
                i = 1;
            }
        }
        self.mt[0] = 0x8000_0000;
        self.mti = N;
    }

    fn twist(&mut self) {
        #[inline]
        fn mag01(y: u32) -> u32 {
            if y & 1 == 0 { 0 } else { MATRIX_A }
        }

        for kk in 0..(N - M) {
            let y = (self.mt[kk] & UPPER_MASK) | (self.mt[kk + 1] & LOWER_MASK);
            self.mt[kk] = self.mt[kk + M] ^ (y >> 1) ^ mag01(y);
        }
        for kk in (N - M)..(N - 1) {
            let y = (self.mt[kk] & UPPER_MASK) | (self.mt[kk + 1] & LOWER_MASK);
            self.mt[kk] = self.mt[kk + M - N] ^ (y >> 1) ^ mag01(y);
        }
        let y = (self.mt[N - 1] & UPPER_MASK) | (self.mt[0] & LOWER_MASK);
        self.mt[N - 1] = self.mt[M - 1] ^ (y >> 1) ^ mag01(y);
        self.mti = 0;
    }

    /// Uniform on `[0, 0xffffffff]`.
    #[inline]
    pub fn next_u32(&mut self) -> u32 {
        if self.mti >= N {
            if self.mti == N + 1 {
                self.seed(DEFAULT_SEED);
            }
            self.twist();
        }

        let mut y = self.mt[self.mti];
        self.mti += 1;

        y ^= y >> 11;
        y ^= (y << 7) & 0x9d2c_5680;
        y ^= (y << 15) & 0xefc6_0000;
        y ^= y >> 18;
        y
    }

    /// Uniform on `[0, 0x7fffffff]`.
    #[inline]
    pub fn next_int31(&mut self) -> u32 {
        self.next_u32() >> 1
    }

    /// Integer in `[lo, hi]` by reduction modulo the range width.
    ///
    /// The modulo bias is kept so trajectories match the reference generator
    /// draw for draw.
    #[inline]
    pub fn next_int_range(&mut self, lo: u32, hi: u32) -> u32 {
        debug_assert!(lo <= hi, "empty integer range [{lo}, {hi}]");
        self.next_int31() % (hi - lo + 1) + lo
    }

    /// Uniform on the closed interval `[0, 1]`.
    #[inline]
    pub fn next_real01(&mut self) -> f64 {
        f64::from(self.next_u32()) * (1.0 / 4_294_967_295.0)
    }

    /// Uniform on `[0, 1)` with 53-bit resolution. Consumes two words.
    #[inline]
    pub fn next_real01_half(&mut self) -> f64 {
        let a = f64::from(self.next_u32() >> 5);
        let b = f64::from(self.next_u32() >> 6);
        (a * 67_108_864.0 + b) * (1.0 / 9_007_199_254_740_992.0)
    }
}

impl RngCore for Mt19937 {
    fn next_u32(&mut self) -> u32 {
        Mt19937::next_u32(self)
    }

    fn next_u64(&mut self) -> u64 {
        let hi = u64::from(Mt19937::next_u32(self));
        let lo = u64::from(Mt19937::next_u32(self));
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dest: &mut [u8]) {
        for chunk in dest.chunks_mut(4) {
            let word = Mt19937::next_u32(self).to_le_bytes();
            chunk.copy_from_slice(&word[..chunk.len()]);
        }
    }

    fn try_fill_bytes(&mut self, dest: &mut [u8]) -> Result<(), rand::Error> {
        self.fill_bytes(dest);
        Ok(())
    }
}

impl SeedableRng for Mt19937 {
    type Seed = [u8; 4];

    fn from_seed(seed: Self::Seed) -> Self {
        Self::new(u32::from_le_bytes(seed))
    }

    fn seed_from_u64(state: u64) -> Self {
        Self::new(state as u32)
    }
}
