//! Deterministic pseudo-random input for malformed-markup tests.

pub fn parse_u64(raw: &str) -> Option<u64> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Some(hex) = trimmed.strip_prefix("0x") {
        u64::from_str_radix(hex, 16).ok()
    } else {
        trimmed.parse::<u64>().ok()
    }
}

/// Seed from the environment variable `key`, or `default` when unset.
pub fn seed_from_env(key: &str, default: u64) -> u64 {
    match std::env::var(key) {
        Ok(raw) => parse_u64(&raw)
            .unwrap_or_else(|| panic!("unsupported {key} value '{raw}'; use decimal or 0x-hex")),
        Err(_) => default,
    }
}

/// xorshift64*; small, fast and good enough to shuffle markup fragments.
#[derive(Clone, Debug)]
pub struct XorShift(u64);

impl XorShift {
    pub fn new(seed: u64) -> Self {
        // zero is a fixed point
        Self(if seed == 0 { 0x9E37_79B9_7F4A_7C15 } else { seed })
    }

    pub fn next_u64(&mut self) -> u64 {
        let mut x = self.0;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.0 = x;
        x.wrapping_mul(0x2545_F491_4F6C_DD1D)
    }

    /// Uniform-ish index in `0..len`; `len` must be non-zero.
    pub fn below(&mut self, len: usize) -> usize {
        (self.next_u64() % len as u64) as usize
    }

    pub fn pick<T: Copy>(&mut self, items: &[T]) -> T {
        items[self.below(items.len())]
    }
}

/// Concatenate `count` fragments drawn from `alphabet`.
pub fn random_markup(rng: &mut XorShift, alphabet: &[&str], count: usize) -> String {
    let mut out = String::new();
    for _ in 0..count {
        out.push_str(rng.pick(alphabet));
    }
    out
}
