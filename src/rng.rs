use rand::rngs::StdRng;
use rand::{RngExt, SeedableRng};

use crate::ui::hsv;

/// Create a deterministic StdRng from a u64 seed.
/// Every random choice in the window (node colors) flows through an RNG
/// created here, so a fixed seed gives a reproducible layout.
pub fn create_rng(seed: u64) -> StdRng {
    StdRng::seed_from_u64(seed)
}

/// Random node layout color: any hue, saturation 0.4..1, value 0.3..0.9.
pub fn random_node_color(rng: &mut StdRng) -> [f32; 4] {
    let h = rng.random::<f32>();
    let s = rng.random_range(0.4..1.0);
    let v = rng.random_range(0.3..0.9);
    hsv(h, s, v)
}
