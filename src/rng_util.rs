/// Generate a random `f64` in the range `[low, high)`.
///
/// Rounding can land exactly on `high` when the draw is close to one; the
/// result is clamped to the largest float below `high`.
#[inline]
pub(crate) fn f64_range(rng: &mut fastrand::Rng, low: f64, high: f64) -> f64 {
    let v = low + rng.f64() * (high - low);
    if v < high { v } else { high.next_down().max(low) }
}

/// Draw a standard normal variate with the Box-Muller transform.
#[inline]
pub(crate) fn standard_normal(rng: &mut fastrand::Rng) -> f64 {
    // 1 - u lies in (0, 1], keeping the logarithm finite.
    let u1 = 1.0 - rng.f64();
    let u2 = rng.f64();
    (-2.0 * u1.ln()).sqrt() * (2.0 * core::f64::consts::PI * u2).cos()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn f64_range_stays_half_open() {
        let mut rng = fastrand::Rng::with_seed(3);
        for _ in 0..1000 {
            let v = f64_range(&mut rng, -1.0, 1.0);
            assert!((-1.0..1.0).contains(&v));
        }
    }

    #[test]
    fn standard_normal_moments() {
        let mut rng = fastrand::Rng::with_seed(11);
        let n = 20_000;
        let xs: Vec<f64> = (0..n).map(|_| standard_normal(&mut rng)).collect();
        let mean = xs.iter().sum::<f64>() / f64::from(n);
        let var = xs.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / f64::from(n);
        assert!(mean.abs() < 0.05, "mean {mean}");
        assert!((var - 1.0).abs() < 0.05, "variance {var}");
    }
}
