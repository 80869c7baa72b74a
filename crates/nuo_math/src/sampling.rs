//! Importance sampling of scatter and light directions.
//!
//! All samplers take two uniform numbers in `[0, 1)` and return a unit
//! direction in a y-up local frame. Use [`crate::align_hemisphere_normal`]
//! to move the result into world space.
//!
//! Densities are per unit solid angle, with `dω = sinθ dθ dφ`.

use glam::{Vec2, Vec3};
use std::f32::consts::PI;

/// Map `u` to the hemisphere with density proportional to `cos^m θ`.
///
/// `m == 1` is the Lambertian cosine-weighted case; larger exponents give
/// a Phong lobe that tightens around the pole.
#[inline]
pub fn sample_cosine_weighted_hemisphere(u: Vec2, m: i32) -> Vec3 {
    let phi = 2.0 * PI * u.x;
    let (sin_phi, cos_phi) = phi.sin_cos();

    let cos_theta = if m == 1 {
        u.y.sqrt()
    } else {
        u.y.powf(1.0 / (m as f32 + 1.0))
    };
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();

    Vec3::new(sin_theta * cos_phi, cos_theta, sin_theta * sin_phi)
}

/// Density of [`sample_cosine_weighted_hemisphere`] at polar angle θ.
///
/// Normalizing `k·cos^m θ` over the hemisphere gives `k = (m + 1) / 2π`,
/// which is `1/π` for the Lambertian case.
///
/// This is the true density of the sampled directions, and the integrator
/// divides by it. It is not the `(m + 2) / 2π` constant of the Phong BRDF;
/// shader kernels that reuse that constant as the pdf are off by a factor of
/// `(m + 2) / (m + 1)`. The BRDF side lives in [`phong_brdf_normalization`].
#[inline]
pub fn cosine_pow_pdf(cos_theta: f32, m: i32) -> f32 {
    if cos_theta <= 0.0 {
        return 0.0;
    }

    if m == 1 {
        cos_theta / PI
    } else {
        (m as f32 + 1.0) / (2.0 * PI) * cos_theta.powi(m)
    }
}

/// Normalization of the energy-conserving Phong specular lobe,
/// `f = ks · (m + 2) / 2π · cos^m α`.
///
/// This differs from the sampling density by the extra projected-cosine
/// factor, so `f · cosθ / pdf` reduces to `ks · (m + 2) / (m + 1) · cosθ`.
#[inline]
pub fn phong_brdf_normalization(m: i32) -> f32 {
    (m as f32 + 2.0) / (2.0 * PI)
}

/// Uniformly sample the cone of directions within `acos(cos_theta_max)`
/// of the pole.
#[inline]
pub fn sample_cone_uniform(u: Vec2, cos_theta_max: f32) -> Vec3 {
    // (1 - u) + u·cosθmax, arranged so cosθmax = 1 yields exactly 1
    let cos_theta = 1.0 - u.x * (1.0 - cos_theta_max);
    let sin_theta = (1.0 - cos_theta * cos_theta).max(0.0).sqrt();
    let phi = u.y * 2.0 * PI;

    Vec3::new(phi.cos() * sin_theta, cos_theta, phi.sin() * sin_theta)
}

/// Density of [`sample_cone_uniform`]; infinite for the degenerate cone.
#[inline]
pub fn cone_uniform_pdf(cos_theta_max: f32) -> f32 {
    1.0 / (2.0 * PI * (1.0 - cos_theta_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn uniform2(rng: &mut StdRng) -> Vec2 {
        Vec2::new(rng.gen::<f32>(), rng.gen::<f32>())
    }

    /// ∫ pdf dω over the hemisphere = 2π ∫₀^{π/2} pdf(cosθ) sinθ dθ
    fn integrate_over_hemisphere(m: i32) -> f64 {
        let steps = 4000;
        let d_theta = (PI as f64 / 2.0) / steps as f64;
        let mut sum = 0.0f64;
        for i in 0..steps {
            let theta = (i as f64 + 0.5) * d_theta;
            sum += cosine_pow_pdf(theta.cos() as f32, m) as f64 * theta.sin() * d_theta;
        }
        2.0 * PI as f64 * sum
    }

    /// Probability the sampler lands with cosθ in [a, b), from the pdf.
    fn expected_bin_mass(a: f32, b: f32, m: i32) -> f64 {
        let steps = 200;
        let dc = (b - a) as f64 / steps as f64;
        let mut sum = 0.0f64;
        for i in 0..steps {
            let c = a as f64 + (i as f64 + 0.5) * dc;
            sum += cosine_pow_pdf(c as f32, m) as f64 * dc;
        }
        2.0 * PI as f64 * sum
    }

    #[test]
    fn test_hemisphere_samples_are_unit_and_upper() {
        let mut rng = StdRng::seed_from_u64(1);
        for m in [1, 4, 16] {
            for _ in 0..1000 {
                let d = sample_cosine_weighted_hemisphere(uniform2(&mut rng), m);
                assert!((d.length() - 1.0).abs() < 1e-5);
                assert!(d.y >= 0.0);
            }
        }
    }

    #[test]
    fn test_pdf_integrates_to_one() {
        for m in [1, 4, 16] {
            let total = integrate_over_hemisphere(m);
            assert!((total - 1.0).abs() < 1e-3, "m = {m}: integral = {total}");
        }
    }

    #[test]
    fn test_pdf_branches_agree_at_lambertian_exponent() {
        // The general formula evaluated at m = 1 must match the special case.
        for c in [0.1f32, 0.5, 0.9, 1.0] {
            let general = 2.0 / (2.0 * PI) * c;
            assert!((cosine_pow_pdf(c, 1) - general).abs() < 1e-6);
        }
    }

    #[test]
    fn test_pdf_is_zero_below_horizon() {
        assert_eq!(cosine_pow_pdf(-0.5, 1), 0.0);
        assert_eq!(cosine_pow_pdf(-0.5, 4), 0.0);
    }

    #[test]
    fn test_sampler_matches_pdf_histogram() {
        const SAMPLES: usize = 10_000;
        const BINS: usize = 10;
        // 99.9th percentile of chi-squared with 9 degrees of freedom is 27.88
        const CHI2_LIMIT: f64 = 27.88;

        let mut rng = StdRng::seed_from_u64(0x5eed);
        for m in [1, 2, 4, 16] {
            let mut counts = [0usize; BINS];
            for _ in 0..SAMPLES {
                let d = sample_cosine_weighted_hemisphere(uniform2(&mut rng), m);
                let bin = ((d.y * BINS as f32) as usize).min(BINS - 1);
                counts[bin] += 1;
            }

            let mut chi2 = 0.0f64;
            let mut total_mass = 0.0f64;
            for (bin, &observed) in counts.iter().enumerate() {
                let a = bin as f32 / BINS as f32;
                let b = (bin + 1) as f32 / BINS as f32;
                let mass = expected_bin_mass(a, b, m);
                total_mass += mass;
                let expected = mass * SAMPLES as f64;
                // sparse bins near the horizon for tight lobes carry no signal
                if expected < 5.0 {
                    continue;
                }
                chi2 += (observed as f64 - expected).powi(2) / expected;
            }

            assert!((total_mass - 1.0).abs() < 1e-3);
            assert!(chi2 < CHI2_LIMIT, "m = {m}: chi2 = {chi2}, counts = {counts:?}");
        }
    }

    #[test]
    fn test_lambertian_mean_cosine() {
        // E[cosθ] under cosθ/π is 2/3.
        let mut rng = StdRng::seed_from_u64(3);
        let n = 20_000;
        let mean: f32 = (0..n)
            .map(|_| sample_cosine_weighted_hemisphere(uniform2(&mut rng), 1).y)
            .sum::<f32>()
            / n as f32;
        assert!((mean - 2.0 / 3.0).abs() < 0.01, "mean = {mean}");
    }

    #[test]
    fn test_phong_normalization() {
        assert!((phong_brdf_normalization(1) - 3.0 / (2.0 * PI)).abs() < 1e-6);
        assert!((phong_brdf_normalization(16) - 18.0 / (2.0 * PI)).abs() < 1e-6);
    }

    #[test]
    fn test_degenerate_cone_returns_pole() {
        let mut rng = StdRng::seed_from_u64(5);
        for _ in 0..100 {
            let d = sample_cone_uniform(uniform2(&mut rng), 1.0);
            assert_eq!(d, Vec3::new(0.0, 1.0, 0.0));
        }
    }

    #[test]
    fn test_cone_samples_stay_inside_cone() {
        let cos_theta_max = 0.9f32;
        let mut rng = StdRng::seed_from_u64(9);
        for _ in 0..1000 {
            let d = sample_cone_uniform(uniform2(&mut rng), cos_theta_max);
            assert!((d.length() - 1.0).abs() < 1e-5);
            assert!(d.y >= cos_theta_max - 1e-6);
        }
    }

    #[test]
    fn test_cone_pdf() {
        // A full hemisphere cone is the uniform hemisphere.
        assert!((cone_uniform_pdf(0.0) - 1.0 / (2.0 * PI)).abs() < 1e-6);
        assert!(cone_uniform_pdf(1.0).is_infinite());
    }
}
