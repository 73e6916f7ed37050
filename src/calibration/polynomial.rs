//! Least-squares polynomial used to chart correction curves
//!
//! Wavelengths are centred and scaled before fitting so the normal equations
//! stay well conditioned for cubic fits over a few hundred nanometres.

use nalgebra::{DMatrix, DVector};
use serde::{Deserialize, Serialize};

/// Polynomial in the normalised variable `t = (x - center) / scale`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    /// Coefficients in ascending powers of `t`
    pub coefficients: Vec<f64>,
    pub center: f64,
    pub scale: f64,
}

impl Polynomial {
    pub fn degree(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    pub fn evaluate(&self, x: f64) -> f64 {
        let t = (x - self.center) / self.scale;
        self.coefficients
            .iter()
            .rev()
            .fold(0.0, |acc, c| acc * t + c)
    }

    /// Fit a polynomial of degree `min(max_degree, distinct_x - 1)`
    ///
    /// Returns `None` for mismatched inputs, fewer than two distinct x values,
    /// or a singular system.
    pub fn fit(xs: &[f64], ys: &[f64], max_degree: usize) -> Option<Polynomial> {
        if xs.len() != ys.len() || xs.is_empty() {
            return None;
        }

        let mut distinct: Vec<f64> = xs.to_vec();
        distinct.sort_by(|a, b| a.total_cmp(b));
        distinct.dedup();
        if distinct.len() < 2 {
            return None;
        }
        let degree = max_degree.min(distinct.len() - 1);

        let n = xs.len() as f64;
        let center = xs.iter().sum::<f64>() / n;
        let scale = xs
            .iter()
            .map(|x| (x - center).abs())
            .fold(0.0_f64, f64::max);
        if scale == 0.0 {
            return None;
        }

        // Normal equations: (A^T A) c = A^T y
        let m = degree + 1;
        let a = DMatrix::from_fn(xs.len(), m, |i, k| ((xs[i] - center) / scale).powi(k as i32));
        let y = DVector::from_column_slice(ys);
        let ata = a.transpose() * &a;
        let aty = a.transpose() * y;

        let solution = ata.lu().solve(&aty)?;
        if solution.iter().any(|c| !c.is_finite()) {
            return None;
        }

        Some(Polynomial {
            coefficients: solution.iter().copied().collect(),
            center,
            scale,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exact_cubic_is_recovered() {
        let f = |x: f64| 0.5 + 0.01 * (x - 500.0) - 2e-5 * (x - 500.0).powi(2) + 1e-7 * (x - 500.0).powi(3);
        let xs = [460.0, 490.0, 530.0, 570.0, 580.0, 625.0];
        let ys: Vec<f64> = xs.iter().map(|&x| f(x)).collect();

        let poly = Polynomial::fit(&xs, &ys, 3).unwrap();
        assert_eq!(poly.degree(), 3);
        for x in [470.0, 510.0, 600.0] {
            assert_relative_eq!(poly.evaluate(x), f(x), epsilon = 1e-9);
        }
    }

    #[test]
    fn test_degree_capped_by_distinct_points() {
        let poly = Polynomial::fit(&[460.0, 625.0], &[2.0, 4.0], 3).unwrap();
        assert_eq!(poly.degree(), 1);
        assert_relative_eq!(poly.evaluate(542.5), 3.0, epsilon = 1e-12);
    }

    #[test]
    fn test_single_wavelength_has_no_fit() {
        assert!(Polynomial::fit(&[530.0], &[1.0], 3).is_none());
        assert!(Polynomial::fit(&[530.0, 530.0], &[1.0, 2.0], 3).is_none());
        assert!(Polynomial::fit(&[], &[], 3).is_none());
    }

    #[test]
    fn test_least_squares_line_through_noisy_points() {
        let xs = [0.0, 1.0, 2.0, 3.0];
        let ys = [1.0, 3.0, 5.0, 7.5];
        let poly = Polynomial::fit(&xs, &ys, 1).unwrap();
        // slope 2.15, intercept 0.9
        assert_relative_eq!(poly.evaluate(0.0), 0.9, epsilon = 1e-9);
        assert_relative_eq!(poly.evaluate(1.0) - poly.evaluate(0.0), 2.15, epsilon = 1e-9);
    }
}
