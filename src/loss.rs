//! Loss functions.

use ndarray::prelude::*;

/// The logistic function, computed without overflow for any finite `x`.
pub fn sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        1.0 / (1.0 + (-x).exp())
    } else {
        let e = x.exp();
        e / (1.0 + e)
    }
}

/// `ln(sigmoid(x))`, computed without overflow or underflow to `-inf`.
///
/// Uses `-ln(1 + e^-x)` for `x >= 0` and `x - ln(1 + e^x)` otherwise, so
/// the exponent is never positive.
pub fn log_sigmoid(x: f32) -> f32 {
    if x >= 0.0 {
        -(-x).exp().ln_1p()
    } else {
        x - x.exp().ln_1p()
    }
}

/// Negative-sampling loss for one (center, context) pair.
///
/// The inputs are scores, i.e. dot products of the center word's input
/// embedding with the output embeddings of the context word and of each
/// negative sample.
#[derive(Debug, Clone, Copy)]
pub struct NegativeSamplingLoss;

impl NegativeSamplingLoss {
    /// `-(ln σ(positive) + Σ ln σ(-negative))`.
    pub fn loss(&self, positive: f32, negatives: ArrayView1<'_, f32>) -> f32 {
        -(log_sigmoid(positive) + negatives.iter().map(|&s| log_sigmoid(-s)).sum::<f32>())
    }

    /// Partial derivatives of the loss with respect to the positive score and
    /// each negative score.
    pub fn deriv(&self, positive: f32, negatives: ArrayView1<'_, f32>) -> (f32, Array1<f32>) {
        // d/dx -ln σ(x) = σ(x) - 1;  d/dx -ln σ(-x) = σ(x)
        (sigmoid(positive) - 1.0, negatives.mapv(sigmoid))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_sigmoid_is_stable() {
        assert_eq!(log_sigmoid(1000.0), 0.0);
        assert_eq!(log_sigmoid(-1000.0), -1000.0);
        assert!(log_sigmoid(f32::MAX).is_finite());
        assert!(log_sigmoid(-f32::MAX).is_finite());
        assert!((log_sigmoid(0.0) - 0.5f32.ln()).abs() < 1e-7);
        for x in [-20.0f32, -3.0, -0.5, 0.25, 2.0, 15.0] {
            let naive = (1.0 / (1.0 + (-x as f64).exp())).ln() as f32;
            assert!((log_sigmoid(x) - naive).abs() < 1e-5, "x = {x}");
        }
    }

    #[test]
    fn sigmoid_is_stable() {
        assert_eq!(sigmoid(1000.0), 1.0);
        assert_eq!(sigmoid(-1000.0), 0.0);
        assert_eq!(sigmoid(0.0), 0.5);
        assert!((sigmoid(2.0) + sigmoid(-2.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn zero_scores() {
        // Fresh models have all-zero output embeddings, so every score is 0.
        let negatives = Array1::<f32>::zeros(5);
        let loss = NegativeSamplingLoss.loss(0.0, negatives.view());
        assert!((loss - 6.0 * 2.0f32.ln()).abs() < 1e-5);

        let (dpos, dneg) = NegativeSamplingLoss.deriv(0.0, negatives.view());
        assert_eq!(dpos, -0.5);
        assert!(dneg.iter().all(|&d| d == 0.5));
    }

    #[test]
    fn deriv_matches_finite_differences() {
        let h = 1e-3;
        let negatives = array![0.3f32, -1.2, 2.5];
        let (dpos, dneg) = NegativeSamplingLoss.deriv(0.7, negatives.view());

        let measured =
            (NegativeSamplingLoss.loss(0.7 + h, negatives.view())
                - NegativeSamplingLoss.loss(0.7 - h, negatives.view()))
                / (2.0 * h);
        assert!((dpos - measured).abs() < 1e-3);

        for k in 0..negatives.len() {
            let mut plus = negatives.clone();
            plus[k] += h;
            let mut minus = negatives.clone();
            minus[k] -= h;
            let measured = (NegativeSamplingLoss.loss(0.7, plus.view())
                - NegativeSamplingLoss.loss(0.7, minus.view()))
                / (2.0 * h);
            assert!((dneg[k] - measured).abs() < 1e-3, "negative {k}");
        }
    }
}
