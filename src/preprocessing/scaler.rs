//! Standard feature scaling

use serde::{Deserialize, Serialize};

/// Fitted standard-scaling parameters: `(x - mean) / scale`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StandardScaler {
    pub mean: f64,
    /// Population standard deviation, or 1.0 when it is zero
    pub scale: f64,
}

impl StandardScaler {
    /// Fit on (already imputed) training values
    pub fn fit(values: &[f64]) -> Self {
        if values.is_empty() {
            return Self { mean: 0.0, scale: 1.0 };
        }

        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|&v| (v - mean).powi(2)).sum::<f64>() / n;
        let std = variance.sqrt();

        Self {
            mean,
            scale: if std == 0.0 { 1.0 } else { std },
        }
    }

    #[inline]
    pub fn scale(&self, value: f64) -> f64 {
        (value - self.mean) / self.scale
    }

    #[inline]
    pub fn unscale(&self, value: f64) -> f64 {
        value * self.scale + self.mean
    }
}
