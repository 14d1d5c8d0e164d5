//! Medical-cost prediction: feature encoding, the regression forest and the
//! narrow [`Predictor`] capability the cost form talks to.

pub mod encoding;
pub mod forest;
pub mod training;

use crate::error::PredictError;
use encoding::Policyholder;

// ---------------------------------------------------------------------------
// FeatureVector – named, ordered model input
// ---------------------------------------------------------------------------

/// Ordered `name → value` pairs handed to a [`Predictor`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureVector {
    names: Vec<String>,
    values: Vec<f64>,
}

impl FeatureVector {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature at the end of the vector.
    pub fn push(&mut self, name: impl Into<String>, value: f64) {
        self.names.push(name.into());
        self.values.push(value);
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|i| self.values[i])
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureVector {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut fv = FeatureVector::new();
        for (name, value) in iter {
            fv.push(name, value);
        }
        fv
    }
}

// ---------------------------------------------------------------------------
// Predictor – opaque model capability
// ---------------------------------------------------------------------------

/// A trained model with a fixed input contract and one numeric output.
pub trait Predictor {
    /// Feature names, in the order the model was trained with.
    fn feature_names(&self) -> &[String];

    /// Predict for one feature vector. The names and order must equal
    /// [`Predictor::feature_names`].
    fn predict(&self, features: &FeatureVector) -> Result<f64, PredictError>;
}

/// Fail with [`PredictError::EncodingMismatch`] unless `features` carries
/// exactly `expected`, in order.
pub fn check_schema(expected: &[String], features: &FeatureVector) -> Result<(), PredictError> {
    if expected == features.names() {
        Ok(())
    } else {
        Err(PredictError::EncodingMismatch {
            expected: expected.to_vec(),
            actual: features.names().to_vec(),
        })
    }
}

/// Encode `input` and ask `predictor` for the expected cost, rounded to cents.
pub fn estimate_cost(predictor: &dyn Predictor, input: &Policyholder) -> Result<f64, PredictError> {
    let raw = predictor.predict(&input.encode())?;
    Ok((raw * 100.0).round() / 100.0)
}
