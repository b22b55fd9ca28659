//! K-nearest-neighbors regression
//!
//! Stores the training set and predicts the uniform average of the k
//! closest training targets under Euclidean distance.

use super::{ModelError, ModelResult, Regressor};
use ndarray::{Array1, Array2, ArrayView1};

/// KNN regressor
#[derive(Debug, Clone)]
pub struct KnnRegressor {
    k: usize,
    x_train: Option<Array2<f64>>,
    y_train: Option<Array1<f64>>,
}

impl KnnRegressor {
    /// Create a new regressor over the `k` nearest neighbors
    pub fn new(k: usize) -> Self {
        Self {
            k,
            x_train: None,
            y_train: None,
        }
    }

    fn distance(a: ArrayView1<f64>, b: ArrayView1<f64>) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(x, y)| (x - y).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

impl Regressor for KnnRegressor {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> ModelResult<()> {
        if x.nrows() != y.len() {
            return Err(ModelError::DimensionMismatch {
                expected: x.nrows(),
                got: y.len(),
            });
        }
        self.x_train = Some(x.clone());
        self.y_train = Some(y.clone());
        Ok(())
    }

    fn predict(&self, x: &Array2<f64>) -> ModelResult<Array1<f64>> {
        let x_train = self.x_train.as_ref().ok_or(ModelError::NotFitted)?;
        let y_train = self.y_train.as_ref().ok_or(ModelError::NotFitted)?;

        if x.ncols() != x_train.ncols() {
            return Err(ModelError::DimensionMismatch {
                expected: x_train.ncols(),
                got: x.ncols(),
            });
        }

        let mut predictions = Vec::with_capacity(x.nrows());
        for sample_idx in 0..x.nrows() {
            let sample = x.row(sample_idx);

            let mut distances: Vec<(usize, f64)> = x_train
                .rows()
                .into_iter()
                .enumerate()
                .map(|(i, train_sample)| (i, Self::distance(sample, train_sample)))
                .collect();

            distances.sort_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(std::cmp::Ordering::Equal));

            let neighbors: Vec<usize> = distances
                .into_iter()
                .take(self.k)
                .map(|(idx, _)| idx)
                .collect();

            let prediction =
                neighbors.iter().map(|&idx| y_train[idx]).sum::<f64>() / neighbors.len() as f64;
            predictions.push(prediction);
        }

        Ok(Array1::from_vec(predictions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_knn_averages_nearest_targets() {
        let x_train = array![[1.0], [2.0], [3.0], [4.0], [5.0]];
        let y_train = array![2.0, 4.0, 6.0, 8.0, 10.0];

        let mut knn = KnnRegressor::new(2);
        knn.fit(&x_train, &y_train).unwrap();

        let predictions = knn.predict(&array![[2.5], [3.5]]).unwrap();
        assert!((predictions[0] - 5.0).abs() < 1e-10);
        assert!((predictions[1] - 7.0).abs() < 1e-10);
    }

    #[test]
    fn test_k_larger_than_train_set_uses_everything() {
        let x_train = array![[1.0], [2.0], [3.0]];
        let y_train = array![3.0, 6.0, 9.0];

        let mut knn = KnnRegressor::new(10);
        knn.fit(&x_train, &y_train).unwrap();

        let predictions = knn.predict(&array![[2.0]]).unwrap();
        assert!((predictions[0] - 6.0).abs() < 1e-10);
    }

    #[test]
    fn test_predict_before_fit_errors() {
        let knn = KnnRegressor::new(5);
        assert!(matches!(
            knn.predict(&array![[1.0]]),
            Err(ModelError::NotFitted)
        ));
    }
}
