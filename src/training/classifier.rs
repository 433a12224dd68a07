//! Home-win classifiers
//!
//! The [`Classifier`] trait is the seam to the prediction model. Its errors
//! are surfaced as [`HoopsError::Classifier`] without further interpretation.

use burn::nn::{Linear, LinearConfig};
use burn::optim::{GradientsParams, Optimizer, SgdConfig};
use burn::tensor::activation::sigmoid;
use burn::tensor::backend::AutodiffBackend;
use burn::tensor::{ElementConversion, Tensor, TensorData};

use crate::features::encoding::FeatureMatrix;
use crate::{HoopsError, Result};

/// Binary classifier over an assembled feature matrix
pub trait Classifier {
    /// Fit on a matrix and its labels
    fn fit(&mut self, train: &FeatureMatrix) -> Result<()>;

    /// Predict a home-win label per row
    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>>;
}

/// Always predicts a home win
#[derive(Debug, Clone, Copy, Default)]
pub struct HomeCourtBaseline;

impl Classifier for HomeCourtBaseline {
    fn fit(&mut self, _train: &FeatureMatrix) -> Result<()> {
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>> {
        Ok(vec![true; x.rows])
    }
}

/// Logistic regression hyperparameters
#[derive(Debug, Clone, PartialEq)]
pub struct LogisticParams {
    pub learning_rate: f64,
    pub epochs: usize,
    pub seed: u64,
}

impl Default for LogisticParams {
    fn default() -> Self {
        LogisticParams {
            learning_rate: 0.1,
            epochs: 200,
            seed: 14,
        }
    }
}

/// Single linear layer with sigmoid, trained full-batch with SGD
pub struct LogisticClassifier<B: AutodiffBackend> {
    params: LogisticParams,
    model: Option<Linear<B>>,
    /// Per-column mean and std from the training matrix
    scaling: Option<(Vec<f32>, Vec<f32>)>,
    device: B::Device,
}

impl<B: AutodiffBackend> LogisticClassifier<B> {
    pub fn new(device: B::Device, params: LogisticParams) -> Self {
        LogisticClassifier {
            params,
            model: None,
            scaling: None,
            device,
        }
    }

    pub fn params(&self) -> &LogisticParams {
        &self.params
    }

    /// Feature tensor with training-set standardization applied
    fn inputs(&self, x: &FeatureMatrix) -> Result<Tensor<B, 2>> {
        let (mean, std) = self
            .scaling
            .as_ref()
            .ok_or_else(|| HoopsError::Classifier("classifier has not been fitted".to_string()))?;
        if x.cols != mean.len() {
            return Err(HoopsError::Classifier(format!(
                "matrix has {} columns, classifier was fitted on {}",
                x.cols,
                mean.len()
            )));
        }

        let data: Vec<f32> = x
            .data
            .iter()
            .enumerate()
            .map(|(i, v)| {
                let c = i % x.cols;
                (v - mean[c]) / std[c]
            })
            .collect();
        Ok(Tensor::from_data(
            TensorData::new(data, [x.rows, x.cols]),
            &self.device,
        ))
    }

    fn binary_cross_entropy(&self, probs: Tensor<B, 2>, targets: Tensor<B, 2>) -> Tensor<B, 1> {
        let eps = 1e-7;
        let probs_clamped = probs.clamp(eps, 1.0 - eps);
        let loss = targets.clone().neg() * probs_clamped.clone().log()
            - (targets.neg() + 1.0) * (probs_clamped.neg() + 1.0).log();
        loss.mean()
    }
}

/// Column means and standard deviations (std floored to avoid division by zero)
fn column_scaling(x: &FeatureMatrix) -> (Vec<f32>, Vec<f32>) {
    let n = x.rows.max(1) as f32;
    let mut mean = vec![0.0f32; x.cols];
    for i in 0..x.rows {
        for (m, v) in mean.iter_mut().zip(x.row(i)) {
            *m += v / n;
        }
    }
    let mut var = vec![0.0f32; x.cols];
    for i in 0..x.rows {
        for ((s, v), m) in var.iter_mut().zip(x.row(i)).zip(&mean) {
            *s += (v - m).powi(2) / n;
        }
    }
    let std = var.into_iter().map(|v| v.sqrt().max(1e-3)).collect();
    (mean, std)
}

impl<B: AutodiffBackend> Classifier for LogisticClassifier<B> {
    fn fit(&mut self, train: &FeatureMatrix) -> Result<()> {
        if train.rows == 0 {
            return Err(HoopsError::Classifier("empty training matrix".to_string()));
        }

        self.scaling = Some(column_scaling(train));
        let x = self.inputs(train)?;
        let y: Tensor<B, 2> = Tensor::from_data(
            TensorData::new(train.labels_as_f32(), [train.rows, 1]),
            &self.device,
        );

        B::seed(self.params.seed);
        let mut model: Linear<B> = LinearConfig::new(train.cols, 1).init(&self.device);
        let mut optimizer = SgdConfig::new().init::<B, Linear<B>>();

        log::debug!(
            "Training logistic classifier: {} rows x {} cols, lr={}, epochs={}",
            train.rows,
            train.cols,
            self.params.learning_rate,
            self.params.epochs
        );

        for epoch in 0..self.params.epochs {
            let probs = sigmoid(model.forward(x.clone()));
            let loss = self.binary_cross_entropy(probs, y.clone());
            let loss_val: f32 = loss.clone().into_scalar().elem();

            let grads = loss.backward();
            let grads_params = GradientsParams::from_grads(grads, &model);
            model = optimizer.step(self.params.learning_rate, model, grads_params);

            if epoch % 10 == 0 || epoch == self.params.epochs - 1 {
                log::debug!("Epoch {}/{}: loss={:.4}", epoch + 1, self.params.epochs, loss_val);
            }
        }

        self.model = Some(model);
        Ok(())
    }

    fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>> {
        let model = self
            .model
            .as_ref()
            .ok_or_else(|| HoopsError::Classifier("classifier has not been fitted".to_string()))?;
        if x.rows == 0 {
            return Ok(Vec::new());
        }

        let probs = sigmoid(model.forward(self.inputs(x)?));
        let probs: Vec<f32> = probs
            .into_data()
            .to_vec::<f32>()
            .map_err(|e| HoopsError::Classifier(format!("{:?}", e)))?;
        Ok(probs.into_iter().map(|p| p >= 0.5).collect())
    }
}
