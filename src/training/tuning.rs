//! Hyperparameter search with k-fold cross validation

use rand::seq::SliceRandom;
use rand::SeedableRng;

use crate::features::encoding::FeatureMatrix;
use crate::training::classifier::Classifier;
use crate::training::metrics::ClassificationReport;
use crate::{HoopsError, Result};

/// Score of one candidate across all folds
#[derive(Debug, Clone)]
pub struct CandidateScore<P> {
    pub params: P,
    pub mean_f1: f64,
    pub mean_accuracy: f64,
}

/// Outcome of a grid search: the refitted best model plus every candidate's score
pub struct TuningResult<P, C> {
    pub best: CandidateScore<P>,
    pub model: C,
    pub candidates: Vec<CandidateScore<P>>,
}

/// Exhaustive search over a candidate list, scored by mean F1
#[derive(Debug, Clone)]
pub struct GridSearch {
    pub folds: usize,
    pub seed: u64,
}

impl Default for GridSearch {
    fn default() -> Self {
        GridSearch { folds: 5, seed: 14 }
    }
}

impl GridSearch {
    pub fn new(folds: usize, seed: u64) -> Self {
        GridSearch { folds, seed }
    }

    /// Shuffled fold assignment: `folds` disjoint validation index sets
    pub fn fold_indices(&self, rows: usize) -> Vec<Vec<usize>> {
        let mut indices: Vec<usize> = (0..rows).collect();
        let mut rng = rand::rngs::StdRng::seed_from_u64(self.seed);
        indices.shuffle(&mut rng);

        let k = self.folds.max(2).min(rows.max(2));
        let mut folds = vec![Vec::new(); k];
        for (i, idx) in indices.into_iter().enumerate() {
            folds[i % k].push(idx);
        }
        folds
    }

    /// Evaluate every candidate and refit the best one on all rows
    pub fn run<P, C, F>(&self, train: &FeatureMatrix, grid: &[P], build: F) -> Result<TuningResult<P, C>>
    where
        P: Clone + std::fmt::Debug,
        C: Classifier,
        F: Fn(&P) -> C,
    {
        if grid.is_empty() {
            return Err(HoopsError::Config("empty hyperparameter grid".to_string()));
        }
        if train.rows < 2 {
            return Err(HoopsError::Classifier(format!(
                "need at least 2 rows for cross validation, got {}",
                train.rows
            )));
        }

        let folds = self.fold_indices(train.rows);
        let mut candidates = Vec::with_capacity(grid.len());

        for params in grid {
            let mut f1_sum = 0.0;
            let mut acc_sum = 0.0;

            for (k, validation) in folds.iter().enumerate() {
                let training: Vec<usize> = folds
                    .iter()
                    .enumerate()
                    .filter(|(j, _)| *j != k)
                    .flat_map(|(_, f)| f.iter().copied())
                    .collect();

                let fold_train = train.select_rows(&training);
                let fold_val = train.select_rows(validation);

                let mut model = build(params);
                model.fit(&fold_train)?;
                let predicted = model.predict(&fold_val)?;
                let report = ClassificationReport::from_labels(&fold_val.labels, &predicted);
                f1_sum += report.f1();
                acc_sum += report.accuracy();
            }

            let score = CandidateScore {
                params: params.clone(),
                mean_f1: f1_sum / folds.len() as f64,
                mean_accuracy: acc_sum / folds.len() as f64,
            };
            log::info!(
                "Candidate {:?}: mean F1 {:.3}, mean accuracy {:.1}%",
                score.params,
                score.mean_f1,
                score.mean_accuracy * 100.0
            );
            candidates.push(score);
        }

        // First candidate wins ties
        let best = candidates
            .iter()
            .fold(None::<&CandidateScore<P>>, |best, c| match best {
                Some(b) if b.mean_f1 >= c.mean_f1 => Some(b),
                _ => Some(c),
            })
            .cloned()
            .ok_or_else(|| HoopsError::Config("empty hyperparameter grid".to_string()))?;

        log::info!("Best candidate {:?} (mean F1 {:.3})", best.params, best.mean_f1);

        let mut model = build(&best.params);
        model.fit(train)?;

        Ok(TuningResult {
            best,
            model,
            candidates,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Predicts a home win when column 0 exceeds a fixed threshold
    struct Threshold(f32);

    impl Classifier for Threshold {
        fn fit(&mut self, _train: &FeatureMatrix) -> Result<()> {
            Ok(())
        }

        fn predict(&self, x: &FeatureMatrix) -> Result<Vec<bool>> {
            Ok((0..x.rows).map(|i| x.row(i)[0] > self.0).collect())
        }
    }

    fn matrix() -> FeatureMatrix {
        let values: Vec<f32> = (0..20).map(|i| i as f32).collect();
        FeatureMatrix {
            rows: 20,
            cols: 1,
            labels: values.iter().map(|v| *v >= 10.0).collect(),
            data: values,
        }
    }

    #[test]
    fn test_folds_partition_rows() {
        let search = GridSearch::new(5, 14);
        let folds = search.fold_indices(23);
        assert_eq!(folds.len(), 5);

        let mut all: Vec<usize> = folds.concat();
        all.sort();
        assert_eq!(all, (0..23).collect::<Vec<_>>());

        // Same seed, same folds
        assert_eq!(folds, search.fold_indices(23));
    }

    #[test]
    fn test_picks_best_threshold() {
        let search = GridSearch::default();
        let grid = [9.5f32, 15.0, 2.0];
        let result = search.run(&matrix(), &grid, |t| Threshold(*t)).unwrap();

        assert_eq!(result.best.params, 9.5);
        assert_eq!(result.best.mean_accuracy, 1.0);
        assert_eq!(result.candidates.len(), 3);
        assert!(result.candidates[2].mean_accuracy < 1.0);
        assert_eq!(result.model.0, 9.5);
    }

    #[test]
    fn test_empty_grid_fails() {
        let search = GridSearch::default();
        let grid: [f32; 0] = [];
        assert!(search.run(&matrix(), &grid, |t| Threshold(*t)).is_err());
    }
}
