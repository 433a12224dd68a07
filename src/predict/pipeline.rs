//! End-to-end prediction pipeline
//!
//! Raw rows -> normalized games -> feature pass -> assembled matrices ->
//! classifier. Training and prediction partitions each get their own pass
//! with fresh state; the team encoding is fitted on training data only.

use crate::data::normalize::{Normalizer, SeasonWindow};
use crate::data::raw::RawGameRow;
use crate::data::rankings::{RankResolver, SeasonRankTable};
use crate::data::teams::TeamRegistry;
use crate::features::encoding::{FeatureMatrix, TeamEncoder};
use crate::features::engine::{FeatureEngine, FeaturePass};
use crate::training::classifier::{Classifier, HomeCourtBaseline};
use crate::training::metrics::ClassificationReport;
use crate::Result;

/// Everything produced by one train-then-predict run
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub training: FeaturePass,
    pub evaluation: FeaturePass,
    pub encoder: TeamEncoder,
    /// Predicted home-win label per evaluation game
    pub predicted: Vec<bool>,
    pub report: ClassificationReport,
    /// Always-home baseline on the same games
    pub baseline: ClassificationReport,
}

pub struct Pipeline<'a> {
    registry: &'a TeamRegistry,
    ranks: &'a SeasonRankTable,
}

impl<'a> Pipeline<'a> {
    pub fn new(registry: &'a TeamRegistry, ranks: &'a SeasonRankTable) -> Self {
        Pipeline { registry, ranks }
    }

    /// Normalize one partition and derive its features with fresh state
    pub fn featurize(&self, rows: Vec<RawGameRow>, window: Option<SeasonWindow>) -> Result<FeaturePass> {
        let mut normalizer = Normalizer::new(self.registry);
        if let Some(window) = window {
            normalizer = normalizer.with_window(window);
        }
        let games = normalizer.normalize(rows)?;

        let engine = FeatureEngine::new(RankResolver::new(self.ranks, self.registry));
        engine.run(games)
    }

    /// Fit the encoder on training games and assemble both matrices
    pub fn assemble(
        &self,
        training: &FeaturePass,
        evaluation: &FeaturePass,
    ) -> Result<(TeamEncoder, FeatureMatrix, FeatureMatrix)> {
        let encoder = TeamEncoder::fit(&training.games);
        let x_train = encoder.assemble(&training.games, self.registry)?;
        let x_eval = encoder.assemble(&evaluation.games, self.registry)?;
        Ok((encoder, x_train, x_eval))
    }

    /// Featurize both partitions, train on one, predict the other
    pub fn run<C: Classifier>(
        &self,
        training_rows: Vec<RawGameRow>,
        training_window: Option<SeasonWindow>,
        prediction_rows: Vec<RawGameRow>,
        prediction_window: Option<SeasonWindow>,
        classifier: &mut C,
    ) -> Result<PredictionOutcome> {
        let training = self.featurize(training_rows, training_window)?;
        let evaluation = self.featurize(prediction_rows, prediction_window)?;
        self.fit_and_predict(training, evaluation, classifier)
    }

    /// Train and predict on already featurized partitions
    pub fn fit_and_predict<C: Classifier>(
        &self,
        training: FeaturePass,
        evaluation: FeaturePass,
        classifier: &mut C,
    ) -> Result<PredictionOutcome> {
        let (encoder, x_train, x_eval) = self.assemble(&training, &evaluation)?;

        classifier.fit(&x_train)?;
        let predicted = classifier.predict(&x_eval)?;

        let report = ClassificationReport::from_labels(&x_eval.labels, &predicted);
        let baseline = ClassificationReport::from_labels(
            &x_eval.labels,
            &HomeCourtBaseline.predict(&x_eval)?,
        );
        log::info!("Model:    {}", report);
        log::info!("Baseline: {}", baseline);

        Ok(PredictionOutcome {
            training,
            evaluation,
            encoder,
            predicted,
            report,
            baseline,
        })
    }
}
