//! Classification metrics for home-win predictions

use std::fmt;

/// Confusion counts and derived scores for the home-win class
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ClassificationReport {
    pub true_positives: usize,
    pub false_positives: usize,
    pub true_negatives: usize,
    pub false_negatives: usize,
}

impl ClassificationReport {
    /// Compare predicted labels against actual labels
    pub fn from_labels(actual: &[bool], predicted: &[bool]) -> Self {
        let mut report = ClassificationReport::default();
        for (&a, &p) in actual.iter().zip(predicted) {
            match (a, p) {
                (true, true) => report.true_positives += 1,
                (false, true) => report.false_positives += 1,
                (false, false) => report.true_negatives += 1,
                (true, false) => report.false_negatives += 1,
            }
        }
        report
    }

    /// Number of scored games
    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.true_negatives + self.false_negatives
    }

    /// Actual home wins
    pub fn support(&self) -> usize {
        self.true_positives + self.false_negatives
    }

    pub fn accuracy(&self) -> f64 {
        ratio(self.true_positives + self.true_negatives, self.total())
    }

    pub fn precision(&self) -> f64 {
        ratio(self.true_positives, self.true_positives + self.false_positives)
    }

    pub fn recall(&self) -> f64 {
        ratio(self.true_positives, self.support())
    }

    /// Harmonic mean of precision and recall (0 when both are 0)
    pub fn f1(&self) -> f64 {
        let p = self.precision();
        let r = self.recall();
        if p + r == 0.0 {
            0.0
        } else {
            2.0 * p * r / (p + r)
        }
    }
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Acc: {:.2}% | Precision: {:.3} | Recall: {:.3} | F1: {:.3} | Support: {}/{}",
            self.accuracy() * 100.0,
            self.precision(),
            self.recall(),
            self.f1(),
            self.support(),
            self.total()
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scores() {
        let actual = [true, true, true, false, false];
        let predicted = [true, true, false, true, false];
        let report = ClassificationReport::from_labels(&actual, &predicted);

        assert_eq!(report.total(), 5);
        assert_eq!(report.support(), 3);
        assert!((report.accuracy() - 0.6).abs() < 1e-9);
        assert!((report.precision() - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.recall() - 2.0 / 3.0).abs() < 1e-9);
        assert!((report.f1() - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn test_no_positive_predictions() {
        let report = ClassificationReport::from_labels(&[true, false], &[false, false]);
        assert_eq!(report.precision(), 0.0);
        assert_eq!(report.f1(), 0.0);
        assert_eq!(report.accuracy(), 0.5);
    }
}
