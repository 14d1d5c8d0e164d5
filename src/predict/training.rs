use std::fs::File;
use std::path::Path;

use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use super::encoding::{feature_names, Policyholder, Region, Sex, Smoker};
use crate::error::LoadError;

/// Encoded feature rows with their regression targets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TrainingSet {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub targets: Vec<f64>,
}

/// Train / test partition of a [`TrainingSet`].
#[derive(Debug, Clone)]
pub struct Split {
    pub train: TrainingSet,
    pub test: TrainingSet,
}

impl TrainingSet {
    pub fn new(feature_names: Vec<String>) -> Self {
        Self {
            feature_names,
            features: Vec::new(),
            targets: Vec::new(),
        }
    }

    pub fn push(&mut self, row: Vec<f64>, target: f64) {
        debug_assert_eq!(row.len(), self.feature_names.len());
        self.features.push(row);
        self.targets.push(target);
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.feature_names.len()
    }

    pub fn subset(&self, indices: &[usize]) -> TrainingSet {
        TrainingSet {
            feature_names: self.feature_names.clone(),
            features: indices.iter().map(|&i| self.features[i].clone()).collect(),
            targets: indices.iter().map(|&i| self.targets[i]).collect(),
        }
    }

    /// Shuffled split; `test_ratio` of the rows (rounded down) go to `test`.
    pub fn random_split(&self, test_ratio: f64, seed: u64) -> Split {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut indices: Vec<usize> = (0..self.len()).collect();
        indices.shuffle(&mut rng);

        let test_size = (test_ratio * self.len() as f64) as usize;
        let (test_indices, train_indices) = indices.split_at(test_size);
        Split {
            train: self.subset(train_indices),
            test: self.subset(test_indices),
        }
    }
}

/// Coefficient of determination. `0` when the targets have no variance.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> f64 {
    if actual.is_empty() {
        return 0.0;
    }
    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_tot: f64 = actual.iter().map(|y| (y - mean).powi(2)).sum();
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    if ss_tot == 0.0 {
        0.0
    } else {
        1.0 - ss_res / ss_tot
    }
}

// ---------------------------------------------------------------------------
// Insurance CSV
// ---------------------------------------------------------------------------

/// (canonical header, workbook header)
const AGE: (&str, &str) = ("age", "年龄");
const SEX: (&str, &str) = ("sex", "性别");
const BMI: (&str, &str) = ("bmi", "BMI");
const CHILDREN: (&str, &str) = ("children", "子女数量");
const SMOKER: (&str, &str) = ("smoker", "是否吸烟");
const REGION: (&str, &str) = ("region", "区域");
const CHARGES: (&str, &str) = ("charges", "医疗费用");

/// Read a labeled insurance CSV (UTF-8) and encode every row.
///
/// The target is the `charges` column; features follow
/// [`super::encoding::FEATURE_NAMES`].
pub fn load_insurance_csv(path: &Path) -> Result<TrainingSet, LoadError> {
    let file = File::open(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers()?.clone();

    let find = |column: (&'static str, &'static str)| {
        headers
            .iter()
            .position(|h| {
                let h = h.trim();
                h.eq_ignore_ascii_case(column.0) || h == column.1
            })
            .ok_or(LoadError::MissingColumn { column: column.0 })
    };
    let age_idx = find(AGE)?;
    let sex_idx = find(SEX)?;
    let bmi_idx = find(BMI)?;
    let children_idx = find(CHILDREN)?;
    let smoker_idx = find(SMOKER)?;
    let region_idx = find(REGION)?;
    let charges_idx = find(CHARGES)?;

    let mut set = TrainingSet::new(feature_names());
    for (i, result) in reader.records().enumerate() {
        let record = result?;
        let row = i + 1;
        let field = |idx: usize| record.get(idx).unwrap_or("").trim();
        let bad = |column: &'static str, value: &str| LoadError::InvalidValue {
            row,
            column,
            message: format!("unexpected value '{value}'"),
        };
        let number = |column: (&'static str, &'static str), idx: usize| {
            let value = field(idx);
            value
                .parse::<f64>()
                .ok()
                .filter(|v| v.is_finite() && *v >= 0.0)
                .ok_or_else(|| bad(column.0, value))
        };

        let holder = Policyholder {
            age: number(AGE, age_idx)? as u32,
            sex: Sex::parse(field(sex_idx)).ok_or_else(|| bad(SEX.0, field(sex_idx)))?,
            bmi: number(BMI, bmi_idx)?,
            children: number(CHILDREN, children_idx)? as u32,
            smoker: Smoker::parse(field(smoker_idx))
                .ok_or_else(|| bad(SMOKER.0, field(smoker_idx)))?,
            region: Region::parse(field(region_idx))
                .ok_or_else(|| bad(REGION.0, field(region_idx)))?,
        };
        let charges = number(CHARGES, charges_idx)?;

        set.push(holder.encode().values().to_vec(), charges);
    }
    Ok(set)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn r2_of_perfect_and_mean_predictions() {
        let y = [1.0, 2.0, 3.0, 4.0];
        assert_eq!(r2_score(&y, &y), 1.0);
        assert_eq!(r2_score(&y, &[2.5; 4]), 0.0);
        assert_eq!(r2_score(&[], &[]), 0.0);
    }

    #[test]
    fn split_is_seeded_and_disjoint() {
        let mut set = TrainingSet::new(vec!["x".into()]);
        for i in 0..10 {
            set.push(vec![i as f64], i as f64);
        }
        let a = set.random_split(0.2, 7);
        let b = set.random_split(0.2, 7);
        assert_eq!(a.test.targets, b.test.targets);
        assert_eq!(a.test.len(), 2);
        assert_eq!(a.train.len(), 8);

        let mut all: Vec<f64> = a.train.targets.iter().chain(&a.test.targets).copied().collect();
        all.sort_by(f64::total_cmp);
        assert_eq!(all, set.targets);
    }

    #[test]
    fn insurance_csv_accepts_workbook_headers() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "年龄,性别,BMI,子女数量,是否吸烟,区域,医疗费用").unwrap();
        writeln!(file, "19,女性,27.9,0,是,西南部,16884.924").unwrap();
        writeln!(file, "18,男性,33.77,1,否,东南部,1725.5523").unwrap();

        let set = load_insurance_csv(file.path()).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(
            set.features[0],
            [19.0, 27.9, 0.0, 1.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0]
        );
        assert_eq!(set.targets[1], 1725.5523);
    }

    #[test]
    fn insurance_csv_reports_bad_values() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "age,sex,bmi,children,smoker,region,charges").unwrap();
        writeln!(file, "40,female,30.1,2,maybe,northeast,9000").unwrap();

        let err = load_insurance_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::InvalidValue { row: 1, column: "smoker", .. }));
    }

    #[test]
    fn insurance_csv_rejects_non_finite_charges() {
        for charges in ["NaN", "inf", "-5"] {
            let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
            writeln!(file, "age,sex,bmi,children,smoker,region,charges").unwrap();
            writeln!(file, "40,female,30.1,2,no,northeast,9000").unwrap();
            writeln!(file, "41,male,28.0,0,yes,southwest,{charges}").unwrap();

            let err = load_insurance_csv(file.path()).unwrap_err();
            assert!(
                matches!(err, LoadError::InvalidValue { row: 2, column: "charges", .. }),
                "{charges}: {err}"
            );
        }
    }

    #[test]
    fn insurance_csv_requires_target() {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        writeln!(file, "age,sex,bmi,children,smoker,region").unwrap();

        let err = load_insurance_csv(file.path()).unwrap_err();
        assert!(matches!(err, LoadError::MissingColumn { column: "charges" }));
    }
}
