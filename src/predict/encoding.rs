use std::fmt;

use serde::{Deserialize, Serialize};

use super::FeatureVector;

/// Model input order. Numeric attributes first, then one-hot groups.
pub const FEATURE_NAMES: [&str; 11] = [
    "age",
    "bmi",
    "children",
    "sex_female",
    "sex_male",
    "smoker_no",
    "smoker_yes",
    "region_northeast",
    "region_southeast",
    "region_northwest",
    "region_southwest",
];

pub fn feature_names() -> Vec<String> {
    FEATURE_NAMES.iter().map(|s| s.to_string()).collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Sex {
    Female,
    Male,
}

impl Sex {
    pub const ALL: [Sex; 2] = [Sex::Male, Sex::Female];

    /// Accepts English or Chinese labels.
    pub fn parse(s: &str) -> Option<Sex> {
        match s.trim().to_ascii_lowercase().as_str() {
            "female" | "女性" | "女" => Some(Sex::Female),
            "male" | "男性" | "男" => Some(Sex::Male),
            _ => None,
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Sex::Female => "Female",
            Sex::Male => "Male",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Smoker {
    Yes,
    No,
}

impl Smoker {
    pub const ALL: [Smoker; 2] = [Smoker::Yes, Smoker::No];

    pub fn parse(s: &str) -> Option<Smoker> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yes" | "是" => Some(Smoker::Yes),
            "no" | "否" => Some(Smoker::No),
            _ => None,
        }
    }
}

impl fmt::Display for Smoker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Smoker::Yes => "Yes",
            Smoker::No => "No",
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Region {
    Southeast,
    Southwest,
    Northeast,
    Northwest,
}

impl Region {
    pub const ALL: [Region; 4] = [
        Region::Southeast,
        Region::Southwest,
        Region::Northeast,
        Region::Northwest,
    ];

    pub fn parse(s: &str) -> Option<Region> {
        match s.trim().to_ascii_lowercase().as_str() {
            "southeast" | "东南部" => Some(Region::Southeast),
            "southwest" | "西南部" => Some(Region::Southwest),
            "northeast" | "东北部" => Some(Region::Northeast),
            "northwest" | "西北部" => Some(Region::Northwest),
            _ => None,
        }
    }
}

impl fmt::Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Region::Southeast => "Southeast",
            Region::Southwest => "Southwest",
            Region::Northeast => "Northeast",
            Region::Northwest => "Northwest",
        })
    }
}

/// Attributes collected by the cost form (and found in the training CSV).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Policyholder {
    pub age: u32,
    pub sex: Sex,
    pub bmi: f64,
    pub children: u32,
    pub smoker: Smoker,
    pub region: Region,
}

impl Default for Policyholder {
    fn default() -> Self {
        Self {
            age: 0,
            sex: Sex::Male,
            bmi: 0.0,
            children: 0,
            smoker: Smoker::Yes,
            region: Region::Southeast,
        }
    }
}

fn flag(on: bool) -> f64 {
    if on {
        1.0
    } else {
        0.0
    }
}

impl Policyholder {
    /// One-hot encode into the [`FEATURE_NAMES`] layout.
    pub fn encode(&self) -> FeatureVector {
        let values = [
            self.age as f64,
            self.bmi,
            self.children as f64,
            flag(self.sex == Sex::Female),
            flag(self.sex == Sex::Male),
            flag(self.smoker == Smoker::No),
            flag(self.smoker == Smoker::Yes),
            flag(self.region == Region::Northeast),
            flag(self.region == Region::Southeast),
            flag(self.region == Region::Northwest),
            flag(self.region == Region::Southwest),
        ];
        FEATURE_NAMES.iter().copied().zip(values).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn encoding_follows_feature_layout() {
        let p = Policyholder {
            age: 45,
            sex: Sex::Female,
            bmi: 27.5,
            children: 2,
            smoker: Smoker::No,
            region: Region::Northwest,
        };
        let fv = p.encode();

        assert_eq!(fv.names(), feature_names().as_slice());
        assert_eq!(
            fv.values(),
            &[45.0, 27.5, 2.0, 1.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0, 0.0]
        );
    }

    #[test]
    fn each_one_hot_group_has_a_single_flag() {
        for region in Region::ALL {
            let fv = Policyholder {
                region,
                ..Default::default()
            }
            .encode();
            let hot: f64 = fv.values()[7..].iter().sum();
            assert_eq!(hot, 1.0);
        }
    }

    #[test]
    fn labels_parse_in_both_languages() {
        assert_eq!(Sex::parse("女性"), Some(Sex::Female));
        assert_eq!(Sex::parse("Male"), Some(Sex::Male));
        assert_eq!(Smoker::parse("是"), Some(Smoker::Yes));
        assert_eq!(Smoker::parse("no"), Some(Smoker::No));
        assert_eq!(Region::parse("西北部"), Some(Region::Northwest));
        assert_eq!(Region::parse("SouthEast"), Some(Region::Southeast));
        assert_eq!(Region::parse("central"), None);
    }
}
