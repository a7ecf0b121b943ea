//! Predictor input: derive a feature row from a customer profile and align
//! it to a trained model's feature list

use std::fmt;
use std::str::FromStr;

use anyhow::Result;
use serde::Serialize;

use super::error::ChurnError;

/// Age at or below which a customer counts as young
pub const YOUNG_AGE_CUTOFF: u32 = 25;

/// Tenure (months) at or below which a customer counts as new
pub const NEW_TENURE_CUTOFF_MONTHS: u32 = 6;

pub const AGE_RANGE: (u32, u32) = (18, 100);
pub const INCOME_RANGE: (f64, f64) = (0.0, 1e7);
pub const TRANSACTIONS_RANGE: (u32, u32) = (0, 1000);
pub const SPEND_RANGE: (f64, f64) = (0.0, 1e6);
pub const TENURE_RANGE: (u32, u32) = (0, 120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MaritalStatus {
    Married,
    Single,
    Divorced,
    Widowed,
}

impl MaritalStatus {
    pub const ALL: [MaritalStatus; 4] = [
        MaritalStatus::Married,
        MaritalStatus::Single,
        MaritalStatus::Divorced,
        MaritalStatus::Widowed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MaritalStatus::Married => "married",
            MaritalStatus::Single => "single",
            MaritalStatus::Divorced => "divorced",
            MaritalStatus::Widowed => "widowed",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EducationLevel {
    HighSchool,
    Bachelor,
    Master,
    Phd,
}

impl EducationLevel {
    pub const ALL: [EducationLevel; 4] = [
        EducationLevel::HighSchool,
        EducationLevel::Bachelor,
        EducationLevel::Master,
        EducationLevel::Phd,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EducationLevel::HighSchool => "high_school",
            EducationLevel::Bachelor => "bachelor",
            EducationLevel::Master => "master",
            EducationLevel::Phd => "phd",
        }
    }
}

macro_rules! impl_choice {
    ($ty:ident, $what:literal) => {
        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = String;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                let wanted = s.trim().to_lowercase().replace([' ', '-'], "_");
                $ty::ALL
                    .into_iter()
                    .find(|v| v.as_str() == wanted)
                    .ok_or_else(|| {
                        let options: Vec<&str> = $ty::ALL.iter().map(|v| v.as_str()).collect();
                        format!("Unknown {}: '{}'. Use one of: {}", $what, s, options.join(", "))
                    })
            }
        }
    };
}

impl_choice!(MaritalStatus, "marital status");
impl_choice!(EducationLevel, "education level");

/// Raw attributes entered for a single prediction
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CustomerProfile {
    pub age: u32,
    pub income: f64,
    pub total_transactions: u32,
    pub total_spend: f64,
    pub tenure_months: u32,
    pub marital_status: MaritalStatus,
    pub education: EducationLevel,
}

impl Default for CustomerProfile {
    fn default() -> Self {
        Self {
            age: 30,
            income: 50_000.0,
            total_transactions: 10,
            total_spend: 5_000.0,
            tenure_months: 12,
            marital_status: MaritalStatus::Married,
            education: EducationLevel::HighSchool,
        }
    }
}

fn check_range(field: &'static str, value: f64, (min, max): (f64, f64)) -> Result<()> {
    if value.is_nan() || value < min || value > max {
        return Err(ChurnError::InputOutOfRange {
            field,
            min,
            max,
            value,
        }
        .into());
    }
    Ok(())
}

fn widen((min, max): (u32, u32)) -> (f64, f64) {
    (min as f64, max as f64)
}

impl CustomerProfile {
    /// Check every numeric field against its input bounds
    pub fn validate(&self) -> Result<()> {
        check_range("Age", self.age as f64, widen(AGE_RANGE))?;
        check_range("Income", self.income, INCOME_RANGE)?;
        check_range(
            "Total Transactions",
            self.total_transactions as f64,
            widen(TRANSACTIONS_RANGE),
        )?;
        check_range("Total Spend", self.total_spend, SPEND_RANGE)?;
        check_range("Tenure (months)", self.tenure_months as f64, widen(TENURE_RANGE))?;
        Ok(())
    }
}

/// An ordered row of named feature values
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FeatureRow {
    columns: Vec<String>,
    values: Vec<f64>,
}

impl FeatureRow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a feature, replacing the value if the name already exists
    pub fn insert(&mut self, name: impl Into<String>, value: f64) {
        let name = name.into();
        match self.columns.iter().position(|c| *c == name) {
            Some(i) => self.values[i] = value,
            None => {
                self.columns.push(name);
                self.values.push(value);
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<f64> {
        self.columns
            .iter()
            .position(|c| c == name)
            .map(|i| self.values[i])
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.columns
            .iter()
            .map(|c| c.as_str())
            .zip(self.values.iter().copied())
    }
}

impl<S: Into<String>> FromIterator<(S, f64)> for FeatureRow {
    fn from_iter<I: IntoIterator<Item = (S, f64)>>(iter: I) -> Self {
        let mut row = FeatureRow::new();
        for (name, value) in iter {
            row.insert(name, value);
        }
        row
    }
}

fn flag(condition: bool) -> f64 {
    if condition {
        1.0
    } else {
        0.0
    }
}

/// Derive the engineered feature row for a profile.
///
/// Indicators exist only for widowed, high_school and master; every other
/// category value produces no indicator column at all.
pub fn derive_features(profile: &CustomerProfile) -> FeatureRow {
    let transactions = profile.total_transactions as f64;
    let tenure = profile.tenure_months as f64;

    let txn_to_tenure = if profile.tenure_months > 0 {
        transactions / tenure
    } else {
        transactions
    };
    let spend_per_txn = if profile.total_transactions > 0 {
        profile.total_spend / transactions
    } else {
        0.0
    };

    FeatureRow::from_iter([
        ("age", profile.age as f64),
        ("income", profile.income),
        ("totaltransactions", transactions),
        ("totalspend", profile.total_spend),
        ("tenure", tenure),
        ("txntotenureratio", txn_to_tenure),
        ("spendpertxn", spend_per_txn),
        (
            "maritalstatus_widowed",
            flag(profile.marital_status == MaritalStatus::Widowed),
        ),
        (
            "educationlevel_high_school",
            flag(profile.education == EducationLevel::HighSchool),
        ),
        (
            "educationlevel_master",
            flag(profile.education == EducationLevel::Master),
        ),
        ("age_bucket_low", flag(profile.age <= YOUNG_AGE_CUTOFF)),
        (
            "tenuregroup_6m",
            flag(profile.tenure_months <= NEW_TENURE_CUTOFF_MONTHS),
        ),
        ("creditlimit_bucket_low", 0.0),
    ])
}

/// A derived row reconciled against a feature list
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Alignment {
    /// Row whose columns equal the schema in membership and order
    pub row: FeatureRow,
    /// Schema features the derived row did not provide, set to 0
    pub zero_filled: Vec<String>,
    /// Derived features the schema does not use
    pub discarded: Vec<String>,
}

/// Zero-fill, select and reorder `derived` to exactly `schema`
pub fn align_to_schema(derived: &FeatureRow, schema: &[String]) -> Alignment {
    let mut zero_filled = Vec::new();
    let row = schema
        .iter()
        .map(|name| {
            let value = derived.get(name).unwrap_or_else(|| {
                zero_filled.push(name.clone());
                0.0
            });
            (name.clone(), value)
        })
        .collect();

    let discarded = derived
        .columns()
        .iter()
        .filter(|c| !schema.contains(c))
        .cloned()
        .collect();

    Alignment {
        row,
        zero_filled,
        discarded,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_choice_parsing() {
        assert_eq!("Widowed".parse::<MaritalStatus>().unwrap(), MaritalStatus::Widowed);
        assert_eq!("high school".parse::<EducationLevel>().unwrap(), EducationLevel::HighSchool);
        assert_eq!("PhD".parse::<EducationLevel>().unwrap(), EducationLevel::Phd);
        let err = "engaged".parse::<MaritalStatus>().unwrap_err();
        assert!(err.contains("married, single, divorced, widowed"));
    }

    #[test]
    fn test_feature_row_insert_replaces() {
        let mut row = FeatureRow::new();
        row.insert("a", 1.0);
        row.insert("b", 2.0);
        row.insert("a", 3.0);
        assert_eq!(row.columns(), &["a".to_string(), "b".to_string()]);
        assert_eq!(row.get("a"), Some(3.0));
    }

    #[test]
    fn test_validate_bounds() {
        let mut profile = CustomerProfile::default();
        assert!(profile.validate().is_ok());

        profile.age = 17;
        assert!(profile.validate().is_err());

        profile.age = 40;
        profile.total_spend = 2e6;
        let err = profile.validate().unwrap_err();
        assert!(err.to_string().starts_with("Total Spend must be between"));
    }
}
