//! Interactive prompts using dialoguer

use std::fmt::Display;
use std::str::FromStr;

use anyhow::Result;
use dialoguer::{Confirm, Input, MultiSelect, Select};
use polars::prelude::DataFrame;

use crate::pipeline::{
    distinct_values, filter_controls, CustomerProfile, EducationLevel, FilterSelection,
    MaritalStatus, AGE_RANGE, INCOME_RANGE, SPEND_RANGE, TENURE_RANGE, TRANSACTIONS_RANGE,
};

/// Prompt user to confirm proceeding with an action
pub fn confirm_step(message: &str) -> Result<bool> {
    ask_yes_no(message, true)
}

/// Yes/no question with an explicit default answer
pub fn ask_yes_no(message: &str, default: bool) -> Result<bool> {
    let answer = Confirm::new()
        .with_prompt(message)
        .default(default)
        .interact()?;
    Ok(answer)
}

/// Walk the filter controls in order and let the user pick values for each.
///
/// Each column's options come from the table narrowed by the columns already
/// answered. Values chosen in `current` start checked; a column the user has
/// never narrowed starts with everything checked.
pub fn prompt_filters(df: &DataFrame, current: &FilterSelection) -> Result<FilterSelection> {
    let mut selection = FilterSelection::all(df)?;

    for control in filter_controls(df) {
        let narrowed = selection.apply(df)?;
        let options = distinct_values(&narrowed, control.name)?;
        if options.is_empty() {
            selection.set(control.name, Vec::new())?;
            continue;
        }

        let checked: Vec<bool> = options
            .iter()
            .map(|o| current.get(control.name).map_or(true, |v| v.contains(o)))
            .collect();

        let picked = MultiSelect::new()
            .with_prompt(format!("{} (space to toggle, enter to confirm)", control.label))
            .items(&options)
            .defaults(&checked)
            .interact()?;

        let values = picked.into_iter().map(|i| options[i].clone()).collect();
        selection.set(control.name, values)?;
    }

    Ok(selection)
}

fn prompt_bounded<T>(label: &str, initial: T, (min, max): (T, T)) -> Result<T>
where
    T: Clone + Display + FromStr + PartialOrd,
    <T as FromStr>::Err: Display,
{
    let value = Input::<T>::new()
        .with_prompt(format!("{} ({}-{})", label, min, max))
        .default(initial)
        .validate_with(|v: &T| -> Result<(), String> {
            if *v < min || *v > max {
                Err(format!("{} must be between {} and {}", label, min, max))
            } else {
                Ok(())
            }
        })
        .interact_text()?;
    Ok(value)
}

fn prompt_choice<T: Copy + PartialEq + Display>(label: &str, options: &[T], initial: T) -> Result<T> {
    let default = options.iter().position(|o| *o == initial).unwrap_or(0);
    let index = Select::new()
        .with_prompt(label)
        .items(options)
        .default(default)
        .interact()?;
    Ok(options[index])
}

/// Ask for every predictor input, starting from the values in `initial`
pub fn prompt_profile(initial: &CustomerProfile) -> Result<CustomerProfile> {
    Ok(CustomerProfile {
        age: prompt_bounded("Age", initial.age, AGE_RANGE)?,
        income: prompt_bounded("Income", initial.income, INCOME_RANGE)?,
        total_transactions: prompt_bounded(
            "Total Transactions",
            initial.total_transactions,
            TRANSACTIONS_RANGE,
        )?,
        total_spend: prompt_bounded("Total Spend", initial.total_spend, SPEND_RANGE)?,
        tenure_months: prompt_bounded("Tenure (months)", initial.tenure_months, TENURE_RANGE)?,
        marital_status: prompt_choice(
            "Marital Status",
            &MaritalStatus::ALL,
            initial.marital_status,
        )?,
        education: prompt_choice("Education Level", &EducationLevel::ALL, initial.education)?,
    })
}
