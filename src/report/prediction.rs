//! Predictor screen reports: model summary and single-customer outcome

use comfy_table::{presets::UTF8_FULL_CONDENSED, Attribute, Cell, CellAlignment, Table};
use console::style;

use crate::pipeline::{Alignment, ChurnModel, CustomerProfile, Prediction};
use crate::utils::{format_rate, format_thousands, print_info, print_warning, rate_bar};

/// Label shown for a prediction outcome
pub fn outcome_label(prediction: &Prediction) -> &'static str {
    if prediction.churn {
        "Yes"
    } else {
        "No"
    }
}

pub fn model_table(model: &ChurnModel) -> Table {
    let params = model.params();
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Model").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);

    table.add_row(vec![
        Cell::new("Training Rows"),
        Cell::new(format_thousands(model.training_rows() as f64)),
    ]);
    table.add_row(vec![
        Cell::new("Features"),
        Cell::new(model.feature_names().len()),
    ]);
    table.add_row(vec![
        Cell::new("Churn Share"),
        Cell::new(format_rate(model.positive_rate(), 2)),
    ]);
    table.add_row(vec![
        Cell::new("Trees × Depth"),
        Cell::new(format!("{} × {}", params.trees, params.depth)),
    ]);
    table.add_row(vec![
        Cell::new("Learning Rate"),
        Cell::new(params.learning_rate),
    ]);
    table
}

/// Comma-separated model columns, in training order
pub fn feature_list(names: &[String]) -> String {
    if names.is_empty() {
        return "(none)".to_string();
    }
    names.join(", ")
}

/// Print what the freshly trained model was fitted on
pub fn print_model_summary(model: &ChurnModel) {
    println!();
    println!(
        "    {} {}",
        style("🌲").cyan(),
        style("CHURN MODEL").white().bold()
    );
    println!("    {}", style("─".repeat(50)).dim());
    for line in model_table(model).to_string().lines() {
        println!("    {}", line);
    }
    println!(
        "    {} {}",
        style("Columns:").dim(),
        feature_list(model.feature_names())
    );
}

fn profile_table(profile: &CustomerProfile) -> Table {
    let mut table = Table::new();
    table.load_preset(UTF8_FULL_CONDENSED);
    table.set_header(vec![
        Cell::new("Input").add_attribute(Attribute::Bold),
        Cell::new("Value").add_attribute(Attribute::Bold),
    ]);
    let rows = [
        ("Age", profile.age.to_string()),
        ("Income", format!("${}", format_thousands(profile.income))),
        ("Total Transactions", profile.total_transactions.to_string()),
        ("Total Spend", format!("${}", format_thousands(profile.total_spend))),
        ("Tenure (months)", profile.tenure_months.to_string()),
        ("Marital Status", profile.marital_status.to_string()),
        ("Education Level", profile.education.to_string()),
    ];
    for (name, value) in rows {
        table.add_row(vec![
            Cell::new(name),
            Cell::new(value).set_alignment(CellAlignment::Right),
        ]);
    }
    table
}

/// Print the outcome of one prediction
pub fn print_prediction(profile: &CustomerProfile, alignment: &Alignment, prediction: &Prediction) {
    println!();
    for line in profile_table(profile).to_string().lines() {
        println!("    {}", line);
    }

    if !alignment.zero_filled.is_empty() {
        print_info(&format!(
            "Not derivable from the inputs, set to 0: {}",
            alignment.zero_filled.join(", ")
        ));
    }
    if !alignment.discarded.is_empty() {
        print_info(&format!(
            "Not used by the model: {}",
            alignment.discarded.join(", ")
        ));
    }

    let label = outcome_label(prediction);
    let label = if prediction.churn {
        style(label).red().bold()
    } else {
        style(label).green().bold()
    };
    println!();
    println!("    Churn Prediction: {}", label);
    println!(
        "    Churn Probability: {}  {}",
        style(format_rate(prediction.probability, 2)).bold(),
        style(rate_bar(prediction.probability, 30)).fg(console::Color::Color256(208))
    );
    if prediction.churn {
        print_warning("Consider a retention offer for this customer");
    }
}
