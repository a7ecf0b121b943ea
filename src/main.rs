//! Churnscope: Customer Churn Intelligence CLI
//!
//! `churnscope dashboard` explores churn across customer segments;
//! `churnscope predict` trains a churn model and scores single customers.

use std::process::ExitCode;
use std::time::Instant;

use anyhow::{Context, Result};
use clap::Parser;
use console::Term;
use tracing::debug;

use churnscope::cli::{
    ask_yes_no, confirm_step, filter_summary, prompt_filters, prompt_profile,
    run_dashboard_view, Cli, Commands, DashboardArgs, DatasetArgs, PredictArgs, ViewAction,
};
use churnscope::pipeline::{
    align_to_schema, churn_error, derive_features, BoostParams, ChurnError, CustomerProfile,
    IngestOptions, Session,
};
use churnscope::report::{
    export_dashboard, print_dashboard, print_model_summary, print_prediction, ExportParams,
};
use churnscope::utils::{
    create_spinner, create_training_bar, finish_with_error, finish_with_success, init_logging,
    print_banner, print_dataset_card, print_error, print_info, print_section_header,
    print_success, print_warning,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prompts and the viewer need a terminal on both ends
fn is_interactive(no_confirm: bool) -> bool {
    !no_confirm && Term::stdout().is_term() && Term::stderr().is_term()
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Dashboard(args) => run_dashboard(args),
        Commands::Predict(args) => run_predict(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            debug!(error = ?err, "run failed");
            print_error(&format!("{:#}", err));
            if let Some(ChurnError::MissingColumn(column)) = churn_error(&err) {
                eprintln!(
                    "    Column names are matched after lowercasing and replacing spaces with '_'; \
                     expected a column named `{}`.",
                    column
                );
            }
            ExitCode::FAILURE
        }
    }
}

/// Load the dataset behind a spinner and print its card
fn open_session(dataset: &DatasetArgs) -> Result<Session> {
    let spinner = create_spinner("Loading dataset...");
    let options = IngestOptions {
        infer_schema_length: dataset.infer_schema_length,
    };

    let session = match Session::open(&dataset.input, &dataset.target, &options) {
        Ok(session) => session,
        Err(err) => {
            finish_with_error(&spinner, "Could not load dataset");
            return Err(err);
        }
    };
    finish_with_success(&spinner, "Dataset loaded");

    let (rows, cols) = session.table().shape();
    print_dataset_card(&dataset.input, session.target(), rows, cols);
    Ok(session)
}

fn run_dashboard(args: DashboardArgs) -> Result<()> {
    print_banner(VERSION, "Churn Dashboard");
    let session = open_session(&args.dataset)?;
    let interactive = is_interactive(args.no_confirm);

    let all = session.default_filters()?;
    let mut selection = all.clone();
    for filter in &args.filters {
        selection
            .set(&filter.column, filter.values.clone())
            .with_context(|| format!("No filter control for column `{}`", filter.column))?;
    }

    let dashboard = loop {
        let dashboard = session.dashboard(&selection)?;
        debug!(rows = dashboard.metrics.total_customers, "dashboard built");

        if interactive && !args.plain {
            match run_dashboard_view(&dashboard, &filter_summary(&selection, &all))? {
                ViewAction::EditFilters => {
                    selection = prompt_filters(session.table(), &selection)?;
                    continue;
                }
                ViewAction::Quit => break dashboard,
            }
        }

        print_info(&filter_summary(&selection, &all));
        print_dashboard(&dashboard);

        if interactive && ask_yes_no("Adjust filters and rebuild the dashboard?", false)? {
            selection = prompt_filters(session.table(), &selection)?;
            continue;
        }
        break dashboard;
    };

    if let Some(path) = &args.export {
        if interactive && path.exists() && !confirm_step(&format!("Overwrite {}?", path.display()))? {
            print_warning("Export skipped");
            return Ok(());
        }
        let input = args.dataset.input.display().to_string();
        export_dashboard(
            &dashboard,
            path,
            &ExportParams {
                input_file: &input,
                target_column: session.target(),
                filters: &selection,
            },
        )?;
        print_success(&format!("Dashboard exported to {}", path.display()));
    }

    Ok(())
}

/// Profile from the command-line flags, defaults for anything not given
fn profile_from_args(args: &PredictArgs) -> CustomerProfile {
    let defaults = CustomerProfile::default();
    CustomerProfile {
        age: args.age.unwrap_or(defaults.age),
        income: args.income.unwrap_or(defaults.income),
        total_transactions: args.transactions.unwrap_or(defaults.total_transactions),
        total_spend: args.spend.unwrap_or(defaults.total_spend),
        tenure_months: args.tenure.unwrap_or(defaults.tenure_months),
        marital_status: args.marital_status.unwrap_or(defaults.marital_status),
        education: args.education.unwrap_or(defaults.education),
    }
}

fn run_predict(args: PredictArgs) -> Result<()> {
    print_banner(VERSION, "Churn Predictor");
    let session = open_session(&args.dataset)?;
    let interactive = is_interactive(args.no_confirm);

    print_section_header(1, "Train Churn Model");
    let started = Instant::now();
    let bar = create_training_bar(BoostParams::default().trees as u64);
    let model = match session.train(Some(&bar)) {
        Ok(model) => model,
        Err(err) => {
            finish_with_error(&bar, "Training failed");
            return Err(err);
        }
    };
    finish_with_success(
        &bar,
        &format!("Model trained in {:.1}s", started.elapsed().as_secs_f64()),
    );
    print_model_summary(&model);

    print_section_header(2, "Predict Customer Churn");
    let mut profile = profile_from_args(&args);
    loop {
        if interactive {
            profile = prompt_profile(&profile)?;
        }
        profile.validate()?;

        let alignment = align_to_schema(&derive_features(&profile), model.feature_names());
        let prediction = model.predict(&alignment.row)?;
        print_prediction(&profile, &alignment, &prediction);

        if !interactive || !ask_yes_no("Score another customer?", false)? {
            break;
        }
    }

    Ok(())
}
