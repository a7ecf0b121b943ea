//! Integration tests for the filter panel

use churnscope::pipeline::{distinct_values, filter_controls, FilterSelection};

mod common;

use common::create_churn_dataframe;

#[test]
fn test_controls_follow_presentation_order() {
    let df = create_churn_dataframe();
    let names: Vec<&str> = filter_controls(&df).iter().map(|fc| fc.name).collect();

    assert_eq!(
        names,
        vec!["cardtype", "gender", "persona", "educationtier", "demographiccluster"]
    );
}

#[test]
fn test_default_selection_is_identity() {
    let df = create_churn_dataframe();
    let selection = FilterSelection::all(&df).unwrap();

    let filtered = selection.apply(&df).unwrap();

    assert!(filtered.equals_missing(&df));
}

#[test]
fn test_selections_intersect() {
    let df = create_churn_dataframe();
    let mut selection = FilterSelection::all(&df).unwrap();
    selection.set("gender", vec!["F".to_string()]).unwrap();
    selection.set("cardtype", vec!["Blue".to_string()]).unwrap();

    let filtered = selection.apply(&df).unwrap();

    // F rows: 0, 1, 2, 6; of those Blue: 0, 2, 6
    assert_eq!(filtered.height(), 3);
    assert_eq!(distinct_values(&filtered, "gender").unwrap(), vec!["F"]);
    assert_eq!(distinct_values(&filtered, "cardtype").unwrap(), vec!["Blue"]);
}

#[test]
fn test_empty_selection_keeps_no_rows() {
    let df = create_churn_dataframe();
    let mut selection = FilterSelection::all(&df).unwrap();
    selection.set("persona", Vec::new()).unwrap();

    let filtered = selection.apply(&df).unwrap();

    assert_eq!(filtered.height(), 0);
    assert_eq!(filtered.width(), df.width());
}

#[test]
fn test_set_unknown_column_fails() {
    let df = create_churn_dataframe();
    let mut selection = FilterSelection::all(&df).unwrap();

    assert!(selection.set("tenuregroup", vec!["0-6m".to_string()]).is_err());
    assert_eq!(selection.get("tenuregroup"), None);
}

#[test]
fn test_filters_do_not_mutate_source_table() {
    let df = create_churn_dataframe();
    let mut selection = FilterSelection::all(&df).unwrap();
    selection.set("gender", vec!["M".to_string()]).unwrap();

    let _ = selection.apply(&df).unwrap();

    assert_eq!(df.height(), 8);
}
