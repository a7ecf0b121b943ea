//! Declared column requirements of every dashboard chart
//!
//! The dashboard checks the table schema once and skips whatever a chart
//! cannot be drawn from; derivation code never tests for columns itself.

use serde::Serialize;

use super::table::Schema;

/// Dashboard sections, in display order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum Section {
    Demographics,
    Behavior,
    Lifecycle,
    Retention,
}

impl Section {
    pub const ALL: [Section; 4] = [
        Section::Demographics,
        Section::Behavior,
        Section::Lifecycle,
        Section::Retention,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Demographics => "Customer Insight: Demographics Linked to Churn",
            Section::Behavior => "Behavioral Insight: Spend & Activity Patterns",
            Section::Lifecycle => "Early Warning: Churn over Customer Lifecycle",
            Section::Retention => "Strategic Retention: Behavior × Demographics Interaction",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Chart {
    ChurnByGender,
    ChurnByEducation,
    ChurnByCluster,
    SpendVsUtilization,
    ChurnByTransactionLevel,
    ChurnByTenure,
    PersonaIncomeHeatmap,
}

impl Chart {
    pub const ALL: [Chart; 7] = [
        Chart::ChurnByGender,
        Chart::ChurnByEducation,
        Chart::ChurnByCluster,
        Chart::SpendVsUtilization,
        Chart::ChurnByTransactionLevel,
        Chart::ChurnByTenure,
        Chart::PersonaIncomeHeatmap,
    ];

    /// Columns the chart is derived from, besides the target
    pub fn required_columns(&self) -> &'static [&'static str] {
        match self {
            Chart::ChurnByGender => &["gender"],
            Chart::ChurnByEducation => &["educationtier"],
            Chart::ChurnByCluster => &["demographiccluster"],
            Chart::SpendVsUtilization => &["utilizationrate", "totalspend"],
            Chart::ChurnByTransactionLevel => &["totaltransactions"],
            Chart::ChurnByTenure => &["tenuregroup"],
            Chart::PersonaIncomeHeatmap => &["persona", "income_bucket"],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Chart::ChurnByGender => "Churn by Gender",
            Chart::ChurnByEducation => "Churn by Education Tier",
            Chart::ChurnByCluster => "Churn by Demographic Cluster",
            Chart::SpendVsUtilization => "Spending vs Utilization Rate",
            Chart::ChurnByTransactionLevel => "Churn by Transaction Level",
            Chart::ChurnByTenure => "Churn by Tenure Group",
            Chart::PersonaIncomeHeatmap => "Churn Risk by Persona & Income",
        }
    }

    pub fn section(&self) -> Section {
        match self {
            Chart::ChurnByGender | Chart::ChurnByEducation | Chart::ChurnByCluster => {
                Section::Demographics
            }
            Chart::SpendVsUtilization | Chart::ChurnByTransactionLevel => Section::Behavior,
            Chart::ChurnByTenure => Section::Lifecycle,
            Chart::PersonaIncomeHeatmap => Section::Retention,
        }
    }

    pub fn is_available(&self, schema: &Schema) -> bool {
        schema.supports(self.required_columns())
    }
}

/// Headline metrics; the optional ones depend on a single source column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Metric {
    TotalCustomers,
    AttritionRate,
    AvgCreditLimit,
    AvgUtilization,
    AvgSpend,
    AvgTransactions,
}

impl Metric {
    pub const ALL: [Metric; 6] = [
        Metric::TotalCustomers,
        Metric::AttritionRate,
        Metric::AvgCreditLimit,
        Metric::AvgUtilization,
        Metric::AvgSpend,
        Metric::AvgTransactions,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Metric::TotalCustomers => "Total Customers",
            Metric::AttritionRate => "Attrition Rate",
            Metric::AvgCreditLimit => "Avg Credit Limit",
            Metric::AvgUtilization => "Avg Utilization",
            Metric::AvgSpend => "Avg Spend",
            Metric::AvgTransactions => "Avg Transactions",
        }
    }

    /// Column a metric is averaged from; `None` for metrics that only need the table
    pub fn source_column(&self) -> Option<&'static str> {
        match self {
            Metric::TotalCustomers | Metric::AttritionRate => None,
            Metric::AvgCreditLimit => Some("creditlimit"),
            Metric::AvgUtilization => Some("utilizationrate"),
            Metric::AvgSpend => Some("totalspend"),
            Metric::AvgTransactions => Some("totaltransactions"),
        }
    }
}

/// Split charts into (drawable, skipped) for a schema
pub fn plan_charts(schema: &Schema) -> (Vec<Chart>, Vec<Chart>) {
    Chart::ALL.iter().partition(|c| c.is_available(schema))
}

#[cfg(test)]
mod tests {
    use super::*;
    use polars::prelude::*;
    use super::Schema;

    #[test]
    fn test_plan_charts_by_schema() {
        let df = df! {
            "attritionflag" => [0i32],
            "gender" => ["F"],
            "persona" => ["Saver"],
            "totalspend" => [10.0f64],
        }
        .unwrap();

        let (drawable, skipped) = plan_charts(&Schema::from_frame(&df));

        assert_eq!(drawable, vec![Chart::ChurnByGender]);
        assert!(skipped.contains(&Chart::PersonaIncomeHeatmap));
        assert!(skipped.contains(&Chart::SpendVsUtilization));
        assert_eq!(drawable.len() + skipped.len(), Chart::ALL.len());
    }

    #[test]
    fn test_every_section_has_a_chart() {
        for section in Section::ALL {
            assert!(Chart::ALL.iter().any(|c| c.section() == section));
        }
    }
}
