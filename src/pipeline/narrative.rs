//! Narrative insights derived from already-computed aggregates

use serde::Serialize;

use super::aggregate::{ChurnSummary, GroupRate};

/// Dashboard section an insight belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum InsightKind {
    Demographic,
    Behavioral,
    EarlyWarning,
    Retention,
}

impl InsightKind {
    pub fn heading(&self) -> &'static str {
        match self {
            InsightKind::Demographic => "Narrative Insight",
            InsightKind::Behavioral => "Behavioral Insight",
            InsightKind::EarlyWarning => "Early Warning",
            InsightKind::Retention => "Retention Strategy",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Insight {
    pub kind: InsightKind,
    pub text: String,
}

/// Group with the highest churn rate. On ties the earliest group wins.
///
/// `None` for an empty summary.
pub fn riskiest_group(summary: &ChurnSummary) -> Option<&GroupRate> {
    summary.groups.iter().fold(None, |best: Option<&GroupRate>, g| match best {
        Some(b) if b.churn_rate >= g.churn_rate => Some(b),
        _ => Some(g),
    })
}

pub fn demographic_insight(by_gender: &ChurnSummary) -> Option<Insight> {
    let top = riskiest_group(by_gender)?;
    Some(Insight {
        kind: InsightKind::Demographic,
        text: format!(
            "Customers identified as {} show higher churn risk. Education and demographic \
             clusters also show disparities suggesting deeper behavioral segmentation may be required.",
            top.label()
        ),
    })
}

pub fn behavioral_insight(avg_spend: Option<f64>, avg_transactions: Option<f64>) -> Option<Insight> {
    let (spend, transactions) = (avg_spend?, avg_transactions?);
    Some(Insight {
        kind: InsightKind::Behavioral,
        text: format!(
            "Avg spend per customer is ${}, with roughly {:.0} transactions. Higher churn observed \
             among low-spend, high-utilization segments.",
            crate::utils::format_thousands(spend),
            transactions
        ),
    })
}

pub fn lifecycle_insight(by_tenure: &ChurnSummary) -> Option<Insight> {
    let peak = riskiest_group(by_tenure)?;
    Some(Insight {
        kind: InsightKind::EarlyWarning,
        text: format!(
            "Churn peaks for {} customers. Retention focus should be applied early in lifecycle.",
            peak.label()
        ),
    })
}

pub fn retention_insight(by_persona_income: &ChurnSummary) -> Option<Insight> {
    let risk = riskiest_group(by_persona_income)?;
    let [persona, income] = risk.key.as_slice() else {
        return None;
    };
    Some(Insight {
        kind: InsightKind::Retention,
        text: format!(
            "Highest churn risk at {:.1}% comes from {} customers with {} income level. \
             Prioritize targeted retention offers for this group.",
            risk.churn_rate * 100.0,
            persona,
            income
        ),
    })
}
