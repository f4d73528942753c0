//! Merging per-agent reports into one structured document.
//!
//! Union with provenance: list items are deduplicated by normalized
//! text equality keeping first-seen order, and each merged item records
//! which agents contributed it. Provenance is internal only — the
//! formatter never prints it. No conflict resolution, no voting: every
//! contribution is surfaced.

use cropflow_core::{AgentId, AgentInvocationResult};
use serde::Serialize;

/// One merged list item plus the agents that contributed it.
#[derive(Debug, Clone, Serialize)]
pub struct MergedItem {
    pub text: String,
    /// Contributing agents, in contribution order. Internal only.
    pub sources: Vec<AgentId>,
}

/// The merged cross-agent answer document.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AggregatedDocument {
    /// Successful agents' answer texts, in slot order.
    pub answers: Vec<String>,
    pub recommendations: Vec<MergedItem>,
    pub warnings: Vec<MergedItem>,
    pub next_steps: Vec<MergedItem>,
    /// Agents that contributed anything to this document.
    pub contributors: Vec<AgentId>,
}

impl AggregatedDocument {
    pub fn is_empty(&self) -> bool {
        self.answers.is_empty()
            && self.recommendations.is_empty()
            && self.warnings.is_empty()
            && self.next_steps.is_empty()
    }
}

/// Merges settled invocation results.
pub struct ResponseAggregator;

impl ResponseAggregator {
    /// Merge every successful result into one document.
    ///
    /// Zero successes is not an error: the empty document stands, and
    /// the formatter renders the fixed clarifying response for it.
    pub fn merge(results: &[AgentInvocationResult]) -> AggregatedDocument {
        let mut doc = AggregatedDocument::default();

        for result in results.iter().filter(|r| r.success) {
            let Some(report) = &result.report else {
                continue;
            };

            let mut contributed = false;

            if let Some(answer) = report.answer.as_deref() {
                let answer = answer.trim();
                if !answer.is_empty() {
                    doc.answers.push(answer.to_string());
                    contributed = true;
                }
            }

            contributed |= merge_items(&mut doc.recommendations, &report.recommendations, result.agent);
            contributed |= merge_items(&mut doc.warnings, &report.warnings, result.agent);
            contributed |= merge_items(&mut doc.next_steps, &report.next_steps, result.agent);

            if contributed && !doc.contributors.contains(&result.agent) {
                doc.contributors.push(result.agent);
            }
        }

        doc
    }
}

/// Union `items` into `merged`, deduplicating by trimmed, case-folded
/// equality. A duplicate still records its agent as a source.
fn merge_items(merged: &mut Vec<MergedItem>, items: &[String], agent: AgentId) -> bool {
    let mut contributed = false;
    for item in items {
        let text = item.trim();
        if text.is_empty() {
            continue;
        }
        contributed = true;

        let normalized = text.to_lowercase();
        if let Some(existing) = merged
            .iter_mut()
            .find(|m| m.text.trim().to_lowercase() == normalized)
        {
            if !existing.sources.contains(&agent) {
                existing.sources.push(agent);
            }
        } else {
            merged.push(MergedItem {
                text: text.to_string(),
                sources: vec![agent],
            });
        }
    }
    contributed
}

#[cfg(test)]
mod tests {
    use super::*;
    use cropflow_core::{AgentId, AgentReport};
    use std::time::Duration;

    fn ok_slot(agent: AgentId, report: AgentReport) -> AgentInvocationResult {
        AgentInvocationResult::ok(agent, report, Duration::from_millis(10))
    }

    fn failed_slot(agent: AgentId) -> AgentInvocationResult {
        AgentInvocationResult::failed(agent, "boom", Duration::from_millis(5))
    }

    #[test]
    fn merges_answers_in_slot_order() {
        let results = vec![
            ok_slot(AgentId::CropSelector, AgentReport::answer("Grow chickpea.")),
            ok_slot(AgentId::SoilHealth, AgentReport::answer("Your soil suits pulses.")),
        ];

        let doc = ResponseAggregator::merge(&results);
        assert_eq!(doc.answers, vec!["Grow chickpea.", "Your soil suits pulses."]);
        assert_eq!(
            doc.contributors,
            vec![AgentId::CropSelector, AgentId::SoilHealth]
        );
    }

    #[test]
    fn deduplicates_by_normalized_text_keeping_first() {
        let mut a = AgentReport::answer("a");
        a.recommendations = vec!["Test your soil pH".into()];
        let mut b = AgentReport::answer("b");
        b.recommendations = vec!["  test your SOIL pH  ".into(), "Add compost".into()];

        let doc = ResponseAggregator::merge(&[
            ok_slot(AgentId::SoilHealth, a),
            ok_slot(AgentId::FertilizerAdvisor, b),
        ]);

        assert_eq!(doc.recommendations.len(), 2);
        // First-seen casing survives
        assert_eq!(doc.recommendations[0].text, "Test your soil pH");
        // Both contributors recorded on the merged item
        assert_eq!(
            doc.recommendations[0].sources,
            vec![AgentId::SoilHealth, AgentId::FertilizerAdvisor]
        );
        assert_eq!(doc.recommendations[1].sources, vec![AgentId::FertilizerAdvisor]);
    }

    #[test]
    fn failed_slots_contribute_nothing() {
        let results = vec![
            failed_slot(AgentId::WeatherWatcher),
            ok_slot(AgentId::FarmerCoach, AgentReport::answer("Keep records.")),
        ];

        let doc = ResponseAggregator::merge(&results);
        assert_eq!(doc.answers, vec!["Keep records."]);
        assert_eq!(doc.contributors, vec![AgentId::FarmerCoach]);
    }

    #[test]
    fn zero_successes_yield_empty_document_not_error() {
        let results = vec![
            failed_slot(AgentId::CropSelector),
            failed_slot(AgentId::SoilHealth),
        ];

        let doc = ResponseAggregator::merge(&results);
        assert!(doc.is_empty());
        assert!(doc.contributors.is_empty());
    }

    #[test]
    fn blank_items_are_dropped() {
        let mut report = AgentReport::answer("   ");
        report.warnings = vec!["".into(), "  ".into(), "Frost risk next week".into()];

        let doc = ResponseAggregator::merge(&[ok_slot(AgentId::WeatherWatcher, report)]);
        assert!(doc.answers.is_empty());
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.warnings[0].text, "Frost risk next week");
    }

    #[test]
    fn all_sections_are_unioned() {
        let mut a = AgentReport::answer("Sow early.");
        a.recommendations = vec!["Use certified seed".into()];
        a.next_steps = vec!["Book a soil test".into()];
        let mut b = AgentReport::default();
        b.warnings = vec!["Market prices volatile".into()];
        b.next_steps = vec!["Check mandi rates".into()];

        let doc = ResponseAggregator::merge(&[
            ok_slot(AgentId::CropSelector, a),
            ok_slot(AgentId::MarketIntelligence, b),
        ]);

        assert_eq!(doc.answers.len(), 1);
        assert_eq!(doc.recommendations.len(), 1);
        assert_eq!(doc.warnings.len(), 1);
        assert_eq!(doc.next_steps.len(), 2);
        assert_eq!(
            doc.contributors,
            vec![AgentId::CropSelector, AgentId::MarketIntelligence]
        );
    }
}
