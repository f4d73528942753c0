//! Deterministic rendering of the merged document into user-facing text.
//!
//! No external calls, no randomness: the same document and style always
//! produce the same string. Fixed section order: answer, then
//! recommendations, then warnings, then numbered next steps. Empty
//! sections emit nothing — not even a header. An entirely empty
//! document renders the fixed clarifying response, never an empty
//! string.

use crate::aggregator::AggregatedDocument;
use cropflow_core::ResponseStyle;

/// The response when no agent produced anything usable. Asks for the
/// three details the selector needs most.
pub const CLARIFYING_RESPONSE: &str = "I'd be happy to help you with your farming questions! \
To give you the best advice, could you share some details about:\n\n\
\u{2022} What crop you're growing\n\
\u{2022} Your location or region\n\
\u{2022} Any specific concerns or challenges you're facing\n\n\
With this information, I can provide personalized recommendations for your farm.";

/// Renders aggregated documents.
pub struct NaturalLanguageFormatter;

impl NaturalLanguageFormatter {
    /// Render the document in the requested style.
    pub fn render(document: &AggregatedDocument, style: ResponseStyle) -> String {
        if document.is_empty() {
            return CLARIFYING_RESPONSE.to_string();
        }

        let conversational = style == ResponseStyle::Conversational;
        let mut parts: Vec<String> = Vec::new();

        if !document.answers.is_empty() {
            parts.push(document.answers.join("\n\n"));
        }

        if !document.recommendations.is_empty() {
            parts.push(String::new());
            parts.push(
                if conversational {
                    "\u{1F331} **Here's what I recommend:**"
                } else {
                    "**Recommendations:**"
                }
                .to_string(),
            );
            for item in &document.recommendations {
                parts.push(format!("\u{2022} {}", item.text));
            }
        }

        if !document.warnings.is_empty() {
            parts.push(String::new());
            parts.push(
                if conversational {
                    "\u{26A0}\u{FE0F} **Important to keep in mind:**"
                } else {
                    "**Warnings:**"
                }
                .to_string(),
            );
            for item in &document.warnings {
                parts.push(format!("\u{26A0}\u{FE0F} {}", item.text));
            }
        }

        if !document.next_steps.is_empty() {
            parts.push(String::new());
            parts.push(
                if conversational {
                    "\u{1F4CB} **Your action plan:**"
                } else {
                    "**Next Steps:**"
                }
                .to_string(),
            );
            for (i, item) in document.next_steps.iter().enumerate() {
                parts.push(format!("{}. {}", i + 1, item.text));
            }
        }

        parts.join("\n")
    }
}
