//! Trivial-input classification — the pipeline's short-circuit.
//!
//! Greetings, thanks, and farewells never reach the selector or the
//! dispatcher; they get a canned reply immediately. Patterns are
//! anchored so a substantive query that merely opens with a greeting
//! word ("hi, my wheat crop has pests") is NOT swallowed.

use once_cell::sync::Lazy;
use regex::Regex;

/// At most ~20 trailing characters after the greeting word. Longer text
/// is assumed to carry a real question.
static GREETING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^(hi+|hello|hey|hola|namaste|namaskar|good\s*(morning|afternoon|evening)|greetings).{0,20}$",
    )
    .expect("greeting pattern is valid")
});

static HOW_ARE_YOU: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(how are you|how r u|what's up|whats up)\b.{0,20}$")
        .expect("how-are-you pattern is valid")
});

static THANKS: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(thank you|thanks|thank u|dhanyavaad)\b.{0,20}$").expect("thanks pattern is valid")
});

static FAREWELL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(bye|goodbye|see you|good night)\b.{0,20}$").expect("farewell pattern is valid")
});

const GREETING_REPLY: &str = "Hello! I'm CropFlow, your AI farming assistant. I can help you \
     with crop selection, pest management, irrigation planning, weather forecasts, and much \
     more. What would you like to know about your farm today?";

const HOW_ARE_YOU_REPLY: &str = "I'm doing great, thank you for asking! I'm here and ready to \
     help you with all your farming needs. What can I assist you with today?";

const THANKS_REPLY: &str = "You're very welcome! I'm always here to help. Feel free to ask me \
     anything about farming, crops, weather, or agricultural best practices anytime!";

const FAREWELL_REPLY: &str = "Goodbye! Wishing you a bountiful harvest. Come back anytime you \
     need farming advice. Happy farming!";

/// Detects trivial conversational input.
///
/// A pure function of the text: never touches an agent, the registry,
/// or the LLM.
pub struct QueryClassifier;

impl QueryClassifier {
    /// Whether the text is small talk that should skip the pipeline.
    pub fn is_simple(text: &str) -> bool {
        let q = text.trim().to_lowercase();
        if q.is_empty() {
            return false;
        }
        GREETING.is_match(&q)
            || HOW_ARE_YOU.is_match(&q)
            || THANKS.is_match(&q)
            || FAREWELL.is_match(&q)
    }

    /// The canned reply for a simple query.
    ///
    /// Input flagged simple but matching no specific category gets the
    /// generic greeting reply.
    pub fn simple_response(text: &str) -> String {
        let q = text.trim().to_lowercase();
        if HOW_ARE_YOU.is_match(&q) {
            HOW_ARE_YOU_REPLY.to_string()
        } else if THANKS.is_match(&q) {
            THANKS_REPLY.to_string()
        } else if FAREWELL.is_match(&q) {
            FAREWELL_REPLY.to_string()
        } else {
            GREETING_REPLY.to_string()
        }
    }
}
