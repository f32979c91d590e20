use crate::schema::{SCHEMA_NAME, response_schema};
use crate::types::StructuredRequest;

/// Bumped whenever [`SYSTEM_PROMPT`] changes, so logged extractions can be
/// traced back to the instructions that produced them.
pub const PROMPT_VERSION: &str = "2024-06-v1";

/// Low temperature keeps repeated extractions close to each other.
pub const TEMPERATURE: f64 = 0.3;

pub const SYSTEM_PROMPT: &str = "\
You extract structured information from short free-text requests.

Return exactly these fields:
- zip: the postal or ZIP code mentioned in the text.
- brand: the company or brand name mentioned in the text.
- category: the domain of the request, for example food, electronics, \
clothing, retail or services. Use another short label if none of these fit.
- time_pref: the time preference exactly as the user phrased it, for example \
\"tomorrow evening\" or \"next Monday\".

Be conservative. If a field is not clearly present in the text, return null \
for it. Never guess or invent values.

Respond in the same language as the input text.";

pub fn build_request(text: &str) -> StructuredRequest {
    StructuredRequest {
        system: SYSTEM_PROMPT.to_string(),
        user: text.to_string(),
        temperature: TEMPERATURE,
        schema_name: SCHEMA_NAME,
        schema: response_schema(),
    }
}
