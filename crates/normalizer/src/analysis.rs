use serde_json::Value;
use workflow_protocol::{FinalAnalysis, RawFinalAnalysis};

const FENCE: &str = "```";

/// Markdown summary and confidence percent from the backend's final analysis.
///
/// Missing or malformed parts fall back to `""` and `0`.
#[must_use]
pub fn normalize_analysis(raw: Option<&RawFinalAnalysis>) -> FinalAnalysis {
    let Some(raw) = raw else {
        return FinalAnalysis::default();
    };

    let summary_markdown = match &raw.summary {
        Some(Value::Array(entries)) => entries
            .first()
            .and_then(Value::as_str)
            .map(|first| strip_code_fence(first).to_string())
            .unwrap_or_default(),
        _ => String::new(),
    };

    FinalAnalysis {
        summary_markdown,
        confidence_percent: confidence_percent(raw.confidence),
    }
}

/// Inner text of a block wrapped in a triple-backtick fence; anything else is
/// returned untouched.
///
/// The opening fence line (with its info string) and the closing fence are
/// removed together with the line break before the closing fence.
#[must_use]
pub fn strip_code_fence(text: &str) -> &str {
    let trimmed = text.trim();
    if trimmed.len() < FENCE.len() * 2 || !trimmed.starts_with(FENCE) || !trimmed.ends_with(FENCE)
    {
        return text;
    }

    let body = &trimmed[FENCE.len()..trimmed.len() - FENCE.len()];
    let inner = match body.find('\n') {
        Some(newline) => &body[newline + 1..],
        None => body,
    };
    inner
        .strip_suffix('\n')
        .map(|rest| rest.strip_suffix('\r').unwrap_or(rest))
        .unwrap_or(inner)
}

/// `round(confidence * 100)` in `0..=100`; missing or non-finite counts as 0.
#[must_use]
pub fn confidence_percent(confidence: Option<f64>) -> u8 {
    let confidence = confidence.filter(|c| c.is_finite()).unwrap_or(0.0);
    // Clamped first, so the cast cannot truncate.
    (confidence * 100.0).round().clamp(0.0, 100.0) as u8
}
