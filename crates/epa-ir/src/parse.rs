use crate::types::AutomatonSpec;

#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("JSON parse error: {0}")]
    Json(#[from] serde_json::Error),
}

pub fn parse_spec(json: &str) -> Result<AutomatonSpec, ParseError> {
    Ok(serde_json::from_str(json)?)
}

/// Render a spec as pretty-printed JSON.
pub fn print_spec(spec: &AutomatonSpec) -> Result<String, ParseError> {
    Ok(serde_json::to_string_pretty(spec)?)
}
