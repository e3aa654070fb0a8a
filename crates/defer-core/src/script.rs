//! Steps of a scripted page session.
//!
//! ```text
//! click touch scroll wait:3000 navigate paint render
//! ```

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::ScriptError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "step", content = "ms", rename_all = "lowercase")]
pub enum Step {
    Click,
    Touch,
    Scroll,
    /// Let this many milliseconds pass.
    Wait(u64),
    /// Full route change: start, complete, then the router's scroll-to-top.
    Navigate,
    /// Paint one frame right now.
    Paint,
    /// Poll the gate, as a render pass would.
    Render,
}

impl FromStr for Step {
    type Err = ScriptError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let step = s.trim();
        if let Some(ms) = step.strip_prefix("wait:") {
            let ms = ms.trim().parse::<u64>().map_err(|e| ScriptError::InvalidDuration {
                step: step.to_string(),
                message: e.to_string(),
            })?;
            return Ok(Step::Wait(ms));
        }
        match step.to_ascii_lowercase().as_str() {
            "click" => Ok(Step::Click),
            "touch" | "touchstart" => Ok(Step::Touch),
            "scroll" => Ok(Step::Scroll),
            "navigate" => Ok(Step::Navigate),
            "paint" => Ok(Step::Paint),
            "render" => Ok(Step::Render),
            _ => Err(ScriptError::UnknownStep(step.to_string())),
        }
    }
}

/// Parse whitespace- or comma-separated steps.
pub fn parse_steps(script: &str) -> Result<Vec<Step>, ScriptError> {
    script
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(str::parse)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_session() {
        let steps = parse_steps("render, wait:3000 click navigate paint").unwrap();
        assert_eq!(
            steps,
            vec![
                Step::Render,
                Step::Wait(3_000),
                Step::Click,
                Step::Navigate,
                Step::Paint,
            ]
        );
    }

    #[test]
    fn rejects_unknown_steps() {
        assert_eq!(
            "keydown".parse::<Step>(),
            Err(ScriptError::UnknownStep("keydown".into()))
        );
    }

    #[test]
    fn rejects_bad_durations() {
        assert!(matches!(
            "wait:-5".parse::<Step>(),
            Err(ScriptError::InvalidDuration { .. })
        ));
    }
}
