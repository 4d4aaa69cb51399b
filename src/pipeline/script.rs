//! Scroll scripts for the simulator.
//!
//! A script is a comma-separated list of steps:
//!
//! | Step | Effect |
//! |---|---|
//! | `400` or `scroll:400` | scroll to 400px |
//! | `by:-120` | scroll by a delta |
//! | `resize:600` | set the viewport height |
//! | `wait:250` | advance timers by 250ms (at most [`MAX_WAIT_MS`]) |
//! | `detach:hero` | remove an element from the document |

use std::fmt;
use std::str::FromStr;

use crate::error::{RevealError, RevealResult};
use crate::pipeline::Page;

/// Longest single `wait:` step, one hour of simulated time.
pub const MAX_WAIT_MS: u64 = 3_600_000;

#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    ScrollTo(f64),
    ScrollBy(f64),
    Resize(f64),
    Wait(u64),
    Detach(String),
}

impl Step {
    /// Parse a comma-separated script. Empty entries are skipped.
    pub fn parse_script(script: &str) -> RevealResult<Vec<Step>> {
        script
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.parse::<Step>())
            .collect()
    }

    /// Apply the step to a mounted page.
    pub fn apply(&self, page: &Page) -> RevealResult<()> {
        match self {
            Self::ScrollTo(y) => page.scroll_to(*y),
            Self::ScrollBy(dy) => page.scroll_to(page.viewport().scroll_y() + dy),
            Self::Resize(h) => page.resize(*h),
            Self::Wait(ms) => {
                page.advance(*ms);
            }
            Self::Detach(name) => {
                page.detach_element(name)?;
            }
        }
        Ok(())
    }
}

fn number(step: &str, value: &str) -> RevealResult<f64> {
    value
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite())
        .ok_or_else(|| RevealError::validation(format!("step `{step}`: `{value}` is not a number")))
}

impl FromStr for Step {
    type Err = RevealError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let Some((op, value)) = s.split_once(':') else {
            return Ok(Self::ScrollTo(number(s, s)?));
        };
        let value = value.trim();

        match op.trim() {
            "scroll" => Ok(Self::ScrollTo(number(s, value)?)),
            "by" => Ok(Self::ScrollBy(number(s, value)?)),
            "resize" => Ok(Self::Resize(number(s, value)?)),
            "wait" => match value.parse::<u64>() {
                Ok(ms) if ms <= MAX_WAIT_MS => Ok(Self::Wait(ms)),
                Ok(_) => Err(RevealError::validation(format!(
                    "step `{s}`: wait exceeds {MAX_WAIT_MS}ms"
                ))),
                Err(_) => Err(RevealError::validation(format!(
                    "step `{s}`: `{value}` is not a duration"
                ))),
            },
            "detach" if !value.is_empty() => Ok(Self::Detach(value.to_string())),
            _ => Err(RevealError::validation(format!("unknown step `{s}`"))),
        }
    }
}

impl fmt::Display for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ScrollTo(y) => write!(f, "scroll:{y}"),
            Self::ScrollBy(dy) => write!(f, "by:{dy}"),
            Self::Resize(h) => write!(f, "resize:{h}"),
            Self::Wait(ms) => write!(f, "wait:{ms}"),
            Self::Detach(name) => write!(f, "detach:{name}"),
        }
    }
}
