//! Page configuration.
//!
//! A page is described in TOML: the viewport height plus the tracks, latches
//! and typewriters mounted on it. Positions are document-absolute.
//!
//! ```toml
//! viewport_height = 800.0
//!
//! [[track]]
//! id = "feature-words"
//! top = 1200.0
//! height = 2400.0
//! rule = { kind = "word_carousel", distance_em = 5.7 }
//!
//! [[latch]]
//! id = "hero"
//! top = 0.0
//! height = 400.0
//! threshold = 0.3
//! once = true
//!
//! [[typewriter]]
//! id = "tagline"
//! text = "Ship faster."
//! speed_ms = 50
//! ```

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{RevealError, RevealResult};
use crate::primitives::{DEFAULT_SPEED_MS, IntersectionOptions, TypewriterOptions};
use crate::state::StageRule;

// ============================================================================
// Sections
// ============================================================================

/// A scroll-driven track.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TrackConfig {
    pub id: String,
    pub top: f64,
    pub height: f64,
    pub rule: StageRule,
}

/// An intersection-driven latch.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LatchConfig {
    pub id: String,
    pub top: f64,
    pub height: f64,
    #[serde(default = "default_threshold")]
    pub threshold: f64,
    #[serde(default = "default_once")]
    pub once: bool,
}

impl LatchConfig {
    pub fn options(&self) -> IntersectionOptions {
        IntersectionOptions {
            threshold: self.threshold,
            once: self.once,
        }
    }
}

/// A typewriter.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TypewriterConfig {
    pub id: String,
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_speed")]
    pub speed_ms: u64,
    #[serde(default = "default_start")]
    pub start_animation: bool,
    #[serde(default, rename = "loop")]
    pub loop_animation: bool,
}

impl TypewriterConfig {
    pub fn options(&self) -> TypewriterOptions {
        TypewriterOptions {
            text: self.text.clone(),
            speed_ms: self.speed_ms,
            start_animation: self.start_animation,
            loop_animation: self.loop_animation,
        }
    }
}

fn default_threshold() -> f64 {
    IntersectionOptions::default().threshold
}

fn default_once() -> bool {
    IntersectionOptions::default().once
}

fn default_speed() -> u64 {
    DEFAULT_SPEED_MS
}

fn default_start() -> bool {
    true
}

fn default_viewport_height() -> f64 {
    800.0
}

// ============================================================================
// PageConfig
// ============================================================================

/// Complete page description.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PageConfig {
    #[serde(default = "default_viewport_height")]
    pub viewport_height: f64,
    #[serde(default, rename = "track")]
    pub tracks: Vec<TrackConfig>,
    #[serde(default, rename = "latch")]
    pub latches: Vec<LatchConfig>,
    #[serde(default, rename = "typewriter")]
    pub typewriters: Vec<TypewriterConfig>,
}

impl PageConfig {
    /// Parse and validate a TOML page description.
    pub fn from_toml_str(content: &str) -> RevealResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a page file.
    pub fn load(path: &Path) -> RevealResult<Self> {
        let content =
            fs::read_to_string(path).map_err(|err| RevealError::Io(path.to_path_buf(), err))?;
        let config = Self::from_toml_str(&content)?;
        tracing::debug!(
            path = %path.display(),
            tracks = config.tracks.len(),
            latches = config.latches.len(),
            typewriters = config.typewriters.len(),
            "page config loaded"
        );
        Ok(config)
    }

    /// Reject values the runtime would otherwise silently clamp.
    pub fn validate(&self) -> RevealResult<()> {
        if !(self.viewport_height.is_finite() && self.viewport_height > 0.0) {
            return Err(RevealError::validation(format!(
                "viewport_height must be positive, got {}",
                self.viewport_height
            )));
        }

        let mut ids = HashSet::new();
        let all_ids = self
            .tracks
            .iter()
            .map(|t| t.id.as_str())
            .chain(self.latches.iter().map(|l| l.id.as_str()))
            .chain(self.typewriters.iter().map(|t| t.id.as_str()));
        for id in all_ids {
            if id.is_empty() {
                return Err(RevealError::validation("component id must not be empty"));
            }
            if !ids.insert(id) {
                return Err(RevealError::validation(format!("duplicate id `{id}`")));
            }
        }

        for track in &self.tracks {
            check_geometry(&track.id, track.top, track.height)?;
            match track.rule {
                StageRule::Steps { count: 0 } => {
                    return Err(RevealError::validation(format!(
                        "track `{}`: steps count must be at least 1",
                        track.id
                    )));
                }
                StageRule::WordCarousel { distance_em } if !distance_em.is_finite() => {
                    return Err(RevealError::validation(format!(
                        "track `{}`: distance_em must be finite",
                        track.id
                    )));
                }
                _ => {}
            }
        }

        for latch in &self.latches {
            check_geometry(&latch.id, latch.top, latch.height)?;
            if !(0.0..=1.0).contains(&latch.threshold) {
                return Err(RevealError::validation(format!(
                    "latch `{}`: threshold must be within [0, 1], got {}",
                    latch.id, latch.threshold
                )));
            }
        }

        for typewriter in &self.typewriters {
            if typewriter.speed_ms == 0 {
                return Err(RevealError::validation(format!(
                    "typewriter `{}`: speed_ms must be at least 1",
                    typewriter.id
                )));
            }
        }

        Ok(())
    }
}

fn check_geometry(id: &str, top: f64, height: f64) -> RevealResult<()> {
    if !top.is_finite() {
        return Err(RevealError::validation(format!("`{id}`: top must be finite")));
    }
    if !(height.is_finite() && height >= 0.0) {
        return Err(RevealError::validation(format!(
            "`{id}`: height must be a non-negative number, got {height}"
        )));
    }
    Ok(())
}
