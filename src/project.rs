// ============================================================================
// PROJECT STATE — serializable session configuration
// ============================================================================
//
// Plain value structs consumed by the pixel pipeline. The state is mutated by
// discrete named operations and snapshotted wholesale by the history module;
// derived facts (has_source1, …) are recomputed on demand rather than cached.
// ============================================================================

use std::collections::HashMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::history::SnapshotHistory;
use crate::ops::adjustments::Adjustments;
use crate::ops::edge_effects::EdgeEffectType;

/// Configuration of one loaded source image.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub file_name: String,
    pub width: u32,
    pub height: u32,
    /// Degrees; carried for canvas-level rotation, not applied by the pixel
    /// adjuster.
    #[serde(default)]
    pub rotation: f64,
    /// -100 to 100
    #[serde(default)]
    pub brightness: f64,
    /// -100 to 100
    #[serde(default)]
    pub contrast: f64,
    /// -100 to 100
    #[serde(default)]
    pub saturation: f64,
}

impl SourceConfig {
    pub fn new(file_name: impl Into<String>, width: u32, height: u32) -> Self {
        Self {
            file_name: file_name.into(),
            width,
            height,
            rotation: 0.0,
            brightness: 0.0,
            contrast: 0.0,
            saturation: 0.0,
        }
    }

    /// The adjustment values the pixel pipeline consumes for this source.
    pub fn adjustments(&self) -> Adjustments {
        Adjustments {
            brightness: self.brightness,
            contrast: self.contrast,
            saturation: self.saturation,
            rotation: self.rotation,
        }
    }
}

/// Where the mask comes from.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MaskKind {
    Pattern,
    Upload,
    Drawn,
}

/// Mask configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MaskConfig {
    #[serde(rename = "type")]
    pub kind: MaskKind,
    #[serde(default)]
    pub pattern_id: Option<String>,
    /// Density scale for tiling patterns, 100 = reference.
    #[serde(default = "default_pattern_scale")]
    pub pattern_scale: f64,
    /// Binarization threshold for uploaded masks, 0-255.
    pub threshold: u8,
    pub invert: bool,
}

fn default_pattern_scale() -> f64 {
    100.0
}

impl Default for MaskConfig {
    fn default() -> Self {
        Self {
            kind: MaskKind::Pattern,
            pattern_id: Some("half-vertical".to_string()),
            pattern_scale: 100.0,
            threshold: 128,
            invert: false,
        }
    }
}

/// Edge-effect configuration.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EffectConfig {
    pub mode: EdgeEffectType,
    /// 0-100
    pub intensity: f64,
    #[serde(default)]
    pub params: HashMap<String, f64>,
}

impl Default for EffectConfig {
    fn default() -> Self {
        Self {
            mode: EdgeEffectType::None,
            intensity: 50.0,
            params: HashMap::new(),
        }
    }
}

/// The full serializable session state: two sources, mask, effect.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectState {
    pub source1: Option<SourceConfig>,
    pub source2: Option<SourceConfig>,
    pub mask: MaskConfig,
    pub effect: EffectConfig,
}

impl ProjectState {
    pub fn set_source1(&mut self, source: Option<SourceConfig>) {
        self.source1 = source;
    }

    pub fn set_source2(&mut self, source: Option<SourceConfig>) {
        self.source2 = source;
    }

    pub fn update_source1(&mut self, update: impl FnOnce(&mut SourceConfig)) {
        if let Some(source) = self.source1.as_mut() {
            update(source);
        }
    }

    pub fn update_source2(&mut self, update: impl FnOnce(&mut SourceConfig)) {
        if let Some(source) = self.source2.as_mut() {
            update(source);
        }
    }

    pub fn set_mask(&mut self, mask: MaskConfig) {
        self.mask = mask;
    }

    pub fn set_effect(&mut self, effect: EffectConfig) {
        self.effect = effect;
    }

    pub fn reset(&mut self) {
        *self = ProjectState::default();
    }

    // Derived views, recomputed on demand

    pub fn has_source1(&self) -> bool {
        self.source1.is_some()
    }

    pub fn has_source2(&self) -> bool {
        self.source2.is_some()
    }

    pub fn has_mask(&self) -> bool {
        self.mask.kind != MaskKind::Pattern || self.mask.pattern_id.is_some()
    }

    pub fn is_single_source_mode(&self) -> bool {
        self.source1.is_some() && self.source2.is_none()
    }
}

/// On-disk project document (.glue file).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GlueProject {
    pub version: String,
    pub name: String,
    pub created_at: String,
    pub modified_at: String,
    pub data: ProjectState,
}

/// Single open session.
pub struct Project {
    pub id: Uuid,
    pub state: ProjectState,
    pub history: SnapshotHistory,
    /// `None` for unsaved/untitled sessions.
    pub path: Option<PathBuf>,
    pub is_dirty: bool,

    /// Display name (derived from path or "Untitled-X")
    pub name: String,
}

impl Project {
    pub fn new_untitled(untitled_counter: usize) -> Self {
        let state = ProjectState::default();
        let mut history = SnapshotHistory::default();
        history.initialize(&state);

        Self {
            id: Uuid::new_v4(),
            state,
            history,
            path: None,
            is_dirty: false,
            name: format!("Untitled-{}", untitled_counter),
        }
    }

    pub fn from_file(path: PathBuf, state: ProjectState) -> Self {
        let name = path
            .file_name()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "Unknown".to_string());

        let mut history = SnapshotHistory::default();
        history.initialize(&state);

        Self {
            id: Uuid::new_v4(),
            state,
            history,
            path: Some(path),
            is_dirty: false,
            name,
        }
    }

    pub fn mark_dirty(&mut self) {
        self.is_dirty = true;
    }

    pub fn mark_clean(&mut self) {
        self.is_dirty = false;
    }

    /// Get the display title (name with dirty indicator)
    pub fn display_title(&self) -> String {
        if self.is_dirty {
            format!("{}*", self.name)
        } else {
            self.name.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_state_uses_half_vertical_pattern() {
        let state = ProjectState::default();
        assert_eq!(state.mask.kind, MaskKind::Pattern);
        assert_eq!(state.mask.pattern_id.as_deref(), Some("half-vertical"));
        assert_eq!(state.mask.threshold, 128);
        assert!(!state.mask.invert);
        assert_eq!(state.effect.mode, EdgeEffectType::None);
        assert_eq!(state.effect.intensity, 50.0);
    }

    #[test]
    fn derived_views_track_sources() {
        let mut state = ProjectState::default();
        assert!(!state.has_source1());
        assert!(!state.is_single_source_mode());

        state.set_source1(Some(SourceConfig::new("a.png", 10, 10)));
        assert!(state.has_source1());
        assert!(state.is_single_source_mode());

        state.set_source2(Some(SourceConfig::new("b.png", 10, 10)));
        assert!(!state.is_single_source_mode());
    }

    #[test]
    fn update_source_is_a_no_op_without_a_source() {
        let mut state = ProjectState::default();
        state.update_source1(|s| s.brightness = 50.0);
        assert!(state.source1.is_none());

        state.set_source1(Some(SourceConfig::new("a.png", 4, 4)));
        state.update_source1(|s| s.brightness = 50.0);
        assert_eq!(state.source1.as_ref().unwrap().brightness, 50.0);
    }

    #[test]
    fn reset_restores_defaults() {
        let mut state = ProjectState::default();
        state.set_source1(Some(SourceConfig::new("a.png", 4, 4)));
        state.set_effect(EffectConfig {
            mode: EdgeEffectType::Wavy,
            intensity: 90.0,
            params: HashMap::new(),
        });
        state.reset();
        assert_eq!(state, ProjectState::default());
    }

    #[test]
    fn source_config_exposes_adjustments() {
        let mut cfg = SourceConfig::new("x.png", 2, 2);
        cfg.brightness = 10.0;
        cfg.contrast = -20.0;
        cfg.saturation = 30.0;
        cfg.rotation = 90.0;
        let adj = cfg.adjustments();
        assert_eq!(adj.brightness, 10.0);
        assert_eq!(adj.contrast, -20.0);
        assert_eq!(adj.saturation, 30.0);
        assert_eq!(adj.rotation, 90.0);
    }

    #[test]
    fn dirty_flag_and_title() {
        let mut project = Project::new_untitled(1);
        assert_eq!(project.display_title(), "Untitled-1");
        project.mark_dirty();
        assert_eq!(project.display_title(), "Untitled-1*");
        project.mark_clean();
        assert_eq!(project.display_title(), "Untitled-1");
    }
}
