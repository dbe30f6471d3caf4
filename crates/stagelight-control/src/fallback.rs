// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! The placeholder shown while the real scene is absent.
//!
//! The presenter never touches the network or the asset pipeline: a frame is a
//! pure function of the session status and how long it has been in it.

use std::f32::consts::TAU;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use stagelight_core::renderer::VariantId;
use stagelight_core::session::LoadStatus;

const LOADING_CAPTION: &str = "Loading 3D scene";
const UNAVAILABLE_CAPTION: &str = "3D scene unavailable";
const SCENE_EXTENSION: &str = ".splinecode";

/// Visual tuning for the placeholder.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackStyle {
    /// How long the placeholder takes to fade out once the scene is loaded.
    pub fade_duration_ms: u64,
    /// Opacity the placeholder settles at once faded. `0.0` hides it entirely.
    pub residual_opacity: f32,
    /// Period of the ambient pulse animation.
    pub pulse_period_ms: u64,
}

impl Default for FallbackStyle {
    fn default() -> Self {
        Self {
            fade_duration_ms: 700,
            residual_opacity: 0.0,
            pulse_period_ms: 2_000,
        }
    }
}

/// What the host should draw over (or instead of) the scene surface.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FallbackFrame {
    /// Whether anything needs drawing at all.
    pub visible: bool,
    /// Placeholder opacity in `[0, 1]`.
    pub opacity: f32,
    /// Ambient pulse intensity in `[0, 1]`.
    pub pulse: f32,
    /// Accessible caption, absent once the scene is shown.
    pub caption: Option<&'static str>,
}

/// Maps a session status to a [`FallbackFrame`].
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackPresenter {
    style: FallbackStyle,
}

impl FallbackPresenter {
    /// Creates a presenter with the given style.
    pub fn new(style: FallbackStyle) -> Self {
        Self { style }
    }

    /// The frame for `status`, `elapsed` after that status was entered.
    pub fn present(&self, status: LoadStatus, elapsed: Duration) -> FallbackFrame {
        let residual = self.style.residual_opacity.clamp(0.0, 1.0);
        let (opacity, caption) = match status {
            LoadStatus::Loaded => {
                let fade = if self.style.fade_duration_ms == 0 {
                    1.0
                } else {
                    let fade_secs =
                        Duration::from_millis(self.style.fade_duration_ms).as_secs_f32();
                    (elapsed.as_secs_f32() / fade_secs).min(1.0)
                };
                (1.0 + (residual - 1.0) * fade, None)
            }
            LoadStatus::GaveUp => (1.0, Some(UNAVAILABLE_CAPTION)),
            LoadStatus::Idle | LoadStatus::Loading | LoadStatus::Errored | LoadStatus::TimedOut => {
                (1.0, Some(LOADING_CAPTION))
            }
        };

        FallbackFrame {
            visible: opacity > 0.0,
            opacity,
            pulse: self.pulse(elapsed),
            caption,
        }
    }

    /// A static preview image path for `variant`, when it names a scene file.
    ///
    /// `scenes/hero.splinecode` maps to `/previews/hero.jpg`.
    pub fn preview_for(variant: &VariantId) -> Option<String> {
        let file = variant.as_str().rsplit('/').next()?;
        let stem = file.strip_suffix(SCENE_EXTENSION)?;
        (!stem.is_empty()).then(|| format!("/previews/{stem}.jpg"))
    }

    fn pulse(&self, elapsed: Duration) -> f32 {
        if self.style.pulse_period_ms == 0 {
            return 0.0;
        }
        let period = Duration::from_millis(self.style.pulse_period_ms).as_secs_f32();
        let phase = (elapsed.as_secs_f32() % period) / period;
        0.5 - 0.5 * (phase * TAU).cos()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    #[test]
    fn placeholder_is_fully_shown_until_loaded() {
        let presenter = FallbackPresenter::default();
        for status in [
            LoadStatus::Idle,
            LoadStatus::Loading,
            LoadStatus::Errored,
            LoadStatus::TimedOut,
            LoadStatus::GaveUp,
        ] {
            let frame = presenter.present(status, Duration::from_secs(30));
            assert!(frame.visible, "{status}");
            assert_eq!(frame.opacity, 1.0, "{status}");
            assert!(frame.caption.is_some(), "{status}");
        }
    }

    #[test]
    fn give_up_has_its_own_caption() {
        let frame = FallbackPresenter::default().present(LoadStatus::GaveUp, Duration::ZERO);
        assert_eq!(frame.caption, Some("3D scene unavailable"));
    }

    #[test]
    fn loaded_fades_out_over_the_fade_duration() {
        let presenter = FallbackPresenter::default();
        let start = presenter.present(LoadStatus::Loaded, Duration::ZERO);
        assert_eq!(start.opacity, 1.0);
        assert_eq!(start.caption, None);

        let halfway = presenter.present(LoadStatus::Loaded, Duration::from_millis(350));
        assert!((halfway.opacity - 0.5).abs() < EPSILON);

        let done = presenter.present(LoadStatus::Loaded, Duration::from_millis(5_000));
        assert_eq!(done.opacity, 0.0);
        assert!(!done.visible);
    }

    #[test]
    fn residual_opacity_keeps_the_placeholder_faintly_visible() {
        let presenter = FallbackPresenter::new(FallbackStyle {
            residual_opacity: 0.2,
            ..Default::default()
        });
        let frame = presenter.present(LoadStatus::Loaded, Duration::from_secs(10));
        assert!((frame.opacity - 0.2).abs() < EPSILON);
        assert!(frame.visible);
    }

    #[test]
    fn pulse_cycles_over_its_period() {
        let presenter = FallbackPresenter::default();
        let at = |millis| presenter.present(LoadStatus::Loading, Duration::from_millis(millis)).pulse;
        assert!(at(0).abs() < EPSILON);
        assert!((at(1_000) - 1.0).abs() < EPSILON);
        assert!(at(2_000).abs() < EPSILON);
    }

    #[test]
    fn preview_paths_follow_the_scene_file_name() {
        assert_eq!(
            FallbackPresenter::preview_for(&VariantId::from("scenes/hero.splinecode")),
            Some("/previews/hero.jpg".to_owned())
        );
        assert_eq!(
            FallbackPresenter::preview_for(&VariantId::from("https://cdn.example/s/x1.splinecode")),
            Some("/previews/x1.jpg".to_owned())
        );
        assert_eq!(FallbackPresenter::preview_for(&VariantId::from("hero.glb")), None);
        assert_eq!(FallbackPresenter::preview_for(&VariantId::from(".splinecode")), None);
    }
}
