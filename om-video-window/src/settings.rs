// Copyright (C) 2025 Marcus L. Hanestad <marlhan@proton.me>
//
// This file is part of OpenMirroring.
//
// OpenMirroring is free software: you can redistribute it and/or modify
// it under the terms of the GNU General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// OpenMirroring is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE.  See the
// GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License
// along with OpenMirroring.  If not, see <https://www.gnu.org/licenses/>.

use serde::{Deserialize, Serialize};

use crate::geometry::{AspectRatioMode, Color, Rect};

/// User facing properties of a video window, for persisting between runs.
///
/// Has no window handle, those are only valid within one process.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub display_rect: Rect,
    pub full_screen: bool,
    pub aspect_ratio_mode: AspectRatioMode,
    pub color_key: Color,
    pub autopaint_color_key: bool,
    pub brightness: i32,
    pub contrast: i32,
    pub hue: i32,
    pub saturation: i32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            display_rect: Rect::default(),
            full_screen: false,
            aspect_ratio_mode: AspectRatioMode::default(),
            color_key: Color::default(),
            autopaint_color_key: true,
            brightness: 0,
            contrast: 0,
            hue: 0,
            saturation: 0,
        }
    }
}
