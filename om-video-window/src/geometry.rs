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

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Size {
    pub width: i32,
    pub height: i32,
}

impl Size {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }

    /// A size is empty when either dimension is zero or negative.
    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.width <= 0 || self.height <= 0
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl Rect {
    #[inline]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    #[inline]
    pub const fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }

    #[inline]
    pub const fn is_empty(&self) -> bool {
        self.size().is_empty()
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    #[inline]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// From `0x00RRGGBB`, the layout overlay sinks use for their color key.
    #[inline]
    pub const fn from_rgb(rgb: u32) -> Self {
        Self {
            r: (rgb >> 16) as u8,
            g: (rgb >> 8) as u8,
            b: rgb as u8,
        }
    }

    #[inline]
    pub const fn to_rgb(self) -> u32 {
        (self.r as u32) << 16 | (self.g as u32) << 8 | self.b as u32
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AspectRatioMode {
    /// Stretch to the display rectangle.
    Ignore,
    /// Fit inside the display rectangle, letterboxing the rest.
    #[default]
    Keep,
    /// Cover the display rectangle, cropping what falls outside.
    KeepByExpanding,
}

impl AspectRatioMode {
    /// Where a video of `native` size ends up when scaled into `rect`.
    pub fn fit(self, native: Size, rect: Rect) -> Rect {
        if native.is_empty() || rect.is_empty() || self == Self::Ignore {
            return rect;
        }

        let (nw, nh) = (native.width as i64, native.height as i64);
        let (rw, rh) = (rect.width as i64, rect.height as i64);

        // Height bound when the native ratio is narrower than the rect.
        let height_bound = nw * rh <= rw * nh;
        let use_height = match self {
            Self::Keep => height_bound,
            _ => !height_bound,
        };

        let (width, height) = if use_height {
            (nw * rh / nh, rh)
        } else {
            (rw, nh * rw / nw)
        };

        Rect::new(
            rect.x + ((rw - width) / 2) as i32,
            rect.y + ((rh - height) / 2) as i32,
            width as i32,
            height as i32,
        )
    }
}

/// Dimensions of a frame as negotiated on the sink pad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameFormat {
    pub width: i32,
    pub height: i32,
    pub par_n: i32,
    pub par_d: i32,
}

impl FrameFormat {
    #[inline]
    pub const fn new(width: i32, height: i32) -> Self {
        Self {
            width,
            height,
            par_n: 1,
            par_d: 1,
        }
    }

    #[inline]
    pub const fn with_pixel_aspect_ratio(mut self, par_n: i32, par_d: i32) -> Self {
        self.par_n = par_n;
        self.par_d = par_d;
        self
    }

    /// Size on screen with the pixel aspect ratio applied to the width.
    pub fn display_size(&self) -> Size {
        if self.par_n <= 0 || self.par_d <= 0 || self.par_n == self.par_d {
            return Size::new(self.width, self.height);
        }

        let width = self.width as i64 * self.par_n as i64 / self.par_d as i64;
        Size::new(width.clamp(0, i32::MAX as i64) as i32, self.height)
    }
}
