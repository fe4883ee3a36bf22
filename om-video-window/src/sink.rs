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

use std::ops::RangeInclusive;
use std::sync::Arc;

use anyhow::Result;

use crate::geometry::{AspectRatioMode, Color, FrameFormat, Rect};

/// Platform window/drawable id the video is rendered into. Zero means none.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(usize);

impl WindowHandle {
    pub const NONE: Self = Self(0);

    #[inline]
    pub const fn from_raw(raw: usize) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> usize {
        self.0
    }

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == 0
    }
}

/// Identity of a pipeline element, used to match bus message sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ElementId(u64);

impl ElementId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProbeId(u64);

impl ProbeId {
    #[inline]
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn as_raw(self) -> u64 {
        self.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProbeReturn {
    Keep,
    Remove,
}

/// Called on the streaming thread for every buffer reaching the sink.
pub type BufferProbe = Box<dyn FnMut(&FrameFormat) -> ProbeReturn + Send + 'static>;

pub const IMAGE_ATTRIBUTE_RANGE: RangeInclusive<i32> = -100..=100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ImageAttribute {
    Brightness,
    Contrast,
    Hue,
    Saturation,
}

impl ImageAttribute {
    pub const ALL: [Self; 4] = [Self::Brightness, Self::Contrast, Self::Hue, Self::Saturation];

    #[inline]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Brightness => "brightness",
            Self::Contrast => "contrast",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
        }
    }
}

/// Image adjustments in `IMAGE_ATTRIBUTE_RANGE`. Backends scale to their own range.
pub trait ColorBalance {
    fn value(&self, attribute: ImageAttribute) -> Option<i32>;

    fn set_value(&self, attribute: ImageAttribute, value: i32) -> Result<()>;
}

/// The pipeline's terminal video element, seen through its overlay capability.
///
/// Everything except `id`, `add_buffer_probe` and `remove_buffer_probe` is
/// optional: sinks without a capability keep the no-op defaults.
pub trait VideoSink: Send + Sync + 'static {
    fn id(&self) -> ElementId;

    fn set_window_handle(&self, _handle: WindowHandle) {}

    fn set_render_rectangle(&self, _rect: Rect) -> Result<()> {
        Ok(())
    }

    fn expose(&self) {}

    fn set_aspect_ratio_mode(&self, _mode: AspectRatioMode) {}

    fn set_full_screen(&self, _full_screen: bool) {}

    fn color_key(&self) -> Option<Color> {
        None
    }

    fn set_color_key(&self, _color: Color) {}

    fn autopaint_color_key(&self) -> Option<bool> {
        None
    }

    fn set_autopaint_color_key(&self, _autopaint: bool) {}

    fn color_balance(&self) -> Option<&dyn ColorBalance> {
        None
    }

    /// Returns `None` when the sink has no data path to probe.
    fn add_buffer_probe(&self, probe: BufferProbe) -> Option<ProbeId>;

    fn remove_buffer_probe(&self, id: ProbeId);
}

/// Creates sink elements by type name.
pub trait SinkFactory {
    type Sink: VideoSink;

    fn make(&self, element_name: &str) -> Result<Arc<Self::Sink>>;
}
