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

use std::sync::Arc;

use crate::geometry::{AspectRatioMode, Color, Rect, Size};
use crate::message::BusMessage;
use crate::sink::WindowHandle;

/// Properties of a video output rendered into a native window.
pub trait VideoWindowControl {
    fn window_handle(&self) -> WindowHandle;
    fn set_window_handle(&mut self, handle: WindowHandle);

    fn display_rect(&self) -> Rect;
    fn set_display_rect(&mut self, rect: Rect);

    fn is_full_screen(&self) -> bool;
    fn set_full_screen(&mut self, full_screen: bool);

    fn native_size(&self) -> Size;

    fn aspect_ratio_mode(&self) -> AspectRatioMode;
    fn set_aspect_ratio_mode(&mut self, mode: AspectRatioMode);

    fn color_key(&self) -> Color;
    fn set_color_key(&mut self, color: Color);

    fn autopaint_color_key(&self) -> bool;
    fn set_autopaint_color_key(&mut self, autopaint: bool);

    fn repaint(&mut self);

    fn brightness(&self) -> i32;
    fn set_brightness(&mut self, brightness: i32);

    fn contrast(&self) -> i32;
    fn set_contrast(&mut self, contrast: i32);

    fn hue(&self) -> i32;
    fn set_hue(&mut self, hue: i32);

    fn saturation(&self) -> i32;
    fn set_saturation(&mut self, saturation: i32);
}

/// Something that provides the video sink of a pipeline.
pub trait VideoRenderer {
    type Sink;

    fn video_sink(&mut self) -> Option<Arc<Self::Sink>>;

    fn is_ready(&self) -> bool;

    fn connect_sink_changed<F: FnMut() + 'static>(&mut self, f: F);

    fn connect_ready_changed<F: FnMut(bool) + 'static>(&mut self, f: F);
}

/// Receives every bus message synchronously, on the thread that posted it.
pub trait SyncMessageFilter {
    /// Returns `true` when the message was consumed. Must not block.
    fn process_sync_message(&self, message: &BusMessage) -> bool;
}
