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

pub mod buffer;
pub mod control;
pub mod geometry;
pub mod message;
pub mod notify;
pub mod settings;
pub mod sink;
pub mod window;

#[cfg(test)]
pub(crate) mod fake;

pub use geometry::{AspectRatioMode, Color, FrameFormat, Rect, Size};
pub use message::{BusMessage, MessageKind};
pub use settings::Settings;
pub use sink::{ElementId, SinkFactory, VideoSink, WindowHandle};
pub use window::{default_element_name, SyncHandler, VideoWindow};

pub mod prelude {
    pub use crate::control::{SyncMessageFilter, VideoRenderer, VideoWindowControl};
}
