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

use crate::geometry::FrameFormat;
use crate::sink::ElementId;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    /// The overlay asks for a window handle before it creates its own window.
    PrepareWindowHandle,
    NativeSize(FrameFormat),
    Other,
}

/// A message posted on the pipeline bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BusMessage {
    source: Option<ElementId>,
    kind: MessageKind,
}

impl BusMessage {
    #[inline]
    pub const fn new(source: Option<ElementId>, kind: MessageKind) -> Self {
        Self { source, kind }
    }

    #[inline]
    pub const fn prepare_window_handle(source: ElementId) -> Self {
        Self::new(Some(source), MessageKind::PrepareWindowHandle)
    }

    #[inline]
    pub const fn native_size(source: ElementId, width: i32, height: i32) -> Self {
        Self::new(
            Some(source),
            MessageKind::NativeSize(FrameFormat::new(width, height)),
        )
    }

    #[inline]
    pub const fn source(&self) -> Option<ElementId> {
        self.source
    }

    #[inline]
    pub const fn kind(&self) -> &MessageKind {
        &self.kind
    }

    #[inline]
    pub fn is_from(&self, element: ElementId) -> bool {
        self.source == Some(element)
    }
}
