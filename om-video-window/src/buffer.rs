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

use std::fmt;

/// First value available for application specific handle types.
pub const USER_HANDLE_BASE: u32 = 1000;

/// What kind of native handle backs a video buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleType {
    NoHandle,
    GlTexture,
    XvShmImage,
    Pixmap,
    CoreImage,
    /// Application defined, always `>= USER_HANDLE_BASE`.
    User(u32),
}

impl HandleType {
    #[inline]
    pub const fn user(offset: u32) -> Self {
        Self::User(USER_HANDLE_BASE.saturating_add(offset))
    }
}

impl fmt::Display for HandleType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NoHandle => f.write_str("NoHandle"),
            Self::GlTexture => f.write_str("GLTextureHandle"),
            Self::XvShmImage => f.write_str("XvShmImageHandle"),
            Self::Pixmap => f.write_str("PixmapHandle"),
            Self::CoreImage => f.write_str("CoreImageHandle"),
            Self::User(id) => write!(f, "UserHandle({id})"),
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MapMode {
    #[default]
    NotMapped,
    ReadOnly,
    WriteOnly,
    ReadWrite,
}

impl fmt::Display for MapMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::NotMapped => "NotMapped",
            Self::ReadOnly => "ReadOnly",
            Self::WriteOnly => "WriteOnly",
            Self::ReadWrite => "ReadWrite",
        })
    }
}

/// Memory of a mapped buffer.
#[derive(Debug)]
pub struct MappedPlane<'a> {
    pub data: &'a mut [u8],
    pub bytes_per_line: usize,
}

/// A frame's backing storage as seen by a renderer.
pub trait VideoBuffer {
    fn handle_type(&self) -> HandleType;

    /// Native handle, if the buffer has one.
    fn handle(&self) -> Option<usize> {
        None
    }

    fn map_mode(&self) -> MapMode;

    fn map(&mut self, mode: MapMode) -> Option<MappedPlane<'_>>;

    fn unmap(&mut self);
}
