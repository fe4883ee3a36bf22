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

use om_video_window::{BusMessage, FrameFormat, MessageKind};

use crate::sink::element_id;

/// Element message a sink may post once it knows the video dimensions.
pub const NATIVE_SIZE_MESSAGE: &str = "have-native-size";

pub fn bus_message(msg: &gst::MessageRef) -> BusMessage {
    let source = msg.src().and_then(element_id);

    let kind = if gst_video::is_video_overlay_prepare_window_handle_message(msg) {
        MessageKind::PrepareWindowHandle
    } else {
        match msg.view() {
            gst::MessageView::Element(element) => element
                .structure()
                .filter(|s| s.has_name(NATIVE_SIZE_MESSAGE))
                .and_then(native_size)
                .map_or(MessageKind::Other, MessageKind::NativeSize),
            _ => MessageKind::Other,
        }
    };

    BusMessage::new(source, kind)
}

fn native_size(s: &gst::StructureRef) -> Option<FrameFormat> {
    let width = s.get::<i32>("width").ok()?;
    let height = s.get::<i32>("height").ok()?;

    Some(match s.get::<gst::Fraction>("pixel-aspect-ratio") {
        Ok(par) => FrameFormat::new(width, height).with_pixel_aspect_ratio(par.numer(), par.denom()),
        Err(_) => FrameFormat::new(width, height),
    })
}
