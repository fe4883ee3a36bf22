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

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{anyhow, Result};
use gst::glib;
use gst::prelude::*;
use gst_video::prelude::*;
use log::{debug, warn};

use om_video_window::sink::{
    BufferProbe, ColorBalance, ImageAttribute, ProbeId, ProbeReturn, SinkFactory,
    IMAGE_ATTRIBUTE_RANGE,
};
use om_video_window::{AspectRatioMode, Color, ElementId, FrameFormat, Rect, VideoSink, WindowHandle};

/// Object data key holding the id of an element wrapped by a [`GstVideoSink`].
const ELEMENT_ID_KEY: &str = "om-video-window-element-id";

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

/// Value range of a numeric element property.
#[derive(Debug, Clone, Copy, PartialEq)]
enum NumericRange {
    Int(i32, i32),
    Float(f32, f32),
    Double(f64, f64),
}

impl NumericRange {
    fn bounds(self) -> (f64, f64) {
        match self {
            Self::Int(min, max) => (min as f64, max as f64),
            Self::Float(min, max) => (min as f64, max as f64),
            Self::Double(min, max) => (min, max),
        }
    }

    /// Maps an attribute value onto the property's range.
    fn to_property(self, value: i32) -> glib::Value {
        let (start, end) = (
            *IMAGE_ATTRIBUTE_RANGE.start() as f64,
            *IMAGE_ATTRIBUTE_RANGE.end() as f64,
        );
        let (min, max) = self.bounds();
        let scaled = min + (value as f64 - start) * (max - min) / (end - start);

        match self {
            Self::Int(min, max) => (scaled.round() as i32).clamp(min, max).to_value(),
            Self::Float(min, max) => (scaled as f32).clamp(min, max).to_value(),
            Self::Double(min, max) => scaled.clamp(min, max).to_value(),
        }
    }

    fn from_property(self, value: &glib::Value) -> Option<i32> {
        let value = match self {
            Self::Int(..) => value.get::<i32>().ok()? as f64,
            Self::Float(..) => value.get::<f32>().ok()? as f64,
            Self::Double(..) => value.get::<f64>().ok()?,
        };
        let (start, end) = (
            *IMAGE_ATTRIBUTE_RANGE.start() as f64,
            *IMAGE_ATTRIBUTE_RANGE.end() as f64,
        );
        let (min, max) = self.bounds();
        if max <= min {
            return None;
        }

        let scaled = start + (value - min) * (end - start) / (max - min);
        Some((scaled.round() as i32).clamp(start as i32, end as i32))
    }
}

struct Probe {
    id: ProbeId,
    pad: gst::Pad,
    pad_probe: gst::PadProbeId,
    removed: Arc<AtomicBool>,
}

pub struct GstVideoSink {
    id: ElementId,
    element: gst::Element,
    probes: Mutex<Vec<Probe>>,
    next_probe: AtomicU64,
}

/// Id of an element wrapped by a [`GstVideoSink`], `None` for any other object.
///
/// Ids come from a counter and are never reused, so a freed sink can not be
/// confused with a later element allocated at the same address.
pub fn element_id(object: &impl IsA<gst::Object>) -> Option<ElementId> {
    // SAFETY: ELEMENT_ID_KEY is only ever set to a u64 in `GstVideoSink::new`
    unsafe {
        object
            .as_ref()
            .data::<u64>(ELEMENT_ID_KEY)
            .map(|id| ElementId::from_raw(*id.as_ref()))
    }
}

pub fn frame_format(caps: &gst::CapsRef) -> Option<FrameFormat> {
    let info = gst_video::VideoInfo::from_caps(caps).ok()?;
    let par = info.par();

    Some(
        FrameFormat::new(info.width() as i32, info.height() as i32)
            .with_pixel_aspect_ratio(par.numer(), par.denom()),
    )
}

impl GstVideoSink {
    pub fn new(element: gst::Element) -> Self {
        let id = element_id(&element).unwrap_or_else(|| {
            let id = ElementId::from_raw(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed));
            // SAFETY: see `element_id`
            unsafe { element.set_data::<u64>(ELEMENT_ID_KEY, id.as_raw()) };
            id
        });

        Self {
            id,
            element,
            probes: Mutex::default(),
            next_probe: AtomicU64::new(1),
        }
    }

    #[inline]
    pub fn element(&self) -> &gst::Element {
        &self.element
    }

    fn overlay(&self) -> Option<&gst_video::VideoOverlay> {
        self.element.dynamic_cast_ref::<gst_video::VideoOverlay>()
    }

    /// The property's spec if it can be read and written after construction.
    fn usable_property(&self, name: &str) -> Option<glib::ParamSpec> {
        let pspec = self.element.find_property(name)?;
        let flags = pspec.flags();

        (flags.contains(glib::ParamFlags::READWRITE)
            && !flags.contains(glib::ParamFlags::CONSTRUCT_ONLY))
        .then_some(pspec)
    }

    fn property_of_type<T: glib::StaticType>(&self, name: &str) -> Option<glib::ParamSpec> {
        self.usable_property(name)
            .filter(|pspec| pspec.value_type() == T::static_type())
    }

    fn numeric_range(&self, name: &str) -> Option<NumericRange> {
        let pspec = self.usable_property(name)?;

        if let Some(int) = pspec.downcast_ref::<glib::ParamSpecInt>() {
            Some(NumericRange::Int(int.minimum(), int.maximum()))
        } else if let Some(float) = pspec.downcast_ref::<glib::ParamSpecFloat>() {
            Some(NumericRange::Float(float.minimum(), float.maximum()))
        } else if let Some(double) = pspec.downcast_ref::<glib::ParamSpecDouble>() {
            Some(NumericRange::Double(double.minimum(), double.maximum()))
        } else {
            debug!(
                "`{name}` on `{}` has unsupported type {}",
                self.element.name(),
                pspec.value_type()
            );
            None
        }
    }
}

impl ColorBalance for GstVideoSink {
    fn value(&self, attribute: ImageAttribute) -> Option<i32> {
        let range = self.numeric_range(attribute.name())?;
        range.from_property(&self.element.property_value(attribute.name()))
    }

    fn set_value(&self, attribute: ImageAttribute, value: i32) -> Result<()> {
        let range = self.numeric_range(attribute.name()).ok_or_else(|| {
            anyhow!(
                "`{}` has no usable {} property",
                self.element.name(),
                attribute.name()
            )
        })?;

        self.element
            .set_property_from_value(attribute.name(), &range.to_property(value));

        Ok(())
    }
}

impl VideoSink for GstVideoSink {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_window_handle(&self, handle: WindowHandle) {
        if let Some(overlay) = self.overlay() {
            // SAFETY: the handle comes from the GUI toolkit and outlives the sink's use of it
            unsafe { overlay.set_window_handle(handle.as_raw()) };
        }
    }

    fn set_render_rectangle(&self, rect: Rect) -> Result<()> {
        let Some(overlay) = self.overlay() else {
            return Ok(());
        };

        if rect.is_empty() {
            // -1 means the whole window
            overlay.set_render_rectangle(0, 0, -1, -1)?;
        } else {
            overlay.set_render_rectangle(rect.x, rect.y, rect.width, rect.height)?;
        }

        Ok(())
    }

    fn expose(&self) {
        if let Some(overlay) = self.overlay() {
            overlay.expose();
        }
    }

    fn set_aspect_ratio_mode(&self, mode: AspectRatioMode) {
        if self.property_of_type::<bool>("force-aspect-ratio").is_some() {
            self.element
                .set_property("force-aspect-ratio", mode == AspectRatioMode::Keep);
        }
    }

    fn color_key(&self) -> Option<Color> {
        self.property_of_type::<i32>("colorkey")
            .map(|_| Color::from_rgb(self.element.property::<i32>("colorkey") as u32))
    }

    fn set_color_key(&self, color: Color) {
        if self.property_of_type::<i32>("colorkey").is_some() {
            self.element.set_property("colorkey", color.to_rgb() as i32);
        }
    }

    fn autopaint_color_key(&self) -> Option<bool> {
        self.property_of_type::<bool>("autopaint-colorkey")
            .map(|_| self.element.property::<bool>("autopaint-colorkey"))
    }

    fn set_autopaint_color_key(&self, autopaint: bool) {
        if self.property_of_type::<bool>("autopaint-colorkey").is_some() {
            self.element.set_property("autopaint-colorkey", autopaint);
        }
    }

    fn color_balance(&self) -> Option<&dyn ColorBalance> {
        ImageAttribute::ALL
            .iter()
            .any(|attribute| self.numeric_range(attribute.name()).is_some())
            .then_some(self as &dyn ColorBalance)
    }

    fn add_buffer_probe(&self, probe: BufferProbe) -> Option<ProbeId> {
        let pad = self.element.static_pad("sink")?;
        let removed = Arc::new(AtomicBool::new(false));
        let probe = Mutex::new(probe);

        let pad_probe = pad.add_probe(gst::PadProbeType::BUFFER, {
            let removed = Arc::clone(&removed);
            move |pad, _info| {
                let Some(format) = pad.current_caps().and_then(|caps| frame_format(&caps)) else {
                    return gst::PadProbeReturn::Ok;
                };

                let mut guard = probe.lock().unwrap_or_else(PoisonError::into_inner);
                let probe: &mut BufferProbe = &mut guard;
                match probe(&format) {
                    ProbeReturn::Keep => gst::PadProbeReturn::Ok,
                    ProbeReturn::Remove => {
                        removed.store(true, Ordering::Release);
                        gst::PadProbeReturn::Remove
                    }
                }
            }
        })?;

        let id = ProbeId::from_raw(self.next_probe.fetch_add(1, Ordering::Relaxed));
        self.probes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Probe {
                id,
                pad,
                pad_probe,
                removed,
            });

        Some(id)
    }

    fn remove_buffer_probe(&self, id: ProbeId) {
        let mut probes = self.probes.lock().unwrap_or_else(PoisonError::into_inner);
        let Some(index) = probes.iter().position(|probe| probe.id == id) else {
            return;
        };

        let probe = probes.swap_remove(index);
        if !probe.removed.load(Ordering::Acquire) {
            probe.pad.remove_probe(probe.pad_probe);
        }
    }
}

/// Makes sinks with `gst::ElementFactory`.
#[derive(Debug, Default, Clone, Copy)]
pub struct GstSinkFactory;

impl SinkFactory for GstSinkFactory {
    type Sink = GstVideoSink;

    fn make(&self, element_name: &str) -> Result<Arc<GstVideoSink>> {
        let element = gst::ElementFactory::make(element_name).build()?;

        if !element.is::<gst_video::VideoOverlay>() {
            warn!("`{element_name}` does not implement the video overlay interface");
        }

        debug!("Created video sink `{}`", element.name());

        Ok(Arc::new(GstVideoSink::new(element)))
    }
}
