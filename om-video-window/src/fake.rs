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

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock};

use anyhow::{bail, Result};

use crate::control::SyncMessageFilter;
use crate::geometry::{AspectRatioMode, Color, FrameFormat, Rect};
use crate::message::BusMessage;
use crate::sink::{
    BufferProbe, ColorBalance, ElementId, ImageAttribute, ProbeId, ProbeReturn, SinkFactory,
    VideoSink, WindowHandle,
};
use crate::window::SyncHandler;

static NEXT_ELEMENT_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Debug, Default)]
pub struct FakeState {
    pub window_handle: WindowHandle,
    pub render_rect: Option<Rect>,
    pub aspect_ratio_mode: Option<AspectRatioMode>,
    pub full_screen: bool,
    pub color_key: Option<Color>,
    pub autopaint_color_key: Option<bool>,
    pub exposes: usize,
    pub balance: HashMap<ImageAttribute, i32>,
}

pub struct FakeSink {
    id: ElementId,
    has_balance: bool,
    state: Mutex<FakeState>,
    probes: Mutex<Vec<(ProbeId, BufferProbe)>>,
    next_probe: AtomicU64,
}

impl FakeSink {
    pub fn new(has_balance: bool) -> Self {
        Self {
            id: ElementId::from_raw(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)),
            has_balance,
            state: Mutex::default(),
            probes: Mutex::default(),
            next_probe: AtomicU64::new(1),
        }
    }

    pub fn state(&self) -> MutexGuard<'_, FakeState> {
        self.state.lock().unwrap()
    }

    pub fn probe_count(&self) -> usize {
        self.probes.lock().unwrap().len()
    }

    /// Runs every probe like a streaming thread would. Returns how many ran.
    pub fn push_buffer(&self, format: FrameFormat) -> usize {
        let mut invoked = 0;
        self.probes.lock().unwrap().retain_mut(|(_, probe)| {
            invoked += 1;
            probe(&format) == ProbeReturn::Keep
        });
        invoked
    }
}

impl ColorBalance for FakeSink {
    fn value(&self, attribute: ImageAttribute) -> Option<i32> {
        Some(self.state().balance.get(&attribute).copied().unwrap_or(0))
    }

    fn set_value(&self, attribute: ImageAttribute, value: i32) -> Result<()> {
        self.state().balance.insert(attribute, value);
        Ok(())
    }
}

impl VideoSink for FakeSink {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_window_handle(&self, handle: WindowHandle) {
        self.state().window_handle = handle;
    }

    fn set_render_rectangle(&self, rect: Rect) -> Result<()> {
        self.state().render_rect = Some(rect);
        Ok(())
    }

    fn expose(&self) {
        self.state().exposes += 1;
    }

    fn set_aspect_ratio_mode(&self, mode: AspectRatioMode) {
        self.state().aspect_ratio_mode = Some(mode);
    }

    fn set_full_screen(&self, full_screen: bool) {
        self.state().full_screen = full_screen;
    }

    fn color_key(&self) -> Option<Color> {
        self.state().color_key
    }

    fn set_color_key(&self, color: Color) {
        self.state().color_key = Some(color);
    }

    fn autopaint_color_key(&self) -> Option<bool> {
        self.state().autopaint_color_key
    }

    fn set_autopaint_color_key(&self, autopaint: bool) {
        self.state().autopaint_color_key = Some(autopaint);
    }

    fn color_balance(&self) -> Option<&dyn ColorBalance> {
        self.has_balance.then_some(self as &dyn ColorBalance)
    }

    fn add_buffer_probe(&self, probe: BufferProbe) -> Option<ProbeId> {
        let id = ProbeId::from_raw(self.next_probe.fetch_add(1, Ordering::Relaxed));
        self.probes.lock().unwrap().push((id, probe));
        Some(id)
    }

    fn remove_buffer_probe(&self, id: ProbeId) {
        self.probes.lock().unwrap().retain(|(probe_id, _)| *probe_id != id);
    }
}

/// Holds the strong references, like a pipeline owning its elements.
pub type FakePipeline = Arc<Mutex<Vec<Arc<FakeSink>>>>;

pub struct FakeFactory {
    pipeline: FakePipeline,
    fail: bool,
    has_balance: bool,
}

impl FakeFactory {
    pub fn new() -> (Self, FakePipeline) {
        let pipeline = FakePipeline::default();
        (
            Self {
                pipeline: Arc::clone(&pipeline),
                fail: false,
                has_balance: true,
            },
            pipeline,
        )
    }

    pub fn failing() -> Self {
        Self {
            pipeline: FakePipeline::default(),
            fail: true,
            has_balance: true,
        }
    }

    pub fn without_balance(mut self) -> Self {
        self.has_balance = false;
        self
    }
}

impl SinkFactory for FakeFactory {
    type Sink = FakeSink;

    fn make(&self, element_name: &str) -> Result<Arc<FakeSink>> {
        if self.fail {
            bail!("no such element `{element_name}`");
        }

        let sink = Arc::new(FakeSink::new(self.has_balance));
        self.pipeline.lock().unwrap().push(Arc::clone(&sink));
        Ok(sink)
    }
}

/// Posts bus messages synchronously from inside `set_window_handle`, the way
/// overlay sinks do when they are handed a window.
pub struct ReentrantSink {
    id: ElementId,
    handler: OnceLock<SyncHandler<ReentrantSink>>,
    handles: Mutex<Vec<WindowHandle>>,
}

impl ReentrantSink {
    pub fn connect(&self, handler: SyncHandler<ReentrantSink>) {
        let _ = self.handler.set(handler);
    }

    pub fn handles(&self) -> Vec<WindowHandle> {
        self.handles.lock().unwrap().clone()
    }
}

impl VideoSink for ReentrantSink {
    fn id(&self) -> ElementId {
        self.id
    }

    fn set_window_handle(&self, handle: WindowHandle) {
        self.handles.lock().unwrap().push(handle);
        if let Some(handler) = self.handler.get() {
            handler.process_sync_message(&BusMessage::prepare_window_handle(self.id));
            handler.process_sync_message(&BusMessage::native_size(self.id, 640, 360));
        }
    }

    fn add_buffer_probe(&self, _probe: BufferProbe) -> Option<ProbeId> {
        None
    }

    fn remove_buffer_probe(&self, _id: ProbeId) {}
}

#[derive(Default)]
pub struct ReentrantFactory {
    pipeline: Mutex<Vec<Arc<ReentrantSink>>>,
}

impl SinkFactory for ReentrantFactory {
    type Sink = ReentrantSink;

    fn make(&self, _element_name: &str) -> Result<Arc<ReentrantSink>> {
        let sink = Arc::new(ReentrantSink {
            id: ElementId::from_raw(NEXT_ELEMENT_ID.fetch_add(1, Ordering::Relaxed)),
            handler: OnceLock::new(),
            handles: Mutex::default(),
        });
        self.pipeline.lock().unwrap().push(Arc::clone(&sink));
        Ok(sink)
    }
}
