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

use std::sync::{Arc, Mutex, Weak};

use crossbeam_channel::Receiver;
use log::{debug, trace, warn};

use crate::control::{SyncMessageFilter, VideoRenderer, VideoWindowControl};
use crate::geometry::{AspectRatioMode, Color, FrameFormat, Rect, Size};
use crate::message::{BusMessage, MessageKind};
use crate::notify::{lock, Notifier, Signal};
use crate::settings::Settings;
use crate::sink::{
    ElementId, ImageAttribute, ProbeId, ProbeReturn, SinkFactory, VideoSink, WindowHandle,
    IMAGE_ATTRIBUTE_RANGE,
};

pub const DEFAULT_VIDEO_SINK: &str = "xvimagesink";
pub const VIDEO_SINK_ENV: &str = "OM_VIDEO_SINK";

/// Sink element used when none is given, `$OM_VIDEO_SINK` or `xvimagesink`.
pub fn default_element_name() -> String {
    std::env::var(VIDEO_SINK_ENV).unwrap_or_else(|_| DEFAULT_VIDEO_SINK.to_owned())
}

/// State touched from both the GUI and the streaming thread.
///
/// `handle_generation` grows whenever the handle or the sink changes. Only one
/// thread at a time forwards the handle to the sink (`forwarding`), and it
/// repeats until the generation it forwarded is still current.
struct SyncState<S> {
    window_handle: WindowHandle,
    handle_generation: u64,
    forwarding: bool,
    sink: Weak<S>,
    sink_id: Option<ElementId>,
    probe: Option<ProbeId>,
    size_captured: bool,
}

impl<S> Default for SyncState<S> {
    fn default() -> Self {
        Self {
            window_handle: WindowHandle::NONE,
            handle_generation: 0,
            forwarding: false,
            sink: Weak::new(),
            sink_id: None,
            probe: None,
            size_captured: false,
        }
    }
}

/// What a forwarding thread sends to the sink once the lock is released.
struct HandleUpdate<S> {
    sink: Option<Arc<S>>,
    handle: WindowHandle,
    generation: u64,
}

impl<S> SyncState<S> {
    /// Claims forwarding, `None` if another call is already forwarding and
    /// will pick up the current generation.
    fn begin_forwarding(&mut self) -> Option<HandleUpdate<S>> {
        if self.forwarding {
            return None;
        }
        self.forwarding = true;

        Some(HandleUpdate {
            sink: self.sink.upgrade(),
            handle: self.window_handle,
            generation: self.handle_generation,
        })
    }
}

struct Shared<S> {
    state: Mutex<SyncState<S>>,
    notifier: Notifier,
}

impl<S: VideoSink> Shared<S> {
    fn new() -> Self {
        Self {
            state: Mutex::new(SyncState::default()),
            notifier: Notifier::new(),
        }
    }

    fn sink(&self) -> Option<Arc<S>> {
        lock(&self.state).sink.upgrade()
    }

    fn process_sync_message(&self, message: &BusMessage) -> bool {
        let state = lock(&self.state);
        if !state.sink_id.is_some_and(|id| message.is_from(id)) {
            return false;
        }

        match *message.kind() {
            MessageKind::PrepareWindowHandle => {
                let mut state = state;
                if state.window_handle.is_none() || state.sink.strong_count() == 0 {
                    return false;
                }
                let update = state.begin_forwarding();
                drop(state);

                if let Some(update) = update {
                    self.forward_window_handle(update);
                }
                true
            }
            MessageKind::NativeSize(format) => {
                drop(state);
                let size = format.display_size();
                if size.is_empty() {
                    trace!("Ignoring empty native size {format:?}");
                    return false;
                }
                debug!("Native video size {}x{}", size.width, size.height);
                self.notifier.post_native_size(size);
                true
            }
            MessageKind::Other => false,
        }
    }

    /// Sends the handle with the sink unlocked, so a sink posting bus messages
    /// from inside the call can re-enter `process_sync_message`.
    fn forward_window_handle(&self, mut update: HandleUpdate<S>) {
        loop {
            if let Some(sink) = update.sink.take() {
                sink.set_window_handle(update.handle);
            }

            let mut state = lock(&self.state);
            if state.handle_generation == update.generation {
                state.forwarding = false;
                return;
            }

            update = HandleUpdate {
                sink: state.sink.upgrade(),
                handle: state.window_handle,
                generation: state.handle_generation,
            };
        }
    }

    fn capture_first_frame(&self, format: &FrameFormat) -> ProbeReturn {
        let size = format.display_size();
        if size.is_empty() {
            return ProbeReturn::Keep;
        }

        {
            let mut state = lock(&self.state);
            state.size_captured = true;
            state.probe = None;
        }

        debug!("First frame is {}x{}", size.width, size.height);
        self.notifier.post_native_size(size);

        ProbeReturn::Remove
    }

    fn detach(&self) {
        let (sink, probe) = {
            let mut state = lock(&self.state);
            let sink = std::mem::take(&mut state.sink).upgrade();
            state.sink_id = None;
            (sink, state.probe.take())
        };

        if let (Some(sink), Some(probe)) = (sink, probe) {
            debug!("Removing buffer probe {probe:?} from {:?}", sink.id());
            sink.remove_buffer_probe(probe);
        }
    }
}

/// Bus side of a [`VideoWindow`], safe to move into a pipeline's sync handler.
pub struct SyncHandler<S> {
    shared: Arc<Shared<S>>,
}

impl<S> Clone for SyncHandler<S> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<S: VideoSink> SyncMessageFilter for SyncHandler<S> {
    fn process_sync_message(&self, message: &BusMessage) -> bool {
        self.shared.process_sync_message(message)
    }
}

/// Renders a pipeline's video into a native window.
///
/// Owned and used by the GUI thread. The sink is owned by the pipeline, the
/// window only keeps a weak reference and creates a new one through the
/// factory when asked for a sink while none is alive.
pub struct VideoWindow<F: SinkFactory> {
    factory: F,
    element_name: String,
    shared: Arc<Shared<F::Sink>>,
    display_rect: Rect,
    full_screen: bool,
    aspect_ratio_mode: AspectRatioMode,
    native_size: Size,
    color_key: Color,
    autopaint_color_key: bool,
    sink_changed: Signal<()>,
    ready_changed: Signal<bool>,
    native_size_changed: Signal<Size>,
}

impl<F: SinkFactory> VideoWindow<F> {
    pub fn new(factory: F, element_name: Option<&str>) -> Self {
        let element_name = element_name
            .map(ToOwned::to_owned)
            .unwrap_or_else(default_element_name);

        Self {
            factory,
            element_name,
            shared: Arc::new(Shared::new()),
            display_rect: Rect::default(),
            full_screen: false,
            aspect_ratio_mode: AspectRatioMode::default(),
            native_size: Size::default(),
            color_key: Color::default(),
            autopaint_color_key: true,
            sink_changed: Signal::default(),
            ready_changed: Signal::default(),
            native_size_changed: Signal::default(),
        }
    }

    #[inline]
    pub fn element_name(&self) -> &str {
        &self.element_name
    }

    pub fn sync_handler(&self) -> SyncHandler<F::Sink> {
        SyncHandler {
            shared: Arc::clone(&self.shared),
        }
    }

    pub fn connect_native_size_changed<C: FnMut(Size) + 'static>(&mut self, f: C) {
        self.native_size_changed.connect(f);
    }

    /// `waker` runs on the streaming thread whenever a new native size is
    /// pending, typically posting [`Self::dispatch_pending`] to the event loop.
    pub fn set_wake_notifier<W>(&self, waker: W)
    where
        W: Fn() + Send + Sync + 'static,
    {
        self.shared.notifier.set_waker(waker);
    }

    /// Receives a token whenever [`Self::dispatch_pending`] has work to do.
    pub fn wake_receiver(&self) -> Receiver<()> {
        self.shared.notifier.receiver()
    }

    /// Applies what the streaming thread handed over. Returns `true` if
    /// anything was pending.
    pub fn dispatch_pending(&mut self) -> bool {
        let Some(size) = self.shared.notifier.take() else {
            return false;
        };

        if size != self.native_size {
            self.native_size = size;
            self.native_size_changed.emit(size);
        }

        true
    }

    /// Forgets the sink, removing the buffer probe if it is still installed.
    /// Call before the pipeline tears the sink down.
    pub fn release_sink(&mut self) {
        self.shared.detach();
    }

    pub fn settings(&self) -> Settings {
        Settings {
            display_rect: self.display_rect,
            full_screen: self.full_screen,
            aspect_ratio_mode: self.aspect_ratio_mode,
            color_key: self.color_key(),
            autopaint_color_key: self.autopaint_color_key(),
            brightness: self.brightness(),
            contrast: self.contrast(),
            hue: self.hue(),
            saturation: self.saturation(),
        }
    }

    pub fn apply_settings(&mut self, settings: &Settings) {
        self.set_display_rect(settings.display_rect);
        self.set_full_screen(settings.full_screen);
        self.set_aspect_ratio_mode(settings.aspect_ratio_mode);
        self.set_color_key(settings.color_key);
        self.set_autopaint_color_key(settings.autopaint_color_key);
        self.set_brightness(settings.brightness);
        self.set_contrast(settings.contrast);
        self.set_hue(settings.hue);
        self.set_saturation(settings.saturation);
    }

    fn attach(&mut self, sink: &Arc<F::Sink>) {
        debug!("Attaching `{}` sink {:?}", self.element_name, sink.id());

        let update = {
            let mut state = lock(&self.shared.state);
            state.sink = Arc::downgrade(sink);
            state.sink_id = Some(sink.id());
            state.probe = None;
            state.size_captured = false;
            state.handle_generation += 1;
            if state.window_handle.is_none() {
                None
            } else {
                state.begin_forwarding()
            }
        };

        if let Some(update) = update {
            self.shared.forward_window_handle(update);
        }

        sink.set_aspect_ratio_mode(self.aspect_ratio_mode);
        sink.set_full_screen(self.full_screen);
        sink.set_color_key(self.color_key);
        sink.set_autopaint_color_key(self.autopaint_color_key);
        self.forward_display_rect(sink);

        let shared = Arc::downgrade(&self.shared);
        let probe = sink.add_buffer_probe(Box::new(move |format: &FrameFormat| {
            match shared.upgrade() {
                Some(shared) => shared.capture_first_frame(format),
                None => ProbeReturn::Remove,
            }
        }));

        let mut state = lock(&self.shared.state);
        if !state.size_captured {
            state.probe = probe;
        }
    }

    fn forward_display_rect(&self, sink: &F::Sink) {
        if let Err(err) = sink.set_render_rectangle(self.display_rect) {
            debug!("Failed to set render rectangle {:?}: {err}", self.display_rect);
        }
    }

    fn image_attribute(&self, attribute: ImageAttribute) -> i32 {
        self.shared
            .sink()
            .and_then(|sink| sink.color_balance().and_then(|balance| balance.value(attribute)))
            .unwrap_or(0)
    }

    fn set_image_attribute(&mut self, attribute: ImageAttribute, value: i32) {
        let Some(sink) = self.shared.sink() else {
            return;
        };
        let Some(balance) = sink.color_balance() else {
            debug!("Sink has no color balance, ignoring {}", attribute.name());
            return;
        };

        let value = value.clamp(*IMAGE_ATTRIBUTE_RANGE.start(), *IMAGE_ATTRIBUTE_RANGE.end());
        if let Err(err) = balance.set_value(attribute, value) {
            debug!("Failed to set {} to {value}: {err}", attribute.name());
        }
    }
}

impl<F: SinkFactory> Drop for VideoWindow<F> {
    fn drop(&mut self) {
        self.shared.detach();
    }
}

impl<F: SinkFactory> VideoWindowControl for VideoWindow<F> {
    fn window_handle(&self) -> WindowHandle {
        lock(&self.shared.state).window_handle
    }

    fn set_window_handle(&mut self, handle: WindowHandle) {
        let (was_ready, update) = {
            let mut state = lock(&self.shared.state);
            let previous = state.window_handle;
            if previous == handle {
                return;
            }
            state.window_handle = handle;
            state.handle_generation += 1;
            (!previous.is_none(), state.begin_forwarding())
        };

        if let Some(update) = update {
            self.shared.forward_window_handle(update);
        }

        let ready = !handle.is_none();
        if was_ready != ready {
            debug!("Video window ready: {ready}");
            self.ready_changed.emit(ready);
        }
    }

    fn display_rect(&self) -> Rect {
        self.display_rect
    }

    fn set_display_rect(&mut self, rect: Rect) {
        self.display_rect = rect;
        if let Some(sink) = self.shared.sink() {
            self.forward_display_rect(&sink);
        }
    }

    fn is_full_screen(&self) -> bool {
        self.full_screen
    }

    fn set_full_screen(&mut self, full_screen: bool) {
        self.full_screen = full_screen;
        if let Some(sink) = self.shared.sink() {
            sink.set_full_screen(full_screen);
        }
    }

    fn native_size(&self) -> Size {
        self.native_size
    }

    fn aspect_ratio_mode(&self) -> AspectRatioMode {
        self.aspect_ratio_mode
    }

    fn set_aspect_ratio_mode(&mut self, mode: AspectRatioMode) {
        self.aspect_ratio_mode = mode;
        if let Some(sink) = self.shared.sink() {
            sink.set_aspect_ratio_mode(mode);
        }
    }

    fn color_key(&self) -> Color {
        self.shared
            .sink()
            .and_then(|sink| sink.color_key())
            .unwrap_or(self.color_key)
    }

    fn set_color_key(&mut self, color: Color) {
        self.color_key = color;
        if let Some(sink) = self.shared.sink() {
            sink.set_color_key(color);
        }
    }

    fn autopaint_color_key(&self) -> bool {
        self.shared
            .sink()
            .and_then(|sink| sink.autopaint_color_key())
            .unwrap_or(self.autopaint_color_key)
    }

    fn set_autopaint_color_key(&mut self, autopaint: bool) {
        self.autopaint_color_key = autopaint;
        if let Some(sink) = self.shared.sink() {
            sink.set_autopaint_color_key(autopaint);
        }
    }

    fn repaint(&mut self) {
        if !self.is_ready() {
            return;
        }
        if let Some(sink) = self.shared.sink() {
            sink.expose();
        }
    }

    fn brightness(&self) -> i32 {
        self.image_attribute(ImageAttribute::Brightness)
    }

    fn set_brightness(&mut self, brightness: i32) {
        self.set_image_attribute(ImageAttribute::Brightness, brightness);
    }

    fn contrast(&self) -> i32 {
        self.image_attribute(ImageAttribute::Contrast)
    }

    fn set_contrast(&mut self, contrast: i32) {
        self.set_image_attribute(ImageAttribute::Contrast, contrast);
    }

    fn hue(&self) -> i32 {
        self.image_attribute(ImageAttribute::Hue)
    }

    fn set_hue(&mut self, hue: i32) {
        self.set_image_attribute(ImageAttribute::Hue, hue);
    }

    fn saturation(&self) -> i32 {
        self.image_attribute(ImageAttribute::Saturation)
    }

    fn set_saturation(&mut self, saturation: i32) {
        self.set_image_attribute(ImageAttribute::Saturation, saturation);
    }
}

impl<F: SinkFactory> VideoRenderer for VideoWindow<F> {
    type Sink = F::Sink;

    fn video_sink(&mut self) -> Option<Arc<F::Sink>> {
        if let Some(sink) = self.shared.sink() {
            return Some(sink);
        }

        let sink = match self.factory.make(&self.element_name) {
            Ok(sink) => sink,
            Err(err) => {
                warn!("Failed to create video sink `{}`: {err}", self.element_name);
                return None;
            }
        };

        self.attach(&sink);
        self.sink_changed.emit(());

        Some(sink)
    }

    fn is_ready(&self) -> bool {
        !self.window_handle().is_none()
    }

    fn connect_sink_changed<C: FnMut() + 'static>(&mut self, mut f: C) {
        self.sink_changed.connect(move |()| f());
    }

    fn connect_ready_changed<C: FnMut(bool) + 'static>(&mut self, f: C) {
        self.ready_changed.connect(f);
    }
}

impl<F: SinkFactory> SyncMessageFilter for VideoWindow<F> {
    fn process_sync_message(&self, message: &BusMessage) -> bool {
        self.shared.process_sync_message(message)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use quickcheck_macros::quickcheck;

    use super::*;
    use crate::fake::{FakeFactory, FakePipeline, ReentrantFactory};

    fn init() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn window() -> (VideoWindow<FakeFactory>, FakePipeline) {
        init();
        let (factory, pipeline) = FakeFactory::new();
        (VideoWindow::new(factory, Some("fakesink")), pipeline)
    }

    fn record<T: Copy + 'static>() -> (Rc<RefCell<Vec<T>>>, impl FnMut(T) + 'static) {
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&seen);
        (seen, move |value| sink.borrow_mut().push(value))
    }

    #[quickcheck]
    fn readiness_follows_last_handle(handles: Vec<u8>) -> bool {
        let (mut window, _pipeline) = window();
        let (seen, on_ready) = record::<bool>();
        window.connect_ready_changed(on_ready);

        let mut expected = Vec::new();
        let mut ready = false;
        for raw in &handles {
            let now_ready = *raw != 0;
            if now_ready != ready {
                expected.push(now_ready);
                ready = now_ready;
            }
            window.set_window_handle(WindowHandle::from_raw(*raw as usize));
        }

        window.is_ready() == handles.last().is_some_and(|raw| *raw != 0)
            && *seen.borrow() == expected
    }

    #[test]
    fn same_class_handle_changes_do_not_notify() {
        let (mut window, _pipeline) = window();
        let (seen, on_ready) = record::<bool>();
        window.connect_ready_changed(on_ready);

        assert!(!window.is_ready());
        window.set_window_handle(WindowHandle::from_raw(0x4200001));
        window.set_window_handle(WindowHandle::from_raw(0x4200002));
        window.set_window_handle(WindowHandle::from_raw(0x4200002));
        window.set_window_handle(WindowHandle::NONE);
        window.set_window_handle(WindowHandle::NONE);

        assert_eq!(*seen.borrow(), vec![true, false]);
        assert!(!window.is_ready());
    }

    #[quickcheck]
    fn display_rect_round_trips(x: i32, y: i32, width: i32, height: i32) -> bool {
        let (mut window, _pipeline) = window();
        let rect = Rect::new(x, y, width, height);
        window.set_display_rect(rect);
        window.display_rect() == rect
    }

    #[test]
    fn aspect_ratio_mode_round_trips_and_reaches_sink() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();

        for mode in [
            AspectRatioMode::Ignore,
            AspectRatioMode::Keep,
            AspectRatioMode::KeepByExpanding,
        ] {
            window.set_aspect_ratio_mode(mode);
            assert_eq!(window.aspect_ratio_mode(), mode);
            assert_eq!(sink.state().aspect_ratio_mode, Some(mode));
        }
    }

    #[test]
    fn native_size_arrives_after_dispatch() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        let (seen, on_size) = record::<Size>();
        window.connect_native_size_changed(on_size);
        assert_eq!(window.native_size(), Size::default());

        let handler = window.sync_handler();
        let message = BusMessage::native_size(sink.id(), 1280, 720);
        let consumed = std::thread::spawn(move || handler.process_sync_message(&message))
            .join()
            .unwrap();

        assert!(consumed);
        assert_eq!(window.native_size(), Size::default());
        assert!(window.wake_receiver().try_recv().is_ok());

        assert!(window.dispatch_pending());
        assert_eq!(window.native_size(), Size::new(1280, 720));
        assert_eq!(*seen.borrow(), vec![Size::new(1280, 720)]);
        assert!(!window.dispatch_pending());
    }

    #[test]
    fn foreign_messages_are_ignored() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        window.set_window_handle(WindowHandle::from_raw(7));
        let other = crate::fake::FakeSink::new(false);

        assert!(!window.process_sync_message(&BusMessage::native_size(other.id(), 640, 480)));
        assert!(!window.process_sync_message(&BusMessage::prepare_window_handle(other.id())));
        assert!(!window.process_sync_message(&BusMessage::new(None, MessageKind::Other)));
        assert!(!window.process_sync_message(&BusMessage::new(Some(sink.id()), MessageKind::Other)));
        assert!(!window.process_sync_message(&BusMessage::native_size(sink.id(), 0, 480)));

        assert!(!window.dispatch_pending());
        assert_eq!(window.native_size(), Size::default());
    }

    #[test]
    fn messages_before_a_sink_exists_are_ignored() {
        let (window, _pipeline) = window();
        let stranger = crate::fake::FakeSink::new(false);
        assert!(!window.process_sync_message(&BusMessage::native_size(stranger.id(), 640, 480)));
    }

    #[test]
    fn prepare_window_handle_needs_a_handle() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        let message = BusMessage::prepare_window_handle(sink.id());

        assert!(!window.process_sync_message(&message));

        window.set_window_handle(WindowHandle::from_raw(0x1234));
        sink.set_window_handle(WindowHandle::NONE);
        assert!(window.process_sync_message(&message));
        assert_eq!(sink.state().window_handle, WindowHandle::from_raw(0x1234));
    }

    #[test]
    fn probe_reports_first_frame_and_removes_itself() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        assert_eq!(sink.probe_count(), 1);

        assert_eq!(sink.push_buffer(FrameFormat::new(0, 0)), 1);
        assert_eq!(sink.probe_count(), 1);

        let anamorphic = FrameFormat::new(720, 576).with_pixel_aspect_ratio(16, 11);
        let streaming = {
            let sink = Arc::clone(&sink);
            std::thread::spawn(move || sink.push_buffer(anamorphic))
        };
        assert_eq!(streaming.join().unwrap(), 1);
        assert_eq!(sink.probe_count(), 0);
        assert_eq!(sink.push_buffer(anamorphic), 0);

        assert!(window.dispatch_pending());
        assert_eq!(window.native_size(), Size::new(1047, 576));
    }

    #[test]
    fn dropping_the_window_removes_the_probe() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        assert_eq!(sink.probe_count(), 1);

        drop(window);

        assert_eq!(sink.probe_count(), 0);
        assert_eq!(sink.push_buffer(FrameFormat::new(640, 480)), 0);
    }

    #[test]
    fn release_sink_removes_the_probe() {
        let (mut window, pipeline) = window();
        let sink = window.video_sink().unwrap();

        window.release_sink();

        assert_eq!(sink.probe_count(), 0);
        assert!(!window.process_sync_message(&BusMessage::native_size(sink.id(), 640, 480)));

        drop(sink);
        pipeline.lock().unwrap().clear();
        let (seen, mut on_sink) = record::<()>();
        window.connect_sink_changed(move || on_sink(()));
        assert!(window.video_sink().is_some());
        assert_eq!(seen.borrow().len(), 1);
    }

    #[test]
    fn missing_sink_degrades_to_no_ops() {
        init();
        let mut window = VideoWindow::new(FakeFactory::failing(), None);

        assert!(window.video_sink().is_none());

        window.set_window_handle(WindowHandle::from_raw(99));
        assert!(window.is_ready());
        window.set_display_rect(Rect::new(0, 0, 320, 240));
        window.set_full_screen(true);
        window.set_color_key(Color::new(1, 2, 3));
        window.set_brightness(50);
        window.repaint();

        assert_eq!(window.brightness(), 0);
        assert_eq!(window.color_key(), Color::new(1, 2, 3));
        assert!(window.is_full_screen());
        assert_eq!(window.native_size(), Size::default());
    }

    #[test]
    fn image_attributes_are_clamped() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();

        window.set_brightness(250);
        window.set_contrast(-250);
        window.set_hue(-30);
        window.set_saturation(42);

        assert_eq!(window.brightness(), 100);
        assert_eq!(window.contrast(), -100);
        assert_eq!(window.hue(), -30);
        assert_eq!(window.saturation(), 42);
        assert_eq!(sink.state().balance.get(&ImageAttribute::Brightness), Some(&100));
    }

    #[test]
    fn image_attributes_without_balance_are_no_ops() {
        init();
        let (factory, _pipeline) = FakeFactory::new();
        let mut window = VideoWindow::new(factory.without_balance(), None);
        let sink = window.video_sink().unwrap();

        window.set_hue(20);

        assert_eq!(window.hue(), 0);
        assert!(sink.state().balance.is_empty());
    }

    #[test]
    fn recreated_sink_gets_current_properties() {
        let (mut window, pipeline) = window();
        let (seen, mut on_sink) = record::<()>();
        window.connect_sink_changed(move || on_sink(()));

        let first = window.video_sink().unwrap();
        assert!(Arc::ptr_eq(&first, &window.video_sink().unwrap()));

        window.set_window_handle(WindowHandle::from_raw(0x77));
        window.set_display_rect(Rect::new(0, 0, 0, 0));
        window.set_aspect_ratio_mode(AspectRatioMode::Ignore);
        window.set_full_screen(true);
        window.set_color_key(Color::new(0x10, 0x20, 0x30));
        window.set_autopaint_color_key(false);

        drop(first);
        pipeline.lock().unwrap().clear();

        let second = window.video_sink().unwrap();
        let state = second.state();
        assert_eq!(state.window_handle, WindowHandle::from_raw(0x77));
        assert_eq!(state.render_rect, Some(Rect::new(0, 0, 0, 0)));
        assert_eq!(state.aspect_ratio_mode, Some(AspectRatioMode::Ignore));
        assert!(state.full_screen);
        assert_eq!(state.color_key, Some(Color::new(0x10, 0x20, 0x30)));
        assert_eq!(state.autopaint_color_key, Some(false));
        assert_eq!(seen.borrow().len(), 2);
    }

    #[test]
    fn full_screen_and_color_key_reach_live_sink() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        assert!(!sink.state().full_screen);

        window.set_full_screen(true);
        assert!(sink.state().full_screen);
        assert!(window.is_full_screen());

        window.set_color_key(Color::from_rgb(0x00ff_00ff));
        assert_eq!(sink.state().color_key, Some(Color::from_rgb(0x00ff_00ff)));
        assert_eq!(window.color_key(), Color::from_rgb(0x00ff_00ff));

        window.set_full_screen(false);
        assert!(!sink.state().full_screen);
    }

    #[test]
    fn sink_may_post_messages_while_receiving_the_handle() {
        init();
        let mut window = VideoWindow::new(ReentrantFactory::default(), Some("fakesink"));
        let sink = window.video_sink().unwrap();
        sink.connect(window.sync_handler());

        window.set_window_handle(WindowHandle::from_raw(5));
        assert_eq!(sink.handles(), [WindowHandle::from_raw(5)]);
        assert!(window.dispatch_pending());
        assert_eq!(window.native_size(), Size::new(640, 360));

        assert!(window.process_sync_message(&BusMessage::prepare_window_handle(sink.id())));
        assert_eq!(sink.handles(), [WindowHandle::from_raw(5); 2]);

        window.set_window_handle(WindowHandle::NONE);
        assert_eq!(sink.handles().last(), Some(&WindowHandle::NONE));
        assert!(!window.process_sync_message(&BusMessage::prepare_window_handle(sink.id())));
    }

    #[test]
    fn sink_ends_with_last_handle_under_concurrent_requests() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        let handler = window.sync_handler();
        let message = BusMessage::prepare_window_handle(sink.id());

        let streaming = std::thread::spawn(move || {
            for _ in 0..1000 {
                handler.process_sync_message(&message);
            }
        });
        for raw in 1..=1000 {
            window.set_window_handle(WindowHandle::from_raw(raw));
        }
        streaming.join().unwrap();

        assert_eq!(sink.state().window_handle, WindowHandle::from_raw(1000));
    }

    #[test]
    fn repaint_exposes_only_when_ready() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();

        window.repaint();
        assert_eq!(sink.state().exposes, 0);

        window.set_window_handle(WindowHandle::from_raw(3));
        window.repaint();
        assert_eq!(sink.state().exposes, 1);
    }

    #[test]
    fn settings_survive_serialization() {
        let (mut window, _pipeline) = window();
        let _sink = window.video_sink().unwrap();
        window.set_display_rect(Rect::new(10, 10, 400, 300));
        window.set_aspect_ratio_mode(AspectRatioMode::KeepByExpanding);
        window.set_color_key(Color::from_rgb(0x0a0b0c));
        window.set_contrast(12);

        let json = serde_json::to_string(&window.settings()).unwrap();
        let settings: Settings = serde_json::from_str(&json).unwrap();

        let (mut restored, _other) = self::window();
        let _restored_sink = restored.video_sink().unwrap();
        restored.apply_settings(&settings);

        assert_eq!(restored.settings(), window.settings());
        assert_eq!(restored.contrast(), 12);
    }

    #[test]
    fn wake_notifier_runs_on_post() {
        let (mut window, _pipeline) = window();
        let sink = window.video_sink().unwrap();
        let (tx, rx) = crossbeam_channel::unbounded();
        window.set_wake_notifier(move || {
            let _ = tx.send(());
        });

        assert!(window.process_sync_message(&BusMessage::native_size(sink.id(), 320, 200)));

        assert!(rx.try_recv().is_ok());
        assert!(window.dispatch_pending());
        assert_eq!(window.native_size(), Size::new(320, 200));
    }

    #[test]
    fn element_name_defaults_from_environment() {
        init();
        let (factory, _pipeline) = FakeFactory::new();
        let window = VideoWindow::new(factory, Some("ximagesink"));
        assert_eq!(window.element_name(), "ximagesink");
        assert!(!default_element_name().is_empty());
    }
}
