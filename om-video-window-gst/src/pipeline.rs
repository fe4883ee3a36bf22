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

use anyhow::{anyhow, bail, Result};
use gst::prelude::*;
use log::debug;

use om_video_window::prelude::*;

use crate::bus::bus_message;
use crate::sink::GstVideoSink;
use crate::GstVideoWindow;

/// A `playbin3` rendering into a [`GstVideoWindow`].
pub struct Pipeline {
    inner: gst::Pipeline,
    playbin: gst::Element,
    sink: Arc<GstVideoSink>,
}

impl Pipeline {
    pub fn new(window: &mut GstVideoWindow) -> Result<Self> {
        let pipeline = gst::Pipeline::new();

        let playbin = gst::ElementFactory::make("playbin3").build()?;

        pipeline.add(&playbin)?;

        let Some(sink) = window.video_sink() else {
            bail!("No `{}` video sink available", window.element_name());
        };

        playbin.set_property("video-sink", sink.element());

        let bus = pipeline.bus().ok_or(anyhow!("Pipeline without bus"))?;

        let handler = window.sync_handler();
        bus.set_sync_handler(move |_, msg| {
            if handler.process_sync_message(&bus_message(msg)) {
                gst::BusSyncReply::Drop
            } else {
                gst::BusSyncReply::Pass
            }
        });

        pipeline.set_state(gst::State::Ready)?;

        Ok(Self {
            inner: pipeline,
            playbin,
            sink,
        })
    }

    pub fn bus(&self) -> Option<gst::Bus> {
        self.inner.bus()
    }

    #[inline]
    pub fn sink(&self) -> &GstVideoSink {
        &self.sink
    }

    pub fn set_playback_uri(&self, uri: &str) -> Result<()> {
        self.inner.set_state(gst::State::Ready)?;
        self.playbin.set_property("uri", uri);

        Ok(())
    }

    pub fn pause(&self) -> Result<()> {
        self.inner.set_state(gst::State::Paused)?;

        Ok(())
    }

    pub fn play_or_resume(&self) -> Result<()> {
        self.inner.set_state(gst::State::Playing)?;

        Ok(())
    }

    pub fn stop(&self) -> Result<()> {
        self.inner.set_state(gst::State::Null)?;
        self.playbin.set_property("uri", "");

        Ok(())
    }

    /// Detaches `window` from the sink before the pipeline lets go of it.
    pub fn shutdown(self, window: &mut GstVideoWindow) -> Result<()> {
        window.release_sink();
        self.inner.set_state(gst::State::Null)?;

        Ok(())
    }
}

impl Drop for Pipeline {
    fn drop(&mut self) {
        if let Some(bus) = self.inner.bus() {
            bus.unset_sync_handler();
        }

        if let Err(err) = self.inner.set_state(gst::State::Null) {
            debug!("Failed to stop pipeline: {err}");
        }
    }
}
