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

use anyhow::{anyhow, bail, Result};
use log::{debug, info};

use om_video_window::prelude::*;
use om_video_window_gst::{GstSinkFactory, GstVideoWindow, Pipeline};

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_module("om_video_window", log::LevelFilter::Debug)
        .filter_module("om_play", log::LevelFilter::Debug)
        .init();

    let Some(uri) = std::env::args().nth(1) else {
        bail!("Usage: om-play <uri>");
    };

    om_video_window_gst::init()?;

    let mut window = GstVideoWindow::new(GstSinkFactory, None);
    window.connect_sink_changed(|| debug!("Video sink changed"));
    window.connect_native_size_changed(|size| {
        info!("Native video size is {}x{}", size.width, size.height)
    });

    let pipeline = Pipeline::new(&mut window)?;
    pipeline.set_playback_uri(&uri)?;
    pipeline.play_or_resume()?;

    let bus = pipeline.bus().ok_or(anyhow!("Pipeline without bus"))?;

    loop {
        window.dispatch_pending();

        let Some(msg) = bus.timed_pop(gst::ClockTime::from_mseconds(100)) else {
            continue;
        };

        match msg.view() {
            gst::MessageView::Eos(..) => {
                debug!("Reached EOS");
                break;
            }
            gst::MessageView::Error(err) => {
                pipeline.shutdown(&mut window)?;
                bail!("{} ({:?})", err.error(), err.debug());
            }
            _ => (),
        }
    }

    pipeline.shutdown(&mut window)?;

    Ok(())
}
