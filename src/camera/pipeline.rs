//! GStreamer frame source.

use gstreamer as gst;
use gstreamer::prelude::*;
use gstreamer_app as gst_app;
use gstreamer_video as gst_video;

use crate::config::CameraConfig;
use crate::interrupt::Interrupt;

use super::{
    frame_from_rgb, pipeline_description, CameraError, Frame, FrameHandler, FrameSource,
    OverlaySink, StopReason,
};

/// How long one pull waits for a sample before the bus and the interrupt
/// are checked again.
const PULL_TIMEOUT_MS: u64 = 100;

// ---------------------------------------------------------------------------
// SvgOverlay
// ---------------------------------------------------------------------------

/// The `rsvgoverlay` element of the display branch.
pub struct SvgOverlay(gst::Element);

impl OverlaySink for SvgOverlay {
    fn set_overlay(&mut self, svg: &str) {
        self.0.set_property("data", svg);
    }
}

// ---------------------------------------------------------------------------
// GstFrameSource
// ---------------------------------------------------------------------------

pub struct GstFrameSource {
    pipeline: gst::Pipeline,
    appsink: gst_app::AppSink,
    overlay: Option<SvgOverlay>,
}

impl GstFrameSource {
    /// Initialise GStreamer and build (but do not start) the pipeline.
    pub fn new(config: &CameraConfig) -> Result<Self, CameraError> {
        gst::init().map_err(|e| CameraError::Pipeline(e.to_string()))?;

        let description = pipeline_description(config);
        log::info!("camera: {description}");

        let pipeline = gst::parse::launch(&description)
            .map_err(|e| CameraError::Pipeline(e.to_string()))?
            .downcast::<gst::Pipeline>()
            .map_err(|_| CameraError::Pipeline("description is not a pipeline".into()))?;
        let appsink = pipeline
            .by_name("appsink")
            .and_then(|e| e.downcast::<gst_app::AppSink>().ok())
            .ok_or_else(|| CameraError::Pipeline("no appsink named `appsink`".into()))?;
        let overlay = pipeline.by_name("overlay").map(SvgOverlay);

        Ok(Self {
            pipeline,
            appsink,
            overlay,
        })
    }

    /// Copy a sample into a [`Frame`], using the geometry negotiated on its
    /// caps and the plane layout recorded on its buffer.
    fn frame(sample: &gst::Sample) -> Result<Frame, CameraError> {
        let buffer = sample
            .buffer()
            .ok_or_else(|| CameraError::Pipeline("sample without buffer".into()))?;
        let caps = sample
            .caps()
            .ok_or_else(|| CameraError::Pipeline("sample without caps".into()))?;
        let info = gst_video::VideoInfo::from_caps(caps)
            .map_err(|e| CameraError::Pipeline(format!("unusable caps {caps}: {e}")))?;
        if info.format() != gst_video::VideoFormat::Rgb {
            return Err(CameraError::Pipeline(format!(
                "expected RGB frames, got {:?}",
                info.format()
            )));
        }

        let video = gst_video::VideoFrameRef::from_buffer_ref_readable(buffer, &info)
            .map_err(|e| CameraError::Pipeline(e.to_string()))?;
        let stride = usize::try_from(video.plane_stride()[0])
            .map_err(|_| CameraError::Pipeline("negative row stride".into()))?;
        let data = video
            .plane_data(0)
            .map_err(|e| CameraError::Pipeline(e.to_string()))?;
        frame_from_rgb(data, video.width(), video.height(), stride)
    }

    /// Handle every pending bus message.  `Some` ends the run.
    fn drain_bus(bus: &gst::Bus) -> Result<Option<StopReason>, CameraError> {
        while let Some(msg) = bus.pop() {
            match msg.view() {
                gst::MessageView::Eos(..) => {
                    log::info!("camera: end of stream");
                    return Ok(Some(StopReason::EndOfStream));
                }
                gst::MessageView::Warning(w) => {
                    log::warn!("camera: {} ({:?})", w.error(), w.debug());
                }
                gst::MessageView::Error(err) => {
                    return Err(CameraError::Stream {
                        message: err.error().to_string(),
                        debug: err.debug().map(|d| d.to_string()),
                    });
                }
                _ => {}
            }
        }
        Ok(None)
    }

    fn pump(
        &mut self,
        handler: &mut dyn FrameHandler,
        interrupt: &Interrupt,
    ) -> Result<StopReason, CameraError> {
        let bus = self
            .pipeline
            .bus()
            .ok_or_else(|| CameraError::Pipeline("pipeline has no bus".into()))?;
        let timeout = gst::ClockTime::from_mseconds(PULL_TIMEOUT_MS);

        loop {
            if interrupt.is_triggered() {
                log::info!("camera: interrupted");
                return Ok(StopReason::Interrupted);
            }
            if let Some(reason) = Self::drain_bus(&bus)? {
                return Ok(reason);
            }

            let Some(sample) = self.appsink.try_pull_sample(timeout) else {
                continue;
            };
            let frame = Self::frame(&sample)?;
            let overlay = self.overlay.as_mut().map(|o| o as &mut dyn OverlaySink);
            if handler.on_frame(&frame, overlay)? {
                return Ok(StopReason::Handler);
            }
        }
    }
}

impl FrameSource for GstFrameSource {
    fn run(
        &mut self,
        handler: &mut dyn FrameHandler,
        interrupt: &Interrupt,
    ) -> Result<StopReason, CameraError> {
        // A failed start can leave elements in READY or PAUSED with the
        // device open, so the NULL transition runs on every path.
        let result = self
            .pipeline
            .set_state(gst::State::Playing)
            .map_err(|e| CameraError::Pipeline(e.to_string()))
            .and_then(|_| self.pump(handler, interrupt));

        if let Err(e) = self.pipeline.set_state(gst::State::Null) {
            log::warn!("camera: failed to stop pipeline: {e}");
        }
        result
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    struct NeverCalled;

    impl FrameHandler for NeverCalled {
        fn on_frame(
            &mut self,
            _frame: &Frame,
            _overlay: Option<&mut dyn OverlaySink>,
        ) -> Result<bool, crate::engine::EngineError> {
            panic!("no frame expected");
        }
    }

    /// RGB sample whose buffer carries an explicit row stride.
    fn strided_sample(width: u32, height: u32, stride: usize, data: Vec<u8>) -> gst::Sample {
        let info = gst_video::VideoInfo::builder(gst_video::VideoFormat::Rgb, width, height)
            .build()
            .expect("video info");
        let caps = info.to_caps().expect("caps");

        let mut buffer = gst::Buffer::from_mut_slice(data);
        gst_video::VideoMeta::add_full(
            buffer.get_mut().expect("unique buffer"),
            gst_video::VideoFrameFlags::empty(),
            gst_video::VideoFormat::Rgb,
            width,
            height,
            &[0],
            &[stride as i32],
        )
        .expect("video meta");

        gst::Sample::builder().buffer(&buffer).caps(&caps).build()
    }

    #[test]
    fn frame_follows_buffer_stride() {
        gst::init().expect("gst init");
        // 2x2 RGB, 12-byte rows: wider than any 4-byte rounding of 6.
        let mut data = vec![0u8; 24];
        data[..6].copy_from_slice(&[10, 11, 12, 20, 21, 22]);
        data[12..18].copy_from_slice(&[30, 31, 32, 40, 41, 42]);

        let frame = GstFrameSource::frame(&strided_sample(2, 2, 12, data)).unwrap();
        assert_eq!(frame.dimensions(), (2, 2));
        assert_eq!(frame.get_pixel(1, 0).0, [20, 21, 22]);
        assert_eq!(frame.get_pixel(0, 1).0, [30, 31, 32]);
        assert_eq!(frame.get_pixel(1, 1).0, [40, 41, 42]);
    }

    #[test]
    fn failed_start_still_returns_to_null() {
        let config = CameraConfig {
            source_element: "filesrc location=/nonexistent/teachable-machine/video".into(),
            ..CameraConfig::default()
        };
        let Ok(mut source) = GstFrameSource::new(&config) else {
            // Base plugins are missing on this host.
            return;
        };

        let err = source.run(&mut NeverCalled, &Interrupt::new()).unwrap_err();
        assert!(matches!(err, CameraError::Pipeline(_) | CameraError::Stream { .. }));

        let (_, current, pending) = source.pipeline.state(gst::ClockTime::ZERO);
        assert_eq!(current, gst::State::Null);
        assert_eq!(pending, gst::State::VoidPending);
    }
}
