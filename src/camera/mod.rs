//! Media pipeline boundary.
//!
//! # Architecture
//!
//! ```text
//!   v4l2src ─▶ caps ─▶ leaky queue ─▶ tee ─┬─▶ queue ─▶ convert/scale ─▶ RGB ─▶ appsink
//!                                           │                                    │
//!                                           │                        FrameSource::run pulls
//!                                           │                                    ▼
//!                                           │                       FrameHandler::on_frame
//!                                           │                                    │ status SVG
//!                                           └─▶ queue ─▶ rsvgoverlay ◀───────────┘
//!                                                         (display only)
//! ```
//!
//! The source pulls samples on the calling thread and hands each one to the
//! handler synchronously, so a handler is never re-entered.  The handler's
//! `true` return ends the run; a handler error aborts it.
//!
//! The GStreamer implementation is behind the `camera` cargo feature.
//! Without it [`open`] fails with [`CameraError::Unsupported`].

#[cfg(feature = "camera")]
pub mod pipeline;

use thiserror::Error;

use crate::config::CameraConfig;
use crate::engine::EngineError;
use crate::interrupt::Interrupt;

/// One RGB frame at the pipeline's sink geometry.
pub type Frame = image::RgbImage;

/// Single-buffer leaky queue: the classifier always sees the freshest frame.
const LEAKY_QUEUE: &str = "queue max-size-buffers=1 leaky=downstream";

const APP_SINK: &str = "appsink name=appsink sync=false max-buffers=1 drop=true";

// ---------------------------------------------------------------------------
// CameraError
// ---------------------------------------------------------------------------

#[derive(Debug, Error)]
pub enum CameraError {
    #[error("camera support is not compiled in (enable the `camera` feature)")]
    Unsupported,

    /// The pipeline could not be built or started.
    #[error("pipeline setup failed: {0}")]
    Pipeline(String),

    /// The pipeline reported an error while running.
    #[error("pipeline error: {message}")]
    Stream {
        message: String,
        debug: Option<String>,
    },

    /// A delivered plane is too small for its negotiated geometry.
    #[error("frame buffer of {actual} bytes, expected at least {expected}")]
    FrameSize { expected: usize, actual: usize },

    /// The frame handler failed; the loop does not retry.
    #[error("frame handler failed: {0}")]
    Handler(#[from] EngineError),
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

/// Receives the status overlay drawn over the preview.
pub trait OverlaySink {
    fn set_overlay(&mut self, svg: &str);
}

/// Per-frame callback driven by a [`FrameSource`].
pub trait FrameHandler {
    /// Process one frame.  Returns `true` to end the run.
    fn on_frame(
        &mut self,
        frame: &Frame,
        overlay: Option<&mut dyn OverlaySink>,
    ) -> Result<bool, EngineError>;
}

/// Why [`FrameSource::run`] returned without an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The handler asked to stop.
    Handler,
    EndOfStream,
    /// The [`Interrupt`] fired.
    Interrupted,
}

/// Delivers frames until the handler stops, the stream ends, or the
/// interrupt fires.
pub trait FrameSource {
    /// # Errors
    ///
    /// Pipeline faults and handler errors end the run with an error.
    fn run(
        &mut self,
        handler: &mut dyn FrameHandler,
        interrupt: &Interrupt,
    ) -> Result<StopReason, CameraError>;
}

// ---------------------------------------------------------------------------
// Pipeline description
// ---------------------------------------------------------------------------

/// `gst-launch` style description of the capture pipeline.
///
/// # Example
///
/// ```rust
/// use teachable_machine::camera::pipeline_description;
/// use teachable_machine::config::CameraConfig;
///
/// let text = pipeline_description(&CameraConfig::default());
/// assert!(text.starts_with("v4l2src ! video/x-raw,format=RGB,width=640,height=480"));
/// assert!(text.contains("appsink name=appsink"));
/// ```
pub fn pipeline_description(config: &CameraConfig) -> String {
    let src_caps = format!(
        "video/x-raw,format=RGB,width={},height={},framerate={}",
        config.source_width, config.source_height, config.source_rate
    );
    let sink_caps = format!(
        "video/x-raw,format=RGB,width={},height={}",
        config.sink_width, config.sink_height
    );

    let mut text = format!(
        "{src} ! {src_caps} ! {LEAKY_QUEUE} ! tee name=t \
         t. ! {LEAKY_QUEUE} ! videoconvert ! videoscale ! {sink_caps} ! {APP_SINK}",
        src = config.source_element,
    );
    if config.display {
        text.push_str(&format!(
            " t. ! {LEAKY_QUEUE} ! videoconvert ! rsvgoverlay name=overlay ! videoconvert ! autovideosink"
        ));
    }
    text
}

/// Copy an RGB plane whose rows are `stride` bytes apart into a [`Frame`].
///
/// `stride` comes from the buffer's video layout; any bytes past
/// `width * 3` in a row are padding and are dropped.
pub fn frame_from_rgb(
    data: &[u8],
    width: u32,
    height: u32,
    stride: usize,
) -> Result<Frame, CameraError> {
    let row = width as usize * 3;
    let expected = stride * height.saturating_sub(1) as usize + row;
    if height == 0 || stride < row || data.len() < expected {
        return Err(CameraError::FrameSize {
            expected,
            actual: data.len(),
        });
    }

    let pixels = if stride == row {
        data[..row * height as usize].to_vec()
    } else {
        data.chunks(stride)
            .take(height as usize)
            .flat_map(|line| &line[..row])
            .copied()
            .collect()
    };
    Frame::from_raw(width, height, pixels).ok_or(CameraError::FrameSize {
        expected,
        actual: data.len(),
    })
}

// ---------------------------------------------------------------------------
// open
// ---------------------------------------------------------------------------

#[cfg(feature = "camera")]
pub type CameraSource = pipeline::GstFrameSource;

/// Placeholder source when the `camera` feature is off.  It cannot be
/// constructed.
#[cfg(not(feature = "camera"))]
pub enum CameraSource {}

#[cfg(not(feature = "camera"))]
impl FrameSource for CameraSource {
    fn run(
        &mut self,
        _handler: &mut dyn FrameHandler,
        _interrupt: &Interrupt,
    ) -> Result<StopReason, CameraError> {
        match *self {}
    }
}

/// Whether this build can capture frames at all.
pub const SUPPORTED: bool = cfg!(feature = "camera");

/// Fail fast, before any hardware is touched, when the `camera` feature is
/// off.
pub fn ensure_supported() -> Result<(), CameraError> {
    if SUPPORTED {
        Ok(())
    } else {
        Err(CameraError::Unsupported)
    }
}

/// Build the capture pipeline described by `config`.
pub fn open(config: &CameraConfig) -> Result<CameraSource, CameraError> {
    #[cfg(feature = "camera")]
    {
        pipeline::GstFrameSource::new(config)
    }
    #[cfg(not(feature = "camera"))]
    {
        let _ = config;
        Err(CameraError::Unsupported)
    }
}

// ---------------------------------------------------------------------------
// Test helpers
// ---------------------------------------------------------------------------

/// A small frame filled with one colour.
#[cfg(test)]
pub fn solid_frame(rgb: [u8; 3]) -> Frame {
    Frame::from_pixel(8, 6, image::Rgb(rgb))
}

/// Overlay double that records every SVG it receives.
#[cfg(test)]
#[derive(Debug, Default)]
pub struct RecordingOverlay {
    pub documents: Vec<String>,
}

#[cfg(test)]
impl OverlaySink for RecordingOverlay {
    fn set_overlay(&mut self, svg: &str) {
        self.documents.push(svg.to_string());
    }
}

/// Source double that replays a fixed list of frames.
#[cfg(test)]
pub struct ScriptedSource {
    frames: std::collections::VecDeque<Frame>,
    pub overlay: RecordingOverlay,
}

#[cfg(test)]
impl ScriptedSource {
    pub fn new(frames: impl IntoIterator<Item = Frame>) -> Self {
        Self {
            frames: frames.into_iter().collect(),
            overlay: RecordingOverlay::default(),
        }
    }
}

#[cfg(test)]
impl FrameSource for ScriptedSource {
    fn run(
        &mut self,
        handler: &mut dyn FrameHandler,
        interrupt: &Interrupt,
    ) -> Result<StopReason, CameraError> {
        while let Some(frame) = self.frames.pop_front() {
            if interrupt.is_triggered() {
                return Ok(StopReason::Interrupted);
            }
            if handler.on_frame(&frame, Some(&mut self.overlay))? {
                return Ok(StopReason::Handler);
            }
        }
        Ok(StopReason::EndOfStream)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
