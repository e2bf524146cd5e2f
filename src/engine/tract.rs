//! ONNX feature extractor running on `tract`.

use std::path::Path;

use image::imageops::{self, FilterType};
use tract_onnx::prelude::*;

use crate::camera::Frame;
use crate::config::{InputLayout, ModelConfig, Normalization};

use super::embedder::{Embedder, Embedding, EngineError};

type Plan = TypedRunnableModel<TypedModel>;

/// Embedder backed by an optimised `tract` plan.
///
/// The model is expected to take a single `[1, H, W, 3]` (NHWC) or
/// `[1, 3, H, W]` (NCHW) float tensor and produce the embedding as its first
/// output; any output shape is flattened.
pub struct TractEmbedder {
    plan: Plan,
    width: u32,
    height: u32,
    layout: InputLayout,
    normalization: Normalization,
}

impl TractEmbedder {
    /// Load and optimise the model at `path`.
    ///
    /// # Errors
    ///
    /// - [`EngineError::ModelNotFound`]: `path` does not exist.
    /// - [`EngineError::ModelLoad`]: the file is not a usable ONNX model
    ///   for the configured input geometry.
    pub fn load(path: impl AsRef<Path>, config: &ModelConfig) -> Result<Self, EngineError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(EngineError::ModelNotFound(path.display().to_string()));
        }

        let (w, h) = (config.input_width as usize, config.input_height as usize);
        let shape = match config.layout {
            InputLayout::Nhwc => [1, h, w, 3],
            InputLayout::Nchw => [1, 3, h, w],
        };

        log::info!("engine: loading {} ({:?} input {:?})", path.display(), config.layout, shape);
        let plan = tract_onnx::onnx()
            .model_for_path(path)
            .and_then(|model| model.with_input_fact(0, f32::fact(shape).into()))
            .and_then(|model| model.into_optimized())
            .and_then(|model| model.into_runnable())
            .map_err(|e| EngineError::ModelLoad(format!("{}: {e:#}", path.display())))?;
        log::info!("engine: model ready");

        Ok(Self {
            plan,
            width: config.input_width,
            height: config.input_height,
            layout: config.layout,
            normalization: config.normalization,
        })
    }

    fn input_tensor(&self, frame: &Frame) -> Tensor {
        let resized;
        let image = if frame.dimensions() == (self.width, self.height) {
            frame
        } else {
            resized = imageops::resize(frame, self.width, self.height, FilterType::Triangle);
            &resized
        };

        let scale = |v: u8| match self.normalization {
            Normalization::Unit => v as f32 / 255.0,
            Normalization::Symmetric => v as f32 / 127.5 - 1.0,
        };
        let (w, h) = (self.width as usize, self.height as usize);

        match self.layout {
            InputLayout::Nhwc => tract_ndarray::Array4::from_shape_fn((1, h, w, 3), |(_, y, x, c)| {
                scale(image.get_pixel(x as u32, y as u32)[c])
            })
            .into(),
            InputLayout::Nchw => tract_ndarray::Array4::from_shape_fn((1, 3, h, w), |(_, c, y, x)| {
                scale(image.get_pixel(x as u32, y as u32)[c])
            })
            .into(),
        }
    }
}

impl Embedder for TractEmbedder {
    fn embed(&self, frame: &Frame) -> Result<Embedding, EngineError> {
        if frame.width() == 0 || frame.height() == 0 {
            return Err(EngineError::FrameGeometry {
                width: frame.width(),
                height: frame.height(),
            });
        }

        let outputs = self
            .plan
            .run(tvec!(self.input_tensor(frame).into()))
            .map_err(|e| EngineError::Inference(format!("{e:#}")))?;
        let first = outputs
            .first()
            .ok_or_else(|| EngineError::Inference("model produced no outputs".into()))?;
        let view = first
            .to_array_view::<f32>()
            .map_err(|e| EngineError::Inference(format!("{e:#}")))?;

        Ok(view.iter().copied().collect())
    }
}
