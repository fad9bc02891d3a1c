use std::path::Path;

use anyhow::{bail, Context, Ok};
use opencv::{
    core::{Mat, Scalar, Size, Vector, CV_32F},
    dnn::{self, Net},
    prelude::*,
};
use sorter::BoundingBox;

use super::Detector;

pub const DEFAULT_INPUT_SIZE: i32 = 640;

/// YOLOv8 detector exported to ONNX, run through the OpenCV DNN module.
///
/// The network output is `[1, 4 + classes, anchors]`: one column per anchor
/// holding the box center and size in input pixels followed by the class
/// scores.
pub struct YoloDetector {
    net: Net,
    input_size: i32,
}

impl YoloDetector {
    pub fn load(model: &Path, input_size: i32) -> anyhow::Result<Self> {
        let path = model.to_str().context("Model path is not valid UTF-8")?;
        let net = dnn::read_net_from_onnx(path).with_context(|| format!("Failed to load model {path}"))?;
        log::info!("Loaded detector model {path}");

        Ok(Self { net, input_size })
    }

    fn decode(&self, output: &Mat, frame: &Mat, min_confidence: f32) -> anyhow::Result<Vec<BoundingBox>> {
        let dims = output.mat_size().to_vec();
        let &[_, rows, _] = &dims[..] else {
            bail!("Unexpected detector output shape {dims:?}");
        };
        if rows <= 4 {
            bail!("Detector output has no class scores ({rows} rows)");
        }

        let detections = output.reshape(1, rows)?;
        let x_scale = frame.cols() as f32 / self.input_size as f32;
        let y_scale = frame.rows() as f32 / self.input_size as f32;

        let mut boxes = Vec::new();
        for anchor in 0..detections.cols() {
            let mut best = (0, 0.0f32);
            for class_id in 0..rows - 4 {
                let score = *detections.at_2d::<f32>(4 + class_id, anchor)?;
                if score > best.1 {
                    best = (class_id, score);
                }
            }
            let (class_id, confidence) = best;
            if confidence < min_confidence {
                continue;
            }

            let cx = *detections.at_2d::<f32>(0, anchor)? * x_scale;
            let cy = *detections.at_2d::<f32>(1, anchor)? * y_scale;
            let w = *detections.at_2d::<f32>(2, anchor)? * x_scale;
            let h = *detections.at_2d::<f32>(3, anchor)? * y_scale;

            boxes.push(BoundingBox::new(
                (cx - w / 2.0).round() as i32,
                (cy - h / 2.0).round() as i32,
                (cx + w / 2.0).round() as i32,
                (cy + h / 2.0).round() as i32,
                confidence,
                class_id,
            ));
        }

        Ok(boxes)
    }
}

impl Detector for YoloDetector {
    fn detect(&mut self, frame: &Mat, min_confidence: f32) -> anyhow::Result<Vec<BoundingBox>> {
        let blob = dnn::blob_from_image(
            frame,
            1.0 / 255.0,
            Size::new(self.input_size, self.input_size),
            Scalar::default(),
            true,
            false,
            CV_32F,
        )?;
        self.net.set_input(&blob, "", 1.0, Scalar::default())?;

        let mut outputs = Vector::<Mat>::new();
        let names = self.net.get_unconnected_out_layers_names()?;
        self.net.forward(&mut outputs, &names)?;

        let output = outputs.get(0).context("Detector produced no output")?;
        let boxes = self.decode(&output, frame, min_confidence)?;
        log::debug!("Detector returned {} candidates", boxes.len());

        Ok(boxes)
    }
}
