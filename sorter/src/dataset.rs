//! Naming and labeling of captured training samples (YOLO layout).

use std::path::{Path, PathBuf};

use crate::geometry::{BoundingBox, FrameSize};

/// Every n-th sample goes to the validation split.
const VAL_EVERY: usize = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Split {
    Train,
    Val,
}

impl Split {
    /// Split of the zero-based `index`-th sample of a capture run.
    pub fn for_index(index: usize) -> Self {
        if (index + 1) % VAL_EVERY == 0 {
            Split::Val
        } else {
            Split::Train
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Split::Train => "train",
            Split::Val => "val",
        }
    }
}

/// Image and label paths of one sample below `root`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SamplePaths {
    pub image: PathBuf,
    pub label: PathBuf,
}

impl SamplePaths {
    pub fn new(root: &Path, split: Split, stem: &str) -> Self {
        Self {
            image: root.join("images").join(split.as_str()).join(format!("{stem}.jpg")),
            label: root.join("labels").join(split.as_str()).join(format!("{stem}.txt")),
        }
    }
}

pub fn sample_stem(class_name: &str, timestamp: u64, index: usize) -> String {
    format!("{class_name}_{timestamp}_{index}")
}

/// `class xc yc w h` with coordinates normalised to the frame.
pub fn yolo_label(bbox: &BoundingBox, frame: FrameSize, class_id: usize) -> String {
    let fw = frame.width as f64;
    let fh = frame.height as f64;
    let center = (bbox.min + bbox.max).cast::<f64>() / 2.0;

    format!(
        "{class_id} {:.6} {:.6} {:.6} {:.6}\n",
        center.x / fw,
        center.y / fh,
        bbox.width() as f64 / fw,
        bbox.height() as f64 / fh
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_third_sample_is_validation() {
        let splits: Vec<_> = (0..6).map(Split::for_index).collect();
        assert_eq!(
            splits,
            [Split::Train, Split::Train, Split::Val, Split::Train, Split::Train, Split::Val]
        );
    }

    #[test]
    fn label_is_normalised_to_frame() {
        let bbox = BoundingBox::new(100, 50, 140, 190, 0.9, 0);
        let label = yolo_label(&bbox, FrameSize::new(320, 240), 2);
        assert_eq!(label, "2 0.375000 0.500000 0.125000 0.583333\n");
    }

    #[test]
    fn paths_follow_split_layout() {
        let paths = SamplePaths::new(Path::new("data"), Split::Val, &sample_stem("aa", 17, 2));
        assert_eq!(paths.image, Path::new("data/images/val/aa_17_2.jpg"));
        assert_eq!(paths.label, Path::new("data/labels/val/aa_17_2.txt"));
    }
}
