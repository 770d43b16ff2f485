//! Candidate filtering and target selection.

use image::RgbImage;
use log::debug;
use ndarray::Array2;
use shared::{ImageSize, OffsetVector};

use crate::config::LocatorConfig;
use crate::contours::find_outer_contours;
use crate::hsv::hsv_threshold;
use crate::min_rect::{min_area_rect, RotatedRect};
use crate::morphology::{dilate, erode};
use crate::overlay;

/// Why a candidate region was not accepted as the target
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Rejection {
    /// Contour area outside `[min_area, max_area]`
    AreaOutOfRange,
    /// Bounding rectangle side ratio outside the accepted band
    AspectRatio,
}

/// One outer region found in the cleaned mask
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Area enclosed by the region boundary (pixels²)
    pub area: f64,
    /// Minimum-area bounding rectangle of the boundary
    pub rect: RotatedRect,
    /// `None` when the candidate passed every filter
    pub rejection: Option<Rejection>,
}

impl Candidate {
    pub fn is_accepted(&self) -> bool {
        self.rejection.is_none()
    }
}

/// The selected target
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    /// Offset of the target center from frame center, plus rectangle tilt
    pub vector: OffsetVector,
    /// Bounding rectangle of the target in frame coordinates
    pub rect: RotatedRect,
    /// Contour area of the target (pixels²)
    pub area: f64,
}

/// True when `width / height` lies strictly inside `(min, max)` or its
/// reciprocal band `(1/max, 1/min)`.
///
/// A zero height never passes.
pub fn aspect_ratio_ok(width: f64, height: f64, min_ratio: f64, max_ratio: f64) -> bool {
    if height <= 0.0 {
        return false;
    }
    let ratio = width / height;
    (min_ratio < ratio && ratio < max_ratio) || (1.0 / max_ratio < ratio && ratio < 1.0 / min_ratio)
}

/// Locates the retro-reflective target in RGB frames.
#[derive(Debug, Clone, Default)]
pub struct TargetLocator {
    config: LocatorConfig,
}

impl TargetLocator {
    pub fn new(config: LocatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &LocatorConfig {
        &self.config
    }

    /// Threshold the frame and clean the mask (erode, then dilate).
    pub fn binarize(&self, frame: &RgbImage) -> Array2<bool> {
        let mask = hsv_threshold(frame, &self.config.band);
        let eroded = erode(mask.view(), self.config.erode_kernel);
        dilate(eroded.view(), self.config.dilate_kernel)
    }

    /// Every outer region of the cleaned mask with its filter verdict, in
    /// raster order of each region's first pixel.
    pub fn candidates(&self, frame: &RgbImage) -> Vec<Candidate> {
        let mask = self.binarize(frame);
        let config = &self.config;

        find_outer_contours(mask.view())
            .into_iter()
            .filter_map(|contour| {
                let area = contour.area();
                let rect = min_area_rect(&contour.points)?;
                let rejection = if area < config.min_area || area > config.max_area {
                    Some(Rejection::AreaOutOfRange)
                } else if !aspect_ratio_ok(rect.width, rect.height, config.min_ratio, config.max_ratio)
                {
                    Some(Rejection::AspectRatio)
                } else {
                    None
                };
                Some(Candidate {
                    area,
                    rect,
                    rejection,
                })
            })
            .collect()
    }

    /// Largest accepted candidate, first one winning ties.
    pub fn find_target(&self, frame: &RgbImage) -> Option<Detection> {
        let mut best: Option<Candidate> = None;
        for candidate in self.candidates(frame) {
            match &candidate.rejection {
                Some(reason) => {
                    debug!(
                        "Rejected region at ({:.1}, {:.1}), area {:.0}: {:?}",
                        candidate.rect.center.x, candidate.rect.center.y, candidate.area, reason
                    );
                }
                None => {
                    if best.as_ref().map_or(true, |b| candidate.area > b.area) {
                        best = Some(candidate);
                    }
                }
            }
        }

        let best = best?;
        let (width, height) = frame.dimensions();
        let (cx, cy) = ImageSize::from_width_height(width as usize, height as usize).center();
        let vector = OffsetVector::new(best.rect.center.x - cx, best.rect.center.y - cy, best.rect.angle);

        Some(Detection {
            vector,
            rect: best.rect,
            area: best.area,
        })
    }

    /// Offset of the target from frame center, or `None` when nothing passes
    /// the filters.
    pub fn locate(&self, frame: &RgbImage) -> Option<OffsetVector> {
        let vector = self.find_target(frame).map(|detection| detection.vector);
        match &vector {
            Some(v) => debug!("Target offset: {v}"),
            None => debug!("No target in frame"),
        }
        vector
    }

    /// Like [`locate`](Self::locate), then marks the target on the frame for
    /// the operator display.
    pub fn locate_and_annotate(&self, frame: &mut RgbImage) -> Option<OffsetVector> {
        let detection = self.find_target(frame);
        if let Some(detection) = &detection {
            debug!("Target offset: {}", detection.vector);
            overlay::mark_target(frame, &detection.rect);
        }
        detection.map(|d| d.vector)
    }
}
