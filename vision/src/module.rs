//! Frame source + locator bundle used on the vision co-processor.

use std::fmt;
use std::path::Path;
use std::time::{Duration, Instant};

use log::{debug, info};
use shared::{CameraGeometry, OffsetVector};

use crate::error::VisionError;
use crate::locator::TargetLocator;
use crate::source::FrameSource;

/// Human-readable summary of one detection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Report {
    pub vector: OffsetVector,
    /// Rotation needed to face the target (degrees)
    pub degrees_x: f64,
    /// Elevation of the target above horizontal (degrees)
    pub degrees_from_horizon: f64,
    /// Floor distance to the goal (inches)
    pub distance: f64,
}

impl Report {
    pub fn new(vector: OffsetVector, geometry: &CameraGeometry) -> Self {
        Self {
            vector,
            degrees_x: geometry.frame_x_px_to_degrees(vector.dx),
            degrees_from_horizon: geometry.y_in_frame_to_degrees_from_horizon(vector.dy),
            distance: geometry.distance_to_goal(vector.dy),
        }
    }
}

impl fmt::Display for Report {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Vector: {}", self.vector)?;
        writeln!(f, "Degrees X: {:.2}", self.degrees_x)?;
        writeln!(f, "Degrees from horizon: {:.2}", self.degrees_from_horizon)?;
        write!(f, "Distance: {:.1} in", self.distance)
    }
}

/// Pulls frames from a [`FrameSource`] and runs the locator on them.
pub struct VisionModule<S: FrameSource> {
    source: S,
    locator: TargetLocator,
}

impl<S: FrameSource> VisionModule<S> {
    pub fn new(source: S, locator: TargetLocator) -> Self {
        Self { source, locator }
    }

    pub fn locator(&self) -> &TargetLocator {
        &self.locator
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    /// Read one frame and locate the target in it.
    pub fn process_image(&mut self) -> Result<Option<OffsetVector>, VisionError> {
        let frame = self.source.read_frame()?;
        Ok(self.locator.locate(&frame))
    }

    /// Read one frame, locate the target and write the annotated frame to
    /// `path`. The file is written whether or not a target was found.
    pub fn process_image_and_save(
        &mut self,
        path: &Path,
    ) -> Result<Option<OffsetVector>, VisionError> {
        let mut frame = self.source.read_frame()?;
        let vector = self.locator.locate_and_annotate(&mut frame);
        frame.save(path)?;
        info!("Saved annotated frame to {}", path.display());
        Ok(vector)
    }

    /// Mean wall time of `iterations` calls to [`process_image`](Self::process_image).
    ///
    /// Returns `Duration::ZERO` for zero iterations.
    pub fn average_processing_time(&mut self, iterations: u32) -> Result<Duration, VisionError> {
        if iterations == 0 {
            return Ok(Duration::ZERO);
        }
        let start = Instant::now();
        for _ in 0..iterations {
            self.process_image()?;
        }
        let average = start.elapsed() / iterations;
        debug!("Average processing time over {iterations} frames: {average:?}");
        Ok(average)
    }
}
