//! Target locator for the aiming camera.
//!
//! Finds the retro-reflective goal marker in a camera frame and reduces it to
//! an [`OffsetVector`](shared::OffsetVector): the pixel offset of the target's
//! center from frame center plus the tilt of its bounding rectangle.
//!
//! The pipeline, leaves first:
//! - [`hsv`]: per-pixel HSV conversion and band thresholding into a mask
//! - [`mask`]: mask conversions for the `imageproc` passes below
//! - [`morphology`]: erosion then dilation to drop noise and close gaps
//! - [`contours`]: outer boundaries of connected regions
//! - [`min_rect`]: minimum-area rotated bounding rectangles
//! - [`locator`]: area / aspect-ratio filtering and largest-candidate selection
//!
//! [`module::VisionModule`] ties a [`source::FrameSource`] to a locator for
//! on-robot use and offline tuning.

pub mod config;
pub mod contours;
pub mod error;
pub mod hsv;
pub mod locator;
pub mod mask;
pub mod min_rect;
pub mod module;
pub mod morphology;
pub mod overlay;
pub mod source;

pub use config::{ChannelRange, HsvBand, LocatorConfig};
pub use error::VisionError;
pub use locator::{Candidate, Detection, Rejection, TargetLocator};
pub use min_rect::RotatedRect;
pub use module::{Report, VisionModule};
pub use source::{FrameSource, ImageFileSource, StaticFrameSource};
