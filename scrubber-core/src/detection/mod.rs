//! Content detection module
//!
//! This module contains the detector contract, the registry that constructs
//! detectors by type name, and the pipeline that runs them in
//! memory-constrained phases.

pub mod detector;
pub mod pipeline;
pub mod registry;
pub mod result;

pub use detector::{Detector, DetectorKind};
pub use pipeline::DetectionPipeline;
pub use registry::{DetectorFactory, DetectorRegistry, register_default};
pub use result::DetectionResult;
