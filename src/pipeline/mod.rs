//! The ripping pipeline: track policy and the orchestrator that applies it.

pub mod orchestrator;
pub mod policy;

pub use orchestrator::{InputReport, Ripper, RunReport, TrackOutcome, TrackReport};
pub use policy::{
    preset_for_width, prepare_destination, DestinationState, TrackDecision, TrackPlan,
    TrackPolicy, PRESET_1080P, PRESET_720P,
};
