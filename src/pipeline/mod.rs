//! Processing pipeline components.

mod align;
mod context;
mod coordinator;
mod mix;
mod orchestrator;
mod reassemble;
mod reconcile;
mod segment;

pub use align::{LagEstimate, estimate_lag};
pub use context::{RunContext, run_dir_name};
pub use coordinator::{
    AudioOutput, audio_output_for, collect_input_files, is_media_file, is_video_file,
    output_path_for,
};
pub use mix::{MixWeights, MixedTrack, mix_tracks};
pub use orchestrator::{ModelTrack, Orchestrator, RunOutcome, RunState};
pub use reassemble::{build_concat_list, conform_silence, reassemble};
pub use reconcile::{Reconciliation, build_reconcile_filter, reconcile};
pub use segment::{Segment, SegmentSpan, plan_segments, segment_name, split_segments};
