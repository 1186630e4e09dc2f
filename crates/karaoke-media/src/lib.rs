// crates/karaoke-media/src/lib.rs
//
// No egui dependency. Communicates with karaoke-ui via channels only.
//
// To add a new media capability:
//   1. Create a new module file here
//   2. Add `pub mod mymodule;` below
//   3. Call it from worker.rs (open or a new MediaWorker method)

pub mod audio;
pub mod decode;
pub mod probe;
pub mod recorder;
pub mod worker;

mod helpers;

// Re-export the main public API so karaoke-ui imports are simple.
pub use worker::MediaWorker;
pub use recorder::{AudioRecorder, RecordError, RecordingSummary};
pub use karaoke_core::media_types::{MediaResult, PlaybackFrame};
