// crates/karaoke-core/src/commands.rs
//
// Every user action in the karaoke window is expressed as a PlayerCommand.
// Modules emit these; app.rs processes them after the UI pass.
// Adding a new control = add a variant here + one match arm in app.rs.

use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq)]
pub enum PlayerCommand {
    // ── Transport ────────────────────────────────────────────────────────────
    /// Play/pause toggle: paused or stopped → play, otherwise → pause.
    PlayClicked,
    Stop,
    /// Seek slider moved (seconds).
    Seek(f64),
    /// Volume slider moved (0–100).
    SetVolume(u8),

    // ── Recording ────────────────────────────────────────────────────────────
    /// Rec button clicked; carries the button's new checked state.
    RecordToggled(bool),

    // ── Files ────────────────────────────────────────────────────────────────
    /// Open the native picker for the video input.
    SelectInputFile,
    /// Open the native save dialog for the audio output.
    SelectOutputFile,
    /// Input path committed (dialog result or typed edit).
    SetInputPath(PathBuf),
    /// Output path committed (dialog result or typed edit).
    SetOutputPath(PathBuf),

    // ── View / menus ─────────────────────────────────────────────────────────
    /// Menu checkbox, Ctrl+Shift+F and double-click all land here.
    ToggleFullscreen,
    ToggleBindPlayRec,
    DismissStatus,
    Exit,
}
