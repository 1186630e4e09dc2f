// src/app.rs (karaoke-ui)
use std::path::{Path, PathBuf};

use karaoke_core::state::{ClockEvent, PlayerState};
use karaoke_core::commands::PlayerCommand;
use karaoke_core::config::CONTENT_MARGIN;
use karaoke_media::MediaWorker;
use karaoke_media::audio::cleanup_audio_temp;
use crate::context::AppContext;
use crate::helpers::shortcuts;
use crate::theme::{configure_style, STATUS_ERROR};
use crate::modules::{
    KaraokeModule,
    menu::MenuModule,
    monitor::MonitorModule,
    transport::TransportModule,
    files::FilesModule,
    audio_module::AudioModule,
    video_module::VideoModule,
};
use eframe::egui;
use rfd::FileDialog;

const VIDEO_EXTS: &[&str] = &["mp4", "mkv", "avi", "mov", "webm", "m4v", "mpg", "mpeg", "flv", "wmv"];

// ── App ───────────────────────────────────────────────────────────────────────

pub struct KaraokeApp {
    state:        PlayerState,
    context:      AppContext,
    menu:         MenuModule,
    monitor:      MonitorModule,
    transport:    TransportModule,
    files:        FilesModule,
    /// Non-rendering modules, driven by tick().
    audio:        AudioModule,
    video:        VideoModule,
    /// Commands emitted by modules each frame, processed after the UI pass.
    pending_cmds: Vec<PlayerCommand>,
    /// Fullscreen state requested from the window but not yet reported back.
    fullscreen_req: Option<bool>,
}

impl KaraokeApp {
    pub fn new(cc: &eframe::CreationContext<'_>) -> Self {
        configure_style(&cc.egui_ctx);
        // Pin to dark mode so OS light/dark changes don't overwrite the theme.
        cc.egui_ctx.options_mut(|o| {
            o.theme_preference = egui::ThemePreference::Dark;
        });

        Self::with_context(AppContext::new(MediaWorker::new()))
    }

    fn with_context(context: AppContext) -> Self {
        Self {
            state:          PlayerState::default(),
            context,
            menu:           MenuModule,
            monitor:        MonitorModule::new(),
            transport:      TransportModule,
            files:          FilesModule::new(),
            audio:          AudioModule::new(),
            video:          VideoModule::new(),
            pending_cmds:   Vec::new(),
            fullscreen_req: None,
        }
    }

    fn process_command(&mut self, cmd: PlayerCommand, ctx: &egui::Context) {
        match cmd {
            // ── Transport ────────────────────────────────────────────────────
            PlayerCommand::PlayClicked => {
                if !self.state.can_play() {
                    log::warn!("[app] play ignored: no playable input");
                    return;
                }
                let now = self.state.play_clicked();
                log::info!("[app] {now:?} at {:.3}s", self.state.position);
            }
            PlayerCommand::Stop => {
                self.state.stop();
                self.context.pending_pb_frame = None;
            }
            PlayerCommand::Seek(t) => {
                self.state.seek(t);
                self.context.audio_sink = None;
                self.context.playback.audio_was_playing = false;
                self.context.pending_pb_frame = None;
                if self.state.is_playing() {
                    self.context.playback.restart = true;
                }
            }
            PlayerCommand::SetVolume(v) => {
                self.state.set_volume(v);
            }

            // ── Recording ────────────────────────────────────────────────────
            PlayerCommand::RecordToggled(true)  => self.start_recording(),
            PlayerCommand::RecordToggled(false) => self.stop_recording(),

            // ── Files ────────────────────────────────────────────────────────
            PlayerCommand::SelectInputFile => {
                let mut dialog = FileDialog::new()
                    .set_title("Choose a video")
                    .add_filter("Video", VIDEO_EXTS);
                if let Some(dir) = self.state.input_path.as_deref().and_then(Path::parent) {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.pick_file() {
                    self.open_input(path);
                }
            }
            PlayerCommand::SelectOutputFile => {
                let mut dialog = FileDialog::new()
                    .set_title("Record audio to")
                    .add_filter("WAV audio", &["wav"])
                    .set_file_name("recording.wav");
                if let Some(dir) = self.state.output_path.as_deref().and_then(Path::parent) {
                    dialog = dialog.set_directory(dir);
                }
                if let Some(path) = dialog.save_file() {
                    self.set_output(path);
                }
            }
            PlayerCommand::SetInputPath(path)  => self.open_input(path),
            PlayerCommand::SetOutputPath(path) => self.set_output(path),

            // ── View / menus ─────────────────────────────────────────────────
            PlayerCommand::ToggleFullscreen => {
                let on = self.state.toggle_fullscreen();
                self.fullscreen_req = Some(on);
                ctx.send_viewport_cmd(egui::ViewportCommand::Fullscreen(on));
            }
            PlayerCommand::ToggleBindPlayRec => {
                self.state.toggle_bind_play_rec();
            }
            PlayerCommand::DismissStatus => {
                self.state.status = None;
            }
            PlayerCommand::Exit => {
                ctx.send_viewport_cmd(egui::ViewportCommand::Close);
            }
        }
    }

    fn open_input(&mut self, path: PathBuf) {
        self.context.release_media();
        let id = self.state.open_input(&path);
        self.state.status = None;
        log::info!("[app] input {id} → {}", path.display());
        self.context.media_worker.open(id, path);
    }

    fn set_output(&mut self, path: PathBuf) {
        log::info!("[app] output → {}", path.display());
        self.state.set_output(&path);
    }

    fn start_recording(&mut self) {
        let Some(path) = self.state.output_path.clone() else {
            self.state.recording = false;
            self.state.status = Some("Choose an audio output file before recording".into());
            return;
        };
        match self.context.recorder.record(&path) {
            Ok(written) => {
                self.state.recording = true;
                if written != path {
                    self.state.set_output(&written);
                }
            }
            Err(e) => {
                log::error!("[rec] {e}");
                self.state.recording = false;
                self.state.status = Some(format!("Recording failed: {e}"));
            }
        }
    }

    fn stop_recording(&mut self) {
        self.state.recording = false;
        if let Err(e) = self.context.recorder.stop() {
            log::error!("[rec] {e}");
            self.state.status = Some(format!("Recording failed: {e}"));
        }
    }

    fn poll_media(&mut self, ctx: &egui::Context) {
        // ── Playback frame consumption (PTS-gated) ────────────────────────────
        self.video.poll_playback(&self.state, &mut self.context, ctx);

        // ── Dispatch all queued MediaWorker results into state ────────────────
        self.context.ingest_media_results(&mut self.state, ctx);
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        if ctx.input_mut(|i| i.consume_shortcut(&shortcuts::EXIT)) {
            self.pending_cmds.push(PlayerCommand::Exit);
        }
        if ctx.input_mut(|i| i.consume_shortcut(&shortcuts::FULLSCREEN)) {
            self.pending_cmds.push(PlayerCommand::ToggleFullscreen);
        }
        if self.state.video_fullscreen
            && ctx.input_mut(|i| i.consume_shortcut(&shortcuts::LEAVE_FULLSCREEN))
        {
            self.pending_cmds.push(PlayerCommand::ToggleFullscreen);
        }
    }

    /// Follow fullscreen changes made by the window manager.
    fn sync_fullscreen(&mut self, ctx: &egui::Context) {
        let reported = ctx.input(|i| i.viewport().fullscreen);
        let now = reconcile_fullscreen(self.state.video_fullscreen, &mut self.fullscreen_req, reported);
        if now != self.state.video_fullscreen {
            log::info!("[app] fullscreen {now} (window manager)");
            self.state.video_fullscreen = now;
        }
    }

    fn status_line(&mut self, ui: &mut egui::Ui) {
        let Some(msg) = &self.state.status else { return };
        ui.horizontal(|ui| {
            ui.label(egui::RichText::new(msg).color(STATUS_ERROR));
            if ui.small_button("✖").on_hover_text("Dismiss").clicked() {
                self.pending_cmds.push(PlayerCommand::DismissStatus);
            }
        });
    }
}

/// Fullscreen flag after comparing ours with what the viewport reports.
///
/// While a request of ours is in flight the old state may still be reported
/// for a frame or two, so reports are ignored until they match the request.
fn reconcile_fullscreen(ours: bool, requested: &mut Option<bool>, reported: Option<bool>) -> bool {
    let Some(reported) = reported else { return ours };
    match *requested {
        Some(want) if want != reported => ours,
        _ => {
            *requested = None;
            reported
        }
    }
}

// ── eframe::App ───────────────────────────────────────────────────────────────

impl eframe::App for KaraokeApp {
    fn on_exit(&mut self, _gl: Option<&eframe::glow::Context>) {
        self.state.stop();
        self.context.media_worker.stop_playback();
        if self.context.recorder.is_recording() {
            match self.context.recorder.stop() {
                Ok(summary) => log::info!(
                    "[app] recording finalized on exit: {}",
                    summary.path.display(),
                ),
                Err(e) => log::error!("[app] recording lost on exit: {e}"),
            }
        }
        self.context.media_worker.shutdown();
        self.context.audio_sink = None;
        if let Some(apath) = self.context.audio_path.take() {
            cleanup_audio_temp(&apath);
        }
    }

    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.sync_fullscreen(ctx);
        self.handle_shortcuts(ctx);
        self.poll_media(ctx);
        self.monitor.current_frame = self.context.frame.clone();

        if self.state.video_fullscreen {
            // Video surface only.
            egui::CentralPanel::default()
                .frame(egui::Frame::NONE)
                .show(ctx, |ui| {
                    self.monitor.ui(ui, &self.state, &mut self.pending_cmds);
                });
        } else {
            egui::TopBottomPanel::top("menu_bar").show(ctx, |ui| {
                self.menu.ui(ui, &self.state, &mut self.pending_cmds);
            });

            egui::TopBottomPanel::bottom("controls")
                .frame(egui::Frame::side_top_panel(&ctx.style())
                    .inner_margin(egui::Margin::same(CONTENT_MARGIN)))
                .show(ctx, |ui| {
                    self.transport.ui(ui, &self.state, &mut self.pending_cmds);
                    ui.add_space(4.0);
                    self.files.ui(ui, &self.state, &mut self.pending_cmds);
                    self.status_line(ui);
                });

            egui::CentralPanel::default()
                .frame(egui::Frame::central_panel(&ctx.style())
                    .inner_margin(egui::Margin::same(CONTENT_MARGIN)))
                .show(ctx, |ui| {
                    self.monitor.ui(ui, &self.state, &mut self.pending_cmds);
                });
        }

        // ── Process commands emitted by modules this frame ────────────────────
        let cmds: Vec<PlayerCommand> = self.pending_cmds.drain(..).collect();
        for cmd in cmds {
            self.process_command(cmd, ctx);
        }

        // ── Tick non-rendering modules ────────────────────────────────────────
        self.video.tick(&self.state, &mut self.context);
        self.audio.tick(&self.state, &mut self.context);

        if self.state.is_playing() {
            let dt = ctx.input(|i| i.stable_dt as f64);
            if self.state.advance(dt) == ClockEvent::EndOfMedia {
                log::info!("[app] end of media");
            }
            ctx.request_repaint();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn app() -> KaraokeApp {
        KaraokeApp::with_context(AppContext::new(MediaWorker::new()))
    }

    #[test]
    fn rec_without_output_path_stays_unchecked() {
        let mut app = app();
        let ctx = egui::Context::default();
        app.process_command(PlayerCommand::RecordToggled(true), &ctx);
        assert!(!app.state.recording);
        assert!(app.state.status.as_deref().is_some_and(|m| m.contains("output")));
        assert!(!app.context.recorder.is_recording());
    }

    #[test]
    fn recorder_failure_unchecks_rec() {
        let dir = tempfile::tempdir().unwrap();
        let mut app = app();
        let ctx = egui::Context::default();
        app.process_command(
            PlayerCommand::SetOutputPath(dir.path().join("missing").join("take.wav")),
            &ctx,
        );
        app.process_command(PlayerCommand::RecordToggled(true), &ctx);
        assert!(!app.state.recording);
        assert!(app.state.status.as_deref().is_some_and(|m| m.starts_with("Recording failed")));
    }

    #[test]
    fn play_is_ignored_without_a_playable_input() {
        let mut app = app();
        let ctx = egui::Context::default();
        app.process_command(PlayerCommand::PlayClicked, &ctx);
        assert!(!app.state.is_playing());

        let id = app.state.open_input(Path::new("/tmp/broken.mp4"));
        app.context.apply_media_result(&mut app.state, &ctx, karaoke_media::MediaResult::Unplayable {
            id, msg: "cannot open".into(),
        });
        app.process_command(PlayerCommand::PlayClicked, &ctx);
        assert!(!app.state.is_playing());
    }

    #[test]
    fn seek_while_playing_restarts_the_pipeline() {
        let mut app = app();
        let ctx = egui::Context::default();
        app.state.open_input(Path::new("/tmp/a.mp4"));
        app.state.duration = 60.0;
        app.process_command(PlayerCommand::PlayClicked, &ctx);
        app.process_command(PlayerCommand::Seek(10.0), &ctx);
        assert!(app.context.playback.restart);
        assert_eq!(app.state.position, 10.0);

        app.process_command(PlayerCommand::PlayClicked, &ctx);
        app.context.playback.restart = false;
        app.process_command(PlayerCommand::Seek(20.0), &ctx);
        assert!(!app.context.playback.restart);
    }

    #[test]
    fn window_manager_can_leave_fullscreen() {
        let mut req = None;
        assert!(!reconcile_fullscreen(true, &mut req, Some(false)));
        assert!(reconcile_fullscreen(true, &mut req, None));
    }

    #[test]
    fn own_request_is_not_undone_by_a_stale_report() {
        let mut req = Some(true);
        assert!(reconcile_fullscreen(true, &mut req, Some(false)));
        assert_eq!(req, Some(true));
        assert!(reconcile_fullscreen(true, &mut req, Some(true)));
        assert_eq!(req, None);
    }
}
