use anyhow::Result;

use rook_board::{BoardLayout, PiecePlacement, CELL_COUNT};
use rook_engine::core::{App, AppControl, FrameCtx};
use rook_engine::paint::Color;
use rook_engine::render::{FrameOutcome, FrameSubmission, Graphics};
use rook_engine::scene::DrawList;

use crate::config::ViewerConfig;
use crate::frame::{compose_frame, view_projection};
use crate::resources::BoardResources;

/// Draws the static board until the window closes.
pub struct ViewerApp {
    config: ViewerConfig,
    layout: BoardLayout,
    placement: PiecePlacement,
    draws: DrawList,
    resources: Option<BoardResources>,
}

impl ViewerApp {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            layout: BoardLayout::new(),
            placement: PiecePlacement::starting(),
            draws: DrawList::with_capacity(CELL_COUNT * 2),
            resources: None,
        }
    }

    fn start<G: Graphics + ?Sized>(&mut self, gfx: &mut G) -> Result<()> {
        let manifest = self.config.manifest();
        let resources = BoardResources::load(gfx, &manifest)?;
        log::info!("board ready: {} textures", resources.texture_count());
        self.resources = Some(resources);
        Ok(())
    }

    fn frame<G: Graphics + ?Sized>(&mut self, gfx: &mut G, viewport: (u32, u32)) -> AppControl {
        let Some(resources) = &self.resources else {
            return AppControl::Continue;
        };

        compose_frame(
            &mut self.draws,
            &self.layout,
            &self.placement,
            resources,
            self.config.piece_scale,
        );

        let submission = FrameSubmission {
            clear: Color::BLACK,
            program: resources.program(),
            mesh: resources.mesh(),
            view_projection: view_projection(),
            draws: &self.draws,
            viewport,
        };

        match gfx.draw_frame(&submission) {
            FrameOutcome::Presented | FrameOutcome::Skipped => AppControl::Continue,
            FrameOutcome::Fatal => {
                log::error!("surface lost, closing");
                AppControl::Exit
            }
        }
    }

    fn shutdown<G: Graphics + ?Sized>(&mut self, gfx: &mut G) {
        if let Some(resources) = self.resources.take() {
            resources.release(gfx);
            log::info!("board resources released");
        }
    }
}

impl App for ViewerApp {
    fn on_start(&mut self, ctx: &mut FrameCtx<'_, '_>) -> Result<()> {
        self.start(&mut ctx.graphics())
    }

    fn on_frame(&mut self, ctx: &mut FrameCtx<'_, '_>) -> AppControl {
        let viewport = ctx.window.framebuffer_size();
        self.frame(&mut ctx.graphics(), viewport)
    }

    fn on_shutdown(&mut self, ctx: &mut FrameCtx<'_, '_>) {
        self.shutdown(&mut ctx.graphics());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_assets, Call, TrackingGraphics};

    const VIEWPORT: (u32, u32) = (720, 720);

    fn config(root: &std::path::Path) -> ViewerConfig {
        ViewerConfig { asset_root: root.to_path_buf(), ..ViewerConfig::default() }
    }

    #[test]
    fn lifecycle_releases_every_handle_once_in_order() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();
        let mut app = ViewerApp::new(config(dir.path()));

        app.start(&mut gfx).unwrap();
        for _ in 0..3 {
            assert_eq!(app.frame(&mut gfx, VIEWPORT), AppControl::Continue);
        }
        app.shutdown(&mut gfx);
        // A second shutdown has nothing left to release.
        app.shutdown(&mut gfx);

        assert_eq!(gfx.frames(), 3);
        assert_eq!(gfx.last_viewport, Some(VIEWPORT));
        assert!(gfx.calls.contains(&Call::DrawFrame { draws: 96 }));
        assert_eq!(gfx.live(), 0);
        assert_eq!(gfx.double_releases, 0);

        let destroys: Vec<&Call> = gfx
            .calls
            .iter()
            .skip_while(|c| !matches!(c, Call::DestroyTexture(_)))
            .collect();
        assert_eq!(destroys.len(), 16);
        assert!(matches!(destroys[14], Call::DestroyProgram(_)));
        assert!(matches!(destroys[15], Call::DestroyMesh(_)));
    }

    #[test]
    fn fatal_surface_error_exits() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();
        let mut app = ViewerApp::new(config(dir.path()));
        app.start(&mut gfx).unwrap();

        gfx.outcome = Some(FrameOutcome::Skipped);
        assert_eq!(app.frame(&mut gfx, VIEWPORT), AppControl::Continue);
        gfx.outcome = Some(FrameOutcome::Fatal);
        assert_eq!(app.frame(&mut gfx, VIEWPORT), AppControl::Exit);

        app.shutdown(&mut gfx);
        assert_eq!(gfx.live(), 0);
    }

    #[test]
    fn failed_start_leaves_nothing_behind() {
        let dir = tempfile::tempdir().unwrap();
        let mut gfx = TrackingGraphics::default();
        let mut app = ViewerApp::new(config(dir.path()));

        let err = app.start(&mut gfx).unwrap_err();
        assert!(format!("{err:#}").contains("white_tile.jpg"), "{err:#}");
        assert_eq!(gfx.live(), 0);

        // No frames are drawn without resources.
        assert_eq!(app.frame(&mut gfx, VIEWPORT), AppControl::Continue);
        assert_eq!(gfx.frames(), 0);
    }

    #[test]
    fn board_only_config_draws_tiles_only() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();
        let mut app = ViewerApp::new(ViewerConfig { show_pieces: false, ..config(dir.path()) });

        app.start(&mut gfx).unwrap();
        app.frame(&mut gfx, VIEWPORT);
        app.shutdown(&mut gfx);

        assert!(gfx.calls.contains(&Call::DrawFrame { draws: 64 }));
        assert_eq!(gfx.created_textures().len(), 2);
    }

    #[test]
    fn framebuffer_size_reaches_the_graphics_collaborator() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();
        let mut app = ViewerApp::new(config(dir.path()));
        app.start(&mut gfx).unwrap();

        app.frame(&mut gfx, (1024, 600));
        assert_eq!(gfx.last_viewport, Some((1024, 600)));
        app.frame(&mut gfx, (0, 600));
        assert_eq!(gfx.last_viewport, Some((0, 600)));

        app.shutdown(&mut gfx);
    }
}
