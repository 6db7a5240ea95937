//! Test double for the graphics collaborator plus on-disk asset fixtures.

use std::collections::{HashMap, HashSet};
use std::path::Path;

use image::{Rgb, RgbImage, Rgba, RgbaImage};
use rook_board::Piece;
use rook_engine::render::{
    FrameOutcome, FrameSubmission, Graphics, GraphicsError, ImageData, MeshData, MeshId,
    ProgramId, Sampling, ShaderProgram, TextureId,
};

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CreateMesh(MeshId),
    CreateProgram(ProgramId),
    CreateTexture(TextureId),
    DestroyTexture(TextureId),
    DestroyProgram(ProgramId),
    DestroyMesh(MeshId),
    DrawFrame { draws: usize },
}

/// Records every call and hands out sequential handles.
#[derive(Debug, Default)]
pub struct TrackingGraphics {
    pub calls: Vec<Call>,
    /// Texture label whose upload fails.
    pub fail_texture: Option<String>,
    /// Outcome returned by `draw_frame`; `Presented` when unset.
    pub outcome: Option<FrameOutcome>,
    pub double_releases: usize,
    /// Viewport of the most recent `draw_frame`.
    pub last_viewport: Option<(u32, u32)>,

    next: u32,
    labels: HashMap<TextureId, String>,
    created: Vec<TextureId>,
    live_textures: HashSet<TextureId>,
    live_programs: HashSet<ProgramId>,
    live_meshes: HashSet<MeshId>,
}

impl TrackingGraphics {
    /// Double whose upload of the texture labelled `label` fails.
    pub fn failing(label: &str) -> Self {
        Self { fail_texture: Some(label.to_string()), ..Self::default() }
    }

    fn next_raw(&mut self) -> u32 {
        self.next += 1;
        self.next
    }

    /// Handles created and not released.
    pub fn live(&self) -> usize {
        self.live_textures.len() + self.live_programs.len() + self.live_meshes.len()
    }

    pub fn created_textures(&self) -> &[TextureId] {
        &self.created
    }

    pub fn texture_label(&self, id: TextureId) -> Option<&str> {
        self.labels.get(&id).map(String::as_str)
    }

    pub fn frames(&self) -> usize {
        self.calls.iter().filter(|c| matches!(c, Call::DrawFrame { .. })).count()
    }
}

impl Graphics for TrackingGraphics {
    fn create_mesh(&mut self, _mesh: &MeshData) -> Result<MeshId, GraphicsError> {
        let id = MeshId::from_raw(self.next_raw());
        self.live_meshes.insert(id);
        self.calls.push(Call::CreateMesh(id));
        Ok(id)
    }

    fn create_program(&mut self, _program: &ShaderProgram) -> Result<ProgramId, GraphicsError> {
        let id = ProgramId::from_raw(self.next_raw());
        self.live_programs.insert(id);
        self.calls.push(Call::CreateProgram(id));
        Ok(id)
    }

    fn create_texture(
        &mut self,
        label: &str,
        _image: &ImageData,
        _sampling: Sampling,
    ) -> Result<TextureId, GraphicsError> {
        if self.fail_texture.as_deref() == Some(label) {
            return Err(GraphicsError::EmptyTexture { label: label.to_string() });
        }
        let id = TextureId::from_raw(self.next_raw());
        self.labels.insert(id, label.to_string());
        self.created.push(id);
        self.live_textures.insert(id);
        self.calls.push(Call::CreateTexture(id));
        Ok(id)
    }

    fn destroy_texture(&mut self, id: TextureId) {
        if !self.live_textures.remove(&id) {
            self.double_releases += 1;
        }
        self.calls.push(Call::DestroyTexture(id));
    }

    fn destroy_program(&mut self, id: ProgramId) {
        if !self.live_programs.remove(&id) {
            self.double_releases += 1;
        }
        self.calls.push(Call::DestroyProgram(id));
    }

    fn destroy_mesh(&mut self, id: MeshId) {
        if !self.live_meshes.remove(&id) {
            self.double_releases += 1;
        }
        self.calls.push(Call::DestroyMesh(id));
    }

    fn draw_frame(&mut self, frame: &FrameSubmission<'_>) -> FrameOutcome {
        self.calls.push(Call::DrawFrame { draws: frame.draws.len() });
        self.last_viewport = Some(frame.viewport);
        self.outcome.unwrap_or(FrameOutcome::Presented)
    }
}

/// Writes a complete, tiny asset tree under `root`.
pub fn write_assets(root: &Path) {
    RgbImage::from_pixel(4, 4, Rgb([230, 230, 210])).save(root.join("white_tile.jpg")).unwrap();
    RgbImage::from_pixel(4, 4, Rgb([60, 40, 30])).save(root.join("black_tile.jpg")).unwrap();

    let pieces = root.join("pieces");
    std::fs::create_dir_all(&pieces).unwrap();
    for piece in Piece::all() {
        RgbaImage::from_pixel(4, 4, Rgba([10, 10, 10, 200]))
            .save(pieces.join(format!("{piece}.png")))
            .unwrap();
    }
}
