//! GPU resources for one board: the shared quad, the quad program, and every
//! texture named by the manifest.

use anyhow::{Context, Result};

use rook_board::{Piece, TileColor};
use rook_engine::render::{
    Graphics, ImageData, MeshData, MeshId, ProgramId, ShaderProgram, TextureId,
};

use crate::assets::{AssetManifest, AssetSpec};

#[derive(Debug)]
pub struct BoardResources {
    mesh: MeshId,
    program: ProgramId,
    light_tile: TextureId,
    dark_tile: TextureId,
    /// Indexed by [`Piece::index`]; empty when pieces are not shown.
    pieces: Vec<TextureId>,
}

/// What has been created so far, so a failed load can undo it.
#[derive(Default)]
struct Created {
    mesh: Option<MeshId>,
    program: Option<ProgramId>,
    textures: Vec<TextureId>,
}

impl Created {
    fn release<G: Graphics + ?Sized>(self, gfx: &mut G) {
        for id in self.textures {
            gfx.destroy_texture(id);
        }
        if let Some(id) = self.program {
            gfx.destroy_program(id);
        }
        if let Some(id) = self.mesh {
            gfx.destroy_mesh(id);
        }
    }
}

impl BoardResources {
    /// Creates the mesh, the program, then every texture in manifest order.
    ///
    /// Any failure releases what was already created before returning.
    pub fn load<G: Graphics + ?Sized>(gfx: &mut G, manifest: &AssetManifest) -> Result<Self> {
        let mut created = Created::default();
        match Self::build(gfx, manifest, &mut created) {
            Ok(resources) => Ok(resources),
            Err(err) => {
                log::debug!("releasing partially created board resources");
                created.release(gfx);
                Err(err)
            }
        }
    }

    fn build<G: Graphics + ?Sized>(
        gfx: &mut G,
        manifest: &AssetManifest,
        created: &mut Created,
    ) -> Result<Self> {
        let mesh = gfx
            .create_mesh(&MeshData::unit_quad())
            .context("failed to create quad mesh")?;
        created.mesh = Some(mesh);

        let shader = ShaderProgram::quad().context("failed to build quad shader program")?;
        let program = gfx
            .create_program(&shader)
            .context("failed to create quad shader program")?;
        created.program = Some(program);

        created.textures.reserve(manifest.len());
        let light_tile = load_texture(gfx, manifest.tile(TileColor::Light), created)?;
        let dark_tile = load_texture(gfx, manifest.tile(TileColor::Dark), created)?;

        let mut pieces = Vec::with_capacity(manifest.pieces.len());
        for asset in &manifest.pieces {
            pieces.push(load_texture(gfx, asset, created)?);
        }

        Ok(Self { mesh, program, light_tile, dark_tile, pieces })
    }

    /// Releases every handle: textures, then the program, then the mesh.
    pub fn release<G: Graphics + ?Sized>(self, gfx: &mut G) {
        Created {
            mesh: Some(self.mesh),
            program: Some(self.program),
            textures: [self.light_tile, self.dark_tile]
                .into_iter()
                .chain(self.pieces)
                .collect(),
        }
        .release(gfx);
    }

    pub fn mesh(&self) -> MeshId {
        self.mesh
    }

    pub fn program(&self) -> ProgramId {
        self.program
    }

    pub fn tile_texture(&self, color: TileColor) -> TextureId {
        match color {
            TileColor::Light => self.light_tile,
            TileColor::Dark => self.dark_tile,
        }
    }

    /// `None` when pieces were not loaded.
    pub fn piece_texture(&self, piece: Piece) -> Option<TextureId> {
        self.pieces.get(piece.index()).copied()
    }

    pub fn texture_count(&self) -> usize {
        2 + self.pieces.len()
    }
}

fn load_texture<G: Graphics + ?Sized>(
    gfx: &mut G,
    asset: &AssetSpec,
    created: &mut Created,
) -> Result<TextureId> {
    let image = ImageData::load(&asset.path)?;
    let id = gfx
        .create_texture(&asset.label, &image, asset.sampling)
        .with_context(|| format!("failed to upload texture {}", asset.path.display()))?;
    created.textures.push(id);

    log::info!(
        "loaded texture {} ({}x{}, {} channels)",
        asset.path.display(),
        image.width(),
        image.height(),
        image.channels()
    );
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{write_assets, Call, TrackingGraphics};
    use rook_board::{PieceKind, Side};

    #[test]
    fn loads_fourteen_textures_with_pieces() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();

        let res = BoardResources::load(&mut gfx, &AssetManifest::new(dir.path(), true)).unwrap();

        assert_eq!(res.texture_count(), 14);
        assert_eq!(gfx.created_textures().len(), 14);
        let rook = Piece::new(Side::White, PieceKind::Rook);
        assert_eq!(gfx.texture_label(res.piece_texture(rook).unwrap()), Some("white_rook"));
        assert_ne!(res.tile_texture(TileColor::Light), res.tile_texture(TileColor::Dark));

        res.release(&mut gfx);
        assert_eq!(gfx.live(), 0);
    }

    #[test]
    fn board_only_loads_two_textures() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();

        let res = BoardResources::load(&mut gfx, &AssetManifest::new(dir.path(), false)).unwrap();
        assert_eq!(res.texture_count(), 2);
        assert_eq!(res.piece_texture(Piece::new(Side::Black, PieceKind::King)), None);
        res.release(&mut gfx);
    }

    #[test]
    fn release_order_is_textures_program_mesh() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::default();

        let res = BoardResources::load(&mut gfx, &AssetManifest::new(dir.path(), true)).unwrap();
        let (mesh, program) = (res.mesh(), res.program());
        gfx.calls.clear();
        res.release(&mut gfx);

        let n = gfx.calls.len();
        assert_eq!(n, 16);
        assert!(gfx.calls[..14].iter().all(|c| matches!(c, Call::DestroyTexture(_))));
        assert_eq!(gfx.calls[14], Call::DestroyProgram(program));
        assert_eq!(gfx.calls[15], Call::DestroyMesh(mesh));
        assert_eq!(gfx.live(), 0);
    }

    #[test]
    fn missing_piece_image_releases_everything_created() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        std::fs::remove_file(dir.path().join("pieces/black_queen.png")).unwrap();
        let mut gfx = TrackingGraphics::default();

        let manifest = AssetManifest::new(dir.path(), true);
        let err = BoardResources::load(&mut gfx, &manifest).unwrap_err();

        assert!(format!("{err:#}").contains("black_queen.png"), "{err:#}");
        // Two tiles and the ten pieces before the black queen were uploaded.
        assert_eq!(gfx.created_textures().len(), 12);
        assert_eq!(gfx.live(), 0);
        assert!(matches!(gfx.calls.last(), Some(Call::DestroyMesh(_))));
    }

    #[test]
    fn upload_failure_releases_earlier_handles() {
        let dir = tempfile::tempdir().unwrap();
        write_assets(dir.path());
        let mut gfx = TrackingGraphics::failing("black_tile");

        let manifest = AssetManifest::new(dir.path(), true);
        let err = BoardResources::load(&mut gfx, &manifest).unwrap_err();

        assert!(format!("{err:#}").contains("black_tile.jpg"), "{err:#}");
        assert_eq!(gfx.live(), 0);
    }
}
