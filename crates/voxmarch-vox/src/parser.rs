use crate::error::FormatError;
use crate::model::{Voxel, VoxModel};
use crate::reader::ByteReader;

/// File tag every `.vox` file starts with.
pub const MAGIC: [u8; 4] = *b"VOX ";

/// Header versions sharing the `SIZE` / `XYZI` layout read here.
pub const SUPPORTED_VERSIONS: [i32; 2] = [150, 200];

const MAIN: [u8; 4] = *b"MAIN";
const SIZE: [u8; 4] = *b"SIZE";
const XYZI: [u8; 4] = *b"XYZI";

// ── Chunk ─────────────────────────────────────────────────────────────────

/// A chunk header plus readers over its own content and its children.
struct Chunk<'b> {
    id: [u8; 4],
    content: ByteReader<'b>,
    children: ByteReader<'b>,
}

fn read_chunk<'b>(r: &mut ByteReader<'b>) -> Result<Chunk<'b>, FormatError> {
    let id = r.read_tag()?;
    let content_len = r.read_len()?;
    let children_len = r.read_len()?;
    let content = r.sub_reader(content_len)?;
    let children = r.sub_reader(children_len)?;
    Ok(Chunk { id, content, children })
}

// ── Entry point ───────────────────────────────────────────────────────────

/// Parses a complete `.vox` file held in memory.
///
/// Layout: `"VOX "`, version `i32`, then a `MAIN` chunk whose children hold
/// the model chunks. The first `SIZE` chunk and the first `XYZI` chunk after
/// it form the model; other chunks (`PACK`, `RGBA`, scene graph, materials)
/// are skipped.
pub fn parse_bytes(bytes: &[u8]) -> Result<VoxModel, FormatError> {
    let mut r = ByteReader::new(bytes);

    let magic = r.read_tag()?;
    if magic != MAGIC {
        return Err(FormatError::BadMagic(magic));
    }

    let version = r.read_i32()?;
    if !SUPPORTED_VERSIONS.contains(&version) {
        return Err(FormatError::UnsupportedVersion(version));
    }

    if r.remaining() < 4 {
        return Err(FormatError::MissingChunk("MAIN"));
    }
    let main = read_chunk(&mut r)?;
    if main.id != MAIN {
        return Err(FormatError::MissingChunk("MAIN"));
    }

    let mut children = main.children;
    let mut size: Option<[u32; 3]> = None;
    let mut voxels: Option<Vec<Voxel>> = None;

    while !children.is_empty() && voxels.is_none() {
        let chunk = read_chunk(&mut children)?;
        match chunk.id {
            SIZE if size.is_none() => size = Some(read_size(chunk.content)?),
            XYZI => {
                if size.is_none() {
                    return Err(FormatError::MissingChunk("SIZE"));
                }
                voxels = Some(read_voxels(chunk.content)?);
            }
            // Nested children are not used by the model chunks.
            _ => {}
        }
    }

    let size = size.ok_or(FormatError::MissingChunk("SIZE"))?;
    let voxels = voxels.ok_or(FormatError::MissingChunk("XYZI"))?;

    Ok(VoxModel { version, size, voxels })
}

fn read_size(mut r: ByteReader<'_>) -> Result<[u32; 3], FormatError> {
    let mut size = [0u32; 3];
    for axis in &mut size {
        let offset = r.offset();
        let value = r.read_i32()?;
        // XYZI coordinates are single bytes, so a larger extent cannot be addressed.
        if !(1..=256).contains(&value) {
            return Err(FormatError::InvalidSize { offset, value });
        }
        *axis = value as u32;
    }
    Ok(size)
}

fn read_voxels(mut r: ByteReader<'_>) -> Result<Vec<Voxel>, FormatError> {
    let count = r.read_len()?;

    // Bound the allocation by what the chunk can actually hold; the reads
    // below report truncation if the count overstates the content.
    let mut voxels = Vec::with_capacity(count.min(r.remaining() / 4));
    for _ in 0..count {
        let b = r.read_bytes(4)?;
        voxels.push(Voxel { x: b[0], y: b[1], z: b[2], color_index: b[3] });
    }
    Ok(voxels)
}
