//! Loading triangle soups from mesh files.

use std::{fs, path::Path};

use thiserror::Error;

use crate::geometry::{FloatType, Triangle, WorldPoint};

#[derive(Debug, Error)]
pub enum MeshLoadError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),

    #[error("Truncated STL data: expected {expected} bytes, got {actual}")]
    TruncatedStl { expected: usize, actual: usize },
}

/// Reads triangles from a Wavefront OBJ file, all objects merged together.
pub fn read_obj(path: impl AsRef<Path>) -> Result<Vec<Triangle<WorldPoint>>, MeshLoadError> {
    parse_obj(fs::read_to_string(path)?)
}

pub fn parse_obj(content: String) -> Result<Vec<Triangle<WorldPoint>>, MeshLoadError> {
    let parsed = wavefront_obj::obj::parse(content)?;

    let mut triangles = Vec::new();
    let mut skipped = 0usize;
    for o in parsed.objects {
        let vertex = |index: (usize, Option<usize>, Option<usize>)| {
            let v = &o.vertices[index.0];
            WorldPoint::new(v.x as FloatType, v.y as FloatType, v.z as FloatType)
        };
        for geometry in o.geometry {
            for shape in geometry.shapes {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    skipped += 1;
                    continue;
                };
                triangles.push(Triangle::new(vertex(a), vertex(b), vertex(c)));
            }
        }
    }

    if skipped > 0 {
        log::warn!("Skipped {skipped} non-triangle primitives");
    }
    log::debug!("Loaded {} triangles from OBJ", triangles.len());
    Ok(triangles)
}

/// Reads triangles from a binary STL file.
pub fn read_stl(path: impl AsRef<Path>) -> Result<Vec<Triangle<WorldPoint>>, MeshLoadError> {
    parse_stl(&fs::read(path)?)
}

const STL_HEADER_SIZE: usize = 80;
/// Normal, three vertices, attribute byte count
const STL_RECORD_SIZE: usize = 4 * 3 * 4 + 2;

/// Parses binary STL data.
/// Stored normals are ignored, the facing is given by the vertex order.
pub fn parse_stl(data: &[u8]) -> Result<Vec<Triangle<WorldPoint>>, MeshLoadError> {
    let truncated = |expected| MeshLoadError::TruncatedStl {
        expected,
        actual: data.len(),
    };

    let count_bytes = data
        .get(STL_HEADER_SIZE..STL_HEADER_SIZE + 4)
        .ok_or_else(|| truncated(STL_HEADER_SIZE + 4))?;
    let count = u32::from_le_bytes([count_bytes[0], count_bytes[1], count_bytes[2], count_bytes[3]])
        as usize;

    let records_start = STL_HEADER_SIZE + 4;
    let expected = records_start + count * STL_RECORD_SIZE;
    let records = data
        .get(records_start..expected)
        .ok_or_else(|| truncated(expected))?;

    let triangles: Vec<_> = records
        .chunks_exact(STL_RECORD_SIZE)
        .map(|record| {
            let point = |offset: usize| {
                let coordinate = |i: usize| {
                    let start = offset + 4 * i;
                    FloatType::from_le_bytes([
                        record[start],
                        record[start + 1],
                        record[start + 2],
                        record[start + 3],
                    ])
                };
                WorldPoint::new(coordinate(0), coordinate(1), coordinate(2))
            };
            Triangle::new(point(12), point(24), point(36))
        })
        .collect();

    log::debug!("Loaded {} triangles from STL", triangles.len());
    Ok(triangles)
}
