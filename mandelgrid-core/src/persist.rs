//! Saving and loading evaluated grids as JSON.
//!
//! Fixed coordinates round-trip through `serde_json`'s exact float parser;
//! arbitrary-precision ones are written as hexadecimal mantissas with their
//! bit-width, so a loaded grid is identical to the one that was saved.

use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;

use tracing::debug;

use crate::grid::SampleGrid;

pub fn write_grid<W: Write>(grid: &SampleGrid, writer: W) -> crate::Result<()> {
    let mut writer = BufWriter::new(writer);
    serde_json::to_writer(&mut writer, grid)?;
    writer.flush()?;
    Ok(())
}

pub fn read_grid<R: Read>(reader: R) -> crate::Result<SampleGrid> {
    Ok(serde_json::from_reader(BufReader::new(reader))?)
}

/// Write `grid` to `path`, replacing any existing file.
pub fn save_grid(grid: &SampleGrid, path: &Path) -> crate::Result<()> {
    write_grid(grid, File::create(path)?)?;
    debug!(path = %path.display(), points = grid.len(), "grid saved");
    Ok(())
}

pub fn load_grid(path: &Path) -> crate::Result<SampleGrid> {
    let grid = read_grid(File::open(path)?)?;
    debug!(path = %path.display(), points = grid.len(), "grid loaded");
    Ok(grid)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::complex::Complex;
    use crate::error::CoreError;
    use crate::viewport::{BigViewport, Viewport};

    #[test]
    fn fixed_grid_round_trip() {
        let vp = Viewport::new(Complex::new(-0.7431, 0.1312), 0.013, 0.01, 5, 4).unwrap();
        let mut grid = SampleGrid::build(&vp);
        grid.points[3].is_member = true;
        grid.points[3].iterations = 77;
        grid.max_iterations = Some(77);

        let mut buf = Vec::new();
        write_grid(&grid, &mut buf).unwrap();
        assert_eq!(read_grid(buf.as_slice()).unwrap(), grid);
    }

    #[test]
    fn arbitrary_grid_round_trip() {
        let vp = BigViewport::parse(
            "-0.74364388703715870475",
            "0.13182590420531197049",
            "1e-25",
            "1e-25",
            3,
            2,
            200,
        )
        .unwrap();
        let grid = SampleGrid::build_big(&vp);

        let mut buf = Vec::new();
        write_grid(&grid, &mut buf).unwrap();
        assert_eq!(read_grid(buf.as_slice()).unwrap(), grid);
    }

    #[test]
    fn unevaluated_grid_loads_without_cap() {
        let json = r#"{"x_res":1,"y_res":1,"points":[
            {"position":{"fixed":{"re":0.5,"im":0.0}},"is_member":false,"iterations":0,"pixel_x":0,"pixel_y":0}
        ]}"#;
        let grid = read_grid(json.as_bytes()).unwrap();
        assert_eq!(grid.max_iterations, None);
        assert_eq!(grid.len(), 1);
    }

    #[test]
    fn malformed_input_is_an_error() {
        assert!(matches!(
            read_grid(&b"{not json"[..]),
            Err(CoreError::Serialization(_))
        ));
    }

    #[test]
    fn save_and_load_file() {
        let dir = std::env::temp_dir().join("mandelgrid_persist_test");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("grid.json");

        let grid = SampleGrid::build(&Viewport::default_view(4, 4).unwrap());
        save_grid(&grid, &path).unwrap();
        assert_eq!(load_grid(&path).unwrap(), grid);

        std::fs::remove_dir_all(&dir).ok();
        assert!(matches!(load_grid(&path), Err(CoreError::Io(_))));
    }
}
