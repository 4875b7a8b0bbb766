//! Capability queries used to pick the ONERA codec for a path.

use std::ffi::OsStr;
use std::path::Path;

use crate::image_pipeline::onera::header;
use crate::image_pipeline::onera::layout::HEADER_EXTENSION;

/// True when both files exist and the data file carries the magic number.
pub fn can_read_file(path: &Path) -> bool {
    header::probe(path)
}

/// True when `path` names the `.ent` header file itself.
pub fn can_write_file(path: &Path) -> bool {
    path.extension() == Some(OsStr::new(HEADER_EXTENSION)) && path == header::header_path(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::image_pipeline::onera::layout::MAGIC_NUMBER;
    use std::fs;

    #[test]
    fn test_can_write_file() {
        assert!(can_write_file(Path::new("out/look.ent")));
        assert!(!can_write_file(Path::new("out/look.dat")));
        assert!(!can_write_file(Path::new("out/look")));
        assert!(!can_write_file(Path::new("out/look.tif")));
        assert!(!can_write_file(Path::new("")));
        assert!(!can_write_file(Path::new("/")));
        assert!(!can_write_file(Path::new("..")));
        assert!(!can_write_file(Path::new(".ent")));
    }

    #[test]
    fn test_can_read_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("look.ent");
        assert!(!can_read_file(&path));

        fs::write(dir.path().join("look.ent"), "# a\n# b\ncmplx_real_4\n").unwrap();
        assert!(!can_read_file(&path), "missing data file");

        fs::write(dir.path().join("look.dat"), MAGIC_NUMBER.to_le_bytes()).unwrap();
        assert!(can_read_file(&path));
        // Any extension resolves to the same pair.
        assert!(can_read_file(&dir.path().join("look.dat")));

        fs::write(dir.path().join("look.dat"), MAGIC_NUMBER.to_be_bytes()).unwrap();
        assert!(!can_read_file(&path), "wrong byte order");

        fs::write(dir.path().join("look.dat"), [1u8, 0]).unwrap();
        assert!(!can_read_file(&path), "too short");
    }

    #[test]
    fn test_missing_header_file() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("look.dat"), MAGIC_NUMBER.to_le_bytes()).unwrap();
        assert!(!can_read_file(&dir.path().join("look.ent")));
    }
}
