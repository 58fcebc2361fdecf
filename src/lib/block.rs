use std::{fs, path::{Path, PathBuf}};

use num_traits::Num;

use crate::{vector3::Vector3, errors::{DecodeError, UploadError}};

pub const SLAB_DIR_SUFFIX: &str = ".z";
pub const BLOCK_FILE_SUFFIX: &str = ".blocks";

/// A block payload on disk, addressed by its grid coordinate.
///
/// Payload files live at `<z>.z/<y>-<numblocks>.blocks`. The x coordinate
/// is not encoded in the layout and is always 0.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlockRef {
    pub path: PathBuf,
    pub y: u32,
    pub z: u32,
    pub num_blocks: u32
}

impl BlockRef {
    pub fn new(path: PathBuf, y: u32, z: u32, num_blocks: u32) -> Self {
        return Self { path, y, z, num_blocks };
    }

    /// Decodes a block reference from the path of a payload file.
    /// The parent directory supplies z, the file name supplies y and
    /// the block count.
    /// * `path` - path to a `<y>-<numblocks>.blocks` file inside a `<z>.z` directory
    pub fn from_path(path: &Path) -> Result<Self, DecodeError> {
        let file_name = path.file_name()
            .ok_or_else(|| DecodeError::NoFileName(path.to_path_buf()))?;
        let file_name = file_name.to_str()
            .ok_or_else(|| DecodeError::NotUtf8(path.to_path_buf()))?;
        let (y, num_blocks) = parse_block_file_name(file_name)?;

        let slab_dir = path.parent()
            .and_then(|p| p.file_name())
            .ok_or_else(|| DecodeError::NoParent(path.to_path_buf()))?;
        let z = slab_dir.to_str()
            .and_then(parse_slab_dir_name)
            .ok_or_else(|| DecodeError::BadSlabDir(path.to_path_buf()))?;

        return Ok(Self::new(path.to_path_buf(), y, z, num_blocks));
    }

    pub fn coord(&self) -> Vector3<u32> {
        return Vector3::from_xyz(0, self.y, self.z);
    }

    pub fn read_payload(&self) -> Result<Vec<u8>, UploadError> {
        fs::read(&self.path).map_err(|e| UploadError::Read(self.path.clone(), e))
    }
}

/// Parses a run of ASCII digits as a base-10 integer.
/// Signs, whitespace and empty groups are rejected, leading zeros are fine.
/// * `what` - name of the field, used in the error
/// * `s` - the digit group
fn parse_digits<T: Num>(what: &'static str, s: &str) -> Result<T, DecodeError> {
    if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::InvalidDigits(what, s.to_string()));
    }
    T::from_str_radix(s, 10).map_err(|_| DecodeError::InvalidDigits(what, s.to_string()))
}

/// Returns z for a directory named `<digits>.z`, otherwise `None`.
pub fn parse_slab_dir_name(name: &str) -> Option<u32> {
    let digits = name.strip_suffix(SLAB_DIR_SUFFIX)?;
    parse_digits("z", digits).ok()
}

/// Splits a `<y>-<numblocks>.blocks` file name into `(y, numblocks)`.
pub fn parse_block_file_name(name: &str) -> Result<(u32, u32), DecodeError> {
    let stem = name.strip_suffix(BLOCK_FILE_SUFFIX)
        .ok_or_else(|| DecodeError::MissingSuffix(name.to_string()))?;
    let (y, num_blocks) = stem.rsplit_once('-')
        .ok_or_else(|| DecodeError::MissingHyphen(name.to_string()))?;

    let y = parse_digits("y", y)?;
    let num_blocks = parse_digits("numblocks", num_blocks)?;
    return Ok((y, num_blocks));
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_zero_padded_path() {
        let block = BlockRef::from_path(Path::new("work/007.z/003-000042.blocks")).unwrap();
        assert_eq!((block.z, block.y, block.num_blocks), (7, 3, 42));
        assert_eq!(block.coord(), Vector3::from_xyz(0, 3, 7));
    }

    #[test]
    fn zero_block_count_is_valid() {
        assert_eq!(parse_block_file_name("5-0.blocks").unwrap(), (5, 0));
    }

    #[test]
    fn slab_dir_names() {
        assert_eq!(parse_slab_dir_name("007.z"), Some(7));
        assert_eq!(parse_slab_dir_name("0.z"), Some(0));
        assert_eq!(parse_slab_dir_name(".z"), None);
        assert_eq!(parse_slab_dir_name("7.zz"), None);
        assert_eq!(parse_slab_dir_name("+7.z"), None);
        assert_eq!(parse_slab_dir_name("a7.z"), None);
        assert_eq!(parse_slab_dir_name("99999999999.z"), None);
    }

    #[test]
    fn rejects_malformed_file_names() {
        assert!(matches!(parse_block_file_name("3-42.bin"), Err(DecodeError::MissingSuffix(_))));
        assert!(matches!(parse_block_file_name("342.blocks"), Err(DecodeError::MissingHyphen(_))));
        assert!(matches!(parse_block_file_name("-42.blocks"), Err(DecodeError::InvalidDigits("y", _))));
        assert!(matches!(parse_block_file_name("3-.blocks"), Err(DecodeError::InvalidDigits("numblocks", _))));
        assert!(matches!(parse_block_file_name("3-1-2.blocks"), Err(DecodeError::InvalidDigits("y", _))));
    }

    #[test]
    fn path_without_file_name_is_reported_as_such() {
        let err = BlockRef::from_path(Path::new("007.z/..")).unwrap_err();
        assert!(matches!(err, DecodeError::NoFileName(_)));

        let err = BlockRef::from_path(Path::new("3-42.blocks")).unwrap_err();
        assert!(matches!(err, DecodeError::NoParent(_)));
    }

    #[test]
    fn rejects_file_outside_slab_dir() {
        let err = BlockRef::from_path(Path::new("misc/3-42.blocks")).unwrap_err();
        assert!(matches!(err, DecodeError::BadSlabDir(_)));
    }
}
