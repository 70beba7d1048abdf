// crates/cf_io/src/folders.rs

//! 运行目录管理
//!
//! 每次冷启动在 `<folder>/data/` 下新建一个编号目录（已有最大编号 + 1），
//! 其中 `Stats/` 存放平均统计量，`HDF5/` 存放三维快照。

use std::path::{Path, PathBuf};

use crate::error::{IoError, IoResult};

/// 统计量子目录名
pub const STATS_DIR: &str = "Stats";
/// 快照子目录名
pub const SNAPSHOT_DIR: &str = "HDF5";

/// 一次运行的输出目录
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunFolders {
    run_dir: PathBuf,
    stats_dir: PathBuf,
    snapshot_dir: PathBuf,
}

impl RunFolders {
    /// 在 `base/data/` 下创建下一个编号的运行目录
    pub fn create(base: &Path) -> IoResult<Self> {
        let data_dir = base.join("data");
        std::fs::create_dir_all(&data_dir)?;

        let next = next_run_index(&data_dir)?;
        let folders = Self::at(data_dir.join(next.to_string()));
        folders.ensure()?;

        log::info!("新建运行目录: {}", folders.run_dir.display());
        Ok(folders)
    }

    /// 使用已有的运行目录（续算时沿用）
    pub fn open(run_dir: &Path) -> IoResult<Self> {
        if !run_dir.is_dir() {
            return Err(IoError::InvalidFolder {
                path: run_dir.to_path_buf(),
                reason: "目录不存在".into(),
            });
        }
        let folders = Self::at(run_dir.to_path_buf());
        folders.ensure()?;
        Ok(folders)
    }

    fn at(run_dir: PathBuf) -> Self {
        Self {
            stats_dir: run_dir.join(STATS_DIR),
            snapshot_dir: run_dir.join(SNAPSHOT_DIR),
            run_dir,
        }
    }

    fn ensure(&self) -> IoResult<()> {
        std::fs::create_dir_all(&self.stats_dir)?;
        std::fs::create_dir_all(&self.snapshot_dir)?;
        Ok(())
    }

    /// 运行目录
    pub fn run_dir(&self) -> &Path {
        &self.run_dir
    }

    /// 统计量目录
    pub fn stats_dir(&self) -> &Path {
        &self.stats_dir
    }

    /// 快照目录
    pub fn snapshot_dir(&self) -> &Path {
        &self.snapshot_dir
    }
}

/// 扫描已有的数字目录，返回下一个编号（从 1 开始）
fn next_run_index(data_dir: &Path) -> IoResult<u32> {
    let mut max_index = 0u32;
    for entry in std::fs::read_dir(data_dir)? {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        if let Some(index) = entry.file_name().to_str().and_then(|s| s.parse::<u32>().ok()) {
            max_index = max_index.max(index);
        }
    }
    Ok(max_index + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_numbers_runs() {
        let tmp = tempfile::tempdir().unwrap();

        let first = RunFolders::create(tmp.path()).unwrap();
        assert_eq!(first.run_dir(), tmp.path().join("data").join("1"));
        assert!(first.stats_dir().is_dir());
        assert!(first.snapshot_dir().is_dir());

        let second = RunFolders::create(tmp.path()).unwrap();
        assert_eq!(second.run_dir(), tmp.path().join("data").join("2"));
    }

    #[test]
    fn test_create_skips_non_numeric() {
        let tmp = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(tmp.path().join("data").join("7")).unwrap();
        std::fs::create_dir_all(tmp.path().join("data").join("notes")).unwrap();

        let run = RunFolders::create(tmp.path()).unwrap();
        assert_eq!(run.run_dir(), tmp.path().join("data").join("8"));
    }

    #[test]
    fn test_open_missing_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let result = RunFolders::open(&tmp.path().join("missing"));
        assert!(matches!(result, Err(IoError::InvalidFolder { .. })));
    }
}
