// crates/cf_io/src/sink.rs

//! 快照持久化接口
//!
//! 提供 `SnapshotSink` 抽象和两种实现：
//! - [`JsonFileSink`]: 写入运行目录下的 JSON 文件
//! - [`MemorySink`]: 保存在内存中，便于检查输出序列

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::{IoError, IoResult};
use crate::folders::RunFolders;
use crate::records::{FieldSnapshot, MeanStatistics};

/// 平均统计量文件名
pub fn statistics_file_name(step: u64) -> String {
    format!("dump_mean_{step}.json")
}

/// 快照文件名
pub fn snapshot_file_name(name: &str, step: u64) -> String {
    format!("snapshot_{name}_{step}.json")
}

/// 快照持久化接口
///
/// 每次调用都是阻塞的；返回写入位置用于日志。
pub trait SnapshotSink {
    /// 写出平均统计量
    fn write_statistics(&mut self, stats: &MeanStatistics) -> IoResult<PathBuf>;

    /// 写出单个物理量快照
    fn write_snapshot(&mut self, snapshot: &FieldSnapshot) -> IoResult<PathBuf>;
}

/// JSON 文件输出
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    folders: RunFolders,
    pretty: bool,
}

impl JsonFileSink {
    /// 绑定运行目录
    pub fn new(folders: RunFolders) -> Self {
        Self {
            folders,
            pretty: false,
        }
    }

    /// 使用缩进格式（便于人工检查，文件更大）
    pub fn pretty(mut self) -> Self {
        self.pretty = true;
        self
    }

    /// 运行目录
    pub fn folders(&self) -> &RunFolders {
        &self.folders
    }

    fn write_json<T: Serialize>(&self, path: &Path, value: &T) -> IoResult<()> {
        let mut writer = BufWriter::new(File::create(path)?);
        let result = if self.pretty {
            serde_json::to_writer_pretty(&mut writer, value)
        } else {
            serde_json::to_writer(&mut writer, value)
        };
        result.map_err(|e| IoError::Serialization {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        writer.flush()?;
        Ok(())
    }
}

impl SnapshotSink for JsonFileSink {
    fn write_statistics(&mut self, stats: &MeanStatistics) -> IoResult<PathBuf> {
        let path = self.folders.stats_dir().join(statistics_file_name(stats.step));
        self.write_json(&path, stats)?;
        log::debug!("统计量写出: {}", path.display());
        Ok(path)
    }

    fn write_snapshot(&mut self, snapshot: &FieldSnapshot) -> IoResult<PathBuf> {
        let path = self
            .folders
            .snapshot_dir()
            .join(snapshot_file_name(&snapshot.name, snapshot.step));
        self.write_json(&path, snapshot)?;
        log::debug!("快照写出: {}", path.display());
        Ok(path)
    }
}

/// 内存输出
#[derive(Debug, Default, Clone)]
pub struct MemorySink {
    /// 已写出的统计量
    pub statistics: Vec<MeanStatistics>,
    /// 已写出的快照
    pub snapshots: Vec<FieldSnapshot>,
}

impl MemorySink {
    /// 创建空的内存输出
    pub fn new() -> Self {
        Self::default()
    }

    /// 指定时间步的全部快照名称（按写出顺序）
    pub fn snapshot_names(&self, step: u64) -> Vec<&str> {
        self.snapshots
            .iter()
            .filter(|s| s.step == step)
            .map(|s| s.name.as_str())
            .collect()
    }
}

impl SnapshotSink for MemorySink {
    fn write_statistics(&mut self, stats: &MeanStatistics) -> IoResult<PathBuf> {
        self.statistics.push(stats.clone());
        Ok(PathBuf::from(statistics_file_name(stats.step)))
    }

    fn write_snapshot(&mut self, snapshot: &FieldSnapshot) -> IoResult<PathBuf> {
        self.snapshots.push(snapshot.clone());
        Ok(PathBuf::from(snapshot_file_name(&snapshot.name, snapshot.step)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::GridDescriptor;

    fn sample_snapshot(name: &str, step: u64) -> FieldSnapshot {
        FieldSnapshot {
            name: name.to_string(),
            step,
            grid: GridDescriptor {
                dims: [2, 1, 1],
                origin: [0.0; 3],
                spans: [1.0, 0.0, 0.0],
            },
            values: vec![0.5, f64::NAN],
        }
    }

    #[test]
    fn test_file_names() {
        assert_eq!(statistics_file_name(20), "dump_mean_20.json");
        assert_eq!(snapshot_file_name("enstrophy", 10), "snapshot_enstrophy_10.json");
    }

    #[test]
    fn test_json_sink_layout() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = RunFolders::create(tmp.path()).unwrap();
        let mut sink = JsonFileSink::new(folders.clone());

        let path = sink.write_snapshot(&sample_snapshot("u0", 10)).unwrap();
        assert_eq!(path, folders.snapshot_dir().join("snapshot_u0_10.json"));
        assert!(path.is_file());

        let stats = MeanStatistics {
            step: 10,
            samples: 1,
            y: vec![-0.5, 0.5],
            mean: vec![[0.1, 0.0, 0.0]; 2],
            second_moments: vec![[0.0; 6]; 2],
        };
        let path = sink.write_statistics(&stats).unwrap();
        assert_eq!(path, folders.stats_dir().join("dump_mean_10.json"));

        let text = std::fs::read_to_string(&path).unwrap();
        let parsed: MeanStatistics = serde_json::from_str(&text).unwrap();
        assert_eq!(parsed, stats);
    }

    #[test]
    fn test_nan_written_as_null() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = RunFolders::create(tmp.path()).unwrap();
        let mut sink = JsonFileSink::new(folders);

        let path = sink.write_snapshot(&sample_snapshot("Q", 20)).unwrap();
        let text = std::fs::read_to_string(path).unwrap();
        assert!(text.contains("null"));
    }

    /// 写满的设备必须报错，而不是在缓冲区析构时静默丢失
    #[cfg(target_os = "linux")]
    #[test]
    fn test_write_failure_propagates() {
        let tmp = tempfile::tempdir().unwrap();
        let folders = RunFolders::create(tmp.path()).unwrap();
        let target = folders.stats_dir().join(statistics_file_name(10));
        std::os::unix::fs::symlink("/dev/full", &target).unwrap();

        let mut sink = JsonFileSink::new(folders);
        let stats = MeanStatistics {
            step: 10,
            samples: 1,
            y: vec![0.0],
            mean: vec![[0.0; 3]],
            second_moments: vec![[0.0; 6]],
        };
        let err = sink.write_statistics(&stats).unwrap_err();
        assert!(matches!(err, IoError::Io(_) | IoError::Serialization { .. }));
    }

    #[test]
    fn test_memory_sink_order() {
        let mut sink = MemorySink::new();
        sink.write_snapshot(&sample_snapshot("u0", 10)).unwrap();
        sink.write_snapshot(&sample_snapshot("u1", 10)).unwrap();
        sink.write_snapshot(&sample_snapshot("u0", 20)).unwrap();
        assert_eq!(sink.snapshot_names(10), vec!["u0", "u1"]);
        assert_eq!(sink.snapshot_names(20), vec!["u0"]);
    }
}
