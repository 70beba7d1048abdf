// crates/cf_io/src/lib.rs

//! ChannelFlow IO 层
//!
//! 负责模拟输出的落盘与可视化刷新：
//!
//! - [`folders`]: 运行目录 `<folder>/data/<n>/{Stats,HDF5}` 的创建
//! - [`records`]: 快照与平均统计量的可序列化记录
//! - [`sink`]: `SnapshotSink` 持久化接口及 JSON 文件、内存两种实现
//! - [`render`]: `PlotRenderer` 可视化刷新接口
//! - [`error`]: IO 错误类型
//!
//! 文件格式对物理层不透明：物理层只提交"采样后的场 + 时间步"。

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod folders;
pub mod records;
pub mod render;
pub mod sink;

pub use error::{IoError, IoResult};
pub use folders::RunFolders;
pub use records::{FieldSnapshot, GridDescriptor, MeanStatistics};
pub use render::{LogRenderer, PlotFrame, PlotRenderer};
pub use sink::{snapshot_file_name, statistics_file_name, JsonFileSink, MemorySink, SnapshotSink};
