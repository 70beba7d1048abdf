// crates/cf_physics/src/output/mod.rs

//! 模拟输出
//!
//! - [`probes`]: 规则网格探针与体采样缓冲区
//! - [`statistics`]: 槽道平均统计量
//! - [`emitter`]: 按时间步间隔写出统计量、快照并刷新渲染

pub mod emitter;
pub mod probes;
pub mod statistics;

pub use emitter::{EmitReport, OutputCadence, StatisticsEmitter, ENSTROPHY, Q_CRITERION};
pub use probes::{SamplingGrid, VolumeSampler, PROBE_INSET};
pub use statistics::ChannelStatistics;
