// crates/cf_physics/src/output/emitter.rs

//! 统计量与快照输出
//!
//! 每个时间步结束时调用 [`StatisticsEmitter::on_step_end`]：
//!
//! 1. `step % update_statistics == 0`：累积 u0、u1、u2
//! 2. `step % check_save_h5 == 0`：
//!    - 写出平均统计量
//!    - u0、u1、u2、enstrophy、Q 依次采样、写出、清空缓冲区
//!    - 刷新可视化速度缓冲区，依次触发压力与速度渲染

use std::path::PathBuf;

use cf_config::ChannelConfig;
use cf_io::{PlotFrame, PlotRenderer, SnapshotSink};
use serde::{Deserialize, Serialize};

use super::probes::{SamplingGrid, VolumeSampler};
use super::statistics::ChannelStatistics;
use crate::error::{PhysicsError, PhysicsResult};
use crate::fields::{FlowFields, ScalarField, VelocityComponent};
use crate::space::FunctionSpace;

/// 涡量拟能快照名
pub const ENSTROPHY: &str = "enstrophy";
/// Q 不变量快照名
pub const Q_CRITERION: &str = "Q";

/// 输出间隔
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputCadence {
    /// 统计累积间隔
    pub update_statistics: u64,
    /// 写出间隔
    pub check_save_h5: u64,
}

impl OutputCadence {
    /// 由配置创建
    pub fn from_config(config: &ChannelConfig) -> Self {
        Self {
            update_statistics: config.output.update_statistics,
            check_save_h5: config.output.check_save_h5,
        }
    }

    /// 本步是否累积
    #[inline]
    pub fn accumulates(&self, step: u64) -> bool {
        self.update_statistics > 0 && step % self.update_statistics == 0
    }

    /// 本步是否写出
    #[inline]
    pub fn saves(&self, step: u64) -> bool {
        self.check_save_h5 > 0 && step % self.check_save_h5 == 0
    }
}

/// 单步输出报告
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitReport {
    /// 是否累积了统计量
    pub accumulated: bool,
    /// 统计量文件
    pub statistics: Option<PathBuf>,
    /// 快照文件（按写出顺序）
    pub snapshots: Vec<PathBuf>,
    /// 是否刷新了渲染
    pub plotted: bool,
}

/// 统计量与快照输出器
pub struct StatisticsEmitter<K: SnapshotSink> {
    cadence: OutputCadence,
    sampler: VolumeSampler,
    statistics: ChannelStatistics,
    sink: K,
    velocity_plot: Box<dyn PlotRenderer>,
    pressure_plot: Box<dyn PlotRenderer>,
    visualization: Option<Vec<f64>>,
}

impl<K: SnapshotSink> std::fmt::Debug for StatisticsEmitter<K> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StatisticsEmitter")
            .field("cadence", &self.cadence)
            .field("samples", &self.statistics.samples())
            .field("velocity_plot", &self.velocity_plot.name())
            .field("pressure_plot", &self.pressure_plot.name())
            .finish()
    }
}

impl<K: SnapshotSink> StatisticsEmitter<K> {
    /// 由配置创建
    pub fn new(
        config: &ChannelConfig,
        sink: K,
        velocity_plot: Box<dyn PlotRenderer>,
        pressure_plot: Box<dyn PlotRenderer>,
    ) -> Self {
        Self {
            cadence: OutputCadence::from_config(config),
            sampler: VolumeSampler::new(SamplingGrid::visualization(&config.geometry)),
            statistics: ChannelStatistics::new(SamplingGrid::statistics(&config.geometry)),
            sink,
            velocity_plot,
            pressure_plot,
            visualization: None,
        }
    }

    /// 输出间隔
    pub fn cadence(&self) -> OutputCadence {
        self.cadence
    }

    /// 采样器
    pub fn sampler(&self) -> &VolumeSampler {
        &self.sampler
    }

    /// 统计累积器
    pub fn statistics(&self) -> &ChannelStatistics {
        &self.statistics
    }

    /// 输出端
    pub fn sink(&self) -> &K {
        &self.sink
    }

    /// 取回输出端
    pub fn into_sink(self) -> K {
        self.sink
    }

    /// 可视化速度缓冲区（交错存储）
    pub fn visualization(&self) -> Option<&[f64]> {
        self.visualization.as_deref()
    }

    /// 创建可视化缓冲区；须在第一个时间步之前调用
    pub fn prepare_visualization(&mut self, n_dofs: usize) {
        self.visualization = Some(vec![0.0; 3 * n_dofs]);
    }

    /// 时间步结束
    pub fn on_step_end<S: FunctionSpace + ?Sized>(
        &mut self,
        step: u64,
        space: &S,
        fields: &FlowFields,
    ) -> PhysicsResult<EmitReport> {
        let mut report = EmitReport::default();
        let velocity = fields.velocity.current();

        if self.cadence.accumulates(step) {
            self.statistics.accumulate(space, velocity)?;
            report.accumulated = true;
        }

        if !self.cadence.saves(step) {
            return Ok(report);
        }

        let profile = self.statistics.mean_profile(step);
        report.statistics = Some(self.sink.write_statistics(&profile)?);

        for component in VelocityComponent::ALL {
            let field = velocity.component(component);
            let path = self.persist(space, component.name(), step, field)?;
            report.snapshots.push(path);
        }

        let enstrophy = space.enstrophy(velocity)?;
        report.snapshots.push(self.persist(space, ENSTROPHY, step, &enstrophy)?);

        // Q 不变量 = ½ QC
        let mut q = space.q_criterion(velocity)?;
        q.scale(0.5);
        report.snapshots.push(self.persist(space, Q_CRITERION, step, &q)?);

        let n_dofs = space.n_dofs();
        let buffer = self.visualization.as_mut().ok_or_else(|| {
            PhysicsError::Lifecycle("可视化缓冲区未创建，pre_solve 未调用".into())
        })?;
        PhysicsError::check_size("visualization", 3 * n_dofs, buffer.len())?;
        buffer.copy_from_slice(&velocity.interleaved());

        self.pressure_plot.plot(&PlotFrame {
            quantity: "pressure",
            step,
            components: 1,
            values: fields.pressure.values(),
        })?;
        self.velocity_plot.plot(&PlotFrame {
            quantity: "velocity",
            step,
            components: 3,
            values: buffer.as_slice(),
        })?;
        report.plotted = true;

        log::info!(
            "步 {}: 统计量已写出（累积 {} 次），快照 {} 个",
            step,
            self.statistics.samples(),
            report.snapshots.len()
        );
        Ok(report)
    }

    /// 采样、写出并清空缓冲区
    fn persist<S: FunctionSpace + ?Sized>(
        &mut self,
        space: &S,
        name: &str,
        step: u64,
        field: &ScalarField,
    ) -> PhysicsResult<PathBuf> {
        self.sampler.sample(space, field)?;
        let written = self.sink.write_snapshot(&self.sampler.snapshot(name, step));
        self.sampler.clear();
        Ok(written?)
    }
}
