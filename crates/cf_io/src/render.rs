// crates/cf_io/src/render.rs

//! 可视化刷新接口
//!
//! 渲染后端不在本工作区内，这里只定义触发点。
//! [`LogRenderer`] 把每次刷新记录为一条日志摘要。

use crate::error::IoResult;

/// 一次刷新所需的数据视图
#[derive(Debug, Clone, Copy)]
pub struct PlotFrame<'a> {
    /// 物理量名称（velocity、pressure）
    pub quantity: &'a str,
    /// 时间步
    pub step: u64,
    /// 每个节点的分量数（标量 1，矢量 3）
    pub components: usize,
    /// 节点值，按节点交错存储
    pub values: &'a [f64],
}

impl PlotFrame<'_> {
    /// 节点数
    pub fn n_nodes(&self) -> usize {
        if self.components == 0 {
            0
        } else {
            self.values.len() / self.components
        }
    }

    /// 逐节点的模长范围（最小，最大）
    pub fn magnitude_range(&self) -> Option<(f64, f64)> {
        if self.components == 0 || self.values.is_empty() {
            return None;
        }
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for node in self.values.chunks(self.components) {
            let mag = if self.components == 1 {
                node[0]
            } else {
                node.iter().map(|v| v * v).sum::<f64>().sqrt()
            };
            min = min.min(mag);
            max = max.max(mag);
        }
        Some((min, max))
    }
}

/// 可视化渲染器
pub trait PlotRenderer {
    /// 渲染器名称
    fn name(&self) -> &str;

    /// 刷新显示
    fn plot(&mut self, frame: &PlotFrame<'_>) -> IoResult<()>;
}

/// 日志渲染器
#[derive(Debug, Clone)]
pub struct LogRenderer {
    name: String,
    frames: u64,
}

impl LogRenderer {
    /// 创建日志渲染器
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            frames: 0,
        }
    }

    /// 已刷新次数
    pub fn frames(&self) -> u64 {
        self.frames
    }
}

impl PlotRenderer for LogRenderer {
    fn name(&self) -> &str {
        &self.name
    }

    fn plot(&mut self, frame: &PlotFrame<'_>) -> IoResult<()> {
        self.frames += 1;
        match frame.magnitude_range() {
            Some((min, max)) => log::info!(
                "[{}] step={} {}: {} 节点, 范围 [{:.4e}, {:.4e}]",
                self.name,
                frame.step,
                frame.quantity,
                frame.n_nodes(),
                min,
                max
            ),
            None => log::info!("[{}] step={} {}: 空场", self.name, frame.step, frame.quantity),
        }
        Ok(())
    }
}
