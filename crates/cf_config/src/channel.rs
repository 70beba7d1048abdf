// crates/cf_config/src/channel.rs

//! ChannelConfig - 槽道湍流算例配置
//!
//! 所有数值使用 f64，支持 JSON 序列化。每个字段都有默认值，
//! 因此配置文件只需写出需要覆盖的部分。
//!
//! 默认值对应 Re_τ = 395 的经典槽道算例：
//! 计算域 2π × 2 × π，网格 25 × 19 × 19。

use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use std::path::{Path, PathBuf};

use crate::error::ConfigError;

/// 槽道算例配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelConfig {
    /// 物理参数
    #[serde(default)]
    pub physics: PhysicsConfig,

    /// 计算域几何
    #[serde(default)]
    pub geometry: ChannelGeometry,

    /// 时间推进参数
    #[serde(default)]
    pub time: TimeConfig,

    /// 线性求解器选项
    #[serde(default)]
    pub solver: SolverOptions,

    /// 输出配置
    #[serde(default)]
    pub output: OutputConfig,

    /// 续算目录；为 `None` 时从湍流初始场冷启动
    #[serde(default)]
    pub restart_folder: Option<PathBuf>,
}

/// 物理参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhysicsConfig {
    /// 运动粘度 ν
    #[serde(default = "default_nu")]
    pub nu: f64,

    /// 摩擦雷诺数 Re_τ
    #[serde(default = "default_re_tau")]
    pub re_tau: f64,
}

fn default_nu() -> f64 { 2.0e-5 }
fn default_re_tau() -> f64 { 395.0 }

impl Default for PhysicsConfig {
    fn default() -> Self {
        Self {
            nu: default_nu(),
            re_tau: default_re_tau(),
        }
    }
}

/// 计算域几何
///
/// 流向 x ∈ [0, Lx]，壁面法向 y ∈ [−Ly/2, Ly/2]，展向 z ∈ [−Lz/2, Lz/2]。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChannelGeometry {
    /// 流向长度 Lx
    #[serde(default = "default_lx")]
    pub lx: f64,
    /// 槽道全高 Ly
    #[serde(default = "default_ly")]
    pub ly: f64,
    /// 展向宽度 Lz
    #[serde(default = "default_lz")]
    pub lz: f64,
    /// 流向单元数
    #[serde(default = "default_nx")]
    pub nx: usize,
    /// 法向单元数
    #[serde(default = "default_ny")]
    pub ny: usize,
    /// 展向单元数
    #[serde(default = "default_nz")]
    pub nz: usize,
}

fn default_lx() -> f64 { 2.0 * PI }
fn default_ly() -> f64 { 2.0 }
fn default_lz() -> f64 { PI }
fn default_nx() -> usize { 25 }
fn default_ny() -> usize { 19 }
fn default_nz() -> usize { 19 }

impl Default for ChannelGeometry {
    fn default() -> Self {
        Self {
            lx: default_lx(),
            ly: default_ly(),
            lz: default_lz(),
            nx: default_nx(),
            ny: default_ny(),
            nz: default_nz(),
        }
    }
}

impl ChannelGeometry {
    /// 创建指定尺寸与分辨率的几何
    pub fn new(lengths: [f64; 3], cells: [usize; 3]) -> Self {
        Self {
            lx: lengths[0],
            ly: lengths[1],
            lz: lengths[2],
            nx: cells[0],
            ny: cells[1],
            nz: cells[2],
        }
    }

    /// 计算域下角点
    pub fn lower(&self) -> [f64; 3] {
        [0.0, -self.ly / 2.0, -self.lz / 2.0]
    }

    /// 计算域上角点
    pub fn upper(&self) -> [f64; 3] {
        [self.lx, self.ly / 2.0, self.lz / 2.0]
    }
}

/// 时间推进参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeConfig {
    /// 总模拟时间 T
    #[serde(default = "default_t_end")]
    pub t_end: f64,
    /// 时间步长 dt
    #[serde(default = "default_dt")]
    pub dt: f64,
}

fn default_t_end() -> f64 { 1.0 }
fn default_dt() -> f64 { 0.05 }

impl Default for TimeConfig {
    fn default() -> Self {
        Self {
            t_end: default_t_end(),
            dt: default_dt(),
        }
    }
}

/// 线性求解器选项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolverOptions {
    /// 使用 Krylov 迭代求解器；否则使用 LU 直接求解
    #[serde(default = "default_true")]
    pub use_krylov_solvers: bool,

    /// 质量矩阵集中（lumping）
    ///
    /// 速度阶数大于 1 时被强制关闭，见 [`ChannelConfig::use_lumping`]。
    #[serde(default)]
    pub use_lumping_of_mass_matrix: bool,

    /// 速度有限元阶数
    #[serde(default = "default_velocity_degree")]
    pub velocity_degree: u32,
}

fn default_true() -> bool { true }
fn default_velocity_degree() -> u32 { 2 }

impl Default for SolverOptions {
    fn default() -> Self {
        Self {
            use_krylov_solvers: default_true(),
            use_lumping_of_mass_matrix: false,
            velocity_degree: default_velocity_degree(),
        }
    }
}

/// 输出配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// 结果根目录
    #[serde(default = "default_folder")]
    pub folder: PathBuf,

    /// 统计量累积间隔（时间步）
    #[serde(default = "default_cadence")]
    pub update_statistics: u64,

    /// 统计量与三维快照写出间隔（时间步）
    #[serde(default = "default_cadence")]
    pub check_save_h5: u64,
}

fn default_folder() -> PathBuf { PathBuf::from("channel_results") }
fn default_cadence() -> u64 { 10 }

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            folder: default_folder(),
            update_statistics: default_cadence(),
            check_save_h5: default_cadence(),
        }
    }
}

impl Default for ChannelConfig {
    fn default() -> Self {
        Self {
            physics: PhysicsConfig::default(),
            geometry: ChannelGeometry::default(),
            time: TimeConfig::default(),
            solver: SolverOptions::default(),
            output: OutputConfig::default(),
            restart_folder: None,
        }
    }
}

impl ChannelConfig {
    /// 从 JSON 文件加载配置并校验
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path.as_ref())?;
        let config: ChannelConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// 保存配置到 JSON 文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let content =
            serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// 验证配置有效性
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.physics.nu > 0.0) {
            return Err(ConfigError::invalid("physics.nu", self.physics.nu, "粘度必须为正"));
        }
        if !(self.physics.re_tau > 0.0) {
            return Err(ConfigError::invalid(
                "physics.re_tau",
                self.physics.re_tau,
                "摩擦雷诺数必须为正",
            ));
        }

        let g = &self.geometry;
        for (key, value) in [("geometry.lx", g.lx), ("geometry.ly", g.ly), ("geometry.lz", g.lz)] {
            if !(value > 0.0) {
                return Err(ConfigError::invalid(key, value, "长度必须为正"));
            }
        }
        for (key, value) in [("geometry.nx", g.nx), ("geometry.ny", g.ny), ("geometry.nz", g.nz)] {
            if value == 0 {
                return Err(ConfigError::invalid(key, value, "单元数至少为 1"));
            }
        }

        if !(self.time.dt > 0.0) {
            return Err(ConfigError::invalid("time.dt", self.time.dt, "时间步长必须为正"));
        }
        if self.time.t_end < 0.0 {
            return Err(ConfigError::invalid("time.t_end", self.time.t_end, "结束时间不能为负"));
        }

        if self.solver.velocity_degree == 0 {
            return Err(ConfigError::invalid(
                "solver.velocity_degree",
                self.solver.velocity_degree,
                "速度阶数至少为 1",
            ));
        }

        if self.output.update_statistics == 0 {
            return Err(ConfigError::invalid(
                "output.update_statistics",
                self.output.update_statistics,
                "间隔至少为 1",
            ));
        }
        if self.output.check_save_h5 == 0 {
            return Err(ConfigError::invalid(
                "output.check_save_h5",
                self.output.check_save_h5,
                "间隔至少为 1",
            ));
        }

        Ok(())
    }

    /// 摩擦速度 u_τ = ν · Re_τ
    #[inline]
    pub fn u_tau(&self) -> f64 {
        self.physics.nu * self.physics.re_tau
    }

    /// 驱动槽道流动的体积力 f = (u_τ², 0, 0)
    pub fn body_force(&self) -> [f64; 3] {
        let u_tau = self.u_tau();
        [u_tau * u_tau, 0.0, 0.0]
    }

    /// 实际生效的质量集中开关
    ///
    /// 速度阶数大于 1 时集中无效，直接返回 false，不产生任何提示。
    pub fn use_lumping(&self) -> bool {
        if self.solver.velocity_degree > 1 {
            return false;
        }
        self.solver.use_lumping_of_mass_matrix
    }

    /// 是否为续算
    #[inline]
    pub fn is_restart(&self) -> bool {
        self.restart_folder.is_some()
    }

    /// 时间步总数
    ///
    /// 与 `while t < T - tstep·eps` 的推进循环一致。
    pub fn n_steps(&self) -> u64 {
        let ratio = self.time.t_end / self.time.dt;
        (ratio - 1e-9).ceil().max(0.0) as u64
    }
}
