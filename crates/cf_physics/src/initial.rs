// crates/cf_physics/src/initial.rs

//! 湍流初始场
//!
//! 冷启动时，速度 = 对数律平均剖面 + 无散随机扰动：
//!
//! 1. 每个分区用确定性种子生成均匀随机矢量场 ψ（幅值 5e-4）
//! 2. 扰动取 ∇×ψ，天然无散
//! 3. 平均流向速度 `1.25 (u_τ/κ ln(max(d, ε) u_τ/ν) + 5 u_τ)`，d 为到壁面距离
//! 4. 当前层写好后复制到两个历史层
//!
//! 续算时整个过程跳过，不修改任何场。

use cf_config::ChannelConfig;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::PhysicsResult;
use crate::fields::{VectorField, VelocityHistory};
use crate::space::FunctionSpace;

/// von Kármán 常数
pub const KAPPA: f64 = 0.41;

/// 对数自变量下限
pub const LOG_CLAMP: f64 = 1.0e-12;

/// 随机扰动幅值
pub const PERTURBATION_AMPLITUDE: f64 = 5.0e-4;

/// 随机种子基数（实际种子 = 基数 + 分区编号）
pub const SEED_BASE: u64 = 2;

/// 对数律平均速度
///
/// `wall_distance` 在取对数前被钳制到 [`LOG_CLAMP`]，壁面上也返回有限值。
#[inline]
pub fn log_law_velocity(wall_distance: f64, u_tau: f64, nu: f64) -> f64 {
    let d = wall_distance.max(LOG_CLAMP);
    1.25 * (u_tau / KAPPA * (d * u_tau / nu).ln() + 5.0 * u_tau)
}

/// 湍流初始场生成器
#[derive(Debug, Clone)]
pub struct TurbulentInitializer {
    u_tau: f64,
    nu: f64,
    half_height: f64,
    amplitude: f64,
    seed_base: u64,
}

impl TurbulentInitializer {
    /// 由算例配置创建
    pub fn new(config: &ChannelConfig) -> Self {
        Self {
            u_tau: config.u_tau(),
            nu: config.physics.nu,
            half_height: config.geometry.ly / 2.0,
            amplitude: PERTURBATION_AMPLITUDE,
            seed_base: SEED_BASE,
        }
    }

    /// 修改扰动幅值
    pub fn with_amplitude(mut self, amplitude: f64) -> Self {
        self.amplitude = amplitude;
        self
    }

    /// 扰动幅值
    pub fn amplitude(&self) -> f64 {
        self.amplitude
    }

    /// 分区种子
    pub fn seed(&self, partition: usize) -> u64 {
        self.seed_base + partition as u64
    }

    /// 随机流函数场
    pub fn random_stream_field<S: FunctionSpace + ?Sized>(&self, space: &S) -> VectorField {
        let n = space.n_dofs();
        let mut rng = StdRng::seed_from_u64(self.seed(space.partition()));
        let mut psi = VectorField::zeros(n);
        for axis in 0..3 {
            for value in psi.axis_mut(axis).values_mut() {
                *value = self.amplitude * rng.gen::<f64>();
            }
        }
        psi
    }

    /// 无散扰动 ∇×ψ
    pub fn perturbation<S: FunctionSpace + ?Sized>(&self, space: &S) -> PhysicsResult<VectorField> {
        let psi = self.random_stream_field(space);
        space.curl(&psi)
    }

    /// 平均流向速度（y 从中心线量起）
    #[inline]
    pub fn mean_velocity(&self, y: f64) -> f64 {
        log_law_velocity(self.half_height - y.abs(), self.u_tau, self.nu)
    }

    /// 初始化速度历史
    ///
    /// 返回是否实际写入了场；`restart` 为真时直接返回 `false`。
    pub fn initialize<S: FunctionSpace + ?Sized>(
        &self,
        space: &S,
        velocity: &mut VelocityHistory,
        restart: bool,
    ) -> PhysicsResult<bool> {
        if restart {
            log::info!("续算：跳过湍流初始场");
            return Ok(false);
        }
        crate::error::PhysicsError::check_size("velocity", space.n_dofs(), velocity.len())?;

        let perturbation = self.perturbation(space)?;
        let mean: Vec<f64> = (0..space.n_dofs())
            .map(|dof| self.mean_velocity(space.dof_coordinate(dof).y))
            .collect();

        let current = velocity.current_mut();
        current.assign(&perturbation)?;
        for (u, m) in current.axis_mut(0).values_mut().iter_mut().zip(&mean) {
            *u += m;
        }
        velocity.fill_history_from_current();

        log::info!(
            "湍流初始场: 分区 {} 种子 {}, 中心线速度 {:.6}",
            space.partition(),
            self.seed(space.partition()),
            self.mean_velocity(0.0)
        );
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::TimeLevel;
    use crate::space::StructuredSpace;

    fn setup() -> (ChannelConfig, StructuredSpace) {
        let mut config = ChannelConfig::default();
        config.geometry = cf_config::ChannelGeometry::new([4.0, 2.0, 2.0], [4, 4, 4]);
        let space = StructuredSpace::channel(&config.geometry).unwrap();
        (config, space)
    }

    #[test]
    fn test_log_law_clamped_at_wall() {
        let (config, _) = setup();
        let init = TurbulentInitializer::new(&config);
        let wall = init.mean_velocity(1.0);
        assert!(wall.is_finite());
        assert_eq!(wall, init.mean_velocity(-1.0));
        assert_eq!(wall, log_law_velocity(LOG_CLAMP, config.u_tau(), config.physics.nu));
        // 中心线速度最大
        assert!(init.mean_velocity(0.0) > init.mean_velocity(0.5));
    }

    #[test]
    fn test_deterministic() {
        let (config, space) = setup();
        let init = TurbulentInitializer::new(&config);

        let mut a = VelocityHistory::zeros(space.n_dofs());
        let mut b = VelocityHistory::zeros(space.n_dofs());
        assert!(init.initialize(&space, &mut a, false).unwrap());
        assert!(init.initialize(&space, &mut b, false).unwrap());
        assert_eq!(a, b);
    }

    #[test]
    fn test_partitions_differ() {
        let (config, space) = setup();
        let init = TurbulentInitializer::new(&config);
        let other = space.clone().with_partition(1);

        let psi0 = init.random_stream_field(&space);
        let psi1 = init.random_stream_field(&other);
        assert_ne!(psi0, psi1);
        assert!(psi0
            .axis(0)
            .values()
            .iter()
            .all(|&v| (0.0..PERTURBATION_AMPLITUDE).contains(&v)));
    }

    #[test]
    fn test_restart_skips() {
        let (config, space) = setup();
        let init = TurbulentInitializer::new(&config);

        let mut velocity = VelocityHistory::zeros(space.n_dofs());
        velocity.current_mut().axis_mut(1).values_mut().fill(0.25);
        let before = velocity.clone();

        assert!(!init.initialize(&space, &mut velocity, true).unwrap());
        assert_eq!(velocity, before);
    }

    #[test]
    fn test_history_matches_current() {
        let (config, space) = setup();
        let init = TurbulentInitializer::new(&config);
        let mut velocity = VelocityHistory::zeros(space.n_dofs());
        init.initialize(&space, &mut velocity, false).unwrap();

        assert_eq!(velocity.level(TimeLevel::Previous), velocity.current());
        assert_eq!(velocity.level(TimeLevel::BeforePrevious), velocity.current());
    }

    #[test]
    fn test_zero_amplitude_gives_pure_profile() {
        let (config, space) = setup();
        let init = TurbulentInitializer::new(&config).with_amplitude(0.0);
        let mut velocity = VelocityHistory::zeros(space.n_dofs());
        init.initialize(&space, &mut velocity, false).unwrap();

        for dof in 0..space.n_dofs() {
            let y = space.dof_coordinate(dof).y;
            assert_eq!(velocity.current().axis(0).values()[dof], init.mean_velocity(y));
            assert_eq!(velocity.current().axis(1).values()[dof], 0.0);
        }
    }
}
