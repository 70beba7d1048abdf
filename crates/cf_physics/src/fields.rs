// crates/cf_physics/src/fields.rs

//! 场数据容器
//!
//! 以自由度为下标的节点值数组。外部 Navier–Stokes 引擎拥有这些场，
//! 本 crate 只通过钩子参数读写它们：
//!
//! - [`ScalarField`]: 标量场（一个速度分量、压力、涡量拟能等）
//! - [`VectorField`]: 三分量矢量场
//! - [`VelocityHistory`]: 当前步与两个历史步的速度（q_、q_1、q_2）
//! - [`FlowFields`]: 速度历史 + 压力

use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};

// ============================================================
// 场名称
// ============================================================

/// 速度分量
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum VelocityComponent {
    /// 流向分量
    U0,
    /// 壁面法向分量
    U1,
    /// 展向分量
    U2,
}

impl VelocityComponent {
    /// 全部分量，按求解顺序
    pub const ALL: [VelocityComponent; 3] = [Self::U0, Self::U1, Self::U2];

    /// 分量下标
    #[inline]
    pub fn index(self) -> usize {
        match self {
            Self::U0 => 0,
            Self::U1 => 1,
            Self::U2 => 2,
        }
    }

    /// 分量名称
    pub fn name(self) -> &'static str {
        match self {
            Self::U0 => "u0",
            Self::U1 => "u1",
            Self::U2 => "u2",
        }
    }
}

impl std::fmt::Display for VelocityComponent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// 需要边界条件的系统分量（u0、u1、u2、p）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum FieldName {
    /// 速度分量
    Velocity(VelocityComponent),
    /// 压力
    Pressure,
}

impl FieldName {
    /// 全部系统分量
    pub const ALL: [FieldName; 4] = [
        Self::Velocity(VelocityComponent::U0),
        Self::Velocity(VelocityComponent::U1),
        Self::Velocity(VelocityComponent::U2),
        Self::Pressure,
    ];

    /// 名称
    pub fn name(self) -> &'static str {
        match self {
            Self::Velocity(c) => c.name(),
            Self::Pressure => "p",
        }
    }
}

impl std::fmt::Display for FieldName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================
// 标量场 / 矢量场
// ============================================================

/// 标量场
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ScalarField {
    values: Vec<f64>,
}

impl ScalarField {
    /// 零场
    pub fn zeros(n: usize) -> Self {
        Self {
            values: vec![0.0; n],
        }
    }

    /// 从值数组创建
    pub fn from_values(values: Vec<f64>) -> Self {
        Self { values }
    }

    /// 自由度数
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 只读值
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 可写值
    #[inline]
    pub fn values_mut(&mut self) -> &mut [f64] {
        &mut self.values
    }

    /// 拷贝另一场的值（`vector()[:] = other.vector()[:]`）
    pub fn assign(&mut self, other: &ScalarField) -> PhysicsResult<()> {
        PhysicsError::check_size("assign", self.len(), other.len())?;
        self.values.copy_from_slice(&other.values);
        Ok(())
    }

    /// 逐点缩放
    pub fn scale(&mut self, a: f64) {
        for v in &mut self.values {
            *v *= a;
        }
    }
}

/// 三分量矢量场
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VectorField {
    components: [ScalarField; 3],
}

impl VectorField {
    /// 零场
    pub fn zeros(n: usize) -> Self {
        Self {
            components: [ScalarField::zeros(n), ScalarField::zeros(n), ScalarField::zeros(n)],
        }
    }

    /// 从三个分量创建
    pub fn from_components(components: [ScalarField; 3]) -> PhysicsResult<Self> {
        let n = components[0].len();
        PhysicsError::check_size("component 1", n, components[1].len())?;
        PhysicsError::check_size("component 2", n, components[2].len())?;
        Ok(Self { components })
    }

    /// 每个分量的自由度数
    #[inline]
    pub fn len(&self) -> usize {
        self.components[0].len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.components[0].is_empty()
    }

    /// 分量
    #[inline]
    pub fn component(&self, c: VelocityComponent) -> &ScalarField {
        &self.components[c.index()]
    }

    /// 可写分量
    #[inline]
    pub fn component_mut(&mut self, c: VelocityComponent) -> &mut ScalarField {
        &mut self.components[c.index()]
    }

    /// 按下标访问分量
    #[inline]
    pub fn axis(&self, i: usize) -> &ScalarField {
        &self.components[i]
    }

    /// 按下标访问可写分量
    #[inline]
    pub fn axis_mut(&mut self, i: usize) -> &mut ScalarField {
        &mut self.components[i]
    }

    /// 某个自由度处的矢量值
    #[inline]
    pub fn at(&self, dof: usize) -> [f64; 3] {
        [
            self.components[0].values[dof],
            self.components[1].values[dof],
            self.components[2].values[dof],
        ]
    }

    /// 拷贝另一矢量场
    pub fn assign(&mut self, other: &VectorField) -> PhysicsResult<()> {
        for (dst, src) in self.components.iter_mut().zip(&other.components) {
            dst.assign(src)?;
        }
        Ok(())
    }

    /// 交错存储 [x0, y0, z0, x1, ...]
    pub fn interleaved(&self) -> Vec<f64> {
        let mut out = Vec::with_capacity(3 * self.len());
        for dof in 0..self.len() {
            out.extend_from_slice(&self.at(dof));
        }
        out
    }
}

// ============================================================
// 速度历史
// ============================================================

/// 速度时间层
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeLevel {
    /// 当前步 q_
    Current,
    /// 上一步 q_1
    Previous,
    /// 上上步 q_2
    BeforePrevious,
}

impl TimeLevel {
    /// 全部时间层
    pub const ALL: [TimeLevel; 3] = [Self::Current, Self::Previous, Self::BeforePrevious];
}

/// 三个时间层的速度
#[derive(Debug, Clone, PartialEq, Default)]
pub struct VelocityHistory {
    levels: [VectorField; 3],
}

impl VelocityHistory {
    /// 全零速度历史
    pub fn zeros(n: usize) -> Self {
        Self {
            levels: [VectorField::zeros(n), VectorField::zeros(n), VectorField::zeros(n)],
        }
    }

    /// 自由度数
    #[inline]
    pub fn len(&self) -> usize {
        self.levels[0].len()
    }

    /// 是否为空
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.levels[0].is_empty()
    }

    fn slot(level: TimeLevel) -> usize {
        match level {
            TimeLevel::Current => 0,
            TimeLevel::Previous => 1,
            TimeLevel::BeforePrevious => 2,
        }
    }

    /// 某个时间层
    #[inline]
    pub fn level(&self, level: TimeLevel) -> &VectorField {
        &self.levels[Self::slot(level)]
    }

    /// 某个可写时间层
    #[inline]
    pub fn level_mut(&mut self, level: TimeLevel) -> &mut VectorField {
        &mut self.levels[Self::slot(level)]
    }

    /// 当前速度 u_
    #[inline]
    pub fn current(&self) -> &VectorField {
        &self.levels[0]
    }

    /// 可写当前速度
    #[inline]
    pub fn current_mut(&mut self) -> &mut VectorField {
        &mut self.levels[0]
    }

    /// 把当前层复制到两个历史层
    pub fn fill_history_from_current(&mut self) {
        let (current, history) = self.levels.split_at_mut(1);
        for level in history {
            level.clone_from(&current[0]);
        }
    }

    /// 步末推进历史：q_2 ← q_1 ← q_
    pub fn rotate(&mut self) {
        self.levels.swap(1, 2);
        let (current, history) = self.levels.split_at_mut(1);
        history[0].clone_from(&current[0]);
    }
}

/// 引擎对外暴露的流场
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FlowFields {
    /// 速度历史
    pub velocity: VelocityHistory,
    /// 压力
    pub pressure: ScalarField,
}

impl FlowFields {
    /// 全零流场
    pub fn zeros(n: usize) -> Self {
        Self {
            velocity: VelocityHistory::zeros(n),
            pressure: ScalarField::zeros(n),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_component_names() {
        let names: Vec<_> = FieldName::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["u0", "u1", "u2", "p"]);
        assert_eq!(VelocityComponent::U1.to_string(), "u1");
    }

    #[test]
    fn test_scale_and_assign() {
        let mut a = ScalarField::from_values(vec![1.0, 1.5]);
        a.scale(2.0);
        assert_eq!(a.values(), &[2.0, 3.0]);

        let mut c = ScalarField::zeros(2);
        c.assign(&a).unwrap();
        assert_eq!(c, a);

        let short = ScalarField::zeros(1);
        assert!(c.assign(&short).is_err());
    }

    #[test]
    fn test_fill_history() {
        let mut history = VelocityHistory::zeros(3);
        history
            .current_mut()
            .component_mut(VelocityComponent::U0)
            .values_mut()
            .copy_from_slice(&[1.0, 2.0, 3.0]);
        history.fill_history_from_current();

        for level in TimeLevel::ALL {
            assert_eq!(
                history.level(level).component(VelocityComponent::U0).values(),
                &[1.0, 2.0, 3.0]
            );
        }
    }

    #[test]
    fn test_rotate_history() {
        let mut history = VelocityHistory::zeros(1);
        history.level_mut(TimeLevel::Previous).axis_mut(0).values_mut()[0] = 1.0;
        history.current_mut().axis_mut(0).values_mut()[0] = 2.0;

        history.rotate();

        assert_eq!(history.level(TimeLevel::BeforePrevious).axis(0).values()[0], 1.0);
        assert_eq!(history.level(TimeLevel::Previous).axis(0).values()[0], 2.0);
        assert_eq!(history.current().axis(0).values()[0], 2.0);
    }

    #[test]
    fn test_interleaved() {
        let v = VectorField::from_components([
            ScalarField::from_values(vec![1.0, 4.0]),
            ScalarField::from_values(vec![2.0, 5.0]),
            ScalarField::from_values(vec![3.0, 6.0]),
        ])
        .unwrap();
        assert_eq!(v.interleaved(), vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }
}
