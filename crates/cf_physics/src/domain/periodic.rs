// crates/cf_physics/src/domain/periodic.rs

//! 双周期映射
//!
//! 低面（x = 0、z = −Lz/2）为主面，高面（x = Lx、z = +Lz/2）为从面。
//! 同时落在两个高面上的棱（角点）必须一次减去 (Lx, 0, Lz)，
//! 不能拆成两次单方向映射，否则会映射到另一个从面上。

use cf_config::ChannelGeometry;
use cf_foundation::DVec3;
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};
use crate::space::FunctionSpace;

/// 非从点的映射结果，位于计算域之外
pub const OUT_OF_DOMAIN: DVec3 = DVec3::new(-1000.0, -1000.0, -1000.0);

/// 周期偏移类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PeriodicOffset {
    /// 仅流向：−Lx ê₁
    X,
    /// 仅展向：−Lz ê₃
    Z,
    /// 角点：−Lx ê₁ − Lz ê₃
    XZ,
}

/// 点的周期角色
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeriodicRole {
    /// 主点
    Master,
    /// 从点及其偏移
    Slave(PeriodicOffset),
    /// 不参与周期约束
    None,
}

/// 双周期子域
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeriodicDomain {
    lx: f64,
    lz: f64,
}

impl PeriodicDomain {
    /// 由槽道几何创建
    pub fn new(geometry: &ChannelGeometry) -> Self {
        Self::with_lengths(geometry.lx, geometry.lz)
    }

    /// 直接指定周期长度
    pub fn with_lengths(lx: f64, lz: f64) -> Self {
        Self { lx, lz }
    }

    #[inline]
    fn near(&self, a: f64, b: f64) -> bool {
        cf_foundation::near(a, b)
    }

    #[inline]
    fn on_high_x(&self, x: DVec3) -> bool {
        self.near(x.x, self.lx)
    }

    #[inline]
    fn on_high_z(&self, x: DVec3) -> bool {
        self.near(x.z, self.lz / 2.0)
    }

    /// 是否属于主面
    ///
    /// 在低面上，且不在任何高面上（排除低 x 与高 z 相交的棱等）。
    pub fn inside(&self, x: DVec3, on_boundary: bool) -> bool {
        let on_low = self.near(x.x, 0.0) || self.near(x.z, -self.lz / 2.0);
        let on_high = self.on_high_x(x) || self.on_high_z(x);
        on_low && !on_high && on_boundary
    }

    /// 从点的偏移类型
    pub fn offset_of(&self, x: DVec3) -> Option<PeriodicOffset> {
        match (self.on_high_x(x), self.on_high_z(x)) {
            (true, true) => Some(PeriodicOffset::XZ),
            (true, false) => Some(PeriodicOffset::X),
            (false, true) => Some(PeriodicOffset::Z),
            (false, false) => None,
        }
    }

    /// 偏移向量
    pub fn offset_vector(&self, offset: PeriodicOffset) -> DVec3 {
        match offset {
            PeriodicOffset::X => DVec3::new(-self.lx, 0.0, 0.0),
            PeriodicOffset::Z => DVec3::new(0.0, 0.0, -self.lz),
            PeriodicOffset::XZ => DVec3::new(-self.lx, 0.0, -self.lz),
        }
    }

    /// 从点 → 主点坐标
    ///
    /// 非从点返回 [`OUT_OF_DOMAIN`]；调用方只应对已知的从点调用。
    pub fn map(&self, x: DVec3) -> DVec3 {
        match self.offset_of(x) {
            Some(offset) => x + self.offset_vector(offset),
            None => OUT_OF_DOMAIN,
        }
    }

    /// 判定边界点的周期角色
    pub fn classify(&self, x: DVec3, on_boundary: bool) -> PeriodicRole {
        if !on_boundary {
            return PeriodicRole::None;
        }
        if self.inside(x, on_boundary) {
            return PeriodicRole::Master;
        }
        match self.offset_of(x) {
            Some(offset) => PeriodicRole::Slave(offset),
            None => PeriodicRole::None,
        }
    }
}

/// 一对周期自由度
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PeriodicPair {
    /// 从点自由度
    pub slave: usize,
    /// 主点自由度
    pub master: usize,
    /// 偏移类型
    pub offset: PeriodicOffset,
}

/// 离散空间上的周期配对
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PeriodicMap {
    pairs: Vec<PeriodicPair>,
}

impl PeriodicMap {
    /// 为空间的全部边界从点寻找主点
    pub fn build<S: FunctionSpace + ?Sized>(
        space: &S,
        domain: &PeriodicDomain,
    ) -> PhysicsResult<Self> {
        let n = space.n_dofs();
        let coords = space.dof_coordinates();

        let masters: Vec<usize> = (0..n)
            .filter(|&dof| domain.inside(coords[dof], space.on_boundary(dof)))
            .collect();

        let mut pairs = Vec::new();
        for dof in 0..n {
            let PeriodicRole::Slave(offset) = domain.classify(coords[dof], space.on_boundary(dof))
            else {
                continue;
            };
            let target = domain.map(coords[dof]);
            let master = masters
                .iter()
                .copied()
                .find(|&m| {
                    let p = coords[m];
                    domain.near(p.x, target.x)
                        && domain.near(p.y, target.y)
                        && domain.near(p.z, target.z)
                })
                .ok_or(PhysicsError::PeriodicMismatch {
                    x: coords[dof].x,
                    y: coords[dof].y,
                    z: coords[dof].z,
                })?;
            pairs.push(PeriodicPair {
                slave: dof,
                master,
                offset,
            });
        }
        Ok(Self { pairs })
    }

    /// 配对数
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// 是否为空
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// 全部配对
    pub fn pairs(&self) -> &[PeriodicPair] {
        &self.pairs
    }

    /// 从点取主点的值
    pub fn enforce(&self, values: &mut [f64]) {
        for pair in &self.pairs {
            values[pair.slave] = values[pair.master];
        }
    }
}
