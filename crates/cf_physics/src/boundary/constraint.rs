// crates/cf_physics/src/boundary/constraint.rs

//! 边界区域与 Dirichlet 约束
//!
//! 壁面不预先标记，而是在构建约束时用坐标谓词识别。

use cf_foundation::{near, DVec3};
use serde::{Deserialize, Serialize};

use crate::error::{PhysicsError, PhysicsResult};
use crate::fields::ScalarField;
use crate::space::FunctionSpace;

/// 边界区域谓词
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum BoundaryRegion {
    /// 上下壁面 y = ±Ly/2
    Walls {
        /// 下壁面坐标
        y_low: f64,
        /// 上壁面坐标
        y_high: f64,
    },
    /// 入口 x = x0
    Inlet {
        /// 入口平面坐标
        x0: f64,
    },
}

impl BoundaryRegion {
    /// 点是否属于该区域
    pub fn contains(&self, x: DVec3, on_boundary: bool) -> bool {
        on_boundary
            && match *self {
                Self::Walls { y_low, y_high } => near(x.y, y_low) || near(x.y, y_high),
                Self::Inlet { x0 } => near(x.x, x0),
            }
    }
}

/// Dirichlet 约束
///
/// 构建时即确定受约束的自由度，之后可反复施加到任意同空间的场上。
#[derive(Debug, Clone, PartialEq)]
pub struct DirichletConstraint {
    region: BoundaryRegion,
    value: f64,
    n_dofs: usize,
    dofs: Vec<usize>,
}

impl DirichletConstraint {
    /// 在空间上识别区域内的自由度
    pub fn new<S: FunctionSpace + ?Sized>(space: &S, region: BoundaryRegion, value: f64) -> Self {
        let dofs = (0..space.n_dofs())
            .filter(|&dof| region.contains(space.dof_coordinate(dof), space.on_boundary(dof)))
            .collect();
        Self {
            region,
            value,
            n_dofs: space.n_dofs(),
            dofs,
        }
    }

    /// 约束区域
    pub fn region(&self) -> BoundaryRegion {
        self.region
    }

    /// 约束值
    pub fn value(&self) -> f64 {
        self.value
    }

    /// 受约束的自由度
    pub fn dofs(&self) -> &[usize] {
        &self.dofs
    }

    /// 施加约束，返回被设置的自由度数
    ///
    /// 幂等：重复施加结果不变。
    pub fn apply(&self, field: &mut ScalarField) -> PhysicsResult<usize> {
        PhysicsError::check_size("dirichlet", self.n_dofs, field.len())?;
        let values = field.values_mut();
        for &dof in &self.dofs {
            values[dof] = self.value;
        }
        Ok(self.dofs.len())
    }
}
