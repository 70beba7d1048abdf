// crates/cf_physics/src/boundary/builder.rs

//! 槽道边界条件构建器

use std::collections::BTreeMap;
use std::sync::Arc;

use cf_config::ChannelGeometry;
use cf_foundation::DVec3;
use serde::{Deserialize, Serialize};

use super::constraint::{BoundaryRegion, DirichletConstraint};
use crate::domain::{PeriodicDomain, PeriodicOffset, PeriodicRole};
use crate::error::PhysicsResult;
use crate::fields::{FieldName, TimeLevel, VelocityComponent, VelocityHistory};
use crate::space::FunctionSpace;

// ============================================================
// 面标记
// ============================================================

/// 面标记值
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum FacetLabel {
    /// 未标记
    #[default]
    Unmarked = 0,
    /// 入口
    Inlet = 1,
}

/// 按自由度存储的边界标记
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FacetMarkers {
    labels: Vec<FacetLabel>,
}

impl FacetMarkers {
    /// 全部标记
    pub fn labels(&self) -> &[FacetLabel] {
        &self.labels
    }

    /// 某个标记的数量
    pub fn count(&self, label: FacetLabel) -> usize {
        self.labels.iter().filter(|&&l| l == label).count()
    }
}

// ============================================================
// 边界条件集合
// ============================================================

/// 各系统分量的约束列表
#[derive(Debug, Clone, Default)]
pub struct BoundaryConditions {
    by_field: BTreeMap<FieldName, Vec<Arc<DirichletConstraint>>>,
}

impl BoundaryConditions {
    /// 某分量的约束（未登记的分量返回空切片）
    pub fn get(&self, field: FieldName) -> &[Arc<DirichletConstraint>] {
        self.by_field.get(&field).map(Vec::as_slice).unwrap_or(&[])
    }

    /// 已登记的分量
    pub fn fields(&self) -> impl Iterator<Item = FieldName> + '_ {
        self.by_field.keys().copied()
    }

    /// 对速度的全部时间层施加约束
    pub fn apply_to_velocity(&self, velocity: &mut VelocityHistory) -> PhysicsResult<()> {
        for component in VelocityComponent::ALL {
            for bc in self.get(FieldName::Velocity(component)) {
                for level in TimeLevel::ALL {
                    bc.apply(velocity.level_mut(level).component_mut(component))?;
                }
            }
        }
        Ok(())
    }
}

// ============================================================
// 边界点分类
// ============================================================

/// 边界点的唯一角色
///
/// 优先级：周期从点 > 壁面 > 入口 > 周期主点 > 未约束。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoundaryRole {
    /// 周期从点（值由主点决定）
    PeriodicSlave(PeriodicOffset),
    /// 无滑移壁面
    Wall,
    /// 入口（仅标记）
    Inlet,
    /// 周期主点
    PeriodicMaster,
    /// 边界上但不受任何约束
    Unconstrained,
    /// 内部点
    Interior,
}

// ============================================================
// 构建器
// ============================================================

/// 槽道边界条件构建器
#[derive(Debug, Clone)]
pub struct ChannelBoundaryBuilder {
    walls: BoundaryRegion,
    inlet: BoundaryRegion,
    periodic: PeriodicDomain,
}

impl ChannelBoundaryBuilder {
    /// 由几何创建
    pub fn new(geometry: &ChannelGeometry) -> Self {
        Self {
            walls: BoundaryRegion::Walls {
                y_low: -geometry.ly / 2.0,
                y_high: geometry.ly / 2.0,
            },
            inlet: BoundaryRegion::Inlet { x0: 0.0 },
            periodic: PeriodicDomain::new(geometry),
        }
    }

    /// 周期子域
    pub fn periodic(&self) -> &PeriodicDomain {
        &self.periodic
    }

    /// 标记入口
    pub fn mark_facets<S: FunctionSpace + ?Sized>(&self, space: &S) -> FacetMarkers {
        let labels = (0..space.n_dofs())
            .map(|dof| {
                if self.inlet.contains(space.dof_coordinate(dof), space.on_boundary(dof)) {
                    FacetLabel::Inlet
                } else {
                    FacetLabel::Unmarked
                }
            })
            .collect();
        FacetMarkers { labels }
    }

    /// 构建约束
    pub fn build<S: FunctionSpace + ?Sized>(&self, space: &S) -> BoundaryConditions {
        let wall = Arc::new(DirichletConstraint::new(space, self.walls, 0.0));

        let mut by_field = BTreeMap::new();
        for component in VelocityComponent::ALL {
            by_field.insert(FieldName::Velocity(component), vec![Arc::clone(&wall)]);
        }
        by_field.insert(FieldName::Pressure, Vec::new());

        BoundaryConditions { by_field }
    }

    /// 构建约束并立即施加到 q_、q_1、q_2
    pub fn create_bcs<S: FunctionSpace + ?Sized>(
        &self,
        space: &S,
        velocity: &mut VelocityHistory,
    ) -> PhysicsResult<BoundaryConditions> {
        let markers = self.mark_facets(space);
        let bcs = self.build(space);
        bcs.apply_to_velocity(velocity)?;

        log::info!(
            "边界条件: 壁面自由度 {}, 入口标记 {}（未约束）",
            bcs.get(FieldName::Velocity(VelocityComponent::U0))
                .first()
                .map_or(0, |bc| bc.dofs().len()),
            markers.count(FacetLabel::Inlet)
        );
        Ok(bcs)
    }

    /// 边界点分类
    pub fn classify(&self, x: DVec3, on_boundary: bool) -> BoundaryRole {
        if !on_boundary {
            return BoundaryRole::Interior;
        }
        match self.periodic.classify(x, on_boundary) {
            PeriodicRole::Slave(offset) => BoundaryRole::PeriodicSlave(offset),
            role => {
                if self.walls.contains(x, on_boundary) {
                    BoundaryRole::Wall
                } else if self.inlet.contains(x, on_boundary) {
                    BoundaryRole::Inlet
                } else if role == PeriodicRole::Master {
                    BoundaryRole::PeriodicMaster
                } else {
                    BoundaryRole::Unconstrained
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::space::StructuredSpace;

    fn setup() -> (ChannelBoundaryBuilder, StructuredSpace) {
        let geometry = ChannelGeometry::new([4.0, 2.0, 2.0], [4, 4, 4]);
        (
            ChannelBoundaryBuilder::new(&geometry),
            StructuredSpace::channel(&geometry).unwrap(),
        )
    }

    #[test]
    fn test_policy() {
        let (builder, space) = setup();
        let bcs = builder.build(&space);

        let u0 = bcs.get(FieldName::Velocity(VelocityComponent::U0));
        let u1 = bcs.get(FieldName::Velocity(VelocityComponent::U1));
        let u2 = bcs.get(FieldName::Velocity(VelocityComponent::U2));
        assert_eq!(u0.len(), 1);
        assert!(Arc::ptr_eq(&u0[0], &u1[0]));
        assert!(Arc::ptr_eq(&u0[0], &u2[0]));
        assert_eq!(u0[0].value(), 0.0);

        assert!(bcs.get(FieldName::Pressure).is_empty());
        assert_eq!(bcs.fields().count(), 4);
    }

    #[test]
    fn test_inlet_marked_not_constrained() {
        let (builder, space) = setup();
        let markers = builder.mark_facets(&space);
        assert_eq!(markers.count(FacetLabel::Inlet), 5 * 5);

        let bcs = builder.build(&space);
        for field in FieldName::ALL {
            for bc in bcs.get(field) {
                assert!(!matches!(bc.region(), BoundaryRegion::Inlet { .. }));
            }
        }
    }

    #[test]
    fn test_create_bcs_zeroes_all_levels() {
        let (builder, space) = setup();
        let mut velocity = VelocityHistory::zeros(space.n_dofs());
        for level in TimeLevel::ALL {
            for axis in 0..3 {
                velocity.level_mut(level).axis_mut(axis).values_mut().fill(2.0);
            }
        }

        let bcs = builder.create_bcs(&space, &mut velocity).unwrap();
        let wall_dofs = bcs.get(FieldName::Velocity(VelocityComponent::U1))[0].dofs().to_vec();

        for level in TimeLevel::ALL {
            for axis in 0..3 {
                let values = velocity.level(level).axis(axis).values();
                for &dof in &wall_dofs {
                    assert_eq!(values[dof], 0.0);
                }
                assert_eq!(values.iter().filter(|&&v| v == 2.0).count(), space.n_dofs() - 50);
            }
        }
    }

    #[test]
    fn test_classify_precedence() {
        let (builder, _) = setup();
        // 低 x 与低 y 交线：壁面优先于入口
        assert_eq!(builder.classify(DVec3::new(0.0, -1.0, 0.0), true), BoundaryRole::Wall);
        // 壁面上的从点仍是从点
        assert_eq!(
            builder.classify(DVec3::new(4.0, 1.0, 1.0), true),
            BoundaryRole::PeriodicSlave(PeriodicOffset::XZ)
        );
        assert_eq!(builder.classify(DVec3::new(0.0, 0.0, 0.0), true), BoundaryRole::Inlet);
        assert_eq!(
            builder.classify(DVec3::new(2.0, 0.0, -1.0), true),
            BoundaryRole::PeriodicMaster
        );
        assert_eq!(builder.classify(DVec3::new(2.0, 0.0, 0.0), false), BoundaryRole::Interior);
    }
}
