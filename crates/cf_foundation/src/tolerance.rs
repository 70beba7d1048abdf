// crates/cf_foundation/src/tolerance.rs

//! 坐标比较容差
//!
//! 边界判定全部基于坐标谓词（`near(x[0], Lx)` 之类），
//! 因此容差必须远小于网格间距，同时又能吸收浮点舍入。

/// 默认坐标比较容差
///
/// 网格生成时端点坐标被精确赋值，内部节点的舍入误差在 1e-15 量级，
/// 该值留出足够余量。
pub const NEAR_EPS: f64 = 1e-10;

/// 判断两个坐标是否重合（默认容差）
#[inline]
pub fn near(a: f64, b: f64) -> bool {
    near_with(a, b, NEAR_EPS)
}

/// 判断两个坐标是否重合（指定容差）
#[inline]
pub fn near_with(a: f64, b: f64, eps: f64) -> bool {
    (a - b).abs() <= eps
}
