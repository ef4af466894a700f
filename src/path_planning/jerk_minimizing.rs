// Jerk minimizing trajectories
//
// Quintic polynomial boundary value problems in one coordinate:
//   p(t) = c0 + c1 t + c2 t^2 + c3 t^3 + c4 t^4 + c5 t^5
//
// - velocity keeping: start position/velocity, end velocity (longitudinal)
// - full boundary: start and end position/velocity/acceleration (lateral)

use nalgebra::{Matrix2, Matrix3, Vector2, Vector3};

use crate::common::{PlannerError, PlannerResult};

/// Quintic motion profile in time
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PolynomialProfile {
    /// `c0..c5`, lowest order first
    pub coeffs: [f64; 6],
}

impl PolynomialProfile {
    pub fn new(coeffs: [f64; 6]) -> Self {
        Self { coeffs }
    }

    /// Position at `t`
    pub fn evaluate(&self, t: f64) -> f64 {
        self.coeffs.iter().rev().fold(0.0, |acc, c| acc * t + c)
    }

    /// Velocity at `t`
    pub fn calc_first_derivative(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        c[1] + t * (2.0 * c[2] + t * (3.0 * c[3] + t * (4.0 * c[4] + t * 5.0 * c[5])))
    }

    /// Acceleration at `t`
    pub fn calc_second_derivative(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        2.0 * c[2] + t * (6.0 * c[3] + t * (12.0 * c[4] + t * 20.0 * c[5]))
    }

    /// Jerk at `t`
    pub fn calc_third_derivative(&self, t: f64) -> f64 {
        let c = &self.coeffs;
        6.0 * c[3] + t * (24.0 * c[4] + t * 60.0 * c[5])
    }
}

fn check_duration(time: f64) -> PlannerResult<()> {
    if time > 0.0 && time.is_finite() {
        Ok(())
    } else {
        Err(PlannerError::DegenerateDuration(time))
    }
}

/// Velocity keeping profile.
///
/// Starts at `xs` with velocity `vxs` and zero acceleration, and reaches
/// velocity `vxe` with zero acceleration after `time`. The end position is
/// free, so the fifth order term is not needed.
pub fn velocity_keeping(xs: f64, vxs: f64, vxe: f64, time: f64) -> PlannerResult<PolynomialProfile> {
    check_duration(time)?;

    let a0 = xs;
    let a1 = vxs;
    let a2 = 0.0;

    let t2 = time * time;
    let t3 = t2 * time;

    // Solve for a3, a4
    let a = Matrix2::new(
        3.0 * t2, 4.0 * t3,
        6.0 * time, 12.0 * t2,
    );

    let b = Vector2::new(
        vxe - a1 - 2.0 * a2 * time,
        -2.0 * a2,
    );

    let x = a
        .lu()
        .solve(&b)
        .ok_or(PlannerError::DegenerateDuration(time))?;

    Ok(PolynomialProfile::new([a0, a1, a2, x[0], x[1], 0.0]))
}

/// Full boundary profile from `(xs, vxs, axs)` to `(xe, vxe, axe)` over `time`
pub fn full_boundary(
    xs: f64,
    vxs: f64,
    axs: f64,
    xe: f64,
    vxe: f64,
    axe: f64,
    time: f64,
) -> PlannerResult<PolynomialProfile> {
    check_duration(time)?;

    let a0 = xs;
    let a1 = vxs;
    let a2 = axs / 2.0;

    let t2 = time * time;
    let t3 = t2 * time;
    let t4 = t3 * time;
    let t5 = t4 * time;

    // Solve for a3, a4, a5
    let a = Matrix3::new(
        t3, t4, t5,
        3.0 * t2, 4.0 * t3, 5.0 * t4,
        6.0 * time, 12.0 * t2, 20.0 * t3,
    );

    let b = Vector3::new(
        xe - a0 - a1 * time - a2 * t2,
        vxe - a1 - 2.0 * a2 * time,
        axe - 2.0 * a2,
    );

    let x = a
        .lu()
        .solve(&b)
        .ok_or(PlannerError::DegenerateDuration(time))?;

    Ok(PolynomialProfile::new([a0, a1, a2, x[0], x[1], x[2]]))
}
