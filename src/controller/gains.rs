// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Builds the stiffness and damping matrices of the impedance law from scalar gains.
use nalgebra::Matrix3;

/// Damping coefficient which renders a spring of the given stiffness critically damped
/// (scaled by `damping_ratio`) for a unit mass.
///
/// A stiffness of zero always yields zero damping, independent of the damping ratio.
///
/// # Arguments
/// * `stiffness` - Spring constant. Must not be negative.
/// * `damping_ratio` - Damping ratio, 1 is critical damping. Must not be negative.
#[allow(clippy::float_cmp)]
pub fn critical_damping(stiffness: f64, damping_ratio: f64) -> f64 {
    if stiffness == 0. {
        return 0.;
    }
    2. * f64::sqrt(stiffness) * damping_ratio
}

/// Stiffness and damping matrices of the Cartesian impedance plus the torque rate bound.
///
/// All matrices are scaled identities, hence diagonal and symmetric. They are positive
/// semi-definite whenever the gains they were built from are non-negative.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct GainSet {
    /// Translational stiffness in \[N/m\].
    pub stiffness_position: Matrix3<f64>,
    /// Rotational stiffness in \[Nm/rad\].
    pub stiffness_rotation: Matrix3<f64>,
    /// Translational damping in \[Ns/m\].
    pub damping_position: Matrix3<f64>,
    /// Rotational damping in \[Nms/rad\].
    pub damping_rotation: Matrix3<f64>,
    /// Maximum change of the commanded torque per cycle in \[Nm\].
    pub delta_tau_max: f64,
}

impl GainSet {
    /// Creates a new GainSet.
    ///
    /// Negative gains are a precondition violation and are not checked.
    /// # Arguments
    /// * `translational_stiffness` - Translational stiffness in \[N/m\].
    /// * `rotational_stiffness` - Rotational stiffness in \[Nm/rad\].
    /// * `damping_ratio` - Damping ratio shared by translation and rotation.
    /// * `delta_tau_max` - Maximum change of the commanded torque per cycle in \[Nm\].
    pub fn new(
        translational_stiffness: f64,
        rotational_stiffness: f64,
        damping_ratio: f64,
        delta_tau_max: f64,
    ) -> Self {
        GainSet {
            stiffness_position: Matrix3::from_diagonal_element(translational_stiffness),
            stiffness_rotation: Matrix3::from_diagonal_element(rotational_stiffness),
            damping_position: Matrix3::from_diagonal_element(critical_damping(
                translational_stiffness,
                damping_ratio,
            )),
            damping_rotation: Matrix3::from_diagonal_element(critical_damping(
                rotational_stiffness,
                damping_ratio,
            )),
            delta_tau_max,
        }
    }
}

/// Joint-space impedance used to pull the arm towards its initial configuration inside the
/// nullspace of the Cartesian task.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct NullspaceGains {
    /// Posture stiffness in \[Nm/rad\].
    pub stiffness: f64,
    /// Posture damping in \[Nms/rad\].
    pub damping: f64,
}

impl NullspaceGains {
    /// Creates new NullspaceGains with critical-damping scaling.
    pub fn new(stiffness: f64, damping_ratio: f64) -> Self {
        NullspaceGains {
            stiffness,
            damping: critical_damping(stiffness, damping_ratio),
        }
    }
}
