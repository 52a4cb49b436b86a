// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the structured state types consumed by the control law.
use nalgebra::Isometry3;

use crate::utils::{Matrix6x7, Matrix7, Vector7};

/// Describes the state of the robot in one control cycle.
///
/// The mass matrix, the Jacobian and the Coriolis vector must belong to the same joint
/// configuration as `q`.
#[derive(Debug, Copy, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct RobotState {
    /// Measured joint positions in \[rad\].
    pub q: Vector7,
    /// Measured joint velocities in \[rad/s\].
    pub dq: Vector7,
    /// Measured end effector pose in base frame.
    pub O_T_EE: Isometry3<f64>,
    /// Joint-space mass matrix. Symmetric positive definite.
    pub mass: Matrix7,
    /// Geometric Jacobian of the end effector in base frame.
    /// Rows 0..3 are linear, rows 3..6 angular velocity.
    pub jacobian: Matrix6x7,
    /// Coriolis and centrifugal torques in \[Nm\].
    pub coriolis: Vector7,
}

/// State captured once at the start of a control episode.
///
/// The joint configuration is the target of the posture regulation in the nullspace and the
/// orientation of the pose is the orientation target of the Cartesian impedance.
#[derive(Debug, Copy, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct ReferenceState {
    /// Joint positions at the start of the episode in \[rad\].
    pub q: Vector7,
    /// End effector pose at the start of the episode.
    pub O_T_EE: Isometry3<f64>,
}

impl From<&RobotState> for ReferenceState {
    fn from(state: &RobotState) -> Self {
        ReferenceState {
            q: state.q,
            O_T_EE: state.O_T_EE,
        }
    }
}
