// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the Cartesian impedance torque law.
use nalgebra::Vector6;

use crate::controller::dynamics::TaskSpaceDynamics;
use crate::controller::gains::{GainSet, NullspaceGains};
use crate::controller::pose_error::PoseError;
use crate::utils::{Matrix6x7, Vector7};

/// Spring-damper wrench of the Cartesian impedance (force, torque).
pub fn cartesian_wrench(gains: &GainSet, error: &PoseError) -> Vector6<f64> {
    let mut wrench = Vector6::zeros();
    wrench.fixed_rows_mut::<3>(0).copy_from(
        &(gains.stiffness_position * error.position
            + gains.damping_position * error.linear_velocity),
    );
    wrench.fixed_rows_mut::<3>(3).copy_from(
        &(gains.stiffness_rotation * error.orientation
            + gains.damping_rotation * error.angular_velocity),
    );
    wrench
}

/// Joint-space spring-damper towards `q_initial`, projected into the nullspace of the task.
pub fn nullspace_torque(
    dynamics: &TaskSpaceDynamics,
    gains: &NullspaceGains,
    q: &Vector7,
    dq: &Vector7,
    q_initial: &Vector7,
) -> Vector7 {
    let tau_posture: Vector7 = gains.stiffness * (q_initial - q) - gains.damping * dq;
    dynamics.nullspace.transpose() * tau_posture
}

/// Combines task torque, nullspace torque and Coriolis compensation into the desired joint
/// torques before rate limiting.
///
/// `tau_d = Jᵀ · F + Nᵀ · (K_ns · (q_initial - q) - D_ns · dq) + c`
pub fn desired_torques(
    jacobian: &Matrix6x7,
    wrench: &Vector6<f64>,
    tau_nullspace: &Vector7,
    coriolis: &Vector7,
) -> Vector7 {
    let tau_task: Vector7 = jacobian.transpose() * wrench;
    tau_task + tau_nullspace + coriolis
}
