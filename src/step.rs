// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the entry point called by a hosting process once per control tick.
//!
//! A host hands over flat buffers ([`HostBuffers`]). They are copied into fixed-size arrays
//! ([`CycleInput`]), validated and unpacked into the structured types of the
//! [`controller`](`crate::controller`) module before the control law runs. All matrices are
//! column-major.
use std::convert::TryFrom;

use nalgebra::Vector3;

use crate::controller::compute_torques;
use crate::controller::control_tools::{first_non_finite, is_homogeneous_transformation};
use crate::controller::control_types::{DesiredTrajectoryPoint, Torques};
use crate::controller::gains::GainSet;
use crate::controller::parameters::ControllerParameters;
use crate::controller::robot_state::{ReferenceState, RobotState};
use crate::exception::{create_parameter_exception, OscException, OscResult};
use crate::utils::{array_to_isometry, array_to_jacobian, array_to_mass_matrix, array_to_vector7};

/// Flat buffers of one control cycle as handed over by a host.
#[derive(Debug, Copy, Clone)]
#[allow(non_snake_case)]
pub struct HostBuffers<'a> {
    /// End effector pose at the start of the episode, 4x4 column-major.
    pub initial_O_T_EE: &'a [f64],
    /// Current end effector pose, 4x4 column-major.
    pub O_T_EE: &'a [f64],
    /// Joint positions at the start of the episode.
    pub initial_q: &'a [f64],
    /// Current joint positions.
    pub q: &'a [f64],
    /// Current joint velocities.
    pub dq: &'a [f64],
    /// Mass matrix, 7x7 column-major.
    pub mass: &'a [f64],
    /// Geometric Jacobian, 6x7 column-major.
    pub jacobian: &'a [f64],
    /// Coriolis torques.
    pub coriolis: &'a [f64],
    /// Torques commanded in the previous cycle.
    pub tau_J_d: &'a [f64],
    /// Desired end effector position.
    pub position_d: &'a [f64],
    /// Desired end effector velocity.
    pub velocity_d: &'a [f64],
    /// Maximum change of the commanded torques per cycle.
    pub delta_tau_max: f64,
    /// Translational stiffness.
    pub kp_pos: f64,
    /// Rotational stiffness.
    pub kp_rot: f64,
    /// Damping ratio.
    pub damping_ratio: f64,
}

/// Inputs of one control cycle in fixed-size column-major arrays.
#[derive(Debug, Copy, Clone, PartialEq)]
#[allow(non_snake_case)]
pub struct CycleInput {
    /// End effector pose at the start of the episode in base frame.
    /// Pose is represented as a 4x4 matrix in column-major format.
    pub initial_O_T_EE: [f64; 16],
    /// Measured end effector pose in base frame.
    /// Pose is represented as a 4x4 matrix in column-major format.
    pub O_T_EE: [f64; 16],
    /// Joint positions at the start of the episode in \[rad\].
    pub initial_q: [f64; 7],
    /// Measured joint positions in \[rad\].
    pub q: [f64; 7],
    /// Measured joint velocities in \[rad/s\].
    pub dq: [f64; 7],
    /// 7x7 joint-space mass matrix in column-major format.
    pub mass: [f64; 49],
    /// 6x7 end effector Jacobian in base frame, column-major format.
    pub jacobian: [f64; 42],
    /// Coriolis and centrifugal torques in \[Nm\].
    pub coriolis: [f64; 7],
    /// Torque command of the previous cycle in \[Nm\].
    pub tau_J_d: [f64; 7],
    /// Desired end effector position in base frame in \[m\].
    pub position_d: [f64; 3],
    /// Desired end effector velocity in base frame in \[m/s\].
    pub velocity_d: [f64; 3],
    /// Maximum change of each joint torque per cycle in \[Nm\].
    pub delta_tau_max: f64,
    /// Translational stiffness in \[N/m\].
    pub kp_pos: f64,
    /// Rotational stiffness in \[Nm/rad\].
    pub kp_rot: f64,
    /// Damping ratio.
    pub damping_ratio: f64,
}

/// Structured inputs of the control law.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct ControlCycle {
    /// State of the robot in this cycle.
    pub state: RobotState,
    /// State captured at the start of the episode.
    pub reference: ReferenceState,
    /// Desired end effector position and velocity.
    pub desired: DesiredTrajectoryPoint,
    /// Cartesian gains and torque rate bound.
    pub gains: GainSet,
    /// Torque command of the previous cycle.
    pub previous: Torques,
}

fn copy_buffer<const N: usize>(name: &'static str, buffer: &[f64]) -> OscResult<[f64; N]> {
    <[f64; N]>::try_from(buffer).map_err(|_| {
        tracing::debug!(name, expected = N, actual = buffer.len(), "rejected buffer");
        OscException::InvalidBufferLength {
            name,
            expected: N,
            actual: buffer.len(),
        }
    })
}

fn check_finite(name: &'static str, values: &[f64]) -> OscResult<()> {
    match first_non_finite(values) {
        Some(index) => {
            tracing::debug!(name, index, "rejected non-finite input");
            Err(OscException::NonFiniteInput { name, index })
        }
        None => Ok(()),
    }
}

fn check_transform(name: &'static str, transform: &[f64; 16]) -> OscResult<()> {
    if is_homogeneous_transformation(transform) {
        Ok(())
    } else {
        tracing::debug!(name, "rejected transform");
        Err(OscException::InvalidTransform { name })
    }
}

impl<'a> TryFrom<&HostBuffers<'a>> for CycleInput {
    type Error = OscException;

    fn try_from(buffers: &HostBuffers<'a>) -> OscResult<Self> {
        Ok(CycleInput {
            initial_O_T_EE: copy_buffer("initial_O_T_EE", buffers.initial_O_T_EE)?,
            O_T_EE: copy_buffer("O_T_EE", buffers.O_T_EE)?,
            initial_q: copy_buffer("initial_q", buffers.initial_q)?,
            q: copy_buffer("q", buffers.q)?,
            dq: copy_buffer("dq", buffers.dq)?,
            mass: copy_buffer("mass", buffers.mass)?,
            jacobian: copy_buffer("jacobian", buffers.jacobian)?,
            coriolis: copy_buffer("coriolis", buffers.coriolis)?,
            tau_J_d: copy_buffer("tau_J_d", buffers.tau_J_d)?,
            position_d: copy_buffer("position_d", buffers.position_d)?,
            velocity_d: copy_buffer("velocity_d", buffers.velocity_d)?,
            delta_tau_max: buffers.delta_tau_max,
            kp_pos: buffers.kp_pos,
            kp_rot: buffers.kp_rot,
            damping_ratio: buffers.damping_ratio,
        })
    }
}

impl CycleInput {
    /// Checks that all values are finite, both poses are homogeneous transformations and the
    /// torque rate bound is not negative.
    ///
    /// The gains are not checked, negative gains are a precondition violation.
    /// # Errors
    /// * NonFiniteInput if any value is NaN or infinite.
    /// * InvalidTransform if a pose is not a homogeneous transformation.
    /// * InvalidParameter if `delta_tau_max` is negative.
    pub fn validate(&self) -> OscResult<()> {
        check_finite("initial_O_T_EE", &self.initial_O_T_EE)?;
        check_finite("O_T_EE", &self.O_T_EE)?;
        check_finite("initial_q", &self.initial_q)?;
        check_finite("q", &self.q)?;
        check_finite("dq", &self.dq)?;
        check_finite("mass", &self.mass)?;
        check_finite("jacobian", &self.jacobian)?;
        check_finite("coriolis", &self.coriolis)?;
        check_finite("tau_J_d", &self.tau_J_d)?;
        check_finite("position_d", &self.position_d)?;
        check_finite("velocity_d", &self.velocity_d)?;
        check_finite(
            "gains",
            &[self.delta_tau_max, self.kp_pos, self.kp_rot, self.damping_ratio],
        )?;
        check_transform("initial_O_T_EE", &self.initial_O_T_EE)?;
        check_transform("O_T_EE", &self.O_T_EE)?;
        if self.delta_tau_max < 0. {
            return Err(create_parameter_exception(
                "delta_tau_max must not be negative",
            ));
        }
        Ok(())
    }

    /// Converts the flat arrays into the structured inputs of the control law.
    pub fn unpack(&self) -> ControlCycle {
        ControlCycle {
            state: RobotState {
                q: array_to_vector7(&self.q),
                dq: array_to_vector7(&self.dq),
                O_T_EE: array_to_isometry(&self.O_T_EE),
                mass: array_to_mass_matrix(&self.mass),
                jacobian: array_to_jacobian(&self.jacobian),
                coriolis: array_to_vector7(&self.coriolis),
            },
            reference: ReferenceState {
                q: array_to_vector7(&self.initial_q),
                O_T_EE: array_to_isometry(&self.initial_O_T_EE),
            },
            desired: DesiredTrajectoryPoint::new(
                Vector3::from_column_slice(&self.position_d),
                Vector3::from_column_slice(&self.velocity_d),
            ),
            gains: GainSet::new(
                self.kp_pos,
                self.kp_rot,
                self.damping_ratio,
                self.delta_tau_max,
            ),
            previous: Torques::new(self.tau_J_d),
        }
    }
}

/// Computes the torque command of one control cycle from flat arrays.
///
/// `parameters` are not validated here, check them once with
/// [`ControllerParameters::validate`] before the control loop starts.
/// # Errors
/// * see [`CycleInput::validate`]
pub fn step_controller(
    input: &CycleInput,
    parameters: &ControllerParameters,
) -> OscResult<Torques> {
    input.validate()?;
    let cycle = input.unpack();
    Ok(compute_torques(
        &cycle.state,
        &cycle.reference,
        &cycle.desired,
        &cycle.gains,
        &cycle.previous,
        parameters,
    ))
}

/// Computes the torque command of one control cycle from buffers of a host.
/// # Errors
/// * InvalidBufferLength if a buffer has the wrong number of elements.
/// * see [`CycleInput::validate`]
pub fn step_controller_from_buffers(
    buffers: &HostBuffers,
    parameters: &ControllerParameters,
) -> OscResult<Torques> {
    let input = CycleInput::try_from(buffers)?;
    step_controller(&input, parameters)
}
