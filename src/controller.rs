// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the Cartesian impedance control law.
//!
//! [`compute_torques`] maps the inputs of one control cycle to one torque command. It holds
//! no state between calls: the only quantity which crosses cycle boundaries is the previous
//! command, which the caller passes in and receives back.

pub mod control_tools;
pub mod control_types;
pub mod dynamics;
pub mod gains;
pub mod parameters;
pub mod pose_error;
pub mod rate_limiting;
pub mod robot_state;
pub mod torque_law;

use nalgebra::Vector6;

use crate::controller::control_types::{DesiredTrajectoryPoint, Torques};
use crate::controller::dynamics::decouple;
use crate::controller::gains::GainSet;
use crate::controller::parameters::ControllerParameters;
use crate::controller::pose_error::extract_pose_error;
use crate::controller::rate_limiting::saturate_torque_rate;
use crate::controller::robot_state::{ReferenceState, RobotState};
use crate::controller::torque_law::{cartesian_wrench, desired_torques, nullspace_torque};
use crate::utils::Vector7;

/// Computes the torque command of one control cycle.
///
/// The command renders a spring-damper in Cartesian space which pulls the end effector
/// towards `desired.position` and the orientation of `reference`. The redundant joint motion
/// is pulled towards `reference.q`, Coriolis torques are compensated and the change with
/// respect to `previous` is limited to `gains.delta_tau_max` per joint.
///
/// This function does not fail. Singular configurations are handled by the damping in
/// [`decouple`](`crate::controller::dynamics::decouple`).
///
/// # Arguments
/// * `state` - State of the robot in this cycle.
/// * `reference` - State captured at the start of the episode.
/// * `desired` - Desired end effector position and velocity.
/// * `gains` - Cartesian impedance and torque rate bound.
/// * `previous` - Torque command of the previous cycle.
/// * `parameters` - Nullspace gains and singularity handling.
pub fn compute_torques(
    state: &RobotState,
    reference: &ReferenceState,
    desired: &DesiredTrajectoryPoint,
    gains: &GainSet,
    previous: &Torques,
    parameters: &ControllerParameters,
) -> Torques {
    let twist: Vector6<f64> = state.jacobian * state.dq;
    let error = extract_pose_error(
        &state.O_T_EE,
        &reference.O_T_EE,
        &desired.position,
        &desired.velocity,
        &twist,
    );
    let dynamics = decouple(&state.mass, &state.jacobian, parameters);

    let wrench = cartesian_wrench(gains, &error);
    let tau_nullspace = nullspace_torque(
        &dynamics,
        &parameters.nullspace_gains(),
        &state.q,
        &state.dq,
        &reference.q,
    );
    let tau_d = desired_torques(&state.jacobian, &wrench, &tau_nullspace, &state.coriolis);

    saturate_torque_rate(gains.delta_tau_max, &tau_d, &Vector7::from(*previous)).into()
}

#[cfg(test)]
mod tests {
    use crate::controller::compute_torques;
    use crate::controller::control_types::{DesiredTrajectoryPoint, Torques};
    use crate::controller::gains::GainSet;
    use crate::controller::parameters::ControllerParameters;
    use crate::controller::robot_state::{ReferenceState, RobotState};
    use crate::utils::{Matrix6x7, Matrix7, Vector7};
    use nalgebra::{Isometry3, Matrix6, Translation3, UnitQuaternion, Vector3};
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn task_jacobian() -> Matrix6x7 {
        let mut jacobian = Matrix6x7::zeros();
        jacobian
            .fixed_view_mut::<6, 6>(0, 0)
            .copy_from(&Matrix6::identity());
        jacobian
    }

    fn resting_state() -> RobotState {
        RobotState {
            q: Vector7::zeros(),
            dq: Vector7::zeros(),
            O_T_EE: Isometry3::identity(),
            mass: Matrix7::identity(),
            jacobian: task_jacobian(),
            coriolis: Vector7::zeros(),
        }
    }

    fn slice_compare(a: &[f64], b: &[f64], thresh: f64) {
        for i in 0..a.len() {
            assert!((a[i] - b[i]).abs() < thresh, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn steady_state_commands_zero_torque() {
        let state = resting_state();
        let reference = ReferenceState::from(&state);
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::zeros()),
            &GainSet::new(10., 10., 1., 1.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        assert_eq!(torques, Torques::new([0.; 7]));
    }

    #[test]
    fn position_offset_pulls_towards_target() {
        let state = resting_state();
        let reference = ReferenceState::from(&state);
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::new(1., 0., 0.)),
            &GainSet::new(10., 10., 1., 100.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        slice_compare(&torques.tau_J, &[10., 0., 0., 0., 0., 0., 0.], 1e-12);

        // twice the stiffness, twice the torque
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::new(1., 0., 0.)),
            &GainSet::new(20., 10., 1., 100.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        slice_compare(&torques.tau_J, &[20., 0., 0., 0., 0., 0., 0.], 1e-12);
    }

    #[test]
    fn position_offset_is_rate_limited() {
        let state = resting_state();
        let reference = ReferenceState::from(&state);
        let previous = Torques::new([0.5; 7]);
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::new(0., -1., 0.)),
            &GainSet::new(10., 10., 1., 1.),
            &previous,
            &ControllerParameters::default(),
        );
        slice_compare(&torques.tau_J, &[0., -0.5, 0., 0., 0., 0., 0.], 1e-12);
    }

    #[test]
    fn without_error_output_is_coriolis_plus_posture() {
        let mut state = resting_state();
        state.coriolis = Vector7::from_column_slice(&[0.1, -0.2, 0.3, -0.4, 0.5, -0.6, 0.7]);
        let reference = ReferenceState::from(&state);
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::zeros()),
            &GainSet::new(150., 10., 1., 10.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        slice_compare(&torques.tau_J, state.coriolis.as_slice(), 1e-12);

        // moving the redundant joint only adds a posture torque on that joint
        state.q[6] = 0.2;
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::zeros()),
            &GainSet::new(150., 10., 1., 10.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        let mut expected = state.coriolis;
        expected[6] -= 10. * 0.2;
        slice_compare(&torques.tau_J, expected.as_slice(), 1e-12);
    }

    #[test]
    fn orientation_offset_rotates_back() {
        let mut state = resting_state();
        let reference = ReferenceState::from(&state);
        state.O_T_EE = Isometry3::from_parts(
            Translation3::identity(),
            UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2),
        );
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::zeros()),
            &GainSet::new(10., 10., 1., 100.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        assert!(torques.tau_J[5] < 0.);
        assert!((torques.tau_J[5] + 10. * f64::sin(0.1)).abs() < 1e-12);
    }

    #[test]
    fn velocity_is_damped() {
        let mut state = resting_state();
        let reference = ReferenceState::from(&state);
        state.dq[0] = 0.5;
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::at_rest(Vector3::zeros()),
            &GainSet::new(25., 10., 1., 100.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        // damping 2 * sqrt(25) = 10 against a velocity of 0.5
        assert!((torques.tau_J[0] + 5.).abs() < 1e-12);

        // tracking the same velocity produces no damping torque
        let torques = compute_torques(
            &state,
            &reference,
            &DesiredTrajectoryPoint::new(Vector3::zeros(), Vector3::new(0.5, 0., 0.)),
            &GainSet::new(25., 10., 1., 100.),
            &Torques::default(),
            &ControllerParameters::default(),
        );
        assert!(torques.tau_J[0].abs() < 1e-12);
    }

    #[test]
    fn singular_jacobian_yields_finite_bounded_torques() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut state = resting_state();
        state.q = Vector7::from_fn(|_, _| rng.gen_range(-1.0..1.0));
        state.dq = Vector7::from_fn(|_, _| rng.gen_range(-1.0..1.0));
        let reference = ReferenceState {
            q: Vector7::zeros(),
            O_T_EE: Isometry3::identity(),
        };
        for jacobian in [Matrix6x7::zeros(), {
            let mut jacobian = Matrix6x7::from_fn(|_, _| rng.gen_range(-1.0..1.0));
            let row = jacobian.row(0).into_owned();
            jacobian.set_row(1, &row);
            jacobian
        }]
        .iter()
        {
            state.jacobian = *jacobian;
            let previous = Torques::new([1.; 7]);
            let torques = compute_torques(
                &state,
                &reference,
                &DesiredTrajectoryPoint::at_rest(Vector3::new(0.3, 0.2, -0.1)),
                &GainSet::new(3000., 300., 1., 1.),
                &previous,
                &ControllerParameters::default(),
            );
            for i in 0..7 {
                assert!(torques.tau_J[i].is_finite());
                assert!((torques.tau_J[i] - previous.tau_J[i]).abs() <= 1. + 1e-12);
            }
        }
    }

    #[test]
    fn command_threads_through_cycles() {
        let state = resting_state();
        let reference = ReferenceState::from(&state);
        let gains = GainSet::new(10., 10., 1., 1.);
        let desired = DesiredTrajectoryPoint::at_rest(Vector3::new(5., 0., 0.));
        let mut command = Torques::default();
        // the raw command is 50 Nm, reached with 1 Nm per cycle
        for cycle in 1..=60 {
            command = compute_torques(
                &state,
                &reference,
                &desired,
                &gains,
                &command,
                &ControllerParameters::default(),
            );
            let expected = f64::min(cycle as f64, 50.);
            assert!((command.tau_J[0] - expected).abs() < 1e-9);
        }
    }
}
