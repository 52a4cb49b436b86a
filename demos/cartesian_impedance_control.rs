// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

use clap::Parser;
use nalgebra::{Isometry3, UnitQuaternion, Vector3};
use osc::controller::rate_limiting::{DEFAULT_DELTA_TAU_MAX, DELTA_T};
use osc::{
    isometry_to_array, step_controller, ControllerParameters, CycleInput, Matrix6x7, Matrix7,
    OscResult, Torques, Vector7,
};
use std::f64::consts::PI;

/// An example showing the Cartesian impedance controller tracking a circle with a simulated
/// arm. The arm has a constant Jacobian and a constant, diagonal mass matrix, gravity and
/// Coriolis torques are zero. The orientation is held at the initial orientation while the
/// position follows the circle.
///
/// Set RUST_LOG=trace to see when the controller damps the operational space inertia.
#[derive(Parser, Debug)]
#[clap(name = "cartesian_impedance_control")]
struct CommandLineArguments {
    /// Translational stiffness in [N/m]
    #[clap(long, default_value_t = 200.)]
    pub translational_stiffness: f64,
    /// Rotational stiffness in [Nm/rad]
    #[clap(long, default_value_t = 20.)]
    pub rotational_stiffness: f64,
    /// Damping ratio
    #[clap(long, default_value_t = 1.)]
    pub damping_ratio: f64,
    /// Maximum torque change per cycle in [Nm]
    #[clap(long, default_value_t = DEFAULT_DELTA_TAU_MAX)]
    pub delta_tau_max: f64,
    /// Duration of the simulation in [s]
    #[clap(long, default_value_t = 5.)]
    pub duration: f64,
}

struct SimulatedArm {
    jacobian: Matrix6x7,
    mass: Matrix7,
    q_initial: Vector7,
    initial_pose: Isometry3<f64>,
    q: Vector7,
    dq: Vector7,
}

impl SimulatedArm {
    fn new() -> Self {
        let mut jacobian = Matrix6x7::zeros();
        for i in 0..6 {
            jacobian[(i, i)] = 1.;
            jacobian[(i, 6)] = 0.2;
        }
        jacobian[(0, 1)] = 0.3;
        jacobian[(2, 3)] = -0.4;
        let mass = Matrix7::from_diagonal(&Vector7::from_column_slice(&[
            3.0, 2.5, 2.0, 1.5, 1.0, 0.5, 0.3,
        ]));
        let q_initial =
            Vector7::from_column_slice(&[0., -PI / 4., 0., -3. * PI / 4., 0., PI / 2., PI / 4.]);
        SimulatedArm {
            jacobian,
            mass,
            q_initial,
            initial_pose: Isometry3::translation(0.3, 0., 0.5),
            q: q_initial,
            dq: Vector7::zeros(),
        }
    }

    fn pose(&self) -> Isometry3<f64> {
        let displacement = self.jacobian * (self.q - self.q_initial);
        let mut pose = self.initial_pose;
        pose.translation.vector += displacement.fixed_rows::<3>(0);
        pose.rotation =
            UnitQuaternion::from_scaled_axis(displacement.fixed_rows::<3>(3).into_owned())
                * pose.rotation;
        pose
    }

    fn step(&mut self, torques: &Torques) {
        let ddq = self.mass.cholesky().map_or(Vector7::zeros(), |cholesky| {
            cholesky.solve(&Vector7::from(*torques))
        });
        self.dq += ddq * DELTA_T;
        self.q += self.dq * DELTA_T;
    }

    fn cycle_input(
        &self,
        args: &CommandLineArguments,
        position_d: &Vector3<f64>,
        velocity_d: &Vector3<f64>,
        previous: &Torques,
    ) -> CycleInput {
        let mut mass = [0.; 49];
        mass.copy_from_slice(self.mass.as_slice());
        let mut jacobian = [0.; 42];
        jacobian.copy_from_slice(self.jacobian.as_slice());
        CycleInput {
            initial_O_T_EE: isometry_to_array(&self.initial_pose),
            O_T_EE: isometry_to_array(&self.pose()),
            initial_q: self.q_initial.into(),
            q: self.q.into(),
            dq: self.dq.into(),
            mass,
            jacobian,
            coriolis: [0.; 7],
            tau_J_d: previous.tau_J,
            position_d: (*position_d).into(),
            velocity_d: (*velocity_d).into(),
            delta_tau_max: args.delta_tau_max,
            kp_pos: args.translational_stiffness,
            kp_rot: args.rotational_stiffness,
            damping_ratio: args.damping_ratio,
        }
    }
}

fn main() -> OscResult<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    let args = CommandLineArguments::parse();
    // Set additional parameters always before the control loop, NEVER in the control loop!
    let parameters = ControllerParameters::default();
    parameters.validate()?;

    let mut arm = SimulatedArm::new();
    let center = arm.initial_pose.translation.vector;
    let radius = 0.05;
    let angular_frequency = 2. * PI / 2.5;
    let mut command = Torques::default();
    let steps = (args.duration / DELTA_T) as usize;
    for step in 0..steps {
        let time = step as f64 * DELTA_T;
        // the circle starts at the center and ramps up its radius within one second
        let ramp = f64::min(time, 1.);
        let angle = angular_frequency * time;
        let position_d =
            center + radius * ramp * Vector3::new(f64::sin(angle), 0., 1. - f64::cos(angle));
        let velocity_d = radius
            * ramp
            * angular_frequency
            * Vector3::new(f64::cos(angle), 0., f64::sin(angle));

        let input = arm.cycle_input(&args, &position_d, &velocity_d, &command);
        command = step_controller(&input, &parameters)?;
        arm.step(&command);

        if step % 500 == 0 {
            let error = (position_d - arm.pose().translation.vector).norm();
            println!(
                "t = {:.2} s  tracking error = {:.4} m  tau = {:.3?}",
                time, error, command.tau_J
            );
        }
    }
    Ok(())
}
