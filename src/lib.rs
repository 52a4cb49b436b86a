// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! # osc-controller
//! osc-controller contains the per-cycle control law of a Cartesian impedance
//! (operational space) controller for 7-DoF robots like the Franka Emika Panda.
//!
//! **ALWAYS HAVE THE USER STOP BUTTON AT
//! HAND WHILE CONTROLLING THE ROBOT!**
//!
//! ## Design
//! The library does not talk to a robot. It maps the state of one control cycle to one
//! joint torque command and leaves the communication, the trajectory generation and the
//! timing of the control loop to the caller.
//!
//! The library is divided into three main Modules:
//! * [controller](`crate::controller`) - contains the control law: gains, pose error,
//!   operational space dynamics, torque law and torque rate limiting.
//! * [step](`crate::step`) - contains the entry point for hosts which hand over flat
//!   column-major buffers.
//! * [utils](`crate::utils`) - contains type definitions and conversion functions.
//!
//! The control law holds no state. The torque command of one cycle has to be passed back as
//! previous command in the next cycle, it is used to bound the change of the torques
//! between two cycles.
//!
//! # Example:
//!```
//! use nalgebra::Vector3;
//! use osc::{
//!     compute_torques, ControllerParameters, DesiredTrajectoryPoint, GainSet, Matrix6x7,
//!     Matrix7, ReferenceState, RobotState, Torques, Vector7,
//! };
//! use nalgebra::Isometry3;
//!
//! let mut jacobian = Matrix6x7::zeros();
//! for i in 0..6 {
//!     jacobian[(i, i)] = 1.;
//! }
//! let state = RobotState {
//!     q: Vector7::zeros(),
//!     dq: Vector7::zeros(),
//!     O_T_EE: Isometry3::identity(),
//!     mass: Matrix7::identity(),
//!     jacobian,
//!     coriolis: Vector7::zeros(),
//! };
//! // captured once when the episode starts
//! let reference = ReferenceState::from(&state);
//! let parameters = ControllerParameters::default();
//! parameters.validate().unwrap();
//!
//! let gains = GainSet::new(150., 10., 1., 1.);
//! let desired = DesiredTrajectoryPoint::at_rest(Vector3::new(0.1, 0., 0.));
//! let mut command = Torques::default();
//! for _ in 0..3 {
//!     command = compute_torques(&state, &reference, &desired, &gains, &command, &parameters);
//! }
//! // 15 Nm are requested but the torque may only change by 1 Nm per cycle
//! assert!((command.tau_J[0] - 3.).abs() < 1e-12);
//! ```
//!
//! Hosts which only have flat buffers use [`step_controller`] or
//! [`step_controller_from_buffers`], which validate the buffers and return an
//! [`OscException`] if they are malformed.
pub mod controller;
pub mod exception;
pub mod step;
pub mod utils;

pub use controller::compute_torques;
pub use controller::control_types::{DesiredTrajectoryPoint, Torques};
pub use controller::gains::{GainSet, NullspaceGains};
pub use controller::parameters::ControllerParameters;
pub use controller::robot_state::{ReferenceState, RobotState};
pub use exception::{OscException, OscResult};
pub use step::{step_controller, step_controller_from_buffers, CycleInput, HostBuffers};
pub use utils::*;
