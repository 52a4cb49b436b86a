// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains helper types for the desired motion and the joint-level torque command.
use nalgebra::Vector3;
use serde::Deserialize;
use serde::Serialize;

use crate::utils::Vector7;

/// Desired end effector motion of the current control cycle.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct DesiredTrajectoryPoint {
    /// Desired end effector position in base frame in \[m\].
    pub position: Vector3<f64>,
    /// Desired end effector linear velocity in base frame in \[m/s\].
    pub velocity: Vector3<f64>,
}

impl DesiredTrajectoryPoint {
    /// Creates a new DesiredTrajectoryPoint.
    pub fn new(position: Vector3<f64>, velocity: Vector3<f64>) -> Self {
        DesiredTrajectoryPoint { position, velocity }
    }

    /// A point at rest at the given position.
    pub fn at_rest(position: Vector3<f64>) -> Self {
        DesiredTrajectoryPoint::new(position, Vector3::zeros())
    }
}

/// Stores joint-level torque commands without gravity and friction.
///
/// The command of one cycle is handed back to the controller as the previous command of
/// the next cycle.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq, Default)]
#[allow(non_snake_case)]
pub struct Torques {
    /// Desired torques in \[Nm\].
    pub tau_J: [f64; 7],
}

impl From<Vector7> for Torques {
    fn from(vector: Vector7) -> Self {
        Torques::new(vector.into())
    }
}

impl From<Torques> for Vector7 {
    fn from(torques: Torques) -> Self {
        Vector7::from_column_slice(&torques.tau_J)
    }
}

impl Torques {
    /// Creates a new Torques instance
    /// # Arguments
    /// * `torques` - Desired joint-level torques without gravity and friction in \[Nm\].
    pub fn new(torques: [f64; 7]) -> Self {
        Torques { tau_J: torques }
    }
}
