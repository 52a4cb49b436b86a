// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the configuration of the controller which is not part of the per-cycle call.
use serde::Deserialize;
use serde::Serialize;

use crate::controller::gains::NullspaceGains;
use crate::exception::{create_parameter_exception, OscResult};

/// Configuration of the controller.
///
/// Set the parameters always before the control loop, NEVER in the control loop!
/// Missing fields fall back to their default when deserialized.
#[derive(Serialize, Deserialize, Debug, Copy, Clone, PartialEq)]
#[serde(default)]
pub struct ControllerParameters {
    /// Stiffness of the posture regulation in the nullspace in \[Nm/rad\].
    pub nullspace_stiffness: f64,
    /// Damping ratio of the posture regulation in the nullspace.
    pub nullspace_damping_ratio: f64,
    /// Smallest singular value of the Jacobian below which the operational space inertia
    /// gets damped.
    pub singular_value_threshold: f64,
    /// Damping factor applied at a singular configuration.
    pub max_damping: f64,
    /// Upper bound for the iterations of the singular value decomposition.
    pub svd_max_iterations: usize,
}

impl Default for ControllerParameters {
    fn default() -> Self {
        ControllerParameters {
            nullspace_stiffness: 10.,
            nullspace_damping_ratio: 1.,
            singular_value_threshold: 0.1,
            max_damping: 0.1,
            svd_max_iterations: 100,
        }
    }
}

impl ControllerParameters {
    /// Checks that all values are finite and in range.
    ///
    /// # Errors
    /// * InvalidParameter if a value is negative or not finite, the singular value threshold
    /// or the maximum damping is not positive, or the SVD is allowed zero iterations.
    pub fn validate(&self) -> OscResult<()> {
        let non_negative = |x: f64| x.is_finite() && x >= 0.;
        if !non_negative(self.nullspace_stiffness) {
            return Err(create_parameter_exception(
                "nullspace_stiffness must be finite and non-negative",
            ));
        }
        if !non_negative(self.nullspace_damping_ratio) {
            return Err(create_parameter_exception(
                "nullspace_damping_ratio must be finite and non-negative",
            ));
        }
        if !(self.singular_value_threshold.is_finite() && self.singular_value_threshold > 0.) {
            return Err(create_parameter_exception(
                "singular_value_threshold must be finite and positive",
            ));
        }
        if !(self.max_damping.is_finite() && self.max_damping > 0.) {
            return Err(create_parameter_exception(
                "max_damping must be finite and positive",
            ));
        }
        if self.svd_max_iterations == 0 {
            return Err(create_parameter_exception(
                "svd_max_iterations must be at least one",
            ));
        }
        Ok(())
    }

    /// Posture gains derived from this configuration.
    pub fn nullspace_gains(&self) -> NullspaceGains {
        NullspaceGains::new(self.nullspace_stiffness, self.nullspace_damping_ratio)
    }
}
