// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains functions for limiting the rate of the commanded torques.

use crate::utils::Vector7;

///Sample time constant
pub static DELTA_T: f64 = 1e-3;
///Epsilon value for checking limits
pub static LIMIT_EPS: f64 = 1e-3;
/// Maximum torque rate
pub static MAX_TORQUE_RATE: f64 = 1000. - LIMIT_EPS;
/// Maximum change of the commanded torque per cycle at the maximum torque rate in \[Nm\]
pub static DEFAULT_DELTA_TAU_MAX: f64 = MAX_TORQUE_RATE * DELTA_T;

/// Limits the change of the commanded torques with respect to the previous command,
/// with an individual bound for each joint.
///
/// A NaN command is mapped to the upper bound of its interval, so the result always lies in
/// `[last - max_delta, last + max_delta]` as long as `last_commanded_values` and
/// `max_delta` are finite.
/// # Arguments
/// * `max_delta` - Per-joint maximum allowed change per cycle in \[Nm\]. Must not be negative.
/// * `commanded_values` - Commanded torques of the current time step.
/// * `last_commanded_values` - Commanded torques of the previous time step.
/// # Return
/// Rate-limited vector of desired torques.
pub fn limit_rate_torques(
    max_delta: &Vector7,
    commanded_values: &Vector7,
    last_commanded_values: &Vector7,
) -> Vector7 {
    let mut limited_values = Vector7::zeros();
    for i in 0..7 {
        let difference = commanded_values[i] - last_commanded_values[i];
        limited_values[i] = last_commanded_values[i]
            + f64::max(f64::min(difference, max_delta[i]), -max_delta[i]);
    }
    limited_values
}

/// Limits the change of every commanded torque with respect to the previous command to
/// `delta_tau_max`. Each joint is clamped independently.
/// # Arguments
/// * `delta_tau_max` - Maximum allowed change per cycle in \[Nm\]. Must not be negative.
/// * `commanded_values` - Commanded torques of the current time step.
/// * `last_commanded_values` - Commanded torques of the previous time step.
pub fn saturate_torque_rate(
    delta_tau_max: f64,
    commanded_values: &Vector7,
    last_commanded_values: &Vector7,
) -> Vector7 {
    limit_rate_torques(
        &Vector7::repeat(delta_tau_max),
        commanded_values,
        last_commanded_values,
    )
}
