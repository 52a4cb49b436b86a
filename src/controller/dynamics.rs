// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Projects the joint-space dynamics into operational space and builds the nullspace
//! projector of the Cartesian task.
//!
//! Every inversion in this module is regularized and every iterative step has a fixed upper
//! bound, so the execution time does not depend on the input values and a singular
//! configuration never produces a non-finite result.
use nalgebra::linalg::{Cholesky, SVD};
use nalgebra::Matrix6;

use crate::controller::parameters::ControllerParameters;
use crate::utils::{Matrix6x7, Matrix7, Matrix7x6};

/// Relative diagonal regularizations tried if the mass matrix is not positive definite.
/// They are scaled with the mean of the diagonal of the mass matrix.
pub static MASS_REGULARIZATION: [f64; 3] = [1e-9, 1e-6, 1e-3];

/// Dynamics of the Cartesian task as seen from operational space.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct TaskSpaceDynamics {
    /// Inverse of the operational space inertia: `J · M⁻¹ · Jᵀ`.
    pub lambda_inv: Matrix6<f64>,
    /// Operational space inertia, inverted with singularity damping.
    pub lambda: Matrix6<f64>,
    /// Dynamically consistent generalized inverse of the Jacobian: `M⁻¹ · Jᵀ · Λ`.
    pub jacobian_inverse: Matrix7x6,
    /// Nullspace projector `I - J̄ · J`. Joint torques are projected with its transpose.
    pub nullspace: Matrix7,
    /// Squared damping factor which was added to `Λ⁻¹` before the inversion.
    pub damping: f64,
}

/// Inverts the joint-space mass matrix.
///
/// If the Cholesky decomposition fails the matrix is regularized with the entries of
/// [`MASS_REGULARIZATION`] in order. If none of them helps the identity is returned.
pub fn invert_mass_matrix(mass: &Matrix7) -> Matrix7 {
    if let Some(cholesky) = Cholesky::new(*mass) {
        return cholesky.inverse();
    }
    let scale = f64::max(mass.trace().abs() / 7., 1.);
    for &relative in MASS_REGULARIZATION.iter() {
        let regularization = relative * scale;
        if let Some(cholesky) = Cholesky::new(mass + Matrix7::identity() * regularization) {
            tracing::trace!(regularization, "regularized mass matrix");
            return cholesky.inverse();
        }
    }
    tracing::trace!("mass matrix is not positive definite, using identity");
    Matrix7::identity()
}

/// Smallest singular value of the Jacobian, or `None` if the decomposition did not converge
/// within `max_iterations`.
pub fn smallest_singular_value(jacobian: &Matrix6x7, max_iterations: usize) -> Option<f64> {
    SVD::try_new(
        *jacobian,
        false,
        false,
        f64::EPSILON,
        usize::max(max_iterations, 1),
    )
    .map(|svd| svd.singular_values.min())
}

/// Squared damping factor for the operational space inertia.
///
/// The damping is zero above `threshold` and rises quadratically to `max_damping²` at a
/// singular configuration. An unknown smallest singular value is treated as singular.
pub fn singularity_damping(sigma_min: Option<f64>, threshold: f64, max_damping: f64) -> f64 {
    let max_damping_squared = max_damping * max_damping;
    match sigma_min {
        Some(sigma) if sigma.is_nan() => max_damping_squared,
        Some(sigma) if sigma >= threshold => 0.,
        Some(sigma) => (1. - (sigma / threshold).powi(2)) * max_damping_squared,
        None => max_damping_squared,
    }
}

fn invert_operational_space_inertia(
    lambda_inv: &Matrix6<f64>,
    damping: f64,
    max_damping_squared: f64,
) -> Matrix6<f64> {
    if let Some(cholesky) = Cholesky::new(lambda_inv + Matrix6::identity() * damping) {
        return cholesky.inverse();
    }
    if let Some(cholesky) = Cholesky::new(lambda_inv + Matrix6::identity() * max_damping_squared) {
        tracing::trace!("operational space inertia inverted with maximum damping");
        return cholesky.inverse();
    }
    tracing::trace!("operational space inertia is not invertible, releasing the task");
    Matrix6::zeros()
}

/// Computes the operational space dynamics of the Cartesian task.
///
/// # Arguments
/// * `mass` - Joint-space mass matrix. Should be symmetric positive definite.
/// * `jacobian` - Geometric Jacobian of the end effector in base frame.
/// * `parameters` - Singularity threshold, damping and iteration bound.
pub fn decouple(
    mass: &Matrix7,
    jacobian: &Matrix6x7,
    parameters: &ControllerParameters,
) -> TaskSpaceDynamics {
    let mass_inv = invert_mass_matrix(mass);
    let lambda_inv: Matrix6<f64> = jacobian * mass_inv * jacobian.transpose();

    let sigma_min = smallest_singular_value(jacobian, parameters.svd_max_iterations);
    let damping = singularity_damping(
        sigma_min,
        parameters.singular_value_threshold,
        parameters.max_damping,
    );
    if damping > 0. {
        tracing::trace!(?sigma_min, damping, "damping near singular configuration");
    }
    let lambda = invert_operational_space_inertia(
        &lambda_inv,
        damping,
        parameters.max_damping * parameters.max_damping,
    );

    let jacobian_inverse: Matrix7x6 = mass_inv * jacobian.transpose() * lambda;
    let nullspace: Matrix7 = Matrix7::identity() - jacobian_inverse * jacobian;
    TaskSpaceDynamics {
        lambda_inv,
        lambda,
        jacobian_inverse,
        nullspace,
        damping,
    }
}
