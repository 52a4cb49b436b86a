// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later
#![allow(non_upper_case_globals)]

//! Input checks used at the boundary before a cycle reaches the control law.

/// Determines whether the given array represents a valid homogeneous transformation matrix.
/// transform is represented as a 4x4 matrix in column-major format
#[allow(clippy::float_cmp)]
pub fn is_homogeneous_transformation(transform: &[f64; 16]) -> bool {
    const kOrthonormalThreshold: f64 = 1e-5;
    if transform[3] != 0.0 || transform[7] != 0.0 || transform[11] != 0.0 || transform[15] != 1.0 {
        return false;
    }
    let column_norm = |j: usize| {
        f64::sqrt(
            transform[j * 4].powi(2) + transform[j * 4 + 1].powi(2) + transform[j * 4 + 2].powi(2),
        )
    };
    let row_norm = |i: usize| {
        f64::sqrt(transform[i].powi(2) + transform[4 + i].powi(2) + transform[2 * 4 + i].powi(2))
    };
    (0..3).all(|j| f64::abs(column_norm(j) - 1.) <= kOrthonormalThreshold)
        && (0..3).all(|i| f64::abs(row_norm(i) - 1.) <= kOrthonormalThreshold)
}

/// Returns the index of the first NaN or infinite value, if any.
pub fn first_non_finite(values: &[f64]) -> Option<usize> {
    values.iter().position(|x| !x.is_finite())
}
