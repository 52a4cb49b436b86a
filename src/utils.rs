// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! contains useful type definitions and conversion functions.
//!
//! All flat buffers are interpreted in column-major order, which is the layout of
//! `O_T_EE` on Franka robots and the default layout of an Eigen map.
use nalgebra::{Isometry3, Matrix3, Matrix4, Rotation3, SMatrix, SVector, UnitQuaternion, Vector3};

/// A Vector with 7 entries
pub type Vector7 = SVector<f64, 7>;
/// A Matrix with 6 rows and 7 columns
pub type Matrix6x7 = SMatrix<f64, 6, 7>;
/// A Matrix with 7 rows and 6 columns
pub type Matrix7x6 = SMatrix<f64, 7, 6>;
/// A Matrix with 7 rows and 7 columns
pub type Matrix7 = SMatrix<f64, 7, 7>;

/// converts a 4x4 column-major homogenous matrix to an Isometry
///
/// The rotation block is converted in closed form, so the conversion runs in constant time.
/// Small deviations from orthonormality are removed by normalizing the resulting quaternion.
pub fn array_to_isometry(array: &[f64; 16]) -> Isometry3<f64> {
    let matrix: Matrix3<f64> = Matrix4::from_column_slice(array)
        .fixed_view::<3, 3>(0, 0)
        .into_owned();
    let rotation = UnitQuaternion::from_rotation_matrix(&Rotation3::from_matrix_unchecked(matrix));
    Isometry3::from_parts(
        Vector3::new(array[12], array[13], array[14]).into(),
        UnitQuaternion::new_normalize(*rotation.quaternion()),
    )
}

/// converts an Isometry to a 4x4 column-major homogenous matrix
pub fn isometry_to_array(isometry: &Isometry3<f64>) -> [f64; 16] {
    let mut out = [0.; 16];
    for (i, &x) in isometry.to_homogeneous().iter().enumerate() {
        out[i] = x;
    }
    out
}

/// converts a joint-space array to a [`Vector7`]
pub fn array_to_vector7(array: &[f64; 7]) -> Vector7 {
    Vector7::from_column_slice(array)
}

/// converts a 7x7 column-major array to a joint-space mass matrix
pub fn array_to_mass_matrix(array: &[f64; 49]) -> Matrix7 {
    Matrix7::from_column_slice(array)
}

/// converts a 6x7 column-major array to a geometric Jacobian.
///
/// Rows 0..3 map to the linear velocity and rows 3..6 to the angular velocity of the
/// end effector.
pub fn array_to_jacobian(array: &[f64; 42]) -> Matrix6x7 {
    Matrix6x7::from_column_slice(array)
}
