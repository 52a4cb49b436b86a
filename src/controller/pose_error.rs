// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains the extraction of the Cartesian pose and velocity error of the end effector.
use nalgebra::{Isometry3, UnitQuaternion, Vector3, Vector6};

/// Cartesian error of the end effector expressed in the base frame.
///
/// Every component points from the current towards the desired state, so a positive
/// stiffness acting on it pulls the end effector towards the target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct PoseError {
    /// Desired minus current position in \[m\].
    pub position: Vector3<f64>,
    /// Rotation which aligns the current with the reference orientation.
    /// See [`rotation_error`].
    pub orientation: Vector3<f64>,
    /// Desired minus current linear velocity in \[m/s\].
    pub linear_velocity: Vector3<f64>,
    /// Desired minus current angular velocity in \[rad/s\]. The desired angular velocity is
    /// always zero.
    pub angular_velocity: Vector3<f64>,
}

/// Computes the rotational error between the current and the reference orientation.
///
/// The current quaternion is flipped into the hemisphere of the reference first, so the
/// shorter of the two equivalent rotations is used. The result is the vector part of
/// `current⁻¹ · reference` expressed in the base frame, i.e. `sin(θ/2)` times the rotation
/// axis that takes the current orientation to the reference.
///
/// For a relative rotation of exactly 180° both axis directions describe the same rotation;
/// the returned sign then depends on rounding of the inputs.
pub fn rotation_error(
    current: &UnitQuaternion<f64>,
    reference: &UnitQuaternion<f64>,
) -> Vector3<f64> {
    let mut orientation = *current.quaternion();
    if reference.coords.dot(&orientation.coords) < 0. {
        orientation.coords = -orientation.coords;
    }
    let orientation = UnitQuaternion::new_normalize(orientation);
    let error_quaternion: UnitQuaternion<f64> = orientation.inverse() * reference;
    orientation.to_rotation_matrix()
        * Vector3::new(error_quaternion.i, error_quaternion.j, error_quaternion.k)
}

/// Computes the pose and velocity error of the end effector.
///
/// # Arguments
/// * `transform` - Current end effector pose in base frame.
/// * `reference` - End effector pose captured at the start of the episode. Only its
/// orientation is used, the position target is `position_d`.
/// * `position_d` - Desired end effector position in \[m\].
/// * `velocity_d` - Desired end effector linear velocity in \[m/s\].
/// * `twist` - Current end effector twist (linear, angular), usually `J · dq`.
pub fn extract_pose_error(
    transform: &Isometry3<f64>,
    reference: &Isometry3<f64>,
    position_d: &Vector3<f64>,
    velocity_d: &Vector3<f64>,
    twist: &Vector6<f64>,
) -> PoseError {
    let linear: Vector3<f64> = twist.fixed_rows::<3>(0).into_owned();
    let angular: Vector3<f64> = twist.fixed_rows::<3>(3).into_owned();
    PoseError {
        position: position_d - transform.translation.vector,
        orientation: rotation_error(&transform.rotation, &reference.rotation),
        linear_velocity: velocity_d - linear,
        angular_velocity: -angular,
    }
}

#[cfg(test)]
mod tests {
    use crate::controller::pose_error::{extract_pose_error, rotation_error};
    use nalgebra::{Isometry3, Translation3, UnitQuaternion, Vector3, Vector6};
    use std::f64::consts::PI;

    fn vector_compare(a: &Vector3<f64>, b: &Vector3<f64>, thresh: f64) {
        assert!((a - b).norm() < thresh, "{:?} != {:?}", a, b);
    }

    #[test]
    fn zero_relative_rotation_has_zero_error() {
        let orientation = UnitQuaternion::from_euler_angles(0.3, -1.2, 2.5);
        vector_compare(
            &rotation_error(&orientation, &orientation),
            &Vector3::zeros(),
            1e-15,
        );
        vector_compare(
            &rotation_error(&UnitQuaternion::identity(), &UnitQuaternion::identity()),
            &Vector3::zeros(),
            1e-15,
        );
    }

    #[test]
    fn error_points_back_to_reference() {
        let angle = 0.4;
        for axis in &[Vector3::x_axis(), Vector3::y_axis(), Vector3::z_axis()] {
            let current = UnitQuaternion::from_axis_angle(axis, angle);
            let error = rotation_error(&current, &UnitQuaternion::identity());
            vector_compare(&error, &(-axis.into_inner() * f64::sin(angle / 2.)), 1e-12);

            let reference = UnitQuaternion::from_axis_angle(axis, angle);
            let error = rotation_error(&UnitQuaternion::identity(), &reference);
            vector_compare(&error, &(axis.into_inner() * f64::sin(angle / 2.)), 1e-12);
        }
    }

    #[test]
    fn error_is_expressed_in_base_frame() {
        // both orientations share a large offset about x, the difference is about base z
        let offset = UnitQuaternion::from_axis_angle(&Vector3::x_axis(), PI / 2.);
        let reference = offset;
        let current = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 0.2) * offset;
        let error = rotation_error(&current, &reference);
        vector_compare(&error, &Vector3::new(0., 0., -f64::sin(0.1)), 1e-12);
    }

    #[test]
    fn error_uses_shorter_rotation() {
        // 350 degrees about z is the same as -10 degrees
        let current = UnitQuaternion::from_axis_angle(&Vector3::z_axis(), 350f64.to_radians());
        let error = rotation_error(&current, &UnitQuaternion::identity());
        vector_compare(
            &error,
            &Vector3::new(0., 0., f64::sin(5f64.to_radians())),
            1e-12,
        );
    }

    #[test]
    fn half_turn_has_unit_magnitude_along_axis() {
        let current = UnitQuaternion::from_axis_angle(&Vector3::y_axis(), PI);
        let error = rotation_error(&current, &UnitQuaternion::identity());
        assert!((error.norm() - 1.).abs() < 1e-12);
        assert!((error.y.abs() - 1.).abs() < 1e-12);
    }

    #[test]
    fn extracts_translation_and_velocity_errors() {
        let rotation = UnitQuaternion::from_euler_angles(0.1, 0.2, 0.3);
        let transform = Isometry3::from_parts(Translation3::new(0.5, 0.0, 0.4), rotation);
        let reference = Isometry3::from_parts(Translation3::new(0.3, 0.1, 0.6), rotation);
        let twist = Vector6::new(0.1, 0.2, 0.3, 0.4, 0.5, 0.6);
        let error = extract_pose_error(
            &transform,
            &reference,
            &Vector3::new(0.6, 0.0, 0.4),
            &Vector3::new(0.1, 0.0, 0.0),
            &twist,
        );
        vector_compare(&error.position, &Vector3::new(0.1, 0.0, 0.0), 1e-15);
        vector_compare(&error.orientation, &Vector3::zeros(), 1e-15);
        vector_compare(&error.linear_velocity, &Vector3::new(0.0, -0.2, -0.3), 1e-15);
        vector_compare(&error.angular_velocity, &Vector3::new(-0.4, -0.5, -0.6), 1e-15);
    }
}
