// Copyright (c) 2021 Marco Boneberger
// Licensed under the EUPL-1.2-or-later

//! Contains exception and Result definitions
use thiserror::Error;

/// Represents all kind of errors which can be raised at the boundary of the controller.
///
/// The control law itself never fails: numerical degeneracies are absorbed by the
/// [`dynamics`](`crate::controller::dynamics`) module. Everything here is a rejection of
/// malformed input or configuration before it reaches the law.
#[derive(Error, Debug, PartialEq)]
pub enum OscException {
    /// InvalidBufferLength is returned if a flat buffer handed over by the host has the wrong
    /// number of elements.
    #[error("buffer {name:?} has {actual} elements, expected {expected}")]
    InvalidBufferLength {
        /// Name of the offending buffer.
        name: &'static str,
        /// Number of elements the controller requires.
        expected: usize,
        /// Number of elements which were provided.
        actual: usize,
    },

    /// NonFiniteInput is returned if a buffer contains NaN or infinite values.
    #[error("buffer {name:?} contains a non-finite value at index {index}")]
    NonFiniteInput {
        /// Name of the offending buffer.
        name: &'static str,
        /// Index of the first non-finite element.
        index: usize,
    },

    /// InvalidTransform is returned if a pose buffer is not a homogeneous transformation.
    #[error("buffer {name:?} is not a homogeneous transformation")]
    InvalidTransform { name: &'static str },

    /// InvalidParameter is returned if the controller configuration is out of range.
    #[error("{message:?}")]
    InvalidParameter { message: String },
}

/// creates an InvalidParameter exception from a static string slice
pub(crate) fn create_parameter_exception(message: &'static str) -> OscException {
    OscException::InvalidParameter {
        message: message.to_string(),
    }
}

/// Result type which can have OscException as Error
pub type OscResult<T> = Result<T, OscException>;
