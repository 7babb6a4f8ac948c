//! Progress reporting for synthesis rounds

pub mod reporter;
