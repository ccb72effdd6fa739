//! Tolerances for diagram construction.
//!
//! Policy
//! - One `Copy` struct handed to every pass; defaults are tuned for coordinates of order
//!   one to a thousand. Relative tolerances scale with `max(1, magnitude)`.

use crate::error::InputError;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct VdCfg {
    /// Values below this are treated as zero by [`chop`](crate::numeric::chop).
    pub chop_tol: f64,
    /// Allowed disagreement between a solved vertex's distances to its three sites.
    pub dist_tol: f64,
    /// Allowed excursion of a solved vertex outside the clearance range of its edge.
    pub edge_tol: f64,
    /// Cross products below this count as parallel directions at an endpoint.
    pub angle_tol: f64,
    /// Equidistance tolerance used by the checker.
    pub check_tol: f64,
    /// Run the checker inside every insertion, before committing.
    pub check_each_insert: bool,
}

impl Default for VdCfg {
    fn default() -> Self {
        Self {
            chop_tol: 1e-10,
            dist_tol: 1e-7,
            edge_tol: 1e-6,
            angle_tol: 1e-12,
            check_tol: 1e-6,
            check_each_insert: false,
        }
    }
}

impl VdCfg {
    pub fn validate(&self) -> Result<(), InputError> {
        let tols = [
            ("chop_tol", self.chop_tol),
            ("dist_tol", self.dist_tol),
            ("edge_tol", self.edge_tol),
            ("angle_tol", self.angle_tol),
            ("check_tol", self.check_tol),
        ];
        for (name, v) in tols {
            if !(v.is_finite() && v >= 0.0) {
                return Err(InputError::InvalidConfig {
                    reason: format!("{name} must be finite and non-negative, got {v}"),
                });
            }
        }
        Ok(())
    }
}
