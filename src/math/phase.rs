// Copyright @yucwang 2026

use crate::math::constants::{Float, Vector3f, INV_4_PI};

// Henyey-Greenstein phase function. Both directions point away from the
// scattering point, so forward scattering sits at dot(w_in, w_out) = -1.
pub fn phase_henyey_greenstein(w_in: &Vector3f, w_out: &Vector3f, g: Float) -> Float {
    let cos_theta = w_in.dot(w_out);
    let denom = 1.0 + g * g + 2.0 * g * cos_theta;
    if denom <= 0.0 {
        return 0.0;
    }
    INV_4_PI * (1.0 - g * g) / (denom * denom.sqrt())
}
