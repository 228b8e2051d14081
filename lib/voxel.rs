//! The magnetization state of a single tissue sample and its update
//! operations.

use ndarray as nd;
use crate::{
    config::{ Frame, SimParams },
    error::{ Error, Result },
};

/// Rotation matrix about *z* by `phi` radians.
pub fn zrot(phi: f64) -> nd::Array2<f64> {
    let (sin, cos) = phi.sin_cos();
    nd::arr2(&[
        [cos, -sin, 0.0],
        [sin,  cos, 0.0],
        [0.0,  0.0, 1.0],
    ])
}

/// Rotation matrix about *x* by `alpha` radians.
pub fn xrot(alpha: f64) -> nd::Array2<f64> {
    let (sin, cos) = alpha.sin_cos();
    nd::arr2(&[
        [1.0, 0.0,  0.0],
        [0.0, cos, -sin],
        [0.0, sin,  cos],
    ])
}

/// Rotation by `alpha` about the transverse-plane axis at angle `phi` from
/// *+x*, i.e. `Rz(φ) · Rx(α) · Rz(-φ)`.
pub fn rf_rot(alpha: f64, phi: f64) -> nd::Array2<f64> {
    zrot(phi).dot(&xrot(alpha)).dot(&zrot(-phi))
}

/// A single voxel's net magnetization and relaxation parameters.
///
/// The state proper is the 3-vector `m`; both update operations mutate it in
/// place. No normalization invariant is enforced: the magnitude follows
/// wherever the relaxation dynamics take it.
#[derive(Clone, Debug, PartialEq)]
pub struct Voxel {
    /// Spatial position (x, y, z) [m]. Unused by the physics until gradient
    /// support lands.
    pub pos: [f64; 3],
    /// Longitudinal relaxation time [s].
    pub t1: f64,
    /// Transverse relaxation time [s].
    pub t2: f64,
    /// Effective transverse relaxation time [s]. Reserved; static dephasing
    /// is not yet applied.
    pub t2star: f64,
    /// Equilibrium longitudinal magnitude [a.u.].
    pub m0: f64,
    /// Current magnetization (Mx, My, Mz).
    m: nd::Array1<f64>,
    /// Reserved for off-resonance ensemble averaging; currently always 1.
    pub num_isochromats: usize,
}

impl Voxel {
    /// Create a new voxel.
    ///
    /// Fails if either relaxation time is non-positive or non-finite.
    /// `t2 <= t1` is physically expected but deliberately not enforced.
    pub fn new(
        pos: [f64; 3],
        t1: f64,
        t2: f64,
        t2star: f64,
        m0: f64,
        m_init: [f64; 3],
    ) -> Result<Self>
    {
        if !t1.is_finite() || t1 <= 0.0 {
            return Err(Error::InvalidRelaxation { name: "t1", value: t1 });
        }
        if !t2.is_finite() || t2 <= 0.0 {
            return Err(Error::InvalidRelaxation { name: "t2", value: t2 });
        }
        Ok(Self {
            pos,
            t1,
            t2,
            t2star,
            m0,
            m: nd::arr1(&m_init),
            num_isochromats: 1,
        })
    }

    /// Create a fully relaxed voxel at the origin with unit equilibrium
    /// magnetization.
    pub fn relaxed(t1: f64, t2: f64) -> Result<Self> {
        Self::new([0.0; 3], t1, t2, 0.0, 1.0, [0.0, 0.0, 1.0])
    }

    /// Current magnetization. Reading has no side effects.
    pub fn read_state(&self) -> nd::ArrayView1<'_, f64> { self.m.view() }

    /// Apply an instantaneous RF pulse with flip angle `alpha` [radians].
    ///
    /// The rotation axis lies in the transverse plane along the current
    /// transverse phase of the magnetization. The pulse takes zero simulated
    /// time, so no relaxation or precession occurs during it.
    pub fn apply_rf(&mut self, alpha: f64) {
        let phi = self.m[1].atan2(self.m[0]);
        self.m = rf_rot(alpha, phi).dot(&self.m);
    }

    /// Extension seam for field-inhomogeneity and gradient effects.
    /// Currently has no effect on the state.
    pub fn apply_gradient(&mut self, _grad: [f64; 3]) { }

    /// Advance the state by one time step of `params.dt`: exponential T1/T2
    /// relaxation toward equilibrium, fused with free precession about the
    /// main field when operating in the lab frame.
    ///
    /// The fused update is `m ← Rz(φ)·A·m + Rz(φ)·B` for the relaxation
    /// pair `(A, B)`: the decayed vector and the recovery offset rotate
    /// together. Relaxing then rotating is not interchangeable with the
    /// reverse order.
    pub fn evolve(&mut self, params: &SimParams) {
        let (mut A, mut B) = self.relaxation(params.dt);
        if params.frame == Frame::Lab {
            let Rz = zrot(params.step_phase());
            A = Rz.dot(&A);
            B = Rz.dot(&B);
        }
        self.m = A.dot(&self.m) + B;
    }

    /// Relaxation over an interval `t` as an affine pair: decay matrix
    /// `diag(e2, e2, e1)` and recovery vector `(0, 0, m0(1 - e1))`.
    fn relaxation(&self, t: f64) -> (nd::Array2<f64>, nd::Array1<f64>) {
        let e1 = (-t / self.t1).exp();
        let e2 = (-t / self.t2).exp();
        let A = nd::arr2(&[
            [e2,  0.0, 0.0],
            [0.0, e2,  0.0],
            [0.0, 0.0, e1 ],
        ]);
        let B = nd::arr1(&[0.0, 0.0, self.m0 * (1.0 - e1)]);
        (A, B)
    }
}

#[cfg(test)]
mod test {
    use std::f64::consts::{ FRAC_1_SQRT_2, FRAC_PI_2, PI, TAU };
    use itertools::Itertools;
    use super::*;

    fn rot_params() -> SimParams {
        SimParams { frame: Frame::Rot, ..SimParams::default() }
    }

    #[test]
    fn rf_tips_equilibrium_into_transverse_plane() {
        let mut vox = Voxel::relaxed(4e-3, 2e-3).unwrap();
        vox.apply_rf(FRAC_PI_2);
        let m = vox.read_state();
        assert!(m[2].abs() < 1e-12);
        assert!((m[0].hypot(m[1]) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn rf_pi_inverts() {
        let mut vox = Voxel::relaxed(4e-3, 2e-3).unwrap();
        vox.apply_rf(PI);
        let m = vox.read_state();
        assert!(m[0].abs() < 1e-12);
        assert!(m[1].abs() < 1e-12);
        assert!((m[2] + 1.0).abs() < 1e-12);
    }

    #[test]
    fn rf_axis_follows_transverse_phase() {
        // magnetization along -y: the pulse axis coincides with it, leaving
        // the vector unchanged
        let mut vox
            = Voxel::new([0.0; 3], 4e-3, 2e-3, 0.0, 1.0, [0.0, -1.0, 0.0])
            .unwrap();
        vox.apply_rf(FRAC_PI_2);
        let m = vox.read_state();
        assert!(m[0].abs() < 1e-12);
        assert!((m[1] + 1.0).abs() < 1e-12);
        assert!(m[2].abs() < 1e-12);
    }

    #[test]
    fn rf_phase_is_quadrant_correct() {
        // transverse phase π puts the pulse axis on -x, so a 90° pulse
        // takes the longitudinal component to +y
        let s = FRAC_1_SQRT_2;
        let mut vox
            = Voxel::new([0.0; 3], 4e-3, 2e-3, 0.0, 1.0, [-s, 0.0, s])
            .unwrap();
        vox.apply_rf(FRAC_PI_2);
        let m = vox.read_state();
        assert!((m[0] + s).abs() < 1e-12);
        assert!((m[1] - s).abs() < 1e-12);
        assert!(m[2].abs() < 1e-12);
    }

    #[test]
    fn longitudinal_recovery_matches_closed_form() {
        let params = rot_params();
        let n = 5000;
        let cases
            = [1e-5_f64, 4e-3].iter()
            .cartesian_product([0.0_f64, -1.0, 0.5])
            .cartesian_product([1.0_f64, 2.0]);
        for ((&t1, k), m0) in cases {
            let mut vox
                = Voxel::new([0.0; 3], t1, t1 / 2.0, 0.0, m0, [0.0, 0.0, k])
                .unwrap();
            for _ in 0..n { vox.evolve(&params); }
            let t = n as f64 * params.dt;
            let expected = m0 + (k - m0) * (-t / t1).exp();
            assert!((vox.read_state()[2] - expected).abs() < 1e-9);
        }
    }

    #[test]
    fn transverse_decay_in_rotating_frame() {
        let params = rot_params();
        let mut vox = Voxel::relaxed(4e-3, 2e-3).unwrap();
        vox.apply_rf(FRAC_PI_2);
        let n = 10_000;
        for _ in 0..n { vox.evolve(&params); }
        let t = n as f64 * params.dt;
        let m = vox.read_state();
        let expected = (-t / vox.t2).exp();
        assert!((m[0].hypot(m[1]) - expected).abs() < 1e-9);
        // no precession in this frame
        assert!(m[0].abs() < 1e-12);
    }

    #[test]
    fn lab_frame_precession_at_larmor_frequency() {
        let params = SimParams::default();
        let mut vox
            = Voxel::new([0.0; 3], 1e6, 1e6, 0.0, 1.0, [0.0, 0.0, 1.0])
            .unwrap();
        vox.apply_rf(FRAC_PI_2); // m ≈ (0, -1, 0)
        let n = 1000;
        for _ in 0..n { vox.evolve(&params); }
        let m = vox.read_state();
        let expected
            = (-FRAC_PI_2 + n as f64 * params.step_phase()).rem_euclid(TAU);
        let measured = m[1].atan2(m[0]).rem_euclid(TAU);
        let diff = (measured - expected).rem_euclid(TAU);
        assert!(diff.min(TAU - diff) < 1e-6);
    }

    #[test]
    fn read_state_has_no_side_effects() {
        let vox = Voxel::relaxed(4e-3, 2e-3).unwrap();
        let a = vox.read_state().to_owned();
        let b = vox.read_state().to_owned();
        assert_eq!(a, b);
    }

    #[test]
    fn gradient_seam_is_inert() {
        let mut vox = Voxel::relaxed(4e-3, 2e-3).unwrap();
        let before = vox.read_state().to_owned();
        vox.apply_gradient([0.0, 0.0, 1e-3]);
        assert_eq!(vox.read_state().to_owned(), before);
    }

    #[test]
    fn rejects_nonpositive_relaxation_times() {
        assert!(matches!(
            Voxel::relaxed(0.0, 2e-3),
            Err(Error::InvalidRelaxation { .. }),
        ));
        assert!(matches!(
            Voxel::relaxed(4e-3, -1.0),
            Err(Error::InvalidRelaxation { .. }),
        ));
        // t2 > t1 is unusual but allowed
        assert!(Voxel::relaxed(1e-3, 2e-3).is_ok());
    }
}
