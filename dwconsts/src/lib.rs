use std::f64;
use types::c64;

// units : length

pub const BOHR_TO_ANG: f64 = 0.529177249;
pub const ANG_TO_BOHR: f64 = 1.0 / BOHR_TO_ANG;

// units : energy

pub const RY_TO_EV: f64 = 13.605698066;
pub const HA_TO_EV: f64 = 2.0 * RY_TO_EV;
pub const HA_TO_RY: f64 = 2.0;
pub const EV_TO_HA: f64 = 1.0 / HA_TO_EV;

//

pub const ONE_C64: c64 = c64 { re: 1.0, im: 0.0 };
pub const I_C64: c64 = c64 { re: 0.0, im: 1.0 };

// pi

pub const PI: f64 = f64::consts::PI;
pub const TWOPI: f64 = 2.0 * f64::consts::PI;
pub const FOURPI: f64 = 4.0 * f64::consts::PI;

// numerical convergence

pub const EPS3: f64 = 1E-3;
pub const EPS8: f64 = 1E-8;
pub const EPS20: f64 = 1E-20;

/// i^l for integer l >= 0
pub fn i_pow(l: usize) -> c64 {
    match l % 4 {
        0 => ONE_C64,
        1 => I_C64,
        2 => -ONE_C64,
        _ => -I_C64,
    }
}

#[test]
fn test_i_pow_cycles() {
    assert_eq!(i_pow(0), ONE_C64);
    assert_eq!(i_pow(1), I_C64);
    assert_eq!(i_pow(2), -ONE_C64);
    assert_eq!(i_pow(3), -I_C64);
    assert_eq!(i_pow(6), -ONE_C64);
}
