use crate::{Vector3, Vector3f64};

pub type Vector3i32 = Vector3<i32>;

use std::fmt;
use std::ops::Add;

impl Vector3i32 {
    pub fn to_f64(&self) -> Vector3f64 {
        Vector3f64::new(f64::from(self.x), f64::from(self.y), f64::from(self.z))
    }
}

impl Add<Vector3i32> for Vector3i32 {
    type Output = Vector3i32;

    fn add(self, rhs: Vector3i32) -> Vector3i32 {
        Vector3i32::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl fmt::Display for Vector3i32 {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{} {} {}", self.x, self.y, self.z)
    }
}
