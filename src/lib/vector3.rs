use std::fmt::{Display, Debug};

use num_traits::PrimInt;
use tinyjson::JsonValue;

#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct Vector3<T> {
    pub x: T,
    pub y: T,
    pub z: T
}

impl<T> Vector3<T> {
    pub fn from_xyz(x: T, y: T, z: T) -> Self {
        return Self { x, y, z };
    }
}

impl<T: PrimInt> Vector3<T> {
    /// Key that orders grid coordinates slab by slab:
    /// first by z, then y, then x.
    pub fn zyx(&self) -> (T, T, T) {
        return (self.z, self.y, self.x);
    }
}

impl<T: Display> Vector3<T> {
    /// Renders the coordinate the way DVID expects it in block
    /// endpoints, e.g. `0_3_7` for x=0, y=3, z=7.
    pub fn to_dvid_coord(&self) -> String {
        return format!("{}_{}_{}", self.x, self.y, self.z);
    }
}

impl Vector3<u32> {
    /// Converts 3D vector (u32) to JSON array.
    pub fn to_json(&self) -> JsonValue {
        let v = vec![
            (self.x as f64).into(),
            (self.y as f64).into(),
            (self.z as f64).into()
        ];
        return v.into();
    }
}

impl<T: Display> Display for Vector3<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "[{} {} {}]", self.x, self.y, self.z);
    }
}

impl<T: Debug> Debug for Vector3<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        return write!(f, "[{:?} {:?} {:?}]", self.x, self.y, self.z);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dvid_coord_is_underscore_separated_xyz() {
        let v = Vector3::from_xyz(0u32, 3, 7);
        assert_eq!(v.to_dvid_coord(), "0_3_7");
        assert_eq!(v.to_string(), "[0 3 7]");
    }

    #[test]
    fn zyx_orders_by_slab_first() {
        let a = Vector3::from_xyz(0u32, 9, 1);
        let b = Vector3::from_xyz(0u32, 0, 2);
        assert!(a.zyx() < b.zyx());
    }

    #[test]
    fn json_is_three_numbers() {
        let j = Vector3::from_xyz(0u32, 3, 7).to_json();
        assert_eq!(j.stringify().unwrap(), "[0,3,7]");
    }
}
