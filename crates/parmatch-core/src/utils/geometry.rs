use nalgebra::Point3;

pub fn distance(a: &Point3<f64>, b: &Point3<f64>) -> f64 {
    (a - b).norm()
}

/// Interior angle at `apex`, in radians.
pub fn bond_angle(a: &Point3<f64>, apex: &Point3<f64>, c: &Point3<f64>) -> f64 {
    let u = a - apex;
    let v = c - apex;
    u.angle(&v)
}

/// Signed dihedral angle of the chain a-b-c-d about the b-c axis, in
/// radians within (-pi, pi]. Planar cis arrangements yield 0, trans pi.
pub fn dihedral_angle(
    a: &Point3<f64>,
    b: &Point3<f64>,
    c: &Point3<f64>,
    d: &Point3<f64>,
) -> f64 {
    let b1 = b - a;
    let b2 = c - b;
    let b3 = d - c;

    let n1 = b1.cross(&b2);
    let n2 = b2.cross(&b3);
    let m = n1.cross(&b2.normalize());

    m.dot(&n2).atan2(n1.dot(&n2))
}
