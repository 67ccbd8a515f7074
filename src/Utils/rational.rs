use num_integer::Integer;
use num_rational::Ratio;

/// Closest fraction to `x` whose denominator does not exceed `max_denominator`.
/// Walks the continued-fraction expansion of `x` and compares the last convergent
/// with the best semiconvergent, the same way `Fraction.limit_denominator` does.
/// Returns None for non-finite input or a zero denominator bound.
pub fn limit_denominator(x: f64, max_denominator: i64) -> Option<Ratio<i64>> {
    if !x.is_finite() || max_denominator < 1 {
        return None;
    }
    let sign = if x < 0.0 { -1 } else { 1 };
    let value = x.abs();
    let (mut p0, mut q0, mut p1, mut q1) = (0i64, 1i64, 1i64, 0i64);
    let mut rem = value;
    loop {
        let a_float = rem.floor();
        if a_float > (i64::MAX / 4) as f64 {
            break;
        }
        let a = a_float as i64;
        let q2 = match a.checked_mul(q1).and_then(|v| v.checked_add(q0)) {
            Some(q2) => q2,
            None => break,
        };
        if q2 > max_denominator {
            break;
        }
        let p2 = match a.checked_mul(p1).and_then(|v| v.checked_add(p0)) {
            Some(p2) => p2,
            None => break,
        };
        p0 = p1;
        q0 = q1;
        p1 = p2;
        q1 = q2;
        let frac = rem - a_float;
        if frac < 1e-12 {
            return Some(Ratio::new(sign * p1, q1));
        }
        rem = 1.0 / frac;
    }
    if q1 == 0 {
        return None;
    }
    let k = (max_denominator - q0) / q1;
    let bound1 = Ratio::new(p0 + k * p1, q0 + k * q1);
    let bound2 = Ratio::new(p1, q1);
    let dist = |r: &Ratio<i64>| (*r.numer() as f64 / *r.denom() as f64 - value).abs();
    let best = if dist(&bound2) <= dist(&bound1) {
        bound2
    } else {
        bound1
    };
    Some(best * sign)
}

/// Greatest common divisor of all values (0 for an empty slice)
pub fn gcd_of(values: &[i64]) -> i64 {
    values.iter().fold(0i64, |acc, v| acc.gcd(v))
}

/// Least common multiple of all values (1 for an empty slice)
pub fn lcm_of(values: &[i64]) -> i64 {
    values.iter().fold(1i64, |acc, v| acc.lcm(v))
}

pub fn round_to(x: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    (x * factor).round() / factor
}

/// Display form of coefficients in reaction strings and tables: integers without a
/// fractional part, everything else trimmed to 8 places.
pub fn format_number(x: f64) -> String {
    if (x - x.round()).abs() < 1e-9 {
        format!("{}", x.round() as i64)
    } else {
        let s = format!("{:.8}", x);
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}
