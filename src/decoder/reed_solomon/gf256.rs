//! GF(256) arithmetic over the QR primitive polynomial
//! x^8 + x^4 + x^3 + x^2 + 1 (0x11D).

use std::sync::OnceLock;

const PRIMITIVE: u16 = 0x11D;

struct Tables {
    exp: [u8; 256],
    log: [u8; 256],
}

static TABLES: OnceLock<Tables> = OnceLock::new();

fn tables() -> &'static Tables {
    TABLES.get_or_init(|| {
        let mut exp = [0u8; 256];
        let mut log = [0u8; 256];
        let mut x: u16 = 1;
        for (i, slot) in exp.iter_mut().enumerate() {
            *slot = x as u8;
            x <<= 1;
            if x >= 0x100 {
                x ^= PRIMITIVE;
            }
            // exp[255] wraps back to 1 and must not overwrite log[1]
            if i < 255 {
                log[*slot as usize] = i as u8;
            }
        }
        Tables { exp, log }
    })
}

/// GF(256) field operations using log/exp tables
pub struct Gf256;

impl Gf256 {
    /// alpha^power
    pub fn exp(power: usize) -> u8 {
        tables().exp[power % 255]
    }

    /// Discrete log of a non-zero element
    pub fn log(a: u8) -> usize {
        debug_assert!(a != 0, "log(0) is undefined");
        tables().log[a as usize] as usize
    }

    /// Field addition and subtraction are both XOR
    pub fn add(a: u8, b: u8) -> u8 {
        a ^ b
    }

    /// Field product
    pub fn mul(a: u8, b: u8) -> u8 {
        if a == 0 || b == 0 {
            return 0;
        }
        let t = tables();
        t.exp[(t.log[a as usize] as usize + t.log[b as usize] as usize) % 255]
    }

    /// Multiplicative inverse; `inverse(0)` is defined as 0
    pub fn inverse(a: u8) -> u8 {
        if a == 0 {
            return 0;
        }
        let t = tables();
        t.exp[255 - t.log[a as usize] as usize]
    }

    /// a / b for non-zero `b`
    pub fn div(a: u8, b: u8) -> u8 {
        Self::mul(a, Self::inverse(b))
    }

    /// a^n
    pub fn pow(a: u8, n: usize) -> u8 {
        if a == 0 {
            return if n == 0 { 1 } else { 0 };
        }
        Self::exp(Self::log(a) * (n % 255))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_values() {
        assert_eq!(Gf256::exp(0), 1);
        assert_eq!(Gf256::exp(8), 29);
        assert_eq!(Gf256::exp(255), 1);
        assert_eq!(Gf256::log(2), 1);
        assert_eq!(Gf256::mul(2, 128), 29);
    }

    #[test]
    fn test_inverse_identity() {
        for a in 1..=255u8 {
            assert_eq!(Gf256::mul(a, Gf256::inverse(a)), 1, "a = {a}");
        }
    }

    #[test]
    fn test_addition_laws() {
        for a in 0..=255u8 {
            assert_eq!(Gf256::add(a, a), 0);
            for b in (0..=255u8).step_by(7) {
                assert_eq!(Gf256::add(a, b), Gf256::add(b, a));
            }
        }
    }

    #[test]
    fn test_log_exp_permutation() {
        let mut seen = [false; 256];
        for i in 0..255 {
            let v = Gf256::exp(i);
            assert!(!seen[v as usize]);
            seen[v as usize] = true;
            assert_eq!(Gf256::log(v), i);
        }
        assert!(!seen[0]);
    }

    #[test]
    fn test_div_and_pow() {
        for a in 1..=255u8 {
            assert_eq!(Gf256::div(a, a), 1);
            assert_eq!(Gf256::pow(a, 255), 1);
        }
        assert_eq!(Gf256::pow(0, 0), 1);
        assert_eq!(Gf256::pow(0, 3), 0);
        assert_eq!(Gf256::pow(2, 8), 29);
    }
}
