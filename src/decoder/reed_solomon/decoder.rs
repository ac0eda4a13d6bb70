use log::trace;

use super::gf256::Gf256;
use super::poly::GfPoly;
use crate::error::ReedSolomonError;

/// Reed-Solomon decoder for QR codes
///
/// Syndromes are taken at alpha^0..alpha^(ec-1); the locator and evaluator
/// come from the extended Euclidean algorithm, roots from a Chien search
/// and magnitudes from Forney's formula.
pub struct ReedSolomonDecoder {
    num_ecc_codewords: usize,
}

impl ReedSolomonDecoder {
    /// Decoder for blocks carrying `num_ecc_codewords` EC codewords
    pub fn new(num_ecc_codewords: usize) -> Self {
        Self { num_ecc_codewords }
    }

    /// Correct `received` in place, returning the number of repaired codewords
    pub fn decode(&self, received: &mut [u8]) -> Result<usize, ReedSolomonError> {
        let ec = self.num_ecc_codewords;
        let syndrome = match Self::syndrome(received, ec) {
            Some(s) => s,
            None => return Ok(0),
        };

        let (sigma, omega) = Self::euclidean(GfPoly::monomial(ec, 1), syndrome, ec)?;
        let errors = sigma.degree();
        if errors == 0 {
            return Err(ReedSolomonError::DegenerateLocator);
        }
        if 2 * errors > ec {
            return Err(ReedSolomonError::TooManyErrors {
                errors,
                ec_words: ec,
            });
        }

        let locations = Self::error_locations(&sigma)?;
        let magnitudes = Self::error_magnitudes(&omega, &locations);

        let n = received.len();
        for (&location, &magnitude) in locations.iter().zip(&magnitudes) {
            let log = Gf256::log(location);
            if log >= n {
                return Err(ReedSolomonError::PositionOutOfRange {
                    position: log,
                    length: n,
                });
            }
            let position = n - 1 - log;
            trace!("rs: correcting codeword {position} by {magnitude:#04x}");
            received[position] ^= magnitude;
        }

        if Self::syndrome(received, ec).is_some() {
            return Err(ReedSolomonError::Residual);
        }
        Ok(errors)
    }

    /// Syndrome polynomial, or `None` when every syndrome is zero
    fn syndrome(received: &[u8], ec: usize) -> Option<GfPoly> {
        let codeword = GfPoly::new(received);
        let mut coefficients = vec![0u8; ec];
        let mut clean = true;
        for i in 0..ec {
            let value = codeword.evaluate_at(Gf256::exp(i));
            coefficients[ec - 1 - i] = value;
            clean &= value == 0;
        }
        (!clean).then(|| GfPoly::new(&coefficients))
    }

    /// Returns (sigma, omega) normalised so that sigma(0) == 1
    fn euclidean(
        a: GfPoly,
        b: GfPoly,
        ec: usize,
    ) -> Result<(GfPoly, GfPoly), ReedSolomonError> {
        let (mut r_last, mut r) = if a.degree() < b.degree() { (b, a) } else { (a, b) };
        let mut t_last = GfPoly::zero();
        let mut t = GfPoly::one();

        while r.degree() >= ec / 2 {
            let r_last_last = r_last;
            let t_last_last = t_last;
            r_last = r;
            t_last = t;

            if r_last.is_zero() {
                return Err(ReedSolomonError::Divergent);
            }
            let (q, remainder) = r_last_last
                .divide(&r_last)
                .ok_or(ReedSolomonError::Divergent)?;
            r = remainder;
            t = q.multiply(&t_last).add(&t_last_last);

            if !r.is_zero() && r.degree() >= r_last.degree() {
                return Err(ReedSolomonError::Divergent);
            }
        }

        let sigma_at_zero = t.coefficient(0);
        if sigma_at_zero == 0 {
            return Err(ReedSolomonError::DegenerateLocator);
        }
        let inverse = Gf256::inverse(sigma_at_zero);
        Ok((t.multiply_scalar(inverse), r.multiply_scalar(inverse)))
    }

    /// Error locators X_i, the inverses of sigma's roots
    fn error_locations(sigma: &GfPoly) -> Result<Vec<u8>, ReedSolomonError> {
        let expected = sigma.degree();
        if expected == 1 {
            return Ok(vec![sigma.coefficient(1)]);
        }
        let mut locations = Vec::with_capacity(expected);
        for x in 1..=255u8 {
            if locations.len() == expected {
                break;
            }
            if sigma.evaluate_at(x) == 0 {
                locations.push(Gf256::inverse(x));
            }
        }
        if locations.len() != expected {
            return Err(ReedSolomonError::RootCount {
                expected,
                found: locations.len(),
            });
        }
        Ok(locations)
    }

    /// Forney: omega(X_i^-1) / prod_{j != i}(1 + X_j X_i^-1)
    fn error_magnitudes(omega: &GfPoly, locations: &[u8]) -> Vec<u8> {
        locations
            .iter()
            .enumerate()
            .map(|(i, &xi)| {
                let xi_inverse = Gf256::inverse(xi);
                let denominator = locations
                    .iter()
                    .enumerate()
                    .filter(|&(j, _)| j != i)
                    .fold(1u8, |acc, (_, &xj)| {
                        Gf256::mul(acc, 1 ^ Gf256::mul(xj, xi_inverse))
                    });
                Gf256::mul(omega.evaluate_at(xi_inverse), Gf256::inverse(denominator))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decoder::reed_solomon::ReedSolomonEncoder;

    struct XorShift(u32);

    impl XorShift {
        fn next(&mut self) -> u32 {
            self.0 ^= self.0 << 13;
            self.0 ^= self.0 >> 17;
            self.0 ^= self.0 << 5;
            self.0
        }
    }

    fn corrupt(codeword: &mut [u8], count: usize, rng: &mut XorShift) {
        let mut positions: Vec<usize> = Vec::new();
        while positions.len() < count {
            let p = rng.next() as usize % codeword.len();
            if !positions.contains(&p) {
                positions.push(p);
            }
        }
        for p in positions {
            codeword[p] ^= (rng.next() % 255 + 1) as u8;
        }
    }

    fn random_codeword(rng: &mut XorShift, data_len: usize, ec: usize) -> Vec<u8> {
        let data: Vec<u8> = (0..data_len).map(|_| rng.next() as u8).collect();
        ReedSolomonEncoder::new().encode_block(&data, ec)
    }

    #[test]
    fn test_clean_codeword() {
        let mut rng = XorShift(1);
        let mut codeword = random_codeword(&mut rng, 20, 10);
        let decoder = ReedSolomonDecoder::new(10);
        assert_eq!(decoder.decode(&mut codeword), Ok(0));
    }

    #[test]
    fn test_corrects_up_to_capacity() {
        let mut rng = XorShift(0x1234_5678);
        let decoder = ReedSolomonDecoder::new(16);
        for trial in 0..40 {
            let original = random_codeword(&mut rng, 20, 16);
            for errors in 1..=8 {
                let mut received = original.clone();
                corrupt(&mut received, errors, &mut rng);
                assert_eq!(
                    decoder.decode(&mut received),
                    Ok(errors),
                    "trial {trial}, {errors} errors"
                );
                assert_eq!(received, original);
            }
        }
    }

    #[test]
    fn test_fails_beyond_capacity() {
        let mut rng = XorShift(0xDEAD_BEEF);
        let decoder = ReedSolomonDecoder::new(16);
        for trial in 0..40 {
            let original = random_codeword(&mut rng, 20, 16);
            let mut received = original.clone();
            corrupt(&mut received, 9, &mut rng);
            assert!(decoder.decode(&mut received).is_err(), "trial {trial}");
        }
    }

    #[test]
    fn test_single_error_in_every_position() {
        let mut rng = XorShift(77);
        let original = random_codeword(&mut rng, 9, 17);
        let decoder = ReedSolomonDecoder::new(17);
        for pos in 0..original.len() {
            let mut received = original.clone();
            received[pos] ^= 0x5A;
            assert_eq!(decoder.decode(&mut received), Ok(1));
            assert_eq!(received, original);
        }
    }
}
