use super::gf256::Gf256;
use super::poly::GfPoly;

/// Systematic Reed-Solomon encoder
///
/// Generator polynomials are built lazily and cached per instance, so one
/// encoder can serve every block of a symbol.
#[derive(Debug, Default)]
pub struct ReedSolomonEncoder {
    // generators[k] has degree k
    generators: Vec<GfPoly>,
}

impl ReedSolomonEncoder {
    /// Encoder with only the trivial generator cached
    pub fn new() -> Self {
        Self {
            generators: vec![GfPoly::one()],
        }
    }

    /// Product of (x + alpha^n) for n in 0..degree
    pub fn generator(&mut self, degree: usize) -> &GfPoly {
        if self.generators.is_empty() {
            self.generators.push(GfPoly::one());
        }
        while self.generators.len() <= degree {
            let d = self.generators.len() - 1;
            let next = self.generators[d].multiply(&GfPoly::new(&[1, Gf256::exp(d)]));
            self.generators.push(next);
        }
        &self.generators[degree]
    }

    /// Parity bytes for `data` with `ec_words` EC codewords
    pub fn encode(&mut self, data: &[u8], ec_words: usize) -> Vec<u8> {
        if ec_words == 0 {
            return Vec::new();
        }
        let generator = self.generator(ec_words).coefficients();
        let mut remainder = vec![0u8; ec_words];
        for &byte in data {
            let factor = byte ^ remainder[0];
            remainder.rotate_left(1);
            remainder[ec_words - 1] = 0;
            for (slot, &g) in remainder.iter_mut().zip(&generator[1..]) {
                *slot ^= Gf256::mul(g, factor);
            }
        }
        remainder
    }

    /// `data` followed by its parity bytes
    pub fn encode_block(&mut self, data: &[u8], ec_words: usize) -> Vec<u8> {
        let mut block = Vec::with_capacity(data.len() + ec_words);
        block.extend_from_slice(data);
        block.extend(self.encode(data, ec_words));
        block
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generator_roots() {
        let mut encoder = ReedSolomonEncoder::new();
        let g = encoder.generator(10).clone();
        assert_eq!(g.degree(), 10);
        assert_eq!(g.coefficient(10), 1);
        for i in 0..10 {
            assert_eq!(g.evaluate_at(Gf256::exp(i)), 0, "alpha^{i}");
        }
        assert_ne!(g.evaluate_at(Gf256::exp(10)), 0);
    }

    #[test]
    fn test_known_version1_m_block() {
        // "01234567" in numeric mode, 1-M (ISO/IEC 18004 Annex I)
        let data = [
            0x10, 0x20, 0x0C, 0x56, 0x61, 0x80, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11, 0xEC, 0x11,
            0xEC, 0x11,
        ];
        let mut encoder = ReedSolomonEncoder::new();
        let ec = encoder.encode(&data, 10);
        assert_eq!(ec, vec![0xA5, 0x24, 0xD4, 0xC1, 0xED, 0x36, 0xC7, 0x87, 0x2C, 0x55]);
    }

    #[test]
    fn test_codeword_is_multiple_of_generator() {
        let mut encoder = ReedSolomonEncoder::new();
        let data: Vec<u8> = (0..30u8).map(|i| i.wrapping_mul(37).wrapping_add(11)).collect();
        let block = encoder.encode_block(&data, 16);
        let codeword = GfPoly::new(&block);
        for i in 0..16 {
            assert_eq!(codeword.evaluate_at(Gf256::exp(i)), 0);
        }
    }
}
