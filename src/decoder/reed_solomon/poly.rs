use super::gf256::Gf256;

/// Polynomial over GF(256), coefficients stored highest degree first
///
/// Always normalised: the leading coefficient is non-zero unless the
/// polynomial is the zero polynomial `[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GfPoly {
    coefficients: Vec<u8>,
}

impl GfPoly {
    /// Build from coefficients (highest degree first), stripping leading zeros
    pub fn new(coefficients: &[u8]) -> Self {
        match coefficients.iter().position(|&c| c != 0) {
            Some(first) => Self {
                coefficients: coefficients[first..].to_vec(),
            },
            None => Self::zero(),
        }
    }

    /// The zero polynomial
    pub fn zero() -> Self {
        Self {
            coefficients: vec![0],
        }
    }

    /// The constant 1
    pub fn one() -> Self {
        Self {
            coefficients: vec![1],
        }
    }

    /// coefficient * x^degree
    pub fn monomial(degree: usize, coefficient: u8) -> Self {
        if coefficient == 0 {
            return Self::zero();
        }
        let mut coefficients = vec![0u8; degree + 1];
        coefficients[0] = coefficient;
        Self { coefficients }
    }

    /// Coefficients, highest degree first
    pub fn coefficients(&self) -> &[u8] {
        &self.coefficients
    }

    /// Degree (0 for constants, including zero)
    pub fn degree(&self) -> usize {
        self.coefficients.len() - 1
    }

    /// True for the zero polynomial
    pub fn is_zero(&self) -> bool {
        self.coefficients[0] == 0
    }

    /// Coefficient of x^degree
    pub fn coefficient(&self, degree: usize) -> u8 {
        if degree > self.degree() {
            return 0;
        }
        self.coefficients[self.coefficients.len() - 1 - degree]
    }

    /// Horner evaluation at `x`
    pub fn evaluate_at(&self, x: u8) -> u8 {
        if x == 0 {
            return self.coefficient(0);
        }
        self.coefficients
            .iter()
            .fold(0u8, |acc, &c| Gf256::mul(acc, x) ^ c)
    }

    /// Sum (equivalently, difference)
    pub fn add(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() {
            return other.clone();
        }
        if other.is_zero() {
            return self.clone();
        }
        let (longer, shorter) = if self.coefficients.len() >= other.coefficients.len() {
            (&self.coefficients, &other.coefficients)
        } else {
            (&other.coefficients, &self.coefficients)
        };
        let offset = longer.len() - shorter.len();
        let mut sum = longer.clone();
        for (slot, &c) in sum[offset..].iter_mut().zip(shorter.iter()) {
            *slot ^= c;
        }
        GfPoly::new(&sum)
    }

    /// Product
    pub fn multiply(&self, other: &GfPoly) -> GfPoly {
        if self.is_zero() || other.is_zero() {
            return GfPoly::zero();
        }
        let mut product = vec![0u8; self.coefficients.len() + other.coefficients.len() - 1];
        for (i, &a) in self.coefficients.iter().enumerate() {
            for (j, &b) in other.coefficients.iter().enumerate() {
                product[i + j] ^= Gf256::mul(a, b);
            }
        }
        GfPoly::new(&product)
    }

    /// Multiply every coefficient by `scalar`
    pub fn multiply_scalar(&self, scalar: u8) -> GfPoly {
        if scalar == 0 {
            return GfPoly::zero();
        }
        if scalar == 1 {
            return self.clone();
        }
        let scaled: Vec<u8> = self
            .coefficients
            .iter()
            .map(|&c| Gf256::mul(c, scalar))
            .collect();
        GfPoly::new(&scaled)
    }

    /// self * coefficient * x^degree
    pub fn multiply_by_monomial(&self, degree: usize, coefficient: u8) -> GfPoly {
        if coefficient == 0 || self.is_zero() {
            return GfPoly::zero();
        }
        let mut product: Vec<u8> = self
            .coefficients
            .iter()
            .map(|&c| Gf256::mul(c, coefficient))
            .collect();
        product.resize(product.len() + degree, 0);
        GfPoly::new(&product)
    }

    /// Long division, returning `(quotient, remainder)`; `None` for a zero divisor
    pub fn divide(&self, divisor: &GfPoly) -> Option<(GfPoly, GfPoly)> {
        if divisor.is_zero() {
            return None;
        }
        let mut quotient = GfPoly::zero();
        let mut remainder = self.clone();
        let lead_inverse = Gf256::inverse(divisor.coefficient(divisor.degree()));

        while !remainder.is_zero() && remainder.degree() >= divisor.degree() {
            let degree_diff = remainder.degree() - divisor.degree();
            let scale = Gf256::mul(remainder.coefficient(remainder.degree()), lead_inverse);
            quotient = quotient.add(&GfPoly::monomial(degree_diff, scale));
            remainder = remainder.add(&divisor.multiply_by_monomial(degree_diff, scale));
        }
        Some((quotient, remainder))
    }
}
