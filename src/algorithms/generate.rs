//! Generate the parameters of a two-prime RSA private key

use num_bigint::{BigUint, ModInverse, ToBigUint};
use num_traits::One;
use rand_core::CryptoRngCore;
use zeroize::Zeroizing;

use super::prime::generate_prime;
use crate::errors::{Error, Result};
use crate::params::PrivateParams;

/// Generates a two-prime RSA key of the given bit size and public exponent
/// from the given random source.
///
/// Intermediate secrets are zeroized whether or not generation succeeds.
pub(crate) fn generate_private_params<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
    exp: &BigUint,
) -> Result<PrivateParams> {
    const NPRIMES: usize = 2;

    if bit_size < 64 {
        let prime_limit = (1u64 << (bit_size / NPRIMES) as u64) as f64;

        // pi approximates the number of primes less than prime_limit

        // Calculate `log(prime_limit)` as `log(x) = log2(x) / log2(e) = log2(x) * log(2)`.
        let mut pi = prime_limit / ((bit_size / NPRIMES) as f64 * core::f64::consts::LN_2 - 1.);

        // Generated primes start with 0b11, so we can only use a quarter of them.
        pi /= 4f64;
        // Use a factor of two to ensure that key generation terminates in a
        // reasonable amount of time.
        pi /= 2f64;

        if pi < NPRIMES as f64 {
            return Err(Error::TooFewPrimes);
        }
    }

    loop {
        // `generate_prime` sets the top two bits of each prime, so the
        // product of two primes of bit_size / 2 bits has exactly bit_size
        // bits.
        let p = Zeroizing::new(generate_prime(rng, bit_size / NPRIMES)?);
        let q = Zeroizing::new(generate_prime(rng, bit_size - p.bits())?);

        if *p == *q {
            continue;
        }

        let n = &*p * &*q;
        if n.bits() != bit_size {
            continue;
        }

        let p1 = Zeroizing::new(&*p - BigUint::one());
        let q1 = Zeroizing::new(&*q - BigUint::one());
        let totient = Zeroizing::new(&*p1 * &*q1);

        // `mod_inverse` fails if `exp` shares a factor with the totient,
        // i.e. with one of `prime - 1`. Pick new primes in that case.
        let d = match exp
            .clone()
            .mod_inverse(&*totient)
            .and_then(|d| d.to_biguint())
        {
            Some(d) => Zeroizing::new(d),
            None => continue,
        };

        let dmp1 = &*d % &*p1;
        let dmq1 = &*d % &*q1;
        let iqmp = BigUint::clone(&q)
            .mod_inverse(&*p)
            .and_then(|v| v.to_biguint())
            .ok_or(Error::InvalidCoefficient)?;

        return Ok(PrivateParams::new(
            n,
            exp.clone(),
            BigUint::clone(&d),
            BigUint::clone(&p),
            BigUint::clone(&q),
            dmp1,
            dmq1,
            iqmp,
        ));
    }
}
