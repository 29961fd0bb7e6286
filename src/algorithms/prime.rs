//! Generation of random primes.

use num_bigint::prime::probably_prime;
use num_bigint::BigUint;
use num_traits::ToPrimitive;
use rand_core::CryptoRngCore;
use zeroize::{Zeroize, Zeroizing};

use crate::errors::{Error, Result};

/// A list of small, prime numbers that allows us to rapidly
/// exclude some fraction of composite candidates when searching for a random
/// prime. This list is truncated at the point where smallPrimesProduct exceeds
/// a u64. It does not include two because we ensure that the candidates are
/// odd by construction.
const SMALL_PRIMES: [u8; 15] = [3, 5, 7, 11, 13, 17, 19, 23, 29, 31, 37, 41, 43, 47, 53];

/// The product of the values in SMALL_PRIMES.
const SMALL_PRIMES_PRODUCT: u64 = 16_294_579_238_595_022_365;

/// Miller-Rabin rounds applied to each candidate, on top of Baillie-PSW.
const PRIME_ROUNDS: usize = 20;

/// Generates a random prime of exactly `bit_size` bits with its two most
/// significant bits set, so that the product of two such primes is never one
/// bit short.
///
/// Entropy is read with `try_fill_bytes`; a failing source aborts the search
/// with [`Error::Generation`].
pub(crate) fn generate_prime<R: CryptoRngCore + ?Sized>(
    rng: &mut R,
    bit_size: usize,
) -> Result<BigUint> {
    if bit_size < 2 {
        return Err(Error::InvalidPrime);
    }

    let mut b = bit_size % 8;
    if b == 0 {
        b = 8;
    }

    let bytes_len = (bit_size + 7) / 8;
    let mut bytes = Zeroizing::new(vec![0u8; bytes_len]);
    let small_primes_product = BigUint::from(SMALL_PRIMES_PRODUCT);

    loop {
        rng.try_fill_bytes(&mut bytes[..])
            .map_err(Error::generation)?;
        // Clear bits in the first byte to make sure the candidate has a size <= bits.
        bytes[0] &= ((1u32 << (b as u32)) - 1) as u8;

        // Don't let the value be too small, i.e, set the most significant two bits.
        if b >= 2 {
            bytes[0] |= 3u8.wrapping_shl(b as u32 - 2);
        } else {
            // Here b==1, because b cannot be zero.
            bytes[0] |= 1;
            if bytes_len > 1 {
                bytes[1] |= 0x80;
            }
        }

        // Make the value odd since an even number this large certainly isn't prime.
        bytes[bytes_len - 1] |= 1u8;

        let mut p = BigUint::from_bytes_be(&bytes);
        // always fits, the modulus is a u64
        let rem = (&p % &small_primes_product)
            .to_u64()
            .ok_or(Error::InvalidPrime)?;

        'next: for delta in (0u64..1 << 20).step_by(2) {
            let m = rem + delta;

            for prime in &SMALL_PRIMES {
                if m % u64::from(*prime) == 0 && (bit_size > 6 || m != u64::from(*prime)) {
                    continue 'next;
                }
            }

            if delta > 0 {
                p += BigUint::from(delta);
            }

            break;
        }

        // There is a tiny possibility that, by adding delta, we caused
        // the number to be one bit too long. Thus we check bit length here.
        if p.bits() == bit_size && probably_prime(&p, PRIME_ROUNDS) {
            return Ok(p);
        }
        p.zeroize();
    }
}
