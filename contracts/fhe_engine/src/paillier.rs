use soroban_sdk::{contracttype, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierPublicKey {
    pub n: i128,  // n = p * q
    pub nn: i128, // n^2
    pub g: i128,  // g = n + 1
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierPrivateKey {
    pub lambda: i128, // phi(n) = (p-1)(q-1)
    pub mu: i128,     // L(g^lambda mod n^2)^-1 mod n
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PaillierKeyPair {
    pub public: PaillierPublicKey,
    pub private: PaillierPrivateKey,
}

impl PaillierKeyPair {
    /// Derives a key pair from two distinct primes.
    ///
    /// Returns `None` when the modulus is degenerate or too large for
    /// ciphertext products (`nn * nn`) to fit in an `i128`.
    pub fn from_primes(p: i128, q: i128) -> Option<Self> {
        if p < 2 || q < 2 || p == q {
            return None;
        }
        let n = p.checked_mul(q)?;
        let nn = n.checked_mul(n)?;
        nn.checked_mul(nn)?;

        let lambda = (p - 1).checked_mul(q - 1)?;
        if Paillier::gcd(n, lambda) != 1 {
            return None;
        }
        // With g = n + 1, L(g^lambda mod n^2) = lambda mod n.
        let mu = Paillier::mod_inverse(lambda % n, n)?;

        Some(PaillierKeyPair {
            public: PaillierPublicKey { n, nn, g: n + 1 },
            private: PaillierPrivateKey { lambda, mu },
        })
    }
}

impl PaillierPublicKey {
    /// Structural checks for a key supplied from outside the contract.
    ///
    /// The smallest modulus built from two distinct primes is 6, which also
    /// leaves `[2, n)` non-empty for drawing randomness.
    pub fn is_well_formed(&self) -> bool {
        self.n >= 6
            && self.n.checked_mul(self.n) == Some(self.nn)
            && self.nn.checked_mul(self.nn).is_some()
            && self.g == self.n + 1
    }
}

impl PaillierPrivateKey {
    /// `lambda` is coprime to `n` and `mu` is its inverse mod `n`.
    pub fn matches(&self, pub_key: &PaillierPublicKey) -> bool {
        self.lambda > 0
            && Paillier::gcd(pub_key.n, self.lambda) == 1
            && Paillier::mod_inverse(self.lambda % pub_key.n, pub_key.n) == Some(self.mu)
    }
}

pub struct Paillier;

impl Paillier {
    /// c = (g^m * r^n) mod n^2 with a fresh unit `r` from the ledger PRNG.
    ///
    /// Returns `None` unless `0 <= m < n`.
    pub fn encrypt(env: &Env, pub_key: &PaillierPublicKey, m: i128) -> Option<i128> {
        if m < 0 || m >= pub_key.n {
            return None;
        }
        let nn = pub_key.nn;
        let r = Self::random_unit(env, pub_key.n);

        let gm = Self::pow_mod(pub_key.g, m, nn);
        let rn = Self::pow_mod(r, pub_key.n, nn);

        Some((gm * rn) % nn)
    }

    pub fn decrypt(pub_key: &PaillierPublicKey, priv_key: &PaillierPrivateKey, c: i128) -> i128 {
        let n = pub_key.n;
        let nn = pub_key.nn;

        // L(u) = (u - 1) / n
        // m = L(c^lambda mod n^2) * mu mod n
        let u = Self::pow_mod(c, priv_key.lambda, nn);
        let l_u = (u - 1) / n;

        (l_u * priv_key.mu) % n
    }

    /// Additive property: E(m1 + m2) = E(m1) * E(m2) mod n^2
    pub fn add(pub_key: &PaillierPublicKey, c1: i128, c2: i128) -> i128 {
        (c1 * c2) % pub_key.nn
    }

    fn random_unit(env: &Env, n: i128) -> i128 {
        loop {
            let r: u64 = env.prng().gen_range(2..(n as u64));
            let r = r as i128;
            if Self::gcd(r, n) == 1 {
                return r;
            }
        }
    }

    fn pow_mod(mut base: i128, mut exp: i128, mod_val: i128) -> i128 {
        let mut res = 1;
        base %= mod_val;
        while exp > 0 {
            if exp % 2 == 1 {
                res = (res * base) % mod_val;
            }
            base = (base * base) % mod_val;
            exp /= 2;
        }
        res
    }

    pub(crate) fn gcd(mut a: i128, mut b: i128) -> i128 {
        while b != 0 {
            let t = a % b;
            a = b;
            b = t;
        }
        a.abs()
    }

    // Extended Euclid over i128.
    pub(crate) fn mod_inverse(a: i128, m: i128) -> Option<i128> {
        let (mut old_r, mut r) = (a, m);
        let (mut old_s, mut s) = (1i128, 0i128);
        while r != 0 {
            let q = old_r / r;
            (old_r, r) = (r, old_r - q * r);
            (old_s, s) = (s, old_s - q * s);
        }
        if old_r != 1 {
            return None;
        }
        Some(old_s.rem_euclid(m))
    }
}
