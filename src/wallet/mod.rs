use rand::RngCore;
use rand::seq::SliceRandom;
use secp256k1::{PublicKey, Secp256k1, SecretKey};
use sha2::{Digest, Sha256};

/// Words a recovery phrase is drawn from.
pub const MNEMONIC_WORDS: [&str; 64] = [
    "apple", "brave", "candy", "dream", "eagle", "fiber", "giant", "happy", "island", "jungle",
    "kitten", "lemon", "mango", "noble", "ocean", "piano", "queen", "river", "sunset", "tiger",
    "umbrella", "valley", "window", "yellow", "zebra", "anchor", "bridge", "castle", "diamond",
    "engine", "forest", "garden", "harbor", "igloo", "jacket", "kernel", "ladder", "marble",
    "needle", "office", "palace", "quartz", "rocket", "shadow", "temple", "unique", "violin",
    "wallet", "xenon", "yacht", "zodiac", "bronze", "copper", "delta", "emerald", "flame", "globe",
    "horizon", "impact", "journal", "knight", "legacy", "mirror", "nexus",
];

pub const MNEMONIC_LEN: usize = 12;

/// Display-only credentials handed to a new player.
/// This is NOT BIP39/BIP32: nothing in the ledger checks keys or signatures.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub mnemonic: String,
    pub public_key: String,
    pub address: String,
}

/// Twelve distinct words from [`MNEMONIC_WORDS`].
pub fn generate_mnemonic(rng: &mut dyn RngCore) -> String {
    MNEMONIC_WORDS
        .choose_multiple(rng, MNEMONIC_LEN)
        .copied()
        .collect::<Vec<_>>()
        .join(" ")
}

/// mnemonic -> sha256 -> secp256k1 secret key -> compressed pubkey (hex),
/// address = "BABY" + last 16 hex chars of sha256(pubkey), upper-cased.
pub fn derive_credentials(mnemonic: &str) -> Result<Credentials, secp256k1::Error> {
    let seed = Sha256::digest(mnemonic.as_bytes());
    let sk = SecretKey::from_slice(&seed)?;
    let secp = Secp256k1::signing_only();
    let pk = PublicKey::from_secret_key(&secp, &sk);
    let pk_bytes = pk.serialize(); // compressed (33 bytes)

    Ok(Credentials {
        mnemonic: mnemonic.to_string(),
        public_key: hex::encode(pk_bytes),
        address: pubkey_to_address(&pk_bytes),
    })
}

fn pubkey_to_address(pk_bytes: &[u8]) -> String {
    let digest = hex::encode(Sha256::digest(pk_bytes));
    format!("BABY{}", digest[digest.len() - 16..].to_uppercase())
}

/// Draw mnemonics until one maps to a valid secret key.
pub fn create_credentials(rng: &mut dyn RngCore) -> Credentials {
    loop {
        let mnemonic = generate_mnemonic(rng);
        if let Ok(creds) = derive_credentials(&mnemonic) {
            return creds;
        }
    }
}
