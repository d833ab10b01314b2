use base64::{Engine, engine::general_purpose::STANDARD};
use password_hash::rand_core::{OsRng, RngCore};

/// Prints a fresh 256-bit signing key suitable for `JWT_SECRET`.
fn main() {
    let mut key = [0u8; 32];
    OsRng.fill_bytes(&mut key);
    println!("{}", STANDARD.encode(key));
}
