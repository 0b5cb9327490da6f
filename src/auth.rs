use argon2::{self, Config};
use rand::{thread_rng, RngCore};

pub fn hash_password(password: &str) -> String {
    let salt = generate_random_salt();
    let config = Config::default();
    argon2::hash_encoded(password.as_bytes(), &salt, &config)
        .expect("argon2 parameters are valid")
}

fn generate_random_salt() -> Vec<u8> {
    let mut salt = vec![0u8; 16];
    thread_rng().fill_bytes(&mut salt);
    salt
}

pub fn verify_password(hash: &str, password: &str) -> bool {
    argon2::verify_encoded(hash, password.as_bytes()).unwrap_or(false)
}
