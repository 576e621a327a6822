mod password;

pub use password::{dummy_hash, hash_password, verify_password};
