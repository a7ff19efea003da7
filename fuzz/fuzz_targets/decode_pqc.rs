#![no_main]

use libfuzzer_sys::fuzz_target;
use cmsber::{Decode, Mode};
use cmsber::encode::Values;
use cmsber::pqc::{MlDsaPrivateKey, MlKemPrivateKey};

fuzz_target!(|data: &[u8]| {
    if let Ok(key) = MlDsaPrivateKey::decode(data.to_vec(), Mode::Ber) {
        assert!(MlDsaPrivateKey::decode(
            key.to_vec(Mode::Der), Mode::Der
        ).is_ok());
    }
    if let Ok(key) = MlKemPrivateKey::decode(data.to_vec(), Mode::Ber) {
        assert!(MlKemPrivateKey::decode(
            key.to_vec(Mode::Der), Mode::Der
        ).is_ok());
    }
});
