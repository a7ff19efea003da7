#![no_main]

use libfuzzer_sys::fuzz_target;
use cmsber::{Decode, Mode};
use cmsber::cms::ContentInfo;
use cmsber::encode::Values;

fuzz_target!(|data: &[u8]| {
    let info = match ContentInfo::decode(data.to_vec(), Mode::Ber) {
        Ok(info) => info,
        Err(_) => return,
    };

    // Whatever we produce must decode again to the same encoding.
    let encoded = info.to_vec(Mode::Der);
    let decoded = match ContentInfo::decode(encoded.clone(), Mode::Ber) {
        Ok(decoded) => decoded,
        Err(err) => panic!("re-encoded content info fails to decode: {}", err),
    };
    assert_eq!(decoded.to_vec(Mode::Der), encoded);
});
