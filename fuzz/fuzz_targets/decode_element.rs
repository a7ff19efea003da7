#![no_main]

use libfuzzer_sys::fuzz_target;
use cmsber::Mode;
use cmsber::decode::Element;

fuzz_target!(|data: &[u8]| {
    let ber = Element::decode(data.to_vec(), Mode::Ber);
    let der = Element::decode(data.to_vec(), Mode::Der);

    // Anything that is valid DER is valid BER, too.
    if der.is_ok() {
        assert!(ber.is_ok());
    }
});
