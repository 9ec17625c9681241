#![no_main]
use libfuzzer_sys::fuzz_target;
use pmon_hardware::pmsa003i::{decode_frame, encode_frame};

fuzz_target!(|data: &[u8]| {
    // Anything that decodes must decode identically after a re-encode.
    if let Ok(frame) = decode_frame(data) {
        let wire = encode_frame(&frame);
        assert_eq!(decode_frame(&wire), Ok(frame));
    }
});
