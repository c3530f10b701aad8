#![no_main]

use libfuzzer_sys::fuzz_target;
use sdix::int_vector::{Encoding, IntVector};

const ENCODINGS: [Encoding; 4] = [
    Encoding::Fixed,
    Encoding::VByte,
    Encoding::EliasGamma,
    Encoding::EliasDelta,
];

fuzz_target!(|data: &[u8]| {
    // Arbitrary bytes must decode to an error or to a vector that survives re-encoding
    for encoding in ENCODINGS {
        if let Ok((v, used)) = IntVector::deserialize_with(encoding, data) {
            assert!(used <= data.len());
            let mut out = Vec::new();
            v.serialize_with(encoding, &mut out).unwrap();
            if encoding == Encoding::Fixed {
                assert_eq!(out.len(), used);
            }
            let (again, _) = IntVector::deserialize_with(encoding, &out).unwrap();
            assert_eq!(again, v);
        }
    }
});
