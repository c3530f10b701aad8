#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use sdix::sd_vector::SdVector;

#[derive(Arbitrary, Debug)]
enum Input {
    Raw(Vec<u8>),
    Positions { len: u16, positions: Vec<u16> },
}

fuzz_target!(|input: Input| {
    match input {
        Input::Raw(bytes) => {
            // Malformed layouts must be rejected, not panic later
            if let Ok((sd, _)) = SdVector::deserialize(&bytes) {
                let _ = sd.iter().count();
                let _ = sd.rank(sd.len());
            }
        }
        Input::Positions { len, mut positions } => {
            let len = len as usize + 1;
            positions.retain(|&p| (p as usize) < len);
            positions.sort_unstable();
            positions.dedup();
            let sd = SdVector::from_positions(len, positions.iter().map(|&p| p as usize)).unwrap();
            for (k, &p) in positions.iter().enumerate() {
                assert_eq!(sd.select(k + 1).unwrap(), p as usize);
                assert_eq!(sd.rank(p as usize).unwrap(), k);
            }
        }
    }
});
