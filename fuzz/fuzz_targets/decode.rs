#![no_main]
use cloakid::{Codec, CodecOptions, NumericKind};
use libfuzzer_sys::fuzz_target;
use once_cell::sync::Lazy;

static CODEC: Lazy<Codec> = Lazy::new(|| Codec::new(&CodecOptions::new()));

fuzz_target!(|data: &[u8]| {
    let text = String::from_utf8_lossy(data);
    for kind in NumericKind::ALL {
        let _ = CODEC.decode_raw(&text, kind);
    }
});
