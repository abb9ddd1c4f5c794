#![no_main]

use libfuzzer_sys::fuzz_target;
use opds_entry::codec::{CodecConfig, EntryCodec, RecoveryMode};

fuzz_target!(|data: &[u8]| {
    let Ok(document) = serde_json::from_slice::<serde_json::Value>(data) else {
        return;
    };

    for mode in [RecoveryMode::Lenient, RecoveryMode::Strict] {
        let codec = EntryCodec::new(CodecConfig::new().with_recovery_mode(mode));
        if let Ok(entry) = codec.decode_entry(&document) {
            // Anything that decodes must re-encode and decode to an equal entry.
            let encoded = codec.encode_entry(&entry).expect("decoded entry re-encodes");
            let again = codec.decode_entry(&encoded).expect("re-encoded entry decodes");
            assert_eq!(again, entry);
        }
    }
});
