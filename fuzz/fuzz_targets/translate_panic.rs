#![no_main]
use ferrotex_funceval::{OutputRecord, translate};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    // Translation reports every failure through the status and must never panic,
    // whatever delimiters or multi-byte characters the input holds.
    let s = String::from_utf8_lossy(data);
    let result = translate(&s);
    let _ = OutputRecord::from_result(&result);
});
