#![no_main]
use libfuzzer_sys::fuzz_target;
use xmlc14n::Method;

fuzz_target!(|data: &[u8]| {
    if let Ok(xml) = std::str::from_utf8(data) {
        if let Ok(canonical) = xmlc14n::canonicalize_str(xml, Method::Inclusive) {
            // Kanonische Ausgabe muss ein Fixpunkt sein.
            let again = xmlc14n::canonicalize_str(&canonical, Method::Inclusive)
                .expect("canonical output must parse");
            assert_eq!(again, canonical);
        }
    }
});
