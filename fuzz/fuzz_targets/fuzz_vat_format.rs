#![no_main]

use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: (&str, &str)| {
    let (country, number) = data;
    let _ = verifactu::vat::validate_vat_format(country, number);
    let _ = verifactu::vat::sanitize_vat_number(country, number, true);
});
