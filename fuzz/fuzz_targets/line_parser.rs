#![no_main]

use docsum::config::{InputConfig, ValueProfile};
use docsum::filter::{Filter, Party};
use docsum::record::{Fields, LineParser};
use libfuzzer_sys::fuzz_target;

fuzz_target!(|data: &[u8]| {
    if data.is_empty() {
        return;
    }

    let flags = data[0];
    let input = InputConfig {
        separator: if flags & 0x1 == 0 { b';' } else { b',' },
        values: if flags & 0x2 == 0 {
            ValueProfile::Stock
        } else {
            ValueProfile::Future
        },
        ..InputConfig::default()
    };
    let filter = match (flags >> 2) & 0x3 {
        0 => Filter::None,
        1 => Filter::government_id(Party::Seller, "11.222.333/0001-81"),
        2 => Filter::name_contains(Party::Sponsor, "banco"),
        _ => Filter::name_in(Party::Seller, ["ACME LTDA"]),
    };

    // Decode errors are fine; we only care about panics.
    let parser = LineParser::new(&input, filter);
    let mut line = data[1..].to_vec();
    let mut fields = Fields::new();
    let _ = parser.parse(&mut line, &mut fields);
});
