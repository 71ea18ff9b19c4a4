use honggfuzz::fuzz;

use ur_fountain::bytewords::{decode, encode, Style};

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            for style in [Style::Standard, Style::Uri, Style::Minimal] {
                let encoded = encode(data, style);
                let decoded = decode(&encoded, style).unwrap();
                assert_eq!(data, decoded);
            }
        });
    }
}
