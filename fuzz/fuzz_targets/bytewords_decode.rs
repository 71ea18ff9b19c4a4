use honggfuzz::fuzz;

use ur_fountain::bytewords::{decode, Style};

fn main() {
    loop {
        fuzz!(|data: &str| {
            for style in [Style::Minimal, Style::Standard, Style::Uri] {
                if let Ok(decoded) = decode(data, style) {
                    assert!(data.len() >= 8);
                    assert!(decoded.len() < data.len());
                }
            }
        });
    }
}
