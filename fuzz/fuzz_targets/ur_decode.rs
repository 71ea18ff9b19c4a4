use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &str| {
            let mut decoder = ur_fountain::Decoder::default();
            for line in data.lines() {
                decoder.receive(line).ok();
            }
            if decoder.complete() {
                decoder.message().ok();
            }
        });
    }
}
