use honggfuzz::fuzz;

fn main() {
    loop {
        fuzz!(|data: &[u8]| {
            let Some(&first) = data.first() else {
                return;
            };
            let max_length = 1 + first as usize;
            let Ok(mut encoder) = ur_fountain::Encoder::new(data, max_length, "bytes") else {
                // too many fragments
                return;
            };
            let mut decoder = ur_fountain::Decoder::default();
            // drop the first part, the mixed ones make up for it
            encoder.next_part();
            while !decoder.complete() {
                let part = encoder.next_part();
                decoder.receive(&part).unwrap();
            }
            assert_eq!(decoder.message().unwrap().unwrap(), data);
        });
    }
}
