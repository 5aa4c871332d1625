use rand::Rng;

const LETTERS: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ";
const DIGITS: &[u8] = b"0123456789";

/// Random plate in the Mercosul layout `LLLNLNN`, e.g. `ABC1D23`
pub fn random_plate<R: Rng>(rng: &mut R) -> String {
    let mut pick = |set: &[u8]| set[rng.gen_range(0..set.len())] as char;

    let mut plate = String::with_capacity(7);
    for _ in 0..3 {
        plate.push(pick(LETTERS));
    }
    plate.push(pick(DIGITS));
    plate.push(pick(LETTERS));
    plate.push(pick(DIGITS));
    plate.push(pick(DIGITS));
    plate
}

/// True for seven uppercase ASCII characters in the `LLLNLNN` layout
pub fn is_mercosul(text: &str) -> bool {
    let bytes = text.as_bytes();
    bytes.len() == 7
        && bytes.iter().enumerate().all(|(i, b)| match i {
            0..=2 | 4 => b.is_ascii_uppercase(),
            _ => b.is_ascii_digit(),
        })
}
