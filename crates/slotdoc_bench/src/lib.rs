//! Benchmark utilities.

use rand::Rng;

/// Generate random bytes of the specified size.
pub fn random_data(size: usize) -> Vec<u8> {
    let mut rng = rand::thread_rng();
    (0..size).map(|_| rng.gen()).collect()
}

/// Generate a document of `count` entries with random ids and a few
/// repeated fields, shaped like a real role list.
pub fn role_document(count: usize) -> String {
    let mut rng = rand::thread_rng();
    let teams = ["townsfolk", "outsider", "minion", "demon"];
    let entries: Vec<String> = (0..count)
        .map(|i| {
            format!(
                r#"{{"id":"role_{:08x}","team":"{}","firstNight":{}}}"#,
                rng.gen::<u32>(),
                teams[i % teams.len()],
                rng.gen_range(0..60)
            )
        })
        .collect();
    format!("[{}]", entries.join(","))
}
