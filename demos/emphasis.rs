//! A reading starting with an asterisk puts emphasis dots on every character of the body.
//! Options are read from the JSON given as the first argument, if any.

fn main() {
    let options = match std::env::args().nth(1) {
        Some(json) => serde_json::from_str(&json).expect("invalid options"),
        None => furigana_align::Options::default(),
    };
    let engine = furigana_align::Engine::new(&options).expect("invalid options");
    for reading in ["*", "*+"] {
        if let Some(ruby) = engine.render("だから", reading) {
            println!("{ruby}");
        }
    }
}
