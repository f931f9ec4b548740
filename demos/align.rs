//! `furigana_align::produce_segments` splits a reading between the kanji of its body.
//! Run with `RUST_LOG=furigana_align=debug` to see why a reading falls back to the whole body.

use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "furigana_align=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    for (body, reading) in [
        ("取り返す", "とりかえす"),
        ("可愛い犬", "か+わい.い.いぬ"),
        ("可愛い犬", "かわいいいぬ"),
        ("食べる", "=たべる"),
    ] {
        let furigana = furigana_align::produce_segments(body, reading);
        println!("{furigana}");
    }
}
