// SPDX-License-Identifier: MIT
#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use orgpng::extractor::parse_prompt_field;
use orgpng::frequency::{tokenize, StopWords, WordFrequencyTracker};

#[derive(Debug, Arbitrary)]
struct Input<'a> {
    raw: &'a str,
    field: &'a str,
    minimum: u8,
    k: u8,
}

fuzz_target!(|input: Input<'_>| {
    let text = match parse_prompt_field(input.raw, input.field) {
        Ok(Some(text)) => text,
        _ => input.raw.to_string(),
    };

    let stop_words = StopWords::builtin();
    let mut tracker = WordFrequencyTracker::new();
    for word in tokenize(&text, &stop_words, input.minimum as usize) {
        tracker.record(word);
    }

    let k = input.k as usize;
    let top = tracker.top_k(k);
    assert!(top.len() <= k);
    assert!(top.iter().all(|w| w.count > 0));
});
