//! Library usage demo: annotate a text and show its segments
//!
//! Not wired into the build; compile by hand if you want to poke at
//! the text stages without a synthesis engine:
//!   rustc --edition 2021 -L target/debug/deps demos/annotate_and_split.rs

use govorun::text::{markup, segment, StressAnnotator};

fn main() {
    let text = "Это зам+ок у моря, а это дверной з+амок. \
                <emphasis>Слушай</emphasis> внимательно......";

    let annotator = StressAnnotator::new();
    let annotated = markup::normalize(&annotator.annotate(text));
    println!("annotated: {}", annotated);

    for (i, seg) in segment::segment_text(&annotated, 40).iter().enumerate() {
        println!("{:2}. [{:2}] {}", i + 1, seg.chars().count(), seg);
    }
}
