use serde::Serialize;

use blink_rs::Template;

use crate::cli::TemplateArgs;
use crate::exit_codes;
use crate::output;

#[derive(Serialize)]
struct TemplateInfo {
    length: usize,
    half_window: usize,
    peak_index: usize,
    min: f64,
    max: f64,
    values: Vec<f64>,
}

pub fn execute(args: TemplateArgs) -> i32 {
    let template = Template::ideal();
    let values = template.values();
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if args.json {
        let info = TemplateInfo {
            length: template.len(),
            half_window: template.half_window(),
            peak_index: template.peak_index(),
            min,
            max,
            values: values.to_vec(),
        };
        return output::emit_report(&info, args.compact, None);
    }

    println!("Canonical blink template");
    println!("  length:      {} samples", template.len());
    println!("  half window: {} samples", template.half_window());
    println!("  peak index:  {}", template.peak_index());
    println!("  range:       [{}, {}]", min, max);
    exit_codes::SUCCESS
}
