//! Display Information Example
//!
//! Prints the RAM layout of every supported panel.
//!
//! Run with: cargo run -p eink-specs --example display_info

use eink_specs::displays;
use eink_specs::DisplaySpec;

fn print_display_info(spec: &DisplaySpec) {
    println!("\n{}", "=".repeat(60));
    println!("Display: {}", spec.name);
    println!("{}", "=".repeat(60));
    println!("  {}", spec.description);
    println!("  Resolution: {}x{} pixels", spec.width, spec.height);
    println!("  Controller: {}", spec.controller.as_str());

    println!("\n  RAM layout:");
    println!("    Bytes per row: {}", spec.bytes_per_row());
    println!("    Padding bits per row: {}", spec.padding_bits());
    println!("    Frame size: {} bytes", spec.array_size());
}

fn main() {
    for spec in displays::ALL {
        print_display_info(spec);
    }
}
