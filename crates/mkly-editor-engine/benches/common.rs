// Benchmark helper functions - Rust's dead code analysis doesn't understand
// that these are used by benchmark files in the same directory
// See: https://users.rust-lang.org/t/cargo-rustc-benches-awarnings/110111/2
#[allow(dead_code)]
pub fn generate_document(blocks: usize) -> String {
    let mut content = String::from("--- use: core\n\n");
    for i in 0..blocks {
        let block_type = if i % 3 == 0 { "core/heading" } else { "core/text" };
        content.push_str(&format!("--- {}\nlevel: {}\n\n", block_type, i % 6 + 1));
        content.push_str("Some paragraph content with multiple sentences. ");
        content.push_str("This helps create realistic document structure for benchmarking.\n\n");
    }
    content
}

#[allow(dead_code)]
pub fn generate_style_body(rules: usize) -> String {
    let mut body = String::from("accent: #d33\n");
    for i in 0..rules {
        body.push_str(&format!("core/text:s{}\n  color: $accent\n  >p\n    margin: {}px\n", i, i));
        body.push_str("  .link:hover\n    text-decoration: underline\n");
    }
    body
}
