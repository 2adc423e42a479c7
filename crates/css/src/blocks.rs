// input: "a { color: red } @media (x) { b { c: d } } tail"
// output: ["a { color: red }", "@media (x) { b { c: d } }"]
//
// Splits stylesheet text into top-level brace-balanced blocks. Text after the
// last complete block is dropped.
pub fn split_rule_blocks(input: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut depth = 0usize;
    let mut start = 0usize;
    for (i, ch) in input.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' if depth > 0 => {
                depth -= 1;
                if depth == 0 {
                    let block = input[start..=i].trim();
                    if !block.is_empty() {
                        out.push(block.to_string());
                    }
                    start = i + 1;
                }
            }
            // Stray closer outside any block.
            '}' => start = i + 1,
            _ => {}
        }
    }
    out
}
