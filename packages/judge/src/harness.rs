//! Harness glue prepended around submitted JavaScript.
//!
//! The contract with the user is a single entry point: a function named
//! `solution` taking the parsed test input. The harness parses the raw
//! input text (JSON where possible, raw string otherwise), invokes the
//! entry point, and prints a value comparable against the stored expected
//! output. Faults inside `solution` propagate as a non-zero exit so the
//! evaluator can classify them.

/// Name of the entry point the submitted code must define.
pub const ENTRY_POINT: &str = "solution";

/// Wrap submitted source into a runnable script.
///
/// The test input arrives as `argv[2]`; the composed script is fully
/// self-contained so the runner only needs to execute one file.
pub fn wrap(source: &str) -> String {
    format!(
        r#"{source}

const __raw = process.argv[2] ?? "";
let __input;
try {{
    __input = JSON.parse(__raw);
}} catch (_ignored) {{
    __input = __raw;
}}
if (typeof {entry} !== "function") {{
    console.error("{entry} is not defined");
    process.exit(1);
}}
const __output = {entry}(__input);
process.stdout.write(typeof __output === "string" ? __output : JSON.stringify(__output));
"#,
        source = source,
        entry = ENTRY_POINT,
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wrapped_script_contains_source_and_invocation() {
        let script = wrap("function solution(a) { return a[0] + a[1]; }");
        assert!(script.starts_with("function solution"));
        assert!(script.contains("JSON.parse(__raw)"));
        assert!(script.contains("solution(__input)"));
    }

    #[test]
    fn missing_entry_point_is_reported_before_invocation() {
        let script = wrap("const x = 1;");
        let guard = script.find("typeof solution").unwrap();
        let call = script.find("solution(__input)").unwrap();
        assert!(guard < call);
    }
}
