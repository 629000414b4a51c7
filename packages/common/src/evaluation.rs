use serde::{Deserialize, Serialize};

use crate::Verdict;

/// Test case data handed to the evaluator.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TestCaseData {
    /// Input passed to the user-defined entry point, as stored text.
    pub input: String,
    /// Expected output for comparison.
    pub expected_output: String,
}

/// Aggregate outcome of evaluating one submission.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Evaluation {
    pub verdict: Verdict,
    /// Test cases that produced the expected output before evaluation
    /// finished or aborted.
    pub test_cases_passed: i32,
    pub total_test_cases: i32,
}

impl Evaluation {
    pub fn is_accepted(&self) -> bool {
        self.verdict.is_accepted()
    }
}
