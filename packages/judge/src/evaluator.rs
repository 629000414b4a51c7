//! Per-submission evaluation loop.
//!
//! Test cases run one by one, in stored order, each inside its own guest
//! process. A mismatching output is remembered and evaluation continues so
//! the pass count covers the whole suite; a fault in the submitted code
//! (crash, syntax error, timeout) aborts the remaining cases and the pass
//! count reflects only tests completed before the fault.

use common::Verdict;
use common::evaluation::{Evaluation, TestCaseData};
use tracing::{debug, instrument};

use crate::error::SandboxError;
use crate::runner::{CodeRunner, RunLimits};

/// Compare guest output against the stored expected output.
///
/// Stringified comparison, insensitive to trailing whitespace on either
/// side (runtimes differ in whether they emit a final newline).
fn outputs_match(actual: &str, expected: &str) -> bool {
    actual.trim_end() == expected.trim_end()
}

/// Classify a non-zero guest exit by its stderr.
fn classify_fault(stderr: &str) -> Verdict {
    if stderr.contains("SyntaxError") {
        Verdict::CompilationError
    } else {
        Verdict::RuntimeError
    }
}

/// Run `source` against every test case and classify the outcome.
///
/// Returns `Err` only for sandbox infrastructure faults; everything the
/// submitted code does wrong is expressed as a [`Verdict`].
#[instrument(skip_all, fields(test_cases = cases.len()))]
pub async fn evaluate(
    runner: &dyn CodeRunner,
    source: &str,
    cases: &[TestCaseData],
    limits: &RunLimits,
) -> Result<Evaluation, SandboxError> {
    let total_test_cases = cases.len() as i32;
    let mut test_cases_passed = 0;
    let mut mismatched = false;

    for (index, case) in cases.iter().enumerate() {
        match runner.run(source, &case.input, limits).await {
            Ok(exec) if exec.succeeded() => {
                if outputs_match(&exec.stdout, &case.expected_output) {
                    test_cases_passed += 1;
                } else {
                    debug!(
                        test_case = index,
                        expected = %case.expected_output.trim_end(),
                        actual = %exec.stdout.trim_end(),
                        "Output mismatch"
                    );
                    mismatched = true;
                }
            }
            Ok(exec) => {
                let verdict = classify_fault(&exec.stderr);
                debug!(test_case = index, ?verdict, "Guest exited with a fault");
                return Ok(Evaluation {
                    verdict,
                    test_cases_passed,
                    total_test_cases,
                });
            }
            Err(SandboxError::Timeout(ms)) => {
                debug!(test_case = index, limit_ms = ms, "Guest timed out");
                return Ok(Evaluation {
                    verdict: Verdict::TimeLimitExceeded,
                    test_cases_passed,
                    total_test_cases,
                });
            }
            Err(infra) => return Err(infra),
        }
    }

    Ok(Evaluation {
        verdict: if mismatched {
            Verdict::WrongAnswer
        } else {
            Verdict::Accepted
        },
        test_cases_passed,
        total_test_cases,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runner::Execution;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// One scripted per-test outcome.
    enum Step {
        Out(&'static str),
        Fault { stderr: &'static str },
        Timeout,
    }

    /// Runner double that replays a fixed sequence of outcomes.
    struct ScriptedRunner {
        steps: Mutex<std::vec::IntoIter<Step>>,
    }

    impl ScriptedRunner {
        fn new(steps: Vec<Step>) -> Self {
            Self {
                steps: Mutex::new(steps.into_iter()),
            }
        }
    }

    #[async_trait]
    impl CodeRunner for ScriptedRunner {
        async fn run(
            &self,
            _source: &str,
            _input: &str,
            limits: &RunLimits,
        ) -> Result<Execution, SandboxError> {
            let step = self
                .steps
                .lock()
                .unwrap()
                .next()
                .expect("evaluator ran more test cases than scripted");
            match step {
                Step::Out(stdout) => Ok(Execution {
                    stdout: stdout.to_string(),
                    stderr: String::new(),
                    exit_code: Some(0),
                }),
                Step::Fault { stderr } => Ok(Execution {
                    stdout: String::new(),
                    stderr: stderr.to_string(),
                    exit_code: Some(1),
                }),
                Step::Timeout => Err(SandboxError::Timeout(limits.wall_time.as_millis() as u64)),
            }
        }
    }

    fn case(input: &str, expected: &str) -> TestCaseData {
        TestCaseData {
            input: input.to_string(),
            expected_output: expected.to_string(),
        }
    }

    #[tokio::test]
    async fn all_matching_outputs_are_accepted() {
        let runner = ScriptedRunner::new(vec![Step::Out("15"), Step::Out("0")]);
        let cases = vec![case("[5,10]", "15"), case("[-1,1]", "0")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::Accepted);
        assert_eq!(eval.test_cases_passed, 2);
        assert_eq!(eval.total_test_cases, 2);
    }

    #[tokio::test]
    async fn a_mismatch_keeps_running_and_reports_wrong_answer() {
        let runner = ScriptedRunner::new(vec![Step::Out("15"), Step::Out("99"), Step::Out("7")]);
        let cases = vec![case("[5,10]", "15"), case("[-1,1]", "0"), case("[3,4]", "7")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::WrongAnswer);
        assert_eq!(eval.test_cases_passed, 2);
        assert_eq!(eval.total_test_cases, 3);
    }

    #[tokio::test]
    async fn a_runtime_fault_aborts_the_remaining_cases() {
        let runner = ScriptedRunner::new(vec![
            Step::Out("15"),
            Step::Fault {
                stderr: "TypeError: boom",
            },
        ]);
        let cases = vec![case("[5,10]", "15"), case("[-1,1]", "0"), case("[3,4]", "7")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::RuntimeError);
        assert_eq!(eval.test_cases_passed, 1);
        assert_eq!(eval.total_test_cases, 3);
    }

    #[tokio::test]
    async fn syntax_faults_classify_as_compilation_error() {
        let runner = ScriptedRunner::new(vec![Step::Fault {
            stderr: "SyntaxError: Unexpected token '}'",
        }]);
        let cases = vec![case("[5,10]", "15")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::CompilationError);
        assert_eq!(eval.test_cases_passed, 0);
    }

    #[tokio::test]
    async fn a_timeout_aborts_with_time_limit_exceeded() {
        let runner = ScriptedRunner::new(vec![Step::Out("15"), Step::Timeout]);
        let cases = vec![case("[5,10]", "15"), case("[-1,1]", "0"), case("[3,4]", "7")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::TimeLimitExceeded);
        assert_eq!(eval.test_cases_passed, 1);
        assert_eq!(eval.total_test_cases, 3);
    }

    #[tokio::test]
    async fn trailing_newlines_do_not_fail_a_test() {
        let runner = ScriptedRunner::new(vec![Step::Out("15\n")]);
        let cases = vec![case("[5,10]", "15")];

        let eval = evaluate(&runner, "code", &cases, &RunLimits::default())
            .await
            .unwrap();
        assert_eq!(eval.verdict, Verdict::Accepted);
    }
}
