use crate::checks::{Check, Scope};
use crate::engine::report::{TestOutcome, TestResult};
use crate::error::Result;
use crate::output;
use crate::platform::FactProvider;

/// Executes single checks: assigns sequence numbers, emits one report line
/// per check as it runs, records the outcome, and re-raises failures so the
/// orchestrator can decide whether they isolate or propagate.
pub struct TestRunner {
    num_tests_run: u32,
    outcomes: Vec<TestOutcome>,
    emit_lines: bool,
}

impl TestRunner {
    pub fn new(emit_lines: bool) -> Self {
        TestRunner {
            num_tests_run: 0,
            outcomes: Vec::new(),
            emit_lines,
        }
    }

    /// Run one check. Counting, recording, and line emission happen whether
    /// the check passes or fails; the error is then handed back to the
    /// caller.
    pub fn run(&mut self, check: &dyn Check, facts: &dyn FactProvider) -> Result<()> {
        let sequence = self.num_tests_run;
        let (scope, mut line) = match check.scope() {
            Scope::Host => (
                "host".to_string(),
                format!("  Test {}: {}", sequence, check.description()),
            ),
            Scope::Device(device) => (
                format!("mic{}", device),
                format!("  Test {} (mic{}): {}", sequence, device, check.description()),
            ),
        };

        let result = check.evaluate(facts);
        match &result {
            Ok(()) => line.push_str(" ... pass"),
            Err(err) => line.push_str(&format!(" ... fail\n    {}", err)),
        }

        self.outcomes.push(TestOutcome {
            sequence,
            scope,
            description: check.description(),
            result: if result.is_ok() {
                TestResult::Pass
            } else {
                TestResult::Fail
            },
            detail: result.as_ref().err().map(|err| err.to_string()),
        });
        self.num_tests_run += 1;

        if self.emit_lines {
            output::p_out(&line);
        }

        result
    }

    pub fn tests_run(&self) -> u32 {
        self.num_tests_run
    }

    pub fn into_outcomes(self) -> Vec<TestOutcome> {
        self.outcomes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::host::{DriverLoadedCheck, PciDevicesCheck};
    use crate::checks::device::RasCheck;
    use crate::checks::testing::MockFacts;

    #[test]
    fn test_sequence_numbers_start_at_zero_and_have_no_gaps() {
        let facts = MockFacts::healthy(1);
        let mut runner = TestRunner::new(false);

        runner.run(&PciDevicesCheck, &facts).unwrap();
        runner.run(&DriverLoadedCheck, &facts).unwrap();
        runner.run(&RasCheck { device: 0 }, &facts).unwrap();

        let outcomes = runner.into_outcomes();
        let sequences: Vec<u32> = outcomes.iter().map(|o| o.sequence).collect();
        assert_eq!(sequences, vec![0, 1, 2]);
    }

    #[test]
    fn test_failures_are_counted_recorded_and_reraised() {
        let facts = MockFacts::healthy(0);
        let mut runner = TestRunner::new(false);

        assert!(runner.run(&PciDevicesCheck, &facts).is_err());
        // A failed check still consumes its sequence number.
        assert_eq!(runner.tests_run(), 1);

        let outcomes = runner.into_outcomes();
        assert_eq!(outcomes[0].result, TestResult::Fail);
        assert_eq!(outcomes[0].scope, "host");
        assert!(outcomes[0]
            .detail
            .as_deref()
            .unwrap()
            .contains("no Intel(R) Xeon Phi(TM)"));
    }

    #[test]
    fn test_device_outcomes_carry_the_mic_label() {
        let facts = MockFacts::healthy(2);
        let mut runner = TestRunner::new(false);
        runner.run(&RasCheck { device: 1 }, &facts).unwrap();

        let outcomes = runner.into_outcomes();
        assert_eq!(outcomes[0].scope, "mic1");
        assert!(outcomes[0].detail.is_none());
    }
}
